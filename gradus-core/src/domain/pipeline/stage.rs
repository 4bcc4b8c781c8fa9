// gradus-core/src/domain/pipeline/stage.rs

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// External command as declared in the project configuration.
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct StageCommand {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

/// One unit of pipeline work, resolved and ready to spawn.
#[derive(Debug, Clone)]
pub struct StageDefinition {
    pub name: String,
    pub command: String,
    pub args: Vec<String>,
}

impl StageDefinition {
    pub fn new(name: impl Into<String>, command: &StageCommand) -> Self {
        Self {
            name: name.into(),
            command: command.command.clone(),
            args: command.args.clone(),
        }
    }

    /// Full command line, for error messages.
    pub fn render_command(&self) -> String {
        let mut rendered = self.command.clone();
        for arg in &self.args {
            rendered.push(' ');
            rendered.push_str(arg);
        }
        rendered
    }
}

/// Retry-with-fixed-delay policy applied to every stage attempt.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    /// Additional attempts after the first failure.
    pub retries: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            retries: 2,
            delay: Duration::from_secs(10),
        }
    }
}
