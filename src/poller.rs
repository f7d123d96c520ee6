use std::process::Command;

use crate::error::StatusError;

/// Something that produces the raw text of one battery status poll.
pub trait StatusSource {
    fn fetch(&mut self) -> Result<String, StatusError>;
}

/// Runs an external status command (acpi by default) and captures stdout.
/// The call blocks until the command exits.
#[derive(Debug, Clone)]
pub struct CommandPoller {
    command_line: String,
}

impl CommandPoller {
    pub fn new(command_line: impl Into<String>) -> Self {
        Self { command_line: command_line.into() }
    }
}

impl StatusSource for CommandPoller {
    fn fetch(&mut self) -> Result<String, StatusError> {
        let mut parts = self.command_line.split_whitespace();
        let program = parts.next().ok_or(StatusError::EmptyCommand)?;

        let output = Command::new(program)
            .args(parts)
            .output()
            .map_err(|source| StatusError::CommandSpawnFailure {
                command: self.command_line.clone(),
                source,
            })?;

        if !output.status.success() {
            return Err(StatusError::CommandFailed {
                command: self.command_line.clone(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}
