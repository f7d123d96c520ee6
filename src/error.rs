//! Errors produced while polling and parsing the battery status command.

use std::process::ExitStatus;

/// Failures of a single poll. None of these are fatal: the applet renders a
/// degraded display and retries on the next tick.
#[derive(Debug, thiserror::Error)]
pub enum StatusError {
    #[error("no status command configured")]
    EmptyCommand,

    #[error("failed to run '{command}': {source}")]
    CommandSpawnFailure {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("'{command}' exited with {status}: {stderr}")]
    CommandFailed {
        command: String,
        status: ExitStatus,
        stderr: String,
    },

    #[error("no ':' separator in status output: {0:?}")]
    MalformedOutput(String),

    #[error("invalid percentage field: {0:?}")]
    InvalidPercentage(String),

    #[error("expected at least 2 status fields, found {0}")]
    InsufficientFields(usize),
}
