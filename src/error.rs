//! Error types for `autonomy_hooks`.

use std::path::PathBuf;

/// Errors that can occur in the autonomy hooks.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An I/O error occurred.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A JSON parsing error occurred.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A YAML parsing error occurred.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// A configuration value could not be interpreted.
    #[error("Invalid configuration: {0}")]
    Config(String),

    /// A session id that cannot be used as a record key.
    #[error("Invalid session id: {0:?}")]
    InvalidSessionId(String),

    /// A file was not found.
    #[error("File not found: {0}")]
    FileNotFound(PathBuf),

    /// Invalid transcript format.
    #[error("Invalid transcript format: {0}")]
    InvalidTranscript(String),

    /// A template error occurred.
    #[error("Template error: {0}")]
    Template(String),

    /// A command execution failed.
    #[error("Command '{command}' failed with exit code {exit_code}: {stderr}")]
    CommandFailed {
        /// The command that was run.
        command: String,
        /// The exit code.
        exit_code: i32,
        /// The stderr output.
        stderr: String,
    },

    /// A command did not finish within its timeout.
    #[error("Command '{command}' timed out after {seconds}s")]
    CommandTimedOut {
        /// The command that was run.
        command: String,
        /// The timeout that expired.
        seconds: u64,
    },
}

/// A specialized Result type for this crate.
pub type Result<T> = std::result::Result<T, Error>;
