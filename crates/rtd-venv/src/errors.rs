use std::path::PathBuf;
use thiserror::Error;

/// Failures while provisioning or using a build environment.
///
/// None of these are retried: a failed create or install usually means the
/// project's dependency declaration is broken.
#[derive(Error, Debug)]
pub enum EnvironmentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{command} failed with exit code {code}")]
    CommandFailed { command: String, code: i32 },

    #[error("Environment not found: {0}")]
    NotFound(PathBuf),

    #[error("{0}")]
    PathResolution(String),

    #[error("Environment has already been destroyed")]
    Destroyed,
}
