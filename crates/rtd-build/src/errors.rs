//! Error types for the build driver and the command line.

use rtd_config::ConfigError;
use rtd_manifest::InvalidConfig;
use rtd_venv::EnvironmentError;
use std::io;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{0}")]
    InvalidConfig(#[from] InvalidConfig),

    #[error("Build environment error: {0}")]
    Environment(#[from] EnvironmentError),

    #[error("Failed to load settings: {0}")]
    Settings(#[from] ConfigError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("No {0} executable found; install it or set its path in the settings file")]
    MissingTool(String),

    #[error("Build '{0}' has no environment; setup did not run")]
    NotSetUp(String),

    #[error("Rendering {format} for '{build}' failed with exit code {code}")]
    RenderFailed {
        build: String,
        format: String,
        code: i32,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use rtd_manifest::ErrorCode;

    #[test]
    fn test_render_failed_display() {
        let err = BuildError::RenderFailed {
            build: "docs".to_string(),
            format: "html".to_string(),
            code: 2,
        };
        assert_eq!(
            err.to_string(),
            "Rendering html for 'docs' failed with exit code 2"
        );
    }

    #[test]
    fn test_invalid_config_passes_through() {
        let err = BuildError::from(InvalidConfig::new(
            ErrorCode::ConfigRequired,
            "No readthedocs.yml found in /tmp",
        ));
        assert_eq!(
            err.to_string(),
            "No readthedocs.yml found in /tmp (config-required)"
        );
    }
}
