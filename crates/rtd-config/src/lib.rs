//! Settings of the rtd-build tool itself.
//!
//! These are not part of any project manifest: they describe the host the
//! builds run on (where `uv` or `conda` live, which renderer release gets
//! installed into every build environment, where temporary environments go).

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use which::which;

/// Environment variable overriding the settings file location
pub const CONFIG_ENV_VAR: &str = "RTD_BUILD_CONFIG";

/// Renderer release installed when the settings do not pin one
pub const DEFAULT_SPHINX_VERSION: &str = "7.4.7";

const SPHINX_PACKAGE: &str = "Sphinx";

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse settings file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Could not determine home directory")]
    NoHomeDir,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Settings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uv_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conda_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub python_path: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sphinx_version: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub env_root: Option<PathBuf>,
}

impl Settings {
    /// Location of the settings file.
    ///
    /// A non-empty `RTD_BUILD_CONFIG` wins; otherwise
    /// `~/.config/rtd-build/rtd-build.toml`.
    pub fn path() -> Result<PathBuf, ConfigError> {
        if let Ok(env_path) = std::env::var(CONFIG_ENV_VAR) {
            let trimmed = env_path.trim();
            if !trimmed.is_empty() {
                return Ok(PathBuf::from(trimmed));
            }
        }

        #[cfg(not(target_os = "windows"))]
        let default = dirs::home_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join(".config")
            .join("rtd-build")
            .join("rtd-build.toml");

        #[cfg(target_os = "windows")]
        let default = dirs::config_dir()
            .ok_or(ConfigError::NoHomeDir)?
            .join("rtd-build")
            .join("rtd-build.toml");

        Ok(default)
    }

    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(&Self::path()?)
    }

    /// Load settings from `path`; a missing file yields the defaults
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Settings::default());
        }
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Package specifier for the renderer installed in every environment.
    ///
    /// A bare version is pinned with `==`; anything carrying a comparison
    /// operator is used as-is.
    pub fn sphinx_requirement(&self) -> String {
        let version = self
            .sphinx_version
            .as_deref()
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .unwrap_or(DEFAULT_SPHINX_VERSION);
        if ["==", ">=", "<=", "~=", "!=", ">", "<"]
            .iter()
            .any(|op| version.contains(op))
        {
            format!("{}{}", SPHINX_PACKAGE, version)
        } else {
            format!("{}=={}", SPHINX_PACKAGE, version)
        }
    }

    /// The `uv` binary to provision virtualenvs with, if any
    pub fn resolve_uv(&self) -> Option<PathBuf> {
        resolve_tool(self.uv_path.as_deref(), "uv")
    }

    /// The `conda` binary used for manifests declaring a conda environment
    pub fn resolve_conda(&self) -> Option<PathBuf> {
        resolve_tool(self.conda_path.as_deref(), "conda")
    }

    /// Host interpreter used when `uv` is unavailable
    pub fn resolve_python(&self) -> Option<PathBuf> {
        resolve_tool(self.python_path.as_deref(), "python3")
            .or_else(|| which("python").ok())
    }

    /// Parent directory for temporary build environments
    pub fn env_root(&self) -> PathBuf {
        self.env_root.clone().unwrap_or_else(std::env::temp_dir)
    }
}

/// An explicitly configured path that exists wins over a `PATH` lookup.
fn resolve_tool(configured: Option<&Path>, name: &str) -> Option<PathBuf> {
    if let Some(path) = configured {
        if path.exists() {
            return Some(path.to_path_buf());
        }
    }
    which(name).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_yields_defaults() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let settings = Settings::load_from(&dir.path().join("absent.toml"));
        assert!(settings.is_ok_and(|s| s == Settings::default()));
    }

    #[test]
    fn test_load_from_file() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let path = dir.path().join("rtd-build.toml");
        if fs::write(
            &path,
            "sphinx_version = \">=7,<9\"\nenv_root = \"/var/tmp/rtd\"\n",
        )
        .is_err()
        {
            return;
        }

        let Ok(settings) = Settings::load_from(&path) else {
            assert!(false, "settings should parse");
            return;
        };
        assert_eq!(settings.sphinx_requirement(), "Sphinx>=7,<9");
        assert_eq!(settings.env_root(), PathBuf::from("/var/tmp/rtd"));
    }

    #[test]
    fn test_invalid_file_reports_path() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        let path = dir.path().join("rtd-build.toml");
        if fs::write(&path, "sphinx_version = [").is_err() {
            return;
        }
        let result = Settings::load_from(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }

    #[test]
    fn test_default_sphinx_requirement_is_pinned() {
        let settings = Settings::default();
        assert_eq!(settings.sphinx_requirement(), "Sphinx==7.4.7");

        let settings = Settings {
            sphinx_version: Some("6.2.1".to_string()),
            ..Default::default()
        };
        assert_eq!(settings.sphinx_requirement(), "Sphinx==6.2.1");
    }

    #[test]
    fn test_configured_tool_path_must_exist() {
        let settings = Settings {
            uv_path: Some(PathBuf::from("/nonexistent/rtd-build/uv")),
            ..Default::default()
        };
        assert_ne!(
            settings.resolve_uv(),
            Some(PathBuf::from("/nonexistent/rtd-build/uv"))
        );
    }
}
