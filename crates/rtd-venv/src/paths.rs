//! Platform-specific locations inside a Python environment.

use crate::errors::EnvironmentError;
use std::fs;
use std::path::{Path, PathBuf};

/// "Scripts" on Windows, "bin" on Unix
#[cfg(windows)]
pub const PYTHON_BIN_DIR: &str = "Scripts";
#[cfg(not(windows))]
pub const PYTHON_BIN_DIR: &str = "bin";

#[cfg(not(windows))]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python3", "python"];
#[cfg(windows)]
const PYTHON_EXE_CANDIDATES: &[&str] = &["python.exe", "python3.exe"];

/// Directory holding the environment's console scripts
pub fn bin_dir(env_path: &Path) -> PathBuf {
    env_path.join(PYTHON_BIN_DIR)
}

/// Locate the interpreter of the environment at `env_path`.
///
/// Virtualenvs keep it in the bin directory. Conda environments on Windows
/// keep it at the prefix root, so that is searched second.
pub fn resolve_python_exe(env_path: &Path) -> Result<PathBuf, EnvironmentError> {
    if !env_path.is_dir() {
        return Err(EnvironmentError::NotFound(env_path.to_path_buf()));
    }

    let bin = bin_dir(env_path);
    for dir in [bin.as_path(), env_path] {
        for exe in PYTHON_EXE_CANDIDATES {
            let candidate = dir.join(exe);
            if candidate.is_file() {
                return Ok(candidate);
            }
        }
    }

    // Fallback: any python-like executable, e.g. `python3.9`
    if let Ok(entries) = fs::read_dir(&bin) {
        let mut candidates: Vec<PathBuf> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| {
                p.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| name.starts_with("python"))
                    && p.is_file()
            })
            .collect();
        candidates.sort();
        if let Some(candidate) = candidates.into_iter().next() {
            return Ok(candidate);
        }
    }

    Err(EnvironmentError::PathResolution(format!(
        "Python executable not found in {}",
        bin.display()
    )))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn mock_env(exe: &str) -> Option<TempDir> {
        let dir = TempDir::new().ok()?;
        let bin = bin_dir(dir.path());
        fs::create_dir_all(&bin).ok()?;
        fs::write(bin.join(exe), "").ok()?;
        Some(dir)
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_python_exe_prefers_python3() {
        let Some(env) = mock_env("python3") else {
            return;
        };
        let _ = fs::write(bin_dir(env.path()).join("python"), "");
        let result = resolve_python_exe(env.path());
        assert!(result.is_ok_and(|p| p.ends_with("bin/python3")));
    }

    #[test]
    #[cfg(not(windows))]
    fn test_resolve_python_exe_versioned_fallback() {
        let Some(env) = mock_env("python3.9") else {
            return;
        };
        let result = resolve_python_exe(env.path());
        assert!(result.is_ok_and(|p| p.ends_with("bin/python3.9")));
    }

    #[test]
    fn test_resolve_python_exe_missing() {
        let Some(env) = mock_env("pip") else {
            return;
        };
        let result = resolve_python_exe(env.path());
        assert!(matches!(result, Err(EnvironmentError::PathResolution(_))));

        let result = resolve_python_exe(&env.path().join("absent"));
        assert!(matches!(result, Err(EnvironmentError::NotFound(_))));
    }
}
