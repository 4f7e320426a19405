//! Field validators.
//!
//! Each validator checks one raw manifest value, returning the normalized
//! value or a [`ValidationError`] carrying the validator's code. They hold no
//! state, so a failure can always be attributed to the field being checked.

use crate::errors::{ErrorCode, ValidationError};
use serde_yaml::Value;
use std::fmt::Display;
use std::path::{Component, Path, PathBuf};
use url::Url;

/// Schemes that may omit the host part
const HOST_OPTIONAL_SCHEMES: &[&str] = &["file"];

/// Short human rendering of a raw value for error messages
pub fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => format!("\"{}\"", s),
        other => serde_yaml::to_string(other)
            .map(|s| s.trim_end().replace('\n', " "))
            .unwrap_or_else(|_| "<unprintable>".to_string()),
    }
}

/// Accepts `true`, `false`, `0` and `1`; truthy strings are rejected
pub fn validate_bool(value: &Value) -> Result<bool, ValidationError> {
    match value {
        Value::Bool(b) => Ok(*b),
        Value::Number(n) => match n.as_i64() {
            Some(0) => Ok(false),
            Some(1) => Ok(true),
            _ => Err(ValidationError::new(render_value(value), ErrorCode::InvalidBool)),
        },
        _ => Err(ValidationError::new(render_value(value), ErrorCode::InvalidBool)),
    }
}

pub fn validate_choice<T>(value: &T, choices: &[T]) -> Result<T, ValidationError>
where
    T: PartialEq + Clone + Display,
{
    if choices.contains(value) {
        return Ok(value.clone());
    }
    let rendered: Vec<String> = choices.iter().map(ToString::to_string).collect();
    Err(ValidationError::invalid_choice(value.to_string(), &rendered))
}

pub fn validate_list(value: &Value) -> Result<&[Value], ValidationError> {
    match value {
        Value::Sequence(items) => Ok(items),
        _ => Err(ValidationError::new(render_value(value), ErrorCode::InvalidList)),
    }
}

pub fn validate_string(value: &Value) -> Result<String, ValidationError> {
    match value {
        Value::String(s) => Ok(s.clone()),
        _ => Err(ValidationError::new(render_value(value), ErrorCode::InvalidString)),
    }
}

/// Resolve `value` against `base_path` and require that it exists.
///
/// A leading `~` expands to the home directory. The result is absolute and
/// free of `.` and `..` components.
pub fn validate_path(value: &Value, base_path: &Path) -> Result<PathBuf, ValidationError> {
    let raw = validate_string(value)?;
    let path = resolve_path(&raw, base_path);
    if !path.exists() {
        return Err(ValidationError::new(
            path.display().to_string(),
            ErrorCode::InvalidPath,
        ));
    }
    Ok(path)
}

pub fn validate_directory(value: &Value, base_path: &Path) -> Result<PathBuf, ValidationError> {
    let path = validate_path(value, base_path)?;
    if !path.is_dir() {
        return Err(ValidationError::new(
            path.display().to_string(),
            ErrorCode::InvalidDirectory,
        ));
    }
    Ok(path)
}

pub fn validate_file(value: &Value, base_path: &Path) -> Result<PathBuf, ValidationError> {
    let path = validate_path(value, base_path)?;
    if !path.is_file() {
        return Err(ValidationError::new(
            path.display().to_string(),
            ErrorCode::InvalidFile,
        ));
    }
    Ok(path)
}

/// Require a scheme, and a host unless the scheme is in the host-optional list
pub fn validate_url(value: &Value) -> Result<String, ValidationError> {
    let raw = validate_string(value)?;
    let invalid = || ValidationError::new(render_value(value), ErrorCode::InvalidUrl);

    let parsed = Url::parse(&raw).map_err(|_| invalid())?;
    if HOST_OPTIONAL_SCHEMES.contains(&parsed.scheme()) {
        return Ok(raw);
    }

    // The url crate repairs `http:///path` into `http://path/`, so the
    // authority is checked on the raw text as well.
    let after_scheme = raw.split_once(':').map_or("", |(_, rest)| rest);
    let authority = after_scheme
        .strip_prefix("//")
        .map(|rest| rest.split(['/', '?', '#']).next().unwrap_or(""))
        .unwrap_or("");
    let host = authority.rsplit('@').next().unwrap_or("");
    if host.is_empty() || parsed.host_str().map_or(true, str::is_empty) {
        return Err(invalid());
    }
    Ok(raw)
}

/// Join `raw` onto `base_path` and make the result absolute and normalized
pub fn resolve_path(raw: &str, base_path: &Path) -> PathBuf {
    let expanded = expand_home(raw);
    let joined = if expanded.is_absolute() {
        expanded
    } else {
        base_path.join(expanded)
    };
    absolute_path(&joined)
}

/// Anchor a relative path at the current directory and normalize it
pub fn absolute_path(path: &Path) -> PathBuf {
    if path.is_absolute() {
        return normalize_path(path);
    }
    let anchored = std::env::current_dir()
        .map(|cwd| cwd.join(path))
        .unwrap_or_else(|_| path.to_path_buf());
    normalize_path(&anchored)
}

fn expand_home(raw: &str) -> PathBuf {
    if raw == "~" || raw.starts_with("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(raw.trim_start_matches('~').trim_start_matches('/'));
        }
    }
    PathBuf::from(raw)
}

/// Lexically remove `.` and `..` components
pub fn normalize_path(path: &Path) -> PathBuf {
    let mut components: Vec<Component<'_>> = Vec::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if matches!(components.last(), Some(Component::Normal(_))) {
                    components.pop();
                } else if components.is_empty() {
                    components.push(component);
                }
            }
            c => components.push(c),
        }
    }
    components.iter().collect()
}
