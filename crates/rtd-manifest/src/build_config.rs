//! Configuration of a single documentation build target.
//!
//! A [`BuildConfig`] holds one raw manifest document together with where it
//! came from. [`BuildConfig::validate`] turns it into a [`ValidatedBuild`],
//! which is read-only from then on.

use crate::errors::{ErrorCode, InvalidConfig, ValidationError};
use crate::validation::{
    absolute_path, render_value, resolve_path, validate_bool, validate_choice,
    validate_directory, validate_file, validate_list, validate_string,
};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_yaml::{Mapping, Value};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const NAME_PATTERN: &str = r"^[-_.0-9a-zA-Z]+$";

static NAME_REGEX: Lazy<Option<Regex>> = Lazy::new(|| Regex::new(NAME_PATTERN).ok());

const KNOWN_KEYS: &[&str] = &[
    "name",
    "type",
    "base",
    "python",
    "conda",
    "requirements_file",
    "conf_file",
    "formats",
];

/// Renderer toolchain a build target is produced with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BuilderType {
    Sphinx,
}

impl BuilderType {
    pub const ALL: &'static [BuilderType] = &[BuilderType::Sphinx];

    pub fn as_str(self) -> &'static str {
        match self {
            BuilderType::Sphinx => "sphinx",
        }
    }
}

impl fmt::Display for BuilderType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BuilderType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let names: Vec<&str> = BuilderType::ALL.iter().map(|t| t.as_str()).collect();
        let name = validate_choice(&s, &names)?;
        BuilderType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str() == name)
            .ok_or_else(|| ValidationError::new(s, ErrorCode::InvalidChoice))
    }
}

/// Additional output formats a build target may request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Htmlzip,
    Pdf,
    Epub,
}

impl Format {
    /// Accepted manifest values; `none` means no extra formats
    pub const CHOICES: &'static [&'static str] = &["none", "htmlzip", "pdf", "epub"];

    pub fn as_str(self) -> &'static str {
        match self {
            Format::Htmlzip => "htmlzip",
            Format::Pdf => "pdf",
            Format::Epub => "epub",
        }
    }

    fn from_choice(choice: &str) -> Option<Format> {
        match choice {
            "htmlzip" => Some(Format::Htmlzip),
            "pdf" => Some(Format::Pdf),
            "epub" => Some(Format::Epub),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Python interpreter version requested by a manifest, e.g. `3` or `2.7`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PythonVersion {
    major: u8,
    minor: Option<u8>,
}

impl PythonVersion {
    pub const SUPPORTED: &'static [PythonVersion] = &[
        PythonVersion::new(2, None),
        PythonVersion::new(2, Some(7)),
        PythonVersion::new(3, None),
        PythonVersion::new(3, Some(6)),
        PythonVersion::new(3, Some(7)),
        PythonVersion::new(3, Some(8)),
        PythonVersion::new(3, Some(9)),
    ];

    pub const DEFAULT: PythonVersion = PythonVersion::new(3, None);

    pub const fn new(major: u8, minor: Option<u8>) -> Self {
        PythonVersion { major, minor }
    }

    pub fn major(self) -> u8 {
        self.major
    }

    pub fn minor(self) -> Option<u8> {
        self.minor
    }

    pub fn as_f64(self) -> f64 {
        f64::from(self.major) + f64::from(self.minor.unwrap_or(0)) / 10.0
    }

    /// Numbers and numeral strings such as `3`, `2.7` or `"3.0"`.
    ///
    /// A zero minor part compares equal to the bare major version.
    fn coerce(value: &Value) -> Option<PythonVersion> {
        let text = match value {
            Value::Number(n) => n.to_string(),
            Value::String(s) => s.trim().to_string(),
            _ => return None,
        };
        let (major, minor) = match text.split_once('.') {
            Some((major, minor)) => (major, Some(minor.trim_end_matches('0'))),
            None => (text.as_str(), None),
        };
        let major = major.parse::<u8>().ok()?;
        let minor = match minor {
            None | Some("") => None,
            Some(minor) if minor.len() == 1 => Some(minor.parse::<u8>().ok()?),
            Some(_) => return None,
        };
        Some(PythonVersion::new(major, minor))
    }
}

impl Default for PythonVersion {
    fn default() -> Self {
        PythonVersion::DEFAULT
    }
}

impl fmt::Display for PythonVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.minor {
            Some(minor) => write!(f, "{}.{}", self.major, minor),
            None => write!(f, "{}", self.major),
        }
    }
}

/// Normalized `python` section
#[derive(Debug, Clone, PartialEq)]
pub struct PythonSettings {
    pub use_system_site_packages: bool,
    pub pip_install: bool,
    pub extra_requirements: Vec<String>,
    pub setup_py_install: bool,
    pub setup_py_path: PathBuf,
    pub version: PythonVersion,
}

impl PythonSettings {
    fn defaults(base: &Path) -> Self {
        PythonSettings {
            use_system_site_packages: false,
            pip_install: false,
            extra_requirements: Vec::new(),
            setup_py_install: false,
            setup_py_path: base.join("setup.py"),
            version: PythonVersion::DEFAULT,
        }
    }
}

/// Normalized `conda` section
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CondaSettings {
    pub file: PathBuf,
}

/// Build-wide settings supplied by the caller rather than the manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    /// Root of the rendered output; every build target gets a subdirectory
    pub output_base: PathBuf,
    /// Fallback for a manifest without `name`
    pub name: Option<String>,
    /// Fallback for a manifest without `type`
    pub build_type: Option<String>,
}

impl EnvConfig {
    pub fn new(output_base: impl Into<PathBuf>) -> Self {
        EnvConfig {
            output_base: output_base.into(),
            name: None,
            build_type: None,
        }
    }
}

/// One raw manifest document plus its provenance, not yet validated.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    env: EnvConfig,
    raw: Mapping,
    source_file: PathBuf,
    source_position: usize,
}

/// A fully normalized build target.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedBuild {
    name: String,
    build_type: BuilderType,
    base: PathBuf,
    output_base: PathBuf,
    python: PythonSettings,
    conda: Option<CondaSettings>,
    requirements_file: Option<PathBuf>,
    conf_file: Option<PathBuf>,
    formats: Vec<Format>,
    source_file: PathBuf,
    source_position: usize,
}

impl BuildConfig {
    pub fn new(
        env: EnvConfig,
        raw: Mapping,
        source_file: impl Into<PathBuf>,
        source_position: usize,
    ) -> Self {
        BuildConfig {
            env,
            raw,
            source_file: source_file.into(),
            source_position,
        }
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn source_position(&self) -> usize {
        self.source_position
    }

    /// Validate every field, in dependency order.
    ///
    /// The first failing field aborts validation.
    pub fn validate(&self) -> Result<ValidatedBuild, InvalidConfig> {
        for key in self.raw.keys() {
            let known = key.as_str().is_some_and(|k| KNOWN_KEYS.contains(&k));
            if !known {
                tracing::debug!(
                    "{} [{}]: ignoring unknown key {}",
                    self.source_file.display(),
                    self.source_position,
                    render_value(key)
                );
            }
        }

        let output_base = self.validate_output_base();
        let name = self.validate_name()?;
        let build_type = self.validate_type()?;
        let base = self.validate_base()?;
        let python = self.validate_python(&base)?;
        let formats = self.validate_formats()?;
        let conda = self.validate_conda()?;
        let requirements_file = self.validate_optional_file("requirements_file")?;
        let conf_file = self.validate_optional_file("conf_file")?;

        Ok(ValidatedBuild {
            name,
            build_type,
            base,
            output_base,
            python,
            conda,
            requirements_file,
            conf_file,
            formats,
            source_file: self.source_file.clone(),
            source_position: self.source_position,
        })
    }

    pub fn validate_output_base(&self) -> PathBuf {
        absolute_path(&self.env.output_base)
    }

    pub fn validate_name(&self) -> Result<String, InvalidConfig> {
        let name = match self.present("name") {
            Some(value) => validate_string(value)
                .map_err(|err| self.error(ErrorCode::NameInvalid, "name", err.message))?,
            None => match self.env.name {
                Some(ref name) => name.clone(),
                None => {
                    return Err(self.error(
                        ErrorCode::NameRequired,
                        "name",
                        "Missing key \"name\"",
                    ))
                }
            },
        };
        if !NAME_REGEX.as_ref().is_some_and(|re| re.is_match(&name)) {
            return Err(self.error(
                ErrorCode::NameInvalid,
                "name",
                format!(
                    "Invalid name \"{}\". Valid values must match {}",
                    name, NAME_PATTERN
                ),
            ));
        }
        Ok(name)
    }

    pub fn validate_type(&self) -> Result<BuilderType, InvalidConfig> {
        let build_type = match self.present("type") {
            Some(value) => self.catch("type", validate_string(value))?,
            None => match self.env.build_type {
                Some(ref build_type) => build_type.clone(),
                None => {
                    return Err(self.error(
                        ErrorCode::TypeRequired,
                        "type",
                        "Missing key \"type\"",
                    ))
                }
            },
        };
        self.catch("type", build_type.parse::<BuilderType>())
    }

    /// Defaults to the manifest's own directory
    pub fn validate_base(&self) -> Result<PathBuf, InvalidConfig> {
        let source_dir = self.source_dir();
        let Some(value) = self.present("base") else {
            if source_dir.is_dir() {
                return Ok(source_dir);
            }
            return Err(self.error(
                ErrorCode::BaseNotADirectory,
                "base",
                format!("{} is not a directory", source_dir.display()),
            ));
        };
        validate_directory(value, &source_dir).map_err(|err| {
            let code = match err.code {
                ErrorCode::InvalidString => ErrorCode::BaseInvalid,
                _ => ErrorCode::BaseNotADirectory,
            };
            self.error(code, "base", err.message)
        })
    }

    /// `base` must already be validated; `setup_py_path` resolves against it
    pub fn validate_python(&self, base: &Path) -> Result<PythonSettings, InvalidConfig> {
        let mut python = PythonSettings::defaults(base);
        let Some(raw) = self.present("python") else {
            return Ok(python);
        };
        let Value::Mapping(section) = raw else {
            return Err(self.error(
                ErrorCode::PythonInvalid,
                "python",
                format!("expected a mapping, got {}", render_value(raw)),
            ));
        };

        if let Some(value) = present(section, "use_system_site_packages") {
            python.use_system_site_packages =
                self.catch("python.use_system_site_packages", validate_bool(value))?;
        }
        if let Some(value) = present(section, "pip_install") {
            python.pip_install = self.catch("python.pip_install", validate_bool(value))?;
        }
        if let Some(value) = present(section, "extra_requirements") {
            let items = self.catch("python.extra_requirements", validate_list(value))?;
            python.extra_requirements = items
                .iter()
                .map(|item| self.catch("python.extra_requirements", validate_string(item)))
                .collect::<Result<_, _>>()?;
        }
        if let Some(value) = present(section, "setup_py_install") {
            python.setup_py_install = self.catch("python.setup_py_install", validate_bool(value))?;
        }
        if let Some(value) = present(section, "setup_py_path") {
            python.setup_py_path = self.catch("python.setup_py_path", validate_file(value, base))?;
        }
        if let Some(value) = present(section, "version") {
            let version = PythonVersion::coerce(value).ok_or_else(|| {
                let choices: Vec<String> =
                    PythonVersion::SUPPORTED.iter().map(ToString::to_string).collect();
                ValidationError::invalid_choice(render_value(value), &choices)
            });
            let version = version
                .and_then(|v| validate_choice(&v, PythonVersion::SUPPORTED));
            python.version = self.catch("python.version", version)?;
        }
        Ok(python)
    }

    /// `[none]` and an absent key both mean no extra formats
    pub fn validate_formats(&self) -> Result<Vec<Format>, InvalidConfig> {
        let Some(value) = self.present("formats") else {
            return Ok(Vec::new());
        };
        let items = self.catch("formats", validate_list(value))?;
        let mut formats = Vec::new();
        for item in items {
            let choice = self.catch("formats", validate_string(item))?;
            let choice = self.catch("formats", validate_choice(&choice.as_str(), Format::CHOICES))?;
            if let Some(format) = Format::from_choice(choice) {
                if !formats.contains(&format) {
                    formats.push(format);
                }
            }
        }
        Ok(formats)
    }

    pub fn validate_conda(&self) -> Result<Option<CondaSettings>, InvalidConfig> {
        let Some(raw) = self.present("conda") else {
            return Ok(None);
        };
        let Value::Mapping(section) = raw else {
            return Err(self.error(
                ErrorCode::CondaInvalid,
                "conda",
                format!("expected a mapping, got {}", render_value(raw)),
            ));
        };
        let Some(file) = present(section, "file") else {
            return Err(self.error(ErrorCode::CondaInvalid, "conda.file", "Missing key \"file\""));
        };
        let file = self.catch("conda.file", validate_file(file, &self.source_dir()))?;
        Ok(Some(CondaSettings { file }))
    }

    /// `requirements_file` and `conf_file` resolve against the manifest directory
    pub fn validate_optional_file(&self, key: &str) -> Result<Option<PathBuf>, InvalidConfig> {
        match self.present(key) {
            Some(value) => self
                .catch(key, validate_file(value, &self.source_dir()))
                .map(Some),
            None => Ok(None),
        }
    }

    fn source_dir(&self) -> PathBuf {
        let parent = self.source_file.parent().unwrap_or_else(|| Path::new(""));
        resolve_path(".", parent)
    }

    /// A key set to `null` counts as absent
    fn present(&self, key: &str) -> Option<&Value> {
        present(&self.raw, key)
    }

    fn error(&self, code: ErrorCode, key: &str, message: impl Into<String>) -> InvalidConfig {
        InvalidConfig::for_document(code, key, message, &self.source_file, self.source_position)
    }

    fn catch<T>(&self, key: &str, result: Result<T, ValidationError>) -> Result<T, InvalidConfig> {
        result.map_err(|err| self.error(err.code, key, err.message))
    }
}

fn present<'a>(mapping: &'a Mapping, key: &str) -> Option<&'a Value> {
    mapping.get(key).filter(|value| !value.is_null())
}

impl ValidatedBuild {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn build_type(&self) -> BuilderType {
        self.build_type
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn output_base(&self) -> &Path {
        &self.output_base
    }

    pub fn python(&self) -> &PythonSettings {
        &self.python
    }

    pub fn conda(&self) -> Option<&CondaSettings> {
        self.conda.as_ref()
    }

    pub fn requirements_file(&self) -> Option<&Path> {
        self.requirements_file.as_deref()
    }

    pub fn conf_file(&self) -> Option<&Path> {
        self.conf_file.as_deref()
    }

    pub fn formats(&self) -> &[Format] {
        &self.formats
    }

    pub fn source_file(&self) -> &Path {
        &self.source_file
    }

    pub fn source_position(&self) -> usize {
        self.source_position
    }

    /// `<output_base>/<name>/<format>`
    pub fn output_dir(&self, format: &str) -> PathBuf {
        self.output_base.join(&self.name).join(format)
    }

    pub(crate) fn set_output_base(&mut self, output_base: PathBuf) {
        self.output_base = output_base;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn mapping(yaml: &str) -> Mapping {
        serde_yaml::from_str(yaml).unwrap_or_default()
    }

    fn env() -> EnvConfig {
        EnvConfig::new("/tmp")
    }

    /// A project directory with `readthedocs.yml` and `docs/`
    fn project() -> Option<TempDir> {
        let dir = TempDir::new().ok()?;
        fs::write(dir.path().join("readthedocs.yml"), "name: docs\ntype: sphinx\n").ok()?;
        fs::create_dir(dir.path().join("docs")).ok()?;
        Some(dir)
    }

    fn build_in(dir: &TempDir, yaml: &str) -> BuildConfig {
        BuildConfig::new(env(), mapping(yaml), dir.path().join("readthedocs.yml"), 0)
    }

    #[test]
    fn test_empty_config_fails_on_name_first() {
        let Some(dir) = project() else {
            return;
        };
        let result = build_in(&dir, "{}").validate();
        assert!(result.is_err_and(|e| e.code == ErrorCode::NameRequired));
    }

    #[test]
    fn test_name_must_match_pattern() {
        let Some(dir) = project() else {
            return;
        };
        let result = build_in(&dir, "name: with/slashes").validate_name();
        assert!(result.is_err_and(|e| e.code == ErrorCode::NameInvalid));

        let result = build_in(&dir, "name: 42").validate_name();
        assert!(result.is_err_and(|e| e.code == ErrorCode::NameInvalid));

        let result = build_in(&dir, "name: my-docs_v1.0").validate_name();
        assert!(result.is_ok_and(|n| n == "my-docs_v1.0"));
    }

    #[test]
    fn test_name_and_type_fall_back_to_env() {
        let Some(dir) = project() else {
            return;
        };
        let mut env = env();
        env.name = Some("project".to_string());
        env.build_type = Some("sphinx".to_string());
        let build = BuildConfig::new(env, Mapping::new(), dir.path().join("readthedocs.yml"), 0);
        let Ok(validated) = build.validate() else {
            assert!(false, "fallback name and type should validate");
            return;
        };
        assert_eq!(validated.name(), "project");
        assert_eq!(validated.build_type(), BuilderType::Sphinx);
    }

    #[test]
    fn test_type_required_and_checked() {
        let Some(dir) = project() else {
            return;
        };
        let result = build_in(&dir, "name: docs").validate_type();
        assert!(result.is_err_and(|e| e.code == ErrorCode::TypeRequired));

        let result = build_in(&dir, "type: unknown").validate_type();
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidChoice
            && e.key.as_deref() == Some("type")
            && e.message.contains("sphinx")));
    }

    #[test]
    fn test_minimal_config_validates() {
        let Some(dir) = project() else {
            return;
        };
        let Ok(validated) = build_in(&dir, "name: docs\ntype: sphinx").validate() else {
            assert!(false, "minimal config should validate");
            return;
        };
        assert_eq!(validated.build_type(), BuilderType::Sphinx);
        assert_eq!(validated.base(), dir.path());
        assert_eq!(validated.output_base(), Path::new("/tmp"));
        assert_eq!(validated.python().version, PythonVersion::DEFAULT);
        assert_eq!(
            validated.python().setup_py_path,
            dir.path().join("setup.py")
        );
        assert!(validated.formats().is_empty());
        assert_eq!(validated.output_dir("html"), Path::new("/tmp/docs/html"));
    }

    #[test]
    fn test_revalidation_is_deterministic() {
        let Some(dir) = project() else {
            return;
        };
        let build = build_in(&dir, "name: docs\ntype: sphinx\nbase: docs");
        assert_eq!(build.validate(), build.validate());
    }

    #[test]
    fn test_base_resolves_relative_to_manifest() {
        let Ok(dir) = TempDir::new() else {
            return;
        };
        if fs::create_dir_all(dir.path().join("configs")).is_err()
            || fs::create_dir_all(dir.path().join("docs")).is_err()
        {
            return;
        }
        let build = BuildConfig::new(
            env(),
            mapping("base: ../docs"),
            dir.path().join("configs").join("readthedocs.yml"),
            0,
        );
        assert!(build.validate_base().is_ok_and(|b| b == dir.path().join("docs")));
    }

    #[test]
    fn test_invalid_base() {
        let Some(dir) = project() else {
            return;
        };
        let result = build_in(&dir, "base: 1").validate_base();
        assert!(result.is_err_and(|e| e.code == ErrorCode::BaseInvalid));

        let result = build_in(&dir, "base: missing").validate_base();
        assert!(result.is_err_and(|e| e.code == ErrorCode::BaseNotADirectory));

        let result = build_in(&dir, "base: readthedocs.yml").validate_base();
        assert!(result.is_err_and(|e| e.code == ErrorCode::BaseNotADirectory));
    }

    #[test]
    fn test_python_must_be_mapping() {
        let Some(dir) = project() else {
            return;
        };
        let result = build_in(&dir, "python: yes please").validate_python(dir.path());
        assert!(result.is_err_and(|e| e.code == ErrorCode::PythonInvalid));
    }

    #[test]
    fn test_python_section() {
        let Some(dir) = project() else {
            return;
        };
        if fs::write(dir.path().join("docs").join("setup.py"), "").is_err() {
            return;
        }
        let yaml = "
python:
  use_system_site_packages: true
  pip_install: 1
  extra_requirements: [docs, tests]
  setup_py_install: false
  setup_py_path: docs/setup.py
  version: 3.8
";
        let Ok(python) = build_in(&dir, yaml).validate_python(dir.path()) else {
            assert!(false, "python section should validate");
            return;
        };
        assert!(python.use_system_site_packages);
        assert!(python.pip_install);
        assert_eq!(python.extra_requirements, vec!["docs", "tests"]);
        assert!(!python.setup_py_install);
        assert_eq!(python.setup_py_path, dir.path().join("docs").join("setup.py"));
        assert_eq!(python.version, PythonVersion::new(3, Some(8)));
    }

    #[test]
    fn test_python_field_errors_carry_dotted_key() {
        let Some(dir) = project() else {
            return;
        };
        let result = build_in(&dir, "python: {pip_install: 'yes'}").validate_python(dir.path());
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidBool
            && e.key.as_deref() == Some("python.pip_install")));

        let result =
            build_in(&dir, "python: {extra_requirements: docs}").validate_python(dir.path());
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidList));

        let result =
            build_in(&dir, "python: {extra_requirements: [1]}").validate_python(dir.path());
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidString));

        let result = build_in(&dir, "python: {setup_py_path: nope.py}").validate_python(dir.path());
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidPath
            && e.source_file == Some(dir.path().join("readthedocs.yml"))
            && e.source_position == Some(0)));
    }

    #[test]
    fn test_python_version_coercion() {
        let Some(dir) = project() else {
            return;
        };
        let version = |yaml: &str| {
            build_in(&dir, yaml)
                .validate_python(dir.path())
                .map(|p| p.version)
        };

        let parsed = version("python: {version: \"2.7\"}");
        assert!(parsed.is_ok_and(|v| v == PythonVersion::new(2, Some(7))
            && (v.as_f64() - 2.7).abs() < f64::EPSILON));
        assert_eq!(version("python: {version: \"3\"}"), Ok(PythonVersion::new(3, None)));
        assert_eq!(version("python: {version: 2}"), Ok(PythonVersion::new(2, None)));
        assert_eq!(version("python: {version: 3.0}"), Ok(PythonVersion::new(3, None)));

        let result = version("python: {version: 4}");
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidChoice));
        let result = version("python: {version: latest}");
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidChoice
            && e.key.as_deref() == Some("python.version")));
    }

    #[test]
    fn test_formats() {
        let Some(dir) = project() else {
            return;
        };
        let result = build_in(&dir, "formats: [none]").validate_formats();
        assert!(result.is_ok_and(|f| f.is_empty()));

        let result = build_in(&dir, "formats: [epub, pdf, epub]").validate_formats();
        assert_eq!(result, Ok(vec![Format::Epub, Format::Pdf]));

        let result = build_in(&dir, "formats: [docx]").validate_formats();
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidChoice));

        let result = build_in(&dir, "formats: epub").validate_formats();
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidList));
    }

    #[test]
    fn test_conda_and_files_resolve_against_manifest_dir() {
        let Some(dir) = project() else {
            return;
        };
        for file in ["environment.yml", "requirements.txt"] {
            if fs::write(dir.path().join(file), "").is_err() {
                return;
            }
        }
        if fs::write(dir.path().join("docs").join("conf.py"), "").is_err() {
            return;
        }

        let build = build_in(
            &dir,
            "conda: {file: environment.yml}\nrequirements_file: requirements.txt\nconf_file: docs/conf.py",
        );
        assert!(build
            .validate_conda()
            .is_ok_and(|c| c.is_some_and(|c| c.file == dir.path().join("environment.yml"))));
        assert!(build
            .validate_optional_file("requirements_file")
            .is_ok_and(|f| f == Some(dir.path().join("requirements.txt"))));
        assert!(build
            .validate_optional_file("conf_file")
            .is_ok_and(|f| f == Some(dir.path().join("docs").join("conf.py"))));

        let result = build_in(&dir, "conda: {}").validate_conda();
        assert!(result.is_err_and(|e| e.code == ErrorCode::CondaInvalid));
        let result = build_in(&dir, "requirements_file: docs").validate_optional_file("requirements_file");
        assert!(result.is_err_and(|e| e.code == ErrorCode::InvalidFile));
    }
}
