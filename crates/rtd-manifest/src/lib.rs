//! Documentation build manifests
//!
//! Finds `readthedocs.yml` files in a project tree, splits them into
//! documents and validates each document into a build target. Validation
//! errors carry a stable code plus the file and document they came from.

pub mod build_config;
pub mod errors;
pub mod find;
pub mod parser;
pub mod project;
pub mod validation;

pub use build_config::{
    BuildConfig, BuilderType, CondaSettings, EnvConfig, Format, PythonSettings, PythonVersion,
    ValidatedBuild,
};
pub use errors::{ErrorCode, InvalidConfig, ParseError, ValidationError};
pub use find::{find_all, find_one, CONFIG_FILENAMES};
pub use parser::parse;
pub use project::{load_build_configs, ProjectConfig};
