//! Disposable Python environments for documentation builds
//!
//! Each build gets its own environment in a fresh temporary directory,
//! created with `uv`, the host interpreter's `venv` module or `conda`.
//! Commands run inside it are launched through the environment's interpreter.

pub mod environment;
pub mod errors;
pub mod paths;

pub use environment::{CommandOutput, EnvironmentOptions, IsolatedEnvironment, Provisioner};
pub use errors::EnvironmentError;
