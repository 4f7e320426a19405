//! rtd-build: build documentation projects described by `readthedocs.yml`
//!
//! The library side holds the build driver so it can be tested without
//! spawning the binary.

pub mod builders;
pub mod common;
pub mod driver;
pub mod errors;

pub use common::GlobalOpts;
pub use errors::BuildError;
