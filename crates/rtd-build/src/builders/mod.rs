//! Builder implementations and the registry that picks one per build type.

pub mod sphinx;

use crate::errors::BuildError;
use rtd_config::Settings;
use rtd_manifest::{BuilderType, ValidatedBuild};

pub use sphinx::SphinxBuilder;

/// Lifecycle of one build target.
///
/// [`Builder::build`] runs setup, the html render, the optional steps and
/// finally cleanup. Cleanup runs even when an earlier step failed, and the
/// earlier failure is the one reported.
pub trait Builder {
    fn config(&self) -> &ValidatedBuild;

    /// Provision the environment and install dependencies
    fn setup(&mut self) -> Result<(), BuildError>;

    /// Render html into `<output_base>/<name>/html`
    fn build_html(&mut self) -> Result<(), BuildError>;

    /// Render the search index; best-effort
    fn build_search_data(&mut self) -> Result<(), BuildError> {
        Ok(())
    }

    /// Render the additional formats the manifest asks for; best-effort
    fn build_formats(&mut self) -> Result<(), BuildError> {
        Ok(())
    }

    /// Release the environment
    fn cleanup(&mut self) -> Result<(), BuildError>;

    fn build(&mut self) -> Result<(), BuildError> {
        let result = self
            .setup()
            .and_then(|()| self.build_html())
            .and_then(|()| self.build_search_data())
            .and_then(|()| self.build_formats());
        let cleanup = self.cleanup();
        result.and(cleanup)
    }
}

/// Builder for the validated `type` of `config`
pub fn builder_for(config: &ValidatedBuild, settings: &Settings) -> Box<dyn Builder> {
    match config.build_type() {
        BuilderType::Sphinx => Box::new(SphinxBuilder::new(config.clone(), settings.clone())),
    }
}
