//! Runs every build of a project, one after the other.

use crate::builders::builder_for;
use crate::errors::BuildError;
use rtd_config::Settings;
use rtd_logger as logger;
use rtd_manifest::{EnvConfig, ProjectConfig};
use std::path::{Path, PathBuf};

/// Output folder used when the command line does not name one
pub const DEFAULT_OUTDIR: &str = "_readthedocs_build";

/// A finished build and where its html went
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildReport {
    pub name: String,
    pub html_dir: PathBuf,
}

/// Build every target in discovery order, stopping at the first failure.
pub fn build_project(
    project: &ProjectConfig,
    settings: &Settings,
) -> Result<Vec<BuildReport>, BuildError> {
    let mut reports = Vec::with_capacity(project.len());
    for config in project {
        logger::set_current_build(Some(config.name().to_string()));
        logger::info(&format!(
            "Building {} from {} [{}]",
            config.name(),
            config.source_file().display(),
            config.source_position()
        ));
        let mut builder = builder_for(config, settings);
        let result = builder.build();
        logger::set_current_build(None);
        result?;

        reports.push(BuildReport {
            name: config.name().to_string(),
            html_dir: config.output_dir("html"),
        });
    }
    Ok(reports)
}

/// Load the project under `root` and point its output at `outdir`
pub fn load_project(root: &Path, outdir: &Path) -> Result<ProjectConfig, BuildError> {
    let env = EnvConfig::new(outdir);
    let mut project = ProjectConfig::load(root, &env)?;
    project.set_output_base(outdir);
    logger::debug(&format!(
        "Loaded {} build(s), output in {}",
        project.len(),
        outdir.display()
    ));
    Ok(project)
}
