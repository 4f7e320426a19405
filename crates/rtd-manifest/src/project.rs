//! Project-level loading: discovery, parsing and validation of every build.

use crate::build_config::{BuildConfig, EnvConfig, ValidatedBuild};
use crate::errors::{ErrorCode, InvalidConfig};
use crate::find::{find_all, CONFIG_FILENAMES};
use crate::parser::parse;
use crate::validation::absolute_path;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Every validated build of one project, in discovery order.
#[derive(Debug, Clone, PartialEq)]
pub struct ProjectConfig {
    builds: Vec<ValidatedBuild>,
}

/// Find, read and parse every manifest under `root`.
///
/// Each document becomes one [`BuildConfig`] tagged with its file and its
/// position in that file.
pub fn load_build_configs(root: &Path, env: &EnvConfig) -> Result<Vec<BuildConfig>, InvalidConfig> {
    let files: Vec<PathBuf> = find_all(root, CONFIG_FILENAMES).collect();
    if files.is_empty() {
        return Err(InvalidConfig::new(
            ErrorCode::ConfigRequired,
            format!(
                "No {} found in {}",
                CONFIG_FILENAMES.join(" or "),
                absolute_path(root).display()
            ),
        ));
    }

    let mut configs = Vec::new();
    for file in files {
        debug!("Loading manifest {}", file.display());
        let raw = fs::read_to_string(&file).map_err(|e| {
            InvalidConfig::new(
                ErrorCode::ConfigSyntaxInvalid,
                format!("Could not read {}: {}", file.display(), e),
            )
        })?;
        let documents = parse(&raw).map_err(|e| {
            InvalidConfig::new(
                ErrorCode::ConfigSyntaxInvalid,
                format!("Parse error in {}: {}", file.display(), e.message),
            )
        })?;
        configs.extend(
            documents
                .into_iter()
                .enumerate()
                .map(|(position, raw)| BuildConfig::new(env.clone(), raw, file.clone(), position)),
        );
    }
    Ok(configs)
}

impl ProjectConfig {
    /// Validate every build, stopping at the first invalid one.
    ///
    /// Build names must be unique across the whole project since each one
    /// owns an output directory.
    pub fn validate(configs: &[BuildConfig]) -> Result<Self, InvalidConfig> {
        let mut seen: HashMap<String, (PathBuf, usize)> = HashMap::new();
        let mut builds = Vec::with_capacity(configs.len());
        for config in configs {
            let build = config.validate()?;
            if let Some((file, position)) = seen.get(build.name()) {
                return Err(InvalidConfig::for_document(
                    ErrorCode::NameDuplicate,
                    "name",
                    format!(
                        "Build \"{}\" is already defined in {} [{}]",
                        build.name(),
                        file.display(),
                        position
                    ),
                    config.source_file(),
                    config.source_position(),
                ));
            }
            seen.insert(
                build.name().to_string(),
                (config.source_file().to_path_buf(), config.source_position()),
            );
            builds.push(build);
        }
        Ok(ProjectConfig { builds })
    }

    /// Discover, parse and validate in one step
    pub fn load(root: &Path, env: &EnvConfig) -> Result<Self, InvalidConfig> {
        let configs = load_build_configs(root, env)?;
        let project = Self::validate(&configs)?;
        info!("Loaded {} build(s) from {}", project.len(), root.display());
        Ok(project)
    }

    /// Point every build at a new output root
    pub fn set_output_base(&mut self, output_base: &Path) {
        let output_base = absolute_path(output_base);
        for build in &mut self.builds {
            build.set_output_base(output_base.clone());
        }
    }

    pub fn builds(&self) -> &[ValidatedBuild] {
        &self.builds
    }

    pub fn len(&self) -> usize {
        self.builds.len()
    }

    pub fn is_empty(&self) -> bool {
        self.builds.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, ValidatedBuild> {
        self.builds.iter()
    }
}

impl<'a> IntoIterator for &'a ProjectConfig {
    type Item = &'a ValidatedBuild;
    type IntoIter = std::slice::Iter<'a, ValidatedBuild>;

    fn into_iter(self) -> Self::IntoIter {
        self.builds.iter()
    }
}

impl IntoIterator for ProjectConfig {
    type Item = ValidatedBuild;
    type IntoIter = std::vec::IntoIter<ValidatedBuild>;

    fn into_iter(self) -> Self::IntoIter {
        self.builds.into_iter()
    }
}
