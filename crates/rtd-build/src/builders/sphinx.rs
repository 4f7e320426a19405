//! Sphinx builds.

use super::Builder;
use crate::errors::BuildError;
use rtd_config::Settings;
use rtd_logger as logger;
use rtd_manifest::{Format, ValidatedBuild};
use rtd_venv::{CommandOutput, EnvironmentOptions, IsolatedEnvironment, Provisioner};
use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

const RENDERER: &str = "sphinx-build";
const HTML_DIR: &str = "html";
const SEARCH_DATA_DIR: &str = "search_data";

/// One dependency installation performed during setup
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallStep {
    /// Anything the package installer accepts, including `-r<file>`
    Package(String),
    /// `python setup.py install`, run from the script's directory
    SetupPy { script: PathBuf, cwd: PathBuf },
}

/// Installations for `config`, in the order they run
pub fn install_plan(config: &ValidatedBuild, renderer_requirement: &str) -> Vec<InstallStep> {
    let mut plan = vec![InstallStep::Package(renderer_requirement.to_string())];
    if let Some(requirements) = config.requirements_file() {
        plan.push(InstallStep::Package(format!("-r{}", requirements.display())));
    }

    let python = config.python();
    if python.pip_install {
        let base = config.base().display();
        let spec = if python.extra_requirements.is_empty() {
            base.to_string()
        } else {
            format!("{}[{}]", base, python.extra_requirements.join(","))
        };
        plan.push(InstallStep::Package(spec));
    }
    if python.setup_py_install {
        let script = python.setup_py_path.clone();
        let cwd = script
            .parent()
            .map_or_else(|| config.base().to_path_buf(), Path::to_path_buf);
        plan.push(InstallStep::SetupPy { script, cwd });
    }
    plan
}

/// Arguments after the renderer script: `-b <builder> [-c <confdir>] <base> <out>`
pub fn render_args(config: &ValidatedBuild, builder: &str, out: &Path) -> Vec<OsString> {
    let mut args: Vec<OsString> = vec!["-b".into(), builder.into()];
    if let Some(conf_dir) = config.conf_file().and_then(Path::parent) {
        args.push("-c".into());
        args.push(conf_dir.into());
    }
    args.push(config.base().into());
    args.push(out.into());
    args
}

pub struct SphinxBuilder {
    config: ValidatedBuild,
    settings: Settings,
    env: Option<IsolatedEnvironment>,
}

impl SphinxBuilder {
    pub fn new(config: ValidatedBuild, settings: Settings) -> Self {
        SphinxBuilder {
            config,
            settings,
            env: None,
        }
    }

    fn provisioner(&self) -> Result<Provisioner, BuildError> {
        if let Some(conda) = self.config.conda() {
            let binary = self
                .settings
                .resolve_conda()
                .ok_or_else(|| BuildError::MissingTool("conda".to_string()))?;
            return Ok(Provisioner::Conda {
                conda: binary,
                file: conda.file.clone(),
            });
        }
        if let Some(uv) = self.settings.resolve_uv() {
            return Ok(Provisioner::Uv { uv });
        }
        self.settings
            .resolve_python()
            .map(|python| Provisioner::Venv { python })
            .ok_or_else(|| BuildError::MissingTool("uv or python3".to_string()))
    }

    fn env(&self) -> Result<&IsolatedEnvironment, BuildError> {
        self.env
            .as_ref()
            .ok_or_else(|| BuildError::NotSetUp(self.config.name().to_string()))
    }

    /// Run the renderer with `builder` into `out`
    fn render(&self, builder: &str, out: &Path) -> Result<CommandOutput, BuildError> {
        let env = self.env()?;
        fs::create_dir_all(out)?;
        logger::step(&format!("Rendering {} into {}", builder, out.display()));
        logger::spinner_start(&format!("{}: sphinx-build -b {}", self.config.name(), builder));
        let output = env.run(RENDERER, &render_args(&self.config, builder, out));
        logger::spinner_stop();
        Ok(output?)
    }

    /// Best-effort render: any failure is reported but does not fail the build
    fn render_optional(&self, builder: &str, dir: &str) {
        let out = self.config.output_dir(dir);
        match self.render(builder, &out) {
            Ok(output) if output.success() => {
                logger::debug(&format!("Wrote {}", out.display()));
            }
            Ok(output) => logger::warn(&format!(
                "{}: {} output failed with exit code {}",
                self.config.name(),
                builder,
                output.code.unwrap_or(-1)
            )),
            Err(e) => logger::warn(&format!(
                "{}: {} output failed: {}",
                self.config.name(),
                builder,
                e
            )),
        }
    }
}

fn remove_partial_output(out: &Path) {
    if !out.exists() {
        return;
    }
    if let Err(e) = fs::remove_dir_all(out) {
        logger::debug(&format!("Could not remove {}: {}", out.display(), e));
    }
}

impl Builder for SphinxBuilder {
    fn config(&self) -> &ValidatedBuild {
        &self.config
    }

    fn setup(&mut self) -> Result<(), BuildError> {
        let provisioner = self.provisioner()?;
        let options = EnvironmentOptions {
            system_site_packages: self.config.python().use_system_site_packages,
            python_version: Some(self.config.python().version.to_string()),
        };
        logger::info(&format!("Setting up environment for {}", self.config.name()));
        let mut env =
            IsolatedEnvironment::create(&provisioner, &options, &self.settings.env_root())?;

        for step in install_plan(&self.config, &self.settings.sphinx_requirement()) {
            match step {
                InstallStep::Package(spec) => env.install(&spec)?,
                InstallStep::SetupPy { script, cwd } => {
                    let output = env.run_in(&cwd, &script.display().to_string(), &["install"])?;
                    if !output.success() {
                        return Err(rtd_venv::EnvironmentError::CommandFailed {
                            command: format!("python {} install", script.display()),
                            code: output.code.unwrap_or(-1),
                        }
                        .into());
                    }
                }
            }
        }
        self.env = Some(env);
        Ok(())
    }

    fn build_html(&mut self) -> Result<(), BuildError> {
        let out = self.config.output_dir(HTML_DIR);
        let result = self.render("html", &out);
        if result.as_ref().is_ok_and(CommandOutput::success) {
            return Ok(());
        }
        remove_partial_output(&out);
        let output = result?;
        Err(BuildError::RenderFailed {
            build: self.config.name().to_string(),
            format: "html".to_string(),
            code: output.code.unwrap_or(-1),
        })
    }

    fn build_search_data(&mut self) -> Result<(), BuildError> {
        self.render_optional("json", SEARCH_DATA_DIR);
        Ok(())
    }

    fn build_formats(&mut self) -> Result<(), BuildError> {
        for format in self.config.formats() {
            match format {
                Format::Epub => self.render_optional("epub", format.as_str()),
                Format::Htmlzip | Format::Pdf => logger::warn(&format!(
                    "{}: {} output is not supported, skipping",
                    self.config.name(),
                    format
                )),
            }
        }
        Ok(())
    }

    fn cleanup(&mut self) -> Result<(), BuildError> {
        if let Some(mut env) = self.env.take() {
            env.destroy()?;
        }
        Ok(())
    }
}
