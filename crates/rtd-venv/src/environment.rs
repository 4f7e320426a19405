//! The disposable environment one build runs in.

use crate::errors::EnvironmentError;
use crate::paths::{bin_dir, resolve_python_exe};
use rtd_logger as logger;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

const ENV_DIR_PREFIX: &str = "rtd-build-env-";
const ENV_SUBDIR: &str = "env";

/// Tool used to create an environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Provisioner {
    /// `uv venv`, installs with `uv pip install`
    Uv { uv: PathBuf },
    /// `<python> -m venv` on the host interpreter
    Venv { python: PathBuf },
    /// `conda env create` from an environment file
    Conda { conda: PathBuf, file: PathBuf },
}

impl Provisioner {
    fn installer(&self) -> Installer {
        match self {
            Provisioner::Uv { uv } => Installer::Uv(uv.clone()),
            Provisioner::Venv { .. } | Provisioner::Conda { .. } => Installer::Pip,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Installer {
    Uv(PathBuf),
    Pip,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvironmentOptions {
    /// Let the environment see the host's installed packages
    pub system_site_packages: bool,
    /// Interpreter version request, honoured by `uv` only
    pub python_version: Option<String>,
}

/// Exit status and captured streams of a command run in an environment
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandOutput {
    /// `None` when the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CommandOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CommandOutput {
    fn from(output: Output) -> Self {
        CommandOutput {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// An isolated Python environment in a fresh temporary directory.
///
/// The directory is removed by [`IsolatedEnvironment::destroy`] or, at the
/// latest, when the handle is dropped.
#[derive(Debug)]
pub struct IsolatedEnvironment {
    root: Option<TempDir>,
    path: PathBuf,
    python: PathBuf,
    installer: Installer,
    system_site_packages: bool,
    installed: Vec<String>,
}

impl IsolatedEnvironment {
    /// Provision a new environment below `env_root`.
    ///
    /// A non-zero exit of the provisioning command is terminal. The temporary
    /// directory does not outlive a failed attempt.
    pub fn create(
        provisioner: &Provisioner,
        options: &EnvironmentOptions,
        env_root: &Path,
    ) -> Result<Self, EnvironmentError> {
        std::fs::create_dir_all(env_root)?;
        let root = tempfile::Builder::new()
            .prefix(ENV_DIR_PREFIX)
            .tempdir_in(env_root)?;
        let path = root.path().join(ENV_SUBDIR);

        let (label, mut command) = match provisioner {
            Provisioner::Uv { uv } => {
                let mut command = Command::new(uv);
                command.arg("venv");
                if let Some(ref version) = options.python_version {
                    command.args(["--python", version]);
                }
                if options.system_site_packages {
                    command.arg("--system-site-packages");
                }
                command.arg(&path);
                ("uv venv", command)
            }
            Provisioner::Venv { python } => {
                if let Some(ref version) = options.python_version {
                    logger::debug(&format!(
                        "Ignoring Python {} request, using host interpreter {}",
                        version,
                        python.display()
                    ));
                }
                let mut command = Command::new(python);
                command.args(["-m", "venv"]);
                if options.system_site_packages {
                    command.arg("--system-site-packages");
                }
                command.arg(&path);
                ("python -m venv", command)
            }
            Provisioner::Conda { conda, file } => {
                let mut command = Command::new(conda);
                command
                    .args(["env", "create", "--quiet", "--prefix"])
                    .arg(&path)
                    .arg("--file")
                    .arg(file);
                ("conda env create", command)
            }
        };

        logger::step(&format!("Creating environment at {}", path.display()));
        run_checked(label, &mut command)?;
        let python = resolve_python_exe(&path)?;
        logger::debug(&format!("Environment interpreter: {}", python.display()));

        Ok(IsolatedEnvironment {
            root: Some(root),
            path,
            python,
            installer: provisioner.installer(),
            system_site_packages: options.system_site_packages,
            installed: Vec::new(),
        })
    }

    /// Root of the environment (`bin/`, `lib/`, ...)
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn python(&self) -> &Path {
        &self.python
    }

    pub fn system_site_packages(&self) -> bool {
        self.system_site_packages
    }

    /// Specifiers installed so far, in order
    pub fn installed(&self) -> &[String] {
        &self.installed
    }

    pub fn is_destroyed(&self) -> bool {
        self.root.is_none()
    }

    /// Install one specifier: a name, a constrained name, a local path or
    /// `-r<requirements file>`.
    pub fn install(&mut self, spec: &str) -> Result<(), EnvironmentError> {
        self.ensure_alive()?;
        let mut command = match self.installer {
            Installer::Uv(ref uv) => {
                let mut command = Command::new(uv);
                command.args(["pip", "install", "--python"]).arg(&self.python);
                command
            }
            Installer::Pip => {
                let mut command = Command::new(&self.python);
                command.args(["-m", "pip", "install"]);
                command
            }
        };
        command.arg(spec);
        run_checked(&format!("pip install {}", spec), &mut command)?;
        self.installed.push(spec.to_string());
        Ok(())
    }

    /// Run `exe` with the environment's interpreter as launcher.
    ///
    /// A bare name refers to a script in the environment's bin directory.
    /// The script's shebang line is never used. A non-zero exit is reported
    /// in the returned output, not as an error.
    pub fn run<S: AsRef<OsStr>>(
        &self,
        exe: &str,
        args: &[S],
    ) -> Result<CommandOutput, EnvironmentError> {
        self.run_command(None, exe, args)
    }

    /// [`IsolatedEnvironment::run`] with an explicit working directory
    pub fn run_in<S: AsRef<OsStr>>(
        &self,
        cwd: &Path,
        exe: &str,
        args: &[S],
    ) -> Result<CommandOutput, EnvironmentError> {
        self.run_command(Some(cwd), exe, args)
    }

    fn run_command<S: AsRef<OsStr>>(
        &self,
        cwd: Option<&Path>,
        exe: &str,
        args: &[S],
    ) -> Result<CommandOutput, EnvironmentError> {
        self.ensure_alive()?;
        let script = if Path::new(exe).is_absolute() {
            PathBuf::from(exe)
        } else {
            bin_dir(&self.path).join(exe)
        };

        let mut command = Command::new(&self.python);
        command.arg(&script).args(args);
        if let Some(cwd) = cwd {
            command.current_dir(cwd);
        }

        logger::debug(&format!("Running: {:?}", command));
        let output = command.output().map_err(|source| EnvironmentError::Spawn {
            command: exe.to_string(),
            source,
        })?;
        logger::capture_output(exe, &output);
        Ok(CommandOutput::from(output))
    }

    /// Remove the environment directory. Calling it again is a no-op.
    pub fn destroy(&mut self) -> Result<(), EnvironmentError> {
        let Some(root) = self.root.take() else {
            return Ok(());
        };
        let location = root.path().to_path_buf();
        match root.close() {
            Ok(()) => {
                logger::debug(&format!("Removed environment {}", location.display()));
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(EnvironmentError::Io(e)),
        }
    }

    fn ensure_alive(&self) -> Result<(), EnvironmentError> {
        if self.is_destroyed() {
            return Err(EnvironmentError::Destroyed);
        }
        Ok(())
    }
}

impl Drop for IsolatedEnvironment {
    fn drop(&mut self) {
        if let Err(e) = self.destroy() {
            logger::warn(&format!("Failed to remove build environment: {}", e));
        }
    }
}

/// Run a provisioning or install command; a non-zero exit is an error
fn run_checked(label: &str, command: &mut Command) -> Result<(), EnvironmentError> {
    logger::debug(&format!("Running: {:?}", command));
    logger::spinner_start(label);
    let output = command.output().map_err(|source| {
        logger::spinner_stop();
        EnvironmentError::Spawn {
            command: label.to_string(),
            source,
        }
    })?;
    logger::capture_output(label, &output);

    if !output.status.success() {
        logger::spinner_error(&format!("{} failed", label));
        return Err(EnvironmentError::CommandFailed {
            command: label.to_string(),
            code: output.status.code().unwrap_or(-1),
        });
    }
    logger::spinner_success(label);
    Ok(())
}
