use clap::Parser;
use rtd_build::driver::{build_project, load_project, BuildReport, DEFAULT_OUTDIR};
use rtd_build::{BuildError, GlobalOpts};
use rtd_config::Settings;
use rtd_logger as logger;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser)]
#[command(name = "rtd-build")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(
    about = "Build documentation described by readthedocs.yml manifests",
    long_about = "Finds every readthedocs.yml under PATH, validates it and renders each build \
                  target with Sphinx inside its own disposable Python environment."
)]
struct Cli {
    #[command(flatten)]
    global: GlobalOpts,

    /// Project root to search for manifests
    #[arg(default_value = ".", value_parser = parse_project_dir)]
    path: PathBuf,

    /// Directory the rendered output is written to
    #[arg(long, default_value = DEFAULT_OUTDIR)]
    outdir: PathBuf,
}

fn parse_project_dir(raw: &str) -> Result<PathBuf, String> {
    let path = PathBuf::from(raw);
    if path.is_dir() {
        Ok(path)
    } else {
        Err(format!("{} is not a directory", raw))
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("rtd_manifest={}", logger::verbosity_filter())));
    let _ = tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .compact()
                .with_writer(std::io::stderr),
        )
        .try_init();
}

fn run(path: &Path, outdir: &Path) -> Result<Vec<BuildReport>, BuildError> {
    let project = load_project(path, outdir)?;
    let settings = Settings::load()?;
    build_project(&project, &settings)
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init_with_verbosity(cli.global.verbosity_level()) {
        eprintln!("Warning: Failed to initialize logger: {}", e);
    }
    init_tracing();

    match run(&cli.path, &cli.outdir) {
        Ok(reports) => {
            for report in reports {
                logger::success(&format!(
                    "built {} -> {}",
                    report.name,
                    report.html_dir.display()
                ));
            }
        }
        Err(e) => {
            logger::error(&e.to_string());
            if logger::get_verbosity() > 0 {
                logger::show_log_path();
            }
            std::process::exit(1);
        }
    }
}
