//! layerdoc - layered natural-language documentation for a project tree

use clap::{Parser, Subcommand};
use colored::Colorize;
use layerdoc::{
    config::{Config, ConfigManager},
    llm::BackendFactory,
    output::OutputWriter,
    pipeline::{ProjectDocumenter, RunOutcome},
    utils::errors::DocError,
    Result,
};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

/// layerdoc: summarize every file, then every directory, then the whole project
#[derive(Parser)]
#[command(name = "layerdoc")]
#[command(version, about, long_about = None)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error); overrides the configuration
    #[arg(short, long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Generate documentation for a project
    Generate {
        /// Project root (defaults to the current directory)
        #[arg(short, long)]
        workdir: Option<PathBuf>,
        /// Output directory (defaults to `run.output_dir` under the project root)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print the project tree as JSON without calling any backend
    Tree {
        #[arg(short, long)]
        workdir: Option<PathBuf>,
    },
    /// Show the stored summary of one file
    Show {
        /// Path relative to the project root
        path: String,
        #[arg(short, long)]
        workdir: Option<PathBuf>,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Write the default configuration file
    Init {
        /// Overwrite an existing configuration
        #[arg(long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let manager = ConfigManager::load(cli.config.clone())?;
    let level = cli
        .log_level
        .clone()
        .unwrap_or_else(|| manager.config().logging.level.clone());
    init_logging(&level)?;

    info!("Starting layerdoc v{}", layerdoc::VERSION);

    let result = match cli.command {
        Commands::Init { force } => init_config(manager.config_path(), force),
        Commands::Tree { workdir } => print_tree(manager.into_config(), workdir),
        Commands::Show { path, workdir, output } => show_summary(manager.into_config(), &path, workdir, output).await,
        Commands::Generate { workdir, output } => generate(manager.into_config(), workdir, output).await,
    };

    if let Err(e) = &result {
        error!("{} error: {}", e.category(), e);
    }
    result
}

/// Initialize logging; log lines go to stderr so stdout stays machine-readable
fn init_logging(log_level: &str) -> Result<()> {
    let filter = EnvFilter::try_new(log_level)
        .map_err(|e| DocError::unknown(format!("Invalid log level: {}", e)))?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| DocError::unknown(format!("Failed to set logger: {}", e)))?;

    Ok(())
}

fn init_config(path: &Path, force: bool) -> Result<()> {
    if ConfigManager::write_default(path, force)? {
        println!("{} Wrote default configuration to {}", "✓".green(), path.display());
        println!("  Available providers: {}", BackendFactory::list_providers().join(", "));
    } else {
        println!("{} Configuration already exists at {}", "•".yellow(), path.display());
        println!("  Use --force to overwrite it");
    }
    Ok(())
}

fn project_root(workdir: Option<PathBuf>) -> Result<PathBuf> {
    match workdir {
        Some(dir) => Ok(dir),
        None => Ok(std::env::current_dir()?),
    }
}

fn print_tree(config: Config, workdir: Option<PathBuf>) -> Result<()> {
    let root = project_root(workdir)?;
    let documenter = ProjectDocumenter::with_backend(config, None);
    let tree = documenter.build_tree(&root)?;
    println!("{}", tree.to_json_pretty()?);
    Ok(())
}

async fn show_summary(config: Config, path: &str, workdir: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let root = project_root(workdir)?;
    let output = output.unwrap_or_else(|| config.output_dir_for(&root));
    let writer = OutputWriter::new(output);

    match writer.read_file_summary(path).await {
        Ok(summary) => {
            println!("{}\n", path.bold());
            println!("{}", summary);
            Ok(())
        }
        Err(DocError::NotFound { .. }) => {
            eprintln!(
                "{} No summary for {} under {}; run `layerdoc generate` first",
                "✗".red(),
                path,
                writer.dir().display()
            );
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}

async fn generate(mut config: Config, workdir: Option<PathBuf>, output: Option<PathBuf>) -> Result<()> {
    let root = project_root(workdir)?;
    if let Some(output) = output {
        // Discovery skips `run.output_dir`, which must name the directory written below.
        config.run.output_dir = std::env::current_dir()?.join(output);
    }
    let output = config.output_dir_for(&root);
    let documenter = ProjectDocumenter::from_config(config)?;

    match documenter.provider_name() {
        Some(provider) => info!("Using {} backend", provider),
        None => warn!("No backend configured; summaries will be the first lines of each file"),
    }

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_err() {
            return;
        }
        warn!("Interrupt received, finishing in-flight calls; press Ctrl-C again to abort");
        on_signal.cancel();

        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("{} Aborted", "✗".red());
            std::process::exit(130);
        }
    });

    match documenter.run(&root, &cancel).await {
        Ok(RunOutcome::Completed(_)) if cancel.is_cancelled() => {
            eprintln!("{} Cancelled before writing; nothing was written", "•".yellow());
            std::process::exit(130);
        }
        Ok(RunOutcome::Completed(report)) => {
            let written = OutputWriter::new(output).write(&report).await?;
            println!(
                "{} Documented {} files in {:.1}s",
                "✓".green(),
                report.file_count(),
                report.duration().num_milliseconds() as f64 / 1000.0
            );
            println!("  {}", written.document.display());
            Ok(())
        }
        Ok(RunOutcome::Cancelled { summarized, total }) => {
            eprintln!(
                "{} Cancelled after {} of {} files; nothing was written",
                "•".yellow(),
                summarized,
                total
            );
            std::process::exit(130);
        }
        Err(DocError::NoWorkspace { path }) => {
            eprintln!("{} No workspace: {} is not a directory", "✗".red(), path.display());
            std::process::exit(2);
        }
        Err(e @ DocError::Aggregation { .. }) => {
            eprintln!("{} Project summary failed: {}", "✗".red(), e);
            std::process::exit(1);
        }
        Err(e) => Err(e),
    }
}
