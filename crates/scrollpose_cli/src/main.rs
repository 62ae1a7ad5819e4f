//! Scrollpose CLI
//!
//! Inspect, validate, and export scroll-driven keyframe animations.

mod config;
mod sample;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use scrollpose_animation::{AnimationSettings, ScrollAnimator, SettingsDocument};
use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tracing::{info, Level};
use tracing_subscriber::EnvFilter;

use crate::config::{OutputFormat, ScrollposeConfig, CONFIG_FILE};
use crate::sample::{sample_pass, write_rows, OverlayLogSink};

#[derive(Parser)]
#[command(name = "scrollpose")]
#[command(about = "Scroll-driven keyframe animation toolkit")]
#[command(version)]
struct Cli {
    /// Config file or directory containing scrollpose.toml
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sample poses across one pass of the pinned scroll region
    Sample {
        /// Settings document (overrides the config file)
        #[arg(short, long)]
        settings: Option<PathBuf>,

        /// Override the loop count
        #[arg(short, long)]
        loops: Option<u32>,

        /// Number of intervals to sample
        #[arg(long)]
        steps: Option<u32>,

        /// Output format
        #[arg(short, long, value_enum)]
        format: Option<OutputFormat>,

        /// Scroll back to the top after the pass
        #[arg(long)]
        wrap: bool,
    },

    /// Check a settings document without applying it
    Validate {
        /// Settings document to check
        file: PathBuf,
    },

    /// Print the built-in animation as an exported settings document
    ExportDefaults {
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Write a default scrollpose.toml
    Init {
        /// Target directory
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Overwrite an existing config
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(io::stderr)
        .init();

    match cli.command {
        Commands::Sample {
            settings,
            loops,
            steps,
            format,
            wrap,
        } => cmd_sample(cli.config.as_deref(), settings, loops, steps, format, wrap),
        Commands::Validate { file } => cmd_validate(&file),
        Commands::ExportDefaults { output } => cmd_export_defaults(output.as_deref()),
        Commands::Init { path, force } => cmd_init(&path, force),
    }
}

fn cmd_sample(
    config_path: Option<&Path>,
    settings_path: Option<PathBuf>,
    loops: Option<u32>,
    steps: Option<u32>,
    format: Option<OutputFormat>,
    wrap: bool,
) -> Result<()> {
    let (config, base_dir) = match config_path {
        Some(path) => {
            let base = if path.is_file() {
                path.parent().map(Path::to_path_buf).unwrap_or_default()
            } else {
                path.to_path_buf()
            };
            (ScrollposeConfig::load(path)?, base)
        }
        None => (ScrollposeConfig::load_or_default(Path::new("."))?, PathBuf::from(".")),
    };

    let mut settings = match settings_path {
        Some(path) => Some(config::read_settings(&path)?),
        None => config.load_settings(&base_dir)?,
    };
    if let Some(loops) = loops {
        settings = Some(settings.unwrap_or_default().with_loops(loops));
    }

    let mut animator = ScrollAnimator::new(settings).with_reset_window(config.scroll)?;
    if let Some(err) = animator.last_config_error() {
        bail!("Invalid animation settings: {}", err);
    }
    animator.add_sink(Box::new(OverlayLogSink::default()));

    info!(
        "Sampling {} keyframes over {} loop(s)",
        animator.timeline().store().len(),
        animator.loops()
    );

    let rows = sample_pass(
        &mut animator,
        steps.unwrap_or(config.sample.steps),
        wrap,
    );
    let stdout = io::stdout();
    write_rows(
        &mut stdout.lock(),
        &rows,
        format.unwrap_or(config.sample.format),
    )
}

fn cmd_validate(file: &Path) -> Result<()> {
    let settings = config::read_settings(file)?;
    let keyframes = settings.keyframes.len();
    match settings.validate() {
        Ok(validated) => {
            info!(
                "{}: {} keyframes, {} loop(s), time {}..{}",
                file.display(),
                keyframes,
                validated.loops,
                validated.store.start_time(),
                validated.store.end_time()
            );
            Ok(())
        }
        Err(err) => bail!("{}: {}", file.display(), err),
    }
}

fn cmd_export_defaults(output: Option<&Path>) -> Result<()> {
    let json = SettingsDocument::new(AnimationSettings::default()).to_json_pretty()?;
    match output {
        Some(path) => {
            fs::write(path, format!("{json}\n"))
                .with_context(|| format!("Failed to write {}", path.display()))?;
            info!("Exported default animation to {}", path.display());
        }
        None => writeln!(io::stdout(), "{json}")?,
    }
    Ok(())
}

fn cmd_init(dir: &Path, force: bool) -> Result<()> {
    let path = dir.join(CONFIG_FILE);
    if path.exists() && !force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    fs::create_dir_all(dir)
        .with_context(|| format!("Failed to create {}", dir.display()))?;
    fs::write(&path, ScrollposeConfig::default().to_toml()?)
        .with_context(|| format!("Failed to write {}", path.display()))?;

    info!("Created {}", path.display());
    Ok(())
}
