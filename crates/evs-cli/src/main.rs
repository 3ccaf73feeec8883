mod commands;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "evs")]
#[command(about = "Macro event-window study CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    cmd: Commands,
}

/// Price cache and event table locations.
#[derive(Args, Clone, Debug)]
pub struct InputArgs {
    /// Directory holding `<SYMBOL>_daily.csv` price caches
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// Event table (event,event_date[,value])
    #[arg(long, default_value = "data/events.csv")]
    pub events: PathBuf,
}

#[derive(Args, Clone, Debug)]
pub struct ConfigArgs {
    /// Layered config paths in merge order (base -> overrides...)
    #[arg(long = "config")]
    pub config_paths: Vec<String>,

    /// Fail instead of warn when the config carries keys this stage does not read.
    #[arg(long, default_value_t = false)]
    pub strict_config: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute layered config hash + print canonical JSON
    ConfigHash {
        /// Paths in merge order
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Pre/post window statistics for every (symbol, event) pair
    WindowStats {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, default_value = "output")]
        out_dir: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Event-day move relative to the trailing baseline
    Impact {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, default_value = "output")]
        out_dir: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// One-sample t-tests over the saved result tables + narrative summary
    Tests {
        /// Directory holding the window-stats and impact tables
        #[arg(long, default_value = "output")]
        out_dir: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Correlation matrix change around the latest event of one name
    CorrDelta {
        /// Event name to anchor on (e.g. CPI, NFP)
        #[arg(long)]
        event: String,

        #[command(flatten)]
        input: InputArgs,

        #[arg(long, default_value = "output")]
        out_dir: PathBuf,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// All stages in one pass, plus manifest.json
    Run {
        #[command(flatten)]
        input: InputArgs,

        #[arg(long, default_value = "output")]
        out_dir: PathBuf,

        /// Also compute a correlation delta for each named event (repeatable)
        #[arg(long = "corr-event")]
        corr_events: Vec<String>,

        #[command(flatten)]
        config: ConfigArgs,
    },

    /// Data-quality report for the cached price series
    Quality {
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },
}

fn main() -> Result<()> {
    // Load .env.local if present (dev convenience, e.g. RUST_LOG).
    let _ = dotenvy::from_filename(".env.local");

    init_tracing();

    let cli = Cli::parse();

    match cli.cmd {
        Commands::ConfigHash { paths } => {
            let loaded = evs_config::load_layered_yaml(&paths)?;
            println!("config_hash={}", loaded.config_hash);
            println!("{}", loaded.canonical_json);
        }

        Commands::WindowStats {
            input,
            out_dir,
            config,
        } => commands::study::window_stats(&input, &out_dir, &config)?,

        Commands::Impact {
            input,
            out_dir,
            config,
        } => commands::study::impact(&input, &out_dir, &config)?,

        Commands::Tests { out_dir, config } => commands::study::tests(&out_dir, &config)?,

        Commands::CorrDelta {
            event,
            input,
            out_dir,
            config,
        } => commands::study::corr_delta(&event, &input, &out_dir, &config)?,

        Commands::Run {
            input,
            out_dir,
            corr_events,
            config,
        } => commands::run::run_all(&input, &out_dir, &corr_events, &config)?,

        Commands::Quality { data_dir } => commands::quality::quality(&data_dir)?,
    }

    Ok(())
}

/// Logs go to stderr; stdout carries the command's key=value output.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()),
        )
        .with_writer(std::io::stderr)
        .init();
}
