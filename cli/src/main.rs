mod report;
mod settings;

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use serde::Serialize;
use tracing_subscriber::EnvFilter;
use wipecall_core::config::{self as analysis_config, default_config_path};
use wipecall_core::{
    AnalysisConfig, DpsRequest, MemorySource, RaidAnalyzer, SpecBaselineSource, TimeWindow,
};

use settings::CliSettings;

fn init_logging() {
    let filter = EnvFilter::builder()
        .with_default_directive(tracing::Level::INFO.into())
        .from_env_lossy();

    // If WIPECALL_LOG_PATH is set, append to that file
    if let Ok(path) = std::env::var("WIPECALL_LOG_PATH")
        && let Ok(file) = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(true)
            .with_ansi(false)
            .with_writer(file)
            .init();
        return;
    }

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();
}

#[derive(Parser)]
#[command(version, about = "Wipe-call, death and DPS reports over raid session dumps")]
struct Cli {
    /// Directory of session dumps, overriding the saved setting
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    /// Analysis config (TOML), overriding the saved setting
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Print reports as JSON
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the loaded session codes
    Sessions,
    /// List bosses pulled in the given sessions (all when none given)
    Bosses { sessions: Vec<String> },
    /// Death analysis of one attempt
    Attempt { session: String, attempt: i64 },
    /// Compare every attempt on a boss across sessions
    Compare {
        #[arg(short, long)]
        boss: String,
        #[arg(short, long)]
        difficulty: Option<u32>,
        sessions: Vec<String>,
    },
    /// Per-player DPS on a boss, optionally restricted to a window of fight time
    Dps {
        #[arg(short, long)]
        boss: String,
        #[arg(short, long)]
        difficulty: Option<u32>,
        /// Window start, seconds since pull
        #[arg(long)]
        start: Option<f64>,
        /// Window end, seconds since pull
        #[arg(long)]
        end: Option<f64>,
        /// JSON file of spec ranking rows to compare against
        #[arg(long)]
        rankings: Option<PathBuf>,
        #[arg(long)]
        region: Option<String>,
        sessions: Vec<String>,
    },
    /// Save the session dump directory
    SetDataDir { path: PathBuf },
    /// Write the default analysis config to the config directory
    InitConfig,
}

fn main() -> Result<(), String> {
    init_logging();

    let cli = Cli::parse();
    let mut settings = CliSettings::load();
    let european = settings.european_numbers;

    match &cli.command {
        Commands::SetDataDir { path } => {
            settings.data_directory = path.clone();
            settings.store()?;
            println!("Data directory set to {}", settings.data_directory.display());
            return Ok(());
        }
        Commands::InitConfig => return init_config(cli.config.as_deref()),
        _ => {}
    }

    let config = load_analysis_config(cli.config.as_deref(), &settings)?;
    let data_dir = cli.data_dir.unwrap_or(settings.data_directory);
    let source = MemorySource::load_dir(&data_dir).map_err(|e| e.to_string())?;
    let all_sessions = source.session_codes();
    let or_all = |sessions: Vec<String>| {
        if sessions.is_empty() {
            all_sessions.clone()
        } else {
            sessions
        }
    };

    match cli.command {
        Commands::Sessions => {
            if cli.json {
                print_json(&all_sessions)?;
            } else {
                all_sessions.iter().for_each(|code| println!("{}", code));
            }
        }
        Commands::Bosses { sessions } => {
            let analyzer = RaidAnalyzer::with_config(source, config);
            let bosses = analyzer.list_bosses(&or_all(sessions));
            if cli.json {
                print_json(&bosses)?;
            } else {
                report::print_bosses(&bosses);
            }
        }
        Commands::Attempt { session, attempt } => {
            let mut analyzer = RaidAnalyzer::with_config(source, config);
            let analysis = analyzer
                .analyze_attempt(&session, attempt)
                .map_err(|e| e.to_string())?;
            if cli.json {
                print_json(&analysis)?;
            } else {
                report::print_attempt(&analysis);
            }
        }
        Commands::Compare {
            boss,
            difficulty,
            sessions,
        } => {
            let mut analyzer = RaidAnalyzer::with_config(source, config);
            let comparison = analyzer.compare_across_sessions(&or_all(sessions), &boss, difficulty);
            if cli.json {
                print_json(&comparison)?;
            } else {
                report::print_comparison(&comparison, european);
            }
        }
        Commands::Dps {
            boss,
            difficulty,
            start,
            end,
            rankings,
            region,
            sessions,
        } => {
            let baselines = match &rankings {
                Some(path) => {
                    let mut baselines = MemorySource::new();
                    baselines.load_rankings(path).map_err(|e| e.to_string())?;
                    Some(baselines)
                }
                None => None,
            };

            let mut request = DpsRequest::new(or_all(sessions), boss)
                .with_difficulty(difficulty)
                .with_window(TimeWindow::new(start, end));
            request.region = region;

            let analyzer = RaidAnalyzer::with_config(source, config);
            let dps = analyzer.aggregate_dps(
                &request,
                baselines.as_ref().map(|b| b as &dyn SpecBaselineSource),
            );
            if cli.json {
                print_json(&dps)?;
            } else {
                report::print_dps(&dps, european);
            }
        }
        Commands::SetDataDir { .. } | Commands::InitConfig => {}
    }

    Ok(())
}

/// Explicit path, then the saved setting, then the default location if a file exists there.
fn load_analysis_config(
    explicit: Option<&Path>,
    settings: &CliSettings,
) -> Result<AnalysisConfig, String> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(|| settings.analysis_config.clone())
        .or_else(|| default_config_path().filter(|p| p.exists()));

    match path {
        Some(path) => {
            tracing::info!(path = %path.display(), "Loading analysis config");
            analysis_config::load_file(&path).map_err(|e| e.to_string())
        }
        None => Ok(AnalysisConfig::default()),
    }
}

fn init_config(explicit: Option<&Path>) -> Result<(), String> {
    let path = explicit
        .map(Path::to_path_buf)
        .or_else(default_config_path)
        .ok_or("No config directory available")?;
    analysis_config::save_file(&path, &AnalysisConfig::default()).map_err(|e| e.to_string())?;
    println!("Wrote {}", path.display());
    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<(), String> {
    let json = serde_json::to_string_pretty(value).map_err(|e| e.to_string())?;
    println!("{}", json);
    Ok(())
}
