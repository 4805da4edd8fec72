mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use moodreel_core::config::default_config_path;
use moodreel_core::{AppConfig, Mode, Mood, SessionController};

use commands::helpers::{open_database, open_session, StoreArgs};

#[derive(Parser)]
#[command(name = "moodreel")]
#[command(about = "Mood-aware feed ranking with a daily usage budget", long_about = None)]
struct Cli {
    /// SQLite database to use instead of the configured one
    #[arg(long, global = true)]
    db: Option<PathBuf>,
    /// Keep all state in memory for this invocation
    #[arg(long, global = true)]
    ephemeral: bool,
    /// Config file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,
    /// Show debug logs
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show today's usage, tier and break state
    Status {
        /// Print the snapshot as JSON
        #[arg(long)]
        json: bool,
    },
    /// Record usage
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },
    /// Reset today's usage to zero
    Reset,
    /// Show or change the daily limit
    Limit {
        /// New limit in minutes (must be a preset unless --custom)
        minutes: Option<u32>,
        /// Accept a limit that is not one of the presets
        #[arg(long)]
        custom: bool,
    },
    /// Take a break and count it down (Ctrl-C cancels)
    Break {
        /// Break length in minutes
        #[arg(default_value_t = 5)]
        minutes: u32,
        /// Accept a length that is not one of the presets
        #[arg(long)]
        custom: bool,
    },
    /// Show or select the current mood
    Mood {
        /// focus, fun, learn or chill
        mood: Option<Mood>,
    },
    /// Show or add to the local energy score
    Energy {
        /// Points to add (the score is capped at 100)
        #[arg(long)]
        add: Option<u8>,
    },
    /// Rank a content catalog for a mood at the current usage
    Feed {
        /// JSON file with the candidate items
        catalog: PathBuf,
        /// Mood to rank for (defaults to the current mood)
        #[arg(short, long)]
        mood: Option<Mood>,
        /// Usage ratio to rank at (defaults to today's usage)
        #[arg(short, long)]
        ratio: Option<f64>,
        /// Print the ranked items as JSON
        #[arg(long)]
        json: bool,
    },
    /// Show content length bounds, or check a clip length against a mode
    Modes {
        /// Mode to check
        #[arg(long, requires = "seconds")]
        mode: Option<Mode>,
        /// Clip length in seconds
        #[arg(long, requires = "mode")]
        seconds: Option<u32>,
    },
    /// Show creator rank and achievements from a stats file
    Creator {
        /// JSON file with videos, followers, topVideoViews and energyLevel
        stats: PathBuf,
    },
    /// Run a session in the foreground, counting usage until Ctrl-C
    Run {
        /// Real seconds per counted usage minute
        #[arg(long, default_value_t = 60)]
        minute_seconds: u64,
        /// Write logs to the data directory instead of stderr
        #[arg(long)]
        log_file: bool,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
    /// Stored state management
    Data {
        #[command(subcommand)]
        action: DataAction,
    },
}

#[derive(Subcommand, Debug)]
enum UsageAction {
    /// Add minutes of usage
    Add { minutes: u32 },
}

#[derive(Subcommand, Debug)]
enum ConfigAction {
    /// Get a configuration value
    Get {
        /// Key in <section>.<key> form (e.g., limits.daily_limit_presets)
        key: String,
    },
    /// Set a configuration value
    Set { key: String, value: String },
    /// List all configuration values
    List,
}

#[derive(Subcommand, Debug)]
enum DataAction {
    /// List stored keys
    List,
    /// Export stored state as JSON
    Export {
        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Delete a stored key
    Delete { key: String },
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter))
        .format_timestamp_secs()
        .init();
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if matches!(cli.command, Commands::Run { log_file: true, .. }) {
        commands::run::setup_file_logging(cli.verbose)?;
    } else {
        init_logging(cli.verbose);
    }

    let config_path = match cli.config {
        Some(path) => path,
        None => default_config_path()?,
    };
    let store_args = StoreArgs {
        db: cli.db,
        ephemeral: cli.ephemeral,
    };

    match cli.command {
        Commands::Config { action } => match action {
            ConfigAction::Get { key } => commands::config::handle_config_get(&config_path, &key),
            ConfigAction::Set { key, value } => {
                commands::config::handle_config_set(&config_path, &key, &value)
            }
            ConfigAction::List => commands::config::handle_config_list(&config_path),
        },
        Commands::Data { action } => {
            let config = AppConfig::load(&config_path)?;
            let db = open_database(&store_args, &config)?;
            match action {
                DataAction::List => commands::data::handle_data_list(&db),
                DataAction::Export { output } => {
                    commands::data::handle_data_export(&db, output.as_deref())
                }
                DataAction::Delete { key } => commands::data::handle_data_delete(&db, &key),
            }
        }
        Commands::Modes { mode, seconds } => {
            commands::feed::handle_modes_command(mode.zip(seconds))
        }
        Commands::Creator { stats } => commands::creator::handle_creator_command(&stats),
        command => {
            let config = AppConfig::load(&config_path)?;
            let mut session = open_session(&store_args, &config).await?;
            let result = run_session_command(command, &mut session, &config).await;
            session.dispose();
            result
        }
    }
}

async fn run_session_command(
    command: Commands,
    session: &mut SessionController,
    config: &AppConfig,
) -> Result<()> {
    use commands::{budget, feed, run};

    match command {
        Commands::Status { json } => budget::handle_status_command(session, json).await,
        Commands::Usage {
            action: UsageAction::Add { minutes },
        } => budget::handle_usage_add(session, minutes).await,
        Commands::Reset => budget::handle_reset_command(session).await,
        Commands::Limit { minutes, custom } => {
            budget::handle_limit_command(session, config, minutes, custom).await
        }
        Commands::Break { minutes, custom } => {
            budget::handle_break_command(session, config, minutes, custom).await
        }
        Commands::Mood { mood } => feed::handle_mood_command(session, mood),
        Commands::Energy { add } => feed::handle_energy_command(session, add),
        Commands::Feed {
            catalog,
            mood,
            ratio,
            json,
        } => feed::handle_feed_command(session, &catalog, mood, ratio, json).await,
        Commands::Run { minute_seconds, .. } => {
            run::handle_run_command(session, minute_seconds).await
        }
        other => anyhow::bail!("{other:?} does not run inside a session"),
    }
}
