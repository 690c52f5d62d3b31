use anyhow::Result;
use chrono::NaiveDate;
use clap::{CommandFactory, Parser, Subcommand};
use typefortune::core::history::DEFAULT_TREND_WINDOW;
use typefortune::core::log::init_logging;
use typefortune::core::personality::PersonalityType;

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for typefortune::AppCommand {
    fn from(cmd: Commands) -> typefortune::AppCommand {
        match cmd {
            Commands::Fortune {
                personality,
                date,
                narrate,
                ephemeral,
            } => typefortune::AppCommand::Fortune {
                personality,
                date,
                narrate,
                ephemeral,
            },
            Commands::History { days } => typefortune::AppCommand::History { days },
            Commands::Export => typefortune::AppCommand::Export,
            Commands::Reset => typefortune::AppCommand::Reset,
            Commands::Prefs { set } => typefortune::AppCommand::Prefs { set },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Show and record today's fortune for a personality type
    Fortune {
        /// Four-letter personality type, e.g. INTJ
        personality: PersonalityType,
        /// Day to compute (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Generate personal texts with the configured narrator
        #[arg(short, long)]
        narrate: bool,
        /// Do not persist this query
        #[arg(long)]
        ephemeral: bool,
    },
    /// Display trend, dimension analysis, statistics and achievements
    History {
        /// Number of recent days used for the trend
        #[arg(long, default_value_t = DEFAULT_TREND_WINDOW)]
        days: usize,
    },
    /// Print the stored profile as JSON
    Export,
    /// Clear history, statistics and achievements
    Reset,
    /// Show or update preferences
    Prefs {
        /// KEY=VALUE pairs to merge; values are parsed as JSON when possible
        #[arg(long = "set", value_name = "KEY=VALUE")]
        set: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let result = match cli.command {
        Some(Commands::Setup) => typefortune::cli::setup::setup(),
        Some(cmd) => typefortune::run_command(cmd.into(), cli.config_path.as_deref()).await,
        None => {
            Cli::command().print_help()?;
            Ok(())
        }
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}
