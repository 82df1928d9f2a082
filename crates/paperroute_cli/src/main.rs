//! `paperroute` command-line entry point.
//!
//! # Responsibility
//! - Resolve configuration from `.env`, the environment and flags.
//! - Run agency operations against the configured database and print JSON.

use clap::{Parser, Subcommand, ValueEnum};
use log::error;
use paperroute_core::repo::carrier_repo::SqliteCarrierRepository;
use paperroute_core::{
    assign_deliveries, flush_logging, init_logging, open_db, AgencyConfig, AssignmentRequest,
    CarrierService, RemainderPolicy,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

type CliResult<T> = Result<T, Box<dyn Error>>;

/// Newspaper agency delivery tools
#[derive(Parser)]
#[command(name = "paperroute", version)]
struct Cli {
    /// SQLite database file (overrides PAPERROUTE_DATABASE_PATH)
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Log level: trace, debug, info, warn, error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files; stderr when unset
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Check core linkage
    Ping,
    /// Assign one day's unassigned deliveries to active carriers
    Assign {
        /// Delivery date as YYYY-MM-DD; defaults to today
        #[arg(long)]
        date: Option<String>,

        /// How deliveries left after the even split are handed out
        #[arg(long, value_enum)]
        policy: Option<PolicyArg>,

        /// Report the plan without persisting it
        #[arg(long)]
        dry_run: bool,
    },
    /// List carriers
    Carriers {
        /// Only carriers currently on duty
        #[arg(long)]
        active: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PolicyArg {
    PerCarrier,
    FirstCarriers,
}

impl From<PolicyArg> for RemainderPolicy {
    fn from(value: PolicyArg) -> Self {
        match value {
            PolicyArg::PerCarrier => Self::PerCarrier,
            PolicyArg::FirstCarriers => Self::FirstCarriers,
        }
    }
}

fn main() -> ExitCode {
    let _ = dotenv::dotenv();
    let cli = Cli::parse();

    let code = match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_exit module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    };
    flush_logging();
    code
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = AgencyConfig::from_env()?;
    if let Some(database) = cli.database {
        config.database_path = database;
    }
    if let Some(level) = cli.log_level {
        config.log_level = level;
    }
    if cli.log_dir.is_some() {
        config.log_dir = cli.log_dir;
    }
    init_logging(&config.log_level, config.log_dir.as_deref())?;

    match cli.command {
        Command::Ping => {
            println!(
                "{}",
                serde_json::json!({
                    "ping": paperroute_core::ping(),
                    "version": paperroute_core::core_version(),
                })
            );
        }
        Command::Assign {
            date,
            policy,
            dry_run,
        } => {
            let date = date.unwrap_or_else(|| {
                chrono::Local::now()
                    .date_naive()
                    .format("%Y-%m-%d")
                    .to_string()
            });
            let mut request = AssignmentRequest::new(date)
                .with_policy(policy.map_or(config.remainder_policy, RemainderPolicy::from));
            request.dry_run = dry_run;

            let mut conn = open_db(&config.database_path)?;
            let report = assign_deliveries(&mut conn, &request)?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Command::Carriers { active } => {
            let conn = open_db(&config.database_path)?;
            let service = CarrierService::new(SqliteCarrierRepository::try_new(&conn)?);
            let carriers = service.list(active)?;
            println!("{}", serde_json::to_string_pretty(&carriers)?);
        }
    }
    Ok(())
}
