mod harvest;
mod logging;
mod scheduler;

use clap::{Parser, Subcommand};

use crate::scheduler::{Cadence, TimeOfDay};

#[derive(Debug, Parser)]
#[command(name = "rozetka-cli")]
#[command(about = "Rozetka catalog harvester")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Harvest every configured category once, then exit.
    Run,
    /// Harvest on a recurring schedule (UTC) until interrupted.
    Schedule {
        #[command(subcommand)]
        cadence: CadenceCommand,
    },
}

#[derive(Debug, Subcommand)]
enum CadenceCommand {
    /// Every day at `--at HH:MM`.
    Daily {
        #[arg(long)]
        at: TimeOfDay,
    },
    /// Every week on `--day` (0 = Monday … 6 = Sunday) at `--at HH:MM`.
    Weekly {
        #[arg(long, value_parser = clap::value_parser!(u8).range(0..=6))]
        day: u8,
        #[arg(long)]
        at: TimeOfDay,
    },
    /// Every month on `--day` (1–31) at `--at HH:MM`.
    Monthly {
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=31))]
        day: u8,
        #[arg(long)]
        at: TimeOfDay,
    },
}

impl From<CadenceCommand> for Cadence {
    fn from(command: CadenceCommand) -> Self {
        match command {
            CadenceCommand::Daily { at } => Cadence::Daily { at },
            CadenceCommand::Weekly { day, at } => Cadence::Weekly { weekday: day, at },
            CadenceCommand::Monthly { day, at } => Cadence::Monthly { day, at },
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = rozetka_core::load_app_config()?;
    let _log_guard = logging::init(&config)?;
    tracing::debug!(?config, "configuration loaded");

    match cli.command {
        Commands::Run => harvest::run_once(&config).await,
        Commands::Schedule { cadence } => scheduler::run_scheduled(config, cadence.into()).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weekly_requires_day_in_range() {
        let parsed = Cli::try_parse_from(["rozetka-cli", "schedule", "weekly", "--day", "7", "--at", "10:00"]);
        assert!(parsed.is_err());
    }

    #[test]
    fn monthly_parses_into_cadence() {
        let cli = Cli::try_parse_from([
            "rozetka-cli", "schedule", "monthly", "--day", "15", "--at", "06:30",
        ])
        .unwrap();
        let Commands::Schedule { cadence } = cli.command else {
            panic!("expected schedule command");
        };
        let cadence: Cadence = cadence.into();
        assert_eq!(cadence.cron_expression(), "0 30 6 15 * *");
    }

    #[test]
    fn daily_rejects_malformed_time() {
        assert!(Cli::try_parse_from(["rozetka-cli", "schedule", "daily", "--at", "25:00"]).is_err());
        assert!(Cli::try_parse_from(["rozetka-cli", "schedule", "daily", "--at", "noon"]).is_err());
    }

    #[test]
    fn run_takes_no_arguments() {
        let cli = Cli::try_parse_from(["rozetka-cli", "run"]).unwrap();
        assert!(matches!(cli.command, Commands::Run));
    }
}
