use chrono::NaiveDate;
use clap::{Parser, Subcommand};

mod collect;
mod recent;

#[derive(Debug, Parser)]
#[command(name = "rxwatch")]
#[command(about = "Drug recall and safety alert collector")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Collect alerts from the configured sources and store them.
    Collect {
        /// Restrict the run to one source id (e.g. NAFDAC_NG).
        #[arg(long)]
        source: Option<String>,
        /// Override the configured start date (YYYY-MM-DD).
        #[arg(long)]
        since: Option<NaiveDate>,
        /// Parse and report without writing to the database.
        #[arg(long)]
        dry_run: bool,
    },
    /// Show the most recently published stored alerts.
    Recent {
        #[arg(long, default_value_t = 20)]
        limit: u32,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();
    let config = rxwatch_core::config::load_app_config()?;

    match cli.command {
        Commands::Collect {
            source,
            since,
            dry_run,
        } => collect::run_collect(&config, source.as_deref(), since, dry_run).await,
        Commands::Recent { limit } => recent::run_recent(&config, limit).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn collect_flags_parse() {
        let cli = Cli::parse_from([
            "rxwatch",
            "collect",
            "--source",
            "NAFDAC_NG",
            "--since",
            "2026-01-01",
            "--dry-run",
        ]);
        match cli.command {
            Commands::Collect {
                source,
                since,
                dry_run,
            } => {
                assert_eq!(source.as_deref(), Some("NAFDAC_NG"));
                assert_eq!(since, NaiveDate::from_ymd_opt(2026, 1, 1));
                assert!(dry_run);
            }
            Commands::Recent { .. } => panic!("expected collect"),
        }
    }

    #[test]
    fn recent_limit_defaults() {
        let cli = Cli::parse_from(["rxwatch", "recent"]);
        match cli.command {
            Commands::Recent { limit } => assert_eq!(limit, 20),
            Commands::Collect { .. } => panic!("expected recent"),
        }
    }
}
