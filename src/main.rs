use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use fundrank::core::config::AppConfig;
use fundrank::core::log::{LogContext, init_logging};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log at debug level
    #[arg(short, long, global = true)]
    debug: bool,

    /// Log to the console instead of the log file
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long, global = true)]
    config_path: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

impl From<Commands> for fundrank::AppCommand {
    fn from(cmd: Commands) -> fundrank::AppCommand {
        match cmd {
            Commands::Collect {
                category,
                page_size,
                period,
            } => fundrank::AppCommand::Collect(fundrank::CollectOptions {
                category,
                page_size,
                period,
            }),
            Commands::Analysis { top } => fundrank::AppCommand::Analysis { top_n: top },
            Commands::Setup => unreachable!("Setup command should be handled separately"),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Create default configuration
    Setup,
    /// Download fund ranking, details and risk statistics
    Collect {
        /// Fund category: all, gp, hh, zq, zs, bb, qdii or lof
        #[arg(long)]
        category: Option<String>,
        /// Funds requested per ranking page
        #[arg(long, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
        page_size: Option<usize>,
        /// Ranking window such as 7d, 6m or 1y
        #[arg(long)]
        period: Option<String>,
    },
    /// Build the weighted ranking reports from collected data
    Analysis {
        /// Rows kept in the truncated report
        #[arg(long)]
        top: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_context = LogContext::new(
        "fundrank",
        cli.debug,
        cli.verbose,
        AppConfig::default_log_dir()?,
    );
    init_logging(&log_context)?;

    let result = match cli.command {
        Some(Commands::Setup) => fundrank::cli::setup::setup(),
        Some(cmd) => fundrank::run_command(cmd.into(), cli.config_path.as_deref()).await,
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collect_accepts_overrides() {
        let cli = Cli::try_parse_from([
            "fundrank",
            "collect",
            "--category",
            "hh",
            "--page-size",
            "200",
            "--period",
            "6m",
        ])
        .unwrap();
        match cli.command {
            Some(Commands::Collect {
                category,
                page_size,
                period,
            }) => {
                assert_eq!(category.as_deref(), Some("hh"));
                assert_eq!(page_size, Some(200));
                assert_eq!(period.as_deref(), Some("6m"));
            }
            _ => panic!("expected the collect command"),
        }
    }

    #[test]
    fn test_page_size_must_be_positive() {
        assert!(Cli::try_parse_from(["fundrank", "collect", "--page-size", "0"]).is_err());
        assert!(Cli::try_parse_from(["fundrank", "collect", "--page-size", "1"]).is_ok());
    }

    #[test]
    fn test_global_flags_follow_the_subcommand() {
        let cli = Cli::try_parse_from(["fundrank", "analysis", "--top", "50", "-d", "-v"]).unwrap();
        assert!(cli.debug);
        assert!(cli.verbose);
        assert!(matches!(cli.command, Some(Commands::Analysis { top: Some(50) })));
    }
}
