use anyhow::{Context, Result};
use clap::Parser;
use fundrank::core::DateWindow;
use fundrank::core::config::AppConfig;
use fundrank::core::fund::FUND_RANK_TITLES;
use fundrank::core::log::{LogContext, init_logging};
use fundrank::providers::codes::FUND_LIST_TITLES;
use fundrank::providers::{EastmoneyClient, FundListCollector, RankCollector};
use std::io::Write;

/// Dumps the raw fund ranking of one category, or the full fund code list,
/// to a text file.
#[derive(Parser)]
#[command(version, about)]
struct Cli {
    /// Log at debug level
    #[arg(short, long)]
    debug: bool,

    /// Log to the console instead of the log file
    #[arg(short, long)]
    verbose: bool,

    /// Path to optional configuration file
    #[arg(short, long)]
    config_path: Option<String>,

    /// Fund category: all, gp, hh, zq, zs, bb, qdii or lof
    #[arg(long, default_value = "gp")]
    category: String,

    /// List every fund code instead of the ranking
    #[arg(long)]
    all_codes: bool,

    /// Output file
    #[arg(long, default_value = "fund-result.csv")]
    output: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_context = LogContext::new(
        "fund_list",
        cli.debug,
        cli.verbose,
        AppConfig::default_log_dir()?,
    );
    init_logging(&log_context)?;

    let result = run(&cli).await;
    if let Err(e) = &result {
        tracing::error!(error = %e, "Application failed");
    }
    result
}

async fn run(cli: &Cli) -> Result<()> {
    let config = fundrank::load_config(cli.config_path.as_deref())?;
    let client = EastmoneyClient::new(&config.providers.eastmoney.base_url)?;

    let lines: Vec<String> = if cli.all_codes {
        let funds = FundListCollector::new(client)
            .collect()
            .await
            .context("Failed to collect fund list")?;
        funds.iter().map(|fund| fund.join(",")).collect()
    } else {
        RankCollector::new(client, DateWindow::now())
            .collect_raw(&cli.category, config.collect.page_size, &config.collect.period)
            .await
            .context("Failed to collect fund ranking")?
    };
    let titles: &[&str] = if cli.all_codes {
        &FUND_LIST_TITLES[..]
    } else {
        &FUND_RANK_TITLES[..]
    };

    let file = std::fs::File::create(&cli.output)
        .with_context(|| format!("Failed to create {}", cli.output))?;
    write_lines(file, titles, &lines)
        .with_context(|| format!("Failed to write {}", cli.output))?;
    for line in &lines {
        println!("{line}");
    }
    tracing::info!("Wrote {} funds to {}", lines.len(), cli.output);
    Ok(())
}

/// Writes the comma-joined `titles` then each line unchanged.
fn write_lines<W: Write>(mut writer: W, titles: &[&str], lines: &[String]) -> Result<()> {
    writeln!(writer, "{}", titles.join(","))?;
    for line in lines {
        writeln!(writer, "{line}")?;
    }
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header_comes_before_raw_lines() {
        let lines = vec![
            "000001,华夏成长混合,HXCZHH".to_string(),
            "000003,中海可转债债券A,ZHKZZZQA".to_string(),
        ];
        let mut output = Vec::new();
        write_lines(&mut output, &FUND_RANK_TITLES, &lines).unwrap();

        let text = String::from_utf8(output).unwrap();
        let written: Vec<&str> = text.lines().collect();
        assert_eq!(written.len(), 3);
        assert_eq!(written[0], FUND_RANK_TITLES.join(","));
        assert!(written[0].starts_with("code,基金简称"));
        assert_eq!(&written[1..], ["000001,华夏成长混合,HXCZHH", "000003,中海可转债债券A,ZHKZZZQA"]);
    }

    #[test]
    fn test_empty_listing_writes_only_header() {
        let mut output = Vec::new();
        write_lines(&mut output, &FUND_LIST_TITLES, &[]).unwrap();
        assert_eq!(String::from_utf8(output).unwrap(), "code,拼音缩写,基金简称,基金类型,拼音全称\n");
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["fund_list"]).unwrap();
        assert_eq!(cli.category, "gp");
        assert_eq!(cli.output, "fund-result.csv");
        assert!(!cli.all_codes);

        let cli = Cli::try_parse_from(["fund_list", "--all-codes", "--output", "codes.csv"]).unwrap();
        assert!(cli.all_codes);
        assert_eq!(cli.output, "codes.csv");
    }
}
