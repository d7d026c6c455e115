use super::ui;
use crate::core::DateWindow;
use crate::core::config::CollectConfig;
use crate::providers::{DetailCollector, EastmoneyClient, RankCollector, RiskStatsCollector};
use crate::store;
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Collects the ranking, detail and risk datasets into `data_dir`.
///
/// Each dataset is written as soon as it is complete, so a failure in a
/// later phase leaves the earlier files in place.
pub async fn run(config: &CollectConfig, client: &EastmoneyClient, data_dir: &Path) -> Result<()> {
    std::fs::create_dir_all(data_dir)
        .with_context(|| format!("Failed to create data directory: {}", data_dir.display()))?;

    let rank_collector = RankCollector::new(client.clone(), DateWindow::now());
    let ranks = rank_collector
        .collect(&config.category, config.page_size, &config.period)
        .await
        .context("Failed to collect fund ranking")?;
    store::save_ranks(data_dir, &ranks)?;
    info!("Saved {} ranked funds", ranks.len());

    let codes: Vec<String> = ranks.iter().map(|r| r.code.clone()).collect();

    let pb = ui::new_progress_bar(codes.len() as u64, "details");
    let detail_collector = DetailCollector::new(
        client.clone(),
        config.detail.retry_policy(),
        config.detail.delay(),
    );
    let details = detail_collector
        .collect(&codes, &|| pb.inc(1))
        .await
        .context("Failed to collect fund details")?;
    pb.finish_and_clear();
    store::save_details(data_dir, &details)?;
    info!("Saved details of {} funds", details.len());

    let pb = ui::new_progress_bar(codes.len() as u64, "risk statistics");
    let risk_collector = RiskStatsCollector::new(
        client.clone(),
        config.risk.retry_policy(),
        config.risk.delay(),
    );
    let risks = risk_collector
        .collect(&codes, &|| pb.inc(1))
        .await
        .context("Failed to collect fund risk statistics")?;
    pb.finish_and_clear();
    store::save_risks(data_dir, &risks)?;
    info!("Saved risk statistics of {} funds", risks.len());

    println!(
        "Collected {} funds into {}",
        ranks.len(),
        ui::style_text(&data_dir.display().to_string(), ui::StyleType::Title)
    );
    Ok(())
}
