use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::core::{FundError, FundRiskRecord};
use crate::providers::detail::fetch_error;
use crate::providers::eastmoney::EastmoneyClient;
use crate::providers::html::{HtmlTable, extract_tables, find_table};
use crate::providers::util::{RetryPolicy, is_connection_reset, with_retry};

/// Position of the statistics table on pages that do not match by shape.
pub const FALLBACK_TABLE_INDEX: usize = 1;

/// Header of the label column, repeating the table's caption.
const CAPTION_COLUMN: &str = "基金风险指标";

fn is_risk_table(table: &HtmlTable) -> bool {
    table
        .rows
        .first()
        .is_some_and(|header| header.iter().any(|c| c == CAPTION_COLUMN))
}

/// Extracts the Sharpe ratios from a risk statistics page.
///
/// The table's first row is its header. The caption column is dropped, the
/// first data row (standard deviation) is skipped and the next one holds the
/// 1, 2 and 3 year Sharpe ratios.
pub fn parse_risk_page(code: &str, url: &str, html: &str) -> Result<FundRiskRecord, FundError> {
    let tables = extract_tables(html);
    let table = find_table(&tables, is_risk_table, FALLBACK_TABLE_INDEX)
        .ok_or_else(|| FundError::page_shape(url, format!("found {} table(s)", tables.len())))?;
    if table.width() < 4 {
        return Err(FundError::page_shape(
            url,
            format!("risk table has {} column(s), expected 4", table.width()),
        ));
    }

    let caption = table
        .rows
        .first()
        .and_then(|header| header.iter().position(|c| c == CAPTION_COLUMN))
        .ok_or_else(|| FundError::page_shape(url, format!("no '{CAPTION_COLUMN}' column")))?;
    let row = table
        .rows
        .iter()
        .skip(1)
        .nth(1)
        .ok_or_else(|| FundError::page_shape(url, "no Sharpe ratio row"))?;

    let values: Vec<&str> = row
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != caption)
        .map(|(_, v)| v.as_str())
        .collect();
    let [sharpe_1y, sharpe_2y, sharpe_3y] = values.as_slice() else {
        return Err(FundError::page_shape(
            url,
            format!("Sharpe ratio row has {} value(s), expected 3", values.len()),
        ));
    };
    debug!(
        "Fund {} Sharpe ratios: {} / {} / {}",
        code, sharpe_1y, sharpe_2y, sharpe_3y
    );

    Ok(FundRiskRecord {
        code: code.to_string(),
        sharpe_1y: sharpe_1y.to_string(),
        sharpe_2y: sharpe_2y.to_string(),
        sharpe_3y: sharpe_3y.to_string(),
    })
}

/// Fetches the risk statistics page of each fund code.
///
/// Defaults to a single attempt per page, unlike [`super::detail::DetailCollector`].
pub struct RiskStatsCollector {
    client: EastmoneyClient,
    policy: RetryPolicy,
    delay: Duration,
}

impl RiskStatsCollector {
    pub fn new(client: EastmoneyClient, policy: RetryPolicy, delay: Duration) -> Self {
        RiskStatsCollector {
            client,
            policy,
            delay,
        }
    }

    pub async fn collect(
        &self,
        codes: &[String],
        update_callback: &(dyn Fn()),
    ) -> Result<Vec<FundRiskRecord>, FundError> {
        info!("Collecting risk statistics of {} funds", codes.len());
        let mut records = Vec::with_capacity(codes.len());
        for (count, code) in codes.iter().enumerate() {
            if count > 0 && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            records.push(self.fetch_stats(code).await?);
            update_callback();
            debug!("Already got {} funds", count + 1);
        }
        Ok(records)
    }

    #[instrument(name = "RiskFetch", skip(self))]
    async fn fetch_stats(&self, code: &str) -> Result<FundRiskRecord, FundError> {
        let url = self.client.risk_url(code);
        let html = with_retry(
            || self.client.fetch_page(&url),
            &self.policy,
            is_connection_reset,
        )
        .await
        .map_err(|e| fetch_error(code, e))?;

        parse_risk_page(code, &url, &html)
    }
}
