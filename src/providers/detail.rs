use std::time::Duration;
use tracing::{debug, info, instrument};

use crate::core::{FundDetailRecord, FundError};
use crate::providers::eastmoney::EastmoneyClient;
use crate::providers::html::{HtmlTable, extract_tables, find_table};
use crate::providers::util::{RetryError, RetryPolicy, is_connection_reset, with_retry};

/// Position of the record table on pages that do not match by shape.
pub const FALLBACK_TABLE_INDEX: usize = 1;

/// A label every detail table carries.
const ANCHOR_LABEL: &str = "基金代码";

/// Label/value column pairs laid side by side in the record table.
const COLUMN_PAIRS: [(usize, usize); 2] = [(0, 1), (2, 3)];

pub(crate) fn fetch_error(code: &str, err: RetryError<reqwest::Error>) -> FundError {
    let reason = match err {
        RetryError::Exhausted { attempts, last } => {
            format!("gave up after {attempts} attempt(s): {last}")
        }
        RetryError::Fatal(err) => err.to_string(),
    };
    FundError::Fetch {
        code: code.to_string(),
        reason,
    }
}

fn is_detail_table(table: &HtmlTable) -> bool {
    table.width() >= 4
        && COLUMN_PAIRS
            .iter()
            .any(|(label, _)| table.column(*label).any(|c| c == ANCHOR_LABEL))
}

/// Transposes the label/value pairs of a detail page into one record.
pub fn parse_detail_page(code: &str, url: &str, html: &str) -> Result<FundDetailRecord, FundError> {
    let tables = extract_tables(html);
    let table = find_table(&tables, is_detail_table, FALLBACK_TABLE_INDEX)
        .ok_or_else(|| FundError::page_shape(url, format!("found {} table(s)", tables.len())))?;
    if table.width() < 4 {
        return Err(FundError::page_shape(
            url,
            format!("detail table has {} column(s), expected 4", table.width()),
        ));
    }

    let mut record = FundDetailRecord::new(code);
    for (label_col, value_col) in COLUMN_PAIRS {
        for row in &table.rows {
            let Some(label) = row.get(label_col).filter(|l| !l.is_empty()) else {
                continue;
            };
            let value = row.get(value_col).map(String::as_str).unwrap_or_default();
            if !record.insert(label, value) {
                debug!("Fund {} repeats label {}, keeping the first value", code, label);
            }
        }
    }
    Ok(record)
}

/// Fetches the detail page of each fund code.
pub struct DetailCollector {
    client: EastmoneyClient,
    policy: RetryPolicy,
    delay: Duration,
}

impl DetailCollector {
    pub fn new(client: EastmoneyClient, policy: RetryPolicy, delay: Duration) -> Self {
        DetailCollector {
            client,
            policy,
            delay,
        }
    }

    /// Collects one record per code, in order. The first failing code aborts
    /// the collection.
    pub async fn collect(
        &self,
        codes: &[String],
        update_callback: &(dyn Fn()),
    ) -> Result<Vec<FundDetailRecord>, FundError> {
        info!("Collecting details of {} funds", codes.len());
        let mut records = Vec::with_capacity(codes.len());
        for (count, code) in codes.iter().enumerate() {
            if count > 0 {
                tokio::time::sleep(self.delay).await;
            }
            records.push(self.fetch_detail(code).await?);
            update_callback();
            debug!("Already got {} funds", count + 1);
        }
        Ok(records)
    }

    #[instrument(name = "DetailFetch", skip(self))]
    async fn fetch_detail(&self, code: &str) -> Result<FundDetailRecord, FundError> {
        let url = self.client.detail_url(code);
        let html = with_retry(
            || self.client.fetch_page(&url),
            &self.policy,
            is_connection_reset,
        )
        .await
        .map_err(|e| fetch_error(code, e))?;

        parse_detail_page(code, &url, &html)
    }
}

#[cfg(test)]
pub(crate) mod test_pages {
    /// A detail page laid out like eastmoney's f10 overview.
    pub fn detail_page(code: &str, name: &str) -> String {
        format!(
            r#"<html><body>
            <table class="nav"><tr><td>首页</td><td>基金档案</td></tr></table>
            <table class="info w790">
              <tr><th>基金全称</th><td>{name}证券投资基金</td><th>基金简称</th><td>{name}</td></tr>
              <tr><th>基金代码</th><td>{code}（前端）</td><th>基金类型</th><td>混合型-偏股</td></tr>
              <tr><th>发行日期</th><td>2001年11月28日</td><th>成立日期/规模</th><td>2001年12月18日 / 32.37亿份</td></tr>
            </table>
            <table><tr><td>footer</td></tr></table>
            </body></html>"#
        )
    }
}
