//! Paged download of the fund ranking and the JSON locator shared by the
//! eastmoney script endpoints.

use serde::de::DeserializeOwned;
use tracing::{debug, info, instrument};

use crate::core::{Category, DateWindow, FundError, FundRecord};
use crate::providers::eastmoney::EastmoneyClient;

pub const DEFAULT_PAGE_SIZE: usize = 1000;

/// Sort key of the ranking query: growth since one year.
const SORT_COLUMN: &str = "1nzf";

/// Finds the first JSON array of `T` embedded in `body`.
///
/// Every `[` is tried in turn and the first one parsing as an array of `T`
/// wins; text after the array is ignored.
pub fn locate_json_array<T: DeserializeOwned>(body: &str) -> Option<Vec<T>> {
    body.match_indices('[').find_map(|(idx, _)| {
        serde_json::Deserializer::from_str(&body[idx..])
            .into_iter::<Vec<T>>()
            .next()?
            .ok()
    })
}

/// Splits a ranking response into comma-joined lines.
pub fn parse_rank_lines(body: &str) -> Result<Vec<String>, FundError> {
    locate_json_array(body).ok_or_else(|| {
        let preview: String = body.chars().take(120).collect();
        FundError::MalformedResponse(format!("no JSON array of strings in response: {preview:?}"))
    })
}

/// Splits a ranking response into rows of fields.
pub fn parse_rank_page(body: &str) -> Result<Vec<Vec<String>>, FundError> {
    Ok(parse_rank_lines(body)?
        .iter()
        .map(|line| line.split(',').map(str::to_string).collect())
        .collect())
}

/// Pages through the fund ranking of one category.
pub struct RankCollector {
    client: EastmoneyClient,
    window: DateWindow,
}

impl RankCollector {
    pub fn new(client: EastmoneyClient, window: DateWindow) -> Self {
        RankCollector { client, window }
    }

    pub async fn collect(
        &self,
        category: &str,
        page_size: usize,
        period: &str,
    ) -> Result<Vec<FundRecord>, FundError> {
        self.collect_raw(category, page_size, period)
            .await?
            .iter()
            .map(|line| FundRecord::from_line(line))
            .collect()
    }

    /// Collects the comma-joined lines without splitting them into records.
    ///
    /// Requests pages from 1 until one holds fewer than `page_size` lines, so
    /// a ranking whose size is a multiple of `page_size` ends with an empty
    /// page.
    pub async fn collect_raw(
        &self,
        category: &str,
        page_size: usize,
        period: &str,
    ) -> Result<Vec<String>, FundError> {
        let category: Category = category.parse()?;
        let page_size = page_size.max(1);
        let start_date = self.window.today();
        let end_date = self.window.shifted_by(period)?;
        info!(
            "Collecting {} fund ranking from {} back to {}",
            category, start_date, end_date
        );

        let mut funds = Vec::new();
        let mut page_index = 1;
        loop {
            let page = self
                .fetch_page(category, page_index, page_size, &start_date, &end_date)
                .await?;
            let count = page.len();
            funds.extend(page);

            if count < page_size {
                break;
            }
            page_index += 1;
        }

        info!("Collected {} funds in {} pages", funds.len(), page_index);
        Ok(funds)
    }

    #[instrument(name = "RankPageFetch", skip(self, start_date, end_date))]
    async fn fetch_page(
        &self,
        category: Category,
        page_index: usize,
        page_size: usize,
        start_date: &str,
        end_date: &str,
    ) -> Result<Vec<String>, FundError> {
        let query = [
            ("op", "ph".to_string()),
            ("dt", "kf".to_string()),
            ("ft", category.as_str().to_string()),
            ("rs", String::new()),
            ("gs", "0".to_string()),
            ("sc", SORT_COLUMN.to_string()),
            ("st", "desc".to_string()),
            ("sd", start_date.to_string()),
            ("ed", end_date.to_string()),
            ("qdii", String::new()),
            ("tabSubtype", ",,,,,".to_string()),
            ("pi", page_index.to_string()),
            ("pn", page_size.to_string()),
            ("dx", "1".to_string()),
        ];

        let body = self.client.fetch_rank_page(&query).await?;
        let lines = parse_rank_lines(&body)?;
        debug!("Page {} returned {} funds", page_index, lines.len());
        Ok(lines)
    }
}
