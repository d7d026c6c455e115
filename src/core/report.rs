//! Joins the collected datasets and ranks funds by a weighted return score.
use crate::core::fund::{FundDetailRecord, FundRecord, FundRiskRecord};
use std::cmp::Ordering;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Ranking columns projected into the report: 3y, 2y, 1y, 6m, 3m.
pub const RETURN_TITLES: [&str; 5] = ["近3年", "近2年", "近1年", "近6月", "近3月"];

/// Weights applied to [`RETURN_TITLES`], in the same order. They sum to 1.
pub const RANK_WEIGHTS: [f64; 5] = [0.30, 0.25, 0.20, 0.15, 0.10];

pub const RANK_COLUMN: &str = "rank";

/// A fund present in all three datasets.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportRow {
    pub detail: FundDetailRecord,
    /// Raw return strings in [`RETURN_TITLES`] order.
    pub returns: [String; 5],
    pub risk: FundRiskRecord,
    /// Weighted score; NaN when any return is missing or not a number.
    pub rank: f64,
}

impl ReportRow {
    pub fn code(&self) -> &str {
        &self.detail.code
    }
}

#[derive(Debug, Clone, Default)]
pub struct Report {
    /// Every joined row, best score first.
    pub all: Vec<ReportRow>,
    /// The leading rows of `all`.
    pub top: Vec<ReportRow>,
    /// Every joined row ordered by Sharpe ratio 3y, then 2y, then 1y.
    pub by_risk: Vec<ReportRow>,
}

/// Finite numbers only; "inf" or "NaN" scraped from a page count as missing.
fn parse_number(value: &str) -> f64 {
    value
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .unwrap_or(f64::NAN)
}

/// Computes the weighted score of returns given in [`RETURN_TITLES`] order.
pub fn rank_score<S: AsRef<str>>(returns: &[S; 5]) -> f64 {
    returns
        .iter()
        .zip(RANK_WEIGHTS)
        .map(|(value, weight)| parse_number(value.as_ref()) * weight)
        .sum()
}

/// Descending order with NaN after every number.
fn descending_nan_last(a: f64, b: f64) -> Ordering {
    match (a.is_nan(), b.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
    }
}

fn by_sharpe(a: &ReportRow, b: &ReportRow) -> Ordering {
    let sharpe = |row: &ReportRow| {
        [&row.risk.sharpe_3y, &row.risk.sharpe_2y, &row.risk.sharpe_1y].map(|v| parse_number(v))
    };
    let (a, b) = (sharpe(a), sharpe(b));
    descending_nan_last(a[0], b[0])
        .then_with(|| descending_nan_last(a[1], b[1]))
        .then_with(|| descending_nan_last(a[2], b[2]))
}

/// Inner-joins details with ranking returns and risk statistics on the fund
/// code, keeping the order of `details`.
pub fn join(
    ranks: &[FundRecord],
    details: &[FundDetailRecord],
    risks: &[FundRiskRecord],
) -> Vec<ReportRow> {
    let mut rank_by_code: HashMap<&str, &FundRecord> = HashMap::new();
    for record in ranks {
        if rank_by_code.contains_key(record.code.as_str()) {
            warn!("Duplicate ranking row for fund {}, keeping the first", record.code);
            continue;
        }
        rank_by_code.insert(&record.code, record);
    }
    let mut risk_by_code: HashMap<&str, &FundRiskRecord> = HashMap::new();
    for record in risks {
        risk_by_code.entry(&record.code).or_insert(record);
    }

    details
        .iter()
        .filter_map(|detail| {
            let Some(rank) = rank_by_code.get(detail.code.as_str()) else {
                debug!("Fund {} has no ranking row, dropped", detail.code);
                return None;
            };
            let Some(risk) = risk_by_code.get(detail.code.as_str()) else {
                debug!("Fund {} has no risk statistics, dropped", detail.code);
                return None;
            };
            let returns = rank.trailing_returns().map(str::to_string);
            let score = rank_score(&returns);
            Some(ReportRow {
                detail: detail.clone(),
                returns,
                risk: (*risk).clone(),
                rank: score,
            })
        })
        .collect()
}

/// Builds the three report views.
///
/// `top_n` of `None` leaves the truncated view identical to the full one.
pub fn build(
    ranks: &[FundRecord],
    details: &[FundDetailRecord],
    risks: &[FundRiskRecord],
    top_n: Option<usize>,
) -> Report {
    let mut all = join(ranks, details, risks);
    debug!(
        "Joined {} funds from {} ranking, {} detail and {} risk rows",
        all.len(),
        ranks.len(),
        details.len(),
        risks.len()
    );
    all.sort_by(|a, b| descending_nan_last(a.rank, b.rank));

    let top = match top_n {
        Some(n) => all.iter().take(n).cloned().collect(),
        None => {
            debug!("No top_n configured, truncated report keeps all rows");
            all.clone()
        }
    };

    let mut by_risk = all.clone();
    by_risk.sort_by(by_sharpe);

    Report { all, top, by_risk }
}
