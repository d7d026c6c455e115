//! CSV files exchanged between the collect and analysis phases.

pub mod table;

use crate::core::fund::{CODE_COLUMN, FUND_RANK_TITLES, FUND_TS_TITLES};
use crate::core::report::{RANK_COLUMN, RETURN_TITLES, ReportRow};
use crate::core::{FundDetailRecord, FundRecord, FundRiskRecord};
use anyhow::{Context, Result, anyhow};
use std::path::Path;
pub use table::Table;

pub const RANK_FILE: &str = "fundrank.csv";
pub const DETAIL_FILE: &str = "fundinfo.csv";
pub const RISK_FILE: &str = "fundts.csv";
pub const REPORT_ALL_FILE: &str = "report_all.csv";
pub const REPORT_TOP_FILE: &str = "report_50.csv";
pub const REPORT_RISK_FILE: &str = "report.csv";

fn column(table: &Table, name: &str) -> Result<usize> {
    table
        .column_index(name)
        .ok_or_else(|| anyhow!("Missing column '{}'", name))
}

pub fn rank_table(records: &[FundRecord]) -> Result<Table> {
    let mut table = Table::new(&FUND_RANK_TITLES);
    for record in records {
        table.push_row(&record.to_fields())?;
    }
    Ok(table)
}

pub fn ranks_from_table(table: &Table) -> Result<Vec<FundRecord>> {
    let indexes = FUND_RANK_TITLES
        .iter()
        .map(|title| column(table, title))
        .collect::<Result<Vec<_>>>()?;
    table
        .rows()
        .iter()
        .map(|row| {
            let fields: Vec<&str> = indexes.iter().map(|&i| row[i].as_str()).collect();
            Ok(FundRecord::from_fields(&fields)?)
        })
        .collect()
}

/// Columns are `code` followed by every label in order of first appearance.
pub fn detail_table(records: &[FundDetailRecord]) -> Result<Table> {
    let mut columns = vec![CODE_COLUMN.to_string()];
    for record in records {
        for (label, _) in &record.fields {
            if !columns.contains(label) {
                columns.push(label.clone());
            }
        }
    }

    let mut table = Table::new(&columns);
    for record in records {
        let row: Vec<&str> = columns
            .iter()
            .map(|c| {
                if c == CODE_COLUMN {
                    record.code.as_str()
                } else {
                    record.get(c).unwrap_or_default()
                }
            })
            .collect();
        table.push_row(&row)?;
    }
    Ok(table)
}

/// Empty cells are labels the fund's page did not carry.
pub fn details_from_table(table: &Table) -> Result<Vec<FundDetailRecord>> {
    let code_index = column(table, CODE_COLUMN)?;
    Ok(table
        .rows()
        .iter()
        .map(|row| {
            let mut record = FundDetailRecord::new(&row[code_index]);
            for (i, label) in table.columns().iter().enumerate() {
                if i != code_index && !row[i].is_empty() {
                    record.insert(label, &row[i]);
                }
            }
            record
        })
        .collect())
}

pub fn risk_table(records: &[FundRiskRecord]) -> Result<Table> {
    let mut columns = vec![CODE_COLUMN];
    columns.extend(FUND_TS_TITLES);
    let mut table = Table::new(&columns);
    for record in records {
        let [s1, s2, s3] = record.sharpe_values();
        table.push_row(&[record.code.as_str(), s1, s2, s3])?;
    }
    Ok(table)
}

pub fn risks_from_table(table: &Table) -> Result<Vec<FundRiskRecord>> {
    let code = column(table, CODE_COLUMN)?;
    let [s1, s2, s3] = [
        column(table, FUND_TS_TITLES[0])?,
        column(table, FUND_TS_TITLES[1])?,
        column(table, FUND_TS_TITLES[2])?,
    ];
    Ok(table
        .rows()
        .iter()
        .map(|row| FundRiskRecord {
            code: row[code].clone(),
            sharpe_1y: row[s1].clone(),
            sharpe_2y: row[s2].clone(),
            sharpe_3y: row[s3].clone(),
        })
        .collect())
}

/// Detail labels, the projected returns, the Sharpe ratios and the score.
pub fn report_table(rows: &[ReportRow]) -> Result<Table> {
    let details: Vec<FundDetailRecord> = rows.iter().map(|r| r.detail.clone()).collect();
    let detail_columns = detail_table(&details)?.columns().to_vec();

    let mut columns = detail_columns.clone();
    columns.extend(RETURN_TITLES.iter().map(|t| t.to_string()));
    columns.extend(FUND_TS_TITLES.iter().map(|t| t.to_string()));
    columns.push(RANK_COLUMN.to_string());

    let mut table = Table::new(&columns);
    for row in rows {
        let mut cells: Vec<String> = detail_columns
            .iter()
            .map(|c| {
                if c == CODE_COLUMN {
                    row.detail.code.clone()
                } else {
                    row.detail.get(c).unwrap_or_default().to_string()
                }
            })
            .collect();
        cells.extend(row.returns.iter().cloned());
        cells.extend(row.risk.sharpe_values().map(str::to_string));
        cells.push(if row.rank.is_nan() {
            String::new()
        } else {
            format!("{:.4}", row.rank)
        });
        table.push_row(&cells)?;
    }
    Ok(table)
}

pub fn save_ranks(dir: &Path, records: &[FundRecord]) -> Result<()> {
    rank_table(records)?.save(dir.join(RANK_FILE))
}

pub fn load_ranks(dir: &Path) -> Result<Vec<FundRecord>> {
    let path = dir.join(RANK_FILE);
    ranks_from_table(&Table::load(&path)?)
        .with_context(|| format!("Failed to read fund ranking from {}", path.display()))
}

pub fn save_details(dir: &Path, records: &[FundDetailRecord]) -> Result<()> {
    detail_table(records)?.save(dir.join(DETAIL_FILE))
}

pub fn load_details(dir: &Path) -> Result<Vec<FundDetailRecord>> {
    let path = dir.join(DETAIL_FILE);
    details_from_table(&Table::load(&path)?)
        .with_context(|| format!("Failed to read fund details from {}", path.display()))
}

pub fn save_risks(dir: &Path, records: &[FundRiskRecord]) -> Result<()> {
    risk_table(records)?.save(dir.join(RISK_FILE))
}

pub fn load_risks(dir: &Path) -> Result<Vec<FundRiskRecord>> {
    let path = dir.join(RISK_FILE);
    risks_from_table(&Table::load(&path)?)
        .with_context(|| format!("Failed to read risk statistics from {}", path.display()))
}
