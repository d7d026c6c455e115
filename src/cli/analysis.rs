use super::ui;
use crate::core::report::{self, Report, ReportRow};
use crate::store;
use anyhow::Result;
use comfy_table::Cell;
use std::path::Path;
use tracing::info;

/// Rows shown on the console; the CSV reports hold every row.
const DISPLAY_ROWS: usize = 20;

/// Loads the collected datasets from `data_dir`, writes the three reports
/// next to them and prints the best ranked funds.
pub fn run(data_dir: &Path, top_n: Option<usize>) -> Result<Report> {
    let ranks = store::load_ranks(data_dir)?;
    let details = store::load_details(data_dir)?;
    let risks = store::load_risks(data_dir)?;

    let report = report::build(&ranks, &details, &risks, top_n);
    info!(
        "Ranked {} funds ({} in the truncated report)",
        report.all.len(),
        report.top.len()
    );

    store::report_table(&report.all)?.save(data_dir.join(store::REPORT_ALL_FILE))?;
    store::report_table(&report.top)?.save(data_dir.join(store::REPORT_TOP_FILE))?;
    store::report_table(&report.by_risk)?.save(data_dir.join(store::REPORT_RISK_FILE))?;

    println!("{}", display_report(&report.all));
    println!(
        "{}",
        ui::style_text(
            &format!("Reports written to {}", data_dir.display()),
            ui::StyleType::Subtle
        )
    );
    Ok(report)
}

fn short_name(row: &ReportRow) -> &str {
    row.detail.get("基金简称").unwrap_or(row.code())
}

fn display_report(rows: &[ReportRow]) -> String {
    let mut table = ui::new_styled_table();
    table.set_header(vec![
        ui::header_cell("Code"),
        ui::header_cell("Fund"),
        ui::header_cell("Score"),
        ui::header_cell("3Y %"),
        ui::header_cell("1Y %"),
        ui::header_cell("3M %"),
        ui::header_cell("Sharpe 3Y"),
    ]);

    for row in rows.iter().take(DISPLAY_ROWS) {
        let [r3y, _, r1y, _, r3m] = &row.returns;
        table.add_row(vec![
            Cell::new(row.code()),
            Cell::new(short_name(row)),
            ui::score_cell(row.rank),
            ui::number_cell(r3y, 2),
            ui::number_cell(r1y, 2),
            ui::number_cell(r3m, 2),
            ui::number_cell(&row.risk.sharpe_3y, 2),
        ]);
    }

    format!(
        "{}\n\n{}",
        ui::style_text("Fund ranking", ui::StyleType::Title),
        table
    )
}
