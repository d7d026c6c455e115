use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};

/// Defines different styles for text elements.
pub enum StyleType {
    Title,
    Subtle,
}

/// Applies a consistent style to a string.
pub fn style_text(text: &str, style_type: StyleType) -> String {
    let styled = match style_type {
        StyleType::Title => style(text).bold().underlined(),
        StyleType::Subtle => style(text).dim(),
    };
    styled.to_string()
}

/// Creates a new `comfy_table::Table` with standard styling.
pub fn new_styled_table() -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic);
    table
}

/// Creates a styled header cell for a table.
pub fn header_cell(text: &str) -> Cell {
    Cell::new(text)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

/// Formats a numeric string. Empty or non-numeric values are shown as "N/A".
pub fn number_cell(value: &str, precision: usize) -> Cell {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => {
            let text = format!("{v:.precision$}");
            let color = if v >= 0.0 { Color::Green } else { Color::Red };
            Cell::new(text).fg(color).set_alignment(CellAlignment::Right)
        }
        _ => na_cell(),
    }
}

/// Formats the composite score in bold.
pub fn score_cell(score: f64) -> Cell {
    if score.is_nan() {
        return na_cell();
    }
    Cell::new(format!("{score:.2}"))
        .add_attribute(Attribute::Bold)
        .set_alignment(CellAlignment::Right)
}

pub fn na_cell() -> Cell {
    Cell::new("N/A")
        .fg(Color::DarkGrey)
        .set_alignment(CellAlignment::Right)
}

/// Creates a new `indicatif::ProgressBar` with standard styling.
pub fn new_progress_bar(len: u64, message: &str) -> ProgressBar {
    let pb = ProgressBar::new(len);
    if let Ok(progress_style) = ProgressStyle::default_bar().template(
        "{spinner:.green} {msg} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
    ) {
        pb.set_style(progress_style.progress_chars("#>-"));
    }
    pb.set_message(message.to_string());
    pb
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_number_cell_formats_or_falls_back() {
        assert_eq!(number_cell("12.346", 2).content(), "12.35");
        assert_eq!(number_cell("-0.5", 2).content(), "-0.50");
        assert_eq!(number_cell("", 2).content(), "N/A");
        assert_eq!(number_cell("--", 2).content(), "N/A");
    }

    #[test]
    fn test_score_cell_handles_nan() {
        assert_eq!(score_cell(7.0).content(), "7.00");
        assert_eq!(score_cell(f64::NAN).content(), "N/A");
    }
}
