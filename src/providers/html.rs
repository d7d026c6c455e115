//! Turns an HTML page into a sequence of tables of text cells.

use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use tracing::debug;

static TABLE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("table").expect("Failed to parse table selector"));

static ROW_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("tr").expect("Failed to parse row selector"));

/// A table as rows of cell text; header (`th`) and data (`td`) cells alike.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HtmlTable {
    pub rows: Vec<Vec<String>>,
}

impl HtmlTable {
    /// Number of columns of the widest row.
    pub fn width(&self) -> usize {
        self.rows.iter().map(Vec::len).max().unwrap_or(0)
    }

    pub fn column(&self, index: usize) -> impl Iterator<Item = &str> {
        self.rows
            .iter()
            .filter_map(move |row| row.get(index).map(String::as_str))
    }
}

fn cell_text(cell: ElementRef) -> String {
    cell.text()
        .collect::<Vec<_>>()
        .join(" ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

fn is_element(node: ElementRef, names: &[&str]) -> bool {
    names.contains(&node.value().name())
}

/// The closest enclosing `table` of an element.
fn owning_table(element: ElementRef) -> Option<ElementRef> {
    element
        .ancestors()
        .filter_map(ElementRef::wrap)
        .find(|node| is_element(*node, &["table"]))
}

/// Extracts every table of `html` in document order. Rows of nested tables
/// belong to the nested table only.
pub fn extract_tables(html: &str) -> Vec<HtmlTable> {
    let document = Html::parse_document(html);

    document
        .select(&TABLE_SELECTOR)
        .map(|table| {
            let rows = table
                .select(&ROW_SELECTOR)
                .filter(|row| owning_table(*row).is_some_and(|owner| owner.id() == table.id()))
                .map(|row| {
                    row.children()
                        .filter_map(ElementRef::wrap)
                        .filter(|cell| is_element(*cell, &["th", "td"]))
                        .map(cell_text)
                        .collect::<Vec<_>>()
                })
                .filter(|cells| !cells.is_empty())
                .collect();
            HtmlTable { rows }
        })
        .collect()
}

/// Finds the first table accepted by `matches`, falling back to the table at
/// `fallback_index` for pages whose layout no longer matches.
pub fn find_table<'a>(
    tables: &'a [HtmlTable],
    matches: impl Fn(&HtmlTable) -> bool,
    fallback_index: usize,
) -> Option<&'a HtmlTable> {
    tables.iter().find(|t| matches(t)).or_else(|| {
        debug!(
            "No table matched the expected shape, using table #{}",
            fallback_index
        );
        tables.get(fallback_index)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_tables_in_document_order() {
        let html = r#"
            <html><body>
              <table><tr><td>nav</td><td>menu</td></tr></table>
              <div>
                <table class="info">
                  <tr><th>基金全称</th><td> 华夏成长
                      证券投资基金 </td><th>基金简称</th><td>华夏成长混合</td></tr>
                  <tr><th>基金代码</th><td>000001</td><th>基金类型</th><td>混合型</td></tr>
                </table>
              </div>
            </body></html>
        "#;

        let tables = extract_tables(html);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows, vec![vec!["nav", "menu"]]);
        assert_eq!(tables[1].width(), 4);
        assert_eq!(
            tables[1].rows[0],
            vec!["基金全称", "华夏成长 证券投资基金", "基金简称", "华夏成长混合"]
        );
        assert_eq!(
            tables[1].column(2).collect::<Vec<_>>(),
            vec!["基金简称", "基金类型"]
        );
    }

    #[test]
    fn test_nested_table_rows_are_not_duplicated() {
        let html = r#"
            <table id="outer">
              <tr><td>a</td><td><table><tr><td>inner</td></tr></table></td></tr>
              <tr><td>b</td></tr>
            </table>
        "#;

        let tables = extract_tables(html);

        assert_eq!(tables.len(), 2);
        assert_eq!(tables[0].rows, vec![vec!["a", "inner"], vec!["b"]]);
        assert_eq!(tables[1].rows, vec![vec!["inner"]]);
    }

    #[test]
    fn test_find_table_prefers_shape_then_position() {
        let tables = vec![
            HtmlTable {
                rows: vec![vec!["x".to_string()]],
            },
            HtmlTable {
                rows: vec![vec!["y".to_string()]],
            },
            HtmlTable {
                rows: vec![vec!["wanted".to_string()]],
            },
        ];

        let found = find_table(&tables, |t| t.column(0).any(|c| c == "wanted"), 1);
        assert_eq!(found, Some(&tables[2]));

        let fallback = find_table(&tables, |_| false, 1);
        assert_eq!(fallback, Some(&tables[1]));

        assert_eq!(find_table(&tables[..1], |_| false, 1), None);
    }
}
