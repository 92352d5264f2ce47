//! Table extraction: pulls `<table>` elements into headers/rows/caption
//! triples the distillation pipeline attaches to the result.

use riptide_types::model::ExtractedTable;
use scraper::{ElementRef, Html, Selector};

pub struct TableExtractor;

impl TableExtractor {
    pub fn extract_tables(document: &Html) -> Vec<ExtractedTable> {
        let Ok(table_selector) = Selector::parse("table") else {
            return Vec::new();
        };
        document
            .select(&table_selector)
            .filter_map(Self::extract_one)
            .filter(|t| !t.rows.is_empty() || !t.headers.is_empty())
            .collect()
    }

    fn extract_one(table: ElementRef) -> Option<ExtractedTable> {
        let caption_selector = Selector::parse("caption").ok()?;
        let caption = table
            .select(&caption_selector)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
            .filter(|s| !s.is_empty());

        let header_cell_selector = Selector::parse("thead th, thead td").ok()?;
        let mut headers: Vec<String> = table
            .select(&header_cell_selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect();

        if headers.is_empty() {
            // No explicit <thead>: treat the first row's <th> cells (if
            // any) as the header row.
            let row_selector = Selector::parse("tr").ok()?;
            if let Some(first_row) = table.select(&row_selector).next() {
                let th_selector = Selector::parse("th").ok()?;
                headers = first_row
                    .select(&th_selector)
                    .map(|el| el.text().collect::<String>().trim().to_string())
                    .collect();
            }
        }

        let body_row_selector = Selector::parse("tbody tr, tr").ok()?;
        let cell_selector = Selector::parse("td").ok()?;
        let mut rows = Vec::new();
        for row in table.select(&body_row_selector) {
            let cells: Vec<String> = row
                .select(&cell_selector)
                .map(|el| el.text().collect::<String>().trim().to_string())
                .collect();
            if !cells.is_empty() {
                rows.push(cells);
            }
        }

        Some(ExtractedTable {
            headers,
            rows,
            caption,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_header_and_body_rows() {
        let html = r#"
            <table>
                <caption>Prices</caption>
                <thead><tr><th>Item</th><th>Cost</th></tr></thead>
                <tbody>
                    <tr><td>Widget</td><td>$5</td></tr>
                    <tr><td>Gadget</td><td>$9</td></tr>
                </tbody>
            </table>
        "#;
        let document = Html::parse_document(html);
        let tables = TableExtractor::extract_tables(&document);
        assert_eq!(tables.len(), 1);
        assert_eq!(tables[0].headers, vec!["Item", "Cost"]);
        assert_eq!(tables[0].rows.len(), 2);
        assert_eq!(tables[0].caption.as_deref(), Some("Prices"));
    }

    #[test]
    fn table_without_thead_has_no_headers() {
        let html = "<table><tr><td>a</td><td>b</td></tr></table>";
        let document = Html::parse_document(html);
        let tables = TableExtractor::extract_tables(&document);
        assert_eq!(tables.len(), 1);
        assert!(tables[0].headers.is_empty());
        assert_eq!(tables[0].rows, vec![vec!["a".to_string(), "b".to_string()]]);
    }

    #[test]
    fn empty_document_yields_no_tables() {
        let document = Html::parse_document("<html><body></body></html>");
        assert!(TableExtractor::extract_tables(&document).is_empty());
    }
}
