//! UI-agnostic table view model.
//!
//! These types carry presentation data without depending on a rendering
//! framework. The TUI maps [`RowStyleClass`] to ratatui styles; the plain-text
//! printer ignores styles altogether.

use crate::fmt::{format_page_footer, truncate};
use crate::record::Value;
use crate::table::{ListView, SortDirection};

/// Cells wider than this are truncated.
pub const MAX_COLUMN_WIDTH: usize = 40;

/// Style classification for rows and cells.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RowStyleClass {
    #[default]
    Normal,
    /// Missing values (TUI: dark gray).
    Dimmed,
    /// Cells of the sorted column (TUI: cyan).
    Accent,
}

/// A single table cell with optional per-cell style override.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ViewCell {
    pub text: String,
    /// `None` = inherit row style.
    pub style: Option<RowStyleClass>,
}

impl ViewCell {
    pub fn plain(text: String) -> Self {
        Self { text, style: None }
    }

    pub fn styled(text: String, style: RowStyleClass) -> Self {
        Self {
            text,
            style: Some(style),
        }
    }
}

/// One table row, keyed by the record's identity when it has one.
#[derive(Debug, Clone, PartialEq)]
pub struct ViewRow {
    pub id: Option<String>,
    pub cells: Vec<ViewCell>,
    pub style: RowStyleClass,
}

/// Complete table ready to be rendered by any frontend.
#[derive(Debug, Clone, PartialEq)]
pub struct TableViewModel {
    pub title: String,
    pub headers: Vec<String>,
    pub widths: Vec<u16>,
    pub rows: Vec<ViewRow>,
    /// Column index of the active sort, if it is a displayed column.
    pub sort_column: Option<usize>,
    pub sort_direction: SortDirection,
    pub footer: String,
}

impl TableViewModel {
    /// Header text with the sort indicator appended to the sorted column.
    pub fn header_label(&self, column: usize) -> String {
        let header = self.headers.get(column).map(String::as_str).unwrap_or("");
        if self.sort_column == Some(column) {
            format!("{}{}", header, self.sort_direction.indicator())
        } else {
            header.to_string()
        }
    }
}

/// Builds the view model for the current page of `list`.
pub fn build_table_view(list: &ListView, title: &str) -> TableViewModel {
    let schema = list.schema();
    let state = list.state();
    let page = list.current_page();

    let sort_column = state
        .sort_field
        .as_deref()
        .and_then(|field| schema.position(field));

    let headers: Vec<String> = schema
        .columns()
        .iter()
        .map(|c| c.label().to_string())
        .collect();

    let rows: Vec<ViewRow> = page
        .items
        .iter()
        .map(|record| {
            let cells = schema
                .columns()
                .iter()
                .enumerate()
                .map(|(i, column)| {
                    let value = record.get(&column.field);
                    let text = truncate(&value.display_text(), MAX_COLUMN_WIDTH);
                    if matches!(value, Value::Null) {
                        ViewCell::styled(text, RowStyleClass::Dimmed)
                    } else if sort_column == Some(i) {
                        ViewCell::styled(text, RowStyleClass::Accent)
                    } else {
                        ViewCell::plain(text)
                    }
                })
                .collect();
            ViewRow {
                id: record.id(&schema.id_field),
                cells,
                style: RowStyleClass::Normal,
            }
        })
        .collect();

    // Header width reserves one column for the sort indicator.
    let widths = headers
        .iter()
        .enumerate()
        .map(|(i, h)| {
            let widest_cell = rows
                .iter()
                .map(|r| r.cells[i].text.chars().count())
                .max()
                .unwrap_or(0);
            (h.chars().count() + 1)
                .max(widest_cell)
                .min(MAX_COLUMN_WIDTH) as u16
        })
        .collect();

    TableViewModel {
        title: format!(" {} ", title),
        headers,
        widths,
        rows,
        sort_column,
        sort_direction: state.sort_direction,
        footer: format_page_footer(page.page, page.total_pages, page.total_records),
    }
}

/// Renders a view model as fixed-width text, one line per row, footer last.
pub fn render_text(vm: &TableViewModel) -> String {
    let pad = |text: &str, width: u16| {
        let width = width as usize;
        let len = text.chars().count();
        let mut out = text.to_string();
        if len < width {
            out.extend(std::iter::repeat_n(' ', width - len));
        }
        out
    };

    let mut lines = Vec::with_capacity(vm.rows.len() + 3);
    let header: Vec<String> = (0..vm.headers.len())
        .map(|i| pad(&vm.header_label(i), vm.widths[i]))
        .collect();
    lines.push(header.join("  ").trim_end().to_string());
    lines.push(
        vm.widths
            .iter()
            .map(|&w| "-".repeat(w as usize))
            .collect::<Vec<_>>()
            .join("  "),
    );
    for row in &vm.rows {
        let cells: Vec<String> = row
            .cells
            .iter()
            .zip(&vm.widths)
            .map(|(c, &w)| pad(&c.text, w))
            .collect();
        lines.push(cells.join("  ").trim_end().to_string());
    }
    lines.push(vm.footer.clone());
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::schema::{Column, Schema};

    fn invoices() -> ListView {
        let schema = Schema::new()
            .column(Column::text("Name", "Invoice Number"))
            .column(Column::text("Buyer_Name__c", "Buyer Name"))
            .column(Column::text("Invoice_Status__c", "Status").exact());
        let mut view = ListView::new(schema);
        view.replace_collection(vec![
            Record::new()
                .with("Id", "a1")
                .with("Name", "INV-002")
                .with("Buyer_Name__c", "Globex")
                .with("Invoice_Status__c", "Paid"),
            Record::new()
                .with("Id", "a2")
                .with("Name", "INV-001")
                .with("Invoice_Status__c", "Draft"),
        ]);
        view
    }

    #[test]
    fn test_build_view_marks_sort_and_nulls() {
        let mut view = invoices();
        view.set_sort("Name");
        let vm = build_table_view(&view, "Invoices");

        assert_eq!(vm.title, " Invoices ");
        assert_eq!(vm.sort_column, Some(0));
        assert_eq!(vm.sort_direction, SortDirection::Ascending);
        assert_eq!(vm.header_label(0), "Invoice Number▲");
        assert_eq!(vm.header_label(1), "Buyer Name");

        assert_eq!(vm.rows[0].id.as_deref(), Some("a2"));
        assert_eq!(vm.rows[0].cells[0].style, Some(RowStyleClass::Accent));
        assert_eq!(vm.rows[0].cells[1], ViewCell::styled(String::new(), RowStyleClass::Dimmed));
        assert_eq!(vm.rows[1].cells[2], ViewCell::plain("Paid".into()));
        assert_eq!(vm.footer, "Page 1 of 1 (2 records)");
    }

    #[test]
    fn test_sort_on_undisplayed_field() {
        let mut view = invoices();
        view.set_sort("Id");
        let vm = build_table_view(&view, "Invoices");
        assert_eq!(vm.sort_column, None);
        assert_eq!(vm.rows[0].id.as_deref(), Some("a1"));
    }

    #[test]
    fn test_widths_cover_header_and_cells() {
        let vm = build_table_view(&invoices(), "Invoices");
        assert_eq!(vm.widths, vec![15, 11, 7]);
    }

    #[test]
    fn test_render_text() {
        let vm = build_table_view(&invoices(), "Invoices");
        let text = render_text(&vm);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 5);
        assert_eq!(lines[0], "Invoice Number   Buyer Name   Status");
        assert_eq!(lines[2], "INV-002          Globex       Paid");
        assert_eq!(lines[4], "Page 1 of 1 (2 records)");
    }
}
