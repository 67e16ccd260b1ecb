//! Main rendering logic for the browser.

use ratatui::Frame;
use ratatui::layout::{Constraint, Layout, Rect};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Paragraph, Row, Table};

use crate::provider::Notification;
use crate::table::ListView;
use crate::view::{TableViewModel, build_table_view};

use super::state::{AppState, InputMode};
use super::style::Styles;

/// Main render function.
pub fn render(
    frame: &mut Frame,
    state: &AppState,
    list: &ListView,
    title: &str,
    status: Option<&Notification>,
) {
    let chunks = Layout::vertical([
        Constraint::Length(1), // Filter bar
        Constraint::Min(3),    // Table
        Constraint::Length(1), // Footer and status
    ])
    .split(frame.area());

    let vm = build_table_view(list, title);
    render_filter_bar(frame, chunks[0], state, list);
    render_table(frame, chunks[1], &vm, list.is_empty());
    render_status(frame, chunks[2], &vm.footer, status);
}

fn render_filter_bar(frame: &mut Frame, area: Rect, state: &AppState, list: &ListView) {
    let column = list.schema().columns().get(state.filter_column);
    let label = column.map(|c| c.label()).unwrap_or("-");

    let mut spans = vec![Span::styled(format!(" Filter [{}]: ", label), Styles::header())];
    if state.input_mode == InputMode::Filter {
        spans.push(Span::styled(
            format!("{}_", state.filter_input),
            Styles::filter_input(),
        ));
    } else {
        let active: Vec<String> = list
            .state()
            .filters
            .iter()
            .map(|(field, value)| {
                let name = list
                    .schema()
                    .column_for(field)
                    .map(|c| c.label())
                    .unwrap_or(field);
                format!("{}={}", name, value)
            })
            .collect();
        if active.is_empty() {
            spans.push(Span::styled("none", Styles::dim()));
        } else {
            spans.push(Span::raw(active.join(", ")));
        }
    }
    frame.render_widget(Paragraph::new(Line::from(spans)).style(Styles::default()), area);
}

fn render_table(frame: &mut Frame, area: Rect, vm: &TableViewModel, no_records: bool) {
    let block = Block::default()
        .title(vm.title.clone())
        .borders(Borders::ALL)
        .style(Styles::default());

    if vm.rows.is_empty() {
        let message = if no_records {
            "No records"
        } else {
            "No records match the current filters"
        };
        frame.render_widget(Paragraph::new(message).style(Styles::dim()).block(block), area);
        return;
    }

    // Header with sort indicator
    let headers: Vec<Span> = (0..vm.headers.len())
        .map(|i| Span::styled(vm.header_label(i), Styles::table_header()))
        .collect();
    let header = Row::new(headers).style(Styles::table_header()).height(1);

    let rows: Vec<Row> = vm
        .rows
        .iter()
        .map(|vr| {
            let cells = vr.cells.iter().map(|c| match c.style {
                Some(s) => Span::styled(c.text.clone(), Styles::from_class(s)),
                None => Span::raw(c.text.clone()),
            });
            Row::new(cells).style(Styles::from_class(vr.style)).height(1)
        })
        .collect();

    let mut constraints: Vec<Constraint> = vm.widths.iter().map(|&w| Constraint::Length(w)).collect();
    constraints.push(Constraint::Fill(1));

    let table = Table::new(rows, constraints)
        .header(header)
        .block(block)
        .column_spacing(1);
    frame.render_widget(table, area);
}

fn render_status(frame: &mut Frame, area: Rect, footer: &str, status: Option<&Notification>) {
    let mut spans = vec![Span::styled(format!(" {} ", footer), Styles::header())];
    if let Some(n) = status {
        spans.push(Span::raw(" "));
        spans.push(Span::styled(n.to_string(), Styles::from_severity(n.severity)));
    } else {
        spans.push(Span::styled(
            " ←/→ page  1-9 sort  / filter  Tab column  c clear  r reload  e export  q quit",
            Styles::dim(),
        ));
    }
    frame.render_widget(Paragraph::new(Line::from(spans)), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::schema::{Column, Schema};
    use ratatui::Terminal;
    use ratatui::backend::TestBackend;

    fn screen(state: &AppState, list: &ListView, status: Option<&Notification>) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 12)).unwrap();
        terminal
            .draw(|frame| render(frame, state, list, "Invoices", status))
            .unwrap();
        let buffer = terminal.backend().buffer();
        let width = buffer.area.width as usize;
        buffer
            .content
            .chunks(width)
            .map(|line| line.iter().map(|c| c.symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn invoices() -> ListView {
        let schema = Schema::new()
            .column(Column::text("Name", "Invoice"))
            .column(Column::text("Status__c", "Status").exact());
        let mut list = ListView::new(schema);
        list.replace_collection(vec![
            Record::new().with("Name", "INV-002").with("Status__c", "Paid"),
            Record::new().with("Name", "INV-001").with("Status__c", "Draft"),
        ]);
        list
    }

    #[test]
    fn test_render_table_with_sort_indicator() {
        let mut list = invoices();
        list.set_sort("Name");
        let text = screen(&AppState::default(), &list, None);

        assert!(text.contains(" Invoices "));
        assert!(text.contains("Invoice▲"));
        assert!(text.contains("Page 1 of 1 (2 records)"));
        let first = text.find("INV-001").unwrap();
        let second = text.find("INV-002").unwrap();
        assert!(first < second);
    }

    #[test]
    fn test_render_filter_bar_and_status() {
        let mut list = invoices();
        list.set_filter("Status__c", "Archived");
        let status = Notification::error("Error", "Failed to load records: offline");
        let text = screen(&AppState::default(), &list, Some(&status));

        assert!(text.contains("Filter [Invoice]: Status=Archived"));
        assert!(text.contains("No records match the current filters"));
        assert!(text.contains("Error: Failed to load records: offline"));
    }

    #[test]
    fn test_render_filter_input() {
        let list = invoices();
        let state = AppState {
            input_mode: InputMode::Filter,
            filter_input: "INV".into(),
            ..AppState::default()
        };
        let text = screen(&state, &list, None);
        assert!(text.contains("Filter [Invoice]: INV_"));
    }
}
