//! Input handling and keybindings.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::table::ListView;

use super::state::{AppState, InputMode};

/// Result of handling a key event.
#[derive(Debug, PartialEq, Eq)]
pub enum KeyAction {
    /// Nothing for the app to do; the list may have changed.
    None,
    Quit,
    /// Fetch again from the source.
    Reload,
    /// Write the filtered list to the export path.
    Export,
}

/// Handles key input, updating `state` and `list` in place.
pub fn handle_key(state: &mut AppState, list: &mut ListView, key: KeyEvent) -> KeyAction {
    if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
        return KeyAction::Quit;
    }
    match state.input_mode {
        InputMode::Normal => handle_normal_mode(state, list, key),
        InputMode::Filter => handle_filter_mode(state, list, key),
    }
}

fn handle_normal_mode(state: &mut AppState, list: &mut ListView, key: KeyEvent) -> KeyAction {
    match key.code {
        KeyCode::Char('q') | KeyCode::Char('Q') => return KeyAction::Quit,
        KeyCode::Char('r') => return KeyAction::Reload,
        KeyCode::Char('e') => return KeyAction::Export,

        KeyCode::Left | KeyCode::Char('p') => {
            list.previous_page();
        }
        KeyCode::Right | KeyCode::Char('n') => {
            list.next_page();
        }
        KeyCode::Home => {
            list.first_page();
        }
        KeyCode::End => {
            list.last_page();
        }

        KeyCode::Char(c @ '1'..='9') => {
            let index = (c as usize) - ('1' as usize);
            if let Some(field) = field_at(list, index) {
                list.set_sort(&field);
            }
        }

        KeyCode::Tab => state.cycle_filter_column(list.schema().columns().len()),
        KeyCode::Char('/') => {
            if let Some(field) = field_at(list, state.filter_column) {
                state.filter_input = list.filter_value(&field).unwrap_or_default().to_string();
                state.input_mode = InputMode::Filter;
            }
        }
        KeyCode::Char('c') => list.clear_filters(),

        _ => {}
    }
    KeyAction::None
}

/// Filters apply as the user types; Enter only leaves the input.
fn handle_filter_mode(state: &mut AppState, list: &mut ListView, key: KeyEvent) -> KeyAction {
    let Some(field) = field_at(list, state.filter_column) else {
        state.input_mode = InputMode::Normal;
        return KeyAction::None;
    };
    match key.code {
        KeyCode::Esc => {
            state.input_mode = InputMode::Normal;
            state.filter_input.clear();
            list.set_filter(&field, "");
        }
        KeyCode::Enter => state.input_mode = InputMode::Normal,
        KeyCode::Backspace => {
            state.filter_input.pop();
            list.set_filter(&field, &state.filter_input);
        }
        KeyCode::Char(c) => {
            state.filter_input.push(c);
            list.set_filter(&field, &state.filter_input);
        }
        _ => {}
    }
    KeyAction::None
}

fn field_at(list: &ListView, index: usize) -> Option<String> {
    list.schema().columns().get(index).map(|c| c.field.clone())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Record;
    use crate::schema::{Column, Schema};
    use crossterm::event::{KeyEventKind, KeyEventState};

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent {
            code,
            modifiers: KeyModifiers::NONE,
            kind: KeyEventKind::Press,
            state: KeyEventState::NONE,
        }
    }

    fn invoices() -> ListView {
        let schema = Schema::new()
            .column(Column::text("Name", "Invoice"))
            .column(Column::text("Status__c", "Status").exact())
            .column(Column::number("Total__c", "Total"));
        let mut list = ListView::new(schema);
        list.replace_collection(
            (1..=12)
                .map(|i| {
                    Record::new()
                        .with("Name", format!("INV-{:03}", i))
                        .with("Status__c", if i % 3 == 0 { "Paid" } else { "Draft" })
                        .with("Total__c", (i * 10) as i64)
                })
                .collect(),
        );
        list
    }

    #[test]
    fn test_paging_keys() {
        let mut state = AppState::default();
        let mut list = invoices();

        handle_key(&mut state, &mut list, key(KeyCode::Right));
        assert_eq!(list.state().page, 2);
        handle_key(&mut state, &mut list, key(KeyCode::Char('n')));
        handle_key(&mut state, &mut list, key(KeyCode::Char('n')));
        assert_eq!(list.state().page, 3, "next on last page is a no-op");
        handle_key(&mut state, &mut list, key(KeyCode::Char('p')));
        assert_eq!(list.state().page, 2);
        handle_key(&mut state, &mut list, key(KeyCode::Home));
        assert_eq!(list.state().page, 1);
        handle_key(&mut state, &mut list, key(KeyCode::End));
        assert_eq!(list.state().page, 3);
    }

    #[test]
    fn test_number_keys_sort_and_toggle() {
        let mut state = AppState::default();
        let mut list = invoices();

        handle_key(&mut state, &mut list, key(KeyCode::Char('3')));
        assert_eq!(list.state().sort_field.as_deref(), Some("Total__c"));
        assert!(list.state().sort_direction.is_ascending());

        handle_key(&mut state, &mut list, key(KeyCode::Char('3')));
        assert!(!list.state().sort_direction.is_ascending());

        handle_key(&mut state, &mut list, key(KeyCode::Char('9')));
        assert_eq!(list.state().sort_field.as_deref(), Some("Total__c"));
    }

    #[test]
    fn test_filter_mode_applies_while_typing() {
        let mut state = AppState::default();
        let mut list = invoices();

        handle_key(&mut state, &mut list, key(KeyCode::Tab));
        assert_eq!(state.filter_column, 1);
        handle_key(&mut state, &mut list, key(KeyCode::Char('/')));
        assert_eq!(state.input_mode, InputMode::Filter);

        for c in "Paid".chars() {
            handle_key(&mut state, &mut list, key(KeyCode::Char(c)));
        }
        assert_eq!(list.filtered().len(), 4);

        // 'q' is text while typing a filter.
        let action = handle_key(&mut state, &mut list, key(KeyCode::Char('q')));
        assert_eq!(action, KeyAction::None);
        assert!(list.filtered().is_empty());
        handle_key(&mut state, &mut list, key(KeyCode::Backspace));
        assert_eq!(list.filtered().len(), 4);

        handle_key(&mut state, &mut list, key(KeyCode::Enter));
        assert_eq!(state.input_mode, InputMode::Normal);
        assert_eq!(list.filter_value("Status__c"), Some("Paid"));
    }

    #[test]
    fn test_escape_clears_column_filter() {
        let mut state = AppState::default();
        let mut list = invoices();
        list.set_filter("Status__c", "Draft");

        handle_key(&mut state, &mut list, key(KeyCode::Char('/')));
        handle_key(&mut state, &mut list, key(KeyCode::Char('1')));
        // Drafts among INV-001, INV-010, INV-011, INV-012.
        assert_eq!(list.filtered().len(), 3);

        handle_key(&mut state, &mut list, key(KeyCode::Esc));
        assert_eq!(state.input_mode, InputMode::Normal);
        assert_eq!(list.filter_value("Name"), None);
        assert_eq!(list.filter_value("Status__c"), Some("Draft"));

        handle_key(&mut state, &mut list, key(KeyCode::Char('c')));
        assert_eq!(list.filtered().len(), 12);
    }

    #[test]
    fn test_filter_input_starts_from_current_value() {
        let mut state = AppState::default();
        let mut list = invoices();
        list.set_filter("Name", "INV-01");

        handle_key(&mut state, &mut list, key(KeyCode::Char('/')));
        assert_eq!(state.filter_input, "INV-01");
    }

    #[test]
    fn test_action_keys() {
        let mut state = AppState::default();
        let mut list = invoices();
        assert_eq!(
            handle_key(&mut state, &mut list, key(KeyCode::Char('r'))),
            KeyAction::Reload
        );
        assert_eq!(
            handle_key(&mut state, &mut list, key(KeyCode::Char('e'))),
            KeyAction::Export
        );
        assert_eq!(
            handle_key(&mut state, &mut list, key(KeyCode::Char('q'))),
            KeyAction::Quit
        );
        let ctrl_c = KeyEvent {
            modifiers: KeyModifiers::CONTROL,
            ..key(KeyCode::Char('c'))
        };
        assert_eq!(handle_key(&mut state, &mut list, ctrl_c), KeyAction::Quit);
    }
}
