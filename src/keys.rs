use crate::filter::FILTER_CHIPS;
use crate::state::{Action, Mode, View};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

/// Translates a key press into an action for the current view and mode.
pub fn map_key(view: View, mode: Mode, key: KeyEvent) -> Option<Action> {
    if key.kind != KeyEventKind::Press {
        return None;
    }
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Some(Action::Quit);
    }

    if mode != Mode::Normal {
        return match key.code {
            KeyCode::Tab if view == View::Upload => Some(Action::LoadSample),
            KeyCode::Esc if view == View::Upload => Some(Action::Quit),
            KeyCode::Esc => Some(Action::Cancel),
            KeyCode::Enter => Some(Action::Submit),
            KeyCode::Backspace => Some(Action::Backspace),
            KeyCode::Char(c) => Some(Action::Type(c)),
            _ => None,
        };
    }

    match key.code {
        KeyCode::Char('q') => Some(Action::Quit),
        KeyCode::Esc => Some(Action::Cancel),
        KeyCode::Up | KeyCode::Char('k') => Some(Action::CursorUp),
        KeyCode::Down | KeyCode::Char('j') => Some(Action::CursorDown),
        KeyCode::Enter => Some(Action::SelectAtCursor),
        KeyCode::Char(c @ '1'..='5') => {
            let index = c as usize - '1' as usize;
            FILTER_CHIPS.get(index).map(|p| Action::ToggleProtocol(*p))
        }
        KeyCode::Char('s') => Some(Action::Edit(Mode::EditSource)),
        KeyCode::Char('d') => Some(Action::Edit(Mode::EditDestination)),
        KeyCode::Char('x') => Some(Action::ClearFilters),
        KeyCode::Char('e') => Some(Action::Export),
        KeyCode::Char('t') => Some(Action::NextTier),
        KeyCode::Char('a') => Some(Action::RunAnalysis),
        KeyCode::Char('c') => Some(Action::OpenChat),
        KeyCode::Char('h') => Some(Action::ToggleHints),
        KeyCode::Char('o') => Some(Action::StartOver),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Protocol;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn digits_toggle_filter_chips() {
        let action = map_key(View::Analysis, Mode::Normal, press(KeyCode::Char('4')));
        assert!(matches!(action, Some(Action::ToggleProtocol(Protocol::Arp))));
        assert!(map_key(View::Analysis, Mode::Normal, press(KeyCode::Char('6'))).is_none());
    }

    #[test]
    fn editing_captures_letters() {
        let action = map_key(View::Analysis, Mode::EditSource, press(KeyCode::Char('q')));
        assert!(matches!(action, Some(Action::Type('q'))));
        let action = map_key(View::Analysis, Mode::Chat, press(KeyCode::Esc));
        assert!(matches!(action, Some(Action::Cancel)));
    }

    #[test]
    fn upload_view_offers_sample_on_tab() {
        let action = map_key(View::Upload, Mode::EditPath, press(KeyCode::Tab));
        assert!(matches!(action, Some(Action::LoadSample)));
    }

    #[test]
    fn ctrl_c_always_quits() {
        let key = KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL);
        assert!(matches!(map_key(View::Analysis, Mode::Chat, key), Some(Action::Quit)));
    }
}
