use crossterm::event::{self, Event, KeyCode, KeyEventKind, KeyModifiers};

/// TUI-specific input events
#[derive(Debug, Clone, PartialEq)]
pub enum TuiEvent {
    // Global commands (dispatched to core::update)
    ForceQuit, // Ctrl+C
    Translate, // Ctrl+T
    Swap,      // Ctrl+S
    Detect,    // Ctrl+D

    // Focus
    NextField, // Tab
    PrevField, // Shift+Tab
    Escape,

    // Editing (routed to the focused component)
    Submit,
    InputChar(char),
    Paste(String), // Bracketed paste - preserves newlines
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorUp,
    CursorDown,
    CursorHome,
    CursorEnd,

    Resize,
}

/// Poll for an event without blocking (returns immediately)
pub fn poll_event_immediate() -> Option<TuiEvent> {
    poll_event_timeout(std::time::Duration::ZERO)
}

/// Poll for an event, blocking up to `timeout`.
pub fn poll_event_timeout(timeout: std::time::Duration) -> Option<TuiEvent> {
    if !event::poll(timeout).ok()? {
        return None;
    }
    match event::read().ok()? {
        Event::Key(key_event) => {
            // Release/repeat events arrive with keyboard enhancement enabled
            if key_event.kind != KeyEventKind::Press {
                return None;
            }
            log::debug!(
                "Key event: {:?} with modifiers {:?}",
                key_event.code,
                key_event.modifiers
            );
            map_key(key_event.modifiers, key_event.code)
        }
        Event::Paste(data) => Some(TuiEvent::Paste(data)),
        Event::Resize(_, _) => Some(TuiEvent::Resize),
        _ => None,
    }
}

fn map_key(modifiers: KeyModifiers, code: KeyCode) -> Option<TuiEvent> {
    match (modifiers, code) {
        (KeyModifiers::CONTROL, KeyCode::Char('c')) => Some(TuiEvent::ForceQuit),
        (KeyModifiers::CONTROL, KeyCode::Char('t')) => Some(TuiEvent::Translate),
        (KeyModifiers::CONTROL, KeyCode::Char('s')) => Some(TuiEvent::Swap),
        (KeyModifiers::CONTROL, KeyCode::Char('d')) => Some(TuiEvent::Detect),
        // Ctrl+J inserts newline (ASCII LF; Ctrl+Enter sends this in most terminals)
        (KeyModifiers::CONTROL, KeyCode::Char('j')) => Some(TuiEvent::InputChar('\n')),
        (KeyModifiers::CONTROL, _) => None,
        (_, KeyCode::Char(c)) => Some(TuiEvent::InputChar(c)),
        (_, KeyCode::Tab) => Some(TuiEvent::NextField),
        (_, KeyCode::BackTab) => Some(TuiEvent::PrevField),
        (_, KeyCode::Esc) => Some(TuiEvent::Escape),
        (_, KeyCode::Enter) => Some(TuiEvent::Submit),
        (_, KeyCode::Backspace) => Some(TuiEvent::Backspace),
        (_, KeyCode::Delete) => Some(TuiEvent::Delete),
        (_, KeyCode::Left) => Some(TuiEvent::CursorLeft),
        (_, KeyCode::Right) => Some(TuiEvent::CursorRight),
        (_, KeyCode::Up) => Some(TuiEvent::CursorUp),
        (_, KeyCode::Down) => Some(TuiEvent::CursorDown),
        (_, KeyCode::Home) => Some(TuiEvent::CursorHome),
        (_, KeyCode::End) => Some(TuiEvent::CursorEnd),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_control_shortcuts() {
        assert_eq!(
            map_key(KeyModifiers::CONTROL, KeyCode::Char('t')),
            Some(TuiEvent::Translate)
        );
        assert_eq!(
            map_key(KeyModifiers::CONTROL, KeyCode::Char('s')),
            Some(TuiEvent::Swap)
        );
        assert_eq!(
            map_key(KeyModifiers::CONTROL, KeyCode::Char('j')),
            Some(TuiEvent::InputChar('\n'))
        );
        assert_eq!(map_key(KeyModifiers::CONTROL, KeyCode::Char('x')), None);
    }

    #[test]
    fn test_shifted_chars_are_input() {
        assert_eq!(
            map_key(KeyModifiers::SHIFT, KeyCode::Char('A')),
            Some(TuiEvent::InputChar('A'))
        );
        assert_eq!(
            map_key(KeyModifiers::SHIFT, KeyCode::BackTab),
            Some(TuiEvent::PrevField)
        );
    }
}
