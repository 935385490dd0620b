use std::time::Duration;
use tracing::trace;

use crate::domain::{Message, TVConfig, TVError};
use crate::model::Model;
use ratatui::crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

pub struct Controller {
    event_poll_time: u64,
}

impl Controller {
    pub fn new(cfg: &TVConfig) -> Self {
        Self {
            event_poll_time: cfg.event_poll_time,
        }
    }

    pub fn handle_event(&self, model: &Model) -> Result<Option<Message>, TVError> {
        if event::poll(Duration::from_millis(self.event_poll_time))? {
            match event::read()? {
                // crossterm also emits release and repeat events on Windows
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    return Ok(self.handle_key(key, model.raw_keyevents()));
                }
                Event::Resize(width, height) => {
                    return Ok(Some(Message::Resize(width as usize, height as usize)));
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn handle_key(&self, key: KeyEvent, raw: bool) -> Option<Message> {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return Some(Message::Quit);
        }
        if raw {
            return Some(Message::RawKey(key));
        }
        let message = match (key.code, key.modifiers) {
            (KeyCode::Char('q'), _) => Some(Message::Quit),
            (KeyCode::Left, _) | (KeyCode::Char('p'), _) => Some(Message::PreviousRecord),
            (KeyCode::Right, _) | (KeyCode::Char('n'), _) => Some(Message::NextRecord),
            (KeyCode::Home, _) => Some(Message::FirstRecord),
            (KeyCode::End, _) => Some(Message::LastRecord),
            (KeyCode::Up, _) | (KeyCode::Char('k'), _) => Some(Message::MoveUp),
            (KeyCode::Down, _) | (KeyCode::Char('j'), _) => Some(Message::MoveDown),
            (KeyCode::PageUp, _) => Some(Message::ScrollUp),
            (KeyCode::PageDown, _) => Some(Message::ScrollDown),
            (KeyCode::Enter, _) => Some(Message::Enter),
            (KeyCode::Esc, _) => Some(Message::Exit),
            (KeyCode::Char('a'), _) => Some(Message::ApplyFilters),
            (KeyCode::Char('c'), _) => Some(Message::ClearFilters),
            (KeyCode::Char('o'), _) => Some(Message::OpenFile),
            (KeyCode::Char('e'), _) => Some(Message::ExportFile),
            (KeyCode::Char('y'), _) => Some(Message::CopyRecord),
            (KeyCode::Char('?'), _) => Some(Message::Help),
            _ => None,
        };
        trace!("Mapped: {key:?} => {message:?}");
        message
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::HELP_TEXT;

    fn controller() -> Controller {
        Controller::new(&TVConfig::default())
    }

    #[test]
    fn maps_navigation_keys() {
        let c = controller();
        assert_eq!(
            c.handle_key(KeyEvent::from(KeyCode::Right), false),
            Some(Message::NextRecord)
        );
        assert_eq!(
            c.handle_key(KeyEvent::from(KeyCode::Char('p')), false),
            Some(Message::PreviousRecord)
        );
        assert_eq!(
            c.handle_key(KeyEvent::from(KeyCode::Char('a')), false),
            Some(Message::ApplyFilters)
        );
        assert_eq!(c.handle_key(KeyEvent::from(KeyCode::F(5)), false), None);
    }

    #[test]
    fn ctrl_c_quits_but_c_clears() {
        let c = controller();
        assert_eq!(
            c.handle_key(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                false
            ),
            Some(Message::Quit)
        );
        assert_eq!(
            c.handle_key(KeyEvent::from(KeyCode::Char('c')), false),
            Some(Message::ClearFilters)
        );
    }

    #[test]
    fn raw_mode_forwards_keys() {
        let c = controller();
        let key = KeyEvent::from(KeyCode::Char('q'));
        assert_eq!(c.handle_key(key, true), Some(Message::RawKey(key)));
    }

    #[test]
    fn ctrl_c_quits_while_typing() {
        let c = controller();
        assert_eq!(
            c.handle_key(
                KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL),
                true
            ),
            Some(Message::Quit)
        );
    }

    #[test]
    fn help_lists_every_browse_key() {
        let c = controller();
        for key in ['q', 'p', 'n', 'k', 'j', 'a', 'c', 'o', 'e', 'y', '?'] {
            assert!(c.handle_key(KeyEvent::from(KeyCode::Char(key)), false).is_some());
            let listed = HELP_TEXT
                .lines()
                .any(|l| l.split_whitespace().take(2).any(|w| w == key.to_string()));
            assert!(listed, "{key} missing from help");
        }
    }
}
