use anyhow::Result;
pub use crossterm::event::{Event, KeyCode, KeyEvent, KeyModifiers, MouseButton, MouseEvent, MouseEventKind};
use std::time::Duration;

/// Trait for abstracting event sources to enable testing
pub trait EventSource {
    /// Poll for events with a timeout
    fn poll(&mut self, timeout: Duration) -> Result<bool>;

    /// Read the next event
    fn read(&mut self) -> Result<Event>;
}

/// Real terminal event source using crossterm
pub struct TerminalEventSource;

impl EventSource for TerminalEventSource {
    fn poll(&mut self, timeout: Duration) -> Result<bool> {
        Ok(crossterm::event::poll(timeout)?)
    }

    fn read(&mut self) -> Result<Event> {
        Ok(crossterm::event::read()?)
    }
}

/// Simulated event source for testing
pub struct SimulatedEventSource {
    pub(crate) events: Vec<Event>,
    current_index: usize,
}

impl SimulatedEventSource {
    pub fn new(events: Vec<Event>) -> Self {
        Self {
            events,
            current_index: 0,
        }
    }

    /// Helper method to create a key event
    pub fn key_event(code: KeyCode, modifiers: KeyModifiers) -> Event {
        Event::Key(KeyEvent {
            code,
            modifiers,
            kind: crossterm::event::KeyEventKind::Press,
            state: crossterm::event::KeyEventState::empty(),
        })
    }

    /// Helper method to create a plain key event with no modifiers
    pub fn key(code: KeyCode) -> Event {
        Self::key_event(code, KeyModifiers::empty())
    }

    /// Helper method to create a simple character key event
    pub fn char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c), KeyModifiers::empty())
    }

    /// Helper method to create a Ctrl+char key event
    pub fn ctrl_char_key(c: char) -> Event {
        Self::key_event(KeyCode::Char(c), KeyModifiers::CONTROL)
    }

    fn mouse_event(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::empty(),
        })
    }

    /// Left-button press at terminal coordinates
    pub fn mouse_down(column: u16, row: u16) -> Event {
        Self::mouse_event(MouseEventKind::Down(MouseButton::Left), column, row)
    }

    /// Left-button drag to terminal coordinates
    pub fn mouse_drag(column: u16, row: u16) -> Event {
        Self::mouse_event(MouseEventKind::Drag(MouseButton::Left), column, row)
    }

    /// Left-button release at terminal coordinates
    pub fn mouse_up(column: u16, row: u16) -> Event {
        Self::mouse_event(MouseEventKind::Up(MouseButton::Left), column, row)
    }
}

impl EventSource for SimulatedEventSource {
    fn poll(&mut self, _timeout: Duration) -> Result<bool> {
        Ok(self.current_index < self.events.len())
    }

    fn read(&mut self) -> Result<Event> {
        if self.current_index < self.events.len() {
            let event = self.events[self.current_index].clone();
            self.current_index += 1;
            Ok(event)
        } else {
            // Return a quit event if we've exhausted all events
            Ok(SimulatedEventSource::char_key('q'))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn simulated_source_replays_in_order() {
        let events = vec![
            SimulatedEventSource::char_key('j'),
            SimulatedEventSource::key(KeyCode::Right),
            SimulatedEventSource::ctrl_char_key('d'),
        ];

        let mut source = SimulatedEventSource::new(events);

        assert!(source.poll(Duration::from_millis(0)).unwrap());

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('j'));
            assert!(key.modifiers.is_empty());
        }

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Right);
        }

        if let Event::Key(key) = source.read().unwrap() {
            assert_eq!(key.code, KeyCode::Char('d'));
            assert!(key.modifiers.contains(KeyModifiers::CONTROL));
        }

        assert!(!source.poll(Duration::from_millis(0)).unwrap());
    }

    #[test]
    fn mouse_helpers_carry_coordinates() {
        let event = SimulatedEventSource::mouse_drag(42, 7);
        match event {
            Event::Mouse(m) => {
                assert_eq!(m.kind, MouseEventKind::Drag(MouseButton::Left));
                assert_eq!(m.column, 42);
                assert_eq!(m.row, 7);
            }
            _ => panic!("expected mouse event"),
        }
    }

    #[test]
    fn exhausted_source_returns_quit() {
        let mut source = SimulatedEventSource::new(vec![]);
        match source.read().unwrap() {
            Event::Key(key) => assert_eq!(key.code, KeyCode::Char('q')),
            _ => panic!("expected key event"),
        }
    }
}
