//! # Input Module
//!
//! Keyboard capture and translation into move/quit events.
//!
//! Key events are read on a dedicated thread (crossterm's `read` blocks)
//! and forwarded over an async channel, so the session driver can await
//! input alongside other futures. Unrecognized keys are dropped here;
//! only valid directions ever reach the engine.

use crate::game::{Direction, GameSnapshot, MoveSource};
use crate::Llm2048Result;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

/// A translated input event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Move in the given direction
    Move(Direction),
    /// Quit the game
    Quit,
}

/// Maps a key press to an input event.
///
/// Arrow keys and WASD move; `q`, Escape, and Ctrl-C quit. Anything else
/// is rejected at this boundary.
pub fn map_key_event(key: KeyEvent) -> Option<InputEvent> {
    match key.code {
        KeyCode::Up | KeyCode::Char('w') => Some(InputEvent::Move(Direction::Up)),
        KeyCode::Right | KeyCode::Char('d') => Some(InputEvent::Move(Direction::Right)),
        KeyCode::Down | KeyCode::Char('s') => Some(InputEvent::Move(Direction::Down)),
        KeyCode::Left | KeyCode::Char('a') => Some(InputEvent::Move(Direction::Left)),
        KeyCode::Char('q') | KeyCode::Esc => Some(InputEvent::Quit),
        KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
            Some(InputEvent::Quit)
        }
        _ => None,
    }
}

/// Background keyboard listener feeding an async channel.
///
/// The listening thread exits when it delivers a quit event or when the
/// receiving side is dropped; the process does not wait on it at exit.
pub struct InputListener {
    rx: UnboundedReceiver<InputEvent>,
}

impl InputListener {
    /// Spawns the listener thread and returns the receiving handle.
    pub fn spawn() -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        std::thread::spawn(move || listen_loop(tx));
        Self { rx }
    }

    /// Awaits the next input event. `None` means the listener is gone.
    pub async fn next(&mut self) -> Option<InputEvent> {
        self.rx.recv().await
    }
}

fn listen_loop(tx: UnboundedSender<InputEvent>) {
    loop {
        let event = match crossterm::event::read() {
            Ok(event) => event,
            Err(error) => {
                log::warn!("keyboard listener stopped: {error}");
                break;
            }
        };
        let Event::Key(key) = event else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        if let Some(input) = map_key_event(key) {
            let quit = input == InputEvent::Quit;
            if tx.send(input).is_err() || quit {
                break;
            }
        }
    }
}

/// Adapts the keyboard listener to the [`MoveSource`] contract.
pub struct KeyboardSource {
    listener: InputListener,
}

impl KeyboardSource {
    pub fn new(listener: InputListener) -> Self {
        Self { listener }
    }
}

impl MoveSource for KeyboardSource {
    async fn next_move(&mut self, _snapshot: &GameSnapshot) -> Llm2048Result<Option<Direction>> {
        while let Some(event) = self.listener.next().await {
            match event {
                InputEvent::Move(direction) => return Ok(Some(direction)),
                InputEvent::Quit => return Ok(None),
            }
        }
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn press(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_arrow_keys_map_to_directions() {
        assert_eq!(
            map_key_event(press(KeyCode::Up)),
            Some(InputEvent::Move(Direction::Up))
        );
        assert_eq!(
            map_key_event(press(KeyCode::Right)),
            Some(InputEvent::Move(Direction::Right))
        );
        assert_eq!(
            map_key_event(press(KeyCode::Down)),
            Some(InputEvent::Move(Direction::Down))
        );
        assert_eq!(
            map_key_event(press(KeyCode::Left)),
            Some(InputEvent::Move(Direction::Left))
        );
    }

    #[test]
    fn test_wasd_maps_to_directions() {
        assert_eq!(
            map_key_event(press(KeyCode::Char('w'))),
            Some(InputEvent::Move(Direction::Up))
        );
        assert_eq!(
            map_key_event(press(KeyCode::Char('a'))),
            Some(InputEvent::Move(Direction::Left))
        );
        assert_eq!(
            map_key_event(press(KeyCode::Char('s'))),
            Some(InputEvent::Move(Direction::Down))
        );
        assert_eq!(
            map_key_event(press(KeyCode::Char('d'))),
            Some(InputEvent::Move(Direction::Right))
        );
    }

    #[test]
    fn test_quit_keys() {
        assert_eq!(map_key_event(press(KeyCode::Char('q'))), Some(InputEvent::Quit));
        assert_eq!(map_key_event(press(KeyCode::Esc)), Some(InputEvent::Quit));
        assert_eq!(
            map_key_event(KeyEvent::new(KeyCode::Char('c'), KeyModifiers::CONTROL)),
            Some(InputEvent::Quit)
        );
    }

    #[test]
    fn test_unrecognized_keys_are_dropped() {
        assert_eq!(map_key_event(press(KeyCode::Char('x'))), None);
        assert_eq!(map_key_event(press(KeyCode::Enter)), None);
        assert_eq!(map_key_event(press(KeyCode::Char('c'))), None);
    }

    #[test]
    fn test_keyboard_source_forwards_moves_until_quit() {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut source = KeyboardSource::new(InputListener { rx });
        let snapshot = crate::game::GameEngine::new(4, Some(0)).snapshot();

        tx.send(InputEvent::Move(Direction::Left)).unwrap();
        tx.send(InputEvent::Move(Direction::Up)).unwrap();
        tx.send(InputEvent::Quit).unwrap();

        tokio_test::block_on(async {
            assert_eq!(
                source.next_move(&snapshot).await.unwrap(),
                Some(Direction::Left)
            );
            assert_eq!(
                source.next_move(&snapshot).await.unwrap(),
                Some(Direction::Up)
            );
            assert_eq!(source.next_move(&snapshot).await.unwrap(), None);
        });
    }

    #[test]
    fn test_keyboard_source_treats_closed_channel_as_quit() {
        let (tx, rx) = mpsc::unbounded_channel::<InputEvent>();
        let mut source = KeyboardSource::new(InputListener { rx });
        let snapshot = crate::game::GameEngine::new(4, Some(0)).snapshot();
        drop(tx);

        tokio_test::block_on(async {
            assert_eq!(source.next_move(&snapshot).await.unwrap(), None);
        });
    }
}
