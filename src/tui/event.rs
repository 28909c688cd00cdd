//! Terminal input and tick events for the TUI

use std::time::Duration;

use crossterm::event::{Event, EventStream, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use futures::StreamExt;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};

use crate::core::counter::ExerciseChange;

/// Application events
#[derive(Debug, Clone)]
pub enum AppEvent {
    /// Key press
    Key(KeyEvent),
    /// Terminal resize
    Resize(u16, u16),
    /// Periodic tick driving spinners and counter refresh
    Tick,
}

/// Merges terminal input and a fixed tick into one channel
pub struct EventHandler {
    rx: mpsc::Receiver<AppEvent>,
    /// Reader task, aborted on drop
    task: JoinHandle<()>,
}

impl EventHandler {
    pub fn new(tick_rate: Duration) -> Self {
        let (tx, rx) = mpsc::channel(100);

        let task = tokio::spawn(async move {
            let mut input = EventStream::new();
            let mut ticks = interval(tick_rate);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                let event = tokio::select! {
                    _ = ticks.tick() => AppEvent::Tick,
                    next = input.next() => match next {
                        Some(Ok(event)) => match translate(event) {
                            Some(event) => event,
                            None => continue,
                        },
                        Some(Err(e)) => {
                            tracing::warn!(error = %e, "Terminal input failed");
                            break;
                        }
                        None => break,
                    },
                };

                if tx.send(event).await.is_err() {
                    break;
                }
            }
        });

        Self { rx, task }
    }

    /// Wait for the next event; `None` once input has closed
    pub async fn next(&mut self) -> Option<AppEvent> {
        self.rx.recv().await
    }
}

impl Drop for EventHandler {
    fn drop(&mut self) {
        self.task.abort();
    }
}

/// Keep key presses and resizes; drop releases, mouse and focus events
fn translate(event: Event) -> Option<AppEvent> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => Some(AppEvent::Key(key)),
        Event::Resize(width, height) => Some(AppEvent::Resize(width, height)),
        _ => None,
    }
}

/// Ctrl-C, which quits from any screen
pub fn is_interrupt_key(key: &KeyEvent) -> bool {
    key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL)
}

/// `q` on its own, or Ctrl-C
pub fn is_quit_key(key: &KeyEvent) -> bool {
    (key.code == KeyCode::Char('q') && key.modifiers.is_empty()) || is_interrupt_key(key)
}

/// Esc, or a bare Backspace
pub fn is_back_key(key: &KeyEvent) -> bool {
    match key.code {
        KeyCode::Esc => true,
        KeyCode::Backspace => key.modifiers.is_empty(),
        _ => false,
    }
}

/// Counter adjustment bound to a key, if any
///
/// `+`/↑ and `-`/↓ step by one, `]`/PgUp and `[`/PgDn by ten.
pub fn counter_change(key: &KeyEvent) -> Option<ExerciseChange> {
    match key.code {
        KeyCode::Char('+') | KeyCode::Char('=') | KeyCode::Up => Some(ExerciseChange::Increase),
        KeyCode::Char('-') | KeyCode::Down => Some(ExerciseChange::Decrease),
        KeyCode::Char(']') | KeyCode::PageUp => Some(ExerciseChange::IncreaseTen),
        KeyCode::Char('[') | KeyCode::PageDown => Some(ExerciseChange::DecreaseTen),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(code: KeyCode) -> KeyEvent {
        KeyEvent::new(code, KeyModifiers::NONE)
    }

    #[test]
    fn test_quit_keys() {
        assert!(is_quit_key(&key(KeyCode::Char('q'))));
        assert!(is_quit_key(&KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL
        )));
        assert!(!is_quit_key(&key(KeyCode::Char('c'))));
    }

    #[test]
    fn test_counter_bindings() {
        assert_eq!(
            counter_change(&key(KeyCode::Char('+'))),
            Some(ExerciseChange::Increase)
        );
        assert_eq!(
            counter_change(&key(KeyCode::Down)),
            Some(ExerciseChange::Decrease)
        );
        assert_eq!(
            counter_change(&key(KeyCode::PageUp)),
            Some(ExerciseChange::IncreaseTen)
        );
        assert_eq!(
            counter_change(&key(KeyCode::Char('['))),
            Some(ExerciseChange::DecreaseTen)
        );
        assert_eq!(counter_change(&key(KeyCode::Char('x'))), None);
    }

    #[test]
    fn test_back_keys() {
        assert!(is_back_key(&key(KeyCode::Esc)));
        assert!(is_back_key(&key(KeyCode::Backspace)));
        assert!(!is_back_key(&KeyEvent::new(KeyCode::Backspace, KeyModifiers::ALT)));
    }

    #[test]
    fn test_key_releases_are_dropped() {
        let mut release = key(KeyCode::Char('+'));
        release.kind = KeyEventKind::Release;
        assert!(translate(Event::Key(release)).is_none());

        assert!(matches!(
            translate(Event::Key(key(KeyCode::Char('+')))),
            Some(AppEvent::Key(_))
        ));
        assert!(matches!(
            translate(Event::Resize(80, 24)),
            Some(AppEvent::Resize(80, 24))
        ));
        assert!(translate(Event::FocusGained).is_none());
    }
}
