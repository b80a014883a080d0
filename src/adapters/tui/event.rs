use color_eyre::Result;
use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

#[derive(Debug, Clone, PartialEq)]
pub enum AppEvent {
    Quit,
    Refresh,
    Cancel,

    // Focus and selection
    Tab,
    NextTask,
    PreviousTask,
    CyclePriority,
    CycleFilter,

    // Text editing
    Character(char),
    Backspace,
    Delete,
    CursorLeft,
    CursorRight,
    CursorHome,
    CursorEnd,
    Enter,

    Tick,
}

pub struct EventHandler {
    should_quit: bool,
}

impl EventHandler {
    pub fn new() -> Self {
        Self { should_quit: false }
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    pub async fn next_event(&mut self) -> Result<AppEvent> {
        if event::poll(Duration::from_millis(100))? {
            match event::read()? {
                Event::Key(key_event) if key_event.kind == KeyEventKind::Press => {
                    Ok(self.handle_key_event(key_event))
                }
                _ => Ok(AppEvent::Tick),
            }
        } else {
            Ok(AppEvent::Tick)
        }
    }

    /// Maps raw keys to events. Plain characters are left for the app to interpret,
    /// since whether `q` quits or is typed depends on what has focus.
    pub fn handle_key_event(&mut self, key_event: KeyEvent) -> AppEvent {
        match key_event {
            KeyEvent {
                code: KeyCode::Char('c'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => {
                self.should_quit = true;
                AppEvent::Quit
            }

            KeyEvent {
                code: KeyCode::Char('r'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => AppEvent::Refresh,

            KeyEvent {
                code: KeyCode::Char('f'),
                modifiers: KeyModifiers::CONTROL,
                ..
            } => AppEvent::CycleFilter,

            KeyEvent {
                code: KeyCode::Esc, ..
            } => AppEvent::Cancel,

            KeyEvent {
                code: KeyCode::Tab,
                modifiers: KeyModifiers::NONE,
                ..
            } => AppEvent::Tab,

            KeyEvent {
                code: KeyCode::BackTab,
                ..
            } => AppEvent::CyclePriority,

            KeyEvent {
                code: KeyCode::Enter,
                ..
            } => AppEvent::Enter,

            KeyEvent {
                code: KeyCode::Down,
                ..
            } => AppEvent::NextTask,

            KeyEvent {
                code: KeyCode::Up, ..
            } => AppEvent::PreviousTask,

            KeyEvent {
                code: KeyCode::Left,
                ..
            } => AppEvent::CursorLeft,

            KeyEvent {
                code: KeyCode::Right,
                ..
            } => AppEvent::CursorRight,

            KeyEvent {
                code: KeyCode::Home,
                ..
            } => AppEvent::CursorHome,

            KeyEvent {
                code: KeyCode::End, ..
            } => AppEvent::CursorEnd,

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::NONE,
                ..
            } => AppEvent::Character(c),

            KeyEvent {
                code: KeyCode::Char(c),
                modifiers: KeyModifiers::SHIFT,
                ..
            } => AppEvent::Character(c.to_uppercase().next().unwrap_or(c)),

            KeyEvent {
                code: KeyCode::Backspace,
                ..
            } => AppEvent::Backspace,

            KeyEvent {
                code: KeyCode::Delete,
                ..
            } => AppEvent::Delete,

            _ => AppEvent::Tick,
        }
    }
}
