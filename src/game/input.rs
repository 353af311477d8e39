//! Input Events
//!
//! Platform-neutral input events and the per-mode key bindings.

use crate::session::SessionMode;

/// Keyboard keys the session reacts to. Everything else is `Char`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    /// Space bar.
    Space,
    /// Escape.
    Escape,
    /// Any printable key.
    Char(char),
}

/// One input event for the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputEvent {
    /// Key pressed.
    KeyDown(Key),
    /// Mouse button pressed (1 = left).
    MouseDown {
        /// Button index.
        button: u8,
    },
    /// Relative mouse motion.
    MouseMotion {
        /// Horizontal delta.
        dx: i32,
        /// Vertical delta.
        dy: i32,
    },
    /// Window closed.
    Quit,
}

impl InputEvent {
    /// Whether this event ends the process (window close or Escape).
    pub fn is_exit(&self) -> bool {
        matches!(self, Self::Quit | Self::KeyDown(Key::Escape))
    }
}

/// Source of input events, polled once per frame.
pub trait InputSource {
    /// Events since the last poll.
    fn poll(&mut self) -> Vec<InputEvent>;
}

/// What a key press asks the session to do.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// Landing: start a game.
    Start,
    /// Landing: open the leaderboard.
    ViewLeaderboard,
    /// Landing: connect (or re-fund) the wallet.
    ConnectWallet,
    /// Results: back to landing.
    Back,
    /// Results: play again.
    Replay,
    /// Playing: quit the current game.
    ExitGame,
}

/// Key bindings per mode. Unbound keys map to `None`.
pub fn action_for(mode: SessionMode, event: &InputEvent) -> Option<Action> {
    let InputEvent::KeyDown(key) = event else {
        return None;
    };
    let key = match key {
        Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
        other => *other,
    };

    match (mode, key) {
        (SessionMode::Landing, Key::Space) => Some(Action::Start),
        (SessionMode::Landing, Key::Char('l')) => Some(Action::ViewLeaderboard),
        (SessionMode::Landing, Key::Char('w')) => Some(Action::ConnectWallet),
        (SessionMode::Results, Key::Char('b')) => Some(Action::Back),
        (SessionMode::Results, Key::Char('r') | Key::Space) => Some(Action::Replay),
        (SessionMode::Playing, Key::Char('b')) => Some(Action::ExitGame),
        _ => None,
    }
}
