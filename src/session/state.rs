//! Session Mode Machine
//!
//! ```text
//!   Landing --Start--------------> Playing
//!   Landing --ViewLeaderboard----> Results
//!   Results --Back---------------> Landing
//!   Results --Replay-------------> Playing
//!   Playing --EndOfGame----------> Results
//! ```
//!
//! Any other (mode, trigger) pair is a no-op.

/// Which screen the session is on. Exactly one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SessionMode {
    /// Title screen.
    #[default]
    Landing,
    /// In a game.
    Playing,
    /// Leaderboard / game-over screen.
    Results,
}

/// Something that may move the session to another mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Trigger {
    /// Begin a game from the title screen.
    Start,
    /// Open the leaderboard from the title screen.
    ViewLeaderboard,
    /// Return to the title screen.
    Back,
    /// Play again from the results screen.
    Replay,
    /// The game ended (signal or exit overlay).
    EndOfGame,
}

impl SessionMode {
    /// Target mode for `trigger`, or `None` if the pair is not a legal
    /// transition.
    pub fn next(self, trigger: Trigger) -> Option<SessionMode> {
        match (self, trigger) {
            (Self::Landing, Trigger::Start) => Some(Self::Playing),
            (Self::Landing, Trigger::ViewLeaderboard) => Some(Self::Results),
            (Self::Results, Trigger::Back) => Some(Self::Landing),
            (Self::Results, Trigger::Replay) => Some(Self::Playing),
            (Self::Playing, Trigger::EndOfGame) => Some(Self::Results),
            _ => None,
        }
    }

    /// Whether gameplay collaborators advance in this mode.
    pub fn is_playing(self) -> bool {
        self == Self::Playing
    }
}

/// How a game ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EndKind {
    /// Player died.
    Defeat,
    /// All enemies cleared.
    Victory,
}

/// Terminal condition raised by gameplay, consumed once by the frame loop.
///
/// Raising while a signal is already pending keeps the first one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EndOfGameSignal {
    kind: Option<EndKind>,
}

impl EndOfGameSignal {
    /// Raise the signal. Returns `false` if one was already pending.
    pub fn raise(&mut self, kind: EndKind) -> bool {
        if self.kind.is_some() {
            return false;
        }
        self.kind = Some(kind);
        true
    }

    /// Whether a signal is waiting to be handled.
    pub fn is_pending(&self) -> bool {
        self.kind.is_some()
    }

    /// Pending kind, without consuming it.
    pub fn peek(&self) -> Option<EndKind> {
        self.kind
    }

    /// Consume the signal.
    pub fn take(&mut self) -> Option<EndKind> {
        self.kind.take()
    }

    /// Drop any pending signal.
    pub fn clear(&mut self) {
        self.kind = None;
    }
}
