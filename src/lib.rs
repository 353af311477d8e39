//! # Ben Ton
//!
//! Session orchestration for a first-person shooter whose scores live on a
//! remote ledger.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                          BEN TON                             │
//! ├─────────────────────────────────────────────────────────────┤
//! │  game/           - Frame loop (synchronous, per frame)       │
//! │  ├── frame.rs    - Tick orchestration and mode routing       │
//! │  ├── input.rs    - Input events and key bindings             │
//! │  └── world.rs    - Renderer/raycaster/NPC/audio contracts    │
//! │                                                              │
//! │  session/        - Per-player state                          │
//! │  ├── state.rs    - Landing/Playing/Results machine           │
//! │  ├── score.rs    - Kill-based score tracking                 │
//! │  ├── leaderboard.rs - Cached top scores                      │
//! │  └── overlay.rs  - "Game Exited" timer                       │
//! │                                                              │
//! │  ledger/         - Remote ledger (async, off the frame loop) │
//! │  ├── worker.rs   - Command queue and completions             │
//! │  ├── submit.rs   - Bounded-retry score submission            │
//! │  ├── contract.rs - Score module functions and views          │
//! │  ├── http.rs     - REST node and faucet client               │
//! │  └── types.rs    - Addresses, records, payloads              │
//! │                                                              │
//! │  wallet.rs       - Account keys and funding lifecycle        │
//! │  config.rs       - Defaults and environment overrides        │
//! │  headless.rs     - Display-less collaborators for the demo   │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Threading
//!
//! The frame loop never blocks on the network. It queues ledger work on a
//! [`ledger::LedgerHandle`] and folds [`ledger::Completion`]s back in at the
//! start of a later tick. At most one score submission is in flight.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod game;
pub mod headless;
pub mod ledger;
pub mod session;
pub mod wallet;

// Re-export commonly used types
pub use config::{ConfigError, FrameConfig, GameConfig, LedgerConfig};
pub use game::{FrameLoop, InputEvent, InputSource, Key, World, WorldFactory};
pub use ledger::{
    AccountAddress, HttpLedger, LedgerClient, LedgerError, LedgerHandle, LedgerWorker,
    ScoreRecord,
};
pub use session::{EndKind, Leaderboard, Session, SessionMode};
pub use wallet::{FundingState, WalletAccount, WalletManager};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
