//! Game Orchestration
//!
//! Drives the external gameplay collaborators once per frame and keeps the
//! session, score and ledger traffic in step with them.
//!
//! ## Module Structure
//!
//! - `input`: Input events and per-mode key bindings
//! - `world`: Collaborator traits and the per-tick context
//! - `frame`: The frame loop

pub mod frame;
pub mod input;
pub mod world;

// Re-export key types
pub use frame::FrameLoop;
pub use input::{action_for, Action, InputEvent, InputSource, Key};
pub use world::{
    Display, FrameContext, LandingView, ObjectHandler, ObjectRenderer, Player, RayCasting,
    ResultsView, Sound, Weapon, World, WorldFactory,
};
