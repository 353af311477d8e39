//! Collaborator Contracts
//!
//! The renderer, raycaster, NPC handler, weapon, audio and window live
//! outside this crate. The frame loop drives them only through these traits.

use std::time::Duration;

use crate::game::input::InputEvent;
use crate::ledger::AccountAddress;
use crate::session::{EndKind, EndOfGameSignal, Leaderboard, NpcCountSource};
use crate::wallet::FundingState;

/// Per-tick context handed to updating collaborators.
pub struct FrameContext<'a> {
    /// Time since the previous tick.
    pub delta_time: Duration,
    /// Set on ticks where the animation clock fired.
    pub animation_trigger: bool,
    /// Raise this on a terminal condition (player death, level cleared).
    pub end_of_game: &'a mut EndOfGameSignal,
}

/// The player avatar: movement, collision, health.
pub trait Player {
    /// Advance one tick.
    fn update(&mut self, ctx: &mut FrameContext<'_>);
    /// Every input event, regardless of mode.
    fn single_fire_event(&mut self, event: &InputEvent);
}

/// Wall raycaster.
pub trait RayCasting {
    /// Advance one tick.
    fn update(&mut self, ctx: &mut FrameContext<'_>);
}

/// NPC and sprite owner. Its alive count feeds the score tracker.
pub trait ObjectHandler: NpcCountSource {
    /// Advance one tick.
    fn update(&mut self, ctx: &mut FrameContext<'_>);
}

/// Player weapon.
pub trait Weapon {
    /// Advance one tick.
    fn update(&mut self, ctx: &mut FrameContext<'_>);
    /// Draw the weapon sprite.
    fn draw(&mut self);
}

/// Scene renderer.
pub trait ObjectRenderer {
    /// Draw walls and sprites.
    fn draw(&mut self);
    /// Draw the defeat overlay.
    fn game_over(&mut self);
    /// Draw the victory overlay.
    fn win(&mut self);
}

/// Gameplay collaborators for one game. Rebuilt on every new game.
pub struct World {
    /// Player avatar.
    pub player: Box<dyn Player>,
    /// Raycaster.
    pub raycasting: Box<dyn RayCasting>,
    /// NPC handler.
    pub object_handler: Box<dyn ObjectHandler>,
    /// Weapon.
    pub weapon: Box<dyn Weapon>,
    /// Renderer.
    pub object_renderer: Box<dyn ObjectRenderer>,
}

/// Builds a fresh [`World`] (map, player, NPCs) for a new game.
pub trait WorldFactory {
    /// Build a new world.
    fn build(&mut self) -> World;
}

/// Title screen contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LandingView {
    /// Connected wallet, if any.
    pub wallet: Option<AccountAddress>,
    /// Its funding state.
    pub funding: FundingState,
}

/// Results screen contents.
#[derive(Debug, Clone, Copy)]
pub struct ResultsView<'a> {
    /// Cached leaderboard.
    pub leaderboard: &'a Leaderboard,
    /// Score of the game just finished.
    pub last_score: Option<u64>,
    /// Wallet's score on chain.
    pub recorded_score: Option<u64>,
    /// How the game ended (`None` for an exit or a direct visit).
    pub last_end: Option<EndKind>,
    /// Whether a score submission is still running.
    pub submitting: bool,
}

/// Window, text and input-grab surface.
pub trait Display {
    /// Title screen.
    fn draw_landing(&mut self, view: &LandingView);
    /// Leaderboard screen.
    fn draw_results(&mut self, view: &ResultsView<'_>);
    /// In-game HUD ("Press B to exit game", score).
    fn draw_hud(&mut self, score: u64);
    /// Translucent "Game Exited" overlay.
    fn draw_disclaimer(&mut self);
    /// Capture or release the mouse.
    fn set_input_grab(&mut self, grabbed: bool);
    /// Flip buffers. `fps` is the measured frame rate.
    fn present(&mut self, fps: f32);
}

/// Ambient audio.
pub trait Sound {
    /// Start the looping music track.
    fn play_music(&mut self);
    /// Stop music.
    fn stop_music(&mut self);
}
