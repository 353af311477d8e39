//! Headless Collaborators
//!
//! Stand-ins for the window, renderer, audio and input device so a full
//! session (landing, a game, results, leaderboard traffic) runs without a
//! display. Screens are reported through `tracing`.

use std::collections::VecDeque;

use tracing::{debug, info};

use crate::game::input::{InputEvent, InputSource, Key};
use crate::game::world::{
    Display, FrameContext, LandingView, ObjectHandler, ObjectRenderer, Player, RayCasting,
    ResultsView, Sound, Weapon, World, WorldFactory,
};
use crate::session::{EndKind, NpcCountSource};

// =============================================================================
// WORLD
// =============================================================================

/// Builds demo worlds: NPCs die on a fixed cadence, the player dies of old
/// age. Whichever runs out first ends the game.
#[derive(Debug, Clone)]
pub struct DemoWorld {
    /// NPCs per game.
    pub npcs: usize,
    /// Ticks between NPC deaths.
    pub kill_every: u32,
    /// Ticks until the player dies.
    pub lifetime: u32,
}

impl Default for DemoWorld {
    fn default() -> Self {
        Self {
            npcs: 8,
            kill_every: 45,
            lifetime: 600,
        }
    }
}

impl WorldFactory for DemoWorld {
    fn build(&mut self) -> World {
        debug!("Building demo world with {} NPCs", self.npcs);
        World {
            player: Box::new(DemoPlayer {
                ticks: 0,
                lifetime: self.lifetime,
            }),
            raycasting: Box::new(Noop),
            object_handler: Box::new(DemoNpcs {
                alive: self.npcs,
                ticks: 0,
                kill_every: self.kill_every.max(1),
            }),
            weapon: Box::new(Noop),
            object_renderer: Box::new(DemoRenderer::default()),
        }
    }
}

struct DemoPlayer {
    ticks: u32,
    lifetime: u32,
}

impl Player for DemoPlayer {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.ticks += 1;
        if self.ticks >= self.lifetime {
            ctx.end_of_game.raise(EndKind::Defeat);
        }
    }

    fn single_fire_event(&mut self, event: &InputEvent) {
        if let InputEvent::MouseDown { button: 1 } = event {
            debug!("Bang");
        }
    }
}

struct DemoNpcs {
    alive: usize,
    ticks: u32,
    kill_every: u32,
}

impl NpcCountSource for DemoNpcs {
    fn alive_npcs(&self) -> usize {
        self.alive
    }
}

impl ObjectHandler for DemoNpcs {
    fn update(&mut self, ctx: &mut FrameContext<'_>) {
        self.ticks += 1;
        if self.alive > 0 && self.ticks % self.kill_every == 0 {
            self.alive -= 1;
        }
        if self.alive == 0 {
            ctx.end_of_game.raise(EndKind::Victory);
        }
    }
}

struct Noop;

impl RayCasting for Noop {
    fn update(&mut self, _ctx: &mut FrameContext<'_>) {}
}

impl Weapon for Noop {
    fn update(&mut self, _ctx: &mut FrameContext<'_>) {}
    fn draw(&mut self) {}
}

#[derive(Default)]
struct DemoRenderer {
    announced: bool,
}

impl ObjectRenderer for DemoRenderer {
    fn draw(&mut self) {}

    fn game_over(&mut self) {
        if !std::mem::replace(&mut self.announced, true) {
            info!("GAME OVER");
        }
    }

    fn win(&mut self) {
        if !std::mem::replace(&mut self.announced, true) {
            info!("YOU WIN");
        }
    }
}

// =============================================================================
// DISPLAY / SOUND
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum Screen {
    Landing(LandingView),
    Playing { score: u64 },
    Results { rows: usize, recorded: Option<u64>, submitting: bool },
}

/// Display that logs each screen once, when its contents change.
#[derive(Debug, Default)]
pub struct LogDisplay {
    last: Option<Screen>,
    disclaimer: bool,
    presented: u64,
}

impl LogDisplay {
    /// New display with nothing shown yet.
    pub fn new() -> Self {
        Self::default()
    }

    fn show(&mut self, screen: Screen) -> bool {
        if self.last.as_ref() == Some(&screen) {
            return false;
        }
        self.last = Some(screen);
        true
    }
}

impl Display for LogDisplay {
    fn draw_landing(&mut self, view: &LandingView) {
        if self.show(Screen::Landing(*view)) {
            match view.wallet {
                Some(address) => info!(
                    "[landing] wallet {} ({:?}) | SPACE play, L leaderboard, W wallet",
                    address.short(),
                    view.funding
                ),
                None => info!("[landing] no wallet | SPACE play, L leaderboard, W connect"),
            }
        }
    }

    fn draw_results(&mut self, view: &ResultsView<'_>) {
        let screen = Screen::Results {
            rows: view.leaderboard.len(),
            recorded: view.recorded_score,
            submitting: view.submitting,
        };
        if !self.show(screen) {
            return;
        }

        info!(
            "[results] last {:?} ({:?}), on chain {:?}{}",
            view.last_score,
            view.last_end,
            view.recorded_score,
            if view.submitting { ", submitting" } else { "" }
        );
        for (rank, row) in view.leaderboard.entries().iter().enumerate() {
            info!("  {:>2}. {} {}", rank + 1, row.address.short(), row.score);
        }
    }

    fn draw_hud(&mut self, score: u64) {
        if self.show(Screen::Playing { score }) {
            info!("[playing] score {} | B exit", score);
        }
    }

    fn draw_disclaimer(&mut self) {
        if !self.disclaimer {
            info!("[overlay] Game Exited");
        }
        self.disclaimer = true;
    }

    fn set_input_grab(&mut self, grabbed: bool) {
        debug!("Input grab: {}", grabbed);
    }

    fn present(&mut self, fps: f32) {
        if !matches!(self.last, Some(Screen::Playing { .. })) {
            self.disclaimer = false;
        }
        self.presented += 1;
        if self.presented % 300 == 0 {
            debug!("{:.1} fps", fps);
        }
    }
}

/// Sound that only logs.
#[derive(Debug, Default)]
pub struct SilentSound;

impl Sound for SilentSound {
    fn play_music(&mut self) {
        debug!("Music on");
    }

    fn stop_music(&mut self) {
        debug!("Music off");
    }
}

// =============================================================================
// INPUT
// =============================================================================

/// Replays events at fixed frame numbers.
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frame: u64,
    script: VecDeque<(u64, InputEvent)>,
}

impl ScriptedInput {
    /// Script from `(frame, event)` pairs; sorted by frame.
    pub fn new(mut script: Vec<(u64, InputEvent)>) -> Self {
        script.sort_by_key(|(frame, _)| *frame);
        Self {
            frame: 0,
            script: script.into(),
        }
    }

    /// Start a game, let it play out, look at the leaderboard, go back,
    /// then quit.
    pub fn demo() -> Self {
        Self::new(vec![
            (30, InputEvent::KeyDown(Key::Space)),
            (120, InputEvent::MouseDown { button: 1 }),
            (700, InputEvent::KeyDown(Key::Char('b'))),
            (760, InputEvent::KeyDown(Key::Escape)),
        ])
    }
}

impl InputSource for ScriptedInput {
    fn poll(&mut self) -> Vec<InputEvent> {
        let mut events = Vec::new();
        while let Some((at, event)) = self.script.front().copied() {
            if at > self.frame {
                break;
            }
            events.push(event);
            self.script.pop_front();
        }
        self.frame += 1;
        events
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{FrameConfig, LedgerConfig};
    use crate::game::FrameLoop;
    use crate::ledger::mock::MockLedger;
    use crate::ledger::LedgerWorker;
    use crate::session::SessionMode;
    use serde_json::json;

    #[test]
    fn test_scripted_input_fires_on_frame() {
        let mut input = ScriptedInput::new(vec![
            (2, InputEvent::Quit),
            (0, InputEvent::KeyDown(Key::Space)),
        ]);
        assert_eq!(input.poll(), vec![InputEvent::KeyDown(Key::Space)]);
        assert!(input.poll().is_empty());
        assert_eq!(input.poll(), vec![InputEvent::Quit]);
        assert!(input.poll().is_empty());
    }

    #[test]
    fn test_demo_world_victory_when_npcs_run_out() {
        let mut world = DemoWorld {
            npcs: 2,
            kill_every: 3,
            lifetime: 100,
        }
        .build();
        let mut signal = crate::session::EndOfGameSignal::default();

        for _ in 0..6 {
            let mut ctx = FrameContext {
                delta_time: std::time::Duration::ZERO,
                animation_trigger: false,
                end_of_game: &mut signal,
            };
            world.player.update(&mut ctx);
            world.object_handler.update(&mut ctx);
        }
        assert_eq!(world.object_handler.alive_npcs(), 0);
        assert_eq!(signal.peek(), Some(EndKind::Victory));
    }

    #[tokio::test(start_paused = true)]
    async fn test_demo_session_runs_to_exit() {
        let ledger = MockLedger::new();
        ledger.set_view_result(Ok(vec![json!([{"address": "0x1", "score": "500"}])]));
        let handle = LedgerWorker::new(ledger.clone(), &LedgerConfig::default()).spawn();

        let frame = FrameLoop::new(
            FrameConfig::default(),
            handle,
            Box::new(DemoWorld::default()),
            Box::new(LogDisplay::new()),
            Box::new(SilentSound),
        );
        let session = frame.run(ScriptedInput::demo()).await;

        // 8 NPCs dead before the player's lifetime runs out
        assert_eq!(session.last_end, Some(EndKind::Victory));
        assert_eq!(session.last_score, Some(80));
        assert_eq!(session.mode(), SessionMode::Landing);
        assert_eq!(ledger.submitted().len(), 1);
        assert_eq!(ledger.fund_calls().len(), 1);
    }
}
