//! Frame Loop
//!
//! The per-frame orchestrator. One [`FrameLoop::tick`] does, in order:
//!
//! 1. fold ledger completions into the session
//! 2. apply an end-of-game signal raised on the previous tick
//! 3. route input through the key bindings of the mode the tick started
//!    in, then forward every event to the player
//! 4. update gameplay collaborators and sample the score (Playing only,
//!    frozen while the exit overlay is up)
//! 5. expire the exit overlay into the results screen
//! 6. refresh the leaderboard while on the results screen (throttled)
//! 7. render the current mode
//!
//! Nothing here awaits the network. Ledger work goes through the
//! [`LedgerHandle`] and comes back as completions on a later tick.

use std::time::Duration;

use tokio::time::{interval, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::FrameConfig;
use crate::game::input::{action_for, Action, InputEvent, InputSource};
use crate::game::world::{
    Display, FrameContext, LandingView, ResultsView, Sound, World, WorldFactory,
};
use crate::ledger::LedgerHandle;
use crate::session::{EndKind, NpcCountSource, Session, SessionMode, Trigger};

/// Smoothing factor for the FPS estimate.
const FPS_SMOOTHING: f32 = 0.1;

/// Drives one player session frame by frame.
pub struct FrameLoop {
    config: FrameConfig,
    session: Session,
    ledger: LedgerHandle,
    factory: Box<dyn WorldFactory>,
    world: World,
    display: Box<dyn Display>,
    sound: Box<dyn Sound>,
    last_tick: Instant,
    next_animation: Instant,
    next_refresh: Option<Instant>,
    fps: f32,
    frames: u64,
}

impl FrameLoop {
    /// Build the loop on the landing screen. Connects the wallet right away
    /// when `auto_connect_wallet` is set.
    pub fn new(
        config: FrameConfig,
        ledger: LedgerHandle,
        mut factory: Box<dyn WorldFactory>,
        display: Box<dyn Display>,
        sound: Box<dyn Sound>,
    ) -> Self {
        let world = factory.build();
        let mut session = Session::new(&config);
        session.score.reset(world.object_handler.alive_npcs());
        let now = Instant::now();

        let mut this = Self {
            config,
            session,
            ledger,
            factory,
            world,
            display,
            sound,
            last_tick: now,
            next_animation: now,
            next_refresh: None,
            fps: 0.0,
            frames: 0,
        };

        info!("Session {} started", this.session.id);
        if this.config.auto_connect_wallet {
            this.connect_wallet();
        }
        this
    }

    /// Session state.
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Current mode.
    pub fn mode(&self) -> SessionMode {
        self.session.mode()
    }

    /// Smoothed frames per second.
    pub fn fps(&self) -> f32 {
        self.fps
    }

    /// Ticks run so far.
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Run until an exit event arrives, paced to the target frame rate.
    /// Returns the final session.
    pub async fn run<I: InputSource>(mut self, mut input: I) -> Session {
        let mut ticker = interval(self.config.frame_duration());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        info!("Frame loop running at {} fps", self.config.target_fps);

        loop {
            ticker.tick().await;
            let events = input.poll();
            if events.iter().any(InputEvent::is_exit) {
                info!("Exit requested after {} frames", self.frames);
                break;
            }
            self.tick(&events);
        }

        self.sound.stop_music();
        self.display.set_input_grab(false);
        self.session
    }

    /// Run one frame.
    pub fn tick(&mut self, events: &[InputEvent]) {
        let now = Instant::now();
        let delta = now.duration_since(self.last_tick);
        self.last_tick = now;
        self.frames += 1;
        self.measure_fps(delta);
        // Keys pressed while gameplay was on screen keep their gameplay meaning
        let input_mode = self.session.mode();

        for completion in self.ledger.drain() {
            if self.session.apply_completion(completion) {
                // Our score changed on chain; refetch on the next results tick.
                self.next_refresh = None;
            }
        }

        if self.session.mode().is_playing() {
            if let Some(kind) = self.session.end_of_game.take() {
                self.enter_results(Some(kind), now);
            }
        }

        for event in events {
            self.handle_event(input_mode, event, now);
            self.world.player.single_fire_event(event);
        }

        if self.session.mode().is_playing() && !self.session.overlay.is_visible() {
            self.update_world(delta, now);
        }

        if self.session.overlay.poll(now) {
            self.enter_results(None, now);
        }

        if self.session.mode() == SessionMode::Results && self.refresh_due(now) {
            self.refresh_leaderboard(now);
        }

        self.render();
    }

    fn handle_event(&mut self, mode: SessionMode, event: &InputEvent, now: Instant) {
        let Some(action) = action_for(mode, event) else {
            return;
        };
        debug!("Input {:?} -> {:?}", event, action);

        match action {
            Action::Start => self.new_game(Trigger::Start),
            Action::Replay => self.new_game(Trigger::Replay),
            Action::ViewLeaderboard => {
                if self.session.transition(Trigger::ViewLeaderboard).is_some() {
                    self.refresh_leaderboard(now);
                }
            }
            Action::Back => {
                self.session.transition(Trigger::Back);
            }
            Action::ConnectWallet => self.connect_wallet(),
            Action::ExitGame => self.exit_game(now),
        }
    }

    fn update_world(&mut self, delta: Duration, now: Instant) {
        let animation_trigger = now >= self.next_animation;
        if animation_trigger {
            self.next_animation = now + self.config.animation_interval;
        }

        let mut ctx = FrameContext {
            delta_time: delta,
            animation_trigger,
            end_of_game: &mut self.session.end_of_game,
        };
        self.world.player.update(&mut ctx);
        self.world.raycasting.update(&mut ctx);
        self.world.object_handler.update(&mut ctx);
        self.world.weapon.update(&mut ctx);

        let credited = self.session.score.sample(&*self.world.object_handler);
        if credited > 0 {
            debug!("+{} (score {})", credited, self.session.score.current_score());
        }
    }

    fn new_game(&mut self, trigger: Trigger) {
        if self.session.transition(trigger).is_none() {
            return;
        }

        self.world = self.factory.build();
        self.session.score.reset(self.world.object_handler.alive_npcs());
        self.session.end_of_game.clear();
        self.session.overlay.disarm();
        self.session.last_end = None;
        self.next_refresh = None;

        self.sound.play_music();
        self.display.set_input_grab(true);
    }

    fn exit_game(&mut self, now: Instant) {
        if !self.session.mode().is_playing() || self.session.overlay.is_visible() {
            return;
        }
        info!(
            "Game exited at score {}",
            self.session.score.current_score()
        );
        self.sound.stop_music();
        self.display.set_input_grab(false);
        self.session.overlay.arm(now);
    }

    /// Shared by the end-of-game signal and the exit overlay.
    fn enter_results(&mut self, kind: Option<EndKind>, now: Instant) {
        if self.session.transition(Trigger::EndOfGame).is_none() {
            return;
        }

        let score = self.session.score.current_score();
        self.session.last_score = Some(score);
        self.session.last_end = kind;
        self.session.overlay.disarm();
        self.sound.stop_music();
        self.display.set_input_grab(false);

        match kind {
            Some(EndKind::Victory) => info!("Victory with score {}", score),
            Some(EndKind::Defeat) => info!("Defeat with score {}", score),
            None => info!("Left game with score {}", score),
        }

        self.submit_final_score(score);
        self.refresh_leaderboard(now);
    }

    fn submit_final_score(&mut self, score: u64) {
        if score == 0 {
            debug!("Nothing to submit");
            return;
        }
        let Some(account) = self.session.wallet.account().cloned() else {
            info!("No wallet connected, score {} stays local", score);
            return;
        };

        match self.ledger.submit_score(account, score) {
            Ok(id) => info!("Submitting score {} ({:?})", score, id),
            Err(e) => warn!("Score {} not submitted: {}", score, e),
        }
    }

    fn refresh_due(&self, now: Instant) -> bool {
        self.next_refresh.map_or(true, |at| now >= at)
    }

    fn refresh_leaderboard(&mut self, now: Instant) {
        self.next_refresh = Some(now + self.config.leaderboard_refresh);

        if let Err(e) = self.ledger.fetch_leaderboard() {
            warn!("Leaderboard fetch not queued: {}", e);
            return;
        }
        if let Some(account) = self.session.wallet.account() {
            if let Err(e) = self.ledger.fetch_player_score(account.address()) {
                warn!("Player score fetch not queued: {}", e);
            }
        }
    }

    fn connect_wallet(&mut self) {
        let (account, created) = self.session.wallet.generate();
        if !created {
            debug!("Wallet {} already connected", account.address().short());
        }
        if let Some(id) = self.session.wallet.fund_async(&mut self.ledger) {
            info!("Funding {} ({:?})", account.address().short(), id);
        }
    }

    fn measure_fps(&mut self, delta: Duration) {
        let secs = delta.as_secs_f32();
        if secs <= 0.0 {
            return;
        }
        let instant = 1.0 / secs;
        self.fps = if self.fps == 0.0 {
            instant
        } else {
            self.fps + (instant - self.fps) * FPS_SMOOTHING
        };
    }

    fn render(&mut self) {
        match self.session.mode() {
            SessionMode::Landing => {
                let view = LandingView {
                    wallet: self.session.wallet.account().map(|a| a.address()),
                    funding: self.session.wallet.funding_state(),
                };
                self.display.draw_landing(&view);
            }
            SessionMode::Playing => {
                self.world.object_renderer.draw();
                self.world.weapon.draw();
                self.display.draw_hud(self.session.score.current_score());
                match self.session.end_of_game.peek() {
                    Some(EndKind::Defeat) => self.world.object_renderer.game_over(),
                    Some(EndKind::Victory) => self.world.object_renderer.win(),
                    None => {}
                }
            }
            SessionMode::Results => {
                let view = ResultsView {
                    leaderboard: self.session.leaderboard.board(),
                    last_score: self.session.last_score,
                    recorded_score: self.session.recorded_score,
                    last_end: self.session.last_end,
                    submitting: self.ledger.submission_in_flight(),
                };
                self.display.draw_results(&view);
            }
        }

        if self.session.overlay.is_visible() {
            self.display.draw_disclaimer();
        }
        self.display.present(self.fps);
    }
}
