//! Session controller
//!
//! Owns score, HP, combo, fever, guard, bomb and stage state for one play
//! session. Hosts drive it with `on_tick` once per frame and `on_input` per
//! press; both return the presentation events produced along the way.

use std::sync::Arc;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::{GameEvent, Popup, Tint};
use super::hit::DeviceClass;
use super::population::{HitReport, Population, PopulationEvent};
use super::rng::GameRng;
use super::spawn::SpawnRequest;
use super::stats::{PlayStats, SessionResults};
use super::target::Viewport;
use crate::audio::{SoundEffect, stage_music_key};
use crate::content::{Catalog, StageDef};
use crate::ports::Ports;
use crate::settings::GameSettings;

/// Screen shake length when a bomb goes off (ms)
pub const BOMB_SHAKE_MS: f32 = 300.0;

/// Current phase of the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SessionPhase {
    /// Active gameplay
    Playing,
    /// HP ran out; counting down to the results hand-off
    GameOver,
    /// Results handed off, nothing left to do
    Finished,
}

/// A bomb's expanding kill ring
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shockwave {
    pub center: Vec2,
    pub radius: f32,
    /// Combo increments this wave has contributed so far
    pub combo_granted: u32,
}

impl Shockwave {
    pub fn new(center: Vec2) -> Self {
        Self {
            center,
            radius: 0.0,
            combo_granted: 0,
        }
    }
}

/// Mutable per-session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionState {
    pub score: u64,
    pub hp: u32,
    pub stage_index: usize,
    pub combo: u32,
    pub tier: usize,
    pub fever_active: bool,
    pub fever_remaining_ms: f32,
    /// Combo value that last started fever
    pub last_fever_combo: Option<u32>,
    pub guard_charges: u32,
    pub bombs: u32,
    pub stats: PlayStats,
    pub phase: SessionPhase,
    pub game_over_remaining_ms: f32,
    pub miss_cooldown_ms: f32,
    pub shake_ms: f32,
    pub spawn_timer_ms: f32,
    pub shockwaves: Vec<Shockwave>,
}

impl SessionState {
    pub fn new(settings: &GameSettings) -> Self {
        Self {
            score: 0,
            hp: settings.initial_hp,
            stage_index: 0,
            combo: 0,
            tier: 0,
            fever_active: false,
            fever_remaining_ms: 0.0,
            last_fever_combo: None,
            guard_charges: settings.guard.initial_charges,
            bombs: settings.bomb.initial_stock,
            stats: PlayStats::default(),
            phase: SessionPhase::Playing,
            game_over_remaining_ms: 0.0,
            miss_cooldown_ms: 0.0,
            shake_ms: 0.0,
            spawn_timer_ms: 0.0,
            shockwaves: Vec::new(),
        }
    }

    pub fn is_game_over(&self) -> bool {
        self.phase != SessionPhase::Playing
    }
}

/// The gameplay core a host embeds
#[derive(Debug)]
pub struct Session {
    catalog: Arc<Catalog>,
    settings: GameSettings,
    population: Population,
    rng: GameRng,
    state: SessionState,
    ports: Ports,
    events: Vec<GameEvent>,
}

impl Session {
    /// Start a session on stage 1. Content and settings are assumed validated.
    pub fn new(catalog: Arc<Catalog>, settings: GameSettings, seed: u64, ports: Ports) -> Self {
        let max_alive = catalog.stage(0).max_alive;
        let population = Population::new(Arc::clone(&catalog), Viewport::default(), max_alive);
        let state = SessionState::new(&settings);
        let mut session = Self {
            catalog,
            settings,
            population,
            rng: GameRng::new(seed),
            state,
            ports,
            events: Vec::new(),
        };
        session.announce_stage();
        log::info!("Session started (seed {seed})");
        session
    }

    /// Replace all session state with a fresh instance
    pub fn restart(&mut self, seed: u64) {
        self.state = SessionState::new(&self.settings);
        self.rng = GameRng::new(seed);
        self.population.clear();
        self.population
            .set_max_alive(self.catalog.stage(0).max_alive);
        self.events.clear();
        self.announce_stage();
        log::info!("Session restarted (seed {seed})");
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// Direct state access for debug tooling and tests
    pub fn state_mut(&mut self) -> &mut SessionState {
        &mut self.state
    }

    pub fn population(&self) -> &Population {
        &self.population
    }

    pub fn population_mut(&mut self) -> &mut Population {
        &mut self.population
    }

    pub fn settings(&self) -> &GameSettings {
        &self.settings
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn stage(&self) -> &StageDef {
        self.catalog.stage(self.state.stage_index)
    }

    pub fn seed(&self) -> u64 {
        self.rng.seed()
    }

    /// Current combo multiplier (fever not included)
    pub fn multiplier(&self) -> f32 {
        self.settings.combo.multiplier(self.state.tier)
    }

    pub fn is_shaking(&self) -> bool {
        self.state.shake_ms > 0.0
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.population.set_viewport(viewport);
    }

    /// Spawn outside the stage timer (scripted spawns, tests)
    pub fn spawn(&mut self, request: SpawnRequest<'_>, at: Option<Vec2>) -> Option<u32> {
        self.population.spawn(request, at, &mut self.rng)
    }

    /// Results, once the game is over
    pub fn results(&self) -> Option<SessionResults> {
        self.state.is_game_over().then(|| self.build_results())
    }

    /// Advance the session by `dt` seconds
    pub fn on_tick(&mut self, dt: f32) -> Vec<GameEvent> {
        let dt_ms = dt * 1000.0;

        match self.state.phase {
            SessionPhase::Finished => return Vec::new(),
            SessionPhase::GameOver => {
                self.state.game_over_remaining_ms -= dt_ms;
                if self.state.game_over_remaining_ms <= 0.0 {
                    self.state.game_over_remaining_ms = 0.0;
                    self.state.phase = SessionPhase::Finished;
                    let results = self.build_results();
                    log::info!("Results ready: score {}", results.score);
                    self.emit(GameEvent::ResultsReady(results));
                }
                return self.drain();
            }
            SessionPhase::Playing => {}
        }

        // Targets first, so kills and explosions land before the checks below
        for event in self.population.update(dt, &mut self.rng) {
            match event {
                PopulationEvent::Exploded { damage, pos, type_id, .. } => {
                    log::debug!("{type_id} exploded at ({:.0}, {:.0})", pos.x, pos.y);
                    self.take_damage(damage, pos);
                }
                PopulationEvent::Died { type_id, children, .. } => {
                    if children > 0 {
                        log::debug!("{type_id} split into {children}");
                    }
                }
            }
        }

        if self.state.phase == SessionPhase::Playing {
            self.advance_timers(dt_ms);
            self.advance_shockwaves(dt);
            self.advance_spawner(dt_ms);
            self.check_stage_advance();
            if self.state.hp == 0 {
                self.latch_game_over();
            }
        }

        self.drain()
    }

    /// Handle one press at `point`
    pub fn on_input(&mut self, point: Vec2, device: DeviceClass) -> Vec<GameEvent> {
        if self.state.phase != SessionPhase::Playing {
            return Vec::new();
        }

        self.state.stats.total_taps += 1;
        let one_shot = self.state.fever_active && self.settings.fever.one_shot_kills;

        match self
            .population
            .handle_input(point, device, one_shot, &self.settings)
        {
            Some(report) => {
                self.state.stats.hit_taps += 1;
                self.shake(self.settings.hit_shake_ms);
                if report.killed {
                    self.on_kill(report);
                } else {
                    self.emit(GameEvent::Hit {
                        pos: report.pos,
                        type_id: report.type_id,
                        color: report.color,
                    });
                    self.cue(SoundEffect::Hit);
                }
            }
            None => self.handle_miss(point),
        }

        self.drain()
    }

    fn on_kill(&mut self, report: HitReport) {
        self.bump_combo();
        self.check_fever_trigger();

        let mut mult = self.multiplier();
        if self.state.fever_active {
            mult *= self.settings.fever.score_multiplier;
        }
        let gain = (report.score as f64 * mult as f64).floor() as u64;
        self.state.score += gain;

        if report.is_item {
            self.collect_item(&report, gain);
            return;
        }

        self.state.stats.kills += 1;
        if report.critical {
            self.state.stats.criticals += 1;
        }
        let (text, tint) = if report.critical {
            (format!("CRITICAL! {gain}"), Tint::YELLOW)
        } else {
            (gain.to_string(), Tint::WHITE)
        };
        self.popup(report.pos, text, tint);
        self.emit(GameEvent::Kill {
            pos: report.pos,
            type_id: report.type_id,
            color: report.color,
            score: gain,
            critical: report.critical,
            combo: self.state.combo,
        });
        self.cue(if report.critical {
            SoundEffect::Critical
        } else {
            SoundEffect::Kill
        });
    }

    fn collect_item(&mut self, report: &HitReport, gain: u64) {
        let s = &self.settings;
        let state = &mut self.state;
        state.stats.items_collected += 1;
        state.hp = (state.hp + report.recovery).min(s.max_hp);
        state.bombs = (state.bombs + report.bombs).min(s.bomb.max_stock);
        state.guard_charges = (state.guard_charges + report.guards).min(s.guard.max_charges);

        if report.recovery > 0 {
            self.popup(report.pos, "HP UP!".to_string(), Tint::PINK);
        }
        if report.bombs > 0 {
            self.popup(report.pos, format!("BOMB +{}", report.bombs), Tint::ORANGE);
        }
        if report.guards > 0 {
            self.popup(report.pos, format!("GUARD +{}", report.guards), Tint::WHITE);
        }
        self.emit(GameEvent::ItemCollected {
            pos: report.pos,
            type_id: report.type_id.clone(),
            score: gain,
            recovery: report.recovery,
            bombs: report.bombs,
            guards: report.guards,
        });
        self.cue(SoundEffect::Item);
    }

    /// Misses in priority order: fever guard, guard charge, bomb, penalty
    fn handle_miss(&mut self, point: Vec2) {
        self.state.stats.miss_taps += 1;

        // Same gesture, already handled
        if self.state.miss_cooldown_ms > 0.0 {
            return;
        }
        self.state.miss_cooldown_ms = self.settings.input.miss_cooldown_ms;
        self.emit(GameEvent::Miss {
            pos: point,
            tint: Tint::RED,
        });

        if self.state.fever_active && self.settings.fever.miss_penalty_disabled {
            self.emit(GameEvent::GuardConsumed {
                pos: point,
                remaining: self.state.guard_charges,
                fever: true,
            });
            self.popup(point, "GUARD!".to_string(), Tint::WHITE);
            self.cue(SoundEffect::Guard);
        } else if self.state.guard_charges > 0 {
            self.state.guard_charges -= 1;
            self.state.stats.guards_used += 1;
            log::debug!("guard absorbed miss, {} left", self.state.guard_charges);
            self.emit(GameEvent::GuardConsumed {
                pos: point,
                remaining: self.state.guard_charges,
                fever: false,
            });
            self.popup(point, "GUARD!".to_string(), Tint::WHITE);
            self.cue(SoundEffect::Guard);
        } else if self.state.bombs > 0 {
            self.state.bombs -= 1;
            self.state.stats.bombs_used += 1;
            self.state.shockwaves.push(Shockwave::new(point));
            log::debug!("bomb detonated at ({:.0}, {:.0})", point.x, point.y);
            self.emit(GameEvent::BombConsumed {
                pos: point,
                remaining: self.state.bombs,
            });
            self.popup(point, "BOMB!".to_string(), Tint::ORANGE);
            self.shake(BOMB_SHAKE_MS);
            self.cue(SoundEffect::Bomb);
        } else {
            let lost = self.state.combo;
            self.state.combo = 0;
            self.state.tier = 0;
            if lost > 0 {
                self.emit(GameEvent::ComboBroken { combo: lost });
            }
            self.popup(point, "MISS".to_string(), Tint::RED);
            self.cue(SoundEffect::Miss);
        }
    }

    fn bump_combo(&mut self) {
        let state = &mut self.state;
        state.combo += 1;
        state.stats.max_combo = state.stats.max_combo.max(state.combo);
        state.tier = self.settings.combo.tier_for(state.combo);
    }

    fn check_fever_trigger(&mut self) {
        let combo = self.state.combo;
        let trigger = self.settings.fever.trigger_combo;
        if combo > 0
            && trigger > 0
            && combo.is_multiple_of(trigger)
            && self.state.last_fever_combo != Some(combo)
        {
            self.start_fever();
        }
    }

    fn start_fever(&mut self) {
        let combo = self.state.combo;
        log::info!("[FEVER] start at combo={combo}");
        let duration_ms = self.settings.fever.duration_ms;
        self.state.fever_active = true;
        self.state.fever_remaining_ms = duration_ms;
        self.state.guard_charges = self.settings.guard.max_charges;
        self.state.last_fever_combo = Some(combo);
        self.state.stats.fever_count += 1;

        self.emit(GameEvent::FeverStarted { combo, duration_ms });
        self.cue(SoundEffect::Fever);
        self.ports.analytics.track("fever_start", combo as u64);
    }

    fn stop_fever(&mut self) {
        log::info!("[FEVER] end");
        self.state.fever_active = false;
        self.state.fever_remaining_ms = 0.0;
        self.emit(GameEvent::FeverEnded);
    }

    fn take_damage(&mut self, amount: u32, pos: Vec2) {
        if self.state.phase != SessionPhase::Playing {
            return;
        }
        self.cue(SoundEffect::Explosion);

        if self.state.fever_active && self.settings.fever.no_explosion_damage {
            log::debug!("[FEVER] damage blocked");
            self.emit(GameEvent::DamageBlocked { pos });
            return;
        }

        self.state.hp = self.state.hp.saturating_sub(amount);
        self.state.stats.damage_taken += amount;
        log::debug!("took {amount} damage, hp {}", self.state.hp);
        self.emit(GameEvent::DamageTaken {
            pos,
            amount,
            hp: self.state.hp,
        });

        if self.state.hp == 0 {
            self.latch_game_over();
        }
    }

    fn advance_timers(&mut self, dt_ms: f32) {
        let state = &mut self.state;
        state.miss_cooldown_ms = (state.miss_cooldown_ms - dt_ms).max(0.0);
        state.shake_ms = (state.shake_ms - dt_ms).max(0.0);

        if state.fever_active {
            state.fever_remaining_ms -= dt_ms;
            if state.fever_remaining_ms <= 0.0 {
                self.stop_fever();
            }
        }
    }

    /// Grow every shockwave and kill what it touches
    fn advance_shockwaves(&mut self, dt: f32) {
        if self.state.shockwaves.is_empty() {
            return;
        }

        let bomb = self.settings.bomb.clone();
        let mut waves = std::mem::take(&mut self.state.shockwaves);
        for wave in &mut waves {
            wave.radius = (wave.radius + bomb.growth * dt).min(bomb.max_radius);
            for kill in self.population.kill_within(wave.center, wave.radius) {
                let score = kill.score as u64;
                self.state.score += score;
                self.state.stats.kills += 1;
                if wave.combo_granted < bomb.combo_cap {
                    wave.combo_granted += 1;
                    self.bump_combo();
                    self.check_fever_trigger();
                }
                self.popup(kill.pos, score.to_string(), Tint::ORANGE);
                self.emit(GameEvent::ShockwaveKill {
                    pos: kill.pos,
                    type_id: kill.type_id,
                    score,
                });
            }
        }
        waves.retain(|w| w.radius < bomb.max_radius);
        self.state.shockwaves = waves;
    }

    /// Periodic spawn from the active stage's weight table
    fn advance_spawner(&mut self, dt_ms: f32) {
        self.state.spawn_timer_ms += dt_ms;
        let catalog = Arc::clone(&self.catalog);
        let stage = catalog.stage(self.state.stage_index);
        if self.state.spawn_timer_ms >= stage.spawn_interval_ms {
            self.state.spawn_timer_ms = 0.0;
            self.population
                .spawn(SpawnRequest::Weighted(&stage.weights), None, &mut self.rng);
        }
    }

    /// At most one advance per tick; the final stage never advances
    fn check_stage_advance(&mut self) {
        let index = self.state.stage_index;
        if index >= self.catalog.final_stage_index() {
            return;
        }
        if self.state.score < self.catalog.stage(index).target_score {
            return;
        }

        self.state.stage_index = index + 1;
        let catalog = Arc::clone(&self.catalog);
        let stage = catalog.stage(self.state.stage_index);
        self.population.set_max_alive(stage.max_alive);
        log::info!("Stage {} -> {} ({})", index + 1, index + 2, stage.name);

        self.emit(GameEvent::StageChanged {
            index: self.state.stage_index,
            stage_id: stage.id,
            background: stage.background.clone(),
        });
        self.cue(SoundEffect::StageUp);
        self.announce_stage();
    }

    /// Point backdrop and music at the active stage
    fn announce_stage(&mut self) {
        let stage = self.catalog.stage(self.state.stage_index);
        self.ports.backdrop.transition_to(stage.id, &stage.background);
        self.ports.audio.play_music(&stage_music_key(stage.id));
    }

    fn latch_game_over(&mut self) {
        if self.state.phase != SessionPhase::Playing {
            return;
        }
        self.state.phase = SessionPhase::GameOver;
        self.state.game_over_remaining_ms = self.settings.game_over_delay_ms;
        log::info!(
            "[GAME OVER] score {}, results in {}ms",
            self.state.score,
            self.settings.game_over_delay_ms
        );

        self.emit(GameEvent::GameOver {
            score: self.state.score,
            stats: self.state.stats.clone(),
        });
        self.cue(SoundEffect::GameOver);
        self.ports.analytics.track("game_over", self.state.score);
    }

    fn build_results(&self) -> SessionResults {
        SessionResults {
            score: self.state.score,
            stage: self.stage().id,
            stats: self.state.stats.clone(),
        }
    }

    fn shake(&mut self, duration_ms: f32) {
        self.state.shake_ms = self.state.shake_ms.max(duration_ms);
        self.emit(GameEvent::ScreenShake { duration_ms });
    }

    fn popup(&mut self, pos: Vec2, text: String, tint: Tint) {
        self.emit(GameEvent::Popup(Popup { pos, text, tint }));
    }

    fn cue(&mut self, effect: SoundEffect) {
        self.ports.audio.play(effect);
        self.emit(GameEvent::Sound { effect });
    }

    fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    fn drain(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::{PortCall, Recorder};
    use crate::sim::target::TargetState;

    const DT: f32 = 1.0 / 60.0;
    const FAR: Vec2 = Vec2::new(5.0, 5.0);

    fn session() -> Session {
        Session::new(
            Arc::new(Catalog::builtin()),
            GameSettings::default(),
            42,
            Ports::default(),
        )
    }

    fn spawn_at(session: &mut Session, id: &str, at: Vec2) -> u32 {
        session.spawn(SpawnRequest::Type(id), Some(at)).unwrap()
    }

    /// Spawn and tap a basic target right away (hittable during SPAWN)
    fn kill_basic(session: &mut Session) -> Vec<GameEvent> {
        let at = Vec2::new(640.0, 360.0);
        spawn_at(session, "basic", at);
        session.on_input(at, DeviceClass::Mouse)
    }

    fn score_of(events: &[GameEvent]) -> Option<u64> {
        events.iter().find_map(|e| match e {
            GameEvent::Kill { score, .. } => Some(*score),
            _ => None,
        })
    }

    #[test]
    fn test_initial_state() {
        let s = session();
        let st = s.state();
        assert_eq!(st.hp, 3);
        assert_eq!(st.score, 0);
        assert_eq!(st.stage_index, 0);
        assert_eq!(st.phase, SessionPhase::Playing);
        assert_eq!(s.population().max_alive(), 8);
    }

    #[test]
    fn test_kill_scores_base_at_tier_zero() {
        let mut s = session();
        let events = kill_basic(&mut s);
        assert_eq!(score_of(&events), Some(100));
        assert_eq!(s.state().score, 100);
        assert_eq!(s.state().combo, 1);
        assert_eq!(s.state().stats.kills, 1);
    }

    #[test]
    fn test_tier_two_multiplier() {
        let mut s = session();
        // The 15th kill lands in tier 2
        s.state_mut().combo = 14;
        let events = kill_basic(&mut s);
        assert_eq!(s.state().tier, 2);
        assert_eq!(score_of(&events), Some(150));
    }

    #[test]
    fn test_critical_at_tier_two() {
        let mut s = session();
        s.state_mut().combo = 14;
        let at = Vec2::new(640.0, 360.0);
        let id = spawn_at(&mut s, "basic", at);
        let inflate = s.catalog().type_def("basic").unwrap().durations.inflate;
        let target = s.population_mut().get_mut(id).unwrap();
        target.state = TargetState::Inflate;
        target.state_time = inflate * 0.85;

        let events = s.on_input(at, DeviceClass::Mouse);
        assert_eq!(score_of(&events), Some(300));
        assert_eq!(s.state().stats.criticals, 1);
        assert!(events.contains(&GameEvent::Sound {
            effect: SoundEffect::Critical
        }));
    }

    #[test]
    fn test_non_lethal_hit_keeps_combo() {
        let mut s = session();
        s.state_mut().combo = 3;
        let at = Vec2::new(300.0, 300.0);
        spawn_at(&mut s, "tough", at);
        let events = s.on_input(at, DeviceClass::Mouse);
        assert!(matches!(events.first(), Some(GameEvent::ScreenShake { .. })));
        assert!(events.iter().any(|e| matches!(e, GameEvent::Hit { .. })));
        assert_eq!(s.state().combo, 3);
        assert_eq!(s.state().score, 0);
        assert!(s.is_shaking());
    }

    #[test]
    fn test_miss_penalty_resets_combo_and_tier() {
        let mut s = session();
        s.state_mut().combo = 16;
        s.state_mut().tier = 2;
        let events = s.on_input(FAR, DeviceClass::Mouse);
        assert_eq!(s.state().combo, 0);
        assert_eq!(s.state().tier, 0);
        assert!(events.contains(&GameEvent::ComboBroken { combo: 16 }));
        assert!(events.contains(&GameEvent::Miss {
            pos: FAR,
            tint: Tint::RED
        }));
        assert_eq!(s.state().stats.miss_taps, 1);
    }

    #[test]
    fn test_broken_combo_keeps_fever_guard() {
        let mut s = session();
        s.state_mut().combo = 19;
        kill_basic(&mut s);
        assert_eq!(s.state().stats.fever_count, 1);

        s.state_mut().fever_active = false;
        s.state_mut().guard_charges = 0;
        s.state_mut().bombs = 0;
        s.on_input(FAR, DeviceClass::Mouse);
        assert_eq!(s.state().combo, 0);
        assert_eq!(s.state().last_fever_combo, Some(20));

        s.state_mut().combo = 19;
        s.population_mut().clear();
        let events = kill_basic(&mut s);
        assert_eq!(s.state().combo, 20);
        assert!(!events.iter().any(|e| matches!(e, GameEvent::FeverStarted { .. })));
        assert_eq!(s.state().stats.fever_count, 1);
    }

    #[test]
    fn test_miss_cooldown_suppresses_repeat_penalty() {
        let mut s = session();
        s.state_mut().guard_charges = 2;
        s.on_input(FAR, DeviceClass::Mouse);
        let events = s.on_input(FAR, DeviceClass::Mouse);
        assert!(events.is_empty());
        assert_eq!(s.state().guard_charges, 1);
        assert_eq!(s.state().stats.miss_taps, 2);

        // Cooldown expires after ~120ms
        for _ in 0..8 {
            s.on_tick(DT);
        }
        s.on_input(FAR, DeviceClass::Mouse);
        assert_eq!(s.state().guard_charges, 0);
    }

    #[test]
    fn test_guard_absorbs_miss() {
        let mut s = session();
        s.state_mut().combo = 9;
        s.state_mut().guard_charges = 1;
        s.state_mut().bombs = 1;
        let events = s.on_input(FAR, DeviceClass::Mouse);
        assert_eq!(s.state().combo, 9);
        assert_eq!(s.state().guard_charges, 0);
        assert_eq!(s.state().bombs, 1);
        assert!(events.iter().any(|e| matches!(
            e,
            GameEvent::GuardConsumed { fever: false, remaining: 0, .. }
        )));
    }

    #[test]
    fn test_bomb_absorbs_miss_and_clears_area() {
        let mut s = session();
        s.state_mut().combo = 4;
        s.state_mut().bombs = 1;
        let center = Vec2::new(400.0, 400.0);
        for dx in [-60.0, 0.0, 60.0] {
            spawn_at(&mut s, "basic", center + Vec2::new(dx, 0.0));
        }
        let far = spawn_at(&mut s, "basic", Vec2::new(1200.0, 100.0));

        // Tap between targets: nothing struck there
        let tap = center + Vec2::new(0.0, 120.0);
        let events = s.on_input(tap, DeviceClass::Mouse);
        assert!(events.iter().any(|e| matches!(e, GameEvent::BombConsumed { remaining: 0, .. })));
        assert_eq!(s.state().combo, 4);
        assert_eq!(s.state().shockwaves.len(), 1);

        let mut wave_kills = 0;
        for _ in 0..30 {
            wave_kills += s
                .on_tick(DT)
                .iter()
                .filter(|e| matches!(e, GameEvent::ShockwaveKill { .. }))
                .count();
        }
        assert_eq!(wave_kills, 3);
        assert_eq!(s.state().score, 300);
        assert_eq!(s.state().combo, 7);
        assert!(s.state().shockwaves.is_empty());
        assert!(s.population().get(far).is_some());
    }

    #[test]
    fn test_shockwave_combo_is_capped() {
        let mut s = session();
        s.population_mut().set_max_alive(20);
        s.state_mut().bombs = 1;
        let center = Vec2::new(600.0, 400.0);
        for i in 0..8 {
            spawn_at(&mut s, "basic", center + Vec2::new(i as f32 * 10.0 - 40.0, 0.0));
        }
        // Tap far from any target so it counts as a miss
        s.on_input(center + Vec2::new(0.0, 150.0), DeviceClass::Mouse);
        for _ in 0..30 {
            s.on_tick(DT);
        }
        assert_eq!(s.state().stats.kills, 8);
        assert_eq!(s.state().combo, s.settings().bomb.combo_cap);
    }

    #[test]
    fn test_fever_triggers_once_per_combo_value() {
        let mut s = session();
        s.state_mut().combo = 19;
        let events = kill_basic(&mut s);
        assert!(s.state().fever_active);
        assert_eq!(s.state().last_fever_combo, Some(20));
        assert_eq!(s.state().stats.fever_count, 1);
        assert_eq!(s.state().guard_charges, 3);
        assert!(events.contains(&GameEvent::FeverStarted {
            combo: 20,
            duration_ms: 5000.0
        }));
        // Tier 2 x fever 2.0 on the triggering kill
        assert_eq!(score_of(&events), Some(300));

        // Re-checking at the same combo does nothing
        s.check_fever_trigger();
        s.check_fever_trigger();
        assert_eq!(s.state().stats.fever_count, 1);
    }

    #[test]
    fn test_fever_expiry_leaves_combo_and_score() {
        let mut s = session();
        s.state_mut().combo = 19;
        kill_basic(&mut s);
        let score = s.state().score;
        let mut ended = false;
        for _ in 0..(5.2 / DT) as usize {
            ended |= s.on_tick(DT).contains(&GameEvent::FeverEnded);
        }
        assert!(ended);
        assert!(!s.state().fever_active);
        assert_eq!(s.state().fever_remaining_ms, 0.0);
        assert_eq!(s.state().combo, 20);
        assert!(s.state().score >= score);
    }

    #[test]
    fn test_fever_guard_is_free() {
        let mut s = session();
        s.state_mut().combo = 25;
        s.state_mut().fever_active = true;
        s.state_mut().fever_remaining_ms = 1000.0;
        s.state_mut().guard_charges = 2;
        let events = s.on_input(FAR, DeviceClass::Mouse);
        assert_eq!(s.state().combo, 25);
        assert_eq!(s.state().guard_charges, 2);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GuardConsumed { fever: true, .. })));
    }

    #[test]
    fn test_fever_one_shot_kills_tough() {
        let mut s = session();
        s.state_mut().fever_active = true;
        s.state_mut().fever_remaining_ms = 1000.0;
        let at = Vec2::new(500.0, 500.0);
        spawn_at(&mut s, "tough", at);
        let events = s.on_input(at, DeviceClass::Mouse);
        // 300 base x tier 0 x fever 2.0
        assert_eq!(score_of(&events), Some(600));
    }

    #[test]
    fn test_item_recovers_hp_capped() {
        let mut s = session();
        s.state_mut().hp = 5;
        let at = Vec2::new(200.0, 600.0);
        spawn_at(&mut s, "heart", at);
        let events = s.on_input(at, DeviceClass::Touch);
        assert_eq!(s.state().hp, 5);
        assert_eq!(s.state().stats.items_collected, 1);
        assert!(events.iter().any(|e| matches!(e, GameEvent::ItemCollected { recovery: 1, .. })));

        s.state_mut().hp = 2;
        spawn_at(&mut s, "heart", at);
        s.on_input(at, DeviceClass::Touch);
        assert_eq!(s.state().hp, 3);
    }

    #[test]
    fn test_bomb_item_grants_stock() {
        let mut s = session();
        let at = Vec2::new(200.0, 200.0);
        spawn_at(&mut s, "bomb", at);
        s.on_input(at, DeviceClass::Mouse);
        assert_eq!(s.state().bombs, 1);
    }

    #[test]
    fn test_explosion_damage_and_fever_immunity() {
        let mut s = session();
        let id = spawn_at(&mut s, "basic", Vec2::new(300.0, 300.0));
        s.population_mut().get_mut(id).unwrap().state = TargetState::Inflate;
        s.population_mut().get_mut(id).unwrap().state_time = 5000.0;
        let events = s.on_tick(DT);
        assert_eq!(s.state().hp, 2);
        assert!(events.iter().any(|e| matches!(e, GameEvent::DamageTaken { amount: 1, hp: 2, .. })));

        s.state_mut().fever_active = true;
        s.state_mut().fever_remaining_ms = 1000.0;
        let id = spawn_at(&mut s, "basic", Vec2::new(300.0, 300.0));
        s.population_mut().get_mut(id).unwrap().state = TargetState::Inflate;
        s.population_mut().get_mut(id).unwrap().state_time = 5000.0;
        let events = s.on_tick(DT);
        assert_eq!(s.state().hp, 2);
        assert!(events.iter().any(|e| matches!(e, GameEvent::DamageBlocked { .. })));
    }

    #[test]
    fn test_stage_advances_once_and_stops_at_final() {
        let recorder = Recorder::new();
        let mut s = Session::new(
            Arc::new(Catalog::builtin()),
            GameSettings::default(),
            1,
            recorder.ports(),
        );
        s.state_mut().score = 1_000_000;

        let mut changes = Vec::new();
        for _ in 0..10 {
            for e in s.on_tick(DT) {
                if let GameEvent::StageChanged { index, .. } = e {
                    changes.push(index);
                }
            }
        }
        assert_eq!(changes, [1, 2, 3, 4]);
        assert_eq!(s.state().stage_index, 4);
        assert_eq!(s.population().max_alive(), 20);
        let backdrops: Vec<_> = recorder
            .calls()
            .into_iter()
            .filter_map(|c| match c {
                PortCall::Backdrop(id) => Some(id),
                _ => None,
            })
            .collect();
        assert_eq!(backdrops, [1, 2, 3, 4, 5]);
    }

    #[test]
    fn test_game_over_latches_and_freezes() {
        let recorder = Recorder::new();
        let mut s = Session::new(
            Arc::new(Catalog::builtin()),
            GameSettings::default(),
            1,
            recorder.ports(),
        );
        s.state_mut().hp = 1;
        let id = spawn_at(&mut s, "basic", Vec2::new(300.0, 300.0));
        s.population_mut().get_mut(id).unwrap().state = TargetState::Inflate;
        s.population_mut().get_mut(id).unwrap().state_time = 5000.0;

        let events = s.on_tick(DT);
        assert_eq!(s.state().phase, SessionPhase::GameOver);
        assert!(events.iter().any(|e| matches!(e, GameEvent::GameOver { .. })));
        assert!(recorder.sounds().contains(&SoundEffect::GameOver));

        // Input and scoring are frozen
        let at = Vec2::new(700.0, 300.0);
        s.population_mut().set_max_alive(30);
        spawn_at(&mut s, "basic", at);
        assert!(s.on_input(at, DeviceClass::Mouse).is_empty());
        assert_eq!(s.state().score, 0);
        assert_eq!(s.state().stats.total_taps, 0);

        let mut results = None;
        for _ in 0..(3.1 / DT) as usize {
            for e in s.on_tick(DT) {
                if let GameEvent::ResultsReady(r) = e {
                    results = Some(r);
                }
            }
        }
        let results = results.expect("results after delay");
        assert_eq!(results.score, 0);
        assert_eq!(results.stage, 1);
        assert_eq!(s.state().phase, SessionPhase::Finished);
        assert!(s.on_tick(DT).is_empty());
        assert!(recorder
            .calls()
            .contains(&PortCall::Track("game_over".to_string(), 0)));
    }

    #[test]
    fn test_stage_timer_spawns() {
        let mut s = session();
        let interval = s.stage().spawn_interval_ms;
        let ticks = (interval / 1000.0 / DT) as usize + 2;
        for _ in 0..ticks {
            s.on_tick(DT);
        }
        assert_eq!(s.population().len(), 1);
    }

    #[test]
    fn test_restart_discards_state() {
        let mut s = session();
        kill_basic(&mut s);
        s.state_mut().hp = 1;
        s.restart(7);
        assert_eq!(s.state().score, 0);
        assert_eq!(s.state().hp, 3);
        assert!(s.population().is_empty());
        assert_eq!(s.seed(), 7);
    }

    #[test]
    fn test_ports_hear_cues() {
        let recorder = Recorder::new();
        let mut s = Session::new(
            Arc::new(Catalog::builtin()),
            GameSettings::default(),
            3,
            recorder.ports(),
        );
        kill_basic(&mut s);
        s.on_input(FAR, DeviceClass::Mouse);
        assert_eq!(recorder.sounds(), [SoundEffect::Kill, SoundEffect::Miss]);
        assert!(recorder.calls().contains(&PortCall::Music("stage_01".to_string())));
    }
}
