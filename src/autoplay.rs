//! Demo player
//!
//! Drives a session without a human: every reaction interval it taps the most
//! urgent live target, missing on purpose at a configurable rate. It draws from
//! its own RNG stream so gameplay randomness stays reproducible per seed.

use glam::Vec2;

use crate::content::TargetTypeDef;
use crate::sim::{GameRng, Session, Target, TargetState, random_position};

/// Time between taps (ms)
pub const DEFAULT_REACTION_MS: f32 = 250.0;

#[derive(Debug, Clone)]
pub struct AutoPlayer {
    /// Chance in 0..=1 that a tap is aimed at a target
    accuracy: f32,
    reaction_ms: f32,
    cooldown_ms: f32,
    rng: GameRng,
}

impl AutoPlayer {
    pub fn new(seed: u64, accuracy: f32) -> Self {
        Self {
            accuracy: accuracy.clamp(0.0, 1.0),
            reaction_ms: DEFAULT_REACTION_MS,
            cooldown_ms: DEFAULT_REACTION_MS,
            rng: GameRng::new(seed),
        }
    }

    pub fn with_reaction_ms(mut self, reaction_ms: f32) -> Self {
        self.reaction_ms = reaction_ms.max(0.0);
        self.cooldown_ms = self.reaction_ms;
        self
    }

    pub fn accuracy(&self) -> f32 {
        self.accuracy
    }

    /// Where to tap this frame, if anywhere
    pub fn next_tap(&mut self, session: &Session, dt: f32) -> Option<Vec2> {
        if session.state().is_game_over() {
            return None;
        }

        self.cooldown_ms -= dt * 1000.0;
        if self.cooldown_ms > 0.0 {
            return None;
        }

        let catalog = session.catalog();
        let target = session
            .population()
            .targets()
            .iter()
            .filter(|t| t.state.is_live())
            .max_by(|a, b| {
                urgency(a, catalog.kind(a.kind))
                    .partial_cmp(&urgency(b, catalog.kind(b.kind)))
                    .unwrap_or(std::cmp::Ordering::Equal)
            })?;
        self.cooldown_ms = self.reaction_ms;

        if self.rng.unit() < self.accuracy {
            Some(target.pos)
        } else {
            // Fumble somewhere on screen
            Some(random_position(session.population().viewport(), 0.0, &mut self.rng))
        }
    }
}

/// Higher is more pressing: inflating enemies first, then stopped ones,
/// then items, then anything still moving
fn urgency(target: &Target, def: &TargetTypeDef) -> f32 {
    let progress = target.progress(def);
    match target.state {
        TargetState::Inflate => 4.0 + progress,
        TargetState::Stop => 3.0 + progress,
        TargetState::Move if def.is_item => 2.0 + progress,
        TargetState::Move => 1.0 + progress,
        TargetState::Spawn => progress * 0.5,
        TargetState::Explode | TargetState::Dead => f32::MIN,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::content::Catalog;
    use crate::ports::Ports;
    use crate::settings::GameSettings;
    use crate::sim::SpawnRequest;

    const DT: f32 = 1.0 / 60.0;

    fn session() -> Session {
        Session::new(
            Arc::new(Catalog::builtin()),
            GameSettings::default(),
            11,
            Ports::default(),
        )
    }

    #[test]
    fn test_no_targets_no_tap() {
        let s = session();
        let mut bot = AutoPlayer::new(1, 1.0).with_reaction_ms(0.0);
        assert_eq!(bot.next_tap(&s, DT), None);
    }

    #[test]
    fn test_prefers_inflating_target() {
        let mut s = session();
        let calm = Vec2::new(200.0, 200.0);
        let urgent = Vec2::new(900.0, 500.0);
        s.spawn(SpawnRequest::Type("basic"), Some(calm));
        let id = s.spawn(SpawnRequest::Type("basic"), Some(urgent)).unwrap();
        s.population_mut().get_mut(id).unwrap().state = TargetState::Inflate;

        let mut bot = AutoPlayer::new(1, 1.0).with_reaction_ms(0.0);
        assert_eq!(bot.next_tap(&s, DT), Some(urgent));
    }

    #[test]
    fn test_waits_for_reaction_time() {
        let mut s = session();
        s.spawn(SpawnRequest::Type("basic"), Some(Vec2::new(300.0, 300.0)));
        let mut bot = AutoPlayer::new(1, 1.0).with_reaction_ms(100.0);
        let taps = (0..15).filter_map(|_| bot.next_tap(&s, DT)).count();
        // 250ms of frames at 100ms reaction
        assert_eq!(taps, 2);
    }

    #[test]
    fn test_same_seed_same_taps() {
        let run = || {
            let mut s = session();
            let mut bot = AutoPlayer::new(5, 0.6);
            let mut taps = Vec::new();
            for _ in 0..600 {
                s.on_tick(DT);
                if let Some(p) = bot.next_tap(&s, DT) {
                    taps.push(p);
                    s.on_input(p, crate::sim::DeviceClass::Touch);
                }
            }
            (taps, s.state().score)
        };
        assert_eq!(run(), run());
    }
}
