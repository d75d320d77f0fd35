//! Outbound presentation events
//!
//! Plain data for renderers, HUD and audio. The session never calls a
//! renderer directly.

use glam::Vec2;
use serde::Serialize;

use super::stats::{PlayStats, SessionResults};
use crate::audio::SoundEffect;

/// RGB color hint for popups
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tint(pub u8, pub u8, pub u8);

impl Tint {
    pub const WHITE: Tint = Tint(255, 255, 255);
    pub const RED: Tint = Tint(255, 0, 0);
    pub const YELLOW: Tint = Tint(255, 255, 0);
    pub const PINK: Tint = Tint(255, 133, 162);
    pub const ORANGE: Tint = Tint(255, 179, 71);
}

/// Floating text at a world position
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Popup {
    pub pos: Vec2,
    pub text: String,
    pub tint: Tint,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum GameEvent {
    /// Target struck but survived
    Hit {
        pos: Vec2,
        type_id: String,
        color: String,
    },
    /// Enemy killed by a tap
    Kill {
        pos: Vec2,
        type_id: String,
        color: String,
        score: u64,
        critical: bool,
        combo: u32,
    },
    /// Item collected by a tap
    ItemCollected {
        pos: Vec2,
        type_id: String,
        score: u64,
        recovery: u32,
        bombs: u32,
        guards: u32,
    },
    /// Tap struck nothing
    Miss { pos: Vec2, tint: Tint },
    /// Miss absorbed by fever (free) or a guard charge
    GuardConsumed {
        pos: Vec2,
        remaining: u32,
        fever: bool,
    },
    /// Miss converted into a bomb shockwave
    BombConsumed { pos: Vec2, remaining: u32 },
    /// Enemy caught in a shockwave
    ShockwaveKill {
        pos: Vec2,
        type_id: String,
        score: u64,
    },
    /// Combo lost to a miss penalty
    ComboBroken { combo: u32 },
    DamageTaken { pos: Vec2, amount: u32, hp: u32 },
    /// Explosion during fever's damage immunity
    DamageBlocked { pos: Vec2 },
    FeverStarted { combo: u32, duration_ms: f32 },
    FeverEnded,
    StageChanged {
        index: usize,
        stage_id: u32,
        background: String,
    },
    Popup(Popup),
    ScreenShake { duration_ms: f32 },
    Sound { effect: SoundEffect },
    /// HP hit zero; the results hand-off follows after a delay
    GameOver { score: u64, stats: PlayStats },
    /// Delay elapsed, leave for the results scene
    ResultsReady(SessionResults),
}
