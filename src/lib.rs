//! Balloon Burst - gameplay core of a tap-the-balloon arcade game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (targets, population, hit testing, session economy)
//! - `content`: Data-driven target types and stage tables
//! - `settings`: Tuning for HP, combo tiers, fever, guard and bomb systems
//! - `ports`: Injected collaborator interfaces (audio, backdrop, analytics)
//! - `autoplay`: Demo player used by the headless runner

pub mod audio;
pub mod autoplay;
pub mod content;
pub mod error;
pub mod ports;
pub mod settings;
pub mod sim;

pub use content::{Catalog, StageDef, TargetTypeDef};
pub use error::ContentError;
pub use settings::GameSettings;
pub use sim::Session;

use glam::Vec2;

/// Game configuration constants
pub mod consts {
    /// Default logical viewport (landscape phone-ish)
    pub const DEFAULT_VIEWPORT_WIDTH: f32 = 1280.0;
    pub const DEFAULT_VIEWPORT_HEIGHT: f32 = 720.0;

    /// Fixed host timestep used by the headless runner (60 Hz)
    pub const FRAME_DT: f32 = 1.0 / 60.0;

    /// SPAWN phase length when a type doesn't override it (ms)
    pub const DEFAULT_SPAWN_MS: f32 = 500.0;

    /// Radius growth across the INFLATE phase (1.0 -> 1.5)
    pub const INFLATE_GROWTH: f32 = 0.5;

    /// Punch scale applied on hit, and its decay rate per second
    pub const PUNCH_SCALE: f32 = 1.4;
    pub const PUNCH_DECAY: f32 = 3.0;

    /// Zigzag alternates heading every this many ms
    pub const ZIGZAG_INTERVAL_MS: f32 = 400.0;

    /// Sine pattern: perpendicular amplitude (px) and angular rate (rad/ms)
    pub const SINE_AMPLITUDE: f32 = 18.0;
    pub const SINE_RATE: f32 = 0.005;

    /// Tricky pattern cycle: pause, charge, dash (ms)
    pub const TRICKY_PAUSE_MS: f32 = 350.0;
    pub const TRICKY_CHARGE_MS: f32 = 250.0;
    pub const TRICKY_DASH_MS: f32 = 450.0;
    /// Dash speed relative to the type's base speed
    pub const TRICKY_DASH_BOOST: f32 = 2.5;
    /// Max heading jitter per tick for the jitter dash (radians)
    pub const TRICKY_JITTER: f32 = 0.35;
}

/// Unit vector for a heading angle (radians)
#[inline]
pub fn heading_to_dir(angle: f32) -> Vec2 {
    Vec2::new(angle.cos(), angle.sin())
}

/// Perpendicular of a vector (rotated +90°)
#[inline]
pub fn perpendicular(v: Vec2) -> Vec2 {
    Vec2::new(-v.y, v.x)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::FRAC_PI_2;

    #[test]
    fn test_heading_to_dir() {
        let d = heading_to_dir(FRAC_PI_2);
        assert!(d.x.abs() < 1e-6);
        assert!((d.y - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_perpendicular_is_orthogonal() {
        let v = Vec2::new(3.0, 4.0);
        assert_eq!(v.dot(perpendicular(v)), 0.0);
        assert_eq!(perpendicular(v).length(), 5.0);
    }
}
