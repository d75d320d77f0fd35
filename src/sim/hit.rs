//! Tap hit testing
//!
//! Two pure predicates make up the whole hit contract: a padded
//! point-in-circle test and the critical-window test.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::target::TargetState;

/// Default INFLATE progress at which a hit becomes critical
pub const DEFAULT_CRITICAL_THRESHOLD: f32 = 0.8;

/// Normalized input device tag
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeviceClass {
    #[default]
    Mouse,
    Touch,
    Pen,
}

impl DeviceClass {
    /// From a pointer-event `pointerType` string; unknown types count as mouse
    pub fn from_pointer_type(s: &str) -> Self {
        match s.to_lowercase().as_str() {
            "touch" => DeviceClass::Touch,
            "pen" => DeviceClass::Pen,
            _ => DeviceClass::Mouse,
        }
    }

    /// Hit padding for this device (only touch gets the fudge factor)
    pub fn padding(self, touch_padding: f32) -> f32 {
        match self {
            DeviceClass::Touch => touch_padding,
            DeviceClass::Mouse | DeviceClass::Pen => 0.0,
        }
    }
}

/// A hittable circle
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub center: Vec2,
    pub radius: f32,
}

impl Circle {
    pub fn new(center: Vec2, radius: f32) -> Self {
        Self { center, radius }
    }
}

/// True iff `point` lies within `circle.radius + padding` of the center
pub fn is_hit(point: Vec2, circle: Circle, padding: f32) -> bool {
    let r = circle.radius + padding;
    point.distance_squared(circle.center) <= r * r
}

/// True iff the target is inflating and at least `threshold` through it
pub fn is_critical(state: TargetState, progress: f32, threshold: f32) -> bool {
    state == TargetState::Inflate && progress >= threshold
}
