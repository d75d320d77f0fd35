//! Gameplay tuning
//!
//! One JSON document covering HP, combo tiers, fever, guard, bomb and input
//! fudge factors. Every field has a default so partial documents work.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// Fever mode tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeverSettings {
    /// Fever starts at every positive multiple of this combo
    pub trigger_combo: u32,
    pub duration_ms: f32,
    pub score_multiplier: f32,
    /// Every hit kills during fever
    pub one_shot_kills: bool,
    /// Explosions deal no damage during fever
    pub no_explosion_damage: bool,
    /// Misses don't break combo during fever
    pub miss_penalty_disabled: bool,
}

impl Default for FeverSettings {
    fn default() -> Self {
        Self {
            trigger_combo: 20,
            duration_ms: 5000.0,
            score_multiplier: 2.0,
            one_shot_kills: true,
            no_explosion_damage: true,
            miss_penalty_disabled: true,
        }
    }
}

/// Combo tier tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ComboSettings {
    /// Ascending combo counts at which each tier activates
    pub tier_thresholds: Vec<u32>,
    /// Multiplier per tier, index 0 is the base tier
    pub tier_multipliers: Vec<f32>,
}

impl Default for ComboSettings {
    fn default() -> Self {
        Self {
            tier_thresholds: vec![5, 15, 30],
            tier_multipliers: vec![1.0, 1.2, 1.5, 2.0],
        }
    }
}

impl ComboSettings {
    /// Tier for a combo count
    pub fn tier_for(&self, combo: u32) -> usize {
        self.tier_thresholds.iter().filter(|&&t| combo >= t).count()
    }

    pub fn multiplier(&self, tier: usize) -> f32 {
        self.tier_multipliers
            .get(tier)
            .or(self.tier_multipliers.last())
            .copied()
            .unwrap_or(1.0)
    }
}

/// Guard charge tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardSettings {
    pub max_charges: u32,
    pub initial_charges: u32,
}

impl Default for GuardSettings {
    fn default() -> Self {
        Self {
            max_charges: 3,
            initial_charges: 0,
        }
    }
}

/// Bomb stock and shockwave tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BombSettings {
    pub max_stock: u32,
    pub initial_stock: u32,
    /// Final shockwave radius (px)
    pub max_radius: f32,
    /// Radius growth (px per second)
    pub growth: f32,
    /// Combo increments a single shockwave may contribute
    pub combo_cap: u32,
}

impl Default for BombSettings {
    fn default() -> Self {
        Self {
            max_stock: 3,
            initial_stock: 0,
            max_radius: 220.0,
            growth: 900.0,
            combo_cap: 5,
        }
    }
}

/// Input fudge factors
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InputSettings {
    /// Extra hit padding for touch input (px)
    pub touch_padding: f32,
    /// Buffer added to every displayed radius (px)
    pub hit_buffer: f32,
    /// Extra radius for item targets (px)
    pub item_allowance: f32,
    /// Misses inside this window after a miss are not re-penalized (ms)
    pub miss_cooldown_ms: f32,
}

impl Default for InputSettings {
    fn default() -> Self {
        Self {
            touch_padding: 15.0,
            hit_buffer: 10.0,
            item_allowance: 25.0,
            miss_cooldown_ms: 120.0,
        }
    }
}

/// Complete gameplay tuning
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GameSettings {
    pub initial_hp: u32,
    pub max_hp: u32,
    /// INFLATE progress at which a hit becomes critical
    pub critical_window: f32,
    /// Delay between game over and the results hand-off (ms)
    pub game_over_delay_ms: f32,
    /// Screen shake length on a hit (ms)
    pub hit_shake_ms: f32,
    pub fever: FeverSettings,
    pub combo: ComboSettings,
    pub guard: GuardSettings,
    pub bomb: BombSettings,
    pub input: InputSettings,
}

impl Default for GameSettings {
    fn default() -> Self {
        Self {
            initial_hp: 3,
            max_hp: 5,
            critical_window: 0.8,
            game_over_delay_ms: 3000.0,
            hit_shake_ms: 50.0,
            fever: FeverSettings::default(),
            combo: ComboSettings::default(),
            guard: GuardSettings::default(),
            bomb: BombSettings::default(),
            input: InputSettings::default(),
        }
    }
}

impl GameSettings {
    /// Parse and validate settings from JSON (missing fields use defaults)
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let settings: GameSettings = serde_json::from_str(json)?;
        settings
            .validate()
            .inspect_err(|e| log::warn!("Rejected settings: {e}"))?;
        log::info!("Loaded game settings");
        Ok(settings)
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_default()
    }

    pub fn validate(&self) -> Result<(), ContentError> {
        let invalid = |field: &'static str, reason: &str| ContentError::InvalidSettings {
            field,
            reason: reason.to_string(),
        };

        if self.max_hp == 0 {
            return Err(invalid("max_hp", "must be at least 1"));
        }
        if self.initial_hp == 0 || self.initial_hp > self.max_hp {
            return Err(invalid("initial_hp", "must be within 1..=max_hp"));
        }
        if !(0.0..=1.0).contains(&self.critical_window) {
            return Err(invalid("critical_window", "must be within 0.0..=1.0"));
        }
        if self.fever.trigger_combo == 0 {
            return Err(invalid("fever.trigger_combo", "must be at least 1"));
        }
        if !self.combo.tier_thresholds.windows(2).all(|w| w[0] < w[1]) {
            return Err(invalid("combo.tier_thresholds", "must be strictly ascending"));
        }
        if self.combo.tier_multipliers.len() != self.combo.tier_thresholds.len() + 1 {
            return Err(invalid(
                "combo.tier_multipliers",
                "needs one entry per tier plus the base tier",
            ));
        }
        if self.guard.initial_charges > self.guard.max_charges {
            return Err(invalid("guard.initial_charges", "exceeds max_charges"));
        }
        if self.bomb.initial_stock > self.bomb.max_stock {
            return Err(invalid("bomb.initial_stock", "exceeds max_stock"));
        }
        Ok(())
    }
}
