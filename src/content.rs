//! Data-driven target types and stage tables
//!
//! Loaded once at startup, read-only for the rest of the process. Weight
//! tables are ordered lists so the spawn walk follows authored order.

use serde::{Deserialize, Serialize};

use crate::consts::DEFAULT_SPAWN_MS;
use crate::error::ContentError;

/// How a target moves during its MOVE phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MovePattern {
    #[default]
    Straight,
    Zigzag,
    Sine,
    Tricky,
}

fn default_spawn_ms() -> f32 {
    DEFAULT_SPAWN_MS
}

/// Per-phase durations in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PhaseDurations {
    #[serde(default = "default_spawn_ms")]
    pub spawn: f32,
    #[serde(rename = "move")]
    pub move_ms: f32,
    #[serde(default)]
    pub stop: f32,
    #[serde(default)]
    pub inflate: f32,
}

impl PhaseDurations {
    pub const fn new(move_ms: f32, stop: f32, inflate: f32) -> Self {
        Self {
            spawn: DEFAULT_SPAWN_MS,
            move_ms,
            stop,
            inflate,
        }
    }
}

/// Children spawned when a target dies
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpawnRule {
    pub id: String,
    pub count: u32,
}

/// Static definition of one target type
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TargetTypeDef {
    pub id: String,
    pub hp: u32,
    pub score: u32,
    pub radius: f32,
    /// Render hint passed through on hit/kill events
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub move_pattern: MovePattern,
    pub durations: PhaseDurations,
    /// px per second
    pub speed: f32,
    #[serde(default)]
    pub explode_damage: u32,
    /// Items are collected, never explode
    #[serde(default)]
    pub is_item: bool,
    /// HP restored when collected
    #[serde(default)]
    pub recovery: u32,
    /// Bombs granted when collected
    #[serde(default)]
    pub grants_bomb: u32,
    /// Guard charges granted when collected
    #[serde(default)]
    pub grants_guard: u32,
    #[serde(default)]
    pub on_death_spawn: Option<SpawnRule>,
}

impl TargetTypeDef {
    #[allow(clippy::too_many_arguments)]
    fn enemy(
        id: &str,
        hp: u32,
        score: u32,
        radius: f32,
        color: &str,
        move_pattern: MovePattern,
        durations: PhaseDurations,
        speed: f32,
    ) -> Self {
        Self {
            id: id.to_string(),
            hp,
            score,
            radius,
            color: color.to_string(),
            move_pattern,
            durations,
            speed,
            explode_damage: 1,
            is_item: false,
            recovery: 0,
            grants_bomb: 0,
            grants_guard: 0,
            on_death_spawn: None,
        }
    }

    fn item(id: &str, score: u32, radius: f32, color: &str, move_ms: f32, speed: f32) -> Self {
        Self {
            id: id.to_string(),
            hp: 1,
            score,
            radius,
            color: color.to_string(),
            move_pattern: MovePattern::Straight,
            durations: PhaseDurations::new(move_ms, 0.0, 0.0),
            speed,
            explode_damage: 0,
            is_item: true,
            recovery: 0,
            grants_bomb: 0,
            grants_guard: 0,
            on_death_spawn: None,
        }
    }
}

/// One entry of a stage's spawn weight table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeightEntry {
    pub id: String,
    pub weight: u32,
}

impl WeightEntry {
    pub fn new(id: &str, weight: u32) -> Self {
        Self {
            id: id.to_string(),
            weight,
        }
    }
}

/// A difficulty segment, advanced by cumulative score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDef {
    pub id: u32,
    #[serde(default)]
    pub name: String,
    /// Cumulative score needed to leave this stage
    pub target_score: u64,
    pub spawn_interval_ms: f32,
    pub max_alive: usize,
    pub weights: Vec<WeightEntry>,
    /// Background reference handed to the backdrop collaborator
    #[serde(default)]
    pub background: String,
}

impl StageDef {
    pub fn total_weight(&self) -> u32 {
        self.weights.iter().map(|w| w.weight).sum()
    }
}

/// All static content: type table plus ordered stage list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub types: Vec<TargetTypeDef>,
    pub stages: Vec<StageDef>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// Shipped content
    pub fn builtin() -> Self {
        use MovePattern::*;

        let mut splitter = TargetTypeDef::enemy(
            "splitter",
            1,
            80,
            40.0,
            "#00ff00",
            Straight,
            PhaseDurations::new(2000.0, 1000.0, 2500.0),
            80.0,
        );
        splitter.on_death_spawn = Some(SpawnRule {
            id: "split_child".to_string(),
            count: 2,
        });

        let mut heart = TargetTypeDef::item("heart", 50, 12.0, "#ff85a2", 3000.0, 450.0);
        heart.recovery = 1;

        let mut bomb = TargetTypeDef::item("bomb", 50, 16.0, "#ffb347", 2500.0, 380.0);
        bomb.grants_bomb = 1;

        let types = vec![
            TargetTypeDef::enemy(
                "basic",
                1,
                100,
                35.0,
                "#05d9e8",
                Straight,
                PhaseDurations::new(2000.0, 1000.0, 2000.0),
                100.0,
            ),
            TargetTypeDef::enemy(
                "tough",
                3,
                300,
                50.0,
                "#f9f9f9",
                Zigzag,
                PhaseDurations::new(3000.0, 1500.0, 2500.0),
                100.0,
            ),
            TargetTypeDef::enemy(
                "fast",
                1,
                200,
                25.0,
                "#ffe066",
                Sine,
                PhaseDurations::new(1500.0, 500.0, 1000.0),
                250.0,
            ),
            TargetTypeDef::enemy(
                "hasty",
                1,
                150,
                32.0,
                "#ff00ff",
                Straight,
                PhaseDurations::new(1200.0, 400.0, 800.0),
                160.0,
            ),
            splitter,
            TargetTypeDef::enemy(
                "split_child",
                1,
                40,
                22.0,
                "#7cfc00",
                Straight,
                PhaseDurations::new(1000.0, 300.0, 600.0),
                200.0,
            ),
            TargetTypeDef::enemy(
                "dasher",
                2,
                250,
                30.0,
                "#ff6b35",
                Tricky,
                PhaseDurations::new(3200.0, 600.0, 1200.0),
                120.0,
            ),
            heart,
            bomb,
        ];

        let stage = |id: u32,
                     name: &str,
                     target_score: u64,
                     spawn_interval_ms: f32,
                     max_alive: usize,
                     weights: &[(&str, u32)]| StageDef {
            id,
            name: name.to_string(),
            target_score,
            spawn_interval_ms,
            max_alive,
            weights: weights
                .iter()
                .map(|&(id, weight)| WeightEntry::new(id, weight))
                .collect(),
            background: format!("bg_stage_{id:02}"),
        };

        let stages = vec![
            stage(
                1,
                "Entrance",
                1000,
                1800.0,
                8,
                &[("basic", 80), ("tough", 10), ("fast", 10), ("heart", 5)],
            ),
            stage(
                2,
                "Pressure Zone",
                3500,
                1400.0,
                12,
                &[
                    ("basic", 40),
                    ("tough", 25),
                    ("fast", 20),
                    ("hasty", 15),
                    ("heart", 2),
                    ("bomb", 2),
                ],
            ),
            stage(
                3,
                "Zigzag Chaos",
                7000,
                1000.0,
                15,
                &[
                    ("basic", 25),
                    ("tough", 30),
                    ("fast", 25),
                    ("hasty", 15),
                    ("splitter", 10),
                    ("heart", 2),
                    ("bomb", 2),
                ],
            ),
            stage(
                4,
                "Sine Hell",
                12000,
                800.0,
                18,
                &[
                    ("basic", 15),
                    ("tough", 25),
                    ("fast", 40),
                    ("hasty", 20),
                    ("splitter", 15),
                    ("dasher", 10),
                    ("heart", 3),
                    ("bomb", 3),
                ],
            ),
            // Endless: target score is out of reach in normal play
            stage(
                5,
                "Ultimate Void",
                999_999,
                600.0,
                20,
                &[
                    ("basic", 10),
                    ("tough", 30),
                    ("fast", 40),
                    ("hasty", 25),
                    ("splitter", 20),
                    ("dasher", 20),
                    ("heart", 4),
                    ("bomb", 3),
                ],
            ),
        ];

        Self { types, stages }
    }

    /// Parse and validate a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self, ContentError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog
            .validate()
            .inspect_err(|e| log::warn!("Rejected content: {e}"))?;
        log::info!(
            "Loaded catalog: {} target types, {} stages",
            catalog.types.len(),
            catalog.stages.len()
        );
        Ok(catalog)
    }

    /// Startup validation of every cross reference and duration
    pub fn validate(&self) -> Result<(), ContentError> {
        if self.stages.is_empty() {
            return Err(ContentError::NoStages);
        }

        for def in &self.types {
            if def.hp == 0 {
                return Err(ContentError::InvalidHp {
                    type_id: def.id.clone(),
                });
            }
            let d = &def.durations;
            for (phase, value) in [
                ("spawn", d.spawn),
                ("move", d.move_ms),
                ("stop", d.stop),
                ("inflate", d.inflate),
            ] {
                if !value.is_finite() || value < 0.0 {
                    return Err(ContentError::InvalidDuration {
                        type_id: def.id.clone(),
                        phase,
                    });
                }
            }
            if let Some(rule) = &def.on_death_spawn {
                if self.type_index(&rule.id).is_none() {
                    return Err(ContentError::UnknownType {
                        referenced_by: format!("type '{}'", def.id),
                        type_id: rule.id.clone(),
                    });
                }
            }
        }

        for stage in &self.stages {
            for entry in &stage.weights {
                if self.type_index(&entry.id).is_none() {
                    return Err(ContentError::UnknownType {
                        referenced_by: format!("stage {}", stage.id),
                        type_id: entry.id.clone(),
                    });
                }
            }
            if stage.total_weight() == 0 {
                return Err(ContentError::EmptyWeights { stage_id: stage.id });
            }
        }

        Ok(())
    }

    pub fn type_index(&self, id: &str) -> Option<usize> {
        self.types.iter().position(|t| t.id == id)
    }

    pub fn type_def(&self, id: &str) -> Option<&TargetTypeDef> {
        self.types.iter().find(|t| t.id == id)
    }

    /// Type by index (indices come from `type_index`, so always in range)
    pub fn kind(&self, index: usize) -> &TargetTypeDef {
        &self.types[index]
    }

    pub fn stage(&self, index: usize) -> &StageDef {
        &self.stages[index.min(self.stages.len() - 1)]
    }

    pub fn final_stage_index(&self) -> usize {
        self.stages.len().saturating_sub(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_builtin_is_valid() {
        let catalog = Catalog::builtin();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.stages.len(), 5);
        assert_eq!(catalog.stages[4].target_score, 999_999);
    }

    #[test]
    fn test_builtin_splitter_rule() {
        let catalog = Catalog::builtin();
        let splitter = catalog.type_def("splitter").unwrap();
        let rule = splitter.on_death_spawn.as_ref().unwrap();
        assert_eq!(rule.id, "split_child");
        assert_eq!(rule.count, 2);
    }

    #[test]
    fn test_items_never_explode() {
        let catalog = Catalog::builtin();
        for def in catalog.types.iter().filter(|t| t.is_item) {
            assert_eq!(def.explode_damage, 0, "{}", def.id);
        }
    }

    #[test]
    fn test_unknown_weight_type_rejected() {
        let mut catalog = Catalog::builtin();
        catalog.stages[0].weights.push(WeightEntry::new("ghost", 5));
        match catalog.validate() {
            Err(ContentError::UnknownType { type_id, .. }) => assert_eq!(type_id, "ghost"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_zero_weights_rejected() {
        let mut catalog = Catalog::builtin();
        for w in &mut catalog.stages[1].weights {
            w.weight = 0;
        }
        assert!(matches!(
            catalog.validate(),
            Err(ContentError::EmptyWeights { stage_id: 2 })
        ));
    }

    #[test]
    fn test_negative_duration_rejected() {
        let mut catalog = Catalog::builtin();
        catalog.types[0].durations.stop = -1.0;
        assert!(matches!(
            catalog.validate(),
            Err(ContentError::InvalidDuration { phase: "stop", .. })
        ));
    }

    #[test]
    fn test_zero_hp_rejected() {
        let mut catalog = Catalog::builtin();
        catalog.types[0].hp = 0;
        assert!(matches!(
            catalog.validate(),
            Err(ContentError::InvalidHp { .. })
        ));
    }

    #[test]
    fn test_json_roundtrip_keeps_weight_order() {
        let catalog = Catalog::builtin();
        let json = serde_json::to_string(&catalog).unwrap();
        let loaded = Catalog::from_json(&json).unwrap();
        let ids: Vec<_> = loaded.stages[0].weights.iter().map(|w| w.id.as_str()).collect();
        assert_eq!(ids, ["basic", "tough", "fast", "heart"]);
    }

    #[test]
    fn test_json_defaults() {
        let json = r#"{
            "types": [{
                "id": "blob", "hp": 1, "score": 10, "radius": 20.0,
                "durations": { "move": 1000.0 }, "speed": 50.0
            }],
            "stages": [{
                "id": 1, "target_score": 100, "spawn_interval_ms": 1000.0,
                "max_alive": 4, "weights": [{ "id": "blob", "weight": 1 }]
            }]
        }"#;
        let catalog = Catalog::from_json(json).unwrap();
        let blob = catalog.kind(0);
        assert_eq!(blob.durations.spawn, DEFAULT_SPAWN_MS);
        assert_eq!(blob.move_pattern, MovePattern::Straight);
        assert!(!blob.is_item);
        assert!(blob.on_death_spawn.is_none());
    }

    #[test]
    fn test_bad_json_is_parse_error() {
        assert!(matches!(
            Catalog::from_json("{ not json"),
            Err(ContentError::Parse(_))
        ));
    }
}
