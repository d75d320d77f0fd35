//! Per-session play statistics for the results screen

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayStats {
    pub total_taps: u32,
    pub hit_taps: u32,
    pub miss_taps: u32,
    pub max_combo: u32,
    pub fever_count: u32,
    pub kills: u32,
    pub criticals: u32,
    pub items_collected: u32,
    pub guards_used: u32,
    pub bombs_used: u32,
    pub damage_taken: u32,
}

impl PlayStats {
    /// Share of taps that missed, in percent
    pub fn miss_rate(&self) -> f32 {
        if self.total_taps == 0 {
            return 0.0;
        }
        self.miss_taps as f32 / self.total_taps as f32 * 100.0
    }

    /// Hits over taps, 0..=1
    pub fn accuracy(&self) -> f32 {
        if self.total_taps == 0 {
            return 0.0;
        }
        self.hit_taps as f32 / self.total_taps as f32
    }
}

/// What the results collaborator receives once the game-over delay ends
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionResults {
    pub score: u64,
    /// 1-based stage number reached
    pub stage: u32,
    pub stats: PlayStats,
}
