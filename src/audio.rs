//! Audio cues
//!
//! The core never plays sound itself; it names cues and hands them to an
//! injected [`AudioPort`](crate::ports::AudioPort).

use serde::{Deserialize, Serialize};

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Target struck but survived
    Hit,
    /// Target killed
    Kill,
    /// Target killed in its critical window
    Critical,
    /// Item collected
    Item,
    /// Tap hit nothing and was penalized
    Miss,
    /// Miss absorbed by a guard (fever or charge)
    Guard,
    /// Bomb detonated on a miss
    Bomb,
    /// Target exploded
    Explosion,
    /// Fever started
    Fever,
    /// Stage advanced
    StageUp,
    /// Game over
    GameOver,
}

impl SoundEffect {
    /// Asset key used by the host's audio loader
    pub fn key(self) -> &'static str {
        match self {
            SoundEffect::Hit => "hit",
            SoundEffect::Kill => "kill",
            SoundEffect::Critical => "critical",
            SoundEffect::Item => "item",
            SoundEffect::Miss => "miss",
            SoundEffect::Guard => "guard",
            SoundEffect::Bomb => "bomb",
            SoundEffect::Explosion => "explosion",
            SoundEffect::Fever => "fever",
            SoundEffect::StageUp => "stage_up",
            SoundEffect::GameOver => "game_over",
        }
    }
}

/// Music track key for a stage id
pub fn stage_music_key(stage_id: u32) -> String {
    format!("stage_{stage_id:02}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_unique() {
        let all = [
            SoundEffect::Hit,
            SoundEffect::Kill,
            SoundEffect::Critical,
            SoundEffect::Item,
            SoundEffect::Miss,
            SoundEffect::Guard,
            SoundEffect::Bomb,
            SoundEffect::Explosion,
            SoundEffect::Fever,
            SoundEffect::StageUp,
            SoundEffect::GameOver,
        ];
        let keys: std::collections::HashSet<_> = all.iter().map(|s| s.key()).collect();
        assert_eq!(keys.len(), all.len());
    }

    #[test]
    fn test_stage_music_key() {
        assert_eq!(stage_music_key(3), "stage_03");
    }
}
