//! Spawn type selection and placement

use glam::Vec2;

use super::rng::GameRng;
use super::target::Viewport;
use crate::content::WeightEntry;

/// What to spawn
#[derive(Debug, Clone, Copy)]
pub enum SpawnRequest<'a> {
    /// Weighted draw from a stage table
    Weighted(&'a [WeightEntry]),
    /// An explicit type id
    Type(&'a str),
}

/// Walk the table in order and return the first entry whose cumulative
/// weight exceeds `draw`. Ties favor earlier entries.
pub fn pick_weighted(weights: &[WeightEntry], draw: u32) -> Option<&str> {
    let mut cumulative = 0u32;
    for entry in weights {
        cumulative += entry.weight;
        if cumulative > draw {
            return Some(entry.id.as_str());
        }
    }
    None
}

/// Resolve a request to a type id, drawing from `rng` for weighted tables
pub fn select_type<'a>(request: SpawnRequest<'a>, rng: &mut GameRng) -> Option<&'a str> {
    match request {
        SpawnRequest::Type(id) => Some(id),
        SpawnRequest::Weighted(weights) => {
            let total: u32 = weights.iter().map(|w| w.weight).sum();
            if total == 0 {
                return None;
            }
            pick_weighted(weights, rng.below(total))
        }
    }
}

/// Uniform position inset by `radius` so the body starts fully on screen
pub fn random_position(viewport: Viewport, radius: f32, rng: &mut GameRng) -> Vec2 {
    let x = rng.range(radius, viewport.width - radius);
    let y = rng.range(radius, viewport.height - radius);
    Vec2::new(x, y)
}
