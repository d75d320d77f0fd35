//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Caller-supplied timestep only
//! - Seeded RNG only
//! - Stable iteration order (insertion order, last is topmost)
//! - No rendering or platform dependencies; collaborators go through ports

pub mod events;
pub mod hit;
pub mod population;
pub mod rng;
pub mod session;
pub mod spawn;
pub mod stats;
pub mod target;

pub use events::{GameEvent, Popup, Tint};
pub use hit::{Circle, DEFAULT_CRITICAL_THRESHOLD, DeviceClass, is_critical, is_hit};
pub use population::{AreaKill, HitReport, Population, PopulationEvent};
pub use rng::GameRng;
pub use session::{Session, SessionPhase, SessionState, Shockwave};
pub use spawn::{SpawnRequest, pick_weighted, random_position, select_type};
pub use stats::{PlayStats, SessionResults};
pub use target::{DashStyle, HitOutcome, Target, TargetState, TrickyPhase, Viewport};
