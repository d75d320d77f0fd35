//! Per-target state machine
//!
//! SPAWN -> MOVE -> STOP -> INFLATE -> EXPLODE, with items leaving MOVE
//! straight to DEAD and a lethal hit jumping to DEAD from any live state.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::rng::GameRng;
use crate::consts::*;
use crate::content::{MovePattern, TargetTypeDef};
use crate::{heading_to_dir, perpendicular};

/// Lifecycle state of a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TargetState {
    /// Grow-in animation
    Spawn,
    /// Moving by pattern
    Move,
    /// Stationary pause before inflating
    Stop,
    /// Vulnerable window, grows toward explosion
    Inflate,
    /// Inflate ran out; owner applies damage and removes it
    Explode,
    /// Killed, collected or expired; owner removes it
    Dead,
}

impl TargetState {
    /// Dead and exploded targets ignore further hits
    pub fn is_live(self) -> bool {
        !matches!(self, TargetState::Explode | TargetState::Dead)
    }
}

/// Logical viewport used for placement and edge bounces
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_VIEWPORT_WIDTH,
            height: DEFAULT_VIEWPORT_HEIGHT,
        }
    }
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }
}

/// Dash flavor for the tricky pattern, re-rolled every cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DashStyle {
    Straight,
    Weave,
    Jitter,
}

/// Sub-phase of the tricky pattern's pause/charge/dash cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TrickyPhase {
    Pause,
    Charge,
    Dash(DashStyle),
}

/// Result of striking a target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitOutcome {
    /// Target was already exploding or dead
    Ignored,
    /// Hit registered, target still alive
    Survived,
    /// Hit points reached zero, target is now DEAD
    Killed,
}

/// A live target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Target {
    pub id: u32,
    /// Index into the catalog's type table
    pub kind: usize,
    pub pos: Vec2,
    /// Direction persists across pattern updates; magnitude is the type speed
    pub vel: Vec2,
    pub hp: u32,
    pub state: TargetState,
    /// Time spent in the current state (ms)
    pub state_time: f32,
    /// Render-only punch scale, never read by gameplay
    #[serde(skip)]
    pub punch: f32,
    pub tricky_phase: TrickyPhase,
    /// Time spent in the current tricky sub-phase (ms)
    pub tricky_time: f32,
}

impl Target {
    pub fn new(id: u32, kind: usize, def: &TargetTypeDef, pos: Vec2, heading: f32) -> Self {
        Self {
            id,
            kind,
            pos,
            vel: heading_to_dir(heading) * def.speed,
            hp: def.hp,
            state: TargetState::Spawn,
            state_time: 0.0,
            punch: 1.0,
            tricky_phase: TrickyPhase::Pause,
            tricky_time: 0.0,
        }
    }

    /// Length of the current phase (ms); zero for terminal states
    pub fn phase_duration(&self, def: &TargetTypeDef) -> f32 {
        let d = &def.durations;
        match self.state {
            TargetState::Spawn => d.spawn,
            TargetState::Move => d.move_ms,
            TargetState::Stop => d.stop,
            TargetState::Inflate => d.inflate,
            TargetState::Explode | TargetState::Dead => 0.0,
        }
    }

    /// Progress through the current phase in [0, 1]
    pub fn progress(&self, def: &TargetTypeDef) -> f32 {
        let duration = self.phase_duration(def);
        if duration <= 0.0 {
            return 0.0;
        }
        (self.state_time / duration).min(1.0)
    }

    /// Advance timers and movement; returns the new state on a transition
    pub fn update(
        &mut self,
        def: &TargetTypeDef,
        dt: f32,
        viewport: Viewport,
        rng: &mut GameRng,
    ) -> Option<TargetState> {
        let dt_ms = dt * 1000.0;
        self.state_time += dt_ms;

        if self.punch > 1.0 {
            self.punch = (self.punch - dt * PUNCH_DECAY).max(1.0);
        }

        let d = &def.durations;
        match self.state {
            TargetState::Spawn => {
                if self.state_time > d.spawn {
                    return Some(self.transition(TargetState::Move));
                }
            }
            TargetState::Move => {
                self.apply_movement(def, dt, viewport, rng);
                if self.state_time > d.move_ms {
                    if def.is_item {
                        // Expired uncollected
                        self.hp = 0;
                        return Some(self.transition(TargetState::Dead));
                    }
                    return Some(self.transition(TargetState::Stop));
                }
            }
            TargetState::Stop => {
                if self.state_time > d.stop {
                    return Some(self.transition(TargetState::Inflate));
                }
            }
            TargetState::Inflate => {
                if self.state_time > d.inflate {
                    return Some(self.transition(TargetState::Explode));
                }
            }
            TargetState::Explode | TargetState::Dead => {}
        }
        None
    }

    fn transition(&mut self, next: TargetState) -> TargetState {
        log::trace!("target {} {:?} -> {:?}", self.id, self.state, next);
        self.state = next;
        self.state_time = 0.0;
        next
    }

    /// Apply a strike. Critical or one-shot strikes kill outright.
    pub fn on_hit(&mut self, critical: bool, one_shot: bool) -> HitOutcome {
        if !self.state.is_live() {
            return HitOutcome::Ignored;
        }

        self.punch = PUNCH_SCALE;
        if critical || one_shot {
            self.hp = 0;
        } else {
            self.hp = self.hp.saturating_sub(1);
        }

        if self.hp == 0 {
            self.transition(TargetState::Dead);
            HitOutcome::Killed
        } else {
            HitOutcome::Survived
        }
    }

    /// Force a kill (bomb shockwave)
    pub fn kill(&mut self) -> bool {
        if !self.state.is_live() {
            return false;
        }
        self.hp = 0;
        self.transition(TargetState::Dead);
        true
    }

    /// Apparent radius from phase growth, before buffers and punch
    pub fn display_radius(&self, def: &TargetTypeDef, item_allowance: f32) -> f32 {
        let base = if def.is_item {
            def.radius + item_allowance
        } else {
            def.radius
        };
        match self.state {
            TargetState::Spawn => {
                if def.durations.spawn <= 0.0 {
                    base
                } else {
                    base * (self.state_time / def.durations.spawn).min(1.0)
                }
            }
            TargetState::Inflate => base * (1.0 + self.progress(def) * INFLATE_GROWTH),
            _ => base,
        }
    }

    /// Radius used for tap hit testing
    pub fn hit_radius(&self, def: &TargetTypeDef, hit_buffer: f32, item_allowance: f32) -> f32 {
        self.display_radius(def, item_allowance) + hit_buffer
    }

    /// Radius for drawing, including the punch scale
    pub fn render_radius(&self, def: &TargetTypeDef) -> f32 {
        self.display_radius(def, 0.0) * self.punch
    }

    fn apply_movement(&mut self, def: &TargetTypeDef, dt: f32, viewport: Viewport, rng: &mut GameRng) {
        let dt_ms = dt * 1000.0;
        let prev_time = self.state_time - dt_ms;

        let sideways = def.move_pattern == MovePattern::Zigzag
            && !((prev_time.max(0.0) / ZIGZAG_INTERVAL_MS) as u32).is_multiple_of(2);
        let step = match def.move_pattern {
            MovePattern::Straight => self.vel * dt,
            MovePattern::Zigzag if sideways => perpendicular(self.vel) * dt,
            MovePattern::Zigzag => self.vel * dt,
            MovePattern::Sine => self.vel * dt + self.sine_offset(prev_time, self.state_time),
            MovePattern::Tricky => self.tricky_step(dt, rng),
        };

        self.pos += step;
        self.bounce(def.radius, viewport, sideways);
    }

    /// Perpendicular displacement of the sine wave between two times (ms)
    fn sine_offset(&self, from_ms: f32, to_ms: f32) -> Vec2 {
        let side = perpendicular(self.vel).normalize_or_zero();
        let delta = (to_ms * SINE_RATE).sin() - (from_ms * SINE_RATE).sin();
        side * SINE_AMPLITUDE * delta
    }

    fn tricky_step(&mut self, dt: f32, rng: &mut GameRng) -> Vec2 {
        let dt_ms = dt * 1000.0;
        let prev = self.tricky_time;
        self.tricky_time += dt_ms;

        let step = match self.tricky_phase {
            TrickyPhase::Pause | TrickyPhase::Charge => Vec2::ZERO,
            TrickyPhase::Dash(style) => {
                if style == DashStyle::Jitter {
                    let speed = self.vel.length();
                    let heading = self.vel.y.atan2(self.vel.x)
                        + rng.range(-TRICKY_JITTER, TRICKY_JITTER);
                    self.vel = heading_to_dir(heading) * speed;
                }
                let dash = self.vel * TRICKY_DASH_BOOST * dt;
                match style {
                    DashStyle::Weave => dash + self.sine_offset(prev * 2.0, self.tricky_time * 2.0),
                    DashStyle::Straight | DashStyle::Jitter => dash,
                }
            }
        };

        let limit = match self.tricky_phase {
            TrickyPhase::Pause => TRICKY_PAUSE_MS,
            TrickyPhase::Charge => TRICKY_CHARGE_MS,
            TrickyPhase::Dash(_) => TRICKY_DASH_MS,
        };
        if self.tricky_time >= limit {
            self.tricky_time = 0.0;
            self.tricky_phase = match self.tricky_phase {
                TrickyPhase::Pause => TrickyPhase::Charge,
                TrickyPhase::Charge => TrickyPhase::Dash(match rng.below(3) {
                    0 => DashStyle::Straight,
                    1 => DashStyle::Weave,
                    _ => DashStyle::Jitter,
                }),
                TrickyPhase::Dash(_) => TrickyPhase::Pause,
            };
        }

        step
    }

    /// Keep the body on screen, inverting the violated axis
    /// Clamp inside the viewport and reflect the direction of travel off
    /// whichever walls were crossed. When `sideways`, travel runs along
    /// `perpendicular(vel)`, so that is what gets reflected.
    fn bounce(&mut self, radius: f32, viewport: Viewport, sideways: bool) {
        let max_x = (viewport.width - radius).max(radius);
        let max_y = (viewport.height - radius).max(radius);
        let mut dir = if sideways {
            perpendicular(self.vel)
        } else {
            self.vel
        };

        if self.pos.x < radius {
            self.pos.x = radius;
            dir.x = dir.x.abs();
        } else if self.pos.x > max_x {
            self.pos.x = max_x;
            dir.x = -dir.x.abs();
        }

        if self.pos.y < radius {
            self.pos.y = radius;
            dir.y = dir.y.abs();
        } else if self.pos.y > max_y {
            self.pos.y = max_y;
            dir.y = -dir.y.abs();
        }

        // Undo the quarter turn
        self.vel = if sideways {
            Vec2::new(dir.y, -dir.x)
        } else {
            dir
        };
    }
}
