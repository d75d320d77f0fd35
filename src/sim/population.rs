//! Live target population
//!
//! Owns every target. Advances them, turns explosions into damage events,
//! fans out on-death spawns, and resolves taps topmost-first.

use std::f32::consts::TAU;
use std::sync::Arc;

use glam::Vec2;

use super::hit::{Circle, DeviceClass, is_critical, is_hit};
use super::rng::GameRng;
use super::spawn::{SpawnRequest, random_position, select_type};
use super::target::{HitOutcome, Target, TargetState, Viewport};
use crate::content::Catalog;
use crate::settings::GameSettings;

/// Outcome of a tap that struck a target
#[derive(Debug, Clone, PartialEq)]
pub struct HitReport {
    pub target_id: u32,
    pub type_id: String,
    pub killed: bool,
    /// Base score (doubled when critical); zero unless killed
    pub score: u32,
    pub critical: bool,
    pub is_item: bool,
    /// HP restored; zero unless killed
    pub recovery: u32,
    pub bombs: u32,
    pub guards: u32,
    pub pos: Vec2,
    pub color: String,
}

/// Something the session needs to react to after an update
#[derive(Debug, Clone, PartialEq)]
pub enum PopulationEvent {
    /// Inflate ran out uncontested
    Exploded {
        target_id: u32,
        type_id: String,
        damage: u32,
        pos: Vec2,
    },
    /// Removed after death, with the number of children spawned
    Died {
        target_id: u32,
        type_id: String,
        pos: Vec2,
        children: u32,
    },
}

/// A target taken out by an area effect
#[derive(Debug, Clone, PartialEq)]
pub struct AreaKill {
    pub target_id: u32,
    pub type_id: String,
    pub score: u32,
    pub pos: Vec2,
}

#[derive(Debug, Clone)]
pub struct Population {
    catalog: Arc<Catalog>,
    /// Insertion order; last is topmost
    targets: Vec<Target>,
    viewport: Viewport,
    max_alive: usize,
    next_id: u32,
}

impl Population {
    pub fn new(catalog: Arc<Catalog>, viewport: Viewport, max_alive: usize) -> Self {
        Self {
            catalog,
            targets: Vec::new(),
            viewport,
            max_alive,
            next_id: 1,
        }
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    pub fn max_alive(&self) -> usize {
        self.max_alive
    }

    pub fn set_max_alive(&mut self, max_alive: usize) {
        self.max_alive = max_alive;
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.targets.len() >= self.max_alive
    }

    /// Targets in insertion order (last drawn on top)
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    pub fn get(&self, id: u32) -> Option<&Target> {
        self.targets.iter().find(|t| t.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Target> {
        self.targets.iter_mut().find(|t| t.id == id)
    }

    pub fn clear(&mut self) {
        self.targets.clear();
    }

    /// Spawn a target; silently returns `None` at the population cap
    pub fn spawn(
        &mut self,
        request: SpawnRequest<'_>,
        at: Option<Vec2>,
        rng: &mut GameRng,
    ) -> Option<u32> {
        if self.is_full() {
            log::trace!("spawn skipped, population at cap {}", self.max_alive);
            return None;
        }

        let kind = select_type(request, rng).and_then(|id| self.catalog.type_index(id))?;
        let radius = self.catalog.kind(kind).radius;
        let pos = at.unwrap_or_else(|| random_position(self.viewport, radius, rng));
        let heading = rng.angle();
        self.insert(kind, pos, heading)
    }

    fn insert(&mut self, kind: usize, pos: Vec2, heading: f32) -> Option<u32> {
        if self.is_full() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;

        let def = self.catalog.kind(kind);
        log::debug!("spawn {} #{id} at ({:.0}, {:.0})", def.id, pos.x, pos.y);
        self.targets.push(Target::new(id, kind, def, pos, heading));
        Some(id)
    }

    /// Advance every target by `dt` seconds and sweep exploded/dead ones
    pub fn update(&mut self, dt: f32, rng: &mut GameRng) -> Vec<PopulationEvent> {
        let catalog = &self.catalog;
        let viewport = self.viewport;
        for target in self.targets.iter_mut() {
            let def = catalog.kind(target.kind);
            target.update(def, dt, viewport, rng);
        }
        self.sweep(rng)
    }

    /// Remove exploded and dead targets, fanning out on-death spawns
    pub fn sweep(&mut self, rng: &mut GameRng) -> Vec<PopulationEvent> {
        let mut events = Vec::new();
        let mut dead = Vec::new();

        let (gone, alive): (Vec<Target>, Vec<Target>) = std::mem::take(&mut self.targets)
            .into_iter()
            .partition(|t| !t.state.is_live());
        self.targets = alive;

        for target in gone {
            let def = self.catalog.kind(target.kind);
            match target.state {
                TargetState::Explode => events.push(PopulationEvent::Exploded {
                    target_id: target.id,
                    type_id: def.id.clone(),
                    damage: def.explode_damage,
                    pos: target.pos,
                }),
                _ => dead.push(target),
            }
        }

        for target in dead {
            let children = self.fan_out(&target, rng);
            events.push(PopulationEvent::Died {
                target_id: target.id,
                type_id: self.catalog.kind(target.kind).id.clone(),
                pos: target.pos,
                children,
            });
        }

        events
    }

    /// Spawn a dead target's children evenly around a circle
    fn fan_out(&mut self, parent: &Target, rng: &mut GameRng) -> u32 {
        let Some(rule) = self.catalog.kind(parent.kind).on_death_spawn.clone() else {
            return 0;
        };
        let Some(child_kind) = self.catalog.type_index(&rule.id) else {
            return 0;
        };

        let offset = rng.angle();
        let step = TAU / rule.count.max(1) as f32;
        let mut spawned = 0;
        for i in 0..rule.count {
            let heading = offset + step * i as f32;
            if self.insert(child_kind, parent.pos, heading).is_some() {
                spawned += 1;
            }
        }
        spawned
    }

    /// Resolve a tap against the topmost target under it. At most one
    /// target is struck per tap.
    pub fn handle_input(
        &mut self,
        point: Vec2,
        device: DeviceClass,
        one_shot: bool,
        settings: &GameSettings,
    ) -> Option<HitReport> {
        let padding = device.padding(settings.input.touch_padding);
        let catalog = &self.catalog;

        for target in self.targets.iter_mut().rev() {
            if !target.state.is_live() {
                continue;
            }
            let def = catalog.kind(target.kind);
            let radius = target.hit_radius(def, settings.input.hit_buffer, settings.input.item_allowance);
            if !is_hit(point, Circle::new(target.pos, radius), padding) {
                continue;
            }

            let critical = is_critical(target.state, target.progress(def), settings.critical_window);
            let killed = target.on_hit(critical, one_shot) == HitOutcome::Killed;
            let score = match (killed, critical) {
                (false, _) => 0,
                (true, true) => def.score * 2,
                (true, false) => def.score,
            };

            return Some(HitReport {
                target_id: target.id,
                type_id: def.id.clone(),
                killed,
                score,
                critical,
                is_item: def.is_item,
                recovery: if killed { def.recovery } else { 0 },
                bombs: if killed { def.grants_bomb } else { 0 },
                guards: if killed { def.grants_guard } else { 0 },
                pos: target.pos,
                color: def.color.clone(),
            });
        }
        None
    }

    /// Kill every live enemy whose body touches the circle. Items are skipped.
    pub fn kill_within(&mut self, center: Vec2, radius: f32) -> Vec<AreaKill> {
        let catalog = &self.catalog;
        let mut kills = Vec::new();
        for target in self.targets.iter_mut() {
            let def = catalog.kind(target.kind);
            if def.is_item || !target.state.is_live() {
                continue;
            }
            if !is_hit(target.pos, Circle::new(center, radius), def.radius) {
                continue;
            }
            if target.kill() {
                kills.push(AreaKill {
                    target_id: target.id,
                    type_id: def.id.clone(),
                    score: def.score,
                    pos: target.pos,
                });
            }
        }
        kills
    }
}
