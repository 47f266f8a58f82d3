#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative world state for the Prowl guard simulation.
//!
//! The world owns every enemy record, the player position and the tick
//! counter. It also stands in for physics integration: steering handed to it
//! through [`Command::SteerGuard`] is integrated kinematically on the next
//! [`Command::Tick`]. Collision response stays outside the simulation.

pub mod config;

use glam::Vec2;
use log::{debug, warn};
use prowl_core::{
    AlertLevel, AlertResolution, Command, EnemyId, Event, FieldOfView, PatrolRoute, Steering,
};

use crate::config::{CameraConfig, GuardConfig, LevelConfig};

/// Represents the authoritative simulation state for a loaded level.
#[derive(Debug)]
pub struct World {
    level: LevelConfig,
    enemies: Vec<Enemy>,
    player: Vec2,
    tick_index: u64,
}

impl World {
    /// Creates a world populated from the provided level configuration.
    #[must_use]
    pub fn from_level(level: LevelConfig) -> Self {
        let mut world = Self {
            enemies: Vec::new(),
            player: level.player_start(),
            level,
            tick_index: 0,
        };
        world.reset_enemies();
        world
    }

    /// Creates a world using the default single-guard level.
    #[must_use]
    pub fn new() -> Self {
        Self::from_level(LevelConfig::default())
    }

    fn reset_enemies(&mut self) {
        let guards = self
            .level
            .guards
            .iter()
            .map(|config| EnemyKind::Guard(Guard::from_config(config)));
        let cameras = self
            .level
            .cameras
            .iter()
            .map(|config| EnemyKind::Camera(Camera::from_config(config)));
        self.enemies = guards
            .chain(cameras)
            .enumerate()
            .filter_map(|(index, kind)| Some(Enemy { id: handle_for(index)?, kind }))
            .collect();
        self.player = self.level.player_start();
        self.tick_index = 0;
    }

    fn enemy_mut(&mut self, id: EnemyId) -> Option<&mut Enemy> {
        self.enemies.iter_mut().find(|enemy| enemy.id == id)
    }

    fn guard_mut(&mut self, id: EnemyId) -> Option<&mut Guard> {
        match self.enemy_mut(id).map(|enemy| &mut enemy.kind) {
            Some(EnemyKind::Guard(guard)) => Some(guard),
            Some(EnemyKind::Camera(_)) => {
                warn!("enemy {} has no guard behaviour; command ignored", id.get());
                None
            }
            None => {
                warn!("no enemy with id {}; command ignored", id.get());
                None
            }
        }
    }

    fn camera_mut(&mut self, id: EnemyId) -> Option<&mut Camera> {
        match self.enemy_mut(id).map(|enemy| &mut enemy.kind) {
            Some(EnemyKind::Camera(camera)) => Some(camera),
            Some(EnemyKind::Guard(_)) => {
                warn!("enemy {} is not a camera; command ignored", id.get());
                None
            }
            None => {
                warn!("no enemy with id {}; command ignored", id.get());
                None
            }
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.tick_index = world.tick_index.saturating_add(1);
            let seconds = dt.as_secs_f32();
            for enemy in &mut world.enemies {
                if let EnemyKind::Guard(guard) = &mut enemy.kind {
                    guard.integrate(seconds);
                }
            }
            out_events.push(Event::TimeAdvanced {
                tick: world.tick_index,
                dt,
            });
        }
        Command::MovePlayer { position } => {
            world.player = position;
            out_events.push(Event::PlayerMoved { position });
        }
        Command::NotifyMeow { guard, location } => {
            if let Some(state) = world.guard_mut(guard) {
                state.pending_meow = Some(location);
                debug!("guard {} heard a meow at {location}", guard.get());
                out_events.push(Event::MeowHeard { guard, location });
            }
        }
        Command::NotifyCameraAlert {
            guard,
            active,
            source,
        } => {
            if let Some(state) = world.guard_mut(guard) {
                if active && source.is_some() {
                    state.camera_source = source;
                }
                if state.camera_alerted != active {
                    state.camera_alerted = active;
                    debug!("guard {} camera alert set to {active}", guard.get());
                    out_events.push(Event::CameraAlertChanged { guard, active });
                }
            }
        }
        Command::RecordCameraSighting { camera, sighted } => {
            if let Some(state) = world.camera_mut(camera) {
                if state.sighted != sighted {
                    state.sighted = sighted;
                    out_events.push(Event::CameraSightingChanged { camera, sighted });
                }
            }
        }
        Command::ResolveAlert { guard, resolution } => {
            if let Some(state) = world.guard_mut(guard) {
                let from = state.alert;
                state.resolve(resolution);
                if from != resolution.level {
                    debug!(
                        "guard {} alert {} -> {}",
                        guard.get(),
                        from.label(),
                        resolution.level.label()
                    );
                    out_events.push(Event::AlertLevelChanged {
                        guard,
                        from,
                        to: resolution.level,
                    });
                }
            }
        }
        Command::SteerGuard { guard, steering } => {
            if let Some(state) = world.guard_mut(guard) {
                state.steering = steering;
                out_events.push(Event::GuardSteered { guard, steering });
            }
        }
        Command::ResetLevel => {
            world.reset_enemies();
            out_events.push(Event::LevelReset);
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use glam::Vec2;
    use prowl_core::{
        AlertLevel, CameraSnapshot, EnemyId, EnemySnapshot, EnemyView, GuardSnapshot,
        TickContext,
    };

    use super::{EnemyKind, World};
    use crate::config::LevelConfig;

    /// Provides read-only access to the configuration the level was built from.
    #[must_use]
    pub fn level(world: &World) -> &LevelConfig {
        &world.level
    }

    /// Current position of the player.
    #[must_use]
    pub fn player_position(world: &World) -> Vec2 {
        world.player
    }

    /// Number of ticks simulated since the level was loaded or reset.
    #[must_use]
    pub fn tick_index(world: &World) -> u64 {
        world.tick_index
    }

    /// Per-tick inputs shared by every guard.
    #[must_use]
    pub fn tick_context(world: &World) -> TickContext {
        TickContext::new(world.tick_index, world.player)
    }

    /// Captures a read-only view of every enemy in insertion order.
    #[must_use]
    pub fn enemy_view(world: &World) -> EnemyView {
        EnemyView::from_snapshots(
            world
                .enemies
                .iter()
                .map(|enemy| match &enemy.kind {
                    EnemyKind::Guard(guard) => EnemySnapshot::Guard(guard.snapshot(enemy.id)),
                    EnemyKind::Camera(camera) => {
                        EnemySnapshot::Camera(camera.snapshot(enemy.id))
                    }
                })
                .collect(),
        )
    }

    /// Snapshot of a single guard, if the handle refers to one.
    #[must_use]
    pub fn guard(world: &World, id: EnemyId) -> Option<GuardSnapshot> {
        world
            .enemies
            .iter()
            .find(|enemy| enemy.id == id)
            .and_then(|enemy| match &enemy.kind {
                EnemyKind::Guard(guard) => Some(guard.snapshot(id)),
                EnemyKind::Camera(_) => None,
            })
    }

    /// Snapshot of a single camera, if the handle refers to one.
    #[must_use]
    pub fn camera(world: &World, id: EnemyId) -> Option<CameraSnapshot> {
        world
            .enemies
            .iter()
            .find(|enemy| enemy.id == id)
            .and_then(|enemy| match &enemy.kind {
                EnemyKind::Camera(camera) => Some(camera.snapshot(id)),
                EnemyKind::Guard(_) => None,
            })
    }

    /// Alert level of a guard, consumed by animation and audio cues.
    #[must_use]
    pub fn alert_level(world: &World, id: EnemyId) -> Option<AlertLevel> {
        guard(world, id).map(|snapshot| snapshot.alert)
    }

    /// Handles of all guards in insertion order.
    #[must_use]
    pub fn guard_ids(world: &World) -> Vec<EnemyId> {
        world
            .enemies
            .iter()
            .filter(|enemy| matches!(enemy.kind, EnemyKind::Guard(_)))
            .map(|enemy| enemy.id)
            .collect()
    }
}

/// Handle for the enemy at `index` in insertion order, if the index fits a handle.
fn handle_for(index: usize) -> Option<EnemyId> {
    match u32::try_from(index) {
        Ok(value) => Some(EnemyId::new(value)),
        Err(_) => {
            warn!("enemy {index} exceeds the handle range; skipped");
            None
        }
    }
}

#[derive(Clone, Debug)]
struct Enemy {
    id: EnemyId,
    kind: EnemyKind,
}

#[derive(Clone, Debug)]
enum EnemyKind {
    Guard(Guard),
    Camera(Camera),
}

#[derive(Clone, Debug)]
struct Guard {
    position: Vec2,
    facing: f32,
    alert: AlertLevel,
    target: Option<Vec2>,
    chase_timer: u32,
    patrol: PatrolRoute,
    patrol_index: usize,
    pending_meow: Option<Vec2>,
    camera_alerted: bool,
    camera_source: Option<Vec2>,
    fov: FieldOfView,
    base_force: f32,
    steering: Steering,
}

impl Guard {
    fn from_config(config: &GuardConfig) -> Self {
        Self {
            position: Vec2::from(config.position),
            facing: config.facing_degrees.to_radians(),
            alert: AlertLevel::Patrol,
            target: None,
            chase_timer: 0,
            patrol: config.patrol_route(),
            patrol_index: 0,
            pending_meow: None,
            camera_alerted: false,
            camera_source: None,
            fov: config.fov(),
            base_force: config.base_force(),
            steering: Steering::idle(),
        }
    }

    fn resolve(&mut self, resolution: AlertResolution) {
        self.alert = resolution.level;
        self.target = resolution.target;
        self.chase_timer = if resolution.level == AlertLevel::Chasing {
            resolution.chase_timer
        } else {
            0
        };
        self.patrol_index = if self.patrol.is_empty() {
            0
        } else {
            resolution.patrol_index % self.patrol.len()
        };
        if resolution.meow_consumed {
            self.pending_meow = None;
        }
    }

    /// Applies the pending steering as a velocity over `seconds`, then clears it.
    ///
    /// Steering always heads for the stored target, so a step that would carry
    /// the guard past it stops on the target instead.
    fn integrate(&mut self, seconds: f32) {
        let step = self.steering.movement * seconds;
        self.position = match self.target {
            Some(target) if step.length_squared() >= self.position.distance_squared(target) => {
                target
            }
            _ => self.position + step,
        };
        if let Some(facing) = self.steering.facing {
            self.facing = facing;
        }
        self.steering = Steering::idle();
    }

    fn snapshot(&self, id: EnemyId) -> prowl_core::GuardSnapshot {
        prowl_core::GuardSnapshot {
            id,
            position: self.position,
            facing: self.facing,
            alert: self.alert,
            target: self.target,
            chase_timer: self.chase_timer,
            patrol: self.patrol.clone(),
            patrol_index: self.patrol_index,
            pending_meow: self.pending_meow,
            camera_alerted: self.camera_alerted,
            camera_source: self.camera_source,
            fov: self.fov,
            base_force: self.base_force,
        }
    }
}

#[derive(Clone, Copy, Debug)]
struct Camera {
    position: Vec2,
    facing: f32,
    fov: FieldOfView,
    sighted: bool,
}

impl Camera {
    fn from_config(config: &CameraConfig) -> Self {
        Self {
            position: Vec2::from(config.position),
            facing: config.facing_degrees.to_radians(),
            fov: config.fov(),
            sighted: false,
        }
    }

    fn snapshot(&self, id: EnemyId) -> prowl_core::CameraSnapshot {
        prowl_core::CameraSnapshot {
            id,
            position: self.position,
            facing: self.facing,
            fov: self.fov,
            sighted: self.sighted,
        }
    }
}
