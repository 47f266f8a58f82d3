#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Orchestrating system that runs the guard AI pipeline once per tick.
//!
//! For every guard, in the level's insertion order, the controller tests
//! sight, arbitrates the alert level and converts the result into steering.
//! Guards only read the shared [`TickContext`], never each other's results, so
//! the order is reproducible and the output of one guard cannot leak into
//! another within the same tick. Security cameras are scanned in the same pass
//! and raise camera alerts that guards observe on the following tick.

use glam::Vec2;
use log::trace;
use prowl_core::{
    AiTuning, CameraSnapshot, Command, EnemyId, EnemySnapshot, EnemyView, Event, GuardSnapshot,
    TickContext,
};
use prowl_system_alert::AlertArbiter;
use prowl_system_perception::Perception;
use prowl_system_steering::SteeringComputer;

/// Guard AI controller that reacts to ticks with alert and steering commands.
#[derive(Clone, Copy, Debug, Default)]
pub struct GuardAi {
    perception: Perception,
    arbiter: AlertArbiter,
    steering: SteeringComputer,
}

impl GuardAi {
    /// Creates a controller whose arbitration follows `tuning`.
    #[must_use]
    pub fn new(tuning: AiTuning) -> Self {
        Self {
            perception: Perception::new(),
            arbiter: AlertArbiter::new(tuning),
            steering: SteeringComputer::new(),
        }
    }

    /// Consumes world events and emits commands when simulated time advanced.
    pub fn handle(
        &self,
        events: &[Event],
        enemies: &EnemyView,
        context: &TickContext,
        out: &mut Vec<Command>,
    ) {
        if !events
            .iter()
            .any(|event| matches!(event, Event::TimeAdvanced { .. }))
        {
            return;
        }

        self.tick(enemies, context, out);
    }

    /// Runs one pass over every enemy, regardless of the event stream.
    pub fn tick(&self, enemies: &EnemyView, context: &TickContext, out: &mut Vec<Command>) {
        let mut cameras_before = false;
        let mut cameras_now = false;

        for enemy in enemies.iter() {
            match enemy {
                EnemySnapshot::Guard(guard) => self.update_guard(guard, context, out),
                EnemySnapshot::Camera(camera) => {
                    let sighted = self.scan_camera(camera, context, out);
                    cameras_before |= camera.sighted;
                    cameras_now |= sighted;
                }
            }
        }

        if cameras_before != cameras_now {
            let source = cameras_now.then_some(context.player);
            for guard in enemies.guards() {
                self.perception
                    .notify_camera_alert(guard.id, cameras_now, source, out);
            }
        }
    }

    /// Forwards a meow heard by `guard` at `location`.
    pub fn notify_meow(&self, guard: EnemyId, location: Vec2, out: &mut Vec<Command>) {
        self.perception.notify_meow(guard, location, out);
    }

    /// Forwards a camera alert raised or cleared for `guard` by another subsystem.
    pub fn notify_camera_alert(
        &self,
        guard: EnemyId,
        active: bool,
        source: Option<Vec2>,
        out: &mut Vec<Command>,
    ) {
        self.perception
            .notify_camera_alert(guard, active, source, out);
    }

    fn update_guard(&self, guard: &GuardSnapshot, context: &TickContext, out: &mut Vec<Command>) {
        let sighted = self.perception.test_sighting(guard, context.player);
        if sighted {
            trace!("guard {} sees the player on tick {}", guard.id.get(), context.tick);
        }

        let resolution = self.arbiter.resolve(guard, sighted, context.player);
        let steering = self.steering.steer(guard, &resolution);

        out.push(Command::ResolveAlert {
            guard: guard.id,
            resolution,
        });
        out.push(Command::SteerGuard {
            guard: guard.id,
            steering,
        });
    }

    fn scan_camera(
        &self,
        camera: &CameraSnapshot,
        context: &TickContext,
        out: &mut Vec<Command>,
    ) -> bool {
        let sighted = self.perception.camera_sees(camera, context.player);
        if sighted != camera.sighted {
            out.push(Command::RecordCameraSighting {
                camera: camera.id,
                sighted,
            });
        }
        sighted
    }
}
