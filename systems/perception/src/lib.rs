#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that tests whether guards and cameras can see the player and
//! turns external stimuli into world commands.
//!
//! Sight is a cone test only: walls and props do not block vision.

use glam::Vec2;
use prowl_core::{facing_direction, CameraSnapshot, Command, EnemyId, FieldOfView, GuardSnapshot};

/// Field-of-view tests and stimulus entry points.
#[derive(Clone, Copy, Debug, Default)]
pub struct Perception;

impl Perception {
    /// Creates a new perception system.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Reports whether the guard sees the player this tick.
    #[must_use]
    pub fn test_sighting(&self, guard: &GuardSnapshot, player: Vec2) -> bool {
        in_field_of_view(guard.position, guard.facing, guard.fov, player)
    }

    /// Reports whether the camera sees the player this tick.
    #[must_use]
    pub fn camera_sees(&self, camera: &CameraSnapshot, player: Vec2) -> bool {
        in_field_of_view(camera.position, camera.facing, camera.fov, player)
    }

    /// Queues a meow stimulus for the guard to investigate.
    pub fn notify_meow(&self, guard: EnemyId, location: Vec2, out: &mut Vec<Command>) {
        out.push(Command::NotifyMeow { guard, location });
    }

    /// Queues a change of the guard's camera alert flag.
    pub fn notify_camera_alert(
        &self,
        guard: EnemyId,
        active: bool,
        source: Option<Vec2>,
        out: &mut Vec<Command>,
    ) {
        out.push(Command::NotifyCameraAlert {
            guard,
            active,
            source,
        });
    }
}

/// Tests whether `point` lies inside the cone anchored at `origin`.
///
/// The point is visible when it is no farther than the cone's distance and
/// its bearing from the facing direction does not exceed the half angle. A
/// point on top of the origin is always visible.
#[must_use]
pub fn in_field_of_view(origin: Vec2, facing: f32, fov: FieldOfView, point: Vec2) -> bool {
    let offset = point - origin;
    let distance = offset.length();
    if distance.is_nan() || distance > fov.distance() {
        return false;
    }
    if distance <= f32::EPSILON {
        return true;
    }

    let bearing = facing_direction(facing).angle_between(offset).abs();
    bearing <= fov.half_angle()
}
