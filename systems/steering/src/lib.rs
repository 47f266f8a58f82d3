#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that converts a resolved target into a movement vector and facing.

use glam::Vec2;
use prowl_core::{
    facing_for_heading, AlertLevel, AlertResolution, GuardSnapshot, Steering, FACING_EPSILON_SQ,
};

/// Steers guards straight toward their targets; obstacles are ignored.
#[derive(Clone, Copy, Debug, Default)]
pub struct SteeringComputer;

impl SteeringComputer {
    /// Creates a new steering computer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Computes the steering for a guard after arbitration.
    #[must_use]
    pub fn steer(&self, guard: &GuardSnapshot, resolution: &AlertResolution) -> Steering {
        seek(
            guard.position,
            resolution.target,
            resolution.level,
            guard.base_force,
        )
    }
}

/// Seeks `target` from `position` at the alert level's share of `base_force`.
///
/// A missing target or one on top of the guard produces no movement. Facing
/// is only reported when the movement is large enough to avoid jitter.
#[must_use]
pub fn seek(position: Vec2, target: Option<Vec2>, level: AlertLevel, base_force: f32) -> Steering {
    let Some(direction) = target.and_then(|target| (target - position).try_normalize()) else {
        return Steering::idle();
    };

    let movement = direction * level.speed_multiplier() * base_force;
    let facing =
        (movement.length_squared() > FACING_EPSILON_SQ).then(|| facing_for_heading(movement));

    Steering { movement, facing }
}

#[cfg(test)]
mod tests {
    use super::{seek, SteeringComputer};
    use glam::Vec2;
    use prowl_core::{
        AlertLevel, AlertResolution, EnemyId, FieldOfView, GuardSnapshot, PatrolRoute, Steering,
    };
    use std::f32::consts::FRAC_PI_2;

    const FORCE: f32 = 2.5;

    #[test]
    fn magnitude_scales_with_alert_level() {
        let cases = [
            (AlertLevel::Patrol, 1.0),
            (AlertLevel::Meowed, 0.5),
            (AlertLevel::Chasing, 1.1),
            (AlertLevel::CameraAlerted, 1.5),
        ];

        for (level, multiplier) in cases {
            let steering = seek(Vec2::ZERO, Some(Vec2::new(3.0, -4.0)), level, FORCE);
            let magnitude = steering.movement.length();
            assert!(
                (magnitude - multiplier * FORCE).abs() < 1e-4,
                "{level:?} produced {magnitude}"
            );
        }
    }

    #[test]
    fn movement_points_at_target() {
        let steering = seek(
            Vec2::new(1.0, 1.0),
            Some(Vec2::new(1.0, 9.0)),
            AlertLevel::Patrol,
            FORCE,
        );

        assert!((steering.movement.normalize() - Vec2::Y).length() < 1e-6);
        let facing = steering.facing.expect("moving guard faces heading");
        assert!(facing.abs() < 1e-6);
    }

    #[test]
    fn facing_is_heading_minus_quarter_turn() {
        let steering = seek(Vec2::ZERO, Some(Vec2::X), AlertLevel::Patrol, FORCE);

        let facing = steering.facing.expect("moving guard faces heading");
        assert!((facing + FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn missing_target_produces_no_movement() {
        assert_eq!(
            seek(Vec2::ZERO, None, AlertLevel::Chasing, FORCE),
            Steering::idle()
        );
    }

    #[test]
    fn target_on_guard_produces_no_movement() {
        let position = Vec2::new(4.0, 2.0);

        assert_eq!(
            seek(position, Some(position), AlertLevel::Patrol, FORCE),
            Steering::idle()
        );
    }

    #[test]
    fn tiny_movement_keeps_current_facing() {
        let steering = seek(Vec2::ZERO, Some(Vec2::Y), AlertLevel::Meowed, 0.01);

        assert!(steering.movement.length() > 0.0);
        assert_eq!(steering.facing, None);
    }

    #[test]
    fn steer_uses_resolution_and_guard_force() {
        let guard = GuardSnapshot {
            id: EnemyId::new(0),
            position: Vec2::ZERO,
            facing: 0.0,
            alert: AlertLevel::Patrol,
            target: None,
            chase_timer: 0,
            patrol: PatrolRoute::fallback(),
            patrol_index: 0,
            pending_meow: None,
            camera_alerted: false,
            camera_source: None,
            fov: FieldOfView::default(),
            base_force: 2.0,
        };
        let resolution = AlertResolution {
            level: AlertLevel::CameraAlerted,
            target: Some(Vec2::new(0.0, -5.0)),
            chase_timer: 0,
            patrol_index: 0,
            meow_consumed: false,
        };

        let steering = SteeringComputer::new().steer(&guard, &resolution);

        assert!((steering.movement - Vec2::new(0.0, -3.0)).length() < 1e-5);
    }
}
