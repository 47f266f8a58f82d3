#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that resolves a guard's alert level and target once per tick.
//!
//! Arbitration reads an immutable guard snapshot and returns an
//! [`AlertResolution`]; it never mutates state itself. Rules are evaluated in
//! a fixed order and the first matching rule wins:
//!
//! 1. the player was sighted this tick: start or refresh a chase;
//! 2. chasing with time left: count down while tracking the live player;
//! 3. chasing with the timer spent: return to patrol;
//! 4. a meow is pending: investigate it;
//! 5. meowed and standing on the noise: return to patrol;
//! 6. a camera alert is raised: respond to the camera;
//! 7. camera-alerted without an alert: apply the [`CameraAlertPolicy`];
//! 8. patrolling: take the next patrol waypoint;
//! 9. otherwise keep the current state.

use glam::Vec2;
use prowl_core::{
    AiTuning, AlertLevel, AlertResolution, CameraAlertPolicy, GuardSnapshot, MEOW_ARRIVAL_RADIUS,
};
use prowl_system_patrol::PatrolPlanner;

/// Resolves alert levels according to the configured tuning.
#[derive(Clone, Copy, Debug, Default)]
pub struct AlertArbiter {
    tuning: AiTuning,
    patrol: PatrolPlanner,
}

impl AlertArbiter {
    /// Creates an arbiter using the provided tuning.
    #[must_use]
    pub fn new(tuning: AiTuning) -> Self {
        Self {
            tuning,
            patrol: PatrolPlanner::new(),
        }
    }

    /// Resolves the alert state the guard should hold after this tick.
    ///
    /// While chasing, the target follows the live player position rather than
    /// the position where the player was last seen.
    #[must_use]
    pub fn resolve(&self, guard: &GuardSnapshot, sighted: bool, player: Vec2) -> AlertResolution {
        let meow_pending = guard.pending_meow.is_some();

        if sighted {
            return AlertResolution {
                level: AlertLevel::Chasing,
                target: Some(player),
                chase_timer: self.tuning.chase_ticks,
                patrol_index: guard.patrol_index,
                meow_consumed: meow_pending,
            };
        }

        if guard.alert == AlertLevel::Chasing {
            if guard.chase_timer > 0 {
                return AlertResolution {
                    level: AlertLevel::Chasing,
                    target: Some(player),
                    chase_timer: guard.chase_timer - 1,
                    patrol_index: guard.patrol_index,
                    meow_consumed: meow_pending,
                };
            }
            return AlertResolution {
                meow_consumed: meow_pending,
                ..stand_down(guard)
            };
        }

        if let Some(location) = guard.pending_meow {
            return AlertResolution {
                level: AlertLevel::Meowed,
                target: Some(location),
                chase_timer: 0,
                patrol_index: guard.patrol_index,
                meow_consumed: true,
            };
        }

        if guard.alert == AlertLevel::Meowed && reached_noise(guard) {
            return stand_down(guard);
        }

        if guard.camera_alerted {
            return AlertResolution {
                level: AlertLevel::CameraAlerted,
                target: guard.camera_source.or(guard.target),
                chase_timer: 0,
                patrol_index: guard.patrol_index,
                meow_consumed: false,
            };
        }

        if guard.alert == AlertLevel::CameraAlerted
            && self.tuning.camera_alert_policy == CameraAlertPolicy::Release
        {
            return stand_down(guard);
        }

        if guard.alert == AlertLevel::Patrol {
            let step = self.patrol.compute_next_waypoint(guard);
            return AlertResolution {
                level: AlertLevel::Patrol,
                target: step.waypoint,
                chase_timer: 0,
                patrol_index: step.index,
                meow_consumed: false,
            };
        }

        hold(guard)
    }
}

/// Returns to patrol with no target; the planner picks one on the next tick.
fn stand_down(guard: &GuardSnapshot) -> AlertResolution {
    AlertResolution {
        level: AlertLevel::Patrol,
        target: None,
        chase_timer: 0,
        patrol_index: guard.patrol_index,
        meow_consumed: false,
    }
}

fn hold(guard: &GuardSnapshot) -> AlertResolution {
    AlertResolution {
        level: guard.alert,
        target: guard.target,
        chase_timer: guard.chase_timer,
        patrol_index: guard.patrol_index,
        meow_consumed: false,
    }
}

fn reached_noise(guard: &GuardSnapshot) -> bool {
    guard
        .target
        .map_or(true, |target| guard.position.distance(target) < MEOW_ARRIVAL_RADIUS)
}
