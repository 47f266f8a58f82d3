#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that walks guards around their cyclic patrol routes.

use glam::Vec2;
use prowl_core::{GuardSnapshot, PatrolRoute, PATROL_ARRIVAL_RADIUS};

/// Waypoint selected for a guard together with the patrol cursor that produced it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PatrolStep {
    /// Patrol cursor after any advancement, always a valid index or zero.
    pub index: usize,
    /// Waypoint to walk toward; absent for guards without a route.
    pub waypoint: Option<Vec2>,
}

/// Computes patrol waypoints from guard snapshots.
#[derive(Clone, Copy, Debug, Default)]
pub struct PatrolPlanner;

impl PatrolPlanner {
    /// Creates a new patrol planner.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    /// Selects the waypoint the guard should walk toward this tick.
    ///
    /// Once the guard is within [`PATROL_ARRIVAL_RADIUS`] of its current
    /// waypoint the cursor advances, wrapping at the end of the route.
    #[must_use]
    pub fn compute_next_waypoint(&self, guard: &GuardSnapshot) -> PatrolStep {
        plan(&guard.patrol, guard.patrol_index, guard.position)
    }
}

fn plan(route: &PatrolRoute, index: usize, position: Vec2) -> PatrolStep {
    let Some(current) = route.waypoint(index) else {
        return PatrolStep {
            index: 0,
            waypoint: None,
        };
    };
    let index = index % route.len();

    if position.distance(current) < PATROL_ARRIVAL_RADIUS {
        let next = route.next_index(index);
        return PatrolStep {
            index: next,
            waypoint: route.waypoint(next),
        };
    }

    PatrolStep {
        index,
        waypoint: Some(current),
    }
}
