#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Prowl guard simulation.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and the pure guard AI systems. Adapters submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable [`EnemyView`] snapshots, and respond exclusively with new
//! command batches.

use std::{f32::consts::FRAC_PI_2, sync::Arc, time::Duration};

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Number of ticks a guard keeps chasing after it last saw the player.
pub const MAX_CHASE_TICKS: u32 = 60;

/// Distance below which a guard counts as having reached a patrol waypoint.
pub const PATROL_ARRIVAL_RADIUS: f32 = 0.5;

/// Distance below which a meowed guard counts as having reached the noise.
pub const MEOW_ARRIVAL_RADIUS: f32 = 0.1;

/// Squared movement magnitude required before a guard turns to face its heading.
pub const FACING_EPSILON_SQ: f32 = 0.0001;

/// Patrol route assigned to guards whose level omits one.
pub const DEFAULT_PATROL_ROUTE: [Vec2; 2] = [Vec2::new(1.0, 8.0), Vec2::new(14.0, 8.0)];

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Moves the player to a new location reported by input handling.
    MovePlayer {
        /// Position of the player after moving.
        position: Vec2,
    },
    /// Reports a noise the guard should investigate.
    NotifyMeow {
        /// Guard that heard the noise.
        guard: EnemyId,
        /// Location the noise originated from.
        location: Vec2,
    },
    /// Raises or clears the security camera alert flag on a guard.
    NotifyCameraAlert {
        /// Guard receiving the alert.
        guard: EnemyId,
        /// Whether a camera currently reports the player.
        active: bool,
        /// Position the camera reported, when known.
        source: Option<Vec2>,
    },
    /// Records whether a security camera currently sees the player.
    RecordCameraSighting {
        /// Camera whose sighting state changed.
        camera: EnemyId,
        /// Whether the camera sees the player.
        sighted: bool,
    },
    /// Stores the outcome of alert arbitration for a guard.
    ResolveAlert {
        /// Guard whose alert state was resolved.
        guard: EnemyId,
        /// Resolved alert state.
        resolution: AlertResolution,
    },
    /// Hands a steering output to physics integration.
    SteerGuard {
        /// Guard being steered.
        guard: EnemyId,
        /// Movement vector and optional facing produced this tick.
        steering: Steering,
    },
    /// Rebuilds every enemy from the level configuration, discarding AI state.
    ResetLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Index of the tick that just started.
        tick: u64,
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player position changed.
    PlayerMoved {
        /// Position of the player after moving.
        position: Vec2,
    },
    /// Confirms that a guard registered a meow stimulus.
    MeowHeard {
        /// Guard that heard the noise.
        guard: EnemyId,
        /// Location of the noise.
        location: Vec2,
    },
    /// Confirms that a guard's camera alert flag changed.
    CameraAlertChanged {
        /// Guard whose flag changed.
        guard: EnemyId,
        /// New value of the flag.
        active: bool,
    },
    /// Announces that a security camera gained or lost sight of the player.
    CameraSightingChanged {
        /// Camera whose state changed.
        camera: EnemyId,
        /// Whether the camera now sees the player.
        sighted: bool,
    },
    /// Announces a guard transition between alert levels.
    AlertLevelChanged {
        /// Guard that transitioned.
        guard: EnemyId,
        /// Alert level before the transition.
        from: AlertLevel,
        /// Alert level after the transition.
        to: AlertLevel,
    },
    /// Publishes the movement command applied to a guard this tick.
    GuardSteered {
        /// Guard that was steered.
        guard: EnemyId,
        /// Steering output handed to physics integration.
        steering: Steering,
    },
    /// Announces that every enemy was rebuilt from the level configuration.
    LevelReset,
}

/// Stable handle addressing an enemy within the world arena.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct EnemyId(u32);

impl EnemyId {
    /// Creates a new enemy identifier with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the identifier.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }
}

/// Behavioural mode of a guard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertLevel {
    /// Walking the patrol route.
    #[default]
    Patrol,
    /// Investigating a noise.
    Meowed,
    /// Responding to a security camera report.
    CameraAlerted,
    /// Pursuing the player.
    Chasing,
}

impl AlertLevel {
    /// Multiplier applied to a guard's base movement force at this level.
    #[must_use]
    pub const fn speed_multiplier(self) -> f32 {
        match self {
            Self::Patrol => 1.0,
            Self::Meowed => 0.5,
            Self::CameraAlerted => 1.5,
            Self::Chasing => 1.1,
        }
    }

    /// Short lowercase label used by reports and logs.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Patrol => "patrol",
            Self::Meowed => "meowed",
            Self::CameraAlerted => "camera_alerted",
            Self::Chasing => "chasing",
        }
    }
}

/// Decides what happens to a camera-alerted guard once no camera reports the player.
///
/// Guards never had an explicit way out of the camera alert other than
/// spotting the player, so `Sticky` keeps that behaviour and `Release` is
/// provided for levels that want guards to stand down.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CameraAlertPolicy {
    /// The guard stays camera-alerted until a sighting overrides it.
    #[default]
    Sticky,
    /// The guard returns to patrol as soon as the alert flag is cleared.
    Release,
}

/// Tunable parameters of alert arbitration.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Ticks a guard keeps chasing after losing sight of the player.
    pub chase_ticks: u32,
    /// Rule applied when a camera alert flag is cleared.
    pub camera_alert_policy: CameraAlertPolicy,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            chase_ticks: MAX_CHASE_TICKS,
            camera_alert_policy: CameraAlertPolicy::default(),
        }
    }
}

/// Detection cone of a guard or camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FieldOfView {
    distance: f32,
    half_angle: f32,
}

impl FieldOfView {
    /// Creates a field of view, clamping malformed values to a safe range.
    ///
    /// Negative or non-finite distances collapse to zero and the half angle is
    /// kept within `0..=PI` radians.
    #[must_use]
    pub fn new(distance: f32, half_angle: f32) -> Self {
        let distance = if distance.is_finite() {
            distance.max(0.0)
        } else {
            0.0
        };
        let half_angle = if half_angle.is_nan() {
            0.0
        } else {
            half_angle.clamp(0.0, std::f32::consts::PI)
        };
        Self {
            distance,
            half_angle,
        }
    }

    /// Creates a field of view with the half angle expressed in degrees.
    #[must_use]
    pub fn from_degrees(distance: f32, half_angle_degrees: f32) -> Self {
        Self::new(distance, half_angle_degrees.to_radians())
    }

    /// Maximum detection distance in world units.
    #[must_use]
    pub const fn distance(&self) -> f32 {
        self.distance
    }

    /// Half of the cone's opening angle in radians.
    #[must_use]
    pub const fn half_angle(&self) -> f32 {
        self.half_angle
    }
}

impl Default for FieldOfView {
    fn default() -> Self {
        Self::from_degrees(7.0, 22.5)
    }
}

/// Unit vector a sprite with the provided facing angle looks along.
///
/// Facing zero looks along positive `y`, matching sprites drawn pointing up.
#[must_use]
pub fn facing_direction(facing: f32) -> Vec2 {
    Vec2::from_angle(facing + FRAC_PI_2)
}

/// Facing angle that points a sprite along `heading`.
#[must_use]
pub fn facing_for_heading(heading: Vec2) -> f32 {
    heading.y.atan2(heading.x) - FRAC_PI_2
}

/// Cyclic patrol route shared between a guard and its snapshots.
#[derive(Clone, Debug, PartialEq)]
pub struct PatrolRoute {
    waypoints: Arc<[Vec2]>,
}

impl PatrolRoute {
    /// Creates a route visiting the provided waypoints in order.
    ///
    /// An empty list produces a stationary guard.
    #[must_use]
    pub fn new(waypoints: Vec<Vec2>) -> Self {
        Self {
            waypoints: waypoints.into(),
        }
    }

    /// Creates the built-in two point route.
    #[must_use]
    pub fn fallback() -> Self {
        Self::new(DEFAULT_PATROL_ROUTE.to_vec())
    }

    /// Number of waypoints on the route.
    #[must_use]
    pub fn len(&self) -> usize {
        self.waypoints.len()
    }

    /// Reports whether the route has no waypoints.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.waypoints.is_empty()
    }

    /// Waypoint at `index`, wrapping around the route.
    #[must_use]
    pub fn waypoint(&self, index: usize) -> Option<Vec2> {
        if self.waypoints.is_empty() {
            return None;
        }
        self.waypoints.get(index % self.waypoints.len()).copied()
    }

    /// Index following `index`, wrapping around the route.
    #[must_use]
    pub fn next_index(&self, index: usize) -> usize {
        if self.waypoints.is_empty() {
            return 0;
        }
        (index % self.waypoints.len() + 1) % self.waypoints.len()
    }

    /// Ordered waypoints of the route.
    #[must_use]
    pub fn waypoints(&self) -> &[Vec2] {
        &self.waypoints
    }
}

impl Default for PatrolRoute {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Movement vector and facing produced for a guard in a single tick.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Steering {
    /// Force to apply, already scaled by the alert speed multiplier.
    pub movement: Vec2,
    /// Facing angle to adopt, absent when the guard is essentially stationary.
    pub facing: Option<f32>,
}

impl Steering {
    /// Steering output that leaves the guard standing still.
    #[must_use]
    pub const fn idle() -> Self {
        Self {
            movement: Vec2::ZERO,
            facing: None,
        }
    }
}

/// Alert state resolved for a guard by arbitration.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AlertResolution {
    /// Alert level the guard should adopt.
    pub level: AlertLevel,
    /// Point the guard should move toward, if any.
    pub target: Option<Vec2>,
    /// Remaining chase ticks; zero outside of a chase.
    pub chase_timer: u32,
    /// Patrol cursor after any waypoint advancement.
    pub patrol_index: usize,
    /// Whether the pending meow stimulus was consumed.
    pub meow_consumed: bool,
}

/// Immutable representation of a single guard's state used for queries.
#[derive(Clone, Debug, PartialEq)]
pub struct GuardSnapshot {
    /// Handle of the guard.
    pub id: EnemyId,
    /// Current position, owned by physics integration.
    pub position: Vec2,
    /// Current facing angle in radians, owned by physics integration.
    pub facing: f32,
    /// Current alert level.
    pub alert: AlertLevel,
    /// Current target, if any.
    pub target: Option<Vec2>,
    /// Remaining chase ticks.
    pub chase_timer: u32,
    /// Route walked while patrolling.
    pub patrol: PatrolRoute,
    /// Cursor into the patrol route.
    pub patrol_index: usize,
    /// Meow location waiting to be arbitrated.
    pub pending_meow: Option<Vec2>,
    /// Whether a camera alert is currently raised for the guard.
    pub camera_alerted: bool,
    /// Last position reported by a camera alert.
    pub camera_source: Option<Vec2>,
    /// Detection cone.
    pub fov: FieldOfView,
    /// Movement force before the alert multiplier.
    pub base_force: f32,
}

/// Immutable representation of a security camera.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CameraSnapshot {
    /// Handle of the camera.
    pub id: EnemyId,
    /// Mounting position.
    pub position: Vec2,
    /// Facing angle in radians.
    pub facing: f32,
    /// Detection cone.
    pub fov: FieldOfView,
    /// Whether the camera saw the player on its previous scan.
    pub sighted: bool,
}

/// Snapshot of a single enemy, tagged by behaviour.
#[derive(Clone, Debug, PartialEq)]
pub enum EnemySnapshot {
    /// Mobile guard driven by the guard AI.
    Guard(GuardSnapshot),
    /// Static camera that raises alerts for guards.
    Camera(CameraSnapshot),
}

impl EnemySnapshot {
    /// Handle of the enemy.
    #[must_use]
    pub fn id(&self) -> EnemyId {
        match self {
            Self::Guard(guard) => guard.id,
            Self::Camera(camera) => camera.id,
        }
    }

    /// Reports whether the enemy runs guard behaviour.
    #[must_use]
    pub fn has_guard_behavior(&self) -> bool {
        matches!(self, Self::Guard(_))
    }

    /// Guard state, when the enemy is a guard.
    #[must_use]
    pub fn as_guard(&self) -> Option<&GuardSnapshot> {
        match self {
            Self::Guard(guard) => Some(guard),
            Self::Camera(_) => None,
        }
    }

    /// Camera state, when the enemy is a camera.
    #[must_use]
    pub fn as_camera(&self) -> Option<&CameraSnapshot> {
        match self {
            Self::Camera(camera) => Some(camera),
            Self::Guard(_) => None,
        }
    }
}

/// Read-only snapshot describing all enemies in the level.
#[derive(Clone, Debug, Default)]
pub struct EnemyView {
    snapshots: Vec<EnemySnapshot>,
}

impl EnemyView {
    /// Creates a new enemy view from the provided snapshots.
    ///
    /// Handles are allocated in insertion order, so sorting by handle keeps
    /// the level's insertion order.
    #[must_use]
    pub fn from_snapshots(mut snapshots: Vec<EnemySnapshot>) -> Self {
        snapshots.sort_by_key(EnemySnapshot::id);
        Self { snapshots }
    }

    /// Iterator over the captured snapshots in deterministic order.
    pub fn iter(&self) -> impl Iterator<Item = &EnemySnapshot> {
        self.snapshots.iter()
    }

    /// Iterator over the guards in deterministic order.
    pub fn guards(&self) -> impl Iterator<Item = &GuardSnapshot> {
        self.snapshots.iter().filter_map(EnemySnapshot::as_guard)
    }

    /// Iterator over the cameras in deterministic order.
    pub fn cameras(&self) -> impl Iterator<Item = &CameraSnapshot> {
        self.snapshots.iter().filter_map(EnemySnapshot::as_camera)
    }

    /// Consumes the view, yielding the underlying snapshots.
    #[must_use]
    pub fn into_vec(self) -> Vec<EnemySnapshot> {
        self.snapshots
    }
}

/// Per-tick inputs shared by every guard, passed explicitly to the AI.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TickContext {
    /// Index of the tick being simulated.
    pub tick: u64,
    /// Position of the player this tick.
    pub player: Vec2,
}

impl TickContext {
    /// Creates a tick context.
    #[must_use]
    pub const fn new(tick: u64, player: Vec2) -> Self {
        Self { tick, player }
    }
}

#[cfg(test)]
mod tests {
    use super::{
        facing_direction, facing_for_heading, AiTuning, AlertLevel, CameraAlertPolicy,
        CameraSnapshot, EnemyId, EnemySnapshot, EnemyView, FieldOfView, GuardSnapshot,
        PatrolRoute, MAX_CHASE_TICKS,
    };
    use glam::Vec2;

    #[test]
    fn speed_multipliers_match_alert_levels() {
        assert_eq!(AlertLevel::Patrol.speed_multiplier(), 1.0);
        assert_eq!(AlertLevel::Meowed.speed_multiplier(), 0.5);
        assert_eq!(AlertLevel::CameraAlerted.speed_multiplier(), 1.5);
        assert_eq!(AlertLevel::Chasing.speed_multiplier(), 1.1);
    }

    #[test]
    fn field_of_view_clamps_malformed_values() {
        let fov = FieldOfView::new(-3.0, 10.0);
        assert_eq!(fov.distance(), 0.0);
        assert_eq!(fov.half_angle(), std::f32::consts::PI);

        let fov = FieldOfView::new(f32::NAN, f32::NAN);
        assert_eq!(fov.distance(), 0.0);
        assert_eq!(fov.half_angle(), 0.0);
    }

    #[test]
    fn default_field_of_view_is_seven_units_and_quarter_octant() {
        let fov = FieldOfView::default();
        assert_eq!(fov.distance(), 7.0);
        assert!((fov.half_angle() - 22.5_f32.to_radians()).abs() < 1e-6);
    }

    #[test]
    fn patrol_route_wraps_indices() {
        let route = PatrolRoute::new(vec![Vec2::ZERO, Vec2::X, Vec2::Y]);
        assert_eq!(route.waypoint(4), Some(Vec2::X));
        assert_eq!(route.next_index(2), 0);
        assert_eq!(route.next_index(7), 2);
    }

    #[test]
    fn empty_patrol_route_has_no_waypoints() {
        let route = PatrolRoute::new(Vec::new());
        assert!(route.is_empty());
        assert_eq!(route.waypoint(0), None);
        assert_eq!(route.next_index(3), 0);
    }

    #[test]
    fn fallback_route_has_two_points() {
        let route = PatrolRoute::default();
        assert_eq!(
            route.waypoints(),
            &[Vec2::new(1.0, 8.0), Vec2::new(14.0, 8.0)]
        );
    }

    #[test]
    fn facing_conventions_agree() {
        for heading in [Vec2::X, Vec2::Y, Vec2::new(-3.0, 4.0), Vec2::NEG_Y] {
            let facing = facing_for_heading(heading);
            let direction = facing_direction(facing);
            assert!((direction - heading.normalize()).length() < 1e-5);
        }
        assert!((facing_direction(0.0) - Vec2::Y).length() < 1e-6);
    }

    #[test]
    fn snapshots_expose_guard_capability_by_variant() {
        let guard = EnemySnapshot::Guard(GuardSnapshot {
            id: EnemyId::new(1),
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
            base_force: 1.0,
        });
        let camera = EnemySnapshot::Camera(CameraSnapshot {
            id: EnemyId::new(0),
            position: Vec2::ONE,
            facing: 0.0,
            fov: FieldOfView::default(),
            sighted: false,
        });

        assert!(guard.has_guard_behavior());
        assert!(guard.as_guard().is_some());
        assert!(guard.as_camera().is_none());
        assert!(!camera.has_guard_behavior());
        assert!(camera.as_guard().is_none());
        assert!(camera.as_camera().is_some());

        let view = EnemyView::from_snapshots(vec![guard, camera]);
        let order: Vec<bool> = view.iter().map(EnemySnapshot::has_guard_behavior).collect();
        assert_eq!(order, vec![false, true]);
    }

    #[test]
    fn ai_tuning_fills_missing_fields_with_defaults() {
        let tuning: AiTuning = toml::from_str("camera_alert_policy = \"release\"").expect("parse");
        assert_eq!(tuning.chase_ticks, MAX_CHASE_TICKS);
        assert_eq!(tuning.camera_alert_policy, CameraAlertPolicy::Release);
    }
}
