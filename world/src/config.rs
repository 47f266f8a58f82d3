//! Level configuration read once when a level is loaded.

use std::path::{Path, PathBuf};

use glam::Vec2;
use prowl_core::{AiTuning, FieldOfView, PatrolRoute};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const DEFAULT_FOV_DISTANCE: f32 = 7.0;
const DEFAULT_FOV_HALF_ANGLE_DEGREES: f32 = 22.5;
const DEFAULT_BASE_FORCE: f32 = 4.0;

/// Errors surfaced while loading a level before the AI ever sees it.
#[derive(Debug, Error)]
pub enum LevelConfigError {
    /// The level file could not be read.
    #[error("failed to read level file {path}")]
    Io {
        /// Path that was requested.
        path: PathBuf,
        /// Underlying I/O failure.
        #[source]
        source: std::io::Error,
    },
    /// The level contents were not valid TOML for a level.
    #[error("failed to parse level toml")]
    Parse(#[from] toml::de::Error),
    /// A numeric value fell outside its permitted range.
    #[error("{entity}: {field} must be {expectation}, found {value}")]
    InvalidValue {
        /// Entity owning the value, for example `guard 2`.
        entity: String,
        /// Name of the offending field.
        field: &'static str,
        /// Human readable description of the permitted range.
        expectation: &'static str,
        /// Value found in the configuration.
        value: f32,
    },
}

/// Complete description of a level's enemies and AI tuning.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelConfig {
    /// Where the player stands when the level starts.
    pub player_start: [f32; 2],
    /// Arbitration parameters shared by all guards.
    pub ai: AiTuning,
    /// Guards in insertion order.
    #[serde(rename = "guard")]
    pub guards: Vec<GuardConfig>,
    /// Security cameras in insertion order.
    #[serde(rename = "camera")]
    pub cameras: Vec<CameraConfig>,
}

impl Default for LevelConfig {
    fn default() -> Self {
        Self {
            player_start: [0.0, 0.0],
            ai: AiTuning::default(),
            guards: vec![GuardConfig::default()],
            cameras: Vec::new(),
        }
    }
}

impl LevelConfig {
    /// Parses and validates a level from TOML text.
    pub fn from_toml_str(contents: &str) -> Result<Self, LevelConfigError> {
        let level: Self = toml::from_str(contents)?;
        level.validate()?;
        Ok(level)
    }

    /// Reads, parses and validates a level file.
    pub fn load(path: &Path) -> Result<Self, LevelConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| LevelConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents)
    }

    /// Rejects values that the runtime would otherwise have to clamp.
    pub fn validate(&self) -> Result<(), LevelConfigError> {
        check_point("level", "player_start", self.player_start)?;

        for (index, guard) in self.guards.iter().enumerate() {
            let entity = || format!("guard {index}");
            check_point(&entity(), "position", guard.position)?;
            check_finite(&entity(), "facing_degrees", guard.facing_degrees)?;
            for point in &guard.patrol {
                check_point(&entity(), "patrol", *point)?;
            }
            check_distance(&entity(), "fov_distance", guard.fov_distance)?;
            check_half_angle(&entity(), guard.fov_half_angle_degrees)?;
            check_distance(&entity(), "base_force", guard.base_force)?;
        }

        for (index, camera) in self.cameras.iter().enumerate() {
            let entity = || format!("camera {index}");
            check_point(&entity(), "position", camera.position)?;
            check_finite(&entity(), "facing_degrees", camera.facing_degrees)?;
            check_distance(&entity(), "fov_distance", camera.fov_distance)?;
            check_half_angle(&entity(), camera.fov_half_angle_degrees)?;
        }

        Ok(())
    }

    /// Starting position of the player.
    #[must_use]
    pub fn player_start(&self) -> Vec2 {
        Vec2::from(self.player_start)
    }
}

/// Placement and tuning of a single guard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Spawn position.
    pub position: [f32; 2],
    /// Initial facing in degrees; zero looks along positive `y`.
    pub facing_degrees: f32,
    /// Patrol waypoints; an empty list selects the built-in route.
    pub patrol: Vec<[f32; 2]>,
    /// Detection distance in world units.
    pub fov_distance: f32,
    /// Half of the detection cone's opening angle in degrees.
    pub fov_half_angle_degrees: f32,
    /// Movement force before alert multipliers.
    pub base_force: f32,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            facing_degrees: 0.0,
            patrol: Vec::new(),
            fov_distance: DEFAULT_FOV_DISTANCE,
            fov_half_angle_degrees: DEFAULT_FOV_HALF_ANGLE_DEGREES,
            base_force: DEFAULT_BASE_FORCE,
        }
    }
}

impl GuardConfig {
    /// Route the guard walks, falling back to the built-in route when none is given.
    #[must_use]
    pub fn patrol_route(&self) -> PatrolRoute {
        if self.patrol.is_empty() {
            return PatrolRoute::fallback();
        }
        PatrolRoute::new(self.patrol.iter().copied().map(Vec2::from).collect())
    }

    /// Detection cone, clamped to a safe range.
    #[must_use]
    pub fn fov(&self) -> FieldOfView {
        FieldOfView::from_degrees(self.fov_distance, self.fov_half_angle_degrees)
    }

    /// Base movement force, clamped to be non-negative.
    #[must_use]
    pub fn base_force(&self) -> f32 {
        if self.base_force.is_finite() {
            self.base_force.max(0.0)
        } else {
            0.0
        }
    }
}

/// Placement and tuning of a single security camera.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Mounting position.
    pub position: [f32; 2],
    /// Facing in degrees; zero looks along positive `y`.
    pub facing_degrees: f32,
    /// Detection distance in world units.
    pub fov_distance: f32,
    /// Half of the detection cone's opening angle in degrees.
    pub fov_half_angle_degrees: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0],
            facing_degrees: 0.0,
            fov_distance: DEFAULT_FOV_DISTANCE,
            fov_half_angle_degrees: DEFAULT_FOV_HALF_ANGLE_DEGREES,
        }
    }
}

impl CameraConfig {
    /// Detection cone, clamped to a safe range.
    #[must_use]
    pub fn fov(&self) -> FieldOfView {
        FieldOfView::from_degrees(self.fov_distance, self.fov_half_angle_degrees)
    }
}

fn check_finite(entity: &str, field: &'static str, value: f32) -> Result<(), LevelConfigError> {
    if value.is_finite() {
        return Ok(());
    }
    Err(invalid(entity, field, "finite", value))
}

fn check_point(entity: &str, field: &'static str, point: [f32; 2]) -> Result<(), LevelConfigError> {
    check_finite(entity, field, point[0])?;
    check_finite(entity, field, point[1])
}

fn check_distance(entity: &str, field: &'static str, value: f32) -> Result<(), LevelConfigError> {
    if value.is_finite() && value >= 0.0 {
        return Ok(());
    }
    Err(invalid(entity, field, "finite and non-negative", value))
}

fn check_half_angle(entity: &str, value: f32) -> Result<(), LevelConfigError> {
    if (0.0..=180.0).contains(&value) {
        return Ok(());
    }
    Err(invalid(
        entity,
        "fov_half_angle_degrees",
        "between 0 and 180 degrees",
        value,
    ))
}

fn invalid(
    entity: &str,
    field: &'static str,
    expectation: &'static str,
    value: f32,
) -> LevelConfigError {
    LevelConfigError::InvalidValue {
        entity: entity.to_owned(),
        field,
        expectation,
        value,
    }
}
