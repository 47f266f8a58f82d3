//! Scenario files: a level plus the scripted player and stimuli that drive it.

use std::path::Path;

use anyhow::{bail, ensure, Context, Result};
use prowl_world::config::LevelConfig;
use serde::Deserialize;

/// Scenario used when no file is given on the command line.
const BUNDLED_SCENARIO: &str = include_str!("../scenarios/warehouse.toml");

/// Complete description of a headless run.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(default)]
pub(crate) struct Scenario {
    /// Level the run takes place in.
    pub(crate) level: LevelConfig,
    /// Scripted player movement.
    pub(crate) player: PlayerScript,
    /// Stimuli injected at fixed ticks.
    #[serde(rename = "stimulus")]
    pub(crate) stimuli: Vec<Stimulus>,
}

impl Scenario {
    /// Loads the scenario shipped with the binary.
    pub(crate) fn bundled() -> Result<Self> {
        Self::from_toml_str(BUNDLED_SCENARIO).context("bundled scenario is invalid")
    }

    /// Reads and validates a scenario file.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read scenario {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("failed to load scenario {}", path.display()))
    }

    /// Parses and validates a scenario from TOML text.
    pub(crate) fn from_toml_str(contents: &str) -> Result<Self> {
        let scenario: Self = toml::from_str(contents).context("failed to parse scenario toml")?;
        scenario
            .level
            .validate()
            .context("scenario level is invalid")?;
        scenario.validate()?;
        Ok(scenario)
    }

    fn validate(&self) -> Result<()> {
        let speed = self.player.speed;
        ensure!(
            speed.is_finite() && speed >= 0.0,
            "player speed must be finite and non-negative, found {speed}"
        );
        for point in &self.player.route {
            ensure!(
                point.iter().all(|value| value.is_finite()),
                "player route point {point:?} is not finite"
            );
        }

        let guards = self.level.guards.len();
        for stimulus in &self.stimuli {
            match *stimulus {
                Stimulus::Meow {
                    tick,
                    guard,
                    location,
                } => {
                    if guard >= guards {
                        bail!("meow at tick {tick} names guard {guard} but the level has {guards}");
                    }
                    ensure!(
                        location.iter().all(|value| value.is_finite()),
                        "meow at tick {tick} has a non-finite location"
                    );
                }
                Stimulus::Camera {
                    tick,
                    guard: Some(guard),
                    ..
                } if guard >= guards => {
                    bail!("camera alert at tick {tick} names guard {guard} but the level has {guards}");
                }
                Stimulus::Camera { .. } | Stimulus::Reset { .. } => {}
            }
        }

        Ok(())
    }
}

/// Route the player walks during a run.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default)]
pub(crate) struct PlayerScript {
    /// Walking speed in world units per second.
    pub(crate) speed: f32,
    /// Waypoints visited in order, starting from the level's player start.
    pub(crate) route: Vec<[f32; 2]>,
    /// Whether the route restarts after the last waypoint.
    pub(crate) looped: bool,
}

impl Default for PlayerScript {
    fn default() -> Self {
        Self {
            speed: 2.0,
            route: Vec::new(),
            looped: true,
        }
    }
}

/// Stimulus applied before the simulation advances to `tick`.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub(crate) enum Stimulus {
    /// A guard hears a noise.
    Meow {
        /// Tick the stimulus is applied on.
        tick: u64,
        /// Index of the guard in the level's guard list.
        guard: usize,
        /// Where the noise came from.
        location: [f32; 2],
    },
    /// A camera alert is raised or cleared outside of the level's cameras.
    Camera {
        /// Tick the stimulus is applied on.
        tick: u64,
        /// Guard index, or every guard when absent.
        #[serde(default)]
        guard: Option<usize>,
        /// Whether the alert is raised.
        active: bool,
        /// Reported player position.
        #[serde(default)]
        source: Option<[f32; 2]>,
    },
    /// The level restarts.
    Reset {
        /// Tick the stimulus is applied on.
        tick: u64,
    },
}

impl Stimulus {
    /// Tick the stimulus is scheduled for.
    pub(crate) const fn tick(&self) -> u64 {
        match *self {
            Self::Meow { tick, .. } | Self::Camera { tick, .. } | Self::Reset { tick } => tick,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{PlayerScript, Scenario, Stimulus};

    #[test]
    fn bundled_scenario_is_valid() {
        let scenario = Scenario::bundled().expect("bundled scenario parses");

        assert_eq!(scenario.level.guards.len(), 2);
        assert_eq!(scenario.level.cameras.len(), 1);
        assert!(!scenario.player.route.is_empty());
        assert!(scenario
            .stimuli
            .iter()
            .any(|stimulus| matches!(stimulus, Stimulus::Meow { guard: 1, .. })));
    }

    #[test]
    fn empty_scenario_uses_defaults() {
        let scenario = Scenario::from_toml_str("").expect("empty scenario parses");

        assert_eq!(scenario.level.guards.len(), 1);
        assert_eq!(scenario.player, PlayerScript::default());
        assert!(scenario.stimuli.is_empty());
    }

    #[test]
    fn stimuli_parse_by_kind() {
        let scenario = Scenario::from_toml_str(
            r#"
            [[stimulus]]
            kind = "meow"
            tick = 3
            guard = 0
            location = [1.0, 2.0]

            [[stimulus]]
            kind = "camera"
            tick = 5
            active = true
            source = [4.0, 4.0]

            [[stimulus]]
            kind = "reset"
            tick = 9
            "#,
        )
        .expect("scenario parses");

        assert_eq!(
            scenario.stimuli,
            vec![
                Stimulus::Meow {
                    tick: 3,
                    guard: 0,
                    location: [1.0, 2.0],
                },
                Stimulus::Camera {
                    tick: 5,
                    guard: None,
                    active: true,
                    source: Some([4.0, 4.0]),
                },
                Stimulus::Reset { tick: 9 },
            ]
        );
        let ticks: Vec<u64> = scenario.stimuli.iter().map(Stimulus::tick).collect();
        assert_eq!(ticks, vec![3, 5, 9]);
    }

    #[test]
    fn stimuli_for_unknown_guards_are_rejected() {
        let error = Scenario::from_toml_str(
            r#"
            [[stimulus]]
            kind = "meow"
            tick = 3
            guard = 4
            location = [1.0, 2.0]
            "#,
        )
        .expect_err("guard 4 does not exist");

        assert!(error.to_string().contains("guard 4"));
    }

    #[test]
    fn invalid_level_is_reported_with_context() {
        let error = Scenario::from_toml_str(
            r#"
            [[level.guard]]
            base_force = -1.0
            "#,
        )
        .expect_err("negative force is rejected");

        assert_eq!(error.to_string(), "scenario level is invalid");
        assert!(format!("{error:#}").contains("base_force"));
    }

    #[test]
    fn negative_player_speed_is_rejected() {
        let result = Scenario::from_toml_str(
            r#"
            [player]
            speed = -2.0
            "#,
        );

        assert!(result.is_err());
    }
}
