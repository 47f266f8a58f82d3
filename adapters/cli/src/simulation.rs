//! Fixed-timestep driver that feeds scripted input to the world and the guard AI.

use std::{collections::BTreeMap, io::Write, time::Duration};

use glam::Vec2;
use log::{info, warn};
use prowl_core::{AlertLevel, Command, EnemyId, Event};
use prowl_system_guard_ai::GuardAi;
use prowl_world::{self as world, query, World};

use crate::scenario::{PlayerScript, Scenario, Stimulus};

/// Headless run of a scenario.
#[derive(Debug)]
pub(crate) struct Simulation {
    world: World,
    ai: GuardAi,
    dt: Duration,
    tick: u64,
    walker: PlayerWalker,
    stimuli: Vec<Stimulus>,
    next_stimulus: usize,
    guards: Vec<EnemyId>,
    stats: BTreeMap<EnemyId, GuardStats>,
}

/// Alert history of a single guard over the run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
struct GuardStats {
    transitions: u32,
    chases: u32,
}

impl Simulation {
    /// Builds the world described by the scenario.
    pub(crate) fn new(scenario: Scenario, dt: Duration) -> Self {
        let Scenario {
            level,
            player,
            mut stimuli,
        } = scenario;
        stimuli.sort_by_key(Stimulus::tick);

        let ai = GuardAi::new(level.ai);
        let walker = PlayerWalker::new(level.player_start(), &player);
        let world = World::from_level(level);
        let guards = query::guard_ids(&world);
        info!(
            "loaded level with {} guards and {} cameras",
            guards.len(),
            query::level(&world).cameras.len()
        );

        Self {
            world,
            ai,
            dt,
            tick: 0,
            walker,
            stimuli,
            next_stimulus: 0,
            stats: guards
                .iter()
                .map(|id| (*id, GuardStats::default()))
                .collect(),
            guards,
        }
    }

    /// Number of ticks simulated so far; resets do not rewind it.
    pub(crate) const fn tick(&self) -> u64 {
        self.tick
    }

    /// Advances the run by one tick.
    pub(crate) fn step(&mut self) {
        self.tick += 1;

        let mut commands = Vec::new();
        self.queue_stimuli(&mut commands);
        if let Some(position) = self.walker.advance(self.dt.as_secs_f32()) {
            commands.push(Command::MovePlayer { position });
        }
        self.apply_all(commands);

        let mut events = Vec::new();
        world::apply(&mut self.world, Command::Tick { dt: self.dt }, &mut events);

        let mut commands = Vec::new();
        self.ai.handle(
            &events,
            &query::enemy_view(&self.world),
            &query::tick_context(&self.world),
            &mut commands,
        );
        self.record(&events);
        self.apply_all(commands);
    }

    /// Writes the position, alert level and target of every guard.
    pub(crate) fn write_report(&self, out: &mut impl Write) -> std::io::Result<()> {
        let player = query::player_position(&self.world);
        writeln!(
            out,
            "tick {:>5}  player {}",
            self.tick,
            format_point(Some(player))
        )?;
        for guard in query::enemy_view(&self.world).guards() {
            writeln!(
                out,
                "  guard {:>2}  {}  {:<14}  target {}",
                guard.id.get(),
                format_point(Some(guard.position)),
                guard.alert.label(),
                format_point(guard.target)
            )?;
        }
        Ok(())
    }

    /// Writes the final alert level and alert history of every guard.
    pub(crate) fn write_summary(&self, out: &mut impl Write) -> std::io::Result<()> {
        writeln!(out, "summary after {} ticks", self.tick)?;
        for id in &self.guards {
            let stats = self.stats.get(id).copied().unwrap_or_default();
            let alert = query::alert_level(&self.world, *id).unwrap_or_default();
            writeln!(
                out,
                "  guard {:>2}  final {:<14}  transitions {:>4}  chases {:>3}",
                id.get(),
                alert.label(),
                stats.transitions,
                stats.chases
            )?;
        }
        Ok(())
    }

    fn queue_stimuli(&mut self, commands: &mut Vec<Command>) {
        while let Some(stimulus) = self.stimuli.get(self.next_stimulus).copied() {
            if stimulus.tick() > self.tick {
                break;
            }
            self.next_stimulus += 1;

            match stimulus {
                Stimulus::Meow {
                    guard, location, ..
                } => {
                    if let Some(id) = self.guard_id(guard) {
                        self.ai.notify_meow(id, Vec2::from(location), commands);
                    }
                }
                Stimulus::Camera {
                    guard,
                    active,
                    source,
                    ..
                } => {
                    let targets = match guard {
                        Some(index) => self.guard_id(index).into_iter().collect(),
                        None => self.guards.clone(),
                    };
                    for id in targets {
                        self.ai
                            .notify_camera_alert(id, active, source.map(Vec2::from), commands);
                    }
                }
                Stimulus::Reset { .. } => {
                    commands.push(Command::ResetLevel);
                    self.walker.reset();
                }
            }
        }
    }

    fn guard_id(&self, index: usize) -> Option<EnemyId> {
        let id = self.guards.get(index).copied();
        if id.is_none() {
            warn!("stimulus names guard {index} which does not exist; ignored");
        }
        id
    }

    fn apply_all(&mut self, commands: Vec<Command>) {
        let mut events = Vec::new();
        for command in commands {
            world::apply(&mut self.world, command, &mut events);
        }
        self.record(&events);
    }

    fn record(&mut self, events: &[Event]) {
        for event in events {
            match event {
                Event::AlertLevelChanged { guard, to, .. } => {
                    let stats = self.stats.entry(*guard).or_default();
                    stats.transitions += 1;
                    if *to == AlertLevel::Chasing {
                        stats.chases += 1;
                    }
                }
                Event::LevelReset => info!("level reset at tick {}", self.tick),
                _ => {}
            }
        }
    }
}

fn format_point(point: Option<Vec2>) -> String {
    match point {
        Some(point) => format!("({:>7.2}, {:>7.2})", point.x, point.y),
        None => "none".to_owned(),
    }
}

/// Walks the player along the scripted route at a constant speed.
#[derive(Clone, Debug)]
struct PlayerWalker {
    start: Vec2,
    route: Vec<Vec2>,
    speed: f32,
    looped: bool,
    position: Vec2,
    index: usize,
    finished: bool,
}

impl PlayerWalker {
    fn new(start: Vec2, script: &PlayerScript) -> Self {
        Self {
            start,
            route: script.route.iter().copied().map(Vec2::from).collect(),
            speed: script.speed,
            looped: script.looped,
            position: start,
            index: 0,
            finished: false,
        }
    }

    fn reset(&mut self) {
        self.position = self.start;
        self.index = 0;
        self.finished = false;
    }

    /// Moves the player and returns the new position when it changed.
    fn advance(&mut self, seconds: f32) -> Option<Vec2> {
        if self.finished || self.route.is_empty() {
            return None;
        }

        let before = self.position;
        let mut budget = self.speed * seconds;

        // A full lap at most, so degenerate routes cannot spin forever.
        for _ in 0..=self.route.len() {
            if budget <= 0.0 {
                break;
            }
            let waypoint = self.route[self.index];
            let distance = self.position.distance(waypoint);
            if distance > budget {
                self.position += (waypoint - self.position) / distance * budget;
                break;
            }

            self.position = waypoint;
            budget -= distance;
            if self.index + 1 < self.route.len() {
                self.index += 1;
            } else if self.looped {
                self.index = 0;
            } else {
                self.finished = true;
                break;
            }
        }

        (self.position != before).then_some(self.position)
    }
}
