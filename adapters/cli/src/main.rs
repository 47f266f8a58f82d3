#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that replays a guard AI scenario headlessly.

mod logging;
mod scenario;
mod simulation;

use std::{io::Write, path::PathBuf, time::Duration};

use anyhow::{ensure, Context, Result};
use clap::Parser;
use log::info;

use crate::{scenario::Scenario, simulation::Simulation};

/// Runs guards, cameras and a scripted player through a level and reports
/// what the guards did.
#[derive(Debug, Parser)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Scenario file to run; the bundled warehouse scenario when omitted
    #[arg(short, long, value_name = "PATH")]
    scenario: Option<PathBuf>,

    /// Number of ticks to simulate
    #[arg(short, long, default_value_t = 600)]
    ticks: u64,

    /// Simulation rate in ticks per second
    #[arg(long, value_name = "HZ", default_value_t = 60.0)]
    tick_rate: f64,

    /// Print a guard report every N ticks; zero prints only the summary
    #[arg(short, long, value_name = "N", default_value_t = 60)]
    report_every: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// Entry point for the Prowl command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    logging::init(args.verbose);

    let scenario = match &args.scenario {
        Some(path) => Scenario::load(path)?,
        None => Scenario::bundled()?,
    };
    let dt = tick_duration(args.tick_rate)?;
    info!("running {} ticks at {} Hz", args.ticks, args.tick_rate);

    let mut simulation = Simulation::new(scenario, dt);
    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    for _ in 0..args.ticks {
        simulation.step();
        if args.report_every > 0 && simulation.tick() % args.report_every == 0 {
            simulation
                .write_report(&mut out)
                .context("failed to write report")?;
        }
    }

    simulation
        .write_summary(&mut out)
        .context("failed to write summary")?;
    out.flush().context("failed to flush output")?;
    Ok(())
}

fn tick_duration(tick_rate: f64) -> Result<Duration> {
    ensure!(
        tick_rate.is_finite() && tick_rate > 0.0,
        "tick rate must be a positive number of ticks per second, found {tick_rate}"
    );
    Duration::try_from_secs_f64(tick_rate.recip())
        .with_context(|| format!("tick rate {tick_rate} is too low to simulate"))
}

#[cfg(test)]
mod tests {
    use super::{tick_duration, Args};
    use clap::Parser;
    use std::time::Duration;

    #[test]
    fn sixty_hertz_is_a_sixtieth_of_a_second() {
        let dt = tick_duration(60.0).expect("valid rate");

        assert!((dt.as_secs_f64() - 1.0 / 60.0).abs() < 1e-9);
    }

    #[test]
    fn non_positive_rates_are_rejected() {
        assert!(tick_duration(0.0).is_err());
        assert!(tick_duration(-5.0).is_err());
        assert!(tick_duration(f64::NAN).is_err());
        assert!(tick_duration(1e-30).is_err());
    }

    #[test]
    fn arguments_have_sensible_defaults() {
        let args = Args::try_parse_from(["prowl"]).expect("defaults parse");

        assert_eq!(args.scenario, None);
        assert_eq!(args.ticks, 600);
        assert_eq!(args.report_every, 60);
        assert!(!args.verbose);
        assert_eq!(
            tick_duration(args.tick_rate).expect("valid rate"),
            Duration::from_secs_f64(1.0 / 60.0)
        );
    }

    #[test]
    fn arguments_parse_overrides() {
        let args = Args::try_parse_from([
            "prowl",
            "--scenario",
            "level.toml",
            "--ticks",
            "30",
            "--tick-rate",
            "20",
            "--report-every",
            "0",
            "-v",
        ])
        .expect("arguments parse");

        assert_eq!(args.scenario.as_deref(), Some(std::path::Path::new("level.toml")));
        assert_eq!(args.ticks, 30);
        assert_eq!(args.tick_rate, 20.0);
        assert_eq!(args.report_every, 0);
        assert!(args.verbose);
    }
}
