#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Command-line adapter that runs a Pulse Grid session in the terminal.

mod config;
mod render;

use std::{
    path::PathBuf,
    str::FromStr,
    thread,
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use log::{info, LevelFilter};
use pulse_grid_core::{Behavior, CellBehaviors, Event, GridDimensions};
use pulse_grid_system_clock::{self as clock, Tempo};
use pulse_grid_system_seeding::{Seeder, SeedingPolicy};
use pulse_grid_system_session::{self as session, Session};
use pulse_grid_world as world;
use simplelog::{ColorChoice, TermLogger, TerminalMode};

use self::config::{FileConfig, Overrides, RunConfig, ScheduledResize};

/// Directional signal-propagation automaton on a resizable grid.
#[derive(Debug, Parser)]
#[command(name = "pulse-grid", version)]
struct Args {
    /// TOML file providing defaults for every other option.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Number of grid rows.
    #[arg(long)]
    rows: Option<u32>,
    /// Number of grid columns.
    #[arg(long)]
    columns: Option<u32>,
    /// Tempo driving the clock; one step every (6 / tempo) * 2.5 seconds.
    #[arg(long)]
    tempo: Option<f64>,
    /// Number of steps to run after the initial sizing step.
    #[arg(long)]
    steps: Option<u64>,
    /// Cell index to press before the first trigger step. Repeatable.
    #[arg(long = "press")]
    presses: Vec<u32>,
    /// Resize request as STEP:ROWSxCOLUMNS, made once STEP has completed. Repeatable.
    #[arg(long = "resize")]
    resizes: Vec<ScheduledResize>,
    /// Seed for pseudo-random cell behaviors.
    #[arg(long, conflicts_with_all = ["on_press", "on_cell"])]
    seed: Option<u64>,
    /// Comma-separated press behaviors given to every cell.
    #[arg(long, value_delimiter = ',', requires = "on_cell")]
    on_press: Vec<Behavior>,
    /// Comma-separated propagation behaviors given to every cell.
    #[arg(long, value_delimiter = ',', requires = "on_press")]
    on_cell: Vec<Behavior>,
    /// Pace steps by the tempo in wall-clock time instead of running them back to back.
    #[arg(long)]
    realtime: bool,
    /// Log level: off, error, warn, info, debug or trace.
    #[arg(long, default_value = "warn")]
    log_level: String,
}

impl Args {
    fn overrides(&self) -> Overrides {
        let seeding = if !self.on_press.is_empty() {
            Some(SeedingPolicy::Uniform(CellBehaviors::new(
                self.on_press.clone(),
                self.on_cell.clone(),
            )))
        } else {
            self.seed.map(|seed| SeedingPolicy::Random { seed })
        };

        Overrides {
            rows: self.rows,
            columns: self.columns,
            tempo: self.tempo,
            steps: self.steps,
            presses: self.presses.clone(),
            resizes: self.resizes.clone(),
            seeding,
            realtime: self.realtime,
        }
    }
}

/// Entry point for the Pulse Grid command-line interface.
fn main() -> Result<()> {
    let args = Args::parse();
    let level = LevelFilter::from_str(&args.log_level)
        .map_err(|_| anyhow::anyhow!("unknown log level '{}'", args.log_level))?;
    TermLogger::init(
        level,
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )
    .context("failed to install terminal logger")?;

    let file = match &args.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };
    let config = RunConfig::resolve(file, args.overrides());
    run(&config)
}

fn run(config: &RunConfig) -> Result<()> {
    let tempo = Tempo::new(config.tempo)
        .with_context(|| format!("tempo must be a positive number, got {}", config.tempo))?;
    let mut session = Session::new(session::Config::new(
        world::Config::new(
            GridDimensions::new(config.rows, config.columns),
            Seeder::new(config.seeding.clone()),
        ),
        clock::Config::new(tempo, false),
    ))
    .with_context(|| format!("invalid grid size {}x{}", config.rows, config.columns))?;

    let mut events = Vec::new();
    session.advance_step(&mut events);
    for &index in &config.presses {
        session
            .press_cell(index, &mut events)
            .with_context(|| format!("cannot press cell {index}"))?;
    }
    report(&session, &mut events);

    let mut resizes = Resizes::new(&config.resizes);
    resizes.request_due(&mut session, &mut events)?;

    let last_step = config.steps;
    if config.realtime {
        run_realtime(&mut session, &mut resizes, last_step, &mut events)
    } else {
        while current_step(&session) < last_step {
            session.advance_step(&mut events);
            report(&session, &mut events);
            resizes.request_due(&mut session, &mut events)?;
        }
        Ok(())
    }
}

fn run_realtime(
    session: &mut Session,
    resizes: &mut Resizes<'_>,
    last_step: u64,
    events: &mut Vec<Event>,
) -> Result<()> {
    let _ = session.start_clock();
    let mut last_tick = Instant::now();
    while current_step(session) < last_step {
        let wait = session
            .clock()
            .until_next_step()
            .unwrap_or(Duration::ZERO);
        thread::sleep(wait);

        let now = Instant::now();
        let ran = session.tick(paced(session, now - last_tick), events);
        last_tick = now;
        if ran > 0 {
            report(session, events);
            resizes.request_due(session, events)?;
        }
    }
    let _ = session.stop_clock();
    Ok(())
}

/// Clamps elapsed time to one clock interval, so each tick runs at most one
/// step and every step is rendered before the next scheduled resize check.
fn paced(session: &Session, elapsed: Duration) -> Duration {
    elapsed.min(session.clock().interval())
}

fn current_step(session: &Session) -> u64 {
    session.current_step().map_or(0, |step| step.get())
}

fn report(session: &Session, events: &mut Vec<Event>) {
    for event in events.drain(..) {
        info!("{event:?}");
    }
    print!("{}", render::render(session));
}

/// Resize requests waiting for their step to complete, in step order.
struct Resizes<'a> {
    pending: &'a [ScheduledResize],
}

impl<'a> Resizes<'a> {
    fn new(pending: &'a [ScheduledResize]) -> Self {
        Self { pending }
    }

    fn request_due(&mut self, session: &mut Session, events: &mut Vec<Event>) -> Result<()> {
        let completed = current_step(session);
        while let Some((next, rest)) = self.pending.split_first() {
            if next.after_step > completed {
                break;
            }
            session
                .request_resize(next.rows, next.columns, events)
                .with_context(|| format!("cannot resize after step {}", next.after_step))?;
            self.pending = rest;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paced_ticks_never_batch_steps() {
        let tempo = Tempo::new(150.0).expect("valid tempo");
        let mut session = Session::new(session::Config::new(
            world::Config::default(),
            clock::Config::new(tempo, true),
        ))
        .expect("valid dimensions");
        let mut events = Vec::new();

        let late = Duration::from_secs(5);
        assert_eq!(session.tick(paced(&session, late), &mut events), 1);
        assert_eq!(session.tick(paced(&session, late), &mut events), 1);
        assert_eq!(session.current_step().map(|step| step.get()), Some(1));
    }
}
