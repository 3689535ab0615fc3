#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tempo-driven clock system that schedules step commands.
//!
//! The clock never touches the world. The owning application feeds it elapsed
//! time and applies the [`Command::AdvanceStep`] values it emits, the same way
//! other systems turn elapsed time into command batches.

use std::time::Duration;

use log::{debug, warn};
use pulse_grid_core::Command;

/// Tempo used when none is configured.
pub const DEFAULT_TEMPO: f64 = 120.0;

const BEATS_PER_BAR: f64 = 6.0;
const BAR_SCALE: f64 = 2.5;
const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Most steps a single [`Clock::handle`] call emits. Intervals missed beyond
/// this are dropped rather than replayed.
pub const MAX_CATCH_UP_STEPS: usize = 8;

/// Validated, strictly positive tempo.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tempo(f64);

impl Tempo {
    /// Creates a tempo, rejecting non-finite and non-positive values.
    #[must_use]
    pub fn new(value: f64) -> Option<Self> {
        (value.is_finite() && value > 0.0).then_some(Self(value))
    }

    /// Retrieves the raw tempo value.
    #[must_use]
    pub const fn get(&self) -> f64 {
        self.0
    }

    /// Seconds between two scheduled steps: `(6 / tempo) * 2.5`.
    #[must_use]
    pub fn interval_seconds(&self) -> f64 {
        (BEATS_PER_BAR / self.0) * BAR_SCALE
    }

    /// Interval between two scheduled steps, saturating for extreme tempos.
    #[must_use]
    pub fn interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.interval_seconds()).unwrap_or(Duration::MAX)
    }
}

impl Default for Tempo {
    fn default() -> Self {
        Self(DEFAULT_TEMPO)
    }
}

/// Configuration parameters required to construct the clock.
#[derive(Clone, Copy, Debug, Default)]
pub struct Config {
    tempo: Tempo,
    running: bool,
}

impl Config {
    /// Creates a configuration with the starting tempo and run state.
    #[must_use]
    pub const fn new(tempo: Tempo, running: bool) -> Self {
        Self { tempo, running }
    }
}

/// Cancellable periodic schedule that emits one step command per interval.
#[derive(Debug)]
pub struct Clock {
    tempo: Tempo,
    running: bool,
    accumulator: Duration,
}

impl Clock {
    /// Creates a new clock using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            tempo: config.tempo,
            running: config.running,
            accumulator: Duration::ZERO,
        }
    }

    /// Current tempo.
    #[must_use]
    pub const fn tempo(&self) -> Tempo {
        self.tempo
    }

    /// Reports whether the clock is scheduling steps.
    #[must_use]
    pub const fn is_running(&self) -> bool {
        self.running
    }

    /// Interval actually used for scheduling, never shorter than one millisecond.
    #[must_use]
    pub fn interval(&self) -> Duration {
        self.tempo.interval().max(MIN_INTERVAL)
    }

    /// Time remaining until the next scheduled step, or `None` when stopped.
    #[must_use]
    pub fn until_next_step(&self) -> Option<Duration> {
        self.running
            .then(|| self.interval().saturating_sub(self.accumulator))
    }

    /// Replaces the tempo when `value` is finite and positive.
    ///
    /// Time accumulated toward the previous interval is discarded, so the old
    /// schedule is cancelled before the new one starts. Invalid values leave
    /// the clock untouched and return `false`.
    pub fn set_tempo(&mut self, value: f64) -> bool {
        let Some(tempo) = Tempo::new(value) else {
            debug!("ignoring invalid tempo {value}");
            return false;
        };
        self.tempo = tempo;
        self.accumulator = Duration::ZERO;
        debug!(
            "tempo set to {value}, stepping every {:.4}s",
            tempo.interval_seconds()
        );
        true
    }

    /// Starts scheduling steps. Returns `false` when already running.
    pub fn start(&mut self) -> bool {
        if self.running {
            return false;
        }
        self.running = true;
        self.accumulator = Duration::ZERO;
        debug!("clock started");
        true
    }

    /// Stops scheduling steps. Returns `false` when already stopped.
    pub fn stop(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.running = false;
        self.accumulator = Duration::ZERO;
        debug!("clock stopped");
        true
    }

    /// Flips between running and stopped, returning the new run state.
    pub fn toggle(&mut self) -> bool {
        if self.running {
            let _ = self.stop();
        } else {
            let _ = self.start();
        }
        self.running
    }

    /// Consumes elapsed time and emits one step command per completed interval.
    ///
    /// At most [`MAX_CATCH_UP_STEPS`] commands are emitted per call. When more
    /// intervals have elapsed, the surplus and the partial interval are
    /// discarded and the schedule restarts from now.
    pub fn handle(&mut self, elapsed: Duration, out: &mut Vec<Command>) {
        if !self.running || elapsed.is_zero() {
            return;
        }

        self.accumulator = self.accumulator.saturating_add(elapsed);
        let interval = self.interval();
        let mut emitted = 0;
        while self.accumulator >= interval {
            if emitted == MAX_CATCH_UP_STEPS {
                let missed = self.accumulator.as_nanos() / interval.as_nanos();
                warn!("clock fell behind, dropping {missed} missed steps");
                self.accumulator = Duration::ZERO;
                break;
            }
            self.accumulator -= interval;
            out.push(Command::AdvanceStep);
            emitted += 1;
        }
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(Config::default())
    }
}
