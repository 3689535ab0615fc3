#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Session facade that validates collaborator input before it reaches the world.
//!
//! Rendering adapters talk to a [`Session`] only: they press cells, advance or
//! clock steps, request resizes and read back cell history. Everything that
//! passes validation is forwarded to the world as a [`Command`].

use std::{sync::Arc, time::Duration};

use log::debug;
use pulse_grid_core::{
    CellIndex, CellSnapshot, Command, Event, GridDimensions, StepIndex, TriggerEntry,
};
use pulse_grid_system_clock::{self as clock, Clock};
use pulse_grid_world::{self as world, query, Grid, World};
use thiserror::Error;

/// Reasons collaborator input is rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Error)]
pub enum InputError {
    /// The pressed index does not address a cell of the current grid.
    #[error("cell {index} is outside the {rows}x{columns} grid")]
    CellOutOfRange {
        /// Index that was pressed.
        index: u32,
        /// Current row count.
        rows: u32,
        /// Current column count.
        columns: u32,
    },
    /// A resize requested a dimension of zero.
    #[error("grid {axis} must be positive")]
    InvalidDimension {
        /// Name of the rejected dimension.
        axis: &'static str,
    },
    /// The grid would hold more cells than a cell index can address.
    #[error("a {rows}x{columns} grid exceeds the addressable cell range")]
    GridTooLarge {
        /// Requested row count.
        rows: u32,
        /// Requested column count.
        columns: u32,
    },
}

fn validate_dimensions(dimensions: GridDimensions) -> Result<(), InputError> {
    if dimensions.rows() == 0 {
        return Err(InputError::InvalidDimension { axis: "rows" });
    }
    if dimensions.columns() == 0 {
        return Err(InputError::InvalidDimension { axis: "columns" });
    }
    if !dimensions.is_addressable() {
        return Err(InputError::GridTooLarge {
            rows: dimensions.rows(),
            columns: dimensions.columns(),
        });
    }
    Ok(())
}

/// Configuration parameters required to construct a session.
#[derive(Clone, Debug, Default)]
pub struct Config {
    world: world::Config,
    clock: clock::Config,
}

impl Config {
    /// Creates a configuration from the world and clock configurations.
    #[must_use]
    pub fn new(world: world::Config, clock: clock::Config) -> Self {
        Self { world, clock }
    }
}

/// Owns the world and its clock and exposes the collaborator-facing operations.
#[derive(Debug)]
pub struct Session {
    world: World,
    clock: Clock,
}

impl Session {
    /// Creates a new session; the first step applies the configured grid size.
    ///
    /// The configured size must be positive in both dimensions and small
    /// enough for every cell to have an index.
    pub fn new(config: Config) -> Result<Self, InputError> {
        validate_dimensions(config.world.dimensions())?;
        Ok(Self {
            world: World::new(config.world),
            clock: Clock::new(config.clock),
        })
    }

    /// Queues a press of the cell at `index` for the next step.
    pub fn press_cell(&mut self, index: u32, out: &mut Vec<Event>) -> Result<(), InputError> {
        let dimensions = query::grid_dimensions(&self.world);
        let cell = CellIndex::new(index);
        if !dimensions.contains(cell) {
            return Err(InputError::CellOutOfRange {
                index,
                rows: dimensions.rows(),
                columns: dimensions.columns(),
            });
        }
        world::apply(&mut self.world, Command::PressCell { cell }, out);
        Ok(())
    }

    /// Runs the step engine once and publishes the new snapshot.
    pub fn advance_step(&mut self, out: &mut Vec<Event>) {
        world::apply(&mut self.world, Command::AdvanceStep, out);
    }

    /// Records new dimensions to apply on the next step.
    ///
    /// Each dimension is optional and independent. Zero is rejected, as is a
    /// combination with more cells than an index can address.
    pub fn request_resize(
        &mut self,
        rows: Option<u32>,
        columns: Option<u32>,
        out: &mut Vec<Event>,
    ) -> Result<(), InputError> {
        let pending = query::pending_dimensions(&self.world);
        validate_dimensions(GridDimensions::new(
            rows.unwrap_or(pending.rows()),
            columns.unwrap_or(pending.columns()),
        ))?;
        world::apply(&mut self.world, Command::RequestResize { rows, columns }, out);
        Ok(())
    }

    /// Replaces the tempo when `value` is finite and positive; otherwise ignores it.
    pub fn set_tempo(&mut self, value: f64) -> bool {
        self.clock.set_tempo(value)
    }

    /// Starts the clock. Returns `false` when it was already running.
    pub fn start_clock(&mut self) -> bool {
        self.clock.start()
    }

    /// Stops the clock. Returns `false` when it was already stopped.
    pub fn stop_clock(&mut self) -> bool {
        self.clock.stop()
    }

    /// Flips the clock's run state, returning whether it now runs.
    pub fn toggle_clock(&mut self) -> bool {
        self.clock.toggle()
    }

    /// Feeds elapsed time to the clock and runs every step it schedules.
    ///
    /// Returns the number of steps that ran.
    pub fn tick(&mut self, elapsed: Duration, out: &mut Vec<Event>) -> usize {
        let mut commands = Vec::new();
        self.clock.handle(elapsed, &mut commands);
        let scheduled = commands.len();
        if scheduled > 1 {
            debug!("clock caught up {scheduled} steps");
        }
        for command in commands {
            world::apply(&mut self.world, command, out);
        }
        scheduled
    }

    /// Read-only access to the clock.
    #[must_use]
    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Most recently completed step, or `None` before the first step.
    #[must_use]
    pub fn current_step(&self) -> Option<StepIndex> {
        query::current_step(&self.world)
    }

    /// Dimensions authoritative for the next step.
    #[must_use]
    pub fn grid_dimensions(&self) -> GridDimensions {
        query::grid_dimensions(&self.world)
    }

    /// Captures the state of the cell at `index`, if it exists.
    #[must_use]
    pub fn cell_snapshot(&self, index: u32) -> Option<CellSnapshot> {
        query::cell_snapshot(&self.world, CellIndex::new(index))
    }

    /// Reports whether the cell at `index` fired on step `at`.
    #[must_use]
    pub fn is_active(&self, index: u32, at: StepIndex) -> bool {
        query::is_active(&self.world, CellIndex::new(index), at)
    }

    /// Shares the current immutable grid snapshot.
    #[must_use]
    pub fn grid(&self) -> Arc<Grid> {
        query::grid(&self.world)
    }

    /// Activations waiting for the next step.
    #[must_use]
    pub fn pending_triggers(&self) -> &[TriggerEntry] {
        query::pending_triggers(&self.world)
    }
}
