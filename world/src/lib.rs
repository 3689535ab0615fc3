#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative grid state management for Pulse Grid.
//!
//! The world owns the current [`Grid`] snapshot and the live [`TriggerQueue`].
//! Every step replaces the snapshot wholesale with the output of the pure
//! [`step`] function, so a reader holding an older `Arc<Grid>` never observes
//! a partially updated grid.

mod engine;
mod grid;
mod queue;

use std::sync::Arc;

use log::debug;
use pulse_grid_core::{Command, Event, GridDimensions, StepIndex, TriggerEntry};
use pulse_grid_system_seeding::Seeder;

pub use engine::{step, StepOutcome};
pub use grid::{Cell, Grid};
pub use queue::TriggerQueue;

const DEFAULT_GRID_ROWS: u32 = 5;
const DEFAULT_GRID_COLUMNS: u32 = 5;

/// Configuration parameters required to construct a world.
#[derive(Clone, Debug)]
pub struct Config {
    dimensions: GridDimensions,
    seeder: Seeder,
}

impl Config {
    /// Creates a configuration with the initial grid size and seeding system.
    #[must_use]
    pub fn new(dimensions: GridDimensions, seeder: Seeder) -> Self {
        Self { dimensions, seeder }
    }

    /// Grid size applied by the first step.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(
            GridDimensions::new(DEFAULT_GRID_ROWS, DEFAULT_GRID_COLUMNS),
            Seeder::default(),
        )
    }
}

/// Represents the authoritative Pulse Grid state.
#[derive(Debug)]
pub struct World {
    grid: Arc<Grid>,
    queue: TriggerQueue,
    seeder: Seeder,
}

impl World {
    /// Creates a new world whose first step applies the configured size.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            grid: Arc::new(Grid::new(config.dimensions)),
            queue: TriggerQueue::new(),
            seeder: config.seeder,
        }
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Commands are assumed to be validated: presses must address a cell of the
/// current grid and resize dimensions must be positive.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::PressCell { cell } => {
            world.queue.push(TriggerEntry::press(cell));
            out_events.push(Event::PressQueued { cell });
        }
        Command::RequestResize { rows, columns } => {
            let grid = Arc::make_mut(&mut world.grid);
            grid.request_resize(rows, columns);
            debug!(
                "resize requested: rows {:?}, columns {:?}",
                grid.pending_rows(),
                grid.pending_columns()
            );
            out_events.push(Event::ResizeRequested {
                rows: grid.pending_rows(),
                columns: grid.pending_columns(),
            });
        }
        Command::AdvanceStep => {
            let outcome = step(&world.grid, &world.queue, &world.seeder);
            let current = StepIndex::following(world.grid.step());

            if outcome.resized {
                out_events.push(Event::GridResized {
                    step: current,
                    dimensions: outcome.grid.dimensions(),
                    discarded_triggers: outcome.discarded_triggers,
                });
            } else if !outcome.activated.is_empty() {
                out_events.push(Event::CellsActivated {
                    step: current,
                    cells: outcome.activated,
                });
            }

            out_events.push(Event::StepAdvanced {
                step: current,
                pending_triggers: outcome.queue.len(),
            });
            world.grid = Arc::new(outcome.grid);
            world.queue = outcome.queue;
        }
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::sync::Arc;

    use super::{Grid, World};
    use pulse_grid_core::{CellIndex, CellSnapshot, GridDimensions, StepIndex, TriggerEntry};

    /// Shares the current immutable grid snapshot.
    #[must_use]
    pub fn grid(world: &World) -> Arc<Grid> {
        Arc::clone(&world.grid)
    }

    /// Most recently completed step, or `None` before the first step.
    #[must_use]
    pub fn current_step(world: &World) -> Option<StepIndex> {
        world.grid.step()
    }

    /// Dimensions authoritative for the next step.
    #[must_use]
    pub fn grid_dimensions(world: &World) -> GridDimensions {
        world.grid.dimensions()
    }

    /// Dimensions the next step will run with once pending requests apply.
    #[must_use]
    pub fn pending_dimensions(world: &World) -> GridDimensions {
        let current = world.grid.dimensions();
        GridDimensions::new(
            world.grid.pending_rows().unwrap_or(current.rows()),
            world.grid.pending_columns().unwrap_or(current.columns()),
        )
    }

    /// Captures the state of the cell at `index`, if it exists.
    #[must_use]
    pub fn cell_snapshot(world: &World, index: CellIndex) -> Option<CellSnapshot> {
        world.grid.cell(index).map(|cell| cell.snapshot(index))
    }

    /// Reports whether the cell at `index` fired on step `at`.
    #[must_use]
    pub fn is_active(world: &World, index: CellIndex, at: StepIndex) -> bool {
        world
            .grid
            .cell(index)
            .is_some_and(|cell| cell.is_active(at))
    }

    /// Activations waiting for the next step, in resolution order.
    #[must_use]
    pub fn pending_triggers(world: &World) -> &[TriggerEntry] {
        world.queue.entries()
    }
}
