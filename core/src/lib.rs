#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Pulse Grid engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters submit [`Command`] values
//! describing desired mutations, the world executes those commands via its
//! `apply` entry point, and then broadcasts [`Event`] values describing what
//! changed. The direction model lives in [`direction`] and is re-exported at
//! the crate root.

pub mod direction;

use serde::{Deserialize, Serialize};

pub use direction::{resolve, AbsoluteDirection, Behavior, ParseBehaviorError, RelativeDirection};

/// Largest number of cells a grid may hold so every index fits a [`CellIndex`].
pub const MAX_CELLS: u64 = u32::MAX as u64;

/// Commands that express all permissible world mutations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    /// Queues a press-origin trigger for the provided cell.
    PressCell {
        /// Cell that should fire on the next step.
        cell: CellIndex,
    },
    /// Runs the step engine once.
    AdvanceStep,
    /// Records new grid dimensions to apply on the next step.
    RequestResize {
        /// Row count to apply, or `None` to keep the current one.
        rows: Option<u32>,
        /// Column count to apply, or `None` to keep the current one.
        columns: Option<u32>,
    },
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Event {
    /// Confirms that a press was queued for the next step.
    PressQueued {
        /// Cell that was pressed.
        cell: CellIndex,
    },
    /// Confirms that a resize was recorded and awaits the next step.
    ResizeRequested {
        /// Pending row count after merging the request.
        rows: Option<u32>,
        /// Pending column count after merging the request.
        columns: Option<u32>,
    },
    /// Announces that a step applied new grid dimensions.
    GridResized {
        /// Step on which the resize took effect.
        step: StepIndex,
        /// Dimensions in effect after the resize.
        dimensions: GridDimensions,
        /// Number of pending triggers dropped by the structural step.
        discarded_triggers: usize,
    },
    /// Lists the cells activated by a step, in first-activation order.
    CellsActivated {
        /// Step on which the cells fired.
        step: StepIndex,
        /// Cells that fired, each listed once.
        cells: Vec<CellIndex>,
    },
    /// Indicates that the step index advanced.
    StepAdvanced {
        /// Index of the step that just completed.
        step: StepIndex,
        /// Number of triggers queued for the following step.
        pending_triggers: usize,
    },
}

/// Linear row-major index of a grid cell.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct CellIndex(u32);

impl CellIndex {
    /// Creates a new cell index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the index.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// Index converted for slice addressing.
    #[must_use]
    pub const fn as_usize(&self) -> usize {
        self.0 as usize
    }
}

/// Index of a discrete simulation step.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct StepIndex(u64);

impl StepIndex {
    /// The very first step a simulation runs.
    pub const FIRST: Self = Self(0);

    /// Creates a new step index with the provided numeric value.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Retrieves the numeric representation of the step.
    #[must_use]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// Step that follows `current`, where `None` means no step has run yet.
    #[must_use]
    pub const fn following(current: Option<Self>) -> Self {
        match current {
            Some(step) => Self(step.0.saturating_add(1)),
            None => Self::FIRST,
        }
    }
}

/// Row and column counts of the grid.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridDimensions {
    rows: u32,
    columns: u32,
}

impl GridDimensions {
    /// Creates a new dimension descriptor.
    #[must_use]
    pub const fn new(rows: u32, columns: u32) -> Self {
        Self { rows, columns }
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn rows(&self) -> u32 {
        self.rows
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn columns(&self) -> u32 {
        self.columns
    }

    /// Number of addressable cells.
    #[must_use]
    pub const fn cell_count(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// Reports whether both dimensions are positive and every cell index fits
    /// a [`CellIndex`].
    #[must_use]
    pub const fn is_addressable(&self) -> bool {
        self.rows > 0 && self.columns > 0 && self.rows as u64 * self.columns as u64 <= MAX_CELLS
    }

    /// Reports whether the index addresses a cell of this grid.
    #[must_use]
    pub const fn contains(&self, cell: CellIndex) -> bool {
        cell.as_usize() < self.cell_count()
    }

    /// Linear index of the cell at the provided row and column.
    #[must_use]
    pub fn index_of(&self, row: u32, column: u32) -> Option<CellIndex> {
        if row >= self.rows || column >= self.columns {
            return None;
        }
        row.checked_mul(self.columns)
            .and_then(|start| start.checked_add(column))
            .map(CellIndex::new)
    }

    /// Row and column of the provided index.
    #[must_use]
    pub fn coordinates(&self, cell: CellIndex) -> Option<(u32, u32)> {
        if self.contains(cell) {
            Some((cell.get() / self.columns, cell.get() % self.columns))
        } else {
            None
        }
    }

    /// Neighbor one cell away in `direction`, clamped at the grid edges.
    ///
    /// Returns `None` when `cell` lies outside the grid or when the step would
    /// leave it; the grid never wraps around.
    #[must_use]
    pub fn neighbor(&self, cell: CellIndex, direction: AbsoluteDirection) -> Option<CellIndex> {
        let (row, column) = self.coordinates(cell)?;
        let index = cell.get();
        match direction {
            AbsoluteDirection::Left if column > 0 => Some(CellIndex::new(index - 1)),
            AbsoluteDirection::Right if column + 1 < self.columns => {
                Some(CellIndex::new(index + 1))
            }
            AbsoluteDirection::Up if row > 0 => Some(CellIndex::new(index - self.columns)),
            AbsoluteDirection::Down if row + 1 < self.rows => {
                Some(CellIndex::new(index + self.columns))
            }
            _ => None,
        }
    }
}

/// Ordered behavior lists consulted when a cell fires.
#[derive(Clone, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CellBehaviors {
    /// Behaviors evaluated when the cell is pressed directly.
    #[serde(default)]
    pub on_press: Vec<Behavior>,
    /// Behaviors evaluated when a neighbor's signal strikes the cell.
    #[serde(default)]
    pub on_cell: Vec<Behavior>,
}

impl CellBehaviors {
    /// Creates behavior lists from the provided press and propagation lists.
    #[must_use]
    pub fn new(on_press: Vec<Behavior>, on_cell: Vec<Behavior>) -> Self {
        Self { on_press, on_cell }
    }

    /// Behavior list that applies to the provided trigger origin.
    #[must_use]
    pub fn for_origin(&self, origin: TriggerOrigin) -> &[Behavior] {
        match origin {
            TriggerOrigin::Press => &self.on_press,
            TriggerOrigin::Cell { .. } => &self.on_cell,
        }
    }
}

/// Describes what caused a pending activation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TriggerOrigin {
    /// Direct user press with no incoming direction.
    Press,
    /// Signal propagated from a neighboring cell.
    Cell {
        /// Cell that fired the signal.
        index: CellIndex,
        /// Direction the signal travelled to reach the target.
        direction: AbsoluteDirection,
    },
}

/// Pending activation awaiting the next step.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TriggerEntry {
    target: CellIndex,
    origin: TriggerOrigin,
}

impl TriggerEntry {
    /// Creates an entry for a direct press of `target`.
    #[must_use]
    pub const fn press(target: CellIndex) -> Self {
        Self {
            target,
            origin: TriggerOrigin::Press,
        }
    }

    /// Creates an entry for a signal sent from `source` toward `direction`.
    #[must_use]
    pub const fn propagated(target: CellIndex, source: CellIndex, direction: AbsoluteDirection) -> Self {
        Self {
            target,
            origin: TriggerOrigin::Cell {
                index: source,
                direction,
            },
        }
    }

    /// Cell that fires when the entry is resolved.
    #[must_use]
    pub const fn target(&self) -> CellIndex {
        self.target
    }

    /// Cause of the activation.
    #[must_use]
    pub const fn origin(&self) -> TriggerOrigin {
        self.origin
    }

    /// Cell that sent the signal, or `None` for presses.
    #[must_use]
    pub const fn triggered_by_index(&self) -> Option<CellIndex> {
        match self.origin {
            TriggerOrigin::Press => None,
            TriggerOrigin::Cell { index, .. } => Some(index),
        }
    }

    /// Direction the target was struck from, or `None` for presses.
    #[must_use]
    pub const fn triggered_by_direction(&self) -> Option<AbsoluteDirection> {
        match self.origin {
            TriggerOrigin::Press => None,
            TriggerOrigin::Cell { direction, .. } => Some(direction),
        }
    }
}

/// Immutable representation of a single cell's state used for queries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CellSnapshot {
    /// Linear index of the cell.
    pub index: CellIndex,
    /// Number of steps on which the cell fired.
    pub times_played: u64,
    /// Most recent step on which the cell fired, if ever.
    pub most_recent_step_played: Option<StepIndex>,
    /// Step on which the cell slot was created.
    pub most_recent_step_added: StepIndex,
    /// Behavior lists configured for the cell.
    pub behaviors: CellBehaviors,
}

impl CellSnapshot {
    /// Reports whether the cell fired on the provided step.
    #[must_use]
    pub fn is_active(&self, at: StepIndex) -> bool {
        self.times_played > 0 && self.most_recent_step_played == Some(at)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_mapping_is_row_major() {
        let dimensions = GridDimensions::new(3, 4);
        assert_eq!(dimensions.index_of(2, 1), Some(CellIndex::new(9)));
        assert_eq!(dimensions.coordinates(CellIndex::new(9)), Some((2, 1)));
        assert_eq!(dimensions.index_of(3, 0), None);
        assert_eq!(dimensions.coordinates(CellIndex::new(12)), None);
    }

    #[test]
    fn neighbor_clamps_at_edges() {
        let dimensions = GridDimensions::new(5, 5);
        let corner = CellIndex::new(0);
        assert_eq!(dimensions.neighbor(corner, AbsoluteDirection::Left), None);
        assert_eq!(dimensions.neighbor(corner, AbsoluteDirection::Up), None);
        assert_eq!(
            dimensions.neighbor(corner, AbsoluteDirection::Right),
            Some(CellIndex::new(1))
        );
        assert_eq!(
            dimensions.neighbor(corner, AbsoluteDirection::Down),
            Some(CellIndex::new(5))
        );

        let last_in_row = CellIndex::new(4);
        assert_eq!(dimensions.neighbor(last_in_row, AbsoluteDirection::Right), None);
        let bottom = CellIndex::new(22);
        assert_eq!(dimensions.neighbor(bottom, AbsoluteDirection::Down), None);
        assert_eq!(
            dimensions.neighbor(bottom, AbsoluteDirection::Up),
            Some(CellIndex::new(17))
        );
    }

    #[test]
    fn neighbor_of_out_of_range_cell_is_none() {
        let dimensions = GridDimensions::new(2, 2);
        assert_eq!(
            dimensions.neighbor(CellIndex::new(4), AbsoluteDirection::Left),
            None
        );
    }

    #[test]
    fn addressable_grids_are_positive_and_fit_cell_indices() {
        assert!(GridDimensions::new(5, 5).is_addressable());
        assert!(GridDimensions::new(1, u32::MAX).is_addressable());
        assert!(!GridDimensions::new(0, 5).is_addressable());
        assert!(!GridDimensions::new(5, 0).is_addressable());
        assert!(!GridDimensions::new(2, u32::MAX).is_addressable());
        assert!(!GridDimensions::new(u32::MAX, u32::MAX).is_addressable());
    }

    #[test]
    fn index_of_does_not_overflow_on_huge_grids() {
        let dimensions = GridDimensions::new(u32::MAX, u32::MAX);
        assert_eq!(dimensions.index_of(u32::MAX - 1, 3), None);
        assert_eq!(dimensions.index_of(0, 7), Some(CellIndex::new(7)));
    }

    #[test]
    fn single_row_grid_has_no_vertical_neighbors() {
        let dimensions = GridDimensions::new(1, 3);
        let middle = CellIndex::new(1);
        assert_eq!(dimensions.neighbor(middle, AbsoluteDirection::Up), None);
        assert_eq!(dimensions.neighbor(middle, AbsoluteDirection::Down), None);
    }

    #[test]
    fn step_following_none_is_first() {
        assert_eq!(StepIndex::following(None), StepIndex::FIRST);
        assert_eq!(
            StepIndex::following(Some(StepIndex::new(4))),
            StepIndex::new(5)
        );
    }

    #[test]
    fn trigger_entry_accessors_reflect_origin() {
        let press = TriggerEntry::press(CellIndex::new(3));
        assert_eq!(press.triggered_by_index(), None);
        assert_eq!(press.triggered_by_direction(), None);

        let propagated =
            TriggerEntry::propagated(CellIndex::new(4), CellIndex::new(3), AbsoluteDirection::Right);
        assert_eq!(propagated.triggered_by_index(), Some(CellIndex::new(3)));
        assert_eq!(
            propagated.triggered_by_direction(),
            Some(AbsoluteDirection::Right)
        );
    }

    #[test]
    fn snapshot_activity_requires_matching_step() {
        let snapshot = CellSnapshot {
            index: CellIndex::new(0),
            times_played: 1,
            most_recent_step_played: Some(StepIndex::new(2)),
            most_recent_step_added: StepIndex::FIRST,
            behaviors: CellBehaviors::default(),
        };
        assert!(snapshot.is_active(StepIndex::new(2)));
        assert!(!snapshot.is_active(StepIndex::new(3)));
    }

    #[test]
    fn behaviors_deserialize_from_toml() {
        let behaviors: CellBehaviors =
            toml::from_str("on_press = [\"right\"]\non_cell = [\"clockwise\", \"down\"]")
                .expect("parse behaviors");
        assert_eq!(
            behaviors,
            CellBehaviors::new(
                vec![Behavior::Absolute(AbsoluteDirection::Right)],
                vec![
                    Behavior::Relative(RelativeDirection::Clockwise),
                    Behavior::Absolute(AbsoluteDirection::Down),
                ],
            )
        );
    }
}
