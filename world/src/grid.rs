use pulse_grid_core::{CellBehaviors, CellIndex, CellSnapshot, GridDimensions, StepIndex};
use pulse_grid_system_seeding::Seeder;

/// Static behavior configuration and play history of a single cell.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cell {
    behaviors: CellBehaviors,
    times_played: u64,
    most_recent_step_played: Option<StepIndex>,
    most_recent_step_added: StepIndex,
}

impl Cell {
    pub(crate) fn new(behaviors: CellBehaviors, added: StepIndex) -> Self {
        Self {
            behaviors,
            times_played: 0,
            most_recent_step_played: None,
            most_recent_step_added: added,
        }
    }

    /// Behavior lists consulted when the cell fires.
    #[must_use]
    pub fn behaviors(&self) -> &CellBehaviors {
        &self.behaviors
    }

    /// Number of steps on which the cell fired.
    #[must_use]
    pub const fn times_played(&self) -> u64 {
        self.times_played
    }

    /// Most recent step on which the cell fired, if ever.
    #[must_use]
    pub const fn most_recent_step_played(&self) -> Option<StepIndex> {
        self.most_recent_step_played
    }

    /// Step on which the cell slot was created.
    #[must_use]
    pub const fn most_recent_step_added(&self) -> StepIndex {
        self.most_recent_step_added
    }

    /// Reports whether the cell fired on the provided step.
    #[must_use]
    pub fn is_active(&self, at: StepIndex) -> bool {
        self.times_played > 0 && self.most_recent_step_played == Some(at)
    }

    pub(crate) fn record_play(&mut self, step: StepIndex) {
        self.times_played = self.times_played.saturating_add(1);
        self.most_recent_step_played = Some(step);
    }

    pub(crate) fn snapshot(&self, index: CellIndex) -> CellSnapshot {
        CellSnapshot {
            index,
            times_played: self.times_played,
            most_recent_step_played: self.most_recent_step_played,
            most_recent_step_added: self.most_recent_step_added,
            behaviors: self.behaviors.clone(),
        }
    }
}

/// Rectangular grid of cells plus the resize waiting for the next step.
///
/// Storage is dense: exactly `rows * columns` cells, addressed row-major.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Grid {
    dimensions: GridDimensions,
    pending_rows: Option<u32>,
    pending_columns: Option<u32>,
    step: Option<StepIndex>,
    most_recent_grid_update: Option<StepIndex>,
    cells: Vec<Cell>,
}

impl Grid {
    /// Creates an empty grid whose first step will apply `initial`.
    #[must_use]
    pub fn new(initial: GridDimensions) -> Self {
        Self {
            dimensions: GridDimensions::default(),
            pending_rows: Some(initial.rows()),
            pending_columns: Some(initial.columns()),
            step: None,
            most_recent_grid_update: None,
            cells: Vec::new(),
        }
    }

    /// Dimensions authoritative for the step about to run.
    #[must_use]
    pub const fn dimensions(&self) -> GridDimensions {
        self.dimensions
    }

    /// Row count waiting to be applied, if any.
    #[must_use]
    pub const fn pending_rows(&self) -> Option<u32> {
        self.pending_rows
    }

    /// Column count waiting to be applied, if any.
    #[must_use]
    pub const fn pending_columns(&self) -> Option<u32> {
        self.pending_columns
    }

    /// Most recently completed step, or `None` before the first step.
    #[must_use]
    pub const fn step(&self) -> Option<StepIndex> {
        self.step
    }

    /// Step on which the dimensions last changed.
    #[must_use]
    pub const fn most_recent_grid_update(&self) -> Option<StepIndex> {
        self.most_recent_grid_update
    }

    /// Cell stored at the provided index.
    #[must_use]
    pub fn cell(&self, index: CellIndex) -> Option<&Cell> {
        self.cells.get(index.as_usize())
    }

    /// Iterator over every cell paired with its index.
    pub fn iter(&self) -> impl Iterator<Item = (CellIndex, &Cell)> {
        (0..).map(CellIndex::new).zip(self.cells.iter())
    }

    /// Number of stored cells.
    #[must_use]
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Reports whether the grid stores no cells.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub(crate) fn has_pending_resize(&self) -> bool {
        self.pending_rows.is_some() || self.pending_columns.is_some()
    }

    pub(crate) fn request_resize(&mut self, rows: Option<u32>, columns: Option<u32>) {
        if rows.is_some() {
            self.pending_rows = rows;
        }
        if columns.is_some() {
            self.pending_columns = columns;
        }
    }

    pub(crate) fn cell_mut(&mut self, index: CellIndex) -> Option<&mut Cell> {
        self.cells.get_mut(index.as_usize())
    }

    pub(crate) fn set_step(&mut self, step: StepIndex) {
        self.step = Some(step);
    }

    /// Applies the pending dimensions, creating or truncating cell storage.
    ///
    /// Cells below the new bound keep their linear index and history; slots
    /// at or above the previous bound are created fresh.
    pub(crate) fn apply_pending_resize(&mut self, step: StepIndex, seeder: &Seeder) {
        let rows = self.pending_rows.take().unwrap_or(self.dimensions.rows());
        let columns = self
            .pending_columns
            .take()
            .unwrap_or(self.dimensions.columns());
        self.dimensions = GridDimensions::new(rows, columns);
        debug_assert!(
            self.dimensions.is_addressable(),
            "grid {rows}x{columns} cannot be addressed by cell indices"
        );
        self.most_recent_grid_update = Some(step);

        let target = self.dimensions.cell_count();
        if target < self.cells.len() {
            self.cells.truncate(target);
            return;
        }

        let existing = self.cells.len();
        let fresh = (0..)
            .skip(existing)
            .take(target - existing)
            .map(CellIndex::new)
            .map(|cell| Cell::new(seeder.behaviors_for(cell, step), step));
        self.cells.extend(fresh);
    }
}
