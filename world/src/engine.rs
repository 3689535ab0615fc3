use log::{debug, trace, warn};
use pulse_grid_core::{resolve, CellIndex, StepIndex, TriggerEntry};
use pulse_grid_system_seeding::Seeder;

use crate::{Grid, TriggerQueue};

/// Result of running the step engine once.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StepOutcome {
    /// Grid published for the completed step.
    pub grid: Grid,
    /// Activations queued for the following step.
    pub queue: TriggerQueue,
    /// Whether the step applied a resize instead of evaluating triggers.
    pub resized: bool,
    /// Cells that fired on the step, each listed once in first-activation order.
    pub activated: Vec<CellIndex>,
    /// Number of queued triggers dropped because the step resized the grid.
    pub discarded_triggers: usize,
}

/// Computes the next grid and trigger queue from the current ones.
///
/// A step either applies a pending resize (always the case for the first
/// step) and discards the queue, or resolves every queued trigger in order.
/// Each trigger fans out independently, but a cell struck several times on
/// one step is only counted as played once.
///
/// Entries must target cells inside `grid`. Debug builds assert this;
/// release builds drop offending entries.
#[must_use]
pub fn step(grid: &Grid, queue: &TriggerQueue, seeder: &Seeder) -> StepOutcome {
    let current = StepIndex::following(grid.step());
    let mut next = grid.clone();
    next.set_step(current);

    if grid.step().is_none() || grid.has_pending_resize() {
        next.apply_pending_resize(current, seeder);
        debug!(
            "step {}: grid resized to {}x{}, {} queued triggers discarded",
            current.get(),
            next.dimensions().rows(),
            next.dimensions().columns(),
            queue.len()
        );
        return StepOutcome {
            grid: next,
            queue: TriggerQueue::new(),
            resized: true,
            activated: Vec::new(),
            discarded_triggers: queue.len(),
        };
    }

    let dimensions = grid.dimensions();
    let mut next_queue = TriggerQueue::new();
    let mut marked = vec![false; grid.len()];
    let mut activated = Vec::new();

    for entry in queue.entries() {
        let target = entry.target();
        debug_assert!(
            dimensions.contains(target),
            "trigger targets cell {} outside a {}x{} grid",
            target.get(),
            dimensions.rows(),
            dimensions.columns()
        );
        let Some(cell) = grid.cell(target) else {
            warn!(
                "step {}: dropping trigger for cell {} outside the grid",
                current.get(),
                target.get()
            );
            continue;
        };

        let incoming = entry.triggered_by_direction();
        for behavior in cell.behaviors().for_origin(entry.origin()) {
            let Some(direction) = resolve(incoming, *behavior) else {
                continue;
            };
            if let Some(neighbor) = dimensions.neighbor(target, direction) {
                next_queue.push(TriggerEntry::propagated(neighbor, target, direction));
            }
        }

        let slot = &mut marked[target.as_usize()];
        if !*slot {
            *slot = true;
            activated.push(target);
        }
    }

    for index in &activated {
        if let Some(cell) = next.cell_mut(*index) {
            cell.record_play(current);
        }
    }

    trace!(
        "step {}: {} triggers resolved, {} cells fired, {} queued",
        current.get(),
        queue.len(),
        activated.len(),
        next_queue.len()
    );

    StepOutcome {
        grid: next,
        queue: next_queue,
        resized: false,
        activated,
        discarded_triggers: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pulse_grid_core::{
        AbsoluteDirection, CellBehaviors, GridDimensions, RelativeDirection,
    };

    fn uniform(on_press: AbsoluteDirection, on_cell: RelativeDirection) -> Seeder {
        Seeder::uniform(CellBehaviors::new(vec![on_press.into()], vec![on_cell.into()]))
    }

    fn sized(rows: u32, columns: u32, seeder: &Seeder) -> Grid {
        step(
            &Grid::new(GridDimensions::new(rows, columns)),
            &TriggerQueue::new(),
            seeder,
        )
        .grid
    }

    #[test]
    fn first_step_applies_initial_size() {
        let seeder = Seeder::default();
        let queue: TriggerQueue = [TriggerEntry::press(CellIndex::new(0))].into_iter().collect();
        let outcome = step(&Grid::new(GridDimensions::new(5, 5)), &queue, &seeder);
        assert!(outcome.resized);
        assert_eq!(outcome.grid.dimensions(), GridDimensions::new(5, 5));
        assert_eq!(outcome.grid.len(), 25);
        assert_eq!(outcome.grid.step(), Some(StepIndex::FIRST));
        assert_eq!(outcome.grid.most_recent_grid_update(), Some(StepIndex::FIRST));
        assert!(outcome.queue.is_empty());
        assert_eq!(outcome.discarded_triggers, 1);
    }

    #[test]
    fn step_leaves_input_untouched() {
        let seeder = uniform(AbsoluteDirection::Right, RelativeDirection::Forward);
        let grid = sized(2, 2, &seeder);
        let queue: TriggerQueue = [TriggerEntry::press(CellIndex::new(0))].into_iter().collect();
        let before = grid.clone();
        let outcome = step(&grid, &queue, &seeder);
        assert_eq!(grid, before);
        assert_ne!(outcome.grid, before);
    }

    #[test]
    fn relative_press_behavior_fans_out_nothing() {
        let seeder = Seeder::uniform(CellBehaviors::new(
            vec![RelativeDirection::Forward.into()],
            Vec::new(),
        ));
        let grid = sized(3, 3, &seeder);
        let queue: TriggerQueue = [TriggerEntry::press(CellIndex::new(4))].into_iter().collect();
        let outcome = step(&grid, &queue, &seeder);
        assert!(outcome.queue.is_empty());
        assert_eq!(outcome.activated, vec![CellIndex::new(4)]);
    }

    #[test]
    fn multiple_behaviors_queue_in_list_order() {
        let seeder = Seeder::uniform(CellBehaviors::new(
            vec![AbsoluteDirection::Down.into(), AbsoluteDirection::Right.into()],
            Vec::new(),
        ));
        let grid = sized(3, 3, &seeder);
        let queue: TriggerQueue = [TriggerEntry::press(CellIndex::new(4))].into_iter().collect();
        let outcome = step(&grid, &queue, &seeder);
        assert_eq!(
            outcome.queue.entries(),
            &[
                TriggerEntry::propagated(CellIndex::new(7), CellIndex::new(4), AbsoluteDirection::Down),
                TriggerEntry::propagated(CellIndex::new(5), CellIndex::new(4), AbsoluteDirection::Right),
            ]
        );
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "trigger targets cell 99 outside a 2x2 grid")]
    fn out_of_range_trigger_fails_debug_assertion() {
        let seeder = uniform(AbsoluteDirection::Right, RelativeDirection::Forward);
        let grid = sized(2, 2, &seeder);
        let queue: TriggerQueue = [TriggerEntry::press(CellIndex::new(99))].into_iter().collect();
        let _ = step(&grid, &queue, &seeder);
    }

    #[test]
    #[cfg(not(debug_assertions))]
    fn out_of_range_trigger_is_dropped_in_release() {
        let seeder = uniform(AbsoluteDirection::Right, RelativeDirection::Forward);
        let grid = sized(2, 2, &seeder);
        let queue: TriggerQueue = [
            TriggerEntry::press(CellIndex::new(99)),
            TriggerEntry::press(CellIndex::new(0)),
        ]
        .into_iter()
        .collect();
        let outcome = step(&grid, &queue, &seeder);
        assert_eq!(outcome.activated, vec![CellIndex::new(0)]);
        assert_eq!(
            outcome.queue.entries(),
            &[TriggerEntry::propagated(CellIndex::new(1), CellIndex::new(0), AbsoluteDirection::Right)]
        );
    }
}
