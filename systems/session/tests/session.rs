use std::time::Duration;

use pulse_grid_core::{
    AbsoluteDirection, Behavior, CellBehaviors, CellIndex, Event, GridDimensions, RelativeDirection,
    StepIndex,
};
use pulse_grid_system_clock::{self as clock, Tempo};
use pulse_grid_system_seeding::Seeder;
use pulse_grid_system_session::{Config, InputError, Session};
use pulse_grid_world as world;

fn scenario_session(running: bool) -> Session {
    let seeder = Seeder::uniform(CellBehaviors::new(
        vec![AbsoluteDirection::Right.into()],
        vec![RelativeDirection::Clockwise.into()],
    ));
    let mut session = Session::new(Config::new(
        world::Config::new(GridDimensions::new(5, 5), seeder),
        clock::Config::new(Tempo::new(150.0).expect("valid tempo"), running),
    ))
    .expect("valid dimensions");
    let mut events = Vec::new();
    session.advance_step(&mut events);
    session
}

#[test]
fn out_of_range_press_is_rejected() {
    let mut session = scenario_session(false);
    let mut events = Vec::new();
    assert!(session.press_cell(24, &mut events).is_ok());
    assert_eq!(
        session.press_cell(25, &mut events),
        Err(InputError::CellOutOfRange {
            index: 25,
            rows: 5,
            columns: 5,
        })
    );
    assert_eq!(session.pending_triggers().len(), 1);
}

#[test]
fn zero_dimension_resize_is_rejected() {
    let mut session = scenario_session(false);
    let mut events = Vec::new();
    assert_eq!(
        session.request_resize(Some(0), Some(3), &mut events),
        Err(InputError::InvalidDimension { axis: "rows" })
    );
    assert_eq!(
        session.request_resize(None, Some(0), &mut events),
        Err(InputError::InvalidDimension { axis: "columns" })
    );
    assert!(events.is_empty());
    assert_eq!(session.grid().pending_rows(), None);
}

#[test]
fn resize_to_smaller_grid_applies_on_next_step() {
    let mut session = scenario_session(false);
    let mut events = Vec::new();
    session.press_cell(0, &mut events).expect("valid press");
    session.advance_step(&mut events);
    let before = session.current_step().expect("steps have run");

    session
        .request_resize(Some(3), Some(3), &mut events)
        .expect("valid resize");
    assert_eq!(session.grid_dimensions(), GridDimensions::new(5, 5));
    session.advance_step(&mut events);

    let after = StepIndex::new(before.get() + 1);
    assert_eq!(session.current_step(), Some(after));
    assert_eq!(session.grid_dimensions(), GridDimensions::new(3, 3));
    assert_eq!(session.grid().most_recent_grid_update(), Some(after));
    assert!(session.pending_triggers().is_empty());
    assert!(session.cell_snapshot(9).is_none());
    assert!(session.press_cell(9, &mut events).is_err());
}

#[test]
fn clock_drives_steps_and_sees_every_press() {
    let mut session = scenario_session(true);
    let mut events = Vec::new();

    assert_eq!(session.tick(Duration::from_millis(60), &mut events), 0);
    session.press_cell(0, &mut events).expect("valid press");
    session.press_cell(10, &mut events).expect("valid press");
    assert_eq!(session.tick(Duration::from_millis(40), &mut events), 1);

    let step = session.current_step().expect("steps have run");
    assert!(session.is_active(0, step));
    assert!(session.is_active(10, step));
    assert!(events.contains(&Event::CellsActivated {
        step,
        cells: vec![CellIndex::new(0), CellIndex::new(10)],
    }));
}

#[test]
fn stopped_clock_leaves_grid_untouched() {
    let mut session = scenario_session(true);
    let mut events = Vec::new();
    assert!(session.stop_clock());
    assert!(!session.stop_clock());
    assert_eq!(session.tick(Duration::from_secs(3), &mut events), 0);
    assert_eq!(session.current_step(), Some(StepIndex::FIRST));

    assert!(session.toggle_clock());
    assert!(!session.start_clock());
    assert_eq!(session.tick(Duration::from_millis(300), &mut events), 3);
}

#[test]
fn set_tempo_ignores_non_numeric_values() {
    let mut session = scenario_session(false);
    assert!(!session.set_tempo(f64::NAN));
    assert_eq!(session.clock().tempo().get(), 150.0);
    assert!(session.set_tempo(90.0));
    assert_eq!(
        session.clock().tempo().interval_seconds(),
        (6.0 / 90.0) * 2.5
    );
}

#[test]
fn held_snapshot_survives_later_steps() {
    let mut session = scenario_session(false);
    let mut events = Vec::new();
    session.press_cell(0, &mut events).expect("valid press");
    let held = session.grid();
    session.advance_step(&mut events);

    let held_cell = held.cell(CellIndex::new(0)).expect("cell exists");
    assert_eq!(held_cell.times_played(), 0);
    let snapshot = session.cell_snapshot(0).expect("cell exists");
    assert_eq!(snapshot.times_played, 1);
    assert_eq!(snapshot.behaviors.on_press, vec![Behavior::Absolute(AbsoluteDirection::Right)]);
}

#[test]
fn zero_initial_dimension_never_reaches_the_grid() {
    let result = Session::new(Config::new(
        world::Config::new(GridDimensions::new(0, 7), Seeder::default()),
        clock::Config::default(),
    ));
    assert_eq!(
        result.err(),
        Some(InputError::InvalidDimension { axis: "rows" })
    );
}
