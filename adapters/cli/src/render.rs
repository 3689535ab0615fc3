use std::fmt::Write as _;

use pulse_grid_system_session::Session;

const ACTIVE: char = '#';
const QUEUED: char = '+';
const PLAYED: char = '*';
const IDLE: char = '.';

/// Draws the current grid as text, one character per cell.
///
/// `#` fired on the latest step, `+` fires on the next step, `*` fired
/// earlier, `.` never fired.
pub(crate) fn render(session: &Session) -> String {
    let grid = session.grid();
    let dimensions = grid.dimensions();
    let mut queued = vec![false; grid.len()];
    for entry in session.pending_triggers() {
        if let Some(slot) = queued.get_mut(entry.target().as_usize()) {
            *slot = true;
        }
    }

    let mut out = String::new();
    let step = grid
        .step()
        .map_or_else(|| "-".to_owned(), |step| step.get().to_string());
    let _ = writeln!(
        out,
        "step {step} | {}x{} | {} pending",
        dimensions.rows(),
        dimensions.columns(),
        session.pending_triggers().len()
    );

    for (index, cell) in grid.iter() {
        let glyph = match grid.step() {
            Some(step) if cell.is_active(step) => ACTIVE,
            _ if queued[index.as_usize()] => QUEUED,
            _ if cell.times_played() > 0 => PLAYED,
            _ => IDLE,
        };
        out.push(glyph);

        let column = index.get() % dimensions.columns().max(1);
        if column + 1 == dimensions.columns() {
            out.push('\n');
        }
    }
    out
}
