use crate::geometry::Viewport;
use crate::palette::{parse_hex_color, Palette};
use crate::simulation::SimulationSession;
use crossterm::{
    cursor::{Hide, MoveTo},
    queue,
    style::{Color, Print, SetForegroundColor},
    terminal::{Clear, ClearType},
};
use std::io::{self, Write};
use tracing::warn;

/// Draws the simulation. Implementations must only read the session.
pub trait Renderer {
    fn draw_frame(&mut self, session: &SimulationSession, palette: &dyn Palette);

    /// The size of the drawing surface. The workbench lays the rule graph out on it.
    fn viewport_size(&self) -> Viewport;
}

/// Renders a window of the grid to a terminal, centered on the first ant.
///
/// Background cells are drawn as `.`, painted cells as `#` in their state color
/// and ants as `@` in their body color.
pub struct TerminalRenderer<W: Write> {
    out: W,
    columns: usize,
    rows: usize,
}

impl TerminalRenderer<io::Stdout> {
    pub fn stdout(columns: usize, rows: usize) -> TerminalRenderer<io::Stdout> {
        TerminalRenderer::new(io::stdout(), columns, rows)
    }
}

impl<W: Write> TerminalRenderer<W> {
    pub fn new(out: W, columns: usize, rows: usize) -> TerminalRenderer<W> {
        TerminalRenderer {
            out,
            columns: columns.max(1),
            rows: rows.max(1),
        }
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    fn write_frame(&mut self, session: &SimulationSession, palette: &dyn Palette) -> io::Result<()> {
        let grid = session.grid();
        let columns = self.columns.min(grid.size());
        let rows = self.rows.min(grid.size());

        // Center the window on the first ant, or on the grid when there are none
        let (center_x, center_y) = session
            .ants()
            .first()
            .map(|ant| ant.position())
            .unwrap_or((grid.size() / 2, grid.size() / 2));
        let left = center_x as i64 - (columns / 2) as i64;
        let top = center_y as i64 - (rows / 2) as i64;

        queue!(
            self.out,
            Clear(ClearType::All),
            Hide,
            MoveTo(0, 0),
            Print(format!(
                "Tick: {}  Ants: {}  {}\n",
                session.tick_count(),
                session.ants().len(),
                if session.is_running() { "running" } else { "stopped" }
            ))
        )?;

        for row in 0..rows as i64 {
            for col in 0..columns as i64 {
                let (x, y) = (grid.wrap(left + col), grid.wrap(top + row));
                let ant = session
                    .ants()
                    .iter()
                    .find(|ant| ant.position() == (x, y));

                let (symbol, color) = match ant {
                    Some(ant) => ('@', to_terminal_color(ant.color())),
                    None => match grid.get(x as i64, y as i64) {
                        0 => ('.', Color::Reset),
                        state => ('#', to_terminal_color(&palette.color_for_state(state))),
                    },
                };

                queue!(
                    self.out,
                    SetForegroundColor(color),
                    Print(symbol),
                    SetForegroundColor(Color::Reset)
                )?;
            }
            queue!(self.out, Print("\n"))?;
        }

        self.out.flush()
    }
}

impl<W: Write> Renderer for TerminalRenderer<W> {
    fn draw_frame(&mut self, session: &SimulationSession, palette: &dyn Palette) {
        if let Err(error) = self.write_frame(session, palette) {
            warn!(%error, "could not draw frame");
        }
    }

    fn viewport_size(&self) -> Viewport {
        Viewport::new(self.columns as f64, self.rows as f64)
    }
}

fn to_terminal_color(color: &str) -> Color {
    match parse_hex_color(color) {
        Some((r, g, b)) => Color::Rgb { r, g, b },
        None => Color::Reset,
    }
}
