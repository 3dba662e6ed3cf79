use tracing::warn;

/// Largest side length a grid can have. Larger sizes are clamped to it.
pub const MAX_GRID_SIZE: usize = 2048;

/// A square toroidal grid of cell states.
///
/// Coordinates never go out of bounds: both axes wrap modulo the side length,
/// so `get(-1, 0)` reads the last column of the first row.
#[derive(Clone, Debug, PartialEq)]
pub struct Grid {
    size: usize,
    cells: Vec<u32>,
}

impl Grid {
    /// Creates a grid with every cell in state 0.
    ///
    /// The side length is clamped to `1..=MAX_GRID_SIZE`.
    pub fn new(size: usize) -> Grid {
        let size = if size == 0 {
            warn!("grid size must be at least 1, using 1");
            1
        } else if size > MAX_GRID_SIZE {
            warn!(size, max = MAX_GRID_SIZE, "grid size too large, using the maximum");
            MAX_GRID_SIZE
        } else {
            size
        };

        Grid {
            size,
            cells: vec![0; size * size],
        }
    }

    pub fn get(&self, x: i64, y: i64) -> u32 {
        self.cells[self.index(x, y)]
    }

    pub fn set(&mut self, x: i64, y: i64, state: u32) {
        let index = self.index(x, y);
        self.cells[index] = state;
    }

    /// Sets every cell back to state 0.
    pub fn reset(&mut self) {
        self.cells.fill(0);
    }

    pub fn size(&self) -> usize {
        self.size
    }

    /// Normalizes a single coordinate into `[0, size)`.
    pub fn wrap(&self, value: i64) -> usize {
        value.rem_euclid(self.size as i64) as usize
    }

    pub fn row(&self, y: i64) -> &[u32] {
        let start = self.wrap(y) * self.size;
        &self.cells[start..start + self.size]
    }

    /// The largest state currently painted on the grid.
    pub fn max_state(&self) -> u32 {
        self.cells.iter().copied().max().unwrap_or(0)
    }

    /// All cells that are not in state 0 as `(x, y, state)`.
    ///
    /// Linear in the number of cells, which is fine for the grid sizes we run interactively.
    pub fn painted(&self) -> Vec<(usize, usize, u32)> {
        self.cells
            .iter()
            .enumerate()
            .filter(|(_, state)| **state != 0)
            .map(|(index, state)| (index % self.size, index / self.size, *state))
            .collect()
    }

    fn index(&self, x: i64, y: i64) -> usize {
        self.wrap(y) * self.size + self.wrap(x)
    }
}
