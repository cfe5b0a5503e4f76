//! The playing field: a fixed 10x20 grid of cells.
//!
//! Row 0 is the top of the board. Pieces may hang above it (negative rows)
//! while spawning; those cells are bounds-checked but never stored.

use rand::Rng;

use crate::piece::{Piece, PieceKind};

pub const BOARD_WIDTH: usize = 10;
pub const BOARD_HEIGHT: usize = 20;

#[derive(Clone, Copy, PartialEq, Eq, Debug, Default)]
pub enum Cell {
    #[default]
    Empty,
    Filled(PieceKind),
    Gray,
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        *self == Cell::Empty
    }
}

pub type Row = [Cell; BOARD_WIDTH];

const EMPTY_ROW: Row = [Cell::Empty; BOARD_WIDTH];

#[derive(Clone, PartialEq, Eq, Debug)]
pub struct Board {
    rows: Vec<Row>,
}

impl Board {
    pub fn new() -> Self {
        Self {
            rows: vec![EMPTY_ROW; BOARD_HEIGHT],
        }
    }

    /// Builds a board from explicit rows, padding with empty rows on top or
    /// dropping the topmost extras so the height is always `BOARD_HEIGHT`.
    pub fn from_rows(mut rows: Vec<Row>) -> Self {
        let excess = rows.len().saturating_sub(BOARD_HEIGHT);
        rows.drain(..excess);
        let mut padded = vec![EMPTY_ROW; BOARD_HEIGHT - rows.len()];
        padded.extend(rows);
        Self { rows: padded }
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }

    pub fn height(&self) -> usize {
        self.rows.len()
    }

    /// Cell at `(x, y)`, or `None` outside the grid.
    pub fn cell(&self, x: i16, y: i16) -> Option<Cell> {
        if x < 0 || y < 0 {
            return None;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
    }

    pub fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if let Some(slot) = self.rows.get_mut(y).and_then(|row| row.get_mut(x)) {
            *slot = cell;
        }
    }

    // ------------------------------------------------------------------------
    // Collision
    // ------------------------------------------------------------------------

    pub fn collides(&self, piece: &Piece) -> bool {
        self.collides_at(piece, 0, 0)
    }

    /// Whether `piece` shifted by `(dx, dy)` leaves the side walls, sinks
    /// below the floor, or overlaps a filled cell. Cells above the top are
    /// only checked against the walls.
    pub fn collides_at(&self, piece: &Piece, dx: i16, dy: i16) -> bool {
        piece.blocks().any(|block| {
            let x = block.x + dx;
            let y = block.y + dy;
            if x < 0 || x >= BOARD_WIDTH as i16 || y >= BOARD_HEIGHT as i16 {
                return true;
            }
            y >= 0 && !self.rows[y as usize][x as usize].is_empty()
        })
    }

    // ------------------------------------------------------------------------
    // Mutation
    // ------------------------------------------------------------------------

    /// Copies the piece's cells into the grid. Cells above row 0 are lost.
    pub fn merge(&mut self, piece: &Piece) {
        for block in piece.blocks() {
            if block.y >= 0 && block.x >= 0 {
                self.set(block.x as usize, block.y as usize, Cell::Filled(piece.kind));
            }
        }
    }

    /// Removes every full row, bottom to top, dropping the rows above.
    /// Returns how many rows were removed.
    pub fn clear_full_rows(&mut self) -> u32 {
        let mut cleared = 0;
        let mut y = self.rows.len();

        while y > 0 {
            if self.is_row_full(y - 1) {
                self.rows.remove(y - 1);
                self.rows.insert(0, EMPTY_ROW);
                cleared += 1;
                // The row above shifted into this slot; look at it again
            } else {
                y -= 1;
            }
        }

        cleared
    }

    /// Pushes a gray row with one random hole in from the bottom.
    /// Returns the hole's column.
    pub fn inject_gray_row<R: Rng + ?Sized>(&mut self, rng: &mut R) -> usize {
        let hole = rng.gen_range(0..BOARD_WIDTH);
        self.inject_gray_row_with_hole(hole);
        hole
    }

    /// Drops the top row and appends a gray row that is empty only at `hole`.
    pub fn inject_gray_row_with_hole(&mut self, hole: usize) {
        let mut row = [Cell::Gray; BOARD_WIDTH];
        if let Some(cell) = row.get_mut(hole) {
            *cell = Cell::Empty;
        }
        self.rows.remove(0);
        self.rows.push(row);
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    pub fn is_row_full(&self, y: usize) -> bool {
        self.rows
            .get(y)
            .is_some_and(|row| row.iter().all(|cell| !cell.is_empty()))
    }

    pub fn filled_in_row(&self, y: usize) -> usize {
        self.rows
            .get(y)
            .map_or(0, |row| row.iter().filter(|cell| !cell.is_empty()).count())
    }

    pub fn filled_cells(&self) -> usize {
        self.rows
            .iter()
            .flatten()
            .filter(|cell| !cell.is_empty())
            .count()
    }
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}
