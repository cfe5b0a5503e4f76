use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::{SPAWN_X, SPAWN_Y};

// ============================================================================
// Types
// ============================================================================

/// Largest side of any shape in the catalog (the I piece).
pub const MAX_SHAPE_SIDE: usize = 4;

pub type Rgb = (u8, u8, u8);

pub const GRAY_COLOR: Rgb = (0x55, 0x55, 0x55);

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Position {
    pub x: i16,
    pub y: i16,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug, Hash)]
pub enum PieceKind {
    I,
    O,
    T,
    S,
    Z,
    J,
    L,
}

impl PieceKind {
    pub const ALL: [PieceKind; 7] = [
        PieceKind::I,
        PieceKind::O,
        PieceKind::T,
        PieceKind::S,
        PieceKind::Z,
        PieceKind::J,
        PieceKind::L,
    ];

    /// Unrotated occupancy matrix, rows top to bottom.
    pub fn base_shape(&self) -> Shape {
        match self {
            PieceKind::I => Shape::from_rows(&[&[1, 1, 1, 1]]),
            PieceKind::O => Shape::from_rows(&[&[1, 1], &[1, 1]]),
            PieceKind::T => Shape::from_rows(&[&[0, 1, 0], &[1, 1, 1]]),
            PieceKind::S => Shape::from_rows(&[&[0, 1, 1], &[1, 1, 0]]),
            PieceKind::Z => Shape::from_rows(&[&[1, 1, 0], &[0, 1, 1]]),
            PieceKind::J => Shape::from_rows(&[&[1, 0, 0], &[1, 1, 1]]),
            PieceKind::L => Shape::from_rows(&[&[0, 0, 1], &[1, 1, 1]]),
        }
    }

    pub fn color(&self) -> Rgb {
        match self {
            PieceKind::I => (0x00, 0xff, 0xff),
            PieceKind::O => (0xff, 0xff, 0x00),
            PieceKind::T => (0x80, 0x00, 0x80),
            PieceKind::S => (0x00, 0xff, 0x00),
            PieceKind::Z => (0xff, 0x00, 0x00),
            PieceKind::J => (0x00, 0x00, 0xff),
            PieceKind::L => (0xff, 0xa5, 0x00),
        }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Self {
        PieceKind::ALL[rng.gen_range(0..PieceKind::ALL.len())]
    }
}

// ============================================================================
// Shape
// ============================================================================

/// Occupancy matrix stored in a fixed array; only the top-left
/// `height x width` region is meaningful.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Shape {
    cells: [[bool; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE],
    width: usize,
    height: usize,
}

impl Shape {
    /// Builds a shape from rows of 0/1 flags. Rows must share one length and
    /// fit in `MAX_SHAPE_SIDE`.
    pub fn from_rows(rows: &[&[u8]]) -> Self {
        let height = rows.len().min(MAX_SHAPE_SIDE);
        let width = rows
            .iter()
            .map(|row| row.len())
            .max()
            .unwrap_or(0)
            .min(MAX_SHAPE_SIDE);
        let mut cells = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, row) in rows.iter().take(height).enumerate() {
            for (c, &flag) in row.iter().take(width).enumerate() {
                cells[r][c] = flag != 0;
            }
        }
        Self {
            cells,
            width,
            height,
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn is_filled(&self, row: usize, col: usize) -> bool {
        row < self.height && col < self.width && self.cells[row][col]
    }

    /// Occupied cells as `(dx, dy)` offsets from the shape's origin.
    pub fn offsets(&self) -> impl Iterator<Item = (i16, i16)> + '_ {
        (0..self.height).flat_map(move |r| {
            (0..self.width)
                .filter(move |&c| self.cells[r][c])
                .map(move |c| (c as i16, r as i16))
        })
    }

    /// Quarter turn clockwise: `new[r][c] = old[h - 1 - c][r]`.
    pub fn rotated_cw(&self) -> Self {
        let mut cells = [[false; MAX_SHAPE_SIDE]; MAX_SHAPE_SIDE];
        for (r, row) in cells.iter_mut().enumerate().take(self.width) {
            for (c, cell) in row.iter_mut().enumerate().take(self.height) {
                *cell = self.cells[self.height - 1 - c][r];
            }
        }
        Self {
            cells,
            width: self.height,
            height: self.width,
        }
    }
}

// ============================================================================
// Piece
// ============================================================================

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Piece {
    pub kind: PieceKind,
    pub shape: Shape,
    pub position: Position,
}

impl Piece {
    /// A piece of `kind` in its base orientation at the spawn offset.
    pub fn new(kind: PieceKind) -> Self {
        Self::new_at(kind, SPAWN_X, SPAWN_Y)
    }

    pub fn new_at(kind: PieceKind, x: i16, y: i16) -> Self {
        Self {
            kind,
            shape: kind.base_shape(),
            position: Position { x, y },
        }
    }

    /// Absolute board coordinates of every occupied cell.
    pub fn blocks(&self) -> impl Iterator<Item = Position> + '_ {
        self.shape.offsets().map(move |(dx, dy)| Position {
            x: self.position.x + dx,
            y: self.position.y + dy,
        })
    }

    pub fn moved(&self, dx: i16, dy: i16) -> Self {
        Self {
            position: Position {
                x: self.position.x + dx,
                y: self.position.y + dy,
            },
            ..*self
        }
    }

    pub fn rotated(&self) -> Self {
        Self {
            shape: self.shape.rotated_cw(),
            ..*self
        }
    }

    /// Same piece and orientation, back at the spawn offset.
    pub fn respawned(&self) -> Self {
        Self {
            position: Position {
                x: SPAWN_X,
                y: SPAWN_Y,
            },
            ..*self
        }
    }
}

/// Uniformly random kind at the spawn offset.
pub fn random_piece<R: Rng + ?Sized>(rng: &mut R) -> Piece {
    Piece::new(PieceKind::random(rng))
}

// ============================================================================
// Piece Provider Trait
// ============================================================================

pub trait PieceProvider {
    fn next_piece(&mut self) -> Piece;
}

pub struct RandomPieceProvider {
    rng: StdRng,
}

impl RandomPieceProvider {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
        }
    }

    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl Default for RandomPieceProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceProvider for RandomPieceProvider {
    fn next_piece(&mut self) -> Piece {
        random_piece(&mut self.rng)
    }
}

pub struct SequencePieceProvider {
    kinds: Vec<PieceKind>,
    index: usize,
}

impl SequencePieceProvider {
    pub fn new(kinds: Vec<PieceKind>) -> Self {
        Self { kinds, index: 0 }
    }
}

impl PieceProvider for SequencePieceProvider {
    fn next_piece(&mut self) -> Piece {
        let kind = if self.kinds.is_empty() {
            PieceKind::I
        } else {
            self.kinds[self.index % self.kinds.len()]
        };
        self.index += 1;
        Piece::new(kind)
    }
}
