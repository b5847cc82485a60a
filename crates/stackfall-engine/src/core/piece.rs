use serde::{Deserialize, Serialize};

use super::board::{Block, SPAWN_COL, SPAWN_ROW};

/// A piece (tetromino) placed at a specific anchor and orientation.
///
/// Placements are immutable values: movement and rotation return new `Piece`
/// instances and never consult the board. Whether a placement is legal is
/// decided by [`Board::is_colliding`](super::board::Board::is_colliding).
///
/// # Coordinate System
///
/// - The anchor is the top-left cell of the piece's 4×4 bounding box
/// - Rows grow downward, columns grow rightward
/// - The anchor row may be negative while the piece spawns above the board
///
/// # Example
///
/// ```
/// use stackfall_engine::{Piece, PieceKind};
///
/// let piece = Piece::new(PieceKind::T);
/// assert_eq!(piece.position().row(), -1);
/// assert_eq!(piece.position().col(), 3);
///
/// let moved = piece.shifted(1, -1).rotated_right();
/// assert_eq!(moved.position().row(), 0);
/// assert_eq!(moved.rotation().as_u8(), 1);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Piece {
    position: PiecePosition,
    rotation: PieceRotation,
    kind: PieceKind,
}

impl Piece {
    /// Creates a piece of the given kind at the spawn anchor, rotation 0.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            position: PiecePosition::SPAWN,
            rotation: PieceRotation::SPAWN,
            kind,
        }
    }

    #[must_use]
    pub const fn with_placement(
        kind: PieceKind,
        rotation: PieceRotation,
        position: PiecePosition,
    ) -> Self {
        Self {
            position,
            rotation,
            kind,
        }
    }

    #[must_use]
    pub const fn position(&self) -> PiecePosition {
        self.position
    }

    #[must_use]
    pub const fn rotation(&self) -> PieceRotation {
        self.rotation
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.kind
    }

    #[must_use]
    pub fn shape(&self) -> &'static PieceShape {
        shape(self.kind, self.rotation)
    }

    /// Returns the board coordinates `(row, col)` of every occupied cell.
    ///
    /// Coordinates are not clipped; cells may lie outside the board.
    pub fn occupied_cells(&self) -> impl Iterator<Item = (i8, i8)> + use<> {
        let PiecePosition { row, col } = self.position;
        occupied_offsets(self.kind, self.rotation).map(move |(dr, dc)| (row + dr, col + dc))
    }

    #[must_use]
    pub const fn shifted(&self, d_row: i8, d_col: i8) -> Self {
        Self {
            position: self.position.shifted(d_row, d_col),
            rotation: self.rotation,
            kind: self.kind,
        }
    }

    #[must_use]
    pub const fn rotated_right(&self) -> Self {
        Self {
            position: self.position,
            rotation: self.rotation.rotated_right(),
            kind: self.kind,
        }
    }

    #[must_use]
    pub const fn rotated_left(&self) -> Self {
        Self {
            position: self.position,
            rotation: self.rotation.rotated_left(),
            kind: self.kind,
        }
    }
}

/// Anchor of a piece: the top-left cell of its 4×4 bounding box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PiecePosition {
    row: i8,
    col: i8,
}

impl PiecePosition {
    pub const SPAWN: Self = Self::new(SPAWN_ROW, SPAWN_COL);

    #[must_use]
    pub const fn new(row: i8, col: i8) -> Self {
        Self { row, col }
    }

    #[must_use]
    pub const fn row(self) -> i8 {
        self.row
    }

    #[must_use]
    pub const fn col(self) -> i8 {
        self.col
    }

    #[must_use]
    pub const fn shifted(self, d_row: i8, d_col: i8) -> Self {
        Self::new(self.row + d_row, self.col + d_col)
    }
}

/// Rotation state of a piece.
///
/// - `0`: spawn orientation
/// - `1`: one clockwise step
/// - `2`: two steps
/// - `3`: one counter-clockwise step
///
/// Rotation operations wrap around modulo 4.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
pub struct PieceRotation(u8);

impl PieceRotation {
    pub const SPAWN: Self = Self(0);

    /// Creates a rotation state.
    ///
    /// # Panics
    ///
    /// Panics if `n` is not in `0..4`.
    #[must_use]
    pub const fn new(n: u8) -> Self {
        assert!(n < 4, "rotation state must be in 0..4");
        Self(n)
    }

    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self.0
    }

    #[must_use]
    pub const fn rotated_right(self) -> Self {
        Self((self.0 + 1) % 4)
    }

    #[must_use]
    pub const fn rotated_left(self) -> Self {
        Self((self.0 + 3) % 4)
    }

    const fn as_usize(self) -> usize {
        self.0 as usize
    }
}

/// The seven piece kinds.
///
/// The discriminant doubles as the color class stored in board cells, so
/// the values 1..=7 must stay distinct.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[repr(u8)]
pub enum PieceKind {
    /// I-piece (cyan).
    I = 1,
    /// J-piece (blue).
    J = 2,
    /// L-piece (orange).
    L = 3,
    /// O-piece (yellow).
    O = 4,
    /// S-piece (green).
    S = 5,
    /// T-piece (magenta).
    T = 6,
    /// Z-piece (red).
    Z = 7,
}

impl PieceKind {
    /// Number of piece kinds (7).
    pub const LEN: usize = 7;

    /// All kinds in color-class order.
    pub const ALL: [Self; Self::LEN] = [
        PieceKind::I,
        PieceKind::J,
        PieceKind::L,
        PieceKind::O,
        PieceKind::S,
        PieceKind::T,
        PieceKind::Z,
    ];

    /// Returns the color class (1..=7) of this kind.
    #[must_use]
    pub const fn color_class(self) -> u8 {
        self as u8
    }

    const fn index(self) -> usize {
        self as usize - 1
    }
}

/// Piece pattern as a 4×4 cell array, indexed `[row][col]`.
pub type PieceShape = [[Block; 4]; 4];

/// Returns the pattern of `kind` in the given orientation.
///
/// This is a plain table lookup; every `(kind, rotation)` pair has an entry.
#[must_use]
pub fn shape(kind: PieceKind, rotation: PieceRotation) -> &'static PieceShape {
    &PIECE_SHAPES[kind.index()][rotation.as_usize()]
}

fn occupied_offsets(kind: PieceKind, rotation: PieceRotation) -> impl Iterator<Item = (i8, i8)> {
    shape(kind, rotation)
        .iter()
        .zip(0_i8..)
        .flat_map(|(row, dr)| {
            row.iter()
                .zip(0_i8..)
                .filter(|(cell, _)| !cell.is_empty())
                .map(move |(_, dc)| (dr, dc))
        })
}

// Rotation table of the classic game this engine reproduces. It is not SRS:
// O never changes, and S/Z flip between two patterns.
const PIECE_SHAPES: [[PieceShape; 4]; PieceKind::LEN] = {
    use Block::Empty as E;
    const I: Block = Block::Piece(PieceKind::I);
    const J: Block = Block::Piece(PieceKind::J);
    const L: Block = Block::Piece(PieceKind::L);
    const O: Block = Block::Piece(PieceKind::O);
    const S: Block = Block::Piece(PieceKind::S);
    const T: Block = Block::Piece(PieceKind::T);
    const Z: Block = Block::Piece(PieceKind::Z);
    const EEEE: [Block; 4] = [E; 4];
    [
        // I-piece
        [
            [EEEE, [I, I, I, I], EEEE, EEEE],
            [[E, E, I, E], [E, E, I, E], [E, E, I, E], [E, E, I, E]],
            [EEEE, EEEE, [I, I, I, I], EEEE],
            [[E, I, E, E], [E, I, E, E], [E, I, E, E], [E, I, E, E]],
        ],
        // J-piece
        [
            [EEEE, [J, E, E, E], [J, J, J, E], EEEE],
            [EEEE, [E, J, J, E], [E, J, E, E], [E, J, E, E]],
            [EEEE, EEEE, [J, J, J, E], [E, E, J, E]],
            [EEEE, [E, J, E, E], [E, J, E, E], [J, J, E, E]],
        ],
        // L-piece
        [
            [EEEE, [E, E, L, E], [L, L, L, E], EEEE],
            [EEEE, [E, L, E, E], [E, L, E, E], [E, L, L, E]],
            [EEEE, EEEE, [L, L, L, E], [L, E, E, E]],
            [EEEE, [L, L, E, E], [E, L, E, E], [E, L, E, E]],
        ],
        // O-piece
        [
            [EEEE, [E, O, O, E], [E, O, O, E], EEEE],
            [EEEE, [E, O, O, E], [E, O, O, E], EEEE],
            [EEEE, [E, O, O, E], [E, O, O, E], EEEE],
            [EEEE, [E, O, O, E], [E, O, O, E], EEEE],
        ],
        // S-piece
        [
            [EEEE, [E, S, S, E], [S, S, E, E], EEEE],
            [EEEE, [E, S, E, E], [E, S, S, E], [E, E, S, E]],
            [EEEE, [E, S, S, E], [S, S, E, E], EEEE],
            [EEEE, [E, S, E, E], [E, S, S, E], [E, E, S, E]],
        ],
        // T-piece
        [
            [EEEE, [E, T, E, E], [T, T, T, E], EEEE],
            [EEEE, [E, T, E, E], [E, T, T, E], [E, T, E, E]],
            [EEEE, EEEE, [T, T, T, E], [E, T, E, E]],
            [EEEE, [E, T, E, E], [T, T, E, E], [E, T, E, E]],
        ],
        // Z-piece
        [
            [EEEE, [Z, Z, E, E], [E, Z, Z, E], EEEE],
            [EEEE, [E, E, Z, E], [E, Z, Z, E], [E, Z, E, E]],
            [EEEE, [Z, Z, E, E], [E, Z, Z, E], EEEE],
            [EEEE, [E, E, Z, E], [E, Z, Z, E], [E, Z, E, E]],
        ],
    ]
};
