use std::ops::Range;

use serde::{Serialize, Serializer};

use super::piece::{Piece, PieceKind};

/// Total number of rows, hidden rows included.
pub const BOARD_ROWS: usize = 22;
/// Number of columns.
pub const BOARD_COLS: usize = 10;
/// Number of hidden overflow rows at the top of the grid.
pub const HIDDEN_ROWS: usize = 2;

/// Highest level index. Levels run `0..=MAX_LEVEL`.
pub const MAX_LEVEL: usize = 4;
/// Lines needed for a level up.
pub const LINES_PER_LEVEL: usize = 10;

pub(super) const SPAWN_ROW: i8 = -1;
pub(super) const SPAWN_COL: i8 = 3;

// Anchors above this row never fit, whatever the pattern.
const MIN_ANCHOR_ROW: i8 = -1;

/// A single cell of the board.
///
/// Serializes as its color class: `0` for empty, `1..=7` for a settled piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Block {
    /// Empty cell.
    #[default]
    Empty,
    /// Cell settled by a piece of the given kind.
    Piece(PieceKind),
}

impl Block {
    #[must_use]
    pub const fn is_empty(self) -> bool {
        matches!(self, Block::Empty)
    }

    /// Returns the color class of the cell (`0` when empty).
    #[must_use]
    pub const fn color_class(self) -> u8 {
        match self {
            Block::Empty => 0,
            Block::Piece(kind) => kind.color_class(),
        }
    }
}

impl Serialize for Block {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u8(self.color_class())
    }
}

/// One row of the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct BoardRow {
    cells: [Block; BOARD_COLS],
}

impl BoardRow {
    pub const EMPTY: Self = Self {
        cells: [Block::Empty; BOARD_COLS],
    };

    #[must_use]
    pub fn cells(&self) -> &[Block; BOARD_COLS] {
        &self.cells
    }

    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.cells.iter().all(|b| !b.is_empty())
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.cells.iter().all(|b| b.is_empty())
    }
}

/// The settled grid plus the line and level counters it drives.
///
/// # Layout
///
/// - 22 rows × 10 columns, row 0 at the top
/// - Rows 0 and 1 are hidden overflow rows; anything settling there ends the game
/// - Rows 2..=21 are the visible play area
///
/// # Example
///
/// ```
/// use stackfall_engine::{Board, Piece, PieceKind};
///
/// let mut board = Board::new();
/// let piece = Piece::new(PieceKind::O);
/// assert!(!board.is_colliding(piece));
///
/// board.lock_piece(piece);
/// assert!(board.is_loss_state());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Board {
    rows: [BoardRow; BOARD_ROWS],
    level: usize,
    lines_cleared: usize,
    total_lines_cleared: usize,
}

impl Default for Board {
    fn default() -> Self {
        Self::new()
    }
}

impl Board {
    pub const ROWS: usize = BOARD_ROWS;
    pub const COLS: usize = BOARD_COLS;
    pub const VISIBLE_ROWS: Range<usize> = HIDDEN_ROWS..BOARD_ROWS;

    /// Creates an empty board at level 0.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            rows: [BoardRow::EMPTY; BOARD_ROWS],
            level: 0,
            lines_cleared: 0,
            total_lines_cleared: 0,
        }
    }

    /// Current level (`0..=MAX_LEVEL`).
    #[must_use]
    pub const fn level(&self) -> usize {
        self.level
    }

    /// Lines cleared since the last level up.
    #[must_use]
    pub const fn lines_cleared(&self) -> usize {
        self.lines_cleared
    }

    /// Lines cleared since the board was created.
    #[must_use]
    pub const fn total_lines_cleared(&self) -> usize {
        self.total_lines_cleared
    }

    #[must_use]
    pub fn rows(&self) -> &[BoardRow; BOARD_ROWS] {
        &self.rows
    }

    /// Returns the visible rows (hidden overflow rows excluded).
    pub fn visible_rows(&self) -> impl Iterator<Item = &BoardRow> {
        self.rows[Self::VISIBLE_ROWS].iter()
    }

    /// Returns the cell at `(row, col)`.
    ///
    /// # Panics
    ///
    /// Panics if the coordinates are out of bounds.
    #[must_use]
    pub fn cell(&self, row: usize, col: usize) -> Block {
        self.rows[row].cells[col]
    }

    /// Checks whether `piece` overlaps a settled cell or leaves the grid.
    ///
    /// The check is all-or-nothing: one offending cell rejects the placement.
    #[must_use]
    pub fn is_colliding(&self, piece: Piece) -> bool {
        if piece.position().row() < MIN_ANCHOR_ROW {
            return true;
        }
        piece
            .occupied_cells()
            .any(|(row, col)| match grid_index(row, col) {
                Some((r, c)) => !self.rows[r].cells[c].is_empty(),
                None => true,
            })
    }

    /// Writes the piece's cells into the grid.
    ///
    /// Cells that fall outside the grid are skipped.
    pub fn lock_piece(&mut self, piece: Piece) {
        let block = Block::Piece(piece.kind());
        for (row, col) in piece.occupied_cells() {
            if let Some((r, c)) = grid_index(row, col) {
                self.rows[r].cells[c] = block;
            }
        }
    }

    /// Removes every complete visible row and returns how many were removed.
    ///
    /// Each complete row is zeroed, then every row above it (down to the top
    /// visible row, which takes the content of the last hidden row) moves
    /// down by one. Scanning repeats until no visible row is complete.
    pub fn clear_completed_rows(&mut self) -> usize {
        let mut cleared = 0;
        loop {
            let complete = self.complete_rows();
            if !complete.iter().any(|c| *c) {
                break;
            }
            for row in Self::VISIBLE_ROWS {
                if !complete[row] {
                    continue;
                }
                self.rows[row] = BoardRow::EMPTY;
                for r in (HIDDEN_ROWS..=row).rev() {
                    self.rows[r] = self.rows[r - 1];
                }
                cleared += 1;
            }
        }
        self.lines_cleared += cleared;
        self.total_lines_cleared += cleared;
        cleared
    }

    fn complete_rows(&self) -> [bool; BOARD_ROWS] {
        let mut complete = [false; BOARD_ROWS];
        for row in Self::VISIBLE_ROWS {
            complete[row] = self.rows[row].is_complete();
        }
        complete
    }

    /// Applies at most one level up and reports whether it happened.
    ///
    /// A level up needs [`LINES_PER_LEVEL`] lines and a level below
    /// [`MAX_LEVEL`]; the surplus lines carry over.
    pub fn advance_level(&mut self) -> bool {
        if self.lines_cleared >= LINES_PER_LEVEL && self.level < MAX_LEVEL {
            self.level += 1;
            self.lines_cleared -= LINES_PER_LEVEL;
            return true;
        }
        false
    }

    /// Returns `true` once any hidden overflow row holds a settled cell.
    #[must_use]
    pub fn is_loss_state(&self) -> bool {
        self.rows[..HIDDEN_ROWS].iter().any(|row| !row.is_empty())
    }

    /// Creates a board from ASCII art for testing.
    ///
    /// `#` marks an occupied cell (stored as an `I` block), `.` an empty one.
    /// Lines are aligned to the bottom of the grid, so the last line is row 21.
    #[cfg(test)]
    pub(crate) fn from_ascii(art: &str) -> Self {
        let lines: Vec<&str> = art.lines().filter(|line| !line.trim().is_empty()).collect();
        assert!(lines.len() <= BOARD_ROWS, "too many rows: {}", lines.len());

        let mut board = Self::new();
        let top = BOARD_ROWS - lines.len();
        for (y, line) in lines.iter().enumerate() {
            let chars: Vec<char> = line.chars().filter(|c| *c == '#' || *c == '.').collect();
            assert_eq!(
                chars.len(),
                BOARD_COLS,
                "Each row must have exactly {BOARD_COLS} cells, got {} at row {y}",
                chars.len(),
            );
            for (x, ch) in chars.into_iter().enumerate() {
                if ch == '#' {
                    board.rows[top + y].cells[x] = Block::Piece(PieceKind::I);
                }
            }
        }
        board
    }

    #[cfg(test)]
    pub(crate) fn set_counters(&mut self, level: usize, lines_cleared: usize) {
        self.level = level;
        self.lines_cleared = lines_cleared;
    }
}

fn grid_index(row: i8, col: i8) -> Option<(usize, usize)> {
    let r = usize::try_from(row).ok().filter(|r| *r < BOARD_ROWS)?;
    let c = usize::try_from(col).ok().filter(|c| *c < BOARD_COLS)?;
    Some((r, c))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::piece::{PiecePosition, PieceRotation};

    fn fill_row(board: &mut Board, row: usize, kind: PieceKind) {
        board.rows[row] = BoardRow {
            cells: [Block::Piece(kind); BOARD_COLS],
        };
    }

    fn occupied(board: &Board, row: usize) -> Vec<usize> {
        (0..BOARD_COLS)
            .filter(|c| !board.cell(row, *c).is_empty())
            .collect()
    }

    #[test]
    fn test_new_board_is_empty() {
        let board = Board::new();
        assert!(board.rows().iter().all(BoardRow::is_empty));
        assert_eq!(board.level(), 0);
        assert_eq!(board.lines_cleared(), 0);
        assert!(!board.is_loss_state());
        assert_eq!(board.visible_rows().count(), 20);
    }

    #[test]
    fn test_from_ascii_is_bottom_aligned() {
        let board = Board::from_ascii(
            "
            #.........
            ##########
            ",
        );
        assert_eq!(occupied(&board, 21), (0..10).collect::<Vec<_>>());
        assert_eq!(occupied(&board, 20), vec![0]);
        assert!(board.rows[19].is_empty());
    }

    #[test]
    fn test_clear_single_row_shifts_rows_above() {
        let mut board = Board::from_ascii(
            "
            ..#.......
            .#........
            ##########
            ",
        );
        assert_eq!(board.clear_completed_rows(), 1);
        assert_eq!(occupied(&board, 21), vec![1]);
        assert_eq!(occupied(&board, 20), vec![2]);
        assert!(board.rows[19].is_empty());
        assert_eq!(board.lines_cleared(), 1);
    }

    #[test]
    fn test_clear_non_adjacent_rows_preserves_order() {
        let mut board = Board::from_ascii(
            "
            #.........
            ##########
            .#........
            ##########
            ..#.......
            ",
        );
        assert_eq!(board.clear_completed_rows(), 2);
        assert_eq!(occupied(&board, 21), vec![2]);
        assert_eq!(occupied(&board, 20), vec![1]);
        assert_eq!(occupied(&board, 19), vec![0]);
        for row in HIDDEN_ROWS..19 {
            assert!(board.rows[row].is_empty(), "row {row} should be empty");
        }
        assert_eq!(board.total_lines_cleared(), 2);
    }

    #[test]
    fn test_clear_four_adjacent_rows() {
        let mut board = Board::from_ascii(
            "
            ...#......
            ##########
            ##########
            ##########
            ##########
            ",
        );
        assert_eq!(board.clear_completed_rows(), 4);
        assert_eq!(occupied(&board, 21), vec![3]);
        assert!(board.visible_rows().take(19).all(BoardRow::is_empty));
    }

    #[test]
    fn test_clear_top_visible_row() {
        let mut board = Board::new();
        fill_row(&mut board, HIDDEN_ROWS, PieceKind::T);
        assert_eq!(board.clear_completed_rows(), 1);
        assert!(board.rows[HIDDEN_ROWS].is_empty());
    }

    #[test]
    fn test_clear_ignores_hidden_rows() {
        let mut board = Board::new();
        fill_row(&mut board, 0, PieceKind::Z);
        assert_eq!(board.clear_completed_rows(), 0);
        assert!(board.rows[0].is_complete());
    }

    #[test]
    fn test_clear_nothing_when_rows_incomplete() {
        let mut board = Board::from_ascii(
            "
            #########.
            ",
        );
        let before = board.clone();
        assert_eq!(board.clear_completed_rows(), 0);
        assert_eq!(board, before);
    }

    #[test]
    fn test_advance_level_carries_remainder() {
        let mut board = Board::new();
        board.set_counters(0, 13);
        assert!(board.advance_level());
        assert_eq!(board.level(), 1);
        assert_eq!(board.lines_cleared(), 3);
        assert!(!board.advance_level());
        assert_eq!(board.level(), 1);
    }

    #[test]
    fn test_advance_level_single_step_per_call() {
        let mut board = Board::new();
        board.set_counters(0, 25);
        assert!(board.advance_level());
        assert_eq!((board.level(), board.lines_cleared()), (1, 15));
        assert!(board.advance_level());
        assert_eq!((board.level(), board.lines_cleared()), (2, 5));
    }

    #[test]
    fn test_advance_level_capped_at_max() {
        let mut board = Board::new();
        board.set_counters(MAX_LEVEL, 17);
        assert!(!board.advance_level());
        assert_eq!(board.level(), MAX_LEVEL);
        assert_eq!(board.lines_cleared(), 17);
    }

    #[test]
    fn test_advance_level_below_threshold() {
        let mut board = Board::new();
        board.set_counters(2, 9);
        assert!(!board.advance_level());
        assert_eq!((board.level(), board.lines_cleared()), (2, 9));
    }

    #[test]
    fn test_is_colliding_bounds() {
        let board = Board::new();
        let piece = Piece::new(PieceKind::T);
        assert!(!board.is_colliding(piece));
        // T spawn pattern spans box columns 0 to 2
        assert!(!board.is_colliding(piece.shifted(0, -3)));
        assert!(board.is_colliding(piece.shifted(0, -4)));
        assert!(!board.is_colliding(piece.shifted(0, 4)));
        assert!(board.is_colliding(piece.shifted(0, 5)));
        // pattern rows 1 and 2 sit on rows 20 and 21 at anchor 19
        assert!(!board.is_colliding(piece.shifted(20, 0)));
        assert!(board.is_colliding(piece.shifted(21, 0)));
    }

    #[test]
    fn test_is_colliding_rejects_anchor_above_spawn() {
        let board = Board::new();
        // this I pattern fills box row 2 only, so every cell lands on board row 0
        let piece = Piece::with_placement(
            PieceKind::I,
            PieceRotation::new(2),
            PiecePosition::new(-2, 3),
        );
        assert!(piece.occupied_cells().all(|(row, _)| row == 0));
        assert!(board.is_colliding(piece));
    }

    #[test]
    fn test_is_colliding_with_settled_cell() {
        let board = Board::from_ascii(
            "
            ....#.....
            ",
        );
        // O pattern occupies box columns 1 and 2, rows 1 and 2
        let o = Piece::with_placement(PieceKind::O, PieceRotation::SPAWN, PiecePosition::new(19, 3));
        assert!(board.is_colliding(o));
        assert!(!board.is_colliding(o.shifted(0, 2)));
        assert!(!board.is_colliding(o.shifted(-1, 0)));
    }

    #[test]
    fn test_lock_piece_writes_color() {
        let mut board = Board::new();
        let o = Piece::with_placement(PieceKind::O, PieceRotation::SPAWN, PiecePosition::new(19, 3));
        board.lock_piece(o);
        assert_eq!(occupied(&board, 20), vec![4, 5]);
        assert_eq!(occupied(&board, 21), vec![4, 5]);
        assert_eq!(board.cell(21, 4).color_class(), PieceKind::O.color_class());
        assert!(!board.is_loss_state());
    }

    #[test]
    fn test_lock_piece_clips_out_of_bounds_cells() {
        let mut board = Board::new();
        // vertical I with its first cell at row -1
        let i = Piece::with_placement(PieceKind::I, PieceRotation::new(1), PiecePosition::new(-1, 0));
        board.lock_piece(i);
        assert_eq!(occupied(&board, 0), vec![2]);
        assert_eq!(occupied(&board, 2), vec![2]);
        assert!(board.rows[3].is_empty());
        assert!(board.is_loss_state());
    }

    #[test]
    fn test_loss_state_per_hidden_row() {
        for row in 0..HIDDEN_ROWS {
            let mut board = Board::new();
            board.rows[row].cells[9] = Block::Piece(PieceKind::S);
            assert!(board.is_loss_state());
        }
        let mut board = Board::new();
        board.rows[HIDDEN_ROWS].cells[0] = Block::Piece(PieceKind::S);
        assert!(!board.is_loss_state());
    }

    #[test]
    fn test_board_serializes_color_classes() {
        let mut board = Board::new();
        board.rows[21].cells[0] = Block::Piece(PieceKind::Z);
        let value = serde_json::to_value(&board).unwrap();
        assert_eq!(value["rows"][21][0], 7);
        assert_eq!(value["rows"][21][1], 0);
        assert_eq!(value["level"], 0);
    }
}
