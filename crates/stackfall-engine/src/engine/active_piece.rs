use std::time::Duration;

use serde::Serialize;

use crate::core::{
    board::Board,
    piece::{Piece, PieceKind},
};

/// How long a grounded piece waits before it locks.
pub const LOCK_DELAY: Duration = Duration::from_millis(400);

// Column offsets tried in order when rotating. Counter-clockwise uses the
// same left-then-right order as clockwise.
const ROTATION_KICKS: [i8; 3] = [0, -1, 1];

/// Lifecycle of the falling piece.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
pub enum PieceState {
    /// Just spawned, nothing applied yet.
    Spawning,
    /// Free to move down.
    Falling,
    /// Resting on the stack or floor; the lock delay is counting.
    Grounded,
    /// Settled. No further operation has any effect.
    Locked,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationDirection {
    Clockwise,
    CounterClockwise,
}

/// The piece currently under player control.
///
/// Every operation takes the board as read-only context and reports whether
/// it succeeded. Failed operations change nothing.
///
/// # Example
///
/// ```
/// use stackfall_engine::{ActivePiece, Board, PieceKind};
///
/// let board = Board::new();
/// let mut active = ActivePiece::new(PieceKind::O);
///
/// assert!(active.try_move(&board, 0, -1));
/// let dropped = active.hard_drop(&board);
/// assert_eq!(dropped, 20);
/// assert!(active.is_locked());
/// ```
#[derive(Debug, Clone)]
pub struct ActivePiece {
    piece: Piece,
    state: PieceState,
    lock_elapsed: Duration,
}

impl ActivePiece {
    /// Spawns a piece of the given kind at the spawn anchor.
    #[must_use]
    pub const fn new(kind: PieceKind) -> Self {
        Self {
            piece: Piece::new(kind),
            state: PieceState::Spawning,
            lock_elapsed: Duration::ZERO,
        }
    }

    #[must_use]
    pub const fn piece(&self) -> Piece {
        self.piece
    }

    #[must_use]
    pub const fn kind(&self) -> PieceKind {
        self.piece.kind()
    }

    #[must_use]
    pub const fn state(&self) -> PieceState {
        self.state
    }

    /// Time spent grounded since the last successful move or rotation.
    #[must_use]
    pub const fn lock_elapsed(&self) -> Duration {
        self.lock_elapsed
    }

    #[must_use]
    pub const fn is_locked(&self) -> bool {
        self.state.is_locked()
    }

    /// Returns `true` if the piece cannot move one row down.
    #[must_use]
    pub fn is_grounded(&self, board: &Board) -> bool {
        board.is_colliding(self.piece.shifted(1, 0))
    }

    /// Shifts the piece by `(d_row, d_col)` if the target placement fits.
    pub fn try_move(&mut self, board: &Board, d_row: i8, d_col: i8) -> bool {
        if self.is_locked() {
            return false;
        }
        let candidate = self.piece.shifted(d_row, d_col);
        if board.is_colliding(candidate) {
            return false;
        }
        self.place(board, candidate);
        true
    }

    /// Rotates in place, falling back to one column left, then one column right.
    pub fn rotate(&mut self, board: &Board, direction: RotationDirection) -> bool {
        if self.is_locked() {
            return false;
        }
        let rotated = match direction {
            RotationDirection::Clockwise => self.piece.rotated_right(),
            RotationDirection::CounterClockwise => self.piece.rotated_left(),
        };
        let Some(candidate) = ROTATION_KICKS
            .iter()
            .map(|d_col| rotated.shifted(0, *d_col))
            .find(|candidate| !board.is_colliding(*candidate))
        else {
            return false;
        };
        self.place(board, candidate);
        true
    }

    pub fn soft_drop(&mut self, board: &Board) -> bool {
        self.try_move(board, 1, 0)
    }

    /// Drops the piece as far as it goes and locks it immediately.
    ///
    /// Returns the number of rows dropped.
    pub fn hard_drop(&mut self, board: &Board) -> usize {
        if self.is_locked() {
            return 0;
        }
        let rows = self.firm_drop(board);
        self.state = PieceState::Locked;
        rows
    }

    /// Drops the piece as far as it goes, leaving it on the lock-delay path.
    ///
    /// Returns the number of rows dropped.
    pub fn firm_drop(&mut self, board: &Board) -> usize {
        let mut rows = 0;
        while self.soft_drop(board) {
            rows += 1;
        }
        rows
    }

    /// Advances the piece by one gravity step or one slice of lock delay.
    ///
    /// A grounded piece accumulates `elapsed` and locks once the total reaches
    /// [`LOCK_DELAY`]. Otherwise the piece moves down one row.
    ///
    /// Returns `true` if the piece is locked.
    pub fn tick(&mut self, board: &Board, elapsed: Duration) -> bool {
        if self.is_locked() {
            return true;
        }
        if self.is_grounded(board) {
            self.state = PieceState::Grounded;
            self.lock_elapsed += elapsed;
            if self.lock_elapsed >= LOCK_DELAY {
                self.state = PieceState::Locked;
            }
        } else {
            self.place(board, self.piece.shifted(1, 0));
        }
        self.is_locked()
    }

    /// Returns the lowest placement reachable straight down from the current one.
    #[must_use]
    pub fn ghost(&self, board: &Board) -> Piece {
        let mut ghost = self.piece;
        loop {
            let next = ghost.shifted(1, 0);
            if board.is_colliding(next) {
                return ghost;
            }
            ghost = next;
        }
    }

    #[must_use]
    pub fn ghost_row(&self, board: &Board) -> i8 {
        self.ghost(board).position().row()
    }

    fn place(&mut self, board: &Board, piece: Piece) {
        self.piece = piece;
        self.lock_elapsed = Duration::ZERO;
        self.state = if self.is_grounded(board) {
            PieceState::Grounded
        } else {
            PieceState::Falling
        };
    }

    #[cfg(test)]
    pub(crate) fn from_piece(piece: Piece) -> Self {
        Self {
            piece,
            state: PieceState::Spawning,
            lock_elapsed: Duration::ZERO,
        }
    }
}
