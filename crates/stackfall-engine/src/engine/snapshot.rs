use serde::Serialize;

use crate::core::{
    board::Board,
    piece::{Piece, PieceKind},
};

use super::{GameSession, SessionState, active_piece::PieceState};

/// Owned copy of a session taken between mutations.
///
/// Renderers draw from a snapshot and never see a half-applied update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GameSnapshot {
    pub board: Board,
    pub active: ActivePieceSnapshot,
    pub next: PieceKind,
    pub held: Option<PieceKind>,
    pub hold_used: bool,
    pub level: usize,
    pub lines_cleared: usize,
    pub total_lines_cleared: usize,
    pub pieces_dropped: usize,
    pub state: SessionState,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ActivePieceSnapshot {
    pub piece: Piece,
    pub ghost: Piece,
    pub state: PieceState,
}

impl ActivePieceSnapshot {
    /// Row of the ghost placement's anchor.
    #[must_use]
    pub fn ghost_row(&self) -> i8 {
        self.ghost.position().row()
    }
}

impl GameSnapshot {
    pub(crate) fn capture(session: &GameSession) -> Self {
        let active = session.active_piece();
        Self {
            board: session.board().clone(),
            active: ActivePieceSnapshot {
                piece: active.piece(),
                ghost: session.ghost(),
                state: active.state(),
            },
            next: session.next_kind(),
            held: session.held_kind(),
            hold_used: session.is_hold_used(),
            level: session.level(),
            lines_cleared: session.lines_cleared(),
            total_lines_cleared: session.total_lines_cleared(),
            pieces_dropped: session.pieces_dropped(),
            state: session.state(),
        }
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }
}
