use std::time::Duration;

use serde::Serialize;

use crate::core::{
    board::{Board, MAX_LEVEL},
    piece::{Piece, PieceKind},
};

use super::{
    GameSnapshot,
    active_piece::{ActivePiece, RotationDirection},
    command::{InputCommand, InputOutcome},
    drop_queue::{DropQueue, QueueSeed},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, derive_more::IsVariant)]
pub enum SessionState {
    Playing,
    GameOver,
}

const FALL_INTERVALS_MS: [u64; 6] = [250, 200, 150, 100, 50, 25];

/// Returns the gravity interval at the given level.
///
/// # Panics
///
/// Panics if `level` has no entry in the speed table.
#[must_use]
pub fn fall_interval_for_level(level: usize) -> Duration {
    assert!(
        level < FALL_INTERVALS_MS.len(),
        "no fall interval for level {level}"
    );
    Duration::from_millis(FALL_INTERVALS_MS[level])
}

/// A full game: board, falling piece, queue, hold slot and lifecycle.
///
/// The session has no clock of its own. Time enters only through
/// [`Self::on_tick`] and player actions only through [`Self::on_input`].
///
/// # Example
///
/// ```
/// use std::time::Duration;
///
/// use stackfall_engine::{GameSession, InputCommand, InputOutcome};
///
/// let mut session = GameSession::new();
/// assert_eq!(session.on_input(InputCommand::HardDrop), InputOutcome::Applied);
/// assert_eq!(session.pieces_dropped(), 1);
///
/// session.on_tick(Duration::from_millis(1));
/// assert!(!session.is_game_over());
/// ```
#[derive(Debug, Clone)]
pub struct GameSession {
    board: Board,
    active: ActivePiece,
    queue: DropQueue,
    held: Option<PieceKind>,
    hold_used: bool,
    state: SessionState,
    fall_elapsed: Duration,
    pieces_dropped: usize,
}

impl Default for GameSession {
    fn default() -> Self {
        Self::new()
    }
}

impl GameSession {
    /// Starts a session with a random piece order.
    #[must_use]
    pub fn new() -> Self {
        Self::with_queue(DropQueue::new())
    }

    /// Starts a session whose piece order is fixed by `seed`.
    #[must_use]
    pub fn with_seed(seed: QueueSeed) -> Self {
        Self::with_queue(DropQueue::with_seed(seed))
    }

    fn with_queue(mut queue: DropQueue) -> Self {
        let active = ActivePiece::new(queue.pop_next());
        Self {
            board: Board::new(),
            active,
            queue,
            held: None,
            hold_used: false,
            state: SessionState::Playing,
            fall_elapsed: Duration::ZERO,
            pieces_dropped: 0,
        }
    }

    #[must_use]
    pub fn board(&self) -> &Board {
        &self.board
    }

    #[must_use]
    pub fn active_piece(&self) -> &ActivePiece {
        &self.active
    }

    #[must_use]
    pub fn ghost(&self) -> Piece {
        self.active.ghost(&self.board)
    }

    #[must_use]
    pub fn ghost_row(&self) -> i8 {
        self.active.ghost_row(&self.board)
    }

    #[must_use]
    pub fn next_kind(&self) -> PieceKind {
        self.queue.peek_next()
    }

    #[must_use]
    pub fn held_kind(&self) -> Option<PieceKind> {
        self.held
    }

    /// Returns `true` if hold was already used by the current piece.
    #[must_use]
    pub fn is_hold_used(&self) -> bool {
        self.hold_used
    }

    #[must_use]
    pub fn level(&self) -> usize {
        self.board.level()
    }

    #[must_use]
    pub fn lines_cleared(&self) -> usize {
        self.board.lines_cleared()
    }

    #[must_use]
    pub fn total_lines_cleared(&self) -> usize {
        self.board.total_lines_cleared()
    }

    #[must_use]
    pub fn pieces_dropped(&self) -> usize {
        self.pieces_dropped
    }

    #[must_use]
    pub fn state(&self) -> SessionState {
        self.state
    }

    #[must_use]
    pub fn is_game_over(&self) -> bool {
        self.state.is_game_over()
    }

    #[must_use]
    pub fn fall_interval(&self) -> Duration {
        fall_interval_for_level(self.level())
    }

    /// Takes an owned copy of everything needed to draw the session.
    #[must_use]
    pub fn snapshot(&self) -> GameSnapshot {
        GameSnapshot::capture(self)
    }

    /// Advances time by `elapsed`.
    ///
    /// Gravity moves the piece one row for every whole fall interval in the
    /// accumulated time, so a long tick can drop several rows. Intervals that
    /// pass while the piece is grounded are discarded. A grounded piece counts
    /// its lock delay on every tick in which it did not fall. Nothing happens
    /// after game over.
    pub fn on_tick(&mut self, elapsed: Duration) {
        if !self.state.is_playing() {
            return;
        }
        self.fall_elapsed += elapsed;
        let interval = self.fall_interval();
        let mut fell = false;
        while self.fall_elapsed >= interval {
            self.fall_elapsed -= interval;
            if !self.active.is_grounded(&self.board) {
                self.active.tick(&self.board, interval);
                fell = true;
            }
        }
        if !fell
            && self.active.is_grounded(&self.board)
            && self.active.tick(&self.board, elapsed)
        {
            self.settle();
        }
    }

    /// Applies a player command.
    ///
    /// After game over only [`InputCommand::Reset`] and
    /// [`InputCommand::Exit`] have an effect.
    pub fn on_input(&mut self, command: InputCommand) -> InputOutcome {
        match command {
            InputCommand::Exit => return InputOutcome::ExitRequested,
            InputCommand::Reset => {
                self.reset();
                return InputOutcome::Applied;
            }
            _ => {}
        }
        if self.state.is_game_over() {
            return InputOutcome::Ignored;
        }

        let board = &self.board;
        let applied = match command {
            InputCommand::MoveLeft => self.active.try_move(board, 0, -1),
            InputCommand::MoveRight => self.active.try_move(board, 0, 1),
            InputCommand::SoftDrop => self.active.soft_drop(board),
            InputCommand::FirmDrop => self.active.firm_drop(board) > 0,
            InputCommand::RotateCw => self.active.rotate(board, RotationDirection::Clockwise),
            InputCommand::RotateCcw => {
                self.active.rotate(board, RotationDirection::CounterClockwise)
            }
            InputCommand::HardDrop => {
                self.active.hard_drop(board);
                self.fall_elapsed = Duration::ZERO;
                self.settle();
                true
            }
            InputCommand::Hold => self.hold(),
            InputCommand::Reset | InputCommand::Exit => unreachable!(),
        };
        InputOutcome::from_applied(applied)
    }

    /// Restarts the game with an empty board and a fresh permutation.
    ///
    /// The piece order continues the same random stream.
    pub fn reset(&mut self) {
        self.board = Board::new();
        self.queue.reset();
        self.active = ActivePiece::new(self.queue.pop_next());
        self.held = None;
        self.hold_used = false;
        self.state = SessionState::Playing;
        self.fall_elapsed = Duration::ZERO;
        self.pieces_dropped = 0;
        tracing::info!(first = ?self.active.kind(), "session reset");
    }

    fn hold(&mut self) -> bool {
        if self.hold_used {
            return false;
        }
        let current = self.active.kind();
        let next = self
            .held
            .replace(current)
            .unwrap_or_else(|| self.queue.pop_next());
        self.active = ActivePiece::new(next);
        self.hold_used = true;
        tracing::debug!(held = ?current, active = ?next, "piece held");
        true
    }

    fn settle(&mut self) {
        let piece = self.active.piece();
        self.board.lock_piece(piece);
        self.pieces_dropped += 1;
        let cleared = self.board.clear_completed_rows();
        tracing::debug!(
            kind = ?piece.kind(),
            row = piece.position().row(),
            col = piece.position().col(),
            cleared,
            "piece locked"
        );

        if self.board.advance_level() {
            tracing::info!(level = self.board.level(), max = MAX_LEVEL, "level up");
        }

        if self.board.is_loss_state() {
            self.state = SessionState::GameOver;
            tracing::info!(
                level = self.board.level(),
                total_lines = self.board.total_lines_cleared(),
                pieces = self.pieces_dropped,
                "game over"
            );
            return;
        }

        self.active = ActivePiece::new(self.queue.pop_next());
        self.hold_used = false;
        tracing::debug!(
            kind = ?self.active.kind(),
            next = ?self.queue.peek_next(),
            "piece spawned"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SEED: QueueSeed = QueueSeed::from_bytes([7; 16]);

    fn session() -> GameSession {
        GameSession::with_seed(SEED)
    }

    fn tick_ms(session: &mut GameSession, millis: u64) {
        for _ in 0..millis {
            session.on_tick(Duration::from_millis(1));
        }
    }

    #[test]
    fn test_fall_interval_table() {
        let millis: Vec<u128> = (0..6)
            .map(|level| fall_interval_for_level(level).as_millis())
            .collect();
        assert_eq!(millis, vec![250, 200, 150, 100, 50, 25]);
    }

    #[test]
    #[should_panic(expected = "no fall interval for level 6")]
    fn test_fall_interval_out_of_range_panics() {
        let _ = fall_interval_for_level(6);
    }

    #[test]
    fn test_new_session_draws_from_queue() {
        let mut queue = DropQueue::with_seed(SEED);
        let session = session();
        assert_eq!(session.active_piece().kind(), queue.pop_next());
        assert_eq!(session.next_kind(), queue.pop_next());
        assert_eq!(session.held_kind(), None);
        assert!(session.state().is_playing());
        assert_eq!(session.level(), 0);
        assert_eq!(session.pieces_dropped(), 0);
        assert!(session.board().rows().iter().all(|row| row.is_empty()));
    }

    #[test]
    fn test_gravity_follows_fall_interval() {
        let mut session = session();
        tick_ms(&mut session, 249);
        assert_eq!(session.active_piece().piece().position().row(), -1);
        tick_ms(&mut session, 1);
        assert_eq!(session.active_piece().piece().position().row(), 0);
        tick_ms(&mut session, 250);
        assert_eq!(session.active_piece().piece().position().row(), 1);
    }

    #[test]
    fn test_long_tick_applies_every_elapsed_interval() {
        let mut session = session();
        session.on_tick(Duration::from_millis(1000));
        assert_eq!(session.active_piece().piece().position().row(), 3);
        assert_eq!(session.fall_elapsed, Duration::ZERO);

        session.on_tick(Duration::from_millis(260));
        assert_eq!(session.active_piece().piece().position().row(), 4);
        assert_eq!(session.fall_elapsed, Duration::from_millis(10));
    }

    #[test]
    fn test_long_tick_stops_falling_at_ground() {
        let mut session = session();
        let landing = session.ghost();
        session.on_tick(Duration::from_secs(60));
        assert_eq!(session.active_piece().piece(), landing);
        assert_eq!(session.pieces_dropped(), 0);
        assert!(session.fall_elapsed < session.fall_interval());

        session.on_tick(crate::LOCK_DELAY);
        assert_eq!(session.pieces_dropped(), 1);
    }

    #[test]
    fn test_piece_locks_by_gravity_and_spawns_next() {
        let mut session = session();
        let first = session.active_piece().kind();
        let next = session.next_kind();
        // at most 21 gravity steps plus the lock delay
        for _ in 0..(21 * 250 + 400) {
            session.on_tick(Duration::from_millis(1));
            if session.pieces_dropped() == 1 {
                break;
            }
        }
        assert_eq!(session.pieces_dropped(), 1);
        assert_eq!(session.active_piece().kind(), next);
        let bottom = &session.board().rows()[21];
        assert!(
            bottom
                .cells()
                .iter()
                .any(|cell| *cell == crate::Block::Piece(first))
        );
    }

    #[test]
    fn test_lock_delay_applies_while_grounded() {
        let mut session = session();
        assert_eq!(session.on_input(InputCommand::FirmDrop), InputOutcome::Applied);
        assert!(session.active_piece().state().is_grounded());
        tick_ms(&mut session, 399);
        assert_eq!(session.pieces_dropped(), 0);
        tick_ms(&mut session, 1);
        assert_eq!(session.pieces_dropped(), 1);
        assert!(session.active_piece().state().is_spawning());
    }

    #[test]
    fn test_firm_drop_rejected_when_grounded() {
        let mut session = session();
        session.on_input(InputCommand::FirmDrop);
        assert_eq!(session.on_input(InputCommand::FirmDrop), InputOutcome::Rejected);
        assert_eq!(session.on_input(InputCommand::SoftDrop), InputOutcome::Rejected);
    }

    #[test]
    fn test_hard_drop_settles_immediately() {
        let mut session = session();
        let next = session.next_kind();
        tick_ms(&mut session, 100);
        assert_eq!(session.on_input(InputCommand::HardDrop), InputOutcome::Applied);
        assert_eq!(session.pieces_dropped(), 1);
        assert_eq!(session.active_piece().kind(), next);
        // the gravity accumulator restarts with the new piece
        tick_ms(&mut session, 249);
        assert_eq!(session.active_piece().piece().position().row(), -1);
        tick_ms(&mut session, 1);
        assert_eq!(session.active_piece().piece().position().row(), 0);
    }

    #[test]
    fn test_moves_report_rejection_at_walls() {
        let mut session = session();
        let mut moved = 0;
        while session.on_input(InputCommand::MoveLeft).is_applied() {
            moved += 1;
            assert!(moved < 10);
        }
        assert!(moved > 0);
        assert_eq!(session.on_input(InputCommand::MoveLeft), InputOutcome::Rejected);
        assert_eq!(session.on_input(InputCommand::MoveRight), InputOutcome::Applied);
    }

    #[test]
    fn test_hold_with_empty_slot_consumes_queue() {
        let mut queue = DropQueue::with_seed(SEED);
        let first = queue.pop_next();
        let second = queue.pop_next();
        let third = queue.pop_next();

        let mut session = session();
        assert_eq!(session.on_input(InputCommand::Hold), InputOutcome::Applied);
        assert_eq!(session.held_kind(), Some(first));
        assert_eq!(session.active_piece().kind(), second);
        assert_eq!(session.next_kind(), third);
        assert!(session.is_hold_used());
    }

    #[test]
    fn test_second_hold_before_spawn_is_noop() {
        let mut session = session();
        session.on_input(InputCommand::Hold);
        let active = session.active_piece().kind();
        let held = session.held_kind();
        let next = session.next_kind();
        assert_eq!(session.on_input(InputCommand::Hold), InputOutcome::Rejected);
        assert_eq!(session.active_piece().kind(), active);
        assert_eq!(session.held_kind(), held);
        assert_eq!(session.next_kind(), next);
    }

    #[test]
    fn test_hold_swaps_without_consuming_queue() {
        let mut session = session();
        let first = session.active_piece().kind();
        session.on_input(InputCommand::Hold);
        session.on_input(InputCommand::HardDrop);
        assert!(!session.is_hold_used());

        let current = session.active_piece().kind();
        let next = session.next_kind();
        assert_eq!(session.on_input(InputCommand::Hold), InputOutcome::Applied);
        assert_eq!(session.active_piece().kind(), first);
        assert_eq!(session.held_kind(), Some(current));
        assert_eq!(session.next_kind(), next);
        assert_eq!(
            session.active_piece().piece().position(),
            crate::PiecePosition::SPAWN
        );
    }

    #[test]
    fn test_line_clear_and_level_up() {
        let mut session = session();
        session.board = Board::from_ascii(
            "
            ###....###
            ",
        );
        session.board.set_counters(0, 9);
        session.active = ActivePiece::new(PieceKind::I);

        session.on_input(InputCommand::HardDrop);
        assert_eq!(session.level(), 1);
        assert_eq!(session.lines_cleared(), 0);
        assert_eq!(session.total_lines_cleared(), 1);
        assert!(session.board().rows()[21].is_empty());
        assert_eq!(session.fall_interval(), Duration::from_millis(200));
    }

    #[test]
    fn test_gravity_speeds_up_after_level_up() {
        let mut session = session();
        session.board = Board::from_ascii(
            "
            ###....###
            ",
        );
        session.board.set_counters(0, 9);
        session.active = ActivePiece::new(PieceKind::I);
        session.on_input(InputCommand::HardDrop);
        assert_eq!(session.level(), 1);

        let spawn_row = session.active_piece().piece().position().row();
        tick_ms(&mut session, 199);
        assert_eq!(session.active_piece().piece().position().row(), spawn_row);
        tick_ms(&mut session, 1);
        assert_eq!(session.active_piece().piece().position().row(), spawn_row + 1);
    }

    #[test]
    fn test_stacking_into_hidden_rows_ends_game() {
        let mut session = session();
        for _ in 0..100 {
            if session.is_game_over() {
                break;
            }
            session.on_input(InputCommand::HardDrop);
        }
        assert!(session.is_game_over());
        assert!(session.board().is_loss_state());
    }

    #[test]
    fn test_game_over_accepts_only_reset_and_exit() {
        let mut session = session();
        while !session.is_game_over() {
            session.on_input(InputCommand::HardDrop);
        }
        let board = session.board().clone();
        let dropped = session.pieces_dropped();

        for command in [
            InputCommand::MoveLeft,
            InputCommand::MoveRight,
            InputCommand::SoftDrop,
            InputCommand::HardDrop,
            InputCommand::FirmDrop,
            InputCommand::RotateCw,
            InputCommand::RotateCcw,
            InputCommand::Hold,
        ] {
            assert_eq!(session.on_input(command), InputOutcome::Ignored);
        }
        tick_ms(&mut session, 1000);
        assert_eq!(session.board(), &board);
        assert_eq!(session.pieces_dropped(), dropped);

        assert_eq!(
            session.on_input(InputCommand::Exit),
            InputOutcome::ExitRequested
        );
        assert!(session.is_game_over());

        assert_eq!(session.on_input(InputCommand::Reset), InputOutcome::Applied);
        assert!(session.state().is_playing());
        assert_eq!(session.board(), &Board::new());
        assert_eq!(session.pieces_dropped(), 0);
        assert_eq!(session.held_kind(), None);
    }

    #[test]
    fn test_reset_during_play() {
        let mut session = session();
        session.on_input(InputCommand::Hold);
        session.on_input(InputCommand::HardDrop);
        session.on_input(InputCommand::Reset);
        assert!(session.state().is_playing());
        assert_eq!(session.pieces_dropped(), 0);
        assert_eq!(session.held_kind(), None);
        assert!(!session.is_hold_used());
        assert_eq!(
            session.active_piece().piece().position(),
            crate::PiecePosition::SPAWN
        );
    }

    #[test]
    fn test_exit_during_play_changes_nothing() {
        let mut session = session();
        let before = session.active_piece().piece();
        assert_eq!(
            session.on_input(InputCommand::Exit),
            InputOutcome::ExitRequested
        );
        assert_eq!(session.active_piece().piece(), before);
        assert!(session.state().is_playing());
    }

    #[test]
    fn test_seven_consecutive_spawns_cover_every_kind() {
        let mut session = session();
        let mut kinds = vec![session.active_piece().kind()];
        for _ in 0..6 {
            session.on_input(InputCommand::HardDrop);
            kinds.push(session.active_piece().kind());
        }
        kinds.sort_by_key(|kind| kind.color_class());
        assert_eq!(kinds, PieceKind::ALL.to_vec());
    }
}
