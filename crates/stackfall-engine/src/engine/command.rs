/// Discrete player input accepted by [`GameSession::on_input`](super::GameSession::on_input).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputCommand {
    MoveLeft,
    MoveRight,
    /// Move down one row.
    SoftDrop,
    /// Drop to the bottom and lock at once.
    HardDrop,
    /// Drop to the bottom but keep the lock delay.
    FirmDrop,
    RotateCw,
    RotateCcw,
    Hold,
    Reset,
    Exit,
}

/// What a session did with an [`InputCommand`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, derive_more::IsVariant)]
pub enum InputOutcome {
    /// The command took effect.
    Applied,
    /// The command was valid in this state but could not be carried out,
    /// such as a move into a wall or a second hold.
    Rejected,
    /// The command has no meaning in the current state.
    Ignored,
    /// The caller should stop the session.
    ExitRequested,
}

impl InputOutcome {
    pub(crate) const fn from_applied(applied: bool) -> Self {
        if applied { Self::Applied } else { Self::Rejected }
    }
}
