use crossterm::event::{Event, KeyCode, KeyEventKind, KeyModifiers, MouseEventKind};
use stackfall_engine::InputCommand;

/// Translates a terminal event into a session command.
///
/// A mouse click restarts the game, but only once it is over.
pub(super) fn command_for(event: &Event, is_game_over: bool) -> Option<InputCommand> {
    match event {
        Event::Key(key) if key.kind != KeyEventKind::Release => {
            if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
                return Some(InputCommand::Exit);
            }
            let command = match key.code {
                KeyCode::Left => InputCommand::MoveLeft,
                KeyCode::Right => InputCommand::MoveRight,
                KeyCode::Down => InputCommand::SoftDrop,
                KeyCode::Up => InputCommand::FirmDrop,
                KeyCode::Char(' ') => InputCommand::HardDrop,
                KeyCode::Char('x' | 'X') => InputCommand::RotateCw,
                KeyCode::Char('z' | 'Z') => InputCommand::RotateCcw,
                KeyCode::Char('c' | 'C') => InputCommand::Hold,
                KeyCode::Char('r' | 'R') => InputCommand::Reset,
                KeyCode::Esc | KeyCode::Char('q' | 'Q') => InputCommand::Exit,
                _ => return None,
            };
            Some(command)
        }
        Event::Mouse(mouse) if is_game_over && matches!(mouse.kind, MouseEventKind::Down(_)) => {
            Some(InputCommand::Reset)
        }
        _ => None,
    }
}
