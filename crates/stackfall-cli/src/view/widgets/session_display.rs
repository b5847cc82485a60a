use ratatui::{
    layout::{Constraint, Flex, Layout},
    prelude::{Buffer, Rect},
    style::Style,
    text::{Line, Text},
    widgets::{Block, Clear, Padding, Widget},
};
use stackfall_engine::{GameSnapshot, SessionState};

use super::{BoardDisplay, PieceDisplay, StatsDisplay, color, style};

/// Whole play screen: HOLD and STATS on the left, the board, NEXT on the right.
#[derive(Debug)]
pub struct SessionDisplay<'a> {
    snapshot: &'a GameSnapshot,
    show_ghost: bool,
    horizontal_padding: u16,
    vertical_padding: u16,
}

impl<'a> SessionDisplay<'a> {
    pub fn new(snapshot: &'a GameSnapshot, show_ghost: bool) -> Self {
        Self {
            snapshot,
            show_ghost,
            horizontal_padding: 1,
            vertical_padding: 0,
        }
    }

    fn border_style(&self) -> Style {
        let color = match self.snapshot.state {
            SessionState::Playing => color::WHITE,
            SessionState::GameOver => color::RED,
        };
        Style::new().fg(color)
    }

    fn game_board(&self) -> BoardDisplay<'a> {
        let active = &self.snapshot.active;
        let widget = BoardDisplay::new(&self.snapshot.board)
            .falling_piece(active.piece)
            .block(
                Block::bordered()
                    .border_style(self.border_style())
                    .style(style::DEFAULT),
            );
        if self.show_ghost && !self.snapshot.is_game_over() {
            widget.ghost(active.ghost)
        } else {
            widget
        }
    }

    fn panel_block(&self, title: &'static str) -> Block<'a> {
        Block::bordered()
            .title(Line::from(title).centered())
            .padding(Padding::symmetric(
                self.horizontal_padding,
                self.vertical_padding,
            ))
            .border_style(self.border_style())
            .style(style::DEFAULT)
    }

    pub fn height(&self) -> u16 {
        self.game_board().height()
    }
}

impl Widget for SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &SessionDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        let game_board = self.game_board();
        let hold_panel = {
            let panel = PieceDisplay::new()
                .dimmed(self.snapshot.hold_used)
                .block(self.panel_block("HOLD"));
            if let Some(kind) = self.snapshot.held {
                panel.piece(kind)
            } else {
                panel
            }
        };
        let next_panel = PieceDisplay::new()
            .piece(self.snapshot.next)
            .block(self.panel_block("NEXT"));
        let stats = StatsDisplay::new(self.snapshot).block(self.panel_block("STATS"));

        let [left_column, center_column, right_column] = Layout::horizontal([
            Constraint::Length(u16::max(hold_panel.width(), stats.width())),
            Constraint::Length(game_board.width()),
            Constraint::Length(next_panel.width()),
        ])
        .flex(Flex::Center)
        .spacing(1)
        .areas(area);

        let [hold_area, stats_area] = Layout::vertical([
            Constraint::Length(hold_panel.height()),
            Constraint::Length(stats.height()),
        ])
        .spacing(1)
        .areas(left_column);
        let hold_area = hold_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(hold_panel.width())]).flex(Flex::End),
        )[0];
        let stats_area = stats_area.layout::<1>(
            &Layout::horizontal([Constraint::Length(stats.width())]).flex(Flex::End),
        )[0];

        let [board_area] =
            Layout::vertical([Constraint::Length(game_board.height())]).areas(center_column);
        let [next_area] =
            Layout::vertical([Constraint::Length(next_panel.height())]).areas(right_column);

        let game_board_width = game_board.width();
        hold_panel.render(hold_area, buf);
        stats.render(stats_area, buf);
        game_board.render(board_area, buf);
        next_panel.render(next_area, buf);

        if self.snapshot.is_game_over() {
            let popup_style = Style::new().fg(color::WHITE).bg(color::RED);
            let block = Block::new().style(popup_style);
            let text = Text::from(vec![
                Line::from("GAME OVER"),
                Line::from("Click to restart"),
                Line::from("Esc to close"),
            ])
            .style(popup_style)
            .centered();
            let area =
                board_area.centered(Constraint::Length(game_board_width), Constraint::Length(5));
            let inner = block.inner(area);
            Clear.render(area, buf);
            block.render(area, buf);
            text.render(inner.centered_vertically(Constraint::Length(3)), buf);
        }
    }
}
