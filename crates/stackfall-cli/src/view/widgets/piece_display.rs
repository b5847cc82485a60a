use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt as _, Widget},
};
use stackfall_engine::{Block, PieceKind, PieceRotation, shape};

use super::BlockDisplay;

// Spawn patterns only use rows 1 and 2 of their 4×4 box.
const PREVIEW_ROWS: std::ops::Range<usize> = 1..3;
const PREVIEW_COLS: u16 = 4;

/// Spawn orientation preview for the HOLD and NEXT panels.
#[derive(Debug)]
pub struct PieceDisplay<'a> {
    piece: Option<PieceKind>,
    dimmed: bool,
    block: Option<BlockWidget<'a>>,
}

impl<'a> PieceDisplay<'a> {
    pub fn new() -> Self {
        Self {
            piece: None,
            dimmed: false,
            block: None,
        }
    }

    pub fn piece(self, piece: PieceKind) -> Self {
        Self {
            piece: Some(piece),
            ..self
        }
    }

    /// Draws the piece as a ghost, e.g. when hold is unavailable.
    pub fn dimmed(self, dimmed: bool) -> Self {
        Self { dimmed, ..self }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        PREVIEW_COLS * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        2 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }
}

impl Widget for PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &PieceDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let horizontal = Layout::horizontal(
            (0..PREVIEW_COLS).map(|_| Constraint::Length(BlockDisplay::width())),
        )
        .flex(Flex::Center);
        let vertical =
            Layout::vertical(PREVIEW_ROWS.map(|_| Constraint::Length(BlockDisplay::height())));
        let grid_rows = area
            .layout_vec(&vertical)
            .into_iter()
            .map(|row| row.layout_vec(&horizontal));

        let empty_block = BlockDisplay::from_block(Block::Empty, false);
        let Some(kind) = self.piece else {
            for cell in grid_rows.flatten() {
                Widget::render(&empty_block, cell, buf);
            }
            return;
        };

        let occupied_block = if self.dimmed {
            BlockDisplay::ghost()
        } else {
            BlockDisplay::from_block(Block::Piece(kind), false)
        };
        let pattern = &shape(kind, PieceRotation::SPAWN)[PREVIEW_ROWS];
        for (pattern_row, grid_row) in pattern.iter().zip(grid_rows) {
            for (cell, grid_cell) in pattern_row.iter().zip(grid_row) {
                if cell.is_empty() {
                    Widget::render(&empty_block, grid_cell, buf);
                } else {
                    Widget::render(&occupied_block, grid_cell, buf);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::view::widgets::style;

    #[test]
    fn test_preview_rows_hold_every_spawn_cell() {
        for kind in PieceKind::ALL {
            let pattern = shape(kind, PieceRotation::SPAWN);
            let inside = pattern[PREVIEW_ROWS]
                .iter()
                .flatten()
                .filter(|b| !b.is_empty())
                .count();
            assert_eq!(inside, 4, "{kind:?}");
        }
    }

    #[test]
    fn test_render_draws_piece_cells() {
        let area = Rect::new(0, 0, 8, 2);
        let mut buf = Buffer::empty(area);
        PieceDisplay::new().piece(PieceKind::I).render(area, &mut buf);
        assert_eq!(Some(buf[(0, 0)].bg), style::I_BLOCK.bg);
        assert_eq!(Some(buf[(0, 1)].bg), style::EMPTY.bg);
    }
}
