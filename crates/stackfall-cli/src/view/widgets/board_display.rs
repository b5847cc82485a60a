use std::iter;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Flex, Layout, Rect},
    widgets::{Block as BlockWidget, BlockExt, Widget},
};
use stackfall_engine::{BOARD_COLS, BOARD_ROWS, Block, Board, HIDDEN_ROWS, Piece};

use super::BlockDisplay;

const VISIBLE_HEIGHT: usize = BOARD_ROWS - HIDDEN_ROWS;

type Grid = [[BlockDisplay; BOARD_COLS]; VISIBLE_HEIGHT];

/// Visible play area with the falling piece and its ghost overlaid.
#[derive(Debug)]
pub struct BoardDisplay<'a> {
    board: &'a Board,
    ghost: Option<Piece>,
    falling_piece: Option<Piece>,
    block: Option<BlockWidget<'a>>,
}

impl<'a> BoardDisplay<'a> {
    pub fn new(board: &'a Board) -> Self {
        Self {
            board,
            ghost: None,
            falling_piece: None,
            block: None,
        }
    }

    pub fn ghost(self, piece: Piece) -> Self {
        Self {
            ghost: Some(piece),
            ..self
        }
    }

    pub fn falling_piece(self, piece: Piece) -> Self {
        Self {
            falling_piece: Some(piece),
            ..self
        }
    }

    pub fn block(self, block: BlockWidget<'a>) -> Self {
        Self {
            block: Some(block),
            ..self
        }
    }

    pub fn width(&self) -> u16 {
        10 * BlockDisplay::width() + super::block_horizontal_margin(self.block.as_ref())
    }

    pub fn height(&self) -> u16 {
        20 * BlockDisplay::height() + super::block_vertical_margin(self.block.as_ref())
    }

    fn grid(&self) -> Grid {
        let mut grid = [[BlockDisplay::from_block(Block::Empty, true); BOARD_COLS]; VISIBLE_HEIGHT];
        for (grid_row, row) in iter::zip(&mut grid, self.board.visible_rows()) {
            for (cell, block) in iter::zip(grid_row, row.cells()) {
                *cell = BlockDisplay::from_block(*block, true);
            }
        }
        if let Some(ghost) = self.ghost {
            for (y, x) in visible_cells(ghost) {
                // the ghost never hides settled cells
                if self.board.cell(y + HIDDEN_ROWS, x).is_empty() {
                    grid[y][x] = BlockDisplay::ghost();
                }
            }
        }
        if let Some(piece) = self.falling_piece {
            let display = BlockDisplay::from_block(Block::Piece(piece.kind()), true);
            for (y, x) in visible_cells(piece) {
                grid[y][x] = display;
            }
        }
        grid
    }
}

/// Grid coordinates of the piece cells inside the visible area.
fn visible_cells(piece: Piece) -> impl Iterator<Item = (usize, usize)> {
    piece.occupied_cells().filter_map(|(row, col)| {
        let y = usize::try_from(row).ok()?.checked_sub(HIDDEN_ROWS)?;
        let x = usize::try_from(col).ok()?;
        (y < VISIBLE_HEIGHT && x < BOARD_COLS).then_some((y, x))
    })
}

impl Widget for BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer)
    where
        Self: Sized,
    {
        Widget::render(&self, area, buf);
    }
}

impl Widget for &BoardDisplay<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.block.as_ref().render(area, buf);
        let area = self.block.inner_if_some(area);

        let col_constraints = (0..BOARD_COLS).map(|_| Constraint::Length(BlockDisplay::width()));
        let row_constraints =
            (0..VISIBLE_HEIGHT).map(|_| Constraint::Length(BlockDisplay::height()));
        let horizontal = Layout::horizontal(col_constraints).flex(Flex::Center);
        let vertical = Layout::vertical(row_constraints);

        let grid_cells = area
            .layout::<VISIBLE_HEIGHT>(&vertical)
            .into_iter()
            .map(|row| row.layout::<BOARD_COLS>(&horizontal));

        for (grid_row, row) in iter::zip(grid_cells, self.grid()) {
            for (grid_cell, block_display) in iter::zip(grid_row, row) {
                block_display.render(grid_cell, buf);
            }
        }
    }
}
