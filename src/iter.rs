use crate::{
    board::{Board, NodeId, Quadrant},
    error::Error,
};

/// A populated square of the board at some enumeration granularity.
///
/// Measured in `i128` like [`Square`](crate::Square); a unit block always
/// sits on an `i64` cell.
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub struct Block {
    pub x: i128,
    pub y: i128,
    pub size: i128,
}

/// Pre-order iterator over the populated blocks of one size.
///
/// Cloning the iterator, or asking the board for a new one, restarts the
/// enumeration.
#[derive(Clone, Debug)]
pub struct Blocks<'a> {
    board: &'a Board,
    level: u8,
    stack: Vec<(NodeId, i128, i128)>,
}

impl<'a> Blocks<'a> {
    fn new(board: &'a Board, level: u8) -> Self {
        let stack = board
            .root
            .map(|root| (root, board.x_top_left, board.y_top_left))
            .into_iter()
            .collect();
        Blocks {
            board,
            level,
            stack,
        }
    }
}

impl Iterator for Blocks<'_> {
    type Item = Block;

    fn next(&mut self) -> Option<Block> {
        while let Some((id, x, y)) = self.stack.pop() {
            let data = &self.board[id];
            if data.level == self.level {
                if self.board.is_populated(id) {
                    return Some(Block {
                        x,
                        y,
                        size: data.size(),
                    });
                }
            } else if data.level > self.level {
                let half = data.size() / 2;
                // Pushed in reverse so that the north-west child pops first.
                for quadrant in Quadrant::ALL.into_iter().rev() {
                    if let Some(child) = data.child(quadrant) {
                        let (dx, dy) = quadrant.offset(half);
                        self.stack.push((child, x + dx, y + dy));
                    }
                }
            }
        }
        None
    }
}

fn block_level(block_size: i64) -> Result<u8, Error> {
    if block_size <= 0 || block_size.count_ones() != 1 {
        return Err(Error::InvalidBlockSize(block_size));
    }
    Ok(block_size.trailing_zeros() as u8)
}

impl Board {
    /// Every populated block of `block_size` cells on a side, in pre-order.
    ///
    /// `block_size` must be a positive power of two. A block size larger
    /// than the bounding square yields nothing.
    pub fn blocks(&self, block_size: i64) -> Result<Blocks<'_>, Error> {
        Ok(Blocks::new(self, block_level(block_size)?))
    }

    /// Coordinates of every living cell.
    pub fn living_cells(&self) -> impl Iterator<Item = (i64, i64)> + '_ {
        Blocks::new(self, 0).map(|block| (block.x as i64, block.y as i64))
    }

    /// Callback form of [`Board::blocks`].
    pub fn for_populated_blocks<F>(&self, block_size: i64, f: F) -> Result<(), Error>
    where
        F: FnMut(Block),
    {
        self.blocks(block_size)?.for_each(f);
        Ok(())
    }
}
