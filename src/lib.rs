#![allow(clippy::bool_assert_comparison)]

mod board;
mod error;
mod evolve;
mod iter;
mod read;
mod rule;

pub use board::{Board, Square, INITIAL_GENERATION};
pub use ca_formats;
pub use error::Error;
pub use iter::{Block, Blocks};
pub use rule::Rule;
