#![doc = include_str!("../README.md")]

mod error;
pub mod kdtree;
mod r#type;
mod util;

pub use error::{KDTreeError, Result};
pub use kdtree::{KDTree, KDTreeBuilder, Neighbor, OptimizeLevel};
pub use r#type::Coordinate;
