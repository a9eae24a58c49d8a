//! An implementation of a dynamic, self-balancing K-D Tree.
//!
//! Points can be inserted and removed at any time. After every mutation, each subtree whose two
//! children differ in height by more than the balance tolerance is rebuilt around its median,
//! which keeps the depth of the tree logarithmic without global rebalancing.

#![warn(missing_docs)]

mod balance;
mod builder;
mod dnn;
mod index;
mod insert;
mod knn;
mod node;
mod optimize;
mod range;
mod remove;
mod traversal;
mod validate;

pub use builder::KDTreeBuilder;
pub use index::{
    DimensionSchedule, Insertion, KDTree, KDTreeMetadata, Removal, DEFAULT_BALANCE_TOLERANCE,
    MAX_BALANCE_TOLERANCE,
};
pub use knn::Neighbor;
pub use node::Node;
pub use optimize::OptimizeLevel;
pub use traversal::Iter;

pub use crate::error::KDTreeError;
