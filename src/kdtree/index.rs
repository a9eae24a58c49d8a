use tracing::debug;

use crate::error::{KDTreeError, Result};
use crate::kdtree::node::{link_height, Link, Node};
use crate::kdtree::KDTreeBuilder;
use crate::r#type::Coordinate;

/// The balance tolerance used when none is given to the builder.
pub const DEFAULT_BALANCE_TOLERANCE: u32 = 7;

/// The largest accepted balance tolerance.
///
/// The tolerance bounds the height of the tree: with a tolerance of `t`, a subtree of height
/// `h` holds at least as many nodes as subtrees of heights `h - 1` and `h - 1 - t` together.
/// At this maximum a tree of a billion items is at most a few hundred levels deep, which the
/// recursive operations can handle on any thread stack.
pub const MAX_BALANCE_TOLERANCE: u32 = 32;

/// The sequence of split dimensions assigned to successive depths of the tree.
///
/// The schedule is a cycle: the node at depth `d` splits on `cycle[d % cycle.len()]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DimensionSchedule {
    cycle: Box<[u8]>,
}

impl DimensionSchedule {
    /// The default schedule, splitting on `depth mod ndims`.
    pub fn cyclic(ndims: u8) -> Self {
        Self {
            cycle: (0..ndims).collect(),
        }
    }

    /// Create a custom schedule that repeats `dims` from the root downwards.
    ///
    /// Every entry must be a valid axis for a tree of `ndims` dimensions.
    pub fn try_new(dims: &[usize], ndims: usize) -> Result<Self> {
        if dims.is_empty() {
            return Err(KDTreeError::InvalidSchedule(
                "schedule must contain at least one dimension".to_string(),
            ));
        }
        let cycle = dims
            .iter()
            .map(|&dim| {
                if dim < ndims {
                    Ok(dim as u8)
                } else {
                    Err(KDTreeError::InvalidSchedule(format!(
                        "dimension {} out of range for a tree of {} dimensions",
                        dim, ndims
                    )))
                }
            })
            .collect::<Result<Box<[u8]>>>()?;
        Ok(Self { cycle })
    }

    /// The split dimension of nodes at `depth`.
    #[inline]
    pub fn split_dim(&self, depth: u32) -> u8 {
        self.cycle[depth as usize % self.cycle.len()]
    }
}

/// Configuration shared by every node of a [`KDTree`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KDTreeMetadata {
    pub(crate) ndims: u8,
    pub(crate) schedule: DimensionSchedule,
    pub(crate) balance_tolerance: u32,
}

impl KDTreeMetadata {
    /// The number of dimensions of every point in the tree.
    pub fn ndims(&self) -> usize {
        self.ndims as usize
    }

    /// The maximum allowed difference between the heights of sibling subtrees.
    pub fn balance_tolerance(&self) -> u32 {
        self.balance_tolerance
    }

    /// The depth to split dimension assignment.
    pub fn schedule(&self) -> &DimensionSchedule {
        &self.schedule
    }

    #[inline]
    pub(crate) fn split_dim(&self, depth: u32) -> u8 {
        self.schedule.split_dim(depth)
    }
}

/// The outcome of [`KDTree::insert`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Insertion {
    /// The point was added to the tree.
    Inserted,
    /// Duplicates were disallowed and a point with identical coordinates already exists.
    Rejected,
}

/// The outcome of [`KDTree::remove`].
#[must_use]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    /// A node with matching coordinates and id was removed.
    Removed,
    /// No node matched; the tree is unchanged.
    NotFound,
}

/// A dynamic, self-balancing k-d tree.
///
/// Usually this will be created via [`KDTreeBuilder`], or with [`KDTree::new`] for the default
/// configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct KDTree<N: Coordinate> {
    pub(crate) metadata: KDTreeMetadata,
    pub(crate) root: Link<N>,
    pub(crate) num_items: usize,
}

impl<N: Coordinate> KDTree<N> {
    /// Create an empty tree with `ndims` dimensions and the default balance tolerance.
    pub fn new(ndims: usize) -> Result<Self> {
        KDTreeBuilder::new(ndims).finish()
    }

    pub(crate) fn from_parts(metadata: KDTreeMetadata, root: Link<N>, num_items: usize) -> Self {
        Self {
            metadata,
            root,
            num_items,
        }
    }

    /// Access the metadata describing this tree.
    pub fn metadata(&self) -> &KDTreeMetadata {
        &self.metadata
    }

    /// The number of dimensions of this tree.
    pub fn ndims(&self) -> usize {
        self.metadata.ndims()
    }

    /// The balance tolerance of this tree.
    pub fn balance_tolerance(&self) -> u32 {
        self.metadata.balance_tolerance()
    }

    /// The number of items in this tree.
    pub fn len(&self) -> usize {
        self.num_items
    }

    /// Returns `true` if the tree holds no items.
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// The number of levels of the tree, 0 when empty.
    pub fn max_depth(&self) -> u32 {
        link_height(&self.root)
    }

    /// Access the root node of the tree for manual traversal.
    pub fn root(&self) -> Option<&Node<N>> {
        self.root.as_deref()
    }

    /// Remove all items, keeping the configuration.
    pub fn clear(&mut self) {
        debug!(num_items = self.num_items, "clearing kd-tree");
        self.root = None;
        self.num_items = 0;
    }
}
