use tracing::debug;

use crate::error::KDTreeError;
use crate::kdtree::balance::drain;
use crate::kdtree::index::KDTreeMetadata;
use crate::kdtree::node::Link;
use crate::kdtree::KDTree;
use crate::r#type::Coordinate;

/// How hard [`KDTree::optimize`] works to reduce the depth of the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OptimizeLevel {
    /// Rebuild subtrees whose skew exceeds the balance tolerance.
    Light,
    /// Rebuild subtrees whose skew exceeds half the balance tolerance.
    Moderate,
    /// Rebuild the whole tree into a tree of minimum height. This is `O(n log n)`, and only
    /// pays off when the tree will serve many more queries than it holds items.
    Full,
}

impl TryFrom<u8> for OptimizeLevel {
    type Error = KDTreeError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(OptimizeLevel::Light),
            1 => Ok(OptimizeLevel::Moderate),
            2 => Ok(OptimizeLevel::Full),
            _ => Err(KDTreeError::InvalidOptimizeLevel(value)),
        }
    }
}

impl<N: Coordinate> KDTree<N> {
    /// Optimize the tree for searching.
    ///
    /// The items in the tree are unchanged and the maximum depth never grows.
    #[tracing::instrument(level = "debug", skip(self), fields(num_items = self.num_items))]
    pub fn optimize(&mut self, level: OptimizeLevel) {
        let depth_before = self.max_depth();
        let rebuilt = match level {
            OptimizeLevel::Light => self
                .metadata
                .rebalance_all(&mut self.root, self.metadata.balance_tolerance),
            OptimizeLevel::Moderate => {
                let threshold = (self.metadata.balance_tolerance / 2).max(1);
                self.metadata.rebalance_all(&mut self.root, threshold)
            }
            OptimizeLevel::Full => {
                let mut entries = Vec::with_capacity(self.num_items);
                drain(self.root.take(), &mut entries);
                self.root = self.metadata.build(&mut entries, 0);
                usize::from(self.root.is_some())
            }
        };
        debug!(
            rebuilt,
            depth_before,
            depth_after = self.max_depth(),
            "optimized kd-tree"
        );
    }
}

impl KDTreeMetadata {
    /// Post-order walk rebuilding every subtree whose skew exceeds `threshold`. Returns the
    /// number of rebuilt subtrees.
    fn rebalance_all<N: Coordinate>(&self, link: &mut Link<N>, threshold: u32) -> usize {
        let Some(node) = link else {
            return 0;
        };
        let rebuilt = self.rebalance_all(&mut node.left, threshold)
            + self.rebalance_all(&mut node.right, threshold);
        node.update_height();
        rebuilt + usize::from(self.rebalance(link, threshold))
    }
}
