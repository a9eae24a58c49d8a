//! Structural invariant checks.

use std::cmp::Ordering;

use crate::error::{KDTreeError, Result};
use crate::kdtree::node::{link_height, Node};
use crate::kdtree::KDTree;
use crate::r#type::Coordinate;
use crate::util::cmp_key;

impl<N: Coordinate> KDTree<N> {
    /// Walk the whole tree and check its structural invariants:
    ///
    /// - every key in a left subtree is lower than or equal to the key of its ancestor, and
    ///   every key in a right subtree greater than or equal to it;
    /// - depths increase by one from the root at 0, and split dimensions follow the schedule;
    /// - cached heights are correct and sibling heights differ by at most the balance tolerance;
    /// - the item count matches the number of nodes.
    ///
    /// This is `O(n log n)` and meant for tests and debugging.
    pub fn validate(&self) -> Result<()> {
        let mut ancestors = Vec::new();
        let count = self.validate_node(self.root(), 0, &mut ancestors)?;
        if count != self.num_items {
            return Err(KDTreeError::InvariantViolation(format!(
                "tree holds {} nodes but counts {} items",
                count, self.num_items
            )));
        }
        Ok(())
    }

    /// Returns the number of nodes in the subtree. `ancestors` holds every ancestor of `node`
    /// together with the side of it that `node` descends from.
    fn validate_node<'a>(
        &self,
        node: Option<&'a Node<N>>,
        depth: u32,
        ancestors: &mut Vec<(&'a Node<N>, Ordering)>,
    ) -> Result<usize> {
        let Some(node) = node else {
            return Ok(0);
        };
        let violation = |message: String| {
            Err(KDTreeError::InvariantViolation(format!(
                "node {}: {}",
                node.id, message
            )))
        };

        if node.coords.len() != self.ndims() {
            return violation(format!("has {} coordinates", node.coords.len()));
        }
        if node.depth != depth {
            return violation(format!("depth {} where {} was expected", node.depth, depth));
        }
        if node.split_dim != self.metadata.split_dim(depth) {
            return violation(format!("splits on dimension {}", node.split_dim));
        }
        for &(ancestor, side) in ancestors.iter() {
            let order = cmp_key(
                &node.coords,
                node.id,
                &ancestor.coords,
                ancestor.id,
                ancestor.split_dim as usize,
            );
            if order != Ordering::Equal && order != side {
                return violation(format!("is on the wrong side of node {}", ancestor.id));
            }
        }

        let expected_height = 1 + link_height(&node.left).max(link_height(&node.right));
        if node.height != expected_height {
            return violation(format!(
                "caches height {} instead of {}",
                node.height, expected_height
            ));
        }
        if node.skew() > self.metadata.balance_tolerance {
            return violation(format!(
                "skew {} exceeds tolerance {}",
                node.skew(),
                self.metadata.balance_tolerance
            ));
        }

        ancestors.push((node, Ordering::Less));
        let left = self.validate_node(node.left(), depth + 1, ancestors)?;
        ancestors.pop();
        ancestors.push((node, Ordering::Greater));
        let right = self.validate_node(node.right(), depth + 1, ancestors)?;
        ancestors.pop();

        Ok(1 + left + right)
    }
}

#[cfg(test)]
mod test {
    use crate::kdtree::node::Node;
    use crate::kdtree::{KDTree, KDTreeError};

    #[test]
    fn detects_misplaced_nodes() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        let _ = tree.insert(&[5., 5.], 1, false).unwrap();
        let _ = tree.insert(&[1., 1.], 2, false).unwrap();
        tree.validate().unwrap();

        // move the left child to the right
        let root = tree.root.as_mut().unwrap();
        root.right = root.left.take();
        assert!(matches!(
            tree.validate(),
            Err(KDTreeError::InvariantViolation(_))
        ));
    }

    #[test]
    fn detects_wrong_count() {
        let mut tree = KDTree::<f64>::new(1).unwrap();
        let _ = tree.insert(&[5.], 1, false).unwrap();
        tree.num_items = 2;
        assert!(tree.validate().is_err());
    }

    #[test]
    fn detects_stale_heights() {
        let mut tree = KDTree::<f64>::new(1).unwrap();
        let _ = tree.insert(&[5.], 1, false).unwrap();
        let root = tree.root.as_mut().unwrap();
        root.left = Some(Box::new(Node::new_leaf(vec![1.].into(), 2, 0, 1)));
        tree.num_items = 2;
        assert!(tree.validate().is_err());
    }
}
