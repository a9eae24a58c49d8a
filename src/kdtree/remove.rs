//! Removal with subtree repair.

use std::cmp::Ordering;

use tracing::trace;

use crate::error::Result;
use crate::kdtree::balance::drain;
use crate::kdtree::index::{KDTreeMetadata, Removal};
use crate::kdtree::node::Link;
use crate::kdtree::KDTree;
use crate::r#type::Coordinate;
use crate::util::{check_point, cmp_key};

impl<N: Coordinate> KDTree<N> {
    /// Remove the item with exactly these coordinates and this id.
    ///
    /// If several identical items were inserted with duplicates allowed, only one of them is
    /// removed. Returns [`Removal::NotFound`] without touching the tree if nothing matches.
    pub fn remove(&mut self, point: &[N], id: u32) -> Result<Removal> {
        check_point(point, self.ndims())?;

        if self.metadata.remove_at(&mut self.root, point, id) {
            self.num_items -= 1;
            Ok(Removal::Removed)
        } else {
            Ok(Removal::NotFound)
        }
    }
}

impl KDTreeMetadata {
    fn remove_at<N: Coordinate>(&self, link: &mut Link<N>, point: &[N], id: u32) -> bool {
        let Some(node) = link else {
            return false;
        };
        if node.matches(point, id) {
            self.excise(link);
            return true;
        }

        let axis = node.split_dim as usize;
        let found = match cmp_key(point, id, &node.coords, node.id, axis) {
            Ordering::Less => self.remove_at(&mut node.left, point, id),
            Ordering::Greater => self.remove_at(&mut node.right, point, id),
            // same key, different coordinates: may be on either side
            Ordering::Equal => {
                self.remove_at(&mut node.left, point, id)
                    || self.remove_at(&mut node.right, point, id)
            }
        };
        if !found {
            return false;
        }

        node.update_height();
        self.rebalance(link, self.balance_tolerance);
        true
    }

    /// Drop the node in `link`, rebuilding its descendants in its place.
    fn excise<N: Coordinate>(&self, link: &mut Link<N>) {
        let Some(node) = link.take() else {
            return;
        };
        if node.is_leaf() {
            return;
        }

        let depth = node.depth;
        let node = *node;
        let mut entries = Vec::new();
        drain(node.left, &mut entries);
        drain(node.right, &mut entries);
        trace!(size = entries.len(), depth, "repairing subtree after removal");
        *link = self.build(&mut entries, depth);
    }
}

#[cfg(test)]
mod test {
    use crate::kdtree::{Insertion, KDTreeBuilder, Removal};

    #[test]
    fn remove_leaf_and_internal() {
        let mut tree = KDTreeBuilder::<f64>::new(2)
            .balance_tolerance(1)
            .finish()
            .unwrap();
        for i in 0..20u32 {
            let p = [(i * 7 % 20) as f64, (i * 3 % 20) as f64];
            assert_eq!(tree.insert(&p, i, true).unwrap(), Insertion::Inserted);
        }

        // the root is always an internal node here
        let root = tree.root().unwrap();
        let (root_coords, root_id) = (root.coords().to_vec(), root.id());
        assert_eq!(tree.remove(&root_coords, root_id).unwrap(), Removal::Removed);
        assert_eq!(tree.len(), 19);
        tree.validate().unwrap();
        assert!(!tree.contains(&root_coords).unwrap());

        for i in 0..20u32 {
            if i == root_id {
                continue;
            }
            let p = [(i * 7 % 20) as f64, (i * 3 % 20) as f64];
            assert_eq!(tree.remove(&p, i).unwrap(), Removal::Removed);
            tree.validate().unwrap();
        }
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }

    #[test]
    fn remove_requires_matching_id() {
        let mut tree = KDTreeBuilder::<f64>::new(2).finish().unwrap();
        let _ = tree.insert(&[1., 1.], 1, true).unwrap();
        let _ = tree.insert(&[1., 1.], 2, true).unwrap();
        let _ = tree.insert(&[2., 2.], 3, true).unwrap();
        let before = tree.clone();

        assert_eq!(tree.remove(&[1., 1.], 3).unwrap(), Removal::NotFound);
        assert_eq!(tree.remove(&[2., 2.], 1).unwrap(), Removal::NotFound);
        assert_eq!(tree.remove(&[5., 5.], 1).unwrap(), Removal::NotFound);
        assert_eq!(tree, before);

        assert_eq!(tree.remove(&[1., 1.], 2).unwrap(), Removal::Removed);
        let ids: Vec<u32> = tree.knn(&[1., 1.], 5, None).unwrap().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[test]
    fn remove_one_of_identical_items() {
        let mut tree = KDTreeBuilder::<f64>::new(1)
            .balance_tolerance(1)
            .finish()
            .unwrap();
        for _ in 0..5 {
            let _ = tree.insert(&[3.], 9, true).unwrap();
        }
        for remaining in (0..5).rev() {
            assert_eq!(tree.remove(&[3.], 9).unwrap(), Removal::Removed);
            assert_eq!(tree.len(), remaining);
            tree.validate().unwrap();
        }
        assert_eq!(tree.remove(&[3.], 9).unwrap(), Removal::NotFound);
    }
}
