//! Insertion with incremental balance maintenance.

use std::cmp::Ordering;

use crate::error::Result;
use crate::kdtree::index::{Insertion, KDTreeMetadata};
use crate::kdtree::node::{Link, Node};
use crate::kdtree::KDTree;
use crate::r#type::Coordinate;
use crate::util::{check_point, cmp_key};

impl<N: Coordinate> KDTree<N> {
    /// Insert a point with the given id into the tree.
    ///
    /// The coordinates are copied into the tree. If `allow_duplicates` is `false` and a point
    /// with identical coordinates already exists (whatever its id), the tree is left unchanged
    /// and [`Insertion::Rejected`] is returned.
    ///
    /// Returns an error if `point` does not have [`ndims`][Self::ndims] finite coordinates.
    pub fn insert(&mut self, point: &[N], id: u32, allow_duplicates: bool) -> Result<Insertion> {
        check_point(point, self.ndims())?;

        if !allow_duplicates && contains_coords(&self.root, point) {
            return Ok(Insertion::Rejected);
        }

        self.metadata.insert_at(&mut self.root, point.into(), id, 0);
        self.num_items += 1;
        Ok(Insertion::Inserted)
    }

    /// Returns `true` if a point with exactly these coordinates is stored in the tree.
    pub fn contains(&self, point: &[N]) -> Result<bool> {
        check_point(point, self.ndims())?;
        Ok(contains_coords(&self.root, point))
    }
}

impl KDTreeMetadata {
    /// Descend by key order and attach a new leaf, rebalancing every ancestor on the way back.
    fn insert_at<N: Coordinate>(&self, link: &mut Link<N>, coords: Box<[N]>, id: u32, depth: u32) {
        match link {
            None => {
                *link = Some(Box::new(Node::new_leaf(
                    coords,
                    id,
                    self.split_dim(depth),
                    depth,
                )));
            }
            Some(node) => {
                let axis = node.split_dim as usize;
                let child = match cmp_key(&coords, id, &node.coords, node.id, axis) {
                    Ordering::Greater => &mut node.right,
                    Ordering::Less | Ordering::Equal => &mut node.left,
                };
                self.insert_at(child, coords, id, depth + 1);
                node.update_height();
            }
        }
        self.rebalance(link, self.balance_tolerance);
    }
}

/// Search for identical coordinates.
///
/// Points sharing the split coordinate of a node can sit on either side of it, as the key order
/// breaks those ties by id, so both children are searched in that case.
fn contains_coords<N: Coordinate>(link: &Link<N>, point: &[N]) -> bool {
    let Some(node) = link else {
        return false;
    };
    let value = point[node.split_dim as usize];
    let split = node.split_value();
    if value < split {
        contains_coords(&node.left, point)
    } else if value > split {
        contains_coords(&node.right, point)
    } else {
        *node.coords == *point
            || contains_coords(&node.left, point)
            || contains_coords(&node.right, point)
    }
}

#[cfg(test)]
mod test {
    use crate::kdtree::{Insertion, KDTreeBuilder, KDTreeError};

    #[test]
    fn insert_counts_and_balances() {
        let mut tree = KDTreeBuilder::<f64>::new(2)
            .balance_tolerance(1)
            .finish()
            .unwrap();
        // sorted input degenerates into a chain without rebalancing
        for i in 0..64u32 {
            let p = [i as f64, i as f64];
            assert_eq!(tree.insert(&p, i, false).unwrap(), Insertion::Inserted);
            tree.validate().unwrap();
        }
        assert_eq!(tree.len(), 64);
        assert!(tree.max_depth() <= 8);
    }

    #[test]
    fn duplicate_policy() {
        let mut tree = KDTreeBuilder::<f64>::new(2).finish().unwrap();
        assert_eq!(tree.insert(&[1., 2.], 1, false).unwrap(), Insertion::Inserted);
        assert_eq!(tree.insert(&[1., 2.], 2, false).unwrap(), Insertion::Rejected);
        assert_eq!(tree.len(), 1);

        assert_eq!(tree.insert(&[1., 2.], 2, true).unwrap(), Insertion::Inserted);
        assert_eq!(tree.len(), 2);
        assert_eq!(tree.insert(&[1., 3.], 3, false).unwrap(), Insertion::Inserted);
        assert!(tree.contains(&[1., 2.]).unwrap());
        assert!(!tree.contains(&[2., 1.]).unwrap());
        tree.validate().unwrap();
    }

    #[test]
    fn duplicates_are_found_across_tied_splits() {
        let mut tree = KDTreeBuilder::<f64>::new(2)
            .balance_tolerance(1)
            .finish()
            .unwrap();
        // many points share x = 0, so ties on the split coordinate are broken by id
        for id in 0..50u32 {
            let _ = tree.insert(&[0., id as f64], id, false).unwrap();
        }
        for id in 0..50u32 {
            assert_eq!(
                tree.insert(&[0., id as f64], 100 + id, false).unwrap(),
                Insertion::Rejected
            );
        }
        assert_eq!(tree.len(), 50);
        tree.validate().unwrap();
    }

    #[test]
    fn rejects_invalid_points() {
        let mut tree = KDTreeBuilder::<f32>::new(3).finish().unwrap();
        assert_eq!(
            tree.insert(&[1., 2.], 1, true).unwrap_err(),
            KDTreeError::DimensionMismatch {
                expected: 3,
                found: 2
            }
        );
        assert_eq!(
            tree.insert(&[1., f32::INFINITY, 0.], 1, true).unwrap_err(),
            KDTreeError::NonFiniteCoordinate
        );
        assert!(tree.is_empty());
    }
}
