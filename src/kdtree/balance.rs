//! Subtree rebuilding by recursive median selection.
//!
//! Rotations would change which dimension a node splits on, so an unbalanced subtree is instead
//! drained into its `(coords, id)` entries and rebuilt from scratch around the median of the
//! subtree root's split dimension.

use std::cmp::{self, Ordering};

use tracing::trace;

use crate::kdtree::index::KDTreeMetadata;
use crate::kdtree::node::{Link, Node};
use crate::r#type::Coordinate;

/// The content of a node, moved out of the tree during a rebuild.
#[derive(Debug)]
pub(crate) struct Entry<N: Coordinate> {
    pub(crate) coords: Box<[N]>,
    pub(crate) id: u32,
}

impl KDTreeMetadata {
    /// Rebuild the subtree in `link` if the heights of its children differ by more than
    /// `tolerance`. Returns `true` if a rebuild happened.
    pub(crate) fn rebalance<N: Coordinate>(&self, link: &mut Link<N>, tolerance: u32) -> bool {
        if link.as_ref().is_some_and(|node| node.skew() > tolerance) {
            self.rebuild(link);
            true
        } else {
            false
        }
    }

    /// Replace the subtree in `link` by a balanced subtree holding the same entries, rooted at
    /// the same depth.
    pub(crate) fn rebuild<N: Coordinate>(&self, link: &mut Link<N>) {
        let Some(node) = link.take() else {
            return;
        };
        let depth = node.depth;
        let mut entries = Vec::new();
        drain(Some(node), &mut entries);
        trace!(size = entries.len(), depth, "rebuilding subtree");
        *link = self.build(&mut entries, depth);
    }

    /// Build a balanced subtree from `entries`, with its root at `depth`.
    ///
    /// The coordinates are moved out of `entries`, which must not be reused afterwards.
    pub(crate) fn build<N: Coordinate>(&self, entries: &mut [Entry<N>], depth: u32) -> Link<N> {
        if entries.is_empty() {
            return None;
        }
        let split_dim = self.split_dim(depth);

        // middle index
        let m = entries.len() >> 1;

        // sort entries around the middle index so that lower keys lie on the left
        select(entries, m, 0, entries.len() - 1, split_dim as usize);

        let (lower, rest) = entries.split_at_mut(m);
        let (median, upper) = rest.split_first_mut()?;
        let mut node = Node::new_leaf(
            std::mem::take(&mut median.coords),
            median.id,
            split_dim,
            depth,
        );
        node.left = self.build(lower, depth + 1);
        node.right = self.build(upper, depth + 1);
        node.update_height();
        Some(Box::new(node))
    }
}

/// Move every node of the subtree in `link` into `out`, releasing the nodes themselves.
pub(crate) fn drain<N: Coordinate>(link: Link<N>, out: &mut Vec<Entry<N>>) {
    if let Some(node) = link {
        let Node {
            coords,
            id,
            left,
            right,
            ..
        } = *node;
        out.push(Entry { coords, id });
        drain(left, out);
        drain(right, out);
    }
}

/// Custom Floyd-Rivest selection algorithm: reorder `entries` so that `[left..k-1]` hold keys
/// lower than or equal to the k-th key, and `[k+1..right]` keys greater than or equal to it.
fn select<N: Coordinate>(
    entries: &mut [Entry<N>],
    k: usize,
    mut left: usize,
    mut right: usize,
    axis: usize,
) {
    while right > left {
        if right - left > 600 {
            let n = (right - left + 1) as f64;
            let m = (k - left + 1) as f64;
            let z = f64::ln(n);
            let s = 0.5 * f64::exp((2.0 * z) / 3.0);
            let sd = 0.5
                * f64::sqrt((z * s * (n - s)) / n)
                * (if m - n / 2.0 < 0.0 { -1.0 } else { 1.0 });
            let new_left = cmp::max(left, f64::floor(k as f64 - (m * s) / n + sd) as usize);
            let new_right = cmp::min(
                right,
                f64::floor(k as f64 + ((n - m) * s) / n + sd) as usize,
            );
            select(entries, k, new_left, new_right, axis);
        }

        let t_value = entries[k].coords[axis];
        let t_id = entries[k].id;
        let key = |entry: &Entry<N>| {
            entry.coords[axis]
                .partial_cmp(&t_value)
                .unwrap_or(Ordering::Equal)
                .then(entry.id.cmp(&t_id))
        };
        let mut i = left;
        let mut j = right;

        entries.swap(left, k);
        if key(&entries[right]) == Ordering::Greater {
            entries.swap(left, right);
        }

        while i < j {
            entries.swap(i, j);
            i += 1;
            j -= 1;
            while key(&entries[i]) == Ordering::Less {
                i += 1;
            }
            while key(&entries[j]) == Ordering::Greater {
                j -= 1;
            }
        }

        if key(&entries[left]) == Ordering::Equal {
            entries.swap(left, j);
        } else {
            j += 1;
            entries.swap(j, right);
        }

        if j <= k {
            left = j + 1;
        }
        if k <= j {
            right = j - 1;
        }
    }
}

#[cfg(test)]
mod test {
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    use super::*;
    use crate::kdtree::index::DimensionSchedule;

    fn metadata(ndims: u8) -> KDTreeMetadata {
        KDTreeMetadata {
            ndims,
            schedule: DimensionSchedule::cyclic(ndims),
            balance_tolerance: 1,
        }
    }

    fn entries(points: &[(f64, f64, u32)]) -> Vec<Entry<f64>> {
        points
            .iter()
            .map(|&(x, y, id)| Entry {
                coords: vec![x, y].into(),
                id,
            })
            .collect()
    }

    #[test]
    fn select_partitions_around_k() {
        let mut rng = StdRng::seed_from_u64(7);
        for len in [2, 3, 10, 101, 2000] {
            let mut items: Vec<Entry<f64>> = (0..len)
                .map(|id| Entry {
                    // few distinct values, so that ties on the coordinate are frequent
                    coords: vec![rng.gen_range(0..20) as f64].into(),
                    id,
                })
                .collect();
            let k = len as usize / 2;
            select(&mut items, k, 0, len as usize - 1, 0);

            let pivot = (items[k].coords[0], items[k].id);
            for item in &items[..k] {
                assert!((item.coords[0], item.id) <= pivot);
            }
            for item in &items[k + 1..] {
                assert!((item.coords[0], item.id) >= pivot);
            }
        }
    }

    #[test]
    fn build_places_median_at_root() {
        let meta = metadata(2);
        let mut items = entries(&[
            (3., 0., 1),
            (1., 5., 2),
            (4., 1., 3),
            (1., 2., 4),
            (5., 9., 5),
        ]);
        let root = meta.build(&mut items, 0).unwrap();

        assert_eq!(root.coords(), &[3., 0.]);
        assert_eq!(root.split_dim(), 0);
        assert_eq!(root.height(), 3);
        let left = root.left().unwrap();
        assert_eq!(left.depth(), 1);
        assert_eq!(left.split_dim(), 1);
        assert!(left.coords()[0] <= 3.);
        assert!(root.right().unwrap().coords()[0] >= 3.);
    }

    #[test]
    fn rebuild_keeps_entries_and_depth() {
        let meta = metadata(2);
        let mut chain: Link<f64> = None;
        // a degenerate chain hanging off depth 3
        for (i, x) in [5., 4., 3., 2., 1.].into_iter().enumerate() {
            let depth = 7 - i as u32;
            let split_dim = meta.split_dim(depth);
            let mut node = Node::new_leaf(vec![x, 0.].into(), i as u32, split_dim, depth);
            node.left = chain.take();
            node.update_height();
            chain = Some(Box::new(node));
        }
        assert_eq!(chain.as_ref().unwrap().height(), 5);

        assert!(meta.rebalance(&mut chain, 1));
        let root = chain.as_ref().unwrap();
        assert_eq!(root.depth(), 3);
        assert_eq!(root.split_dim(), meta.split_dim(3) as usize);
        assert_eq!(root.height(), 3);
        assert!(root.skew() <= 1);

        let mut out = Vec::new();
        drain(chain, &mut out);
        let mut ids: Vec<u32> = out.iter().map(|entry| entry.id).collect();
        ids.sort();
        assert_eq!(ids, vec![0, 1, 2, 3, 4]);
    }
}
