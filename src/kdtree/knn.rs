use std::cmp::Ordering;
use std::collections::BinaryHeap;

use geo_traits::CoordTrait;

use crate::error::Result;
use crate::kdtree::node::Node;
use crate::kdtree::KDTree;
use crate::r#type::Coordinate;
use crate::util::{check_point, coord_to_vec, sq_dist};

/// An item found by a proximity query.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Neighbor<N: Coordinate> {
    /// The id the item was inserted with.
    pub id: u32,
    /// The squared euclidean distance from the query point.
    pub distance: N,
}

impl<N: Coordinate> Eq for Neighbor<N> {}

impl<N: Coordinate> Ord for Neighbor<N> {
    fn cmp(&self, other: &Self) -> Ordering {
        // Distances are never NaN, as only finite points are accepted
        self.distance
            .partial_cmp(&other.distance)
            .unwrap_or(Ordering::Equal)
            .then(self.id.cmp(&other.id))
    }
}

impl<N: Coordinate> PartialOrd for Neighbor<N> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The `k` best candidates so far, with the worst one on top.
struct Candidates<N: Coordinate> {
    k: usize,
    heap: BinaryHeap<Neighbor<N>>,
}

impl<N: Coordinate> Candidates<N> {
    fn new(k: usize) -> Self {
        Self {
            k,
            heap: BinaryHeap::with_capacity(k + 1),
        }
    }

    #[inline]
    fn is_full(&self) -> bool {
        self.heap.len() >= self.k
    }

    /// The distance a point must not exceed to become a candidate, once the set is full.
    #[inline]
    fn worst_distance(&self) -> Option<N> {
        self.heap.peek().map(|worst| worst.distance)
    }

    fn offer(&mut self, candidate: Neighbor<N>) {
        if !self.is_full() {
            self.heap.push(candidate);
        } else if self.heap.peek().is_some_and(|worst| candidate < *worst) {
            self.heap.pop();
            self.heap.push(candidate);
        }
    }

    fn into_sorted_vec(self) -> Vec<Neighbor<N>> {
        self.heap.into_sorted_vec()
    }
}

impl<N: Coordinate> KDTree<N> {
    /// Find the `k` nearest neighbors of `query`.
    ///
    /// Results are sorted by ascending squared distance, ties being broken by ascending id.
    /// An item whose id equals `skip` is never returned, which is useful to search the
    /// neighbors of an item that is itself in the tree.
    ///
    /// ```
    /// use dyn_kdtree::kdtree::KDTree;
    ///
    /// let mut tree = KDTree::<f64>::new(2).unwrap();
    /// let _ = tree.insert(&[0., 0.], 1, false).unwrap();
    /// let _ = tree.insert(&[1., 1.], 2, false).unwrap();
    /// let _ = tree.insert(&[3., 3.], 3, false).unwrap();
    ///
    /// let results = tree.knn(&[0., 0.], 2, None).unwrap();
    /// let ids: Vec<u32> = results.iter().map(|n| n.id).collect();
    /// assert_eq!(ids, vec![1, 2]);
    /// assert_eq!(results[1].distance, 2.);
    ///
    /// let results = tree.knn(&[0., 0.], 1, Some(1)).unwrap();
    /// assert_eq!(results[0].id, 2);
    /// ```
    pub fn knn(&self, query: &[N], k: usize, skip: Option<u32>) -> Result<Vec<Neighbor<N>>> {
        check_point(query, self.ndims())?;

        let Some(root) = self.root.as_deref() else {
            return Ok(vec![]);
        };
        if k == 0 {
            return Ok(vec![]);
        }

        let mut candidates = Candidates::new(k.min(self.num_items));
        knn_search(root, query, skip, &mut candidates);
        Ok(candidates.into_sorted_vec())
    }

    /// Find the `k` nearest neighbors of the given coordinate.
    ///
    /// See [`knn`][Self::knn].
    pub fn knn_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        k: usize,
        skip: Option<u32>,
    ) -> Result<Vec<Neighbor<N>>> {
        self.knn(&coord_to_vec(coord), k, skip)
    }
}

fn knn_search<N: Coordinate>(
    node: &Node<N>,
    query: &[N],
    skip: Option<u32>,
    candidates: &mut Candidates<N>,
) {
    if skip != Some(node.id) {
        candidates.offer(Neighbor {
            id: node.id,
            distance: sq_dist(query, &node.coords),
        });
    }

    // search the side of the splitting plane that holds the query first
    let diff = query[node.split_dim as usize] - node.split_value();
    let (near, far) = if diff <= N::zero() {
        (node.left(), node.right())
    } else {
        (node.right(), node.left())
    };

    if let Some(near) = near {
        knn_search(near, query, skip, candidates);
    }
    if let Some(far) = far {
        // an equal distance can still win on id
        let visit = !candidates.is_full()
            || candidates
                .worst_distance()
                .map_or(true, |worst| diff * diff <= worst);
        if visit {
            knn_search(far, query, skip, candidates);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn candidates_keep_best_k() {
        let mut candidates = Candidates::<f64>::new(2);
        for (id, distance) in [(5, 4.), (1, 9.), (3, 4.), (2, 1.), (4, 4.)] {
            candidates.offer(Neighbor { id, distance });
        }
        let result = candidates.into_sorted_vec();
        assert_eq!(
            result,
            vec![
                Neighbor { id: 2, distance: 1. },
                Neighbor { id: 3, distance: 4. }
            ]
        );
    }

    #[test]
    fn empty_results() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        assert!(tree.knn(&[0., 0.], 3, None).unwrap().is_empty());

        let _ = tree.insert(&[0., 0.], 1, false).unwrap();
        assert!(tree.knn(&[0., 0.], 0, None).unwrap().is_empty());
        assert!(tree.knn(&[0., 0.], 1, Some(1)).unwrap().is_empty());
        assert!(tree.knn(&[0.], 1, None).is_err());
    }

    #[test]
    fn k_larger_than_tree() {
        let mut tree = KDTree::<f32>::new(1).unwrap();
        for i in 0..5u32 {
            let _ = tree.insert(&[i as f32], i, false).unwrap();
        }
        let result = tree.knn(&[10.], 100, None).unwrap();
        let ids: Vec<u32> = result.iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![4, 3, 2, 1, 0]);
    }

    #[test]
    fn geo_traits_query() {
        let mut tree = KDTree::<f64>::new(2).unwrap();
        let _ = tree.insert(&[0., 0.], 1, false).unwrap();
        let _ = tree.insert(&[5., 5.], 2, false).unwrap();
        let result = tree.knn_coord(&(4.0, 4.5), 1, None).unwrap();
        assert_eq!(result[0].id, 2);
        assert_eq!(result[0].distance, 1.25);
    }
}
