use geo_traits::CoordTrait;
use tinyvec::TinyVec;

use crate::error::{KDTreeError, Result};
use crate::kdtree::node::Node;
use crate::kdtree::{KDTree, Neighbor};
use crate::r#type::Coordinate;
use crate::util::{check_point, coord_to_vec, sq_dist};

impl<N: Coordinate> KDTree<N> {
    /// Search the tree for all items within `max_distance` of `query`.
    ///
    /// The result is unordered, and every returned squared distance is at most
    /// `max_distance * max_distance`. An item whose id equals `skip` is never returned.
    /// A negative `max_distance` finds nothing.
    pub fn dnn(
        &self,
        query: &[N],
        max_distance: N,
        skip: Option<u32>,
    ) -> Result<Vec<Neighbor<N>>> {
        check_point(query, self.ndims())?;
        if max_distance.is_nan() {
            return Err(KDTreeError::NonFiniteCoordinate);
        }
        if max_distance < N::zero() {
            return Ok(vec![]);
        }

        let max_dist_squared = max_distance * max_distance;
        let mut result: Vec<Neighbor<N>> = vec![];

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[Option<&Node<N>>; 33]> = TinyVec::new();
        stack.push(self.root());

        while let Some(entry) = stack.pop() {
            let Some(node) = entry else {
                continue;
            };

            if skip != Some(node.id) {
                let distance = sq_dist(query, &node.coords);
                if distance <= max_dist_squared {
                    result.push(Neighbor {
                        id: node.id,
                        distance,
                    });
                }
            }

            // queue the far side only if the ball crosses the splitting plane
            let diff = query[node.split_dim as usize] - node.split_value();
            let (near, far) = if diff <= N::zero() {
                (node.left(), node.right())
            } else {
                (node.right(), node.left())
            };
            if far.is_some() && diff * diff <= max_dist_squared {
                stack.push(far);
            }
            if near.is_some() {
                stack.push(near);
            }
        }

        Ok(result)
    }

    /// Search the tree for all items within `max_distance` of the given coordinate.
    ///
    /// See [`dnn`][Self::dnn].
    pub fn dnn_coord(
        &self,
        coord: &impl CoordTrait<T = N>,
        max_distance: N,
        skip: Option<u32>,
    ) -> Result<Vec<Neighbor<N>>> {
        self.dnn(&coord_to_vec(coord), max_distance, skip)
    }
}
