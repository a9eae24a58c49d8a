use tinyvec::TinyVec;

use crate::error::Result;
use crate::kdtree::node::Node;
use crate::kdtree::KDTree;
use crate::r#type::Coordinate;
use crate::util::check_point;

impl<N: Coordinate> KDTree<N> {
    /// Search the tree for items within a given axis-aligned box.
    ///
    /// - min: lower corner of the box
    /// - max: upper corner of the box
    ///
    /// Both corners are inclusive. Returns ids of found items, in no particular order.
    pub fn range(&self, min: &[N], max: &[N]) -> Result<Vec<u32>> {
        check_point(min, self.ndims())?;
        check_point(max, self.ndims())?;

        let contains = |coords: &[N]| {
            coords
                .iter()
                .zip(min.iter().zip(max))
                .all(|(c, (lo, hi))| c >= lo && c <= hi)
        };

        // Use TinyVec to avoid heap allocations
        let mut stack: TinyVec<[Option<&Node<N>>; 33]> = TinyVec::new();
        stack.push(self.root());

        let mut result: Vec<u32> = vec![];

        while let Some(entry) = stack.pop() {
            let Some(node) = entry else {
                continue;
            };

            if contains(&node.coords) {
                result.push(node.id);
            }

            // queue search in halves that intersect the query
            let axis = node.split_dim as usize;
            let split = node.split_value();
            if node.left.is_some() && min[axis] <= split {
                stack.push(node.left());
            }
            if node.right.is_some() && max[axis] >= split {
                stack.push(node.right());
            }
        }

        Ok(result)
    }
}
