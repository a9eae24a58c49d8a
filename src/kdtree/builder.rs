use std::marker::PhantomData;

use tracing::debug;

use crate::error::{KDTreeError, Result};
use crate::kdtree::balance::Entry;
use crate::kdtree::index::{
    DimensionSchedule, KDTreeMetadata, DEFAULT_BALANCE_TOLERANCE, MAX_BALANCE_TOLERANCE,
};
use crate::kdtree::KDTree;
use crate::r#type::Coordinate;
use crate::util::check_point;

/// A builder to create a [`KDTree`].
///
/// ```
/// use dyn_kdtree::kdtree::KDTreeBuilder;
///
/// let tree = KDTreeBuilder::<f64>::new(3)
///     .balance_tolerance(2)
///     .dimension_schedule(vec![2, 0, 1])
///     .finish()
///     .unwrap();
/// assert_eq!(tree.ndims(), 3);
/// assert_eq!(tree.balance_tolerance(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct KDTreeBuilder<N: Coordinate> {
    ndims: usize,
    balance_tolerance: u32,
    schedule: Option<Vec<usize>>,
    phantom: PhantomData<N>,
}

impl<N: Coordinate> KDTreeBuilder<N> {
    /// Create a new builder for a tree with `ndims` dimensions.
    pub fn new(ndims: usize) -> Self {
        Self {
            ndims,
            balance_tolerance: DEFAULT_BALANCE_TOLERANCE,
            schedule: None,
            phantom: PhantomData,
        }
    }

    /// Set the balance tolerance: the maximum difference between the heights of the two
    /// subtrees of any node.
    ///
    /// A tree with two nodes always has a skew of one, so values below 1 are raised to 1.
    /// Values above [`MAX_BALANCE_TOLERANCE`] make [`finish`][Self::finish] fail, as they would
    /// let the tree degenerate into long chains.
    pub fn balance_tolerance(mut self, tolerance: u32) -> Self {
        self.balance_tolerance = tolerance.max(1);
        self
    }

    /// Replace the default `depth mod ndims` split schedule by a custom cycle of dimensions.
    pub fn dimension_schedule(mut self, dims: Vec<usize>) -> Self {
        self.schedule = Some(dims);
        self
    }

    fn metadata(&self) -> Result<KDTreeMetadata> {
        let ndims: u8 = match self.ndims.try_into() {
            Ok(0) | Err(_) => return Err(KDTreeError::InvalidDimensions(self.ndims)),
            Ok(ndims) => ndims,
        };
        if self.balance_tolerance > MAX_BALANCE_TOLERANCE {
            return Err(KDTreeError::InvalidBalanceTolerance(self.balance_tolerance));
        }
        let schedule = match &self.schedule {
            Some(dims) => DimensionSchedule::try_new(dims, self.ndims)?,
            None => DimensionSchedule::cyclic(ndims),
        };
        Ok(KDTreeMetadata {
            ndims,
            schedule,
            balance_tolerance: self.balance_tolerance,
        })
    }

    /// Consume this builder, creating an empty tree.
    pub fn finish(self) -> Result<KDTree<N>> {
        Ok(KDTree::from_parts(self.metadata()?, None, 0))
    }

    /// Consume this builder, bulk loading the given `(point, id)` items into a tree of minimum
    /// height.
    ///
    /// Every point is validated before the tree is built. Duplicate coordinates are kept.
    pub fn finish_with_items<I, P>(self, items: I) -> Result<KDTree<N>>
    where
        I: IntoIterator<Item = (P, u32)>,
        P: AsRef<[N]>,
    {
        let metadata = self.metadata()?;
        let mut entries = items
            .into_iter()
            .map(|(point, id)| {
                let point = point.as_ref();
                check_point(point, metadata.ndims())?;
                Ok(Entry {
                    coords: point.into(),
                    id,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        debug!(num_items = entries.len(), "bulk loading kd-tree");
        let root = metadata.build(&mut entries, 0);
        Ok(KDTree::from_parts(metadata, root, entries.len()))
    }
}
