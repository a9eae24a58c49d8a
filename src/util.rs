use std::cmp::Ordering;

use geo_traits::{CoordTrait, Dimensions};

use crate::error::{KDTreeError, Result};
use crate::r#type::Coordinate;

/// Squared euclidean distance between two points of the same dimension.
#[inline]
pub(crate) fn sq_dist<N: Coordinate>(a: &[N], b: &[N]) -> N {
    debug_assert_eq!(a.len(), b.len());
    a.iter().zip(b).fold(N::zero(), |acc, (&a, &b)| {
        let d = a - b;
        acc + d * d
    })
}

/// Compare two items by their key along `axis`: the coordinate first, the id second.
///
/// Coordinates in the tree are always finite, so the `partial_cmp` cannot fail.
#[inline]
pub(crate) fn cmp_key<N: Coordinate>(
    a_coords: &[N],
    a_id: u32,
    b_coords: &[N],
    b_id: u32,
    axis: usize,
) -> Ordering {
    a_coords[axis]
        .partial_cmp(&b_coords[axis])
        .unwrap_or(Ordering::Equal)
        .then(a_id.cmp(&b_id))
}

/// Check that a point has `ndims` finite coordinates.
pub(crate) fn check_point<N: Coordinate>(point: &[N], ndims: usize) -> Result<()> {
    if point.len() != ndims {
        return Err(KDTreeError::DimensionMismatch {
            expected: ndims,
            found: point.len(),
        });
    }
    if !point.iter().all(|c| c.is_finite()) {
        return Err(KDTreeError::NonFiniteCoordinate);
    }
    Ok(())
}

/// Collect the coordinates of any [`CoordTrait`] implementation, in axis order.
pub(crate) fn coord_to_vec<N: Coordinate>(coord: &impl CoordTrait<T = N>) -> Vec<N> {
    let size = match coord.dim() {
        Dimensions::Xy => 2,
        Dimensions::Xyz | Dimensions::Xym => 3,
        Dimensions::Xyzm => 4,
        Dimensions::Unknown(size) => size,
    };
    (0..size).map(|n| coord.nth_or_panic(n)).collect()
}
