use std::fmt::Debug;

use num_traits::Float;

/// A trait for types that can be used as coordinates of a [`KDTree`][crate::kdtree::KDTree].
///
/// This trait is sealed and cannot be implemented for external types. Squared distances are
/// accumulated in the coordinate type itself, so only floating point types are supported.
pub trait Coordinate: private::Sealed + Float + Debug + Send + Sync + 'static {}

impl Coordinate for f32 {}

impl Coordinate for f64 {}

// https://rust-lang.github.io/api-guidelines/future-proofing.html#sealed-traits-protect-against-downstream-implementations-c-sealed
mod private {
    pub trait Sealed {}

    impl Sealed for f32 {}
    impl Sealed for f64 {}
}
