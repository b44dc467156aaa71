//! Products of dimension sizes over ranges of axes.

use std::ops::Range;

use crate::sym_expr::DimExpr;

/// Return the simplified product of the sizes of `shape[range]`.
///
/// The product of an empty range is 1.
///
/// Panics if `range` is out of bounds for `shape`.
pub fn shape_product(shape: &[DimExpr], range: Range<usize>) -> DimExpr {
    shape[range]
        .iter()
        .cloned()
        .fold(DimExpr::Value(1), |prod, dim| prod * dim)
        .simplify()
}

/// Return true if the product of `lhs[lhs_range]` is provably equal to the
/// product of `rhs[rhs_range]`.
pub fn shape_product_eq(
    lhs: &[DimExpr],
    lhs_range: Range<usize>,
    rhs: &[DimExpr],
    rhs_range: Range<usize>,
) -> bool {
    shape_product(lhs, lhs_range) == shape_product(rhs, rhs_range)
}

/// Create a `Vec<DimExpr>` from a list of sizes and symbol names.
///
/// ```
/// use tenfuse_shape::{dim_exprs, DimExpr};
///
/// let shape = dim_exprs!("batch", 16, 64);
/// assert_eq!(shape[0], DimExpr::symbol("batch"));
/// assert_eq!(shape[1], DimExpr::Value(16));
/// ```
#[macro_export]
macro_rules! dim_exprs {
    ($($x:expr),* $(,)?) => {
        vec![$($crate::DimExpr::from($x)),*]
    };
}
