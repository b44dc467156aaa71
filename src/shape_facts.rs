//! Shape information about values in a program.

use std::borrow::Cow;
use std::sync::RwLock;

use rustc_hash::FxHashMap;
use tenfuse_shape::DimExpr;

use crate::fusion::{AxisList, FusionError};
use crate::graph::{NodeId, Program};

/// Provides the shapes of values and decides equality of dimension sizes.
///
/// Axis resolution never evaluates shapes itself. It only asks whether the
/// product of the sizes of some axes of one value is provably equal to the
/// product of the sizes of some axes of another.
pub trait ShapeFacts {
    /// Return the symbolic shape of a value.
    fn shape(&self, value: NodeId) -> Result<Cow<'_, [DimExpr]>, FusionError>;

    /// Return the number of dimensions of a value.
    fn rank(&self, value: NodeId) -> Result<usize, FusionError> {
        Ok(self.shape(value)?.len())
    }

    /// Return true if the product of the sizes of `lhs_axes` in `lhs` is
    /// provably equal to the product of the sizes of `rhs_axes` in `rhs`.
    ///
    /// Returns false if either product cannot be determined.
    fn is_product_equal(
        &self,
        lhs: NodeId,
        lhs_axes: &[usize],
        rhs: NodeId,
        rhs_axes: &[usize],
    ) -> bool;
}

/// [`ShapeFacts`] implementation which reads shapes from a [`Program`].
///
/// Simplified products are cached, so one analysis should be created per
/// program and shared by all the queries made against it. The analysis can
/// be used from multiple threads.
pub struct ShapeAnalysis<'p> {
    program: &'p Program,
    products: RwLock<FxHashMap<(NodeId, AxisList), DimExpr>>,
}

impl<'p> ShapeAnalysis<'p> {
    pub fn new(program: &'p Program) -> Self {
        ShapeAnalysis {
            program,
            products: RwLock::new(FxHashMap::default()),
        }
    }

    pub fn program(&self) -> &'p Program {
        self.program
    }

    /// Return the simplified product of the sizes of `axes` in `value`.
    pub fn product(&self, value: NodeId, axes: &[usize]) -> Result<DimExpr, FusionError> {
        let key = (value, AxisList::from_slice(axes));
        if let Some(product) = self
            .products
            .read()
            .ok()
            .and_then(|cache| cache.get(&key).cloned())
        {
            return Ok(product);
        }

        let shape = self.shape(value)?;
        let mut product = DimExpr::Value(1);
        for &axis in axes {
            let dim = shape.get(axis).ok_or(FusionError::AxisOutOfRange {
                axis: axis as i64,
                rank: shape.len(),
            })?;
            product = product * dim.clone();
        }
        let product = product.simplify();

        if let Ok(mut cache) = self.products.write() {
            cache.insert(key, product.clone());
        }
        Ok(product)
    }

    /// Return the number of cached products.
    pub fn cached_products(&self) -> usize {
        self.products.read().map(|cache| cache.len()).unwrap_or(0)
    }
}

impl ShapeFacts for ShapeAnalysis<'_> {
    fn shape(&self, value: NodeId) -> Result<Cow<'_, [DimExpr]>, FusionError> {
        let node = self
            .program
            .get_value(value)
            .ok_or(FusionError::NotAValue(value))?;
        node.shape().ok_or(FusionError::UnknownShape(value))
    }

    fn is_product_equal(
        &self,
        lhs: NodeId,
        lhs_axes: &[usize],
        rhs: NodeId,
        rhs_axes: &[usize],
    ) -> bool {
        match (self.product(lhs, lhs_axes), self.product(rhs, rhs_axes)) {
            (Ok(lhs), Ok(rhs)) => lhs == rhs,
            _ => false,
        }
    }
}
