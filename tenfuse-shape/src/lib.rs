//! Symbolic dimension sizes for tensor shapes.
//!
//! Shapes in a program that is compiled ahead of time are often only partly
//! known. A language model for example will have inputs of shape `(batch,
//! seq)` where `batch` and `seq` are not known until the program runs. Other
//! dimensions are derived from these, such as a `Reshape` which merges
//! `(batch, seq, 64)` into `(batch * seq, 64)`.
//!
//! This crate represents such sizes as [`DimExpr`] expressions and provides
//! the simplification needed to decide whether two sizes, or two products of
//! sizes, are provably equal. Decisions about which axes of two tensors
//! correspond to each other depend on these equality tests.

mod product;
mod sym_expr;

pub use product::{shape_product, shape_product_eq};
pub use sym_expr::{DimExpr, Symbol};
