//! tenfuse computes axis correspondences between the inputs and outputs of
//! tensor operators, for use by an operator fusion pass.
//!
//! # Overview
//!
//! A program is a graph of operator and value nodes, built using [`Program`].
//! Values carry symbolic shapes made of [`DimExpr`](tenfuse_shape::DimExpr)s,
//! so dimensions such as a batch size need not be known in advance.
//!
//! For each operator kind whose axes do not map one-to-one from input to
//! output, the [`fusion`] module has a function which resolves the mapping:
//!
//! - Reductions: which input axes are reduced, and whether they are kept.
//! - Slices: which axes are sliced, and whether they are dropped.
//! - Broadcasts: which `(input, output)` axis pairs were not broadcast.
//! - Reshapes: how input and output axes split into groups of equal size.
//!
//! These functions query shapes through the [`ShapeFacts`] trait. The
//! [`ShapeAnalysis`] implementation reads shapes from a program and caches
//! simplified products of dimensions.
//!
//! # Planning
//!
//! [`AxisPlanner`](fusion::AxisPlanner) runs the resolvers over every
//! relevant operator in a program:
//!
//! ```
//! use tenfuse::fusion::{AxisInfo, AxisPlanner, PlannerOptions};
//! use tenfuse::graph::Attributes;
//! use tenfuse::Program;
//! use tenfuse_shape::dim_exprs;
//!
//! let mut program = Program::new();
//! let x = program.add_value(Some("x"), Some(dim_exprs!("batch", 6)));
//! let y = program.add_value(Some("y"), Some(dim_exprs!("batch", 2, 3)));
//! let reshape = program.add_op(Some("reshape"), "Reshape", Attributes::new(), &[x], &[y]);
//!
//! let plan = AxisPlanner::new(PlannerOptions::default()).plan(&program);
//! assert_eq!(
//!     plan.get(reshape),
//!     Some(&AxisInfo::Reshape {
//!         partition: vec![(0, 0), (1, 1), (2, 3)]
//!     })
//! );
//! ```
//!
//! Operators whose attributes or shapes are invalid are recorded in the plan
//! as rejected candidates instead of aborting planning.
//!
//! # Environment variables
//!
//! [`PlannerOptions::from_env`](fusion::PlannerOptions::from_env) reads:
//!
//! - `TENFUSE_DIAGNOSTICS` - One of "off", "warn" or "info". At "warn",
//!   rejected candidates are printed. At "info", resolved operators are
//!   printed too.
//! - `TENFUSE_PARALLEL` - Set to "0" to resolve operators on the calling
//!   thread instead of the Rayon thread pool.

pub mod env;
pub mod fusion;
pub mod graph;
mod shape_facts;

pub use fusion::{ErrorKind, FusionError};
pub use graph::{NodeId, Program};
pub use shape_facts::{ShapeAnalysis, ShapeFacts};
