//! Axis reasoning for operator fusion.
//!
//! Fusing two operators requires knowing which axis of one operator's tensors
//! plays the same role as an axis of the other's. This module computes that
//! correspondence for the operator kinds whose axes are not simply identical
//! between input and output:
//!
//! - Reductions ([`reduce_axes`], [`reduce_keep_dims`])
//! - Slices ([`slice_axes`])
//! - Broadcasts ([`broadcast_endpoints`], [`non_broadcast_axis_pairs`])
//! - Reshapes ([`partition_reshape_axes`])
//!
//! All functions are pure and only read the program. Shape information is
//! obtained from a [`ShapeFacts`](crate::ShapeFacts) implementation passed
//! by the caller.
//!
//! The [`AxisPlanner`] applies these functions to every relevant operator in a
//! program and treats any error as a rejected fusion candidate.

use std::error::Error;
use std::fmt;

use smallvec::SmallVec;

use crate::graph::{AttrError, NodeId};

mod broadcast;
mod diagnostics;
mod planner;
mod reduce;
mod reshape;
mod slice;

pub use broadcast::{
    broadcast_endpoints, non_broadcast_axis_pairs, BroadcastOp, BroadcastToOp, ExpandOp,
};
pub use diagnostics::{DiagnosticLevel, Diagnostics};
pub use planner::{AxisInfo, AxisPlan, AxisPlanner, PlannerOptions};
pub use reduce::{reduce_axes, reduce_keep_dims, resolve_axis};
pub use reshape::{partition_reshape_axes, reshape_axis_partition};
pub use slice::slice_axes;

/// List of resolved axis indices.
pub type AxisList = SmallVec<[usize; 4]>;

/// Category of a [`FusionError`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ErrorKind {
    /// An attribute, axis or shape has a value the operation cannot accept.
    InvalidArgument,

    /// The operator's inputs and outputs are inconsistent with its kind.
    PreconditionNotMet,

    /// The operator kind is not supported by the function.
    Unimplemented,
}

/// Errors that occur while resolving axis correspondences.
#[derive(Clone, Debug, PartialEq)]
pub enum FusionError {
    /// An attribute is missing or has the wrong type.
    Attribute(AttrError),

    /// The operator has no operand at the given index.
    MissingInput(usize),

    /// The operator has no result at the given index.
    MissingOutput(usize),

    /// The node does not exist or is not a value.
    NotAValue(NodeId),

    /// The shape of a value is not known.
    UnknownShape(NodeId),

    /// An axis is outside `[-rank, rank)`.
    AxisOutOfRange { axis: i64, rank: usize },

    /// A slice operator has no axes.
    EmptySliceAxes,

    /// A slice operator's `decrease_axis` is non-empty and differs from `axes`.
    DecreaseAxisMismatch {
        axes: Vec<i64>,
        decrease_axis: Vec<i64>,
    },

    /// The input and output of a reshape have different element counts.
    ShapeProductMismatch,

    /// No partition of the reshape's axes into groups with equal products
    /// could be found.
    NoReshapePartition,

    /// A broadcast's output has lower rank than its input.
    RankDecrease {
        input_rank: usize,
        output_rank: usize,
    },

    /// The operator is not a supported broadcast kind.
    UnsupportedBroadcastOp(String),
}

impl FusionError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::RankDecrease { .. } => ErrorKind::PreconditionNotMet,
            Self::UnsupportedBroadcastOp(_) => ErrorKind::Unimplemented,
            Self::Attribute(_)
            | Self::MissingInput(_)
            | Self::MissingOutput(_)
            | Self::NotAValue(_)
            | Self::UnknownShape(_)
            | Self::AxisOutOfRange { .. }
            | Self::EmptySliceAxes
            | Self::DecreaseAxisMismatch { .. }
            | Self::ShapeProductMismatch
            | Self::NoReshapePartition => ErrorKind::InvalidArgument,
        }
    }
}

impl From<AttrError> for FusionError {
    fn from(val: AttrError) -> FusionError {
        FusionError::Attribute(val)
    }
}

impl fmt::Display for FusionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Attribute(err) => write!(f, "invalid attribute: {}", err),
            Self::MissingInput(index) => write!(f, "operator has no input {}", index),
            Self::MissingOutput(index) => write!(f, "operator has no output {}", index),
            Self::NotAValue(id) => write!(f, "node {} is not a value", id),
            Self::UnknownShape(id) => write!(f, "shape of value {} is unknown", id),
            Self::AxisOutOfRange { axis, rank } => {
                write!(f, "axis {} is out of range for rank {}", axis, rank)
            }
            Self::EmptySliceAxes => write!(f, "slice axes should not be empty"),
            Self::DecreaseAxisMismatch {
                axes,
                decrease_axis,
            } => write!(
                f,
                "decrease axis {:?} should be equal to slice axes {:?}",
                decrease_axis, axes
            ),
            Self::ShapeProductMismatch => {
                write!(f, "shape product should be equal for reshape operation")
            }
            Self::NoReshapePartition => write!(f, "reshape axes could not be partitioned"),
            Self::RankDecrease {
                input_rank,
                output_rank,
            } => write!(
                f,
                "broadcast output rank {} should be >= input rank {}",
                output_rank, input_rank
            ),
            Self::UnsupportedBroadcastOp(op_type) => {
                write!(f, "unsupported broadcast op \"{}\"", op_type)
            }
        }
    }
}

impl Error for FusionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Attribute(err) => Some(err),
            _ => None,
        }
    }
}
