use tenfuse_shape::{shape_product_eq, DimExpr};

use super::FusionError;
use crate::graph::OperatorNode;
use crate::shape_facts::ShapeFacts;

/// Partition the axes of a reshape's input and output into groups with equal
/// element counts.
///
/// The result is a list of `(input_end, output_end)` breakpoints, starting at
/// `(0, 0)` and ending at `(input_rank, output_rank)`. If either shape has
/// rank 0, the other can only contain size-1 dims and the result is just
/// `[(0, 0)]`. Between two consecutive
/// breakpoints `(i0, o0)` and `(i1, o1)`, the product of `input_shape[i0..i1]`
/// equals the product of `output_shape[o0..o1]`. Each such group can be
/// treated as an independent reshape.
///
/// Groups are found by a greedy forward scan which grows the output group
/// first and only grows the input group once the output side is exhausted,
/// so the groups are as small as the scan can make them. Trailing size-1
/// dimensions on either side are merged into the last group.
///
/// Sizes are compared symbolically. If the total products of the two shapes
/// are not provably equal, [`FusionError::ShapeProductMismatch`] is returned.
pub fn partition_reshape_axes(
    input_shape: &[DimExpr],
    output_shape: &[DimExpr],
) -> Result<Vec<(usize, usize)>, FusionError> {
    let input_rank = input_shape.len();
    let output_rank = output_shape.len();

    if !shape_product_eq(input_shape, 0..input_rank, output_shape, 0..output_rank) {
        return Err(FusionError::ShapeProductMismatch);
    }

    let mut last = (0, 0);
    let mut partition = vec![last];
    let (mut i, mut j) = (1, 1);

    while i <= input_rank && j <= output_rank {
        if shape_product_eq(input_shape, last.0..i, output_shape, last.1..j) {
            last = (i, j);
            i += 1;
            j += 1;
            if i > input_rank || j > output_rank {
                // Any remaining dims on the other side have size 1.
                last = (input_rank, output_rank);
            }
            partition.push(last);
        } else if j < output_rank {
            j += 1;
        } else if i < input_rank {
            i += 1;
            j = last.1 + 1;
        } else {
            return Err(FusionError::NoReshapePartition);
        }
    }

    Ok(partition)
}

/// Partition the axes of a reshape operator's first input and first output.
///
/// See [`partition_reshape_axes`].
pub fn reshape_axis_partition(
    op: &OperatorNode,
    facts: &impl ShapeFacts,
) -> Result<Vec<(usize, usize)>, FusionError> {
    let input = op.input(0).ok_or(FusionError::MissingInput(0))?;
    let output = op.output(0).ok_or(FusionError::MissingOutput(0))?;
    let input_shape = facts.shape(input)?;
    let output_shape = facts.shape(output)?;
    partition_reshape_axes(&input_shape, &output_shape)
}
