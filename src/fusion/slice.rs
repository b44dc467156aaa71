use super::FusionError;
use crate::graph::OperatorNode;

/// Return the sliced axes of a slice operator and whether the sliced axes are
/// kept in the output.
///
/// The axes are read from the `axes` attribute, which must not be empty. If
/// the `decrease_axis` attribute is non-empty the sliced axes are removed from
/// the output, and `decrease_axis` must then list exactly the same axes, in
/// the same order, as `axes`.
///
/// Axes are returned as specified by the attribute, without resolving
/// negative values.
pub fn slice_axes(op: &OperatorNode) -> Result<(Vec<i64>, bool), FusionError> {
    let axes = op.attrs().get_i64_array("axes")?;
    let decrease_axis = op.attrs().get_i64_array("decrease_axis")?;

    if axes.is_empty() {
        return Err(FusionError::EmptySliceAxes);
    }

    if decrease_axis.is_empty() {
        return Ok((axes, true));
    }

    if decrease_axis != axes {
        return Err(FusionError::DecreaseAxisMismatch {
            axes,
            decrease_axis,
        });
    }

    Ok((axes, false))
}
