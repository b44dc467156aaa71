use super::{AxisList, FusionError};
use crate::graph::OperatorNode;
use crate::shape_facts::ShapeFacts;

/// Resolve an axis given as a value in `[-rank, rank)` to a value in
/// `[0, rank)`.
pub fn resolve_axis(rank: usize, axis: i64) -> Result<usize, FusionError> {
    let resolved = if axis < 0 { axis + rank as i64 } else { axis };
    if resolved < 0 || resolved >= rank as i64 {
        return Err(FusionError::AxisOutOfRange { axis, rank });
    }
    Ok(resolved as usize)
}

/// Return the axes reduced by a reduction operator.
///
/// The axes are read from the `axis` attribute and resolved against the rank
/// of the first input. Negative axes count from the end. An empty `axis`
/// attribute means that all axes are reduced.
///
/// The order of the attribute is preserved. Axes are not sorted or
/// de-duplicated.
pub fn reduce_axes(op: &OperatorNode, facts: &impl ShapeFacts) -> Result<AxisList, FusionError> {
    let input = op.input(0).ok_or(FusionError::MissingInput(0))?;
    let rank = facts.rank(input)?;
    let axes = op.attrs().get_i64_array("axis")?;

    if axes.is_empty() {
        return Ok((0..rank).collect());
    }

    axes.iter().map(|&axis| resolve_axis(rank, axis)).collect()
}

/// Return true if a reduction operator keeps reduced axes as size-1
/// dimensions, as specified by its `keepdim` attribute.
pub fn reduce_keep_dims(op: &OperatorNode) -> Result<bool, FusionError> {
    Ok(op.attrs().get_bool("keepdim")?)
}

#[cfg(test)]
mod tests {
    use smallvec::smallvec;
    use tenfuse_shape::DimExpr;
    use tenfuse_testing::TestCases;

    use super::{reduce_axes, reduce_keep_dims, resolve_axis};
    use crate::fusion::{AxisList, ErrorKind, FusionError};
    use crate::graph::{AttrError, Attribute, Attributes, NodeId, Program};
    use crate::shape_facts::ShapeAnalysis;

    /// Build a program with a single reduction over an input of rank `rank`.
    fn reduce_program(rank: usize, attrs: Attributes) -> (Program, NodeId) {
        let mut p = Program::new();
        let shape = (0..rank).map(|i| DimExpr::Value(i as i64 + 2)).collect();
        let x = p.add_value(Some("x"), Some(shape));
        let y = p.add_value(Some("y"), None);
        let op = p.add_op(Some("reduce"), "ReduceSum", attrs, &[x], &[y]);
        (p, op)
    }

    #[test]
    fn test_resolve_axis() {
        assert_eq!(resolve_axis(3, 0), Ok(0));
        assert_eq!(resolve_axis(3, 2), Ok(2));
        assert_eq!(resolve_axis(3, -1), Ok(2));
        assert_eq!(resolve_axis(3, -3), Ok(0));
        assert_eq!(
            resolve_axis(3, 3),
            Err(FusionError::AxisOutOfRange { axis: 3, rank: 3 })
        );
        assert_eq!(
            resolve_axis(3, -4),
            Err(FusionError::AxisOutOfRange { axis: -4, rank: 3 })
        );
        assert!(resolve_axis(0, 0).is_err());
    }

    #[test]
    fn test_reduce_axes() {
        #[derive(Debug)]
        struct Case {
            rank: usize,
            axis: Vec<i64>,
            expected: Result<AxisList, FusionError>,
        }

        let cases = [
            // Empty axis list means reduce all.
            Case {
                rank: 3,
                axis: vec![],
                expected: Ok(smallvec![0, 1, 2]),
            },
            Case {
                rank: 0,
                axis: vec![],
                expected: Ok(smallvec![]),
            },
            Case {
                rank: 4,
                axis: vec![1, -1],
                expected: Ok(smallvec![1, 3]),
            },
            // Attribute order is preserved.
            Case {
                rank: 4,
                axis: vec![-1, 0, 2],
                expected: Ok(smallvec![3, 0, 2]),
            },
            Case {
                rank: 2,
                axis: vec![0, 2],
                expected: Err(FusionError::AxisOutOfRange { axis: 2, rank: 2 }),
            },
            Case {
                rank: 2,
                axis: vec![-3],
                expected: Err(FusionError::AxisOutOfRange { axis: -3, rank: 2 }),
            },
        ];

        cases.test_each(|case| {
            let attrs = Attributes::new().with("axis", case.axis.clone());
            let (p, op) = reduce_program(case.rank, attrs);
            let facts = ShapeAnalysis::new(&p);
            let op = p.get_operator(op).unwrap();
            assert_eq!(reduce_axes(op, &facts), case.expected);
        })
    }

    #[test]
    fn test_reduce_axes_invalid_attr() {
        let (p, op) = reduce_program(2, Attributes::new());
        let facts = ShapeAnalysis::new(&p);
        let err = reduce_axes(p.get_operator(op).unwrap(), &facts).err().unwrap();
        assert_eq!(
            err,
            FusionError::Attribute(AttrError::Missing("axis".into()))
        );
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let (p, op) = reduce_program(2, Attributes::new().with("axis", Attribute::Int64(0)));
        let facts = ShapeAnalysis::new(&p);
        let result = reduce_axes(p.get_operator(op).unwrap(), &facts);
        assert!(matches!(
            result,
            Err(FusionError::Attribute(AttrError::WrongType { .. }))
        ));
    }

    #[test]
    fn test_reduce_axes_unknown_input() {
        let mut p = Program::new();
        let x = p.add_value(None, None);
        let y = p.add_value(None, None);
        let attrs = Attributes::new().with("axis", vec![0i64]);
        let op = p.add_op(None, "ReduceMax", attrs.clone(), &[x], &[y]);
        let no_input = p.add_op(None, "ReduceMax", attrs, &[], &[y]);

        let facts = ShapeAnalysis::new(&p);
        assert_eq!(
            reduce_axes(p.get_operator(op).unwrap(), &facts),
            Err(FusionError::UnknownShape(x))
        );
        assert_eq!(
            reduce_axes(p.get_operator(no_input).unwrap(), &facts),
            Err(FusionError::MissingInput(0))
        );
    }

    #[test]
    fn test_reduce_keep_dims() {
        let (p, op) = reduce_program(2, Attributes::new().with("keepdim", true));
        assert_eq!(reduce_keep_dims(p.get_operator(op).unwrap()), Ok(true));

        let (p, op) = reduce_program(2, Attributes::new().with("keepdim", false));
        assert_eq!(reduce_keep_dims(p.get_operator(op).unwrap()), Ok(false));

        let (p, op) = reduce_program(2, Attributes::new().with("keepdim", vec![1i64]));
        assert!(reduce_keep_dims(p.get_operator(op).unwrap()).is_err());

        let (p, op) = reduce_program(2, Attributes::new());
        assert_eq!(
            reduce_keep_dims(p.get_operator(op).unwrap()),
            Err(FusionError::Attribute(AttrError::Missing("keepdim".into())))
        );
    }
}
