use super::FusionError;
use crate::graph::{NodeId, OperatorNode};
use crate::shape_facts::ShapeFacts;

/// View of an `Expand` operator.
///
/// Inputs are the data to expand and a shape vector. The output has the
/// broadcast shape.
#[derive(Clone, Copy, Debug)]
pub struct ExpandOp<'a> {
    node: &'a OperatorNode,
}

impl ExpandOp<'_> {
    pub fn x(&self) -> Result<NodeId, FusionError> {
        self.node.input(0).ok_or(FusionError::MissingInput(0))
    }

    pub fn shape(&self) -> Result<NodeId, FusionError> {
        self.node.input(1).ok_or(FusionError::MissingInput(1))
    }

    pub fn out(&self) -> Result<NodeId, FusionError> {
        self.node.output(0).ok_or(FusionError::MissingOutput(0))
    }
}

/// View of a `Broadcast` operator.
///
/// The single input is broadcast to the output shape, which is given by the
/// operator's output value.
#[derive(Clone, Copy, Debug)]
pub struct BroadcastToOp<'a> {
    node: &'a OperatorNode,
}

impl BroadcastToOp<'_> {
    pub fn x(&self) -> Result<NodeId, FusionError> {
        self.node.input(0).ok_or(FusionError::MissingInput(0))
    }

    pub fn out(&self) -> Result<NodeId, FusionError> {
        self.node.output(0).ok_or(FusionError::MissingOutput(0))
    }
}

/// Operator kinds which broadcast an input to a larger shape.
#[derive(Clone, Copy, Debug)]
pub enum BroadcastOp<'a> {
    Expand(ExpandOp<'a>),
    Broadcast(BroadcastToOp<'a>),
}

impl<'a> BroadcastOp<'a> {
    /// Return a typed view of `node`, or an error if it is not a broadcast
    /// operator.
    pub fn from_op(node: &'a OperatorNode) -> Result<BroadcastOp<'a>, FusionError> {
        match node.op_type() {
            "Expand" => Ok(BroadcastOp::Expand(ExpandOp { node })),
            "Broadcast" => Ok(BroadcastOp::Broadcast(BroadcastToOp { node })),
            other => Err(FusionError::UnsupportedBroadcastOp(other.to_string())),
        }
    }

    /// Return the IDs of the value being broadcast and the broadcast result.
    pub fn endpoints(&self) -> Result<(NodeId, NodeId), FusionError> {
        match self {
            BroadcastOp::Expand(op) => Ok((op.x()?, op.out()?)),
            BroadcastOp::Broadcast(op) => Ok((op.x()?, op.out()?)),
        }
    }
}

/// Return the (input, output) value IDs of a broadcast operator.
pub fn broadcast_endpoints(op: &OperatorNode) -> Result<(NodeId, NodeId), FusionError> {
    BroadcastOp::from_op(op)?.endpoints()
}

/// Return the pairs of `(input_axis, output_axis)` of a broadcast operator
/// whose sizes are equal, meaning the axis was not broadcast.
///
/// Axes are aligned from the right, following standard broadcasting rules,
/// and pairs are returned starting from the last axis. Pairs whose sizes
/// differ or cannot be proven equal are skipped, and the scan carries on with
/// the next pair inward until the input's axes are exhausted.
pub fn non_broadcast_axis_pairs(
    op: &OperatorNode,
    facts: &impl ShapeFacts,
) -> Result<Vec<(usize, usize)>, FusionError> {
    let (input, output) = broadcast_endpoints(op)?;
    let input_rank = facts.rank(input)?;
    let output_rank = facts.rank(output)?;

    if output_rank < input_rank {
        return Err(FusionError::RankDecrease {
            input_rank,
            output_rank,
        });
    }

    let pairs = (1..=input_rank)
        .map(|i| (input_rank - i, output_rank - i))
        .filter(|&(input_axis, output_axis)| {
            facts.is_product_equal(input, &[input_axis], output, &[output_axis])
        })
        .collect();

    Ok(pairs)
}

#[cfg(test)]
mod tests {
    use tenfuse_shape::{dim_exprs, DimExpr};
    use tenfuse_testing::TestCases;

    use super::{broadcast_endpoints, non_broadcast_axis_pairs, BroadcastOp};
    use crate::fusion::{ErrorKind, FusionError};
    use crate::graph::{Attributes, NodeId, Program};
    use crate::shape_facts::ShapeAnalysis;

    fn broadcast_program(
        op_type: &str,
        input_shape: Vec<DimExpr>,
        output_shape: Vec<DimExpr>,
    ) -> (Program, NodeId) {
        let mut p = Program::new();
        let x = p.add_value(Some("x"), Some(input_shape));
        let out = p.add_value(Some("out"), Some(output_shape));
        let op = if op_type == "Expand" {
            let shape = p.add_value(Some("shape"), None);
            p.add_op(Some("expand"), op_type, Attributes::new(), &[x, shape], &[out])
        } else {
            p.add_op(Some("broadcast"), op_type, Attributes::new(), &[x], &[out])
        };
        (p, op)
    }

    #[test]
    fn test_broadcast_endpoints() {
        for op_type in ["Expand", "Broadcast"] {
            let (p, op) = broadcast_program(op_type, dim_exprs!(3), dim_exprs!(2, 3));
            let op_node = p.get_operator(op).unwrap();
            let (input, output) = broadcast_endpoints(op_node).unwrap();
            assert_eq!(p.node_name(input), "x");
            assert_eq!(p.node_name(output), "out");
        }

        let (p, op) = broadcast_program("Expand", dim_exprs!(3), dim_exprs!(2, 3));
        let view = BroadcastOp::from_op(p.get_operator(op).unwrap()).unwrap();
        let BroadcastOp::Expand(expand) = view else {
            panic!("expected expand op");
        };
        assert_eq!(p.node_name(expand.shape().unwrap()), "shape");
    }

    #[test]
    fn test_broadcast_endpoints_unsupported_op() {
        let (p, op) = broadcast_program("Add", dim_exprs!(3), dim_exprs!(3));
        let err = broadcast_endpoints(p.get_operator(op).unwrap()).err().unwrap();
        assert_eq!(err, FusionError::UnsupportedBroadcastOp("Add".into()));
        assert_eq!(err.kind(), ErrorKind::Unimplemented);
    }

    #[test]
    fn test_broadcast_endpoints_missing_values() {
        let mut p = Program::new();
        let x = p.add_value(None, None);
        let no_out = p.add_op(None, "Broadcast", Attributes::new(), &[x], &[]);
        let no_in = p.add_op(None, "Expand", Attributes::new(), &[], &[x]);

        assert_eq!(
            broadcast_endpoints(p.get_operator(no_out).unwrap()),
            Err(FusionError::MissingOutput(0))
        );
        assert_eq!(
            broadcast_endpoints(p.get_operator(no_in).unwrap()),
            Err(FusionError::MissingInput(0))
        );
    }

    #[test]
    fn test_non_broadcast_axis_pairs() {
        #[derive(Debug)]
        struct Case {
            input: Vec<DimExpr>,
            output: Vec<DimExpr>,
            expected: Vec<(usize, usize)>,
        }

        let cases = [
            // New leading dims only.
            Case {
                input: dim_exprs!(2, 3, 4),
                output: dim_exprs!(7, 8, 2, 3, 4),
                expected: vec![(2, 4), (1, 3), (0, 2)],
            },
            // Size-1 dims which are broadcast.
            Case {
                input: dim_exprs!(1, 3),
                output: dim_exprs!(5, 3),
                expected: vec![(1, 1)],
            },
            // A mismatch in the middle does not stop the scan.
            Case {
                input: dim_exprs!(2, 1, 4),
                output: dim_exprs!(2, 6, 4),
                expected: vec![(2, 2), (0, 0)],
            },
            Case {
                input: dim_exprs!(1, 1),
                output: dim_exprs!(3, 3),
                expected: vec![],
            },
            // Symbolic dims are compared symbolically.
            Case {
                input: dim_exprs!("seq", 1),
                output: dim_exprs!("batch", "seq", "hidden"),
                expected: vec![(0, 1)],
            },
            Case {
                input: dim_exprs!(),
                output: dim_exprs!(2, 3),
                expected: vec![],
            },
        ];

        cases.test_each(|case| {
            for op_type in ["Expand", "Broadcast"] {
                let (p, op) =
                    broadcast_program(op_type, case.input.clone(), case.output.clone());
                let facts = ShapeAnalysis::new(&p);
                let pairs = non_broadcast_axis_pairs(p.get_operator(op).unwrap(), &facts);
                assert_eq!(pairs.as_ref(), Ok(&case.expected));
            }
        })
    }

    #[test]
    fn test_non_broadcast_axis_pairs_rank_decrease() {
        let (p, op) = broadcast_program("Broadcast", dim_exprs!(2, 3, 4), dim_exprs!(3, 4));
        let facts = ShapeAnalysis::new(&p);
        let err = non_broadcast_axis_pairs(p.get_operator(op).unwrap(), &facts)
            .err()
            .unwrap();
        assert_eq!(
            err,
            FusionError::RankDecrease {
                input_rank: 3,
                output_rank: 2
            }
        );
        assert_eq!(err.kind(), ErrorKind::PreconditionNotMet);
    }
}
