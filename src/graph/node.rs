use std::borrow::Cow;

use tenfuse_shape::DimExpr;

use super::attrs::Attributes;
use super::NodeId;

#[derive(Debug)]
pub enum Node {
    Operator(OperatorNode),
    Value(ValueNode),
}

impl Node {
    /// Return the debug name of this node
    pub fn name(&self) -> Option<&str> {
        match self {
            Node::Operator(node) => node.name(),
            Node::Value(node) => node.name(),
        }
    }

    /// Return the contained operator, if this an operator node.
    pub fn as_operator(&self) -> Option<&OperatorNode> {
        match self {
            Node::Operator(op) => Some(op),
            Node::Value(_) => None,
        }
    }

    /// Return the contained value, if this a value node.
    pub fn as_value(&self) -> Option<&ValueNode> {
        match self {
            Node::Value(val) => Some(val),
            Node::Operator(_) => None,
        }
    }
}

/// A computation step in a [`Program`](crate::Program).
///
/// The operator kind is identified by a type name such as `"ReduceSum"` or
/// `"Reshape"`. Kind-specific parameters are stored as named attributes.
#[derive(Debug)]
pub struct OperatorNode {
    name: Option<String>,
    op_type: String,
    inputs: Box<[NodeId]>,
    outputs: Box<[NodeId]>,
    attrs: Attributes,
}

impl OperatorNode {
    pub fn new(
        name: Option<&str>,
        op_type: &str,
        attrs: Attributes,
        input_ids: &[NodeId],
        output_ids: &[NodeId],
    ) -> Self {
        OperatorNode {
            name: name.map(|s| s.to_owned()),
            op_type: op_type.to_owned(),
            inputs: input_ids.into(),
            outputs: output_ids.into(),
            attrs,
        }
    }

    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn op_type(&self) -> &str {
        &self.op_type
    }

    pub fn attrs(&self) -> &Attributes {
        &self.attrs
    }

    pub fn input_ids(&self) -> &[NodeId] {
        &self.inputs
    }

    pub fn output_ids(&self) -> &[NodeId] {
        &self.outputs
    }

    /// Return the ID of the value node for the `index`th operand.
    pub fn input(&self, index: usize) -> Option<NodeId> {
        self.inputs.get(index).copied()
    }

    /// Return the ID of the value node for the `index`th result.
    pub fn output(&self, index: usize) -> Option<NodeId> {
        self.outputs.get(index).copied()
    }
}

/// A tensor value which is an input to or output from operators.
#[derive(Debug)]
pub struct ValueNode {
    name: Option<String>,
    shape: Option<Vec<DimExpr>>,
}

impl ValueNode {
    pub fn new(name: Option<&str>, shape: Option<Vec<DimExpr>>) -> Self {
        ValueNode {
            name: name.map(|s| s.to_owned()),
            shape,
        }
    }

    /// Return the number of dimensions in this value, if it has shape information.
    pub fn ndim(&self) -> Option<usize> {
        self.shape.as_ref().map(|s| s.len())
    }

    pub fn shape(&self) -> Option<Cow<'_, [DimExpr]>> {
        self.shape.as_deref().map(Cow::Borrowed)
    }

    fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
