//! Read-only program graph consumed by fusion planning.

mod attrs;
mod node;
mod node_id;

pub use attrs::{AttrError, Attribute, Attributes};
pub use node::{Node, OperatorNode, ValueNode};
pub use node_id::NodeId;

use tenfuse_shape::DimExpr;

/// A program consisting of operators and the tensor values which flow between
/// them.
///
/// Each node has a numeric ID and an optional debug name. Value nodes carry
/// the symbolic shape of the tensor, if known. Operator nodes refer to their
/// operand and result values by ID.
///
/// Programs are built once and then only read. A `Program` can be shared
/// between threads while fusion decisions are computed.
#[derive(Debug, Default)]
pub struct Program {
    nodes: Vec<Node>,
}

impl Program {
    /// Create a new empty program.
    pub fn new() -> Program {
        Program { nodes: Vec::new() }
    }

    fn add_node(&mut self, node: Node) -> NodeId {
        let id = NodeId::from_u32(self.nodes.len() as u32);
        self.nodes.push(node);
        id
    }

    /// Add a value node to the program.
    ///
    /// `shape` is the symbolic shape of the value, or `None` if not known.
    pub fn add_value(&mut self, name: Option<&str>, shape: Option<Vec<DimExpr>>) -> NodeId {
        self.add_node(Node::Value(ValueNode::new(name, shape)))
    }

    /// Add an operator node to the program.
    ///
    /// `inputs` and `outputs` are the IDs of the value nodes that the operator
    /// reads and writes.
    pub fn add_op(
        &mut self,
        name: Option<&str>,
        op_type: &str,
        attrs: Attributes,
        inputs: &[NodeId],
        outputs: &[NodeId],
    ) -> NodeId {
        self.add_node(Node::Operator(OperatorNode::new(
            name, op_type, attrs, inputs, outputs,
        )))
    }

    /// Retrieve a node by ID.
    pub fn get_node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(id.as_usize())
    }

    /// Retrieve a value node by ID.
    pub fn get_value(&self, id: NodeId) -> Option<&ValueNode> {
        self.get_node(id).and_then(|n| n.as_value())
    }

    /// Retrieve an operator node by ID.
    pub fn get_operator(&self, id: NodeId) -> Option<&OperatorNode> {
        self.get_node(id).and_then(|n| n.as_operator())
    }

    /// Return the debug name for a node.
    pub fn node_name(&self, id: NodeId) -> String {
        self.get_node(id)
            .and_then(|node| node.name())
            .map(|s| s.to_string())
            .unwrap_or_else(|| format!("[ID: {}]", id))
    }

    /// Iterate over operator nodes in the order they were added.
    pub fn operators(&self) -> impl Iterator<Item = (NodeId, &OperatorNode)> {
        self.nodes.iter().enumerate().filter_map(|(i, node)| {
            node.as_operator()
                .map(|op| (NodeId::from_u32(i as u32), op))
        })
    }

    /// Return the total number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
