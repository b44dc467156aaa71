use std::num::NonZero;

/// ID of an operator or value node in a [`Program`](crate::Program).
///
/// IDs are allocated sequentially as nodes are added, so they also identify
/// the order in which nodes were added.
#[derive(Copy, Clone, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub struct NodeId(NonZero<u32>);

impl NodeId {
    /// Return the underlying u32 value of the ID.
    pub fn as_u32(self) -> u32 {
        self.0.get() - 1
    }

    /// Return the underlying ID value as a usize, for slice indexing.
    pub fn as_usize(self) -> usize {
        self.as_u32() as usize
    }

    /// Construct a node ID from a u32 value.
    ///
    /// Panics if the value is `u32::MAX`.
    pub fn from_u32(value: u32) -> NodeId {
        // IDs are stored offset by one so that zero is available as a niche,
        // making `Option<NodeId>` the same size as `NodeId`.
        assert!(value < u32::MAX, "node ID out of range");
        NodeId(NonZero::<u32>::MIN.saturating_add(value))
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.as_u32().fmt(f)
    }
}

impl std::fmt::Debug for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "NodeId({})", self.as_u32())
    }
}

#[cfg(test)]
mod tests {
    use super::NodeId;

    #[test]
    fn test_node_id() {
        let id = NodeId::from_u32(0);
        assert_eq!(id.as_u32(), 0);
        assert_eq!(NodeId::from_u32(41).as_usize(), 41);
        assert_eq!(format!("{:?}", NodeId::from_u32(7)), "NodeId(7)");
        assert_eq!(
            std::mem::size_of::<Option<NodeId>>(),
            std::mem::size_of::<NodeId>()
        );
    }
}
