use std::ops::{Index, IndexMut};

use enum_map::{Enum, EnumMap};
use primhash_lib::math_enums::Octant;

use super::PrimitiveKey;

/// Identifies a node within a [`PrimitiveOctree`](super::PrimitiveOctree).
///
/// Nodes are never freed individually, so a [`NodeId`] stays valid until the octree is cleared.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub const ROOT: Self = Self(0);

    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A single node of the octree.
#[derive(Clone, Debug, Default, PartialEq)]
pub(crate) struct OctreeNode {
    /// Primitives stored at this node, not counting those of its children.
    pub(crate) primitives: Vec<PrimitiveKey>,
    /// Either no children or all eight of them.
    pub(crate) children: Option<EnumMap<Octant, NodeId>>,
}

/// Flat storage for all nodes of an octree.
///
/// Children of a node are always allocated as eight consecutive nodes.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Nodes {
    nodes: Vec<OctreeNode>,
}

impl Nodes {
    /// Storage holding nothing but an empty root.
    pub(crate) fn new() -> Self {
        Self {
            nodes: vec![OctreeNode::default()],
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.nodes.len()
    }

    pub(crate) fn capacity(&self) -> usize {
        self.nodes.capacity()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (NodeId, &OctreeNode)> {
        self.nodes.iter().enumerate().map(|(index, node)| {
            let index = u32::try_from(index).expect("node count should fit into u32");
            (NodeId(index), node)
        })
    }

    /// Allocates the eight children of `node` and returns them.
    ///
    /// # Panics
    ///
    /// Panics if `node` already has children.
    pub(crate) fn split(&mut self, node: NodeId) -> EnumMap<Octant, NodeId> {
        assert!(self[node].children.is_none(), "node should not be split yet");

        let first = u32::try_from(self.nodes.len()).expect("node count should fit into u32");
        self.nodes
            .extend((0..Octant::LENGTH).map(|_| OctreeNode::default()));
        let children = EnumMap::from_fn(|octant: Octant| NodeId(first + octant.index() as u32));
        self[node].children = Some(children);
        children
    }
}

impl Index<NodeId> for Nodes {
    type Output = OctreeNode;

    fn index(&self, index: NodeId) -> &Self::Output {
        &self.nodes[index.index()]
    }
}

impl IndexMut<NodeId> for Nodes {
    fn index_mut(&mut self, index: NodeId) -> &mut Self::Output {
        &mut self.nodes[index.index()]
    }
}
