use std::mem::take;

use primhash_lib::{math::bounds::Aabb, octree::bounds::NodeBounds};
use slotmap::SlotMap;

use super::{
    node::{NodeId, Nodes},
    PrimitiveKey, PrimitiveSlot,
};
use crate::{config::OctreeConfig, primitive::FilterMode};

/// Filters primitives down the octree, splitting nodes that overflow.
pub(super) struct Filter<'a, P> {
    pub(super) config: &'a OctreeConfig,
    pub(super) nodes: &'a mut Nodes,
    pub(super) primitives: &'a mut SlotMap<PrimitiveKey, PrimitiveSlot<P>>,
}

impl<P> Filter<'_, P> {
    /// Filters `key` into `node` and below, using the mode it was added with.
    pub(super) fn filter(&mut self, key: PrimitiveKey, node: NodeId, bounds: NodeBounds) {
        let slot = &self.primitives[key];
        let aabb = slot.aabb;
        match slot.mode {
            FilterMode::SingleNode => self.single_node(key, aabb, node, bounds),
            FilterMode::MultiNode => self.multi_node(key, aabb, node, bounds),
        }
    }

    /// Descends into the one child that wholly contains `aabb` for as long as there is one.
    fn single_node(&mut self, key: PrimitiveKey, aabb: Aabb, node: NodeId, bounds: NodeBounds) {
        let (mut node, mut bounds) = (node, bounds);
        while let (Some(children), Some(octant)) =
            (self.nodes[node].children, bounds.find_child(aabb))
        {
            node = children[octant];
            bounds = bounds.child(octant);
        }
        self.store(key, node, bounds);
    }

    /// Descends into every child that `aabb` overlaps, stopping at nodes it covers entirely.
    fn multi_node(&mut self, key: PrimitiveKey, aabb: Aabb, node: NodeId, bounds: NodeBounds) {
        match self.nodes[node].children {
            Some(children) if !bounds.is_inside(aabb) => {
                for octant in bounds.find_children(aabb) {
                    self.multi_node(key, aabb, children[octant], bounds.child(octant));
                }
            }
            _ => self.store(key, node, bounds),
        }
    }

    /// Stores `key` at `node`, first splitting the node if it is full.
    ///
    /// A split moves every primitive of the node down into the new children where possible.
    fn store(&mut self, key: PrimitiveKey, node: NodeId, bounds: NodeBounds) {
        let entry = &self.nodes[node];
        let full = entry.primitives.len() >= self.config.max_primitives_per_node;
        if !full || entry.children.is_some() || !self.config.can_split(bounds.extent()) {
            self.nodes[node].primitives.push(key);
            self.primitives[key].nodes.push(node);
            return;
        }

        let pending = take(&mut self.nodes[node].primitives);
        self.nodes.split(node);
        for pending_key in pending.into_iter().chain([key]) {
            self.primitives[pending_key]
                .nodes
                .retain(|&other| other != node);
            self.filter(pending_key, node, bounds);
        }
    }
}

/// Collects the nodes a box would be filtered into, without changing anything.
pub(super) fn filter_test(
    nodes: &Nodes,
    aabb: Aabb,
    mode: FilterMode,
    node: NodeId,
    bounds: NodeBounds,
    out: &mut Vec<NodeId>,
) {
    let Some(children) = nodes[node].children else {
        out.push(node);
        return;
    };

    match mode {
        FilterMode::SingleNode => match bounds.find_child(aabb) {
            Some(octant) => filter_test(
                nodes,
                aabb,
                mode,
                children[octant],
                bounds.child(octant),
                out,
            ),
            None => out.push(node),
        },
        FilterMode::MultiNode if bounds.is_inside(aabb) => out.push(node),
        FilterMode::MultiNode => {
            for octant in bounds.find_children(aabb) {
                filter_test(
                    nodes,
                    aabb,
                    mode,
                    children[octant],
                    bounds.child(octant),
                    out,
                );
            }
        }
    }
}
