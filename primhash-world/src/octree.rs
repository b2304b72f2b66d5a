mod filter;
mod line;
pub mod node;
mod query;

use std::{mem::size_of, time::Instant};

use glam::Vec3;
use primhash_lib::{math::bounds::Aabb, octree::bounds::NodeBounds};
use slotmap::{new_key_type, SlotMap};
use tracing::{debug, error, info, trace, warn};

use self::{
    filter::{filter_test, Filter},
    line::LineCheck,
    node::{NodeId, Nodes},
    query::Traversal,
};
use crate::{
    check::{CheckResult, CheckResults},
    command::OctreeCommand,
    config::OctreeConfig,
    draw::{Color, DebugDraw},
    primitive::{FilterMode, Primitive},
    stats::{OctreeStat, OctreeStats},
    trace::{TraceFlag, TraceFlags},
    visibility::VisibilitySet,
};

new_key_type! {
    /// Identifies a primitive registered with a [`PrimitiveOctree`].
    pub struct PrimitiveKey;
}

/// Everything the octree keeps track of for a single registered primitive.
#[derive(Clone, Debug)]
pub(crate) struct PrimitiveSlot<P> {
    pub(crate) primitive: P,
    /// The box the primitive was last filtered with.
    pub(crate) aabb: Aabb,
    /// How the primitive was last filtered.
    pub(crate) mode: FilterMode,
    /// Every node the primitive is currently stored in; empty if it is not in the tree.
    pub(crate) nodes: Vec<NodeId>,
    /// The visit tag of the last query that looked at this primitive.
    pub(crate) tag: u32,
}

/// Initial visit tag; leaves plenty of room before wrapping around.
const INITIAL_TAG: u32 = i32::MAX as u32 / 4;

/// A loose octree of primitives, answering collision and visibility queries.
///
/// Primitives are registered with [`PrimitiveOctree::add_primitive`] and identified by the
/// returned [`PrimitiveKey`] from then on. Depending on whether gameplay has begun for their owner,
/// they are either stored in the single deepest node that wholly contains them or spread over every
/// node they overlap.
///
/// Nodes split lazily once they hold more than [`OctreeConfig::max_primitives_per_node`]
/// primitives and never merge again.
///
/// Queries take `&mut self`, since every query tags the primitives it visits. This ensures each
/// primitive is considered at most once per query, even if it is stored in multiple nodes.
pub struct PrimitiveOctree<P> {
    config: OctreeConfig,
    nodes: Nodes,
    primitives: SlotMap<PrimitiveKey, PrimitiveSlot<P>>,
    /// Incremented once per query.
    tag: u32,
    show_octree: bool,
    stats: OctreeStats,
}

impl<P: Primitive> PrimitiveOctree<P> {
    /// Constructs an empty [`PrimitiveOctree`] using [`OctreeConfig::default`].
    pub fn new() -> Self {
        Self::with_config(OctreeConfig::default())
    }

    pub fn with_config(config: OctreeConfig) -> Self {
        Self {
            config,
            nodes: Nodes::new(),
            primitives: SlotMap::with_key(),
            tag: INITIAL_TAG,
            show_octree: false,
            stats: OctreeStats::new(),
        }
    }

    pub fn config(&self) -> &OctreeConfig {
        &self.config
    }

    pub fn stats(&self) -> &OctreeStats {
        &self.stats
    }

    /// The bounds of the root node.
    pub fn root_bounds(&self) -> NodeBounds {
        NodeBounds::from_extent(self.config.half_world_max)
    }

    /// The number of registered primitives, including those currently not in the tree.
    pub fn len(&self) -> usize {
        self.primitives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.primitives.is_empty()
    }

    /// The number of allocated nodes, including the root.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn get(&self, key: PrimitiveKey) -> Option<&P> {
        self.primitives.get(key).map(|slot| &slot.primitive)
    }

    /// Mutable access to a primitive.
    ///
    /// Call [`Self::update_primitive`] after changing its bounds.
    pub fn get_mut(&mut self, key: PrimitiveKey) -> Option<&mut P> {
        self.primitives.get_mut(key).map(|slot| &mut slot.primitive)
    }

    /// The nodes a primitive is currently stored in.
    pub fn primitive_nodes(&self, key: PrimitiveKey) -> Option<&[NodeId]> {
        self.primitives.get(key).map(|slot| slot.nodes.as_slice())
    }

    /// The mode a primitive was last filtered with.
    pub fn filter_mode(&self, key: PrimitiveKey) -> Option<FilterMode> {
        self.primitives.get(key).map(|slot| slot.mode)
    }

    /// Whether a primitive is currently stored in any node.
    pub fn contains(&self, key: PrimitiveKey) -> bool {
        self.primitives
            .get(key)
            .is_some_and(|slot| !slot.nodes.is_empty())
    }

    /// The primitives stored directly at `node`.
    pub fn node_primitives(&self, node: NodeId) -> &[PrimitiveKey] {
        &self.nodes[node].primitives
    }

    /// The children of `node`, if it was split.
    pub fn node_children(&self, node: NodeId) -> Option<impl Iterator<Item = NodeId> + '_> {
        self.nodes[node]
            .children
            .as_ref()
            .map(|children| children.values().copied())
    }

    /// Registers `primitive` and filters it into the tree.
    ///
    /// Returns [`None`] and drops the primitive if it lies entirely outside of the world.
    pub fn add_primitive(&mut self, primitive: P) -> Option<PrimitiveKey> {
        let aabb = primitive.bounds().to_aabb();
        if !self.is_inside_world(aabb) {
            warn!(min = ?aabb.min(), max = ?aabb.max(), "primitive lies outside of the world");
            return None;
        }

        let key = self.primitives.insert(PrimitiveSlot {
            primitive,
            aabb,
            mode: FilterMode::SingleNode,
            nodes: Vec::new(),
            tag: self.tag,
        });
        self.update_primitive(key);
        Some(key)
    }

    /// Filters a registered primitive into the tree again, e.g. after it moved.
    ///
    /// Unlinks the primitive first if it is still in the tree. Returns whether it ends up in the
    /// tree, which is not the case if it now lies entirely outside of the world.
    ///
    /// # Panics
    ///
    /// Panics if `key` is not registered.
    pub fn update_primitive(&mut self, key: PrimitiveKey) -> bool {
        let start = Instant::now();

        if !self.primitives[key].nodes.is_empty() {
            debug!(?key, "primitive already in octree");
            self.unlink_primitive(key);
        }

        let aabb = self.primitives[key].primitive.bounds().to_aabb();
        if !self.is_inside_world(aabb) {
            warn!(?key, min = ?aabb.min(), max = ?aabb.max(), "primitive lies outside of the world");
            return false;
        }
        let slot = &mut self.primitives[key];
        slot.aabb = aabb;
        slot.mode = FilterMode::for_primitive(&slot.primitive);

        let bounds = self.root_bounds();
        Filter {
            config: &self.config,
            nodes: &mut self.nodes,
            primitives: &mut self.primitives,
        }
        .filter(key, NodeId::ROOT, bounds);

        self.stats.record(OctreeStat::Add, start.elapsed());
        true
    }

    /// Removes a primitive from every node it is stored in, but keeps it registered.
    ///
    /// Does nothing if the primitive is not in the tree or not registered at all.
    pub fn unlink_primitive(&mut self, key: PrimitiveKey) {
        let start = Instant::now();
        let Some(slot) = self.primitives.get_mut(key) else {
            return;
        };
        for node in slot.nodes.drain(..) {
            self.nodes[node].primitives.retain(|&other| other != key);
        }
        self.stats.record(OctreeStat::Remove, start.elapsed());
    }

    /// Removes a primitive from the tree and unregisters it.
    ///
    /// Returns [`None`] if `key` is not registered, which makes removing twice harmless.
    pub fn remove_primitive(&mut self, key: PrimitiveKey) -> Option<P> {
        self.unlink_primitive(key);
        self.primitives.remove(key).map(|slot| slot.primitive)
    }

    /// Unlinks every primitive and drops all nodes except for a fresh root.
    ///
    /// Primitives stay registered and can be filtered back in with [`Self::update_primitive`].
    pub fn clear(&mut self) {
        for (node, entry) in self.nodes.iter() {
            for &key in &entry.primitives {
                match self.primitives.get(key) {
                    Some(slot) if slot.nodes.contains(&node) => {}
                    _ => {
                        error!(?key, ?node, "primitive in octree, but not linked to its node");
                        debug_assert!(false, "primitive should be linked to its node");
                    }
                }
            }
        }

        for slot in self.primitives.values_mut() {
            slot.nodes.clear();
        }
        self.nodes = Nodes::new();
    }

    /// Collects the nodes a box would be filtered into using `mode`, based on the current shape of
    /// the tree.
    ///
    /// Matches the nodes a primitive with bounds `aabb` would be stored in, unless storing it would
    /// split a node.
    pub fn filter_test(&self, aabb: Aabb, mode: FilterMode) -> Vec<NodeId> {
        let mut nodes = Vec::new();
        filter_test(
            &self.nodes,
            aabb,
            mode,
            NodeId::ROOT,
            self.root_bounds(),
            &mut nodes,
        );
        nodes
    }

    /// Traces a box of half size `extent` from `start` to `end`.
    ///
    /// A zero `extent` traces a ray, visiting nodes in the order the ray passes through them.
    /// Primitives owned by `source` or one of its owners are ignored.
    pub fn line_check(
        &mut self,
        end: Vec3,
        start: Vec3,
        extent: Vec3,
        flags: TraceFlags,
        source: Option<&P::Owner>,
    ) -> CheckResults<P::Owner> {
        let timer = Instant::now();
        let zero_extent = extent == Vec3::ZERO;
        let root_bounds = self.root_bounds();

        let mut check = LineCheck::new(end, start, extent, flags, source);
        let mut traversal = self.traversal();
        if zero_extent {
            traversal.zero_extent_line_check(&mut check, root_bounds);
        } else {
            traversal.non_zero_extent_line_check(&mut check, root_bounds);
        }
        let results = check.into_results();

        let stat = if zero_extent {
            OctreeStat::ZeroExtentLineCheck
        } else {
            OctreeStat::NonZeroExtentLineCheck
        };
        self.stats.record(stat, timer.elapsed());
        trace!(tag = self.tag, zero_extent, hits = results.len(), "line check");
        results
    }

    /// Traces like [`Self::line_check`], but only returns the hit with the smallest time.
    pub fn single_line_check(
        &mut self,
        end: Vec3,
        start: Vec3,
        extent: Vec3,
        flags: TraceFlags,
        source: Option<&P::Owner>,
    ) -> Option<CheckResult<P::Owner>> {
        self.line_check(end, start, extent, flags | TraceFlag::SingleResult, source)
            .into_first_hit()
    }

    /// Finds primitives overlapping a box of half size `extent` placed at `location`.
    ///
    /// With `single_result`, stops at the first hit. Finds nothing if `extent` is negative or
    /// anything is NaN.
    pub fn point_check(
        &mut self,
        location: Vec3,
        extent: Vec3,
        flags: TraceFlags,
        single_result: bool,
    ) -> CheckResults<P::Owner> {
        if Aabb::checked_new(location - extent, location + extent).is_none() {
            return CheckResults::new();
        }

        let timer = Instant::now();
        let mut flags = flags;
        if single_result {
            flags |= TraceFlag::StopAtFirstHit;
        }

        let root_bounds = self.root_bounds();
        let results = self
            .traversal()
            .point_check(location, extent, flags, root_bounds);

        self.stats.record(OctreeStat::PointCheck, timer.elapsed());
        trace!(tag = self.tag, hits = results.len(), "point check");
        results
    }

    /// Finds the owners of primitives whose bounds origin lies closer than `radius` to `location`.
    ///
    /// Every owner is reported only once. Finds nothing if `radius` is negative or anything is NaN.
    pub fn radius_check(&mut self, location: Vec3, radius: f32) -> CheckResults<P::Owner> {
        let reach = Vec3::splat(radius);
        if Aabb::checked_new(location - reach, location + reach).is_none() {
            return CheckResults::new();
        }

        let timer = Instant::now();
        let root_bounds = self.root_bounds();
        let results = self
            .traversal()
            .radius_check(location, radius, root_bounds);

        self.stats.record(OctreeStat::RadiusCheck, timer.elapsed());
        trace!(tag = self.tag, hits = results.len(), "radius check");
        results
    }

    /// Finds the owners that `actor` overlaps once its collision bounds are at `aabb`.
    ///
    /// Nothing attached to `actor` is reported, and neither is world geometry if `actor` is
    /// interpolating. Every owner is reported only once.
    pub fn encroachment_check(
        &mut self,
        actor: &P::Owner,
        aabb: Aabb,
        flags: TraceFlags,
    ) -> CheckResults<P::Owner> {
        if !aabb.is_valid() {
            return CheckResults::new();
        }

        let timer = Instant::now();
        let root_bounds = self.root_bounds();
        let results = self
            .traversal()
            .encroachment_check(actor, aabb, flags, root_bounds);

        self.stats
            .record(OctreeStat::EncroachmentCheck, timer.elapsed());
        trace!(tag = self.tag, hits = results.len(), "encroachment check");
        results
    }

    /// Finds every primitive whose bounds overlap `aabb`, ignoring those owned by `actor`.
    pub fn overlap_check(
        &mut self,
        actor: Option<&P::Owner>,
        aabb: Aabb,
        rigid_body_only: bool,
    ) -> CheckResults<P::Owner> {
        if !aabb.is_valid() {
            return CheckResults::new();
        }

        let root_bounds = self.root_bounds();
        let results = self
            .traversal()
            .overlap_check(actor, aabb, rigid_body_only, root_bounds);

        trace!(tag = self.tag, hits = results.len(), "overlap check");
        results
    }

    /// Every primitive whose bounds intersect `aabb`.
    pub fn intersecting_primitives(&mut self, aabb: Aabb) -> Vec<PrimitiveKey> {
        let root_bounds = self.root_bounds();
        let mut primitives = Vec::new();
        self.traversal().intersecting_primitives(
            aabb,
            NodeId::ROOT,
            root_bounds,
            &mut primitives,
        );
        primitives
    }

    /// Every primitive that `set` reports as visible.
    pub fn visible_primitives<V: VisibilitySet<P>>(&mut self, set: &V) -> Vec<PrimitiveKey> {
        let root_bounds = self.root_bounds();
        let mut primitives = Vec::new();
        self.traversal().visible_primitives(
            set,
            &set.full_subset(),
            NodeId::ROOT,
            root_bounds,
            &mut primitives,
        );
        primitives
    }

    /// Every primitive in the tree, each one exactly once.
    pub fn all_primitives(&mut self) -> Vec<PrimitiveKey> {
        let mut primitives = Vec::new();
        self.traversal()
            .all_primitives(NodeId::ROOT, &mut primitives);
        primitives
    }

    /// Draws the bounds of every node, if enabled with the `SHOWOCTREE` command.
    pub fn tick(&self, draw: &mut impl DebugDraw) {
        if self.show_octree {
            self.draw(draw, Color::CYAN);
        }
    }

    /// Draws the bounds of every node.
    pub fn draw(&self, draw: &mut impl DebugDraw, color: Color) {
        let mut pending = vec![(NodeId::ROOT, self.root_bounds())];
        while let Some((node, bounds)) = pending.pop() {
            draw.draw_wire_box(bounds.to_aabb(), color);
            if let Some(children) = &self.nodes[node].children {
                pending.extend(
                    children
                        .iter()
                        .map(|(octant, &child)| (child, bounds.child(octant))),
                );
            }
        }
    }

    /// Handles a console command; returns whether it was meant for the octree.
    pub fn exec(&mut self, command: &str) -> bool {
        let Some(command) = OctreeCommand::parse(command) else {
            return false;
        };
        match command {
            OctreeCommand::ToggleShow => self.show_octree = !self.show_octree,
            OctreeCommand::ShowStats => {
                info!(memory_used = self.memory_used(), "octree stats\n{}", self.stats);
            }
            OctreeCommand::ResetStats => self.stats.reset(),
        }
        true
    }

    /// Whether node bounds are drawn on [`Self::tick`].
    pub fn is_showing(&self) -> bool {
        self.show_octree
    }

    /// Approximate number of bytes used by nodes and back-references.
    pub fn memory_used(&self) -> usize {
        let nodes = self.nodes.capacity() * size_of::<node::OctreeNode>();
        let node_primitives = self
            .nodes
            .iter()
            .map(|(_, node)| node.primitives.capacity() * size_of::<PrimitiveKey>())
            .sum::<usize>();
        let back_references = self
            .primitives
            .values()
            .map(|slot| slot.nodes.capacity() * size_of::<NodeId>())
            .sum::<usize>();
        size_of::<Self>() + nodes + node_primitives + back_references
    }

    /// Whether `aabb` touches the world cube at all.
    fn is_inside_world(&self, aabb: Aabb) -> bool {
        self.root_bounds().to_aabb().intersects(aabb)
    }

    /// Starts a new query, invalidating the visit tags of all primitives.
    ///
    /// Once the tag wraps around, every primitive is reset to tag zero so that no stale tag can
    /// match a later query.
    fn traversal(&mut self) -> Traversal<'_, P> {
        self.tag = match self.tag.checked_add(1) {
            Some(tag) => tag,
            None => {
                debug!("visit tag wrapped around");
                for slot in self.primitives.values_mut() {
                    slot.tag = 0;
                }
                1
            }
        };
        Traversal {
            nodes: &self.nodes,
            primitives: &mut self.primitives,
            stats: &mut self.stats,
            tag: self.tag,
        }
    }
}

impl<P: Primitive> Default for PrimitiveOctree<P> {
    fn default() -> Self {
        Self::new()
    }
}
