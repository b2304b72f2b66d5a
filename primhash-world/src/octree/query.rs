use std::{ops::ControlFlow, time::Instant};

use glam::Vec3;
use primhash_lib::{math::bounds::Aabb, octree::bounds::NodeBounds};
use rustc_hash::FxHashSet;
use slotmap::SlotMap;

use super::{
    node::{NodeId, Nodes},
    PrimitiveKey, PrimitiveSlot,
};
use crate::{
    check::{CheckResult, CheckResults},
    primitive::{Primitive, PrimitiveOwner},
    stats::{OctreeStat, OctreeStats},
    trace::{TraceFlag, TraceFlags},
    visibility::{Containment, VisibilitySet},
};

/// State of a single query while it walks the tree.
pub(super) struct Traversal<'a, P> {
    pub(super) nodes: &'a Nodes,
    pub(super) primitives: &'a mut SlotMap<PrimitiveKey, PrimitiveSlot<P>>,
    pub(super) stats: &'a mut OctreeStats,
    /// The visit tag of this query.
    pub(super) tag: u32,
}

impl<P> Traversal<'_, P> {
    /// Tags the primitive as visited and returns it, unless this query already visited it.
    pub(super) fn visit(&mut self, key: PrimitiveKey) -> Option<&P> {
        let slot = &mut self.primitives[key];
        if slot.tag == self.tag {
            return None;
        }
        slot.tag = self.tag;
        Some(&slot.primitive)
    }

    /// Whether this query already visited the primitive, without tagging it.
    fn is_visited(&self, key: PrimitiveKey) -> bool {
        self.primitives[key].tag == self.tag
    }

    fn mark_visited(&mut self, key: PrimitiveKey) {
        self.primitives[key].tag = self.tag;
    }

    /// Tags and collects every primitive at and below `node`.
    pub(super) fn all_primitives(&mut self, node: NodeId, out: &mut Vec<PrimitiveKey>) {
        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            if self.visit(key).is_some() {
                out.push(key);
            }
        }
        if let Some(children) = &nodes[node].children {
            for &child in children.values() {
                self.all_primitives(child, out);
            }
        }
    }
}

impl<P: Primitive> Traversal<'_, P> {
    /// Counts and performs a broad-phase box test.
    fn box_box(&mut self, a: Aabb, b: Aabb) -> bool {
        let start = Instant::now();
        let hit = a.intersects(b);
        self.stats.record(OctreeStat::BoxBox, start.elapsed());
        hit
    }

    pub(super) fn point_check(
        &mut self,
        location: Vec3,
        extent: Vec3,
        flags: TraceFlags,
        root_bounds: NodeBounds,
    ) -> CheckResults<P::Owner> {
        let mut check = PointCheck {
            location,
            extent,
            aabb: Aabb::from_center_extent(location, extent),
            flags,
            results: CheckResults::new(),
        };
        let _ = self.point_check_node(&mut check, NodeId::ROOT, root_bounds);
        check.results
    }

    fn point_check_node(
        &mut self,
        check: &mut PointCheck<P::Owner>,
        node: NodeId,
        bounds: NodeBounds,
    ) -> ControlFlow<()> {
        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            let Some(primitive) = self.visit(key) else {
                continue;
            };
            let Some(owner) = primitive.owner() else {
                continue;
            };
            if !primitive.should_collide()
                || !primitive.blocks_non_zero_extent()
                || !owner.should_trace(primitive, None, check.flags)
            {
                continue;
            }

            let primitive_aabb = primitive.bounds().to_aabb();
            if !self.box_box(primitive_aabb, check.aabb) {
                continue;
            }

            let primitive = &self.primitives[key].primitive;
            if let Some(hit) = primitive.point_check(check.location, check.extent) {
                check
                    .results
                    .push(CheckResult::from_hit(hit, Some(key), Some(owner)));
                if check.flags.contains(TraceFlag::StopAtFirstHit) {
                    return ControlFlow::Break(());
                }
            }
        }

        if let Some(children) = &nodes[node].children {
            for octant in bounds.find_children(check.aabb) {
                self.point_check_node(check, children[octant], bounds.child(octant))?;
            }
        }
        ControlFlow::Continue(())
    }

    pub(super) fn radius_check(
        &mut self,
        location: Vec3,
        radius: f32,
        root_bounds: NodeBounds,
    ) -> CheckResults<P::Owner> {
        let mut check = RadiusCheck {
            location,
            radius_squared: radius * radius,
            aabb: Aabb::from_center_extent(location, Vec3::splat(radius)),
            owners: FxHashSet::default(),
            results: CheckResults::new(),
        };
        self.radius_check_node(&mut check, NodeId::ROOT, root_bounds);
        check.results
    }

    fn radius_check_node(
        &mut self,
        check: &mut RadiusCheck<P::Owner>,
        node: NodeId,
        bounds: NodeBounds,
    ) {
        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            let Some(primitive) = self.visit(key) else {
                continue;
            };
            let Some(owner) = primitive.owner() else {
                continue;
            };
            if check.owners.contains(&owner) {
                continue;
            }

            let distance_squared = primitive.bounds().origin.distance_squared(check.location);
            if distance_squared < check.radius_squared {
                check.owners.insert(owner.clone());
                check.results.push(CheckResult::new(Some(key), Some(owner)));
            }
        }

        if let Some(children) = &nodes[node].children {
            for octant in bounds.find_children(check.aabb) {
                self.radius_check_node(check, children[octant], bounds.child(octant));
            }
        }
    }

    pub(super) fn encroachment_check(
        &mut self,
        actor: &P::Owner,
        aabb: Aabb,
        flags: TraceFlags,
        root_bounds: NodeBounds,
    ) -> CheckResults<P::Owner> {
        let mut check = EncroachmentCheck {
            actor,
            aabb,
            flags,
            owners: FxHashSet::default(),
            results: CheckResults::new(),
        };
        self.encroachment_check_node(&mut check, NodeId::ROOT, root_bounds);
        check.results
    }

    fn encroachment_check_node(
        &mut self,
        check: &mut EncroachmentCheck<P::Owner>,
        node: NodeId,
        bounds: NodeBounds,
    ) {
        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            let Some(primitive) = self.visit(key) else {
                continue;
            };
            let Some(owner) = primitive.owner() else {
                continue;
            };
            if !primitive.should_collide()
                || check.owners.contains(&owner)
                || owner.is_based_on(check.actor)
                || !owner.should_trace(primitive, Some(check.actor), check.flags)
                || (check.actor.is_interpolating() && owner.is_world_geometry())
            {
                continue;
            }

            let primitive_aabb = primitive.bounds().to_aabb();
            if !self.box_box(primitive_aabb, check.aabb) {
                continue;
            }

            // the overlap test covers the whole owner, so other primitives of it can be skipped
            check.owners.insert(owner.clone());
            if let Some(hit) = check.actor.is_overlapping(&owner) {
                check
                    .results
                    .push(CheckResult::from_hit(hit, Some(key), Some(owner)));
            }
        }

        if let Some(children) = &nodes[node].children {
            for octant in bounds.find_children(check.aabb) {
                self.encroachment_check_node(check, children[octant], bounds.child(octant));
            }
        }
    }

    pub(super) fn overlap_check(
        &mut self,
        actor: Option<&P::Owner>,
        aabb: Aabb,
        rigid_body_only: bool,
        root_bounds: NodeBounds,
    ) -> CheckResults<P::Owner> {
        let mut results = CheckResults::new();
        self.overlap_check_node(
            actor,
            aabb,
            rigid_body_only,
            &mut results,
            NodeId::ROOT,
            root_bounds,
        );
        results
    }

    fn overlap_check_node(
        &mut self,
        actor: Option<&P::Owner>,
        aabb: Aabb,
        rigid_body_only: bool,
        results: &mut CheckResults<P::Owner>,
        node: NodeId,
        bounds: NodeBounds,
    ) {
        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            let Some(primitive) = self.visit(key) else {
                continue;
            };
            let Some(owner) = primitive.owner() else {
                continue;
            };
            if actor == Some(&owner) || (rigid_body_only && !primitive.blocks_rigid_body()) {
                continue;
            }

            if primitive.bounds().to_aabb().intersects(aabb) {
                results.push(CheckResult::new(Some(key), Some(owner)));
            }
        }

        if let Some(children) = &nodes[node].children {
            for octant in bounds.find_children(aabb) {
                self.overlap_check_node(
                    actor,
                    aabb,
                    rigid_body_only,
                    results,
                    children[octant],
                    bounds.child(octant),
                );
            }
        }
    }

    pub(super) fn intersecting_primitives(
        &mut self,
        aabb: Aabb,
        node: NodeId,
        bounds: NodeBounds,
        out: &mut Vec<PrimitiveKey>,
    ) {
        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            let Some(primitive) = self.visit(key) else {
                continue;
            };
            if primitive.bounds().to_aabb().intersects(aabb) {
                out.push(key);
            }
        }

        if let Some(children) = &nodes[node].children {
            for octant in bounds.find_children(aabb) {
                let child_bounds = bounds.child(octant);
                if child_bounds.is_inside(aabb) {
                    self.all_primitives(children[octant], out);
                } else {
                    self.intersecting_primitives(aabb, children[octant], child_bounds, out);
                }
            }
        }
    }

    pub(super) fn visible_primitives<V: VisibilitySet<P>>(
        &mut self,
        set: &V,
        subset: &V::Subset,
        node: NodeId,
        bounds: NodeBounds,
        out: &mut Vec<PrimitiveKey>,
    ) {
        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            if self.is_visited(key) {
                continue;
            }
            // primitives not visible through this subset might still be visible through another
            match set.contains_primitive(&self.primitives[key].primitive, subset) {
                Containment::ContainedBySet => {
                    self.mark_visited(key);
                    out.push(key);
                }
                Containment::NotContainedBySet => self.mark_visited(key),
                Containment::NotContainedBySubset => {}
            }
        }

        if let Some(children) = &nodes[node].children {
            for (octant, &child) in children {
                let child_bounds = bounds.child(octant);
                let child_subset = set.box_intersection_subset(
                    subset,
                    child_bounds.center(),
                    Vec3::splat(child_bounds.extent()),
                );
                if !set.is_subset_empty(&child_subset) {
                    self.visible_primitives(set, &child_subset, child, child_bounds, out);
                }
            }
        }
    }
}

struct PointCheck<O> {
    location: Vec3,
    extent: Vec3,
    aabb: Aabb,
    flags: TraceFlags,
    results: CheckResults<O>,
}

struct RadiusCheck<O> {
    location: Vec3,
    radius_squared: f32,
    aabb: Aabb,
    /// Owners that were already reported.
    owners: FxHashSet<O>,
    results: CheckResults<O>,
}

struct EncroachmentCheck<'a, O> {
    actor: &'a O,
    aabb: Aabb,
    flags: TraceFlags,
    /// Owners that were already tested against the actor.
    owners: FxHashSet<O>,
    results: CheckResults<O>,
}
