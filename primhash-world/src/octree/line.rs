use std::time::Instant;

use glam::Vec3;
use primhash_lib::{
    math::{bounds::Aabb, segment::LineSegment},
    octree::{
        bounds::NodeBounds,
        ray::{OctreeRay, SlabTimes},
    },
};

use super::{node::NodeId, query::Traversal, PrimitiveKey};
use crate::{
    check::{CheckResult, CheckResults},
    primitive::{Primitive, PrimitiveOwner},
    stats::OctreeStat,
    trace::{TraceFlag, TraceFlags},
};

/// Parameters and results of a single line check.
pub(super) struct LineCheck<'a, O> {
    segment: LineSegment,
    extent: Vec3,
    flags: TraceFlags,
    source: Option<&'a O>,
    results: CheckResults<O>,
    /// The hit with the smallest time so far; the first one found wins ties.
    ///
    /// Tracked instead of collecting every hit when only the nearest one is wanted.
    first: Option<CheckResult<O>>,
}

impl<'a, O: Clone> LineCheck<'a, O> {
    pub(super) fn new(
        end: Vec3,
        start: Vec3,
        extent: Vec3,
        flags: TraceFlags,
        source: Option<&'a O>,
    ) -> Self {
        Self {
            segment: LineSegment::new(start, end),
            extent,
            flags,
            source,
            results: CheckResults::new(),
            first: None,
        }
    }

    fn stops_at_first_hit(&self) -> bool {
        self.flags.contains(TraceFlag::StopAtFirstHit)
    }

    fn single_result(&self) -> bool {
        self.flags.contains(TraceFlag::SingleResult)
    }

    /// Whether only the nearest hit is kept while traversing.
    ///
    /// [`TraceFlag::StopAtFirstHit`] always wants the nearest hit, while checks with an extent
    /// that only want a [`TraceFlag::SingleResult`] still collect everything and pick the result
    /// at the end.
    fn keeps_nearest(&self) -> bool {
        self.stops_at_first_hit() || (self.single_result() && self.extent == Vec3::ZERO)
    }

    /// Nodes that the segment only reaches after this time cannot contribute anything.
    fn max_time(&self) -> f32 {
        self.first.as_ref().map_or(1.0, |first| first.time)
    }

    fn add_hit(&mut self, result: CheckResult<O>) {
        if self.keeps_nearest() {
            if self.first.as_ref().map_or(true, |first| result.time < first.time) {
                self.first = Some(result);
            }
        } else {
            self.results.push(result);
        }
    }

    /// The results of the finished check.
    ///
    /// With [`TraceFlag::SingleResult`] this is at most one result.
    pub(super) fn into_results(self) -> CheckResults<O> {
        let mut results = self.results;
        if let Some(first) = self.first {
            results.push(first);
        }
        if self.flags.contains(TraceFlag::SingleResult) {
            results.retain_first_hit();
        }
        results
    }
}

impl<P: Primitive> Traversal<'_, P> {
    /// Traces a ray through the tree, visiting children in the order the ray passes through them.
    pub(super) fn zero_extent_line_check(
        &mut self,
        check: &mut LineCheck<P::Owner>,
        root_bounds: NodeBounds,
    ) {
        let ray = OctreeRay::new(check.segment.start(), check.segment.direction());
        let bounds = ray.mirror_bounds(root_bounds);
        let times = ray.slab_times(bounds);
        if times.enters() {
            self.zero_extent_node(check, &ray, NodeId::ROOT, bounds, times);
        }
    }

    /// `bounds` are in the mirrored space of `ray`.
    fn zero_extent_node(
        &mut self,
        check: &mut LineCheck<P::Owner>,
        ray: &OctreeRay,
        node: NodeId,
        bounds: NodeBounds,
        times: SlabTimes,
    ) {
        if times.is_behind() || times.starts_after(check.max_time()) {
            return;
        }

        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            self.zero_extent_primitive(check, key);
        }

        if let Some(children) = &nodes[node].children {
            for (octant, child_times) in ray.child_walk(times, bounds) {
                let child = children[octant.mirrored(ray.mirror())];
                self.zero_extent_node(check, ray, child, bounds.child(octant), child_times);
            }
        }
    }

    fn zero_extent_primitive(&mut self, check: &mut LineCheck<P::Owner>, key: PrimitiveKey) {
        let Some(primitive) = self.visit(key) else {
            return;
        };
        let Some(owner) = primitive.owner() else {
            return;
        };

        let considered = if check.flags.contains(TraceFlag::ShadowCast) {
            primitive.casts_static_shadow()
        } else {
            primitive.should_collide() && primitive.blocks_zero_extent()
        };
        if !considered
            || is_source::<P>(check.source, &owner)
            || !owner.should_trace(primitive, check.source, check.flags)
        {
            return;
        }

        let bounds = primitive.bounds();
        let start = Instant::now();
        let hits_box = check.segment.hits_box(bounds.origin, bounds.box_extent);
        self.stats
            .record(OctreeStat::ZeroExtentLineBox, start.elapsed());
        if hits_box {
            self.line_check_primitive(check, key, owner, true);
        }
    }

    /// Traces a box along the segment through every node the swept box touches.
    pub(super) fn non_zero_extent_line_check(
        &mut self,
        check: &mut LineCheck<P::Owner>,
        root_bounds: NodeBounds,
    ) {
        let swept = Aabb::from_points(check.segment.start(), check.segment.end())
            .expanded(check.extent);
        self.non_zero_extent_node(check, swept, NodeId::ROOT, root_bounds);
    }

    fn non_zero_extent_node(
        &mut self,
        check: &mut LineCheck<P::Owner>,
        swept: Aabb,
        node: NodeId,
        bounds: NodeBounds,
    ) {
        let nodes = self.nodes;
        for &key in &nodes[node].primitives {
            self.non_zero_extent_primitive(check, key);
        }

        if let Some(children) = &nodes[node].children {
            for octant in bounds.find_children(swept) {
                let child_bounds = bounds.child(octant);
                let radii = Vec3::splat(child_bounds.extent()) + check.extent;
                let start = Instant::now();
                let hit_time = check
                    .segment
                    .clip(child_bounds.center(), radii)
                    .map(|(near, _)| near);
                self.stats
                    .record(OctreeStat::NonZeroExtentLineBox, start.elapsed());
                if hit_time.is_some_and(|near| near <= check.max_time()) {
                    self.non_zero_extent_node(check, swept, children[octant], child_bounds);
                }
            }
        }
    }

    fn non_zero_extent_primitive(&mut self, check: &mut LineCheck<P::Owner>, key: PrimitiveKey) {
        let Some(primitive) = self.visit(key) else {
            return;
        };
        let Some(owner) = primitive.owner() else {
            return;
        };

        if !primitive.should_collide()
            || !primitive.blocks_non_zero_extent()
            || is_source::<P>(check.source, &owner)
            || !owner.should_trace(primitive, check.source, check.flags)
        {
            return;
        }

        let bounds = primitive.bounds();
        let start = Instant::now();
        let hits_box = check
            .segment
            .hits_box(bounds.origin, bounds.box_extent + check.extent);
        self.stats
            .record(OctreeStat::NonZeroExtentLineBox, start.elapsed());
        if hits_box {
            self.line_check_primitive(check, key, owner, false);
        }
    }

    /// Runs the narrow-phase line check of a primitive that passed the broad phase.
    fn line_check_primitive(
        &mut self,
        check: &mut LineCheck<P::Owner>,
        key: PrimitiveKey,
        owner: P::Owner,
        zero_extent: bool,
    ) {
        let slot = &self.primitives[key];
        let start = Instant::now();
        let hit = slot.primitive.line_check(
            check.segment.end(),
            check.segment.start(),
            check.extent,
            check.flags,
        );
        self.stats.record(
            OctreeStat::line_primitive(zero_extent, slot.mode),
            start.elapsed(),
        );

        if let Some(hit) = hit {
            check.add_hit(CheckResult::from_hit(hit, Some(key), Some(owner)));
        }
    }
}

/// Whether `owner` belongs to the actor that started the trace.
fn is_source<P: Primitive>(source: Option<&P::Owner>, owner: &P::Owner) -> bool {
    source.is_some_and(|source| source == owner || source.is_owned_by(owner))
}

#[cfg(test)]
mod tests {
    use rand::{rngs::StdRng, Rng, SeedableRng};

    use primhash_lib::math_enums::Axis3;

    use super::*;
    use crate::{
        config::OctreeConfig,
        octree::PrimitiveOctree,
        test_util::{brute_force_line_hits, TestOwner, TestPrimitive},
        trace::ALL_COLLIDING,
    };

    const START: Vec3 = Vec3::new(-4000.0, 500.0, 500.0);
    const END: Vec3 = Vec3::new(4000.0, 500.0, 500.0);

    /// Three cubes on a line along +X, at x = 3000, 1000 and -1000, plus one cube off the line.
    ///
    /// The fourth cube splits the root, so the two rightmost cubes end up in a different node than
    /// the leftmost one.
    fn row() -> PrimitiveOctree<TestPrimitive> {
        let config = OctreeConfig::default().with_half_world_max(4096.0);
        let mut octree = PrimitiveOctree::with_config(config);
        for (id, center) in [
            Vec3::new(3000.0, 500.0, 500.0),
            Vec3::new(1000.0, 500.0, 500.0),
            Vec3::new(-1000.0, 500.0, 500.0),
            Vec3::new(-2000.0, -2000.0, -2000.0),
        ]
        .into_iter()
        .enumerate()
        {
            octree.add_primitive(TestPrimitive::cube(
                TestOwner::playing(id as u32),
                center,
                50.0,
            ));
        }
        assert_eq!(octree.node_count(), 9);
        octree
    }

    /// Owner ids and times of all results, ordered by time.
    fn hits(results: &CheckResults<TestOwner>) -> Vec<(u32, f32)> {
        let mut hits = results
            .iter()
            .map(|result| (result.owner.as_ref().unwrap().id, result.time))
            .collect::<Vec<_>>();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits
    }

    fn assert_hits(actual: &[(u32, f32)], expected: &[(u32, f32)]) {
        assert_eq!(actual.len(), expected.len(), "{actual:?} != {expected:?}");
        for (&(id, time), &(expected_id, expected_time)) in actual.iter().zip(expected) {
            assert_eq!(id, expected_id, "{actual:?} != {expected:?}");
            assert!(
                (time - expected_time).abs() < 1e-5,
                "{actual:?} != {expected:?}"
            );
        }
    }

    #[test]
    fn stop_at_first_hit_finds_nearest() {
        let mut octree = row();
        let results = octree.line_check(
            END,
            START,
            Vec3::ZERO,
            ALL_COLLIDING | TraceFlag::StopAtFirstHit,
            None,
        );
        assert_hits(&hits(&results), &[(2, 0.36875)]);

        let results = octree.line_check(
            START,
            END,
            Vec3::ZERO,
            ALL_COLLIDING | TraceFlag::StopAtFirstHit,
            None,
        );
        assert_hits(&hits(&results), &[(0, 0.11875)]);
    }

    #[test]
    fn collects_every_hit() {
        let mut octree = row();
        let results = octree.line_check(END, START, Vec3::ZERO, ALL_COLLIDING, None);
        assert_hits(
            &hits(&results),
            &[(2, 0.36875), (1, 0.61875), (0, 0.86875)],
        );
        assert_eq!(
            octree.stats().get(OctreeStat::ZeroExtentLineCheck).count,
            1
        );
    }

    #[test]
    fn single_result_is_nearest() {
        let mut octree = row();
        let result = octree
            .single_line_check(START, END, Vec3::ZERO, ALL_COLLIDING, None)
            .unwrap();
        assert_eq!(result.owner.unwrap().id, 0);
        assert!((result.time - 0.11875).abs() < 1e-5);

        let results = octree.line_check(
            END,
            START,
            Vec3::splat(10.0),
            ALL_COLLIDING | TraceFlag::SingleResult,
            None,
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results.newest().unwrap().owner.as_ref().unwrap().id, 2);
    }

    #[test]
    fn segment_ending_early() {
        let mut octree = row();
        let end = Vec3::new(1000.0, 500.0, 500.0);
        let results = octree.line_check(end, START, Vec3::ZERO, ALL_COLLIDING, None);
        let hits = hits(&results);
        assert_eq!(
            hits.iter().map(|&(id, _)| id).collect::<Vec<_>>(),
            [2, 1]
        );
    }

    #[test]
    fn ignores_source() {
        let mut octree = row();
        let source = TestOwner::playing(2);
        let results = octree.line_check(END, START, Vec3::ZERO, ALL_COLLIDING, Some(&source));
        assert_hits(&hits(&results), &[(1, 0.61875), (0, 0.86875)]);

        let results = octree.line_check(END, START, Vec3::splat(1.0), ALL_COLLIDING, Some(&source));
        assert_eq!(results.len(), 2);
    }

    #[test]
    fn shadow_casters_only() {
        let mut octree = row();
        let mut caster = TestPrimitive::cube(TestOwner::playing(10), Vec3::new(2000.0, 500.0, 500.0), 50.0);
        caster.casts_static_shadow = true;
        caster.collide = false;
        octree.add_primitive(caster);

        let results = octree.line_check(END, START, Vec3::ZERO, TraceFlag::ShadowCast.into(), None);
        assert_hits(&hits(&results), &[(10, 0.74375)]);

        let results = octree.line_check(END, START, Vec3::ZERO, ALL_COLLIDING, None);
        assert_eq!(results.len(), 3);
    }

    #[test]
    fn extent_finds_more() {
        let mut octree = row();
        let mut thin = TestPrimitive::cube(TestOwner::playing(5), Vec3::new(2000.0, 500.0, 500.0), 50.0);
        thin.blocks_zero_extent = false;
        octree.add_primitive(thin);
        octree.add_primitive(TestPrimitive::cube(
            TestOwner::playing(4),
            Vec3::new(0.0, 650.0, 500.0),
            50.0,
        ));

        let results = octree.line_check(END, START, Vec3::ZERO, ALL_COLLIDING, None);
        assert_eq!(
            hits(&results).iter().map(|&(id, _)| id).collect::<Vec<_>>(),
            [2, 1, 0]
        );

        let results = octree.line_check(END, START, Vec3::splat(120.0), ALL_COLLIDING, None);
        assert_eq!(
            hits(&results).iter().map(|&(id, _)| id).collect::<Vec<_>>(),
            [2, 4, 1, 5, 0]
        );
        assert_eq!(
            octree.stats().get(OctreeStat::NonZeroExtentLineCheck).count,
            1
        );
    }

    #[test]
    fn stop_at_first_hit_with_extent() {
        let mut octree = row();
        let results = octree.line_check(
            END,
            START,
            Vec3::splat(20.0),
            ALL_COLLIDING | TraceFlag::StopAtFirstHit,
            None,
        );
        assert_hits(&hits(&results), &[(2, 0.36625)]);
    }

    #[test]
    fn stop_at_first_hit_ignores_insertion_order() {
        let config = OctreeConfig::default().with_half_world_max(4096.0);
        let mut octree = PrimitiveOctree::with_config(config);
        // farthest first, all three stay in the root
        for (id, x) in [3000.0, 1000.0, -1000.0].into_iter().enumerate() {
            octree.add_primitive(TestPrimitive::cube(
                TestOwner::playing(id as u32),
                Vec3::new(x, 500.0, 500.0),
                50.0,
            ));
        }
        assert_eq!(octree.node_count(), 1);

        for extent in [Vec3::ZERO, Vec3::splat(20.0)] {
            let results = octree.line_check(
                END,
                START,
                extent,
                ALL_COLLIDING | TraceFlag::StopAtFirstHit,
                None,
            );
            assert_eq!(results.len(), 1);
            assert_eq!(results.newest().unwrap().owner.as_ref().unwrap().id, 2);
        }
    }

    #[test]
    fn stop_at_first_hit_looks_past_straddlers() {
        let mut octree = row();
        // straddles the root center, so it is stored in the root and checked before any child
        octree.add_primitive(TestPrimitive::cube(
            TestOwner::playing(7),
            Vec3::new(0.0, 500.0, 500.0),
            100.0,
        ));
        assert_eq!(octree.node_count(), 9);

        let results = octree.line_check(
            START,
            END,
            Vec3::ZERO,
            ALL_COLLIDING | TraceFlag::StopAtFirstHit,
            None,
        );
        assert_hits(&hits(&results), &[(0, 0.11875)]);

        let results = octree.line_check(
            START,
            END,
            Vec3::splat(20.0),
            ALL_COLLIDING | TraceFlag::StopAtFirstHit,
            None,
        );
        assert_hits(&hits(&results), &[(0, 0.11625)]);

        let results = octree.line_check(
            END,
            START,
            Vec3::ZERO,
            ALL_COLLIDING | TraceFlag::StopAtFirstHit | TraceFlag::SingleResult,
            None,
        );
        assert_hits(&hits(&results), &[(2, 0.36875)]);
    }

    #[test]
    fn ray_on_splitting_plane() {
        let config = OctreeConfig::default().with_half_world_max(4096.0);
        let mut octree = PrimitiveOctree::with_config(config);
        // touches y = 0 from below and ends up in a lower-Y child
        octree.add_primitive(TestPrimitive::new(
            TestOwner::playing(0),
            Aabb::new(Vec3::new(950.0, -100.0, 450.0), Vec3::new(1050.0, 0.0, 550.0)),
        ));
        // touches both y = 0 and z = 0 from below
        octree.add_primitive(TestPrimitive::new(
            TestOwner::playing(1),
            Aabb::new(Vec3::new(-1050.0, -100.0, -100.0), Vec3::new(-950.0, 0.0, 0.0)),
        ));
        for (id, x) in [(2, -2000.0), (3, -2400.0)] {
            octree.add_primitive(TestPrimitive::cube(
                TestOwner::playing(id),
                Vec3::new(x, -2000.0, -2000.0),
                50.0,
            ));
        }
        assert_eq!(octree.node_count(), 9);

        let along_y = (Vec3::new(-4000.0, 0.0, 500.0), Vec3::new(4000.0, 0.0, 500.0));
        let along_yz = (Vec3::new(-4000.0, 0.0, 0.0), Vec3::new(4000.0, 0.0, 0.0));
        for ((start, end), id) in [(along_y, 0), (along_yz, 1)] {
            for (start, end) in [(start, end), (end, start)] {
                for extent in [Vec3::ZERO, Vec3::splat(10.0)] {
                    let results = octree.line_check(end, start, extent, ALL_COLLIDING, None);
                    let ids = hits(&results).iter().map(|&(id, _)| id).collect::<Vec<_>>();
                    assert_eq!(ids, [id], "segment from {start} to {end}, extent {extent}");
                }
            }
        }
    }

    #[test]
    fn misses_outside_world() {
        let mut octree = row();
        let results = octree.line_check(
            Vec3::new(9000.0, 9000.0, 500.0),
            Vec3::new(5000.0, 9000.0, 500.0),
            Vec3::ZERO,
            ALL_COLLIDING,
            None,
        );
        assert!(results.is_empty());
    }

    #[test]
    fn ignores_primitives_without_owner() {
        let mut octree = row();
        let mut orphan = TestPrimitive::cube(TestOwner::playing(9), Vec3::new(0.0, 500.0, 500.0), 50.0);
        orphan.owner = None;
        octree.add_primitive(orphan);

        let results = octree.line_check(END, START, Vec3::ZERO, ALL_COLLIDING, None);
        assert_eq!(results.len(), 3);
    }

    fn random_vec3(rng: &mut StdRng, range: f32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
            rng.gen_range(-range..range),
        )
    }

    fn random_octree(rng: &mut StdRng) -> PrimitiveOctree<TestPrimitive> {
        let config = OctreeConfig::default().with_half_world_max(8192.0);
        let mut octree = PrimitiveOctree::with_config(config);
        for id in 0..400 {
            let owner = if rng.gen_bool(0.5) {
                TestOwner::playing(id)
            } else {
                TestOwner::editing(id)
            };
            let center = random_vec3(rng, 6000.0);
            let extent = Vec3::new(
                rng.gen_range(1.0..400.0),
                rng.gen_range(1.0..400.0),
                rng.gen_range(1.0..400.0),
            );
            octree.add_primitive(TestPrimitive::new(
                owner,
                Aabb::from_center_extent(center, extent),
            ));
        }
        octree
    }

    fn random_segment(rng: &mut StdRng, index: usize) -> (Vec3, Vec3) {
        let start = random_vec3(rng, 7000.0);
        let mut end = random_vec3(rng, 7000.0);
        // include rays parallel to one or two axes
        match index % 4 {
            0 => end.y = start.y,
            1 => (end.x, end.z) = (start.x, start.z),
            _ => {}
        }
        (start, end)
    }

    fn assert_matches_brute_force(
        octree: &mut PrimitiveOctree<TestPrimitive>,
        start: Vec3,
        end: Vec3,
        extent: Vec3,
    ) {
        let mut expected = brute_force_line_hits(
            octree.primitives.values().map(|slot| &slot.primitive),
            end,
            start,
            extent,
        );
        expected.sort_by_key(|&(id, _)| id);

        let results = octree.line_check(end, start, extent, ALL_COLLIDING, None);
        let mut actual = results
            .iter()
            .map(|result| (result.owner.as_ref().unwrap().id, result.time))
            .collect::<Vec<_>>();
        actual.sort_by_key(|&(id, _)| id);
        assert_eq!(actual, expected, "segment from {start} to {end}, extent {extent}");

        let nearest = octree.single_line_check(end, start, extent, ALL_COLLIDING, None);
        let expected_time = expected.iter().map(|&(_, time)| time).reduce(f32::min);
        assert_eq!(nearest.map(|result| result.time), expected_time);

        let flags = ALL_COLLIDING | TraceFlag::StopAtFirstHit;
        let first = octree.line_check(end, start, extent, flags, None);
        assert_eq!(first.len(), usize::from(expected_time.is_some()));
        assert_eq!(first.iter().map(|result| result.time).next(), expected_time);
    }

    /// A splitting plane of one of the upper nodes of a world with a half size of 8192.
    fn random_plane(rng: &mut StdRng) -> f32 {
        let cells: i32 = 1 << rng.gen_range(0..5u32);
        let step = 8192.0 / cells as f32;
        step * rng.gen_range(1 - cells..cells) as f32
    }

    fn random_whole_vec3(rng: &mut StdRng, range: i32) -> Vec3 {
        Vec3::new(
            rng.gen_range(-range..range) as f32,
            rng.gen_range(-range..range) as f32,
            rng.gen_range(-range..range) as f32,
        )
    }

    /// Whole-numbered boxes, many of which have a face lying exactly on a splitting plane.
    fn snapped_octree(rng: &mut StdRng) -> PrimitiveOctree<TestPrimitive> {
        let config = OctreeConfig::default().with_half_world_max(8192.0);
        let mut octree = PrimitiveOctree::with_config(config);
        for id in 0..400 {
            let owner = if rng.gen_bool(0.5) {
                TestOwner::playing(id)
            } else {
                TestOwner::editing(id)
            };
            let mut min = random_whole_vec3(rng, 6000);
            let size = random_whole_vec3(rng, 400).abs() + Vec3::ONE;
            if rng.gen_bool(0.75) {
                let axis = [Axis3::X, Axis3::Y, Axis3::Z][rng.gen_range(0..3)];
                let plane = random_plane(rng);
                min[axis] = if rng.gen_bool(0.5) {
                    plane
                } else {
                    plane - size[axis]
                };
            }
            octree.add_primitive(TestPrimitive::new(owner, Aabb::new(min, min + size)));
        }
        octree
    }

    /// Segments that run along one or two splitting planes.
    fn snapped_segment(rng: &mut StdRng, index: usize) -> (Vec3, Vec3) {
        let mut start = random_vec3(rng, 7000.0);
        let mut end = random_vec3(rng, 7000.0);
        let axes: &[Axis3] = match index % 3 {
            0 => &[Axis3::Y],
            1 => &[Axis3::X, Axis3::Z],
            _ => &[Axis3::Z],
        };
        for &axis in axes {
            start[axis] = random_plane(rng);
            end[axis] = start[axis];
        }
        (start, end)
    }

    #[test]
    fn zero_extent_on_planes_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(9);
        let mut octree = snapped_octree(&mut rng);
        for index in 0..300 {
            let (start, end) = snapped_segment(&mut rng, index);
            assert_matches_brute_force(&mut octree, start, end, Vec3::ZERO);
        }
    }

    #[test]
    fn non_zero_extent_on_planes_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(10);
        let mut octree = snapped_octree(&mut rng);
        for index in 0..300 {
            let (start, end) = snapped_segment(&mut rng, index);
            let extent = random_whole_vec3(&mut rng, 200).abs() + Vec3::ONE;
            assert_matches_brute_force(&mut octree, start, end, extent);
        }
    }

    #[test]
    fn zero_extent_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut octree = random_octree(&mut rng);
        for index in 0..200 {
            let (start, end) = random_segment(&mut rng, index);
            assert_matches_brute_force(&mut octree, start, end, Vec3::ZERO);
        }
    }

    #[test]
    fn non_zero_extent_matches_brute_force() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut octree = random_octree(&mut rng);
        for index in 0..200 {
            let (start, end) = random_segment(&mut rng, index);
            let extent = Vec3::new(
                rng.gen_range(1.0..200.0),
                rng.gen_range(1.0..200.0),
                rng.gen_range(1.0..200.0),
            );
            assert_matches_brute_force(&mut octree, start, end, extent);
        }
    }

    #[test]
    fn source_test() {
        let owner = TestOwner::playing(1);
        assert!(!is_source::<TestPrimitive>(None, &owner));
        assert!(is_source::<TestPrimitive>(Some(&owner), &owner));
        assert!(!is_source::<TestPrimitive>(Some(&TestOwner::playing(2)), &owner));
    }
}
