use std::hash::{Hash, Hasher};

use glam::Vec3;
use primhash_lib::math::{
    bounds::{Aabb, BoxSphereBounds},
    segment::LineSegment,
};

use crate::{
    primitive::{CheckHit, Primitive, PrimitiveOwner},
    trace::TraceFlags,
};

/// An owner identified by `id` alone.
#[derive(Clone, Debug)]
pub struct TestOwner {
    pub id: u32,
    pub begun_play: bool,
    pub base: Option<u32>,
    pub world_geometry: bool,
    pub interpolating: bool,
    /// Used for encroachment tests.
    pub aabb: Aabb,
}

impl TestOwner {
    /// An owner whose primitives are added with single-node filtering.
    pub fn playing(id: u32) -> Self {
        Self {
            id,
            begun_play: true,
            base: None,
            world_geometry: false,
            interpolating: false,
            aabb: Aabb::default(),
        }
    }

    /// An owner whose primitives are added with multi-node filtering.
    pub fn editing(id: u32) -> Self {
        Self {
            begun_play: false,
            ..Self::playing(id)
        }
    }

    pub fn with_aabb(mut self, aabb: Aabb) -> Self {
        self.aabb = aabb;
        self
    }
}

impl PartialEq for TestOwner {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TestOwner {}

impl Hash for TestOwner {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl PrimitiveOwner<TestPrimitive> for TestOwner {
    fn has_begun_play(&self) -> bool {
        self.begun_play
    }

    fn is_owned_by(&self, other: &Self) -> bool {
        self == other
    }

    fn is_based_on(&self, other: &Self) -> bool {
        self == other || self.base == Some(other.id)
    }

    fn should_trace(
        &self,
        _primitive: &TestPrimitive,
        _source: Option<&Self>,
        _flags: TraceFlags,
    ) -> bool {
        true
    }

    fn is_world_geometry(&self) -> bool {
        self.world_geometry
    }

    fn is_interpolating(&self) -> bool {
        self.interpolating
    }

    fn is_overlapping(&self, other: &Self) -> Option<CheckHit> {
        self.aabb
            .intersects(other.aabb)
            .then(|| CheckHit::new(other.aabb.center(), Vec3::ZERO, 1.0))
    }
}

/// A solid box that collides with everything.
#[derive(Clone, Debug)]
pub struct TestPrimitive {
    pub owner: Option<TestOwner>,
    pub aabb: Aabb,
    pub collide: bool,
    pub blocks_zero_extent: bool,
    pub blocks_non_zero_extent: bool,
    pub blocks_rigid_body: bool,
    pub casts_static_shadow: bool,
}

impl TestPrimitive {
    pub fn new(owner: TestOwner, aabb: Aabb) -> Self {
        Self {
            owner: Some(owner),
            aabb,
            collide: true,
            blocks_zero_extent: true,
            blocks_non_zero_extent: true,
            blocks_rigid_body: true,
            casts_static_shadow: false,
        }
    }

    /// A cube with half side length `extent`.
    pub fn cube(owner: TestOwner, center: Vec3, extent: f32) -> Self {
        Self::new(owner, Aabb::from_center_extent(center, Vec3::splat(extent)))
    }
}

impl Primitive for TestPrimitive {
    type Owner = TestOwner;

    fn owner(&self) -> Option<TestOwner> {
        self.owner.clone()
    }

    fn bounds(&self) -> BoxSphereBounds {
        BoxSphereBounds::from_aabb(self.aabb)
    }

    fn should_collide(&self) -> bool {
        self.collide
    }

    fn blocks_zero_extent(&self) -> bool {
        self.blocks_zero_extent
    }

    fn blocks_non_zero_extent(&self) -> bool {
        self.blocks_non_zero_extent
    }

    fn blocks_rigid_body(&self) -> bool {
        self.blocks_rigid_body
    }

    fn casts_static_shadow(&self) -> bool {
        self.casts_static_shadow
    }

    fn line_check(
        &self,
        end: Vec3,
        start: Vec3,
        extent: Vec3,
        _flags: TraceFlags,
    ) -> Option<CheckHit> {
        let segment = LineSegment::new(start, end);
        let (near, _) = segment.clip(self.aabb.center(), self.aabb.extent() + extent)?;
        Some(CheckHit::new(segment.point_at(near), Vec3::ZERO, near))
    }

    fn point_check(&self, location: Vec3, extent: Vec3) -> Option<CheckHit> {
        self.aabb
            .intersects(Aabb::from_center_extent(location, extent))
            .then(|| CheckHit::new(location, Vec3::ZERO, 1.0))
    }
}

/// Primitives whose exact line check hits, found by testing every one of them.
pub fn brute_force_line_hits<'a>(
    primitives: impl IntoIterator<Item = &'a TestPrimitive>,
    end: Vec3,
    start: Vec3,
    extent: Vec3,
) -> Vec<(u32, f32)> {
    primitives
        .into_iter()
        .filter_map(|primitive| {
            let hit = primitive.line_check(end, start, extent, TraceFlags::empty())?;
            Some((primitive.owner.as_ref()?.id, hit.time))
        })
        .collect()
}
