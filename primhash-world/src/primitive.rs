use std::hash::Hash;

use glam::Vec3;
use primhash_lib::math::bounds::BoxSphereBounds;

use crate::trace::TraceFlags;

/// The outcome of a successful narrow-phase test against a single primitive.
#[derive(Clone, Debug, PartialEq)]
pub struct CheckHit {
    /// Where the hit happened in world-space.
    pub location: Vec3,
    /// The surface normal at the hit location.
    pub normal: Vec3,
    /// Normalized time along the tested segment; `1` for tests without movement.
    pub time: f32,
    /// Primitive specific index of the part that was hit.
    pub item: Option<u32>,
    /// The material that was hit, if the query asked for it.
    pub material: Option<u32>,
    /// The bone of a skinned mesh that was hit.
    pub bone_name: Option<String>,
}

impl CheckHit {
    pub fn new(location: Vec3, normal: Vec3, time: f32) -> Self {
        Self {
            location,
            normal,
            time,
            item: None,
            material: None,
            bone_name: None,
        }
    }
}

impl Default for CheckHit {
    fn default() -> Self {
        Self::new(Vec3::ZERO, Vec3::ZERO, 1.0)
    }
}

/// Something with a volume in the world that can be stored in a
/// [`PrimitiveOctree`](crate::octree::PrimitiveOctree).
///
/// The octree only ever does broad-phase tests against [`Primitive::bounds`]; exact tests are left
/// to the primitive itself.
pub trait Primitive: Sized {
    /// The actor owning this primitive.
    type Owner: PrimitiveOwner<Self>;

    /// The owner of this primitive.
    ///
    /// Primitives without an owner are still stored, but are skipped by every query.
    fn owner(&self) -> Option<Self::Owner>;

    /// The world-space bounds of this primitive.
    fn bounds(&self) -> BoxSphereBounds;

    /// Whether collision is enabled at all.
    fn should_collide(&self) -> bool;

    /// Whether this primitive blocks zero-extent traces.
    fn blocks_zero_extent(&self) -> bool;

    /// Whether this primitive blocks traces with an extent and point checks.
    fn blocks_non_zero_extent(&self) -> bool;

    /// Whether this primitive blocks rigid bodies.
    fn blocks_rigid_body(&self) -> bool;

    /// Whether this primitive casts static shadows.
    fn casts_static_shadow(&self) -> bool;

    /// Exact test of a box of half size `extent` moving from `start` to `end`.
    fn line_check(&self, end: Vec3, start: Vec3, extent: Vec3, flags: TraceFlags)
        -> Option<CheckHit>;

    /// Exact test of a box of half size `extent` placed at `location`.
    fn point_check(&self, location: Vec3, extent: Vec3) -> Option<CheckHit>;
}

/// The actor owning one or more [`Primitive`]s.
///
/// Owners are compared and hashed by identity, so implementations are usually cheap shared handles.
pub trait PrimitiveOwner<P>: Clone + Eq + Hash {
    /// Whether gameplay has begun for the level of this owner.
    ///
    /// Decides the [`FilterMode`] that primitives of this owner are added with.
    fn has_begun_play(&self) -> bool;

    /// Whether `other` is this owner or somewhere up its chain of owners.
    fn is_owned_by(&self, other: &Self) -> bool;

    /// Whether this owner is `other` or attached to it, directly or indirectly.
    fn is_based_on(&self, other: &Self) -> bool;

    /// Game rules deciding whether `primitive` takes part in a trace started by `source`.
    fn should_trace(&self, primitive: &P, source: Option<&Self>, flags: TraceFlags) -> bool;

    /// Whether this owner is part of the static world.
    fn is_world_geometry(&self) -> bool;

    /// Whether this owner is moved along a predefined path.
    fn is_interpolating(&self) -> bool;

    /// Exact test of whether this owner overlaps `other`.
    fn is_overlapping(&self, other: &Self) -> Option<CheckHit>;
}

/// How a primitive is distributed over the nodes of an octree.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum FilterMode {
    /// Stored in the single deepest node that wholly contains it.
    ///
    /// Cheap to add and remove, which suits primitives that move during gameplay.
    #[default]
    SingleNode,
    /// Stored in every leaf it overlaps, or in a node that is fully covered by it.
    MultiNode,
}

impl FilterMode {
    /// The mode `primitive` is added with.
    ///
    /// Until gameplay begins for its owner, a primitive is spread over multiple nodes.
    pub fn for_primitive<P: Primitive>(primitive: &P) -> Self {
        match primitive.owner() {
            Some(owner) if !owner.has_begun_play() => Self::MultiNode,
            _ => Self::SingleNode,
        }
    }
}
