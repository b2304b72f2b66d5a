use enumset::{enum_set, EnumSet, EnumSetType};

/// A single flag controlling which geometry a trace considers and how it reports hits.
///
/// Most flags only select categories of geometry and are passed straight through to
/// [`Primitive::line_check`](crate::primitive::Primitive::line_check) and
/// [`PrimitiveOwner::should_trace`](crate::primitive::PrimitiveOwner::should_trace). The octree
/// itself only acts on [`TraceFlag::ShadowCast`], [`TraceFlag::StopAtFirstHit`] and
/// [`TraceFlag::SingleResult`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord, EnumSetType)]
#[enumset(no_super_impls)]
pub enum TraceFlag {
    Pawns,
    Movers,
    Level,
    Volumes,
    Others,
    OnlyProjActor,
    Blocking,
    LevelGeometry,
    /// Only consider primitives that cast static shadows, regardless of whether they block.
    ShadowCast,
    /// Stop the whole query as soon as anything is hit.
    StopAtFirstHit,
    /// Only return the hit with the smallest time.
    SingleResult,
    Debug,
    /// Ask primitives to fill in the material that was hit.
    Material,
    Projectors,
    AcceptProjectors,
    Visible,
    Terrain,
    Water,
}

/// A set of [`TraceFlag`]s.
pub type TraceFlags = EnumSet<TraceFlag>;

/// Every kind of actor.
pub const ACTORS: TraceFlags = enum_set!(
    TraceFlag::Pawns | TraceFlag::Movers | TraceFlag::Volumes | TraceFlag::Others | TraceFlag::Terrain
);

/// Everything that collides, actors and level alike.
pub const ALL_COLLIDING: TraceFlags = enum_set!(
    TraceFlag::Level
        | TraceFlag::Pawns
        | TraceFlag::Movers
        | TraceFlag::Volumes
        | TraceFlag::Others
        | TraceFlag::Terrain
);

/// Everything a projectile can hit.
pub const PROJ_TARGETS: TraceFlags = enum_set!(
    TraceFlag::Level
        | TraceFlag::Pawns
        | TraceFlag::Movers
        | TraceFlag::Volumes
        | TraceFlag::Others
        | TraceFlag::Terrain
        | TraceFlag::OnlyProjActor
);

/// Everything that collides and blocks.
pub const ALL_BLOCKING: TraceFlags = enum_set!(
    TraceFlag::Level
        | TraceFlag::Pawns
        | TraceFlag::Movers
        | TraceFlag::Volumes
        | TraceFlag::Others
        | TraceFlag::Terrain
        | TraceFlag::Blocking
);

/// Static world geometry.
pub const WORLD: TraceFlags = enum_set!(
    TraceFlag::Level | TraceFlag::Movers | TraceFlag::LevelGeometry | TraceFlag::Terrain
);

/// Everything stored in a primitive hash.
pub const HASH: TraceFlags = enum_set!(
    TraceFlag::Pawns
        | TraceFlag::Movers
        | TraceFlag::Volumes
        | TraceFlag::Others
        | TraceFlag::LevelGeometry
        | TraceFlag::Terrain
);
