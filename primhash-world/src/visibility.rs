use glam::Vec3;

/// How a primitive relates to a [`VisibilitySet`].
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Containment {
    /// The primitive is visible.
    ContainedBySet,
    /// The primitive is not visible, no matter which subset it is tested against.
    NotContainedBySet,
    /// The primitive is not visible through this subset, but might be through another one.
    NotContainedBySubset,
}

/// A convex visibility volume, split into subsets that can be narrowed down while descending the
/// octree.
pub trait VisibilitySet<P> {
    type Subset;

    /// The subset covering the whole set.
    fn full_subset(&self) -> Self::Subset;

    /// The part of `subset` that intersects the box at `center` with half size `extent`.
    fn box_intersection_subset(&self, subset: &Self::Subset, center: Vec3, extent: Vec3)
        -> Self::Subset;

    /// Whether `subset` is empty, in which case nothing within it is visible.
    fn is_subset_empty(&self, subset: &Self::Subset) -> bool;

    /// Tests whether `primitive` is visible through `subset`.
    fn contains_primitive(&self, primitive: &P, subset: &Self::Subset) -> Containment;
}
