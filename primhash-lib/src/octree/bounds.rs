use glam::Vec3;
use itertools::iproduct;

use crate::{
    math::bounds::Aabb,
    math_enums::{Axis3, Octant, Octants},
};

/// The cube covered by a node within an octree.
///
/// Never stored inside the octree itself; bounds are derived from the root bounds while
/// traversing, one [`Self::child`] call per level.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct NodeBounds {
    /// The center of the cube.
    center: Vec3,
    /// Half the side length of the cube.
    extent: f32,
}

impl NodeBounds {
    /// Constructs [`NodeBounds`] with the given `center` and half side length `extent`.
    pub const fn new(center: Vec3, extent: f32) -> Self {
        Self { center, extent }
    }

    /// Constructs [`NodeBounds`] centered on the origin.
    pub const fn from_extent(extent: f32) -> Self {
        Self::new(Vec3::ZERO, extent)
    }

    /// The center of the cube.
    pub fn center(self) -> Vec3 {
        self.center
    }

    /// Half the side length of the cube.
    pub fn extent(self) -> f32 {
        self.extent
    }

    /// The bounds of the child node at the given `octant`.
    pub fn child(self, octant: Octant) -> Self {
        let extent = self.extent * 0.5;
        Self {
            center: self.center + Vec3::from(octant) * extent,
            extent,
        }
    }

    /// The cube as an [`Aabb`].
    pub fn to_aabb(self) -> Aabb {
        Aabb::from_center_extent(self.center, Vec3::splat(self.extent))
    }

    /// Whether the cube lies entirely within `aabb`.
    pub fn is_inside(self, aabb: Aabb) -> bool {
        aabb.encloses(self.to_aabb())
    }

    /// Returns the single child octant that wholly contains `aabb`.
    ///
    /// Returns [`None`] if `aabb` crosses one of the splitting planes through the center. A box that
    /// touches a splitting plane from below still belongs to the lower half, while one that touches
    /// it from above straddles it.
    ///
    /// Assumes that `aabb` lies within the cube itself.
    pub fn find_child(self, aabb: Aabb) -> Option<Octant> {
        let mut octant = Octant::X0Y0Z0;
        for axis in [Axis3::X, Axis3::Y, Axis3::Z] {
            let center = self.center[axis];
            if aabb.min()[axis] > center {
                octant = octant.with_half(axis, true);
            } else if aabb.max()[axis] > center {
                return None;
            }
        }
        Some(octant)
    }

    /// Returns every child octant that `aabb` overlaps.
    ///
    /// Shares the boundary rules of [`Self::find_child`], so a box that fits into a single child
    /// yields exactly that child.
    pub fn find_children(self, aabb: Aabb) -> Octants {
        let halves = |axis: Axis3| {
            overlapped_halves(aabb.min()[axis], aabb.max()[axis], self.center[axis])
        };
        iproduct!(halves(Axis3::X), halves(Axis3::Y), halves(Axis3::Z))
            .map(|(x_max, y_max, z_max)| Octant::from_halves(x_max, y_max, z_max))
            .collect()
    }
}

/// The halves along a single axis that the range `min..=max` overlaps; `true` is the upper half.
fn overlapped_halves(min: f32, max: f32, center: f32) -> impl Iterator<Item = bool> + Clone {
    [(false, min <= center), (true, max > center)]
        .into_iter()
        .filter_map(|(is_max, overlaps)| overlaps.then_some(is_max))
}
