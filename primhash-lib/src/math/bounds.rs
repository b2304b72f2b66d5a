use glam::Vec3;

/// Floating point axis-aligned bounds in 3D-space.
///
/// Both limits are inclusive; a box whose `min` equals its `max` covers a single point.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Aabb {
    /// The inclusive lower limit of the bounds.
    min: Vec3,
    /// The inclusive upper limit of the bounds.
    max: Vec3,
}

impl Aabb {
    /// Constructs an [`Aabb`] from the given inclusive `min` and `max`.
    ///
    /// If `debug_assertions` are enabled, this panics if `min` exceeds `max` along any axis.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all(), "min must not exceed max");
        Self { min, max }
    }

    /// Constructs an [`Aabb`] from the given inclusive `min` and `max`.
    ///
    /// Returns [`None`] if `min` exceeds `max` along any axis or either contains NaN.
    pub fn checked_new(min: Vec3, max: Vec3) -> Option<Self> {
        let bounds = Self { min, max };
        bounds.is_valid().then_some(bounds)
    }

    /// Constructs an [`Aabb`] centered on `center` reaching `extent` in each direction.
    pub fn from_center_extent(center: Vec3, extent: Vec3) -> Self {
        Self::new(center - extent, center + extent)
    }

    /// Constructs an [`Aabb`] covering the single given `point`.
    pub fn from_point(point: Vec3) -> Self {
        Self {
            min: point,
            max: point,
        }
    }

    /// Constructs the smallest [`Aabb`] covering both `a` and `b`.
    pub fn from_points(a: Vec3, b: Vec3) -> Self {
        Self::from_point(a).including(b)
    }

    /// The inclusive lower limit of the bounds.
    pub fn min(self) -> Vec3 {
        self.min
    }

    /// The inclusive upper limit of the bounds.
    pub fn max(self) -> Vec3 {
        self.max
    }

    /// The center point of the bounds.
    pub fn center(self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    /// Half the size of the bounds along each axis.
    pub fn extent(self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    /// Whether `min` does not exceed `max` along any axis.
    ///
    /// Also `false` if any component is NaN, which makes this usable as a guard against bounds
    /// that were never properly initialized.
    pub fn is_valid(self) -> bool {
        self.min.cmple(self.max).all()
    }

    /// Grows the bounds so that they also cover `point`.
    pub fn including(self, point: Vec3) -> Self {
        Self {
            min: self.min.min(point),
            max: self.max.max(point),
        }
    }

    /// Grows the bounds by `amount` in every direction.
    pub fn expanded(self, amount: Vec3) -> Self {
        Self {
            min: self.min - amount,
            max: self.max + amount,
        }
    }

    /// Whether the two bounds touch or overlap.
    ///
    /// Inclusive, so bounds that only share a face still intersect.
    pub fn intersects(self, other: Self) -> bool {
        !(self.min.cmpgt(other.max).any() || other.min.cmpgt(self.max).any())
    }

    /// Whether the bounds fully enclose `other`.
    ///
    /// Inclusive, so an [`Aabb`] always encloses itself.
    pub fn encloses(self, other: Self) -> bool {
        self.min.cmple(other.min).all() && other.max.cmple(self.max).all()
    }
}

/// World-space bounds of a primitive, described both as a box and as a sphere sharing an origin.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct BoxSphereBounds {
    /// The center of both the box and the sphere.
    pub origin: Vec3,
    /// Half the size of the box along each axis.
    pub box_extent: Vec3,
    /// The radius of the bounding sphere.
    pub sphere_radius: f32,
}

impl BoxSphereBounds {
    pub fn new(origin: Vec3, box_extent: Vec3, sphere_radius: f32) -> Self {
        Self {
            origin,
            box_extent,
            sphere_radius,
        }
    }

    /// Constructs bounds from a box, using the sphere that passes through its corners.
    pub fn from_aabb(aabb: Aabb) -> Self {
        let box_extent = aabb.extent();
        Self {
            origin: aabb.center(),
            box_extent,
            sphere_radius: box_extent.length(),
        }
    }

    /// The box part of the bounds.
    pub fn to_aabb(self) -> Aabb {
        Aabb::from_center_extent(self.origin, self.box_extent)
    }
}
