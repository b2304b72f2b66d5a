use glam::Vec3;

use crate::math_enums::Axis3;

/// A directed line segment from `start` to `end`, parameterized over `0..=1`.
///
/// The reciprocal of the direction is computed once up front, since slab tests against many boxes
/// only ever need to multiply by it. Axes along which the segment does not move have an infinite
/// reciprocal; the slab tests never multiply by those.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LineSegment {
    start: Vec3,
    end: Vec3,
    direction: Vec3,
    inv_direction: Vec3,
}

impl LineSegment {
    pub fn new(start: Vec3, end: Vec3) -> Self {
        let direction = end - start;
        Self {
            start,
            end,
            direction,
            inv_direction: direction.recip(),
        }
    }

    pub fn start(&self) -> Vec3 {
        self.start
    }

    pub fn end(&self) -> Vec3 {
        self.end
    }

    /// `end - start`; not normalized.
    pub fn direction(&self) -> Vec3 {
        self.direction
    }

    /// The point at parametric `time`, where `0` is the start and `1` the end.
    pub fn point_at(&self, time: f32) -> Vec3 {
        self.start + self.direction * time
    }

    /// Clips the segment against the box given by `center` and `radii`.
    ///
    /// Returns the parametric entry and exit times, both clamped to `0..=1`, or [`None`] if the
    /// segment misses the box. A segment starting inside the box enters at `0`.
    pub fn clip(&self, center: Vec3, radii: Vec3) -> Option<(f32, f32)> {
        let local_start = self.start - center;
        let mut near = 0.0f32;
        let mut far = 1.0f32;

        for axis in [Axis3::X, Axis3::Y, Axis3::Z] {
            if self.direction[axis] != 0.0 {
                let inv = self.inv_direction[axis];
                let mid = -(local_start[axis] * inv);
                let half = radii[axis] * inv.abs();
                near = near.max(mid - half);
                far = far.min(mid + half);
                if far < near {
                    return None;
                }
            } else if !(local_start[axis].abs() <= radii[axis]) {
                // parallel to the slab and outside of it; also rejects NaN
                return None;
            }
        }

        Some((near, far))
    }

    /// Slab test of the segment against the box given by `center` and `radii`.
    pub fn hits_box(&self, center: Vec3, radii: Vec3) -> bool {
        self.clip(center, radii).is_some()
    }
}
