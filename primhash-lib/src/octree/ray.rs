use arrayvec::ArrayVec;
use glam::Vec3;

use super::bounds::NodeBounds;
use crate::math_enums::{Axes3, Axis3, Octant};

/// Stand-in for infinity in slab times.
///
/// Stays finite so that averaging two times never produces NaN.
const FAR: f32 = f32::MAX;

/// A ray prepared for front-to-back traversal of an octree.
///
/// Every axis along which the ray points into the negative direction is mirrored, so that the
/// traversal only ever has to deal with non-negative directions. Octants visited in mirrored space
/// have to be [`Octant::mirrored`] by [`Self::mirror`] before indexing actual child nodes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct OctreeRay {
    /// The mirrored ray origin.
    origin: Vec3,
    /// The mirrored direction; never negative.
    direction: Vec3,
    /// The axes that were mirrored.
    mirror: Axes3,
    /// The axes along which the ray does not move at all.
    parallel: Axes3,
}

impl OctreeRay {
    /// Prepares a ray starting at `origin` and moving by `direction` over one unit of time.
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        let mut ray = Self {
            origin,
            direction,
            mirror: Axes3::empty(),
            parallel: Axes3::empty(),
        };
        for axis in [Axis3::X, Axis3::Y, Axis3::Z] {
            if ray.direction[axis] < 0.0 {
                ray.origin[axis] = -ray.origin[axis];
                ray.direction[axis] = -ray.direction[axis];
                ray.mirror |= axis;
            }
            if !(ray.direction[axis] > 0.0) {
                ray.parallel |= axis;
            }
        }
        ray
    }

    /// The axes that were mirrored.
    pub fn mirror(&self) -> Axes3 {
        self.mirror
    }

    /// The axes along which the ray does not move at all.
    pub fn parallel(&self) -> Axes3 {
        self.parallel
    }

    /// Converts `bounds` into the mirrored space of the ray.
    pub fn mirror_bounds(&self, bounds: NodeBounds) -> NodeBounds {
        let mut center = bounds.center();
        for axis in self.mirror {
            center[axis] = -center[axis];
        }
        NodeBounds::new(center, bounds.extent())
    }

    /// Calculates the slab times of the ray against `bounds`, given in mirrored space.
    ///
    /// Axes the ray is parallel to get times of plus or minus [`f32::MAX`], depending on which
    /// side of the slab planes the origin lies. An origin lying on either plane counts as inside.
    pub fn slab_times(&self, bounds: NodeBounds) -> SlabTimes {
        let min = bounds.center() - Vec3::splat(bounds.extent()) - self.origin;
        let max = bounds.center() + Vec3::splat(bounds.extent()) - self.origin;
        let mut times = SlabTimes {
            entry: min / self.direction,
            exit: max / self.direction,
        };
        for axis in self.parallel {
            times.entry[axis] = if min[axis] > 0.0 { FAR } else { -FAR };
            times.exit[axis] = if max[axis] < 0.0 { -FAR } else { FAR };
        }
        times
    }

    /// The times at which the ray crosses the three splitting planes of `bounds`.
    ///
    /// `times` must be the slab times of the ray against `bounds`, which is given in mirrored
    /// space. Splitting planes the ray runs parallel to are either never crossed or crossed
    /// before the ray even starts.
    pub fn split_times(&self, times: SlabTimes, bounds: NodeBounds) -> Vec3 {
        let mut split = times.entry * 0.5 + times.exit * 0.5;
        for axis in self.parallel {
            split[axis] = if self.origin[axis] < bounds.center()[axis] {
                FAR
            } else {
                -FAR
            };
        }
        split
    }

    /// The children of `bounds` the ray passes through in front-to-back order, each with its slab
    /// times.
    ///
    /// `times` and `bounds` are the same as for [`Self::split_times`]. A ray lying exactly on a
    /// splitting plane it runs parallel to touches the children on both sides of that plane, so
    /// all of them are part of the walk.
    pub fn child_walk(
        &self,
        times: SlabTimes,
        bounds: NodeBounds,
    ) -> ArrayVec<(Octant, SlabTimes), 8> {
        let mut splits = ArrayVec::<Vec3, 8>::new();
        splits.push(self.split_times(times, bounds));
        for axis in self.parallel {
            if self.origin[axis] == bounds.center()[axis] {
                for index in 0..splits.len() {
                    let mut split = splits[index];
                    split[axis] = FAR;
                    splits.push(split);
                }
            }
        }
        if self.parallel == Axes3::all() {
            // a ray that does not move only ever touches the children around its origin
            return splits
                .into_iter()
                .map(|split| {
                    let octant = [Axis3::X, Axis3::Y, Axis3::Z]
                        .into_iter()
                        .fold(Octant::X0Y0Z0, |octant, axis| {
                            octant.with_half(axis, split[axis] < 0.0)
                        });
                    (octant, times.child(octant, split))
                })
                .collect();
        }
        splits
            .into_iter()
            .flat_map(|split| octant_walk(times, split))
            .collect()
    }
}

/// Per-axis parametric entry and exit times of a ray against a cube.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SlabTimes {
    pub entry: Vec3,
    pub exit: Vec3,
}

impl SlabTimes {
    /// The time at which the ray has entered all three slabs.
    pub fn entry_time(self) -> f32 {
        self.entry.max_element()
    }

    /// The time at which the ray leaves the first of the three slabs.
    pub fn exit_time(self) -> f32 {
        self.exit.min_element()
    }

    /// Whether the ray passes through the cube at all.
    pub fn enters(self) -> bool {
        self.entry_time() < self.exit_time()
    }

    /// Whether the cube lies entirely before the start of the ray.
    pub fn is_behind(self) -> bool {
        self.exit.cmplt(Vec3::ZERO).any()
    }

    /// Whether the ray only reaches the cube after `time`.
    pub fn starts_after(self, time: f32) -> bool {
        self.entry.cmpgt(Vec3::splat(time)).any()
    }

    /// The slab times of the child at `octant`, given the `split` times of the parent.
    pub fn child(self, octant: Octant, split: Vec3) -> Self {
        let mut child = self;
        for axis in [Axis3::X, Axis3::Y, Axis3::Z] {
            if octant.is_max(axis) {
                child.entry[axis] = split[axis];
            } else {
                child.exit[axis] = split[axis];
            }
        }
        child
    }
}

/// The child octant through which a ray enters a cube.
///
/// The entry plane is the one with the latest entry time; the ray starts out in the upper half of
/// every other axis whose splitting plane it crossed before that.
pub fn first_octant(entry: Vec3, split: Vec3) -> Octant {
    let entry_axis = if entry.x > entry.y {
        if entry.x > entry.z {
            Axis3::X
        } else {
            Axis3::Z
        }
    } else if entry.y > entry.z {
        Axis3::Y
    } else {
        Axis3::Z
    };

    let entry_time = entry[entry_axis];
    let (a, b) = entry_axis.cross_axes();
    let mut octant = Octant::X0Y0Z0;
    for axis in [a, b] {
        if split[axis] < entry_time {
            octant = octant.with_half(axis, true);
        }
    }
    octant
}

/// The octant a ray moves into after leaving `octant` at the given per-axis `exit` times.
///
/// Returns [`None`] once the ray leaves the parent cube, or if it never leaves `octant` at all.
pub fn next_octant(octant: Octant, exit: Vec3) -> Option<Octant> {
    let axis = if exit.x < exit.y {
        if exit.x < exit.z {
            Axis3::X
        } else {
            Axis3::Z
        }
    } else if exit.y < exit.z {
        Axis3::Y
    } else {
        Axis3::Z
    };

    if exit[axis] >= FAR {
        return None;
    }
    (!octant.is_max(axis)).then(|| octant.with_half(axis, true))
}

/// The children of a cube in the order a ray passes through them, each with its slab times.
///
/// Octants are in mirrored space. Every step sets one more octant bit, so a ray visits at most four
/// children.
pub fn octant_walk(times: SlabTimes, split: Vec3) -> ArrayVec<(Octant, SlabTimes), 4> {
    let mut walk = ArrayVec::new();
    let mut current = Some(first_octant(times.entry, split));
    while let Some(octant) = current {
        let child = times.child(octant, split);
        walk.push((octant, child));
        current = next_octant(octant, child.exit);
    }
    walk
}
