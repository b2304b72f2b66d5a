#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Tuning parameters of a [`PrimitiveOctree`](crate::octree::PrimitiveOctree).
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct OctreeConfig {
    /// How many primitives a node holds before it splits into children.
    pub max_primitives_per_node: usize,
    /// Nodes whose children would have a half extent of this or less never split.
    pub min_node_size: f32,
    /// Half the side length of the root cube, which is centered on the origin.
    pub half_world_max: f32,
}

impl OctreeConfig {
    pub const DEFAULT: Self = Self {
        max_primitives_per_node: 3,
        min_node_size: 100.0,
        half_world_max: 262144.0,
    };

    pub fn with_max_primitives_per_node(mut self, max_primitives_per_node: usize) -> Self {
        self.max_primitives_per_node = max_primitives_per_node;
        self
    }

    pub fn with_min_node_size(mut self, min_node_size: f32) -> Self {
        self.min_node_size = min_node_size;
        self
    }

    pub fn with_half_world_max(mut self, half_world_max: f32) -> Self {
        self.half_world_max = half_world_max;
        self
    }

    /// Whether a node with the given half `extent` is still large enough to be split.
    pub fn can_split(&self, extent: f32) -> bool {
        0.5 * extent > self.min_node_size
    }
}

impl Default for OctreeConfig {
    fn default() -> Self {
        Self::DEFAULT
    }
}
