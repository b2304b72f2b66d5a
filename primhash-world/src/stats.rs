use std::{fmt, time::Duration};

use enum_map::{Enum, EnumMap};

use crate::primitive::FilterMode;

/// A kind of operation that [`OctreeStats`] keeps track of.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, Enum)]
pub enum OctreeStat {
    /// Narrow-phase zero-extent line checks against single-node filtered primitives.
    ZeroExtentSingleNodePrimitive,
    /// Narrow-phase zero-extent line checks against multi-node filtered primitives.
    ZeroExtentMultiNodePrimitive,
    /// Narrow-phase line checks with an extent against single-node filtered primitives.
    NonZeroExtentSingleNodePrimitive,
    /// Narrow-phase line checks with an extent against multi-node filtered primitives.
    NonZeroExtentMultiNodePrimitive,
    BoxBox,
    ZeroExtentLineBox,
    NonZeroExtentLineBox,
    Add,
    Remove,
    NonZeroExtentLineCheck,
    ZeroExtentLineCheck,
    PointCheck,
    EncroachmentCheck,
    RadiusCheck,
}

impl OctreeStat {
    pub fn name(self) -> &'static str {
        match self {
            Self::ZeroExtentSingleNodePrimitive => "Zero-extent single node filter primitives",
            Self::ZeroExtentMultiNodePrimitive => "Zero-extent multi node filter primitives",
            Self::NonZeroExtentSingleNodePrimitive => {
                "Non-zero-extent single node filter primitives"
            }
            Self::NonZeroExtentMultiNodePrimitive => "Non-zero-extent multi node filter primitives",
            Self::BoxBox => "Box-box checks",
            Self::ZeroExtentLineBox => "Zero-extent line-box checks",
            Self::NonZeroExtentLineBox => "Non-zero-extent line-box checks",
            Self::Add => "Adds",
            Self::Remove => "Removes",
            Self::NonZeroExtentLineCheck => "Non-zero-extent line checks",
            Self::ZeroExtentLineCheck => "Zero-extent line checks",
            Self::PointCheck => "Point checks",
            Self::EncroachmentCheck => "Encroachment checks",
            Self::RadiusCheck => "Radius checks",
        }
    }

    /// The stat for narrow-phase line checks against a primitive added with `mode`.
    pub fn line_primitive(zero_extent: bool, mode: FilterMode) -> Self {
        match (zero_extent, mode) {
            (true, FilterMode::SingleNode) => Self::ZeroExtentSingleNodePrimitive,
            (true, FilterMode::MultiNode) => Self::ZeroExtentMultiNodePrimitive,
            (false, FilterMode::SingleNode) => Self::NonZeroExtentSingleNodePrimitive,
            (false, FilterMode::MultiNode) => Self::NonZeroExtentMultiNodePrimitive,
        }
    }
}

/// How often an operation ran and how long it took in total.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StatEntry {
    pub count: u64,
    pub time: Duration,
}

impl StatEntry {
    /// The average time a single operation took.
    pub fn average(self) -> Option<Duration> {
        let count = u32::try_from(self.count).ok().filter(|&count| count > 0)?;
        Some(self.time / count)
    }
}

/// Counters and accumulated timings of the operations of a
/// [`PrimitiveOctree`](crate::octree::PrimitiveOctree).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct OctreeStats {
    entries: EnumMap<OctreeStat, StatEntry>,
}

impl OctreeStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, stat: OctreeStat) -> StatEntry {
        self.entries[stat]
    }

    /// Counts a single operation that took `elapsed`.
    pub fn record(&mut self, stat: OctreeStat, elapsed: Duration) {
        let entry = &mut self.entries[stat];
        entry.count += 1;
        entry.time += elapsed;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl fmt::Display for OctreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (stat, entry) in &self.entries {
            if let Some(average) = entry.average() {
                writeln!(
                    f,
                    "  {}: {:?} ({}) Average: {:?}",
                    stat.name(),
                    entry.time,
                    entry.count,
                    average
                )?;
            }
        }
        Ok(())
    }
}
