use derive_where::derive_where;
use glam::Vec3;

use crate::{octree::PrimitiveKey, primitive::CheckHit};

/// A single hit reported by a query of a [`PrimitiveOctree`](crate::octree::PrimitiveOctree).
#[derive(Clone, Debug, PartialEq)]
pub struct CheckResult<O> {
    pub location: Vec3,
    pub normal: Vec3,
    /// Normalized time along the query segment; `1` for queries without movement.
    pub time: f32,
    pub item: Option<u32>,
    pub material: Option<u32>,
    /// The primitive that was hit, if the query reports primitives.
    pub primitive: Option<PrimitiveKey>,
    /// The owner of whatever was hit.
    pub owner: Option<O>,
    pub bone_name: Option<String>,
}

impl<O> CheckResult<O> {
    /// A result without any geometric information.
    pub fn new(primitive: Option<PrimitiveKey>, owner: Option<O>) -> Self {
        Self::from_hit(CheckHit::default(), primitive, owner)
    }

    pub fn from_hit(hit: CheckHit, primitive: Option<PrimitiveKey>, owner: Option<O>) -> Self {
        Self {
            location: hit.location,
            normal: hit.normal,
            time: hit.time,
            item: hit.item,
            material: hit.material,
            primitive,
            owner,
            bone_name: hit.bone_name,
        }
    }
}

/// The list of results produced by a single query.
///
/// Iterates from the newest to the oldest result. Only line checks with
/// [`TraceFlag::SingleResult`](crate::trace::TraceFlag::SingleResult) make any promises about
/// which results come first; everything else comes in traversal order.
#[derive(Clone, Debug, PartialEq)]
#[derive_where(Default)]
pub struct CheckResults<O> {
    /// Oldest first; iteration runs backwards.
    results: Vec<CheckResult<O>>,
}

impl<O> CheckResults<O> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.results.len()
    }

    pub fn is_empty(&self) -> bool {
        self.results.is_empty()
    }

    /// Adds a result in front of all others.
    pub fn push(&mut self, result: CheckResult<O>) {
        self.results.push(result);
    }

    /// The most recently added result.
    pub fn newest(&self) -> Option<&CheckResult<O>> {
        self.results.last()
    }

    /// Iterates from the newest to the oldest result.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &CheckResult<O>> + ExactSizeIterator {
        self.results.iter().rev()
    }

    /// The result with the smallest time.
    ///
    /// On ties, the result that comes first in iteration order wins.
    pub fn first_hit(&self) -> Option<&CheckResult<O>> {
        self.first_hit_index().map(|index| &self.results[index])
    }

    /// Consumes the list, keeping only the result with the smallest time.
    pub fn into_first_hit(mut self) -> Option<CheckResult<O>> {
        self.first_hit_index()
            .map(|index| self.results.swap_remove(index))
    }

    /// Drops every result except the one with the smallest time.
    pub fn retain_first_hit(&mut self) {
        if let Some(index) = self.first_hit_index() {
            let first = self.results.swap_remove(index);
            self.results.clear();
            self.results.push(first);
        }
    }

    fn first_hit_index(&self) -> Option<usize> {
        let mut first: Option<(usize, f32)> = None;
        for (index, result) in self.results.iter().enumerate().rev() {
            if first.map_or(true, |(_, time)| result.time < time) {
                first = Some((index, result.time));
            }
        }
        first.map(|(index, _)| index)
    }
}

impl<O> IntoIterator for CheckResults<O> {
    type Item = CheckResult<O>;
    type IntoIter = std::iter::Rev<std::vec::IntoIter<CheckResult<O>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.into_iter().rev()
    }
}

impl<'a, O> IntoIterator for &'a CheckResults<O> {
    type Item = &'a CheckResult<O>;
    type IntoIter = std::iter::Rev<std::slice::Iter<'a, CheckResult<O>>>;

    fn into_iter(self) -> Self::IntoIter {
        self.results.iter().rev()
    }
}

impl<O> FromIterator<CheckResult<O>> for CheckResults<O> {
    /// Collects results in the order they were found; the last one ends up in front.
    fn from_iter<T: IntoIterator<Item = CheckResult<O>>>(iter: T) -> Self {
        Self {
            results: iter.into_iter().collect(),
        }
    }
}
