use std::fmt;

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use crate::axes::Axes;

/// The size of one global axis, as agreed (or not) by the tracked entries
/// that occupy it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Extent {
    /// No entry reports a size on this axis.
    Unresolved,
    /// Every entry reporting a size on this axis agrees on it.
    Size(usize),
    /// At least two entries disagree on the size of this axis.
    Conflict,
}

impl Extent {
    /// Fold `incoming` into `self`. Conflict is absorbing on either side.
    pub fn merge(self, incoming: Extent) -> Extent {
        match (self, incoming) {
            (Extent::Conflict, _) | (_, Extent::Conflict) => Extent::Conflict,
            (existing, Extent::Unresolved) => existing,
            (Extent::Unresolved, incoming) => incoming,
            (Extent::Size(a), Extent::Size(b)) if a == b => Extent::Size(a),
            (Extent::Size(_), Extent::Size(_)) => Extent::Conflict,
        }
    }

    /// The agreed size, if there is one.
    pub fn size(self) -> Option<usize> {
        match self {
            Extent::Size(size) => Some(size),
            Extent::Unresolved | Extent::Conflict => None,
        }
    }

    pub fn is_conflict(self) -> bool {
        matches!(self, Extent::Conflict)
    }
}

impl From<usize> for Extent {
    fn from(size: usize) -> Self {
        Extent::Size(size)
    }
}

impl fmt::Display for Extent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extent::Unresolved => write!(f, "_"),
            Extent::Size(size) => write!(f, "{}", size),
            Extent::Conflict => write!(f, "?"),
        }
    }
}

/// The global shape of a [`crate::Slicer`]: one [`Extent`] per global axis.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Shape {
    extents: Vec<Extent>,
}

impl Shape {
    /// A shape of `num_dim` unresolved axes.
    pub fn unresolved(num_dim: usize) -> Self {
        Self {
            extents: vec![Extent::Unresolved; num_dim],
        }
    }

    pub fn num_dim(&self) -> usize {
        self.extents.len()
    }

    pub fn extents(&self) -> &[Extent] {
        &self.extents
    }

    /// Per-axis sizes, with `None` standing in for both unresolved and
    /// conflicting axes.
    pub fn sizes(&self) -> Vec<Option<usize>> {
        self.extents.iter().map(|extent| extent.size()).collect()
    }

    /// Extend the shape with unresolved axes up to `num_dim`. Never shrinks.
    pub(crate) fn grow(&mut self, num_dim: usize) {
        if num_dim > self.extents.len() {
            self.extents.resize(num_dim, Extent::Unresolved);
        }
    }

    /// Place a local shape at the global axes it occupies. Local extents
    /// beyond `axes` are ignored; axes without a local extent, and all
    /// axes not in `axes`, are unresolved.
    pub fn align(local: &[usize], axes: &Axes, num_dim: usize) -> Vec<Extent> {
        let mut aligned = vec![Extent::Unresolved; num_dim];
        for (&axis, &size) in axes.iter().zip(local) {
            if axis < num_dim {
                aligned[axis] = Extent::Size(size);
            }
        }
        aligned
    }

    /// Merge one entry's local shape into this shape.
    pub fn merge(&mut self, axes: &Axes, local: &[usize]) {
        if let Some(last) = axes.last() {
            self.grow(last + 1);
        }
        let aligned = Self::align(local, axes, self.num_dim());
        self.merge_extents(&aligned);
    }

    fn merge_extents(&mut self, incoming: &[Extent]) {
        for (existing, incoming) in self.extents.iter_mut().zip(incoming) {
            *existing = existing.merge(*incoming);
        }
    }
}

impl From<Vec<Extent>> for Shape {
    fn from(extents: Vec<Extent>) -> Self {
        Self { extents }
    }
}

impl FromIterator<Extent> for Shape {
    fn from_iter<I: IntoIterator<Item = Extent>>(iter: I) -> Self {
        Self {
            extents: iter.into_iter().collect(),
        }
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.extents.as_slice() {
            [single] => write!(f, "({},)", single),
            extents => write!(f, "({})", extents.iter().join(", ")),
        }
    }
}

/// A range of indices, with a stride. Ranges are convertible from
/// native Rust ranges.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range(pub usize, pub Option<usize>, pub usize);

impl Range {
    /// The range covering a whole axis.
    pub fn full() -> Self {
        Range(0, None, 1)
    }

    pub fn is_full(&self) -> bool {
        matches!(self, Range(0, None, 1))
    }

    pub(crate) fn resolve(&self, size: usize) -> (usize, usize, usize) {
        match self {
            Range(begin, Some(end), stride) => (*begin, std::cmp::min(size, *end), *stride),
            Range(begin, None, stride) => (*begin, size, *stride),
        }
    }

    /// The positions this range selects on an axis of `size`. Positions
    /// past the end of the axis are silently dropped.
    pub fn positions(&self, size: usize) -> impl Iterator<Item = usize> {
        let (begin, end, stride) = self.resolve(size);
        (std::cmp::min(begin, end)..end).step_by(stride.max(1))
    }

    /// The number of positions selected on an axis of `size`.
    pub fn len(&self, size: usize) -> usize {
        self.positions(size).count()
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Range(begin, None, stride) => write!(f, "{}::{}", begin, stride),
            Range(begin, Some(end), stride) => write!(f, "{}:{}:{}", begin, end, stride),
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self(r.start, Some(r.end), 1)
    }
}

impl From<std::ops::RangeInclusive<usize>> for Range {
    fn from(r: std::ops::RangeInclusive<usize>) -> Self {
        // An inclusive end of `usize::MAX` runs to the end of any axis.
        Self(*r.start(), r.end().checked_add(1), 1)
    }
}

impl From<std::ops::RangeFrom<usize>> for Range {
    fn from(r: std::ops::RangeFrom<usize>) -> Self {
        Self(r.start, None, 1)
    }
}

impl From<std::ops::RangeTo<usize>> for Range {
    fn from(r: std::ops::RangeTo<usize>) -> Self {
        Self(0, Some(r.end), 1)
    }
}

impl From<std::ops::RangeFull> for Range {
    fn from(_: std::ops::RangeFull) -> Self {
        Self::full()
    }
}

impl From<usize> for Range {
    fn from(idx: usize) -> Self {
        Self(idx, idx.checked_add(1), 1)
    }
}
