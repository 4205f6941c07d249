//! Global axis lists, and their transformation under slicing.
//!
//! Every tracked entry occupies an ordered set of axes in the global
//! axis space shared by all entries of a [`crate::Slicer`]. Slicing with
//! a canonical operation tuple (one [`Op`] per global axis) removes every
//! axis that an integer selected, and renumbers what is left. Because the
//! collapse is global, an entry's new axes depend on the whole tuple and
//! not only on the operations projected onto its own axes.

use std::fmt;
use std::ops::Deref;

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use crate::index::Op;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AxesError {
    #[error("axes {axes:?} are not strictly increasing")]
    NotIncreasing { axes: Vec<usize> },
}

/// A strictly increasing, duplicate-free list of global axis indices.
///
/// An empty list means the entry is not aligned to any axis: it passes
/// through every slice unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Axes(Vec<usize>);

impl Axes {
    pub fn new(axes: Vec<usize>) -> Result<Self, AxesError> {
        if !axes.iter().tuple_windows().all(|(a, b)| a < b) {
            return Err(AxesError::NotIncreasing { axes });
        }
        Ok(Self(axes))
    }

    pub fn empty() -> Self {
        Self(Vec::new())
    }

    /// The axes `0..num_dim`.
    pub fn leading(num_dim: usize) -> Self {
        Self((0..num_dim).collect())
    }

    /// The single axis `axis`.
    pub fn single(axis: usize) -> Self {
        Self(vec![axis])
    }

    /// One past the highest axis, i.e. the number of global axes this
    /// list requires.
    pub fn extent(&self) -> usize {
        self.0.last().map_or(0, |axis| axis + 1)
    }

    /// Select the operations of a canonical tuple that apply to these
    /// axes, in axis order.
    pub fn project(&self, ops: &[Op]) -> Vec<Op> {
        self.0.iter().map(|&axis| ops[axis].clone()).collect()
    }

    /// The axes these become after slicing with the canonical tuple
    /// `ops`: axes selected by an integer are dropped, and the retained
    /// ones are renumbered within the surviving global axes.
    pub fn resolve(&self, ops: &[Op]) -> Self {
        let renumbered = surviving(ops);
        Self(
            self.0
                .iter()
                .filter_map(|&axis| renumbered[axis])
                .collect(),
        )
    }
}

/// For each global axis of `ops`, its index in the sliced axis space, or
/// `None` if the axis collapses.
pub(crate) fn surviving(ops: &[Op]) -> Vec<Option<usize>> {
    let mut next = 0;
    ops.iter()
        .map(|op| match op {
            Op::Index(_) => None,
            Op::Range(_) => {
                next += 1;
                Some(next - 1)
            }
        })
        .collect()
}

impl Deref for Axes {
    type Target = [usize];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl TryFrom<Vec<usize>> for Axes {
    type Error = AxesError;

    fn try_from(axes: Vec<usize>) -> Result<Self, Self::Error> {
        Self::new(axes)
    }
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Range;

    fn full() -> Op {
        Op::Range(Range::full())
    }

    #[test]
    fn test_new() {
        assert!(Axes::new(vec![]).is_ok());
        assert!(Axes::new(vec![0, 2, 5]).is_ok());
        assert_eq!(
            Axes::new(vec![1, 1]).unwrap_err(),
            AxesError::NotIncreasing { axes: vec![1, 1] }
        );
        assert!(Axes::new(vec![2, 1]).is_err());

        assert_eq!(Axes::leading(3).to_vec(), vec![0, 1, 2]);
        assert_eq!(Axes::single(4).extent(), 5);
        assert_eq!(Axes::empty().extent(), 0);
        assert_eq!(Axes::leading(2).to_string(), "[0, 1]");
    }

    #[test]
    fn test_project() {
        let ops = vec![Op::Index(1), Op::Range(Range::from(0..2)), full()];
        let axes = Axes::new(vec![0, 2]).unwrap();
        assert_eq!(axes.project(&ops), vec![Op::Index(1), full()]);
        assert!(Axes::empty().project(&ops).is_empty());
    }

    #[test]
    fn test_resolve() {
        let ops = vec![full(), Op::Index(0), full(), Op::Index(3), full()];
        assert_eq!(
            surviving(&ops),
            vec![Some(0), None, Some(1), None, Some(2)]
        );

        // Collapsing axis 1 shifts axis 2 down even for an entry that
        // never touched axis 1.
        let axes = Axes::new(vec![2, 4]).unwrap();
        assert_eq!(axes.resolve(&ops).to_vec(), vec![1, 2]);

        let axes = Axes::new(vec![1, 2]).unwrap();
        assert_eq!(axes.resolve(&ops).to_vec(), vec![1]);

        let axes = Axes::new(vec![1, 3]).unwrap();
        assert!(axes.resolve(&ops).is_empty());
    }
}
