//! Tracked entries: values aligned to the global axis space, and the
//! label-only dim entries documenting a single axis.

use std::fmt;

use indexmap::IndexMap;

use crate::axes::Axes;
use crate::index::Op;
use crate::value::AccessError;
use crate::value::Frame;
use crate::value::Label;
use crate::value::Series;
use crate::value::Sliceable;
use crate::value::Value;

/// A value together with the global axes it occupies.
///
/// The value's leading native axes map, in order, onto `axes`; native
/// axes past the end of `axes` are not tracked and never sliced.
#[derive(Debug, Clone, PartialEq)]
pub struct Tracked {
    value: Value,
    axes: Axes,
}

impl Tracked {
    /// Track `value` on the axes `0..ndim`.
    pub fn new(value: impl Into<Value>) -> Self {
        let value = value.into();
        let axes = Axes::leading(value.ndim());
        Self { value, axes }
    }

    pub fn with_axes(value: impl Into<Value>, axes: Axes) -> Self {
        Self {
            value: value.into(),
            axes,
        }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn into_value(self) -> Value {
        self.value
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    /// The native shape restricted to the tracked axes.
    pub fn local_shape(&self) -> Vec<usize> {
        let mut shape = self.value.shape();
        shape.truncate(self.axes.len());
        shape
    }

    /// Slice with a canonical tuple over the whole global axis space.
    pub fn slice(&self, ops: &[Op]) -> Result<Self, AccessError> {
        if self.axes.is_empty() {
            return Ok(self.clone());
        }
        let mut local = self.axes.project(ops);
        // Wildcards on axes the value does not have are no-ops.
        let ndim = self.value.ndim();
        while local.len() > ndim
            && matches!(local.last(), Some(Op::Range(range)) if range.is_full())
        {
            local.pop();
        }
        Ok(Self {
            value: self.value.slice(&local)?,
            axes: self.axes.resolve(ops),
        })
    }
}

/// A sequence of labels documenting the positions along one axis.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dim {
    labels: Vec<Label>,
    axes: Axes,
}

impl Dim {
    pub fn new(labels: Vec<Label>, axis: usize) -> Self {
        Self {
            labels,
            axes: Axes::single(axis),
        }
    }

    /// Labels not attached to any axis.
    pub fn unaligned(labels: Vec<Label>) -> Self {
        Self {
            labels,
            axes: Axes::empty(),
        }
    }

    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    pub fn axes(&self) -> &Axes {
        &self.axes
    }

    /// The same dim with its labels replaced.
    pub fn relabel(&self, labels: Vec<Label>) -> Self {
        Self {
            labels,
            axes: self.axes.clone(),
        }
    }

    /// Keep the labels at the positions that survive on this dim's axis.
    /// Collapsing the axis leaves no labels and no axis.
    pub fn slice(&self, ops: &[Op]) -> Self {
        let Some(&axis) = self.axes.first() else {
            return self.clone();
        };
        match ops.get(axis) {
            None => self.clone(),
            Some(Op::Index(_)) => Self::unaligned(Vec::new()),
            Some(Op::Range(range)) => Self {
                labels: range
                    .positions(self.labels.len())
                    .map(|position| self.labels[position].clone())
                    .collect(),
                axes: self.axes.resolve(ops),
            },
        }
    }
}

/// An explicitly typed entry.
#[derive(Debug, Clone, PartialEq)]
pub enum Entry {
    /// A plain tracked value.
    Obj(Tracked),
    /// A tracked value whose labels can stand in for positions.
    Alias(Tracked),
    Dim(Dim),
}

impl Entry {
    pub fn obj(value: impl Into<Value>) -> Self {
        Entry::Obj(Tracked::new(value))
    }

    pub fn obj_on(value: impl Into<Value>, axes: Axes) -> Self {
        Entry::Obj(Tracked::with_axes(value, axes))
    }

    pub fn alias(value: impl Into<Value>, axes: Axes) -> Self {
        Entry::Alias(Tracked::with_axes(value, axes))
    }

    pub fn dim(labels: Vec<Label>, axis: usize) -> Self {
        Entry::Dim(Dim::new(labels, axis))
    }

    pub fn axes(&self) -> &Axes {
        match self {
            Entry::Obj(tracked) | Entry::Alias(tracked) => tracked.axes(),
            Entry::Dim(dim) => dim.axes(),
        }
    }

    /// The sizes this entry reports for its axes. Dims only document an
    /// axis and report none.
    pub fn local_shape(&self) -> Vec<usize> {
        match self {
            Entry::Obj(tracked) | Entry::Alias(tracked) => tracked.local_shape(),
            Entry::Dim(_) => Vec::new(),
        }
    }

    pub fn kind(&self) -> EntryKind {
        match self {
            Entry::Obj(_) => EntryKind::Obj,
            Entry::Alias(_) => EntryKind::Alias,
            Entry::Dim(_) => EntryKind::Dim,
        }
    }
}

impl From<Tracked> for Entry {
    fn from(tracked: Tracked) -> Self {
        Entry::Obj(tracked)
    }
}

impl From<Dim> for Entry {
    fn from(dim: Dim) -> Self {
        Entry::Dim(dim)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntryKind {
    Obj,
    Alias,
    Dim,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryKind::Obj => write!(f, "obj"),
            EntryKind::Alias => write!(f, "alias"),
            EntryKind::Dim => write!(f, "dim"),
        }
    }
}

/// What is assigned to a name.
///
/// A bare value takes the kind and axes of whatever entry already holds
/// the name, and is tracked as a plain value on its leading axes
/// otherwise. A typed entry is installed as given.
#[derive(Debug, Clone, PartialEq)]
pub enum Assignment {
    Bare(Value),
    Entry(Entry),
}

impl From<Value> for Assignment {
    fn from(value: Value) -> Self {
        Assignment::Bare(value)
    }
}

impl From<Entry> for Assignment {
    fn from(entry: Entry) -> Self {
        Assignment::Entry(entry)
    }
}

impl From<Tracked> for Assignment {
    fn from(tracked: Tracked) -> Self {
        Assignment::Entry(Entry::Obj(tracked))
    }
}

impl From<Dim> for Assignment {
    fn from(dim: Dim) -> Self {
        Assignment::Entry(Entry::Dim(dim))
    }
}

impl<T: Into<Value>> From<Vec<T>> for Assignment {
    fn from(items: Vec<T>) -> Self {
        Assignment::Bare(items.into())
    }
}

impl From<IndexMap<String, Value>> for Assignment {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Assignment::Bare(entries.into())
    }
}

impl<D: ndarray::Dimension> From<ndarray::Array<f64, D>> for Assignment {
    fn from(array: ndarray::Array<f64, D>) -> Self {
        Assignment::Bare(array.into())
    }
}

impl From<Series> for Assignment {
    fn from(series: Series) -> Self {
        Assignment::Bare(series.into())
    }
}

impl From<Frame> for Assignment {
    fn from(frame: Frame) -> Self {
        Assignment::Bare(frame.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Range;

    fn labels(labels: &[&str]) -> Vec<Label> {
        labels.iter().map(|&label| Label::from(label)).collect()
    }

    fn full() -> Op {
        Op::Range(Range::full())
    }

    #[test]
    fn test_tracked_defaults() {
        let tracked = Tracked::new(vec![vec![1, 2, 3], vec![4, 5, 6]]);
        assert_eq!(tracked.axes().to_vec(), vec![0, 1]);
        assert_eq!(tracked.local_shape(), vec![2, 3]);

        let scalar = Tracked::new(1);
        assert!(scalar.axes().is_empty());

        // Only the tracked axes count towards the local shape.
        let partial = Tracked::with_axes(vec![vec![1, 2, 3]], Axes::single(2));
        assert_eq!(partial.local_shape(), vec![1]);
    }

    #[test]
    fn test_tracked_slice() {
        let tracked = Tracked::with_axes(
            vec![vec![1, 2, 3], vec![4, 5, 6]],
            Axes::new(vec![1, 2]).unwrap(),
        );
        let ops = vec![Op::Index(0), full(), Op::Index(2)];
        let sliced = tracked.slice(&ops).unwrap();
        assert_eq!(sliced.value(), &Value::from(vec![3, 6]));
        assert_eq!(sliced.axes().to_vec(), vec![0]);

        let err = tracked
            .slice(&[full(), Op::Index(2), full()])
            .unwrap_err();
        assert!(
            matches!(err, AccessError::IndexOutOfRange { index: 2, .. }),
            "Unexpected: {:?}",
            err
        );
    }

    #[test]
    fn test_axes_beyond_the_value() {
        let tracked = Tracked::with_axes(vec![1, 2, 3], Axes::leading(2));
        assert_eq!(tracked.local_shape(), vec![3]);

        let sliced = tracked.slice(&[Op::Index(1), full()]).unwrap();
        assert_eq!(sliced.clone().into_value(), Value::from(2));
        assert_eq!(sliced.axes().to_vec(), vec![0]);

        assert!(matches!(
            tracked.slice(&[full(), Op::Index(0)]),
            Err(AccessError::NoSuchAxis { .. })
        ));
    }

    #[test]
    fn test_unaligned_passthrough() {
        let tracked = Tracked::with_axes(vec![1, 2, 3], Axes::empty());
        let sliced = tracked.slice(&[Op::Index(9)]).unwrap();
        assert_eq!(sliced, tracked);
    }

    #[test]
    fn test_dim_slice() {
        let dim = Dim::new(labels(&["x", "y", "z"]), 1);

        let sliced = dim.slice(&[Op::Index(0), Op::Range(Range::from(1..))]);
        assert_eq!(sliced.labels(), labels(&["y", "z"]).as_slice());
        assert_eq!(sliced.axes().to_vec(), vec![0]);

        let collapsed = dim.slice(&[full(), Op::Index(1)]);
        assert!(collapsed.labels().is_empty());
        assert!(collapsed.axes().is_empty());

        // An axis the tuple does not reach is left alone.
        let far = Dim::new(labels(&["x"]), 3);
        assert_eq!(far.slice(&[Op::Index(0)]), far);

        let unaligned = Dim::unaligned(labels(&["a"]));
        assert_eq!(unaligned.slice(&[Op::Index(0)]), unaligned);
    }

    #[test]
    fn test_entry() {
        let entry = Entry::alias(vec!["a", "b"], Axes::single(1));
        assert_eq!(entry.kind(), EntryKind::Alias);
        assert_eq!(entry.axes().to_vec(), vec![1]);
        assert_eq!(entry.local_shape(), vec![2]);
        let dim = Entry::dim(labels(&["x"]), 0);
        assert_eq!(dim.kind().to_string(), "dim");
        assert!(dim.local_shape().is_empty());
        assert_eq!(
            Assignment::from(Value::from(1)),
            Assignment::Bare(Value::from(1))
        );
        assert_eq!(
            Assignment::from(vec!["a"]),
            Assignment::Bare(Value::from(vec!["a"]))
        );
        let dim = Dim::new(labels(&["x"]), 2).relabel(labels(&["y", "z"]));
        assert_eq!(dim.axes().to_vec(), vec![2]);
        assert_eq!(dim.labels(), labels(&["y", "z"]).as_slice());
    }
}
