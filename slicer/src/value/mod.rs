//! The closed set of container kinds a [`crate::Slicer`] can track, and
//! the per-kind slicing capability it dispatches to.
//!
//! Each kind implements [`Sliceable`]. The engine only ever hands a kind
//! the operations that apply to the axes an entry occupies, in order, and
//! takes back the sliced value; what an integer or a range means for the
//! kind's own layout (dropping a level of nesting, turning a frame row
//! into a series, ...) is decided here.
//!
//! Adding a kind means adding a [`Value`] variant and a [`Sliceable`]
//! implementation for its payload.

mod array;
mod frame;
mod list;

use std::fmt;

use enum_as_inner::EnumAsInner;
use indexmap::IndexMap;
use ndarray::ArrayD;
use serde::Deserialize;
use serde::Serialize;

pub use self::frame::Frame;
pub use self::frame::FrameError;
pub use self::frame::Series;
use crate::index::Op;

/// Errors raised by a container while applying local operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AccessError {
    #[error("index {index} out of range for axis {axis} of size {size}")]
    IndexOutOfRange {
        index: usize,
        axis: usize,
        size: usize,
    },

    #[error("{kind} has no axis {axis} to index")]
    NoSuchAxis { kind: Kind, axis: usize },
}

/// A label along an axis: what aliases expose and dims document.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Label {
    Int(i64),
    Str(String),
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int(value) => write!(f, "{}", value),
            Label::Str(value) => write!(f, "{}", value),
        }
    }
}

impl From<&str> for Label {
    fn from(value: &str) -> Self {
        Label::Str(value.to_string())
    }
}

impl From<String> for Label {
    fn from(value: String) -> Self {
        Label::Str(value)
    }
}

impl From<i64> for Label {
    fn from(value: i64) -> Self {
        Label::Int(value)
    }
}

impl From<i32> for Label {
    fn from(value: i32) -> Self {
        Label::Int(value.into())
    }
}

/// A single element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
}

impl Scalar {
    /// The label this scalar spells, if it is an integer or a string.
    pub fn as_label(&self) -> Option<Label> {
        match self {
            Scalar::Int(value) => Some(Label::Int(*value)),
            Scalar::Str(value) => Some(Label::Str(value.clone())),
            Scalar::Bool(_) | Scalar::Float(_) => None,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(value) => write!(f, "{}", value),
            Scalar::Int(value) => write!(f, "{}", value),
            Scalar::Float(value) => write!(f, "{}", value),
            Scalar::Str(value) => write!(f, "{:?}", value),
        }
    }
}

impl From<Label> for Scalar {
    fn from(label: Label) -> Self {
        match label {
            Label::Int(value) => Scalar::Int(value),
            Label::Str(value) => Scalar::Str(value),
        }
    }
}

/// The kind tag of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Kind {
    Scalar,
    List,
    Map,
    Array,
    Series,
    Frame,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Kind::Scalar => "scalar",
            Kind::List => "list",
            Kind::Map => "map",
            Kind::Array => "array",
            Kind::Series => "series",
            Kind::Frame => "frame",
        };
        f.write_str(name)
    }
}

/// A default alias proposed by a value for one of its own axes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefaultAlias {
    /// The name the alias is registered under.
    pub name: String,
    /// The local axis of the value the labels run along.
    pub axis: usize,
    pub labels: Vec<Label>,
}

impl DefaultAlias {
    pub fn new(name: &str, axis: usize, labels: Vec<Label>) -> Self {
        Self {
            name: name.to_string(),
            axis,
            labels,
        }
    }
}

/// The slicing capability of a container kind.
pub trait Sliceable {
    fn kind(&self) -> Kind;

    /// The native shape of the value.
    fn shape(&self) -> Vec<usize>;

    fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Apply `ops` to this value's leading axes; `axis` is the local
    /// axis the first op applies to, used when reporting errors. Axes
    /// past the end of `ops` are left untouched.
    fn slice_from(&self, ops: &[Op], axis: usize) -> Result<Value, AccessError>;

    fn slice(&self, ops: &[Op]) -> Result<Value, AccessError> {
        self.slice_from(ops, 0)
    }

    /// The `(position, label)` pairs this value exposes along a local axis.
    fn axis_labels(&self, _axis: usize) -> Vec<(usize, Label)> {
        Vec::new()
    }

    /// Aliases to generate when this is the only value being tracked.
    fn default_aliases(&self) -> Vec<DefaultAlias> {
        Vec::new()
    }
}

/// The positions `op` selects on an axis of `size`.
pub(crate) fn positions(op: &Op, axis: usize, size: usize) -> Result<Vec<usize>, AccessError> {
    match op {
        Op::Index(index) if *index >= size => Err(AccessError::IndexOutOfRange {
            index: *index,
            axis,
            size,
        }),
        Op::Index(index) => Ok(vec![*index]),
        Op::Range(range) => Ok(range.positions(size).collect()),
    }
}

/// A tracked value.
#[derive(Debug, Clone, PartialEq, EnumAsInner)]
pub enum Value {
    Scalar(Scalar),
    List(Vec<Value>),
    Map(IndexMap<String, Value>),
    Array(ArrayD<f64>),
    Series(Series),
    Frame(Frame),
}

impl Value {
    /// A list of scalars spelling `labels`.
    pub fn from_labels(labels: Vec<Label>) -> Self {
        Value::List(
            labels
                .into_iter()
                .map(|label| Value::Scalar(label.into()))
                .collect(),
        )
    }

    /// The label this value spells, if it is an integer or string scalar.
    pub fn as_label(&self) -> Option<Label> {
        self.as_scalar().and_then(Scalar::as_label)
    }

    /// The labels of a list made entirely of integer or string scalars.
    pub fn labels(&self) -> Option<Vec<Label>> {
        self.as_list()?.iter().map(Value::as_label).collect()
    }
}

impl Sliceable for Value {
    fn kind(&self) -> Kind {
        match self {
            Value::Scalar(_) => Kind::Scalar,
            Value::List(_) => Kind::List,
            Value::Map(_) => Kind::Map,
            Value::Array(_) => Kind::Array,
            Value::Series(_) => Kind::Series,
            Value::Frame(_) => Kind::Frame,
        }
    }

    fn shape(&self) -> Vec<usize> {
        match self {
            Value::Scalar(_) => Vec::new(),
            Value::List(items) => items.shape(),
            Value::Map(entries) => entries.shape(),
            Value::Array(array) => array.shape().to_vec(),
            Value::Series(series) => series.shape(),
            Value::Frame(frame) => frame.shape(),
        }
    }

    fn slice_from(&self, ops: &[Op], axis: usize) -> Result<Value, AccessError> {
        match self {
            Value::Scalar(scalar) if ops.is_empty() => Ok(Value::Scalar(scalar.clone())),
            Value::Scalar(_) => Err(AccessError::NoSuchAxis {
                kind: Kind::Scalar,
                axis,
            }),
            Value::List(items) => items.slice_from(ops, axis),
            Value::Map(entries) => entries.slice_from(ops, axis),
            Value::Array(array) => array.slice_from(ops, axis),
            Value::Series(series) => series.slice_from(ops, axis),
            Value::Frame(frame) => frame.slice_from(ops, axis),
        }
    }

    fn axis_labels(&self, axis: usize) -> Vec<(usize, Label)> {
        match self {
            Value::Scalar(_) | Value::Array(_) => Vec::new(),
            Value::List(items) => items.axis_labels(axis),
            Value::Map(entries) => entries.axis_labels(axis),
            Value::Series(series) => series.axis_labels(axis),
            Value::Frame(frame) => frame.axis_labels(axis),
        }
    }

    fn default_aliases(&self) -> Vec<DefaultAlias> {
        match self {
            Value::Scalar(_) | Value::List(_) | Value::Array(_) => Vec::new(),
            Value::Map(entries) => entries.default_aliases(),
            Value::Series(series) => series.default_aliases(),
            Value::Frame(frame) => frame.default_aliases(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Scalar(scalar) => write!(f, "{}", scalar),
            Value::List(items) => {
                write!(f, "[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                write!(f, "]")
            }
            Value::Map(entries) => {
                write!(f, "{{")?;
                for (i, (key, value)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{:?}: {}", key, value)?;
                }
                write!(f, "}}")
            }
            Value::Array(array) => write!(f, "{}", array),
            Value::Series(series) => write!(f, "{}", series),
            Value::Frame(frame) => write!(f, "{}", frame),
        }
    }
}

impl From<Scalar> for Value {
    fn from(scalar: Scalar) -> Self {
        Value::Scalar(scalar)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Value::Scalar(Scalar::Bool(value))
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Scalar(Scalar::Int(value))
    }
}

impl From<i32> for Value {
    fn from(value: i32) -> Self {
        Value::Scalar(Scalar::Int(value.into()))
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Scalar(Scalar::Float(value))
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Scalar(Scalar::Str(value.to_string()))
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Scalar(Scalar::Str(value))
    }
}

impl From<Label> for Value {
    fn from(label: Label) -> Self {
        Value::Scalar(label.into())
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(entries: IndexMap<String, Value>) -> Self {
        Value::Map(entries)
    }
}

impl<D: ndarray::Dimension> From<ndarray::Array<f64, D>> for Value {
    fn from(array: ndarray::Array<f64, D>) -> Self {
        Value::Array(array.into_dyn())
    }
}

impl From<Series> for Value {
    fn from(series: Series) -> Self {
        Value::Series(series)
    }
}

impl From<Frame> for Value {
    fn from(frame: Frame) -> Self {
        Value::Frame(frame)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Range;

    #[test]
    fn test_scalar() {
        let value = Value::from(3);
        assert_eq!(value.kind(), Kind::Scalar);
        assert!(value.shape().is_empty());
        assert_eq!(value.slice(&[]).unwrap(), value);
        assert_eq!(
            value.slice(&[Op::Index(0)]).unwrap_err(),
            AccessError::NoSuchAxis {
                kind: Kind::Scalar,
                axis: 0
            }
        );
        assert_eq!(value.as_label(), Some(Label::Int(3)));
        assert_eq!(Value::from(1.5).as_label(), None);
        assert_eq!(Value::from(true).as_label(), None);
    }

    #[test]
    fn test_labels() {
        let value = Value::from_labels(vec![Label::from("a"), Label::from(2)]);
        assert_eq!(value, Value::from(vec![Value::from("a"), Value::from(2)]));
        assert_eq!(value.labels(), Some(vec![Label::from("a"), Label::from(2)]));
        assert_eq!(Value::from(vec![1.0, 2.0]).labels(), None);
        assert_eq!(Value::from("a").labels(), None);
        assert_eq!(Label::from("a").to_string(), "a");
        assert_eq!(Label::from(7).to_string(), "7");
    }

    #[test]
    fn test_positions() {
        assert_eq!(positions(&Op::Index(1), 0, 3).unwrap(), vec![1]);
        assert_eq!(
            positions(&Op::Index(3), 2, 3).unwrap_err(),
            AccessError::IndexOutOfRange {
                index: 3,
                axis: 2,
                size: 3
            }
        );
        assert_eq!(
            positions(&Op::Range(Range(0, None, 2)), 0, 5).unwrap(),
            vec![0, 2, 4]
        );
    }

    #[test]
    fn test_display() {
        let value = Value::from(vec![Value::from(1), Value::from("a"), Value::from(1.5)]);
        assert_eq!(value.to_string(), "[1, \"a\", 1.5]");
        assert_eq!(Kind::Frame.to_string(), "frame");
        assert_eq!(
            AccessError::NoSuchAxis {
                kind: Kind::List,
                axis: 2
            }
            .to_string(),
            "list has no axis 2 to index"
        );
    }
}
