//! Unified slicing over heterogeneous tensor-like values.
//!
//! A [`Slicer`] tracks a set of values (nested lists, maps, dense arrays,
//! series and frames), each aligned to some axes of a shared global axis
//! space, and applies one index expression to all of them at once:
//!
//! ```
//! use slicer::idx;
//! use slicer::Value;
//!
//! let s = slicer::slicer![
//!     vec![vec![1, 2, 3], vec![4, 5, 6]],
//!     vec![vec![7, 8, 9], vec![10, 11, 12]]
//! ]
//! .unwrap();
//!
//! let sliced = s.slice(idx![0, 0..2]).unwrap();
//! assert_eq!(sliced.shape().to_string(), "(2,)");
//! assert_eq!(
//!     sliced.o(),
//!     Value::from(vec![vec![1, 2], vec![7, 8]]),
//! );
//! ```
//!
//! Named aliases let labels stand in for positions, and dim entries
//! document the labels along a single axis. See [`Slicer`] for the
//! facade and [`index`] for index expressions.

/// Global axis lists.
pub mod axes;
pub mod config;
/// Tracked values, aliases and dims.
pub mod entry;
/// Index expressions and their normalization.
pub mod index;
/// Label resolution through aliases.
pub mod lookup;
/// Global shapes and ranges.
pub mod shape;
mod slicer;
/// The container kinds a slicer can track.
pub mod value;

#[cfg(test)]
pub(crate) mod test_utils;

pub use axes::Axes;
pub use config::Config;
pub use entry::Assignment;
pub use entry::Dim;
pub use entry::Entry;
pub use entry::Tracked;
pub use index::dsl;
pub use index::IndexExpr;
pub use index::Op;
pub use index::Token;
pub use shape::Extent;
/// A range with optional end and a stride, used in index expressions.
pub use shape::Range;
pub use shape::Shape;
pub use slicer::Attr;
pub use slicer::Slicer;
pub use slicer::SlicerError;
pub use slicer::ANONYMOUS;
pub use slicer::SHAPE;
pub use value::Frame;
pub use value::Kind;
pub use value::Label;
pub use value::Scalar;
pub use value::Series;
pub use value::Sliceable;
pub use value::Value;
