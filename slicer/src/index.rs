//! Index expressions and their normalization.
//!
//! An [`IndexExpr`] is what a caller writes between the brackets: a
//! sequence of [`Token`]s mixing positions, ranges, full-axis wildcards,
//! at most one ellipsis, and labels. Normalization turns it into a
//! canonical tuple of exactly one [`Op`] per global axis.
//!
//! ```
//! use slicer::index::dsl::*;
//! use slicer::index::Op;
//! use slicer::lookup::AliasLookup;
//! use slicer::shape::Range;
//!
//! let expr = slicer::idx![0, ellipsis(), 1..3];
//! let ops = expr.normalize(4, &AliasLookup::default()).unwrap();
//! assert_eq!(
//!     ops,
//!     vec![
//!         Op::Index(0),
//!         Op::Range(Range::full()),
//!         Op::Range(Range::full()),
//!         Op::Range(Range::from(1..3)),
//!     ]
//! );
//! ```

use std::fmt;

use itertools::Itertools;
use serde::Deserialize;
use serde::Serialize;

use crate::lookup::AliasLookup;
use crate::shape::Range;
use crate::value::Label;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum IndexError {
    #[error("too many indices: {given} given for {num_dim} axes")]
    TooManyIndices { given: usize, num_dim: usize },

    #[error("an index expression can only have a single ellipsis, found {count}")]
    MultipleEllipsis { count: usize },

    #[error("range {range} has zero stride")]
    ZeroStride { range: Range },

    #[error("no alias defines label `{label}`")]
    UnknownLabel { label: Label },

    #[error("label `{label}` is ambiguous: bound at (axis, position) {candidates:?}")]
    AmbiguousLabel {
        label: Label,
        candidates: Vec<(usize, usize)>,
    },

    #[error("label `{label}` resolves to axis {axis}, which is already indexed")]
    AxisAlreadyBound { label: Label, axis: usize },
}

/// One element of an index expression.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Token {
    /// Select one position and drop the axis.
    Index(usize),

    /// Select a range of positions and keep the axis.
    Range(Range),

    /// Keep the whole axis.
    Full,

    /// Keep whole axes for as many slots as needed to reach the full
    /// number of axes.
    Ellipsis,

    /// Select the position an alias gives this label, on the axis the
    /// alias gives it.
    Label(Label),
}

impl From<usize> for Token {
    fn from(index: usize) -> Self {
        Token::Index(index)
    }
}

impl From<Range> for Token {
    fn from(range: Range) -> Self {
        Token::Range(range)
    }
}

impl From<std::ops::Range<usize>> for Token {
    fn from(r: std::ops::Range<usize>) -> Self {
        Token::Range(r.into())
    }
}

impl From<std::ops::RangeInclusive<usize>> for Token {
    fn from(r: std::ops::RangeInclusive<usize>) -> Self {
        Token::Range(r.into())
    }
}

impl From<std::ops::RangeFrom<usize>> for Token {
    fn from(r: std::ops::RangeFrom<usize>) -> Self {
        Token::Range(r.into())
    }
}

impl From<std::ops::RangeTo<usize>> for Token {
    fn from(r: std::ops::RangeTo<usize>) -> Self {
        Token::Range(r.into())
    }
}

impl From<std::ops::RangeFull> for Token {
    fn from(_: std::ops::RangeFull) -> Self {
        Token::Full
    }
}

impl From<Label> for Token {
    fn from(label: Label) -> Self {
        Token::Label(label)
    }
}

impl From<&str> for Token {
    fn from(label: &str) -> Self {
        Token::Label(label.into())
    }
}

impl From<String> for Token {
    fn from(label: String) -> Self {
        Token::Label(label.into())
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Token::Index(index) => write!(f, "{}", index),
            Token::Range(range) => write!(f, "{}", range),
            Token::Full => write!(f, ":"),
            Token::Ellipsis => write!(f, "..."),
            Token::Label(label) => write!(f, "{:?}", label.to_string()),
        }
    }
}

/// One axis of a canonical operation tuple.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Op {
    /// Select a position, collapsing the axis.
    Index(usize),
    /// Select a range, retaining the axis.
    Range(Range),
}

impl Op {
    pub fn is_index(&self) -> bool {
        matches!(self, Op::Index(_))
    }
}

impl fmt::Display for Op {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Op::Index(index) => write!(f, "{}", index),
            Op::Range(range) => write!(f, "{}", range),
        }
    }
}

/// A raw index expression.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IndexExpr(Vec<Token>);

impl IndexExpr {
    pub fn new(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }

    pub fn tokens(&self) -> &[Token] {
        &self.0
    }

    /// Normalize into exactly `num_dim` operations.
    ///
    /// Tokens occupy slots left to right, with the ellipsis standing in
    /// for as many slots as are missing; slots beyond the last token are
    /// implicitly full. A positional token binds the axis of its slot. A
    /// label binds whichever axis its alias places it on, which may be
    /// any axis not bound explicitly by another token.
    pub fn normalize(&self, num_dim: usize, lookup: &AliasLookup) -> Result<Vec<Op>, IndexError> {
        let count = self
            .0
            .iter()
            .filter(|token| matches!(token, Token::Ellipsis))
            .count();
        if count > 1 {
            return Err(IndexError::MultipleEllipsis { count });
        }
        let given = self.0.len() - count;
        if given > num_dim {
            return Err(IndexError::TooManyIndices { given, num_dim });
        }

        let mut ops: Vec<Option<Op>> = vec![None; num_dim];
        let mut labels = Vec::new();
        let mut slot = 0;
        for token in &self.0 {
            match token {
                Token::Ellipsis => {
                    slot += num_dim - given;
                    continue;
                }
                Token::Index(index) => ops[slot] = Some(Op::Index(*index)),
                Token::Range(range) => {
                    if range.2 == 0 {
                        return Err(IndexError::ZeroStride {
                            range: range.clone(),
                        });
                    }
                    ops[slot] = Some(Op::Range(range.clone()));
                }
                Token::Full => ops[slot] = Some(Op::Range(Range::full())),
                Token::Label(label) => labels.push(label),
            }
            slot += 1;
        }

        for label in labels {
            let binding = lookup.resolve(label)?;
            let Some(op) = ops.get_mut(binding.axis) else {
                return Err(IndexError::UnknownLabel {
                    label: label.clone(),
                });
            };
            if op.is_some() {
                return Err(IndexError::AxisAlreadyBound {
                    label: label.clone(),
                    axis: binding.axis,
                });
            }
            *op = Some(Op::Index(binding.position));
        }

        Ok(ops
            .into_iter()
            .map(|op| op.unwrap_or_else(|| Op::Range(Range::full())))
            .collect())
    }
}

impl From<Token> for IndexExpr {
    fn from(token: Token) -> Self {
        Self(vec![token])
    }
}

impl From<Vec<Token>> for IndexExpr {
    fn from(tokens: Vec<Token>) -> Self {
        Self(tokens)
    }
}

impl<const N: usize> From<[Token; N]> for IndexExpr {
    fn from(tokens: [Token; N]) -> Self {
        Self(tokens.into())
    }
}

impl FromIterator<Token> for IndexExpr {
    fn from_iter<I: IntoIterator<Item = Token>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl fmt::Display for IndexExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.iter().join(", "))
    }
}

/// Constructors for index tokens.
pub mod dsl {
    use super::Token;
    use crate::shape::Range;
    use crate::value::Label;

    pub fn at(index: usize) -> Token {
        Token::Index(index)
    }
    pub fn range<R: Into<Range>>(range: R) -> Token {
        Token::Range(range.into())
    }
    pub fn full() -> Token {
        Token::Full
    }
    pub fn ellipsis() -> Token {
        Token::Ellipsis
    }
    pub fn label<L: Into<Label>>(label: L) -> Token {
        Token::Label(label.into())
    }
}

/// Build an [`IndexExpr`] from anything convertible into a [`Token`].
///
/// ```
/// use slicer::index::Token;
///
/// let expr = slicer::idx![0, 1..3, .., "a"];
/// assert_eq!(
///     expr.tokens(),
///     &[
///         Token::Index(0),
///         Token::Range((1..3).into()),
///         Token::Full,
///         Token::Label("a".into()),
///     ]
/// );
/// ```
#[macro_export]
macro_rules! idx {
    ( $( $token:expr ),* $(,)? ) => {
        $crate::index::IndexExpr::new(vec![ $( $crate::index::Token::from($token) ),* ])
    };
}

#[cfg(test)]
mod tests {
    use super::dsl::*;
    use super::*;
    use crate::axes::Axes;
    use crate::entry::Tracked;

    fn full_op() -> Op {
        Op::Range(Range::full())
    }

    // Aliases: rows ["a", "b"] on axis 0, columns ["x", "y", "z"] on
    // axis 1, and "a" again at column position 2.
    fn test_lookup() -> AliasLookup {
        let rows = Tracked::with_axes(vec!["a", "b"], Axes::single(0));
        let cols = Tracked::with_axes(vec!["x", "y", "a"], Axes::single(1));
        AliasLookup::new([&rows, &cols])
    }

    fn normalize(expr: IndexExpr, num_dim: usize) -> Result<Vec<Op>, IndexError> {
        expr.normalize(num_dim, &test_lookup())
    }

    #[test]
    fn test_trailing_fill() {
        assert_eq!(
            normalize(idx![0], 3).unwrap(),
            vec![Op::Index(0), full_op(), full_op()]
        );
        assert_eq!(
            normalize(IndexExpr::default(), 2).unwrap(),
            vec![full_op(), full_op()]
        );
        assert!(normalize(IndexExpr::default(), 0).unwrap().is_empty());
    }

    #[test]
    fn test_ellipsis() {
        assert_eq!(
            normalize(idx![ellipsis(), 1], 3).unwrap(),
            vec![full_op(), full_op(), Op::Index(1)]
        );
        assert_eq!(
            normalize(idx![0, ellipsis(), 1..2], 4).unwrap(),
            vec![
                Op::Index(0),
                full_op(),
                full_op(),
                Op::Range(Range(1, Some(2), 1))
            ]
        );
        // An ellipsis may expand to nothing.
        assert_eq!(
            normalize(idx![0, ellipsis(), 1], 2).unwrap(),
            vec![Op::Index(0), Op::Index(1)]
        );

        let result = normalize(idx![ellipsis(), 0, ellipsis()], 3);
        assert!(
            matches!(result, Err(IndexError::MultipleEllipsis { count: 2 })),
            "Unexpected: {:?}",
            result
        );
    }

    #[test]
    fn test_too_many() {
        let result = normalize(idx![0, 0, 0], 2);
        assert!(
            matches!(
                result,
                Err(IndexError::TooManyIndices {
                    given: 3,
                    num_dim: 2
                })
            ),
            "Unexpected: {:?}",
            result
        );
        assert_eq!(
            result.unwrap_err().to_string(),
            "too many indices: 3 given for 2 axes"
        );
        assert!(normalize(idx![0, ellipsis()], 0).is_err());
    }

    #[test]
    fn test_zero_stride() {
        let result = normalize(idx![range(Range(0, None, 0))], 1);
        assert!(
            matches!(result, Err(IndexError::ZeroStride { .. })),
            "Unexpected: {:?}",
            result
        );
    }

    #[test]
    fn test_label_in_place_of_position() {
        assert_eq!(
            normalize(idx!["b", ..], 2).unwrap(),
            normalize(idx![1, ..], 2).unwrap()
        );
        assert_eq!(
            normalize(idx![.., "y"], 2).unwrap(),
            normalize(idx![.., 1], 2).unwrap()
        );
        // A label binds its own axis, whatever slot it sits in.
        assert_eq!(
            normalize(idx!["y"], 2).unwrap(),
            vec![full_op(), Op::Index(1)]
        );
        // Implicit wildcards (trailing or from an ellipsis) yield to labels.
        assert_eq!(
            normalize(idx![ellipsis(), "b"], 2).unwrap(),
            vec![Op::Index(1), full_op()]
        );
    }

    #[test]
    fn test_label_errors() {
        let result = normalize(idx![label("nope")], 2);
        assert!(
            matches!(&result, Err(IndexError::UnknownLabel { label }) if *label == Label::from("nope")),
            "Unexpected: {:?}",
            result
        );

        // "a" names row 0 and column 2.
        let result = normalize(idx!["a"], 2);
        assert!(
            matches!(&result, Err(IndexError::AmbiguousLabel { candidates, .. }) if *candidates == vec![(0, 0), (1, 2)]),
            "Unexpected: {:?}",
            result
        );

        // A position already binds axis 0.
        let result = normalize(idx![0, "b"], 2);
        assert!(
            matches!(result, Err(IndexError::AxisAlreadyBound { axis: 0, .. })),
            "Unexpected: {:?}",
            result
        );
        // So does an explicit wildcard.
        let result = normalize(idx![.., "b"], 2);
        assert!(
            matches!(result, Err(IndexError::AxisAlreadyBound { axis: 0, .. })),
            "Unexpected: {:?}",
            result
        );

        // Two labels on the same axis.
        let result = normalize(idx!["x", "y"], 2);
        assert!(
            matches!(result, Err(IndexError::AxisAlreadyBound { axis: 1, .. })),
            "Unexpected: {:?}",
            result
        );
    }

    #[test]
    fn test_display() {
        let expr = idx![0, 1..3, .., ellipsis(), "a"];
        assert_eq!(expr.to_string(), "[0, 1:3:1, :, ..., \"a\"]");
        assert_eq!(Op::Index(2).to_string(), "2");
        assert!(Op::Index(2).is_index());
        assert!(!full_op().is_index());
    }
}
