use std::fmt;

use itertools::Itertools;
use ndarray::Array2;
use ndarray::Axis;

use super::positions;
use super::AccessError;
use super::DefaultAlias;
use super::Kind;
use super::Label;
use super::Scalar;
use super::Sliceable;
use super::Value;
use crate::index::Op;
use crate::shape::Range;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum FrameError {
    #[error("{what} has length {got}, expected {expected}")]
    LengthMismatch {
        what: &'static str,
        expected: usize,
        got: usize,
    },
}

/// A one-dimensional labeled column of scalars.
#[derive(Debug, Clone, PartialEq)]
pub struct Series {
    name: Option<Label>,
    index: Vec<Label>,
    values: Vec<Scalar>,
}

impl Series {
    pub fn new(index: Vec<Label>, values: Vec<Scalar>) -> Result<Self, FrameError> {
        if index.len() != values.len() {
            return Err(FrameError::LengthMismatch {
                what: "index",
                expected: values.len(),
                got: index.len(),
            });
        }
        Ok(Self {
            name: None,
            index,
            values,
        })
    }

    /// A series indexed by `0..values.len()`.
    pub fn from_values(values: Vec<Scalar>) -> Self {
        Self {
            name: None,
            index: integer_index(values.len()),
            values,
        }
    }

    pub fn with_name(mut self, name: impl Into<Label>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn name(&self) -> Option<&Label> {
        self.name.as_ref()
    }

    pub fn index(&self) -> &[Label] {
        &self.index
    }

    pub fn values(&self) -> &[Scalar] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl Sliceable for Series {
    fn kind(&self) -> Kind {
        Kind::Series
    }

    fn shape(&self) -> Vec<usize> {
        vec![self.len()]
    }

    fn slice_from(&self, ops: &[Op], axis: usize) -> Result<Value, AccessError> {
        match ops {
            [] => Ok(Value::Series(self.clone())),
            [op] => {
                let selected = positions(op, axis, self.len())?;
                match op {
                    Op::Index(index) => Ok(Value::Scalar(self.values[*index].clone())),
                    Op::Range(_) => Ok(Value::Series(Self {
                        name: self.name.clone(),
                        index: pick(&self.index, &selected),
                        values: pick(&self.values, &selected),
                    })),
                }
            }
            _ => Err(AccessError::NoSuchAxis {
                kind: Kind::Series,
                axis: axis + 1,
            }),
        }
    }

    fn axis_labels(&self, axis: usize) -> Vec<(usize, Label)> {
        match axis {
            0 => self.index.iter().cloned().enumerate().collect(),
            _ => Vec::new(),
        }
    }

    fn default_aliases(&self) -> Vec<DefaultAlias> {
        vec![DefaultAlias::new("index", 0, self.index.clone())]
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Series(")?;
        if let Some(name) = &self.name {
            write!(f, "name={}, ", name)?;
        }
        write!(
            f,
            "{{{}}})",
            self.index
                .iter()
                .zip(&self.values)
                .map(|(label, value)| format!("{}: {}", label, value))
                .join(", ")
        )
    }
}

/// A two-dimensional table of scalars with labeled rows and columns.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    index: Vec<Label>,
    columns: Vec<Label>,
    data: Array2<Scalar>,
}

impl Frame {
    pub fn new(
        index: Vec<Label>,
        columns: Vec<Label>,
        data: Array2<Scalar>,
    ) -> Result<Self, FrameError> {
        let (rows, cols) = data.dim();
        if index.len() != rows {
            return Err(FrameError::LengthMismatch {
                what: "index",
                expected: rows,
                got: index.len(),
            });
        }
        if columns.len() != cols {
            return Err(FrameError::LengthMismatch {
                what: "columns",
                expected: cols,
                got: columns.len(),
            });
        }
        Ok(Self {
            index,
            columns,
            data,
        })
    }

    /// Build a frame from named columns of equal length, indexed by
    /// `0..rows`.
    pub fn from_columns(columns: Vec<(Label, Vec<Scalar>)>) -> Result<Self, FrameError> {
        let rows = columns.first().map_or(0, |(_, values)| values.len());
        if let Some((_, values)) = columns.iter().find(|(_, values)| values.len() != rows) {
            return Err(FrameError::LengthMismatch {
                what: "column",
                expected: rows,
                got: values.len(),
            });
        }
        let data = Array2::from_shape_fn((rows, columns.len()), |(row, col)| {
            columns[col].1[row].clone()
        });
        Ok(Self {
            index: integer_index(rows),
            columns: columns.into_iter().map(|(label, _)| label).collect(),
            data,
        })
    }

    pub fn index(&self) -> &[Label] {
        &self.index
    }

    pub fn columns(&self) -> &[Label] {
        &self.columns
    }

    pub fn data(&self) -> &Array2<Scalar> {
        &self.data
    }
}

impl Sliceable for Frame {
    fn kind(&self) -> Kind {
        Kind::Frame
    }

    fn shape(&self) -> Vec<usize> {
        let (rows, cols) = self.data.dim();
        vec![rows, cols]
    }

    fn slice_from(&self, ops: &[Op], axis: usize) -> Result<Value, AccessError> {
        if ops.len() > 2 {
            return Err(AccessError::NoSuchAxis {
                kind: Kind::Frame,
                axis: axis + 2,
            });
        }
        let full = Op::Range(Range::full());
        let row_op = ops.first().unwrap_or(&full);
        let col_op = ops.get(1).unwrap_or(&full);
        let rows = positions(row_op, axis, self.index.len())?;
        let cols = positions(col_op, axis + 1, self.columns.len())?;
        let data = self.data.select(Axis(0), &rows).select(Axis(1), &cols);

        let value = match (row_op, col_op) {
            (Op::Range(_), Op::Range(_)) => Value::Frame(Self {
                index: pick(&self.index, &rows),
                columns: pick(&self.columns, &cols),
                data,
            }),
            (Op::Index(row), Op::Range(_)) => Value::Series(Series {
                name: Some(self.index[*row].clone()),
                index: pick(&self.columns, &cols),
                values: data.row(0).to_vec(),
            }),
            (Op::Range(_), Op::Index(col)) => Value::Series(Series {
                name: Some(self.columns[*col].clone()),
                index: pick(&self.index, &rows),
                values: data.column(0).to_vec(),
            }),
            (Op::Index(row), Op::Index(col)) => Value::Scalar(self.data[[*row, *col]].clone()),
        };
        Ok(value)
    }

    fn axis_labels(&self, axis: usize) -> Vec<(usize, Label)> {
        match axis {
            0 => self.index.iter().cloned().enumerate().collect(),
            1 => self.columns.iter().cloned().enumerate().collect(),
            _ => Vec::new(),
        }
    }

    fn default_aliases(&self) -> Vec<DefaultAlias> {
        vec![
            DefaultAlias::new("index", 0, self.index.clone()),
            DefaultAlias::new("columns", 1, self.columns.clone()),
        ]
    }
}

impl fmt::Display for Frame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "\t{}", self.columns.iter().join("\t"))?;
        for (label, row) in self.index.iter().zip(self.data.rows()) {
            writeln!(f, "{}\t{}", label, row.iter().join("\t"))?;
        }
        Ok(())
    }
}

fn integer_index(len: usize) -> Vec<Label> {
    (0..len as i64).map(Label::Int).collect()
}

fn pick<T: Clone>(items: &[T], selected: &[usize]) -> Vec<T> {
    selected.iter().map(|&i| items[i].clone()).collect()
}
