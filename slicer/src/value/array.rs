use ndarray::ArrayD;
use ndarray::ArrayViewD;
use ndarray::Axis;
use ndarray::Slice;

use super::AccessError;
use super::Kind;
use super::Sliceable;
use super::Value;
use crate::index::Op;

/// Apply `ops` to the leading axes of a dense view. Indices are checked
/// up front so that the view is only narrowed once all of them are
/// known to be in range.
pub(crate) fn slice_dense<'a, A: Clone>(
    mut view: ArrayViewD<'a, A>,
    ops: &[Op],
    axis: usize,
    kind: Kind,
) -> Result<ArrayD<A>, AccessError> {
    if ops.len() > view.ndim() {
        return Err(AccessError::NoSuchAxis {
            kind,
            axis: axis + view.ndim(),
        });
    }
    for (k, op) in ops.iter().enumerate() {
        let size = view.len_of(Axis(k));
        if let Op::Index(index) = op {
            if *index >= size {
                return Err(AccessError::IndexOutOfRange {
                    index: *index,
                    axis: axis + k,
                    size,
                });
            }
        }
    }

    // Back to front, so collapsing an axis leaves the earlier ones in place.
    for (k, op) in ops.iter().enumerate().rev() {
        match op {
            Op::Index(index) => view = view.index_axis_move(Axis(k), *index),
            Op::Range(range) => {
                let len = view.len_of(Axis(k));
                let (begin, end, stride) = range.resolve(len);
                // Any stride of at least the axis length picks only `begin`.
                let stride = stride.clamp(1, len.max(1));
                view.slice_axis_inplace(
                    Axis(k),
                    Slice::new(
                        begin.min(end) as isize,
                        Some(end as isize),
                        stride as isize,
                    ),
                );
            }
        }
    }
    Ok(view.to_owned())
}

impl Sliceable for ArrayD<f64> {
    fn kind(&self) -> Kind {
        Kind::Array
    }

    fn shape(&self) -> Vec<usize> {
        ArrayD::shape(self).to_vec()
    }

    fn slice_from(&self, ops: &[Op], axis: usize) -> Result<Value, AccessError> {
        slice_dense(self.view(), ops, axis, Kind::Array).map(Value::Array)
    }
}
