use indexmap::IndexMap;

use super::positions;
use super::AccessError;
use super::DefaultAlias;
use super::Kind;
use super::Label;
use super::Sliceable;
use super::Value;
use crate::index::Op;

// Nested containers report the shape along their first elements.
fn nested_shape<'a>(len: usize, first: Option<&'a Value>) -> Vec<usize> {
    let mut shape = vec![len];
    if let Some(first) = first {
        shape.extend(first.shape());
    }
    shape
}

impl Sliceable for Vec<Value> {
    fn kind(&self) -> Kind {
        Kind::List
    }

    fn shape(&self) -> Vec<usize> {
        nested_shape(self.len(), self.first())
    }

    fn slice_from(&self, ops: &[Op], axis: usize) -> Result<Value, AccessError> {
        let Some((op, rest)) = ops.split_first() else {
            return Ok(Value::List(self.clone()));
        };
        let selected = positions(op, axis, self.len())?;
        let mut items = selected
            .into_iter()
            .map(|position| self[position].slice_from(rest, axis + 1));
        match op {
            Op::Index(_) => items.next().unwrap_or_else(|| {
                Err(AccessError::IndexOutOfRange {
                    index: 0,
                    axis,
                    size: self.len(),
                })
            }),
            Op::Range(_) => Ok(Value::List(items.collect::<Result<_, _>>()?)),
        }
    }

    fn axis_labels(&self, axis: usize) -> Vec<(usize, Label)> {
        if axis != 0 {
            return Vec::new();
        }
        self.iter()
            .enumerate()
            .filter_map(|(position, item)| Some((position, item.as_label()?)))
            .collect()
    }
}

impl Sliceable for IndexMap<String, Value> {
    fn kind(&self) -> Kind {
        Kind::Map
    }

    fn shape(&self) -> Vec<usize> {
        nested_shape(self.len(), self.first().map(|(_, value)| value))
    }

    fn slice_from(&self, ops: &[Op], axis: usize) -> Result<Value, AccessError> {
        let Some((op, rest)) = ops.split_first() else {
            return Ok(Value::Map(self.clone()));
        };
        let selected = positions(op, axis, self.len())?;
        let mut entries = selected.into_iter().filter_map(|position| {
            let (key, value) = self.get_index(position)?;
            Some(
                value
                    .slice_from(rest, axis + 1)
                    .map(|value| (key.clone(), value)),
            )
        });
        match op {
            Op::Index(_) => match entries.next() {
                Some(entry) => entry.map(|(_, value)| value),
                None => Err(AccessError::IndexOutOfRange {
                    index: 0,
                    axis,
                    size: self.len(),
                }),
            },
            Op::Range(_) => Ok(Value::Map(entries.collect::<Result<_, _>>()?)),
        }
    }

    fn axis_labels(&self, axis: usize) -> Vec<(usize, Label)> {
        if axis != 0 {
            return Vec::new();
        }
        self.keys()
            .enumerate()
            .map(|(position, key)| (position, Label::from(key.as_str())))
            .collect()
    }

    fn default_aliases(&self) -> Vec<DefaultAlias> {
        vec![DefaultAlias::new(
            "keys",
            0,
            self.keys().map(|key| Label::from(key.as_str())).collect(),
        )]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Range;

    fn grid() -> Value {
        Value::from(vec![vec![1, 2, 3], vec![4, 5, 6]])
    }

    fn map() -> Value {
        let mut entries = IndexMap::new();
        entries.insert("x".to_string(), Value::from(vec![1, 2, 3]));
        entries.insert("y".to_string(), Value::from(vec![4, 5, 6]));
        Value::Map(entries)
    }

    #[test]
    fn test_list_shape() {
        assert_eq!(grid().shape(), vec![2, 3]);
        assert_eq!(Value::List(vec![]).shape(), vec![0]);
        assert_eq!(Value::from(vec!["a", "b"]).shape(), vec![2]);
        assert_eq!(grid().ndim(), 2);
        assert_eq!(grid().kind(), Kind::List);
    }

    #[test]
    fn test_list_slice() {
        let grid = grid();
        assert_eq!(grid.slice(&[]).unwrap(), grid);
        assert_eq!(
            grid.slice(&[Op::Index(0), Op::Range(Range::from(0..2))])
                .unwrap(),
            Value::from(vec![1, 2])
        );
        assert_eq!(
            grid.slice(&[Op::Range(Range::full()), Op::Index(1)])
                .unwrap(),
            Value::from(vec![2, 5])
        );
        assert_eq!(
            grid.slice(&[Op::Range(Range::full()), Op::Range(Range(0, None, 2))])
                .unwrap(),
            Value::from(vec![vec![1, 3], vec![4, 6]])
        );
        assert_eq!(grid.slice(&[Op::Index(1)]).unwrap(), Value::from(vec![4, 5, 6]));
        assert_eq!(
            grid.slice(&[Op::Index(1), Op::Index(2)]).unwrap(),
            Value::from(6)
        );
        // Out-of-range ranges select nothing, like native sequence slicing.
        assert_eq!(
            grid.slice(&[Op::Range(Range::from(5..9))]).unwrap(),
            Value::List(vec![])
        );
    }

    #[test]
    fn test_list_slice_errors() {
        let grid = grid();
        assert_eq!(
            grid.slice(&[Op::Index(2)]).unwrap_err(),
            AccessError::IndexOutOfRange {
                index: 2,
                axis: 0,
                size: 2
            }
        );
        assert_eq!(
            grid.slice(&[Op::Range(Range::full()), Op::Index(3)])
                .unwrap_err(),
            AccessError::IndexOutOfRange {
                index: 3,
                axis: 1,
                size: 3
            }
        );
        assert_eq!(
            grid.slice(&[Op::Index(0), Op::Index(0), Op::Index(0)])
                .unwrap_err(),
            AccessError::NoSuchAxis {
                kind: Kind::Scalar,
                axis: 2
            }
        );
    }

    #[test]
    fn test_list_axis_labels() {
        let value = Value::from(vec![Value::from("a"), Value::from(1.5), Value::from(3)]);
        assert_eq!(
            value.axis_labels(0),
            vec![(0, Label::from("a")), (2, Label::from(3))]
        );
        assert!(value.axis_labels(1).is_empty());
        assert!(value.default_aliases().is_empty());
    }

    #[test]
    fn test_map_slice() {
        let map = map();
        assert_eq!(map.shape(), vec![2, 3]);
        assert_eq!(map.kind(), Kind::Map);

        let mut expected = IndexMap::new();
        expected.insert("x".to_string(), Value::from(vec![1, 2]));
        expected.insert("y".to_string(), Value::from(vec![4, 5]));
        assert_eq!(
            map.slice(&[Op::Range(Range::full()), Op::Range(Range::from(0..2))])
                .unwrap(),
            Value::Map(expected)
        );

        assert_eq!(map.slice(&[Op::Index(1)]).unwrap(), Value::from(vec![4, 5, 6]));
        assert_eq!(
            map.slice(&[Op::Index(1), Op::Index(0)]).unwrap(),
            Value::from(4)
        );
        assert!(matches!(
            map.slice(&[Op::Index(2)]),
            Err(AccessError::IndexOutOfRange { index: 2, .. })
        ));
    }

    #[test]
    fn test_map_labels() {
        let map = map();
        assert_eq!(
            map.axis_labels(0),
            vec![(0, Label::from("x")), (1, Label::from("y"))]
        );
        assert_eq!(
            map.default_aliases(),
            vec![DefaultAlias::new(
                "keys",
                0,
                vec![Label::from("x"), Label::from("y")]
            )]
        );
    }
}
