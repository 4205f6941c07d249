//! The label lookup built from alias entries.

use std::collections::BTreeMap;
use std::collections::HashMap;

use crate::entry::Tracked;
use crate::index::IndexError;
use crate::value::Label;
use crate::value::Sliceable;

/// Where a label points: a position along a global axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Binding {
    pub axis: usize,
    pub position: usize,
}

/// Maps labels exposed by alias entries to the global positions they
/// denote.
///
/// Every binding is reference counted: two aliases registering the same
/// label at the same place do not conflict, and removing one of them
/// leaves the binding in place for the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AliasLookup {
    bindings: HashMap<Label, BTreeMap<Binding, usize>>,
}

impl AliasLookup {
    /// Build a lookup from scratch.
    pub fn new<'a, I>(aliases: I) -> Self
    where
        I: IntoIterator<Item = &'a Tracked>,
    {
        let mut lookup = Self::default();
        for alias in aliases {
            lookup.insert(alias);
        }
        lookup
    }

    /// Register every label `alias` exposes.
    pub fn insert(&mut self, alias: &Tracked) {
        for (label, binding) in exposures(alias) {
            *self
                .bindings
                .entry(label)
                .or_default()
                .entry(binding)
                .or_default() += 1;
        }
    }

    /// Withdraw every label `alias` exposes.
    pub fn remove(&mut self, alias: &Tracked) {
        for (label, binding) in exposures(alias) {
            let Some(bindings) = self.bindings.get_mut(&label) else {
                continue;
            };
            if let Some(count) = bindings.get_mut(&binding) {
                *count -= 1;
                if *count == 0 {
                    bindings.remove(&binding);
                }
            }
            if bindings.is_empty() {
                self.bindings.remove(&label);
            }
        }
    }

    /// Resolve `label` to its single binding.
    pub fn resolve(&self, label: &Label) -> Result<Binding, IndexError> {
        let bindings = self
            .bindings
            .get(label)
            .filter(|bindings| !bindings.is_empty())
            .ok_or_else(|| IndexError::UnknownLabel {
                label: label.clone(),
            })?;
        match bindings.keys().collect::<Vec<_>>().as_slice() {
            [binding] => Ok(**binding),
            candidates => Err(IndexError::AmbiguousLabel {
                label: label.clone(),
                candidates: candidates
                    .iter()
                    .map(|binding| (binding.axis, binding.position))
                    .collect(),
            }),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }

    /// The number of distinct labels registered.
    pub fn len(&self) -> usize {
        self.bindings.len()
    }
}

// An alias exposes, for each of its local axes, the labels its value
// carries along that axis, placed at the global axis it occupies.
fn exposures(alias: &Tracked) -> Vec<(Label, Binding)> {
    alias
        .axes()
        .iter()
        .enumerate()
        .flat_map(|(local, &axis)| {
            alias
                .value()
                .axis_labels(local)
                .into_iter()
                .map(move |(position, label)| (label, Binding { axis, position }))
        })
        .collect()
}
