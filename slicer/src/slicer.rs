//! The slicing facade.

use std::fmt;

use indexmap::IndexMap;
use itertools::Itertools;

use crate::axes::Axes;
use crate::axes::AxesError;
use crate::config;
use crate::config::Config;
use crate::entry::Assignment;
use crate::entry::Dim;
use crate::entry::Entry;
use crate::entry::Tracked;
use crate::index::IndexError;
use crate::index::IndexExpr;
use crate::lookup::AliasLookup;
use crate::shape::Shape;
use crate::value::AccessError;
use crate::value::Kind;
use crate::value::Label;
use crate::value::Sliceable;
use crate::value::Value;

/// The reserved name of the anonymous slot.
pub const ANONYMOUS: &str = "o";

/// The reserved, read-only name of the derived shape.
pub const SHAPE: &str = "shape";

#[derive(Debug, thiserror::Error)]
pub enum SlicerError {
    #[error(transparent)]
    Index(#[from] IndexError),

    #[error(transparent)]
    Access(#[from] AccessError),

    #[error(transparent)]
    Axes(#[from] AxesError),

    #[error("dim entries cannot be anonymous")]
    AnonymousDim,

    #[error("alias entries cannot be anonymous")]
    AnonymousAlias,

    #[error("`shape` is derived and cannot be assigned or removed")]
    ReadOnlyShape,

    #[error("no entry named `{name}`")]
    UnknownEntry { name: String },

    #[error("`{name}` is a dim entry and needs a sequence of labels, got a {kind}")]
    NotLabels { name: String, kind: Kind },
}

/// A read of a name through [`Slicer::attr`].
#[derive(Debug, Clone, PartialEq)]
pub enum Attr<'a> {
    /// The anonymous slot, as returned by [`Slicer::o`].
    Anonymous(Value),
    Shape(&'a Shape),
    /// A plain or alias entry's value.
    Value(&'a Value),
    /// A dim entry's labels.
    Labels(&'a [Label]),
}

/// Unified slicing over a set of tracked values.
///
/// A slicer tracks anonymous values, and named plain values, aliases and
/// dims, each aligned to some of the axes of one global axis space.
/// [`Slicer::slice`] applies a single index expression to all of them at
/// once and returns a new slicer over the results.
///
/// ```
/// use slicer::idx;
/// use slicer::Value;
///
/// let s = slicer::slicer![vec![vec![1, 2, 3], vec![4, 5, 6]]].unwrap();
/// assert_eq!(s.shape().to_string(), "(2, 3)");
///
/// let sliced = s.slice(idx![.., 0..2]).unwrap();
/// assert_eq!(sliced.o(), Value::from(vec![vec![1, 2], vec![4, 5]]));
/// ```
#[derive(Debug, Clone)]
pub struct Slicer {
    config: Config,
    max_dim: usize,
    shape: Shape,
    anonymous: Vec<Tracked>,
    objects: IndexMap<String, Tracked>,
    aliases: IndexMap<String, Tracked>,
    dims: IndexMap<String, Dim>,
    lookup: AliasLookup,
}

const _: () = {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Slicer>();
};

impl Default for Slicer {
    fn default() -> Self {
        Self::empty(config::global::get())
    }
}

impl Slicer {
    /// Track `anonymous` values on their leading axes, then install each
    /// of `named` in order. Uses the global configuration.
    pub fn new<A, N, K, V>(anonymous: A, named: N) -> Result<Self, SlicerError>
    where
        A: IntoIterator,
        A::Item: Into<Assignment>,
        N: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Assignment>,
    {
        Self::with_config(config::global::get(), anonymous, named)
    }

    pub fn with_config<A, N, K, V>(
        config: Config,
        anonymous: A,
        named: N,
    ) -> Result<Self, SlicerError>
    where
        A: IntoIterator,
        A::Item: Into<Assignment>,
        N: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<Assignment>,
    {
        let mut slicer = Self::empty(config);
        slicer.set_anonymous(anonymous)?;
        for (name, assignment) in named {
            let name: String = name.into();
            slicer.set(&name, assignment)?;
        }
        slicer.generate_default_aliases();
        Ok(slicer)
    }

    fn empty(config: Config) -> Self {
        Self {
            config,
            max_dim: 0,
            shape: Shape::default(),
            anonymous: Vec::new(),
            objects: IndexMap::new(),
            aliases: IndexMap::new(),
            dims: IndexMap::new(),
            lookup: AliasLookup::default(),
        }
    }

    /// Assign `name`.
    ///
    /// Assigning [`ANONYMOUS`] replaces the anonymous values with this
    /// single one; [`Slicer::set_anonymous`] spreads a sequence into
    /// several. A bare value assigned to a name already in use keeps that
    /// entry's kind and axes. Whatever held the name before is retracted,
    /// after the assignment has been validated.
    pub fn set(&mut self, name: &str, assignment: impl Into<Assignment>) -> Result<(), SlicerError> {
        let assignment = assignment.into();
        match name {
            SHAPE => Err(SlicerError::ReadOnlyShape),
            ANONYMOUS => self.set_anonymous([assignment]),
            _ => {
                let entry = self.retype(name, assignment)?;
                let replaced = self.clear_entry(name);
                let (axes, local) = (entry.axes().clone(), entry.local_shape());
                self.install(name.to_string(), entry);
                if replaced {
                    self.recompute();
                } else {
                    self.merge_stats(&axes, &local);
                }
                Ok(())
            }
        }
    }

    /// Append an anonymous value.
    pub fn push_anonymous(&mut self, assignment: impl Into<Assignment>) -> Result<(), SlicerError> {
        let tracked = anonymous_tracked(assignment.into())?;
        self.merge_stats(tracked.axes(), &tracked.local_shape());
        self.anonymous.push(tracked);
        Ok(())
    }

    /// Replace all anonymous values.
    pub fn set_anonymous<I>(&mut self, assignments: I) -> Result<(), SlicerError>
    where
        I: IntoIterator,
        I::Item: Into<Assignment>,
    {
        self.anonymous = assignments
            .into_iter()
            .map(|assignment| anonymous_tracked(assignment.into()))
            .collect::<Result<_, _>>()?;
        self.recompute();
        Ok(())
    }

    /// Retract `name`. [`ANONYMOUS`] clears the anonymous values.
    pub fn remove(&mut self, name: &str) -> Result<(), SlicerError> {
        match name {
            SHAPE => return Err(SlicerError::ReadOnlyShape),
            ANONYMOUS => self.anonymous.clear(),
            _ if !self.clear_entry(name) => {
                return Err(SlicerError::UnknownEntry {
                    name: name.to_string(),
                })
            }
            _ => (),
        }
        self.recompute();
        self.lookup = AliasLookup::new(self.aliases.values());
        Ok(())
    }

    /// Slice every entry with `expr` and return a facade over the results.
    ///
    /// The new facade has as many axes as the expression retains. Nothing
    /// is returned unless every entry slices successfully, and `self` is
    /// never modified.
    pub fn slice(&self, expr: impl Into<IndexExpr>) -> Result<Self, SlicerError> {
        let expr = expr.into();
        let ops = expr.normalize(self.max_dim, &self.lookup)?;
        tracing::debug!("normalized {} to ({})", expr, ops.iter().join(", "));

        let slice_named = |entries: &IndexMap<String, Tracked>| {
            entries
                .iter()
                .map(|(name, tracked)| Ok((name.clone(), tracked.slice(&ops)?)))
                .collect::<Result<IndexMap<_, _>, AccessError>>()
        };
        let mut sliced = Self {
            anonymous: self
                .anonymous
                .iter()
                .map(|tracked| tracked.slice(&ops))
                .collect::<Result<_, _>>()?,
            objects: slice_named(&self.objects)?,
            aliases: slice_named(&self.aliases)?,
            dims: self
                .dims
                .iter()
                .map(|(name, dim)| (name.clone(), dim.slice(&ops)))
                .collect(),
            ..Self::empty(self.config.clone())
        };
        sliced.lookup = AliasLookup::new(sliced.aliases.values());
        sliced.recompute();
        let retained = ops.iter().filter(|op| !op.is_index()).count();
        sliced.max_dim = sliced.max_dim.max(retained);
        sliced.shape.grow(sliced.max_dim);
        sliced.generate_default_aliases();
        Ok(sliced)
    }

    /// The anonymous value if there is exactly one, otherwise a list of
    /// all of them.
    pub fn o(&self) -> Value {
        match self.anonymous.as_slice() {
            [only] => only.value().clone(),
            all => Value::List(all.iter().map(|tracked| tracked.value().clone()).collect()),
        }
    }

    /// The value of a named plain or alias entry.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.objects
            .get(name)
            .or_else(|| self.aliases.get(name))
            .map(Tracked::value)
    }

    /// The labels of a named dim entry.
    pub fn labels(&self, name: &str) -> Option<&[Label]> {
        self.dims.get(name).map(Dim::labels)
    }

    /// Read any name, including the reserved ones.
    pub fn attr(&self, name: &str) -> Result<Attr<'_>, SlicerError> {
        match name {
            ANONYMOUS => Ok(Attr::Anonymous(self.o())),
            SHAPE => Ok(Attr::Shape(&self.shape)),
            _ => self
                .get(name)
                .map(Attr::Value)
                .or_else(|| self.labels(name).map(Attr::Labels))
                .ok_or_else(|| SlicerError::UnknownEntry {
                    name: name.to_string(),
                }),
        }
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The number of global axes.
    pub fn max_dim(&self) -> usize {
        self.max_dim
    }

    pub fn entry(&self, name: &str) -> Option<Entry> {
        if let Some(tracked) = self.objects.get(name) {
            return Some(Entry::Obj(tracked.clone()));
        }
        if let Some(tracked) = self.aliases.get(name) {
            return Some(Entry::Alias(tracked.clone()));
        }
        self.dims.get(name).cloned().map(Entry::Dim)
    }

    pub fn anonymous(&self) -> &[Tracked] {
        &self.anonymous
    }

    /// All names in use: plain values, then aliases, then dims, each in
    /// insertion order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.objects
            .keys()
            .chain(self.aliases.keys())
            .chain(self.dims.keys())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.objects.contains_key(name)
            || self.aliases.contains_key(name)
            || self.dims.contains_key(name)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    fn retype(&self, name: &str, assignment: Assignment) -> Result<Entry, SlicerError> {
        let value = match assignment {
            Assignment::Entry(entry) => return Ok(entry),
            Assignment::Bare(value) => value,
        };
        if let Some(old) = self.objects.get(name) {
            return Ok(Entry::Obj(Tracked::with_axes(value, old.axes().clone())));
        }
        if let Some(old) = self.aliases.get(name) {
            return Ok(Entry::Alias(Tracked::with_axes(value, old.axes().clone())));
        }
        if let Some(old) = self.dims.get(name) {
            let labels = value.labels().ok_or_else(|| SlicerError::NotLabels {
                name: name.to_string(),
                kind: value.kind(),
            })?;
            return Ok(Entry::Dim(old.relabel(labels)));
        }
        Ok(Entry::Obj(Tracked::new(value)))
    }

    // Retract whatever holds `name`, returning whether anything did.
    fn clear_entry(&mut self, name: &str) -> bool {
        if self.objects.shift_remove(name).is_some() {
            return true;
        }
        if let Some(alias) = self.aliases.shift_remove(name) {
            self.lookup.remove(&alias);
            return true;
        }
        self.dims.shift_remove(name).is_some()
    }

    fn install(&mut self, name: String, entry: Entry) {
        tracing::trace!("installing {} `{}` on axes {}", entry.kind(), name, entry.axes());
        match entry {
            Entry::Obj(tracked) => {
                self.objects.insert(name, tracked);
            }
            Entry::Alias(tracked) => {
                self.lookup.insert(&tracked);
                self.aliases.insert(name, tracked);
            }
            Entry::Dim(dim) => {
                self.dims.insert(name, dim);
            }
        }
    }

    fn merge_stats(&mut self, axes: &Axes, local: &[usize]) {
        self.max_dim = self.max_dim.max(axes.extent());
        self.shape.grow(self.max_dim);
        self.shape.merge(axes, local);
    }

    fn recompute(&mut self) {
        let contributions: Vec<(Axes, Vec<usize>)> = self
            .anonymous
            .iter()
            .chain(self.objects.values())
            .chain(self.aliases.values())
            .map(|tracked| (tracked.axes().clone(), tracked.local_shape()))
            .chain(
                self.dims
                    .values()
                    .map(|dim| (dim.axes().clone(), Vec::new())),
            )
            .collect();
        self.max_dim = contributions
            .iter()
            .map(|(axes, _)| axes.extent())
            .max()
            .unwrap_or(0);
        self.shape = Shape::unresolved(self.max_dim);
        for (axes, local) in &contributions {
            self.shape.merge(axes, local);
        }
        tracing::trace!(
            "recomputed stats over {} entries: shape {}",
            contributions.len(),
            self.shape
        );
    }

    // With a single tracked value and no aliases, register the aliases
    // that value proposes for its own axes.
    fn generate_default_aliases(&mut self) {
        if !self.config.default_aliases || !self.aliases.is_empty() {
            return;
        }
        let only = match (self.anonymous.as_slice(), self.objects.len()) {
            ([only], 0) => only.clone(),
            ([], 1) => match self.objects.first() {
                Some((_, only)) => only.clone(),
                None => return,
            },
            _ => return,
        };
        for alias in only.value().default_aliases() {
            let Some(&axis) = only.axes().get(alias.axis) else {
                continue;
            };
            if self.contains(&alias.name) || alias.name == ANONYMOUS || alias.name == SHAPE {
                tracing::debug!("skipping default alias `{}`: name in use", alias.name);
                continue;
            }
            let entry = Entry::alias(Value::from_labels(alias.labels), Axes::single(axis));
            let (axes, local) = (entry.axes().clone(), entry.local_shape());
            self.install(alias.name, entry);
            self.merge_stats(&axes, &local);
        }
    }
}

fn anonymous_tracked(assignment: Assignment) -> Result<Tracked, SlicerError> {
    match assignment {
        Assignment::Bare(value) => Ok(Tracked::new(value)),
        Assignment::Entry(Entry::Obj(tracked)) => Ok(tracked),
        Assignment::Entry(Entry::Alias(_)) => Err(SlicerError::AnonymousAlias),
        Assignment::Entry(Entry::Dim(_)) => Err(SlicerError::AnonymousDim),
    }
}

impl fmt::Display for Slicer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut fields = Vec::new();
        if !self.anonymous.is_empty() {
            fields.push(format!("{}={}", ANONYMOUS, self.o()));
        }
        for (name, tracked) in self.objects.iter().chain(&self.aliases) {
            fields.push(format!("{}={}", name, tracked.value()));
        }
        for (name, dim) in &self.dims {
            fields.push(format!("{}=[{}]", name, dim.labels().iter().join(", ")));
        }
        write!(f, "Slicer{{{}}}", fields.join(", "))
    }
}

/// Construct a [`Slicer`] from anonymous values, optionally followed by
/// `;` and named assignments. Evaluates to `Result<Slicer, SlicerError>`.
///
/// ```
/// use slicer::entry::Entry;
/// use slicer::Label;
///
/// let s = slicer::slicer![
///     vec![vec![1, 2, 3], vec![4, 5, 6]];
///     cols = Entry::dim(vec![Label::from("x"), Label::from("y"), Label::from("z")], 1),
/// ]
/// .unwrap();
/// assert_eq!(s.max_dim(), 2);
/// ```
#[macro_export]
macro_rules! slicer {
    ( $( $anon:expr ),* ; $( $name:ident = $value:expr ),* $(,)? ) => {{
        let anonymous: ::std::vec::Vec<$crate::entry::Assignment> =
            ::std::vec![ $( $crate::entry::Assignment::from($anon) ),* ];
        let named: ::std::vec::Vec<(&str, $crate::entry::Assignment)> = ::std::vec![
            $( (::std::stringify!($name), $crate::entry::Assignment::from($value)) ),*
        ];
        $crate::Slicer::new(anonymous, named)
    }};
    ( $( $anon:expr ),* $(,)? ) => {
        $crate::slicer!( $( $anon ),* ; )
    };
}
