//! Compilation context and compiled parameter output.
//!
//! A [`Context`] is scoped to exactly one `compile()` call. It hands out
//! sequential placeholder names as parameters render, resolves literals
//! through the active dialect, and carries a transient rendering mode.
//! Placeholder numbering is part of the observable contract: the name is
//! always the string form of `current entry count + 1`, so the render
//! traversal order is visible in the output.

use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::dialect::Dialect;
use crate::value::Value;

/// The bound-value mapping produced by compiling a query.
///
/// Entries are kept in insertion order. Positional placeholders get names
/// `"1"`, `"2"`, ... in render order; conditionals may additionally seed
/// named entries for raw-SQL fragments.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Params {
    entries: Vec<(String, Value)>,
}

impl Params {
    /// Look up a bound value by placeholder name.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v)
    }

    /// Number of bound values.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no values are bound.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }

    /// Insert an entry, replacing any existing entry with the same name.
    pub(crate) fn insert(&mut self, name: String, value: Value) {
        if let Some(entry) = self.entries.iter_mut().find(|(n, _)| *n == name) {
            entry.1 = value;
        } else {
            self.entries.push((name, value));
        }
    }
}

impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

/// Transient rendering mode, switched by query builders mid-render.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RenderMode {
    /// Columns render with their table qualifier.
    #[default]
    Standard,
    /// INSERT column lists are unqualified by SQL grammar; columns render bare.
    Insert,
}

/// Per-render scope: bound parameter values, the active dialect, and the
/// rendering mode. Never reused across compiles.
#[derive(Clone, Debug, Default)]
pub struct Context {
    params: Params,
    dialect: Dialect,
    mode: RenderMode,
}

impl Context {
    /// Create a context with the default (ANSI) dialect.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a context rendering under `dialect`.
    pub fn with_dialect(dialect: Dialect) -> Self {
        Self {
            params: Params::default(),
            dialect,
            mode: RenderMode::Standard,
        }
    }

    /// Allocate the next placeholder for `value` and return its rendered
    /// form (`:` + name). Each call allocates a fresh placeholder; repeated
    /// renders of one parameter node are not deduplicated.
    pub fn resolve_param(&mut self, value: Value) -> String {
        let name = (self.params.len() + 1).to_string();
        let rendered = format!(":{name}");
        self.params.insert(name, value);
        rendered
    }

    /// Render `value` as an inline SQL literal. Pure: no placeholder is
    /// allocated.
    pub fn resolve_literal(&self, value: &Value) -> String {
        match value {
            Value::Text(text) => {
                let delim = self.dialect.string_delimiter();
                let doubled: String = delim.to_string().repeat(2);
                let escaped = text.replace(delim, &doubled);
                format!("{delim}{escaped}{delim}")
            }
            other => other.plain(),
        }
    }

    /// Pre-seed a named placeholder value (raw-SQL fragments reference these
    /// by their own placeholder syntax).
    pub(crate) fn seed(&mut self, name: String, value: Value) {
        self.params.insert(name, value);
    }

    /// The active dialect.
    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    /// The current rendering mode.
    pub(crate) fn mode(&self) -> RenderMode {
        self.mode
    }

    /// Switch the rendering mode for the rest of this render pass.
    pub(crate) fn set_mode(&mut self, mode: RenderMode) {
        self.mode = mode;
    }

    /// Consume the context, yielding the bound-value mapping.
    pub fn into_params(self) -> Params {
        self.params
    }
}
