//! Dialect-specific rendering rules.
//!
//! A [`Dialect`] carries the two knobs that differ between SQL engines at
//! this layer: the string literal delimiter and a table of operator-template
//! overrides, consulted by composite terms at render time. Lookup is an
//! exact-string match on the canonical template, not a pattern match.

use std::collections::HashMap;

/// Rendering overrides for one SQL dialect.
#[derive(Clone, Debug)]
pub struct Dialect {
    string_delimiter: char,
    operators: HashMap<String, String>,
}

impl Dialect {
    /// The generic ANSI dialect: `'` string delimiter, no operator overrides.
    pub fn ansi() -> Self {
        Self {
            string_delimiter: '\'',
            operators: HashMap::new(),
        }
    }

    /// The SQLite dialect: spells not-equal as `!=`.
    pub fn sqlite() -> Self {
        Self::ansi().with_operator("{} <> {}", "{} != {}")
    }

    /// Override one operator template. `from` must match the canonical
    /// template exactly (e.g. `"{} <> {}"`).
    pub fn with_operator(mut self, from: impl Into<String>, to: impl Into<String>) -> Self {
        self.operators.insert(from.into(), to.into());
        self
    }

    /// Replace the string literal delimiter.
    pub fn with_string_delimiter(mut self, delimiter: char) -> Self {
        self.string_delimiter = delimiter;
        self
    }

    /// The delimiter wrapped around string literals.
    pub fn string_delimiter(&self) -> char {
        self.string_delimiter
    }

    /// Resolve a composite template against the override table.
    pub fn operator_template<'a>(&'a self, template: &'a str) -> &'a str {
        self.operators
            .get(template)
            .map(String::as_str)
            .unwrap_or(template)
    }
}

impl Default for Dialect {
    fn default() -> Self {
        Self::ansi()
    }
}
