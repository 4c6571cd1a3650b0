//! Call-site argument descriptors.
//!
//! The binding matcher never looks at argument *values*: the only facts it
//! needs are whether an argument is a hash literal (and which symbol keys it
//! spells out), whether it is some other literal, and its source text for
//! diagnostics. `CallArg` captures exactly that, so the matcher stays
//! independent of the parser's borrowed tree.

use ruby_prism::Node;
use serde::{Deserialize, Serialize};

/// Shape classification for one supplied argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
enum ArgShape {
    /// A hash or keyword-hash literal with the symbol keys it spells out.
    ///
    /// Non-symbol keys (`"a" => 1`) and `**splat` entries contribute no
    /// label; keyword matching cannot see them.
    Hash { keys: Vec<String> },
    /// Some other literal value: integer, string, symbol, array, range, ...
    Literal,
    /// A statically-unknowable expression: method call, variable, splat.
    Opaque,
}

/// One argument at a call site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallArg {
    source: String,
    shape: ArgShape,
}

impl CallArg {
    /// A hash-literal argument carrying the given symbol keys.
    pub fn hash(source: impl Into<String>, keys: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self {
            source: source.into(),
            shape: ArgShape::Hash {
                keys: keys.into_iter().map(Into::into).collect(),
            },
        }
    }

    /// A non-hash literal argument.
    pub fn literal(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            shape: ArgShape::Literal,
        }
    }

    /// An argument whose runtime shape cannot be determined statically.
    pub fn opaque(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            shape: ArgShape::Opaque,
        }
    }

    /// Classifies a prism argument node.
    #[must_use]
    pub fn from_node(node: &Node<'_>) -> Self {
        let source = String::from_utf8_lossy(node.location().as_slice()).into_owned();
        if let Some(hash) = node.as_hash_node() {
            return Self {
                source,
                shape: ArgShape::Hash {
                    keys: symbol_keys(hash.elements()),
                },
            };
        }
        if let Some(hash) = node.as_keyword_hash_node() {
            return Self {
                source,
                shape: ArgShape::Hash {
                    keys: symbol_keys(hash.elements()),
                },
            };
        }
        if is_plain_literal(node) {
            return Self {
                source,
                shape: ArgShape::Literal,
            };
        }
        Self {
            source,
            shape: ArgShape::Opaque,
        }
    }

    /// Whether this argument is syntactically a hash literal.
    #[must_use]
    pub fn is_hash_literal(&self) -> bool {
        matches!(self.shape, ArgShape::Hash { .. })
    }

    /// Whether this argument is some literal value (hash literals included).
    #[must_use]
    pub fn is_literal(&self) -> bool {
        !matches!(self.shape, ArgShape::Opaque)
    }

    /// The symbol keys of a hash-literal argument, `None` otherwise.
    #[must_use]
    pub fn hash_keys(&self) -> Option<&[String]> {
        match &self.shape {
            ArgShape::Hash { keys } => Some(keys),
            _ => None,
        }
    }

    /// The argument's source text, used in diagnostics.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }
}

/// Collects the symbol keys of a hash's assoc elements.
fn symbol_keys(elements: ruby_prism::NodeList<'_>) -> Vec<String> {
    elements
        .iter()
        .filter_map(|element| {
            let assoc = element.as_assoc_node()?;
            let key = assoc.key().as_symbol_node()?;
            Some(String::from_utf8_lossy(key.unescaped()).into_owned())
        })
        .collect()
}

/// Literal nodes other than hashes. Interpolated strings are excluded: their
/// final value depends on runtime state.
fn is_plain_literal(node: &Node<'_>) -> bool {
    node.as_integer_node().is_some()
        || node.as_float_node().is_some()
        || node.as_rational_node().is_some()
        || node.as_imaginary_node().is_some()
        || node.as_string_node().is_some()
        || node.as_symbol_node().is_some()
        || node.as_array_node().is_some()
        || node.as_range_node().is_some()
        || node.as_regular_expression_node().is_some()
        || node.as_true_node().is_some()
        || node.as_false_node().is_some()
        || node.as_nil_node().is_some()
}
