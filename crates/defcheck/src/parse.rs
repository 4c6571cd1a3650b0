//! Definition parsing: Ruby source text → `MethodDef`.
//!
//! The heavy lifting belongs to prism, the Ruby parser. This module closes a
//! bare definition snippet, parses it standalone, and reads the typed
//! parameter slots into the crate's own `Signature` model. Everything that
//! is not a single method definition is an `InvalidDefinition`, which
//! callers enumerating candidates (diff hunks mostly carry non-method
//! lines) treat as "skip", never as fatal.

use std::{borrow::Cow, fmt};

use ruby_prism::{ConstantId, DefNode, Node, ParametersNode};

use crate::signature::{KeywordParam, MethodDef, OptionalParam, Signature};

/// A snippet that could not be interpreted as a single method definition.
#[derive(Debug, Clone)]
pub struct InvalidDefinition {
    source: String,
    detail: Cow<'static, str>,
}

impl InvalidDefinition {
    fn new(source: &str, detail: impl Into<Cow<'static, str>>) -> Self {
        Self {
            source: source.to_owned(),
            detail: detail.into(),
        }
    }

    /// The offending source text, with the closing terminator appended.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    #[must_use]
    pub fn detail(&self) -> &str {
        &self.detail
    }
}

impl fmt::Display for InvalidDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "can't parse method definition: {}\ncode: {}", self.detail, self.source)
    }
}

impl std::error::Error for InvalidDefinition {}

/// Parses a single method definition into a `MethodDef`.
///
/// The snippet is closed with `"; end"` so the bare `def f(a, b)` head a
/// diff hunk yields parses standalone. Parenless heads (`def f a, b`) work
/// the same way; prism exposes identical parameter slots for both.
///
/// # Errors
/// `InvalidDefinition` when the snippet has parse errors or its first
/// statement is not a method definition.
pub fn parse_definition(definition: &str) -> Result<MethodDef, InvalidDefinition> {
    let code = format!("{definition}; end");
    let parsed = ruby_prism::parse(code.as_bytes());
    if parsed.errors().count() != 0 {
        return Err(InvalidDefinition::new(&code, "source contains syntax errors"));
    }
    let root = parsed.node();
    let Some(program) = root.as_program_node() else {
        return Err(InvalidDefinition::new(&code, "no program node"));
    };
    let Some(first) = program.statements().body().iter().next() else {
        return Err(InvalidDefinition::new(&code, "empty source"));
    };
    let Some(def) = first.as_def_node() else {
        return Err(InvalidDefinition::new(&code, "first statement is not a method definition"));
    };
    Ok(method_from_def(&def))
}

fn method_from_def(def: &DefNode<'_>) -> MethodDef {
    let signature = def
        .parameters()
        .map_or_else(Signature::default, |params| signature_from_params(&params));
    MethodDef::new(ident(def.name()), signature)
}

/// Reads the six parameter slots from prism's typed parameters node.
///
/// The block parameter (`&blk`) never affects argument binding and is
/// ignored. `...` forwards both positional and keyword arguments, so it
/// marks the rest and keyword-rest slots at once; `**nil` marks neither.
fn signature_from_params(params: &ParametersNode<'_>) -> Signature {
    let requireds = params.requireds().iter().map(|node| positional_name(&node)).collect();
    let optionals = params
        .optionals()
        .iter()
        .filter_map(|node| {
            let opt = node.as_optional_parameter_node()?;
            Some(OptionalParam::new(ident(opt.name()), source_text(&opt.value())))
        })
        .collect();
    let mut rest = params.rest().as_ref().and_then(rest_name);
    let posts = params.posts().iter().map(|node| positional_name(&node)).collect();
    let keywords = params.keywords().iter().filter_map(|node| keyword_param(&node)).collect();

    let mut keyword_rest = None;
    if let Some(node) = params.keyword_rest() {
        if let Some(kw_rest) = node.as_keyword_rest_parameter_node() {
            keyword_rest = Some(kw_rest.name().map_or_else(|| "**".to_owned(), ident));
        } else if node.as_forwarding_parameter_node().is_some() {
            rest.get_or_insert_with(|| "...".to_owned());
            keyword_rest = Some("...".to_owned());
        }
        // `**nil` (NoKeywordsParameterNode) declares no keyword-splat.
    }

    Signature::new(requireds, optionals, rest, posts, keywords, keyword_rest)
}

/// Required/post positional name. Destructured parameters (`def f((a, b))`)
/// keep their source text; the matcher only counts them.
fn positional_name(node: &Node<'_>) -> String {
    node.as_required_parameter_node()
        .map_or_else(|| source_text(node), |param| ident(param.name()))
}

fn rest_name(node: &Node<'_>) -> Option<String> {
    if let Some(rest) = node.as_rest_parameter_node() {
        return Some(rest.name().map_or_else(|| "*".to_owned(), ident));
    }
    if node.as_implicit_rest_node().is_some() {
        return Some("*".to_owned());
    }
    None
}

fn keyword_param(node: &Node<'_>) -> Option<KeywordParam> {
    if let Some(req) = node.as_required_keyword_parameter_node() {
        return Some(KeywordParam::required(ident(req.name())));
    }
    let opt = node.as_optional_keyword_parameter_node()?;
    Some(KeywordParam::optional(ident(opt.name()), source_text(&opt.value())))
}

fn ident(id: ConstantId<'_>) -> String {
    String::from_utf8_lossy(id.as_slice()).into_owned()
}

fn source_text(node: &Node<'_>) -> String {
    String::from_utf8_lossy(node.location().as_slice()).into_owned()
}
