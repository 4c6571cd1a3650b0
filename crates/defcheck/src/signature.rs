//! Method signature representation and call-site binding.
//!
//! This module handles Ruby method signatures across all parameter kinds:
//! required positional, optional-with-default, splat, post-splat positional,
//! keyword, required-keyword, and keyword-splat. It also implements the
//! matcher that decides whether a call's arguments can bind to a signature,
//! classifying every rejection.

use std::fmt;

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};
use strum::IntoStaticStr;

use crate::args::CallArg;

/// An optional positional parameter, e.g. `m` in `def f(m = 1)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OptionalParam {
    name: String,
    /// Default-value source text. Kept opaque; defaults are never evaluated.
    default: String,
}

impl OptionalParam {
    pub fn new(name: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            default: default.into(),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn default(&self) -> &str {
        &self.default
    }
}

/// A keyword parameter, e.g. `k` in `def f(k: 1)` or `def f(k:)`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeywordParam {
    label: String,
    /// Default-value source text; `None` marks a required keyword.
    default: Option<String>,
}

impl KeywordParam {
    /// A keyword the caller must supply (`k:` with no default).
    pub fn required(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            default: None,
        }
    }

    /// A keyword with a default value.
    pub fn optional(label: impl Into<String>, default: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            default: Some(default.into()),
        }
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn default(&self) -> Option<&str> {
        self.default.as_deref()
    }

    #[must_use]
    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }
}

/// A Ruby method signature with all parameter kinds.
///
/// Slot order matches declaration-syntax precedence:
/// requireds → optionals → rest → posts → keywords → keyword_rest.
/// Anonymous `*`/`**` record placeholder names; only slot presence matters
/// to the matcher. A `Signature` is immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Signature {
    /// Required positional parameters, e.g. `a, b` in `def f(a, b)`.
    requireds: Vec<String>,
    /// Optional positional parameters with defaults, bound after `requireds`.
    optionals: Vec<OptionalParam>,
    /// Splat parameter name, e.g. `rest` in `def f(*rest)`.
    rest: Option<String>,
    /// Required positionals declared after the splat, bound from the back.
    posts: Vec<String>,
    /// Keyword parameters, unique by label.
    keywords: Vec<KeywordParam>,
    /// Keyword-splat name, e.g. `kw` in `def f(**kw)`.
    keyword_rest: Option<String>,
}

impl Signature {
    pub fn new(
        requireds: Vec<String>,
        optionals: Vec<OptionalParam>,
        rest: Option<String>,
        posts: Vec<String>,
        keywords: Vec<KeywordParam>,
        keyword_rest: Option<String>,
    ) -> Self {
        Self {
            requireds,
            optionals,
            rest,
            posts,
            keywords,
            keyword_rest,
        }
    }

    #[must_use]
    pub fn requireds(&self) -> &[String] {
        &self.requireds
    }

    #[must_use]
    pub fn optionals(&self) -> &[OptionalParam] {
        &self.optionals
    }

    #[must_use]
    pub fn rest(&self) -> Option<&str> {
        self.rest.as_deref()
    }

    #[must_use]
    pub fn posts(&self) -> &[String] {
        &self.posts
    }

    #[must_use]
    pub fn keywords(&self) -> &[KeywordParam] {
        &self.keywords
    }

    #[must_use]
    pub fn keyword_rest(&self) -> Option<&str> {
        self.keyword_rest.as_deref()
    }

    /// Whether any keyword parameter or a keyword-splat is declared.
    #[must_use]
    pub fn has_keywords(&self) -> bool {
        !self.keywords.is_empty() || self.keyword_rest.is_some()
    }

    /// Whether at least one keyword parameter has no default.
    #[must_use]
    pub fn has_required_keywords(&self) -> bool {
        self.keywords.iter().any(KeywordParam::is_required)
    }

    /// Validates the trailing argument as the call's keyword hash, then
    /// resolves what precedes it positionally.
    fn bind_with_keyword_hash(&self, args: &[CallArg]) -> Result<(), BindFailure> {
        let Some((candidate, positional)) = args.split_last() else {
            return Err(BindFailure::KwparamRequired);
        };
        self.check_keyword_hash(candidate)?;
        self.bind_positional(positional)
    }

    /// Checks whether `arg` can serve as the keyword hash of a call.
    ///
    /// Non-literal arguments pass: their runtime shape cannot be known
    /// statically, and rejecting them would flag valid calls. Only a hash
    /// literal has its keys compared against the declared labels.
    fn check_keyword_hash(&self, arg: &CallArg) -> Result<(), BindFailure> {
        let Some(keys) = arg.hash_keys() else {
            if arg.is_literal() {
                return Err(BindFailure::KwparamShouldBeHash {
                    source: arg.source().to_owned(),
                });
            }
            return Ok(());
        };

        let received: IndexSet<&str> = keys.iter().map(String::as_str).collect();
        let missing: Vec<String> = self
            .keywords
            .iter()
            .filter(|keyword| keyword.is_required() && !received.contains(keyword.label()))
            .map(|keyword| keyword.label().to_owned())
            .collect();
        if !missing.is_empty() {
            return Err(BindFailure::KwparamNotFound { names: missing });
        }

        // A keyword-splat absorbs unrecognized keys.
        if self.keyword_rest.is_some() {
            return Ok(());
        }
        let declared: IndexSet<&str> = self.keywords.iter().map(KeywordParam::label).collect();
        let unexpected: Vec<String> = received
            .iter()
            .filter(|key| !declared.contains(*key))
            .map(|key| (*key).to_owned())
            .collect();
        if !unexpected.is_empty() {
            return Err(BindFailure::UnexpectedKwparam { names: unexpected });
        }
        Ok(())
    }

    /// Resolves remaining arguments against the optional/splat/post slots.
    fn bind_positional(&self, args: &[CallArg]) -> Result<(), BindFailure> {
        // Post-splat parameters consume from the back.
        let required = self.posts.len();
        let Some(leading) = args.len().checked_sub(required) else {
            return Err(BindFailure::InsufficientPostRestPositional {
                received: args.len(),
                required,
            });
        };
        let leading = &args[..leading];

        // A splat absorbs everything left.
        if self.rest.is_some() {
            return Ok(());
        }
        if !self.optionals.is_empty() {
            if leading.len() <= self.optionals.len() {
                return Ok(());
            }
            return Err(BindFailure::TooManyArguments);
        }
        if leading.is_empty() {
            Ok(())
        } else {
            Err(BindFailure::TooManyArguments)
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts: Vec<String> = Vec::new();
        parts.extend(self.requireds.iter().cloned());
        parts.extend(self.optionals.iter().map(|p| format!("{} = {}", p.name, p.default)));
        if let Some(rest) = &self.rest {
            parts.push(if rest == "*" { "*".to_owned() } else { format!("*{rest}") });
        }
        parts.extend(self.posts.iter().cloned());
        parts.extend(self.keywords.iter().map(|k| match &k.default {
            Some(default) => format!("{}: {default}", k.label),
            None => format!("{}:", k.label),
        }));
        if let Some(kw_rest) = &self.keyword_rest {
            parts.push(if kw_rest == "**" {
                "**".to_owned()
            } else {
                format!("**{kw_rest}")
            });
        }
        write!(f, "({})", parts.join(", "))
    }
}

/// A named method definition: identity for the matcher.
///
/// Built once per parsed definition and read-only thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MethodDef {
    name: String,
    signature: Signature,
}

impl MethodDef {
    pub fn new(name: impl Into<String>, signature: Signature) -> Self {
        Self {
            name: name.into(),
            signature,
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Decides whether a call site can bind to this definition.
    ///
    /// `args` is borrowed and never mutated; the matcher works on slices of
    /// it, so calling twice with the same inputs yields the same outcome.
    /// The decision reproduces Ruby's binding precedence:
    ///
    /// 1. The call name must match; nothing else is checked otherwise.
    /// 2. Required positional parameters consume arguments from the front.
    /// 3. With a required keyword declared, the last argument must validate
    ///    as a keyword hash. With only optional keywords declared, the
    ///    plain positional reading is tried first and the keyword-hash
    ///    reading is the fallback — such a method is also callable with no
    ///    keyword hash at all.
    /// 4. Post-splat parameters consume from the back, a splat absorbs any
    ///    remainder, and optional parameters absorb up to their count.
    #[must_use]
    pub fn callable(&self, call_name: &str, args: &[CallArg]) -> CallOutcome {
        if call_name != self.name {
            return CallOutcome::NotBindable(BindFailure::NameMismatch);
        }

        let required = self.signature.requireds.len();
        if args.len() < required {
            return CallOutcome::NotBindable(BindFailure::InsufficientPositional {
                received: args.len(),
                required,
            });
        }
        let trailing = &args[required..];

        let resolved = if self.signature.has_required_keywords() {
            self.signature.bind_with_keyword_hash(trailing)
        } else if self.signature.has_keywords() {
            self.signature
                .bind_positional(trailing)
                .or_else(|_| self.signature.bind_with_keyword_hash(trailing))
        } else {
            self.signature.bind_positional(trailing)
        };

        match resolved {
            Ok(()) => CallOutcome::Bindable,
            Err(failure) => CallOutcome::NotBindable(failure),
        }
    }
}

impl fmt::Display for MethodDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "def {}{}", self.name, self.signature)
    }
}

/// Result of matching a call site against a definition.
///
/// Non-bindability is an expected, frequent outcome, so it is a value here,
/// never an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallOutcome {
    Bindable,
    NotBindable(BindFailure),
}

impl CallOutcome {
    #[must_use]
    pub fn is_bindable(&self) -> bool {
        matches!(self, Self::Bindable)
    }

    #[must_use]
    pub fn failure(&self) -> Option<&BindFailure> {
        match self {
            Self::Bindable => None,
            Self::NotBindable(failure) => Some(failure),
        }
    }
}

/// Why a call site cannot bind to a definition.
///
/// A closed set: every rejection path maps to exactly one variant, so
/// callers can render precise diagnostics without string matching.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, IntoStaticStr)]
#[strum(serialize_all = "snake_case")]
pub enum BindFailure {
    /// The call names a different method.
    NameMismatch,
    /// Fewer positional arguments than required parameters.
    InsufficientPositional { received: usize, required: usize },
    /// Fewer trailing arguments than post-splat parameters.
    InsufficientPostRestPositional { received: usize, required: usize },
    TooManyArguments,
    /// The definition requires keywords but the call supplies no argument
    /// that could carry them.
    KwparamRequired,
    /// The trailing argument is a literal that cannot be a keyword hash.
    KwparamShouldBeHash { source: String },
    /// Required keyword labels missing from the supplied hash.
    KwparamNotFound { names: Vec<String> },
    /// Hash keys that match no declared keyword parameter.
    UnexpectedKwparam { names: Vec<String> },
}

impl BindFailure {
    /// Stable snake_case tag for compact machine-readable output.
    #[must_use]
    pub fn tag(&self) -> &'static str {
        self.into()
    }
}

impl fmt::Display for BindFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NameMismatch => write!(f, "method name does not match"),
            Self::InsufficientPositional { received, required } => {
                write!(f, "wrong number of arguments (given {received}, expected at least {required})")
            }
            Self::InsufficientPostRestPositional { received, required } => {
                write!(
                    f,
                    "wrong number of trailing arguments (given {received}, expected {required})"
                )
            }
            // TODO: thread the received/allowed counts through the matcher
            // so this message can include them.
            Self::TooManyArguments => write!(f, "too many arguments"),
            Self::KwparamRequired => write!(f, "missing required keyword arguments"),
            Self::KwparamShouldBeHash { source } => {
                write!(f, "`{source}` cannot be passed as keyword arguments")
            }
            Self::KwparamNotFound { names } => write!(f, "missing keywords: {}", names.join(", ")),
            Self::UnexpectedKwparam { names } => write!(f, "unknown keywords: {}", names.join(", ")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required(names: &[&str]) -> Vec<String> {
        names.iter().map(|&n| n.to_owned()).collect()
    }

    fn plain(name: &str, requireds: &[&str]) -> MethodDef {
        MethodDef::new(
            name,
            Signature::new(required(requireds), vec![], None, vec![], vec![], None),
        )
    }

    fn literals(count: usize) -> Vec<CallArg> {
        (0..count).map(|i| CallArg::literal(i.to_string())).collect()
    }

    #[test]
    fn name_mismatch_short_circuits() {
        let def = plain("f", &["a", "b"]);
        for count in 0..4 {
            let outcome = def.callable("g", &literals(count));
            assert_eq!(outcome, CallOutcome::NotBindable(BindFailure::NameMismatch));
        }
    }

    #[test]
    fn exact_required_count() {
        let def = plain("f", &["a", "b"]);
        assert!(def.callable("f", &literals(2)).is_bindable());
        assert_eq!(
            def.callable("f", &literals(1)),
            CallOutcome::NotBindable(BindFailure::InsufficientPositional {
                received: 1,
                required: 2
            })
        );
        assert_eq!(
            def.callable("f", &literals(3)),
            CallOutcome::NotBindable(BindFailure::TooManyArguments)
        );
    }

    #[test]
    fn splat_absorbs_everything_past_posts() {
        // def f(a, m = 1, *r, z)
        let def = MethodDef::new(
            "f",
            Signature::new(
                required(&["a"]),
                vec![OptionalParam::new("m", "1")],
                Some("r".to_owned()),
                required(&["z"]),
                vec![],
                None,
            ),
        );
        assert_eq!(
            def.callable("f", &literals(1)),
            CallOutcome::NotBindable(BindFailure::InsufficientPostRestPositional {
                received: 0,
                required: 1
            })
        );
        for count in 2..8 {
            assert!(def.callable("f", &literals(count)).is_bindable(), "count {count}");
        }
    }

    #[test]
    fn optionals_absorb_up_to_their_count() {
        // def f(m = 1, n = 1)
        let def = MethodDef::new(
            "f",
            Signature::new(
                vec![],
                vec![OptionalParam::new("m", "1"), OptionalParam::new("n", "1")],
                None,
                vec![],
                vec![],
                None,
            ),
        );
        for count in 0..=2 {
            assert!(def.callable("f", &literals(count)).is_bindable(), "count {count}");
        }
        assert_eq!(
            def.callable("f", &literals(3)),
            CallOutcome::NotBindable(BindFailure::TooManyArguments)
        );
    }

    #[test]
    fn required_keyword_must_appear_in_hash() {
        // def f(k:)
        let def = MethodDef::new(
            "f",
            Signature::new(vec![], vec![], None, vec![], vec![KeywordParam::required("k")], None),
        );
        assert_eq!(
            def.callable("f", &[CallArg::hash("{other: 1}", ["other"])]),
            CallOutcome::NotBindable(BindFailure::KwparamNotFound {
                names: vec!["k".to_owned()]
            })
        );
        assert!(def.callable("f", &[CallArg::hash("{k: 1}", ["k"])]).is_bindable());
    }

    #[test]
    fn required_keyword_with_no_argument_at_all() {
        let def = MethodDef::new(
            "f",
            Signature::new(vec![], vec![], None, vec![], vec![KeywordParam::required("k")], None),
        );
        assert_eq!(
            def.callable("f", &[]),
            CallOutcome::NotBindable(BindFailure::KwparamRequired)
        );
    }

    #[test]
    fn required_keyword_rejects_non_hash_literal() {
        let def = MethodDef::new(
            "f",
            Signature::new(vec![], vec![], None, vec![], vec![KeywordParam::required("k")], None),
        );
        assert_eq!(
            def.callable("f", &[CallArg::literal("1")]),
            CallOutcome::NotBindable(BindFailure::KwparamShouldBeHash {
                source: "1".to_owned()
            })
        );
    }

    #[test]
    fn required_keyword_trusts_opaque_argument() {
        // A variable may hold a hash carrying `k`; the matcher cannot tell,
        // so it does not reject.
        let def = MethodDef::new(
            "f",
            Signature::new(vec![], vec![], None, vec![], vec![KeywordParam::required("k")], None),
        );
        assert!(def.callable("f", &[CallArg::opaque("opts")]).is_bindable());
    }

    #[test]
    fn optional_keyword_is_callable_without_hash() {
        // def f(opt: 1)
        let def = MethodDef::new(
            "f",
            Signature::new(
                vec![],
                vec![],
                None,
                vec![],
                vec![KeywordParam::optional("opt", "1")],
                None,
            ),
        );
        assert!(def.callable("f", &[]).is_bindable());
        assert!(def.callable("f", &[CallArg::hash("{opt: 1}", ["opt"])]).is_bindable());
        assert!(def.callable("f", &[CallArg::opaque("options")]).is_bindable());
    }

    #[test]
    fn optional_keyword_rejects_unknown_labels() {
        let def = MethodDef::new(
            "f",
            Signature::new(
                vec![],
                vec![],
                None,
                vec![],
                vec![KeywordParam::optional("opt", "1")],
                None,
            ),
        );
        assert_eq!(
            def.callable("f", &[CallArg::hash("{nope: 1}", ["nope"])]),
            CallOutcome::NotBindable(BindFailure::UnexpectedKwparam {
                names: vec!["nope".to_owned()]
            })
        );
    }

    #[test]
    fn keyword_rest_accepts_any_label() {
        // def f(k: 1, **rest)
        let def = MethodDef::new(
            "f",
            Signature::new(
                vec![],
                vec![],
                None,
                vec![],
                vec![KeywordParam::optional("k", "1")],
                Some("rest".to_owned()),
            ),
        );
        assert!(
            def.callable("f", &[CallArg::hash("{a: 1, b: 2, c: 3}", ["a", "b", "c"])])
                .is_bindable()
        );
    }

    #[test]
    fn callable_never_mutates_its_arguments() {
        let def = plain("f", &["a"]);
        let args = vec![CallArg::literal("1"), CallArg::literal("2")];
        let before = args.clone();
        let first = def.callable("f", &args);
        let second = def.callable("f", &args);
        assert_eq!(first, second);
        assert_eq!(args, before);
    }

    #[test]
    fn failure_tags_are_stable() {
        assert_eq!(BindFailure::NameMismatch.tag(), "name_mismatch");
        assert_eq!(BindFailure::TooManyArguments.tag(), "too_many_arguments");
        assert_eq!(
            BindFailure::UnexpectedKwparam { names: vec![] }.tag(),
            "unexpected_kwparam"
        );
    }

    #[test]
    fn signature_renders_back_to_source_shape() {
        let def = MethodDef::new(
            "f",
            Signature::new(
                required(&["a"]),
                vec![OptionalParam::new("m", "1")],
                Some("r".to_owned()),
                required(&["z"]),
                vec![KeywordParam::required("k"), KeywordParam::optional("o", "2")],
                Some("kw".to_owned()),
            ),
        );
        assert_eq!(def.to_string(), "def f(a, m = 1, *r, z, k:, o: 2, **kw)");
    }
}
