//! Call-site enumeration and compatibility checking.
//!
//! `call_sites` walks a parsed source tree through an explicit node ladder:
//! statement containers (program, def, class, module, begin, if, unless,
//! while, until, case/when, else, block, lambda, parentheses), assignment
//! values, boolean operators, array/hash elements, splats, return and yield
//! arguments, and calls themselves (receiver, arguments, block). Nodes
//! outside the ladder are not descended into.

use std::fmt;

use ruby_prism::Node;
use serde::{Deserialize, Serialize};

use crate::{
    args::CallArg,
    diff::ChangedMethod,
    signature::{BindFailure, CallOutcome},
};

/// One observed method call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallSite {
    /// The callee name (`foo` in `obj.foo(1)`).
    pub name: String,
    /// Descriptors for the supplied arguments, in order. Block arguments
    /// and attached blocks are not arguments and do not appear.
    pub args: Vec<CallArg>,
    /// 1-based source line of the call.
    pub line: usize,
    /// The call's source text.
    pub source: String,
}

/// Collects every call site reachable through the traversal ladder.
#[must_use]
pub fn call_sites(source: &str) -> Vec<CallSite> {
    let parsed = ruby_prism::parse(source.as_bytes());
    let mut sites = Vec::new();
    walk(&parsed.node(), source, &mut sites);
    sites
}

fn walk(node: &Node<'_>, source: &str, sites: &mut Vec<CallSite>) {
    if let Some(program) = node.as_program_node() {
        walk(&program.statements().as_node(), source, sites);
        return;
    }
    if let Some(statements) = node.as_statements_node() {
        for child in statements.body().iter() {
            walk(&child, source, sites);
        }
        return;
    }
    if let Some(call) = node.as_call_node() {
        let args = call.arguments().map_or_else(Vec::new, |arguments| {
            arguments.arguments().iter().map(|arg| CallArg::from_node(&arg)).collect()
        });
        sites.push(CallSite {
            name: String::from_utf8_lossy(call.name().as_slice()).into_owned(),
            args,
            line: line_of(source, call.location().start_offset()),
            source: String::from_utf8_lossy(call.location().as_slice()).into_owned(),
        });
        if let Some(receiver) = call.receiver() {
            walk(&receiver, source, sites);
        }
        if let Some(arguments) = call.arguments() {
            for arg in arguments.arguments().iter() {
                walk(&arg, source, sites);
            }
        }
        if let Some(block) = call.block() {
            walk(&block, source, sites);
        }
        return;
    }
    if let Some(def) = node.as_def_node() {
        if let Some(body) = def.body() {
            walk(&body, source, sites);
        }
        return;
    }
    if let Some(class) = node.as_class_node() {
        if let Some(body) = class.body() {
            walk(&body, source, sites);
        }
        return;
    }
    if let Some(module) = node.as_module_node() {
        if let Some(body) = module.body() {
            walk(&body, source, sites);
        }
        return;
    }
    if let Some(begin) = node.as_begin_node() {
        if let Some(statements) = begin.statements() {
            walk(&statements.as_node(), source, sites);
        }
        return;
    }
    if let Some(if_node) = node.as_if_node() {
        walk(&if_node.predicate(), source, sites);
        if let Some(statements) = if_node.statements() {
            walk(&statements.as_node(), source, sites);
        }
        if let Some(subsequent) = if_node.subsequent() {
            walk(&subsequent, source, sites);
        }
        return;
    }
    if let Some(unless_node) = node.as_unless_node() {
        walk(&unless_node.predicate(), source, sites);
        if let Some(statements) = unless_node.statements() {
            walk(&statements.as_node(), source, sites);
        }
        if let Some(else_clause) = unless_node.else_clause() {
            walk(&else_clause.as_node(), source, sites);
        }
        return;
    }
    if let Some(while_node) = node.as_while_node() {
        walk(&while_node.predicate(), source, sites);
        if let Some(statements) = while_node.statements() {
            walk(&statements.as_node(), source, sites);
        }
        return;
    }
    if let Some(until_node) = node.as_until_node() {
        walk(&until_node.predicate(), source, sites);
        if let Some(statements) = until_node.statements() {
            walk(&statements.as_node(), source, sites);
        }
        return;
    }
    if let Some(case) = node.as_case_node() {
        if let Some(predicate) = case.predicate() {
            walk(&predicate, source, sites);
        }
        for condition in case.conditions().iter() {
            walk(&condition, source, sites);
        }
        if let Some(else_clause) = case.else_clause() {
            walk(&else_clause.as_node(), source, sites);
        }
        return;
    }
    if let Some(when) = node.as_when_node() {
        for condition in when.conditions().iter() {
            walk(&condition, source, sites);
        }
        if let Some(statements) = when.statements() {
            walk(&statements.as_node(), source, sites);
        }
        return;
    }
    if let Some(else_clause) = node.as_else_node() {
        if let Some(statements) = else_clause.statements() {
            walk(&statements.as_node(), source, sites);
        }
        return;
    }
    if let Some(block) = node.as_block_node() {
        if let Some(body) = block.body() {
            walk(&body, source, sites);
        }
        return;
    }
    if let Some(lambda) = node.as_lambda_node() {
        if let Some(body) = lambda.body() {
            walk(&body, source, sites);
        }
        return;
    }
    if let Some(parens) = node.as_parentheses_node() {
        if let Some(body) = parens.body() {
            walk(&body, source, sites);
        }
        return;
    }
    if let Some(write) = node.as_local_variable_write_node() {
        walk(&write.value(), source, sites);
        return;
    }
    if let Some(write) = node.as_instance_variable_write_node() {
        walk(&write.value(), source, sites);
        return;
    }
    if let Some(write) = node.as_constant_write_node() {
        walk(&write.value(), source, sites);
        return;
    }
    if let Some(and) = node.as_and_node() {
        walk(&and.left(), source, sites);
        walk(&and.right(), source, sites);
        return;
    }
    if let Some(or) = node.as_or_node() {
        walk(&or.left(), source, sites);
        walk(&or.right(), source, sites);
        return;
    }
    if let Some(array) = node.as_array_node() {
        for element in array.elements().iter() {
            walk(&element, source, sites);
        }
        return;
    }
    if let Some(hash) = node.as_hash_node() {
        for element in hash.elements().iter() {
            walk(&element, source, sites);
        }
        return;
    }
    if let Some(hash) = node.as_keyword_hash_node() {
        for element in hash.elements().iter() {
            walk(&element, source, sites);
        }
        return;
    }
    if let Some(assoc) = node.as_assoc_node() {
        walk(&assoc.key(), source, sites);
        walk(&assoc.value(), source, sites);
        return;
    }
    if let Some(splat) = node.as_splat_node() {
        if let Some(expression) = splat.expression() {
            walk(&expression, source, sites);
        }
        return;
    }
    if let Some(ret) = node.as_return_node() {
        if let Some(arguments) = ret.arguments() {
            for arg in arguments.arguments().iter() {
                walk(&arg, source, sites);
            }
        }
        return;
    }
    if let Some(yield_node) = node.as_yield_node() {
        if let Some(arguments) = yield_node.arguments() {
            for arg in arguments.arguments().iter() {
                walk(&arg, source, sites);
            }
        }
    }
}

/// 1-based line of a byte offset.
fn line_of(source: &str, offset: usize) -> usize {
    source
        .as_bytes()
        .get(..offset)
        .map_or(0, |prefix| prefix.iter().filter(|&&byte| byte == b'\n').count())
        + 1
}

/// A call site that no longer binds to a changed definition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incompatibility {
    pub line: usize,
    pub call_source: String,
    pub method_name: String,
    pub failure: BindFailure,
}

impl fmt::Display for Incompatibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "line {}: `{}` does not match `{}`: {}",
            self.line, self.call_source, self.method_name, self.failure
        )
    }
}

/// Checks every call site in `source` against the added side of each change.
///
/// Call names that differ from a changed method are skipped through the
/// matcher's own name check; only genuine binding failures are reported.
#[must_use]
pub fn check_source(source: &str, changed: &[ChangedMethod]) -> Vec<Incompatibility> {
    let sites = call_sites(source);
    let mut findings = Vec::new();
    for change in changed {
        let Some(def) = change.added.as_ref() else { continue };
        for site in &sites {
            match def.callable(&site.name, &site.args) {
                CallOutcome::Bindable | CallOutcome::NotBindable(BindFailure::NameMismatch) => {}
                CallOutcome::NotBindable(failure) => findings.push(Incompatibility {
                    line: site.line,
                    call_source: site.source.clone(),
                    method_name: def.name().to_owned(),
                    failure,
                }),
            }
        }
    }
    findings.sort_by_key(|finding| finding.line);
    findings
}
