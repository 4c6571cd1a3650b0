#![doc = include_str!("../../../README.md")]

mod args;
mod check;
mod diff;
mod parse;
mod signature;

pub use crate::{
    args::CallArg,
    check::{CallSite, Incompatibility, call_sites, check_source},
    diff::{ChangedMethod, DiffLine, Hunk, Patch, changed_methods},
    parse::{InvalidDefinition, parse_definition},
    signature::{BindFailure, CallOutcome, KeywordParam, MethodDef, OptionalParam, Signature},
};
