//! Unified-diff scanning: which method definitions did a change touch?
//!
//! This is a deliberately small reading of the git diff format: enough to
//! split patches, classify hunk lines, and spot `def` heads on either side.
//! A candidate that does not parse as a definition is dropped, not reported;
//! most hunks touch plain code, not method heads.

use serde::{Deserialize, Serialize};

use crate::{parse::parse_definition, signature::MethodDef};

/// One line inside a hunk, with its leading marker stripped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiffLine {
    Added(String),
    Removed(String),
    Context(String),
}

/// A contiguous change region introduced by one `@@` header.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Hunk {
    lines: Vec<DiffLine>,
}

impl Hunk {
    #[must_use]
    pub fn lines(&self) -> &[DiffLine] {
        &self.lines
    }

    /// Changed lines whose content begins a method definition.
    fn def_lines(&self, added: bool) -> Vec<&str> {
        self.lines
            .iter()
            .filter_map(|line| match line {
                DiffLine::Added(text) if added => def_head(text),
                DiffLine::Removed(text) if !added => def_head(text),
                _ => None,
            })
            .collect()
    }
}

/// All hunks touching one file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Patch {
    path: String,
    hunks: Vec<Hunk>,
}

impl Patch {
    /// Splits a unified diff into per-file patches.
    ///
    /// Preamble lines (`diff --git`, `index`, mode changes, binary notices)
    /// are skipped; a malformed diff yields fewer patches, never an error.
    #[must_use]
    pub fn parse_all(diff: &str) -> Vec<Self> {
        let mut patches: Vec<Self> = Vec::new();
        for line in diff.lines() {
            if let Some(path) = line.strip_prefix("+++ ") {
                let path = path.strip_prefix("b/").unwrap_or(path);
                patches.push(Self {
                    path: path.to_owned(),
                    hunks: Vec::new(),
                });
                continue;
            }
            if line.starts_with("--- ") || line.starts_with("diff ") || line.starts_with("index ") {
                continue;
            }
            let Some(patch) = patches.last_mut() else { continue };
            if line.starts_with("@@") {
                patch.hunks.push(Hunk::default());
                continue;
            }
            let Some(hunk) = patch.hunks.last_mut() else { continue };
            if let Some(text) = line.strip_prefix('+') {
                hunk.lines.push(DiffLine::Added(text.to_owned()));
            } else if let Some(text) = line.strip_prefix('-') {
                hunk.lines.push(DiffLine::Removed(text.to_owned()));
            } else if let Some(text) = line.strip_prefix(' ') {
                hunk.lines.push(DiffLine::Context(text.to_owned()));
            }
            // other markers ("\ No newline at end of file") are ignored
        }
        patches
    }

    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[must_use]
    pub fn hunks(&self) -> &[Hunk] {
        &self.hunks
    }
}

/// A method definition changed by a diff.
///
/// Either side may be absent: a brand-new method has no `removed`, a deleted
/// one no `added`, and a side whose text does not parse is dropped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChangedMethod {
    pub path: String,
    pub removed: Option<MethodDef>,
    pub added: Option<MethodDef>,
}

/// Extracts every changed method definition from a unified diff.
///
/// Within one hunk, removed and added `def` heads pair up in order, so a
/// hunk that rewrites a single method yields one entry with both sides
/// present.
#[must_use]
pub fn changed_methods(diff: &str) -> Vec<ChangedMethod> {
    let mut changed = Vec::new();
    for patch in Patch::parse_all(diff) {
        for hunk in patch.hunks() {
            let removed = hunk.def_lines(false);
            let added = hunk.def_lines(true);
            for index in 0..removed.len().max(added.len()) {
                let removed_def = removed.get(index).and_then(|head| parse_definition(head).ok());
                let added_def = added.get(index).and_then(|head| parse_definition(head).ok());
                if removed_def.is_none() && added_def.is_none() {
                    continue;
                }
                changed.push(ChangedMethod {
                    path: patch.path().to_owned(),
                    removed: removed_def,
                    added: added_def,
                });
            }
        }
    }
    changed
}

/// Returns the trimmed text when a changed line begins a method definition.
fn def_head(text: &str) -> Option<&str> {
    let trimmed = text.trim();
    if trimmed.starts_with("def ") { Some(trimmed) } else { None }
}
