//! Completion suggestions for partially typed filter expressions.
//!
//! Deliberately lighter-weight than the parser: the current clause is
//! isolated with plain string splitting, then looked up in the option
//! tree. Candidates come back in tree insertion order; no fuzzy matching,
//! no ranking.

use crate::options::{OptionNode, OptionTree};
use indexmap::{IndexMap, IndexSet};

/// Suggest completions for `current_text` with the caret at `cursor_pos`
/// (a character offset, clamped to the text length).
pub fn suggest(current_text: &str, cursor_pos: usize, options: &OptionTree) -> Vec<String> {
    // Only the text before the caret matters.
    let upto: String = current_text.chars().take(cursor_pos).collect();

    // Isolate the clause the user is editing: everything after the last
    // `&&` / `||`, minus one leading group paren.
    let clause_start = ["&&", "||"]
        .iter()
        .filter_map(|token| upto.rfind(token))
        .max()
        .map(|idx| idx + 2)
        .unwrap_or(0);
    let clause = strip_leading_group(&upto[clause_start..]);

    // Key or value mode, depending on whether a comparator was typed yet.
    match ["==", "!="].iter().filter_map(|t| clause.find(t)).min() {
        None => suggest_keys(clause, options),
        Some(idx) => suggest_values(&clause[..idx], &clause[idx + 2..], options),
    }
}

fn strip_leading_group(clause: &str) -> &str {
    let trimmed = clause.trim_start();
    match trimmed.strip_prefix('(') {
        Some(rest) => rest,
        None => clause,
    }
}

#[derive(Clone, Copy)]
enum Found<'t> {
    Branch(&'t IndexMap<String, OptionNode>),
    Values(&'t IndexSet<String>),
    Missing,
}

/// Walk the option tree along a dotted key path. Descent stops early at a
/// value set (extra segments are ignored) or at a missing key.
fn descend<'t>(tree: &'t OptionTree, path: &[&str]) -> Found<'t> {
    let mut current = Found::Branch(tree);
    for segment in path {
        let Found::Branch(map) = current else {
            break;
        };
        current = match map.get(*segment) {
            Some(OptionNode::Branch(children)) => Found::Branch(children),
            Some(OptionNode::Values(values)) => Found::Values(values),
            None => Found::Missing,
        };
    }
    current
}

/// Mid-key: all but the last dotted segment select the namespace, the last
/// (partial) segment prefix-filters its child names. The partial segment
/// keeps trailing whitespace on purpose so `request. ` suggests nothing.
fn suggest_keys(raw_key: &str, options: &OptionTree) -> Vec<String> {
    let mut path: Vec<&str> = raw_key.trim_start().split('.').collect();
    let partial = path.pop().unwrap_or("");
    match descend(options, &path) {
        Found::Branch(children) => children
            .keys()
            .filter(|name| name.starts_with(partial))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}

/// Mid-value: the full key path selects a value set, the (partial) value
/// prefix-filters it.
fn suggest_values(raw_key: &str, raw_value: &str, options: &OptionTree) -> Vec<String> {
    let path: Vec<&str> = raw_key.trim().split('.').collect();
    let partial = raw_value.trim_start();
    match descend(options, &path) {
        Found::Values(values) => values
            .iter()
            .filter(|value| value.starts_with(partial))
            .cloned()
            .collect(),
        _ => Vec::new(),
    }
}
