//! Code injection module
//!
//! Applies single-line code injection to served HTML. Rules are keyed by the
//! HTML filename or the wildcard key `*`; the wildcard rule runs first and
//! the filename rule operates on its output.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Key applying a rule to all served HTML
pub const WILDCARD_KEY: &str = "*";

/// Where the replacement lands relative to the `find` anchor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum InjectPosition {
    /// Insert on a new line immediately preceding the first occurrence of `find`
    Before,
    /// Insert on a new line immediately following the first occurrence of `find`
    After,
    /// Leave the code unchanged
    #[default]
    None,
}

/// One injection rule
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct InjectionRule {
    #[serde(default)]
    pub pos: InjectPosition,
    pub find: String,
    pub replacement: String,
}

/// Apply the wildcard rule, then the filename-specific rule, each operating
/// on the previous rule's output.
#[must_use]
pub fn apply_rules(code: &str, file_name: &str, rules: &HashMap<String, InjectionRule>) -> String {
    let mut out = code.to_string();
    if let Some(rule) = rules.get(WILDCARD_KEY) {
        out = apply_rule(&out, rule);
    }
    if file_name != WILDCARD_KEY {
        if let Some(rule) = rules.get(file_name) {
            out = apply_rule(&out, rule);
        }
    }
    out
}

/// Apply one rule to `code`.
///
/// Only the first occurrence of `find` anchors the insertion. A missing
/// anchor or an unrecognized position returns the code unchanged.
#[must_use]
pub fn apply_rule(code: &str, rule: &InjectionRule) -> String {
    let Some(idx) = code.find(&rule.find) else {
        return code.to_string();
    };

    match rule.pos {
        InjectPosition::After => {
            let split = idx + rule.find.len();
            format!("{}\n{}{}", &code[..split], rule.replacement, &code[split..])
        }
        InjectPosition::Before => {
            format!("{}{}\n{}", &code[..idx], rule.replacement, &code[idx..])
        }
        InjectPosition::None => code.to_string(),
    }
}
