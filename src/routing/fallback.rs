//! History-API fallback rewrites
//!
//! Single-page applications route client-side; a deep link like `/app/users`
//! has no file behind it and must be rewritten to the page that boots the
//! SPA. Rules are configured as regex/target pairs, compiled once at
//! startup, and applied in order with the first match winning.

use crate::logger;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// One configured rewrite: requests matching `from` are served as `to`
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RewriteRule {
    pub from: String,
    pub to: String,
}

/// A rewrite rule with its pattern compiled
#[derive(Debug, Clone)]
pub struct CompiledRewrite {
    pattern: Regex,
    to: String,
}

/// Compile configured rules. Invalid patterns are logged and skipped; a
/// broken rule is a startup-time configuration problem, not a request
/// failure.
#[must_use]
pub fn compile_rewrites(rules: &[RewriteRule]) -> Vec<CompiledRewrite> {
    rules
        .iter()
        .filter_map(|rule| match Regex::new(&rule.from) {
            Ok(pattern) => Some(CompiledRewrite {
                pattern,
                to: rule.to.clone(),
            }),
            Err(err) => {
                logger::log_warning(&format!(
                    "invalid rewrite pattern '{}', rule skipped: {err}",
                    rule.from
                ));
                None
            }
        })
        .collect()
}

/// Apply the first matching rule; no match returns the url unchanged.
#[must_use]
pub fn rewrite(url: &str, rules: &[CompiledRewrite]) -> String {
    rules
        .iter()
        .find(|rule| rule.pattern.is_match(url))
        .map_or_else(|| url.to_string(), |rule| rule.to.clone())
}
