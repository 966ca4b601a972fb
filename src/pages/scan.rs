//! Filesystem auto-discovery of HTML pages
//!
//! When no explicit page table is configured, the project directory is
//! scanned for HTML files. Logical names are derived from the full relative
//! path with the `.html` suffix stripped, which keeps keys unique across
//! directories; a basename-only alias can be enabled for compatibility with
//! flat lookups (last scan order wins on alias collision).

use crate::logger;
use crate::pages::{PageDefinition, PageTable};
use regex::Regex;
use std::collections::{BTreeSet, HashMap};
use std::path::Path;
use walkdir::WalkDir;

/// Pattern applied when no explicit pages are configured
pub const DEFAULT_GLOB_PATTERN: &str = "**/*.html";

/// Directory never descended into
const EXCLUDED_DIR: &str = "node_modules";

/// Build the page table: explicit configuration verbatim when present,
/// otherwise a filesystem scan.
#[must_use]
pub fn build_table(
    explicit: Option<&HashMap<String, PageDefinition>>,
    extra_glob_patterns: &[String],
    project_root: &Path,
    basename_alias: bool,
) -> PageTable {
    match explicit {
        Some(entries) => entries.clone(),
        None => scan_pages(extra_glob_patterns, project_root, basename_alias),
    }
}

/// Scan `project_root` for pages matching the default pattern unioned with
/// `extra_glob_patterns` (deduplicated as a set). Maps each match's logical
/// name to its root-relative path.
#[must_use]
pub fn scan_pages(
    extra_glob_patterns: &[String],
    project_root: &Path,
    basename_alias: bool,
) -> PageTable {
    let mut patterns: BTreeSet<String> = BTreeSet::new();
    patterns.insert(DEFAULT_GLOB_PATTERN.to_string());
    patterns.extend(extra_glob_patterns.iter().cloned());

    let matchers: Vec<Regex> = patterns
        .iter()
        .filter_map(|pattern| compile_glob(pattern))
        .collect();

    let mut table = PageTable::new();
    let walker = WalkDir::new(project_root)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_excluded_dir(entry));

    for entry in walker.filter_map(Result::ok) {
        if !entry.file_type().is_file() {
            continue;
        }
        let relative = entry
            .path()
            .strip_prefix(project_root)
            .unwrap_or_else(|_| entry.path());
        let relative = relative.to_string_lossy().replace('\\', "/");
        if !matchers.iter().any(|matcher| matcher.is_match(&relative)) {
            continue;
        }

        let logical = relative
            .strip_suffix(".html")
            .unwrap_or(&relative)
            .to_string();
        let target = format!("/{relative}");
        if basename_alias {
            if let Some(basename) = logical.rsplit('/').next() {
                if basename != logical {
                    table.insert(basename.to_string(), PageDefinition::Path(target.clone()));
                }
            }
        }
        table.insert(logical, PageDefinition::Path(target));
    }
    table
}

/// Skip `node_modules` and dot-directories during traversal
fn is_excluded_dir(entry: &walkdir::DirEntry) -> bool {
    if !entry.file_type().is_dir() {
        return false;
    }
    let name = entry.file_name().to_string_lossy();
    name == EXCLUDED_DIR || (name.starts_with('.') && name.len() > 1)
}

/// Translate a glob pattern into an anchored regex over forward-slash
/// relative paths. `**/` crosses directories, `*` and `?` stay within one
/// path segment. Invalid patterns are logged and skipped.
fn compile_glob(pattern: &str) -> Option<Regex> {
    let mut translated = String::from("^");
    let mut chars = pattern.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '*' => {
                if chars.peek() == Some(&'*') {
                    chars.next();
                    if chars.peek() == Some(&'/') {
                        chars.next();
                        translated.push_str("(?:.*/)?");
                    } else {
                        translated.push_str(".*");
                    }
                } else {
                    translated.push_str("[^/]*");
                }
            }
            '?' => translated.push_str("[^/]"),
            other => translated.push_str(&regex::escape(&other.to_string())),
        }
    }
    translated.push('$');

    match Regex::new(&translated) {
        Ok(matcher) => Some(matcher),
        Err(err) => {
            logger::log_warning(&format!("invalid glob pattern '{pattern}', skipped: {err}"));
            None
        }
    }
}
