//! Reverse-dependency collector
//!
//! Finds files that import or require any of a set of changed files by
//! textual search over the working copy. The match is a heuristic: a key
//! that happens to be a substring of an unrelated quoted string is a false
//! positive, and dynamic imports are never seen.

use std::collections::BTreeSet;
use std::path::Path;

use tracing::debug;

use crate::git_tools::git_grep_files;

/// Source extensions stripped before building search keys
const STRIPPED_EXTENSIONS: [&str; 4] = [".ts", ".tsx", ".js", ".jsx"];

/// Search keys for one changed file: the path without its extension,
/// then the final segment without its extension
///
/// `src/utils/helper.ts` → `["src/utils/helper", "helper"]`
pub fn search_keys(changed_file: &str) -> [String; 2] {
    let without_ext = STRIPPED_EXTENSIONS
        .iter()
        .find_map(|ext| changed_file.strip_suffix(ext))
        .unwrap_or(changed_file);

    let base_name = without_ext.rsplit('/').next().unwrap_or(without_ext);

    [without_ext.to_string(), base_name.to_string()]
}

/// Characters special in POSIX extended regexes
const ERE_METACHARACTERS: &str = r".*+?^${}()|[]\";

/// Escape `key` for `git grep -E`
///
/// Only ERE metacharacters are escaped; escaping anything else (such as
/// `-`) is undefined behavior in ERE.
fn escape_ere(key: &str) -> String {
    let mut escaped = String::with_capacity(key.len());
    for c in key.chars() {
        if ERE_METACHARACTERS.contains(c) {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Build the `git grep -E` pattern for one key
fn import_pattern(key: &str) -> String {
    format!(r#"(import|require).*['"].*{}['"]"#, escape_ere(key))
}

/// Find every file under `repo_root` that references any changed file
///
/// Zero matches is an ordinary empty result. A search that fails outright
/// is logged and counted as zero matches. A changed file never appears in
/// its own result; the returned set holds each path once.
pub fn find_importers(repo_root: &Path, changed_files: &[String]) -> BTreeSet<String> {
    let mut importers = BTreeSet::new();

    for file in changed_files {
        for key in search_keys(file) {
            if key.is_empty() {
                continue;
            }
            let pattern = import_pattern(&key);
            match git_grep_files(repo_root, &pattern) {
                Ok(matches) => {
                    importers.extend(matches.into_iter().filter(|m| m != file));
                }
                Err(e) => {
                    debug!(key = %key, "import search failed, treating as no match: {:#}", e);
                }
            }
        }
    }

    importers
}
