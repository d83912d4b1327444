//! Dictionary helpers exposed to templates

use regex::Regex;
use std::collections::BTreeMap;
use tracing::warn;

/// Keep entries whose key matches `pattern`, renaming each key with
/// `pattern.replace_all(key, replacement)`
///
/// An invalid pattern yields an empty map.
pub fn pick_re_replace<V>(
    entries: impl IntoIterator<Item = (String, V)>,
    pattern: &str,
    replacement: &str,
) -> BTreeMap<String, V> {
    let re = match Regex::new(pattern) {
        Ok(re) => re,
        Err(e) => {
            warn!("Invalid pattern '{}' in template: {}", pattern, e);
            return BTreeMap::new();
        }
    };

    entries
        .into_iter()
        .filter(|(key, _)| re.is_match(key))
        .map(|(key, value)| (re.replace_all(&key, replacement).into_owned(), value))
        .collect()
}

/// Keep entries whose key matches `pattern`, keys unchanged
pub fn pick_re<V>(
    entries: impl IntoIterator<Item = (String, V)>,
    pattern: &str,
) -> BTreeMap<String, V> {
    pick_re_replace(entries, pattern, "$0")
}
