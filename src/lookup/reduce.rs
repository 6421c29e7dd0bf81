use std::collections::HashMap;

use crate::pattern::Pattern;

/// Keep the entries whose key contains every non-empty term, ignoring case.
///
/// Empty terms are ignored; with no remaining terms the input is returned
/// as is.
pub fn reduce(matches: HashMap<String, String>, terms: &[&str]) -> HashMap<String, String> {
    let terms: Vec<String> = terms
        .iter()
        .filter(|term| !term.is_empty())
        .map(|term| term.to_lowercase())
        .collect();
    if terms.is_empty() {
        return matches;
    }

    matches
        .into_iter()
        .filter(|(key, _)| {
            let key = key.to_lowercase();
            terms.iter().all(|term| key.contains(term.as_str()))
        })
        .collect()
}

/// Statistics tag for a group lookup: the pattern text followed by
/// `:term` for every non-empty term.
///
/// Empty terms filter nothing, so they are left out of the tag and
/// `["amd", ""]` is counted together with `["amd"]`.
pub fn pattern_tag(pattern: &Pattern, terms: &[&str]) -> String {
    let mut tag = pattern.as_str().to_string();
    for term in terms.iter().filter(|term| !term.is_empty()) {
        tag.push(':');
        tag.push_str(term);
    }
    tag
}
