use std::sync::LazyLock;

use regex::Regex;

/// `/`-split parts kept for a first-level folder key: `https:`, ``, host, folder.
pub const LEVEL1_PARTS: usize = 4;
pub const LEVEL2_PARTS: usize = 5;
/// Scheme and host only.
pub const SUBDOMAIN_PARTS: usize = 3;

static PARAM_KEY_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[?&]([^?&=]*)=").unwrap());

/// Lines carrying a quote are multi-field export rows, not plain URLs.
fn is_malformed(line: &str) -> bool {
    line.contains('"')
}

/// Path-prefix key made of the first `parts` slash-delimited pieces of `line`.
pub fn path_prefix(line: &str, parts: usize) -> Option<String> {
    if is_malformed(line) {
        return None;
    }

    let pieces: Vec<&str> = line.split('/').collect();
    if pieces.len() < parts {
        return None;
    }

    let key = pieces[..parts].join("/");
    let key = key.trim();
    if key.is_empty() {
        None
    } else {
        Some(key.to_string())
    }
}

/// Every query-string key in `line` (text between `?`/`&` and the next `=`).
pub fn parameter_keys(line: &str) -> Vec<String> {
    if is_malformed(line) {
        return Vec::new();
    }

    PARAM_KEY_RE
        .captures_iter(line)
        .map(|caps| caps[1].trim().to_string())
        .filter(|key| !key.is_empty())
        .collect()
}
