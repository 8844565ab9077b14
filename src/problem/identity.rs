// Problem identity resolution.
// Derives the stable problem identifier from a navigation location.

use std::fmt;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

static PROBLEM_PATH: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^/problems/([^/?#]+)").expect("problem path pattern is valid")
});

static SEPARATORS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[-_]+").expect("separator pattern is valid"));

/// Placeholder origin for resolving path-only locations.
const LOCAL_ORIGIN: &str = "http://localhost";

/// Stable identifier of a problem, taken from its path segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProblemId(String);

impl ProblemId {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Human-readable title guessed from the identifier.
    ///
    /// `two-sum_ii` becomes `Two Sum Ii`. Only ever a fallback; never cached.
    pub fn prettify(&self) -> String {
        let spaced = SEPARATORS.replace_all(&self.0, " ");
        let mut out = String::with_capacity(spaced.len());
        let mut prev_word = false;
        for c in spaced.chars() {
            let word = c.is_alphanumeric() || c == '_';
            if word && !prev_word {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
            prev_word = word;
        }
        out.trim().to_string()
    }
}

impl fmt::Display for ProblemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ProblemId {
    fn from(value: &str) -> Self {
        ProblemId(value.to_string())
    }
}

fn parse_location(location: &str) -> Option<Url> {
    Url::parse(location)
        .or_else(|_| Url::parse(LOCAL_ORIGIN).and_then(|base| base.join(location)))
        .ok()
}

/// Resolve the problem identifier for a location (absolute URL or path).
///
/// Returns `None` when the location is not a problem view.
pub fn resolve(location: &str) -> Option<ProblemId> {
    let url = parse_location(location)?;
    let caps = PROBLEM_PATH.captures(url.path())?;
    let raw = caps.get(1)?.as_str();
    let decoded = urlencoding::decode(raw)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| raw.to_string());
    if decoded.is_empty() {
        return None;
    }
    Some(ProblemId(decoded))
}

pub fn is_problem_page(location: &str) -> bool {
    resolve(location).is_some()
}

/// Path plus query string, used to gate one-time mounting per route.
pub fn route_key(location: &str) -> Option<String> {
    let url = parse_location(location)?;
    Some(match url.query() {
        Some(query) => format!("{}?{}", url.path(), query),
        None => url.path().to_string(),
    })
}
