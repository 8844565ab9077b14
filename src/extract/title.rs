// Problem title resolution.
// Live page heading first, then the cached title, then a prettified identifier.

use crate::page::{Page, selectors};
use crate::problem::{ProblemFacts, ProblemId};

/// Title used when nothing better is known.
pub const DEFAULT_TITLE: &str = "Solution";

/// Where a resolved title came from. Only `Dom` titles are cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TitleSource {
    Dom,
    Cache,
    Identifier,
    Default,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedTitle {
    pub text: String,
    pub source: TitleSource,
}

/// Title heading text, if rendered and non-blank.
pub fn read_dom_title(page: &dyn Page) -> Option<String> {
    selectors::TITLE
        .iter()
        .filter_map(|s| page.query(s))
        .map(|node| node.text.trim().to_string())
        .find(|t| !t.is_empty())
}

/// Fallback chain once the live read came back empty.
pub fn fallback_title(cached: Option<&ProblemFacts>, id: Option<&ProblemId>) -> ResolvedTitle {
    if let Some(title) = cached.map(|c| c.title.trim()).filter(|t| !t.is_empty()) {
        return ResolvedTitle {
            text: title.to_string(),
            source: TitleSource::Cache,
        };
    }
    if let Some(pretty) = id.map(ProblemId::prettify).filter(|t| !t.is_empty()) {
        return ResolvedTitle {
            text: pretty,
            source: TitleSource::Identifier,
        };
    }
    ResolvedTitle {
        text: DEFAULT_TITLE.to_string(),
        source: TitleSource::Default,
    }
}
