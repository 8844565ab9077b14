// Problem facts and merge-patch rules.
// Cached metadata about a problem and the invariants that keep it from regressing.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Problem difficulty as shown by the host page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    #[default]
    #[serde(other)]
    Uncategorized,
}

impl Difficulty {
    /// Find a difficulty token in free text (case-insensitive substring match).
    ///
    /// Tokens are tried in the order easy, medium, hard, so
    /// `"Easy (Medium complexity hints)"` is `Easy`.
    pub fn from_text(raw: &str) -> Option<Self> {
        let s = raw.to_lowercase();
        if s.contains("easy") {
            Some(Difficulty::Easy)
        } else if s.contains("medium") {
            Some(Difficulty::Medium)
        } else if s.contains("hard") {
            Some(Difficulty::Hard)
        } else {
            None
        }
    }

    /// Whether this is a real difficulty rather than the placeholder.
    pub fn is_definitive(&self) -> bool {
        !matches!(self, Difficulty::Uncategorized)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
            Difficulty::Uncategorized => "Uncategorized",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Last-known facts about a problem.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProblemFacts {
    pub title: String,
    pub difficulty: Difficulty,
    /// Statement HTML with interactive controls stripped.
    pub statement_html: String,
    /// Language identifier as reported by the page.
    pub language_id: String,
    /// Normalized file suffix, without the dot.
    pub extension: String,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Partial update to [`ProblemFacts`]. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FactsPatch {
    pub title: Option<String>,
    pub difficulty: Option<Difficulty>,
    pub statement_html: Option<String>,
    pub language_id: Option<String>,
    pub extension: Option<String>,
}

impl FactsPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.difficulty.is_none()
            && self.statement_html.is_none()
            && self.language_id.is_none()
            && self.extension.is_none()
    }
}

fn overlay_text(slot: &mut String, value: Option<String>) -> bool {
    match value {
        Some(v) if !v.trim().is_empty() && *slot != v => {
            *slot = v;
            true
        }
        _ => false,
    }
}

impl ProblemFacts {
    /// Overlay a patch, returning whether anything changed.
    ///
    /// Empty strings never replace stored text and `Uncategorized` never
    /// replaces a definitive difficulty. `updated_at` is stamped only on change.
    pub fn merge(&mut self, patch: FactsPatch, now: DateTime<Utc>) -> bool {
        let mut changed = false;
        changed |= overlay_text(&mut self.title, patch.title);
        changed |= overlay_text(&mut self.statement_html, patch.statement_html);
        changed |= overlay_text(&mut self.language_id, patch.language_id);
        changed |= overlay_text(&mut self.extension, patch.extension);

        if let Some(difficulty) = patch.difficulty {
            let regress = !difficulty.is_definitive() && self.difficulty.is_definitive();
            if !regress && self.difficulty != difficulty {
                self.difficulty = difficulty;
                changed = true;
            }
        }

        if changed {
            self.updated_at = Some(now);
        }
        changed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_from_text() {
        assert_eq!(
            Difficulty::from_text("Easy (Medium complexity hints)"),
            Some(Difficulty::Easy)
        );
        assert_eq!(Difficulty::from_text("  MEDIUM "), Some(Difficulty::Medium));
        assert_eq!(Difficulty::from_text("hard-ish"), Some(Difficulty::Hard));
        assert_eq!(Difficulty::from_text("Arrays & Hashing"), None);
    }

    #[test]
    fn test_difficulty_serde() {
        assert_eq!(serde_json::to_string(&Difficulty::Hard).unwrap(), "\"Hard\"");
        let parsed: Difficulty = serde_json::from_str("\"Extreme\"").unwrap();
        assert_eq!(parsed, Difficulty::Uncategorized);
    }

    #[test]
    fn test_merge_never_regresses() {
        let now = Utc::now();
        let mut facts = ProblemFacts::default();
        facts.merge(
            FactsPatch {
                title: Some("Two Sum".into()),
                difficulty: Some(Difficulty::Easy),
                statement_html: Some("<p>Given</p>".into()),
                ..Default::default()
            },
            now,
        );

        let changed = facts.merge(
            FactsPatch {
                title: Some(String::new()),
                difficulty: Some(Difficulty::Uncategorized),
                statement_html: Some("   ".into()),
                ..Default::default()
            },
            now,
        );

        assert!(!changed);
        assert_eq!(facts.title, "Two Sum");
        assert_eq!(facts.difficulty, Difficulty::Easy);
        assert_eq!(facts.statement_html, "<p>Given</p>");
    }

    #[test]
    fn test_merge_replaces_with_different_value() {
        let earlier = Utc::now() - chrono::Duration::seconds(60);
        let mut facts = ProblemFacts {
            title: "Old".into(),
            difficulty: Difficulty::Easy,
            updated_at: Some(earlier),
            ..Default::default()
        };

        let now = Utc::now();
        assert!(facts.merge(
            FactsPatch {
                title: Some("New".into()),
                difficulty: Some(Difficulty::Medium),
                ..Default::default()
            },
            now,
        ));
        assert_eq!(facts.title, "New");
        assert_eq!(facts.difficulty, Difficulty::Medium);
        assert_eq!(facts.updated_at, Some(now));

        // Same values again: nothing to stamp.
        assert!(!facts.merge(
            FactsPatch {
                title: Some("New".into()),
                ..Default::default()
            },
            Utc::now(),
        ));
        assert_eq!(facts.updated_at, Some(now));
    }
}
