// Fact extraction module.
// Derives problem metadata from the host page, cache-first, with bounded waits.

pub mod code;
pub mod difficulty;
pub mod language;
pub mod poll;
pub mod statement;
pub mod title;

use std::sync::Arc;

use tokio::time::sleep;
use tracing::{debug, warn};

use crate::config::Timings;
use crate::lifecycle::Lifecycle;
use crate::page::Page;
use crate::problem::{Difficulty, FactsPatch, ProblemCache, ProblemId, identity};

pub use code::{CODE_SOURCES, CodeSource};
pub use difficulty::{DIFFICULTY_PROBES, DifficultyProbe};
pub use language::{LanguageDetector, LanguageGuess};
pub use title::{ResolvedTitle, TitleSource};

/// Everything needed to sync one solution, captured at a single moment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    pub id: Option<ProblemId>,
    /// Location the metadata was captured from.
    pub href: String,
    pub code: String,
    pub title: String,
    /// Statement HTML; empty when it was never captured.
    pub statement_html: String,
    pub difficulty: Difficulty,
    pub language_id: Option<String>,
    pub extension: String,
}

/// Cache-first extractor over one host page.
#[derive(Clone)]
pub struct Extractor {
    page: Arc<dyn Page>,
    cache: ProblemCache,
    lifecycle: Lifecycle,
    timings: Timings,
    language: LanguageDetector,
    code_sources: Vec<CodeSource>,
    difficulty_probes: Vec<DifficultyProbe>,
}

impl Extractor {
    pub fn new(
        page: Arc<dyn Page>,
        cache: ProblemCache,
        lifecycle: Lifecycle,
        timings: Timings,
    ) -> Self {
        Self {
            page,
            cache,
            lifecycle,
            timings,
            language: LanguageDetector::default(),
            code_sources: CODE_SOURCES.to_vec(),
            difficulty_probes: DIFFICULTY_PROBES.to_vec(),
        }
    }

    pub fn page(&self) -> &Arc<dyn Page> {
        &self.page
    }

    pub fn cache(&self) -> &ProblemCache {
        &self.cache
    }

    pub fn problem_id(&self) -> Option<ProblemId> {
        identity::resolve(&self.page.href())
    }

    /// Editor contents, retried once after a short pause.
    pub async fn code(&self) -> Option<String> {
        if let Some(code) = code::read_code(self.page.as_ref(), &self.code_sources) {
            return Some(code);
        }
        sleep(self.timings.code_retry()).await;
        if !self.lifecycle.is_alive() {
            return None;
        }
        code::read_code(self.page.as_ref(), &self.code_sources)
    }

    /// Difficulty for the current problem, `Uncategorized` when undetectable.
    ///
    /// A definitive cached value is returned without searching the page.
    pub async fn difficulty_for_current_problem(&self) -> Difficulty {
        let Some(id) = self.problem_id() else {
            return Difficulty::Uncategorized;
        };

        if let Some(cached) = self.cache.read(&id).filter(|c| c.difficulty.is_definitive()) {
            return cached.difficulty;
        }

        let detected = difficulty::detect_difficulty(
            self.page.as_ref(),
            &self.difficulty_probes,
            &self.lifecycle,
            &self.timings,
        )
        .await;

        match detected {
            Some(found) => {
                let patch = FactsPatch {
                    difficulty: Some(found),
                    ..Default::default()
                };
                if let Err(e) = self.cache.patch(&id, patch) {
                    debug!(error = %e, "difficulty not cached");
                }
                found
            }
            None => {
                warn!(problem = %id, "difficulty not found, using Uncategorized");
                Difficulty::Uncategorized
            }
        }
    }

    /// Title with bounded wait on the page, then cache, then identifier.
    pub async fn title(&self, id: Option<&ProblemId>) -> ResolvedTitle {
        let page = self.page.as_ref();
        let live = poll::wait_for(
            &self.lifecycle,
            self.timings.title_wait(),
            self.timings.poll_interval(),
            || title::read_dom_title(page),
        )
        .await;

        match live {
            Some(text) => ResolvedTitle {
                text,
                source: TitleSource::Dom,
            },
            None => {
                let cached = id.and_then(|id| self.cache.read(id));
                title::fallback_title(cached.as_ref(), id)
            }
        }
    }

    /// Statement HTML from the page, else from the cache. Second value is
    /// true when it was read live.
    pub async fn statement(&self, id: Option<&ProblemId>) -> (String, bool) {
        let page = self.page.as_ref();
        let live = poll::wait_for(
            &self.lifecycle,
            self.timings.statement_wait(),
            self.timings.poll_interval(),
            || statement::read_dom_statement(page),
        )
        .await;

        match live {
            Some(html) => (html, true),
            None => {
                let cached = id
                    .and_then(|id| self.cache.read(id))
                    .map(|c| c.statement_html)
                    .unwrap_or_default();
                (cached, false)
            }
        }
    }

    /// Assemble a full snapshot and reconcile it into the cache.
    ///
    /// Returns `None` when no code is present or the page has been torn down.
    pub async fn gather_metadata(&self) -> Option<Metadata> {
        if !self.lifecycle.is_alive() {
            return None;
        }
        let href = self.page.href();
        let id = identity::resolve(&href);

        let Some(code) = self.code().await else {
            debug!(href = %href, "no code in editor");
            return None;
        };

        let title = self.title(id.as_ref()).await;
        let (statement_html, statement_live) = self.statement(id.as_ref()).await;
        let difficulty = self.difficulty_for_current_problem().await;
        let guess = self.language.detect(self.page.as_ref(), &code);

        if !self.lifecycle.is_alive() {
            return None;
        }

        if let Some(id) = &id {
            let patch = FactsPatch {
                title: (title.source == TitleSource::Dom).then(|| title.text.clone()),
                statement_html: statement_live.then(|| statement_html.clone()),
                difficulty: difficulty.is_definitive().then_some(difficulty),
                language_id: guess.authoritative.then(|| guess.language_id.clone()).flatten(),
                extension: guess.authoritative.then(|| guess.extension.clone()),
            };
            if let Err(e) = self.cache.patch(id, patch) {
                debug!(error = %e, "gathered facts not cached");
            }
        }

        Some(Metadata {
            id,
            href,
            code,
            title: title.text,
            statement_html,
            difficulty,
            language_id: guess.language_id,
            extension: guess.extension,
        })
    }

    /// Opportunistic single-pass capture of whatever facts are rendered now.
    ///
    /// Returns whether anything was offered to the cache.
    pub fn refresh_cache(&self) -> bool {
        if !self.lifecycle.is_alive() {
            return false;
        }
        let Some(id) = self.problem_id() else {
            return false;
        };
        let page = self.page.as_ref();

        let patch = FactsPatch {
            title: title::read_dom_title(page),
            difficulty: difficulty::find_difficulty_once(page, &self.difficulty_probes),
            statement_html: statement::read_dom_statement(page),
            ..Default::default()
        };
        if patch.is_empty() {
            return false;
        }
        if let Err(e) = self.cache.patch(&id, patch) {
            debug!(error = %e, "cache refresh skipped");
        }
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{EditorEngine, EditorModel, Node, StaticPage, selectors};
    use crate::problem::ProblemFacts;
    use crate::storage::{GuardedStorage, MemoryStorage};
    use std::time::Duration;

    fn fast_timings() -> Timings {
        Timings {
            poll_interval_ms: 5,
            title_wait_ms: 20,
            statement_wait_ms: 20,
            difficulty_wait_ms: 20,
            code_retry_ms: 5,
            ..Timings::default()
        }
    }

    fn setup(page: StaticPage) -> (Extractor, Arc<StaticPage>, Lifecycle) {
        let lifecycle = Lifecycle::new();
        let storage = GuardedStorage::new(Arc::new(MemoryStorage::new()), lifecycle.clone());
        let page = Arc::new(page);
        let extractor = Extractor::new(
            page.clone(),
            ProblemCache::new(storage),
            lifecycle.clone(),
            fast_timings(),
        );
        (extractor, page, lifecycle)
    }

    fn two_sum_page() -> StaticPage {
        StaticPage::new("https://neetcode.io/problems/two-sum")
            .with_node(selectors::TITLE[0], Node::text("Two Sum"))
            .with_node(
                "[class*='difficulty']",
                Node::text("Easy (Medium complexity hints)"),
            )
            .with_node(
                selectors::STATEMENT,
                Node::html("<p>Return indices.</p><button>Copy</button>"),
            )
            .with_editor(
                EditorEngine::CodeMirror,
                EditorModel {
                    value: "class Solution:\n    def twoSum(self, nums, target):\n        pass\n"
                        .into(),
                    language: None,
                },
            )
    }

    #[tokio::test]
    async fn test_gather_two_sum() {
        let (extractor, _, _) = setup(two_sum_page());
        let meta = extractor.gather_metadata().await.unwrap();

        assert_eq!(meta.id, Some(ProblemId::from("two-sum")));
        assert_eq!(meta.title, "Two Sum");
        assert_eq!(meta.difficulty, Difficulty::Easy);
        assert_eq!(meta.extension, "py");
        assert_eq!(meta.statement_html, "<p>Return indices.</p>");

        let cached = extractor.cache().read(&ProblemId::from("two-sum")).unwrap();
        assert_eq!(cached.title, "Two Sum");
        assert_eq!(cached.difficulty, Difficulty::Easy);
        assert_eq!(cached.statement_html, "<p>Return indices.</p>");
        // Heuristic extension is not cached.
        assert_eq!(cached.extension, "");
    }

    #[tokio::test]
    async fn test_gather_without_code_is_none() {
        let page = StaticPage::new("/problems/two-sum")
            .with_node(selectors::TITLE[0], Node::text("Two Sum"));
        let (extractor, _, _) = setup(page);
        assert!(extractor.gather_metadata().await.is_none());
    }

    #[tokio::test]
    async fn test_gather_falls_back_to_cache_after_navigation_away() {
        let (extractor, page, _) = setup(two_sum_page());
        assert!(extractor.refresh_cache());

        // The question tab is gone; only the editor remains.
        page.remove_nodes(selectors::TITLE[0]);
        page.remove_nodes(selectors::STATEMENT);
        page.remove_nodes("[class*='difficulty']");

        let meta = extractor.gather_metadata().await.unwrap();
        assert_eq!(meta.title, "Two Sum");
        assert_eq!(meta.statement_html, "<p>Return indices.</p>");
        assert_eq!(meta.difficulty, Difficulty::Easy);
    }

    #[tokio::test]
    async fn test_prettified_title_not_cached() {
        let page = StaticPage::new("/problems/valid-anagram").with_editor(
            EditorEngine::Monaco,
            EditorModel {
                value: "function isAnagram(s, t) {}".into(),
                language: Some("node".into()),
            },
        );
        let (extractor, _, _) = setup(page);

        let meta = extractor.gather_metadata().await.unwrap();
        assert_eq!(meta.title, "Valid Anagram");
        assert_eq!(meta.difficulty, Difficulty::Uncategorized);
        assert_eq!(meta.extension, "js");
        assert_eq!(meta.language_id.as_deref(), Some("javascript"));

        let cached = extractor
            .cache()
            .read(&ProblemId::from("valid-anagram"))
            .unwrap_or_default();
        assert_eq!(cached.title, "");
        assert_eq!(cached.extension, "js");
    }

    #[tokio::test]
    async fn test_cached_difficulty_short_circuits_page_search() {
        let page = StaticPage::new("/problems/two-sum").with_body_text("Hard");
        let (extractor, _, _) = setup(page);
        extractor
            .cache()
            .patch(
                &ProblemId::from("two-sum"),
                FactsPatch {
                    difficulty: Some(Difficulty::Medium),
                    ..Default::default()
                },
            )
            .unwrap();

        // A page search would take at least one poll; a long wait proves it never starts.
        let extractor = Extractor {
            timings: Timings {
                difficulty_wait_ms: 60_000,
                ..fast_timings()
            },
            ..extractor
        };
        let difficulty = tokio::time::timeout(
            Duration::from_millis(50),
            extractor.difficulty_for_current_problem(),
        )
        .await
        .unwrap();
        assert_eq!(difficulty, Difficulty::Medium);
    }

    #[tokio::test]
    async fn test_detected_difficulty_is_cached() {
        let page = StaticPage::new("/problems/lru-cache")
            .with_node(".breadcrumb li", Node::text("Medium"));
        let (extractor, _, _) = setup(page);

        assert_eq!(
            extractor.difficulty_for_current_problem().await,
            Difficulty::Medium
        );
        let cached: ProblemFacts = extractor
            .cache()
            .read(&ProblemId::from("lru-cache"))
            .unwrap();
        assert_eq!(cached.difficulty, Difficulty::Medium);
    }

    #[tokio::test]
    async fn test_gather_after_teardown() {
        let (extractor, _, lifecycle) = setup(two_sum_page());
        lifecycle.teardown();
        assert!(extractor.gather_metadata().await.is_none());
        assert!(!extractor.refresh_cache());
    }

    #[test]
    fn test_refresh_outside_problem_page() {
        let (extractor, _, _) = setup(StaticPage::new("/roadmap"));
        assert!(!extractor.refresh_cache());
    }
}
