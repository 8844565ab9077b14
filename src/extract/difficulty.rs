// Difficulty detection.
// Searches prioritized page locations for an easy/medium/hard token.

use crate::config::Timings;
use crate::lifecycle::Lifecycle;
use crate::page::{Page, selectors};
use crate::problem::Difficulty;

use super::poll::wait_for;

/// One family of page locations that may carry the difficulty.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DifficultyProbe {
    /// Dedicated indicators; the `data-difficulty` attribute beats element text.
    Indicators(&'static [&'static str]),
    /// Breadcrumb-like navigation trails.
    Breadcrumbs(&'static [&'static str]),
    /// Generic tag and badge elements.
    Tags(&'static [&'static str]),
    /// Whole-page text.
    BodyText,
}

/// Probes in priority order.
pub const DIFFICULTY_PROBES: &[DifficultyProbe] = &[
    DifficultyProbe::Indicators(selectors::DIFFICULTY_INDICATORS),
    DifficultyProbe::Breadcrumbs(selectors::BREADCRUMBS),
    DifficultyProbe::Tags(selectors::TAGS),
    DifficultyProbe::BodyText,
];

impl DifficultyProbe {
    pub fn find(&self, page: &dyn Page) -> Option<Difficulty> {
        match self {
            DifficultyProbe::Indicators(sels) => sels.iter().find_map(|s| {
                let node = page.query(s)?;
                node.attr("data-difficulty")
                    .and_then(Difficulty::from_text)
                    .or_else(|| Difficulty::from_text(&node.text))
            }),
            DifficultyProbe::Breadcrumbs(sels) | DifficultyProbe::Tags(sels) => sels
                .iter()
                .flat_map(|s| page.query_all(s))
                .find_map(|node| Difficulty::from_text(&node.text)),
            DifficultyProbe::BodyText => Difficulty::from_text(&page.body_text()),
        }
    }
}

/// Single pass over the probes; the first match wins.
pub fn find_difficulty_once(page: &dyn Page, probes: &[DifficultyProbe]) -> Option<Difficulty> {
    probes.iter().find_map(|probe| probe.find(page))
}

/// Retry [`find_difficulty_once`] on a bounded poll.
pub async fn detect_difficulty(
    page: &dyn Page,
    probes: &[DifficultyProbe],
    lifecycle: &Lifecycle,
    timings: &Timings,
) -> Option<Difficulty> {
    wait_for(
        lifecycle,
        timings.difficulty_wait(),
        timings.poll_interval(),
        || find_difficulty_once(page, probes),
    )
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Node, StaticPage};

    #[test]
    fn test_indicator_attribute_beats_text() {
        let page = StaticPage::new("/problems/x").with_node(
            "[data-difficulty]",
            Node::text("Easy").with_attr("data-difficulty", "hard"),
        );
        assert_eq!(
            find_difficulty_once(&page, DIFFICULTY_PROBES),
            Some(Difficulty::Hard)
        );
    }

    #[test]
    fn test_priority_order() {
        let page = StaticPage::new("/problems/x")
            .with_node(".badge", Node::text("Hard"))
            .with_node(".breadcrumb li", Node::text("Problems"))
            .with_node(".breadcrumb li", Node::text("Medium"))
            .with_body_text("Easy");
        assert_eq!(
            find_difficulty_once(&page, DIFFICULTY_PROBES),
            Some(Difficulty::Medium)
        );
    }

    #[test]
    fn test_body_text_last_resort() {
        let page = StaticPage::new("/problems/x").with_body_text("Two Sum  Easy  Arrays");
        assert_eq!(
            find_difficulty_once(&page, DIFFICULTY_PROBES),
            Some(Difficulty::Easy)
        );
        let empty = StaticPage::new("/problems/x");
        assert_eq!(find_difficulty_once(&empty, DIFFICULTY_PROBES), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_detect_gives_up() {
        let page = StaticPage::new("/problems/x");
        let found =
            detect_difficulty(&page, DIFFICULTY_PROBES, &Lifecycle::new(), &Timings::default())
                .await;
        assert!(found.is_none());
    }
}
