// Host page abstraction.
// The DOM contract the extractor depends on, plus a static page for tests and the CLI.

use std::collections::{BTreeMap, HashMap};

use parking_lot::RwLock;

/// Selector families the capture engine reads from the host page.
///
/// A change to any of these on the host side is a compatibility break.
pub mod selectors {
    pub const TITLE: &[&str] = &[
        ".question-tab .flex-container-row h1",
        "[data-testid='problem-title']",
    ];
    pub const STATEMENT: &str = "app-prompt app-article";
    /// Interactive controls removed from the statement before serialization.
    pub const STATEMENT_CONTROLS: &[&str] =
        &["button", ".copy-button", ".copy-code-button", ".copy-text"];

    pub const DIFFICULTY_INDICATORS: &[&str] = &[
        ".difficulty-btn",
        ".difficulty-chip",
        ".tag-difficulty",
        "[data-difficulty]",
        "[aria-label*='Difficulty']",
        "[class*='difficulty']",
        "[data-testid='difficulty']",
        ".question-tab .flex-container-row",
    ];
    pub const BREADCRUMBS: &[&str] = &[
        ".breadcrumb li",
        "nav[aria-label='breadcrumb'] li",
        ".breadcrumbs li",
    ];
    pub const TAGS: &[&str] = &[
        ".tag-list .tag",
        ".chip",
        ".badge",
        "[class*='chip']",
        "[class*='badge']",
    ];

    pub const RENDERED_LINES: &str = ".view-line";
    pub const TEXT_INPUT: &str = "textarea";
    pub const LANGUAGE_DROPDOWN: &[&str] =
        &[".dropdown-item.selected-item", "[data-testid='lang-select']"];
    pub const LANGUAGE_BADGE: &[&str] = &["[data-language]", ".language-badge", ".lang-label"];

    pub const SUBMIT: &str = "button.button.is-success[data-tooltip*='Enter']";
    pub const SYNC_BUTTON_ID: &str = "push-gh-btn";
}

/// Snapshot of one element as read from the page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Node {
    pub text: String,
    pub inner_html: String,
    /// Form control value, for inputs and text areas.
    pub value: Option<String>,
    pub attributes: BTreeMap<String, String>,
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        let text = text.into();
        Self {
            inner_html: text.clone(),
            text,
            ..Default::default()
        }
    }

    pub fn html(inner_html: impl Into<String>) -> Self {
        Self {
            inner_html: inner_html.into(),
            ..Default::default()
        }
    }

    pub fn with_attr(mut self, name: &str, value: impl Into<String>) -> Self {
        self.attributes.insert(name.to_string(), value.into());
        self
    }

    pub fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = Some(value.into());
        self
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}

/// Code editor engines the page may embed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorEngine {
    CodeMirror,
    Monaco,
}

/// Editor contents and the language it reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EditorModel {
    pub value: String,
    pub language: Option<String>,
}

/// Identity of one DOM element instance. A re-render produces a new id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(pub u64);

/// Read access to the host page plus the two mutations the engine performs.
pub trait Page: Send + Sync {
    /// Current location, including query string.
    fn href(&self) -> String;

    /// First element matching the selector.
    fn query(&self, selector: &str) -> Option<Node>;

    fn query_all(&self, selector: &str) -> Vec<Node>;

    /// Rendered text of the whole document body.
    fn body_text(&self) -> String;

    fn editor(&self, engine: EditorEngine) -> Option<EditorModel>;

    /// Mount the sync button after the title heading.
    ///
    /// Returns `false` when it is already mounted or there is nowhere to put it.
    fn inject_sync_affordance(&self) -> bool;

    /// The submit control currently in the document, if rendered.
    fn submit_affordance(&self) -> Option<ElementId>;
}

#[derive(Debug, Default)]
struct StaticState {
    href: String,
    nodes: HashMap<String, Vec<Node>>,
    body_text: String,
    editors: HashMap<EditorEngine, EditorModel>,
    submit: Option<ElementId>,
    injections: usize,
}

/// Page whose content is set explicitly rather than rendered by a browser.
///
/// Selectors are matched verbatim against the keys they were registered under.
#[derive(Debug, Default)]
pub struct StaticPage {
    state: RwLock<StaticState>,
}

impl StaticPage {
    pub fn new(href: impl Into<String>) -> Self {
        let page = Self::default();
        page.state.write().href = href.into();
        page
    }

    pub fn with_node(self, selector: &str, node: Node) -> Self {
        self.push_node(selector, node);
        self
    }

    pub fn with_editor(self, engine: EditorEngine, model: EditorModel) -> Self {
        self.set_editor(engine, Some(model));
        self
    }

    pub fn with_body_text(self, text: impl Into<String>) -> Self {
        self.state.write().body_text = text.into();
        self
    }

    pub fn with_submit(self, id: ElementId) -> Self {
        self.set_submit(Some(id));
        self
    }

    pub fn push_node(&self, selector: &str, node: Node) {
        self.state
            .write()
            .nodes
            .entry(selector.to_string())
            .or_default()
            .push(node);
    }

    pub fn remove_nodes(&self, selector: &str) {
        self.state.write().nodes.remove(selector);
    }

    pub fn set_editor(&self, engine: EditorEngine, model: Option<EditorModel>) {
        let mut state = self.state.write();
        match model {
            Some(model) => state.editors.insert(engine, model),
            None => state.editors.remove(&engine),
        };
    }

    /// Render or remove the submit control. Each id is a distinct element instance.
    pub fn set_submit(&self, id: Option<ElementId>) {
        let mut state = self.state.write();
        state.submit = id;
        match id {
            Some(_) => {
                let button = Node::text("Submit").with_attr("data-tooltip", "Ctrl+Enter");
                state.nodes.insert(selectors::SUBMIT.to_string(), vec![button]);
            }
            None => {
                state.nodes.remove(selectors::SUBMIT);
            }
        }
    }

    /// Simulate an in-app navigation: new location, fresh document content.
    pub fn navigate(&self, href: impl Into<String>) {
        let mut state = self.state.write();
        state.href = href.into();
        state.nodes.clear();
        state.submit = None;
    }

    /// How many times the sync button has been mounted.
    pub fn injections(&self) -> usize {
        self.state.read().injections
    }
}

impl Page for StaticPage {
    fn href(&self) -> String {
        self.state.read().href.clone()
    }

    fn query(&self, selector: &str) -> Option<Node> {
        self.state
            .read()
            .nodes
            .get(selector)
            .and_then(|nodes| nodes.first().cloned())
    }

    fn query_all(&self, selector: &str) -> Vec<Node> {
        self.state
            .read()
            .nodes
            .get(selector)
            .cloned()
            .unwrap_or_default()
    }

    fn body_text(&self) -> String {
        self.state.read().body_text.clone()
    }

    fn editor(&self, engine: EditorEngine) -> Option<EditorModel> {
        self.state.read().editors.get(&engine).cloned()
    }

    fn inject_sync_affordance(&self) -> bool {
        let mut state = self.state.write();
        let key = format!("#{}", selectors::SYNC_BUTTON_ID);
        let anchored = state.nodes.contains_key(selectors::TITLE[0]);
        if state.nodes.contains_key(&key) || !anchored {
            return false;
        }
        let button = Node::text("Push to GitHub").with_attr("id", selectors::SYNC_BUTTON_ID);
        state.nodes.insert(key, vec![button]);
        state.injections += 1;
        true
    }

    fn submit_affordance(&self) -> Option<ElementId> {
        let state = self.state.read();
        state.submit.filter(|_| state.nodes.contains_key(selectors::SUBMIT))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_static_page_queries() {
        let page = StaticPage::new("/problems/two-sum")
            .with_node(".chip", Node::text("Arrays"))
            .with_node(".chip", Node::text("Easy"))
            .with_node("[data-difficulty]", Node::default().with_attr("data-difficulty", "hard"));

        assert_eq!(page.query(".chip").unwrap().text, "Arrays");
        assert_eq!(page.query_all(".chip").len(), 2);
        assert_eq!(
            page.query("[data-difficulty]").unwrap().attr("data-difficulty"),
            Some("hard")
        );
        assert!(page.query(".missing").is_none());
    }

    #[test]
    fn test_inject_once_per_document() {
        let page = StaticPage::new("/problems/two-sum");
        assert!(!page.inject_sync_affordance());

        page.push_node(selectors::TITLE[0], Node::text("Two Sum"));
        assert!(page.inject_sync_affordance());
        assert!(!page.inject_sync_affordance());
        assert!(page.query("#push-gh-btn").is_some());

        page.navigate("/problems/3sum");
        page.push_node(selectors::TITLE[0], Node::text("3Sum"));
        assert!(page.inject_sync_affordance());
        assert_eq!(page.injections(), 2);
    }

    #[test]
    fn test_submit_rendered_until_navigation() {
        let page = StaticPage::new("/problems/two-sum").with_submit(ElementId(3));
        assert_eq!(page.submit_affordance(), Some(ElementId(3)));
        assert!(page.query(selectors::SUBMIT).is_some());

        page.navigate("/problems/two-sum?tab=submissions");
        assert_eq!(page.submit_affordance(), None);
    }
}
