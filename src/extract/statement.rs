// Problem statement extraction.
// Serializes the statement container with interactive controls removed.

use std::sync::LazyLock;

use regex::Regex;

use crate::page::{Page, selectors};

static OPEN_TAG: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"<([a-zA-Z][a-zA-Z0-9-]*)([^>]*)>").expect("open tag pattern is valid")
});

static CLASS_ATTR: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)\bclass\s*=\s*["']([^"']*)["']"#).expect("class pattern is valid")
});

/// Whether an opening tag matches one of the control selectors.
///
/// Supports bare tag names (`button`) and single classes (`.copy-button`).
fn is_control(tag: &str, attrs: &str, controls: &[&str]) -> bool {
    let classes = CLASS_ATTR
        .captures(attrs)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str())
        .unwrap_or("");
    controls.iter().any(|control| match control.strip_prefix('.') {
        Some(class) => classes.split_whitespace().any(|c| c == class),
        None => tag.eq_ignore_ascii_case(control),
    })
}

/// Offset just past the close tag matching an already-consumed open tag.
fn element_end(after: &str, tag: &str) -> Option<usize> {
    let pattern = Regex::new(&format!(r"(?i)<(/?){}\b[^>]*>", regex::escape(tag))).ok()?;
    let mut depth = 1usize;
    for caps in pattern.captures_iter(after) {
        let m = caps.get(0)?;
        if caps.get(1).is_some_and(|c| !c.as_str().is_empty()) {
            depth -= 1;
            if depth == 0 {
                return Some(m.end());
            }
        } else if !m.as_str().ends_with("/>") {
            depth += 1;
        }
    }
    None
}

/// Remove every element matching `controls`, including its children.
pub fn strip_controls(html: &str, controls: &[&str]) -> String {
    let mut out = String::with_capacity(html.len());
    let mut rest = html;

    while let Some(caps) = OPEN_TAG.captures(rest) {
        let Some(whole) = caps.get(0) else { break };
        let tag = caps.get(1).map_or("", |m| m.as_str());
        let attrs = caps.get(2).map_or("", |m| m.as_str());

        if !is_control(tag, attrs, controls) {
            out.push_str(&rest[..whole.end()]);
            rest = &rest[whole.end()..];
            continue;
        }

        out.push_str(&rest[..whole.start()]);
        let after = &rest[whole.end()..];
        rest = if attrs.trim_end().ends_with('/') {
            after
        } else {
            element_end(after, tag).map_or(after, |end| &after[end..])
        };
    }

    out.push_str(rest);
    out
}

/// Live statement HTML, or `None` when the container is absent or empty.
pub fn read_dom_statement(page: &dyn Page) -> Option<String> {
    let node = page.query(selectors::STATEMENT)?;
    let html = strip_controls(&node.inner_html, selectors::STATEMENT_CONTROLS);
    let html = html.trim();
    (!html.is_empty()).then(|| html.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::{Node, StaticPage};

    #[test]
    fn test_strip_buttons_and_copy_controls() {
        let html = r#"<p>Given <code>nums</code></p><pre><span class="copy-code-button x">Copy</span>a = 1</pre><button type="button"><i>c</i></button><p>End</p>"#;
        assert_eq!(
            strip_controls(html, selectors::STATEMENT_CONTROLS),
            "<p>Given <code>nums</code></p><pre>a = 1</pre><p>End</p>"
        );
    }

    #[test]
    fn test_strip_nested_same_tag() {
        let html = r#"<div class="copy-text"><div>inner</div>tail</div><div>keep</div>"#;
        assert_eq!(strip_controls(html, &[".copy-text"]), "<div>keep</div>");
    }

    #[test]
    fn test_similar_class_kept() {
        let html = r#"<span class="copy-buttons">ok</span>"#;
        assert_eq!(strip_controls(html, &[".copy-button"]), html);
    }

    #[test]
    fn test_read_dom_statement() {
        let page = StaticPage::new("/problems/x").with_node(
            selectors::STATEMENT,
            Node::html("  <p>Find pairs.</p><button>Copy</button>\n"),
        );
        assert_eq!(read_dom_statement(&page).unwrap(), "<p>Find pairs.</p>");

        let blank = StaticPage::new("/problems/x")
            .with_node(selectors::STATEMENT, Node::html("<button>Copy</button>"));
        assert!(read_dom_statement(&blank).is_none());
    }
}
