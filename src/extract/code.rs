// Source code extraction.
// Reads the editor contents through an ordered list of strategies.

use crate::page::{EditorEngine, Page, selectors};

/// One way of reading the code the user wrote.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CodeSource {
    /// Primary rich-text editor value accessor.
    CodeMirror,
    /// Secondary editor engine model accessor.
    Monaco,
    /// Line-by-line reconstruction from rendered editor lines.
    RenderedLines,
    /// Plain text input fallback.
    TextInput,
}

/// Strategies in the order they are tried.
pub const CODE_SOURCES: &[CodeSource] = &[
    CodeSource::CodeMirror,
    CodeSource::Monaco,
    CodeSource::RenderedLines,
    CodeSource::TextInput,
];

impl CodeSource {
    pub fn read(&self, page: &dyn Page) -> Option<String> {
        let code = match self {
            CodeSource::CodeMirror => page.editor(EditorEngine::CodeMirror)?.value,
            CodeSource::Monaco => page.editor(EditorEngine::Monaco)?.value,
            CodeSource::RenderedLines => page
                .query_all(selectors::RENDERED_LINES)
                .into_iter()
                .map(|line| line.text)
                .collect::<Vec<_>>()
                .join("\n"),
            CodeSource::TextInput => page.query(selectors::TEXT_INPUT)?.value?,
        };
        (!code.trim().is_empty()).then_some(code)
    }
}

/// Code from the first strategy that yields non-blank text.
pub fn read_code(page: &dyn Page, sources: &[CodeSource]) -> Option<String> {
    sources.iter().find_map(|source| source.read(page))
}
