// Language and file extension detection.
// Prefers the editor-reported language; falls back to ordered content heuristics.

use regex::Regex;

use crate::page::{EditorEngine, Page, selectors};

use super::poll::first_present;

/// Extension used when neither the page nor the code gives anything away.
pub const FALLBACK_EXTENSION: &str = "txt";

/// Canonicalize a page-reported language identifier.
pub fn normalize_language_id(id: &str) -> String {
    let s = id.trim().to_lowercase();
    match s.as_str() {
        "node" | "ecmascript" | "es6" => "javascript".to_string(),
        "typescriptreact" => "typescript".to_string(),
        "python3" => "python".to_string(),
        "c++" | "c/c++" | "cpp17" | "cxx" => "cpp".to_string(),
        _ => s,
    }
}

/// File suffix for a normalized language identifier.
pub fn extension_for(language: &str) -> Option<&'static str> {
    Some(match language {
        "javascript" => "js",
        "typescript" => "ts",
        "python" | "python3" => "py",
        "java" => "java",
        "c++" | "cpp" => "cpp",
        "c" => "c",
        "go" | "golang" => "go",
        "rust" => "rs",
        "kotlin" => "kt",
        "swift" => "swift",
        _ => return None,
    })
}

/// Places on the page that may report the active language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LanguageSource {
    Monaco,
    CodeMirror,
    Dropdown,
    Badge,
}

pub const LANGUAGE_SOURCES: &[LanguageSource] = &[
    LanguageSource::Monaco,
    LanguageSource::CodeMirror,
    LanguageSource::Dropdown,
    LanguageSource::Badge,
];

impl LanguageSource {
    /// Raw identifier as the page reports it.
    pub fn read(&self, page: &dyn Page) -> Option<String> {
        let raw = match self {
            LanguageSource::Monaco => page.editor(EditorEngine::Monaco)?.language?,
            LanguageSource::CodeMirror => page.editor(EditorEngine::CodeMirror)?.language?,
            LanguageSource::Dropdown => {
                let node = first_present(page, selectors::LANGUAGE_DROPDOWN)?;
                if node.text.trim().is_empty() {
                    node.value?
                } else {
                    node.text
                }
            }
            LanguageSource::Badge => {
                let node = first_present(page, selectors::LANGUAGE_BADGE)?;
                node.attr("data-language")
                    .map(str::to_string)
                    .unwrap_or(node.text)
            }
        };
        (!raw.trim().is_empty()).then_some(raw)
    }
}

/// Content pattern that implies a file extension.
#[derive(Debug, Clone)]
pub struct CodeHeuristic {
    pub name: &'static str,
    pub pattern: Regex,
    pub extension: &'static str,
}

impl CodeHeuristic {
    fn new(name: &'static str, pattern: &str, extension: &'static str) -> Self {
        Self {
            name,
            pattern: Regex::new(pattern).expect("heuristic pattern is valid"),
            extension,
        }
    }
}

/// Result of language detection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageGuess {
    /// Normalized identifier reported by the page, if any.
    pub language_id: Option<String>,
    pub extension: String,
    /// True when the extension came from the page rather than a heuristic.
    pub authoritative: bool,
}

/// Ordered language detectors; the first hit wins.
#[derive(Debug, Clone)]
pub struct LanguageDetector {
    pub sources: Vec<LanguageSource>,
    pub heuristics: Vec<CodeHeuristic>,
    pub fallback: &'static str,
}

impl Default for LanguageDetector {
    fn default() -> Self {
        Self {
            sources: LANGUAGE_SOURCES.to_vec(),
            heuristics: vec![
                CodeHeuristic::new("include-directive", r"(?m)^\s*#include\s+<.*>", "cpp"),
                CodeHeuristic::new("java-import", r"(?m)^\s*import\s+java\.", "java"),
                CodeHeuristic::new("def-keyword", r"(?m)^\s*def\s+\w+", "py"),
                CodeHeuristic::new("script-tokens", r"(=>|function|\bconsole\.)", "js"),
            ],
            fallback: FALLBACK_EXTENSION,
        }
    }
}

impl LanguageDetector {
    /// Normalized language identifier from the first source that reports one.
    pub fn detect_language(&self, page: &dyn Page) -> Option<String> {
        self.sources
            .iter()
            .filter_map(|source| source.read(page))
            .map(|raw| normalize_language_id(&raw))
            .find(|id| !id.is_empty())
    }

    pub fn extension_from_code(&self, code: &str) -> &'static str {
        self.heuristics
            .iter()
            .find(|h| h.pattern.is_match(code))
            .map(|h| h.extension)
            .unwrap_or(self.fallback)
    }

    pub fn detect(&self, page: &dyn Page, code: &str) -> LanguageGuess {
        let language_id = self.detect_language(page);
        match language_id.as_deref().and_then(extension_for) {
            Some(ext) => LanguageGuess {
                extension: ext.to_string(),
                language_id,
                authoritative: true,
            },
            None => LanguageGuess {
                extension: self.extension_from_code(code).to_string(),
                language_id,
                authoritative: false,
            },
        }
    }
}
