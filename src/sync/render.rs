// Rendering of the files written for one problem.
// Path layout, statement document, commit messages, and content encoding.

use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::extract::Metadata;
use crate::extract::title::DEFAULT_TITLE;

static PATH_UNSAFE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[/\\\s]+").expect("path pattern is valid"));

pub const STATEMENT_PLACEHOLDER: &str =
    "*(Problem statement not captured. Open the Question tab once to cache it.)*";

/// Replace path separators and whitespace runs with a single underscore.
///
/// Input with nothing usable left (only separators or dots) becomes the
/// default title, so a path never gets an empty or relative segment.
pub fn sanitize_segment(raw: &str) -> String {
    let cleaned = PATH_UNSAFE.replace_all(raw.trim(), "_");
    if cleaned.trim_matches(['_', '.']).is_empty() {
        return DEFAULT_TITLE.to_string();
    }
    cleaned.into_owned()
}

/// Base64 of the UTF-8 bytes, as the contents API expects.
pub fn encode_content(text: &str) -> String {
    STANDARD.encode(text.as_bytes())
}

/// Markdown page: linked title followed by the statement or a placeholder.
pub fn statement_document(meta: &Metadata) -> String {
    let heading = format!("# [{}]({})", meta.title, meta.href);
    if meta.statement_html.trim().is_empty() {
        format!("{}\n\n{}", heading, STATEMENT_PLACEHOLDER)
    } else {
        format!("{}\n\n{}", heading, meta.statement_html)
    }
}

/// One file to upsert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedFile {
    pub path: String,
    /// Base64-encoded contents.
    pub content: String,
    pub message: String,
}

/// The three files for a problem, in write order: code, statement, notes.
pub fn plan_files(meta: &Metadata) -> Vec<PlannedFile> {
    let category = sanitize_segment(meta.difficulty.as_str());
    let safe_title = sanitize_segment(&meta.title);
    let base = format!("{}/{}", category, safe_title);
    let language = meta.language_id.as_deref().unwrap_or(&meta.extension);

    vec![
        PlannedFile {
            path: format!("{}/{}.{}", base, safe_title, meta.extension),
            content: encode_content(&meta.code),
            message: format!("add/update: {} ({})", meta.title, language),
        },
        PlannedFile {
            path: format!("{}/{}.md", base, safe_title),
            content: encode_content(&statement_document(meta)),
            message: format!("add/update: statement for {}", meta.title),
        },
        PlannedFile {
            path: format!("{}/notes.md", base),
            content: encode_content(""),
            message: format!("add/update: notes for {}", meta.title),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::{Difficulty, ProblemId};

    fn meta() -> Metadata {
        Metadata {
            id: Some(ProblemId::from("two-sum")),
            href: "https://neetcode.io/problems/two-sum".into(),
            code: "def twoSum(): ✓".into(),
            title: "Two Sum".into(),
            statement_html: String::new(),
            difficulty: Difficulty::Easy,
            language_id: None,
            extension: "py".into(),
        }
    }

    #[test]
    fn test_sanitize_segment() {
        assert_eq!(sanitize_segment("Two Sum / Easy Version"), "Two_Sum_Easy_Version");
        assert_eq!(sanitize_segment("a\\b\t\tc"), "a_b_c");
        assert_eq!(sanitize_segment("Valid Sudoku"), "Valid_Sudoku");
    }

    #[test]
    fn test_plan_paths() {
        let files = plan_files(&meta());
        let paths: Vec<_> = files.iter().map(|f| f.path.as_str()).collect();
        assert_eq!(
            paths,
            [
                "Easy/Two_Sum/Two_Sum.py",
                "Easy/Two_Sum/Two_Sum.md",
                "Easy/Two_Sum/notes.md"
            ]
        );
        assert_eq!(files[0].message, "add/update: Two Sum (py)");
        assert_eq!(files[2].content, "");
    }

    #[test]
    fn test_separator_only_title_uses_default() {
        assert_eq!(sanitize_segment("/"), "Solution");
        assert_eq!(sanitize_segment("   "), "Solution");
        assert_eq!(sanitize_segment(".."), "Solution");

        let files = plan_files(&Metadata {
            title: " / ".into(),
            ..meta()
        });
        assert_eq!(files[0].path, "Easy/Solution/Solution.py");
    }

    #[test]
    fn test_code_is_utf8_base64() {
        let files = plan_files(&meta());
        let decoded = STANDARD.decode(&files[0].content).unwrap();
        assert_eq!(String::from_utf8(decoded).unwrap(), "def twoSum(): ✓");
    }

    #[test]
    fn test_statement_document() {
        let mut m = meta();
        assert_eq!(
            statement_document(&m),
            format!(
                "# [Two Sum](https://neetcode.io/problems/two-sum)\n\n{}",
                STATEMENT_PLACEHOLDER
            )
        );

        m.statement_html = "<p>Given an array</p>".into();
        assert!(statement_document(&m).ends_with("\n\n<p>Given an array</p>"));
    }
}
