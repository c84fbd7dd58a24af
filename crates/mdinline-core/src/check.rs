//! Bold marker spacing lint.
//!
//! Some Markdown renderers only recognize `**bold**` when the markers are
//! delimited by whitespace or punctuation. This check flags lines where a
//! bold run touches other text directly.

use std::sync::LazyLock;

use regex::Regex;

static BOLD_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\*\*[^*\n]+\*\*").unwrap());

/// CJK punctuation that may touch a bold marker.
const ALLOWED_PUNCTUATION: &str = "，。！？；：“”、";

/// A line with a bold run that isn't properly delimited.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoldIssue {
    /// 1-based line number.
    pub line_number: usize,
    /// Full line text.
    pub content: String,
}

/// Report lines where a `**bold**` run touches a non-delimiter character.
#[must_use]
pub fn check_bold_spacing(text: &str) -> Vec<BoldIssue> {
    text.lines()
        .enumerate()
        .filter(|(_, line)| has_bold_issue(line))
        .map(|(i, line)| BoldIssue {
            line_number: i + 1,
            content: line.to_owned(),
        })
        .collect()
}

fn has_bold_issue(line: &str) -> bool {
    BOLD_RE.find_iter(line).any(|m| {
        let before = line[..m.start()].chars().next_back();
        let after = line[m.end()..].chars().next();
        !is_delimiter(before) || !is_delimiter(after)
    })
}

fn is_delimiter(c: Option<char>) -> bool {
    c.is_none_or(|c| c.is_whitespace() || c == '*' || ALLOWED_PUNCTUATION.contains(c))
}
