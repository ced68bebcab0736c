//! Keyword emphasis for reply steps.
//!
//! Keywords are applied one after another in list order, each over the text
//! that earlier keywords left unemphasized. Text already emphasized is never
//! split or wrapped a second time, so a keyword that is a substring of an
//! earlier one cannot produce nested emphasis.

use noahaid_shared::{RichText, Span};
use regex::{Regex, RegexBuilder};

/// Emphasize every case-insensitive occurrence of each keyword in `text`.
///
/// Matched text keeps its casing.
pub fn highlight<S: AsRef<str>>(text: &str, keywords: &[S]) -> RichText {
    let mut spans = vec![Span::Plain(text.to_string())];

    for keyword in keywords {
        let Some(re) = keyword_pattern(keyword.as_ref()) else {
            continue;
        };
        spans = spans
            .into_iter()
            .flat_map(|span| match span {
                Span::Plain(t) => split_on(&re, &t),
                emphasis => vec![emphasis],
            })
            .collect();
    }

    RichText::from(spans)
}

fn keyword_pattern(keyword: &str) -> Option<Regex> {
    if keyword.is_empty() {
        return None;
    }
    // Escaped literal, so it can only fail on size limits.
    RegexBuilder::new(&regex::escape(keyword))
        .case_insensitive(true)
        .build()
        .ok()
}

fn split_on(re: &Regex, text: &str) -> Vec<Span> {
    let mut out = Vec::new();
    let mut last = 0;

    for m in re.find_iter(text) {
        if m.start() > last {
            out.push(Span::Plain(text[last..m.start()].to_string()));
        }
        out.push(Span::Emphasis(m.as_str().to_string()));
        last = m.end();
    }
    if last < text.len() {
        out.push(Span::Plain(text[last..].to_string()));
    }

    out
}
