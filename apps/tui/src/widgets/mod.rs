//! Reusable TUI widgets.

use noahaid_shared::{RichText, Span as TextSpan};
use ratatui::prelude::*;
use ratatui::widgets::Paragraph;

/// Bottom status bar.
pub(crate) fn status_bar(msg: &str) -> Paragraph<'_> {
    Paragraph::new(format!(" {msg}"))
        .style(
            Style::default()
                .bg(Color::DarkGray)
                .fg(Color::White),
        )
}

/// Convert rich text into terminal lines, emphasis in bold.
///
/// Embedded newlines start a new line.
pub(crate) fn rich_lines(text: &RichText, base: Style) -> Vec<Line<'static>> {
    let mut lines = vec![Line::default()];

    for span in text.spans() {
        let style = match span {
            TextSpan::Plain(_) => base,
            TextSpan::Emphasis(_) => base.add_modifier(Modifier::BOLD),
        };
        for (i, part) in span.text().split('\n').enumerate() {
            if i > 0 {
                lines.push(Line::default());
            }
            if !part.is_empty() {
                if let Some(line) = lines.last_mut() {
                    line.push_span(Span::styled(part.to_string(), style));
                }
            }
        }
    }

    lines
}

/// Rows a set of lines occupies once wrapped to `width` columns (estimate).
pub(crate) fn wrapped_height(lines: &[Line<'_>], width: u16) -> usize {
    let width = usize::from(width.max(1));
    lines
        .iter()
        .map(|l| l.width().div_ceil(width).max(1))
        .sum()
}
