//! "Topics" screen — browse the knowledge base.

use crossterm::event::{KeyCode, KeyModifiers};
use noahaid_core::KnowledgeBase;
use noahaid_shared::{Severity, Topic};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, List, ListItem, Paragraph, Wrap};

pub(crate) struct TopicsScreen {
    topics: Vec<Topic>,
    selected: usize,
}

impl TopicsScreen {
    pub(crate) fn new(kb: &KnowledgeBase) -> Self {
        Self {
            topics: kb.topics().to_vec(),
            selected: 0,
        }
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .margin(1)
            .constraints([
                Constraint::Length(30), // Topic list
                Constraint::Min(1),    // Detail
            ])
            .split(area);

        let items: Vec<ListItem> = self
            .topics
            .iter()
            .enumerate()
            .map(|(i, topic)| {
                let style = if i == self.selected {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                let prefix = if i == self.selected { "▸ " } else { "  " };
                ListItem::new(format!("{prefix}{}", topic.title)).style(style)
            })
            .collect();

        let list = List::new(items).block(Block::default().borders(Borders::ALL).title(" Topics "));
        f.render_widget(list, chunks[0]);

        let Some(topic) = self.topics.get(self.selected) else {
            return;
        };

        let mut lines = vec![
            Line::from(vec![
                Span::raw("Severity: "),
                Span::styled(topic.severity.to_string(), severity_style(topic.severity)),
            ]),
            Line::from(format!("Keywords: {}", topic.keywords.join(", "))),
            Line::default(),
        ];
        lines.extend(
            topic
                .steps
                .iter()
                .enumerate()
                .map(|(i, step)| Line::from(format!("{}. {step}", i + 1))),
        );

        let detail = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(format!(" {} ", topic.title)),
            );
        f.render_widget(detail, chunks[1]);
    }

    pub(crate) fn handle_key(&mut self, code: KeyCode, _modifiers: KeyModifiers) {
        match code {
            KeyCode::Up | KeyCode::Char('k') => {
                self.selected = self.selected.saturating_sub(1);
            }
            KeyCode::Down | KeyCode::Char('j') => {
                if self.selected + 1 < self.topics.len() {
                    self.selected += 1;
                }
            }
            _ => {}
        }
    }
}

fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::High => Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        Severity::Medium => Style::default().fg(Color::Yellow),
        Severity::Low => Style::default().fg(Color::Green),
    }
}
