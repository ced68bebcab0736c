//! "Chat" screen — the conversation log, typing indicator, and input box.

use crossterm::event::{KeyCode, KeyModifiers};
use noahaid_core::{Session, SubmitOutcome};
use ratatui::prelude::*;
use ratatui::widgets::{Block, Borders, Paragraph, Wrap};

use crate::widgets::{rich_lines, wrapped_height};

pub(crate) struct ChatScreen {
    session: Session,
    input: String,
    assistant_name: String,
}

impl ChatScreen {
    pub(crate) fn new(session: Session, assistant_name: impl Into<String>) -> Self {
        Self {
            session,
            input: String::new(),
            assistant_name: assistant_name.into(),
        }
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }

    /// Whether keystrokes should go to the input box rather than global bindings.
    pub(crate) fn is_editing(&self) -> bool {
        !self.input.is_empty()
    }

    pub(crate) fn draw(&self, f: &mut Frame, area: Rect) {
        let input_rows = u16::try_from(self.input.split('\n').count())
            .unwrap_or(u16::MAX)
            .clamp(1, 5);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(1),                 // Conversation
                Constraint::Length(input_rows + 2), // Input
            ])
            .split(area);

        self.draw_conversation(f, chunks[0]);

        let input = Paragraph::new(self.input.as_str())
            .wrap(Wrap { trim: false })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .title(" Describe what happened (Enter to send, Shift+Enter for newline) "),
            );
        f.render_widget(input, chunks[1]);
    }

    fn draw_conversation(&self, f: &mut Frame, area: Rect) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.assistant_name));
        let inner = block.inner(area);

        let lines = self.conversation_lines();
        let overflow = wrapped_height(&lines, inner.width).saturating_sub(usize::from(inner.height));
        let scroll = u16::try_from(overflow).unwrap_or(u16::MAX);

        let pane = Paragraph::new(lines)
            .wrap(Wrap { trim: false })
            .scroll((scroll, 0))
            .block(block);
        f.render_widget(pane, area);
    }

    fn conversation_lines(&self) -> Vec<Line<'static>> {
        let state = self.session.snapshot();
        let mut lines = Vec::new();

        for msg in state.messages() {
            let (style, alignment) = if msg.is_user() {
                (Style::default().fg(Color::White), Alignment::Right)
            } else {
                (Style::default().fg(Color::Cyan), Alignment::Left)
            };
            lines.extend(
                rich_lines(&msg.text, style)
                    .into_iter()
                    .map(|l| l.alignment(alignment)),
            );
            lines.push(Line::default());
        }

        if state.is_composing() {
            lines.push(
                Line::from(format!("{} is typing...", self.assistant_name)).style(
                    Style::default()
                        .fg(Color::DarkGray)
                        .add_modifier(Modifier::ITALIC),
                ),
            );
        }

        lines
    }

    /// Handle a key press. Returns a status message when something was sent.
    pub(crate) fn handle_key(&mut self, code: KeyCode, modifiers: KeyModifiers) -> Option<String> {
        match code {
            KeyCode::Enter if modifiers.contains(KeyModifiers::SHIFT) => {
                self.input.push('\n');
                None
            }
            KeyCode::Enter => self.send(),
            KeyCode::Backspace => {
                self.input.pop();
                None
            }
            KeyCode::Char(c) => {
                self.input.push(c);
                None
            }
            _ => None,
        }
    }

    fn send(&mut self) -> Option<String> {
        match self.session.submit(&self.input) {
            // Blank input stays in the box untouched.
            SubmitOutcome::Ignored => None,
            SubmitOutcome::Matched { topic_id, replies } => {
                self.input.clear();
                Some(format!("Matched '{topic_id}' ({replies} steps)"))
            }
            SubmitOutcome::NoMatch => {
                self.input.clear();
                Some("No matching topic".to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use super::*;
    use noahaid_core::{KnowledgeBase, ManualScheduler};
    use noahaid_shared::ResponderSettings;

    fn screen() -> (ChatScreen, ManualScheduler) {
        let sched = ManualScheduler::new();
        let kb = KnowledgeBase::bundled().expect("bundled table");
        let session = Session::new(kb, ResponderSettings::default(), Arc::new(sched.clone()));
        (ChatScreen::new(session, "NoahAid"), sched)
    }

    fn type_text(screen: &mut ChatScreen, text: &str) {
        for c in text.chars() {
            screen.handle_key(KeyCode::Char(c), KeyModifiers::NONE);
        }
    }

    #[test]
    fn enter_sends_and_clears_input() {
        let (mut screen, sched) = screen();
        type_text(&mut screen, "it burns");
        assert!(screen.is_editing());

        let status = screen.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(status.as_deref(), Some("Matched 'burn' (5 steps)"));
        assert!(!screen.is_editing());
        assert!(screen.session().is_composing());

        let typing = screen.conversation_lines();
        assert!(typing.last().is_some_and(|l| l.to_string().contains("NoahAid is typing")));

        sched.advance(Duration::from_millis(800));
        assert_eq!(screen.session().snapshot().len(), 6);
        let lines = screen.conversation_lines();
        assert!(!lines.iter().any(|l| l.to_string().contains("is typing")));
    }

    #[test]
    fn blank_enter_keeps_input() {
        let (mut screen, sched) = screen();
        type_text(&mut screen, "   ");
        assert_eq!(screen.handle_key(KeyCode::Enter, KeyModifiers::NONE), None);
        assert_eq!(screen.input, "   ");
        assert!(screen.session().snapshot().is_empty());
        assert_eq!(sched.pending(), 0);
    }

    #[test]
    fn shift_enter_inserts_newline() {
        let (mut screen, _sched) = screen();
        type_text(&mut screen, "hot");
        screen.handle_key(KeyCode::Enter, KeyModifiers::SHIFT);
        type_text(&mut screen, "pan");
        assert_eq!(screen.input, "hot\npan");
        assert!(screen.session().snapshot().is_empty());
    }

    #[test]
    fn backspace_edits_input() {
        let (mut screen, _sched) = screen();
        type_text(&mut screen, "cprx");
        screen.handle_key(KeyCode::Backspace, KeyModifiers::NONE);
        assert_eq!(screen.input, "cpr");
    }

    #[test]
    fn fallback_is_reported() {
        let (mut screen, _sched) = screen();
        type_text(&mut screen, "purple elephant");
        let status = screen.handle_key(KeyCode::Enter, KeyModifiers::NONE);
        assert_eq!(status.as_deref(), Some("No matching topic"));
    }
}
