//! Session controller: the submit → delayed reply transition.
//!
//! A submit appends the user message and raises `composing` immediately,
//! picks the topic right away, and hands the reply to the [`Scheduler`].
//! When the delay elapses the reply messages are appended in one step and
//! `composing` drops back to false.
//!
//! All writes go through a single `watch` channel, so appends are
//! serialized and renderers can subscribe to fresh snapshots.

use std::path::Path;
use std::sync::Arc;

use noahaid_shared::{AppConfig, Message, ResponderSettings, Result, RichText};
use tokio::sync::watch;
use tracing::{debug, info, instrument};

use crate::conversation::ConversationState;
use crate::highlight::highlight;
use crate::knowledge_base::KnowledgeBase;
use crate::matcher::find_match_with;
use crate::scheduler::Scheduler;

/// What a call to [`Session::submit`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// Blank input; nothing was appended.
    Ignored,
    /// A topic matched; `replies` step messages are on their way.
    Matched { topic_id: String, replies: usize },
    /// Nothing matched; the fallback message is on its way.
    NoMatch,
}

/// One chat session over a fixed knowledge base.
pub struct Session {
    kb: Arc<KnowledgeBase>,
    settings: ResponderSettings,
    scheduler: Arc<dyn Scheduler>,
    state: Arc<watch::Sender<ConversationState>>,
}

impl Session {
    pub fn new(
        kb: KnowledgeBase,
        settings: ResponderSettings,
        scheduler: Arc<dyn Scheduler>,
    ) -> Self {
        let (tx, _rx) = watch::channel(ConversationState::new());
        Self {
            kb: Arc::new(kb),
            settings,
            scheduler,
            state: Arc::new(tx),
        }
    }

    /// Build a session from loaded config. `kb_override` takes precedence over
    /// `[knowledge_base].path`.
    pub fn from_config(
        config: &AppConfig,
        kb_override: Option<&Path>,
        scheduler: Arc<dyn Scheduler>,
    ) -> Result<Self> {
        let path = kb_override.or(config.knowledge_base.path.as_deref().map(Path::new));
        let kb = KnowledgeBase::resolve(path)?;
        Ok(Self::new(kb, ResponderSettings::from(config), scheduler))
    }

    pub fn knowledge_base(&self) -> &KnowledgeBase {
        &self.kb
    }

    pub fn settings(&self) -> &ResponderSettings {
        &self.settings
    }

    /// Submit user input.
    ///
    /// Blank input is ignored. Otherwise the raw text is logged as a user
    /// message, `composing` is set, and the reply is scheduled after the
    /// configured delay. Overlapping submits each complete independently.
    #[instrument(skip_all, fields(len = text.len()))]
    pub fn submit(&self, text: &str) -> SubmitOutcome {
        if text.trim().is_empty() {
            debug!("ignoring blank input");
            return SubmitOutcome::Ignored;
        }

        self.state.send_modify(|s| {
            s.push(Message::user(text));
            s.set_composing(true);
        });

        let found = find_match_with(text, self.kb.topics(), self.settings.title_match);
        let (outcome, replies) = match found {
            Some(topic) => {
                let replies: Vec<RichText> = topic
                    .steps
                    .iter()
                    .map(|step| highlight(step, &topic.keywords))
                    .collect();
                info!(topic = %topic.id, steps = replies.len(), "matched topic");
                (
                    SubmitOutcome::Matched {
                        topic_id: topic.id.clone(),
                        replies: replies.len(),
                    },
                    replies,
                )
            }
            None => {
                info!("no topic matched, sending fallback");
                (
                    SubmitOutcome::NoMatch,
                    vec![RichText::plain(self.settings.fallback_text.clone())],
                )
            }
        };

        let state = Arc::clone(&self.state);
        self.scheduler.schedule(
            self.settings.reply_delay,
            Box::new(move || {
                state.send_modify(|s| {
                    for reply in replies {
                        s.push(Message::assistant(reply));
                    }
                    s.set_composing(false);
                });
                debug!("reply delivered");
            }),
        );

        outcome
    }

    /// A copy of the current conversation.
    pub fn snapshot(&self) -> ConversationState {
        self.state.borrow().clone()
    }

    pub fn is_composing(&self) -> bool {
        self.state.borrow().is_composing()
    }

    /// Receive a notification on every change to the conversation.
    pub fn subscribe(&self) -> watch::Receiver<ConversationState> {
        self.state.subscribe()
    }

    /// Resolve once no reply is pending. Returns immediately when idle.
    pub async fn wait_idle(&self) {
        let mut rx = self.subscribe();
        // The sender lives as long as `self`, so this cannot fail.
        let _ = rx.wait_for(|s| !s.is_composing()).await;
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("topics", &self.kb.len())
            .field("settings", &self.settings)
            .finish()
    }
}
