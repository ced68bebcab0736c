//! Matching-and-response engine for NoahAid.
//!
//! Given free text, picks at most one first-aid topic from a fixed knowledge
//! base, emphasizes the trigger keywords in each step, and delivers the steps
//! after a simulated typing delay (`Session::submit`).

pub mod conversation;
pub mod highlight;
pub mod knowledge_base;
pub mod matcher;
pub mod scheduler;
pub mod session;

pub use conversation::ConversationState;
pub use highlight::highlight;
pub use knowledge_base::KnowledgeBase;
pub use matcher::{find_match, find_match_with};
pub use scheduler::{ManualScheduler, Scheduler, Task, TokioScheduler};
pub use session::{Session, SubmitOutcome};
