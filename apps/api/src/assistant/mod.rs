// Answer Synthesizer: history-aware chat over indexed resumes and
// job-description ranking. All model calls go through llm_client.

pub mod chat;
pub mod context;
pub mod handlers;
pub mod prompts;
pub mod ranking;
