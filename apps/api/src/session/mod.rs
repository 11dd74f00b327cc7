// Session Manager: per-user documents, vector index, and chat history.
// Sessions live in memory only and end on delete or process exit.

pub mod handlers;
pub mod indexer;
pub mod store;

pub use store::{SessionHandle, SessionStore};
