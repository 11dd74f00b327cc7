pub mod chunk;
pub mod conversation;
pub mod document;

pub use chunk::{Chunk, SearchHit};
pub use conversation::{ChatMessage, ConversationTurn, Role};
pub use document::Document;
