// Per-session vector index and similarity search.

pub mod index;

pub use index::{IndexError, VectorIndex};
