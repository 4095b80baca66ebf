//! Query-time retrieval

pub mod search;

pub use search::{RetrieveOptions, Retriever};
