//! Embedding providers behind a small trait, with enum dispatch for
//! injection into the store layer.

pub mod any;
pub mod error;
#[cfg(feature = "mock")]
pub mod mock;
pub mod ollama;
pub mod provider;

pub use any::AnyEmbedder;
pub use error::EmbedError;
#[cfg(feature = "mock")]
pub use mock::MockEmbedder;
pub use ollama::OllamaEmbedder;
pub use provider::{EmbedFuture, Embedder};
