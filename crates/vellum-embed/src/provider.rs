use crate::error::EmbedError;

/// Boxed embedding future produced by [`crate::AnyEmbedder::embed_fn`]
/// adapters.
pub type EmbedFuture =
    std::pin::Pin<Box<dyn Future<Output = Result<Vec<f32>, EmbedError>> + Send>>;

pub trait Embedder: Send + Sync {
    /// Embed a text into a dense vector.
    ///
    /// # Errors
    ///
    /// Returns an error if the provider cannot be reached or returns no
    /// vector.
    fn embed(&self, text: &str) -> impl Future<Output = Result<Vec<f32>, EmbedError>> + Send;

    /// Dimension of the vectors this embedder produces.
    fn dimension(&self) -> u64;

    fn name(&self) -> &'static str;
}
