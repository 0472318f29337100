#[cfg(feature = "mock")]
use crate::mock::MockEmbedder;
use crate::ollama::OllamaEmbedder;
use crate::provider::{EmbedFuture, Embedder};

/// Generates a match over all `AnyEmbedder` variants, binding the inner
/// embedder and evaluating the given closure for each arm.
macro_rules! delegate_embedder {
    ($self:expr, |$e:ident| $expr:expr) => {
        match $self {
            AnyEmbedder::Ollama($e) => $expr,
            #[cfg(feature = "mock")]
            AnyEmbedder::Mock($e) => $expr,
        }
    };
}

#[derive(Debug, Clone)]
pub enum AnyEmbedder {
    Ollama(OllamaEmbedder),
    #[cfg(feature = "mock")]
    Mock(MockEmbedder),
}

impl AnyEmbedder {
    /// Return a cloneable closure that calls `embed()` on this embedder.
    pub fn embed_fn(&self) -> impl Fn(&str) -> EmbedFuture + Send + Sync + use<> {
        let embedder = std::sync::Arc::new(self.clone());
        move |text: &str| -> EmbedFuture {
            let e = std::sync::Arc::clone(&embedder);
            let owned = text.to_owned();
            Box::pin(async move { e.embed(&owned).await })
        }
    }
}

impl Embedder for AnyEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, crate::EmbedError> {
        delegate_embedder!(self, |e| e.embed(text).await)
    }

    fn dimension(&self) -> u64 {
        delegate_embedder!(self, |e| e.dimension())
    }

    fn name(&self) -> &'static str {
        delegate_embedder!(self, |e| e.name())
    }
}
