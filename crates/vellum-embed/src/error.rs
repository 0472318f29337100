#[derive(Debug, thiserror::Error)]
pub enum EmbedError {
    #[error("embedding request failed: {0}")]
    Request(String),

    #[error("empty embedding response from {provider}")]
    EmptyResponse { provider: &'static str },
}
