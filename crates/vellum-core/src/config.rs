use std::path::Path;

use anyhow::{Context, bail};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub ingest: IngestConfig,
    pub store: StoreConfig,
    pub embedding: EmbeddingConfig,
}

#[derive(Debug, Deserialize)]
pub struct IngestConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    pub max_file_size: u64,
}

#[derive(Debug, Deserialize)]
pub struct StoreConfig {
    pub backend: StoreBackend,
    pub qdrant_url: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Qdrant,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct EmbeddingConfig {
    pub base_url: String,
    pub model: String,
    pub dimension: u64,
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("VELLUM_STORE_BACKEND") {
            match v.as_str() {
                "qdrant" => self.store.backend = StoreBackend::Qdrant,
                "memory" => self.store.backend = StoreBackend::Memory,
                _ => {}
            }
        }
        if let Ok(v) = std::env::var("VELLUM_QDRANT_URL") {
            self.store.qdrant_url = v;
        }
        if let Ok(v) = std::env::var("VELLUM_EMBEDDING_BASE_URL") {
            self.embedding.base_url = v;
        }
        if let Ok(v) = std::env::var("VELLUM_EMBEDDING_MODEL") {
            self.embedding.model = v;
        }
    }

    /// Check inter-field constraints that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns an error when a field combination cannot produce valid chunks
    /// or vectors.
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ingest.chunk_size == 0 {
            bail!("ingest.chunk_size must be greater than zero");
        }
        if self.ingest.chunk_overlap >= self.ingest.chunk_size {
            bail!(
                "ingest.chunk_overlap ({}) must be smaller than ingest.chunk_size ({})",
                self.ingest.chunk_overlap,
                self.ingest.chunk_size
            );
        }
        if self.embedding.dimension == 0 {
            bail!("embedding.dimension must be greater than zero");
        }
        Ok(())
    }

    fn default() -> Self {
        Self {
            ingest: IngestConfig {
                chunk_size: 500,
                chunk_overlap: 50,
                max_file_size: 50 * 1024 * 1024,
            },
            store: StoreConfig {
                backend: StoreBackend::Qdrant,
                qdrant_url: "http://localhost:6334".into(),
            },
            embedding: EmbeddingConfig {
                base_url: "http://localhost:11434".into(),
                model: "nomic-embed-text".into(),
                dimension: 768,
            },
        }
    }
}
