use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use vellum_core::config::{Config, StoreBackend};
use vellum_core::{DocumentId, TenantId};
use vellum_embed::{AnyEmbedder, OllamaEmbedder};
use vellum_ingest::{ChunkerConfig, IngestionPipeline, PdfExtractor, TextChunker};
use vellum_store::{InMemoryVectorStore, QdrantVectorStore, TenantCollections, VectorStore};

#[derive(Parser)]
#[command(name = "vellum", version, about = "Multi-tenant PDF ingestion for retrieval")]
struct Cli {
    /// Path to the configuration file.
    #[arg(long, default_value = "vellum.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the retrieval collection for a newly registered tenant.
    Provision {
        #[arg(long)]
        tenant: i64,
    },
    /// Ingest a PDF document into a tenant's collection.
    Ingest {
        #[arg(long)]
        tenant: i64,
        #[arg(long)]
        document: i64,
        file: PathBuf,
    },
    /// Search a tenant's collection for the most similar chunks.
    Query {
        #[arg(long)]
        tenant: i64,
        #[arg(long, default_value_t = 5)]
        top_k: usize,
        text: String,
    },
    /// Check whether a file is a structurally sound PDF.
    Validate { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let cli = Cli::parse();
    let config = Config::load(&cli.config)?;
    config.validate()?;

    if let Command::Validate { file } = &cli.command {
        let extractor = PdfExtractor {
            max_file_size: config.ingest.max_file_size,
        };
        if extractor.validate(file) {
            println!("{}: valid PDF", file.display());
            return Ok(());
        }
        anyhow::bail!("{}: not a readable PDF", file.display());
    }

    let store: Arc<dyn VectorStore> = match config.store.backend {
        StoreBackend::Qdrant => Arc::new(
            QdrantVectorStore::new(&config.store.qdrant_url)
                .context("failed to connect to Qdrant")?,
        ),
        StoreBackend::Memory => Arc::new(InMemoryVectorStore::new()),
    };

    let embedder = AnyEmbedder::Ollama(OllamaEmbedder::new(
        &config.embedding.base_url,
        config.embedding.model.clone(),
        config.embedding.dimension,
    ));
    let collections = Arc::new(TenantCollections::new(
        store,
        Box::new(embedder.embed_fn()),
        config.embedding.dimension,
    ));

    match cli.command {
        Command::Provision { tenant } => {
            collections.create_collection(TenantId(tenant)).await?;
            println!("provisioned collection for tenant {tenant}");
        }
        Command::Ingest {
            tenant,
            document,
            file,
        } => {
            let pipeline = IngestionPipeline::new(
                PdfExtractor {
                    max_file_size: config.ingest.max_file_size,
                },
                TextChunker::new(ChunkerConfig {
                    chunk_size: config.ingest.chunk_size,
                    chunk_overlap: config.ingest.chunk_overlap,
                }),
                Arc::clone(&collections),
            );
            let report = pipeline
                .ingest(&file, TenantId(tenant), DocumentId(document))
                .await?;
            println!(
                "ingested {}: {} chunks across {} pages",
                file.display(),
                report.chunk_count,
                report.pages_processed
            );
        }
        Command::Query {
            tenant,
            top_k,
            text,
        } => {
            let results = collections.query(TenantId(tenant), &text, top_k).await?;
            if results.is_empty() {
                println!("no matches");
            }
            for chunk in results {
                let page = chunk
                    .page_number
                    .map_or_else(|| "?".to_owned(), |p| p.to_string());
                println!(
                    "[{:.3}] doc {} chunk {} page {}\n  {}",
                    chunk.score, chunk.document_id, chunk.chunk_index, page, chunk.text
                );
            }
        }
        Command::Validate { .. } => unreachable!("handled before store setup"),
    }

    Ok(())
}
