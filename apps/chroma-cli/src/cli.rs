//! Command-line surface

use std::path::PathBuf;
use std::str::FromStr;

use clap::{Args, Parser, Subcommand};
use domain_vector::chroma::{DEFAULT_CHROMA_URL, DEFAULT_DATABASE, DEFAULT_TENANT};
use domain_vector::embedding::{DEFAULT_OPENAI_BASE_URL, DEFAULT_OPENAI_MODEL};
use domain_vector::{DistanceMetric, EmbeddingKind, parse_distance_metric};

pub const DEFAULT_QUERY: &str = "neural networks and AI";

#[derive(Debug, Parser)]
#[command(name = "chroma-cli", version)]
#[command(about = "A CLI to interact with ChromaDB")]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Flags shared by every subcommand
#[derive(Debug, Clone, Args)]
pub struct GlobalArgs {
    /// ChromaDB server URL
    #[arg(short, long, global = true, default_value = DEFAULT_CHROMA_URL)]
    pub server: String,

    /// Embedding function: 'default' (ONNX), 'gemini', 'openai', or 'hash'
    #[arg(
        short,
        long,
        global = true,
        default_value = "default",
        value_parser = EmbeddingKind::from_str
    )]
    pub embedding: EmbeddingKind,

    /// Distance function: 'l2' (Euclidean), 'cosine', or 'ip' (inner product)
    #[arg(short, long, global = true, default_value = "l2", value_parser = parse_distance_metric)]
    pub distance: DistanceMetric,

    /// OpenAI API key (e.g. `sk-...`)
    #[arg(long, global = true, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub openai_api_key: Option<String>,

    /// OpenAI base URL
    #[arg(long, global = true, env = "OPENAI_BASE_URL", default_value = DEFAULT_OPENAI_BASE_URL)]
    pub openai_base_url: String,

    /// OpenAI embedding model
    #[arg(short = 'm', long, global = true, default_value = DEFAULT_OPENAI_MODEL)]
    pub openai_model: String,

    /// Chroma tenant
    #[arg(long, global = true, env = "CHROMA_TENANT", default_value = DEFAULT_TENANT)]
    pub tenant: String,

    /// Chroma database
    #[arg(long, global = true, env = "CHROMA_DATABASE", default_value = DEFAULT_DATABASE)]
    pub database: String,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Add documents to ChromaDB
    Add(AddArgs),

    /// List documents in the collection
    List(ListArgs),

    /// Query documents in ChromaDB
    Query(QueryArgs),

    /// Delete a document by ID
    Delete(DeleteArgs),
}

#[derive(Debug, Clone, Args)]
pub struct AddArgs {
    /// YAML file containing documents to add
    #[arg(short, long)]
    pub file: PathBuf,

    /// Update existing documents instead of failing on duplicates
    #[arg(short, long)]
    pub upsert: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Maximum number of documents to list
    #[arg(
        short = 'n',
        long,
        default_value_t = 10,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub limit: u32,

    /// Offset for pagination
    #[arg(long, default_value_t = 0)]
    pub offset: u32,
}

#[derive(Debug, Clone, Args)]
pub struct QueryArgs {
    /// Query text to search for (can be repeated)
    #[arg(short = 'q', long = "query", default_value = DEFAULT_QUERY)]
    pub queries: Vec<String>,

    /// Number of results to return
    #[arg(
        short = 'n',
        long,
        default_value_t = 3,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub results: u32,
}

#[derive(Debug, Clone, Args)]
pub struct DeleteArgs {
    /// ID of the document to delete
    #[arg(value_name = "DOCUMENT_ID")]
    pub id: String,
}
