mod client;
mod config;

pub use client::{ChromaClient, ChromaCollection};
pub use config::{ChromaConfig, DEFAULT_CHROMA_URL, DEFAULT_DATABASE, DEFAULT_TENANT};
