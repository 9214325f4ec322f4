//! Configuration for the chroma CLI
//!
//! Flags and environment are resolved once at startup; handlers only see the
//! plain values in `AppConfig`.

use domain_vector::embedding::DEFAULT_GEMINI_MODEL;
use domain_vector::{ChromaConfig, EmbeddingConfig, EmbeddingKind, SessionConfig};

use crate::cli::GlobalArgs;

pub const GEMINI_API_KEY_ENV: &str = "GEMINI_API_KEY";

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub session: SessionConfig,
}

impl AppConfig {
    /// Resolve parsed flags plus the Gemini key (read from the environment by the caller)
    pub fn from_cli(args: &GlobalArgs, gemini_api_key: Option<String>) -> Self {
        let embedding = match args.embedding {
            EmbeddingKind::Default => EmbeddingConfig::Default,
            EmbeddingKind::Hash => EmbeddingConfig::Hash,
            EmbeddingKind::Gemini => EmbeddingConfig::Gemini {
                api_key: gemini_api_key,
                model: DEFAULT_GEMINI_MODEL.to_string(),
            },
            EmbeddingKind::OpenAI => EmbeddingConfig::OpenAI {
                api_key: args.openai_api_key.clone(),
                base_url: Some(args.openai_base_url.clone()),
                model: args.openai_model.clone(),
            },
        };

        Self {
            session: SessionConfig {
                server: ChromaConfig::new(args.server.clone())
                    .with_tenant(args.tenant.clone())
                    .with_database(args.database.clone()),
                embedding,
                distance: args.distance,
            },
        }
    }

    /// Same as `from_cli`, reading `GEMINI_API_KEY` from the process environment
    pub fn from_cli_and_env(args: &GlobalArgs) -> Self {
        Self::from_cli(args, core_config::env_optional(GEMINI_API_KEY_ENV))
    }
}
