use std::env;

/// Process-level configuration, loaded once from the environment.
///
/// Mirrors the teacher's `dotenvy::dotenv().ok()` + `env::var` pattern, just
/// widened to cover the hybrid search, re-rank, and conversation knobs.
#[derive(Clone, Debug)]
pub struct Config {
    pub db_url: String,

    pub embed_server_url: String,
    pub embed_model: String,
    pub embed_dim: usize,

    pub chat_base_url: String,
    pub chat_model: String,
    pub chat_provider: String,

    pub vector_weight: f32,
    pub keyword_weight: f32,

    pub rerank_enabled: bool,
    pub rerank_retrieval_k: usize,

    pub max_conversation_history: usize,

    pub ingest_batch_size: usize,

    pub collaborator_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let db_url = env::var("DATABASE_URL").expect("DATABASE_URL not set");

        let embed_server_url = env::var("EMBED_SERVER_URL")
            .unwrap_or_else(|_| "http://localhost:8081/embeddings".to_string());
        let embed_model =
            env::var("EMBED_MODEL").unwrap_or_else(|_| "nomic-embed-text-v1.5".to_string());
        let embed_dim = env_parse("EMBED_DIM", 1024);

        let chat_base_url = env::var("CHAT_BASE_URL")
            .unwrap_or_else(|_| "http://localhost:8082/v1/chat/completions".to_string());
        let chat_model = env::var("CHAT_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let chat_provider = env::var("CHAT_PROVIDER").unwrap_or_else(|_| "openai".to_string());

        let vector_weight = env_parse("HYBRID_VECTOR_WEIGHT", 0.7f32);
        let keyword_weight = env_parse("HYBRID_KEYWORD_WEIGHT", 0.3f32);
        if (vector_weight + keyword_weight - 1.0).abs() > 0.01 {
            tracing::warn!(
                vector_weight,
                keyword_weight,
                "hybrid weights do not sum to ~1.0"
            );
        }

        let rerank_enabled = env_parse("RERANK_ENABLED", true);
        let rerank_retrieval_k = env_parse("RERANK_RETRIEVAL_K", 10usize);

        let max_conversation_history = env_parse("MAX_CONVERSATION_HISTORY", 10usize);
        let ingest_batch_size = env_parse("INGEST_BATCH_SIZE", 100usize);
        let collaborator_timeout_ms = env_parse("COLLABORATOR_TIMEOUT_MS", 10_000u64);

        let cfg = Self {
            db_url,
            embed_server_url,
            embed_model,
            embed_dim,
            chat_base_url,
            chat_model,
            chat_provider,
            vector_weight,
            keyword_weight,
            rerank_enabled,
            rerank_retrieval_k,
            max_conversation_history,
            ingest_batch_size,
            collaborator_timeout_ms,
        };

        tracing::info!("📋 Configuration loaded:");
        tracing::info!("   DATABASE_URL: {}", if cfg.db_url.is_empty() { "NOT SET" } else { "SET" });
        tracing::info!("   EMBED_SERVER_URL: {}", cfg.embed_server_url);
        tracing::info!("   EMBED_DIM: {}", cfg.embed_dim);
        tracing::info!("   CHAT_BASE_URL: {}", cfg.chat_base_url);
        tracing::info!(
            "   HYBRID_WEIGHTS: vector={} keyword={}",
            cfg.vector_weight,
            cfg.keyword_weight
        );
        tracing::info!(
            "   RERANK: enabled={} retrieval_k={}",
            cfg.rerank_enabled,
            cfg.rerank_retrieval_k
        );
        tracing::info!("   MAX_CONVERSATION_HISTORY: {}", cfg.max_conversation_history);

        cfg
    }
}

fn env_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    env::var(key).ok().and_then(|s| s.parse().ok()).unwrap_or(default)
}
