use std::net::SocketAddr;
use std::sync::Arc;

use resume_retriever::api::{routes, AppState};
use resume_retriever::config::Config;
use resume_retriever::conversation::store::ConversationStore;
use resume_retriever::db;
use resume_retriever::db::store::PgStoreAdapter;
use resume_retriever::engines::hybrid::{HybridEngine, HybridWeights};
use resume_retriever::engines::keyword::KeywordEngine;
use resume_retriever::engines::vector::VectorEngine;
use resume_retriever::llm::chat::HttpChatModelClient;
use resume_retriever::llm::embed::HttpEmbeddingClient;
use resume_retriever::pipeline::RetrievalPipeline;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "resume_retriever=debug,tower_http=debug,axum=trace".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cfg = Config::from_env();

    let port = std::env::var("SERVER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(3000);
    let addr = SocketAddr::from(([0, 0, 0, 0], port));

    let chat: Arc<dyn resume_retriever::llm::chat::ChatModelClient> =
        Arc::new(HttpChatModelClient::new(&cfg));

    let pipeline = match db::connect::get_client().await {
        Ok(client) => {
            let store = Arc::new(PgStoreAdapter::new(Arc::new(client), cfg.collaborator_timeout_ms));
            let embedder = Arc::new(HttpEmbeddingClient::new(&cfg));
            let keyword = KeywordEngine::new(store.clone());
            let vector = VectorEngine::new(store.clone(), embedder);
            let hybrid = HybridEngine::new(
                keyword,
                vector,
                HybridWeights { vector_weight: cfg.vector_weight, keyword_weight: cfg.keyword_weight },
            );
            // The pipeline's own keyword/vector stages need fresh instances
            // since `hybrid` consumed the ones above.
            let pipeline = RetrievalPipeline::new(
                KeywordEngine::new(store.clone()),
                VectorEngine::new(store, Arc::new(HttpEmbeddingClient::new(&cfg))),
                hybrid,
                chat.clone(),
                cfg.rerank_enabled,
                cfg.rerank_retrieval_k,
            );
            Some(Arc::new(pipeline))
        }
        Err(e) => {
            tracing::error!("failed to connect to document store, starting in degraded mode: {e}");
            None
        }
    };

    let state = AppState {
        pipeline,
        conversations: Arc::new(ConversationStore::new(cfg.max_conversation_history)),
        chat,
        config: cfg,
    };

    tracing::info!("🚀 Resume Retriever starting on {}", addr);
    tracing::info!("📊 Endpoints:");
    tracing::info!("   GET    /status");
    tracing::info!("   POST   /search");
    tracing::info!("   POST   /chat");
    tracing::info!("   GET    /conversations/:conversation_id");
    tracing::info!("   DELETE /conversations/:conversation_id");

    let app = routes::create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    tracing::info!("✅ Server listening on {}", addr);
    axum::serve(listener, app).await.unwrap();
}
