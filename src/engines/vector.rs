use std::sync::Arc;

use crate::db::store::StoreAdapter;
use crate::errors::PipelineError;
use crate::llm::embed::EmbeddingClient;

use super::{snippet, MatchType, SearchResultItem};

const SNIPPET_LEN: usize = 200;

/// The Vector Engine (component E): embeds the query, then asks the store
/// for the nearest neighbours by cosine similarity.
pub struct VectorEngine {
    store: Arc<dyn StoreAdapter>,
    embedder: Arc<dyn EmbeddingClient>,
}

impl VectorEngine {
    pub fn new(store: Arc<dyn StoreAdapter>, embedder: Arc<dyn EmbeddingClient>) -> Self {
        Self { store, embedder }
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResultItem>, PipelineError> {
        let vector = self.embedder.embed(query).await?;
        let scored = self.store.vector_query(&vector, k as i64).await?;

        Ok(scored
            .into_iter()
            .map(|sd| SearchResultItem {
                id: sd.document.id,
                name: sd.document.name,
                email: sd.document.email,
                phone: sd.document.phone,
                content: snippet(&sd.document.text, SNIPPET_LEN),
                score: sd.raw_score.clamp(0.0, 1.0),
                match_type: MatchType::Vector,
                extracted_info: None,
                llm_reasoning: None,
            })
            .collect())
    }
}
