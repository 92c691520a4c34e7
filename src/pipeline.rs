use std::sync::Arc;

use crate::engines::hybrid::HybridEngine;
use crate::engines::keyword::KeywordEngine;
use crate::engines::rerank::{LlmReranker, RerankAnalysis};
use crate::engines::vector::VectorEngine;
use crate::engines::SearchResultItem;
use crate::errors::PipelineError;
use crate::llm::chat::ChatModelClient;

/// Which engine a caller's `search` request is routed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    Keyword,
    Vector,
    Hybrid,
}

pub struct PipelineSearchResult {
    pub results: Vec<SearchResultItem>,
    pub analysis: Option<RerankAnalysis>,
}

/// The Retrieval Pipeline (component H): dispatches to D/E/F, then
/// optionally runs results through G, before truncating to the caller's
/// requested top-K.
pub struct RetrievalPipeline {
    keyword: KeywordEngine,
    vector: VectorEngine,
    hybrid: HybridEngine,
    chat: Arc<dyn ChatModelClient>,
    rerank_enabled: bool,
    rerank_retrieval_k: usize,
}

impl RetrievalPipeline {
    pub fn new(
        keyword: KeywordEngine,
        vector: VectorEngine,
        hybrid: HybridEngine,
        chat: Arc<dyn ChatModelClient>,
        rerank_enabled: bool,
        rerank_retrieval_k: usize,
    ) -> Self {
        Self { keyword, vector, hybrid, chat, rerank_enabled, rerank_retrieval_k }
    }

    pub async fn search(
        &self,
        query: &str,
        search_type: SearchType,
        k: usize,
    ) -> Result<PipelineSearchResult, PipelineError> {
        let retrieval_k = if self.rerank_enabled { self.rerank_retrieval_k } else { k };

        let mut results = match search_type {
            SearchType::Keyword => self.keyword.search(query, retrieval_k).await.map_err(PipelineError::from)?,
            SearchType::Vector => self.vector.search(query, retrieval_k).await?,
            SearchType::Hybrid => self.hybrid.search(query, retrieval_k).await?,
        };

        let analysis = if self.rerank_enabled && !results.is_empty() {
            let reranker = LlmReranker::new(self.chat.as_ref());
            let (reranked, analysis) = reranker.rerank_and_filter(query, results).await;
            results = reranked;
            Some(analysis)
        } else {
            None
        };

        results.truncate(k);
        Ok(PipelineSearchResult { results, analysis })
    }

    pub fn update_hybrid_weights(&self, weights: crate::engines::hybrid::HybridWeights) {
        self.hybrid.update_weights(weights);
    }
}
