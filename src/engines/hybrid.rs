use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use crate::errors::PipelineError;

use super::keyword::KeywordEngine;
use super::vector::VectorEngine;
use super::{MatchType, SearchResultItem};

/// Fusion weights for the Hybrid Engine. `w_v + w_k` should be ~1.0 but this
/// is only logged, never enforced (see `Config::from_env`).
#[derive(Debug, Clone, Copy)]
pub struct HybridWeights {
    pub vector_weight: f32,
    pub keyword_weight: f32,
}

/// The Hybrid Engine (component F): runs the Keyword and Vector engines
/// concurrently and merges their results by document identity.
///
/// Identity is currently the resume's display `name` — a known wart
/// carried over from the source design (see module docs on
/// `merge_by_identity`), not a deliberate choice of this implementation.
pub struct HybridEngine {
    keyword: KeywordEngine,
    vector: VectorEngine,
    weights: Mutex<HybridWeights>,
}

impl HybridEngine {
    pub fn new(keyword: KeywordEngine, vector: VectorEngine, weights: HybridWeights) -> Self {
        Self { keyword, vector, weights: Mutex::new(weights) }
    }

    /// Updates the fusion weights for subsequent searches. Not synchronized
    /// against in-flight `search` calls: a search already past its snapshot
    /// point keeps using the weights it started with.
    pub fn update_weights(&self, weights: HybridWeights) {
        *self.weights.lock() = weights;
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResultItem>, PipelineError> {
        let weights = *self.weights.lock();
        let fan_out_k = 3 * k;

        let (keyword_result, vector_result) = tokio::join!(
            self.keyword.search(query, fan_out_k),
            self.vector.search(query, fan_out_k)
        );

        let keyword_results = keyword_result.map_err(PipelineError::from)?;
        let vector_results = vector_result?;

        let mut merged = merge_by_identity(vector_results, keyword_results, weights);
        merged.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        merged.truncate(k);
        Ok(merged)
    }
}

/// Merges vector and keyword result lists, keyed by `name`. Vector results
/// are folded in first (contributing `score * w_v`); keyword results then
/// either add `score * w_k` to an existing entry (keeping the longer
/// snippet) or seed a fresh entry.
fn merge_by_identity(
    vector_results: Vec<SearchResultItem>,
    keyword_results: Vec<SearchResultItem>,
    weights: HybridWeights,
) -> Vec<SearchResultItem> {
    let mut by_name: HashMap<String, SearchResultItem> = HashMap::new();

    for mut item in vector_results {
        item.score *= weights.vector_weight;
        item.match_type = MatchType::Hybrid;
        by_name.insert(item.name.clone(), item);
    }

    for item in keyword_results {
        let contribution = item.score * weights.keyword_weight;
        match by_name.get_mut(&item.name) {
            Some(existing) => {
                existing.score += contribution;
                if item.content.len() > existing.content.len() {
                    existing.content = item.content;
                }
            }
            None => {
                let mut fresh = item;
                fresh.score = contribution;
                fresh.match_type = MatchType::Hybrid;
                by_name.insert(fresh.name.clone(), fresh);
            }
        }
    }

    by_name.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(name: &str, score: f32) -> SearchResultItem {
        SearchResultItem {
            id: 1,
            name: name.to_string(),
            email: String::new(),
            phone: String::new(),
            content: "snippet".to_string(),
            score,
            match_type: MatchType::Vector,
            extracted_info: None,
            llm_reasoning: None,
        }
    }

    #[test]
    fn merges_overlapping_candidates_with_weighted_scores() {
        let vector_results = vec![item("A", 0.9), item("C", 0.7)];
        let keyword_results = vec![item("A", 0.5), item("B", 0.4)];
        let weights = HybridWeights { vector_weight: 0.7, keyword_weight: 0.3 };

        let merged = merge_by_identity(vector_results, keyword_results, weights);
        let mut by_name: HashMap<String, f32> =
            merged.into_iter().map(|r| (r.name, r.score)).collect();

        assert!((by_name.remove("A").unwrap() - 0.78).abs() < 1e-5);
        assert!((by_name.remove("C").unwrap() - 0.49).abs() < 1e-5);
        assert!((by_name.remove("B").unwrap() - 0.12).abs() < 1e-5);
    }

    #[test]
    fn keyword_only_candidate_is_seeded_not_dropped() {
        let merged = merge_by_identity(vec![], vec![item("Only", 1.0)], HybridWeights {
            vector_weight: 0.7,
            keyword_weight: 0.3,
        });
        assert_eq!(merged.len(), 1);
        assert!((merged[0].score - 0.3).abs() < 1e-6);
    }
}
