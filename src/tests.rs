#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;

    use crate::conversation::filter::ConversationalFilter;
    use crate::db::models::{NewResume, ResumeDocument, ScoredDocument};
    use crate::db::store::StoreAdapter;
    use crate::engines::hybrid::{HybridEngine, HybridWeights};
    use crate::engines::keyword::KeywordEngine;
    use crate::engines::rerank::LlmReranker;
    use crate::engines::vector::VectorEngine;
    use crate::errors::{ChatError, EmbedError, StoreError};
    use crate::llm::chat::{ChatMessage, ChatModelClient};
    use crate::llm::embed::EmbeddingClient;
    use crate::pipeline::{RetrievalPipeline, SearchType};

    // ------------------------------------------------------------------
    // In-memory test doubles, grounded in the listwise-rerank and
    // hybrid-search prior art's MockChatModel/MockEmbeddingProvider style.
    // ------------------------------------------------------------------

    struct InMemoryStore {
        documents: Vec<ResumeDocument>,
        vector_scores: Vec<(String, f32)>,
    }

    #[async_trait]
    impl StoreAdapter for InMemoryStore {
        async fn keyword_query(&self, tokens: &[String], limit: i64) -> Result<Vec<ResumeDocument>, StoreError> {
            let lower_tokens: Vec<String> = tokens.iter().map(|t| t.to_lowercase()).collect();
            let matches: Vec<ResumeDocument> = self
                .documents
                .iter()
                .filter(|d| {
                    let haystack = format!("{} {} {} {} {}", d.text, d.name, d.email, d.skills, d.role).to_lowercase();
                    lower_tokens.iter().any(|t| haystack.contains(t.as_str()))
                })
                .cloned()
                .take(limit as usize)
                .collect();
            Ok(matches)
        }

        async fn vector_query(&self, _vector: &[f32], k: i64) -> Result<Vec<ScoredDocument>, StoreError> {
            let mut scored: Vec<ScoredDocument> = self
                .vector_scores
                .iter()
                .filter_map(|(name, score)| {
                    self.documents.iter().find(|d| &d.name == name).map(|d| ScoredDocument {
                        document: d.clone(),
                        raw_score: *score,
                    })
                })
                .collect();
            scored.sort_by(|a, b| b.raw_score.partial_cmp(&a.raw_score).unwrap());
            scored.truncate(k as usize);
            Ok(scored)
        }

        async fn insert_resume(&self, _resume: &NewResume) -> Result<i64, StoreError> {
            Ok(1)
        }
    }

    struct FixedEmbeddingClient {
        dim: usize,
    }

    #[async_trait]
    impl EmbeddingClient for FixedEmbeddingClient {
        async fn embed(&self, _text: &str) -> Result<Vec<f32>, EmbedError> {
            Ok(vec![0.1; self.dim])
        }
    }

    struct ScriptedChatClient {
        response: String,
    }

    #[async_trait]
    impl ChatModelClient for ScriptedChatClient {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, ChatError> {
            Ok(self.response.clone())
        }
    }

    struct FailingChatClient;

    #[async_trait]
    impl ChatModelClient for FailingChatClient {
        async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, ChatError> {
            Err(ChatError::EmptyResponse)
        }
    }

    fn doc(name: &str, skills: &str, text: &str) -> ResumeDocument {
        ResumeDocument {
            id: 1,
            name: name.to_string(),
            email: format!("{}@example.com", name.to_lowercase()),
            phone: "555-0100".to_string(),
            role: "QA Engineer".to_string(),
            skills: skills.to_string(),
            company: "Acme".to_string(),
            text: text.to_string(),
        }
    }

    // ------------------------------------------------------------------
    // Keyword-only scenario
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn keyword_engine_ranks_the_skills_match_above_the_text_match() {
        let store = Arc::new(InMemoryStore {
            documents: vec![
                doc("A", "Java, Selenium", "worked on various automation projects"),
                doc("B", "Python", "built backend services"),
                doc("C", "Docker", "used Selenium once during an internship"),
            ],
            vector_scores: vec![],
        });
        let engine = KeywordEngine::new(store);

        let results = engine.search("Selenium", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "A");
        assert_eq!(results[1].name, "C");
        assert!(results[0].score > results[1].score);
    }

    // ------------------------------------------------------------------
    // Vector-only scenario
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn vector_engine_preserves_store_ordering_and_clamps_scores() {
        let store = Arc::new(InMemoryStore {
            documents: vec![doc("A", "", ""), doc("B", "", "")],
            vector_scores: vec![("A".into(), 0.92), ("B".into(), 0.55)],
        });
        let embedder = Arc::new(FixedEmbeddingClient { dim: 8 });
        let engine = VectorEngine::new(store, embedder);

        let results = engine.search("anything", 2).await.unwrap();
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].name, "A");
        assert!((results[0].score - 0.92).abs() < 1e-6);
        assert_eq!(results[1].name, "B");
    }

    // ------------------------------------------------------------------
    // Hybrid merge scenario, matching the worked example in the design docs
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn hybrid_engine_combines_keyword_and_vector_scores() {
        let store = Arc::new(InMemoryStore {
            documents: vec![
                doc("A", "Selenium, Java", "Selenium automation"),
                doc("B", "Python", "backend work"),
                doc("C", "Selenium", "QA with Selenium"),
            ],
            vector_scores: vec![("A".into(), 0.9), ("C".into(), 0.7)],
        });
        let embedder = Arc::new(FixedEmbeddingClient { dim: 8 });
        let keyword = KeywordEngine::new(store.clone());
        let vector = VectorEngine::new(store, embedder);
        let hybrid = HybridEngine::new(
            keyword,
            vector,
            HybridWeights { vector_weight: 0.7, keyword_weight: 0.3 },
        );

        let results = hybrid.search("Selenium", 3).await.unwrap();
        assert_eq!(results.len(), 2, "only documents matched by at least one engine should appear");
        assert_eq!(results[0].name, "A");
        assert_eq!(results[1].name, "C");
        assert!(results[0].score > results[1].score);
    }

    // ------------------------------------------------------------------
    // LLM re-rank: strict filter drops a non-matching candidate
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn reranker_drops_candidates_marked_as_non_matching() {
        let chat = ScriptedChatClient {
            response: r#"```json
{"matches": [
  {"name": "A", "relevanceScore": 0.9, "matchesCriteria": true, "reasoning": "strong fit"},
  {"name": "B", "relevanceScore": 0.2, "matchesCriteria": false, "reasoning": "missing skill"},
  {"name": "C", "relevanceScore": 0.7, "matchesCriteria": true, "reasoning": "decent fit"}
], "summary": "2 of 3 matched"}
```"#
                .to_string(),
        };
        let reranker = LlmReranker::new(&chat);

        let candidates = vec![
            crate::engines::SearchResultItem {
                id: 1,
                name: "A".into(),
                email: String::new(),
                phone: String::new(),
                content: String::new(),
                score: 0.5,
                match_type: crate::engines::MatchType::Hybrid,
                extracted_info: None,
                llm_reasoning: None,
            },
            crate::engines::SearchResultItem {
                id: 2,
                name: "B".into(),
                email: String::new(),
                phone: String::new(),
                content: String::new(),
                score: 0.4,
                match_type: crate::engines::MatchType::Hybrid,
                extracted_info: None,
                llm_reasoning: None,
            },
            crate::engines::SearchResultItem {
                id: 3,
                name: "C".into(),
                email: String::new(),
                phone: String::new(),
                content: String::new(),
                score: 0.3,
                match_type: crate::engines::MatchType::Hybrid,
                extracted_info: None,
                llm_reasoning: None,
            },
        ];

        let (results, analysis) = reranker.rerank_and_filter("QA engineers", candidates).await;
        assert_eq!(results.len(), 2);
        assert!(results.iter().all(|r| r.name != "B"));
        assert!(!analysis.fell_back);
    }

    // ------------------------------------------------------------------
    // LLM re-rank: unparseable response falls back to the original set
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn reranker_falls_back_to_original_candidates_on_parse_failure() {
        let chat = ScriptedChatClient { response: "sorry, I cannot comply with that request".to_string() };
        let reranker = LlmReranker::new(&chat);

        let candidates = vec![crate::engines::SearchResultItem {
            id: 1,
            name: "A".into(),
            email: String::new(),
            phone: String::new(),
            content: String::new(),
            score: 0.5,
            match_type: crate::engines::MatchType::Hybrid,
            extracted_info: None,
            llm_reasoning: None,
        }];

        let (results, analysis) = reranker.rerank_and_filter("QA engineers", candidates.clone()).await;
        assert_eq!(results.len(), candidates.len());
        assert_eq!(results[0].name, "A");
        assert!(analysis.fell_back);
    }

    // ------------------------------------------------------------------
    // LLM re-rank: transport failure also falls back, never drops candidates
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn reranker_falls_back_on_transport_error() {
        let chat = FailingChatClient;
        let reranker = LlmReranker::new(&chat);

        let candidates = vec![crate::engines::SearchResultItem {
            id: 1,
            name: "A".into(),
            email: String::new(),
            phone: String::new(),
            content: String::new(),
            score: 0.5,
            match_type: crate::engines::MatchType::Hybrid,
            extracted_info: None,
            llm_reasoning: None,
        }];

        let (results, analysis) = reranker.rerank_and_filter("QA engineers", candidates).await;
        assert_eq!(results.len(), 1);
        assert!(analysis.fell_back);
    }

    // ------------------------------------------------------------------
    // Conversational filter narrows cached results without touching the
    // store, and fails open on a bad response.
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn conversational_filter_keeps_only_matching_cached_results() {
        let chat = ScriptedChatClient {
            response: r#"{"filteredResults": [
                {"name": "A", "matches": true, "reasoning": "in Bengaluru"},
                {"name": "B", "matches": false, "reasoning": "not in Bengaluru"}
            ], "summary": "1 of 2 matched"}"#
                .to_string(),
        };
        let filterer = ConversationalFilter::new(&chat);

        let cached = vec![
            crate::engines::SearchResultItem {
                id: 1,
                name: "A".into(),
                email: String::new(),
                phone: String::new(),
                content: String::new(),
                score: 0.9,
                match_type: crate::engines::MatchType::LlmReranked,
                extracted_info: None,
                llm_reasoning: None,
            },
            crate::engines::SearchResultItem {
                id: 2,
                name: "B".into(),
                email: String::new(),
                phone: String::new(),
                content: String::new(),
                score: 0.7,
                match_type: crate::engines::MatchType::LlmReranked,
                extracted_info: None,
                llm_reasoning: None,
            },
        ];

        let outcome = filterer.filter("only those in Bengaluru", &cached).await;
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].name, "A");
    }

    // ------------------------------------------------------------------
    // Full pipeline: hybrid retrieval followed by re-rank, end to end
    // against in-memory collaborators.
    // ------------------------------------------------------------------

    #[tokio::test]
    async fn pipeline_runs_hybrid_retrieval_then_rerank_and_truncates_to_top_k() {
        let store = Arc::new(InMemoryStore {
            documents: vec![
                doc("A", "Selenium, Java", "QA engineer with Selenium"),
                doc("B", "Python", "backend engineer"),
                doc("C", "Selenium", "QA automation with Selenium"),
            ],
            vector_scores: vec![("A".into(), 0.9), ("B".into(), 0.6), ("C".into(), 0.5)],
        });
        let embedder = Arc::new(FixedEmbeddingClient { dim: 8 });
        let keyword = KeywordEngine::new(store.clone());
        let vector = VectorEngine::new(store.clone(), embedder.clone());
        let hybrid = HybridEngine::new(
            keyword,
            vector,
            HybridWeights { vector_weight: 0.7, keyword_weight: 0.3 },
        );

        let chat: Arc<dyn ChatModelClient> = Arc::new(ScriptedChatClient {
            response: r#"{"matches": [
                {"name": "A", "relevanceScore": 0.95, "matchesCriteria": true, "reasoning": "strong QA fit"},
                {"name": "C", "relevanceScore": 0.8, "matchesCriteria": true, "reasoning": "good QA fit"},
                {"name": "B", "relevanceScore": 0.1, "matchesCriteria": false, "reasoning": "not QA"}
            ], "summary": "2 of 3 matched"}"#
                .to_string(),
        });

        let pipeline = RetrievalPipeline::new(
            KeywordEngine::new(store.clone()),
            VectorEngine::new(store, embedder),
            hybrid,
            chat,
            true,
            10,
        );

        let outcome = pipeline.search("QA engineers with Selenium", SearchType::Hybrid, 1).await.unwrap();
        assert_eq!(outcome.results.len(), 1);
        assert_eq!(outcome.results[0].name, "A");
        assert!(outcome.analysis.is_some());
    }

    // ------------------------------------------------------------------
    // Live-database smoke test. Requires DATABASE_URL to point at a
    // reachable Postgres with the pgvector extension installed.
    // ------------------------------------------------------------------

    #[tokio::test]
    #[ignore = "requires a live DATABASE_URL with the pgvector extension"]
    async fn document_store_round_trips_through_postgres() -> anyhow::Result<()> {
        use crate::db::store::PgStoreAdapter;

        let client = crate::db::connect::get_client().await?;
        let store = PgStoreAdapter::new(Arc::new(client), crate::config::Config::from_env().collaborator_timeout_ms);

        let resume = NewResume {
            name: "Integration Test Candidate".to_string(),
            email: "itc@example.com".to_string(),
            phone: "555-0100".to_string(),
            role: "QA Engineer".to_string(),
            skills: "Selenium, Java".to_string(),
            company: "Test Co".to_string(),
            text: "Integration test resume mentioning Selenium automation".to_string(),
            embedding: vec![0.1; 1024],
        };
        let id = store.insert_resume(&resume).await?;
        assert!(id > 0);

        let keyword_results = store.keyword_query(&["Selenium".to_string()], 10).await?;
        assert!(keyword_results.iter().any(|d| d.id == id));

        println!("✅ document store round trip passed for id {id}");
        Ok(())
    }
}
