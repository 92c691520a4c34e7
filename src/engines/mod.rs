pub mod hybrid;
pub mod keyword;
pub mod rerank;
pub mod vector;

use serde::{Deserialize, Serialize};

/// Which stage last owned a result's ranking.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum MatchType {
    Keyword,
    Vector,
    Hybrid,
    LlmReranked,
}

/// Evidence the LLM re-ranker extracted about a candidate. Fields are
/// evidence-based strings, not structured guarantees — see the re-ranker's
/// fail-open policy.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExtractedInfo {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default)]
    pub skills: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience: Option<String>,
    #[serde(default)]
    pub key_highlights: Vec<String>,
}

/// A single search result, the unit every engine and the pipeline pass
/// around. `score` is only comparable to another item's score once both
/// have gone through the same stage (keyword/vector scores are normalized
/// independently before hybrid fusion).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResultItem {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub content: String,
    pub score: f32,
    pub match_type: MatchType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub extracted_info: Option<ExtractedInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub llm_reasoning: Option<String>,
}

/// Truncates `text` to at most `max_chars`, placing an ellipsis on any side
/// that was cut, as used by the keyword and vector engines when building
/// snippets.
pub fn snippet(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let truncated: String = text.chars().take(max_chars).collect();
    format!("{truncated}...")
}
