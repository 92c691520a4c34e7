use serde::{Deserialize, Serialize};

use crate::conversation::store::ConversationMessage;
use crate::engines::SearchResultItem;
use crate::pipeline::SearchType;

// ============================================================================
// Shared
// ============================================================================

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self { error: error.into(), message: message.into() }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
    pub database: String,
    pub rerank_enabled: bool,
}

// ============================================================================
// Search endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(default = "default_search_type")]
    pub search_type: ApiSearchType,
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ApiSearchType {
    Keyword,
    Vector,
    Hybrid,
}

impl From<ApiSearchType> for SearchType {
    fn from(value: ApiSearchType) -> Self {
        match value {
            ApiSearchType::Keyword => SearchType::Keyword,
            ApiSearchType::Vector => SearchType::Vector,
            ApiSearchType::Hybrid => SearchType::Hybrid,
        }
    }
}

fn default_search_type() -> ApiSearchType {
    ApiSearchType::Hybrid
}

fn default_top_k() -> usize {
    3
}

#[derive(Debug, Serialize)]
pub struct SearchResponseMetadata {
    pub trace_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hybrid_weights: Option<(f32, f32)>,
}

#[derive(Debug, Serialize)]
pub struct SearchResponse {
    pub query: String,
    pub search_type: ApiSearchType,
    pub top_k: usize,
    pub result_count: usize,
    pub duration_ms: u128,
    pub results: Vec<SearchResultItem>,
    pub metadata: SearchResponseMetadata,
}

// ============================================================================
// Chat endpoint
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    #[serde(default)]
    pub conversation_id: Option<String>,
    #[serde(default = "default_true")]
    pub include_history: bool,
    #[serde(default = "default_chat_top_k")]
    pub top_k: usize,
}

fn default_true() -> bool {
    true
}

fn default_chat_top_k() -> usize {
    10
}

#[derive(Debug, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum ChatSearchMode {
    Hybrid,
    Filter,
}

#[derive(Debug, Serialize)]
pub struct ChatSearchMetadata {
    pub query: String,
    pub search_type: ChatSearchMode,
    pub result_count: usize,
    pub duration_ms: u128,
}

#[derive(Debug, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub conversation_id: String,
    pub message_count: usize,
    pub model: String,
    pub provider: String,
    pub search_results: Vec<SearchResultItem>,
    pub search_metadata: ChatSearchMetadata,
}

// ============================================================================
// History / delete endpoints
// ============================================================================

#[derive(Debug, Serialize)]
pub struct HistoryResponse {
    pub conversation_id: String,
    pub messages: Vec<ConversationMessage>,
    pub message_count: usize,
}

#[derive(Debug, Serialize)]
pub struct DeleteResponse {
    pub conversation_id: String,
    pub deleted: bool,
}
