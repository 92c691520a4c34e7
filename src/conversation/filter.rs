use serde::Deserialize;

use crate::engines::rerank::extract_json;
use crate::engines::SearchResultItem;
use crate::llm::chat::{ChatMessage, ChatModelClient};

/// Substring tokens (case-insensitive) that signal a message is narrowing
/// previously-returned results rather than issuing a fresh query.
const FILTER_INTENT_TOKENS: [&str; 12] = [
    "only",
    "filter",
    "show me",
    "display",
    "from those",
    "from the above",
    "from previous",
    "from these",
    "among them",
    "out of these",
    "narrow down",
    "refine",
];

/// Whether `message` reads as a request to narrow a prior result set.
/// Deliberately simple substring matching — language-brittle by design,
/// treat additions/removals to `FILTER_INTENT_TOKENS` as configuration.
pub fn is_filter_intent(message: &str) -> bool {
    let lower = message.to_lowercase();
    FILTER_INTENT_TOKENS.iter().any(|t| lower.contains(t))
}

pub struct FilterOutcome {
    pub results: Vec<SearchResultItem>,
    pub summary: String,
}

/// The Conversational Filter (component J): narrows an already-retrieved
/// result set against a new criterion, without touching the document
/// store.
pub struct ConversationalFilter<'a> {
    chat: &'a dyn ChatModelClient,
}

impl<'a> ConversationalFilter<'a> {
    pub fn new(chat: &'a dyn ChatModelClient) -> Self {
        Self { chat }
    }

    pub async fn filter(&self, criteria: &str, cached_results: &[SearchResultItem]) -> FilterOutcome {
        if cached_results.is_empty() {
            return FilterOutcome { results: Vec::new(), summary: "no cached results to filter".into() };
        }

        let messages = build_prompt(criteria, cached_results);

        let raw_response = match self.chat.complete(&messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("chat model call failed during conversational filter, returning all cached results: {e}");
                return fallback(cached_results, format!("filter unavailable ({e}); showing all previous results"));
            }
        };

        let parsed = match extract_json(&raw_response)
            .and_then(|json| serde_json::from_str::<FilterResponse>(&json).map_err(|e| e.to_string()))
        {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("failed to parse filter response, returning all cached results: {e}");
                return fallback(cached_results, "filter response could not be parsed; showing all previous results".into());
            }
        };

        let matching_names: std::collections::HashSet<String> =
            parsed.filtered_results.iter().filter(|m| m.matches).map(|m| m.name.clone()).collect();

        let results = cached_results
            .iter()
            .filter(|r| matching_names.contains(&r.name))
            .cloned()
            .collect();

        FilterOutcome { results, summary: parsed.summary }
    }
}

fn fallback(cached_results: &[SearchResultItem], summary: String) -> FilterOutcome {
    FilterOutcome { results: cached_results.to_vec(), summary }
}

fn build_prompt(criteria: &str, cached_results: &[SearchResultItem]) -> Vec<ChatMessage> {
    let system = "You narrow an already-ranked list of resume candidates down to the ones \
        that satisfy a follow-up criterion. You never modify a candidate's data and you never \
        invent a match that the evidence below does not support. Typical follow-up criteria: \
        whether the candidate's current company is service-based or product-based, whether \
        their location text matches a named city or region, whether their stated experience \
        meets a threshold, or whether a specific skill is present.\n\
        \n\
        Respond with a single JSON object and nothing else, in this exact shape:\n\
        {\"filteredResults\": [{\"name\": string, \"matches\": bool, \"reasoning\": string}], \
        \"summary\": string}";

    let mut user = format!("Follow-up criterion: {criteria}\n\nPreviously returned candidates:\n");
    for (i, candidate) in cached_results.iter().enumerate() {
        let info = candidate.extracted_info.as_ref();
        user.push_str(&format!(
            "{}. name: {}\n   company: {}\n   location: {}\n   skills: {}\n   experience: {}\n\n",
            i + 1,
            candidate.name,
            info.and_then(|i| i.current_company.clone()).unwrap_or_else(|| "unknown".into()),
            info.and_then(|i| i.location.clone()).unwrap_or_else(|| "unknown".into()),
            info.map(|i| i.skills.join(", ")).filter(|s| !s.is_empty()).unwrap_or_else(|| "unknown".into()),
            info.and_then(|i| i.experience.clone()).unwrap_or_else(|| "unknown".into()),
        ));
    }

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

#[derive(Debug, Deserialize)]
struct FilterResponse {
    #[serde(rename = "filteredResults")]
    filtered_results: Vec<FilterVerdict>,
    summary: String,
}

#[derive(Debug, Deserialize)]
struct FilterVerdict {
    name: String,
    matches: bool,
    #[allow(dead_code)]
    #[serde(default)]
    reasoning: String,
}
