use serde::{Deserialize, Serialize};

use crate::llm::chat::{ChatMessage, ChatModelClient};

use super::{ExtractedInfo, MatchType, SearchResultItem};

const MAX_CANDIDATE_CHARS: usize = 3000;

/// Per-candidate verdict plus a human summary, returned alongside the
/// filtered/reordered results so callers (the Chat endpoint) can surface
/// the LLM's reasoning even when nothing numeric changed.
#[derive(Debug, Clone, Serialize)]
pub struct RerankAnalysis {
    pub summary: String,
    pub fell_back: bool,
}

/// The LLM Re-ranker (component G): scores and filters a candidate set
/// against the query using a single chat-completion call.
pub struct LlmReranker<'a> {
    chat: &'a dyn ChatModelClient,
}

impl<'a> LlmReranker<'a> {
    pub fn new(chat: &'a dyn ChatModelClient) -> Self {
        Self { chat }
    }

    pub async fn rerank_and_filter(
        &self,
        query: &str,
        candidates: Vec<SearchResultItem>,
    ) -> (Vec<SearchResultItem>, RerankAnalysis) {
        if candidates.is_empty() {
            return (Vec::new(), RerankAnalysis { summary: "no candidates to rank".into(), fell_back: false });
        }

        let messages = build_prompt(query, &candidates);

        let raw_response = match self.chat.complete(&messages).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("chat model call failed during re-rank, falling back to original order: {e}");
                return fallback(candidates, format!("re-rank unavailable ({e}); showing unranked results"));
            }
        };

        let parsed = match extract_json(&raw_response).and_then(|json| {
            serde_json::from_str::<LlmRerankResponse>(&json).map_err(|e| e.to_string())
        }) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!("failed to parse re-rank response, falling back to original order: {e}");
                return fallback(candidates, "re-rank response could not be parsed; showing unranked results".into());
            }
        };

        apply_verdicts(candidates, parsed)
    }
}

fn fallback(candidates: Vec<SearchResultItem>, summary: String) -> (Vec<SearchResultItem>, RerankAnalysis) {
    (candidates, RerankAnalysis { summary, fell_back: true })
}

fn build_prompt(query: &str, candidates: &[SearchResultItem]) -> Vec<ChatMessage> {
    let system = "You are a resume screening assistant. You are given a search query and a \
        numbered list of candidate resumes. Decide, per candidate, whether it matches the \
        query's criteria.\n\
        \n\
        If the query names concrete criteria (a city, a company, specific skills, a minimum \
        years of experience), operate in STRICT mode: require an explicit textual match for \
        location — never infer a candidate's city from an area code or from a past employer's \
        headquarters. Score relevance from 0.0 to 1.0 based on how completely the resume text \
        satisfies the stated criteria.\n\
        \n\
        If the query is generic (e.g. \"top candidates\", \"best resumes\"), operate in LENIENT \
        mode: mark every candidate as matching and rank purely by resume quality.\n\
        \n\
        Respond with a single JSON object and nothing else, in this exact shape:\n\
        {\"matches\": [{\"name\": string, \"relevanceScore\": number, \"matchesCriteria\": bool, \
        \"reasoning\": string, \"extractedInfo\": {\"currentCompany\": string?, \"location\": \
        string?, \"skills\": string|array, \"experience\": string?, \"keyHighlights\": \
        string|array}?}], \"summary\": string}";

    let mut user = format!("Query: {query}\n\nCandidates:\n");
    for (i, candidate) in candidates.iter().enumerate() {
        let content = if candidate.content.chars().count() > MAX_CANDIDATE_CHARS {
            let truncated: String = candidate.content.chars().take(MAX_CANDIDATE_CHARS).collect();
            format!("{truncated}... [truncated]")
        } else {
            candidate.content.clone()
        };
        user.push_str(&format!(
            "{}. name: {} | email: {} | phone: {}\n{}\n\n",
            i + 1,
            candidate.name,
            candidate.email,
            candidate.phone,
            content
        ));
    }

    vec![ChatMessage::system(system), ChatMessage::user(user)]
}

/// Extracts a JSON object from an LLM response, unwrapping a fenced
/// ```json ... ``` block if present, otherwise returning the body as-is.
pub fn extract_json(response: &str) -> Result<String, String> {
    let trimmed = response.trim();
    if let Some(start) = trimmed.find("```") {
        let after_fence = &trimmed[start + 3..];
        let after_fence = after_fence.strip_prefix("json").unwrap_or(after_fence);
        let after_fence = after_fence.trim_start_matches('\n');
        if let Some(end) = after_fence.find("```") {
            return Ok(after_fence[..end].trim().to_string());
        }
    }
    if trimmed.starts_with('{') {
        return Ok(trimmed.to_string());
    }
    Err("response did not contain a JSON object".to_string())
}

#[derive(Debug, Deserialize)]
struct LlmRerankResponse {
    matches: Vec<LlmVerdict>,
    summary: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LlmVerdict {
    name: String,
    relevance_score: f32,
    matches_criteria: bool,
    #[serde(default)]
    reasoning: String,
    #[serde(default)]
    extracted_info: Option<RawExtractedInfo>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawExtractedInfo {
    #[serde(default)]
    current_company: Option<String>,
    #[serde(default)]
    location: Option<String>,
    #[serde(default)]
    skills: Option<StringOrList>,
    #[serde(default)]
    experience: Option<String>,
    #[serde(default)]
    key_highlights: Option<StringOrList>,
}

/// The LLM is free to return either a JSON array of strings or one
/// comma-separated string for list-shaped fields; normalize both to a list.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum StringOrList {
    List(Vec<String>),
    Single(String),
}

impl StringOrList {
    fn into_vec(self) -> Vec<String> {
        match self {
            StringOrList::List(items) => items,
            StringOrList::Single(s) => s.split(',').map(|p| p.trim().to_string()).filter(|p| !p.is_empty()).collect(),
        }
    }
}

impl From<RawExtractedInfo> for ExtractedInfo {
    fn from(raw: RawExtractedInfo) -> Self {
        ExtractedInfo {
            current_company: raw.current_company,
            location: raw.location,
            skills: raw.skills.map(StringOrList::into_vec).unwrap_or_default(),
            experience: raw.experience,
            key_highlights: raw.key_highlights.map(StringOrList::into_vec).unwrap_or_default(),
        }
    }
}

fn apply_verdicts(
    candidates: Vec<SearchResultItem>,
    parsed: LlmRerankResponse,
) -> (Vec<SearchResultItem>, RerankAnalysis) {
    let mut by_name: std::collections::HashMap<String, SearchResultItem> =
        candidates.into_iter().map(|c| (c.name.clone(), c)).collect();

    let mut results = Vec::new();
    for verdict in parsed.matches {
        if !verdict.matches_criteria {
            continue;
        }
        let Some(mut candidate) = by_name.remove(&verdict.name) else {
            tracing::warn!(candidate = %verdict.name, "re-rank verdict named a candidate that was not in the input set");
            continue;
        };
        candidate.score = verdict.relevance_score;
        candidate.match_type = MatchType::LlmReranked;
        candidate.llm_reasoning = Some(verdict.reasoning);
        candidate.extracted_info = verdict.extracted_info.map(ExtractedInfo::from);
        results.push(candidate);
    }

    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));

    (results, RerankAnalysis { summary: parsed.summary, fell_back: false })
}
