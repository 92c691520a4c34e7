use std::sync::Arc;

use regex::RegexBuilder;

use crate::db::store::StoreAdapter;
use crate::errors::StoreError;

use super::{snippet, MatchType, SearchResultItem};

/// Per-field weights applied when summing keyword hits into a raw score,
/// matched one-to-one with `crate::db::store::KEYWORD_FIELDS`.
const FIELD_WEIGHTS: [(&str, f32); 5] = [
    ("text", 1.0),
    ("name", 2.0),
    ("email", 1.5),
    ("skills", 3.0),
    ("role", 2.5),
];

const SNIPPET_LEN: usize = 200;
const NORMALIZATION_CEILING: f32 = 30.0;

/// The Keyword Engine (component D): field-weighted regex-hit scoring over
/// the document store.
pub struct KeywordEngine {
    store: Arc<dyn StoreAdapter>,
}

impl KeywordEngine {
    pub fn new(store: Arc<dyn StoreAdapter>) -> Self {
        Self { store }
    }

    pub async fn search(&self, query: &str, k: usize) -> Result<Vec<SearchResultItem>, StoreError> {
        let tokens: Vec<String> = query
            .split_whitespace()
            .map(|t| t.to_string())
            .filter(|t| !t.is_empty())
            .collect();
        if tokens.is_empty() {
            return Ok(Vec::new());
        }

        let headroom = (2 * k).max(1) as i64;
        let documents = self.store.keyword_query(&tokens, headroom).await?;

        let alternation = tokens
            .iter()
            .map(|t| regex::escape(t))
            .collect::<Vec<_>>()
            .join("|");
        let pattern = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .build()
            .expect("token alternation is always a valid regex");

        let mut scored: Vec<SearchResultItem> = documents
            .into_iter()
            .map(|doc| {
                let raw = FIELD_WEIGHTS
                    .iter()
                    .map(|(field, weight)| weight * count_matches(&pattern, field_text(&doc, field)))
                    .sum::<f32>();
                let score = (raw / NORMALIZATION_CEILING).min(1.0);

                SearchResultItem {
                    id: doc.id,
                    name: doc.name.clone(),
                    email: doc.email.clone(),
                    phone: doc.phone.clone(),
                    content: build_snippet(&pattern, &doc.text),
                    score,
                    match_type: MatchType::Keyword,
                    extracted_info: None,
                    llm_reasoning: None,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        Ok(scored)
    }
}

fn field_text<'a>(doc: &'a crate::db::models::ResumeDocument, field: &str) -> &'a str {
    match field {
        "text" => &doc.text,
        "name" => &doc.name,
        "email" => &doc.email,
        "skills" => &doc.skills,
        "role" => &doc.role,
        _ => "",
    }
}

fn count_matches(pattern: &regex::Regex, haystack: &str) -> f32 {
    pattern.find_iter(haystack).count() as f32
}

fn build_snippet(pattern: &regex::Regex, text: &str) -> String {
    match pattern.find(text) {
        Some(m) => {
            let start = m.start().saturating_sub(SNIPPET_LEN / 2);
            let end = (m.start() + SNIPPET_LEN / 2).min(text.len());
            let mut window = text[start..end].to_string();
            if start > 0 {
                window = format!("...{window}");
            }
            if end < text.len() {
                window = format!("{window}...");
            }
            window
        }
        None => snippet(text, SNIPPET_LEN),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn count_matches_is_case_insensitive() {
        let pattern = RegexBuilder::new("selenium").case_insensitive(true).build().unwrap();
        assert_eq!(count_matches(&pattern, "Selenium and selenium grid"), 2.0);
    }

    #[test]
    fn snippet_falls_back_to_leading_window_without_a_match() {
        let pattern = RegexBuilder::new("zzz").case_insensitive(true).build().unwrap();
        let text = "a".repeat(250);
        let snip = build_snippet(&pattern, &text);
        assert!(snip.ends_with("..."));
        assert!(!snip.starts_with("..."));
    }
}
