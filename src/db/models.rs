use serde::{Deserialize, Serialize};

/// A resume row as stored in the document store. The core never mutates
/// these; ingestion (out of scope) is the only writer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResumeDocument {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub skills: String,
    pub company: String,
    pub text: String,
}

/// A document paired with a raw, un-normalized similarity score from one
/// engine (keyword hit count or cosine similarity).
#[derive(Debug, Clone)]
pub struct ScoredDocument {
    pub document: ResumeDocument,
    pub raw_score: f32,
}

/// A document to insert via the seeding path. Distinct from
/// `ResumeDocument` because it carries the embedding the seeder already
/// computed, and has no id yet.
#[derive(Debug, Clone, Deserialize)]
pub struct NewResume {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub role: String,
    pub skills: String,
    pub company: String,
    pub text: String,
    pub embedding: Vec<f32>,
}
