use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pgvector::Vector;
use tokio_postgres::Client;

use crate::db::models::{NewResume, ResumeDocument, ScoredDocument};
use crate::errors::StoreError;

/// Fields the keyword engine is allowed to search, in the order their
/// per-field weights are applied by [`crate::engines::keyword`].
pub const KEYWORD_FIELDS: [&str; 6] = ["text", "name", "email", "skills", "role", "company"];

/// The Document Store Adapter: keyword and vector access to the resume
/// index. Implementations must be safe for concurrent use.
#[async_trait]
pub trait StoreAdapter: Send + Sync {
    /// Returns documents whose text matches any of `tokens` (case
    /// insensitive) in any of `KEYWORD_FIELDS`, up to `limit` rows. Scoring
    /// is the caller's job; this only filters and returns raw documents.
    async fn keyword_query(
        &self,
        tokens: &[String],
        limit: i64,
    ) -> Result<Vec<ResumeDocument>, StoreError>;

    /// Returns the `k` documents whose embeddings are closest to `vector`
    /// under cosine similarity, paired with that similarity in `[0, 1]`.
    async fn vector_query(
        &self,
        vector: &[f32],
        k: i64,
    ) -> Result<Vec<ScoredDocument>, StoreError>;

    /// Inserts a resume for local development / test seeding. Not part of
    /// the production ingestion path.
    async fn insert_resume(&self, resume: &NewResume) -> Result<i64, StoreError>;
}

/// Postgres + pgvector backed adapter, grounded on the teacher's
/// `db::connect`/`db::vector` modules.
pub struct PgStoreAdapter {
    client: Arc<Client>,
    timeout_ms: u64,
}

impl PgStoreAdapter {
    pub fn new(client: Arc<Client>, timeout_ms: u64) -> Self {
        Self { client, timeout_ms }
    }
}

#[async_trait]
impl StoreAdapter for PgStoreAdapter {
    async fn keyword_query(
        &self,
        tokens: &[String],
        limit: i64,
    ) -> Result<Vec<ResumeDocument>, StoreError> {
        if tokens.is_empty() {
            return Ok(Vec::new());
        }
        // A single alternation over the tokens, applied to every searchable
        // field with Postgres's case-insensitive regex operator.
        let pattern = tokens
            .iter()
            .map(|t| regex_escape(t))
            .collect::<Vec<_>>()
            .join("|");

        let where_clause = KEYWORD_FIELDS
            .iter()
            .map(|f| format!("{f} ~* $1"))
            .collect::<Vec<_>>()
            .join(" OR ");

        let sql = format!(
            "SELECT id, name, email, phone, role, skills, company, text FROM resumes
             WHERE {where_clause} LIMIT $2"
        );

        let rows = match tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            self.client.query(&sql, &[&pattern, &limit]),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(StoreError::Timeout),
        };
        Ok(rows.iter().map(row_to_document).collect())
    }

    async fn vector_query(
        &self,
        vector: &[f32],
        k: i64,
    ) -> Result<Vec<ScoredDocument>, StoreError> {
        let embedding = Vector::from(vector.to_vec());
        let rows = match tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            self.client.query(
                "SELECT id, name, email, phone, role, skills, company, text,
                        1 - (embedding <=> $1) AS similarity
                 FROM resumes
                 WHERE embedding IS NOT NULL
                 ORDER BY embedding <=> $1
                 LIMIT $2",
                &[&embedding, &k],
            ),
        )
        .await
        {
            Ok(Ok(rows)) => rows,
            Ok(Err(e)) => {
                return Err(if e.to_string().contains("no such index") || e.to_string().contains("ivfflat") {
                    StoreError::IndexUnavailable
                } else {
                    StoreError::from(e)
                });
            }
            Err(_) => return Err(StoreError::Timeout),
        };

        Ok(rows
            .iter()
            .map(|row| {
                let similarity: f64 = row.get("similarity");
                ScoredDocument {
                    document: row_to_document(row),
                    raw_score: similarity as f32,
                }
            })
            .collect())
    }

    async fn insert_resume(&self, resume: &NewResume) -> Result<i64, StoreError> {
        let embedding = Vector::from(resume.embedding.clone());
        let row = match tokio::time::timeout(
            Duration::from_millis(self.timeout_ms),
            self.client.query_one(
                "INSERT INTO resumes (name, email, phone, role, skills, company, text, embedding)
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
                 RETURNING id",
                &[
                    &resume.name,
                    &resume.email,
                    &resume.phone,
                    &resume.role,
                    &resume.skills,
                    &resume.company,
                    &resume.text,
                    &embedding,
                ],
            ),
        )
        .await
        {
            Ok(result) => result?,
            Err(_) => return Err(StoreError::Timeout),
        };
        Ok(row.get(0))
    }
}

fn row_to_document(row: &tokio_postgres::Row) -> ResumeDocument {
    ResumeDocument {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
        phone: row.get("phone"),
        role: row.get("role"),
        skills: row.get("skills"),
        company: row.get("company"),
        text: row.get("text"),
    }
}

fn regex_escape(token: &str) -> String {
    let mut out = String::with_capacity(token.len());
    for c in token.chars() {
        if "\\.+*?()|[]{}^$".contains(c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}
