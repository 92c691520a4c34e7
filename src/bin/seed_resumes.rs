use anyhow::Result;
use resume_retriever::config::Config;
use resume_retriever::db;
use resume_retriever::db::models::NewResume;
use resume_retriever::db::store::{PgStoreAdapter, StoreAdapter};
use std::sync::Arc;

/// Inserts a handful of synthetic resumes for local development and
/// integration tests. This is a seeding tool, not an ingestion pipeline:
/// it accepts pre-structured JSON records with embeddings already
/// computed, mirroring the teacher's `ingest_cli` shape without its
/// document-parsing responsibilities.
#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-resumes.json>", args[0]);
        eprintln!("Example: {} demos/sample_resumes.json", args[0]);
        std::process::exit(1);
    }
    let file_path = &args[1];

    println!("🚀 Seeding resumes from: {file_path}");

    let raw = tokio::fs::read_to_string(file_path).await?;
    let resumes: Vec<NewResume> = serde_json::from_str(&raw)?;

    let cfg = Config::from_env();
    let client = db::connect::get_client().await?;
    let store = PgStoreAdapter::new(Arc::new(client), cfg.collaborator_timeout_ms);

    let mut inserted = 0;
    let mut errors = Vec::new();
    for resume in &resumes {
        match store.insert_resume(resume).await {
            Ok(id) => {
                inserted += 1;
                println!("   inserted {} as id {id}", resume.name);
            }
            Err(e) => errors.push(format!("{}: {e}", resume.name)),
        }
    }

    println!("✅ Seeded {inserted}/{} resumes", resumes.len());
    if !errors.is_empty() {
        println!("⚠️  Errors:");
        for e in &errors {
            println!("   - {e}");
        }
    }

    Ok(())
}
