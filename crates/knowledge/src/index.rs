//! SQLite-backed vector index for policy passages.

use crate::embeddings::EmbeddingProvider;
use crate::types::{DocumentMetadata, MetadataFilter, SearchHit};
use crate::vector_index::VectorIndex;
use pris_core::{AppError, AppResult};
use rusqlite::{params, Connection, OpenFlags};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS documents (
    id TEXT PRIMARY KEY,
    content TEXT NOT NULL,
    source TEXT NOT NULL,
    country TEXT,
    metadata TEXT NOT NULL,
    embedding BLOB NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_documents_country ON documents(country);
"#;

/// Pre-built passage index with brute-force cosine ranking.
///
/// Ranking runs on the blocking pool, so a caller-side timeout can abandon a
/// long scan without stalling the runtime.
pub struct SqliteVectorIndex {
    conn: Arc<Mutex<Connection>>,
    embedder: Arc<dyn EmbeddingProvider>,
    path: PathBuf,
}

impl SqliteVectorIndex {
    /// Open an existing index read-only. A missing file or schema fails with `IndexUnavailable`.
    pub fn open(db_path: &Path, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        if !db_path.exists() {
            return Err(AppError::IndexUnavailable(format!(
                "Index file not found: {:?}",
                db_path
            )));
        }

        let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to open SQLite index: {}", e)))?;

        let has_documents: bool = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name='documents'",
                [],
                |row| row.get::<_, i64>(0).map(|n| n > 0),
            )
            .map_err(|e| AppError::IndexUnavailable(format!("Failed to inspect index: {}", e)))?;

        if !has_documents {
            return Err(AppError::IndexUnavailable(format!(
                "{:?} is not a passage index (no documents table)",
                db_path
            )));
        }

        tracing::debug!("Opened SQLite index at {:?}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            embedder,
            path: db_path.to_path_buf(),
        })
    }

    /// Create (or reopen) an index file with the passage schema.
    pub fn create(db_path: &Path, embedder: Arc<dyn EmbeddingProvider>) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| AppError::Knowledge(format!("Failed to create index directory: {}", e)))?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

        tracing::debug!("Initialized SQLite index at {:?}", db_path);

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            embedder,
            path: db_path.to_path_buf(),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Embed and store one passage. Returns the generated id.
    pub async fn insert_document(&self, content: &str, metadata: &DocumentMetadata) -> AppResult<String> {
        let embedding = self.embedder.embed(content).await?;
        let embedding_bytes = embedding_to_bytes(&embedding);

        let extra_json = serde_json::to_string(&metadata.extra)
            .map_err(|e| AppError::Knowledge(format!("Failed to serialize metadata: {}", e)))?;

        let id = uuid::Uuid::new_v4().to_string();

        self.lock()?
            .execute(
                "INSERT INTO documents (id, content, source, country, metadata, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                params![
                    id,
                    content,
                    metadata.source,
                    metadata.country,
                    extra_json,
                    embedding_bytes,
                ],
            )
            .map_err(|e| AppError::Knowledge(format!("Failed to insert document: {}", e)))?;

        Ok(id)
    }

    pub fn document_count(&self) -> AppResult<usize> {
        self.lock()?
            .query_row("SELECT COUNT(*) FROM documents", [], |row| {
                row.get::<_, i64>(0).map(|v| v as usize)
            })
            .map_err(|e| AppError::Knowledge(format!("Failed to count documents: {}", e)))
    }

    fn lock(&self) -> AppResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| AppError::Knowledge("Index connection lock poisoned".to_string()))
    }
}

#[async_trait::async_trait]
impl VectorIndex for SqliteVectorIndex {
    fn name(&self) -> &str {
        "sqlite"
    }

    async fn similarity_search(
        &self,
        query_text: &str,
        k: usize,
        filter: Option<&MetadataFilter>,
    ) -> AppResult<Vec<SearchHit>> {
        let query_embedding = self
            .embedder
            .embed(query_text)
            .await
            .map_err(|e| AppError::RetrievalFailure(format!("Failed to embed query: {}", e)))?;

        let conn = Arc::clone(&self.conn);
        let country = filter.map(|f| f.country.clone());

        tokio::task::spawn_blocking(move || rank(&conn, &query_embedding, k, country.as_deref()))
            .await
            .map_err(|e| AppError::RetrievalFailure(format!("Search task failed: {}", e)))?
    }
}

/// Score every candidate row against the query and keep the best `k`.
fn rank(
    conn: &Mutex<Connection>,
    query_embedding: &[f32],
    k: usize,
    country: Option<&str>,
) -> AppResult<Vec<SearchHit>> {
    let conn = conn
        .lock()
        .map_err(|_| AppError::RetrievalFailure("Index connection lock poisoned".to_string()))?;

    let sql = match country {
        Some(_) => {
            "SELECT content, source, country, metadata, embedding FROM documents
             WHERE country = ?1 ORDER BY rowid"
        }
        None => "SELECT content, source, country, metadata, embedding FROM documents ORDER BY rowid",
    };

    let mut stmt = conn
        .prepare(sql)
        .map_err(|e| AppError::RetrievalFailure(format!("Failed to prepare query: {}", e)))?;

    let map_row = |row: &rusqlite::Row<'_>| -> rusqlite::Result<(String, String, Option<String>, String, Vec<u8>)> {
        Ok((row.get(0)?, row.get(1)?, row.get(2)?, row.get(3)?, row.get(4)?))
    };

    let rows = match country {
        Some(country) => stmt.query_map(params![country], map_row),
        None => stmt.query_map([], map_row),
    }
    .map_err(|e| AppError::RetrievalFailure(format!("Failed to query documents: {}", e)))?;

    let mut results = Vec::new();
    for row in rows {
        let (content, source, country, extra_json, embedding_bytes) = row
            .map_err(|e| AppError::RetrievalFailure(format!("Failed to read document: {}", e)))?;

        let embedding = bytes_to_embedding(&embedding_bytes)?;
        if embedding.len() != query_embedding.len() {
            return Err(AppError::RetrievalFailure(format!(
                "Embedding dimension mismatch: index has {}, query has {}",
                embedding.len(),
                query_embedding.len()
            )));
        }

        let extra = match serde_json::from_str(&extra_json) {
            Ok(extra) => extra,
            Err(e) => {
                tracing::warn!("Ignoring unreadable metadata on {} passage: {}", source, e);
                serde_json::Map::new()
            }
        };

        results.push(SearchHit {
            score: cosine_similarity(query_embedding, &embedding),
            content,
            metadata: DocumentMetadata {
                source,
                country,
                extra,
            },
        });
    }

    // Stable sort keeps insertion order among equal scores
    results.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
    results.truncate(k);

    tracing::debug!("Retrieved {} documents (requested top-{})", results.len(), k);

    Ok(results)
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::RetrievalFailure(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine similarity of equal-length vectors; a zero vector scores 0.
fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot_product / (norm_a * norm_b)
}
