//! Vector index over chunks: build, load and top-k search.

use crate::embeddings::{cosine_similarity, EmbeddingProvider};
use crate::index::{self, CollectionMeta};
use crate::types::{Chunk, IndexInfo, RetrievalResult, ScoredChunk};
use chrono::Utc;
use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use taxrag_core::{AppError, AppResult};

/// A loaded collection of chunks and their embeddings.
///
/// The embedding provider passed at build or load time is kept and reused
/// for every query, so queries are embedded exactly like the chunks were.
#[derive(Debug)]
pub struct VectorIndex {
    db_dir: PathBuf,
    meta: CollectionMeta,
    entries: Vec<(Chunk, Vec<f32>)>,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl VectorIndex {
    /// Embed `chunks` and persist them as collection `collection_id` under `db_dir`.
    ///
    /// With `force_recreate`, any existing state in `db_dir` is deleted first.
    /// Without it, an existing non-empty collection is left untouched and the
    /// build is rejected.
    ///
    /// # Errors
    /// * `AppError::Validation` if `chunks` is empty or the collection already exists
    /// * `AppError::Backend` if embedding fails
    /// * `AppError::Storage` if the index cannot be written
    pub async fn build(
        db_dir: &Path,
        chunks: Vec<Chunk>,
        collection_id: &str,
        force_recreate: bool,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        if chunks.is_empty() {
            return Err(AppError::Validation(
                "Cannot build an index from an empty document set".to_string(),
            ));
        }

        let db_path = index::index_path(db_dir);

        if force_recreate && db_dir.exists() {
            tracing::info!("Removing existing vector store at {:?}", db_dir);
            std::fs::remove_dir_all(db_dir)?;
        } else if let Some(conn) = index::open_existing(&db_path)? {
            if index::collection_meta(&conn, collection_id)?.is_some()
                && index::count_chunks(&conn, collection_id)? > 0
            {
                return Err(AppError::Validation(format!(
                    "Collection '{}' already exists in {}; rebuild with force_recreate",
                    collection_id,
                    db_dir.display()
                )));
            }
        }

        tracing::info!(
            "Embedding {} chunks with {} ({})",
            chunks.len(),
            embedder.provider_name(),
            embedder.model_name()
        );

        let texts: Vec<String> = chunks.iter().map(|c| c.text.clone()).collect();
        let embeddings = embedder.embed_batch(&texts).await?;

        if embeddings.len() != chunks.len() {
            return Err(AppError::Backend(format!(
                "Embedding provider returned {} vectors for {} chunks",
                embeddings.len(),
                chunks.len()
            )));
        }
        let dimensions = embedder.dimensions();
        if let Some(bad) = embeddings.iter().find(|e| e.len() != dimensions) {
            return Err(AppError::Backend(format!(
                "Embedding of length {} does not match dimension {}",
                bad.len(),
                dimensions
            )));
        }

        let meta = CollectionMeta {
            name: collection_id.to_string(),
            dimensions,
            embedding_model: embedder.model_name().to_string(),
            built_at: Utc::now(),
        };
        let entries: Vec<(Chunk, Vec<f32>)> = chunks.into_iter().zip(embeddings).collect();

        let mut conn = index::open_index(&db_path)?;
        index::write_collection(&mut conn, &meta, &entries)?;

        tracing::info!(
            "Built collection '{}' with {} chunks at {:?}",
            collection_id,
            entries.len(),
            db_dir
        );

        Ok(Self {
            db_dir: db_dir.to_path_buf(),
            meta,
            entries,
            embedder,
        })
    }

    /// Reopen a previously built collection.
    ///
    /// # Errors
    /// * `AppError::NotFound` if nothing was persisted for `collection_id`
    /// * `AppError::Config` if the provider's dimension differs from the collection's
    /// * `AppError::Storage` if stored data is inconsistent
    pub fn load(
        db_dir: &Path,
        collection_id: &str,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let not_found = || {
            AppError::NotFound(format!(
                "No index for collection '{}' in {}",
                collection_id,
                db_dir.display()
            ))
        };

        let conn = index::open_existing(&index::index_path(db_dir))?.ok_or_else(not_found)?;
        let meta = index::collection_meta(&conn, collection_id)?.ok_or_else(not_found)?;

        if meta.dimensions != embedder.dimensions() {
            return Err(AppError::Config(format!(
                "Collection '{}' has dimension {} but the embedding provider produces {}",
                collection_id,
                meta.dimensions,
                embedder.dimensions()
            )));
        }
        if meta.embedding_model != embedder.model_name() {
            tracing::warn!(
                "Collection '{}' was built with '{}' but queries use '{}'",
                collection_id,
                meta.embedding_model,
                embedder.model_name()
            );
        }

        let entries = index::read_chunks(&conn, collection_id, meta.dimensions)?;

        tracing::info!(
            "Loaded collection '{}' with {} chunks",
            collection_id,
            entries.len()
        );

        Ok(Self {
            db_dir: db_dir.to_path_buf(),
            meta,
            entries,
            embedder,
        })
    }

    /// Introspect persisted state without loading it.
    pub fn inspect(db_dir: &Path, collection_id: &str) -> AppResult<IndexInfo> {
        let absent = IndexInfo {
            exists: false,
            count: 0,
            collection_id: collection_id.to_string(),
            embedding_model: None,
            dimensions: None,
            built_at: None,
        };

        let Some(conn) = index::open_existing(&index::index_path(db_dir))? else {
            return Ok(absent);
        };
        let Some(meta) = index::collection_meta(&conn, collection_id)? else {
            return Ok(absent);
        };
        let count = index::count_chunks(&conn, collection_id)?;

        Ok(IndexInfo {
            exists: true,
            count,
            collection_id: meta.name,
            embedding_model: Some(meta.embedding_model),
            dimensions: Some(meta.dimensions),
            built_at: Some(meta.built_at),
        })
    }

    /// Top-`k` chunks for `query`, by descending cosine similarity.
    ///
    /// Ties keep insertion order. Fewer than `k` chunks in the index returns all of them.
    ///
    /// # Errors
    /// Returns `AppError::Validation` if `k` is zero.
    pub async fn search(&self, query: &str, k: usize) -> AppResult<RetrievalResult> {
        if k == 0 {
            return Err(AppError::Validation("k must be at least 1".to_string()));
        }

        let query_embedding = self.embedder.embed(query).await?;

        let mut scored: Vec<ScoredChunk> = self
            .entries
            .iter()
            .map(|(chunk, embedding)| ScoredChunk {
                chunk: chunk.clone(),
                score: cosine_similarity(&query_embedding, embedding),
            })
            .collect();

        // Stable sort keeps insertion order for equal scores
        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        tracing::debug!(
            "Retrieved {} chunks (requested top-{}, best score {:.3})",
            scored.len(),
            k,
            scored.first().map(|s| s.score).unwrap_or(0.0)
        );

        Ok(scored)
    }

    /// Introspection of the loaded collection.
    pub fn info(&self) -> IndexInfo {
        IndexInfo {
            exists: true,
            count: self.entries.len(),
            collection_id: self.meta.name.clone(),
            embedding_model: Some(self.meta.embedding_model.clone()),
            dimensions: Some(self.meta.dimensions),
            built_at: Some(self.meta.built_at),
        }
    }

    pub fn collection_id(&self) -> &str {
        &self.meta.name
    }

    pub fn db_dir(&self) -> &Path {
        &self.db_dir
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
