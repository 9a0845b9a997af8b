//! SQLite storage for persisted collections.
//!
//! Layout of `<vector_db_dir>/index.sqlite`:
//! - `collections(name, dimensions, embedding_model, built_at)`
//! - `chunks(collection, position, source, page, text, embedding)`
//!
//! Embeddings are little-endian `f32` blobs. A `NULL` page means the page is unknown.

use crate::types::{Chunk, PageNumber};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use std::path::{Path, PathBuf};
use taxrag_core::{AppError, AppResult};

/// File name of the index database inside the vector store directory.
pub const INDEX_FILE: &str = "index.sqlite";

/// Path of the index database for a vector store directory.
pub fn index_path(db_dir: &Path) -> PathBuf {
    db_dir.join(INDEX_FILE)
}

/// Collection-level metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectionMeta {
    pub name: String,
    pub dimensions: usize,
    pub embedding_model: String,
    pub built_at: DateTime<Utc>,
}

/// Open (creating if needed) the index database and its tables.
pub fn open_index(db_path: &Path) -> AppResult<Connection> {
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let conn = Connection::open(db_path)
        .map_err(|e| AppError::Storage(format!("Failed to open SQLite index: {}", e)))?;

    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS collections (
            name TEXT PRIMARY KEY,
            dimensions INTEGER NOT NULL,
            embedding_model TEXT NOT NULL,
            built_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS chunks (
            collection TEXT NOT NULL,
            position INTEGER NOT NULL,
            source TEXT NOT NULL,
            page INTEGER,
            text TEXT NOT NULL,
            embedding BLOB NOT NULL,
            PRIMARY KEY (collection, position),
            FOREIGN KEY (collection) REFERENCES collections(name)
        );
        "#,
    )
    .map_err(|e| AppError::Storage(format!("Failed to create tables: {}", e)))?;

    tracing::debug!("Opened SQLite index at {:?}", db_path);
    Ok(conn)
}

/// Open an existing index database without creating anything.
pub fn open_existing(db_path: &Path) -> AppResult<Option<Connection>> {
    if !db_path.is_file() {
        return Ok(None);
    }

    let conn = Connection::open_with_flags(db_path, OpenFlags::SQLITE_OPEN_READ_ONLY)
        .map_err(|e| AppError::Storage(format!("Failed to open SQLite index: {}", e)))?;
    Ok(Some(conn))
}

/// Metadata of a collection, if it exists.
pub fn collection_meta(conn: &Connection, name: &str) -> AppResult<Option<CollectionMeta>> {
    let row = conn
        .query_row(
            "SELECT name, dimensions, embedding_model, built_at FROM collections WHERE name = ?1",
            params![name],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, i64>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                ))
            },
        )
        .optional()
        .map_err(|e| AppError::Storage(format!("Failed to read collection: {}", e)))?;

    let Some((name, dimensions, embedding_model, built_at)) = row else {
        return Ok(None);
    };

    let built_at = DateTime::parse_from_rfc3339(&built_at)
        .map_err(|e| AppError::Storage(format!("Invalid build timestamp: {}", e)))?
        .with_timezone(&Utc);

    Ok(Some(CollectionMeta {
        name,
        dimensions: dimensions as usize,
        embedding_model,
        built_at,
    }))
}

/// Number of chunks stored for a collection.
pub fn count_chunks(conn: &Connection, name: &str) -> AppResult<usize> {
    conn.query_row(
        "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
        params![name],
        |row| row.get::<_, i64>(0),
    )
    .map(|count| count as usize)
    .map_err(|e| AppError::Storage(format!("Failed to count chunks: {}", e)))
}

/// Replace a collection with the given chunks and embeddings in one transaction.
pub fn write_collection(
    conn: &mut Connection,
    meta: &CollectionMeta,
    entries: &[(Chunk, Vec<f32>)],
) -> AppResult<()> {
    let tx = conn
        .transaction()
        .map_err(|e| AppError::Storage(format!("Failed to start transaction: {}", e)))?;

    tx.execute("DELETE FROM chunks WHERE collection = ?1", params![meta.name])
        .map_err(|e| AppError::Storage(format!("Failed to clear chunks: {}", e)))?;

    tx.execute(
        "INSERT OR REPLACE INTO collections (name, dimensions, embedding_model, built_at)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            meta.name,
            meta.dimensions as i64,
            meta.embedding_model,
            meta.built_at.to_rfc3339(),
        ],
    )
    .map_err(|e| AppError::Storage(format!("Failed to write collection: {}", e)))?;

    {
        let mut stmt = tx
            .prepare(
                "INSERT INTO chunks (collection, position, source, page, text, embedding)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            )
            .map_err(|e| AppError::Storage(format!("Failed to prepare insert: {}", e)))?;

        for (position, (chunk, embedding)) in entries.iter().enumerate() {
            stmt.execute(params![
                meta.name,
                position as i64,
                chunk.source_id,
                chunk.page.as_number(),
                chunk.text,
                embedding_to_bytes(embedding),
            ])
            .map_err(|e| AppError::Storage(format!("Failed to insert chunk: {}", e)))?;
        }
    }

    tx.commit()
        .map_err(|e| AppError::Storage(format!("Failed to commit index: {}", e)))?;

    tracing::debug!(
        "Wrote {} chunks to collection '{}'",
        entries.len(),
        meta.name
    );
    Ok(())
}

/// Read all chunks of a collection in insertion order.
///
/// Every embedding must have exactly `dimensions` values.
pub fn read_chunks(
    conn: &Connection,
    name: &str,
    dimensions: usize,
) -> AppResult<Vec<(Chunk, Vec<f32>)>> {
    let mut stmt = conn
        .prepare(
            "SELECT source, page, text, embedding FROM chunks
             WHERE collection = ?1 ORDER BY position",
        )
        .map_err(|e| AppError::Storage(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map(params![name], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, Option<u32>>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, Vec<u8>>(3)?,
            ))
        })
        .map_err(|e| AppError::Storage(format!("Failed to query chunks: {}", e)))?;

    let mut entries = Vec::new();
    for row in rows {
        let (source_id, page, text, bytes) =
            row.map_err(|e| AppError::Storage(format!("Failed to read chunk: {}", e)))?;

        let embedding = bytes_to_embedding(&bytes)?;
        if embedding.len() != dimensions {
            return Err(AppError::Storage(format!(
                "Embedding of length {} in collection '{}' with dimension {}",
                embedding.len(),
                name,
                dimensions
            )));
        }

        entries.push((
            Chunk {
                text,
                source_id,
                page: PageNumber::from(page),
            },
            embedding,
        ));
    }

    Ok(entries)
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(embedding.len() * 4);
    for &value in embedding {
        bytes.extend_from_slice(&value.to_le_bytes());
    }
    bytes
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Storage(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|b| f32::from_le_bytes([b[0], b[1], b[2], b[3]]))
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn meta(name: &str, dimensions: usize) -> CollectionMeta {
        CollectionMeta {
            name: name.to_string(),
            dimensions,
            embedding_model: "trigram-v1".to_string(),
            built_at: Utc::now(),
        }
    }

    fn chunk(text: &str, page: PageNumber) -> Chunk {
        Chunk {
            text: text.to_string(),
            source_id: "vat_law.pdf".to_string(),
            page,
        }
    }

    #[test]
    fn test_open_creates_tables() {
        let temp = TempDir::new().unwrap();
        let conn = open_index(&index_path(&temp.path().join("db"))).unwrap();

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type='table'",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(table_count, 2);
    }

    #[test]
    fn test_write_and_read_collection() {
        let temp = TempDir::new().unwrap();
        let path = index_path(temp.path());
        let mut conn = open_index(&path).unwrap();

        let entries = vec![
            (chunk("first", PageNumber::Number(3)), vec![1.0, 0.0]),
            (chunk("second", PageNumber::Unknown), vec![0.5, -0.5]),
        ];
        write_collection(&mut conn, &meta("tax", 2), &entries).unwrap();

        assert_eq!(count_chunks(&conn, "tax").unwrap(), 2);
        assert_eq!(count_chunks(&conn, "other").unwrap(), 0);
        assert_eq!(read_chunks(&conn, "tax", 2).unwrap(), entries);

        let stored = collection_meta(&conn, "tax").unwrap().unwrap();
        assert_eq!(stored.dimensions, 2);
        assert_eq!(stored.embedding_model, "trigram-v1");
        assert!(collection_meta(&conn, "other").unwrap().is_none());
    }

    #[test]
    fn test_rewrite_replaces_chunks() {
        let temp = TempDir::new().unwrap();
        let mut conn = open_index(&index_path(temp.path())).unwrap();

        let first = vec![
            (chunk("a", PageNumber::Unknown), vec![1.0]),
            (chunk("b", PageNumber::Unknown), vec![1.0]),
        ];
        write_collection(&mut conn, &meta("tax", 1), &first).unwrap();
        write_collection(&mut conn, &meta("tax", 1), &first[..1]).unwrap();

        assert_eq!(count_chunks(&conn, "tax").unwrap(), 1);
    }

    #[test]
    fn test_dimension_mismatch_is_storage_error() {
        let temp = TempDir::new().unwrap();
        let mut conn = open_index(&index_path(temp.path())).unwrap();
        write_collection(
            &mut conn,
            &meta("tax", 3),
            &[(chunk("a", PageNumber::Unknown), vec![1.0, 2.0])],
        )
        .unwrap();

        assert!(matches!(
            read_chunks(&conn, "tax", 3),
            Err(AppError::Storage(_))
        ));
    }

    #[test]
    fn test_open_existing_missing_file() {
        let temp = TempDir::new().unwrap();
        assert!(open_existing(&index_path(temp.path())).unwrap().is_none());
    }

    #[test]
    fn test_embedding_bytes() {
        let embedding = vec![0.25, -1.5, 3.0];
        let bytes = embedding_to_bytes(&embedding);
        assert_eq!(bytes.len(), 12);
        assert_eq!(bytes_to_embedding(&bytes).unwrap(), embedding);
        assert!(bytes_to_embedding(&bytes[..5]).is_err());
    }
}
