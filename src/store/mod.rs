use std::cmp::Ordering;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use tracing::{debug, info};

use crate::model::{Include, QueryMatch, SectionMetadata, StoreSummary, StoredDocument};
use crate::semantic::{
    EmbeddingModel, cosine_similarity, decode_embedding_blob, embedding_text_hash,
    encode_embedding_blob,
};
use crate::util::ensure_directory;

mod schema;

use schema::*;

pub const STORE_FILE_NAME: &str = "vector_store.sqlite3";

#[derive(Debug)]
pub struct VectorStore {
    connection: Connection,
    collection: String,
    model: EmbeddingModel,
    location: Option<PathBuf>,
}

struct ScoredRow {
    similarity: f64,
    position: i64,
    id: String,
    document: String,
    metadata_json: String,
}

impl VectorStore {
    pub fn open(store_dir: &Path, collection: &str) -> Result<Self> {
        ensure_directory(store_dir)?;
        let db_path = store_dir.join(STORE_FILE_NAME);

        let connection = Connection::open(&db_path)
            .with_context(|| format!("failed to open {}", db_path.display()))?;
        configure_connection(&connection)?;

        let store = Self::initialize(connection, collection, Some(db_path))?;
        info!(
            path = %store_dir.display(),
            collection = %store.collection,
            model_id = %store.model.model_id,
            "opened vector store"
        );
        Ok(store)
    }

    pub fn open_in_memory(collection: &str) -> Result<Self> {
        let connection =
            Connection::open_in_memory().context("failed to open in-memory vector store")?;
        connection
            .pragma_update(None, "foreign_keys", "ON")
            .context("failed to enable foreign keys")?;
        Self::initialize(connection, collection, None)
    }

    fn initialize(
        connection: Connection,
        collection: &str,
        location: Option<PathBuf>,
    ) -> Result<Self> {
        ensure_schema(&connection)?;
        let model = get_or_create_collection(&connection, collection, &EmbeddingModel::default())?;

        Ok(Self {
            connection,
            collection: collection.to_string(),
            model,
            location,
        })
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn model(&self) -> &EmbeddingModel {
        &self.model
    }

    pub fn location(&self) -> Option<&Path> {
        self.location.as_deref()
    }

    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .connection
            .query_row(
                "SELECT COUNT(*) FROM documents WHERE collection = ?1",
                [&self.collection],
                |row| row.get(0),
            )
            .with_context(|| format!("failed to count documents in '{}'", self.collection))?;
        Ok(count as usize)
    }

    pub fn upsert(&mut self, records: &[StoredDocument]) -> Result<usize> {
        let updated_at = Utc::now();
        let tx = self.connection.transaction()?;

        {
            let mut statement = tx.prepare(
                "
                INSERT INTO documents(collection, id, document, metadata_json, embedding, embedding_dim, text_hash, updated_at)
                VALUES(?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                ON CONFLICT(collection, id) DO UPDATE SET
                  document=excluded.document,
                  metadata_json=excluded.metadata_json,
                  embedding=excluded.embedding,
                  embedding_dim=excluded.embedding_dim,
                  text_hash=excluded.text_hash,
                  updated_at=excluded.updated_at
                ",
            )?;

            for record in records {
                let metadata_json = serde_json::to_string(&record.metadata)
                    .with_context(|| format!("failed to serialize metadata for {}", record.id))?;
                let embedding = self.model.embed(&record.document);

                statement
                    .execute(params![
                        &self.collection,
                        &record.id,
                        &record.document,
                        metadata_json,
                        encode_embedding_blob(&embedding),
                        self.model.dimensions as i64,
                        embedding_text_hash(&record.document),
                        updated_at,
                    ])
                    .with_context(|| format!("failed to upsert document {}", record.id))?;
            }
        }

        tx.commit()
            .with_context(|| format!("failed to commit upsert into '{}'", self.collection))?;
        debug!(collection = %self.collection, records = records.len(), "upsert committed");

        Ok(records.len())
    }

    // rowid is kept on conflict updates, so it tracks first-insertion (page) order.
    pub fn get(&self, limit: Option<usize>) -> Result<Vec<StoredDocument>> {
        let mut statement = self.connection.prepare(
            "
            SELECT id, document, metadata_json
            FROM documents
            WHERE collection = ?1
            ORDER BY rowid ASC
            LIMIT ?2
            ",
        )?;

        let limit = limit.map(|value| value as i64).unwrap_or(-1);
        let mut rows = statement.query(params![&self.collection, limit])?;
        let mut out = Vec::<StoredDocument>::new();

        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let metadata_json: String = row.get(2)?;
            let metadata = parse_metadata(&id, &metadata_json)?;
            out.push(StoredDocument {
                id,
                document: row.get(1)?,
                metadata,
            });
        }

        Ok(out)
    }

    pub fn summary(&self) -> Result<StoreSummary> {
        Ok(StoreSummary {
            collection: self.collection.clone(),
            model_id: self.model.model_id.clone(),
            document_count: self.count()?,
            first_document: self.get(Some(1))?.into_iter().next().map(|doc| doc.document),
        })
    }

    pub fn query(
        &self,
        query_text: &str,
        n_results: usize,
        include: &[Include],
    ) -> Result<Vec<QueryMatch>> {
        if n_results == 0 {
            return Ok(Vec::new());
        }

        let query_embedding = self.model.embed(query_text);
        let mut statement = self.connection.prepare(
            "
            SELECT id, document, metadata_json, embedding, embedding_dim, rowid
            FROM documents
            WHERE collection = ?1
            ",
        )?;

        let mut rows = statement.query([&self.collection])?;
        let mut scored = Vec::<ScoredRow>::new();

        while let Some(row) = rows.next()? {
            let id: String = row.get(0)?;
            let row_dim = row.get::<_, i64>(4)? as usize;
            if row_dim != self.model.dimensions {
                debug!(id = %id, row_dim, "skipping embedding with mismatched dimension");
                continue;
            }

            let blob: Vec<u8> = row.get(3)?;
            let Some(embedding) = decode_embedding_blob(&blob, self.model.dimensions) else {
                continue;
            };

            scored.push(ScoredRow {
                similarity: cosine_similarity(&query_embedding, &embedding),
                position: row.get(5)?,
                id,
                document: row.get(1)?,
                metadata_json: row.get(2)?,
            });
        }

        scored.sort_by(|left, right| {
            right
                .similarity
                .partial_cmp(&left.similarity)
                .unwrap_or(Ordering::Equal)
                .then_with(|| left.position.cmp(&right.position))
        });
        scored.truncate(n_results);

        let mut out = Vec::<QueryMatch>::with_capacity(scored.len());
        for (index, row) in scored.into_iter().enumerate() {
            let metadata = if include.contains(&Include::Metadatas) {
                Some(parse_metadata(&row.id, &row.metadata_json)?)
            } else {
                None
            };

            out.push(QueryMatch {
                rank: index + 1,
                document: include
                    .contains(&Include::Documents)
                    .then_some(row.document),
                metadata,
                distance: include
                    .contains(&Include::Distances)
                    .then_some(1.0 - row.similarity),
                id: row.id,
            });
        }

        Ok(out)
    }

    pub fn close(self) -> Result<()> {
        let collection = self.collection;
        self.connection
            .close()
            .map_err(|(_, error)| error)
            .with_context(|| format!("failed to close vector store for '{collection}'"))
    }
}

fn parse_metadata(id: &str, raw: &str) -> Result<SectionMetadata> {
    serde_json::from_str(raw).with_context(|| format!("failed to parse metadata for {id}"))
}
