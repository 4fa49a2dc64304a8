use anyhow::{Context, Result};
use chrono::Utc;
use rusqlite::{Connection, OptionalExtension, params};

use crate::semantic::EmbeddingModel;

pub(super) const STORE_SCHEMA_VERSION: &str = "0.1.0";

pub(super) fn configure_connection(connection: &Connection) -> Result<()> {
    connection
        .pragma_update(None, "journal_mode", "WAL")
        .context("failed to set journal_mode=WAL")?;
    connection
        .pragma_update(None, "synchronous", "NORMAL")
        .context("failed to set synchronous=NORMAL")?;
    connection
        .pragma_update(None, "foreign_keys", "ON")
        .context("failed to enable foreign keys")?;
    Ok(())
}

pub(super) fn ensure_schema(connection: &Connection) -> Result<()> {
    connection
        .execute_batch(
            "
            CREATE TABLE IF NOT EXISTS metadata (
              key TEXT PRIMARY KEY,
              value TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS collections (
              name TEXT PRIMARY KEY,
              model_id TEXT NOT NULL,
              dimensions INTEGER NOT NULL,
              normalization TEXT NOT NULL,
              created_at TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS documents (
              collection TEXT NOT NULL,
              id TEXT NOT NULL,
              document TEXT NOT NULL,
              metadata_json TEXT NOT NULL,
              embedding BLOB NOT NULL,
              embedding_dim INTEGER NOT NULL,
              text_hash TEXT NOT NULL,
              updated_at TEXT NOT NULL,
              PRIMARY KEY (collection, id),
              FOREIGN KEY (collection) REFERENCES collections(name) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_documents_collection ON documents(collection);
            ",
        )
        .context("failed to initialize vector store schema")?;

    connection.execute(
        "INSERT INTO metadata(key, value) VALUES('store_schema_version', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        [STORE_SCHEMA_VERSION],
    )?;

    Ok(())
}

pub(super) fn get_or_create_collection(
    connection: &Connection,
    name: &str,
    model: &EmbeddingModel,
) -> Result<EmbeddingModel> {
    connection
        .execute(
            "
            INSERT INTO collections(name, model_id, dimensions, normalization, created_at)
            VALUES(?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(name) DO NOTHING
            ",
            params![
                name,
                model.model_id,
                model.dimensions as i64,
                model.normalization,
                Utc::now(),
            ],
        )
        .with_context(|| format!("failed to register collection '{name}'"))?;

    let registered = connection
        .query_row(
            "SELECT model_id, dimensions, normalization FROM collections WHERE name = ?1",
            [name],
            |row| {
                Ok(EmbeddingModel {
                    model_id: row.get(0)?,
                    dimensions: row.get::<_, i64>(1)? as usize,
                    normalization: row.get(2)?,
                })
            },
        )
        .optional()?
        .with_context(|| format!("collection '{name}' missing after registration"))?;

    Ok(registered)
}
