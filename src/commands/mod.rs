pub mod agent;
pub mod ask;
pub mod ingest;
pub mod query;
pub mod status;

use anyhow::Result;

use crate::cli::{COLLECTION_NAME, LocationArgs};
use crate::store::VectorStore;

fn with_store<T>(
    location: &LocationArgs,
    body: impl FnOnce(&mut VectorStore) -> Result<T>,
) -> Result<T> {
    let mut store = VectorStore::open(&location.store_dir(), COLLECTION_NAME)?;
    let outcome = body(&mut store);
    let closed = store.close();

    let value = outcome?;
    closed?;
    Ok(value)
}
