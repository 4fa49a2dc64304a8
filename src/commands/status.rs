use std::path::Path;

use anyhow::Result;
use tracing::{error, info, warn};

use crate::cli::LocationArgs;
use crate::store::{STORE_FILE_NAME, VectorStore};
use crate::util::char_prefix;

const FIRST_DOCUMENT_PREVIEW_CHARS: usize = 500;

pub fn run(location: &LocationArgs) -> Result<()> {
    let pdf_path = location.pdf_path();
    info!(
        base_dir = %location.base_dir().display(),
        pdf = %pdf_path.display(),
        pdf_exists = pdf_path.exists(),
        "status requested"
    );

    let store_file = location.store_dir().join(STORE_FILE_NAME);
    if !store_file.exists() {
        warn!(
            store = %store_file.display(),
            "vector store not found; run ingest to create it"
        );
        return Ok(());
    }

    super::with_store(location, |store| {
        let summary = store.summary()?;
        let store_path = store
            .location()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| location.store_dir());
        info!(
            store = %store_path.display(),
            collection = %summary.collection,
            model_id = %summary.model_id,
            documents = summary.document_count,
            "store status"
        );
        match summary.first_document.as_deref() {
            Some(first) => info!(
                first_document = %char_prefix(first, FIRST_DOCUMENT_PREVIEW_CHARS),
                "first document in store"
            ),
            None => warn!("store is initialized but empty; no documents found"),
        }
        Ok(())
    })
}

// Errors are logged, not returned.
pub fn log_store_contents(store: &VectorStore) {
    match store.get(Some(1)) {
        Ok(documents) => match documents.first() {
            Some(first) => info!(
                collection = %store.collection(),
                first_document = %char_prefix(&first.document, FIRST_DOCUMENT_PREVIEW_CHARS),
                "first document in store"
            ),
            None => warn!(
                collection = %store.collection(),
                "store is initialized but empty; no documents found"
            ),
        },
        Err(err) => error!(error = %err, "failed to fetch documents from store"),
    }
}
