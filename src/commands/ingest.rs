use std::path::Path;

use anyhow::{Context, Result};
use chrono::Utc;
use tracing::info;

use crate::cli::{IngestArgs, LocationArgs};
use crate::model::{IngestPaths, IngestRunManifest, Section, StoredDocument};
use crate::pdf::extract_pdf_sections;
use crate::store::VectorStore;
use crate::util::{char_prefix, file_sha256, run_stamp, timestamp_now, write_manifest};

const FIRST_DOCUMENT_PREVIEW_CHARS: usize = 300;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupOutcome {
    Ingested { sections: usize, docs_total: usize },
    Skipped { docs_total: usize },
}

pub fn run(location: &LocationArgs, args: IngestArgs) -> Result<()> {
    super::with_store(location, |store| {
        match ensure_ingested(store, location, args.force)? {
            SetupOutcome::Ingested {
                sections,
                docs_total,
            } => info!(sections, docs_total, "ingest finished"),
            SetupOutcome::Skipped { docs_total } => {
                info!(docs_total, "ingest skipped; store already populated")
            }
        }
        Ok(())
    })
}

pub fn ensure_ingested(
    store: &mut VectorStore,
    location: &LocationArgs,
    force: bool,
) -> Result<SetupOutcome> {
    let existing = store.count()?;
    if existing > 0 && !force {
        info!(
            collection = %store.collection(),
            documents = existing,
            "store already contains data; skipping pdf extraction"
        );
        return Ok(SetupOutcome::Skipped {
            docs_total: existing,
        });
    }

    if existing == 0 {
        info!(collection = %store.collection(), "store is empty; extracting pdf sections");
    } else {
        info!(collection = %store.collection(), documents = existing, "forced re-ingest");
    }

    let started_ts = Utc::now();
    let started_at = timestamp_now();
    let pdf_path = location.pdf_path();

    let sections = extract_pdf_sections(&pdf_path)?;
    let docs_upserted = store_sections(store, &sections)?;
    let docs_total = store.count()?;

    let manifest = IngestRunManifest {
        manifest_version: 1,
        run_id: format!("ingest-{}", run_stamp(started_ts)),
        status: "completed".to_string(),
        started_at,
        updated_at: timestamp_now(),
        trigger: (if existing > 0 { "forced" } else { "empty_store" }).to_string(),
        collection: store.collection().to_string(),
        model_id: store.model().model_id.clone(),
        pdf_sha256: file_sha256(&pdf_path)?,
        paths: IngestPaths {
            base_dir: location.base_dir().display().to_string(),
            pdf_path: pdf_path.display().to_string(),
            store_dir: location.store_dir().display().to_string(),
        },
        section_count: sections.len(),
        empty_section_count: sections.iter().filter(|section| section.text.is_empty()).count(),
        docs_upserted,
        docs_total,
    };
    write_ingest_manifest(&location.manifest_dir(), started_ts, &manifest)?;

    Ok(SetupOutcome::Ingested {
        sections: sections.len(),
        docs_total,
    })
}

pub fn store_sections(store: &mut VectorStore, sections: &[Section]) -> Result<usize> {
    info!(sections = sections.len(), collection = %store.collection(), "storing sections");

    let records = sections
        .iter()
        .enumerate()
        .map(|(position, section)| StoredDocument::from_section(position, section))
        .collect::<Vec<StoredDocument>>();

    let upserted = store
        .upsert(&records)
        .with_context(|| format!("failed to store sections in '{}'", store.collection()))?;

    let first = store.get(Some(1))?;
    info!(
        documents = store.count()?,
        collection = %store.collection(),
        first_snippet = %first
            .first()
            .map(|doc| char_prefix(&doc.document, FIRST_DOCUMENT_PREVIEW_CHARS))
            .unwrap_or_default(),
        "upserted documents"
    );

    Ok(upserted)
}

fn write_ingest_manifest(
    manifest_dir: &Path,
    started_ts: chrono::DateTime<Utc>,
    manifest: &IngestRunManifest,
) -> Result<()> {
    let manifest_path = manifest_dir.join(format!(
        "ingest_run_{}.json",
        run_stamp(started_ts)
    ));
    write_manifest(&manifest_path, manifest)?;
    info!(path = %manifest_path.display(), "wrote ingest run manifest");
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use super::*;

    fn sections(texts: &[&str]) -> Vec<Section> {
        texts
            .iter()
            .enumerate()
            .map(|(index, text)| Section::for_page(index, text))
            .collect()
    }

    fn missing_location() -> LocationArgs {
        LocationArgs {
            base_dir: PathBuf::from("/nonexistent/pdfqa-base"),
        }
    }

    #[test]
    fn store_sections_uses_zero_based_ids_and_one_based_labels() {
        let mut store = VectorStore::open_in_memory("pdf_sections").expect("store should open");
        let upserted =
            store_sections(&mut store, &sections(&["first", "", "third"])).expect("store");

        assert_eq!(upserted, 3);
        let stored = store.get(None).expect("get");
        let pairs = stored
            .iter()
            .map(|doc| (doc.id.as_str(), doc.metadata.section.as_str()))
            .collect::<Vec<(&str, &str)>>();
        assert_eq!(
            pairs,
            vec![
                ("doc-0", "Section 1"),
                ("doc-1", "Section 2"),
                ("doc-2", "Section 3")
            ]
        );
        assert_eq!(stored[1].document, "");
    }

    #[test]
    fn storing_twice_is_idempotent() {
        let mut store = VectorStore::open_in_memory("pdf_sections").expect("store should open");
        let pages = sections(&["a", "b", "c", "d"]);

        store_sections(&mut store, &pages).expect("first store");
        store_sections(&mut store, &pages).expect("second store");

        assert_eq!(store.count().expect("count"), 4);
    }

    #[test]
    fn populated_store_skips_extraction() {
        let mut store = VectorStore::open_in_memory("pdf_sections").expect("store should open");
        store_sections(&mut store, &sections(&["already here"])).expect("store");

        let outcome =
            ensure_ingested(&mut store, &missing_location(), false).expect("gate should skip");
        assert_eq!(outcome, SetupOutcome::Skipped { docs_total: 1 });
    }

    #[test]
    fn empty_store_with_missing_pdf_fails_not_found() {
        let mut store = VectorStore::open_in_memory("pdf_sections").expect("store should open");

        let error = ensure_ingested(&mut store, &missing_location(), false)
            .expect_err("missing pdf should abort setup");
        let io_error = error
            .downcast_ref::<std::io::Error>()
            .expect("error should be an io error");
        assert_eq!(io_error.kind(), std::io::ErrorKind::NotFound);
        assert_eq!(store.count().expect("count"), 0);
    }

    #[test]
    fn forced_ingest_attempts_extraction_on_populated_store() {
        let mut store = VectorStore::open_in_memory("pdf_sections").expect("store should open");
        store_sections(&mut store, &sections(&["already here"])).expect("store");

        assert!(ensure_ingested(&mut store, &missing_location(), true).is_err());
        assert_eq!(store.count().expect("count"), 1);
    }
}
