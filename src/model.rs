use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Section {
    pub section_key: String,
    pub text: String,
}

impl Section {
    pub fn for_page(page_index: usize, text: &str) -> Self {
        Self {
            section_key: format!("Section {}", page_index + 1),
            text: text.trim().to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SectionMetadata {
    pub section: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredDocument {
    pub id: String,
    pub document: String,
    pub metadata: SectionMetadata,
}

impl StoredDocument {
    // ids are zero-based, section labels one-based
    pub fn from_section(position: usize, section: &Section) -> Self {
        Self {
            id: format!("doc-{position}"),
            document: section.text.clone(),
            metadata: SectionMetadata {
                section: section.section_key.clone(),
            },
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum Include {
    Documents,
    Metadatas,
    Distances,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QueryMatch {
    pub rank: usize,
    pub id: String,
    pub document: Option<String>,
    pub metadata: Option<SectionMetadata>,
    pub distance: Option<f64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct StoreSummary {
    pub collection: String,
    pub model_id: String,
    pub document_count: usize,
    pub first_document: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestPaths {
    pub base_dir: String,
    pub pdf_path: String,
    pub store_dir: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct IngestRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub trigger: String,
    pub collection: String,
    pub model_id: String,
    pub pdf_sha256: String,
    pub paths: IngestPaths,
    pub section_count: usize,
    pub empty_section_count: usize,
    pub docs_upserted: usize,
    pub docs_total: usize,
}
