use tracing::{error, info};

use crate::model::{Include, QueryMatch};
use crate::store::VectorStore;
use crate::util::char_prefix;

pub const NOT_FOUND_ANSWER: &str =
    "Sorry, I couldn't find any relevant information in the document.";
pub const UNKNOWN_SECTION: &str = "Unknown section";
pub const SNIPPET_MAX_CHARS: usize = 500;

const ANSWER_INCLUDE: [Include; 3] = [
    Include::Documents,
    Include::Metadatas,
    Include::Distances,
];

// Store failures collapse into the not-found answer; callers always get text.
pub fn query_pdf_sections(store: &VectorStore, query: &str) -> String {
    info!(query = %query, "received query");

    let matches = match store.query(query, 1, &ANSWER_INCLUDE) {
        Ok(matches) => matches,
        Err(err) => {
            error!(error = %err, collection = %store.collection(), "vector store query failed");
            return NOT_FOUND_ANSWER.to_string();
        }
    };

    info!(hits = matches.len(), top = ?matches.first(), "raw query result");

    match matches.into_iter().next() {
        Some(top) => {
            info!(
                id = %top.id,
                rank = top.rank,
                distance = ?top.distance,
                "top match"
            );
            format_answer(&top)
        }
        None => {
            info!("no relevant documents found");
            NOT_FOUND_ANSWER.to_string()
        }
    }
}

pub fn format_answer(top: &QueryMatch) -> String {
    let section = top
        .metadata
        .as_ref()
        .map(|meta| meta.section.as_str())
        .unwrap_or(UNKNOWN_SECTION);
    let snippet = snippet_for(top.document.as_deref().unwrap_or_default());

    format!("Top result from {section}:\n\n{snippet}")
}

pub fn snippet_for(document: &str) -> String {
    let flattened = document.replace('\n', " ");
    let trimmed = flattened.trim();

    let prefix = char_prefix(trimmed, SNIPPET_MAX_CHARS);
    if prefix.len() < trimmed.len() {
        format!("{prefix}...")
    } else {
        prefix.to_string()
    }
}
