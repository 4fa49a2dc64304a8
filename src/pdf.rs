use std::io;
use std::path::Path;
use std::process::Command;

use anyhow::{Context, Result, bail};
use tracing::{debug, info};

use crate::model::Section;

const PAGE_BREAK: char = '\u{000C}';

pub fn extract_pdf_sections(pdf_path: &Path) -> Result<Vec<Section>> {
    if !pdf_path.exists() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("PDF not found at: {}", pdf_path.display()),
        )
        .into());
    }

    let raw = run_pdftotext(pdf_path)?;
    let sections = sections_from_text_layer(&raw);

    info!(
        path = %pdf_path.display(),
        pages = sections.len(),
        empty_pages = sections.iter().filter(|section| section.text.is_empty()).count(),
        "extracted pdf sections"
    );

    Ok(sections)
}

fn run_pdftotext(pdf_path: &Path) -> Result<String> {
    let output = Command::new("pdftotext")
        .arg("-enc")
        .arg("UTF-8")
        .arg(pdf_path)
        .arg("-")
        .output()
        .with_context(|| format!("failed to execute pdftotext for {}", pdf_path.display()))?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        bail!(
            "pdftotext returned non-zero exit status for {}: {}",
            pdf_path.display(),
            stderr.trim()
        );
    }

    debug!(bytes = output.stdout.len(), "pdftotext finished");
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

// pdftotext terminates every page, blank ones included, with a form feed.
pub fn sections_from_text_layer(raw: &str) -> Vec<Section> {
    let body = match raw.strip_suffix(PAGE_BREAK) {
        Some(body) => body,
        None if raw.trim().is_empty() => return Vec::new(),
        None => raw,
    };

    body.split(PAGE_BREAK)
        .enumerate()
        .map(|(index, page)| Section::for_page(index, &page.replace('\u{0000}', "")))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_pdf_reports_not_found() {
        let error = extract_pdf_sections(Path::new("/nonexistent/dir/prd.pdf"))
            .expect_err("missing file should fail");
        let io_error = error
            .downcast_ref::<io::Error>()
            .expect("error should be an io error");
        assert_eq!(io_error.kind(), io::ErrorKind::NotFound);
        assert!(error.to_string().contains("PDF not found at: /nonexistent/dir/prd.pdf"));
    }

    #[test]
    fn one_section_per_page_in_order() {
        let raw = "Revenue grew 12% in Q1.\nDetails follow.\n\u{000C}Second page\n\u{000C}  Third  \n\u{000C}";
        let sections = sections_from_text_layer(raw);

        let keys = sections
            .iter()
            .map(|section| section.section_key.as_str())
            .collect::<Vec<&str>>();
        assert_eq!(keys, vec!["Section 1", "Section 2", "Section 3"]);
        assert_eq!(sections[0].text, "Revenue grew 12% in Q1.\nDetails follow.");
        assert_eq!(sections[2].text, "Third");
    }

    #[test]
    fn blank_pages_are_kept_as_empty_sections() {
        let raw = "Intro\n\u{000C}\n\n\u{000C}\u{000C}Outro\n\u{000C}";
        let sections = sections_from_text_layer(raw);

        assert_eq!(sections.len(), 4);
        assert_eq!(sections[1].text, "");
        assert_eq!(sections[2].text, "");
        assert_eq!(sections[3].section_key, "Section 4");
        assert_eq!(sections[3].text, "Outro");
    }

    #[test]
    fn nul_characters_are_removed() {
        let sections = sections_from_text_layer("a\u{0000}b\u{000C}");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].text, "ab");
    }

    #[test]
    fn output_without_page_breaks_is_a_single_page() {
        assert!(sections_from_text_layer("").is_empty());
        let sections = sections_from_text_layer("only page");
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].section_key, "Section 1");
    }

    #[test]
    fn missing_final_page_break_still_splits_pages() {
        let sections = sections_from_text_layer("page one\u{000C}page two");
        assert_eq!(
            sections,
            vec![
                Section::for_page(0, "page one"),
                Section::for_page(1, "page two")
            ]
        );
    }

    #[test]
    fn single_blank_page_yields_one_empty_section() {
        let sections = sections_from_text_layer("\u{000C}");
        assert_eq!(sections, vec![Section::for_page(0, "")]);
    }
}
