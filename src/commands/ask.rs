use std::io::{self, BufRead, Write};

use anyhow::{Context, Result};
use tracing::warn;

use crate::answer::query_pdf_sections;
use crate::cli::LocationArgs;

use super::ingest::ensure_ingested;
use super::status::log_store_contents;

pub const PROMPT: &str = "\nEnter your question about the document:\n> ";
pub const EMPTY_QUERY_WARNING: &str = "⚠️ Empty query entered. Exiting.";

pub fn run(location: &LocationArgs) -> Result<()> {
    super::with_store(location, |store| {
        log_store_contents(store);
        ensure_ingested(store, location, false)?;

        let store = &*store;
        let stdin = io::stdin();
        let stdout = io::stdout();
        terminal_query(stdin.lock(), stdout.lock(), |query| {
            query_pdf_sections(store, query)
        })?;
        Ok(())
    })
}

pub fn terminal_query<R, W, F>(mut input: R, mut output: W, answer: F) -> Result<Option<String>>
where
    R: BufRead,
    W: Write,
    F: FnOnce(&str) -> String,
{
    write!(output, "{PROMPT}")?;
    output.flush()?;

    let mut line = String::new();
    input
        .read_line(&mut line)
        .context("failed to read question from stdin")?;

    let query = line.trim();
    if query.is_empty() {
        warn!("empty query entered");
        writeln!(output, "{EMPTY_QUERY_WARNING}")?;
        output.flush()?;
        return Ok(None);
    }

    let response = answer(query);
    writeln!(output, "\n{response}")?;
    output.flush()?;

    Ok(Some(response))
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn whitespace_input_warns_without_querying() {
        let mut output = Vec::<u8>::new();
        let result = terminal_query(Cursor::new("   \t \n"), &mut output, |_| {
            panic!("query path must not run for blank input")
        })
        .expect("terminal query");

        assert!(result.is_none());
        let printed = String::from_utf8(output).expect("utf8 output");
        assert_eq!(printed, format!("{PROMPT}{EMPTY_QUERY_WARNING}\n"));
    }

    #[test]
    fn eof_is_treated_as_empty_input() {
        let mut output = Vec::<u8>::new();
        let result = terminal_query(Cursor::new(""), &mut output, |_| {
            panic!("query path must not run at eof")
        })
        .expect("terminal query");
        assert!(result.is_none());
    }

    #[test]
    fn question_is_trimmed_answered_once_and_printed() {
        let mut output = Vec::<u8>::new();
        let mut seen = Vec::<String>::new();

        let result = terminal_query(
            Cursor::new("  revenue growth  \nsecond line ignored\n"),
            &mut output,
            |query| {
                seen.push(query.to_string());
                "Top result from Section 1:\n\nRevenue grew.".to_string()
            },
        )
        .expect("terminal query");

        assert_eq!(seen, vec!["revenue growth".to_string()]);
        assert_eq!(
            result.as_deref(),
            Some("Top result from Section 1:\n\nRevenue grew.")
        );
        let printed = String::from_utf8(output).expect("utf8 output");
        assert_eq!(
            printed,
            format!("{PROMPT}\n{}\n", "Top result from Section 1:\n\nRevenue grew.")
        );
    }
}
