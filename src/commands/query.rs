use std::io::{self, Write};

use anyhow::Result;

use crate::answer::query_pdf_sections;
use crate::cli::{LocationArgs, QueryArgs};

use super::ingest::ensure_ingested;
use super::status::log_store_contents;

pub fn run(location: &LocationArgs, args: QueryArgs) -> Result<()> {
    super::with_store(location, |store| {
        log_store_contents(store);
        ensure_ingested(store, location, false)?;

        let answer = query_pdf_sections(store, &args.query);
        let mut output = io::BufWriter::new(io::stdout().lock());
        writeln!(output, "{answer}")?;
        output.flush()?;
        Ok(())
    })
}
