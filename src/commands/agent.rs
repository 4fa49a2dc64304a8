use std::io::{self, Read, Write};

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;

use crate::agent::{AgentDefinition, FunctionCall, dispatch};
use crate::cli::{LocationArgs, ToolCallArgs};

use super::ingest::ensure_ingested;

pub fn describe() -> Result<()> {
    let definition = AgentDefinition::pdf_qa();
    info!(agent = %definition.name, model = %definition.model, tools = definition.tools.len(), "agent definition");
    write_json(&definition)
}

pub fn tool_call(location: &LocationArgs, args: ToolCallArgs) -> Result<()> {
    let raw = match args.call {
        Some(raw) => raw,
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("failed to read function call from stdin")?;
            buffer
        }
    };
    let call = parse_function_call(&raw)?;

    super::with_store(location, |store| {
        ensure_ingested(store, location, false)?;
        let response = dispatch(store, &call);
        write_json(&response)
    })
}

fn parse_function_call(raw: &str) -> Result<FunctionCall> {
    serde_json::from_str(raw.trim()).context("failed to parse function call json")
}

fn write_json<T: Serialize>(value: &T) -> Result<()> {
    let mut output = io::BufWriter::new(io::stdout().lock());
    serde_json::to_writer_pretty(&mut output, value).context("failed to serialize json output")?;
    writeln!(output)?;
    output.flush()?;
    Ok(())
}
