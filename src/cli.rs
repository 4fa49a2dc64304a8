use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};

pub const PDF_FILE_NAME: &str = "prd.pdf";
pub const STORE_DIR_NAME: &str = "chroma_store";
pub const COLLECTION_NAME: &str = "pdf_sections";

#[derive(Parser, Debug)]
#[command(
    name = "pdfqa",
    version,
    about = "Index the pages of one PDF and answer questions with the closest page"
)]
pub struct Cli {
    #[command(flatten)]
    pub location: LocationArgs,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Prompt once on stdin and print the best matching section (default)")]
    Ask,
    #[command(about = "Extract the PDF into the store if it is empty")]
    Ingest(IngestArgs),
    #[command(about = "Answer a single question given on the command line")]
    Query(QueryArgs),
    #[command(about = "Report store and input file state")]
    Status,
    #[command(about = "Print the agent definition for registration with the agent runtime")]
    Agent,
    #[command(about = "Execute one function call from the agent runtime")]
    ToolCall(ToolCallArgs),
}

#[derive(Args, Debug, Clone)]
pub struct LocationArgs {
    #[arg(
        long,
        global = true,
        default_value = ".",
        help = "Directory holding prd.pdf and the chroma_store directory"
    )]
    pub base_dir: PathBuf,
}

impl LocationArgs {
    pub fn pdf_path(&self) -> PathBuf {
        self.base_dir.join(PDF_FILE_NAME)
    }

    pub fn store_dir(&self) -> PathBuf {
        self.base_dir.join(STORE_DIR_NAME)
    }

    pub fn manifest_dir(&self) -> PathBuf {
        self.store_dir().join("manifests")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}

#[derive(Args, Debug, Clone)]
pub struct IngestArgs {
    #[arg(
        long,
        default_value_t = false,
        help = "Re-extract and upsert even when the store already has documents"
    )]
    pub force: bool,
}

#[derive(Args, Debug, Clone)]
pub struct QueryArgs {
    #[arg(long)]
    pub query: String,
}

#[derive(Args, Debug, Clone)]
pub struct ToolCallArgs {
    #[arg(long, help = "Function call JSON; read from stdin when omitted")]
    pub call: Option<String>,
}
