use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::answer::query_pdf_sections;
use crate::store::VectorStore;

pub const AGENT_NAME: &str = "pdf_qa_agent";
pub const AGENT_MODEL: &str = "gemini-2.0-flash";
pub const QUERY_TOOL_NAME: &str = "query_pdf_sections";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDeclaration {
    pub name: String,
    pub description: String,
    pub parameters: Value,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentDefinition {
    pub name: String,
    pub model: String,
    pub description: String,
    pub instruction: String,
    pub tools: Vec<ToolDeclaration>,
}

impl AgentDefinition {
    pub fn pdf_qa() -> Self {
        Self {
            name: AGENT_NAME.to_string(),
            model: AGENT_MODEL.to_string(),
            description: "Answers user questions by returning the top relevant section from a PDF stored in a local vector collection.".to_string(),
            instruction: "You answer user questions about the PDF content by returning the top relevant excerpt.".to_string(),
            tools: vec![query_tool_declaration()],
        }
    }
}

fn query_tool_declaration() -> ToolDeclaration {
    ToolDeclaration {
        name: QUERY_TOOL_NAME.to_string(),
        description: "Returns the PDF section that best matches a free-text question, as a labelled excerpt.".to_string(),
        parameters: json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The user's question about the document"
                }
            },
            "required": ["query"]
        }),
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub args: Map<String, Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FunctionResponse {
    pub name: String,
    pub response: Value,
}

impl FunctionResponse {
    fn result(name: &str, result: String) -> Self {
        Self {
            name: name.to_string(),
            response: json!({ "result": result }),
        }
    }

    fn error(name: &str, message: String) -> Self {
        Self {
            name: name.to_string(),
            response: json!({ "error": message }),
        }
    }
}

// Bad calls get an error payload; the process keeps running.
pub fn dispatch(store: &VectorStore, call: &FunctionCall) -> FunctionResponse {
    if call.name != QUERY_TOOL_NAME {
        warn!(tool = %call.name, "unknown tool requested");
        return FunctionResponse::error(&call.name, format!("unknown tool '{}'", call.name));
    }

    let Some(query) = call.args.get("query").and_then(Value::as_str) else {
        warn!(tool = %call.name, args = ?call.args, "tool call missing string argument 'query'");
        return FunctionResponse::error(
            &call.name,
            "missing required string argument 'query'".to_string(),
        );
    };

    info!(tool = %call.name, "dispatching tool call");
    FunctionResponse::result(&call.name, query_pdf_sections(store, query))
}
