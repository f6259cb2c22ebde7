use rig::completion::ToolDefinition;
use rig::tool::Tool;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;

use crate::application::RetrievalService;

#[derive(Debug, thiserror::Error)]
#[error("Document search error: {0}")]
pub struct RetrievalToolError(pub String);

#[derive(Debug, Deserialize, Serialize)]
pub struct RetrievalArgs {
    pub query: String,
}

/// Lets the agent search every stored collection for grounding snippets.
pub struct RetrievalTool {
    retrieval: Arc<RetrievalService>,
}

impl RetrievalTool {
    pub fn new(retrieval: Arc<RetrievalService>) -> Self {
        Self { retrieval }
    }
}

impl Tool for RetrievalTool {
    const NAME: &'static str = "search_documents";

    type Error = RetrievalToolError;
    type Args = RetrievalArgs;
    type Output = String;

    async fn definition(&self, _prompt: String) -> ToolDefinition {
        ToolDefinition {
            name: Self::NAME.to_string(),
            description: "Search the user's uploaded documents for passages relevant to a query."
                .to_string(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": "The search query"
                    }
                },
                "required": ["query"]
            }),
        }
    }

    async fn call(&self, args: Self::Args) -> Result<Self::Output, Self::Error> {
        let results = self
            .retrieval
            .query_all(&args.query)
            .await
            .map_err(|e| RetrievalToolError(e.to_string()))?;

        let output = results
            .iter()
            .enumerate()
            .map(|(i, r)| format!("[{}] (score {:.3}) {}", i + 1, r.score, r.text))
            .collect::<Vec<_>>()
            .join("\n\n");

        Ok(if output.is_empty() {
            "No relevant documents found.".to_string()
        } else {
            output
        })
    }
}
