use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use rig::client::{CompletionClient, ProviderClient};
use rig::completion::Prompt;
use rig::providers::openai;
use tokio::sync::RwLock;
use tracing::info;

use crate::application::RetrievalService;
use crate::domain::{PipelineError, Result};
use crate::infrastructure::config::AppConfig;
use crate::infrastructure::env_store::EnvStore;
use crate::infrastructure::tools::RetrievalTool;

/// Tool-using chat agent over the OpenAI provider.
pub struct ChatAgent {
    client: openai::Client,
    model: String,
    system_prompt: String,
    retrieval: Arc<RetrievalService>,
    timeout: Duration,
    max_tool_turns: usize,
}

impl ChatAgent {
    /// Builds from the current process environment; fails when no API key
    /// is configured so the caller can report it instead of panicking.
    pub fn from_env(retrieval: Arc<RetrievalService>, config: &AppConfig) -> Result<Self> {
        if std::env::var("OPENAI_API_KEY")
            .map(|v| v.is_empty())
            .unwrap_or(true)
        {
            return Err(PipelineError::external("OPENAI_API_KEY is not configured"));
        }

        Ok(Self {
            client: openai::Client::from_env(),
            model: config.llm.model.clone(),
            system_prompt: config.llm.system_prompt.clone(),
            retrieval,
            timeout: Duration::from_secs(config.llm.timeout_seconds),
            max_tool_turns: config.llm.max_tool_turns,
        })
    }

    /// Runs one chat exchange; the agent may call the document-search tool
    /// up to `max_tool_turns` times before answering.
    pub async fn chat(&self, message: &str, context: &HashMap<String, String>) -> Result<String> {
        let tool = RetrievalTool::new(self.retrieval.clone());
        let agent = self
            .client
            .agent(&self.model)
            .preamble(&self.system_prompt)
            .tool(tool)
            .build();

        let prompt = Self::build_prompt(message, context);

        tokio::time::timeout(self.timeout, agent.prompt(&prompt).multi_turn(self.max_tool_turns))
            .await
            .map_err(|_| PipelineError::timeout("agent execution timed out"))?
            .map_err(|e| PipelineError::external(format!("agent failed: {e}")))
    }

    fn build_prompt(message: &str, context: &HashMap<String, String>) -> String {
        if context.is_empty() {
            return message.to_string();
        }

        let mut keys: Vec<&String> = context.keys().collect();
        keys.sort();
        let context_block = keys
            .iter()
            .map(|key| format!("{key}: {}", context[*key]))
            .collect::<Vec<_>>()
            .join("\n");

        format!("Context from the caller:\n{context_block}\n\nMessage: {message}")
    }
}

struct VersionedAgent {
    version: u64,
    agent: Arc<ChatAgent>,
}

/// Owns the live agent together with the credential version it was built
/// from.
///
/// The agent is built lazily on first use and rebuilt when the credential
/// store's version moves, so a key update takes effect on the next chat
/// without rebuilding on every write. `reinitialize` forces a rebuild and
/// swaps the handle atomically.
pub struct AgentHandle {
    inner: RwLock<Option<VersionedAgent>>,
    env: Arc<EnvStore>,
    retrieval: Arc<RetrievalService>,
    config: Arc<AppConfig>,
}

impl AgentHandle {
    pub fn new(
        env: Arc<EnvStore>,
        retrieval: Arc<RetrievalService>,
        config: Arc<AppConfig>,
    ) -> Self {
        Self {
            inner: RwLock::new(None),
            env,
            retrieval,
            config,
        }
    }

    /// The live agent, rebuilt first if credentials changed since it was
    /// constructed.
    pub async fn current(&self) -> Result<Arc<ChatAgent>> {
        let wanted = self.env.version();
        {
            let inner = self.inner.read().await;
            if let Some(versioned) = inner.as_ref() {
                if versioned.version == wanted {
                    return Ok(versioned.agent.clone());
                }
            }
        }
        self.rebuild(wanted, false).await
    }

    pub async fn reinitialize(&self) -> Result<()> {
        self.rebuild(self.env.version(), true).await?;
        Ok(())
    }

    async fn rebuild(&self, version: u64, force: bool) -> Result<Arc<ChatAgent>> {
        let mut inner = self.inner.write().await;

        // another caller may have refreshed while we waited for the lock
        if !force {
            if let Some(versioned) = inner.as_ref() {
                if versioned.version == version {
                    return Ok(versioned.agent.clone());
                }
            }
        }

        let agent = Arc::new(ChatAgent::from_env(self.retrieval.clone(), &self.config)?);
        *inner = Some(VersionedAgent {
            version,
            agent: agent.clone(),
        });
        info!(version, "chat agent built");
        Ok(agent)
    }
}
