use async_trait::async_trait;
use reqwest::Client;
use tracing::{debug, info, instrument, warn};

use super::models::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage, ToolDefinition};
use super::tools::{ToolOutcome, Toolbox};
use crate::domain::{Agent, DomainError};
use crate::infrastructure::config::AgentConfig;

const USER_AGENT: &str = concat!("ocr-agent/", env!("CARGO_PKG_VERSION"));

const SYSTEM_PROMPT: &str = "You are an expert assistant who solves tasks using the tools at your disposal. \
You can search the web with `web_search` and create pictures with `image_generation`. \
Think step by step and call a tool whenever it helps. \
When you are done, call `final_answer` with your complete answer, or reply with the answer directly. \
Always answer in the language the task asks for.";

const MAX_STEPS_PROMPT: &str = "You have reached the maximum number of steps. \
Using everything gathered above, give your final answer to the task now, without calling tools.";

/// Agent that drives a chat-completions model through a bounded tool loop.
pub struct HfAgent {
    client: Client,
    endpoint: String,
    config: AgentConfig,
    toolbox: Toolbox,
    tools: Vec<ToolDefinition>,
}

impl HfAgent {
    pub fn new(config: &AgentConfig) -> Result<Self, DomainError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| DomainError::Config(format!("Failed to build client: {}", e)))?;

        if config.api_token.is_none() {
            warn!("HG_TOKEN is not set, agent requests will be unauthenticated");
        }

        Ok(Self {
            endpoint: format!("{}/chat/completions", config.base_url.trim_end_matches('/')),
            toolbox: Toolbox::new(client.clone(), config),
            tools: Toolbox::definitions(),
            config: config.clone(),
            client,
        })
    }

    /// One round trip to the model.
    async fn complete(
        &self,
        messages: &[ChatMessage],
        with_tools: bool,
    ) -> Result<ChatMessage, DomainError> {
        let body = ChatCompletionRequest {
            model: &self.config.model_id,
            messages,
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools: with_tools.then_some(self.tools.as_slice()),
        };

        let mut request = self.client.post(&self.endpoint).json(&body);
        if let Some(token) = &self.config.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| DomainError::Agent(format!("request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DomainError::Agent(format!(
                "model endpoint returned {}: {}",
                status, text
            )));
        }

        let parsed: ChatCompletionResponse = resp
            .json()
            .await
            .map_err(|e| DomainError::Agent(format!("invalid model response: {}", e)))?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| DomainError::Agent("model returned no choices".to_string()))?;

        debug!("Model finished with {:?}", choice.finish_reason);
        Ok(choice.message)
    }
}

fn final_text(message: ChatMessage) -> Result<String, DomainError> {
    message
        .content
        .map(|c| c.trim().to_string())
        .filter(|c| !c.is_empty())
        .ok_or_else(|| DomainError::Agent("model returned an empty answer".to_string()))
}

#[async_trait]
impl Agent for HfAgent {
    #[instrument(skip_all, fields(model = %self.config.model_id))]
    async fn run(&self, prompt: &str) -> Result<String, DomainError> {
        info!("Starting agent run");

        let mut messages = vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(prompt)];

        for step in 1..=self.config.max_steps {
            debug!("Agent step {}/{}", step, self.config.max_steps);

            let reply = self.complete(&messages, true).await?;
            let calls = reply.requested_tools().to_vec();

            if calls.is_empty() {
                info!("Agent answered after {} step(s)", step);
                return final_text(reply);
            }

            messages.push(reply);
            for call in &calls {
                match self.toolbox.execute(call).await {
                    ToolOutcome::FinalAnswer(answer) => {
                        info!("Agent called final_answer after {} step(s)", step);
                        return Ok(answer);
                    }
                    ToolOutcome::Observation(observation) => {
                        messages.push(ChatMessage::tool_result(call.id.clone(), observation));
                    }
                }
            }
        }

        warn!(
            "Max steps ({}) reached, requesting a final answer",
            self.config.max_steps
        );
        messages.push(ChatMessage::user(MAX_STEPS_PROMPT));
        let reply = self.complete(&messages, false).await?;
        final_text(reply)
    }
}
