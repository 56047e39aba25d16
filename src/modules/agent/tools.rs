use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::{info, warn};

use super::models::{FunctionDefinition, ToolCall, ToolDefinition};
use crate::domain::DomainError;
use crate::infrastructure::config::AgentConfig;

const MAX_SEARCH_HITS: usize = 5;

/// What the loop should do with a tool call.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolOutcome {
    /// Text fed back to the model on the next step.
    Observation(String),
    /// The model's final answer; the run ends.
    FinalAnswer(String),
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct InstantAnswer {
    #[serde(default)]
    heading: String,
    #[serde(default)]
    abstract_text: String,
    #[serde(default, rename = "AbstractURL")]
    abstract_url: String,
    #[serde(default)]
    answer: Value,
    #[serde(default)]
    related_topics: Vec<RelatedTopic>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "PascalCase")]
struct RelatedTopic {
    #[serde(default)]
    text: Option<String>,
    #[serde(default, rename = "FirstURL")]
    first_url: Option<String>,
    // Grouped topics nest one level
    #[serde(default)]
    topics: Vec<RelatedTopic>,
}

#[derive(Debug, PartialEq)]
struct SearchHit {
    title: String,
    url: String,
    snippet: String,
}

/// Tools the agent may call during a run.
#[derive(Debug, Clone)]
pub struct Toolbox {
    client: Client,
    search_url: String,
    image_url: String,
    image_model_id: String,
    api_token: Option<String>,
}

impl Toolbox {
    pub fn new(client: Client, config: &AgentConfig) -> Self {
        Self {
            client,
            search_url: config.search_url.trim_end_matches('/').to_string(),
            image_url: config.image_url.trim_end_matches('/').to_string(),
            image_model_id: config.image_model_id.clone(),
            api_token: config.api_token.clone(),
        }
    }

    pub fn definitions() -> Vec<ToolDefinition> {
        vec![
            ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: "web_search",
                    description: "Performs a web search for the query and returns the top results.",
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "query": { "type": "string", "description": "The search query to perform." }
                        },
                        "required": ["query"]
                    }),
                },
            },
            ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: "image_generation",
                    description: "Generates an image from a text prompt.",
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "prompt": { "type": "string", "description": "Description of the image to generate." }
                        },
                        "required": ["prompt"]
                    }),
                },
            },
            ToolDefinition {
                kind: "function",
                function: FunctionDefinition {
                    name: "final_answer",
                    description: "Provides the final answer to the given problem.",
                    parameters: json!({
                        "type": "object",
                        "properties": {
                            "answer": { "type": "string", "description": "The final answer to the problem." }
                        },
                        "required": ["answer"]
                    }),
                },
            },
        ]
    }

    /// Execute one tool call. Tool failures are reported back to the model as text.
    pub async fn execute(&self, call: &ToolCall) -> ToolOutcome {
        let function = &call.function;
        info!("[Tool] {} ({})", function.name, call.id);

        let result = match function.name.as_str() {
            "final_answer" => match function
                .string_argument("answer")
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
            {
                Some(answer) => return ToolOutcome::FinalAnswer(answer),
                // Blank answers go back to the model as an error
                None => Err(DomainError::Validation("missing argument 'answer'".to_string())),
            },
            "web_search" => match function.string_argument("query") {
                Some(query) => self.web_search(&query).await,
                None => Err(DomainError::Validation("missing argument 'query'".to_string())),
            },
            "image_generation" => match function.string_argument("prompt") {
                Some(prompt) => self.generate_image(&prompt).await,
                None => Err(DomainError::Validation("missing argument 'prompt'".to_string())),
            },
            other => Err(DomainError::Validation(format!("unknown tool '{}'", other))),
        };

        match result {
            Ok(observation) => ToolOutcome::Observation(observation),
            Err(e) => {
                warn!("[Tool] {} failed: {}", function.name, e);
                ToolOutcome::Observation(format!("Error executing tool '{}': {}", function.name, e))
            }
        }
    }

    /// Search the web using the DuckDuckGo Instant Answer API.
    async fn web_search(&self, query: &str) -> Result<String, DomainError> {
        let url = Url::parse_with_params(
            &format!("{}/", self.search_url),
            &[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ],
        )
        .map_err(|e| DomainError::Internal(format!("invalid search url: {}", e)))?;

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| DomainError::External(format!("search request failed: {}", e)))?;

        if !resp.status().is_success() {
            return Err(DomainError::External(format!(
                "search returned {}",
                resp.status()
            )));
        }

        // The API answers with a javascript content type, so parse the text
        let body = resp
            .text()
            .await
            .map_err(|e| DomainError::External(format!("search body: {}", e)))?;
        let parsed: InstantAnswer = serde_json::from_str(&body)
            .map_err(|e| DomainError::External(format!("search response: {}", e)))?;

        Ok(format_hits(query, &collect_hits(parsed)))
    }

    /// Generate an image through the text-to-image inference endpoint.
    async fn generate_image(&self, prompt: &str) -> Result<String, DomainError> {
        info!("[ImageGen] {} - prompt: {:.80}", self.image_model_id, prompt);
        let url = format!("{}/{}", self.image_url, self.image_model_id);

        let mut request = self.client.post(&url).json(&json!({ "inputs": prompt }));
        if let Some(token) = &self.api_token {
            request = request.bearer_auth(token);
        }

        let resp = request
            .send()
            .await
            .map_err(|e| DomainError::External(format!("image request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(DomainError::External(format!(
                "image generation returned {}: {}",
                status, text
            )));
        }

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| DomainError::External(format!("image body: {}", e)))?;
        let format = image::guess_format(&bytes)
            .map_err(|_| DomainError::External("image endpoint did not return an image".to_string()))?;

        Ok(format!(
            "Generated a {} image ({} bytes) for the prompt: {}",
            format.to_mime_type(),
            bytes.len(),
            prompt
        ))
    }
}

fn collect_hits(answer: InstantAnswer) -> Vec<SearchHit> {
    let mut hits = Vec::new();

    if !answer.abstract_text.is_empty() {
        hits.push(SearchHit {
            title: answer.heading.clone(),
            url: answer.abstract_url.clone(),
            snippet: answer.abstract_text.clone(),
        });
    }

    if let Value::String(direct) = &answer.answer
        && !direct.is_empty()
    {
        hits.push(SearchHit {
            title: answer.heading.clone(),
            url: String::new(),
            snippet: direct.clone(),
        });
    }

    let topics = answer
        .related_topics
        .iter()
        .flat_map(|t| std::iter::once(t).chain(t.topics.iter()));
    for topic in topics {
        if let (Some(text), Some(url)) = (&topic.text, &topic.first_url) {
            let title = text.split(" - ").next().unwrap_or(text).to_string();
            hits.push(SearchHit {
                title,
                url: url.clone(),
                snippet: text.clone(),
            });
        }
    }

    hits.truncate(MAX_SEARCH_HITS);
    hits
}

fn format_hits(query: &str, hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("No results found for '{}'.", query);
    }

    let entries: Vec<String> = hits
        .iter()
        .map(|h| format!("[{}]({})\n{}", h.title, h.url, h.snippet))
        .collect();
    format!("## Search Results\n\n{}", entries.join("\n\n"))
}
