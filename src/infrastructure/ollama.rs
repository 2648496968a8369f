use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use crate::config::OllamaConfig;

#[derive(Debug, Error)]
pub enum OllamaError {
    #[error("request to Ollama failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Ollama returned {status}: {message}")]
    Status { status: StatusCode, message: String },

    #[error("Ollama returned {received} embeddings for {expected} inputs")]
    EmbeddingCount { expected: usize, received: usize },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [&'a str],
}

#[derive(Deserialize)]
struct EmbedResponse {
    embeddings: Vec<Vec<f32>>,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    stream: bool,
    options: ChatOptions,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// Client for the embedding and chat endpoints of an Ollama server.
pub struct OllamaClient {
    http: Client,
    base_url: String,
    embedding_model: String,
    chat_model: String,
    temperature: f32,
    embed_batch_size: usize,
}

impl OllamaClient {
    pub fn new(config: &OllamaConfig) -> Result<Self, OllamaError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            embedding_model: config.embedding_model.clone(),
            chat_model: config.chat_model.clone(),
            temperature: config.temperature,
            embed_batch_size: config.embed_batch_size.max(1),
        })
    }

    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    pub fn chat_model(&self) -> &str {
        &self.chat_model
    }

    /// Embeds `inputs` in batches, returning one vector per input in the same order.
    pub async fn embed(&self, inputs: &[&str]) -> Result<Vec<Vec<f32>>, OllamaError> {
        let mut embeddings = Vec::with_capacity(inputs.len());
        for batch in inputs.chunks(self.embed_batch_size) {
            log::debug!(
                "Requesting {} embeddings from model '{}'",
                batch.len(),
                self.embedding_model
            );
            let request = EmbedRequest {
                model: &self.embedding_model,
                input: batch,
            };
            let response = self
                .http
                .post(format!("{}/api/embed", self.base_url))
                .json(&request)
                .send()
                .await?;
            let body: EmbedResponse = Self::check_status(response).await?.json().await?;
            if body.embeddings.len() != batch.len() {
                return Err(OllamaError::EmbeddingCount {
                    expected: batch.len(),
                    received: body.embeddings.len(),
                });
            }
            embeddings.extend(body.embeddings);
        }
        Ok(embeddings)
    }

    /// Embeds a single text.
    pub async fn embed_one(&self, input: &str) -> Result<Vec<f32>, OllamaError> {
        let mut embeddings = self.embed(&[input]).await?;
        embeddings.pop().ok_or(OllamaError::EmbeddingCount {
            expected: 1,
            received: 0,
        })
    }

    /// Sends a non-streaming chat request and returns the assistant's reply.
    pub async fn chat(&self, messages: &[ChatMessage]) -> Result<String, OllamaError> {
        log::debug!(
            "Sending {} message(s) to chat model '{}'",
            messages.len(),
            self.chat_model
        );
        let request = ChatRequest {
            model: &self.chat_model,
            messages,
            stream: false,
            options: ChatOptions {
                temperature: self.temperature,
            },
        };
        let response = self
            .http
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;
        let body: ChatResponse = Self::check_status(response).await?.json().await?;
        Ok(body.message.content)
    }

    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, OllamaError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let text = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ErrorBody>(&text)
            .map(|b| b.error)
            .unwrap_or(text);
        log::error!("Ollama request failed with {}: {}", status, message);
        Err(OllamaError::Status { status, message })
    }
}
