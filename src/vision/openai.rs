use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{prompts, ImageSource, VisionClient, VisionError};
use crate::analysis::ai_data::AiAnalysisData;
use crate::analysis::validate::{parse_ai_analysis, strip_code_fence};
use crate::artworks::dto::ArtworkRecord;
use crate::config::OpenAiConfig;
use crate::matching::{RoomAnalysis, TextQueryCriteria};

const REQUEST_TIMEOUT: Duration = Duration::from_secs(90);
const ARTWORK_MAX_TOKENS: u32 = 2000;

/// OpenAI-compatible chat-completions client.
pub struct OpenAiVision {
    client: Client,
    base_url: String,
    api_key: Option<String>,
    vision_model: String,
    analysis_model: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<Value>,
    response_format: Value,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct ChatMessage {
    content: Option<String>,
}

impl OpenAiVision {
    pub fn new(config: &OpenAiConfig) -> Self {
        Self {
            client: Client::new(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            vision_model: config.vision_model.clone(),
            analysis_model: config.analysis_model.clone(),
        }
    }

    async fn complete(
        &self,
        model: &str,
        messages: Vec<Value>,
        max_tokens: Option<u32>,
    ) -> Result<String, VisionError> {
        let api_key = self.api_key.as_deref().ok_or(VisionError::MissingApiKey)?;
        let request = ChatRequest {
            model,
            messages,
            response_format: json!({ "type": "json_object" }),
            max_tokens,
        };

        debug!(%model, "sending chat completion");
        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .timeout(REQUEST_TIMEOUT)
            .json(&request)
            .send()
            .await
            .map_err(|e| VisionError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            warn!(%model, status = status.as_u16(), "chat completion failed");
            return Err(VisionError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ChatResponse = response
            .json()
            .await
            .map_err(|e| VisionError::InvalidResponse(e.to_string()))?;

        body.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|c| !c.trim().is_empty())
            .ok_or(VisionError::EmptyResponse)
    }
}

fn decode_json<T: DeserializeOwned>(content: &str) -> Result<T, VisionError> {
    serde_json::from_str(strip_code_fence(content.trim()))
        .map_err(|e| VisionError::InvalidResponse(e.to_string()))
}

fn image_part(url: String) -> Value {
    json!({ "type": "image_url", "image_url": { "url": url } })
}

#[async_trait]
impl VisionClient for OpenAiVision {
    async fn analyze_room(&self, image: &ImageSource) -> Result<RoomAnalysis, VisionError> {
        let messages = vec![
            json!({ "role": "system", "content": prompts::ROOM_SYSTEM }),
            json!({
                "role": "user",
                "content": [
                    { "type": "text", "text": prompts::ROOM_USER },
                    image_part(image.to_url()),
                ],
            }),
        ];
        let content = self.complete(&self.vision_model, messages, None).await?;
        decode_json(&content)
    }

    async fn analyze_text_query(&self, query: &str) -> Result<TextQueryCriteria, VisionError> {
        let messages = vec![
            json!({ "role": "system", "content": prompts::TEXT_QUERY_SYSTEM }),
            json!({ "role": "user", "content": query }),
        ];
        let content = self.complete(&self.vision_model, messages, None).await?;
        decode_json(&content)
    }

    async fn analyze_artwork(
        &self,
        image_url: &str,
        artwork: &ArtworkRecord,
    ) -> Result<AiAnalysisData, VisionError> {
        let messages = vec![json!({
            "role": "user",
            "content": [
                { "type": "text", "text": prompts::artwork_prompt(artwork) },
                image_part(image_url.to_string()),
            ],
        })];
        let content = self
            .complete(&self.analysis_model, messages, Some(ARTWORK_MAX_TOKENS))
            .await?;
        parse_ai_analysis(&content).map_err(|e| {
            warn!(artwork_id = %artwork.id, error = %e, "rejected artwork analysis");
            VisionError::from(e)
        })
    }
}
