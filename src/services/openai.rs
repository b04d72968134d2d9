use anyhow::Result;
use serde::{Deserialize, Serialize};

use super::vision::{ImageDetail, VisionRequest, VisionService};

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: String,
    content: Vec<ContentPart>,
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ContentPart {
    Text { text: String },
    ImageUrl { image_url: ImageData },
}

#[derive(Debug, Serialize)]
struct ImageData {
    url: String,
    detail: ImageDetail,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    format_type: String,
}

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    max_tokens: u32,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: MessageContent,
}

#[derive(Debug, Deserialize)]
struct MessageContent {
    #[serde(default)]
    content: Option<String>,
}

/// Chat-completions client. Holds no credential; the key comes with each call.
pub struct OpenAiService {
    base_url: String,
    model: String,
    client: reqwest::Client,
}

impl OpenAiService {
    pub fn new(base_url: String, model: String) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model,
            client: reqwest::Client::new(),
        }
    }

    fn build_request(&self, request: VisionRequest) -> ChatRequest {
        let messages = vec![ChatMessage {
            role: "user".to_string(),
            content: vec![
                ContentPart::Text {
                    text: request.prompt,
                },
                ContentPart::ImageUrl {
                    image_url: ImageData {
                        url: request.image_url,
                        detail: request.detail,
                    },
                },
            ],
        }];

        ChatRequest {
            model: self.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
            response_format: request.json_output.then(|| ResponseFormat {
                format_type: "json_object".to_string(),
            }),
        }
    }
}

#[async_trait::async_trait]
impl VisionService for OpenAiService {
    async fn complete(&self, api_key: &str, request: VisionRequest) -> Result<Option<String>> {
        log::debug!("📊 Image data URL size: {} bytes", request.image_url.len());

        let request = self.build_request(request);

        log::info!("🤖 Sending request to OpenAI with model: {}", self.model);

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(api_key)
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        log::debug!("📥 OpenAI response status: {}", status);

        if !status.is_success() {
            let error_text = response.text().await?;
            log::error!("❌ OpenAI API error response: {}", error_text);
            anyhow::bail!("OpenAI API error ({}): {}", status, error_text);
        }

        let chat_response: ChatResponse = response.json().await?;

        let content = chat_response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.is_empty());

        match &content {
            Some(text) => log::debug!("📄 OpenAI returned {} bytes of content", text.len()),
            None => log::warn!("⚠️ OpenAI response had no content"),
        }

        Ok(content)
    }
}
