use anyhow::Result;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImageDetail {
    Low,
}

/// One prompt + one image, sent to a vision-capable chat model.
#[derive(Debug, Clone)]
pub struct VisionRequest {
    pub prompt: String,
    /// Data URL or remote URL of the image.
    pub image_url: String,
    pub detail: ImageDetail,
    pub max_tokens: u32,
    pub temperature: f32,
    /// Ask the provider for a JSON object instead of free text.
    pub json_output: bool,
}

/// Trait for vision model providers (OpenAI, test doubles, ...)
///
/// `Ok(None)` means the provider answered without any text.
#[async_trait::async_trait]
pub trait VisionService: Send + Sync {
    async fn complete(&self, api_key: &str, request: VisionRequest) -> Result<Option<String>>;
}
