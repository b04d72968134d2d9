use std::sync::Arc;

use crate::models::{AnalysisRequest, NutritionResult};
use crate::prompts::NUTRITION_PROMPT;
use crate::services::{ImageDetail, VisionRequest, VisionService};

const DATA_URL_PREFIX: &str = "data:image/";
const MAX_TOKENS: u32 = 800;
const TEMPERATURE: f32 = 0.2;

/// Every way an analysis request can end. The HTTP mapping lives in `server`.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    MissingImage,
    InvalidImageFormat,
    MissingApiKey,
    EmptyResponse,
    /// The model answered, but not with a usable nutrition object.
    Unparsable { raw: String },
    /// The model's JSON, exactly as it was sent.
    Success(serde_json::Value),
    Failed { details: String },
}

pub struct AnalysisHandler {
    vision: Arc<dyn VisionService>,
    api_key: Option<String>,
}

impl AnalysisHandler {
    pub fn new(vision: Arc<dyn VisionService>, api_key: Option<String>) -> Self {
        Self { vision, api_key }
    }

    pub async fn analyze(&self, request: AnalysisRequest) -> AnalysisOutcome {
        let image = match request.image {
            Some(image) if !image.is_empty() => image,
            _ => return AnalysisOutcome::MissingImage,
        };

        if !image.starts_with(DATA_URL_PREFIX) {
            log::debug!("Rejected image that is not a data URL");
            return AnalysisOutcome::InvalidImageFormat;
        }

        let Some(api_key) = self.api_key.as_deref() else {
            log::error!("❌ OPENAI_API_KEY is not configured");
            return AnalysisOutcome::MissingApiKey;
        };

        log::info!("📸 Analyzing food image ({} bytes)", image.len());

        let request = VisionRequest {
            prompt: NUTRITION_PROMPT.to_string(),
            image_url: image,
            detail: ImageDetail::Low,
            max_tokens: MAX_TOKENS,
            temperature: TEMPERATURE,
            json_output: true,
        };

        let content = match self.vision.complete(api_key, request).await {
            Ok(Some(content)) => content,
            Ok(None) => return AnalysisOutcome::EmptyResponse,
            Err(e) => {
                log::error!("❌ Error analyzing image: {:#}", e);
                let details = e.to_string();
                return AnalysisOutcome::Failed {
                    details: if details.is_empty() {
                        "Unknown error".to_string()
                    } else {
                        details
                    },
                };
            }
        };

        match parse_nutrition(&content) {
            Some(value) => {
                log::info!("✅ Nutrition analysis completed");
                AnalysisOutcome::Success(value)
            }
            None => {
                log::warn!(
                    "⚠️ Could not parse nutrition JSON from model response ({} bytes)",
                    content.len()
                );
                log::debug!("📄 Unparsable model response: {}", content);
                AnalysisOutcome::Unparsable { raw: content }
            }
        }
    }
}

/// Parses the model output and checks it has the `NutritionResult` shape.
/// Returns the parsed value untouched so extra keys and number formatting survive.
fn parse_nutrition(content: &str) -> Option<serde_json::Value> {
    let value: serde_json::Value = serde_json::from_str(content).ok()?;
    serde_json::from_value::<NutritionResult>(value.clone()).ok()?;
    Some(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::Result;
    use std::sync::Mutex;

    const APPLE: &str = r#"{"total":{"food_names":["apple"],"quantity":"combined meal","calories":95,"carbs":25,"fat":0,"protein":0},"message":"A single apple"}"#;

    enum Reply {
        Text(&'static str),
        Empty,
        Fail(&'static str),
    }

    /// Scripted provider that records what it was asked.
    struct ScriptedVision {
        reply: Reply,
        calls: Mutex<Vec<(String, VisionRequest)>>,
    }

    impl ScriptedVision {
        fn new(reply: Reply) -> Arc<Self> {
            Arc::new(Self {
                reply,
                calls: Mutex::new(Vec::new()),
            })
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    #[async_trait::async_trait]
    impl VisionService for ScriptedVision {
        async fn complete(&self, api_key: &str, request: VisionRequest) -> Result<Option<String>> {
            self.calls
                .lock()
                .unwrap()
                .push((api_key.to_string(), request));
            match &self.reply {
                Reply::Text(text) => Ok(Some(text.to_string())),
                Reply::Empty => Ok(None),
                Reply::Fail(message) => Err(anyhow::anyhow!("{}", message)),
            }
        }
    }

    fn handler_with(vision: Arc<ScriptedVision>) -> AnalysisHandler {
        AnalysisHandler::new(vision, Some("sk-test".to_string()))
    }

    fn request(image: Option<&str>) -> AnalysisRequest {
        AnalysisRequest {
            image: image.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_missing_or_empty_image() {
        let vision = ScriptedVision::new(Reply::Text(APPLE));
        let handler = handler_with(vision.clone());

        assert_eq!(handler.analyze(request(None)).await, AnalysisOutcome::MissingImage);
        assert_eq!(handler.analyze(request(Some(""))).await, AnalysisOutcome::MissingImage);
        assert_eq!(vision.call_count(), 0);
    }

    #[tokio::test]
    async fn test_image_must_be_data_url() {
        let vision = ScriptedVision::new(Reply::Text(APPLE));
        let handler = handler_with(vision.clone());

        let images = [
            "not-a-data-url",
            "https://example.com/a.png",
            "data:text/plain;base64,AAAA",
            " data:image/png;base64,AAAA",
        ];
        for image in images {
            assert_eq!(
                handler.analyze(request(Some(image))).await,
                AnalysisOutcome::InvalidImageFormat,
                "image {:?}",
                image
            );
        }
        assert_eq!(vision.call_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_api_key_checked_after_image() {
        let vision = ScriptedVision::new(Reply::Text(APPLE));
        let handler = AnalysisHandler::new(vision.clone(), None);

        assert_eq!(
            handler.analyze(request(Some("data:image/jpeg;base64,/9j/4AAQ"))).await,
            AnalysisOutcome::MissingApiKey
        );
        assert_eq!(handler.analyze(request(None)).await, AnalysisOutcome::MissingImage);
        assert_eq!(vision.call_count(), 0);
    }

    #[tokio::test]
    async fn test_success_passes_model_json_through() {
        let vision = ScriptedVision::new(Reply::Text(APPLE));
        let handler = handler_with(vision.clone());

        let outcome = handler.analyze(request(Some("data:image/png;base64,AAAA"))).await;
        let expected: serde_json::Value = serde_json::from_str(APPLE).unwrap();
        assert_eq!(outcome, AnalysisOutcome::Success(expected));

        let calls = vision.calls.lock().unwrap();
        let (api_key, sent) = &calls[0];
        assert_eq!(api_key, "sk-test");
        assert_eq!(sent.prompt, NUTRITION_PROMPT);
        assert_eq!(sent.image_url, "data:image/png;base64,AAAA");
        assert_eq!(sent.detail, ImageDetail::Low);
        assert_eq!(sent.max_tokens, 800);
        assert!(sent.json_output);
    }

    #[tokio::test]
    async fn test_empty_response() {
        let handler = handler_with(ScriptedVision::new(Reply::Empty));
        assert_eq!(
            handler.analyze(request(Some("data:image/png;base64,AAAA"))).await,
            AnalysisOutcome::EmptyResponse
        );
    }

    #[tokio::test]
    async fn test_non_json_response_is_unparsable() {
        let handler = handler_with(ScriptedVision::new(Reply::Text("Looks like an apple, ~95 kcal")));
        assert_eq!(
            handler.analyze(request(Some("data:image/png;base64,AAAA"))).await,
            AnalysisOutcome::Unparsable {
                raw: "Looks like an apple, ~95 kcal".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_wrong_shape_is_unparsable() {
        let raw = r#"{"items":[{"name":"apple","calories":95}]}"#;
        let handler = handler_with(ScriptedVision::new(Reply::Text(raw)));
        assert_eq!(
            handler.analyze(request(Some("data:image/png;base64,AAAA"))).await,
            AnalysisOutcome::Unparsable { raw: raw.to_string() }
        );
    }

    #[tokio::test]
    async fn test_provider_failure() {
        let handler = handler_with(ScriptedVision::new(Reply::Fail("connection refused")));
        assert_eq!(
            handler.analyze(request(Some("data:image/png;base64,AAAA"))).await,
            AnalysisOutcome::Failed {
                details: "connection refused".to_string()
            }
        );

        let handler = handler_with(ScriptedVision::new(Reply::Fail("")));
        assert_eq!(
            handler.analyze(request(Some("data:image/png;base64,AAAA"))).await,
            AnalysisOutcome::Failed {
                details: "Unknown error".to_string()
            }
        );
    }

    #[test]
    fn test_parse_nutrition_keeps_extra_keys() {
        let raw = r#"{"total":{"food_names":[],"quantity":"combined meal","calories":0,"carbs":0,"fat":0,"protein":0},"message":"Empty plate","confidence":"low"}"#;
        let value = parse_nutrition(raw).unwrap();
        assert_eq!(value["confidence"], "low");
        assert_eq!(serde_json::to_string(&value).unwrap(), raw);
    }
}
