use serde::{Deserialize, Serialize};

/// Body of `POST /api/analyze-food`.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct AnalysisRequest {
    /// Data URL, e.g. `data:image/png;base64,...`. `null` is the same as missing.
    #[serde(default)]
    pub image: Option<String>,
}

/// Meal-level totals as returned by the vision model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NutritionResult {
    pub total: TotalNutrition,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TotalNutrition {
    pub food_names: Vec<String>,
    pub quantity: String,
    // serde_json::Number keeps 95 as 95 instead of 95.0
    pub calories: serde_json::Number,
    pub carbs: serde_json::Number,
    pub fat: serde_json::Number,
    pub protein: serde_json::Number,
}

#[derive(Debug, Clone, Serialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: None,
        }
    }

    pub fn with_details(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Sent with HTTP 200 when the model answered but not with usable JSON.
#[derive(Debug, Clone, Serialize)]
pub struct UnparsableBody {
    pub error: String,
    pub raw_response: String,
    pub message: String,
}
