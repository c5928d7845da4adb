//! Hugging Face Inference API request and response types.

use serde::{Deserialize, Serialize};

/// Text-generation request body.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationRequest {
    /// The flattened prompt text.
    pub inputs: String,
    /// Generation parameters.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<GenerationParameters>,
}

/// Optional generation parameters.
#[derive(Debug, Clone, Serialize)]
pub struct GenerationParameters {
    /// Maximum tokens to generate.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_new_tokens: Option<u32>,
    /// Temperature for generation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
}

/// One generation in the response array.
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedText {
    /// Generated text; the endpoint often echoes the input at the front.
    pub generated_text: String,
}

/// Error body returned with non-2xx statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Human-readable error message.
    pub error: String,
    /// Seconds until a cold model is expected to be loaded, if applicable.
    pub estimated_time: Option<f32>,
}
