use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const DEFAULT_FILE_NAME: &str = "upload.bin";
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// One uploaded file, already buffered.
#[derive(Debug, Clone, PartialEq)]
pub struct UploadedFile {
    pub file_name: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Multipart fields as they arrived, before normalization.
#[derive(Debug, Default)]
pub struct RawAnalyzerForm {
    pub question: Option<String>,
    /// Entries sent under `files` / `files[]`.
    pub files: Vec<UploadedFile>,
    /// Entries sent under the legacy `file` name.
    pub file: Vec<UploadedFile>,
}

/// Validated multimodal request: non-empty question, at least one file.
#[derive(Debug, Clone)]
pub struct AnalyzerRequest {
    pub question: String,
    pub files: Vec<UploadedFile>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MultimodalResponse {
    pub ok: bool,
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealNutrients {
    pub calories: f64,
    pub protein_g: f64,
    pub carbs_g: f64,
    pub fat_g: f64,
    #[serde(default)]
    pub fiber_g: Option<f64>,
    #[serde(default)]
    pub sugar_g: Option<f64>,
    #[serde(default)]
    pub sodium_mg: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealAnalysisMetadata {
    #[serde(default)]
    pub method: Option<String>,
    #[serde(default)]
    pub model: Option<String>,
    #[serde(default)]
    pub processing_time_ms: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MealAnalysisResponse {
    pub ok: bool,
    pub nutrients: MealNutrients,
    #[serde(default)]
    pub metadata: Option<MealAnalysisMetadata>,
}
