use reqwest::Method;
use tracing::warn;

use super::ApiClient;
use crate::analyzer::{
    dto::{MealAnalysisResponse, MultimodalResponse, RawAnalyzerForm, UploadedFile},
    services::{meal_form, qa_form, validate},
};
use crate::upstream::snippet;

const PREVIEW_CHARS: usize = 200;

/// Result of a multimodal question, ready for display.
#[derive(Debug, Clone, PartialEq)]
pub enum AnalysisOutcome {
    Answer(String),
    Failed(String),
}

/// Sends a meal photo to `/api/analyze-meal`.
#[derive(Debug, Clone)]
pub struct MealAnalyzer {
    api: ApiClient,
}

impl MealAnalyzer {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn analyze_meal_image(&self, image: &UploadedFile) -> Option<MealAnalysisResponse> {
        if image.data.is_empty() {
            return None;
        }
        let req = self
            .api
            .request(Method::POST, "/api/analyze-meal")
            .multipart(meal_form(image));
        self.api
            .fetch::<MealAnalysisResponse>(req, "meal analysis")
            .await
            .filter(|r| r.ok)
    }
}

/// Asks a question about uploaded documents or images.
#[derive(Debug, Clone)]
pub struct MultimodalClient {
    api: ApiClient,
}

impl MultimodalClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn analyze(&self, question: &str, files: Vec<UploadedFile>) -> AnalysisOutcome {
        let request = match validate(RawAnalyzerForm {
            question: Some(question.to_string()),
            files,
            file: Vec::new(),
        }) {
            Ok(r) => r,
            Err(e) => return AnalysisOutcome::Failed(e.to_string()),
        };

        let req = self
            .api
            .request(Method::POST, "/api/multimodal-analyzer")
            .multipart(qa_form(&request));
        let resp = match req.send().await {
            Ok(r) => r,
            Err(e) => {
                warn!(error = %e, "multimodal request failed");
                return AnalysisOutcome::Failed(format!("Request failed: {e}"));
            }
        };

        let status = resp.status();
        let is_json = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .is_some_and(|ct| ct.contains("application/json"));
        let text = resp.text().await.unwrap_or_default();
        if !is_json {
            return AnalysisOutcome::Failed(format!(
                "Unexpected non-JSON response ({status}): {}",
                snippet(&text, PREVIEW_CHARS)
            ));
        }

        match serde_json::from_str::<MultimodalResponse>(&text) {
            Ok(body) => outcome_from(status.is_success(), body),
            Err(e) => AnalysisOutcome::Failed(format!("Malformed JSON response: {e}")),
        }
    }
}

fn outcome_from(success: bool, body: MultimodalResponse) -> AnalysisOutcome {
    match body {
        MultimodalResponse {
            ok: true,
            answer: Some(answer),
            ..
        } if success => AnalysisOutcome::Answer(answer),
        MultimodalResponse {
            error: Some(error), ..
        } => AnalysisOutcome::Failed(error),
        _ => AnalysisOutcome::Failed("The analysis could not be completed".into()),
    }
}
