use std::time::Duration;

use axum::extract::Multipart;
use reqwest::multipart::{Form, Part};
use serde_json::{json, Value};
use tracing::debug;

use super::dto::{
    AnalyzerRequest, RawAnalyzerForm, UploadedFile, DEFAULT_CONTENT_TYPE, DEFAULT_FILE_NAME,
};
use crate::{
    error::ProxyError,
    upstream::{snippet, SNIPPET_MAX_CHARS},
};

/// Buffers the multipart body, sorting fields into question / `files` / `file`.
/// Unknown fields are skipped.
pub async fn read_form(mut mp: Multipart) -> Result<RawAnalyzerForm, ProxyError> {
    let mut form = RawAnalyzerForm::default();
    while let Some(field) = mp.next_field().await? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "question" => form.question = Some(field.text().await?),
            "files" | "files[]" | "file" => {
                let file_name = field
                    .file_name()
                    .filter(|n| !n.is_empty())
                    .unwrap_or(DEFAULT_FILE_NAME)
                    .to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or(DEFAULT_CONTENT_TYPE)
                    .to_string();
                let data = field.bytes().await?;
                let upload = UploadedFile {
                    file_name,
                    content_type,
                    data,
                };
                if name == "file" {
                    form.file.push(upload);
                } else {
                    form.files.push(upload);
                }
            }
            other => debug!(field = other, "ignoring multipart field"),
        }
    }
    Ok(form)
}

/// Collapses `files` / `file` into one list: everything under `files`, or the
/// first `file` entry when `files` is empty. Empty uploads do not count.
pub fn normalize_files(raw: RawAnalyzerForm) -> Vec<UploadedFile> {
    let files: Vec<UploadedFile> = raw
        .files
        .into_iter()
        .filter(|f| !f.data.is_empty())
        .collect();
    if !files.is_empty() {
        return files;
    }
    raw.file
        .into_iter()
        .find(|f| !f.data.is_empty())
        .into_iter()
        .collect()
}

pub fn validate(raw: RawAnalyzerForm) -> Result<AnalyzerRequest, ProxyError> {
    let question = raw.question.as_deref().unwrap_or_default().trim().to_string();
    if question.is_empty() {
        return Err(ProxyError::Input("The question is required".into()));
    }
    let files = normalize_files(raw);
    if files.is_empty() {
        return Err(ProxyError::Input(
            "At least one file is required (field `files` or `file`)".into(),
        ));
    }
    Ok(AnalyzerRequest { question, files })
}

fn file_part(file: &UploadedFile) -> Part {
    let part = || Part::bytes(file.data.to_vec()).file_name(file.file_name.clone());
    // unparsable content types are sent without one
    part().mime_str(&file.content_type).unwrap_or_else(|_| part())
}

/// Re-encodes the request for the QA service. The external file-storage API
/// is always disabled and every file goes under `files`.
pub fn qa_form(req: &AnalyzerRequest) -> Form {
    req.files.iter().fold(
        Form::new()
            .text("question", req.question.clone())
            .text("use_files_api", "false"),
        |form, f| form.part("files", file_part(f)),
    )
}

/// Single-file form for the meal analyzer, which expects the field `file`.
pub fn meal_form(file: &UploadedFile) -> Form {
    Form::new().part("file", file_part(file))
}

/// Turns a successful QA body into the browser envelope.
///
/// A body without a non-empty `answer` is treated as malformed. Timing:
/// `processing_time_ms` = upstream-reported processing time (or the upstream
/// round trip when none is reported) + time spent in this proxy outside the
/// upstream call.
pub fn enrich_answer(
    mut body: Value,
    upstream_round_trip: Duration,
    total: Duration,
) -> Result<Value, ProxyError> {
    let has_answer = body
        .get("answer")
        .and_then(Value::as_str)
        .is_some_and(|a| !a.trim().is_empty());
    if !has_answer {
        return Err(ProxyError::Protocol {
            status: 200,
            reason: "Upstream response has no answer".into(),
            body_snippet: snippet(&body.to_string(), SNIPPET_MAX_CHARS),
            content_type: Some("application/json".into()),
        });
    }

    let round_trip_ms = millis(upstream_round_trip);
    let proxy_ms = millis(total.saturating_sub(upstream_round_trip));
    let upstream_ms = body
        .get("metadata")
        .and_then(|m| m.get("processing_time_ms"))
        .and_then(Value::as_f64)
        .unwrap_or(round_trip_ms);

    if !body.get("metadata").is_some_and(Value::is_object) {
        body["metadata"] = json!({});
    }
    let meta = &mut body["metadata"];
    meta["upstream_processing_time_ms"] = json!(upstream_ms);
    meta["proxy_time_ms"] = json!(proxy_ms);
    meta["processing_time_ms"] = json!((upstream_ms + proxy_ms).round());
    body["ok"] = json!(true);
    Ok(body)
}

fn millis(d: Duration) -> f64 {
    d.as_micros() as f64 / 1000.0
}
