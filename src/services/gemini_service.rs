use std::time::Duration;

use serde::Deserialize;
use serde_json::json;

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::models::file_record::FileRecord;

const GENERATION_ENDPOINT: &str = "https://generativelanguage.googleapis.com/v1beta/models";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// One `Name:/Location:/Summary:` block per file, `---` separated, as
/// embedded in the grouping prompt.
pub fn summarize_for_prompt(records: &[FileRecord]) -> String {
    records
        .iter()
        .map(|record| {
            format!(
                "Name: {}\nLocation: {}\nSummary: {}\n---",
                record.name, record.relative_path, record.summary
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn build_prompt(file_summaries: &str, duplicate_report: &str) -> String {
    format!(
        "You are an assistant that groups files by the semantic similarity of their content.\n\
         Use the data below to organize the files into logical groups.\n\
         Every group must have a name, a short summary, and a list of file names.\n\
         If any files look like duplicates, place them in a dedicated group named 'Duplicates'.\n\
         Return the result as JSON with the schema: \
         [{{\"group_name\": str, \"summary\": str, \"files\": [str, ...]}}].\n\
         File listing:\n\
         {file_summaries}\n\
         \n\
         Duplicate report:\n\
         {duplicate_report}"
    )
}

/// Single-attempt `generateContent` call: API key as query parameter,
/// prompt as one text part, 60-second timeout, no retry. Fails with
/// `Configuration` before any network I/O when the key is unset.
pub async fn generate(prompt: &str, config: &AppConfig) -> Result<serde_json::Value> {
    if !config.api_key_configured() {
        return Err(AppError::Configuration);
    }

    let url = format!("{GENERATION_ENDPOINT}/{}:generateContent", config.model);
    let body = json!({
        "contents": [
            { "parts": [ { "text": prompt } ] }
        ]
    });

    let client = reqwest::Client::new();
    let response = client
        .post(&url)
        .query(&[("key", config.gemini_api_key.as_str())])
        .json(&body)
        .timeout(REQUEST_TIMEOUT)
        .send()
        .await?;

    if !response.status().is_success() {
        let status = response.status();
        let detail = response.text().await.unwrap_or_default();
        return Err(AppError::ServiceCall(format!(
            "Gemini API returned {status}: {detail}"
        )));
    }

    Ok(response.json().await?)
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(default)]
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    #[serde(default)]
    content: Content,
}

#[derive(Debug, Default, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// First non-empty text part of any candidate; legacy responses carried
/// the text at the top level instead.
pub fn extract_text(response: &serde_json::Value) -> Result<String> {
    let parsed: GenerateResponse =
        serde_json::from_value(response.clone()).map_err(|_| AppError::ResponseFormat)?;

    for candidate in parsed.candidates {
        for part in candidate.content.parts {
            if let Some(text) = part.text {
                if !text.is_empty() {
                    return Ok(text);
                }
            }
        }
    }
    if let Some(text) = parsed.text {
        return Ok(text);
    }
    Err(AppError::ResponseFormat)
}
