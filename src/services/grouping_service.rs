use serde_json::json;
use tracing::{debug, warn};

use crate::config::AppConfig;
use crate::error::{AppError, Result};
use crate::models::file_record::FileRecord;
use crate::models::grouping::{GroupSpec, GroupingResult, ParsedGroups};
use crate::services::gemini_service;

/// Bucket key for files without an extension in the fallback grouping.
const NO_EXTENSION_BUCKET: &str = "other";

/// Asks Gemini to group the manifest, parsing its textual response.
/// Never errors outward: every failure mode (unconfigured key, network,
/// unparseable response, zero groups) degrades to the deterministic
/// extension fallback, flagged via `used_fallback`. `notify` receives
/// human-readable progress notices.
pub async fn request_grouping(
    records: &[FileRecord],
    duplicate_report: &str,
    config: &AppConfig,
    mut notify: impl FnMut(&str),
) -> GroupingResult {
    match try_service_grouping(records, duplicate_report, config, &mut notify).await {
        Ok(result) => result,
        Err(err) => {
            warn!("grouping via Gemini failed: {err}");
            notify(&format!(
                "Grouping via Gemini failed: {err}. Falling back to extension-based groups."
            ));
            GroupingResult {
                groups: fallback_grouping(records),
                raw_response: json!({ "error": err.to_string() }),
                used_fallback: true,
            }
        }
    }
}

async fn try_service_grouping(
    records: &[FileRecord],
    duplicate_report: &str,
    config: &AppConfig,
    notify: &mut impl FnMut(&str),
) -> Result<GroupingResult> {
    let summaries = gemini_service::summarize_for_prompt(records);
    let prompt = gemini_service::build_prompt(&summaries, duplicate_report);
    debug!("prompt sent to Gemini: {prompt}");
    notify("Sending file summaries to Gemini…");

    let response = gemini_service::generate(&prompt, config).await?;
    let text = gemini_service::extract_text(&response)?;

    let groups = match parse_groups(&text) {
        ParsedGroups::Strict(groups) | ParsedGroups::Lenient(groups) if !groups.is_empty() => {
            groups
        }
        _ => return Err(AppError::EmptyResult),
    };

    Ok(GroupingResult {
        groups,
        raw_response: response,
        used_fallback: false,
    })
}

/// Strict JSON array first (after peeling a markdown code fence), then
/// the lenient line-oriented grammar.
pub fn parse_groups(text: &str) -> ParsedGroups {
    let payload = strip_code_fence(text);

    match serde_json::from_str::<Vec<GroupSpec>>(&payload) {
        Ok(groups) => return ParsedGroups::Strict(groups),
        Err(err) => debug!("strict JSON parse failed: {err}"),
    }

    let groups = parse_groups_lenient(&payload);
    if groups.is_empty() {
        ParsedGroups::Failed(
            "response contained neither a JSON array nor group lines".to_string(),
        )
    } else {
        ParsedGroups::Lenient(groups)
    }
}

fn strip_code_fence(text: &str) -> String {
    let trimmed = text.trim();
    if !trimmed.starts_with("```") {
        return trimmed.to_string();
    }
    let inner = trimmed.trim_matches('`');
    // The first fence line carries at most a language tag.
    match inner.split_once('\n') {
        Some((_, body)) => body.trim().to_string(),
        None => inner.trim().to_string(),
    }
}

/// Lenient grammar: a line ending in `:` starts a group; `summary:`
/// (case-insensitive) sets the current group's summary; any other
/// non-blank line is comma-split into file identifiers.
fn parse_groups_lenient(text: &str) -> Vec<GroupSpec> {
    let mut groups: Vec<GroupSpec> = Vec::new();
    let mut current: Option<GroupSpec> = None;

    for raw_line in text.lines() {
        let line = raw_line.trim();
        if line.is_empty() {
            continue;
        }
        if let Some(name) = line.strip_suffix(':') {
            if let Some(group) = current.take() {
                groups.push(group);
            }
            current = Some(GroupSpec {
                group_name: name.to_string(),
                summary: String::new(),
                files: Vec::new(),
            });
        } else if let Some(rest) = strip_prefix_ignore_case(line, "summary:") {
            if let Some(group) = current.as_mut() {
                group.summary = rest.trim().to_string();
            }
        } else if let Some(group) = current.as_mut() {
            group.files.extend(
                line.split(',')
                    .map(str::trim)
                    .filter(|token| !token.is_empty())
                    .map(String::from),
            );
        }
    }
    if let Some(group) = current {
        groups.push(group);
    }
    groups
}

fn strip_prefix_ignore_case<'a>(line: &'a str, prefix: &str) -> Option<&'a str> {
    let head = line.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        line.get(prefix.len()..)
    } else {
        None
    }
}

/// Deterministic fallback: one group per extension, in first-seen order,
/// listing member bare names. Files without an extension bucket under
/// `other`.
pub fn fallback_grouping(records: &[FileRecord]) -> Vec<GroupSpec> {
    let mut buckets: Vec<(String, Vec<String>)> = Vec::new();
    for record in records {
        let key = if record.extension.is_empty() {
            NO_EXTENSION_BUCKET.to_string()
        } else {
            record.extension.clone()
        };
        match buckets.iter_mut().find(|(ext, _)| *ext == key) {
            Some((_, files)) => files.push(record.name.clone()),
            None => buckets.push((key, vec![record.name.clone()])),
        }
    }

    buckets
        .into_iter()
        .map(|(ext, files)| GroupSpec {
            group_name: if ext.starts_with('.') {
                format!("File {}", ext.to_uppercase())
            } else {
                ext.clone()
            },
            summary: format!("Automatic grouping by the {ext} extension"),
            files,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(name: &str, extension: &str) -> FileRecord {
        FileRecord {
            path: format!("/scan/{name}"),
            name: name.to_string(),
            extension: extension.to_string(),
            relative_path: name.to_string(),
            size_bytes: 0,
            modified_at: None,
            digest: name.to_string(),
            summary: String::new(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn well_formed_json_array_parses_strictly() {
        let text = r#"[{"group_name": "Reports", "summary": "Quarterly", "files": ["q1.txt", "q2.txt"]}]"#;
        let ParsedGroups::Strict(groups) = parse_groups(text) else {
            panic!("expected strict parse");
        };
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_name, "Reports");
        assert_eq!(groups[0].files, ["q1.txt", "q2.txt"]);
    }

    #[test]
    fn fenced_json_parses_strictly() {
        let text = "```json\n[{\"group_name\": \"Docs\", \"summary\": \"\", \"files\": [\"a.md\"]}]\n```";
        let ParsedGroups::Strict(groups) = parse_groups(text) else {
            panic!("expected strict parse");
        };
        assert_eq!(groups[0].group_name, "Docs");
        assert_eq!(groups[0].files, ["a.md"]);
    }

    #[test]
    fn non_json_lines_parse_leniently() {
        let text = "Images:\na.png, b.png";
        let ParsedGroups::Lenient(groups) = parse_groups(text) else {
            panic!("expected lenient parse");
        };
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0].group_name, "Images");
        assert_eq!(groups[0].files, ["a.png", "b.png"]);
    }

    #[test]
    fn lenient_parser_reads_summaries_and_multiple_groups() {
        let text = "Invoices:\nSummary: billing documents\ninv1.pdf\ninv2.pdf\nNotes:\nnotes.md";
        let ParsedGroups::Lenient(groups) = parse_groups(text) else {
            panic!("expected lenient parse");
        };
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].summary, "billing documents");
        assert_eq!(groups[0].files, ["inv1.pdf", "inv2.pdf"]);
        assert_eq!(groups[1].group_name, "Notes");
        assert_eq!(groups[1].files, ["notes.md"]);
    }

    #[test]
    fn unusable_text_is_a_failure() {
        assert!(matches!(parse_groups("   "), ParsedGroups::Failed(_)));
    }

    #[test]
    fn fallback_partitions_by_extension() {
        let records = vec![
            record("a.txt", ".txt"),
            record("b.md", ".md"),
            record("c.txt", ".txt"),
            record("README", ""),
        ];
        let groups = fallback_grouping(&records);
        assert_eq!(groups.len(), 3);

        let txt = groups.iter().find(|g| g.group_name == "File .TXT").unwrap();
        assert_eq!(txt.files, ["a.txt", "c.txt"]);
        let md = groups.iter().find(|g| g.group_name == "File .MD").unwrap();
        assert_eq!(md.files, ["b.md"]);
        let other = groups.iter().find(|g| g.group_name == "other").unwrap();
        assert_eq!(other.files, ["README"]);

        // Strict partition: every input file appears exactly once.
        let total: usize = groups.iter().map(|g| g.files.len()).sum();
        assert_eq!(total, records.len());
    }

    #[tokio::test]
    async fn unconfigured_key_triggers_fallback() {
        let records = vec![record("a.txt", ".txt"), record("b.md", ".md")];
        let config = AppConfig::default();
        let mut notices = Vec::new();

        let result = request_grouping(&records, "No duplicates detected.", &config, |msg| {
            notices.push(msg.to_string())
        })
        .await;

        assert!(result.used_fallback);
        assert_eq!(result.groups.len(), 2);
        assert!(result.raw_response.get("error").is_some());
        assert!(notices.iter().any(|n| n.contains("Falling back")));
    }
}
