use serde::{Deserialize, Serialize};

/// A grouping proposal from the model or the extension fallback. The
/// `files` entries are identifiers (bare names or relative paths) as
/// returned by the model, resolved against the manifest only at apply
/// time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GroupSpec {
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub files: Vec<String>,
}

/// Outcome of one grouping request. `raw_response` holds the service
/// payload, or `{"error": ...}` when the fallback engaged.
#[derive(Debug, Clone, Serialize)]
pub struct GroupingResult {
    pub groups: Vec<GroupSpec>,
    pub raw_response: serde_json::Value,
    pub used_fallback: bool,
}

/// How the model's text was understood. Strict JSON is attempted first,
/// the line-oriented parser second; `Failed` triggers the extension
/// fallback.
#[derive(Debug, Clone)]
pub enum ParsedGroups {
    Strict(Vec<GroupSpec>),
    Lenient(Vec<GroupSpec>),
    Failed(String),
}
