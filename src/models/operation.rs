use serde::{Deserialize, Serialize};

/// One physically relocated file. `source` is the post-move location,
/// `target` the location to restore on undo. Append order is move order;
/// undo replays the sequence in reverse.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoveOperation {
    pub source: String,
    pub target: String,
}

/// One row of the tabular export, accumulated per relocated file. Field
/// order matches the `metadata_summary.csv` header.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetadataRow {
    pub group_name: String,
    pub file_name: String,
    pub original_path: String,
    pub new_path: String,
    pub description: String,
    pub timestamp: String,
}
