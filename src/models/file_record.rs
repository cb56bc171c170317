use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// One scanned file. `path` tracks the file's current location and is
/// updated in place when the reorganizer moves the underlying file; the
/// rest of the fields are fixed at scan time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FileRecord {
    pub path: String,
    pub name: String,
    /// Lowercased, with leading dot; empty when the file has none.
    pub extension: String,
    pub relative_path: String,
    pub size_bytes: u64,
    pub modified_at: Option<String>,
    /// Hex SHA-256 of the full byte content, computed once at scan time.
    pub digest: String,
    pub summary: String,
    pub metadata: HashMap<String, String>,
}
