use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::Result;
use crate::models::file_record::FileRecord;
use crate::services::{extract_service, hash_service};

pub const SUMMARY_MAX_CHARS: usize = 400;
const TRUNCATION_MARKER: char = '…';

/// Recursively scans `root` and returns one record per regular file with
/// a supported extension, in sorted traversal order. Extraction failures
/// land in the file's summary; stat or hash failures abort the scan.
pub fn scan(root: &Path) -> Result<Vec<FileRecord>> {
    if !root.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            format!("not a directory: {}", root.display()),
        )
        .into());
    }

    let paths: Vec<PathBuf> = WalkDir::new(root)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| extract_service::is_supported(&extract_service::normalized_extension(path)))
        .collect();

    debug!("scanning {} supported files under {}", paths.len(), root.display());

    // Reading and hashing dominate scan latency; fan out across files.
    // The indexed iterator keeps the manifest in traversal order
    // regardless of completion order.
    paths
        .par_iter()
        .map(|path| build_record(root, path))
        .collect()
}

fn build_record(root: &Path, path: &Path) -> Result<FileRecord> {
    let extension = extract_service::normalized_extension(path);
    let text = match extract_service::extract_text(path, &extension) {
        Ok(text) => text,
        Err(err) => format!("Failed to read file content: {err}"),
    };
    let summary = generate_summary(&text);

    let stat = path.metadata()?;
    let modified_at = stat
        .modified()
        .ok()
        .map(|t| chrono::DateTime::<chrono::Utc>::from(t).to_rfc3339());

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();
    let relative_path = path
        .strip_prefix(root)
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| name.clone());

    let digest = hash_service::sha256_file(path)?;

    let mut metadata = HashMap::new();
    metadata.insert("relative_path".to_string(), relative_path.clone());

    Ok(FileRecord {
        path: path.to_string_lossy().to_string(),
        name,
        extension,
        relative_path,
        size_bytes: stat.len(),
        modified_at,
        digest,
        summary,
        metadata,
    })
}

/// Collapses whitespace runs to single spaces and caps the result at
/// `SUMMARY_MAX_CHARS`, appending a marker when content was dropped.
pub fn generate_summary(text: &str) -> String {
    let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let mut summary: String = collapsed.chars().take(SUMMARY_MAX_CHARS).collect();
    if collapsed.chars().count() > SUMMARY_MAX_CHARS {
        summary.push(TRUNCATION_MARKER);
    }
    summary
}

/// Maps both the bare name and the relative path of every record to its
/// manifest index. Bare names can collide across subdirectories; the
/// last-registered record wins. Relative-path keys stay unambiguous.
pub fn build_lookup(records: &[FileRecord]) -> HashMap<String, usize> {
    let mut lookup = HashMap::new();
    for (idx, record) in records.iter().enumerate() {
        lookup.insert(record.name.clone(), idx);
        lookup.insert(record.relative_path.clone(), idx);
    }
    lookup
}
