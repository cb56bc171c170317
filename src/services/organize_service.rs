use std::collections::HashMap;
use std::fs;
use std::io;
use std::path::Path;

use chrono::{Local, SecondsFormat};
use tracing::debug;

use crate::error::AppError;
use crate::models::file_record::FileRecord;
use crate::models::grouping::GroupSpec;
use crate::models::operation::{MetadataRow, MoveOperation};
use crate::services::duplicate_service::DuplicateSet;
use crate::services::export_service;

pub const DEFAULT_GROUP_LABEL: &str = "Group";
pub const DUPLICATES_FOLDER: &str = "Duplicates";
const METADATA_FILE: &str = "metadata.txt";

/// Collapses whitespace runs to underscores; empty names fall back to a
/// fixed label. Group names come from the model, so path separators and
/// dot-only names are neutralized — a proposed name cannot place its
/// folder outside the output directory.
pub fn sanitize_group_name(name: &str) -> String {
    let cleaned = name
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
        .replace(['/', '\\'], "_");
    if cleaned.is_empty() || cleaned.chars().all(|c| c == '.') {
        DEFAULT_GROUP_LABEL.to_string()
    } else {
        cleaned
    }
}

/// Moves files into per-group folders under `output_dir`, relocates
/// non-primary duplicate members into a dedicated folder, writes
/// per-folder metadata and the tabular export, and returns the ordered
/// operation log needed for undo. Identifiers the lookup cannot resolve
/// are skipped. On failure the apply aborts; the operations recorded so
/// far ride inside `AppError::Move` so the caller can still undo them.
pub fn apply_grouping(
    groups: &[GroupSpec],
    records: &mut [FileRecord],
    lookup: &HashMap<String, usize>,
    output_dir: &Path,
    duplicates: &[DuplicateSet],
) -> Result<Vec<MoveOperation>, AppError> {
    let mut operations = Vec::new();
    match apply_inner(groups, records, lookup, output_dir, duplicates, &mut operations) {
        Ok(()) => Ok(operations),
        Err(err) => Err(AppError::Move {
            reason: err.to_string(),
            completed: operations,
        }),
    }
}

fn apply_inner(
    groups: &[GroupSpec],
    records: &mut [FileRecord],
    lookup: &HashMap<String, usize>,
    output_dir: &Path,
    duplicates: &[DuplicateSet],
    operations: &mut Vec<MoveOperation>,
) -> Result<(), AppError> {
    fs::create_dir_all(output_dir)?;

    let mut rows: Vec<MetadataRow> = Vec::new();
    // One timestamp per apply action, shared by every row.
    let timestamp = Local::now().to_rfc3339_opts(SecondsFormat::Secs, false);

    for group in groups {
        let folder_name = sanitize_group_name(&group.group_name);
        let target_folder = output_dir.join(&folder_name);
        fs::create_dir_all(&target_folder)?;

        let mut member_lines: Vec<String> = Vec::new();
        for identifier in &group.files {
            let Some(&idx) = lookup.get(identifier.as_str()) else {
                // The model sometimes invents file names; tolerate them.
                debug!("skipping unresolved identifier '{identifier}'");
                continue;
            };
            let record = &mut records[idx];
            let destination = target_folder.join(&record.name);
            let destination_str = destination.to_string_lossy().to_string();

            move_file(Path::new(&record.path), &destination)?;

            operations.push(MoveOperation {
                source: destination_str.clone(),
                target: record.path.clone(),
            });
            member_lines.push(format!("- {}", record.name));
            rows.push(MetadataRow {
                group_name: group.group_name.clone(),
                file_name: record.name.clone(),
                original_path: record.path.clone(),
                new_path: destination_str.clone(),
                description: group.summary.clone(),
                timestamp: timestamp.clone(),
            });
            record.path = destination_str;
        }

        write_group_metadata(
            &target_folder,
            &group.group_name,
            &group.summary,
            &timestamp,
            &member_lines,
        )?;
    }

    if !duplicates.is_empty() {
        let dup_folder = output_dir.join(DUPLICATES_FOLDER);
        fs::create_dir_all(&dup_folder)?;

        let mut member_lines: Vec<String> = Vec::new();
        for set in duplicates {
            let primary_name = records[set.members[0]].name.clone();
            for &idx in &set.members[1..] {
                let record = &mut records[idx];
                let destination = dup_folder.join(&record.name);
                let destination_str = destination.to_string_lossy().to_string();

                move_file(Path::new(&record.path), &destination)?;

                operations.push(MoveOperation {
                    source: destination_str.clone(),
                    target: record.path.clone(),
                });
                member_lines.push(format!(
                    "- {} (duplicate of {})",
                    record.name, primary_name
                ));
                rows.push(MetadataRow {
                    group_name: DUPLICATES_FOLDER.to_string(),
                    file_name: record.name.clone(),
                    original_path: record.path.clone(),
                    new_path: destination_str.clone(),
                    description: format!("Duplicate of {primary_name} by content hash"),
                    timestamp: timestamp.clone(),
                });
                record.path = destination_str;
            }
        }

        write_group_metadata(
            &dup_folder,
            DUPLICATES_FOLDER,
            "Files with identical content",
            &timestamp,
            &member_lines,
        )?;
    }

    export_service::export_metadata(output_dir, &rows)?;
    Ok(())
}

fn move_file(source: &Path, destination: &Path) -> io::Result<()> {
    if let Some(parent) = destination.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(source, destination)
}

fn write_group_metadata(
    folder: &Path,
    name: &str,
    description: &str,
    timestamp: &str,
    members: &[String],
) -> io::Result<()> {
    let mut lines = vec![
        format!("Group name : {name}"),
        format!("Description : {description}"),
        format!("Created at : {timestamp}"),
        String::new(),
        "Files:".to_string(),
    ];
    lines.extend_from_slice(members);
    fs::write(folder.join(METADATA_FILE), lines.join("\n"))
}
