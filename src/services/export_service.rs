use std::path::Path;

use rust_xlsxwriter::Workbook;
use tracing::warn;

use crate::error::Result;
use crate::models::operation::MetadataRow;

pub const CSV_EXPORT: &str = "metadata_summary.csv";
const XLSX_EXPORT: &str = "metadata_summary.xlsx";

const HEADERS: [&str; 6] = [
    "group_name",
    "file_name",
    "original_path",
    "new_path",
    "description",
    "timestamp",
];

/// Writes `metadata_summary.csv` (one row per relocated file) and a
/// best-effort `.xlsx` mirror whose failure never propagates. No files
/// are written when there are no rows.
pub fn export_metadata(output_dir: &Path, rows: &[MetadataRow]) -> Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let mut writer = csv::Writer::from_path(output_dir.join(CSV_EXPORT))?;
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;

    if let Err(err) = export_xlsx(output_dir, rows) {
        warn!("spreadsheet mirror failed: {err}");
    }
    Ok(())
}

fn export_xlsx(
    output_dir: &Path,
    rows: &[MetadataRow],
) -> std::result::Result<(), rust_xlsxwriter::XlsxError> {
    let mut workbook = Workbook::new();
    let sheet = workbook.add_worksheet();

    for (col, header) in HEADERS.iter().enumerate() {
        sheet.write_string(0, col as u16, *header)?;
    }
    for (idx, row) in rows.iter().enumerate() {
        let r = (idx + 1) as u32;
        sheet.write_string(r, 0, row.group_name.as_str())?;
        sheet.write_string(r, 1, row.file_name.as_str())?;
        sheet.write_string(r, 2, row.original_path.as_str())?;
        sheet.write_string(r, 3, row.new_path.as_str())?;
        sheet.write_string(r, 4, row.description.as_str())?;
        sheet.write_string(r, 5, row.timestamp.as_str())?;
    }

    workbook.save(output_dir.join(XLSX_EXPORT))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(group: &str, file: &str) -> MetadataRow {
        MetadataRow {
            group_name: group.to_string(),
            file_name: file.to_string(),
            original_path: format!("/scan/{file}"),
            new_path: format!("/out/{group}/{file}"),
            description: "desc".to_string(),
            timestamp: "2024-01-01T00:00:00+00:00".to_string(),
        }
    }

    #[test]
    fn csv_has_header_and_one_line_per_row() {
        let dir = tempfile::tempdir().unwrap();
        let rows = vec![row("A", "a.txt"), row("B", "b.txt")];

        export_metadata(dir.path(), &rows).unwrap();

        let content = std::fs::read_to_string(dir.path().join(CSV_EXPORT)).unwrap();
        let mut lines = content.lines();
        assert_eq!(
            lines.next().unwrap(),
            "group_name,file_name,original_path,new_path,description,timestamp"
        );
        assert_eq!(lines.count(), 2);
    }

    #[test]
    fn empty_rows_write_nothing() {
        let dir = tempfile::tempdir().unwrap();
        export_metadata(dir.path(), &[]).unwrap();
        assert!(!dir.path().join(CSV_EXPORT).exists());
        assert!(!dir.path().join(XLSX_EXPORT).exists());
    }

    #[test]
    fn xlsx_mirror_is_written_alongside() {
        let dir = tempfile::tempdir().unwrap();
        export_metadata(dir.path(), &[row("A", "a.txt")]).unwrap();
        assert!(dir.path().join(XLSX_EXPORT).exists());
    }
}
