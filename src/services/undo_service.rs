use std::fs;
use std::path::Path;

use tracing::warn;

use crate::models::operation::MoveOperation;

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UndoReport {
    pub restored: usize,
    pub skipped: usize,
}

/// Replays the operation log in reverse (last move first), restoring
/// every file to its recorded original location. The log is fully
/// consumed. A missing or unrestorable source is logged and skipped,
/// never fatal; after each restore the now-possibly-empty parent folder
/// is removed if nothing is left in it.
pub fn undo_moves(operations: &mut Vec<MoveOperation>) -> UndoReport {
    let mut report = UndoReport::default();

    while let Some(operation) = operations.pop() {
        let source = Path::new(&operation.source);
        let target = Path::new(&operation.target);

        if !source.exists() {
            warn!("undo source missing, skipping: {}", operation.source);
            report.skipped += 1;
            continue;
        }
        if let Err(err) = restore(source, target) {
            warn!(
                "failed to restore '{}' to '{}': {err}",
                operation.source, operation.target
            );
            report.skipped += 1;
            continue;
        }
        report.restored += 1;

        if let Some(parent) = source.parent() {
            // Fails while siblings are still pending restoration; those
            // are restored first because the log is replayed in reverse.
            let _ = fs::remove_dir(parent);
        }
    }

    report
}

fn restore(source: &Path, target: &Path) -> std::io::Result<()> {
    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::rename(source, target)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(source: &Path, target: &Path) -> MoveOperation {
        MoveOperation {
            source: source.to_string_lossy().to_string(),
            target: target.to_string_lossy().to_string(),
        }
    }

    #[test]
    fn restores_in_reverse_and_consumes_the_log() {
        let dir = tempfile::tempdir().unwrap();
        let moved_dir = dir.path().join("grouped");
        fs::create_dir(&moved_dir).unwrap();
        let moved_a = moved_dir.join("a.txt");
        let moved_b = moved_dir.join("b.txt");
        fs::write(&moved_a, "alpha").unwrap();
        fs::write(&moved_b, "beta").unwrap();
        let home_a = dir.path().join("a.txt");
        let home_b = dir.path().join("b.txt");

        let mut operations = vec![op(&moved_a, &home_a), op(&moved_b, &home_b)];
        let report = undo_moves(&mut operations);

        assert!(operations.is_empty());
        assert_eq!(report, UndoReport { restored: 2, skipped: 0 });
        assert_eq!(fs::read_to_string(&home_a).unwrap(), "alpha");
        assert_eq!(fs::read_to_string(&home_b).unwrap(), "beta");
        // The emptied group folder is cleaned up.
        assert!(!moved_dir.exists());
    }

    #[test]
    fn recreates_missing_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let moved = dir.path().join("flat.txt");
        fs::write(&moved, "content").unwrap();
        let target = dir.path().join("deep/nested/original.txt");

        let mut operations = vec![op(&moved, &target)];
        undo_moves(&mut operations);

        assert_eq!(fs::read_to_string(&target).unwrap(), "content");
    }

    #[test]
    fn missing_source_is_skipped_without_aborting() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("present.txt");
        fs::write(&present, "here").unwrap();
        let gone = dir.path().join("gone.txt");
        let home_present = dir.path().join("restored/present.txt");
        let home_gone = dir.path().join("restored/gone.txt");

        // `present` is popped first (last in), then the missing one.
        let mut operations = vec![op(&gone, &home_gone), op(&present, &home_present)];
        let report = undo_moves(&mut operations);

        assert!(operations.is_empty());
        assert_eq!(report, UndoReport { restored: 1, skipped: 1 });
        assert!(home_present.exists());
        assert!(!home_gone.exists());
    }

    #[test]
    fn nonempty_parent_survives_cleanup() {
        let dir = tempfile::tempdir().unwrap();
        let folder = dir.path().join("grouped");
        fs::create_dir(&folder).unwrap();
        let moved = folder.join("a.txt");
        fs::write(&moved, "x").unwrap();
        fs::write(folder.join("metadata.txt"), "meta").unwrap();

        let mut operations = vec![op(&moved, &dir.path().join("a.txt"))];
        undo_moves(&mut operations);

        assert!(folder.exists());
        assert!(folder.join("metadata.txt").exists());
    }
}
