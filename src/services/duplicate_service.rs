use std::collections::HashMap;

use crate::models::file_record::FileRecord;

/// Files sharing one content digest. `members` holds manifest indices in
/// scan order; the first member is the primary, exempt from relocation.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    pub digest: String,
    pub members: Vec<usize>,
}

/// Groups the manifest by exact content digest and keeps only digests
/// with two or more members, in first-seen order. `threshold` is
/// accepted for API compatibility with a future fuzzy-similarity
/// detector and currently has no effect.
pub fn detect_duplicates(records: &[FileRecord], _threshold: f64) -> Vec<DuplicateSet> {
    let mut by_digest: HashMap<&str, Vec<usize>> = HashMap::new();
    let mut seen_order: Vec<&str> = Vec::new();

    for (idx, record) in records.iter().enumerate() {
        let members = by_digest.entry(record.digest.as_str()).or_default();
        if members.is_empty() {
            seen_order.push(record.digest.as_str());
        }
        members.push(idx);
    }

    seen_order
        .into_iter()
        .filter_map(|digest| {
            let members = by_digest.remove(digest)?;
            (members.len() > 1).then(|| DuplicateSet {
                digest: digest.to_string(),
                members,
            })
        })
        .collect()
}

/// Human-readable duplicate report: one line per set, primary first.
pub fn describe_duplicates(sets: &[DuplicateSet], records: &[FileRecord]) -> String {
    if sets.is_empty() {
        return "No duplicates detected.".to_string();
    }
    let mut lines = vec!["Duplicates detected:".to_string()];
    for set in sets {
        let primary = &records[set.members[0]];
        let others = set.members[1..]
            .iter()
            .map(|&idx| records[idx].name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        lines.push(format!("- {} -> {}", primary.name, others));
    }
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn record(name: &str, digest: &str) -> FileRecord {
        FileRecord {
            path: format!("/scan/{name}"),
            name: name.to_string(),
            extension: ".txt".to_string(),
            relative_path: name.to_string(),
            size_bytes: 0,
            modified_at: None,
            digest: digest.to_string(),
            summary: String::new(),
            metadata: HashMap::new(),
        }
    }

    #[test]
    fn groups_by_digest_and_drops_singletons() {
        // Digests by index: [A, A, B, A, C, C]
        let records = vec![
            record("a1.txt", "A"),
            record("a2.txt", "A"),
            record("b.txt", "B"),
            record("a3.txt", "A"),
            record("c1.txt", "C"),
            record("c2.txt", "C"),
        ];

        let sets = detect_duplicates(&records, 0.85);
        assert_eq!(sets.len(), 2);

        assert_eq!(sets[0].digest, "A");
        assert_eq!(sets[0].members, vec![0, 1, 3]);
        assert_eq!(sets[1].digest, "C");
        assert_eq!(sets[1].members, vec![4, 5]);
    }

    #[test]
    fn no_duplicates_yields_empty_mapping() {
        let records = vec![record("a.txt", "A"), record("b.txt", "B")];
        assert!(detect_duplicates(&records, 0.85).is_empty());
    }

    #[test]
    fn report_lists_primary_and_others() {
        let records = vec![
            record("first.txt", "A"),
            record("second.txt", "A"),
            record("third.txt", "A"),
        ];
        let sets = detect_duplicates(&records, 0.85);
        let report = describe_duplicates(&sets, &records);
        assert!(report.contains("Duplicates detected:"));
        assert!(report.contains("- first.txt -> second.txt, third.txt"));
    }

    #[test]
    fn empty_report_sentence() {
        assert_eq!(describe_duplicates(&[], &[]), "No duplicates detected.");
    }
}
