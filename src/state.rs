use std::collections::HashMap;

use crate::models::file_record::FileRecord;
use crate::models::grouping::GroupingResult;
use crate::models::operation::MoveOperation;
use crate::services::duplicate_service::DuplicateSet;

/// State for one analyze-and-apply workflow against a directory. The
/// services themselves are stateless; everything they return is owned
/// here, including the undo stack (one entry pushed per completed apply,
/// one popped per undo).
#[derive(Debug, Default)]
pub struct OrganizeSession {
    pub records: Vec<FileRecord>,
    pub lookup: HashMap<String, usize>,
    pub duplicates: Vec<DuplicateSet>,
    pub grouping: Option<GroupingResult>,
    undo_stack: Vec<Vec<MoveOperation>>,
}

impl OrganizeSession {
    pub fn push_undo(&mut self, operations: Vec<MoveOperation>) {
        if !operations.is_empty() {
            self.undo_stack.push(operations);
        }
    }

    pub fn pop_undo(&mut self) -> Option<Vec<MoveOperation>> {
        self.undo_stack.pop()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn op(n: usize) -> MoveOperation {
        MoveOperation {
            source: format!("/out/{n}"),
            target: format!("/in/{n}"),
        }
    }

    #[test]
    fn undo_stack_is_lifo() {
        let mut session = OrganizeSession::default();
        session.push_undo(vec![op(1)]);
        session.push_undo(vec![op(2)]);

        assert_eq!(session.undo_depth(), 2);
        assert_eq!(session.pop_undo().unwrap(), vec![op(2)]);
        assert_eq!(session.pop_undo().unwrap(), vec![op(1)]);
        assert!(session.pop_undo().is_none());
    }

    #[test]
    fn empty_operation_lists_are_not_pushed() {
        let mut session = OrganizeSession::default();
        session.push_undo(Vec::new());
        assert_eq!(session.undo_depth(), 0);
    }
}
