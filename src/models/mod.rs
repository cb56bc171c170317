pub mod file_record;
pub mod grouping;
pub mod operation;
