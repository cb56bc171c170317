pub mod duplicate_service;
pub mod export_service;
pub mod extract_service;
pub mod gemini_service;
pub mod grouping_service;
pub mod hash_service;
pub mod organize_service;
pub mod scan_service;
pub mod undo_service;
