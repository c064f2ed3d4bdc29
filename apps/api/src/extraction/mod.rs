//! Document text extraction and heuristic field recovery.

pub mod document;
pub mod fields;
pub mod vocabulary;
