//! File intake checks applied before any file reaches the state table.

use crate::error::GradingError;
use clients::types::SubmissionFile;

/// Spreadsheet formats the grading service understands.
pub const ACCEPTED_EXTENSIONS: [&str; 3] = [".xls", ".xlsx", ".xlsm"];

pub fn is_spreadsheet(file_name: &str) -> bool {
    let lower = file_name.to_ascii_lowercase();
    ACCEPTED_EXTENSIONS.iter().any(|ext| lower.ends_with(ext))
}

pub fn validate_spreadsheet(file: &SubmissionFile) -> Result<(), GradingError> {
    if is_spreadsheet(&file.name) {
        Ok(())
    } else {
        Err(GradingError::InvalidFileType {
            file_name: file.name.clone(),
        })
    }
}
