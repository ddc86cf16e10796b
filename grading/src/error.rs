//! Grading Error Types
//!
//! [`GradingError`] follows the failure taxonomy of a grading session:
//!
//! - validation errors are rejected before any state changes and are fixed by
//!   re-entering input;
//! - `Persistence` is a failed bulk save, surfaced so the instructor can retry;
//! - `Directory` is a failed assignment create/update call.
//!
//! Per-student grading failures never become a `GradingError`; they are kept on
//! that student's record. Auto-save and load failures are logged only.

use clients::ClientError;

#[derive(Debug, thiserror::Error)]
pub enum GradingError {
    #[error("File '{file_name}' must be a .xls, .xlsx or .xlsm spreadsheet")]
    InvalidFileType { file_name: String },

    #[error("Assignment name is required")]
    EmptyName,

    #[error("Choose a grading endpoint for an auto-graded assignment")]
    MissingEndpoint,

    #[error("Unknown grading endpoint '{0}'")]
    UnknownEndpoint(String),

    #[error("{0}")]
    InvalidAssignment(String),

    #[error("Max score is fixed by grading endpoint '{0}'")]
    MaxScoreLocked(String),

    #[error("Student '{0}' is not on this roster")]
    UnknownStudent(String),

    #[error("Assignment '{0}' does not belong to this class")]
    UnknownAssignment(String),

    #[error("Upload the answer file first")]
    MissingAnswerFile,

    #[error("Select an assignment first")]
    NoAssignmentSelected,

    #[error("Score {score} is outside 0..={max}")]
    ScoreOutOfRange { score: f64, max: f64 },

    #[error("Could not save scores: {0}")]
    Persistence(#[source] ClientError),

    #[error("Assignment directory request failed: {0}")]
    Directory(#[source] ClientError),
}

impl GradingError {
    /// True for input problems that were rejected without touching any state.
    pub fn is_validation(&self) -> bool {
        !matches!(
            self,
            GradingError::Persistence(_) | GradingError::Directory(_)
        )
    }
}
