//! # Grading
//!
//! Batch grading orchestration for one assignment and one class roster.
//!
//! - [`state`]: the per-student grading state table.
//! - [`session`]: [`GradingSession`], which drives every state transition.
//! - [`assignment_draft`]: assignment create/edit input with the max score bound
//!   to the grading mode.
//! - [`intake`]: spreadsheet file checks.

pub mod assignment_draft;
pub mod error;
pub mod intake;
pub mod session;
pub mod state;

pub use assignment_draft::{AssignmentDraft, MaxScoreBinding};
pub use error::GradingError;
pub use session::{BulkSaveReport, GradingSession, SessionServices, SubmissionOutcome};
pub use state::{AutoGrade, AutoSaveStatus, GradingPhase, GradingStateTable, StudentGradingState};
