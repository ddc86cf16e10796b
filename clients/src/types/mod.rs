//! Wire types shared with the REST API. Field names follow the API's camelCase JSON.

pub mod assignment;
pub mod file;
pub mod grading;
pub mod score;
pub mod student;

pub use assignment::{
    Assignment, CreateAssignmentRequest, GradingEndpointInfo, GradingMode, UpdateAssignmentRequest,
};
pub use file::SubmissionFile;
pub use grading::{GradingResult, TaskResult};
pub use score::{BulkSaveAck, BulkScoreRequest, Score, ScoreUpsert, StudentScoreItem};
pub use student::Student;
