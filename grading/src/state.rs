//! # Per-Student Grading State
//!
//! One [`StudentGradingState`] per roster student, held in a
//! [`GradingStateTable`] keyed by student id.
//!
//! ## Concurrency
//!
//! Several automated-grading calls can be in flight at once and their
//! completions arrive in any order. Every mutation therefore goes through
//! [`GradingStateTable::update`], which applies a synchronous closure to the
//! *current* record of a single student while holding the table lock. No
//! caller ever writes back a record it read before an `.await`, so one
//! student's completion cannot clobber another student's fields.
//!
//! ## Attempts
//!
//! Every staged submission receives a fresh attempt number from a table-wide
//! counter that is never reset, not even when the roster is replaced. A
//! grading response is only applied if the record still carries the attempt
//! it was dispatched for; responses for superseded submissions are dropped.

use chrono::{DateTime, Utc};
use clients::types::{GradingResult, Score, Student, SubmissionFile};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// Lifecycle of the automated grading of a student's current submission.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GradingPhase {
    NotStarted,
    InProgress,
    Completed,
    Failed,
}

/// Automated-grading state together with the data each phase carries.
#[derive(Debug, Clone, PartialEq)]
pub enum AutoGrade {
    NotStarted,
    InProgress,
    Completed(GradingResult),
    Failed(String),
}

impl AutoGrade {
    pub fn phase(&self) -> GradingPhase {
        match self {
            AutoGrade::NotStarted => GradingPhase::NotStarted,
            AutoGrade::InProgress => GradingPhase::InProgress,
            AutoGrade::Completed(_) => GradingPhase::Completed,
            AutoGrade::Failed(_) => GradingPhase::Failed,
        }
    }
}

/// Whether the score produced by automated grading reached the score store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutoSaveStatus {
    NotAttempted,
    Saved,
    Failed(String),
}

/// A successful automated attempt, kept for the regrade history.
#[derive(Debug, Clone, PartialEq)]
pub struct AttemptRecord {
    pub attempt: u64,
    pub file_name: String,
    pub score: f64,
    pub graded_at: DateTime<Utc>,
    pub result: GradingResult,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StudentGradingState {
    pub student_id: String,
    pub submission: Option<SubmissionFile>,
    pub auto_grade: AutoGrade,
    /// Attempt number of the current submission; 0 until a file is staged.
    pub attempt: u64,
    /// The persisted score. Overwritten by every successful automated grading.
    pub manual_score: Option<f64>,
    pub manual_feedback: String,
    /// Successful automated attempts, oldest first. Never pruned.
    pub history: Vec<AttemptRecord>,
    pub auto_save: AutoSaveStatus,
}

impl StudentGradingState {
    pub fn new(student_id: impl Into<String>) -> Self {
        Self {
            student_id: student_id.into(),
            submission: None,
            auto_grade: AutoGrade::NotStarted,
            attempt: 0,
            manual_score: None,
            manual_feedback: String::new(),
            history: Vec::new(),
            auto_save: AutoSaveStatus::NotAttempted,
        }
    }

    pub fn phase(&self) -> GradingPhase {
        self.auto_grade.phase()
    }

    pub fn result(&self) -> Option<&GradingResult> {
        match &self.auto_grade {
            AutoGrade::Completed(result) => Some(result),
            _ => None,
        }
    }

    pub fn error(&self) -> Option<&str> {
        match &self.auto_grade {
            AutoGrade::Failed(message) => Some(message),
            _ => None,
        }
    }

    /// Attaches a new submission, voiding the previous automated outcome.
    ///
    /// With `dispatch` the record moves straight to in-progress; otherwise it
    /// waits in not-started with the file attached.
    pub(crate) fn stage_submission(&mut self, file: SubmissionFile, attempt: u64, dispatch: bool) {
        self.submission = Some(file);
        self.attempt = attempt;
        self.auto_save = AutoSaveStatus::NotAttempted;
        self.auto_grade = if dispatch {
            AutoGrade::InProgress
        } else {
            AutoGrade::NotStarted
        };
    }

    /// Applies a successful response for `attempt`. Returns false if stale.
    ///
    /// The manual score takes the automated total only with `overwrite_score`;
    /// otherwise the manual fields belong to another assignment and are kept.
    pub(crate) fn complete(
        &mut self,
        attempt: u64,
        file_name: &str,
        result: GradingResult,
        graded_at: DateTime<Utc>,
        overwrite_score: bool,
    ) -> bool {
        if !self.accepts(attempt) {
            return false;
        }
        if overwrite_score {
            self.manual_score = Some(result.total_score);
        }
        self.history.push(AttemptRecord {
            attempt,
            file_name: file_name.to_string(),
            score: result.total_score,
            graded_at,
            result: result.clone(),
        });
        self.auto_grade = AutoGrade::Completed(result);
        true
    }

    /// Applies a failed response for `attempt`. Returns false if stale.
    pub(crate) fn fail(&mut self, attempt: u64, message: String) -> bool {
        if !self.accepts(attempt) {
            return false;
        }
        self.auto_grade = AutoGrade::Failed(message);
        true
    }

    fn accepts(&self, attempt: u64) -> bool {
        self.attempt == attempt && self.auto_grade == AutoGrade::InProgress
    }
}

#[derive(Default)]
struct TableInner {
    order: Vec<String>,
    records: HashMap<String, StudentGradingState>,
    attempts: u64,
}

/// Shared, cloneable handle to the grading state of one session.
#[derive(Clone, Default)]
pub struct GradingStateTable {
    inner: Arc<RwLock<TableInner>>,
}

impl GradingStateTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces every record with a fresh one per roster student.
    ///
    /// Duplicate ids keep their first position. The attempt counter survives,
    /// so responses dispatched against the old table are discarded.
    pub async fn reset(&self, roster: &[Student]) {
        let mut table = self.inner.write().await;
        table.order.clear();
        table.records.clear();
        for student in roster {
            if table.records.contains_key(&student.id) {
                continue;
            }
            table.order.push(student.id.clone());
            table
                .records
                .insert(student.id.clone(), StudentGradingState::new(&student.id));
        }
    }

    pub async fn clear(&self) {
        let mut table = self.inner.write().await;
        table.order.clear();
        table.records.clear();
    }

    /// Copies of every record, in roster order.
    pub async fn snapshot(&self) -> Vec<StudentGradingState> {
        let table = self.inner.read().await;
        table
            .order
            .iter()
            .filter_map(|id| table.records.get(id).cloned())
            .collect()
    }

    pub async fn get(&self, student_id: &str) -> Option<StudentGradingState> {
        self.inner.read().await.records.get(student_id).cloned()
    }

    pub async fn contains(&self, student_id: &str) -> bool {
        self.inner.read().await.records.contains_key(student_id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.order.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Runs `f` on the current record of `student_id` under the table lock.
    ///
    /// Returns `None` when the student is not on the roster.
    pub async fn update<R>(
        &self,
        student_id: &str,
        f: impl FnOnce(&mut StudentGradingState) -> R,
    ) -> Option<R> {
        let mut table = self.inner.write().await;
        table.records.get_mut(student_id).map(f)
    }

    /// Stages `file` for `student_id` and returns the attempt number it got.
    pub async fn stage_submission(
        &self,
        student_id: &str,
        file: SubmissionFile,
        dispatch: bool,
    ) -> Option<u64> {
        let mut table = self.inner.write().await;
        if !table.records.contains_key(student_id) {
            return None;
        }
        table.attempts += 1;
        let attempt = table.attempts;
        let record = table.records.get_mut(student_id)?;
        record.stage_submission(file, attempt, dispatch);
        Some(attempt)
    }

    /// Moves every record whose submission is staged but not yet graded to
    /// in-progress under a fresh attempt, in one lock acquisition.
    ///
    /// Returns `(student_id, file, attempt)` per dispatched record, in roster
    /// order.
    pub async fn dispatch_pending(&self) -> Vec<(String, SubmissionFile, u64)> {
        let mut guard = self.inner.write().await;
        let table = &mut *guard;
        let mut dispatched = Vec::new();
        for id in &table.order {
            let Some(record) = table.records.get_mut(id) else {
                continue;
            };
            if record.auto_grade != AutoGrade::NotStarted {
                continue;
            }
            let Some(file) = record.submission.clone() else {
                continue;
            };
            table.attempts += 1;
            record.stage_submission(file.clone(), table.attempts, true);
            dispatched.push((id.clone(), file, table.attempts));
        }
        dispatched
    }

    /// Loads stored scores into the manual fields.
    ///
    /// Students without a stored score get empty manual fields. Submissions,
    /// automated phases and history are left as they are.
    pub async fn apply_stored_scores(&self, scores: &[Score]) {
        let by_student: HashMap<&str, &Score> =
            scores.iter().map(|s| (s.student_id.as_str(), s)).collect();

        let mut table = self.inner.write().await;
        for record in table.records.values_mut() {
            match by_student.get(record.student_id.as_str()) {
                Some(score) => {
                    record.manual_score = score.score_value;
                    record.manual_feedback = score.feedback.clone().unwrap_or_default();
                }
                None => {
                    record.manual_score = None;
                    record.manual_feedback.clear();
                }
            }
        }
    }
}
