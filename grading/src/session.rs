//! # Grading Session
//!
//! [`GradingSession`] is the batch grading orchestrator for one class roster
//! and (once chosen) one assignment. It owns the [`GradingStateTable`] and
//! drives every transition of it:
//!
//! - roster initialisation and assignment selection (stored scores merged in),
//! - answer-file intake (never triggers grading by itself),
//! - per-student submission intake, which dispatches automated grading when
//!   the answer file is present,
//! - manual score/feedback overrides,
//! - single-score auto-save after automated grading and the bulk save.
//!
//! Sessions are cheap to clone; clones share state. Each automated grading
//! call captures the student file, the answer file and the endpoint by value
//! when it is dispatched, so later changes never alter a call in flight.

use crate::assignment_draft::AssignmentDraft;
use crate::error::GradingError;
use crate::intake::validate_spreadsheet;
use crate::state::{AutoSaveStatus, GradingPhase, GradingStateTable, StudentGradingState};
use chrono::Utc;
use clients::types::{
    Assignment, BulkScoreRequest, GradingEndpointInfo, GradingMode, GradingResult, ScoreUpsert,
    Student, StudentScoreItem, SubmissionFile,
};
use clients::{
    ApiClient, AssignmentDirectory, GradingClient, HttpAssignmentDirectory, HttpGradingClient,
    HttpScoreStore, ScoreStore,
};
use futures::future::join_all;
use std::sync::Arc;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// The three remote collaborators of a session.
#[derive(Clone)]
pub struct SessionServices {
    pub directory: Arc<dyn AssignmentDirectory>,
    pub grader: Arc<dyn GradingClient>,
    pub scores: Arc<dyn ScoreStore>,
}

impl SessionServices {
    /// HTTP implementations sharing one API client.
    pub fn http(api: ApiClient) -> Self {
        Self {
            directory: Arc::new(HttpAssignmentDirectory::new(api.clone())),
            grader: Arc::new(HttpGradingClient::from_config(api.clone())),
            scores: Arc::new(HttpScoreStore::new(api)),
        }
    }
}

/// What became of one submitted file.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmissionOutcome {
    /// Attached to the student; grading waits for the answer file.
    Staged,
    Graded(GradingResult),
    Failed(String),
    /// A newer submission for the same student replaced this one before the
    /// response arrived; the response was dropped.
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BulkSaveReport {
    pub saved: usize,
    /// Students whose automated grading was still running at save time. Their
    /// saved score may be overwritten when grading completes.
    pub still_grading: Vec<String>,
}

#[derive(Default)]
struct SessionContext {
    roster: Vec<Student>,
    answer_file: Option<SubmissionFile>,
    selected: Option<Assignment>,
    /// Bumped on every selection change so late score loads can be dropped.
    selection_generation: u64,
    assignments: Vec<Assignment>,
    endpoints: Vec<GradingEndpointInfo>,
}

impl SessionContext {
    fn grading_endpoint(&self, default_endpoint: &str) -> String {
        self.selected
            .as_ref()
            .and_then(|a| a.bound_endpoint())
            .unwrap_or(default_endpoint)
            .to_string()
    }

    /// Fixes the inputs of one grading call from the current context.
    fn grading_call(
        &self,
        default_endpoint: &str,
        student_id: String,
        attempt: u64,
        student_file: SubmissionFile,
        answer_file: SubmissionFile,
    ) -> GradingCall {
        GradingCall {
            student_id,
            attempt,
            student_file,
            answer_file,
            endpoint: self.grading_endpoint(default_endpoint),
            assignment_id: self.selected.as_ref().map(|a| a.id.clone()),
            selection_generation: self.selection_generation,
        }
    }

    fn effective_max_score(&self) -> Option<f64> {
        self.selected
            .as_ref()
            .map(|a| a.effective_max_score(&self.endpoints))
    }
}

/// One automated grading call, with every input captured at dispatch.
struct GradingCall {
    student_id: String,
    attempt: u64,
    student_file: SubmissionFile,
    answer_file: SubmissionFile,
    endpoint: String,
    /// Where the score is auto-saved; the selection when the call was sent.
    assignment_id: Option<String>,
    selection_generation: u64,
}

struct SessionInner {
    class_id: String,
    default_endpoint: String,
    table: GradingStateTable,
    context: RwLock<SessionContext>,
    services: SessionServices,
}

#[derive(Clone)]
pub struct GradingSession {
    inner: Arc<SessionInner>,
}

impl GradingSession {
    /// New, empty session for `class_id`, grading unbound assignments with
    /// `DEFAULT_GRADING_ENDPOINT`.
    pub fn new(class_id: impl Into<String>, services: SessionServices) -> Self {
        Self::with_default_endpoint(class_id, services, common::config::default_grading_endpoint())
    }

    pub fn with_default_endpoint(
        class_id: impl Into<String>,
        services: SessionServices,
        default_endpoint: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(SessionInner {
                class_id: class_id.into(),
                default_endpoint: default_endpoint.into(),
                table: GradingStateTable::new(),
                context: RwLock::new(SessionContext::default()),
                services,
            }),
        }
    }

    pub fn class_id(&self) -> &str {
        &self.inner.class_id
    }

    pub fn table(&self) -> &GradingStateTable {
        &self.inner.table
    }

    // ---------------------------------------------------------------------
    // Session lifecycle
    // ---------------------------------------------------------------------

    /// Starts a fresh session: clears the answer file and selection, builds
    /// the table for `roster` and loads the class's assignments and the
    /// endpoint catalogue.
    pub async fn open(&self, roster: Vec<Student>) {
        {
            let mut ctx = self.inner.context.write().await;
            ctx.answer_file = None;
            ctx.selected = None;
            ctx.selection_generation += 1;
        }
        self.initialize_roster(roster).await;
        tokio::join!(self.load_assignments(), self.load_grading_endpoints());
        let students = self.inner.table.len().await;
        info!(class_id = %self.inner.class_id, students, "grading session opened");
    }

    /// Replaces the table with one not-started record per roster student.
    ///
    /// If an assignment is selected its stored scores are merged in.
    pub async fn initialize_roster(&self, roster: Vec<Student>) {
        self.inner.table.reset(&roster).await;
        let reload = {
            let mut ctx = self.inner.context.write().await;
            ctx.roster = roster;
            ctx.selected
                .as_ref()
                .map(|a| (a.id.clone(), ctx.selection_generation))
        };
        if let Some((assignment_id, generation)) = reload {
            self.load_existing_scores(&assignment_id, generation).await;
        }
    }

    /// Drops all per-student state, the answer file and the selection.
    pub async fn close(&self) {
        self.inner.table.clear().await;
        let mut ctx = self.inner.context.write().await;
        let generation = ctx.selection_generation + 1;
        *ctx = SessionContext {
            selection_generation: generation,
            ..SessionContext::default()
        };
        info!(class_id = %self.inner.class_id, "grading session closed");
    }

    pub async fn roster(&self) -> Vec<Student> {
        self.inner.context.read().await.roster.clone()
    }

    pub async fn snapshot(&self) -> Vec<StudentGradingState> {
        self.inner.table.snapshot().await
    }

    pub async fn student(&self, student_id: &str) -> Option<StudentGradingState> {
        self.inner.table.get(student_id).await
    }

    // ---------------------------------------------------------------------
    // Assignment directory
    // ---------------------------------------------------------------------

    /// Refreshes the class's assignments. Failures leave an empty list.
    pub async fn load_assignments(&self) -> Vec<Assignment> {
        let assignments = match self
            .inner
            .services
            .directory
            .list_by_class(&self.inner.class_id)
            .await
        {
            Ok(list) => list,
            Err(err) => {
                error!(class_id = %self.inner.class_id, error = %err, "failed to load assignments");
                Vec::new()
            }
        };
        self.inner.context.write().await.assignments = assignments.clone();
        assignments
    }

    /// Refreshes the grading endpoint catalogue. Failures leave an empty list.
    pub async fn load_grading_endpoints(&self) -> Vec<GradingEndpointInfo> {
        let endpoints = match self.inner.services.directory.list_grading_endpoints().await {
            Ok(list) => list,
            Err(err) => {
                error!(error = %err, "failed to load grading endpoints");
                Vec::new()
            }
        };
        self.inner.context.write().await.endpoints = endpoints.clone();
        endpoints
    }

    pub async fn assignments(&self) -> Vec<Assignment> {
        self.inner.context.read().await.assignments.clone()
    }

    pub async fn grading_endpoints(&self) -> Vec<GradingEndpointInfo> {
        self.inner.context.read().await.endpoints.clone()
    }

    pub async fn selected_assignment(&self) -> Option<Assignment> {
        self.inner.context.read().await.selected.clone()
    }

    /// Max score of the selected assignment, endpoint-derived when auto.
    pub async fn effective_max_score(&self) -> Option<f64> {
        self.inner.context.read().await.effective_max_score()
    }

    /// Selects one of the class's assignments and loads its stored scores
    /// into the manual fields. Submissions and automated phases are kept.
    pub async fn select_assignment(&self, assignment_id: &str) -> Result<(), GradingError> {
        let generation = {
            let mut ctx = self.inner.context.write().await;
            let assignment = ctx
                .assignments
                .iter()
                .find(|a| a.id == assignment_id)
                .cloned()
                .ok_or_else(|| GradingError::UnknownAssignment(assignment_id.to_string()))?;
            ctx.selected = Some(assignment);
            ctx.selection_generation += 1;
            ctx.selection_generation
        };

        self.load_existing_scores(assignment_id, generation).await;
        Ok(())
    }

    async fn load_existing_scores(&self, assignment_id: &str, generation: u64) {
        let scores = match self
            .inner
            .services
            .scores
            .list_by_assignment(assignment_id)
            .await
        {
            Ok(scores) => scores,
            Err(err) => {
                error!(assignment_id, error = %err, "failed to load existing scores");
                return;
            }
        };

        // Held across the table update so a concurrent reselection cannot
        // slip in between the check and the merge.
        let ctx = self.inner.context.read().await;
        if ctx.selection_generation != generation {
            debug!(assignment_id, "discarding scores for a superseded selection");
            return;
        }
        self.inner.table.apply_stored_scores(&scores).await;
        debug!(assignment_id, loaded = scores.len(), "merged stored scores");
    }

    /// A blank draft for a new assignment.
    pub fn new_assignment_draft(&self) -> AssignmentDraft {
        AssignmentDraft::default()
    }

    /// Validates `draft`, creates the assignment and lists it first.
    pub async fn create_assignment(&self, draft: &AssignmentDraft) -> Result<Assignment, GradingError> {
        let request = draft.to_create_request(&self.inner.class_id)?;
        let created = self
            .inner
            .services
            .directory
            .create(&request)
            .await
            .map_err(|err| {
                error!(class_id = %self.inner.class_id, error = %err, "failed to create assignment");
                GradingError::Directory(err)
            })?;

        self.inner
            .context
            .write()
            .await
            .assignments
            .insert(0, created.clone());
        info!(assignment_id = %created.id, mode = ?created.grading_mode, "assignment created");
        Ok(created)
    }

    /// Applies `draft` to an existing assignment of this class.
    pub async fn update_assignment(
        &self,
        assignment_id: &str,
        draft: &AssignmentDraft,
    ) -> Result<Assignment, GradingError> {
        if !self
            .inner
            .context
            .read()
            .await
            .assignments
            .iter()
            .any(|a| a.id == assignment_id)
        {
            return Err(GradingError::UnknownAssignment(assignment_id.to_string()));
        }

        let request = draft.to_update_request()?;
        let updated = self
            .inner
            .services
            .directory
            .update(assignment_id, &request)
            .await
            .map_err(|err| {
                error!(assignment_id, error = %err, "failed to update assignment");
                GradingError::Directory(err)
            })?;

        let mut ctx = self.inner.context.write().await;
        if let Some(slot) = ctx.assignments.iter_mut().find(|a| a.id == assignment_id) {
            *slot = updated.clone();
        }
        if ctx.selected.as_ref().is_some_and(|a| a.id == assignment_id) {
            ctx.selected = Some(updated.clone());
        }
        Ok(updated)
    }

    // ---------------------------------------------------------------------
    // File intake and automated grading
    // ---------------------------------------------------------------------

    /// Sets the shared answer file.
    ///
    /// Completed results stay valid and waiting submissions are not graded;
    /// use [`GradingSession::grade_pending`] for that.
    pub async fn set_answer_file(&self, file: SubmissionFile) -> Result<(), GradingError> {
        validate_spreadsheet(&file)?;
        info!(file_name = %file.name, "answer file set");
        self.inner.context.write().await.answer_file = Some(file);
        Ok(())
    }

    pub async fn clear_answer_file(&self) {
        self.inner.context.write().await.answer_file = None;
    }

    pub async fn answer_file(&self) -> Option<SubmissionFile> {
        self.inner.context.read().await.answer_file.clone()
    }

    /// Accepts `file` as `student_id`'s submission.
    ///
    /// The previous automated result and error of that student are voided.
    /// Without an answer file the submission is only staged; otherwise it is
    /// graded right away and this resolves once the response is applied.
    pub async fn submit_student_file(
        &self,
        student_id: &str,
        file: SubmissionFile,
    ) -> Result<SubmissionOutcome, GradingError> {
        validate_spreadsheet(&file)?;

        let call = {
            let ctx = self.inner.context.read().await;
            let answer_file = ctx.answer_file.clone();
            let attempt = self
                .inner
                .table
                .stage_submission(student_id, file.clone(), answer_file.is_some())
                .await
                .ok_or_else(|| GradingError::UnknownStudent(student_id.to_string()))?;
            let call = answer_file.map(|answer_file| {
                ctx.grading_call(
                    &self.inner.default_endpoint,
                    student_id.to_string(),
                    attempt,
                    file.clone(),
                    answer_file,
                )
            });
            call
        };

        let Some(call) = call else {
            info!(student_id, file_name = %file.name, "submission staged, waiting for answer file");
            return Ok(SubmissionOutcome::Staged);
        };

        Ok(self.run_auto_grade(call).await)
    }

    /// [`GradingSession::submit_student_file`] on a background task.
    pub fn spawn_submission(
        &self,
        student_id: impl Into<String>,
        file: SubmissionFile,
    ) -> JoinHandle<Result<SubmissionOutcome, GradingError>> {
        let session = self.clone();
        let student_id = student_id.into();
        tokio::spawn(async move { session.submit_student_file(&student_id, file).await })
    }

    /// Grades every student whose submission is staged but not yet graded,
    /// concurrently. Returns each student's outcome in roster order.
    ///
    /// The staged files are claimed in one table update, so a submission
    /// arriving meanwhile supersedes the claimed one rather than the reverse.
    pub async fn grade_pending(&self) -> Result<Vec<(String, SubmissionOutcome)>, GradingError> {
        let calls: Vec<GradingCall> = {
            let ctx = self.inner.context.read().await;
            let answer_file = ctx
                .answer_file
                .clone()
                .ok_or(GradingError::MissingAnswerFile)?;
            let claimed = self.inner.table.dispatch_pending().await;
            let calls = claimed
                .into_iter()
                .map(|(student_id, student_file, attempt)| {
                    ctx.grading_call(
                        &self.inner.default_endpoint,
                        student_id,
                        attempt,
                        student_file,
                        answer_file.clone(),
                    )
                })
                .collect();
            calls
        };

        info!(count = calls.len(), "grading staged submissions");

        let runs = calls.into_iter().map(|call| async move {
            let student_id = call.student_id.clone();
            (student_id, self.run_auto_grade(call).await)
        });

        Ok(join_all(runs).await)
    }

    async fn run_auto_grade(&self, call: GradingCall) -> SubmissionOutcome {
        let student_id = call.student_id.as_str();
        let attempt = call.attempt;
        info!(student_id, attempt, endpoint = %call.endpoint, "dispatching automated grading");

        let response = self
            .inner
            .services
            .grader
            .grade(&call.endpoint, &call.student_file, &call.answer_file)
            .await;

        match response {
            Ok(result) => {
                let total = result.total_score;
                let applied = {
                    let ctx = self.inner.context.read().await;
                    let same_selection = ctx.selection_generation == call.selection_generation;
                    if !same_selection {
                        debug!(student_id, attempt, "selection changed while grading; keeping manual fields");
                    }
                    self.inner
                        .table
                        .update(student_id, |record| {
                            record.complete(
                                attempt,
                                &call.student_file.name,
                                result.clone(),
                                Utc::now(),
                                same_selection,
                            )
                        })
                        .await
                        .unwrap_or(false)
                };

                if !applied {
                    debug!(student_id, attempt, "dropping result of superseded submission");
                    return SubmissionOutcome::Superseded;
                }

                info!(student_id, attempt, total_score = total, "automated grading completed");
                if let Some(assignment_id) = call.assignment_id.as_deref() {
                    self.auto_save(student_id, attempt, assignment_id, total).await;
                }
                SubmissionOutcome::Graded(result)
            }
            Err(err) => {
                let message = err.to_string();
                let applied = self
                    .inner
                    .table
                    .update(student_id, |record| record.fail(attempt, message.clone()))
                    .await
                    .unwrap_or(false);

                if !applied {
                    debug!(student_id, attempt, "dropping failure of superseded submission");
                    return SubmissionOutcome::Superseded;
                }

                warn!(student_id, attempt, error = %message, "automated grading failed");
                SubmissionOutcome::Failed(message)
            }
        }
    }

    /// Persists an automated score for the assignment selected at dispatch.
    ///
    /// Failure is logged and flagged on the record; the in-memory result stays.
    async fn auto_save(&self, student_id: &str, attempt: u64, assignment_id: &str, score: f64) {
        let upsert = ScoreUpsert {
            student_id: student_id.to_string(),
            assignment_id: assignment_id.to_string(),
            class_id: self.inner.class_id.clone(),
            score_value: Some(score),
            feedback: None,
        };

        let status = match self.inner.services.scores.save_one(&upsert).await {
            Ok(_) => AutoSaveStatus::Saved,
            Err(err) => {
                warn!(student_id, assignment_id, error = %err, "auto-save of graded score failed");
                AutoSaveStatus::Failed(err.to_string())
            }
        };

        self.inner
            .table
            .update(student_id, |record| {
                if record.attempt == attempt {
                    record.auto_save = status;
                }
            })
            .await;
    }

    // ---------------------------------------------------------------------
    // Manual edits and saving
    // ---------------------------------------------------------------------

    /// Overrides a student's score. The automated phase and result are kept.
    ///
    /// Scores must lie in `0..=max`, where max is the selected assignment's
    /// effective max score (or `MAX_MANUAL_SCORE` with no selection).
    pub async fn set_manual_score(
        &self,
        student_id: &str,
        score: Option<f64>,
    ) -> Result<(), GradingError> {
        if let Some(value) = score {
            let max = self
                .effective_max_score()
                .await
                .unwrap_or_else(common::config::max_manual_score);
            if !value.is_finite() || value < 0.0 || value > max {
                return Err(GradingError::ScoreOutOfRange { score: value, max });
            }
        }

        self.inner
            .table
            .update(student_id, |record| record.manual_score = score)
            .await
            .ok_or_else(|| GradingError::UnknownStudent(student_id.to_string()))
    }

    pub async fn set_manual_feedback(
        &self,
        student_id: &str,
        feedback: impl Into<String>,
    ) -> Result<(), GradingError> {
        let feedback = feedback.into();
        self.inner
            .table
            .update(student_id, |record| record.manual_feedback = feedback)
            .await
            .ok_or_else(|| GradingError::UnknownStudent(student_id.to_string()))
    }

    /// Saves every student with a score in one bulk call for the selected
    /// assignment. Students without a score are skipped.
    ///
    /// Nothing in the session changes, whether the call succeeds or not.
    pub async fn save_all(&self) -> Result<BulkSaveReport, GradingError> {
        let assignment_id = self
            .selected_assignment()
            .await
            .map(|a| a.id)
            .ok_or(GradingError::NoAssignmentSelected)?;

        let snapshot = self.inner.table.snapshot().await;
        let still_grading: Vec<String> = snapshot
            .iter()
            .filter(|s| s.phase() == GradingPhase::InProgress)
            .map(|s| s.student_id.clone())
            .collect();

        let scores: Vec<StudentScoreItem> = snapshot
            .into_iter()
            .filter_map(|s| {
                s.manual_score.map(|value| StudentScoreItem {
                    student_id: s.student_id,
                    score_value: Some(value),
                    feedback: Some(s.manual_feedback),
                })
            })
            .collect();

        let request = BulkScoreRequest {
            assignment_id: assignment_id.clone(),
            class_id: self.inner.class_id.clone(),
            scores,
        };

        self.inner
            .services
            .scores
            .save_bulk(&request)
            .await
            .map_err(|err| {
                error!(assignment_id = %assignment_id, error = %err, "bulk save failed");
                GradingError::Persistence(err)
            })?;

        if !still_grading.is_empty() {
            warn!(count = still_grading.len(), "bulk save ran while automated grading was in progress");
        }
        info!(assignment_id = %assignment_id, saved = request.scores.len(), "scores saved");

        Ok(BulkSaveReport {
            saved: request.scores.len(),
            still_grading,
        })
    }

    /// Grading mode of the selected assignment, if any.
    pub async fn grading_mode(&self) -> Option<GradingMode> {
        self.selected_assignment().await.map(|a| a.grading_mode)
    }
}
