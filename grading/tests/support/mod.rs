//! Scripted in-memory collaborators for driving a `GradingSession` in tests.
#![allow(dead_code)]

use async_trait::async_trait;
use clients::types::{
    Assignment, BulkSaveAck, BulkScoreRequest, CreateAssignmentRequest, GradingEndpointInfo,
    GradingMode, GradingResult, Score, ScoreUpsert, Student, SubmissionFile, TaskResult,
    UpdateAssignmentRequest,
};
use clients::{AssignmentDirectory, ClientError, GradingClient, ScoreStore};
use grading::{GradingSession, SessionServices};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::oneshot;

pub const CLASS_ID: &str = "class-1";
pub const DEFAULT_ENDPOINT: &str = "project09";

pub fn server_error(message: &str) -> ClientError {
    ClientError::Status {
        status: 500,
        message: message.to_string(),
    }
}

pub fn roster() -> Vec<Student> {
    vec![
        Student::new("s1", "Nguyen Van", "An"),
        Student::new("s2", "Tran Thi", "Binh"),
        Student::new("s3", "Le", "Cuong"),
    ]
}

pub fn xlsx(name: &str) -> SubmissionFile {
    SubmissionFile::new(name, vec![0x50u8, 0x4b, 0x03, 0x04])
}

pub fn result(total: f64) -> GradingResult {
    GradingResult {
        project_id: "p09".into(),
        project_name: "Project 09".into(),
        total_score: total,
        max_score: 10.0,
        percentage: total * 10.0,
        task_results: vec![TaskResult {
            task_id: "T1".into(),
            name: "SUM".into(),
            score: total,
            max_score: 10.0,
            passed: total >= 5.0,
            details: vec![],
            errors: vec![],
        }],
        graded_at: None,
        status: "Completed".into(),
    }
}

pub fn endpoint(key: &str, max: f64) -> GradingEndpointInfo {
    GradingEndpointInfo {
        endpoint: key.into(),
        display_name: key.to_uppercase(),
        description: String::new(),
        max_score: max,
    }
}

pub fn assignment(id: &str, mode: GradingMode, endpoint: Option<&str>, max: f64) -> Assignment {
    Assignment {
        id: id.into(),
        name: format!("Assignment {id}"),
        description: None,
        class_id: CLASS_ID.into(),
        max_score: max,
        is_active: true,
        grading_mode: mode,
        grading_endpoint: endpoint.map(str::to_string),
        created_at: None,
    }
}

pub fn stored(student_id: &str, value: Option<f64>, feedback: Option<&str>) -> Score {
    Score {
        id: None,
        student_id: student_id.into(),
        assignment_id: None,
        score_value: value,
        feedback: feedback.map(str::to_string),
        graded_at: None,
    }
}

// -------------------------------------------------------------------------
// Grader
// -------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct GradeCall {
    pub endpoint: String,
    pub student_file: String,
    pub answer_file: String,
}

type Reply = Result<GradingResult, ClientError>;

/// Parks every call until the test resolves it by student file name, unless
/// an immediate reply was scripted for that file.
#[derive(Default)]
pub struct ScriptedGrader {
    calls: Mutex<Vec<GradeCall>>,
    parked: Mutex<HashMap<String, oneshot::Sender<Reply>>>,
    immediate: Mutex<HashMap<String, Reply>>,
}

impl ScriptedGrader {
    pub fn reply_now(&self, student_file: &str, reply: Reply) {
        self.immediate
            .lock()
            .unwrap()
            .insert(student_file.to_string(), reply);
    }

    pub fn calls(&self) -> Vec<GradeCall> {
        self.calls.lock().unwrap().clone()
    }

    /// Waits until at least `n` calls have been issued.
    pub async fn wait_for_calls(&self, n: usize) {
        tokio::time::timeout(Duration::from_secs(2), async {
            while self.calls.lock().unwrap().len() < n {
                tokio::time::sleep(Duration::from_millis(2)).await;
            }
        })
        .await
        .expect("grading calls were never issued");
    }

    pub fn resolve(&self, student_file: &str, reply: Reply) {
        let sender = self
            .parked
            .lock()
            .unwrap()
            .remove(student_file)
            .expect("no parked call for that file");
        sender.send(reply).ok();
    }
}

#[async_trait]
impl GradingClient for ScriptedGrader {
    async fn grade(
        &self,
        endpoint: &str,
        student_file: &SubmissionFile,
        answer_file: &SubmissionFile,
    ) -> Result<GradingResult, ClientError> {
        let immediate = self.immediate.lock().unwrap().remove(&student_file.name);
        let receiver = if immediate.is_none() {
            let (tx, rx) = oneshot::channel();
            self.parked
                .lock()
                .unwrap()
                .insert(student_file.name.clone(), tx);
            Some(rx)
        } else {
            None
        };

        self.calls.lock().unwrap().push(GradeCall {
            endpoint: endpoint.to_string(),
            student_file: student_file.name.clone(),
            answer_file: answer_file.name.clone(),
        });

        match (immediate, receiver) {
            (Some(reply), _) => reply,
            (None, Some(rx)) => rx
                .await
                .unwrap_or_else(|_| Err(server_error("call abandoned"))),
            (None, None) => unreachable!(),
        }
    }
}

// -------------------------------------------------------------------------
// Score store
// -------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeScoreStore {
    pub stored: Mutex<HashMap<String, Vec<Score>>>,
    pub saved_one: Mutex<Vec<ScoreUpsert>>,
    pub bulk_calls: Mutex<Vec<BulkScoreRequest>>,
    pub fail_list: AtomicBool,
    pub fail_save_one: AtomicBool,
    pub fail_bulk: AtomicBool,
}

impl FakeScoreStore {
    pub fn with_scores(&self, assignment_id: &str, scores: Vec<Score>) {
        self.stored
            .lock()
            .unwrap()
            .insert(assignment_id.to_string(), scores);
    }

    pub fn saved_one(&self) -> Vec<ScoreUpsert> {
        self.saved_one.lock().unwrap().clone()
    }

    pub fn bulk_calls(&self) -> Vec<BulkScoreRequest> {
        self.bulk_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ScoreStore for FakeScoreStore {
    async fn list_by_assignment(&self, assignment_id: &str) -> Result<Vec<Score>, ClientError> {
        if self.fail_list.load(Ordering::SeqCst) {
            return Err(server_error("score list unavailable"));
        }
        Ok(self
            .stored
            .lock()
            .unwrap()
            .get(assignment_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_one(&self, score: &ScoreUpsert) -> Result<Score, ClientError> {
        if self.fail_save_one.load(Ordering::SeqCst) {
            return Err(server_error("score store down"));
        }
        self.saved_one.lock().unwrap().push(score.clone());
        Ok(stored(&score.student_id, score.score_value, None))
    }

    async fn save_bulk(&self, request: &BulkScoreRequest) -> Result<BulkSaveAck, ClientError> {
        self.bulk_calls.lock().unwrap().push(request.clone());
        if self.fail_bulk.load(Ordering::SeqCst) {
            return Err(server_error("bulk save rejected"));
        }
        Ok(BulkSaveAck::default())
    }
}

// -------------------------------------------------------------------------
// Assignment directory
// -------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeDirectory {
    pub assignments: Mutex<Vec<Assignment>>,
    pub endpoints: Mutex<Vec<GradingEndpointInfo>>,
    pub created: Mutex<Vec<CreateAssignmentRequest>>,
    pub updated: Mutex<Vec<(String, UpdateAssignmentRequest)>>,
    pub fail_loads: AtomicBool,
    pub fail_create: AtomicBool,
}

#[async_trait]
impl AssignmentDirectory for FakeDirectory {
    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Assignment>, ClientError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(server_error("directory down"));
        }
        Ok(self
            .assignments
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.class_id == class_id)
            .cloned()
            .collect())
    }

    async fn create(&self, request: &CreateAssignmentRequest) -> Result<Assignment, ClientError> {
        self.created.lock().unwrap().push(request.clone());
        if self.fail_create.load(Ordering::SeqCst) {
            return Err(server_error("create rejected"));
        }
        let id = format!("new-{}", self.created.lock().unwrap().len());
        let created = Assignment {
            id,
            name: request.name.clone(),
            description: request.description.clone(),
            class_id: request.class_id.clone(),
            max_score: request.max_score,
            is_active: true,
            grading_mode: request.grading_mode,
            grading_endpoint: request.grading_endpoint.clone(),
            created_at: None,
        };
        self.assignments.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn update(
        &self,
        assignment_id: &str,
        request: &UpdateAssignmentRequest,
    ) -> Result<Assignment, ClientError> {
        self.updated
            .lock()
            .unwrap()
            .push((assignment_id.to_string(), request.clone()));
        let mut list = self.assignments.lock().unwrap();
        let current = list
            .iter_mut()
            .find(|a| a.id == assignment_id)
            .ok_or_else(|| ClientError::Status {
                status: 404,
                message: "not found".into(),
            })?;
        if let Some(name) = &request.name {
            current.name = name.clone();
        }
        if let Some(max) = request.max_score {
            current.max_score = max;
        }
        if let Some(mode) = request.grading_mode {
            current.grading_mode = mode;
        }
        current.grading_endpoint = request.grading_endpoint.clone();
        Ok(current.clone())
    }

    async fn list_grading_endpoints(&self) -> Result<Vec<GradingEndpointInfo>, ClientError> {
        if self.fail_loads.load(Ordering::SeqCst) {
            return Err(server_error("directory down"));
        }
        Ok(self.endpoints.lock().unwrap().clone())
    }
}

// -------------------------------------------------------------------------
// Harness
// -------------------------------------------------------------------------

pub struct Harness {
    pub session: GradingSession,
    pub grader: Arc<ScriptedGrader>,
    pub scores: Arc<FakeScoreStore>,
    pub directory: Arc<FakeDirectory>,
}

impl Harness {
    /// A directory with one auto assignment (`a-auto`, bound to project12)
    /// and one manual assignment (`a-manual`, max 20).
    pub fn new() -> Self {
        let directory = Arc::new(FakeDirectory::default());
        *directory.assignments.lock().unwrap() = vec![
            assignment("a-auto", GradingMode::Auto, Some("project12"), 25.0),
            assignment("a-manual", GradingMode::Manual, None, 20.0),
        ];
        *directory.endpoints.lock().unwrap() =
            vec![endpoint("project09", 10.0), endpoint("project12", 25.0)];

        let grader = Arc::new(ScriptedGrader::default());
        let scores = Arc::new(FakeScoreStore::default());

        let services = SessionServices {
            directory: directory.clone(),
            grader: grader.clone(),
            scores: scores.clone(),
        };
        let session = GradingSession::with_default_endpoint(CLASS_ID, services, DEFAULT_ENDPOINT);

        Self {
            session,
            grader,
            scores,
            directory,
        }
    }

    /// [`Harness::new`] with the session already opened on [`roster`].
    pub async fn opened() -> Self {
        let harness = Self::new();
        harness.session.open(roster()).await;
        harness
    }
}
