use serde::{Deserialize, Serialize};

/// A persisted score as returned by the score endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Score {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    pub student_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assignment_id: Option<String>,
    #[serde(default)]
    pub score_value: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<String>,
}

/// Body of `POST /score`: create or overwrite one student's score.
///
/// A `None` feedback is omitted so the stored feedback is left alone.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpsert {
    pub student_id: String,
    pub assignment_id: String,
    pub class_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score_value: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub feedback: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentScoreItem {
    pub student_id: String,
    pub score_value: Option<f64>,
    pub feedback: Option<String>,
}

/// Body of `POST /score/bulk`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulkScoreRequest {
    pub assignment_id: String,
    pub class_id: String,
    pub scores: Vec<StudentScoreItem>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct BulkSaveAck {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub scores: Vec<Score>,
}
