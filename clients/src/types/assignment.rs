use serde::{Deserialize, Serialize};
use validator::Validate;

/// How an assignment's score is produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GradingMode {
    /// Scored by a remote grading endpoint whose maximum score is authoritative.
    Auto,
    /// Scored by the instructor against a instructor-chosen maximum.
    Manual,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    pub id: String,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub class_id: String,
    pub max_score: f64,
    #[serde(default = "default_active")]
    pub is_active: bool,
    #[serde(rename = "gradingType")]
    pub grading_mode: GradingMode,
    #[serde(
        rename = "gradingApiEndpoint",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub grading_endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

fn default_active() -> bool {
    true
}

impl Assignment {
    /// The endpoint key this assignment is graded by, if it is auto-graded.
    pub fn bound_endpoint(&self) -> Option<&str> {
        match self.grading_mode {
            GradingMode::Auto => self.grading_endpoint.as_deref(),
            GradingMode::Manual => None,
        }
    }

    /// Maximum score to grade against.
    ///
    /// For auto-graded assignments the bound endpoint's declared maximum wins
    /// over the stored value; the stored value is the fallback when the
    /// endpoint is not in `endpoints`.
    pub fn effective_max_score(&self, endpoints: &[GradingEndpointInfo]) -> f64 {
        self.bound_endpoint()
            .and_then(|key| endpoints.iter().find(|e| e.endpoint == key))
            .map(|e| e.max_score)
            .unwrap_or(self.max_score)
    }
}

/// A remote grading capability and its fixed maximum score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingEndpointInfo {
    pub endpoint: String,
    pub display_name: String,
    #[serde(default)]
    pub description: String,
    pub max_score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateAssignmentRequest {
    #[validate(length(min = 1, message = "Assignment name is required"))]
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[validate(length(min = 1, message = "Class is required"))]
    pub class_id: String,
    #[validate(range(
        exclusive_min = 0.0,
        max = common::config::max_manual_score(),
        message = "Max score must be greater than 0 and within the allowed range"
    ))]
    pub max_score: f64,
    #[serde(rename = "gradingType")]
    pub grading_mode: GradingMode,
    #[serde(rename = "gradingApiEndpoint", skip_serializing_if = "Option::is_none")]
    pub grading_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateAssignmentRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, message = "Assignment name is required"))]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(range(
        exclusive_min = 0.0,
        max = common::config::max_manual_score(),
        message = "Max score must be greater than 0 and within the allowed range"
    ))]
    pub max_score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(rename = "gradingType", skip_serializing_if = "Option::is_none")]
    pub grading_mode: Option<GradingMode>,
    #[serde(rename = "gradingApiEndpoint", skip_serializing_if = "Option::is_none")]
    pub grading_endpoint: Option<String>,
}
