use serde::{Deserialize, Serialize};

/// Outcome of one checked task inside a graded spreadsheet.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskResult {
    #[serde(default)]
    pub task_id: String,
    #[serde(rename = "taskName")]
    pub name: String,
    pub score: f64,
    pub max_score: f64,
    #[serde(rename = "isPassed")]
    pub passed: bool,
    /// What the grader found correct.
    #[serde(default)]
    pub details: Vec<String>,
    /// What the grader found wrong or missing.
    #[serde(default)]
    pub errors: Vec<String>,
}

/// Structured score breakdown returned by the remote grading service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GradingResult {
    #[serde(default)]
    pub project_id: String,
    #[serde(default)]
    pub project_name: String,
    pub total_score: f64,
    pub max_score: f64,
    #[serde(default)]
    pub percentage: f64,
    #[serde(default)]
    pub task_results: Vec<TaskResult>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub graded_at: Option<String>,
    #[serde(default)]
    pub status: String,
}

impl GradingResult {
    pub fn passed_tasks(&self) -> usize {
        self.task_results.iter().filter(|t| t.passed).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_service_payload() {
        let json = r#"{
            "projectId": "p09", "projectName": "Project 09",
            "totalScore": 7.5, "maxScore": 10, "percentage": 75,
            "taskResults": [
                {"taskId": "T1", "taskName": "SUM", "score": 5, "maxScore": 5,
                 "isPassed": true, "details": ["ok"], "errors": []},
                {"taskId": "T2", "taskName": "VLOOKUP", "score": 2.5, "maxScore": 5,
                 "isPassed": false, "details": [], "errors": ["wrong range"]}
            ],
            "gradedAt": "2025-03-01T10:00:00Z", "status": "Completed"
        }"#;
        let r: GradingResult = serde_json::from_str(json).unwrap();
        assert_eq!(r.total_score, 7.5);
        assert_eq!(r.task_results[1].errors, vec!["wrong range".to_string()]);
        assert_eq!(r.passed_tasks(), 1);
    }
}
