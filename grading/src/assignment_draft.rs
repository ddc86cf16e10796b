//! # Assignment Draft
//!
//! Working copy of an assignment being created or edited.
//!
//! The maximum score is a [`MaxScoreBinding`]: instructor-editable in manual mode,
//! derived from the chosen grading endpoint in auto mode. The draft remembers
//! the last endpoint chosen so switching manual → auto re-binds to it.

use crate::error::GradingError;
use clients::types::{
    Assignment, CreateAssignmentRequest, GradingEndpointInfo, GradingMode, UpdateAssignmentRequest,
};
use validator::Validate;

/// Max score offered for a fresh manual draft.
pub const DEFAULT_MAX_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq)]
pub enum MaxScoreBinding {
    Manual { max_score: f64 },
    /// `endpoint` is `None` until one is chosen; there is no max score then.
    Auto { endpoint: Option<GradingEndpointInfo> },
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssignmentDraft {
    pub name: String,
    pub description: Option<String>,
    binding: MaxScoreBinding,
    remembered_endpoint: Option<GradingEndpointInfo>,
}

impl Default for AssignmentDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            binding: MaxScoreBinding::Manual {
                max_score: DEFAULT_MAX_SCORE,
            },
            remembered_endpoint: None,
        }
    }
}

impl AssignmentDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Draft pre-filled from an existing assignment, for editing.
    ///
    /// An auto assignment whose endpoint is missing from `endpoints` keeps
    /// its stored max score under a placeholder endpoint entry.
    pub fn from_assignment(assignment: &Assignment, endpoints: &[GradingEndpointInfo]) -> Self {
        let binding = match assignment.grading_mode {
            GradingMode::Manual => MaxScoreBinding::Manual {
                max_score: assignment.max_score,
            },
            GradingMode::Auto => MaxScoreBinding::Auto {
                endpoint: assignment.grading_endpoint.as_deref().map(|key| {
                    endpoints
                        .iter()
                        .find(|e| e.endpoint == key)
                        .cloned()
                        .unwrap_or_else(|| GradingEndpointInfo {
                            endpoint: key.to_string(),
                            display_name: key.to_string(),
                            description: String::new(),
                            max_score: assignment.max_score,
                        })
                }),
            },
        };

        let remembered_endpoint = match &binding {
            MaxScoreBinding::Auto { endpoint } => endpoint.clone(),
            MaxScoreBinding::Manual { .. } => None,
        };

        Self {
            name: assignment.name.clone(),
            description: assignment.description.clone(),
            binding,
            remembered_endpoint,
        }
    }

    pub fn binding(&self) -> &MaxScoreBinding {
        &self.binding
    }

    pub fn mode(&self) -> GradingMode {
        match self.binding {
            MaxScoreBinding::Manual { .. } => GradingMode::Manual,
            MaxScoreBinding::Auto { .. } => GradingMode::Auto,
        }
    }

    /// The max score the assignment would be created with, if known yet.
    pub fn max_score(&self) -> Option<f64> {
        match &self.binding {
            MaxScoreBinding::Manual { max_score } => Some(*max_score),
            MaxScoreBinding::Auto { endpoint } => endpoint.as_ref().map(|e| e.max_score),
        }
    }

    pub fn is_max_score_locked(&self) -> bool {
        matches!(self.binding, MaxScoreBinding::Auto { .. })
    }

    pub fn endpoint(&self) -> Option<&GradingEndpointInfo> {
        match &self.binding {
            MaxScoreBinding::Auto { endpoint } => endpoint.as_ref(),
            MaxScoreBinding::Manual { .. } => None,
        }
    }

    pub fn switch_to_auto(&mut self) {
        if let MaxScoreBinding::Manual { .. } = self.binding {
            self.binding = MaxScoreBinding::Auto {
                endpoint: self.remembered_endpoint.clone(),
            };
        }
    }

    /// Unlocks the max score, starting from whatever value was shown.
    pub fn switch_to_manual(&mut self) {
        if let MaxScoreBinding::Auto { endpoint } = &self.binding {
            let max_score = endpoint
                .as_ref()
                .map(|e| e.max_score)
                .unwrap_or(DEFAULT_MAX_SCORE);
            self.binding = MaxScoreBinding::Manual { max_score };
        }
    }

    /// Records `endpoint`; in auto mode the max score follows it immediately.
    pub fn choose_endpoint(&mut self, endpoint: GradingEndpointInfo) {
        if let MaxScoreBinding::Auto { endpoint: bound } = &mut self.binding {
            *bound = Some(endpoint.clone());
        }
        self.remembered_endpoint = Some(endpoint);
    }

    /// [`AssignmentDraft::choose_endpoint`] by key, looked up in `catalogue`.
    pub fn choose_endpoint_key(
        &mut self,
        key: &str,
        catalogue: &[GradingEndpointInfo],
    ) -> Result<(), GradingError> {
        let endpoint = catalogue
            .iter()
            .find(|e| e.endpoint == key)
            .cloned()
            .ok_or_else(|| GradingError::UnknownEndpoint(key.to_string()))?;
        self.choose_endpoint(endpoint);
        Ok(())
    }

    pub fn set_max_score(&mut self, value: f64) -> Result<(), GradingError> {
        match &mut self.binding {
            MaxScoreBinding::Manual { max_score } => {
                *max_score = value;
                Ok(())
            }
            MaxScoreBinding::Auto { endpoint } => Err(GradingError::MaxScoreLocked(
                endpoint
                    .as_ref()
                    .map(|e| e.endpoint.clone())
                    .unwrap_or_default(),
            )),
        }
    }

    /// Checks the draft and produces the creation request for `class_id`.
    pub fn to_create_request(&self, class_id: &str) -> Result<CreateAssignmentRequest, GradingError> {
        let (max_score, grading_endpoint) = self.checked_binding()?;

        let request = CreateAssignmentRequest {
            name: self.name.trim().to_string(),
            description: self.trimmed_description(),
            class_id: class_id.to_string(),
            max_score,
            grading_mode: self.mode(),
            grading_endpoint,
        };
        request
            .validate()
            .map_err(|e| GradingError::InvalidAssignment(common::format_validation_errors(&e)))?;
        Ok(request)
    }

    /// Checks the draft and produces a full update request.
    ///
    /// Switching an assignment to manual mode sends no endpoint; the API
    /// ignores the endpoint of manual assignments.
    pub fn to_update_request(&self) -> Result<UpdateAssignmentRequest, GradingError> {
        let (max_score, grading_endpoint) = self.checked_binding()?;

        let request = UpdateAssignmentRequest {
            name: Some(self.name.trim().to_string()),
            description: self.trimmed_description(),
            max_score: Some(max_score),
            is_active: None,
            grading_mode: Some(self.mode()),
            grading_endpoint,
        };
        request
            .validate()
            .map_err(|e| GradingError::InvalidAssignment(common::format_validation_errors(&e)))?;
        Ok(request)
    }

    fn checked_binding(&self) -> Result<(f64, Option<String>), GradingError> {
        if self.name.trim().is_empty() {
            return Err(GradingError::EmptyName);
        }
        match &self.binding {
            MaxScoreBinding::Manual { max_score } => Ok((*max_score, None)),
            MaxScoreBinding::Auto { endpoint: None } => Err(GradingError::MissingEndpoint),
            MaxScoreBinding::Auto {
                endpoint: Some(endpoint),
            } => Ok((endpoint.max_score, Some(endpoint.endpoint.clone()))),
        }
    }

    fn trimmed_description(&self) -> Option<String> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string)
    }
}
