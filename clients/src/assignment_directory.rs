//! Assignment Directory adapter: assignment definitions for a class and the
//! catalogue of grading endpoints an assignment can be bound to.

use crate::api_client::ApiClient;
use crate::error::ClientError;
use crate::types::{Assignment, CreateAssignmentRequest, GradingEndpointInfo, UpdateAssignmentRequest};
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
pub trait AssignmentDirectory: Send + Sync {
    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Assignment>, ClientError>;

    async fn create(&self, request: &CreateAssignmentRequest) -> Result<Assignment, ClientError>;

    async fn update(
        &self,
        assignment_id: &str,
        request: &UpdateAssignmentRequest,
    ) -> Result<Assignment, ClientError>;

    async fn list_grading_endpoints(&self) -> Result<Vec<GradingEndpointInfo>, ClientError>;
}

#[derive(Clone)]
pub struct HttpAssignmentDirectory {
    api: ApiClient,
}

impl HttpAssignmentDirectory {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl AssignmentDirectory for HttpAssignmentDirectory {
    async fn list_by_class(&self, class_id: &str) -> Result<Vec<Assignment>, ClientError> {
        let req = self
            .api
            .request(Method::GET, &format!("assignment/class/{class_id}"));
        self.api.send_json(req).await
    }

    async fn create(&self, request: &CreateAssignmentRequest) -> Result<Assignment, ClientError> {
        let req = self.api.request(Method::POST, "assignment").json(request);
        self.api.send_json(req).await
    }

    async fn update(
        &self,
        assignment_id: &str,
        request: &UpdateAssignmentRequest,
    ) -> Result<Assignment, ClientError> {
        let req = self
            .api
            .request(Method::PUT, &format!("assignment/{assignment_id}"))
            .json(request);
        self.api.send_json(req).await
    }

    async fn list_grading_endpoints(&self) -> Result<Vec<GradingEndpointInfo>, ClientError> {
        let req = self
            .api
            .request(Method::GET, "assignment/grading-endpoints");
        self.api.send_json(req).await
    }
}
