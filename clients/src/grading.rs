//! # Remote Grading Client
//!
//! Sends one student's spreadsheet together with the answer-key spreadsheet to
//! the grading service and returns its structured [`GradingResult`].
//!
//! The call has no side effects besides the request itself. Scoring rules live
//! entirely on the service side; an endpoint key (e.g. `project09`) selects
//! which rule set is applied.

use crate::api_client::ApiClient;
use crate::error::ClientError;
use crate::types::{GradingResult, SubmissionFile};
use async_trait::async_trait;
use reqwest::Method;
use reqwest::multipart::{Form, Part};
use std::time::Duration;
use tracing::debug;

#[async_trait]
pub trait GradingClient: Send + Sync {
    async fn grade(
        &self,
        endpoint: &str,
        student_file: &SubmissionFile,
        answer_file: &SubmissionFile,
    ) -> Result<GradingResult, ClientError>;
}

#[derive(Clone)]
pub struct HttpGradingClient {
    api: ApiClient,
    timeout: Duration,
}

impl HttpGradingClient {
    /// `timeout` applies to grading calls only; spreadsheet checks are slower
    /// than the rest of the API.
    pub fn new(api: ApiClient, timeout: Duration) -> Self {
        Self { api, timeout }
    }

    pub fn from_config(api: ApiClient) -> Self {
        Self::new(
            api,
            Duration::from_secs(common::config::grading_timeout_secs()),
        )
    }
}

fn file_part(file: &SubmissionFile) -> Part {
    Part::bytes(file.bytes.to_vec()).file_name(file.name.clone())
}

#[async_trait]
impl GradingClient for HttpGradingClient {
    async fn grade(
        &self,
        endpoint: &str,
        student_file: &SubmissionFile,
        answer_file: &SubmissionFile,
    ) -> Result<GradingResult, ClientError> {
        debug!(
            endpoint,
            student_file = %student_file.name,
            bytes = student_file.len(),
            "posting submission to grading service"
        );

        let form = Form::new()
            .part("studentFile", file_part(student_file))
            .part("answerFile", file_part(answer_file));

        let req = self
            .api
            .request(
                Method::POST,
                &format!("grading/{}", endpoint.to_lowercase()),
            )
            .timeout(self.timeout)
            .multipart(form);

        self.api.send_json(req).await
    }
}
