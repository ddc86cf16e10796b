//! Score Store adapter.

use crate::api_client::ApiClient;
use crate::error::ClientError;
use crate::types::{BulkSaveAck, BulkScoreRequest, Score, ScoreUpsert};
use async_trait::async_trait;
use reqwest::Method;

#[async_trait]
pub trait ScoreStore: Send + Sync {
    /// Previously saved scores for an assignment, one per graded student.
    async fn list_by_assignment(&self, assignment_id: &str) -> Result<Vec<Score>, ClientError>;

    async fn save_one(&self, score: &ScoreUpsert) -> Result<Score, ClientError>;

    /// Persists every entry of `request` in one call.
    ///
    /// The store does not promise atomicity; callers treat any error as
    /// "nothing was saved" and retry the whole batch.
    async fn save_bulk(&self, request: &BulkScoreRequest) -> Result<BulkSaveAck, ClientError>;
}

#[derive(Clone)]
pub struct HttpScoreStore {
    api: ApiClient,
}

impl HttpScoreStore {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl ScoreStore for HttpScoreStore {
    async fn list_by_assignment(&self, assignment_id: &str) -> Result<Vec<Score>, ClientError> {
        let req = self
            .api
            .request(Method::GET, &format!("score/assignment/{assignment_id}"));
        self.api.send_json(req).await
    }

    async fn save_one(&self, score: &ScoreUpsert) -> Result<Score, ClientError> {
        let req = self.api.request(Method::POST, "score").json(score);
        self.api.send_json(req).await
    }

    async fn save_bulk(&self, request: &BulkScoreRequest) -> Result<BulkSaveAck, ClientError> {
        let req = self.api.request(Method::POST, "score/bulk").json(request);
        self.api.send_json(req).await
    }
}
