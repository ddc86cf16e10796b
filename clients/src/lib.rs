//! # Clients
//!
//! Thin adapters over the school REST API consumed by the grading engine:
//!
//! - [`assignment_directory`]: assignment definitions and the grading endpoint catalogue.
//! - [`grading`]: the remote spreadsheet grading service.
//! - [`score_store`]: reading and persisting scores.
//!
//! Each adapter is a trait with an HTTP implementation built on a shared
//! [`api_client::ApiClient`]; the orchestrator only ever sees the traits.

pub mod api_client;
pub mod assignment_directory;
pub mod credentials;
pub mod error;
pub mod grading;
pub mod score_store;
pub mod types;

pub use api_client::ApiClient;
pub use assignment_directory::{AssignmentDirectory, HttpAssignmentDirectory};
pub use credentials::{CredentialProvider, StaticCredential};
pub use error::ClientError;
pub use grading::{GradingClient, HttpGradingClient};
pub use score_store::{HttpScoreStore, ScoreStore};
