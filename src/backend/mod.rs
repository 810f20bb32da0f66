//! Backend collaborator boundaries.
//!
//! Concrete handlers talk to a handful of university backend services:
//! role resolution and form submission, payments, schedule, identity.
//! The core only needs to know that these calls can fail and that their
//! failures must not crash the dispatcher, so each service is a dyn trait
//! with typed errors.

mod memory;

pub use memory::MemoryBackend;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::session::UserId;

/// Failure of a backend collaborator call.
#[derive(Error, Debug)]
pub enum BackendError {
    /// The backend does not recognize this messenger user.
    #[error("user is not registered")]
    UserNotFound,

    /// The backend answered with a non-success HTTP status.
    #[error("backend {method} {path} returned {status}: {body}")]
    Http {
        method: String,
        path: String,
        status: u16,
        body: String,
    },

    /// The backend could not be reached or misbehaved.
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

/// Role the backend assigned to a registered user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Teacher,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Teacher => "teacher",
        }
    }
}

/// A completed application form, ready for submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmittedForm {
    /// Document kind tag (e.g. `study_certificate`).
    pub kind: String,
    pub role: Role,
    /// Collected values keyed by field name.
    pub values: HashMap<String, String>,
}

/// Which bill a payment link is for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentKind {
    Dorm,
    Tuition,
}

/// Outstanding bills for a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub struct PaymentStatus {
    pub need_dorm: bool,
    pub need_tuition: bool,
}

impl PaymentStatus {
    pub fn all_paid(&self) -> bool {
        !self.need_dorm && !self.need_tuition
    }
}

/// Registration data collected from a new user.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegistrationRequest {
    pub user_id: UserId,
    pub role: String,
    /// Answers from the registration wizard, keyed by field name.
    pub values: HashMap<String, String>,
}

/// Outcome of a successful registration.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RegistrationResult {
    /// Optional extra message the backend wants shown to the user.
    #[serde(default)]
    pub message: String,
}

/// Role resolution and application form submission.
#[async_trait]
pub trait Applications: Send + Sync {
    async fn resolve_role(&self, user_id: UserId) -> Result<Role, BackendError>;
    async fn submit(&self, user_id: UserId, form: SubmittedForm) -> Result<(), BackendError>;
}

/// Payment status and payment links.
#[async_trait]
pub trait Payments: Send + Sync {
    async fn status(&self, user_id: UserId) -> Result<PaymentStatus, BackendError>;
    async fn link(&self, user_id: UserId, kind: PaymentKind) -> Result<String, BackendError>;
}

/// One lesson in a user's timetable.
///
/// The backend reports the day as a loose `weekday` name and/or a `date`
/// string; rendering in the app layer normalizes both.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScheduleLesson {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub teacher: String,
    #[serde(default)]
    pub room: String,
    /// 1-based slot number within the day; zero when unknown.
    #[serde(default)]
    pub pair_no: u32,
    /// Human-readable time range, e.g. `08:00 - 09:20`.
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub groups: Vec<String>,
    #[serde(default)]
    pub weekday: String,
    #[serde(default)]
    pub date: String,
}

/// Schedule listing.
#[async_trait]
pub trait Schedule: Send + Sync {
    /// Lessons for the week starting at `week_start`, or the backend's
    /// default window when `None`.
    async fn list(
        &self,
        user_id: UserId,
        week_start: Option<NaiveDate>,
    ) -> Result<Vec<ScheduleLesson>, BackendError>;
}

/// User registration.
#[async_trait]
pub trait Identity: Send + Sync {
    async fn register(
        &self,
        request: RegistrationRequest,
    ) -> Result<RegistrationResult, BackendError>;
}

/// Aggregates all backend services the handlers consume.
#[derive(Clone)]
pub struct Repository {
    pub applications: Arc<dyn Applications>,
    pub payments: Arc<dyn Payments>,
    pub schedule: Arc<dyn Schedule>,
    pub identity: Arc<dyn Identity>,
}

impl Repository {
    /// In-memory repository, used when no real backend is configured and
    /// throughout the test suite.
    pub fn in_memory() -> Self {
        let backend = Arc::new(MemoryBackend::new());
        Self {
            applications: backend.clone(),
            payments: backend.clone(),
            schedule: backend.clone(),
            identity: backend,
        }
    }
}
