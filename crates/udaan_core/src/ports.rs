//! crates/udaan_core/src/ports.rs
//!
//! Defines the repository contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the
//! core to be independent of the concrete data store.

use async_trait::async_trait;
use uuid::Uuid;

use crate::domain::{
    Application, ApplicationStatus, Job, JobApplication, JobStatus, NewApplication, NewJob,
    NewUser, Notification, ProfilePatch, StudentApplication, User, UserCredentials,
};

/// The inbox retains at most this many entries per user; pushing past the
/// limit evicts the oldest.
pub const INBOX_LIMIT: usize = 100;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors of the underlying store.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    /// A uniqueness constraint rejected the write (duplicate email, or a
    /// second application for the same student and job).
    #[error("Conflicting record already exists: {0}")]
    Conflict(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Repository Ports (Traits)
//=========================================================================================

/// Identity, profile, and notification-inbox storage.
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Inserts a new user. Fails with [`PortError::Conflict`] when the
    /// email is already registered (exact, case-sensitive match).
    async fn insert(&self, user: NewUser) -> PortResult<User>;

    /// Looks up the login credentials for an email address.
    async fn find_credentials(&self, email: &str) -> PortResult<UserCredentials>;

    async fn get(&self, user_id: Uuid) -> PortResult<User>;

    /// Merges the patch over the stored profile; absent fields survive.
    /// Last writer wins, there is no concurrency token.
    async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> PortResult<User>;

    /// Appends an unread notification to the user's inbox, evicting the
    /// oldest entries beyond [`INBOX_LIMIT`].
    async fn push_notification(&self, user_id: Uuid, message: &str) -> PortResult<()>;

    /// Returns the inbox in insertion (chronological) order.
    async fn list_notifications(&self, user_id: Uuid) -> PortResult<Vec<Notification>>;

    /// Marks one of the user's notifications read. Fails with
    /// [`PortError::NotFound`] when the id does not belong to that user.
    async fn mark_notification_read(&self, user_id: Uuid, notification_id: Uuid)
        -> PortResult<()>;
}

/// Job posting storage.
#[async_trait]
pub trait JobRepository: Send + Sync {
    async fn insert(&self, job: NewJob) -> PortResult<Job>;

    async fn get(&self, job_id: Uuid) -> PortResult<Job>;

    /// Lists active jobs only, optionally filtered by a case-insensitive
    /// substring match on the title, paginated.
    async fn list_active(&self, filter: JobFilter) -> PortResult<Vec<Job>>;

    async fn set_status(&self, job_id: Uuid, status: JobStatus) -> PortResult<Job>;

    /// Total job count regardless of status. Display only.
    async fn count(&self) -> PortResult<u64>;
}

/// Parameters for [`JobRepository::list_active`]. `page` is 1-based.
#[derive(Debug, Clone)]
pub struct JobFilter {
    pub search: Option<String>,
    pub page: u32,
    pub page_size: u32,
}

/// The application ledger. The store enforces at most one row per
/// (student, job) pair; a violating insert fails with
/// [`PortError::Conflict`] regardless of interleaving.
#[async_trait]
pub trait ApplicationRepository: Send + Sync {
    async fn insert(&self, application: NewApplication) -> PortResult<Application>;

    async fn get(&self, application_id: Uuid) -> PortResult<Application>;

    async fn find_by_student_and_job(
        &self,
        student_id: Uuid,
        job_id: Uuid,
    ) -> PortResult<Option<Application>>;

    /// All of a student's applications, most recently applied first, each
    /// enriched with its job's summary fields.
    async fn list_for_student(&self, student_id: Uuid) -> PortResult<Vec<StudentApplication>>;

    /// All applications for a job, most recently applied first, each
    /// enriched with the applicant's name and email.
    async fn list_for_job(&self, job_id: Uuid) -> PortResult<Vec<JobApplication>>;

    async fn set_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> PortResult<Application>;

    /// Deletes the row. Fails with [`PortError::NotFound`] when absent.
    async fn delete(&self, application_id: Uuid) -> PortResult<()>;
}
