pub mod domain;
pub mod memory;
pub mod policy;
pub mod ports;
pub mod workflow;

pub use domain::{
    Application, ApplicationStatus, Identity, Job, JobApplication, JobStatus, JobSummary,
    NewApplication, NewJob, NewUser, Notification, Profile, ProfilePatch, Role,
    StudentApplication, StudentSummary, User, UserCredentials,
};
pub use ports::{
    ApplicationRepository, JobFilter, JobRepository, PortError, PortResult, UserRepository,
    INBOX_LIMIT,
};
pub use workflow::{ApplicationWorkflow, WorkflowError, SUBMITTED_NOTICE};
