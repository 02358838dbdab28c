//! crates/udaan_core/src/domain.rs
//!
//! Defines the pure, core data structures for the placement portal.
//! These structs are independent of any database or serialization format.

use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

/// The role a user was registered with. Fixed at creation; gates which
/// operations the identity may perform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    Student,
    Recruiter,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Recruiter => "recruiter",
            Role::Admin => "admin",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "student" => Some(Role::Student),
            "recruiter" => Some(Role::Recruiter),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// Lifecycle status of a job posting. Only active jobs are offered for
/// application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobStatus {
    Active,
    Closed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Active => "active",
            JobStatus::Closed => "closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "active" => Some(JobStatus::Active),
            "closed" => Some(JobStatus::Closed),
            _ => None,
        }
    }
}

/// Review status of an application. Any status may move to any other;
/// there is no restricted transition table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplicationStatus {
    Applied,
    Pending,
    Accepted,
    Rejected,
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Applied => "applied",
            ApplicationStatus::Pending => "pending",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "applied" => Some(ApplicationStatus::Applied),
            "pending" => Some(ApplicationStatus::Pending),
            "accepted" => Some(ApplicationStatus::Accepted),
            "rejected" => Some(ApplicationStatus::Rejected),
            _ => None,
        }
    }
}

/// The authenticated caller of an operation, as resolved by the auth
/// gateway in front of the workflow service.
#[derive(Debug, Clone, Copy)]
pub struct Identity {
    pub user_id: Uuid,
    pub role: Role,
}

/// Student-oriented profile fields, all optional.
#[derive(Debug, Clone, Default)]
pub struct Profile {
    pub resume: Option<String>,
    pub cgpa: Option<f64>,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub skills: Vec<String>,
    pub phone: Option<String>,
    pub college: Option<String>,
}

/// A partial profile update. Fields left as `None` are preserved on the
/// stored profile, not cleared.
#[derive(Debug, Clone, Default)]
pub struct ProfilePatch {
    pub name: Option<String>,
    pub resume: Option<String>,
    pub cgpa: Option<f64>,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub skills: Option<Vec<String>>,
    pub phone: Option<String>,
    pub college: Option<String>,
}

/// An identity record. The password credential lives in
/// [`UserCredentials`] and is never carried here.
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub profile: Profile,
}

/// Input for registering a user.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: Role,
}

// Only used internally for login - contains sensitive data
#[derive(Debug, Clone)]
pub struct UserCredentials {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub password_hash: String,
}

/// An entry in a user's notification inbox. Insertion order is
/// chronological.
#[derive(Debug, Clone)]
pub struct Notification {
    pub id: Uuid,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

/// A job posting.
#[derive(Debug, Clone)]
pub struct Job {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub skills_required: Vec<String>,
    pub eligibility: String,
    pub last_date: NaiveDate,
    pub status: JobStatus,
    pub posted_by: Option<Uuid>,
}

/// Input for creating a job posting.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub skills_required: Vec<String>,
    pub eligibility: String,
    pub last_date: NaiveDate,
    pub posted_by: Option<Uuid>,
}

/// A student's request to be considered for a job. Holds non-owning
/// references; deleting a user or job does not cascade here.
#[derive(Debug, Clone)]
pub struct Application {
    pub id: Uuid,
    pub student_id: Uuid,
    pub job_id: Uuid,
    /// Resume captured at apply time, independent of later profile edits.
    pub resume: Option<String>,
    pub status: ApplicationStatus,
    pub applied_at: DateTime<Utc>,
}

/// Input for creating an application row.
#[derive(Debug, Clone)]
pub struct NewApplication {
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub resume: Option<String>,
}

/// The job fields joined onto a student's application listing.
#[derive(Debug, Clone)]
pub struct JobSummary {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub status: JobStatus,
}

/// The student fields joined onto a per-job application listing.
#[derive(Debug, Clone)]
pub struct StudentSummary {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// An application enriched with its job's summary. The join is left:
/// a dangling job reference yields `None`.
#[derive(Debug, Clone)]
pub struct StudentApplication {
    pub application: Application,
    pub job: Option<JobSummary>,
}

/// An application enriched with the applicant's name and email.
#[derive(Debug, Clone)]
pub struct JobApplication {
    pub application: Application,
    pub student: Option<StudentSummary>,
}

impl Profile {
    /// Merges a patch over this profile. `None` fields are preserved.
    pub fn merged(&self, patch: &ProfilePatch) -> Profile {
        Profile {
            resume: patch.resume.clone().or_else(|| self.resume.clone()),
            cgpa: patch.cgpa.or(self.cgpa),
            branch: patch.branch.clone().or_else(|| self.branch.clone()),
            year: patch.year.or(self.year),
            skills: patch.skills.clone().unwrap_or_else(|| self.skills.clone()),
            phone: patch.phone.clone().or_else(|| self.phone.clone()),
            college: patch.college.clone().or_else(|| self.college.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merged_patch_preserves_untouched_fields() {
        let existing = Profile {
            branch: Some("EE".to_string()),
            phone: Some("123".to_string()),
            ..Profile::default()
        };
        let patch = ProfilePatch {
            branch: Some("CS".to_string()),
            ..ProfilePatch::default()
        };

        let merged = existing.merged(&patch);
        assert_eq!(merged.branch.as_deref(), Some("CS"));
        assert_eq!(merged.phone.as_deref(), Some("123"));
        assert!(merged.resume.is_none());
    }

    #[test]
    fn status_strings_round_trip() {
        for status in [
            ApplicationStatus::Applied,
            ApplicationStatus::Pending,
            ApplicationStatus::Accepted,
            ApplicationStatus::Rejected,
        ] {
            assert_eq!(ApplicationStatus::parse(status.as_str()), Some(status));
        }
        assert_eq!(ApplicationStatus::parse("shortlisted"), None);
    }
}
