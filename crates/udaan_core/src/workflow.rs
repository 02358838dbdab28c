//! crates/udaan_core/src/workflow.rs
//!
//! The application workflow service: orchestrates apply, withdraw, listing,
//! and review over the injected repositories, enforcing the
//! one-application-per-student-per-job invariant and the notification side
//! effect.

use std::sync::Arc;

use uuid::Uuid;

use crate::domain::{
    Application, ApplicationStatus, Identity, JobApplication, JobStatus, NewApplication,
    StudentApplication,
};
use crate::policy::{authorize, Action};
use crate::ports::{ApplicationRepository, JobRepository, PortError, UserRepository};

/// Inbox message appended after a successful application.
pub const SUBMITTED_NOTICE: &str = "Your application has been submitted!";

/// A business failure surfaced to the caller. Duplicate submissions are a
/// distinct kind so the presentation layer can render "already applied"
/// instead of a generic failure.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("Invalid request: {0}")]
    Validation(String),
    #[error("{0}")]
    NotFound(String),
    #[error("You already applied for this job")]
    DuplicateApplication,
    #[error("{0}")]
    Forbidden(String),
    #[error("Storage failure: {0}")]
    Service(String),
}

impl From<PortError> for WorkflowError {
    fn from(e: PortError) -> Self {
        match e {
            PortError::NotFound(msg) => WorkflowError::NotFound(msg),
            // The only uniqueness constraint in the workflow's reach is the
            // (student, job) pair on the ledger.
            PortError::Conflict(_) => WorkflowError::DuplicateApplication,
            PortError::Unexpected(msg) => WorkflowError::Service(msg),
        }
    }
}

/// Orchestrates the application lifecycle over the three injected stores.
#[derive(Clone)]
pub struct ApplicationWorkflow {
    users: Arc<dyn UserRepository>,
    jobs: Arc<dyn JobRepository>,
    applications: Arc<dyn ApplicationRepository>,
}

impl ApplicationWorkflow {
    pub fn new(
        users: Arc<dyn UserRepository>,
        jobs: Arc<dyn JobRepository>,
        applications: Arc<dyn ApplicationRepository>,
    ) -> Self {
        Self {
            users,
            jobs,
            applications,
        }
    }

    /// Submits an application on behalf of `student_id`.
    ///
    /// Validates that the student and job exist and that the job is still
    /// active, rejects duplicates, snapshots the resume (explicit override,
    /// else the student's current profile resume), inserts the row, and
    /// appends the submission notification to the student's inbox.
    ///
    /// The pre-check and insert are not atomic; the ledger's uniqueness
    /// constraint decides races, and its rejection is reported as the same
    /// [`WorkflowError::DuplicateApplication`] the pre-check produces.
    pub async fn apply(
        &self,
        identity: &Identity,
        student_id: Uuid,
        job_id: Uuid,
        resume_override: Option<String>,
    ) -> Result<Application, WorkflowError> {
        if !authorize(identity, &Action::SubmitApplication { student_id }) {
            return Err(WorkflowError::Forbidden(
                "only the student themselves may apply to a job".to_string(),
            ));
        }

        let student = self.users.get(student_id).await?;
        let job = self.jobs.get(job_id).await?;
        if job.status == JobStatus::Closed {
            return Err(WorkflowError::Validation(
                "this job is no longer accepting applications".to_string(),
            ));
        }

        if self
            .applications
            .find_by_student_and_job(student_id, job_id)
            .await?
            .is_some()
        {
            return Err(WorkflowError::DuplicateApplication);
        }

        let resume = resume_override.or(student.profile.resume);
        let created = self
            .applications
            .insert(NewApplication {
                student_id,
                job_id,
                resume,
            })
            .await?;

        self.users
            .push_notification(student_id, SUBMITTED_NOTICE)
            .await?;

        Ok(created)
    }

    /// Deletes an application. The owning student, the job's recruiter, or
    /// an admin may withdraw; anyone else gets `Forbidden`.
    pub async fn withdraw(
        &self,
        identity: &Identity,
        application_id: Uuid,
    ) -> Result<(), WorkflowError> {
        let application = self.applications.get(application_id).await?;
        let job_owner = self.job_owner(application.job_id).await?;

        let action = Action::WithdrawApplication {
            applicant: application.student_id,
            job_owner,
        };
        if !authorize(identity, &action) {
            return Err(WorkflowError::Forbidden(
                "you may not withdraw this application".to_string(),
            ));
        }

        self.applications.delete(application_id).await?;
        Ok(())
    }

    /// All of a student's applications, most recent first, with job
    /// summaries joined. Visible to the student themselves and to admins.
    pub async fn list_by_student(
        &self,
        identity: &Identity,
        student_id: Uuid,
    ) -> Result<Vec<StudentApplication>, WorkflowError> {
        if !authorize(identity, &Action::ListStudentApplications { student_id }) {
            return Err(WorkflowError::Forbidden(
                "you may not view another student's applications".to_string(),
            ));
        }
        Ok(self.applications.list_for_student(student_id).await?)
    }

    /// All applications received by a job, most recent first, with the
    /// applicants' names and emails joined. Recruiter/admin only.
    pub async fn list_by_job(
        &self,
        identity: &Identity,
        job_id: Uuid,
    ) -> Result<Vec<JobApplication>, WorkflowError> {
        let job = self.jobs.get(job_id).await?;
        let action = Action::ListJobApplications {
            job_owner: job.posted_by,
        };
        if !authorize(identity, &action) {
            return Err(WorkflowError::Forbidden(
                "you may not view this job's applications".to_string(),
            ));
        }
        Ok(self.applications.list_for_job(job_id).await?)
    }

    /// Updates an application's review status. Recruiter/admin only.
    /// All transitions are permitted; there is no restricted table.
    pub async fn set_status(
        &self,
        identity: &Identity,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> Result<Application, WorkflowError> {
        let application = self.applications.get(application_id).await?;
        let job_owner = self.job_owner(application.job_id).await?;

        let action = Action::ReviewApplication { job_owner };
        if !authorize(identity, &action) {
            return Err(WorkflowError::Forbidden(
                "you may not review this application".to_string(),
            ));
        }

        Ok(self.applications.set_status(application_id, status).await?)
    }

    /// The recruiter recorded on the application's job. Dangling job
    /// references are tolerated and read as "no recorded owner".
    async fn job_owner(&self, job_id: Uuid) -> Result<Option<Uuid>, WorkflowError> {
        match self.jobs.get(job_id).await {
            Ok(job) => Ok(job.posted_by),
            Err(PortError::NotFound(_)) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{Job, NewJob, NewUser, ProfilePatch, Role, User};
    use crate::memory::{InMemoryApplications, InMemoryJobs, InMemoryUsers};
    use chrono::NaiveDate;

    struct Fixture {
        workflow: ApplicationWorkflow,
        users: Arc<InMemoryUsers>,
        jobs: Arc<InMemoryJobs>,
    }

    fn fixture() -> Fixture {
        let users = Arc::new(InMemoryUsers::new());
        let jobs = Arc::new(InMemoryJobs::new());
        let applications = Arc::new(InMemoryApplications::new(users.clone(), jobs.clone()));
        Fixture {
            workflow: ApplicationWorkflow::new(users.clone(), jobs.clone(), applications),
            users,
            jobs,
        }
    }

    async fn register(fixture: &Fixture, email: &str, role: Role) -> User {
        fixture
            .users
            .insert(NewUser {
                name: "Test User".to_string(),
                email: email.to_string(),
                password_hash: "hash".to_string(),
                role,
            })
            .await
            .unwrap()
    }

    async fn post_job(fixture: &Fixture, title: &str, posted_by: Option<Uuid>) -> Job {
        fixture
            .jobs
            .insert(NewJob {
                title: title.to_string(),
                company: "Acme".to_string(),
                location: Some("Indore".to_string()),
                description: None,
                skills_required: vec!["rust".to_string()],
                eligibility: "Any branch".to_string(),
                last_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
                posted_by,
            })
            .await
            .unwrap()
    }

    fn identity_of(user: &User) -> Identity {
        Identity {
            user_id: user.id,
            role: user.role,
        }
    }

    #[tokio::test]
    async fn apply_creates_an_application_and_notifies_the_student() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let job = post_job(&fx, "Backend Engineer", None).await;
        let identity = identity_of(&student);

        let before = fx.users.list_notifications(student.id).await.unwrap();

        let application = fx
            .workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap();
        assert_eq!(application.student_id, student.id);
        assert_eq!(application.job_id, job.id);
        assert_eq!(application.status, ApplicationStatus::Applied);

        let after = fx.users.list_notifications(student.id).await.unwrap();
        assert_eq!(after.len(), before.len() + 1);
        let latest = after.last().unwrap();
        assert_eq!(latest.message, SUBMITTED_NOTICE);
        assert!(!latest.read);
    }

    #[tokio::test]
    async fn second_apply_for_the_same_pair_is_rejected() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let job = post_job(&fx, "Backend Engineer", None).await;
        let identity = identity_of(&student);

        fx.workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap();
        let err = fx
            .workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::DuplicateApplication));

        let listed = fx
            .workflow
            .list_by_student(&identity, student.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_applies_create_exactly_one_row() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let job = post_job(&fx, "Backend Engineer", None).await;
        let identity = identity_of(&student);
        let job_id = job.id;

        let mut handles = Vec::new();
        for _ in 0..8 {
            let workflow = fx.workflow.clone();
            handles.push(tokio::spawn(async move {
                workflow.apply(&identity, identity.user_id, job_id, None).await
            }));
        }

        let mut successes = 0;
        let mut duplicates = 0;
        for handle in handles {
            match handle.await.unwrap() {
                Ok(_) => successes += 1,
                Err(WorkflowError::DuplicateApplication) => duplicates += 1,
                Err(other) => panic!("unexpected error: {other}"),
            }
        }
        assert_eq!(successes, 1);
        assert_eq!(duplicates, 7);

        let listed = fx
            .workflow
            .list_by_student(&identity, student.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn apply_fails_for_missing_student_or_job() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let job = post_job(&fx, "Backend Engineer", None).await;

        let ghost = Identity {
            user_id: Uuid::new_v4(),
            role: Role::Student,
        };
        let err = fx
            .workflow
            .apply(&ghost, ghost.user_id, job.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));

        let identity = identity_of(&student);
        let err = fx
            .workflow
            .apply(&identity, student.id, Uuid::new_v4(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn apply_to_a_closed_job_is_rejected() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let job = post_job(&fx, "Backend Engineer", None).await;
        fx.jobs.set_status(job.id, JobStatus::Closed).await.unwrap();

        let identity = identity_of(&student);
        let err = fx
            .workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Validation(_)));
    }

    #[tokio::test]
    async fn apply_snapshots_the_profile_resume() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        fx.users
            .update_profile(
                student.id,
                ProfilePatch {
                    resume: Some("resume-v1.pdf".to_string()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();
        let job = post_job(&fx, "Backend Engineer", None).await;
        let identity = identity_of(&student);

        let application = fx
            .workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap();
        assert_eq!(application.resume.as_deref(), Some("resume-v1.pdf"));

        // A later profile edit must not rewrite the snapshot.
        fx.users
            .update_profile(
                student.id,
                ProfilePatch {
                    resume: Some("resume-v2.pdf".to_string()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();
        let listed = fx
            .workflow
            .list_by_student(&identity, student.id)
            .await
            .unwrap();
        assert_eq!(
            listed[0].application.resume.as_deref(),
            Some("resume-v1.pdf")
        );
    }

    #[tokio::test]
    async fn explicit_resume_override_wins_over_the_profile() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        fx.users
            .update_profile(
                student.id,
                ProfilePatch {
                    resume: Some("profile.pdf".to_string()),
                    ..ProfilePatch::default()
                },
            )
            .await
            .unwrap();
        let job = post_job(&fx, "Backend Engineer", None).await;
        let identity = identity_of(&student);

        let application = fx
            .workflow
            .apply(&identity, student.id, job.id, Some("tailored.pdf".to_string()))
            .await
            .unwrap();
        assert_eq!(application.resume.as_deref(), Some("tailored.pdf"));
    }

    #[tokio::test]
    async fn withdraw_frees_the_pair_for_a_new_application() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let job = post_job(&fx, "Backend Engineer", None).await;
        let identity = identity_of(&student);

        let application = fx
            .workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap();
        fx.workflow
            .withdraw(&identity, application.id)
            .await
            .unwrap();

        // The uniqueness constraint no longer blocks the pair.
        fx.workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn withdraw_rejects_strangers_and_missing_rows() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let other = register(&fx, "priya@student.com", Role::Student).await;
        let admin = register(&fx, "admin@udaan.com", Role::Admin).await;
        let job = post_job(&fx, "Backend Engineer", None).await;

        let identity = identity_of(&student);
        let application = fx
            .workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap();

        let err = fx
            .workflow
            .withdraw(&identity_of(&other), application.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        // Privileged withdrawal is allowed.
        fx.workflow
            .withdraw(&identity_of(&admin), application.id)
            .await
            .unwrap();

        let err = fx
            .workflow
            .withdraw(&identity, application.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::NotFound(_)));
    }

    #[tokio::test]
    async fn student_listing_is_most_recent_first_with_job_joined() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let first = post_job(&fx, "Backend Engineer", None).await;
        let second = post_job(&fx, "Data Analyst", None).await;
        let identity = identity_of(&student);

        fx.workflow
            .apply(&identity, student.id, first.id, None)
            .await
            .unwrap();
        fx.workflow
            .apply(&identity, student.id, second.id, None)
            .await
            .unwrap();

        let listed = fx
            .workflow
            .list_by_student(&identity, student.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 2);
        assert_eq!(listed[0].application.job_id, second.id);
        assert_eq!(listed[0].job.as_ref().unwrap().title, "Data Analyst");
        assert_eq!(listed[1].application.job_id, first.id);
    }

    #[tokio::test]
    async fn job_listing_requires_review_privilege() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let recruiter = register(&fx, "hr@google.com", Role::Recruiter).await;
        let other_recruiter = register(&fx, "talent@flipkart.com", Role::Recruiter).await;
        let admin = register(&fx, "admin@udaan.com", Role::Admin).await;
        let job = post_job(&fx, "Backend Engineer", Some(recruiter.id)).await;

        let identity = identity_of(&student);
        fx.workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap();

        let err = fx
            .workflow
            .list_by_job(&identity, job.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let err = fx
            .workflow
            .list_by_job(&identity_of(&other_recruiter), job.id)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let listed = fx
            .workflow
            .list_by_job(&identity_of(&recruiter), job.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        let applicant = listed[0].student.as_ref().unwrap();
        assert_eq!(applicant.email, "rahul@student.com");

        let listed = fx
            .workflow
            .list_by_job(&identity_of(&admin), job.id)
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
    }

    #[tokio::test]
    async fn status_review_is_restricted_and_permissive_between_states() {
        let fx = fixture();
        let student = register(&fx, "rahul@student.com", Role::Student).await;
        let recruiter = register(&fx, "hr@google.com", Role::Recruiter).await;
        let job = post_job(&fx, "Backend Engineer", Some(recruiter.id)).await;

        let identity = identity_of(&student);
        let application = fx
            .workflow
            .apply(&identity, student.id, job.id, None)
            .await
            .unwrap();

        let err = fx
            .workflow
            .set_status(&identity, application.id, ApplicationStatus::Accepted)
            .await
            .unwrap_err();
        assert!(matches!(err, WorkflowError::Forbidden(_)));

        let reviewer = identity_of(&recruiter);
        let updated = fx
            .workflow
            .set_status(&reviewer, application.id, ApplicationStatus::Rejected)
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Rejected);

        // No transition table: rejected may move back to accepted.
        let updated = fx
            .workflow
            .set_status(&reviewer, application.id, ApplicationStatus::Accepted)
            .await
            .unwrap();
        assert_eq!(updated.status, ApplicationStatus::Accepted);
    }
}
