//! crates/udaan_core/src/memory.rs
//!
//! In-memory implementations of the repository ports. They back the
//! workflow test suite and mirror the storage guarantees the real store
//! provides: in particular, the application ledger's check-and-insert runs
//! under a single lock, so a second insert for the same (student, job)
//! pair fails with `Conflict` no matter how calls interleave.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use crate::domain::{
    Application, ApplicationStatus, Job, JobApplication, JobStatus, JobSummary, NewApplication,
    NewJob, NewUser, Notification, ProfilePatch, StudentApplication, StudentSummary, User,
    UserCredentials,
};
use crate::ports::{
    ApplicationRepository, JobFilter, JobRepository, PortError, PortResult, UserRepository,
    INBOX_LIMIT,
};

//=========================================================================================
// Users
//=========================================================================================

struct StoredUser {
    user: User,
    password_hash: String,
    notifications: Vec<Notification>,
}

/// In-memory user directory with embedded notification inboxes.
#[derive(Default)]
pub struct InMemoryUsers {
    inner: Mutex<Vec<StoredUser>>,
}

impl InMemoryUsers {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for InMemoryUsers {
    async fn insert(&self, user: NewUser) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        if inner.iter().any(|s| s.user.email == user.email) {
            return Err(PortError::Conflict(format!(
                "email {} is already registered",
                user.email
            )));
        }
        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            role: user.role,
            profile: Default::default(),
        };
        inner.push(StoredUser {
            user: created.clone(),
            password_hash: user.password_hash,
            notifications: Vec::new(),
        });
        Ok(created)
    }

    async fn find_credentials(&self, email: &str) -> PortResult<UserCredentials> {
        let inner = self.inner.lock().unwrap();
        inner
            .iter()
            .find(|s| s.user.email == email)
            .map(|s| UserCredentials {
                id: s.user.id,
                name: s.user.name.clone(),
                email: s.user.email.clone(),
                role: s.user.role,
                password_hash: s.password_hash.clone(),
            })
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", email)))
    }

    async fn get(&self, user_id: Uuid) -> PortResult<User> {
        let inner = self.inner.lock().unwrap();
        inner
            .iter()
            .find(|s| s.user.id == user_id)
            .map(|s| s.user.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> PortResult<User> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .iter_mut()
            .find(|s| s.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        if let Some(name) = &patch.name {
            stored.user.name = name.clone();
        }
        stored.user.profile = stored.user.profile.merged(&patch);
        Ok(stored.user.clone())
    }

    async fn push_notification(&self, user_id: Uuid, message: &str) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .iter_mut()
            .find(|s| s.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        stored.notifications.push(Notification {
            id: Uuid::new_v4(),
            message: message.to_string(),
            read: false,
            created_at: Utc::now(),
        });
        let overflow = stored.notifications.len().saturating_sub(INBOX_LIMIT);
        if overflow > 0 {
            stored.notifications.drain(..overflow);
        }
        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> PortResult<Vec<Notification>> {
        let inner = self.inner.lock().unwrap();
        inner
            .iter()
            .find(|s| s.user.id == user_id)
            .map(|s| s.notifications.clone())
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let stored = inner
            .iter_mut()
            .find(|s| s.user.id == user_id)
            .ok_or_else(|| PortError::NotFound(format!("User {} not found", user_id)))?;
        let notification = stored
            .notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| {
                PortError::NotFound(format!("Notification {} not found", notification_id))
            })?;
        notification.read = true;
        Ok(())
    }
}

//=========================================================================================
// Jobs
//=========================================================================================

/// In-memory job catalog, kept in insertion order.
#[derive(Default)]
pub struct InMemoryJobs {
    inner: Mutex<Vec<Job>>,
}

impl InMemoryJobs {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl JobRepository for InMemoryJobs {
    async fn insert(&self, job: NewJob) -> PortResult<Job> {
        let created = Job {
            id: Uuid::new_v4(),
            title: job.title,
            company: job.company,
            location: job.location,
            description: job.description,
            skills_required: job.skills_required,
            eligibility: job.eligibility,
            last_date: job.last_date,
            status: JobStatus::Active,
            posted_by: job.posted_by,
        };
        self.inner.lock().unwrap().push(created.clone());
        Ok(created)
    }

    async fn get(&self, job_id: Uuid) -> PortResult<Job> {
        let inner = self.inner.lock().unwrap();
        inner
            .iter()
            .find(|j| j.id == job_id)
            .cloned()
            .ok_or_else(|| PortError::NotFound(format!("Job {} not found", job_id)))
    }

    async fn list_active(&self, filter: JobFilter) -> PortResult<Vec<Job>> {
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let inner = self.inner.lock().unwrap();
        let matches = inner.iter().filter(|j| {
            j.status == JobStatus::Active
                && needle
                    .as_deref()
                    .map_or(true, |n| j.title.to_lowercase().contains(n))
        });
        let skip = (filter.page.max(1) - 1) as usize * filter.page_size as usize;
        Ok(matches
            .skip(skip)
            .take(filter.page_size as usize)
            .cloned()
            .collect())
    }

    async fn set_status(&self, job_id: Uuid, status: JobStatus) -> PortResult<Job> {
        let mut inner = self.inner.lock().unwrap();
        let job = inner
            .iter_mut()
            .find(|j| j.id == job_id)
            .ok_or_else(|| PortError::NotFound(format!("Job {} not found", job_id)))?;
        job.status = status;
        Ok(job.clone())
    }

    async fn count(&self) -> PortResult<u64> {
        Ok(self.inner.lock().unwrap().len() as u64)
    }
}

//=========================================================================================
// Applications
//=========================================================================================

/// In-memory application ledger. Holds handles to the user and job stores
/// so listings can join the same summary fields the SQL adapter does.
pub struct InMemoryApplications {
    inner: Mutex<Vec<Application>>,
    users: Arc<InMemoryUsers>,
    jobs: Arc<InMemoryJobs>,
}

impl InMemoryApplications {
    pub fn new(users: Arc<InMemoryUsers>, jobs: Arc<InMemoryJobs>) -> Self {
        Self {
            inner: Mutex::new(Vec::new()),
            users,
            jobs,
        }
    }

    fn job_summary(&self, job_id: Uuid) -> Option<JobSummary> {
        let jobs = self.jobs.inner.lock().unwrap();
        jobs.iter().find(|j| j.id == job_id).map(|j| JobSummary {
            id: j.id,
            title: j.title.clone(),
            company: j.company.clone(),
            location: j.location.clone(),
            status: j.status,
        })
    }

    fn student_summary(&self, student_id: Uuid) -> Option<StudentSummary> {
        let users = self.users.inner.lock().unwrap();
        users
            .iter()
            .find(|s| s.user.id == student_id)
            .map(|s| StudentSummary {
                id: s.user.id,
                name: s.user.name.clone(),
                email: s.user.email.clone(),
            })
    }
}

#[async_trait]
impl ApplicationRepository for InMemoryApplications {
    async fn insert(&self, application: NewApplication) -> PortResult<Application> {
        // Check and insert under one lock: the in-memory stand-in for the
        // store's unique (student_id, job_id) constraint.
        let mut inner = self.inner.lock().unwrap();
        if inner
            .iter()
            .any(|a| a.student_id == application.student_id && a.job_id == application.job_id)
        {
            return Err(PortError::Conflict(format!(
                "student {} already applied to job {}",
                application.student_id, application.job_id
            )));
        }
        let created = Application {
            id: Uuid::new_v4(),
            student_id: application.student_id,
            job_id: application.job_id,
            resume: application.resume,
            status: ApplicationStatus::Applied,
            applied_at: Utc::now(),
        };
        inner.push(created.clone());
        Ok(created)
    }

    async fn get(&self, application_id: Uuid) -> PortResult<Application> {
        let inner = self.inner.lock().unwrap();
        inner
            .iter()
            .find(|a| a.id == application_id)
            .cloned()
            .ok_or_else(|| {
                PortError::NotFound(format!("Application {} not found", application_id))
            })
    }

    async fn find_by_student_and_job(
        &self,
        student_id: Uuid,
        job_id: Uuid,
    ) -> PortResult<Option<Application>> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .iter()
            .find(|a| a.student_id == student_id && a.job_id == job_id)
            .cloned())
    }

    async fn list_for_student(&self, student_id: Uuid) -> PortResult<Vec<StudentApplication>> {
        let applications: Vec<Application> = {
            let inner = self.inner.lock().unwrap();
            // Reverse insertion order: most recently created first.
            inner
                .iter()
                .rev()
                .filter(|a| a.student_id == student_id)
                .cloned()
                .collect()
        };
        Ok(applications
            .into_iter()
            .map(|application| {
                let job = self.job_summary(application.job_id);
                StudentApplication { application, job }
            })
            .collect())
    }

    async fn list_for_job(&self, job_id: Uuid) -> PortResult<Vec<JobApplication>> {
        let applications: Vec<Application> = {
            let inner = self.inner.lock().unwrap();
            inner
                .iter()
                .rev()
                .filter(|a| a.job_id == job_id)
                .cloned()
                .collect()
        };
        Ok(applications
            .into_iter()
            .map(|application| {
                let student = self.student_summary(application.student_id);
                JobApplication {
                    application,
                    student,
                }
            })
            .collect())
    }

    async fn set_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> PortResult<Application> {
        let mut inner = self.inner.lock().unwrap();
        let application = inner
            .iter_mut()
            .find(|a| a.id == application_id)
            .ok_or_else(|| {
                PortError::NotFound(format!("Application {} not found", application_id))
            })?;
        application.status = status;
        Ok(application.clone())
    }

    async fn delete(&self, application_id: Uuid) -> PortResult<()> {
        let mut inner = self.inner.lock().unwrap();
        let before = inner.len();
        inner.retain(|a| a.id != application_id);
        if inner.len() == before {
            return Err(PortError::NotFound(format!(
                "Application {} not found",
                application_id
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use chrono::NaiveDate;

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Test User".to_string(),
            email: email.to_string(),
            password_hash: "hash".to_string(),
            role: Role::Student,
        }
    }

    fn new_job(title: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            company: "Acme".to_string(),
            location: None,
            description: None,
            skills_required: vec![],
            eligibility: "Any branch".to_string(),
            last_date: NaiveDate::from_ymd_opt(2026, 12, 31).unwrap(),
            posted_by: None,
        }
    }

    #[tokio::test]
    async fn duplicate_email_is_rejected() {
        let users = InMemoryUsers::new();
        users.insert(new_user("a@b.com")).await.unwrap();
        let err = users.insert(new_user("a@b.com")).await.unwrap_err();
        assert!(matches!(err, PortError::Conflict(_)));
    }

    #[tokio::test]
    async fn inbox_is_capped_at_the_most_recent_entries() {
        let users = InMemoryUsers::new();
        let user = users.insert(new_user("a@b.com")).await.unwrap();
        for i in 0..INBOX_LIMIT + 5 {
            users
                .push_notification(user.id, &format!("message {}", i))
                .await
                .unwrap();
        }
        let inbox = users.list_notifications(user.id).await.unwrap();
        assert_eq!(inbox.len(), INBOX_LIMIT);
        assert_eq!(inbox[0].message, "message 5");
        assert_eq!(inbox.last().unwrap().message, format!("message {}", INBOX_LIMIT + 4));
    }

    #[tokio::test]
    async fn closed_jobs_disappear_from_active_listings() {
        let jobs = InMemoryJobs::new();
        let job = jobs.insert(new_job("Backend Engineer")).await.unwrap();
        let filter = JobFilter {
            search: None,
            page: 1,
            page_size: 20,
        };

        let listed = jobs.list_active(filter.clone()).await.unwrap();
        assert_eq!(listed.len(), 1);

        jobs.set_status(job.id, JobStatus::Closed).await.unwrap();
        let listed = jobs.list_active(filter).await.unwrap();
        assert!(listed.is_empty());
        assert_eq!(jobs.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn title_search_is_case_insensitive() {
        let jobs = InMemoryJobs::new();
        jobs.insert(new_job("Backend Engineer")).await.unwrap();
        jobs.insert(new_job("Data Analyst")).await.unwrap();

        let listed = jobs
            .list_active(JobFilter {
                search: Some("ENGINEER".to_string()),
                page: 1,
                page_size: 20,
            })
            .await
            .unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].title, "Backend Engineer");
    }

    #[tokio::test]
    async fn pagination_bounds_the_page() {
        let jobs = InMemoryJobs::new();
        for i in 0..5 {
            jobs.insert(new_job(&format!("Role {}", i))).await.unwrap();
        }

        let page2 = jobs
            .list_active(JobFilter {
                search: None,
                page: 2,
                page_size: 2,
            })
            .await
            .unwrap();
        assert_eq!(page2.len(), 2);
        assert_eq!(page2[0].title, "Role 2");
    }
}
