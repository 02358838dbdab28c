//! services/api/src/adapters/db.rs
//!
//! This module contains the database adapter, which is the concrete
//! implementation of the repository ports from the `udaan_core` crate. It
//! handles all interactions with the PostgreSQL database using `sqlx`.
//!
//! Queries go through the runtime `query_as` API with explicit record
//! structs, so the crate builds without a reachable database.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{FromRow, PgPool};
use uuid::Uuid;

use udaan_core::domain::{
    Application, ApplicationStatus, Job, JobApplication, JobStatus, JobSummary, NewApplication,
    NewJob, NewUser, Notification, Profile, ProfilePatch, Role, StudentApplication,
    StudentSummary, User, UserCredentials,
};
use udaan_core::ports::{
    ApplicationRepository, JobFilter, JobRepository, PortError, PortResult, UserRepository,
    INBOX_LIMIT,
};

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// A database adapter that implements the three repository ports over a
/// single connection pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Creates a new `PgStore`.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// A helper function to run database migrations at startup.
    pub async fn run_migrations(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!("./migrations").run(&self.pool).await?;
        Ok(())
    }

    /// Used by the seeder to start from an empty database.
    pub async fn wipe(&self) -> Result<(), sqlx::Error> {
        sqlx::query("TRUNCATE applications, notifications, jobs, users")
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}

fn unexpected(e: sqlx::Error) -> PortError {
    PortError::Unexpected(e.to_string())
}

fn is_unique_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::UniqueViolation))
}

fn is_fk_violation(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::Database(db) if matches!(db.kind(), sqlx::error::ErrorKind::ForeignKeyViolation))
}

fn parse_role(s: &str) -> PortResult<Role> {
    Role::parse(s).ok_or_else(|| PortError::Unexpected(format!("unknown role '{}' in store", s)))
}

fn parse_job_status(s: &str) -> PortResult<JobStatus> {
    JobStatus::parse(s)
        .ok_or_else(|| PortError::Unexpected(format!("unknown job status '{}' in store", s)))
}

fn parse_application_status(s: &str) -> PortResult<ApplicationStatus> {
    ApplicationStatus::parse(s).ok_or_else(|| {
        PortError::Unexpected(format!("unknown application status '{}' in store", s))
    })
}

//=========================================================================================
// "Impure" Database Record Structs
//=========================================================================================

#[derive(FromRow)]
struct UserRecord {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    resume: Option<String>,
    cgpa: Option<f64>,
    branch: Option<String>,
    year: Option<i32>,
    skills: Vec<String>,
    phone: Option<String>,
    college: Option<String>,
}

impl UserRecord {
    fn to_domain(self) -> PortResult<User> {
        Ok(User {
            id: self.id,
            name: self.name,
            email: self.email,
            role: parse_role(&self.role)?,
            profile: Profile {
                resume: self.resume,
                cgpa: self.cgpa,
                branch: self.branch,
                year: self.year,
                skills: self.skills,
                phone: self.phone,
                college: self.college,
            },
        })
    }
}

const USER_COLUMNS: &str =
    "id, name, email, role, resume, cgpa, branch, year, skills, phone, college";

#[derive(FromRow)]
struct CredentialsRecord {
    id: Uuid,
    name: String,
    email: String,
    role: String,
    password_hash: String,
}

impl CredentialsRecord {
    fn to_domain(self) -> PortResult<UserCredentials> {
        Ok(UserCredentials {
            id: self.id,
            name: self.name,
            email: self.email,
            role: parse_role(&self.role)?,
            password_hash: self.password_hash,
        })
    }
}

#[derive(FromRow)]
struct NotificationRecord {
    id: Uuid,
    message: String,
    read: bool,
    created_at: DateTime<Utc>,
}

impl NotificationRecord {
    fn to_domain(self) -> Notification {
        Notification {
            id: self.id,
            message: self.message,
            read: self.read,
            created_at: self.created_at,
        }
    }
}

#[derive(FromRow)]
struct JobRecord {
    id: Uuid,
    title: String,
    company: String,
    location: Option<String>,
    description: Option<String>,
    skills_required: Vec<String>,
    eligibility: String,
    last_date: NaiveDate,
    status: String,
    posted_by: Option<Uuid>,
}

impl JobRecord {
    fn to_domain(self) -> PortResult<Job> {
        Ok(Job {
            id: self.id,
            title: self.title,
            company: self.company,
            location: self.location,
            description: self.description,
            skills_required: self.skills_required,
            eligibility: self.eligibility,
            last_date: self.last_date,
            status: parse_job_status(&self.status)?,
            posted_by: self.posted_by,
        })
    }
}

const JOB_COLUMNS: &str = "id, title, company, location, description, skills_required, \
                           eligibility, last_date, status, posted_by";

#[derive(FromRow)]
struct ApplicationRecord {
    id: Uuid,
    student_id: Uuid,
    job_id: Uuid,
    resume: Option<String>,
    status: String,
    applied_at: DateTime<Utc>,
}

impl ApplicationRecord {
    fn to_domain(self) -> PortResult<Application> {
        Ok(Application {
            id: self.id,
            student_id: self.student_id,
            job_id: self.job_id,
            resume: self.resume,
            status: parse_application_status(&self.status)?,
            applied_at: self.applied_at,
        })
    }
}

const APPLICATION_COLUMNS: &str = "id, student_id, job_id, resume, status, applied_at";

/// Application row left-joined with its job's summary fields.
#[derive(FromRow)]
struct StudentApplicationRecord {
    id: Uuid,
    student_id: Uuid,
    job_id: Uuid,
    resume: Option<String>,
    status: String,
    applied_at: DateTime<Utc>,
    job_title: Option<String>,
    job_company: Option<String>,
    job_location: Option<String>,
    job_status: Option<String>,
}

impl StudentApplicationRecord {
    fn to_domain(self) -> PortResult<StudentApplication> {
        let job = match (self.job_title, self.job_company, self.job_status) {
            (Some(title), Some(company), Some(status)) => Some(JobSummary {
                id: self.job_id,
                title,
                company,
                location: self.job_location,
                status: parse_job_status(&status)?,
            }),
            _ => None,
        };
        Ok(StudentApplication {
            application: Application {
                id: self.id,
                student_id: self.student_id,
                job_id: self.job_id,
                resume: self.resume,
                status: parse_application_status(&self.status)?,
                applied_at: self.applied_at,
            },
            job,
        })
    }
}

/// Application row left-joined with the applicant's name and email.
#[derive(FromRow)]
struct JobApplicationRecord {
    id: Uuid,
    student_id: Uuid,
    job_id: Uuid,
    resume: Option<String>,
    status: String,
    applied_at: DateTime<Utc>,
    student_name: Option<String>,
    student_email: Option<String>,
}

impl JobApplicationRecord {
    fn to_domain(self) -> PortResult<JobApplication> {
        let student = match (self.student_name, self.student_email) {
            (Some(name), Some(email)) => Some(StudentSummary {
                id: self.student_id,
                name,
                email,
            }),
            _ => None,
        };
        Ok(JobApplication {
            application: Application {
                id: self.id,
                student_id: self.student_id,
                job_id: self.job_id,
                resume: self.resume,
                status: parse_application_status(&self.status)?,
                applied_at: self.applied_at,
            },
            student,
        })
    }
}

//=========================================================================================
// `UserRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl UserRepository for PgStore {
    async fn insert(&self, user: NewUser) -> PortResult<User> {
        let sql = format!(
            "INSERT INTO users (name, email, password_hash, role) \
             VALUES ($1, $2, $3, $4) RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(&user.name)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(user.role.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PortError::Conflict(format!("email {} is already registered", user.email))
                } else {
                    unexpected(e)
                }
            })?;
        record.to_domain()
    }

    async fn find_credentials(&self, email: &str) -> PortResult<UserCredentials> {
        let record = sqlx::query_as::<_, CredentialsRecord>(
            "SELECT id, name, email, role, password_hash FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::RowNotFound => PortError::NotFound(format!("User {} not found", email)),
            _ => unexpected(e),
        })?;
        record.to_domain()
    }

    async fn get(&self, user_id: Uuid) -> PortResult<User> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("User {} not found", user_id))
                }
                _ => unexpected(e),
            })?;
        record.to_domain()
    }

    async fn update_profile(&self, user_id: Uuid, patch: ProfilePatch) -> PortResult<User> {
        // COALESCE keeps every field the patch leaves as NULL.
        let sql = format!(
            "UPDATE users SET \
                name = COALESCE($2, name), \
                resume = COALESCE($3, resume), \
                cgpa = COALESCE($4, cgpa), \
                branch = COALESCE($5, branch), \
                year = COALESCE($6, year), \
                skills = COALESCE($7, skills), \
                phone = COALESCE($8, phone), \
                college = COALESCE($9, college) \
             WHERE id = $1 RETURNING {USER_COLUMNS}"
        );
        let record = sqlx::query_as::<_, UserRecord>(&sql)
            .bind(user_id)
            .bind(&patch.name)
            .bind(&patch.resume)
            .bind(patch.cgpa)
            .bind(&patch.branch)
            .bind(patch.year)
            .bind(&patch.skills)
            .bind(&patch.phone)
            .bind(&patch.college)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("User {} not found", user_id))
                }
                _ => unexpected(e),
            })?;
        record.to_domain()
    }

    async fn push_notification(&self, user_id: Uuid, message: &str) -> PortResult<()> {
        sqlx::query("INSERT INTO notifications (user_id, message) VALUES ($1, $2)")
            .bind(user_id)
            .bind(message)
            .execute(&self.pool)
            .await
            .map_err(|e| {
                if is_fk_violation(&e) {
                    PortError::NotFound(format!("User {} not found", user_id))
                } else {
                    unexpected(e)
                }
            })?;

        // Evict entries beyond the inbox cap, oldest first.
        sqlx::query(
            "DELETE FROM notifications WHERE user_id = $1 AND id NOT IN ( \
                SELECT id FROM notifications WHERE user_id = $1 \
                ORDER BY created_at DESC, id DESC LIMIT $2)",
        )
        .bind(user_id)
        .bind(INBOX_LIMIT as i64)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        Ok(())
    }

    async fn list_notifications(&self, user_id: Uuid) -> PortResult<Vec<Notification>> {
        let records = sqlx::query_as::<_, NotificationRecord>(
            "SELECT id, message, read, created_at FROM notifications \
             WHERE user_id = $1 ORDER BY created_at ASC, id ASC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        Ok(records.into_iter().map(|r| r.to_domain()).collect())
    }

    async fn mark_notification_read(
        &self,
        user_id: Uuid,
        notification_id: Uuid,
    ) -> PortResult<()> {
        let result = sqlx::query(
            "UPDATE notifications SET read = TRUE WHERE id = $1 AND user_id = $2",
        )
        .bind(notification_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(unexpected)?;

        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Notification {} not found",
                notification_id
            )));
        }
        Ok(())
    }
}

//=========================================================================================
// `JobRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl JobRepository for PgStore {
    async fn insert(&self, job: NewJob) -> PortResult<Job> {
        let sql = format!(
            "INSERT INTO jobs \
                (title, company, location, description, skills_required, eligibility, \
                 last_date, posted_by) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8) RETURNING {JOB_COLUMNS}"
        );
        let record = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(&job.title)
            .bind(&job.company)
            .bind(&job.location)
            .bind(&job.description)
            .bind(&job.skills_required)
            .bind(&job.eligibility)
            .bind(job.last_date)
            .bind(job.posted_by)
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        record.to_domain()
    }

    async fn get(&self, job_id: Uuid) -> PortResult<Job> {
        let sql = format!("SELECT {JOB_COLUMNS} FROM jobs WHERE id = $1");
        let record = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(job_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Job {} not found", job_id))
                }
                _ => unexpected(e),
            })?;
        record.to_domain()
    }

    async fn list_active(&self, filter: JobFilter) -> PortResult<Vec<Job>> {
        let page = filter.page.max(1);
        let offset = (page - 1) as i64 * filter.page_size as i64;
        let sql = format!(
            "SELECT {JOB_COLUMNS} FROM jobs \
             WHERE status = 'active' \
               AND ($1::text IS NULL OR title ILIKE '%' || $1 || '%') \
             ORDER BY created_at ASC LIMIT $2 OFFSET $3"
        );
        let records = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(&filter.search)
            .bind(filter.page_size as i64)
            .bind(offset)
            .fetch_all(&self.pool)
            .await
            .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn set_status(&self, job_id: Uuid, status: JobStatus) -> PortResult<Job> {
        let sql = format!("UPDATE jobs SET status = $2 WHERE id = $1 RETURNING {JOB_COLUMNS}");
        let record = sqlx::query_as::<_, JobRecord>(&sql)
            .bind(job_id)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Job {} not found", job_id))
                }
                _ => unexpected(e),
            })?;
        record.to_domain()
    }

    async fn count(&self) -> PortResult<u64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM jobs")
            .fetch_one(&self.pool)
            .await
            .map_err(unexpected)?;
        Ok(count as u64)
    }
}

//=========================================================================================
// `ApplicationRepository` Trait Implementation
//=========================================================================================

#[async_trait]
impl ApplicationRepository for PgStore {
    async fn insert(&self, application: NewApplication) -> PortResult<Application> {
        // The unique (student_id, job_id) constraint decides duplicate
        // races; its rejection surfaces here as Conflict.
        let sql = format!(
            "INSERT INTO applications (student_id, job_id, resume) \
             VALUES ($1, $2, $3) RETURNING {APPLICATION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, ApplicationRecord>(&sql)
            .bind(application.student_id)
            .bind(application.job_id)
            .bind(&application.resume)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    PortError::Conflict(format!(
                        "student {} already applied to job {}",
                        application.student_id, application.job_id
                    ))
                } else {
                    unexpected(e)
                }
            })?;
        record.to_domain()
    }

    async fn get(&self, application_id: Uuid) -> PortResult<Application> {
        let sql = format!("SELECT {APPLICATION_COLUMNS} FROM applications WHERE id = $1");
        let record = sqlx::query_as::<_, ApplicationRecord>(&sql)
            .bind(application_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Application {} not found", application_id))
                }
                _ => unexpected(e),
            })?;
        record.to_domain()
    }

    async fn find_by_student_and_job(
        &self,
        student_id: Uuid,
        job_id: Uuid,
    ) -> PortResult<Option<Application>> {
        let sql = format!(
            "SELECT {APPLICATION_COLUMNS} FROM applications \
             WHERE student_id = $1 AND job_id = $2"
        );
        let record = sqlx::query_as::<_, ApplicationRecord>(&sql)
            .bind(student_id)
            .bind(job_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(unexpected)?;
        record.map(|r| r.to_domain()).transpose()
    }

    async fn list_for_student(&self, student_id: Uuid) -> PortResult<Vec<StudentApplication>> {
        let records = sqlx::query_as::<_, StudentApplicationRecord>(
            "SELECT a.id, a.student_id, a.job_id, a.resume, a.status, a.applied_at, \
                    j.title AS job_title, j.company AS job_company, \
                    j.location AS job_location, j.status AS job_status \
             FROM applications a \
             LEFT JOIN jobs j ON j.id = a.job_id \
             WHERE a.student_id = $1 \
             ORDER BY a.applied_at DESC",
        )
        .bind(student_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn list_for_job(&self, job_id: Uuid) -> PortResult<Vec<JobApplication>> {
        let records = sqlx::query_as::<_, JobApplicationRecord>(
            "SELECT a.id, a.student_id, a.job_id, a.resume, a.status, a.applied_at, \
                    u.name AS student_name, u.email AS student_email \
             FROM applications a \
             LEFT JOIN users u ON u.id = a.student_id \
             WHERE a.job_id = $1 \
             ORDER BY a.applied_at DESC",
        )
        .bind(job_id)
        .fetch_all(&self.pool)
        .await
        .map_err(unexpected)?;
        records.into_iter().map(|r| r.to_domain()).collect()
    }

    async fn set_status(
        &self,
        application_id: Uuid,
        status: ApplicationStatus,
    ) -> PortResult<Application> {
        let sql = format!(
            "UPDATE applications SET status = $2 WHERE id = $1 RETURNING {APPLICATION_COLUMNS}"
        );
        let record = sqlx::query_as::<_, ApplicationRecord>(&sql)
            .bind(application_id)
            .bind(status.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| match e {
                sqlx::Error::RowNotFound => {
                    PortError::NotFound(format!("Application {} not found", application_id))
                }
                _ => unexpected(e),
            })?;
        record.to_domain()
    }

    async fn delete(&self, application_id: Uuid) -> PortResult<()> {
        let result = sqlx::query("DELETE FROM applications WHERE id = $1")
            .bind(application_id)
            .execute(&self.pool)
            .await
            .map_err(unexpected)?;
        if result.rows_affected() == 0 {
            return Err(PortError::NotFound(format!(
                "Application {} not found",
                application_id
            )));
        }
        Ok(())
    }
}
