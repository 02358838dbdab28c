//! services/api/src/web/applications.rs
//!
//! Endpoints over the application workflow service: submitting,
//! withdrawing, listing, and reviewing applications.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use udaan_core::domain::{
    Application, ApplicationStatus, Identity, JobApplication, StudentApplication,
};

use crate::web::error::HttpError;
use crate::web::state::AppState;
use crate::web::students::MessageResponse;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplyRequest {
    pub job_id: Uuid,
    /// Resume snapshot to attach; the profile resume is used when absent.
    pub resume: Option<String>,
}

#[derive(Deserialize, ToSchema)]
pub struct SetStatusRequest {
    /// "applied", "pending", "accepted", or "rejected".
    pub status: String,
}

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListApplicationsQuery {
    pub student_id: Option<Uuid>,
    pub job_id: Option<Uuid>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub resume: Option<String>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
}

impl ApplicationResponse {
    fn from_domain(application: Application) -> Self {
        Self {
            id: application.id,
            student_id: application.student_id,
            job_id: application.job_id,
            resume: application.resume,
            status: application.status.as_str().to_string(),
            applied_at: application.applied_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobSummaryResponse {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub status: String,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentSummaryResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

/// An application as seen by its student, with the job summary joined.
/// `job` is null when the posting no longer exists.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentApplicationResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub resume: Option<String>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub job: Option<JobSummaryResponse>,
}

impl StudentApplicationResponse {
    fn from_domain(entry: StudentApplication) -> Self {
        Self {
            id: entry.application.id,
            student_id: entry.application.student_id,
            job_id: entry.application.job_id,
            resume: entry.application.resume,
            status: entry.application.status.as_str().to_string(),
            applied_at: entry.application.applied_at,
            job: entry.job.map(|j| JobSummaryResponse {
                id: j.id,
                title: j.title,
                company: j.company,
                location: j.location,
                status: j.status.as_str().to_string(),
            }),
        }
    }
}

/// An application as seen by a reviewer, with the applicant joined.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobApplicationResponse {
    pub id: Uuid,
    pub student_id: Uuid,
    pub job_id: Uuid,
    pub resume: Option<String>,
    pub status: String,
    pub applied_at: DateTime<Utc>,
    pub student: Option<StudentSummaryResponse>,
}

impl JobApplicationResponse {
    fn from_domain(entry: JobApplication) -> Self {
        Self {
            id: entry.application.id,
            student_id: entry.application.student_id,
            job_id: entry.application.job_id,
            resume: entry.application.resume,
            status: entry.application.status.as_str().to_string(),
            applied_at: entry.application.applied_at,
            student: entry.student.map(|s| StudentSummaryResponse {
                id: s.id,
                name: s.name,
                email: s.email,
            }),
        }
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// POST /applications - Apply for a job.
#[utoipa::path(
    post,
    path = "/applications",
    request_body = ApplyRequest,
    responses(
        (status = 201, description = "Application submitted", body = ApplicationResponse),
        (status = 400, description = "Already applied, or the job is closed"),
        (status = 401, description = "Missing or invalid token"),
        (status = 404, description = "Job not found")
    )
)]
pub async fn apply_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<ApplyRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let application = state
        .workflow
        .apply(&identity, identity.user_id, req.job_id, req.resume)
        .await?;
    Ok((
        StatusCode::CREATED,
        Json(ApplicationResponse::from_domain(application)),
    ))
}

/// DELETE /applications/{id} - Withdraw an application.
///
/// Allowed for the owning student, the job's recruiter, or an admin.
#[utoipa::path(
    delete,
    path = "/applications/{id}",
    params(("id" = Uuid, Path, description = "The application to withdraw")),
    responses(
        (status = 200, description = "Application withdrawn", body = MessageResponse),
        (status = 403, description = "Caller may not withdraw this application"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn withdraw_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(application_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    state.workflow.withdraw(&identity, application_id).await?;
    Ok(Json(MessageResponse {
        message: "Application withdrawn successfully".to_string(),
    }))
}

/// GET /applications - List applications for a student or for a job.
///
/// Exactly one of `studentId` and `jobId` must be given. Student listings
/// are visible to the student themselves and admins; job listings require
/// review privilege over the job.
#[utoipa::path(
    get,
    path = "/applications",
    params(ListApplicationsQuery),
    responses(
        (status = 200, description = "Applications, most recent first"),
        (status = 400, description = "Neither or both filters given"),
        (status = 403, description = "Caller may not view this listing")
    )
)]
pub async fn list_applications_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Query(query): Query<ListApplicationsQuery>,
) -> Result<Response, HttpError> {
    match (query.student_id, query.job_id) {
        (Some(student_id), None) => {
            let listed = state.workflow.list_by_student(&identity, student_id).await?;
            let body: Vec<StudentApplicationResponse> = listed
                .into_iter()
                .map(StudentApplicationResponse::from_domain)
                .collect();
            Ok(Json(body).into_response())
        }
        (None, Some(job_id)) => {
            let listed = state.workflow.list_by_job(&identity, job_id).await?;
            let body: Vec<JobApplicationResponse> = listed
                .into_iter()
                .map(JobApplicationResponse::from_domain)
                .collect();
            Ok(Json(body).into_response())
        }
        _ => Err(HttpError::validation(
            "exactly one of studentId and jobId is required",
        )),
    }
}

/// PATCH /applications/{id}/status - Review an application.
#[utoipa::path(
    patch,
    path = "/applications/{id}/status",
    params(("id" = Uuid, Path, description = "The application under review")),
    request_body = SetStatusRequest,
    responses(
        (status = 200, description = "The updated application", body = ApplicationResponse),
        (status = 403, description = "Caller may not review this application"),
        (status = 404, description = "Application not found")
    )
)]
pub async fn set_status_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(application_id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let status = ApplicationStatus::parse(&req.status)
        .ok_or_else(|| HttpError::validation(format!("unknown status '{}'", req.status)))?;
    let application = state
        .workflow
        .set_status(&identity, application_id, status)
        .await?;
    Ok(Json(ApplicationResponse::from_domain(application)))
}
