//! services/api/src/web/students.rs
//!
//! Endpoints for the authenticated user's own data: profile, notification
//! inbox, and the student dashboard.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    Extension, Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::ToSchema;
use uuid::Uuid;

use udaan_core::domain::{ApplicationStatus, Identity, Notification, ProfilePatch, User};
use udaan_core::policy::{authorize, Action};
use udaan_core::ports::JobFilter;

use crate::web::error::HttpError;
use crate::web::jobs::JobResponse;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ProfileResponse {
    pub resume: Option<String>,
    pub cgpa: Option<f64>,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub skills: Vec<String>,
    pub phone: Option<String>,
    pub college: Option<String>,
}

/// A user as returned by the API. The password hash never appears here.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub profile: ProfileResponse,
}

impl UserResponse {
    pub fn from_domain(user: User) -> Self {
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role.as_str().to_string(),
            profile: ProfileResponse {
                resume: user.profile.resume,
                cgpa: user.profile.cgpa,
                branch: user.profile.branch,
                year: user.profile.year,
                skills: user.profile.skills,
                phone: user.profile.phone,
                college: user.profile.college,
            },
        }
    }
}

/// Partial profile update; absent fields are preserved.
#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub resume: Option<String>,
    pub cgpa: Option<f64>,
    pub branch: Option<String>,
    pub year: Option<i32>,
    pub skills: Option<Vec<String>>,
    pub phone: Option<String>,
    pub college: Option<String>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    pub id: Uuid,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl NotificationResponse {
    fn from_domain(notification: Notification) -> Self {
        Self {
            id: notification.id,
            message: notification.message,
            read: notification.read,
            created_at: notification.created_at,
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_jobs: usize,
    pub applied: usize,
    pub accepted: usize,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    pub student: UserResponse,
    pub jobs: Vec<JobResponse>,
    pub stats: DashboardStats,
}

#[derive(Serialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /me/profile - The caller's own record, password excluded.
#[utoipa::path(
    get,
    path = "/me/profile",
    responses(
        (status = 200, description = "The caller's user record", body = UserResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn get_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, HttpError> {
    let user = state.users.get(identity.user_id).await?;
    Ok(Json(UserResponse::from_domain(user)))
}

/// PUT /me/profile - Merge the provided fields over the stored profile.
///
/// Only students maintain a profile; other roles get 403.
#[utoipa::path(
    put,
    path = "/me/profile",
    request_body = UpdateProfileRequest,
    responses(
        (status = 200, description = "The updated user record", body = UserResponse),
        (status = 401, description = "Missing or invalid token"),
        (status = 403, description = "Caller is not a student")
    )
)]
pub async fn update_profile_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<impl IntoResponse, HttpError> {
    let action = Action::UpdateProfile {
        user_id: identity.user_id,
    };
    if !authorize(&identity, &action) {
        return Err(HttpError::forbidden("only students may update a profile"));
    }

    let patch = ProfilePatch {
        name: req.name,
        resume: req.resume,
        cgpa: req.cgpa,
        branch: req.branch,
        year: req.year,
        skills: req.skills,
        phone: req.phone,
        college: req.college,
    };
    let user = state.users.update_profile(identity.user_id, patch).await?;
    Ok(Json(UserResponse::from_domain(user)))
}

/// GET /me/notifications - The caller's inbox in chronological order.
#[utoipa::path(
    get,
    path = "/me/notifications",
    responses(
        (status = 200, description = "The caller's notifications", body = [NotificationResponse]),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn list_notifications_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, HttpError> {
    let notifications = state.users.list_notifications(identity.user_id).await?;
    let body: Vec<NotificationResponse> = notifications
        .into_iter()
        .map(NotificationResponse::from_domain)
        .collect();
    Ok(Json(body))
}

/// PATCH /me/notifications/{id} - Mark one of the caller's notifications
/// read. A foreign or missing id yields 404.
#[utoipa::path(
    patch,
    path = "/me/notifications/{id}",
    params(("id" = Uuid, Path, description = "The notification to mark read")),
    responses(
        (status = 200, description = "Marked read", body = MessageResponse),
        (status = 404, description = "No such notification in the caller's inbox")
    )
)]
pub async fn mark_notification_read_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
    Path(notification_id): Path<Uuid>,
) -> Result<impl IntoResponse, HttpError> {
    state
        .users
        .mark_notification_read(identity.user_id, notification_id)
        .await?;
    Ok((
        StatusCode::OK,
        Json(MessageResponse {
            message: "Notification marked as read".to_string(),
        }),
    ))
}

/// GET /me/dashboard - The student dashboard: profile, open jobs, and
/// application stats.
#[utoipa::path(
    get,
    path = "/me/dashboard",
    responses(
        (status = 200, description = "Dashboard data", body = DashboardResponse),
        (status = 401, description = "Missing or invalid token")
    )
)]
pub async fn dashboard_handler(
    State(state): State<Arc<AppState>>,
    Extension(identity): Extension<Identity>,
) -> Result<impl IntoResponse, HttpError> {
    let student = state.users.get(identity.user_id).await?;
    let jobs = state
        .jobs
        .list_active(JobFilter {
            search: None,
            page: 1,
            page_size: state.config.jobs_page_size_max,
        })
        .await?;
    let applications = state
        .workflow
        .list_by_student(&identity, identity.user_id)
        .await?;

    let accepted = applications
        .iter()
        .filter(|a| a.application.status == ApplicationStatus::Accepted)
        .count();
    let stats = DashboardStats {
        total_jobs: jobs.len(),
        applied: applications.len(),
        accepted,
    };

    Ok(Json(DashboardResponse {
        student: UserResponse::from_domain(student),
        jobs: jobs.into_iter().map(JobResponse::from_domain).collect(),
        stats,
    }))
}
