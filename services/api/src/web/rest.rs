//! services/api/src/web/rest.rs
//!
//! The master definition for the OpenAPI specification.

use utoipa::OpenApi;

use crate::web::applications::{
    ApplicationResponse, ApplyRequest, JobApplicationResponse, JobSummaryResponse,
    SetStatusRequest, StudentApplicationResponse, StudentSummaryResponse,
};
use crate::web::auth::{LoginRequest, LoginResponse, RegisterRequest};
use crate::web::error::{ErrorBody, ErrorDetail};
use crate::web::jobs::{JobCountResponse, JobResponse};
use crate::web::students::{
    DashboardResponse, DashboardStats, MessageResponse, NotificationResponse, ProfileResponse,
    UpdateProfileRequest, UserResponse,
};

#[derive(OpenApi)]
#[openapi(
    paths(
        crate::web::auth::register_handler,
        crate::web::auth::login_handler,
        crate::web::jobs::list_jobs_handler,
        crate::web::jobs::count_jobs_handler,
        crate::web::applications::apply_handler,
        crate::web::applications::withdraw_handler,
        crate::web::applications::list_applications_handler,
        crate::web::applications::set_status_handler,
        crate::web::students::get_profile_handler,
        crate::web::students::update_profile_handler,
        crate::web::students::list_notifications_handler,
        crate::web::students::mark_notification_read_handler,
        crate::web::students::dashboard_handler,
    ),
    components(
        schemas(
            RegisterRequest,
            LoginRequest,
            LoginResponse,
            ApplyRequest,
            SetStatusRequest,
            ApplicationResponse,
            StudentApplicationResponse,
            JobApplicationResponse,
            JobSummaryResponse,
            StudentSummaryResponse,
            JobResponse,
            JobCountResponse,
            UserResponse,
            ProfileResponse,
            UpdateProfileRequest,
            NotificationResponse,
            DashboardResponse,
            DashboardStats,
            MessageResponse,
            ErrorBody,
            ErrorDetail,
        )
    ),
    tags(
        (name = "Udaan Placement API", description = "API endpoints for the campus placement portal.")
    )
)]
pub struct ApiDoc;
