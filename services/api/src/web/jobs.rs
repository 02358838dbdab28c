//! services/api/src/web/jobs.rs
//!
//! Public job catalog endpoints: listing with search and pagination, and
//! the total count shown on the landing page.

use axum::{
    extract::{Query, State},
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use udaan_core::domain::Job;
use udaan_core::ports::JobFilter;

use crate::config::Config;
use crate::web::error::HttpError;
use crate::web::state::AppState;

//=========================================================================================
// Request/Response Types
//=========================================================================================

#[derive(Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ListJobsQuery {
    /// Case-insensitive substring match on the title.
    pub search: Option<String>,
    /// 1-based page number.
    pub page: Option<u32>,
    pub page_size: Option<u32>,
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobResponse {
    pub id: Uuid,
    pub title: String,
    pub company: String,
    pub location: Option<String>,
    pub description: Option<String>,
    pub skills_required: Vec<String>,
    pub eligibility: String,
    pub last_date: NaiveDate,
    pub status: String,
}

impl JobResponse {
    pub fn from_domain(job: Job) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            description: job.description,
            skills_required: job.skills_required,
            eligibility: job.eligibility,
            last_date: job.last_date,
            status: job.status.as_str().to_string(),
        }
    }
}

#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct JobCountResponse {
    pub total_jobs: u64,
}

/// Resolves the caller's paging parameters against the configured bounds.
fn page_filter(config: &Config, query: ListJobsQuery) -> JobFilter {
    let page_size = query
        .page_size
        .unwrap_or(config.jobs_page_size)
        .clamp(1, config.jobs_page_size_max);
    JobFilter {
        search: query.search.filter(|s| !s.trim().is_empty()),
        page: query.page.unwrap_or(1).max(1),
        page_size,
    }
}

//=========================================================================================
// Handlers
//=========================================================================================

/// GET /jobs - Active postings, optionally filtered by title.
#[utoipa::path(
    get,
    path = "/jobs",
    params(ListJobsQuery),
    responses(
        (status = 200, description = "Active job postings", body = [JobResponse])
    )
)]
pub async fn list_jobs_handler(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListJobsQuery>,
) -> Result<impl IntoResponse, HttpError> {
    let filter = page_filter(&state.config, query);
    let jobs = state.jobs.list_active(filter).await?;
    let body: Vec<JobResponse> = jobs.into_iter().map(JobResponse::from_domain).collect();
    Ok(Json(body))
}

/// GET /jobs/count - Total number of postings regardless of status.
#[utoipa::path(
    get,
    path = "/jobs/count",
    responses(
        (status = 200, description = "Total job count", body = JobCountResponse)
    )
)]
pub async fn count_jobs_handler(
    State(state): State<Arc<AppState>>,
) -> Result<impl IntoResponse, HttpError> {
    let total_jobs = state.jobs.count().await?;
    Ok(Json(JobCountResponse { total_jobs }))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config {
            bind_address: "127.0.0.1:3000".parse().unwrap(),
            database_url: "postgres://localhost/udaan".to_string(),
            log_level: tracing::Level::INFO,
            jwt_secret: "secret".to_string(),
            token_ttl_days: 7,
            jobs_page_size: 20,
            jobs_page_size_max: 100,
        }
    }

    fn query(page: Option<u32>, page_size: Option<u32>) -> ListJobsQuery {
        ListJobsQuery {
            search: None,
            page,
            page_size,
        }
    }

    #[test]
    fn paging_defaults_apply_when_absent() {
        let filter = page_filter(&config(), query(None, None));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 20);
    }

    #[test]
    fn page_size_is_clamped_to_the_configured_maximum() {
        let filter = page_filter(&config(), query(Some(3), Some(5000)));
        assert_eq!(filter.page, 3);
        assert_eq!(filter.page_size, 100);

        let filter = page_filter(&config(), query(Some(0), Some(0)));
        assert_eq!(filter.page, 1);
        assert_eq!(filter.page_size, 1);
    }

    #[test]
    fn blank_search_terms_are_dropped() {
        let q = ListJobsQuery {
            search: Some("   ".to_string()),
            page: None,
            page_size: None,
        };
        let filter = page_filter(&config(), q);
        assert!(filter.search.is_none());
    }
}
