pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::jobs::handlers as job_handlers;
use crate::resumes::handlers as resume_handlers;
use crate::resumes::handlers::MAX_UPLOAD_BYTES;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Resume API
        .route(
            "/api/resumes/upload",
            post(resume_handlers::handle_upload),
        )
        .route("/api/resumes/:id", get(resume_handlers::handle_get_resume))
        .route(
            "/api/resumes/:id/recommendations",
            get(resume_handlers::handle_get_recommendations),
        )
        // Jobs API
        .route("/api/jobs/search", get(job_handlers::handle_search_jobs))
        .route("/api/jobs", get(job_handlers::handle_list_jobs))
        // Room for multipart framing on top of the 10MB file cap.
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024))
        .with_state(state)
}
