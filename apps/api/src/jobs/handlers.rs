//! Axum route handlers for the jobs API.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::{Deserialize, Deserializer};

use crate::errors::AppError;
use crate::models::job::{Job, JobWithRecommendation};
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParams {
    pub query: Option<String>,
    pub level: Option<String>,
    // The UI sends `resumeId=` with no value before an upload exists.
    #[serde(default, deserialize_with = "empty_as_none")]
    pub resume_id: Option<i64>,
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<String>::deserialize(deserializer)?;
    match value.as_deref() {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some).map_err(serde::de::Error::custom),
    }
}

/// GET /api/jobs
///
/// All seeded jobs, posting dates ISO-formatted by serialization.
pub async fn handle_list_jobs(State(state): State<AppState>) -> Result<Json<Vec<Job>>, AppError> {
    Ok(Json(state.storage.jobs().await?))
}

/// GET /api/jobs/search?query=&level=&resumeId=
///
/// With `resumeId`, the base set is that resume's scored recommendations;
/// without it, every job with a zero score. Filters are a linear scan over
/// the full set, no pagination.
pub async fn handle_search_jobs(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<JobWithRecommendation>>, AppError> {
    let base = match params.resume_id {
        Some(resume_id) => state.storage.recommendations_for(resume_id).await?,
        None => state
            .storage
            .jobs()
            .await?
            .into_iter()
            .map(JobWithRecommendation::unscored)
            .collect(),
    };

    Ok(Json(apply_filters(
        base,
        params.query.as_deref(),
        params.level.as_deref(),
    )))
}

/// Substring filter over title/company/description/skills (case-insensitive)
/// and exact, case-sensitive level match. `"All Levels"` disables the level
/// filter, mirroring the UI's default dropdown value.
fn apply_filters(
    jobs: Vec<JobWithRecommendation>,
    query: Option<&str>,
    level: Option<&str>,
) -> Vec<JobWithRecommendation> {
    let mut filtered = jobs;

    if let Some(query) = query.filter(|q| !q.trim().is_empty()) {
        let term = query.to_lowercase();
        filtered.retain(|job| {
            job.title.to_lowercase().contains(&term)
                || job.company.to_lowercase().contains(&term)
                || job.description.to_lowercase().contains(&term)
                || job
                    .required_skills
                    .iter()
                    .any(|skill| skill.to_lowercase().contains(&term))
        });
    }

    if let Some(level) = level.filter(|l| !l.is_empty() && *l != "All Levels") {
        filtered.retain(|job| job.level == level);
    }

    filtered
}
