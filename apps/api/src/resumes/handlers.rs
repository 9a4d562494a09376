//! Axum route handlers for the resumes API.
//!
//! Upload validation is synchronous: a rejected file never creates a resume
//! row. Accepted files are spooled to the upload directory, recorded with
//! `processed = false`, and handed to the pipeline queue; the response
//! carries the id the client is expected to poll.

use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use bytes::Bytes;
use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{info, warn};
use uuid::Uuid;

use crate::errors::AppError;
use crate::extraction::{ALLOWED_MIME_TYPES, MIME_DOC, MIME_DOCX, MIME_PDF};
use crate::models::job::JobWithRecommendation;
use crate::models::resume::{ExtractedData, NewResume};
use crate::pipeline::ProcessTask;
use crate::state::AppState;

/// Upload size cap; the UI enforces the same limit client-side.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024; // 10MB

// ────────────────────────────────────────────────────────────────────────────
// Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub resume_id: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResumeStatusResponse {
    pub id: i64,
    pub processed: bool,
    pub extracted_data: Option<ExtractedData>,
    pub uploaded_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RecommendationsResponse {
    pub recommendations: Vec<JobWithRecommendation>,
    pub statistics: MatchStatistics,
}

#[derive(Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchStatistics {
    pub high_match_count: usize,
    pub medium_match_count: usize,
    pub total_jobs_count: usize,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

struct UploadedFile {
    original_name: String,
    mime_type: String,
    data: Bytes,
}

/// POST /api/resumes/upload
///
/// Accepts a single file in the `resume` multipart field, spools it, creates
/// the resume row and enqueues processing. The caller polls
/// `GET /api/resumes/:id` until `processed` flips.
pub async fn handle_upload(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    let upload = read_resume_field(multipart).await?;
    validate_upload(&upload.mime_type, upload.data.len())?;

    let stored_name = stored_file_name(&upload.mime_type);
    let path = std::path::Path::new(&state.config.upload_dir).join(&stored_name);
    tokio::fs::write(&path, &upload.data)
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("failed to spool upload: {e}")))?;

    let resume = match state
        .storage
        .create_resume(NewResume {
            file_name: stored_name,
            original_name: upload.original_name,
            file_size: upload.data.len() as i64,
            mime_type: upload.mime_type.clone(),
        })
        .await
    {
        Ok(resume) => resume,
        Err(e) => {
            remove_spooled(&path).await;
            return Err(e);
        }
    };

    if let Err(e) = state.pipeline.enqueue(ProcessTask {
        resume_id: resume.id,
        path: path.clone(),
        mime_type: upload.mime_type,
    }) {
        // The row already exists; degrade it so polling clients terminate,
        // then surface the rejection.
        warn!(resume_id = resume.id, "enqueue failed: {e}");
        remove_spooled(&path).await;
        if let Err(e) = state
            .storage
            .mark_processed(resume.id, ExtractedData::degraded())
            .await
        {
            warn!(resume_id = resume.id, "failed to degrade rejected upload: {e}");
        }
        return Err(e);
    }

    info!(
        resume_id = resume.id,
        size = resume.file_size,
        mime = %resume.mime_type,
        "resume uploaded"
    );

    Ok(Json(UploadResponse {
        success: true,
        resume_id: resume.id,
        message: "Resume uploaded successfully. Processing will begin shortly.".to_string(),
    }))
}

/// GET /api/resumes/:id
///
/// Processing status plus extracted data once available. Clients poll this
/// on a short interval until `processed` is true.
pub async fn handle_get_resume(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<ResumeStatusResponse>, AppError> {
    let resume = state
        .storage
        .resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    Ok(Json(ResumeStatusResponse {
        id: resume.id,
        processed: resume.processed,
        extracted_data: resume.extracted_data,
        uploaded_at: resume.uploaded_at,
    }))
}

/// GET /api/resumes/:id/recommendations
///
/// Scored jobs for a processed resume plus match-band statistics.
pub async fn handle_get_recommendations(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<Json<RecommendationsResponse>, AppError> {
    let resume = state
        .storage
        .resume(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Resume not found".to_string()))?;

    if !resume.processed {
        return Err(AppError::Validation("Resume not yet processed".to_string()));
    }

    let recommendations = state.storage.recommendations_for(id).await?;
    let statistics = compute_statistics(&recommendations);

    Ok(Json(RecommendationsResponse {
        recommendations,
        statistics,
    }))
}

// ────────────────────────────────────────────────────────────────────────────
// Helpers
// ────────────────────────────────────────────────────────────────────────────

async fn read_resume_field(mut multipart: Multipart) -> Result<UploadedFile, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart upload: {e}")))?
    {
        if field.name() != Some("resume") {
            continue;
        }

        let original_name = field.file_name().unwrap_or("resume").to_string();
        let mime_type = field
            .content_type()
            .ok_or_else(|| AppError::Validation("Missing file content type".to_string()))?
            .to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        return Ok(UploadedFile {
            original_name,
            mime_type,
            data,
        });
    }

    Err(AppError::Validation("No file uploaded".to_string()))
}

fn validate_upload(mime_type: &str, size: usize) -> Result<(), AppError> {
    if !ALLOWED_MIME_TYPES.contains(&mime_type) {
        return Err(AppError::Validation(
            "Invalid file type. Only PDF, DOC, and DOCX files are allowed.".to_string(),
        ));
    }
    if size == 0 {
        return Err(AppError::Validation("No file uploaded".to_string()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(AppError::Validation(
            "File too large. Maximum size is 10MB.".to_string(),
        ));
    }
    Ok(())
}

/// Stored name is a fresh UUID; the client's name is kept on the row only.
fn stored_file_name(mime_type: &str) -> String {
    let ext = match mime_type {
        MIME_PDF => "pdf",
        MIME_DOC => "doc",
        MIME_DOCX => "docx",
        _ => "bin",
    };
    format!("{}.{ext}", Uuid::new_v4())
}

async fn remove_spooled(path: &std::path::Path) {
    if let Err(e) = tokio::fs::remove_file(path).await {
        warn!(path = %path.display(), "failed to remove spooled upload: {e}");
    }
}

/// High ≥ 80, medium 60–79, total = number of recommendation rows.
fn compute_statistics(recommendations: &[JobWithRecommendation]) -> MatchStatistics {
    MatchStatistics {
        high_match_count: recommendations
            .iter()
            .filter(|r| r.match_score >= 80)
            .count(),
        medium_match_count: recommendations
            .iter()
            .filter(|r| r.match_score >= 60 && r.match_score < 80)
            .count(),
        total_jobs_count: recommendations.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::job::Job;
    use chrono::Utc;

    #[test]
    fn test_validate_rejects_disallowed_mime() {
        let err = validate_upload("text/plain", 1024).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn test_validate_rejects_oversize_and_empty() {
        assert!(validate_upload(MIME_PDF, MAX_UPLOAD_BYTES + 1).is_err());
        assert!(validate_upload(MIME_PDF, 0).is_err());
    }

    #[test]
    fn test_validate_accepts_each_allowed_type_at_limit() {
        for mime in ALLOWED_MIME_TYPES {
            assert!(validate_upload(mime, MAX_UPLOAD_BYTES).is_ok());
        }
    }

    #[test]
    fn test_stored_file_name_extension_follows_mime() {
        assert!(stored_file_name(MIME_PDF).ends_with(".pdf"));
        assert!(stored_file_name(MIME_DOC).ends_with(".doc"));
        assert!(stored_file_name(MIME_DOCX).ends_with(".docx"));
    }

    fn rec(score: i32) -> JobWithRecommendation {
        let job = Job {
            id: 1,
            title: "X".to_string(),
            company: "Y".to_string(),
            location: "Z".to_string(),
            job_type: "Remote".to_string(),
            level: "Mid".to_string(),
            salary: "$1".to_string(),
            description: "d".to_string(),
            required_skills: vec![],
            experience_years: 1,
            posted_date: Utc::now(),
        };
        JobWithRecommendation::with_match(job, score, vec![], String::new())
    }

    #[test]
    fn test_statistics_bands() {
        let recs = vec![rec(95), rec(80), rec(79), rec(60), rec(59), rec(10)];
        let stats = compute_statistics(&recs);
        assert_eq!(
            stats,
            MatchStatistics {
                high_match_count: 2,
                medium_match_count: 2,
                total_jobs_count: 6,
            }
        );
    }

    #[test]
    fn test_statistics_empty() {
        let stats = compute_statistics(&[]);
        assert_eq!(stats.total_jobs_count, 0);
        assert_eq!(stats.high_match_count, 0);
    }
}
