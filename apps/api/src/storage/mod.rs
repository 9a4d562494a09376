//! Repository layer — one `Storage` trait, two backends.
//!
//! `AppState` carries an `Arc<dyn Storage>` constructed once at startup and
//! injected everywhere; nothing in the crate reaches for a global store.
//! `MemStorage` is the default backend (and the one tests use); `PgStorage`
//! takes over when `DATABASE_URL` is set.

pub mod memory;
pub mod postgres;

use async_trait::async_trait;

use crate::errors::AppError;
use crate::models::job::{
    Job, JobRecommendation, JobWithRecommendation, NewJob, NewRecommendation,
};
use crate::models::resume::{ExtractedData, NewResume, Resume};

#[async_trait]
pub trait Storage: Send + Sync {
    /// Inserts a resume with `processed = false` and no extracted data,
    /// assigning the next strictly increasing id.
    async fn create_resume(&self, new: NewResume) -> Result<Resume, AppError>;

    async fn resume(&self, id: i64) -> Result<Option<Resume>, AppError>;

    /// Attaches extracted data and flips `processed` to true, the single
    /// mutation a resume row ever sees. Returns `None` for an unknown id.
    async fn mark_processed(
        &self,
        id: i64,
        data: ExtractedData,
    ) -> Result<Option<Resume>, AppError>;

    /// Seed-time only; jobs are immutable once created.
    async fn create_job(&self, new: NewJob) -> Result<Job, AppError>;

    /// All jobs in id order.
    async fn jobs(&self) -> Result<Vec<Job>, AppError>;

    async fn insert_recommendations(
        &self,
        resume_id: i64,
        recs: Vec<NewRecommendation>,
    ) -> Result<Vec<JobRecommendation>, AppError>;

    /// Recommendations for a resume joined with their job rows, sorted by
    /// match score descending. Recommendations whose job row is missing are
    /// skipped rather than surfaced as an error.
    async fn recommendations_for(
        &self,
        resume_id: i64,
    ) -> Result<Vec<JobWithRecommendation>, AppError>;

    async fn delete_recommendations(&self, resume_id: i64) -> Result<(), AppError>;
}
