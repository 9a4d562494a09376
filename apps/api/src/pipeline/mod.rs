//! Upload-and-process pipeline.
//!
//! Uploads are not processed inline: the handler enqueues a `ProcessTask`
//! onto a bounded channel drained by a fixed pool of worker tasks, so
//! in-flight work is observable and capped instead of one detached task
//! per upload. A full queue is surfaced to the caller as 503.
//!
//! Worker steps per task: extract text, parse it with the classifier,
//! attach the extracted data, score the job list, replace the resume's
//! recommendation set, and finally remove the spooled upload. Any failure
//! along the way degrades the resume to a placeholder record, so
//! `processed` always reaches true, success or not.

use std::path::PathBuf;
use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::errors::AppError;
use crate::extraction::TextExtractor;
use crate::matching::Classifier;
use crate::models::resume::ExtractedData;
use crate::storage::Storage;

#[derive(Debug, Clone)]
pub struct ProcessTask {
    pub resume_id: i64,
    pub path: PathBuf,
    pub mime_type: String,
}

/// Dependencies shared by every worker.
#[derive(Clone)]
pub struct PipelineContext {
    pub storage: Arc<dyn Storage>,
    pub extractor: Arc<dyn TextExtractor>,
    pub classifier: Arc<dyn Classifier>,
}

/// Owning side of the worker pool; held by `main` for shutdown.
pub struct Pipeline {
    tx: async_channel::Sender<ProcessTask>,
    workers: Vec<JoinHandle<()>>,
}

/// Cloneable enqueue handle carried on `AppState`.
#[derive(Clone)]
pub struct PipelineHandle {
    tx: async_channel::Sender<ProcessTask>,
}

impl Pipeline {
    pub fn start(ctx: PipelineContext, worker_count: usize, capacity: usize) -> Self {
        let (tx, rx) = async_channel::bounded::<ProcessTask>(capacity);
        let mut workers = Vec::with_capacity(worker_count);
        for idx in 0..worker_count {
            let rx = rx.clone();
            let ctx = ctx.clone();
            workers.push(tokio::spawn(async move { run_worker(idx, rx, ctx).await }));
        }
        Self { tx, workers }
    }

    pub fn handle(&self) -> PipelineHandle {
        PipelineHandle {
            tx: self.tx.clone(),
        }
    }

    /// Closes the queue and waits for workers to drain in-flight tasks.
    pub async fn shutdown(self) {
        self.tx.close();
        for worker in self.workers {
            if let Err(e) = worker.await {
                error!("pipeline worker panicked: {e}");
            }
        }
    }
}

impl PipelineHandle {
    /// Non-blocking enqueue; a full queue surfaces as `QueueFull` so the
    /// upload handler answers immediately instead of stalling the client.
    pub fn enqueue(&self, task: ProcessTask) -> Result<(), AppError> {
        self.tx.try_send(task).map_err(|e| match e {
            async_channel::TrySendError::Full(_) => AppError::QueueFull,
            async_channel::TrySendError::Closed(_) => {
                AppError::Internal(anyhow::anyhow!("pipeline queue closed"))
            }
        })
    }
}

async fn run_worker(idx: usize, rx: async_channel::Receiver<ProcessTask>, ctx: PipelineContext) {
    info!(worker = idx, "pipeline worker started");
    while let Ok(task) = rx.recv().await {
        process_resume(&ctx, task).await;
    }
    info!(worker = idx, "pipeline worker stopped");
}

/// Runs the full pipeline for one resume. Never returns an error: failures
/// are folded into the degraded record so the resume still terminates.
pub async fn process_resume(ctx: &PipelineContext, task: ProcessTask) {
    let resume_id = task.resume_id;
    info!(resume_id, "processing resume");

    match run_steps(ctx, &task).await {
        Ok(count) => info!(resume_id, recommendations = count, "resume processed"),
        Err(e) => {
            warn!(resume_id, "processing failed, storing degraded record: {e}");
            if let Err(e) = ctx
                .storage
                .mark_processed(resume_id, ExtractedData::degraded())
                .await
            {
                error!(resume_id, "failed to store degraded record: {e}");
            }
        }
    }

    // The spooled upload is removed whether processing succeeded or not.
    if let Err(e) = tokio::fs::remove_file(&task.path).await {
        warn!(resume_id, path = %task.path.display(), "failed to remove upload: {e}");
    }
}

async fn run_steps(ctx: &PipelineContext, task: &ProcessTask) -> Result<usize, AppError> {
    let text = ctx
        .extractor
        .extract(&task.path, &task.mime_type)
        .await
        .map_err(|e| AppError::Extraction(e.to_string()))?;

    let extracted = ctx.classifier.parse_resume(&text).await?;

    ctx.storage
        .mark_processed(task.resume_id, extracted.clone())
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Resume {} not found", task.resume_id)))?;

    let jobs = ctx.storage.jobs().await?;
    let scored = ctx.classifier.score_jobs(&extracted, &jobs).await?;

    // Replace, never append: reprocessing must leave exactly one set.
    ctx.storage.delete_recommendations(task.resume_id).await?;
    let stored = ctx
        .storage
        .insert_recommendations(task.resume_id, scored.into_iter().map(Into::into).collect())
        .await?;

    Ok(stored.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::path::Path;

    use crate::extraction::{MockExtractor, MIME_PDF};
    use crate::matching::ScoredJob;
    use crate::models::job::NewJob;
    use crate::models::resume::NewResume;
    use crate::storage::memory::MemStorage;

    struct StubClassifier {
        fail_parse: bool,
        scored: Vec<ScoredJob>,
    }

    #[async_trait]
    impl Classifier for StubClassifier {
        async fn parse_resume(&self, _resume_text: &str) -> Result<ExtractedData, AppError> {
            if self.fail_parse {
                return Err(AppError::Llm("model unavailable".to_string()));
            }
            Ok(ExtractedData {
                skills: vec!["React".to_string(), "Python".to_string()],
                experience: "5 years full-stack".to_string(),
                education: "BSc".to_string(),
                recent_role: "Senior Frontend Developer".to_string(),
                experience_years: 5.0,
                summary: "Full-stack engineer".to_string(),
            })
        }

        async fn score_jobs(
            &self,
            _extracted: &ExtractedData,
            _jobs: &[crate::models::job::Job],
        ) -> Result<Vec<ScoredJob>, AppError> {
            Ok(self.scored.clone())
        }
    }

    async fn context_with(
        classifier: StubClassifier,
    ) -> (PipelineContext, Arc<MemStorage>, i64, tempfile::TempDir) {
        let storage = Arc::new(MemStorage::new());
        storage
            .create_job(NewJob {
                title: "Frontend Developer".to_string(),
                company: "WebFlow Agency".to_string(),
                location: "Remote".to_string(),
                job_type: "Remote".to_string(),
                level: "Mid".to_string(),
                salary: "$80k - $110k".to_string(),
                description: "React work".to_string(),
                required_skills: vec!["React".to_string()],
                experience_years: 3,
            })
            .await
            .unwrap();
        let resume = storage
            .create_resume(NewResume {
                file_name: "stored.pdf".to_string(),
                original_name: "cv.pdf".to_string(),
                file_size: 100,
                mime_type: MIME_PDF.to_string(),
            })
            .await
            .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let ctx = PipelineContext {
            storage: Arc::clone(&storage) as Arc<dyn Storage>,
            extractor: Arc::new(MockExtractor),
            classifier: Arc::new(classifier),
        };
        (ctx, storage, resume.id, dir)
    }

    fn spool_file(dir: &tempfile::TempDir) -> PathBuf {
        let path = dir.path().join("stored.pdf");
        std::fs::write(&path, b"%PDF-fake").unwrap();
        path
    }

    fn task(resume_id: i64, path: &Path) -> ProcessTask {
        ProcessTask {
            resume_id,
            path: path.to_path_buf(),
            mime_type: MIME_PDF.to_string(),
        }
    }

    fn scored(job_id: i64, score: i32) -> ScoredJob {
        ScoredJob {
            job_id,
            match_score: score,
            matching_skills: vec!["React".to_string()],
            reasoning: "good overlap".to_string(),
        }
    }

    #[tokio::test]
    async fn test_success_marks_processed_and_stores_recommendations() {
        let (ctx, storage, resume_id, dir) = context_with(StubClassifier {
            fail_parse: false,
            scored: vec![scored(1, 82)],
        })
        .await;
        let path = spool_file(&dir);

        process_resume(&ctx, task(resume_id, &path)).await;

        let resume = storage.resume(resume_id).await.unwrap().unwrap();
        assert!(resume.processed);
        let extracted = resume.extracted_data.unwrap();
        assert_eq!(extracted.recent_role, "Senior Frontend Developer");

        let recs = storage.recommendations_for(resume_id).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].match_score, 82);

        assert!(!path.exists(), "spooled upload should be removed");
    }

    #[tokio::test]
    async fn test_failure_degrades_but_still_terminates() {
        let (ctx, storage, resume_id, dir) = context_with(StubClassifier {
            fail_parse: true,
            scored: vec![],
        })
        .await;
        let path = spool_file(&dir);

        process_resume(&ctx, task(resume_id, &path)).await;

        let resume = storage.resume(resume_id).await.unwrap().unwrap();
        assert!(resume.processed, "failed pipeline must still mark processed");
        assert_eq!(resume.extracted_data.unwrap(), ExtractedData::degraded());

        let recs = storage.recommendations_for(resume_id).await.unwrap();
        assert!(recs.is_empty());

        assert!(!path.exists(), "spooled upload removed on failure too");
    }

    #[tokio::test]
    async fn test_reprocessing_replaces_recommendation_set() {
        let (ctx, storage, resume_id, dir) = context_with(StubClassifier {
            fail_parse: false,
            scored: vec![scored(1, 60)],
        })
        .await;

        let path = spool_file(&dir);
        process_resume(&ctx, task(resume_id, &path)).await;

        // Second run with a different score: one set, not two.
        let ctx2 = PipelineContext {
            classifier: Arc::new(StubClassifier {
                fail_parse: false,
                scored: vec![scored(1, 95)],
            }),
            ..ctx
        };
        let path = spool_file(&dir);
        process_resume(&ctx2, task(resume_id, &path)).await;

        let recs = storage.recommendations_for(resume_id).await.unwrap();
        assert_eq!(recs.len(), 1);
        assert_eq!(recs[0].match_score, 95);
    }

    #[tokio::test]
    async fn test_enqueue_full_queue_returns_queue_full() {
        // Single-slot channel with no draining worker.
        let (tx, rx) = async_channel::bounded::<ProcessTask>(1);
        let handle = PipelineHandle { tx };
        let sample = task(1, Path::new("x.pdf"));

        assert!(handle.enqueue(sample.clone()).is_ok());
        let err = handle.enqueue(sample.clone()).unwrap_err();
        assert!(matches!(err, AppError::QueueFull));

        // Dropping the last receiver closes the queue entirely.
        drop(rx);
        let err = handle.enqueue(sample).unwrap_err();
        assert!(matches!(err, AppError::Internal(_)));
    }
}
