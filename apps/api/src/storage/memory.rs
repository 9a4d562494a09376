//! In-memory storage backend. All state is wiped on restart.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;
use chrono::Utc;

use crate::errors::AppError;
use crate::models::job::{
    Job, JobRecommendation, JobWithRecommendation, NewJob, NewRecommendation,
};
use crate::models::resume::{ExtractedData, NewResume, Resume};
use crate::storage::Storage;

pub struct MemStorage {
    resumes: RwLock<HashMap<i64, Resume>>,
    jobs: RwLock<HashMap<i64, Job>>,
    recommendations: RwLock<HashMap<i64, JobRecommendation>>,
    next_resume_id: AtomicI64,
    next_job_id: AtomicI64,
    next_recommendation_id: AtomicI64,
}

impl MemStorage {
    pub fn new() -> Self {
        Self {
            resumes: RwLock::new(HashMap::new()),
            jobs: RwLock::new(HashMap::new()),
            recommendations: RwLock::new(HashMap::new()),
            next_resume_id: AtomicI64::new(1),
            next_job_id: AtomicI64::new(1),
            next_recommendation_id: AtomicI64::new(1),
        }
    }
}

impl Default for MemStorage {
    fn default() -> Self {
        Self::new()
    }
}

// Locks are never held across an await point; every method locks, mutates
// and releases synchronously.
#[async_trait]
impl Storage for MemStorage {
    async fn create_resume(&self, new: NewResume) -> Result<Resume, AppError> {
        let id = self.next_resume_id.fetch_add(1, Ordering::SeqCst);
        let resume = Resume {
            id,
            file_name: new.file_name,
            original_name: new.original_name,
            file_size: new.file_size,
            mime_type: new.mime_type,
            uploaded_at: Utc::now(),
            processed: false,
            extracted_data: None,
        };
        self.resumes
            .write()
            .expect("resumes lock poisoned")
            .insert(id, resume.clone());
        Ok(resume)
    }

    async fn resume(&self, id: i64) -> Result<Option<Resume>, AppError> {
        Ok(self
            .resumes
            .read()
            .expect("resumes lock poisoned")
            .get(&id)
            .cloned())
    }

    async fn mark_processed(
        &self,
        id: i64,
        data: ExtractedData,
    ) -> Result<Option<Resume>, AppError> {
        let mut resumes = self.resumes.write().expect("resumes lock poisoned");
        Ok(resumes.get_mut(&id).map(|resume| {
            resume.processed = true;
            resume.extracted_data = Some(data);
            resume.clone()
        }))
    }

    async fn create_job(&self, new: NewJob) -> Result<Job, AppError> {
        let id = self.next_job_id.fetch_add(1, Ordering::SeqCst);
        let job = Job {
            id,
            title: new.title,
            company: new.company,
            location: new.location,
            job_type: new.job_type,
            level: new.level,
            salary: new.salary,
            description: new.description,
            required_skills: new.required_skills,
            experience_years: new.experience_years,
            posted_date: Utc::now(),
        };
        self.jobs
            .write()
            .expect("jobs lock poisoned")
            .insert(id, job.clone());
        Ok(job)
    }

    async fn jobs(&self) -> Result<Vec<Job>, AppError> {
        let mut jobs: Vec<Job> = self
            .jobs
            .read()
            .expect("jobs lock poisoned")
            .values()
            .cloned()
            .collect();
        jobs.sort_by_key(|j| j.id);
        Ok(jobs)
    }

    async fn insert_recommendations(
        &self,
        resume_id: i64,
        recs: Vec<NewRecommendation>,
    ) -> Result<Vec<JobRecommendation>, AppError> {
        let mut stored = Vec::with_capacity(recs.len());
        let mut table = self
            .recommendations
            .write()
            .expect("recommendations lock poisoned");
        for rec in recs {
            let id = self.next_recommendation_id.fetch_add(1, Ordering::SeqCst);
            let row = JobRecommendation {
                id,
                resume_id,
                job_id: rec.job_id,
                match_score: rec.match_score,
                matching_skills: rec.matching_skills,
                reasoning: rec.reasoning,
                created_at: Utc::now(),
            };
            table.insert(id, row.clone());
            stored.push(row);
        }
        Ok(stored)
    }

    async fn recommendations_for(
        &self,
        resume_id: i64,
    ) -> Result<Vec<JobWithRecommendation>, AppError> {
        let mut recs: Vec<JobRecommendation> = self
            .recommendations
            .read()
            .expect("recommendations lock poisoned")
            .values()
            .filter(|rec| rec.resume_id == resume_id)
            .cloned()
            .collect();
        recs.sort_by(|a, b| b.match_score.cmp(&a.match_score).then(a.id.cmp(&b.id)));

        let jobs = self.jobs.read().expect("jobs lock poisoned");
        Ok(recs
            .into_iter()
            .filter_map(|rec| {
                jobs.get(&rec.job_id).map(|job| {
                    JobWithRecommendation::with_match(
                        job.clone(),
                        rec.match_score,
                        rec.matching_skills,
                        rec.reasoning,
                    )
                })
            })
            .collect())
    }

    async fn delete_recommendations(&self, resume_id: i64) -> Result<(), AppError> {
        self.recommendations
            .write()
            .expect("recommendations lock poisoned")
            .retain(|_, rec| rec.resume_id != resume_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_resume(name: &str) -> NewResume {
        NewResume {
            file_name: format!("{name}.pdf"),
            original_name: format!("{name}-original.pdf"),
            file_size: 2048,
            mime_type: "application/pdf".to_string(),
        }
    }

    fn new_job(title: &str, level: &str) -> NewJob {
        NewJob {
            title: title.to_string(),
            company: "TechCorp Inc.".to_string(),
            location: "Remote".to_string(),
            job_type: "Remote".to_string(),
            level: level.to_string(),
            salary: "$100k".to_string(),
            description: "Build things".to_string(),
            required_skills: vec!["Rust".to_string()],
            experience_years: 3,
        }
    }

    fn rec(job_id: i64, score: i32) -> NewRecommendation {
        NewRecommendation {
            job_id,
            match_score: score,
            matching_skills: vec!["Rust".to_string()],
            reasoning: "overlap".to_string(),
        }
    }

    #[tokio::test]
    async fn test_resume_ids_strictly_increase_from_one() {
        let store = MemStorage::new();
        let a = store.create_resume(new_resume("a")).await.unwrap();
        let b = store.create_resume(new_resume("b")).await.unwrap();
        let c = store.create_resume(new_resume("c")).await.unwrap();
        assert_eq!(a.id, 1);
        assert!(b.id > a.id && c.id > b.id);
        assert!(!a.processed);
        assert!(a.extracted_data.is_none());
    }

    #[tokio::test]
    async fn test_mark_processed_attaches_data_once() {
        let store = MemStorage::new();
        let resume = store.create_resume(new_resume("a")).await.unwrap();
        let updated = store
            .mark_processed(resume.id, ExtractedData::degraded())
            .await
            .unwrap()
            .unwrap();
        assert!(updated.processed);
        assert!(updated.extracted_data.is_some());

        let missing = store
            .mark_processed(999, ExtractedData::degraded())
            .await
            .unwrap();
        assert!(missing.is_none());
    }

    #[tokio::test]
    async fn test_recommendations_sorted_descending() {
        let store = MemStorage::new();
        let j1 = store.create_job(new_job("A", "Mid")).await.unwrap();
        let j2 = store.create_job(new_job("B", "Senior")).await.unwrap();
        let j3 = store.create_job(new_job("C", "Entry")).await.unwrap();
        store
            .insert_recommendations(1, vec![rec(j1.id, 55), rec(j2.id, 91), rec(j3.id, 72)])
            .await
            .unwrap();

        let list = store.recommendations_for(1).await.unwrap();
        let scores: Vec<i32> = list.iter().map(|r| r.match_score).collect();
        assert_eq!(scores, vec![91, 72, 55]);
    }

    #[tokio::test]
    async fn test_delete_then_insert_replaces_set() {
        let store = MemStorage::new();
        let job = store.create_job(new_job("A", "Mid")).await.unwrap();
        store
            .insert_recommendations(1, vec![rec(job.id, 60)])
            .await
            .unwrap();
        store
            .insert_recommendations(2, vec![rec(job.id, 70)])
            .await
            .unwrap();

        store.delete_recommendations(1).await.unwrap();
        store
            .insert_recommendations(1, vec![rec(job.id, 85)])
            .await
            .unwrap();

        let for_one = store.recommendations_for(1).await.unwrap();
        assert_eq!(for_one.len(), 1);
        assert_eq!(for_one[0].match_score, 85);

        // Other resumes are untouched.
        let for_two = store.recommendations_for(2).await.unwrap();
        assert_eq!(for_two.len(), 1);
        assert_eq!(for_two[0].match_score, 70);
    }

    #[tokio::test]
    async fn test_recommendation_with_missing_job_is_skipped() {
        let store = MemStorage::new();
        let job = store.create_job(new_job("A", "Mid")).await.unwrap();
        store
            .insert_recommendations(1, vec![rec(job.id, 80), rec(999, 95)])
            .await
            .unwrap();

        let list = store.recommendations_for(1).await.unwrap();
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].id, job.id);
    }

    #[tokio::test]
    async fn test_jobs_returned_in_id_order() {
        let store = MemStorage::new();
        for title in ["A", "B", "C", "D"] {
            store.create_job(new_job(title, "Mid")).await.unwrap();
        }
        let jobs = store.jobs().await.unwrap();
        let ids: Vec<i64> = jobs.iter().map(|j| j.id).collect();
        assert_eq!(ids, vec![1, 2, 3, 4]);
    }
}
