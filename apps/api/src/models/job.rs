use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A seeded job posting. Immutable after process start.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    /// "Remote", "On-site" or "Hybrid".
    #[serde(rename = "type")]
    pub job_type: String,
    /// "Entry", "Mid" or "Senior". Matched case-sensitively by search.
    pub level: String,
    pub salary: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub experience_years: i32,
    pub posted_date: DateTime<Utc>,
}

/// Seed-time job fields; the store assigns id and posting timestamp.
#[derive(Debug, Clone)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    pub location: String,
    pub job_type: String,
    pub level: String,
    pub salary: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub experience_years: i32,
}

/// A scored pairing of one resume to one job, produced by the classifier.
/// All rows for a resume are replaced in bulk on reprocessing.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecommendation {
    pub id: i64,
    pub resume_id: i64,
    pub job_id: i64,
    pub match_score: i32,
    pub matching_skills: Vec<String>,
    pub reasoning: String,
    pub created_at: DateTime<Utc>,
}

/// Recommendation fields the pipeline produces for one resume.
#[derive(Debug, Clone, PartialEq)]
pub struct NewRecommendation {
    pub job_id: i64,
    pub match_score: i32,
    pub matching_skills: Vec<String>,
    pub reasoning: String,
}

/// Job joined with its recommendation fields: the wire shape of the
/// recommendation list and job search endpoints. Jobs without a
/// recommendation carry a zero score and no matching skills.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobWithRecommendation {
    pub id: i64,
    pub title: String,
    pub company: String,
    pub location: String,
    #[serde(rename = "type")]
    pub job_type: String,
    pub level: String,
    pub salary: String,
    pub description: String,
    pub required_skills: Vec<String>,
    pub experience_years: i32,
    pub posted_date: DateTime<Utc>,
    pub match_score: i32,
    pub matching_skills: Vec<String>,
    pub reasoning: String,
}

impl JobWithRecommendation {
    /// A job with no recommendation attached (unscored search results).
    pub fn unscored(job: Job) -> Self {
        Self::with_match(job, 0, Vec::new(), String::new())
    }

    pub fn with_match(
        job: Job,
        match_score: i32,
        matching_skills: Vec<String>,
        reasoning: String,
    ) -> Self {
        Self {
            id: job.id,
            title: job.title,
            company: job.company,
            location: job.location,
            job_type: job.job_type,
            level: job.level,
            salary: job.salary,
            description: job.description,
            required_skills: job.required_skills,
            experience_years: job.experience_years,
            posted_date: job.posted_date,
            match_score,
            matching_skills,
            reasoning,
        }
    }
}
