//! Matching — the classification client behind the pipeline.
//!
//! Two stateless operations, both delegated to the hosted model: parse raw
//! resume text into `ExtractedData`, and score a candidate against the job
//! list. The model's output is never trusted blindly: scores are clamped,
//! job ids it invented are dropped, and ordering is re-established locally
//! before anything is stored.

pub mod prompts;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::AppError;
use crate::llm_client::LlmClient;
use crate::matching::prompts::{
    JOB_MATCH_PROMPT_TEMPLATE, JOB_MATCH_SYSTEM, RESUME_PARSE_PROMPT_TEMPLATE, RESUME_PARSE_SYSTEM,
};
use crate::models::job::{Job, NewRecommendation};
use crate::models::resume::ExtractedData;

/// How much of each job description goes into the scoring prompt.
const DESCRIPTION_PROMPT_CHARS: usize = 200;

/// One scored job as returned by the model.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoredJob {
    pub job_id: i64,
    pub match_score: i32,
    pub matching_skills: Vec<String>,
    #[serde(default)]
    pub reasoning: String,
}

#[derive(Debug, Deserialize)]
struct ScoreJobsResponse {
    #[serde(default)]
    recommendations: Vec<ScoredJob>,
}

/// Classifier seam used by the pipeline. Carried on the pipeline context as
/// `Arc<dyn Classifier>` so tests can substitute a scripted double.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn parse_resume(&self, resume_text: &str) -> Result<ExtractedData, AppError>;

    /// Scores the candidate against `jobs`, returning validated entries
    /// sorted by score descending and referencing only ids from `jobs`.
    async fn score_jobs(
        &self,
        extracted: &ExtractedData,
        jobs: &[Job],
    ) -> Result<Vec<ScoredJob>, AppError>;
}

/// Production classifier backed by the shared `LlmClient`.
pub struct LlmClassifier {
    llm: LlmClient,
}

impl LlmClassifier {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl Classifier for LlmClassifier {
    async fn parse_resume(&self, resume_text: &str) -> Result<ExtractedData, AppError> {
        let prompt = RESUME_PARSE_PROMPT_TEMPLATE.replace("{resume_text}", resume_text);
        self.llm
            .call_json::<ExtractedData>(&prompt, RESUME_PARSE_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Resume parsing failed: {e}")))
    }

    async fn score_jobs(
        &self,
        extracted: &ExtractedData,
        jobs: &[Job],
    ) -> Result<Vec<ScoredJob>, AppError> {
        let prompt = JOB_MATCH_PROMPT_TEMPLATE
            .replace("{candidate_profile}", &candidate_profile(extracted))
            .replace("{jobs_block}", &jobs_block(jobs));
        let response: ScoreJobsResponse = self
            .llm
            .call_json(&prompt, JOB_MATCH_SYSTEM)
            .await
            .map_err(|e| AppError::Llm(format!("Job scoring failed: {e}")))?;
        Ok(validate_scored(response.recommendations, jobs))
    }
}

/// Formats the candidate block of the scoring prompt.
fn candidate_profile(extracted: &ExtractedData) -> String {
    format!(
        "Skills: {}\nExperience: {}\nYears of Experience: {}\nRecent Role: {}",
        extracted.skills.join(", "),
        extracted.experience,
        extracted.experience_years,
        extracted.recent_role,
    )
}

/// Formats the job list block of the scoring prompt. Descriptions are
/// truncated so a long seed list cannot blow up the prompt size.
fn jobs_block(jobs: &[Job]) -> String {
    jobs.iter()
        .map(|job| {
            format!(
                "Job ID: {}\nTitle: {}\nCompany: {}\nRequired Skills: {}\nExperience Required: {} years\nLevel: {}\nDescription: {}...\n",
                job.id,
                job.title,
                job.company,
                job.required_skills.join(", "),
                job.experience_years,
                job.level,
                truncate_chars(&job.description, DESCRIPTION_PROMPT_CHARS),
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Enforces the scoring contract locally: scores clamped to 0–100, unknown
/// job ids dropped, descending order restored.
fn validate_scored(scored: Vec<ScoredJob>, jobs: &[Job]) -> Vec<ScoredJob> {
    let mut valid: Vec<ScoredJob> = scored
        .into_iter()
        .filter(|s| {
            let known = jobs.iter().any(|j| j.id == s.job_id);
            if !known {
                warn!(job_id = s.job_id, "classifier returned unknown job id, dropping");
            }
            known
        })
        .map(|mut s| {
            s.match_score = s.match_score.clamp(0, 100);
            s
        })
        .collect();
    valid.sort_by(|a, b| b.match_score.cmp(&a.match_score));
    valid
}

impl From<ScoredJob> for NewRecommendation {
    fn from(s: ScoredJob) -> Self {
        NewRecommendation {
            job_id: s.job_id,
            match_score: s.match_score,
            matching_skills: s.matching_skills,
            reasoning: s.reasoning,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn job(id: i64, title: &str) -> Job {
        Job {
            id,
            title: title.to_string(),
            company: "TechCorp Inc.".to_string(),
            location: "Remote".to_string(),
            job_type: "Remote".to_string(),
            level: "Senior".to_string(),
            salary: "$120k - $160k".to_string(),
            description: "x".repeat(500),
            required_skills: vec!["React".to_string(), "TypeScript".to_string()],
            experience_years: 5,
            posted_date: Utc::now(),
        }
    }

    fn scored(job_id: i64, score: i32) -> ScoredJob {
        ScoredJob {
            job_id,
            match_score: score,
            matching_skills: vec!["React".to_string()],
            reasoning: "overlap".to_string(),
        }
    }

    #[test]
    fn test_score_response_deserializes_wire_shape() {
        let json = r#"{
            "recommendations": [
                {
                    "jobId": 3,
                    "matchScore": 85,
                    "matchingSkills": ["React", "TypeScript"],
                    "reasoning": "Strong frontend overlap"
                }
            ]
        }"#;
        let response: ScoreJobsResponse = serde_json::from_str(json).unwrap();
        assert_eq!(response.recommendations.len(), 1);
        assert_eq!(response.recommendations[0].job_id, 3);
        assert_eq!(response.recommendations[0].match_score, 85);
    }

    #[test]
    fn test_score_response_tolerates_missing_recommendations() {
        let response: ScoreJobsResponse = serde_json::from_str("{}").unwrap();
        assert!(response.recommendations.is_empty());
    }

    #[test]
    fn test_validate_drops_unknown_job_ids() {
        let jobs = vec![job(1, "A"), job(2, "B")];
        let result = validate_scored(vec![scored(1, 80), scored(99, 95)], &jobs);
        assert_eq!(result.len(), 1);
        assert_eq!(result[0].job_id, 1);
    }

    #[test]
    fn test_validate_clamps_out_of_range_scores() {
        let jobs = vec![job(1, "A"), job(2, "B")];
        let result = validate_scored(vec![scored(1, 150), scored(2, -20)], &jobs);
        assert_eq!(result[0].match_score, 100);
        assert_eq!(result[1].match_score, 0);
    }

    #[test]
    fn test_validate_restores_descending_order() {
        let jobs = vec![job(1, "A"), job(2, "B"), job(3, "C")];
        let result = validate_scored(vec![scored(2, 55), scored(3, 91), scored(1, 72)], &jobs);
        let scores: Vec<i32> = result.iter().map(|s| s.match_score).collect();
        assert_eq!(scores, vec![91, 72, 55]);
    }

    #[test]
    fn test_jobs_block_truncates_description() {
        let block = jobs_block(&[job(7, "Frontend Developer")]);
        assert!(block.contains("Job ID: 7"));
        assert!(block.contains("Level: Senior"));
        // 500-char description is cut to the prompt cap.
        let line = block
            .lines()
            .find(|l| l.starts_with("Description:"))
            .unwrap();
        assert!(line.len() < 250);
    }

    #[test]
    fn test_candidate_profile_includes_core_fields() {
        let extracted = ExtractedData {
            skills: vec!["Rust".to_string(), "SQL".to_string()],
            experience: "5 years backend".to_string(),
            education: "BSc".to_string(),
            recent_role: "Backend Engineer".to_string(),
            experience_years: 5.0,
            summary: "summary".to_string(),
        };
        let profile = candidate_profile(&extracted);
        assert!(profile.contains("Skills: Rust, SQL"));
        assert!(profile.contains("Recent Role: Backend Engineer"));
        assert!(profile.contains("Years of Experience: 5"));
    }
}
