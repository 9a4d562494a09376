//! PostgreSQL storage backend, selected when `DATABASE_URL` is set.
//!
//! The schema is bootstrapped with idempotent DDL at connect time, so a
//! fresh database needs no out-of-band migration step.

use anyhow::Result;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::postgres::PgPoolOptions;
use sqlx::types::Json;
use sqlx::{FromRow, PgPool};
use tracing::info;

use crate::errors::AppError;
use crate::models::job::{
    Job, JobRecommendation, JobWithRecommendation, NewJob, NewRecommendation,
};
use crate::models::resume::{ExtractedData, NewResume, Resume};
use crate::storage::Storage;

const SCHEMA_DDL: [&str; 4] = [
    r#"
    CREATE TABLE IF NOT EXISTS resumes (
        id              BIGSERIAL PRIMARY KEY,
        file_name       TEXT NOT NULL,
        original_name   TEXT NOT NULL,
        file_size       BIGINT NOT NULL,
        mime_type       TEXT NOT NULL,
        uploaded_at     TIMESTAMPTZ NOT NULL DEFAULT now(),
        processed       BOOLEAN NOT NULL DEFAULT FALSE,
        extracted_data  JSONB
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS jobs (
        id               BIGSERIAL PRIMARY KEY,
        title            TEXT NOT NULL,
        company          TEXT NOT NULL,
        location         TEXT NOT NULL,
        job_type         TEXT NOT NULL,
        level            TEXT NOT NULL,
        salary           TEXT NOT NULL,
        description      TEXT NOT NULL,
        required_skills  TEXT[] NOT NULL,
        experience_years INT NOT NULL,
        posted_date      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE TABLE IF NOT EXISTS job_recommendations (
        id              BIGSERIAL PRIMARY KEY,
        resume_id       BIGINT NOT NULL,
        job_id          BIGINT NOT NULL,
        match_score     INT NOT NULL,
        matching_skills TEXT[] NOT NULL,
        reasoning       TEXT NOT NULL DEFAULT '',
        created_at      TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    "#,
    r#"
    CREATE INDEX IF NOT EXISTS idx_job_recommendations_resume
        ON job_recommendations (resume_id)
    "#,
];

pub struct PgStorage {
    pool: PgPool,
}

impl PgStorage {
    /// Creates the connection pool and bootstraps the schema.
    pub async fn connect(database_url: &str) -> Result<Self> {
        info!("Connecting to PostgreSQL...");

        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await?;

        for statement in SCHEMA_DDL {
            sqlx::query(statement).execute(&pool).await?;
        }

        info!("PostgreSQL connection pool established");
        Ok(Self { pool })
    }
}

#[derive(FromRow)]
struct ResumeRecord {
    id: i64,
    file_name: String,
    original_name: String,
    file_size: i64,
    mime_type: String,
    uploaded_at: DateTime<Utc>,
    processed: bool,
    extracted_data: Option<Json<ExtractedData>>,
}

impl From<ResumeRecord> for Resume {
    fn from(r: ResumeRecord) -> Self {
        Resume {
            id: r.id,
            file_name: r.file_name,
            original_name: r.original_name,
            file_size: r.file_size,
            mime_type: r.mime_type,
            uploaded_at: r.uploaded_at,
            processed: r.processed,
            extracted_data: r.extracted_data.map(|json| json.0),
        }
    }
}

#[derive(FromRow)]
struct JobRecord {
    id: i64,
    title: String,
    company: String,
    location: String,
    job_type: String,
    level: String,
    salary: String,
    description: String,
    required_skills: Vec<String>,
    experience_years: i32,
    posted_date: DateTime<Utc>,
}

impl From<JobRecord> for Job {
    fn from(r: JobRecord) -> Self {
        Job {
            id: r.id,
            title: r.title,
            company: r.company,
            location: r.location,
            job_type: r.job_type,
            level: r.level,
            salary: r.salary,
            description: r.description,
            required_skills: r.required_skills,
            experience_years: r.experience_years,
            posted_date: r.posted_date,
        }
    }
}

#[derive(FromRow)]
struct RecommendationRecord {
    id: i64,
    resume_id: i64,
    job_id: i64,
    match_score: i32,
    matching_skills: Vec<String>,
    reasoning: String,
    created_at: DateTime<Utc>,
}

impl From<RecommendationRecord> for JobRecommendation {
    fn from(r: RecommendationRecord) -> Self {
        JobRecommendation {
            id: r.id,
            resume_id: r.resume_id,
            job_id: r.job_id,
            match_score: r.match_score,
            matching_skills: r.matching_skills,
            reasoning: r.reasoning,
            created_at: r.created_at,
        }
    }
}

/// Join row for `recommendations_for`: job columns plus the match fields.
#[derive(FromRow)]
struct JoinedRecommendationRecord {
    id: i64,
    title: String,
    company: String,
    location: String,
    job_type: String,
    level: String,
    salary: String,
    description: String,
    required_skills: Vec<String>,
    experience_years: i32,
    posted_date: DateTime<Utc>,
    match_score: i32,
    matching_skills: Vec<String>,
    reasoning: String,
}

impl From<JoinedRecommendationRecord> for JobWithRecommendation {
    fn from(r: JoinedRecommendationRecord) -> Self {
        JobWithRecommendation {
            id: r.id,
            title: r.title,
            company: r.company,
            location: r.location,
            job_type: r.job_type,
            level: r.level,
            salary: r.salary,
            description: r.description,
            required_skills: r.required_skills,
            experience_years: r.experience_years,
            posted_date: r.posted_date,
            match_score: r.match_score,
            matching_skills: r.matching_skills,
            reasoning: r.reasoning,
        }
    }
}

#[async_trait]
impl Storage for PgStorage {
    async fn create_resume(&self, new: NewResume) -> Result<Resume, AppError> {
        let record = sqlx::query_as::<_, ResumeRecord>(
            r#"
            INSERT INTO resumes (file_name, original_name, file_size, mime_type)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&new.file_name)
        .bind(&new.original_name)
        .bind(new.file_size)
        .bind(&new.mime_type)
        .fetch_one(&self.pool)
        .await?;
        Ok(record.into())
    }

    async fn resume(&self, id: i64) -> Result<Option<Resume>, AppError> {
        let record = sqlx::query_as::<_, ResumeRecord>("SELECT * FROM resumes WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(record.map(Resume::from))
    }

    async fn mark_processed(
        &self,
        id: i64,
        data: ExtractedData,
    ) -> Result<Option<Resume>, AppError> {
        let record = sqlx::query_as::<_, ResumeRecord>(
            r#"
            UPDATE resumes
            SET processed = TRUE, extracted_data = $2
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(id)
        .bind(Json(data))
        .fetch_optional(&self.pool)
        .await?;
        Ok(record.map(Resume::from))
    }

    async fn create_job(&self, new: NewJob) -> Result<Job, AppError> {
        let record = sqlx::query_as::<_, JobRecord>(
            r#"
            INSERT INTO jobs
                (title, company, location, job_type, level, salary,
                 description, required_skills, experience_years)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            RETURNING *
            "#,
        )
        .bind(&new.title)
        .bind(&new.company)
        .bind(&new.location)
        .bind(&new.job_type)
        .bind(&new.level)
        .bind(&new.salary)
        .bind(&new.description)
        .bind(&new.required_skills)
        .bind(new.experience_years)
        .fetch_one(&self.pool)
        .await?;
        Ok(record.into())
    }

    async fn jobs(&self) -> Result<Vec<Job>, AppError> {
        let records = sqlx::query_as::<_, JobRecord>("SELECT * FROM jobs ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(records.into_iter().map(Job::from).collect())
    }

    async fn insert_recommendations(
        &self,
        resume_id: i64,
        recs: Vec<NewRecommendation>,
    ) -> Result<Vec<JobRecommendation>, AppError> {
        let mut tx = self.pool.begin().await?;
        let mut stored = Vec::with_capacity(recs.len());
        for rec in recs {
            let record = sqlx::query_as::<_, RecommendationRecord>(
                r#"
                INSERT INTO job_recommendations
                    (resume_id, job_id, match_score, matching_skills, reasoning)
                VALUES ($1, $2, $3, $4, $5)
                RETURNING *
                "#,
            )
            .bind(resume_id)
            .bind(rec.job_id)
            .bind(rec.match_score)
            .bind(&rec.matching_skills)
            .bind(&rec.reasoning)
            .fetch_one(&mut *tx)
            .await?;
            stored.push(record.into());
        }
        tx.commit().await?;
        Ok(stored)
    }

    async fn recommendations_for(
        &self,
        resume_id: i64,
    ) -> Result<Vec<JobWithRecommendation>, AppError> {
        let records = sqlx::query_as::<_, JoinedRecommendationRecord>(
            r#"
            SELECT j.id, j.title, j.company, j.location, j.job_type, j.level,
                   j.salary, j.description, j.required_skills, j.experience_years,
                   j.posted_date, r.match_score, r.matching_skills, r.reasoning
            FROM job_recommendations r
            JOIN jobs j ON j.id = r.job_id
            WHERE r.resume_id = $1
            ORDER BY r.match_score DESC, r.id
            "#,
        )
        .bind(resume_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(records
            .into_iter()
            .map(JobWithRecommendation::from)
            .collect())
    }

    async fn delete_recommendations(&self, resume_id: i64) -> Result<(), AppError> {
        sqlx::query("DELETE FROM job_recommendations WHERE resume_id = $1")
            .bind(resume_id)
            .execute(&self.pool)
            .await?;
        Ok(())
    }
}
