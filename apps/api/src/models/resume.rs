use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// An uploaded resume document plus its (eventually) extracted fields.
///
/// Created with `processed = false` on upload; the pipeline flips the flag
/// exactly once, attaching either real extracted data or the degraded
/// placeholder. Rows are never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Resume {
    pub id: i64,
    pub file_name: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
    pub uploaded_at: DateTime<Utc>,
    pub processed: bool,
    pub extracted_data: Option<ExtractedData>,
}

/// Fields the upload handler supplies; the store assigns id, timestamp and
/// the initial processing state.
#[derive(Debug, Clone)]
pub struct NewResume {
    pub file_name: String,
    pub original_name: String,
    pub file_size: i64,
    pub mime_type: String,
}

/// Structured fields the classifier extracts from raw resume text.
/// The schema is fixed; a classifier response that does not deserialize
/// into this shape fails the pipeline step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedData {
    pub skills: Vec<String>,
    pub experience: String,
    pub education: String,
    pub recent_role: String,
    pub experience_years: f64,
    pub summary: String,
}

const DEGRADED_TEXT: &str = "Error processing resume";

impl ExtractedData {
    /// Placeholder attached when a pipeline step fails. The resume still
    /// flips to processed so clients polling the status endpoint terminate.
    pub fn degraded() -> Self {
        Self {
            skills: Vec::new(),
            experience: DEGRADED_TEXT.to_string(),
            education: DEGRADED_TEXT.to_string(),
            recent_role: DEGRADED_TEXT.to_string(),
            experience_years: 0.0,
            summary: DEGRADED_TEXT.to_string(),
        }
    }
}
