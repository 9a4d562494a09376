// All LLM prompt constants for the matching module.

/// System prompt for resume parsing — enforces JSON-only output.
pub const RESUME_PARSE_SYSTEM: &str =
    "You are an expert resume parser. Analyze the provided resume text and \
    extract structured information. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Resume parsing prompt template. Replace `{resume_text}` before sending.
pub const RESUME_PARSE_PROMPT_TEMPLATE: &str = r#"Parse the following resume and extract the information.

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": ["array of technical skills found"],
  "experience": "brief summary of work experience",
  "education": "education background summary",
  "recentRole": "most recent job title",
  "experienceYears": 5,
  "summary": "brief professional summary"
}

Guidelines:
- Extract only technical skills (programming languages, frameworks, tools, etc.)
- For experienceYears, estimate based on work history or explicitly stated years
- Keep summaries concise but informative
- If information is not available, use appropriate defaults

RESUME TEXT:
{resume_text}"#;

/// System prompt for job scoring — carries the scoring rubric.
pub const JOB_MATCH_SYSTEM: &str =
    "You are an expert job matching system. Given a candidate's extracted \
    resume data and available jobs, calculate match scores and provide \
    recommendations. \
    For each job, calculate a match score (0-100) based on: \
    skill overlap (40% weight), experience level match (30% weight), \
    industry/role relevance (30% weight). \
    Only include jobs with match scores above 50. Sort by match score descending. \
    You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON object. \
    Do NOT use markdown code fences.";

/// Job scoring prompt template.
/// Replace `{candidate_profile}` and `{jobs_block}` before sending.
pub const JOB_MATCH_PROMPT_TEMPLATE: &str = r#"Score the available jobs for this candidate.

Return a JSON object with this EXACT schema:
{
  "recommendations": [
    {
      "jobId": 1,
      "matchScore": 85,
      "matchingSkills": ["skills that match"],
      "reasoning": "brief explanation of why this is a good/bad match"
    }
  ]
}

Candidate Profile:
{candidate_profile}

Available Jobs:
{jobs_block}

Please provide job recommendations for this candidate."#;
