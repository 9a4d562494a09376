//! Fixed job seed list, inserted once at process start.

use tracing::info;

use crate::errors::AppError;
use crate::models::job::NewJob;
use crate::storage::Storage;

/// Seeds the job table when it is empty. A populated store (PostgreSQL
/// surviving a restart) is left untouched.
pub async fn seed_jobs(storage: &dyn Storage) -> Result<usize, AppError> {
    if !storage.jobs().await?.is_empty() {
        info!("jobs already present, skipping seed");
        return Ok(0);
    }

    let list = seed_list();
    let count = list.len();
    for job in list {
        storage.create_job(job).await?;
    }
    info!(count, "seeded job list");
    Ok(count)
}

fn job(
    title: &str,
    company: &str,
    location: &str,
    job_type: &str,
    level: &str,
    salary: &str,
    description: &str,
    required_skills: &[&str],
    experience_years: i32,
) -> NewJob {
    NewJob {
        title: title.to_string(),
        company: company.to_string(),
        location: location.to_string(),
        job_type: job_type.to_string(),
        level: level.to_string(),
        salary: salary.to_string(),
        description: description.to_string(),
        required_skills: required_skills.iter().map(|s| s.to_string()).collect(),
        experience_years,
    }
}

fn seed_list() -> Vec<NewJob> {
    vec![
        job(
            "Senior Frontend Developer",
            "TechCorp Inc.",
            "San Francisco, CA",
            "Remote",
            "Senior",
            "$120k - $160k",
            "Leading frontend development using React, TypeScript, and modern web technologies. Build scalable user interfaces and collaborate with cross-functional teams.",
            &["React", "TypeScript", "JavaScript", "HTML", "CSS", "Node.js"],
            5,
        ),
        job(
            "Full Stack Developer",
            "StartupXYZ",
            "Austin, TX",
            "Hybrid",
            "Mid",
            "$90k - $130k",
            "Build end-to-end web applications using React, Python, and cloud technologies. Work in a fast-paced startup environment with modern development practices.",
            &["React", "Python", "JavaScript", "AWS", "Docker", "PostgreSQL"],
            3,
        ),
        job(
            "Backend Engineer",
            "DataFlow Solutions",
            "Seattle, WA",
            "On-site",
            "Senior",
            "$110k - $150k",
            "Design and implement scalable backend systems using Python, PostgreSQL, and microservices architecture. Experience with data processing pipelines preferred.",
            &["Python", "PostgreSQL", "SQL", "Docker", "Kubernetes", "Redis"],
            4,
        ),
        job(
            "React Developer",
            "WebFlow Agency",
            "Remote",
            "Remote",
            "Mid",
            "$80k - $110k",
            "Create responsive web applications using React and modern JavaScript. Work with designers and product teams to deliver pixel-perfect user experiences.",
            &["React", "JavaScript", "CSS", "HTML", "Figma", "Git"],
            3,
        ),
        job(
            "Software Engineer",
            "InnovateLabs",
            "New York, NY",
            "Hybrid",
            "Entry",
            "$70k - $95k",
            "Join our engineering team to build innovative software solutions. Work with modern technologies and learn from experienced developers.",
            &["JavaScript", "Python", "Git", "HTML", "CSS", "SQL"],
            1,
        ),
        job(
            "DevOps Engineer",
            "CloudTech Inc.",
            "Denver, CO",
            "Remote",
            "Senior",
            "$130k - $170k",
            "Manage cloud infrastructure and deployment pipelines. Work with AWS, Docker, and Kubernetes to ensure scalable and reliable systems.",
            &["AWS", "Docker", "Kubernetes", "Python", "Terraform", "Jenkins"],
            5,
        ),
        job(
            "Frontend Developer",
            "DesignFirst Studio",
            "Los Angeles, CA",
            "On-site",
            "Entry",
            "$65k - $85k",
            "Create beautiful and responsive user interfaces. Work closely with designers to implement modern web applications using React and TypeScript.",
            &["React", "TypeScript", "CSS", "HTML", "Sass", "JavaScript"],
            2,
        ),
        job(
            "Machine Learning Engineer",
            "AI Innovations",
            "Boston, MA",
            "Hybrid",
            "Senior",
            "$140k - $180k",
            "Develop and deploy machine learning models in production. Work with large datasets and modern ML frameworks to solve complex problems.",
            &["Python", "TensorFlow", "PyTorch", "SQL", "AWS", "Docker"],
            4,
        ),
    ]
}
