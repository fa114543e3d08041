// ATS evaluation prompt. Both inputs are substituted in a single pass, so text
// inside a resume that looks like a placeholder is never expanded.

use crate::errors::AppError;

/// JSON keys the model is asked to return.
pub const JD_MATCH_KEY: &str = "JD Match";
pub const MISSING_KEYWORDS_KEY: &str = "MissingKeywords";
pub const PROFILE_SUMMARY_KEY: &str = "Profile Summary";

/// Builds the ATS evaluation prompt from trimmed resume text and job description.
pub fn prepare_prompt(resume_text: &str, job_description: &str) -> Result<String, AppError> {
    let resume_text = resume_text.trim();
    let job_description = job_description.trim();

    if resume_text.is_empty() {
        return Err(AppError::Validation(
            "resume text cannot be empty".to_string(),
        ));
    }
    if job_description.is_empty() {
        return Err(AppError::Validation(
            "job description cannot be empty".to_string(),
        ));
    }

    Ok(format!(
        r#"Act as an expert ATS (Applicant Tracking System) specialist.
Evaluate the following resume against the job description.

Resume: {resume_text}
Job Description: {job_description}

Provide a response in this JSON format ONLY:
{{
    "{JD_MATCH_KEY}": "percentage between 0-100",
    "{MISSING_KEYWORDS_KEY}": ["keyword1", "keyword2"],
    "{PROFILE_SUMMARY_KEY}": "detailed analysis and suggestions"
}}
"#
    ))
}
