//! Resume evaluation pipeline: PDF → text → prompt → model → JSON candidate.
//!
//! The candidate is whatever the response extractor isolated. It is parsed into an
//! `AtsReport` on a best-effort basis; a parse failure is not an error, the caller
//! still receives the raw candidate.

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::errors::AppError;
use crate::evaluation::pdf_text::extract_pdf_text_blocking;
use crate::evaluation::prompts::prepare_prompt;
use crate::llm_client::{generate_response, TextGenerator};

/// The three fields the prompt asks the model for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AtsReport {
    #[serde(rename = "JD Match")]
    pub jd_match: String,
    #[serde(rename = "MissingKeywords", default)]
    pub missing_keywords: Vec<String>,
    #[serde(rename = "Profile Summary")]
    pub profile_summary: String,
}

impl AtsReport {
    /// Defensive parse of a JSON candidate. `None` for prose or malformed JSON.
    pub fn parse(candidate: &str) -> Option<Self> {
        serde_json::from_str(candidate).ok()
    }

    /// Leading integer of "JD Match" ("75", "75%", " 75 percent"), clamped to 0..=100.
    pub fn match_percentage(&self) -> Option<u8> {
        let mut digits = self
            .jd_match
            .trim()
            .chars()
            .map_while(|c| c.to_digit(10))
            .peekable();
        digits.peek()?;
        let value = digits.fold(0u32, |acc, d| acc.saturating_mul(10).saturating_add(d));
        Some(value.min(100) as u8)
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// JSON-looking substring of the model answer, or the full answer.
    pub candidate: String,
    pub report: Option<AtsReport>,
    pub match_percentage: Option<u8>,
}

impl Evaluation {
    pub fn from_candidate(candidate: String) -> Self {
        let report = AtsReport::parse(&candidate);
        if report.is_none() {
            warn!("Model answer did not parse as an ATS report; returning raw candidate");
        }
        let match_percentage = report.as_ref().and_then(AtsReport::match_percentage);
        Self {
            candidate,
            report,
            match_percentage,
        }
    }
}

/// Runs prompt building and the model call for already-extracted resume text.
/// Returns the JSON candidate string.
pub async fn evaluate_text(
    resume_text: &str,
    job_description: &str,
    llm: &dyn TextGenerator,
) -> Result<String, AppError> {
    let prompt = prepare_prompt(resume_text, job_description)?;
    generate_response(llm, &prompt).await
}

/// Full pipeline from an uploaded PDF.
/// The job description is checked before the (comparatively slow) PDF parse.
pub async fn evaluate_pdf(
    pdf: Bytes,
    job_description: &str,
    llm: &dyn TextGenerator,
) -> Result<Evaluation, AppError> {
    if job_description.trim().is_empty() {
        return Err(AppError::Validation(
            "job description cannot be empty".to_string(),
        ));
    }

    let resume_text = extract_pdf_text_blocking(pdf).await?;
    info!(
        "Extracted {} characters of resume text",
        resume_text.chars().count()
    );

    let candidate = evaluate_text(&resume_text, job_description, llm).await?;
    Ok(Evaluation::from_candidate(candidate))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluation::pdf_text::testing::build_pdf;
    use crate::llm_client::testing::StubGenerator;

    const MODEL_ANSWER: &str = r#"Here is my analysis: {"JD Match": "75", "MissingKeywords": ["AWS"], "Profile Summary": "Strong match"}"#;

    #[tokio::test]
    async fn test_end_to_end_returns_exact_json_span() {
        let llm = StubGenerator::replying(MODEL_ANSWER);
        let candidate = evaluate_text(
            "Python developer with 5 years experience",
            "Looking for senior Python engineer",
            &llm,
        )
        .await
        .unwrap();

        assert_eq!(
            candidate,
            r#"{"JD Match": "75", "MissingKeywords": ["AWS"], "Profile Summary": "Strong match"}"#
        );

        let prompt = llm.last_prompt().unwrap();
        assert!(prompt.contains("Resume: Python developer with 5 years experience"));
        assert!(prompt.contains("Job Description: Looking for senior Python engineer"));
    }

    #[tokio::test]
    async fn test_validation_happens_before_model_call() {
        let llm = StubGenerator::replying(MODEL_ANSWER);
        let err = evaluate_text("resume", "   ", &llm).await.unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_pdf_pipeline_rejects_empty_job_description_first() {
        let llm = StubGenerator::replying(MODEL_ANSWER);
        let err = evaluate_pdf(Bytes::from_static(b"not even a pdf"), "", &llm)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[tokio::test]
    async fn test_pdf_pipeline_stops_on_extraction_error() {
        let llm = StubGenerator::replying(MODEL_ANSWER);
        let err = evaluate_pdf(Bytes::from_static(b"not even a pdf"), "Rust role", &llm)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Extraction(_)));
        assert_eq!(llm.calls(), 0);
    }

    #[tokio::test]
    async fn test_pdf_pipeline_sends_extracted_text_to_model() {
        let llm = StubGenerator::replying(MODEL_ANSWER);
        let pdf = build_pdf(&[Some("Python developer with 5 years experience")]);
        let evaluation = evaluate_pdf(Bytes::from(pdf), "Looking for senior Python engineer", &llm)
            .await
            .unwrap();

        assert_eq!(llm.calls(), 1);
        assert!(llm
            .last_prompt()
            .unwrap()
            .contains("Python developer with 5 years experience"));
        assert_eq!(evaluation.match_percentage, Some(75));
        assert_eq!(evaluation.report.unwrap().missing_keywords, vec!["AWS"]);
    }

    #[test]
    fn test_report_parses_model_json() {
        let evaluation = Evaluation::from_candidate(
            r#"{"JD Match": "75%", "MissingKeywords": ["AWS", "Terraform"], "Profile Summary": "Solid"}"#
                .to_string(),
        );
        let report = evaluation.report.unwrap();
        assert_eq!(report.jd_match, "75%");
        assert_eq!(report.missing_keywords, vec!["AWS", "Terraform"]);
        assert_eq!(report.profile_summary, "Solid");
        assert_eq!(evaluation.match_percentage, Some(75));
    }

    #[test]
    fn test_prose_fallback_keeps_candidate_without_report() {
        let evaluation = Evaluation::from_candidate("I cannot evaluate this resume.".to_string());
        assert_eq!(evaluation.candidate, "I cannot evaluate this resume.");
        assert!(evaluation.report.is_none());
        assert!(evaluation.match_percentage.is_none());
    }

    #[test]
    fn test_greedy_span_over_two_objects_is_not_a_report() {
        let evaluation = Evaluation::from_candidate("{\"a\":1}\n{\"b\":2}".to_string());
        assert!(evaluation.report.is_none());
    }

    #[test]
    fn test_match_percentage_edge_cases() {
        let report = |jd_match: &str| AtsReport {
            jd_match: jd_match.to_string(),
            missing_keywords: vec![],
            profile_summary: String::new(),
        };
        assert_eq!(report("0").match_percentage(), Some(0));
        assert_eq!(report(" 100 ").match_percentage(), Some(100));
        assert_eq!(report("250").match_percentage(), Some(100));
        assert_eq!(report("007").match_percentage(), Some(7));
        assert_eq!(
            report("99999999999999999999999").match_percentage(),
            Some(100)
        );
        assert_eq!(report("high").match_percentage(), None);
        assert_eq!(report("").match_percentage(), None);
    }
}
