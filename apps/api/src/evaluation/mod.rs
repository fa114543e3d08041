// Resume evaluation: PDF text extraction, ATS prompt, model call, report parsing.
// All model calls go through llm_client; no direct Gemini HTTP calls here.

pub mod evaluator;
pub mod handlers;
pub mod pdf_text;
pub mod prompts;
