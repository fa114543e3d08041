//! PDF text extraction for uploaded resumes.
//!
//! Pages are read in document order; blank pages are skipped, not treated as errors.
//! A document with no text layer at all (scanned images) is an extraction error.

use bytes::Bytes;
use tracing::debug;

use crate::errors::AppError;

/// PDF magic bytes: %PDF-
const PDF_MAGIC: &[u8] = b"%PDF-";
/// Readers accept the header anywhere in the first 1024 bytes.
const HEADER_SEARCH_WINDOW: usize = 1024;

const NO_TEXT_LAYER: &str = "No text could be extracted. Ensure the PDF is not a scanned image.";

/// Extracts the text of every page and joins the non-empty ones with a single space.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, AppError> {
    if !has_pdf_header(bytes) {
        return Err(AppError::Extraction(
            "uploaded file is not a PDF document".to_string(),
        ));
    }

    let pages = pdf_extract::extract_text_from_mem_by_pages(bytes)
        .map_err(|e| AppError::Extraction(e.to_string()))?;

    debug!("Extracted {} page(s) from PDF", pages.len());
    join_page_texts(pages)
}

fn has_pdf_header(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(HEADER_SEARCH_WINDOW + PDF_MAGIC.len() - 1)];
    window.windows(PDF_MAGIC.len()).any(|w| w == PDF_MAGIC)
}

/// Async wrapper: parsing is CPU-bound, so it runs on the blocking pool.
/// A parser panic is reported as an extraction error.
pub async fn extract_pdf_text_blocking(bytes: Bytes) -> Result<String, AppError> {
    tokio::task::spawn_blocking(move || extract_pdf_text(&bytes))
        .await
        .map_err(|e| {
            if e.is_panic() {
                AppError::Extraction("PDF parser failed on this document".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
            }
        })?
}

fn join_page_texts<I>(pages: I) -> Result<String, AppError>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    // Whitespace-only pages count as blank; kept pages are joined as extracted.
    let texts: Vec<String> = pages
        .into_iter()
        .map(|page| page.as_ref().to_string())
        .filter(|page| !page.trim().is_empty())
        .collect();

    if texts.is_empty() {
        return Err(AppError::Extraction(NO_TEXT_LAYER.to_string()));
    }

    Ok(texts.join(" "))
}
