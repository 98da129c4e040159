//! PDF text extraction: whole file in memory, pages in document order.

use bytes::Bytes;
use thiserror::Error;

use crate::errors::AppError;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// An uploaded resume: the raw bytes plus the declared media type.
/// Lives for the duration of one analysis request.
#[derive(Debug, Clone)]
pub struct ResumeFile {
    pub bytes: Bytes,
    pub media_type: String,
}

impl ResumeFile {
    pub fn is_pdf(&self) -> bool {
        self.media_type == PDF_MEDIA_TYPE
    }
}

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("not a PDF: {0}")]
    InvalidFormat(String),

    #[error("failed to parse PDF: {0}")]
    Malformed(String),
}

impl From<ExtractError> for AppError {
    fn from(e: ExtractError) -> Self {
        match e {
            ExtractError::InvalidFormat(msg) => AppError::InvalidFormat(msg),
            ExtractError::Malformed(msg) => AppError::Extraction(msg),
        }
    }
}

pub struct PdfTextExtractor;

impl PdfTextExtractor {
    /// Extracts the document's text: pages in ascending order, items within a
    /// page joined by single spaces, pages separated by newlines.
    ///
    /// The media-type gate runs before any parsing. Parsing happens on a
    /// blocking thread so the caller suspends without stalling the runtime,
    /// and a parser panic surfaces as `Malformed` rather than taking the
    /// request down. Zero extracted pages is not an error — it yields empty
    /// text, which the pipeline treats as nothing to analyze.
    pub async fn extract(&self, file: &ResumeFile) -> Result<String, ExtractError> {
        if !file.is_pdf() {
            return Err(ExtractError::InvalidFormat(format!(
                "expected {PDF_MEDIA_TYPE}, got {}",
                if file.media_type.is_empty() {
                    "no media type"
                } else {
                    file.media_type.as_str()
                }
            )));
        }

        let bytes = file.bytes.clone();
        let pages = tokio::task::spawn_blocking(move || {
            pdf_extract::extract_text_from_mem_by_pages(&bytes)
        })
        .await
        .map_err(|e| ExtractError::Malformed(format!("PDF parser crashed: {e}")))?
        .map_err(|e| ExtractError::Malformed(e.to_string()))?;

        Ok(join_pages(&pages))
    }
}

fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| normalize_page(p))
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

fn normalize_page(page: &str) -> String {
    page.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Minimal well-formed PDFs for tests, assembled with computed xref offsets.
#[cfg(test)]
pub(crate) mod fixtures {
    /// One page per entry in `pages`, each carrying a single text run.
    pub fn pdf_with_pages(pages: &[&str]) -> Vec<u8> {
        // Object numbering: 1 catalog, 2 page tree, 3 font, then a
        // page/content pair per page.
        let mut objects: Vec<(usize, String)> = Vec::new();
        let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 4 + 2 * i)).collect();
        objects.push((1, "<< /Type /Catalog /Pages 2 0 R >>".to_string()));
        objects.push((
            2,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
        ));
        objects.push((
            3,
            "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string(),
        ));
        for (i, text) in pages.iter().enumerate() {
            let page_num = 4 + 2 * i;
            let content_num = page_num + 1;
            objects.push((
                page_num,
                format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                     /Resources << /Font << /F1 3 0 R >> >> /Contents {content_num} 0 R >>"
                ),
            ));
            let escaped = text
                .replace('\\', "\\\\")
                .replace('(', "\\(")
                .replace(')', "\\)");
            let stream = format!("BT /F1 12 Tf 72 720 Td ({escaped}) Tj ET");
            objects.push((
                content_num,
                format!(
                    "<< /Length {} >>\nstream\n{}\nendstream",
                    stream.len(),
                    stream
                ),
            ));
        }

        let mut out: Vec<u8> = b"%PDF-1.4\n".to_vec();
        let mut offsets = vec![0usize; objects.len() + 1];
        for (num, body) in &objects {
            offsets[*num] = out.len();
            out.extend_from_slice(format!("{num} 0 obj\n{body}\nendobj\n").as_bytes());
        }
        let xref_offset = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            out.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_offset}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        out
    }
}
