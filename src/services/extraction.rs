// Text Extraction Service
// Turns an uploaded document into the single text string the segmenter eats

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractError {
    #[error("Unreadable PDF: {0}")]
    Unreadable(String),
    #[error("Document contains no extractable text")]
    EmptyText,
    #[error("Unsupported file type: {0}")]
    UnsupportedType(String),
    #[error("File is not valid UTF-8 text")]
    InvalidEncoding,
}

/// Extract the full text of a PDF. Page texts come back newline-separated
/// in page order. Corrupt input is an error, and so is an extraction that
/// yields only whitespace — callers never see a silently empty document.
pub fn extract_pdf_text(bytes: &[u8]) -> Result<String, ExtractError> {
    let text = pdf_extract::extract_text_from_mem(bytes)
        .map_err(|e| ExtractError::Unreadable(e.to_string()))?;

    if text.trim().is_empty() {
        return Err(ExtractError::EmptyText);
    }

    Ok(text)
}

/// Dispatch extraction on the file extension. `.pdf` goes through the PDF
/// extractor; `.txt` and `.md` are decoded as UTF-8.
pub fn extract_document_text(file_name: &str, bytes: &[u8]) -> Result<String, ExtractError> {
    let extension = file_name
        .rsplit('.')
        .next()
        .map(|ext| ext.to_ascii_lowercase())
        .unwrap_or_default();

    match extension.as_str() {
        "pdf" => extract_pdf_text(bytes),
        "txt" | "md" => {
            let text = std::str::from_utf8(bytes).map_err(|_| ExtractError::InvalidEncoding)?;
            if text.trim().is_empty() {
                return Err(ExtractError::EmptyText);
            }
            Ok(text.to_string())
        }
        other => Err(ExtractError::UnsupportedType(other.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_passthrough() {
        let text = extract_document_text("policy.txt", b"We process data lawfully.").unwrap();
        assert_eq!(text, "We process data lawfully.");
    }

    #[test]
    fn test_blank_text_is_an_error() {
        let err = extract_document_text("policy.txt", b"   \n\t ").unwrap_err();
        assert!(matches!(err, ExtractError::EmptyText));
    }

    #[test]
    fn test_unsupported_extension() {
        let err = extract_document_text("policy.docx", b"irrelevant").unwrap_err();
        assert!(matches!(err, ExtractError::UnsupportedType(ext) if ext == "docx"));
    }

    #[test]
    fn test_corrupt_pdf_is_unreadable() {
        let err = extract_document_text("policy.pdf", b"not a pdf at all").unwrap_err();
        assert!(matches!(err, ExtractError::Unreadable(_)));
    }

    #[test]
    fn test_invalid_utf8_text_file() {
        let err = extract_document_text("policy.txt", &[0xff, 0xfe, 0x00]).unwrap_err();
        assert!(matches!(err, ExtractError::InvalidEncoding));
    }
}
