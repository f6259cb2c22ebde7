use std::fs;
use std::path::Path;

use crate::domain::{ports::DocumentConverter, PipelineError, Result};

/// Extension-dispatched file converter producing normalized text.
///
/// PDFs go through `pdf-extract`, DOCX through `docx-rs`, and anything
/// with a text mime type is read as-is. Tabs are replaced by spaces in
/// every output. Everything else is a conversion failure.
pub struct MarkdownConverter;

impl MarkdownConverter {
    pub fn new() -> Self {
        Self
    }

    fn read_pdf(path: &Path) -> Result<String> {
        pdf_extract::extract_text(path)
            .map_err(|e| PipelineError::conversion(format!("{}: {e}", path.display())))
    }

    fn read_docx(path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .map_err(|e| PipelineError::conversion(format!("{}: {e}", path.display())))?;
        let docx = docx_rs::read_docx(&bytes)
            .map_err(|e| PipelineError::conversion(format!("{}: {e}", path.display())))?;

        let mut text = String::new();
        for child in docx.document.children {
            if let docx_rs::DocumentChild::Paragraph(paragraph) = child {
                for child in paragraph.children {
                    if let docx_rs::ParagraphChild::Run(run) = child {
                        for child in run.children {
                            if let docx_rs::RunChild::Text(t) = child {
                                text.push_str(&t.text);
                            }
                        }
                    }
                }
                text.push('\n');
            }
        }
        Ok(text)
    }

    fn read_text(path: &Path) -> Result<String> {
        let bytes = fs::read(path)
            .map_err(|e| PipelineError::conversion(format!("{}: {e}", path.display())))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}

impl Default for MarkdownConverter {
    fn default() -> Self {
        Self::new()
    }
}

impl DocumentConverter for MarkdownConverter {
    fn convert(&self, path: &Path) -> Result<String> {
        let extension = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        let text = match extension.as_str() {
            "pdf" => Self::read_pdf(path)?,
            "docx" => Self::read_docx(path)?,
            "txt" | "md" | "markdown" | "csv" | "log" => Self::read_text(path)?,
            _ => {
                let mime = mime_guess::from_path(path).first_or_octet_stream();
                if mime.type_() == mime_guess::mime::TEXT {
                    Self::read_text(path)?
                } else {
                    return Err(PipelineError::conversion(format!(
                        "unsupported file type: {}",
                        path.display()
                    )));
                }
            }
        };

        Ok(text.replace('\t', " "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn plain_text_is_read_and_tabs_normalized() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("notes.txt");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(b"col1\tcol2\nrow").unwrap();

        let text = MarkdownConverter::new().convert(&path).unwrap();
        assert_eq!(text, "col1 col2\nrow");
    }

    #[test]
    fn markdown_extension_is_treated_as_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("readme.md");
        std::fs::write(&path, "# Title\n\nbody").unwrap();

        let text = MarkdownConverter::new().convert(&path).unwrap();
        assert!(text.starts_with("# Title"));
    }

    #[test]
    fn unsupported_binary_extension_fails() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("image.png");
        std::fs::write(&path, [0u8; 8]).unwrap();

        let err = MarkdownConverter::new().convert(&path).unwrap_err();
        assert!(matches!(err, PipelineError::Conversion(_)));
    }

    #[test]
    fn missing_file_is_a_conversion_error() {
        let err = MarkdownConverter::new()
            .convert(Path::new("/nonexistent/void.txt"))
            .unwrap_err();
        assert!(matches!(err, PipelineError::Conversion(_)));
    }
}
