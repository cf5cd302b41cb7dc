use bytes::Bytes;

const OFFICE_EXTENSIONS: &[&str] = &["doc", "docx", "xls", "xlsx", "ppt", "pptx", "odt", "rtf"];
const OFFICE_MIME_MARKERS: &[&str] = &["word", "document", "spreadsheet", "presentation"];

/// A file received in a multipart request. Lives for the duration of the request.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    pub name: String,
    pub size: u64,
    pub content_type: String,
    pub data: Bytes,
}

impl UploadedFile {
    pub fn new(name: impl Into<String>, content_type: impl Into<String>, data: Bytes) -> Self {
        Self {
            name: name.into(),
            size: data.len() as u64,
            content_type: content_type.into(),
            data,
        }
    }

    /// Lowercased extension of the client-supplied filename, if any.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }

    pub fn is_pdf(&self) -> bool {
        self.content_type.eq_ignore_ascii_case("application/pdf")
            || self.extension().as_deref() == Some("pdf")
    }

    /// Word processing, spreadsheet and presentation formats the external API converts to PDF.
    pub fn is_office_document(&self) -> bool {
        if self.is_pdf() {
            return false;
        }
        let mime = self.content_type.to_ascii_lowercase();
        OFFICE_MIME_MARKERS.iter().any(|marker| mime.contains(marker))
            || self
                .extension()
                .map(|ext| OFFICE_EXTENSIONS.contains(&ext.as_str()))
                .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file(name: &str, mime: &str) -> UploadedFile {
        UploadedFile::new(name, mime, Bytes::from_static(b"content"))
    }

    #[test]
    fn test_size_matches_data() {
        assert_eq!(file("a.txt", "text/plain").size, 7);
    }

    #[test]
    fn test_pdf_detection() {
        assert!(file("report.pdf", "application/octet-stream").is_pdf());
        assert!(file("report", "application/pdf").is_pdf());
        assert!(!file("report.docx", "application/octet-stream").is_pdf());
    }

    #[test]
    fn test_office_detection_by_mime() {
        let docx = file(
            "x",
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        );
        assert!(docx.is_office_document());
        assert!(file("x", "application/msword").is_office_document());
        assert!(file("x", "application/vnd.ms-powerpoint.presentation").is_office_document());
    }

    #[test]
    fn test_office_detection_by_extension() {
        assert!(file("Budget.XLSX", "application/octet-stream").is_office_document());
        assert!(file("notes.rtf", "").is_office_document());
        assert!(!file("photo.png", "image/png").is_office_document());
        assert!(!file("report.pdf", "application/pdf").is_office_document());
    }

    #[test]
    fn test_extension_edge_cases() {
        assert_eq!(file(".hidden", "").extension(), None);
        assert_eq!(file("trailing.", "").extension(), None);
        assert_eq!(file("noext", "").extension(), None);
    }
}
