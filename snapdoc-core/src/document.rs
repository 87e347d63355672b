//! The finalized multi-page document and its metadata.

use crate::error::Result;
use crate::page::Page;
use crate::writer::PdfWriter;
use chrono::{DateTime, Utc};

/// A finished (or in-progress) multi-page document.
///
/// Built incrementally by the assembler; once exported it is only read.
///
/// # Example
///
/// ```rust
/// use snapdoc::{Document, Page};
///
/// let mut doc = Document::new();
/// doc.set_title("Assessment Report");
/// doc.add_page(Page::new(595.0, 842.0));
///
/// let mut buffer = Vec::new();
/// doc.write(&mut buffer).unwrap();
/// assert!(buffer.starts_with(b"%PDF-1.7"));
/// ```
pub struct Document {
    pub(crate) pages: Vec<Page>,
    pub(crate) metadata: DocumentMetadata,
}

/// Document information dictionary fields.
#[derive(Debug, Clone)]
pub struct DocumentMetadata {
    /// Document title
    pub title: Option<String>,
    /// Document subject
    pub subject: Option<String>,
    /// Software that created the source content
    pub creator: Option<String>,
    /// Software that produced the file
    pub producer: Option<String>,
    /// Creation timestamp
    pub creation_date: Option<DateTime<Utc>>,
    /// Last modification timestamp
    pub modification_date: Option<DateTime<Utc>>,
}

impl Default for DocumentMetadata {
    fn default() -> Self {
        let now = Utc::now();
        Self {
            title: None,
            subject: None,
            creator: Some("snapdoc".to_string()),
            producer: Some(format!("snapdoc v{}", env!("CARGO_PKG_VERSION"))),
            creation_date: Some(now),
            modification_date: Some(now),
        }
    }
}

impl Document {
    /// Creates a new empty document.
    pub fn new() -> Self {
        Self {
            pages: Vec::new(),
            metadata: DocumentMetadata::default(),
        }
    }

    /// Appends a finalized page.
    pub fn add_page(&mut self, page: Page) {
        self.pages.push(page);
    }

    /// Sets the document title.
    pub fn set_title(&mut self, title: impl Into<String>) {
        self.metadata.title = Some(title.into());
    }

    /// Sets the document subject.
    pub fn set_subject(&mut self, subject: impl Into<String>) {
        self.metadata.subject = Some(subject.into());
    }

    /// Sets the creator (software that produced the source content).
    pub fn set_creator(&mut self, creator: impl Into<String>) {
        self.metadata.creator = Some(creator.into());
    }

    /// Number of pages.
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Pages in order.
    pub fn pages(&self) -> &[Page] {
        &self.pages
    }

    /// Writes the document to a file.
    pub fn save(&mut self, path: impl AsRef<std::path::Path>) -> Result<()> {
        self.metadata.modification_date = Some(Utc::now());
        let mut writer = PdfWriter::create(path)?;
        writer.write_document(self)?;
        Ok(())
    }

    /// Serializes the document into a buffer.
    pub fn write(&mut self, buffer: &mut Vec<u8>) -> Result<()> {
        self.metadata.modification_date = Some(Utc::now());
        let mut writer = PdfWriter::new_with_writer(buffer);
        writer.write_document(self)?;
        Ok(())
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}
