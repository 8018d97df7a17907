//! Text extraction seam.
//!
//! The worker pool only needs two capabilities from a document library:
//! open a byte stream into a document, and export that document's text.
//! Any implementation of [`TextExtractor`] can be plugged in; PDF and plain
//! text are provided.
use std::io::Read;
use tracing::trace;

use crate::errors::{ScanError, ScanResult};

/// Capability to turn a document stream into searchable text
pub trait TextExtractor: Send + Sync {
    /// Parsed form of one document
    type Document;

    /// Reads and parses a document. Fails with [`ScanError::Parse`] on
    /// unreadable or malformed input
    fn open(&self, reader: &mut dyn Read) -> ScanResult<Self::Document>;

    /// Exports the document's text content as raw bytes. Fails with
    /// [`ScanError::Extract`]
    fn extract_text(&self, document: Self::Document) -> ScanResult<Vec<u8>>;
}

const PDF_SIGNATURE: &[u8] = b"%PDF-";

// Readers tolerate junk before the header within the first kilobyte
const PDF_SIGNATURE_WINDOW: usize = 1024;

/// A PDF file that passed the signature check
#[derive(Debug)]
pub struct PdfDocument {
    bytes: Vec<u8>,
}

/// Extracts text from PDF documents using `pdf-extract`
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfExtractor;

impl PdfExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PdfExtractor {
    type Document = PdfDocument;

    fn open(&self, reader: &mut dyn Read) -> ScanResult<PdfDocument> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ScanError::parse(format!("read failed: {}", e)))?;

        let window = &bytes[..bytes.len().min(PDF_SIGNATURE_WINDOW)];
        if !window
            .windows(PDF_SIGNATURE.len())
            .any(|w| w == PDF_SIGNATURE)
        {
            return Err(ScanError::parse("missing %PDF- signature"));
        }

        trace!("Opened PDF document ({} bytes)", bytes.len());
        Ok(PdfDocument { bytes })
    }

    fn extract_text(&self, document: PdfDocument) -> ScanResult<Vec<u8>> {
        pdf_extract::extract_text_from_mem(&document.bytes)
            .map(String::into_bytes)
            .map_err(|e| ScanError::extract(e.to_string()))
    }
}

/// Treats the file contents as already-extracted text
#[derive(Debug, Clone, Copy, Default)]
pub struct PlainTextExtractor;

impl PlainTextExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl TextExtractor for PlainTextExtractor {
    type Document = Vec<u8>;

    fn open(&self, reader: &mut dyn Read) -> ScanResult<Vec<u8>> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|e| ScanError::parse(format!("read failed: {}", e)))?;
        Ok(bytes)
    }

    fn extract_text(&self, document: Vec<u8>) -> ScanResult<Vec<u8>> {
        Ok(document)
    }
}
