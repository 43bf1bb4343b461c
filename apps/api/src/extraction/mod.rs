//! Text Extractor: turns an uploaded resume into plain text.
//!
//! PDF text layer first; OCR only when the text layer yields too little text
//! (scanned resumes). Both paths falling short is a terminal failure for the
//! request, never an empty success.

pub mod ocr;
pub mod text_layer;

use std::sync::Arc;

use bytes::Bytes;
use thiserror::Error;
use tracing::{info, warn};

use crate::extraction::ocr::OcrEngine;
use crate::extraction::text_layer::{join_pages, TextLayer};

/// A resume as received from the caller.
#[derive(Debug, Clone)]
pub enum DocumentInput {
    Pdf(Bytes),
    /// Already-extracted plain text.
    Text(String),
}

impl DocumentInput {
    pub fn is_empty(&self) -> bool {
        match self {
            DocumentInput::Pdf(bytes) => bytes.is_empty(),
            DocumentInput::Text(text) => text.trim().is_empty(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ExtractionError {
    #[error(
        "No usable text found in document: text layer yielded {text_layer_chars} characters, \
         OCR yielded {ocr_chars} (more than {threshold} required)"
    )]
    NoUsableText {
        threshold: usize,
        text_layer_chars: usize,
        ocr_chars: usize,
    },
}

/// Returns true if the bytes start with the PDF magic header.
pub fn is_pdf(head: &[u8]) -> bool {
    head.starts_with(b"%PDF-")
}

pub struct TextExtractor {
    text_layer: Arc<dyn TextLayer>,
    ocr: Arc<dyn OcrEngine>,
    /// Text must be strictly longer than this (in characters) to be usable.
    min_chars: usize,
}

impl TextExtractor {
    pub fn new(text_layer: Arc<dyn TextLayer>, ocr: Arc<dyn OcrEngine>, min_chars: usize) -> Self {
        Self {
            text_layer,
            ocr,
            min_chars,
        }
    }

    /// Callers reject empty documents up front (`DocumentInput::is_empty`);
    /// plain text is only trimmed here.
    pub async fn extract(&self, document: DocumentInput) -> Result<String, ExtractionError> {
        match document {
            DocumentInput::Text(text) => Ok(text.trim().to_string()),
            DocumentInput::Pdf(pdf) => self.extract_pdf(pdf).await,
        }
    }

    async fn extract_pdf(&self, pdf: Bytes) -> Result<String, ExtractionError> {
        let text = self.read_text_layer(pdf.clone()).await;
        let text_layer_chars = text.chars().count();
        if self.is_usable(text_layer_chars) {
            info!("Extracted {text_layer_chars} characters from PDF text layer");
            return Ok(text);
        }

        info!(
            "Text layer yielded {} characters (need more than {}); falling back to OCR ({})",
            text_layer_chars,
            self.min_chars,
            self.ocr.name()
        );

        let ocr_text = match self.ocr.recognize_pages(&pdf).await {
            Ok(pages) => join_pages(&pages),
            Err(e) => {
                warn!("OCR failed: {e}");
                String::new()
            }
        };
        let ocr_chars = ocr_text.chars().count();
        if self.is_usable(ocr_chars) {
            info!("Extracted {ocr_chars} characters via OCR");
            return Ok(ocr_text);
        }

        Err(ExtractionError::NoUsableText {
            threshold: self.min_chars,
            text_layer_chars,
            ocr_chars,
        })
    }

    /// Parsing runs on the blocking pool; a parser error or panic counts as an
    /// empty text layer so OCR still gets its chance.
    async fn read_text_layer(&self, pdf: Bytes) -> String {
        let layer = Arc::clone(&self.text_layer);
        match tokio::task::spawn_blocking(move || layer.pages(&pdf)).await {
            Ok(Ok(pages)) => join_pages(&pages),
            Ok(Err(e)) => {
                warn!("{e}");
                String::new()
            }
            Err(e) => {
                warn!("PDF text layer extraction aborted: {e}");
                String::new()
            }
        }
    }

    fn is_usable(&self, chars: usize) -> bool {
        chars > self.min_chars
    }
}
