//! OCR fallback for scanned or image-only PDFs.
//!
//! The default engine shells out to Poppler's `pdftoppm` to rasterise each
//! page and to the `tesseract` CLI to read each page image. Rendered images
//! live in a temporary directory that is removed when recognition finishes.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use tokio::process::Command;
use tracing::debug;

use crate::config::OcrConfig;

#[derive(Debug, Error)]
pub enum OcrError {
    #[error("OCR binary '{0}' was not found on PATH")]
    MissingBinary(String),

    #[error("'{program}' exited with {status}: {stderr}")]
    CommandFailed {
        program: String,
        status: std::process::ExitStatus,
        stderr: String,
    },

    #[error("'{program}' did not finish within {after:?}")]
    TimedOut { program: String, after: Duration },

    #[error("PDF rendered to zero page images")]
    NoPages,

    #[error("OCR I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Trait that every OCR backend implements.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Engine identifier, for logs.
    fn name(&self) -> &'static str;

    /// Recognises the text of every page of a PDF, in page order.
    async fn recognize_pages(&self, pdf: &[u8]) -> Result<Vec<String>, OcrError>;
}

/// Poppler + Tesseract command-line OCR.
pub struct TesseractOcr {
    config: OcrConfig,
}

impl TesseractOcr {
    pub fn new(config: OcrConfig) -> Self {
        Self { config }
    }

    async fn render_pages(&self, workdir: &Path, pdf: &[u8]) -> Result<Vec<PathBuf>, OcrError> {
        let input = workdir.join("document.pdf");
        tokio::fs::write(&input, pdf).await?;

        let mut command = Command::new(&self.config.pdftoppm_bin);
        command
            .arg("-r")
            .arg(self.config.dpi.to_string())
            .arg("-png")
            .arg(&input)
            .arg(workdir.join("page"));
        run(&self.config.pdftoppm_bin, &mut command, self.config.timeout).await?;

        let mut images = Vec::new();
        let mut entries = tokio::fs::read_dir(workdir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) == Some("png") {
                images.push(path);
            }
        }
        images.sort_by_key(|p| page_number(p));
        Ok(images)
    }
}

#[async_trait]
impl OcrEngine for TesseractOcr {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize_pages(&self, pdf: &[u8]) -> Result<Vec<String>, OcrError> {
        let workdir = tempfile::tempdir()?;
        let images = self.render_pages(workdir.path(), pdf).await?;
        if images.is_empty() {
            return Err(OcrError::NoPages);
        }
        debug!("Rendered {} page images for OCR", images.len());

        let mut pages = Vec::with_capacity(images.len());
        for image in &images {
            let mut command = Command::new(&self.config.tesseract_bin);
            command
                .arg(image)
                .arg("stdout")
                .arg("-l")
                .arg(&self.config.language);
            let stdout = run(&self.config.tesseract_bin, &mut command, self.config.timeout).await?;
            pages.push(String::from_utf8_lossy(&stdout).into_owned());
        }

        Ok(pages)
    }
}

/// Runs one OCR command. The child is killed if it outlives `limit`.
async fn run(program: &str, command: &mut Command, limit: Duration) -> Result<Vec<u8>, OcrError> {
    let output = command.stdin(Stdio::null()).kill_on_drop(true).output();
    let output = tokio::time::timeout(limit, output)
        .await
        .map_err(|_| OcrError::TimedOut {
            program: program.to_string(),
            after: limit,
        })?
        .map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => OcrError::MissingBinary(program.to_string()),
            _ => OcrError::Io(e),
        })?;

    if !output.status.success() {
        return Err(OcrError::CommandFailed {
            program: program.to_string(),
            status: output.status,
            stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
        });
    }

    Ok(output.stdout)
}

/// `pdftoppm` names pages `page-1.png` or zero-padded `page-01.png`.
fn page_number(path: &Path) -> u32 {
    path.file_stem()
        .and_then(|s| s.to_str())
        .and_then(|s| s.rsplit('-').next())
        .and_then(|n| n.parse().ok())
        .unwrap_or(u32::MAX)
}
