//! Embedded text layer of a PDF, read page by page.

use thiserror::Error;

#[derive(Debug, Error)]
#[error("PDF text layer could not be read: {0}")]
pub struct TextLayerError(pub String);

/// Reads the embedded text of each page, in page order.
pub trait TextLayer: Send + Sync {
    fn pages(&self, pdf: &[u8]) -> Result<Vec<String>, TextLayerError>;
}

/// `pdf-extract` backed text layer.
pub struct PdfExtractTextLayer;

impl TextLayer for PdfExtractTextLayer {
    fn pages(&self, pdf: &[u8]) -> Result<Vec<String>, TextLayerError> {
        pdf_extract::extract_text_from_mem_by_pages(pdf).map_err(|e| TextLayerError(e.to_string()))
    }
}

/// Joins the non-empty pages with a blank line, preserving page order.
pub fn join_pages(pages: &[String]) -> String {
    pages
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect::<Vec<_>>()
        .join("\n\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_join_pages_skips_blank_pages() {
        let pages = vec![
            "  Page one text ".to_string(),
            "   \n ".to_string(),
            "Page three".to_string(),
        ];
        assert_eq!(join_pages(&pages), "Page one text\n\nPage three");
    }

    #[test]
    fn test_join_pages_empty_document() {
        assert_eq!(join_pages(&[]), "");
    }

    /// Builds an uncompressed PDF with one Helvetica text line per page.
    /// `None` pages have an empty content stream.
    fn pdf_with_pages(pages: &[Option<&str>]) -> Vec<u8> {
        let font_id = 3 + 2 * pages.len();
        let kids: Vec<String> = (0..pages.len()).map(|i| format!("{} 0 R", 3 + 2 * i)).collect();

        let mut objects = vec![
            "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                pages.len()
            ),
        ];
        for (i, page) in pages.iter().enumerate() {
            let content = match page {
                Some(text) => format!("BT /F1 12 Tf 72 720 Td ({text}) Tj ET"),
                None => String::new(),
            };
            objects.push(format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 612 792] \
                 /Resources << /Font << /F1 {font_id} 0 R >> >> /Contents {} 0 R >>",
                4 + 2 * i
            ));
            objects.push(format!(
                "<< /Length {} >>\nstream\n{content}\nendstream",
                content.len()
            ));
        }
        objects.push("<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica >>".to_string());

        let mut pdf = b"%PDF-1.4\n".to_vec();
        let mut offsets = Vec::with_capacity(objects.len());
        for (i, object) in objects.iter().enumerate() {
            offsets.push(pdf.len());
            pdf.extend_from_slice(format!("{} 0 obj\n{object}\nendobj\n", i + 1).as_bytes());
        }

        let xref_start = pdf.len();
        pdf.extend_from_slice(format!("xref\n0 {}\n", objects.len() + 1).as_bytes());
        pdf.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets {
            pdf.extend_from_slice(format!("{offset:010} 00000 n \n").as_bytes());
        }
        pdf.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root 1 0 R >>\nstartxref\n{xref_start}\n%%EOF\n",
                objects.len() + 1
            )
            .as_bytes(),
        );
        pdf
    }

    #[test]
    fn test_pdf_extract_reads_each_page_separately() {
        let pdf = pdf_with_pages(&[Some("First page resume text"), Some("Second page resume text")]);
        let pages = PdfExtractTextLayer.pages(&pdf).unwrap();

        assert_eq!(pages.len(), 2);
        assert!(pages[0].contains("First"));
        assert!(!pages[0].contains("Second"));
        assert!(pages[1].contains("Second"));
    }

    #[test]
    fn test_blank_interior_page_is_dropped_when_joined() {
        let pdf = pdf_with_pages(&[Some("Experience"), None, Some("Education")]);
        let pages = PdfExtractTextLayer.pages(&pdf).unwrap();

        assert_eq!(pages.len(), 3);
        assert!(pages[1].trim().is_empty());
        assert_eq!(join_pages(&pages), "Experience\n\nEducation");
    }
}
