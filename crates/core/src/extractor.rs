use crate::error::ExtractError;
use crate::models::{DocumentFormat, InputDocument};
use crate::ocr::OcrEngine;
use lopdf::Document;
use tracing::{debug, warn};

/// Direct text-layer extraction from PDF bytes.
pub trait TextLayerExtractor {
    fn extract_text_layer(&self, bytes: &[u8]) -> Result<String, ExtractError>;
}

#[derive(Default)]
pub struct LopdfExtractor;

impl TextLayerExtractor for LopdfExtractor {
    fn extract_text_layer(&self, bytes: &[u8]) -> Result<String, ExtractError> {
        let document =
            Document::load_mem(bytes).map_err(|error| ExtractError::PdfParse(error.to_string()))?;

        let mut text = String::new();
        for (page_no, _page_id) in document.get_pages() {
            // A page with no text layer contributes the empty string; pages
            // are concatenated in page order with no separator.
            let page_text = document.extract_text(&[page_no]).unwrap_or_default();
            text.push_str(&page_text);
        }

        Ok(text.trim().to_string())
    }
}

/// Convert one document into normalized text.
///
/// Total function: every internal failure is logged with the document name and
/// degrades to empty text, which the ranker treats as "not rankable". PDFs try
/// the text layer first and fall back to rasterize-and-recognize when it is
/// empty; images go straight to recognition.
pub fn extract_text<O>(document: &InputDocument, ocr: &O) -> String
where
    O: OcrEngine + ?Sized,
{
    match extract_inner(document, ocr) {
        Ok(text) => text,
        Err(error) => {
            warn!(
                document = %document.name,
                %error,
                "extraction failed, treating document as unusable"
            );
            String::new()
        }
    }
}

fn extract_inner<O>(document: &InputDocument, ocr: &O) -> Result<String, ExtractError>
where
    O: OcrEngine + ?Sized,
{
    if document.format == DocumentFormat::Pdf {
        let text = LopdfExtractor.extract_text_layer(&document.bytes)?;
        if !text.is_empty() {
            return Ok(text);
        }

        debug!(document = %document.name, "pdf has no usable text layer, falling back to ocr");
        let pages = ocr.recognize_pdf_pages(&document.bytes)?;
        return Ok(pages.join("\n").trim().to_string());
    }

    let recognized = ocr.recognize_image(&document.bytes, document.format)?;
    Ok(recognized.trim().to_string())
}
