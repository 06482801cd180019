use thiserror::Error;

/// Failure of one extraction stage for one document.
///
/// These never cross the extractor's public boundary: `extract_text` converts
/// every variant into empty text after logging it, so callers see a total
/// function.
#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("pdf parse error: {0}")]
    PdfParse(String),

    #[error("rasterization error: {0}")]
    Rasterize(String),

    #[error("ocr error: {0}")]
    Ocr(String),

    #[error("required tool not installed: {0}")]
    ToolMissing(String),
}

pub type Result<T, E = ExtractError> = std::result::Result<T, E>;
