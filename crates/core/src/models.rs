use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Declared format of an uploaded document.
///
/// The tag is derived from file naming by the caller, never sniffed from the
/// bytes; extraction strategy dispatches on it. New formats are added here and
/// in the extractor dispatch, nowhere else.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentFormat {
    Pdf,
    Jpeg,
    Png,
}

impl DocumentFormat {
    pub fn from_extension(extension: &str) -> Option<Self> {
        if extension.eq_ignore_ascii_case("pdf") {
            Some(Self::Pdf)
        } else if extension.eq_ignore_ascii_case("jpg") || extension.eq_ignore_ascii_case("jpeg") {
            Some(Self::Jpeg)
        } else if extension.eq_ignore_ascii_case("png") {
            Some(Self::Png)
        } else {
            None
        }
    }

    pub fn is_image(self) -> bool {
        matches!(self, Self::Jpeg | Self::Png)
    }
}

/// One uploaded document, owned by the request that submitted it.
#[derive(Debug, Clone)]
pub struct InputDocument {
    pub name: String,
    pub bytes: Vec<u8>,
    pub format: DocumentFormat,
}

/// Extraction output for one document. Empty text means the document is
/// unusable and will not be ranked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedDocument {
    pub name: String,
    pub text: String,
}

impl ExtractedDocument {
    pub fn is_usable(&self) -> bool {
        !self.text.trim().is_empty()
    }
}

/// One row of the ranking: dense 1-based rank, document name, cosine score in [0, 1].
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedEntry {
    pub rank: usize,
    pub name: String,
    pub score: f64,
}

/// Controls for the concurrent extraction stage.
#[derive(Debug, Clone)]
pub struct BatchOptions {
    /// Concurrent extraction limit. OCR holds full rasterization buffers in
    /// memory, so the pool stays bounded by CPU count rather than batch size.
    pub max_workers: usize,
    /// Per-document extraction deadline; a document that exceeds it degrades
    /// to unusable instead of stalling the batch. `None` means no deadline.
    pub timeout: Option<Duration>,
}

impl Default for BatchOptions {
    fn default() -> Self {
        Self {
            max_workers: std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(4),
            timeout: None,
        }
    }
}
