pub mod error;
pub mod extractor;
pub mod models;
pub mod ocr;
pub mod pipeline;
pub mod ranker;

pub use error::ExtractError;
pub use extractor::{extract_text, LopdfExtractor, TextLayerExtractor};
pub use models::{BatchOptions, DocumentFormat, ExtractedDocument, InputDocument, RankedEntry};
pub use ocr::{OcrEngine, TesseractOcr, DEFAULT_OCR_DPI};
pub use pipeline::{extract_batch, screen};
pub use ranker::{cosine_similarity, rank, tokenize, TermWeightSpace};
