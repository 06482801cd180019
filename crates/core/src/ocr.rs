use crate::error::ExtractError;
use crate::models::DocumentFormat;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;

/// Rasterization resolution used when a PDF has no text layer.
pub const DEFAULT_OCR_DPI: u32 = 200;

/// Optical recognition backend.
///
/// The extractor only needs two shapes of input: a PDF whose pages must be
/// rasterized and recognized independently (page order preserved), and a
/// single image treated as one page. Tests substitute a fake engine.
pub trait OcrEngine: Send + Sync {
    fn recognize_pdf_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError>;

    fn recognize_image(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError>;
}

/// Shells out to poppler's `pdftoppm` for rasterization and to `tesseract`
/// for recognition, staging pages through a temp directory.
#[derive(Debug, Clone, Copy)]
pub struct TesseractOcr {
    pub dpi: u32,
}

impl Default for TesseractOcr {
    fn default() -> Self {
        Self { dpi: DEFAULT_OCR_DPI }
    }
}

impl OcrEngine for TesseractOcr {
    fn recognize_pdf_pages(&self, bytes: &[u8]) -> Result<Vec<String>, ExtractError> {
        let workdir = tempfile::tempdir()?;
        let pdf_path = workdir.path().join("input.pdf");
        fs::write(&pdf_path, bytes)?;

        let dpi = self.dpi.to_string();
        let pdf_arg = pdf_path.to_string_lossy().to_string();
        let prefix_arg = workdir.path().join("page").to_string_lossy().to_string();

        run_tool("pdftoppm", &["-r", &dpi, "-png", &pdf_arg, &prefix_arg]).map_err(
            |error| match error {
                ExtractError::ToolMissing(_) => error,
                other => ExtractError::Rasterize(other.to_string()),
            },
        )?;

        let mut page_files = Vec::new();
        for entry in fs::read_dir(workdir.path())? {
            let entry = entry?;
            let file_name = entry.file_name().to_string_lossy().to_string();
            if file_name.starts_with("page-") && file_name.ends_with(".png") {
                page_files.push(entry.path());
            }
        }

        if page_files.is_empty() {
            return Err(ExtractError::Rasterize(
                "pdf produced no page bitmaps".to_string(),
            ));
        }

        // pdftoppm zero-pads page numbers, so lexicographic order is page order.
        page_files.sort_unstable();

        let mut pages = Vec::with_capacity(page_files.len());
        for path in page_files {
            pages.push(recognize_file(&path)?);
        }

        Ok(pages)
    }

    fn recognize_image(&self, bytes: &[u8], format: DocumentFormat) -> Result<String, ExtractError> {
        let suffix = match format {
            DocumentFormat::Png => ".png",
            _ => ".jpg",
        };

        let mut image = tempfile::Builder::new()
            .prefix("resume-rank-")
            .suffix(suffix)
            .tempfile()?;
        image.write_all(bytes)?;

        recognize_file(image.path())
    }
}

fn recognize_file(path: &Path) -> Result<String, ExtractError> {
    let path_arg = path.to_string_lossy().to_string();
    run_tool("tesseract", &[&path_arg, "stdout"])
}

fn run_tool(binary: &str, args: &[&str]) -> Result<String, ExtractError> {
    let output = Command::new(binary).args(args).output().map_err(|error| {
        if error.kind() == std::io::ErrorKind::NotFound {
            ExtractError::ToolMissing(binary.to_string())
        } else {
            ExtractError::Io(error)
        }
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ExtractError::Ocr(format!(
            "{binary} exited with {}: {}",
            output.status,
            stderr.trim()
        )));
    }

    Ok(String::from_utf8_lossy(&output.stdout).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_binary_is_reported_as_tool_missing() {
        let result = run_tool("resume-rank-no-such-binary", &["--version"]);
        assert!(matches!(result, Err(ExtractError::ToolMissing(name)) if name.contains("no-such-binary")));
    }

    #[test]
    fn default_engine_uses_default_dpi() {
        assert_eq!(TesseractOcr::default().dpi, DEFAULT_OCR_DPI);
    }
}
