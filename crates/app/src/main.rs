use anyhow::Context;
use chrono::Utc;
use clap::Parser;
use resume_rank_core::{
    extract_batch, rank, BatchOptions, DocumentFormat, InputDocument, TesseractOcr,
    DEFAULT_OCR_DPI,
};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use walkdir::WalkDir;

#[derive(Parser)]
#[command(name = "resume-rank", version)]
struct Cli {
    /// Job description text.
    #[arg(long, conflicts_with = "job_description_file")]
    job_description: Option<String>,

    /// Read the job description from a file instead.
    #[arg(long)]
    job_description_file: Option<PathBuf>,

    /// Folder scanned recursively for resumes (pdf, jpg, jpeg, png).
    #[arg(long)]
    resumes: PathBuf,

    /// Concurrent extraction limit; defaults to the number of CPU cores.
    #[arg(long)]
    max_workers: Option<usize>,

    /// Per-resume extraction timeout in seconds (0 disables).
    #[arg(long, default_value = "0")]
    timeout_secs: u64,

    /// Rasterization resolution for the OCR fallback.
    #[arg(long, default_value_t = DEFAULT_OCR_DPI)]
    ocr_dpi: u32,

    /// Limit output to the best N resumes (0 = all).
    #[arg(long, default_value = "0")]
    top_k: usize,

    /// Emit the ranking as JSON instead of a table.
    #[arg(long, default_value_t = false)]
    json: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(fmt::layer())
        .init();

    let cli = Cli::parse();

    info!(
        version = env!("CARGO_PKG_VERSION"),
        started_at = %Utc::now().to_rfc3339(),
        "resume-rank boot"
    );

    let job_description = match (&cli.job_description, &cli.job_description_file) {
        (Some(text), _) => text.clone(),
        (None, Some(path)) => std::fs::read_to_string(path)
            .with_context(|| format!("reading job description from {}", path.display()))?,
        (None, None) => anyhow::bail!("provide --job-description or --job-description-file"),
    };

    if job_description.trim().is_empty() {
        anyhow::bail!("job description is empty");
    }

    let documents = load_documents(&cli.resumes)?;
    if documents.is_empty() {
        anyhow::bail!(
            "no supported resumes (pdf, jpg, jpeg, png) found in {}",
            cli.resumes.display()
        );
    }

    let mut options = BatchOptions::default();
    if let Some(max_workers) = cli.max_workers {
        options.max_workers = max_workers.max(1);
    }
    if cli.timeout_secs > 0 {
        options.timeout = Some(Duration::from_secs(cli.timeout_secs));
    }

    info!(
        resumes = documents.len(),
        max_workers = options.max_workers,
        "extracting resume text"
    );

    let ocr = Arc::new(TesseractOcr { dpi: cli.ocr_dpi });
    let extracted = extract_batch(documents, ocr, &options).await;

    let unranked: Vec<String> = extracted
        .iter()
        .filter(|document| !document.is_usable())
        .map(|document| document.name.clone())
        .collect();
    for name in &unranked {
        warn!(document = %name, "no text could be extracted, resume is not ranked");
    }

    let mut ranking = rank(&job_description, &extracted);
    if cli.top_k > 0 {
        ranking.truncate(cli.top_k);
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&ranking)?);
        return Ok(());
    }

    if ranking.is_empty() {
        println!("no resumes could be ranked");
        return Ok(());
    }

    println!("{:<6} {:<8} resume", "rank", "score");
    for entry in &ranking {
        println!("{:<6} {:<8.4} {}", entry.rank, entry.score, entry.name);
    }

    if !unranked.is_empty() {
        println!("not ranked (no extractable text): {}", unranked.join(", "));
    }

    Ok(())
}

fn load_documents(folder: &Path) -> anyhow::Result<Vec<InputDocument>> {
    let mut files = Vec::new();

    for entry in WalkDir::new(folder)
        .into_iter()
        .filter_map(|item| item.ok())
    {
        if !entry.file_type().is_file() {
            continue;
        }

        let format = entry
            .path()
            .extension()
            .and_then(|ext| ext.to_str())
            .and_then(DocumentFormat::from_extension);

        match format {
            Some(format) => files.push((entry.path().to_path_buf(), format)),
            None => warn!(path = %entry.path().display(), "unsupported file type, skipping"),
        }
    }

    // Sorted paths give a deterministic submission order, which is also the
    // tie-break order in the ranking.
    files.sort_unstable_by(|left, right| left.0.cmp(&right.0));

    let mut documents = Vec::with_capacity(files.len());
    for (path, format) in files {
        let bytes =
            std::fs::read(&path).with_context(|| format!("reading {}", path.display()))?;
        let name = path
            .file_name()
            .and_then(|name| name.to_str())
            .map(|name| name.to_string())
            .unwrap_or_else(|| path.display().to_string());

        documents.push(InputDocument {
            name,
            bytes,
            format,
        });
    }

    Ok(documents)
}
