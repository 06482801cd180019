use crate::extractor::extract_text;
use crate::models::{BatchOptions, ExtractedDocument, InputDocument, RankedEntry};
use crate::ocr::OcrEngine;
use crate::ranker::rank;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::warn;

/// Extract every document of a batch under a bounded worker pool.
///
/// Extractions are independent, so they run concurrently, but the output
/// always matches submission order regardless of completion order. A document
/// that fails, panics, or exceeds the deadline comes back with empty text
/// rather than being dropped; filtering unusable documents is the ranker's
/// job.
pub async fn extract_batch<O>(
    documents: Vec<InputDocument>,
    ocr: Arc<O>,
    options: &BatchOptions,
) -> Vec<ExtractedDocument>
where
    O: OcrEngine + 'static,
{
    let permits = Arc::new(Semaphore::new(options.max_workers.max(1)));
    let timeout = options.timeout;

    let mut handles = Vec::with_capacity(documents.len());
    for document in documents {
        let name = document.name.clone();
        let permits = Arc::clone(&permits);
        let ocr = Arc::clone(&ocr);

        let handle = tokio::spawn(async move {
            let _permit = permits
                .acquire_owned()
                .await
                .expect("extraction semaphore is never closed");
            let name = document.name.clone();

            let work = tokio::task::spawn_blocking(move || {
                let text = extract_text(&document, ocr.as_ref());
                ExtractedDocument {
                    name: document.name,
                    text,
                }
            });

            let joined = match timeout {
                Some(limit) => match tokio::time::timeout(limit, work).await {
                    Ok(joined) => joined,
                    Err(_elapsed) => {
                        warn!(
                            document = %name,
                            timeout_ms = limit.as_millis() as u64,
                            "extraction timed out, treating document as unusable"
                        );
                        return ExtractedDocument {
                            name,
                            text: String::new(),
                        };
                    }
                },
                None => work.await,
            };

            match joined {
                Ok(extracted) => extracted,
                Err(error) => {
                    warn!(
                        document = %name,
                        %error,
                        "extraction worker failed, treating document as unusable"
                    );
                    ExtractedDocument {
                        name,
                        text: String::new(),
                    }
                }
            }
        });

        handles.push((name, handle));
    }

    // Joining in submission order is what keeps the output aligned with the
    // input sequence.
    let mut extracted = Vec::with_capacity(handles.len());
    for (name, handle) in handles {
        match handle.await {
            Ok(document) => extracted.push(document),
            Err(error) => {
                warn!(document = %name, %error, "extraction task aborted, treating document as unusable");
                extracted.push(ExtractedDocument {
                    name,
                    text: String::new(),
                });
            }
        }
    }

    extracted
}

/// Run the whole screening pipeline: bounded concurrent extraction, then
/// ranking.
///
/// Document frequencies are corpus-global, so the ranker starts only after
/// every extraction has settled; the batch join above is that barrier.
pub async fn screen<O>(
    query: &str,
    documents: Vec<InputDocument>,
    ocr: Arc<O>,
    options: &BatchOptions,
) -> Vec<RankedEntry>
where
    O: OcrEngine + 'static,
{
    let extracted = extract_batch(documents, ocr, options).await;
    rank(query, &extracted)
}
