//! Batch fetch/structure coordinator.
//!
//! Pulls candidate URLs in shrinking batches, fetches and structures each
//! batch concurrently, and stops once the target number of acceptable
//! documents is collected or the candidates run out. Per-URL failures are
//! logged and filtered; they never fail the batch.

use std::collections::HashMap;
use std::sync::Arc;

use reqwest::Client;
use tokio::sync::Semaphore;
use tracing::{debug, info, instrument, warn};

use deepbrief_extract::prefilter;
use deepbrief_shared::{FetchConfig, Result, SearchHit, StructuredDocument};

use crate::client::build_client;

/// Minimum total character count for a document to be accepted.
const MIN_DOCUMENT_CHARS: usize = 150;

/// Extra URLs requested per follow-up batch to absorb expected failures.
const BATCH_BUFFER: usize = 2;

/// Fetches and structures pages until a target document count is met.
pub struct ContentCollector {
    client: Client,
    semaphore: Arc<Semaphore>,
}

impl ContentCollector {
    /// Create a collector with the given fetch configuration.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: build_client(config)?,
            semaphore: Arc::new(Semaphore::new(config.concurrency.max(1))),
        })
    }

    /// Collect up to `target` structured documents from the candidate hits.
    ///
    /// Accepted documents have at least one surviving section and
    /// [`MIN_DOCUMENT_CHARS`] characters of content, and are enriched with
    /// the engine/score of the first hit sharing their URL. Returns fewer
    /// than `target` only when the candidates are exhausted; never more.
    #[instrument(skip_all, fields(candidates = hits.len(), requested = target))]
    pub async fn collect(&self, hits: &[SearchHit], target: usize) -> Vec<StructuredDocument> {
        if target == 0 || hits.is_empty() {
            return Vec::new();
        }

        // First hit wins on duplicate URLs.
        let mut hit_by_url: HashMap<&str, &SearchHit> = HashMap::new();
        for hit in hits {
            hit_by_url.entry(hit.url.as_str()).or_insert(hit);
        }

        let urls: Vec<String> = hits.iter().map(|h| h.url.clone()).collect();
        let mut accepted: Vec<StructuredDocument> = Vec::new();
        let mut cursor = 0usize;
        let mut batch_size = (target * 2).min(urls.len());

        while accepted.len() < target && cursor < urls.len() {
            let end = (cursor + batch_size.max(1)).min(urls.len());
            let batch = &urls[cursor..end];

            info!(
                batch = batch.len(),
                accepted = accepted.len(),
                target,
                range = format!("{cursor}..{end}"),
                "fetching batch"
            );

            let mut handles = Vec::new();
            for url in batch {
                let url = url.clone();
                let client = self.client.clone();
                let sem = self.semaphore.clone();

                handles.push(tokio::spawn(async move {
                    let _permit = sem.acquire_owned().await.expect("semaphore closed");
                    fetch_and_structure(&client, &url).await
                }));
            }

            for handle in handles {
                match handle.await {
                    Ok(Some(doc)) => {
                        if doc.sections.is_empty() || doc.total_chars < MIN_DOCUMENT_CHARS {
                            debug!(
                                url = %doc.url,
                                total_chars = doc.total_chars,
                                "rejecting low-quality document"
                            );
                            continue;
                        }
                        let doc = match hit_by_url.get(doc.url.as_str()) {
                            Some(hit) => doc.with_search_meta(hit.engine.clone(), hit.score),
                            None => doc,
                        };
                        accepted.push(doc);
                    }
                    Ok(None) => {}
                    Err(e) => warn!(error = %e, "fetch task failed"),
                }
            }

            cursor = end;
            if accepted.len() >= target {
                break;
            }
            // Shrink follow-up batches to what's still missing, plus a
            // small buffer for expected failures.
            batch_size = target - accepted.len() + BATCH_BUFFER;
        }

        accepted.truncate(target);

        info!(
            accepted = accepted.len(),
            target,
            urls_tried = cursor,
            "content collection finished"
        );

        accepted
    }
}

/// Fetch one URL and structure it. Any failure becomes `None`.
async fn fetch_and_structure(client: &Client, url: &str) -> Option<StructuredDocument> {
    if prefilter::should_skip_url(url) {
        debug!(url, "skipping unsupported URL");
        return None;
    }

    let fetch_url = prefilter::rewrite_fetch_url(url);
    debug!(url = %fetch_url, "fetching page");

    let response = match client.get(&fetch_url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            warn!(url, error = %e, "fetch failed");
            return None;
        }
    };

    let status = response.status();
    if !status.is_success() {
        warn!(url, %status, "HTTP error");
        return None;
    }

    let html = match response.text().await {
        Ok(body) => body,
        Err(e) => {
            warn!(url, error = %e, "body read failed");
            return None;
        }
    };

    // Structure against the original URL so search-metadata enrichment
    // matches even when the fetch went through a mirror.
    deepbrief_extract::structure(&html, url)
}
