use crate::utils::files::save_metadata;
use crate::utils::http::{download_to_file, FetchError};
use serde::Serialize;
use std::future::Future;
use std::io;
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, warn};

/// A remote file, where it lands, and the provenance recorded next to it
#[derive(Debug, Clone)]
pub struct Resource<M> {
    pub url: String,
    pub destination: PathBuf,
    pub sidecar: PathBuf,
    pub metadata: M,
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error(transparent)]
    Fetch(#[from] FetchError),
    #[error("no HTTP client available: {reason}")]
    NoClient { reason: String },
    #[error("failed to write metadata {}: {source}", path.display())]
    Metadata {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("all {attempts} candidate(s) failed; instructions written to {}", instructions.display())]
    Exhausted { attempts: usize, instructions: PathBuf },
    #[error("all {attempts} candidate(s) failed and instructions could not be written to {}: {source}", path.display())]
    Fallback {
        attempts: usize,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Download `resource` and write its sidecar.
///
/// Either both files end up on disk or neither does: if the sidecar cannot
/// be written the freshly downloaded file is removed again.
pub async fn fetch_resource<M: Serialize>(
    client: &reqwest::Client,
    resource: &Resource<M>,
) -> Result<PathBuf, SourceError> {
    let fetched = match download_to_file(client, &resource.url, &resource.destination).await {
        Ok(fetched) => fetched,
        Err(e) => {
            println!("Failed to download {}: {}", e.url(), e);
            debug!(url = e.url(), error = %e, "download failed");
            return Err(e.into());
        }
    };

    if let Err(source) = save_metadata(&resource.sidecar, &resource.metadata) {
        warn!(path = %resource.sidecar.display(), error = %source, "metadata write failed");
        if let Err(e) = std::fs::remove_file(&fetched.path) {
            warn!(path = %fetched.path.display(), error = %e, "could not remove download without metadata");
        }
        return Err(SourceError::Metadata {
            path: resource.sidecar.clone(),
            source,
        });
    }

    debug!(path = %fetched.path.display(), bytes = fetched.bytes, "resource stored with metadata");
    Ok(fetched.path)
}

/// Try `attempt` on each candidate in order and return the first success.
///
/// Later candidates are never touched once one succeeds. If every candidate
/// fails, `fallback` receives the failures in candidate order and its result
/// becomes the error.
pub async fn first_success_or_else<'c, C, T, E, R, F, Fut, G>(
    candidates: &'c [C],
    mut attempt: F,
    fallback: G,
) -> Result<T, R>
where
    F: FnMut(&'c C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    G: FnOnce(Vec<E>) -> R,
{
    let mut failures = Vec::with_capacity(candidates.len());
    for candidate in candidates {
        match attempt(candidate).await {
            Ok(value) => return Ok(value),
            Err(e) => failures.push(e),
        }
    }
    Err(fallback(failures))
}

pub mod earth_observatory;
pub mod placeholders;
pub mod worldview;
pub mod wri;
