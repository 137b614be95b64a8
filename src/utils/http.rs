use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{debug, warn};

/// Default ceiling for a single request, connect through last body byte
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// Get standard user agent string
pub fn get_user_agent() -> &'static str {
    "SampleFetch"
}

/// Build the HTTP client shared by every source in a run
pub fn build_client(timeout: Duration) -> reqwest::Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(get_user_agent())
        .timeout(timeout)
        .build()
}

/// The one failure kind a download can end in. Every variant keeps the URL
/// that was being fetched so callers can report it.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("request error: {source}")]
    Request {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("server answered with HTTP {status}")]
    Status { url: String, status: StatusCode },
    #[error("failed to write {}: {source}", path.display())]
    Io {
        url: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

impl FetchError {
    pub fn url(&self) -> &str {
        match self {
            FetchError::Request { url, .. }
            | FetchError::Status { url, .. }
            | FetchError::Io { url, .. } => url,
        }
    }
}

/// A payload that made it to disk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    pub path: PathBuf,
    pub bytes: u64,
}

/// Stream `url` into `dest`, creating parent directories and replacing any
/// existing file.
///
/// The body is written to a sibling `.part` file first and only renamed over
/// `dest` once the whole response has arrived, so a failure leaves `dest`
/// as it was before the call.
pub async fn download_to_file(
    client: &reqwest::Client,
    url: &str,
    dest: &Path,
) -> Result<FetchedFile, FetchError> {
    debug!(url, dest = %dest.display(), "starting download");

    let mut response = client
        .get(url)
        .send()
        .await
        .map_err(|source| FetchError::Request {
            url: url.to_string(),
            source,
        })?;

    let status = response.status();
    if !status.is_success() {
        return Err(FetchError::Status {
            url: url.to_string(),
            status,
        });
    }

    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| FetchError::Io {
                url: url.to_string(),
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let part = part_path(dest);
    let written = match stream_body(&mut response, url, &part).await {
        Ok(written) => written,
        Err(e) => {
            if let Err(cleanup) = fs::remove_file(&part).await {
                if cleanup.kind() != io::ErrorKind::NotFound {
                    warn!(path = %part.display(), error = %cleanup, "could not remove partial download");
                }
            }
            return Err(e);
        }
    };

    fs::rename(&part, dest)
        .await
        .map_err(|source| FetchError::Io {
            url: url.to_string(),
            path: dest.to_path_buf(),
            source,
        })?;

    debug!(url, bytes = written, dest = %dest.display(), "download finished");
    Ok(FetchedFile {
        path: dest.to_path_buf(),
        bytes: written,
    })
}

async fn stream_body(
    response: &mut reqwest::Response,
    url: &str,
    part: &Path,
) -> Result<u64, FetchError> {
    let io_error = |source: io::Error| FetchError::Io {
        url: url.to_string(),
        path: part.to_path_buf(),
        source,
    };

    let mut file = fs::File::create(part).await.map_err(io_error)?;
    let pb = progress_bar(response.content_length(), part);
    let mut written: u64 = 0;

    loop {
        let chunk = response
            .chunk()
            .await
            .map_err(|source| FetchError::Request {
                url: url.to_string(),
                source,
            });
        let chunk = match chunk {
            Ok(Some(chunk)) => chunk,
            Ok(None) => break,
            Err(e) => {
                pb.abandon();
                return Err(e);
            }
        };
        if let Err(e) = file.write_all(&chunk).await {
            pb.abandon();
            return Err(io_error(e));
        }
        written += chunk.len() as u64;
        pb.set_position(written);
    }

    file.flush().await.map_err(io_error)?;
    pb.finish_and_clear();
    Ok(written)
}

fn progress_bar(content_length: Option<u64>, part: &Path) -> ProgressBar {
    let name = part
        .file_name()
        .map(|n| n.to_string_lossy().trim_end_matches(".part").to_string())
        .unwrap_or_default();

    let pb = match content_length {
        Some(len) => {
            let pb = ProgressBar::new(len);
            pb.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar())
                    .progress_chars("#>-"),
            );
            pb
        }
        None => {
            let pb = ProgressBar::new_spinner();
            pb.set_style(
                ProgressStyle::default_spinner()
                    .template("{spinner:.green} [{elapsed_precise}] {bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            pb
        }
    };
    pb.set_message(name);
    pb
}

fn part_path(dest: &Path) -> PathBuf {
    let mut name = dest
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".part");
    dest.with_file_name(name)
}
