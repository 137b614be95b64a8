use crate::config::Config;
use crate::sources::{fetch_resource, first_success_or_else, Resource, SourceError};
use serde::Serialize;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

pub const SOURCE: &str = "World Resources Institute (WRI) Data Explorer";
const NOTES: &str = "Small sample CSV for demonstration; replace with a project-relevant dataset";

/// Written to `data/wri/README.txt` when no candidate could be fetched
pub const INSTRUCTIONS: &str = "Could not fetch a small WRI CSV automatically.\n\
Please visit https://data.wri.org/ and download a small CSV, then place it here as wri_sample.csv.\n";

#[derive(Debug, Clone, Serialize)]
pub struct WriMetadata {
    pub source: &'static str,
    pub url: String,
    pub notes: &'static str,
}

pub fn resource(config: &Config, url: &str) -> Resource<WriMetadata> {
    let out_dir = config.provider_dir("wri");

    Resource {
        url: url.to_string(),
        destination: out_dir.join("wri_sample.csv"),
        sidecar: out_dir.join("wri_sample.json"),
        metadata: WriMetadata {
            source: SOURCE,
            url: url.to_string(),
            notes: NOTES,
        },
    }
}

pub fn instructions_path(config: &Config) -> PathBuf {
    config.provider_dir("wri").join("README.txt")
}

/// Walk the candidate CSV links in order and keep the first one that
/// downloads. When all of them fail, leave instructions for fetching a CSV
/// by hand instead.
pub async fn download_wri_sample(
    client: &reqwest::Client,
    config: &Config,
) -> Result<PathBuf, SourceError> {
    let candidates = config.endpoints.wri_candidates.as_slice();
    let instructions = instructions_path(config);

    let result = first_success_or_else(
        candidates,
        |url| {
            debug!(url = url.as_str(), "trying WRI candidate");
            let resource = resource(config, url);
            async move { fetch_resource(client, &resource).await }
        },
        |failures| leave_instructions(&instructions, failures.len()),
    )
    .await;

    if result.is_ok() {
        remove_stale_instructions(&instructions);
    }
    result
}

/// Record that no CSV could be fetched after `attempts` tries and point a
/// person at the manual route instead.
pub fn leave_instructions(path: &Path, attempts: usize) -> SourceError {
    match write_instructions(path) {
        Ok(()) => SourceError::Exhausted {
            attempts,
            instructions: path.to_path_buf(),
        },
        Err(source) => SourceError::Fallback {
            attempts,
            path: path.to_path_buf(),
            source,
        },
    }
}

fn write_instructions(path: &Path) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, INSTRUCTIONS)
}

/// A README left by an earlier failed run no longer applies once a CSV is in
/// place. Anything a person edited is left alone.
fn remove_stale_instructions(path: &Path) {
    match fs::read_to_string(path) {
        Ok(text) if text == INSTRUCTIONS => {
            if let Err(e) = fs::remove_file(path) {
                warn!(path = %path.display(), error = %e, "could not remove stale instructions");
            }
        }
        _ => {}
    }
}
