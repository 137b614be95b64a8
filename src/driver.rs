use crate::config::Config;
use crate::sources::earth_observatory::download_earth_observatory_sample;
use crate::sources::placeholders::{provider_labels, write_placeholders, PlaceholderReport};
use crate::sources::worldview::download_worldview_sample;
use crate::sources::wri::{download_wri_sample, instructions_path, leave_instructions};
use crate::sources::SourceError;
use std::fmt;
use std::io::{self, Write};
use std::path::PathBuf;
use tracing::{debug, info, warn};

/// Result of one network-backed source
#[derive(Debug)]
pub struct SourceReport {
    pub label: &'static str,
    pub outcome: Result<PathBuf, SourceError>,
}

#[derive(Debug, Default)]
pub struct RunSummary {
    pub sources: Vec<SourceReport>,
    pub placeholders: Option<PlaceholderReport>,
}

impl RunSummary {
    /// Number of primary sources that produced a file, 0 through 3
    pub fn successes(&self) -> usize {
        self.sources.iter().filter(|s| s.outcome.is_ok()).count()
    }

    fn record<W: Write>(
        &mut self,
        out: &mut W,
        label: &'static str,
        outcome: Result<PathBuf, SourceError>,
    ) {
        match &outcome {
            Ok(path) => {
                info!(source = label, path = %path.display(), "sample downloaded");
                status(out, format_args!("- {} sample downloaded", label));
            }
            Err(SourceError::Exhausted { .. }) => status(
                out,
                format_args!(
                    "- {} sample skipped (no direct small CSV found; added instructions)",
                    label
                ),
            ),
            Err(SourceError::Fallback { .. }) => status(
                out,
                format_args!(
                    "- {} sample skipped (download failed; instructions could not be written)",
                    label
                ),
            ),
            Err(_) => status(out, format_args!("- {} sample skipped (download failed)", label)),
        }
        if let Err(e) = &outcome {
            warn!(source = label, error = %e, "sample skipped");
        }
        self.sources.push(SourceReport { label, outcome });
    }
}

fn status<W: Write>(out: &mut W, line: fmt::Arguments<'_>) {
    if let Err(e) = writeln!(out, "{}", line) {
        debug!(error = %e, "could not print status line");
    }
}

fn no_client() -> SourceError {
    SourceError::NoClient {
        reason: "HTTP client could not be built".to_string(),
    }
}

/// Run every step once, in order, printing progress to stdout. No step
/// depends on an earlier one succeeding and nothing here fails the run as a
/// whole.
///
/// Without a client the network steps are reported as failed, but the WRI
/// instructions and the placeholders are still written.
pub async fn run(client: Option<&reqwest::Client>, config: &Config) -> RunSummary {
    run_to(client, config, &mut io::stdout()).await
}

pub async fn run_to<W: Write>(
    client: Option<&reqwest::Client>,
    config: &Config,
    out: &mut W,
) -> RunSummary {
    status(out, format_args!("Downloading sample datasets..."));
    let mut summary = RunSummary::default();

    let outcome = match client {
        Some(client) => download_worldview_sample(client, config).await,
        None => Err(no_client()),
    };
    summary.record(out, "Worldview", outcome);

    let outcome = match client {
        Some(client) => download_earth_observatory_sample(client, config).await,
        None => Err(no_client()),
    };
    summary.record(out, "Earth Observatory", outcome);

    let outcome = match client {
        Some(client) => download_wri_sample(client, config).await,
        None => Err(leave_instructions(&instructions_path(config), 0)),
    };
    summary.record(out, "WRI", outcome);

    match write_placeholders(config) {
        Ok(report) => {
            debug!(
                written = report.written.len(),
                kept = report.kept.len(),
                "placeholder step finished"
            );
            status(
                out,
                format_args!("- Placeholders written for {}", provider_labels()),
            );
            summary.placeholders = Some(report);
        }
        Err(e) => {
            warn!(error = %e, "placeholder step failed");
            status(out, format_args!("- Placeholders could not be written: {}", e));
        }
    }

    status(
        out,
        format_args!("Completed with {} successful downloads", summary.successes()),
    );
    summary
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sources::placeholders::PROVIDERS;
    use crate::sources::wri::INSTRUCTIONS;
    use crate::utils::http::build_client;
    use serde_json::Value;
    use std::fs;
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client() -> reqwest::Client {
        build_client(Duration::from_secs(5)).unwrap()
    }

    fn files_with_extension(dir: &Path, ext: &str) -> Vec<PathBuf> {
        let mut found = Vec::new();
        let mut stack = vec![dir.to_path_buf()];
        while let Some(dir) = stack.pop() {
            let Ok(entries) = fs::read_dir(&dir) else {
                continue;
            };
            for entry in entries.flatten() {
                let path = entry.path();
                if path.is_dir() {
                    stack.push(path);
                } else if path.extension().and_then(|e| e.to_str()) == Some(ext) {
                    found.push(path);
                }
            }
        }
        found
    }

    fn assert_placeholders_present(config: &Config) {
        for provider in PROVIDERS.iter() {
            let readme = config.provider_dir(provider.folder).join("README.txt");
            let text = fs::read_to_string(&readme).unwrap();
            assert!(!text.is_empty(), "{} is empty", readme.display());
        }
    }

    async fn serve(server: &MockServer, route: &str, status: u16, body: &str) {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(status).set_body_string(body))
            .mount(server)
            .await;
    }

    async fn run_captured(client: Option<&reqwest::Client>, config: &Config) -> (RunSummary, String) {
        let mut out = Vec::new();
        let summary = run_to(client, config, &mut out).await;
        (summary, String::from_utf8(out).unwrap())
    }

    fn config_for(root: &Path, base: &str, wri: &[&str]) -> Config {
        let mut config = Config::new(root);
        config.endpoints.worldview_wms = format!("{}/wms.cgi", base);
        config.endpoints.earth_observatory = format!("{}/blue_marble.jpg", base);
        config.endpoints.wri_candidates = wri.iter().map(|p| format!("{}{}", base, p)).collect();
        config
    }

    #[tokio::test]
    async fn every_source_available() {
        let server = MockServer::start().await;
        serve(&server, "/wms.cgi", 200, "png").await;
        serve(&server, "/blue_marble.jpg", 200, "jpg").await;
        serve(&server, "/sample.csv", 200, "a,b\n").await;

        let tmp = TempDir::new().unwrap();
        let config = config_for(tmp.path(), &server.uri(), &["/sample.csv"]);

        let (summary, printed) = run_captured(Some(&client()), &config).await;

        assert_eq!(summary.successes(), 3);
        assert_eq!(
            printed.lines().collect::<Vec<_>>(),
            [
                "Downloading sample datasets...",
                "- Worldview sample downloaded",
                "- Earth Observatory sample downloaded",
                "- WRI sample downloaded",
                "- Placeholders written for SEDAC, WorldPop, GHSL, Copernicus, and EO Toolkit",
                "Completed with 3 successful downloads",
            ]
        );
        let data = config.data_dir();
        assert!(data.join("worldview/worldview_truecolor_2020-01-01.png").exists());
        assert!(data.join("earth_observatory/sample_earth_observatory.jpg").exists());
        assert!(data.join("wri/wri_sample.csv").exists());
        assert!(!data.join("wri/README.txt").exists());

        let sidecars = files_with_extension(&data, "json");
        assert_eq!(sidecars.len(), 3);
        for sidecar in sidecars {
            let meta: Value = serde_json::from_str(&fs::read_to_string(&sidecar).unwrap()).unwrap();
            for key in ["source", "url"] {
                let value = meta[key].as_str().unwrap_or_default();
                assert!(!value.is_empty(), "{} lacks {}", sidecar.display(), key);
            }
        }

        assert_eq!(summary.placeholders.as_ref().unwrap().written.len(), 5);
        assert_placeholders_present(&config);
    }

    #[tokio::test]
    async fn offline_run_still_completes() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let tmp = TempDir::new().unwrap();
        let config = config_for(tmp.path(), &base, &["/sample.csv"]);

        let (summary, printed) = run_captured(Some(&client()), &config).await;

        assert_eq!(summary.successes(), 0);
        assert!(printed.contains("- Worldview sample skipped (download failed)\n"));
        assert!(printed.contains("- Earth Observatory sample skipped (download failed)\n"));
        assert!(printed.contains(
            "- WRI sample skipped (no direct small CSV found; added instructions)\n"
        ));
        assert!(printed.ends_with("Completed with 0 successful downloads\n"));
        assert_eq!(summary.sources.len(), 3);
        let data = config.data_dir();
        assert!(files_with_extension(&data, "png").is_empty());
        assert!(files_with_extension(&data, "jpg").is_empty());
        assert!(files_with_extension(&data, "csv").is_empty());
        assert!(files_with_extension(&data, "json").is_empty());
        assert_eq!(
            fs::read_to_string(data.join("wri/README.txt")).unwrap(),
            INSTRUCTIONS
        );
        assert!(matches!(
            summary.sources[2].outcome,
            Err(SourceError::Exhausted { attempts: 1, .. })
        ));
        assert_placeholders_present(&config);
    }

    #[tokio::test]
    async fn wri_falls_through_to_second_candidate() {
        let server = MockServer::start().await;
        serve(&server, "/wms.cgi", 500, "").await;
        serve(&server, "/blue_marble.jpg", 500, "").await;
        serve(&server, "/old.csv", 404, "").await;
        serve(&server, "/new.csv", 200, "x,y\n").await;

        let tmp = TempDir::new().unwrap();
        let config = config_for(tmp.path(), &server.uri(), &["/old.csv", "/new.csv"]);

        let (summary, printed) = run_captured(Some(&client()), &config).await;

        assert_eq!(summary.successes(), 1);
        assert!(printed.contains("- WRI sample downloaded\n"));
        assert!(printed.ends_with("Completed with 1 successful downloads\n"));
        let wri = config.provider_dir("wri");
        assert!(wri.join("wri_sample.csv").exists());
        assert!(wri.join("wri_sample.json").exists());
        assert!(!wri.join("README.txt").exists());
    }

    #[tokio::test]
    async fn rerun_keeps_placeholder_readmes() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        drop(listener);

        let tmp = TempDir::new().unwrap();
        let config = config_for(tmp.path(), &base, &[]);

        let client = client();
        let (first, _) = run_captured(Some(&client), &config).await;
        let (second, _) = run_captured(Some(&client), &config).await;

        assert_eq!(first.placeholders.unwrap().written.len(), 5);
        let second = second.placeholders.unwrap();
        assert!(second.written.is_empty());
        assert_eq!(second.kept.len(), 5);
    }

    #[tokio::test]
    async fn missing_client_still_writes_fallbacks_and_completes() {
        let tmp = TempDir::new().unwrap();
        let config = Config::new(tmp.path());

        let (summary, printed) = run_captured(None, &config).await;

        assert_eq!(summary.successes(), 0);
        assert!(matches!(
            summary.sources[0].outcome,
            Err(SourceError::NoClient { .. })
        ));
        assert!(matches!(
            summary.sources[2].outcome,
            Err(SourceError::Exhausted { attempts: 0, .. })
        ));
        let data = config.data_dir();
        assert_eq!(
            fs::read_to_string(data.join("wri/README.txt")).unwrap(),
            INSTRUCTIONS
        );
        assert!(files_with_extension(&data, "json").is_empty());
        assert_placeholders_present(&config);
        assert!(printed.ends_with("Completed with 0 successful downloads\n"));
    }
}
