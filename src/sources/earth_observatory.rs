use crate::config::Config;
use crate::sources::{fetch_resource, Resource, SourceError};
use serde::Serialize;
use std::path::PathBuf;

pub const SOURCE: &str = "NASA Earth Observatory";
const TITLE: &str = "Blue Marble (sample image)";
const LICENSE: &str = "Please see NASA Earth Observatory usage guidelines";

#[derive(Debug, Clone, Serialize)]
pub struct EarthObservatoryMetadata {
    pub source: &'static str,
    pub title: &'static str,
    pub url: String,
    pub license: &'static str,
}

pub fn resource(config: &Config) -> Resource<EarthObservatoryMetadata> {
    let out_dir = config.provider_dir("earth_observatory");
    let url = config.endpoints.earth_observatory.clone();

    Resource {
        destination: out_dir.join("sample_earth_observatory.jpg"),
        sidecar: out_dir.join("sample_earth_observatory.json"),
        metadata: EarthObservatoryMetadata {
            source: SOURCE,
            title: TITLE,
            url: url.clone(),
            license: LICENSE,
        },
        url,
    }
}

pub async fn download_earth_observatory_sample(
    client: &reqwest::Client,
    config: &Config,
) -> Result<PathBuf, SourceError> {
    fetch_resource(client, &resource(config)).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::http::build_client;
    use serde_json::Value;
    use std::time::Duration;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn sidecar_records_title_and_url() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/blue_marble.jpg"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .expect(1)
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let mut config = Config::new(tmp.path());
        config.endpoints.earth_observatory = format!("{}/blue_marble.jpg", server.uri());
        let client = build_client(Duration::from_secs(5)).unwrap();

        let jpg = download_earth_observatory_sample(&client, &config)
            .await
            .unwrap();

        assert_eq!(
            jpg,
            tmp.path()
                .join("data/earth_observatory/sample_earth_observatory.jpg")
        );
        let text = std::fs::read_to_string(jpg.with_extension("json")).unwrap();
        let meta: Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&String> = meta.as_object().unwrap().keys().collect();
        assert_eq!(keys, ["license", "source", "title", "url"]);
        assert_eq!(meta["title"], TITLE);
        assert_eq!(meta["url"], config.endpoints.earth_observatory);
    }

    #[tokio::test]
    async fn missing_image_is_reported_not_raised() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let mut config = Config::new(tmp.path());
        config.endpoints.earth_observatory = format!("{}/moved.jpg", server.uri());
        let client = build_client(Duration::from_secs(5)).unwrap();

        let result = download_earth_observatory_sample(&client, &config).await;

        assert!(matches!(result, Err(SourceError::Fetch(_))));
        assert!(!tmp.path().join("data/earth_observatory").exists());
    }

    #[tokio::test]
    async fn unwritable_sidecar_removes_the_image() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0xFF, 0xD8, 0xFF]))
            .mount(&server)
            .await;

        let tmp = TempDir::new().unwrap();
        let mut config = Config::new(tmp.path());
        config.endpoints.earth_observatory = format!("{}/blue_marble.jpg", server.uri());
        let client = build_client(Duration::from_secs(5)).unwrap();
        let resource = resource(&config);
        std::fs::create_dir_all(&resource.sidecar).unwrap();

        let err = download_earth_observatory_sample(&client, &config)
            .await
            .unwrap_err();

        match err {
            SourceError::Metadata { path, .. } => assert_eq!(path, resource.sidecar),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(!resource.destination.exists());
    }
}
