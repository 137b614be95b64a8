use crate::config::Config;
use crate::sources::{fetch_resource, Resource, SourceError};
use serde::Serialize;
use std::path::PathBuf;

pub const SOURCE: &str = "NASA GIBS / Worldview";
pub const LAYER: &str = "MODIS_Terra_CorrectedReflectance_TrueColor";
pub const PROJECTION: &str = "EPSG:4326";
pub const FORMAT: &str = "image/png";
/// Small box around New York City, lat/lon order as EPSG:4326 expects in WMS 1.3.0
pub const BBOX: [f64; 4] = [40.4, -74.4, 41.0, -73.6];
/// Width, height in pixels
pub const SIZE: [u32; 2] = [512, 512];
const LICENSE: &str = "Publicly available imagery via NASA GIBS; see NASA usage policies";

#[derive(Debug, Clone, Serialize)]
pub struct WorldviewMetadata {
    pub source: &'static str,
    pub layer: &'static str,
    pub projection: &'static str,
    pub bbox: [f64; 4],
    pub size: [u32; 2],
    pub format: &'static str,
    pub url: String,
    pub license: &'static str,
}

/// WMS GetMap query for a single true-color snapshot on `date`
pub fn getmap_url(wms: &str, date: &str) -> String {
    let bbox = BBOX
        .iter()
        .map(|v| format!("{:?}", v))
        .collect::<Vec<_>>()
        .join(",");

    format!(
        "{wms}?SERVICE=WMS&REQUEST=GetMap&VERSION=1.3.0\
         &LAYERS={LAYER}\
         &STYLES=&FORMAT={FORMAT}&TRANSPARENT=TRUE\
         &HEIGHT={height}&WIDTH={width}&CRS={PROJECTION}\
         &BBOX={bbox}\
         &TIME={date}",
        width = SIZE[0],
        height = SIZE[1],
    )
}

pub fn resource(config: &Config) -> Resource<WorldviewMetadata> {
    let out_dir = config.provider_dir("worldview");
    let stem = format!("worldview_truecolor_{}", config.date);
    let url = getmap_url(&config.endpoints.worldview_wms, &config.date);

    Resource {
        destination: out_dir.join(format!("{}.png", stem)),
        sidecar: out_dir.join(format!("{}.json", stem)),
        metadata: WorldviewMetadata {
            source: SOURCE,
            layer: LAYER,
            projection: PROJECTION,
            bbox: BBOX,
            size: SIZE,
            format: FORMAT,
            url: url.clone(),
            license: LICENSE,
        },
        url,
    }
}

/// Fetch one 512x512 PNG from GIBS for the configured date
pub async fn download_worldview_sample(
    client: &reqwest::Client,
    config: &Config,
) -> Result<PathBuf, SourceError> {
    fetch_resource(client, &resource(config)).await
}
