use crate::utils::http::DEFAULT_TIMEOUT_SECS;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_WORLDVIEW_DATE: &str = "2020-01-01";

/// Remote locations for the three network-backed sources
#[derive(Debug, Clone)]
pub struct Endpoints {
    /// GIBS WMS endpoint, without a query string
    pub worldview_wms: String,
    pub earth_observatory: String,
    /// Tried in order, first success wins
    pub wri_candidates: Vec<String>,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            worldview_wms: "https://gibs.earthdata.nasa.gov/wms/epsg4326/best/wms.cgi".to_string(),
            earth_observatory:
                "https://earthobservatory.nasa.gov/ContentFeature/BlueMarble/Images/land_ocean_ice_2048.jpg"
                    .to_string(),
            wri_candidates: vec![
                "https://datasets.wri.org/dataset/8f6b2c8e-e5b6-4c5e-8b7b-21f5b7a3b0ba/resource/8f37a987-b2e0-4a11-9d53-8b0d2050b1fe/download/sample.csv"
                    .to_string(),
            ],
        }
    }
}

/// Everything a run needs, passed explicitly to each step
#[derive(Debug, Clone)]
pub struct Config {
    pub root: PathBuf,
    pub date: String,
    pub timeout: Duration,
    pub endpoints: Endpoints,
}

impl Config {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            date: DEFAULT_WORLDVIEW_DATE.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoints: Endpoints::default(),
        }
    }

    /// `<root>/data`, the parent of every provider folder
    pub fn data_dir(&self) -> PathBuf {
        self.root.join("data")
    }

    pub fn provider_dir(&self, provider: &str) -> PathBuf {
        self.data_dir().join(provider)
    }
}

/// Accept a `YYYY-MM-DD` date for the WMS TIME parameter
pub fn parse_date(s: &str) -> Result<String, String> {
    let parts: Vec<&str> = s.split('-').collect();
    let well_formed = parts.len() == 3
        && parts[0].len() == 4
        && parts[1].len() == 2
        && parts[2].len() == 2
        && parts.iter().all(|p| p.chars().all(|c| c.is_ascii_digit()));
    if !well_formed {
        return Err(format!("expected a date like 2020-01-01, got '{}'", s));
    }

    let year: u32 = parts[0].parse().map_err(|_| format!("invalid year in '{}'", s))?;
    let month: u32 = parts[1].parse().map_err(|_| format!("invalid month in '{}'", s))?;
    let day: u32 = parts[2].parse().map_err(|_| format!("invalid day in '{}'", s))?;
    if !(1..=12).contains(&month) || day == 0 || day > days_in_month(year, month) {
        return Err(format!("no such day: '{}'", s));
    }
    Ok(s.to_string())
}

fn days_in_month(year: u32, month: u32) -> u32 {
    match month {
        2 if year % 4 == 0 && (year % 100 != 0 || year % 400 == 0) => 29,
        2 => 28,
        4 | 6 | 9 | 11 => 30,
        _ => 31,
    }
}
