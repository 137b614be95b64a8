use crate::config::Config;
use crate::utils::files::{ensure_directory, write_if_missing};
use std::io;
use std::path::PathBuf;
use tracing::debug;

/// A provider we do not download from automatically
#[derive(Debug, Clone, Copy)]
pub struct Provider {
    pub folder: &'static str,
    pub label: &'static str,
    pub instructions: &'static str,
}

pub const PROVIDERS: [Provider; 5] = [
    Provider {
        folder: "sedac",
        label: "SEDAC",
        instructions: "SEDAC datasets often require login. Create a free account at https://sedac.ciesin.columbia.edu/.\n\
Once downloaded, place a small sample file here and document it in a metadata JSON.\n",
    },
    Provider {
        folder: "worldpop",
        label: "WorldPop",
        instructions: "WorldPop provides country-level population rasters. Visit https://www.worldpop.org/ to download a small country tile.\n\
Place the file here and add a metadata JSON noting the source and license.\n",
    },
    Provider {
        folder: "ghsl",
        label: "GHSL",
        instructions: "GHSL (EU Copernicus) provides population and built-up layers. Visit https://ghsl.jrc.ec.europa.eu/.\n\
Download a small tile (e.g., a small country or region) and place it here with metadata.\n",
    },
    Provider {
        folder: "eu_copernicus",
        label: "Copernicus",
        instructions: "Copernicus Services Catalogue contains many datasets. Visit https://www.copernicus.eu/en/access-data/copernicus-services-catalogue.\n\
Download a small, relevant sample and document license and attribution.\n",
    },
    Provider {
        folder: "eotoolkit",
        label: "EO Toolkit",
        instructions: "UN-Habitat Earth Observations Toolkit: https://eotoolkit.unhabitat.org/.\n\
Identify a relevant resource and place a small sample or a link with documentation here.\n",
    },
];

/// What the placeholder step did to each provider folder
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PlaceholderReport {
    pub written: Vec<PathBuf>,
    pub kept: Vec<PathBuf>,
}

/// "SEDAC, WorldPop, GHSL, Copernicus, and EO Toolkit"
pub fn provider_labels() -> String {
    let labels: Vec<&str> = PROVIDERS.iter().map(|p| p.label).collect();
    match labels.split_last() {
        Some((last, rest)) if !rest.is_empty() => format!("{}, and {}", rest.join(", "), last),
        Some((last, _)) => last.to_string(),
        None => String::new(),
    }
}

/// Make sure every provider folder exists and has a README. Existing
/// READMEs are never rewritten.
pub fn write_placeholders(config: &Config) -> io::Result<PlaceholderReport> {
    let mut report = PlaceholderReport::default();

    for provider in PROVIDERS.iter() {
        let folder = config.provider_dir(provider.folder);
        ensure_directory(&folder)?;

        let readme = folder.join("README.txt");
        if write_if_missing(&readme, provider.instructions)? {
            debug!(path = %readme.display(), "wrote placeholder instructions");
            report.written.push(readme);
        } else {
            report.kept.push(readme);
        }
    }

    Ok(report)
}
