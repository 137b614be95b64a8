use serde::Serialize;
use std::fs;
use std::io;
use std::path::Path;

/// Create `path` and any missing parents
pub fn ensure_directory(path: &Path) -> io::Result<()> {
    if !path.exists() {
        fs::create_dir_all(path)?;
    }
    Ok(())
}

/// Write a metadata sidecar as pretty JSON with sorted keys.
///
/// The value goes through `serde_json::Value` first; its object map is
/// ordered, so the key order on disk never depends on struct field order.
pub fn save_metadata<T: Serialize>(path: &Path, metadata: &T) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }

    let value = serde_json::to_value(metadata).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to serialize metadata: {}", e),
        )
    })?;
    let json = serde_json::to_string_pretty(&value).map_err(|e| {
        io::Error::new(
            io::ErrorKind::InvalidData,
            format!("Failed to serialize metadata: {}", e),
        )
    })?;

    fs::write(path, json)
}

/// Write `text` to `path` unless something is already there.
///
/// Returns `true` when the file was created by this call.
pub fn write_if_missing(path: &Path, text: &str) -> io::Result<bool> {
    if path.exists() {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        ensure_directory(parent)?;
    }
    fs::write(path, text)?;
    Ok(true)
}
