//! A module responsible for the file system operations.
use super::{GraphExport, ModelFile};

use itertools::Itertools;
use serde::de::DeserializeOwned;
use serde::Serialize;

use std::io::prelude::*;
use std::io::{Error, ErrorKind};
use std::path::{Path, PathBuf};

fn is_yaml(path: &Path) -> bool {
    matches!(
        path.extension().and_then(|e| e.to_str()),
        Some("yaml") | Some("yml")
    )
}

/// Read a file as YAML or JSON depending on its extension.
fn read_data_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> std::io::Result<T> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)?;
    let result = if is_yaml(path) {
        serde_yaml::from_str(&content).map_err(|e| e.to_string())
    } else {
        serde_json::from_str(&content).map_err(|e| e.to_string())
    };
    result.map_err(|e| {
        Error::new(
            ErrorKind::InvalidData,
            format!("Cannot parse {}: {e}", path.display()),
        )
    })
}

/// Read a model file. Files ending in `.yaml` or `.yml` are read as YAML, others as JSON.
pub fn read_model_file<P: AsRef<Path>>(path: P) -> std::io::Result<ModelFile> {
    read_data_file(path)
}

/// Read a graph that was saved with [`save_export`].
pub fn read_export_file<P: AsRef<Path>>(path: P) -> std::io::Result<GraphExport> {
    read_data_file(path)
}

/// Convert a string to sanitized JSON filename.
pub fn name_to_json(name: &str) -> String {
    let name = name.split_whitespace().join("-");
    let name = name + ".json";
    sanitize_filename::sanitize(name)
}

/// Save the content as a human-readable (pretty) JSON file named after `name` in `dir`.
/// Existing files are never overwritten.
pub fn save_export<T: Serialize, P: AsRef<Path>>(
    dir: P,
    name: &str,
    content: &T,
) -> std::io::Result<PathBuf> {
    let path = dir.as_ref().join(name_to_json(name));
    let content = match serde_json::to_string_pretty(content) {
        Ok(s) => s,
        Err(e) => {
            return Err(Error::new(ErrorKind::Other, e));
        }
    };
    let mut file = std::fs::File::options()
        .read(false)
        .write(true)
        .create_new(true)
        .open(&path)?;
    file.write_all(content.as_bytes())?;
    log::info!("Saved export: {}", path.display());
    Ok(path)
}
