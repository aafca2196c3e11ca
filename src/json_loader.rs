// json_loader.rs
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum LoadError {
    #[error("asset '{0}' is not embedded; add it to json_loader.rs asset()")]
    NotEmbedded(String),
    #[error("failed to read {path}: {source}")]
    Io { path: PathBuf, #[source] source: std::io::Error },
    #[error("parse error in {name}: {source}")]
    Parse { name: String, #[source] source: serde_json::Error },
}

// include_str! requires compile-time paths; all assets must be listed here.
fn asset(name: &str) -> Result<&'static str, LoadError> {
    match name {
        "zones.json"    => Ok(include_str!("../assets/zones.json")),
        "selector.json" => Ok(include_str!("../assets/selector.json")),
        _ => Err(LoadError::NotEmbedded(name.to_string())),
    }
}

pub fn parse<T: for<'de> Deserialize<'de>>(name: &str, text: &str) -> Result<T, LoadError> {
    serde_json::from_str(text).map_err(|source| LoadError::Parse { name: name.to_string(), source })
}

/// Parses an asset compiled into the binary.
pub fn load<T: for<'de> Deserialize<'de>>(name: &str) -> Result<T, LoadError> {
    parse(name, asset(name)?)
}

/// Parses a JSON file from disk, e.g. a user override next to the embedded default.
pub fn load_file<T: for<'de> Deserialize<'de>>(path: &Path) -> Result<T, LoadError> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| LoadError::Io { path: path.to_path_buf(), source })?;
    parse(&path.display().to_string(), &text)
}
