use std::{fs, path::Path};

use self::toml::get_toml_by_context;
use tracing::debug;
use self::yaml::get_yaml_by_context;

use crate::error::{BoxError, ConfigError};

pub mod toml;
pub mod yaml;

/// Loads `T` from a `.toml`, `.yaml` or `.yml` file, picked by extension.
pub fn get_config_by_file<T: serde::de::DeserializeOwned>(path: &str) -> Result<T, BoxError> {
    let contents = fs::read_to_string(path)
        .map_err(|e| ConfigError::Read(format!("read path error : {:?} {}", path, e)))?;
    let file_type = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or_default();
    debug!("load config {:?} as {:?}", path, file_type);
    match file_type {
        "toml" => get_toml_by_context(&contents),
        "yaml" | "yml" => get_yaml_by_context(&contents),
        file_type => Err(ConfigError::Unsupported(format!("not support {:?}", file_type)).into()),
    }
}
