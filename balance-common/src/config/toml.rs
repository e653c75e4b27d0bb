use serde_json::json;
use toml::Value;

use crate::error::{BoxError, ConfigError};

pub fn get_toml_by_context<T: serde::de::DeserializeOwned>(toml_context: &str) -> Result<T, BoxError> {
    // toml 先转成 json, 再交给 serde
    let parsed_toml: Value = toml_context
        .parse()
        .map_err(|e| ConfigError::Parse(format!("toml parse error {:?}", e)))?;
    let json = json!(parsed_toml);
    Ok(T::deserialize(json).map_err(|e| ConfigError::Parse(format!("toml to json error {:?}", e)))?)
}
