use crate::error::{BoxError, ConfigError};
use serde_yaml::Value;

pub fn get_yaml_by_context<T: serde::de::DeserializeOwned>(yaml_context: &str) -> Result<T, BoxError> {
    let parsed_yaml: Value = serde_yaml::from_str(yaml_context)
        .map_err(|e| ConfigError::Parse(format!("yaml parse error {:?}", e)))?;
    Ok(T::deserialize(parsed_yaml).map_err(|e| ConfigError::Parse(format!("yaml to struct error {:?}", e)))?)
}
