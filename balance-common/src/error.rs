use std::fmt::{self, Display, Formatter};

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug)]
pub enum ConfigError {
    Read(String),
    Unsupported(String),
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read(msg) => write!(f, "ConfigError::Read {}", msg),
            ConfigError::Unsupported(msg) => write!(f, "ConfigError::Unsupported {}", msg),
            ConfigError::Parse(msg) => write!(f, "ConfigError::Parse {}", msg),
            ConfigError::Invalid(msg) => write!(f, "ConfigError::Invalid {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
