use balance_common::error::BoxError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BalanceError {
    #[error("No available endpoint : {0}")]
    NoAvailableEndpoint(String),

    #[error("Config error : {0}")]
    Config(BoxError),
}

impl From<BoxError> for BalanceError {
    fn from(value: BoxError) -> Self {
        BalanceError::Config(value)
    }
}
