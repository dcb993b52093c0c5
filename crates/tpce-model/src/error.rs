use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid bench options: {field} must be positive")]
    NonPositive { field: &'static str },
    #[error("invalid bench options: {field} does not fit in 32 bits")]
    TooLarge { field: &'static str },
    #[error("invalid node list: {0}")]
    InvalidNodeList(String),
    #[error("invalid topology: {0}")]
    InvalidTopology(String),
}
