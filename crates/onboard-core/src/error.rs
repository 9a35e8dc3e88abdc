use thiserror::Error;

#[derive(Debug, Error)]
pub enum OnboardError {
    #[error("invalid milestone index {0}: must be below 5")]
    InvalidMilestoneIndex(usize),

    #[error("invalid milestone: {0}")]
    InvalidMilestone(String),

    #[error("unknown form field: {0}")]
    UnknownField(String),

    #[error("invalid value '{value}' for {field}: expected one of {expected}")]
    InvalidFieldValue {
        field: String,
        value: String,
        expected: String,
    },

    #[error("service not found: {0}")]
    ServiceNotFound(usize),

    #[error("invalid contact details: {0}")]
    InvalidContact(String),

    #[error("invalid notification payload: {0}")]
    InvalidPayload(String),

    #[error("invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("invalid contract mode: {0}")]
    InvalidMode(String),

    #[error("invalid channel: {0}")]
    InvalidChannel(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, OnboardError>;
