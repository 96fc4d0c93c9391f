use thiserror::Error;

#[derive(Error, Debug)]
pub enum SimError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Channel '{name}' not found in parameter table")]
    InvalidChannel { name: String },

    #[error("Invalid budget: {budget} (must be finite and >= 0)")]
    InvalidBudget { budget: f64 },

    #[error("Invalid draw count: {count} (must be >= 1)")]
    InvalidDrawCount { count: usize },

    #[error("Invalid portfolio trial count: {count} (must be >= 1)")]
    InvalidTrialCount { count: usize },

    #[error("Invalid parameter '{field}' for channel '{channel}': {value}")]
    InvalidParameters {
        channel: String,
        field:   &'static str,
        value:   f64,
    },

    #[error("Channel '{name}' appears more than once in parameter table")]
    DuplicateChannel { name: String },

    #[error("Channel parameter table is empty")]
    EmptyChannelTable,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type SimResult<T> = Result<T, SimError>;
