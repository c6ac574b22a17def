use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuorumError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("API request failed: {0}")]
    Api(#[from] reqwest::Error),

    #[error("Missing API key: {env_var} environment variable is not set")]
    MissingApiKey { env_var: String },

    #[error("Model response error: {reason}")]
    ModelResponse { reason: String },
}

pub type Result<T> = std::result::Result<T, QuorumError>;
