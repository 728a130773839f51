use thiserror::Error;

#[derive(Debug, Error)]
pub enum PasskeepError {
    #[error("Secret '{0}' already exists.")]
    AlreadyExists(String),

    #[error("Secret '{0}' not found.")]
    NotFound(String),

    #[error("Secrets Manager returned {code}: {message}")]
    Service { code: String, message: String },

    #[error("Request to Secrets Manager failed: {0}")]
    Transport(String),

    #[error("Invalid secret identifier {0:?}: letters, numbers, underscores and hyphens are permitted (no spaces)")]
    InvalidSecretId(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl PasskeepError {
    pub fn service(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Service {
            code: code.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for PasskeepError {
    fn from(e: serde_json::Error) -> Self {
        Self::Serialization(e.to_string())
    }
}
