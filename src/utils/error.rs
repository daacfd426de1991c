use thiserror::Error;

#[derive(Error, Debug)]
pub enum MailerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Template rendering failed: {0}")]
    Template(#[from] askama::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for '{field}' ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error on '{field}': {message}")]
    ValidationError { field: String, message: String },

    #[error("Store error: {message}")]
    StoreError { message: String },

    #[error("{provider} responded with {status}: {detail}")]
    ProviderError {
        provider: String,
        status: u16,
        detail: String,
    },

    #[error("{backend} generation failed: {message}")]
    GenerationError { backend: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Validation,
    Network,
    Store,
    Delivery,
    Generation,
    Internal,
}

impl MailerError {
    pub fn validation(field: &str, message: impl Into<String>) -> Self {
        MailerError::ValidationError {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub fn store(message: impl Into<String>) -> Self {
        MailerError::StoreError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            MailerError::Http(_) => ErrorCategory::Network,
            MailerError::Serialization(_) | MailerError::Io(_) | MailerError::Template(_) => {
                ErrorCategory::Internal
            }
            MailerError::ConfigError { .. }
            | MailerError::InvalidConfigValueError { .. }
            | MailerError::MissingConfigError { .. } => ErrorCategory::Configuration,
            MailerError::ValidationError { .. } => ErrorCategory::Validation,
            MailerError::StoreError { .. } => ErrorCategory::Store,
            MailerError::ProviderError { .. } => ErrorCategory::Delivery,
            MailerError::GenerationError { .. } => ErrorCategory::Generation,
        }
    }

    /// Short message suitable for an end user or a terminal.
    pub fn user_friendly_message(&self) -> String {
        match self {
            MailerError::ValidationError { field, message } => {
                format!("Invalid field '{}': {}", field, message)
            }
            MailerError::StoreError { message } => {
                format!("Could not save the registration: {}", message)
            }
            MailerError::MissingConfigError { field } => {
                format!("Missing configuration value: {}", field)
            }
            MailerError::InvalidConfigValueError { field, reason, .. } => {
                format!("Invalid configuration for '{}': {}", field, reason)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MailerError>;
