use thiserror::Error;

#[derive(Error, Debug)]
pub enum FilewrightError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Provider error: {0}")]
    Provider(#[from] ProviderError),

    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Agent error: {0}")]
    Agent(String),
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Invalid value for field {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("Environment variable not found: {0}")]
    EnvVarNotFound(String),
}

#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("Provider not found: {0}")]
    NotFound(String),

    #[error("Provider not configured: {0}")]
    NotConfigured(String),

    #[error("Authentication failed for provider {0}")]
    AuthFailed(String),

    #[error("API error from {provider}: {message}")]
    ApiError { provider: String, message: String },

    #[error("Invalid response from provider {0}")]
    InvalidResponse(String),
}

/// Failures inside the file-operation tool. These never cross the tool
/// boundary; the boundary logs them and reports "no output" instead.
#[derive(Error, Debug)]
pub enum ToolError {
    #[error("invalid arguments: {0}")]
    Arguments(#[source] serde_json::Error),

    #[error("filesystem error: {0}")]
    Fs(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FilewrightError>;
pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
pub type ProviderResult<T> = std::result::Result<T, ProviderError>;
