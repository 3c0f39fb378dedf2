use thiserror::Error;

/// Prompt synthesis error types
///
/// The composition core never fails; these cover the surfaces around it.
#[derive(Error, Debug)]
pub enum PromptError {
    #[error("OpenAI API error: {0}")]
    OpenAi(#[from] async_openai::error::OpenAIError),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unsupported target model: {0}")]
    UnsupportedModel(String),

    #[error("No structured JSON object found in model response")]
    MissingStructuredOutput,

    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Result type alias for prompt synthesis operations
pub type Result<T> = std::result::Result<T, PromptError>;
