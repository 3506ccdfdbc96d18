use thiserror::Error;

pub type Result<T> = std::result::Result<T, CoachError>;

#[derive(Debug, Error)]
pub enum CoachError {
    #[error("tool `{0}` not found")]
    ToolNotFound(String),

    #[error("tool `{name}` invocation failed: {source}")]
    ToolInvocation {
        name: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("invalid argument `{field}`: {reason}")]
    InvalidArgument { field: String, reason: String },

    #[error("protocol error: {0}")]
    Protocol(String),

    #[error("configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl CoachError {
    pub fn invalid_argument(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidArgument {
            field: field.into(),
            reason: reason.into(),
        }
    }
}

/// Why the meal pipeline did not produce a recommendation.
#[derive(Debug, Error)]
pub enum MealError {
    #[error("no recipe matches dietary preference {preference:?}")]
    NoMatch { preference: Option<String> },

    #[error(transparent)]
    Fault(#[from] CoachError),
}
