use thiserror::Error;

#[derive(Debug, Error)]
pub enum HodgeError {
    #[error("invalid input: {0}")]
    Validation(String),

    #[error("feature not found: {0}")]
    FeatureNotFound(String),

    #[error("parent feature not found: {0}")]
    ParentNotFound(String),

    #[error("sub-issues cannot be nested under {0}")]
    NestedSubIssue(String),

    #[error("invalid phase: {0}")]
    InvalidPhase(String),

    #[error("unsafe base path '{0}': path traversal is not allowed")]
    UnsafeBasePath(String),

    #[error("unsupported PM tool: {0}")]
    UnsupportedTool(String),

    #[error("missing credentials for {tool}: set {var}")]
    MissingCredentials { tool: String, var: String },

    #[error("{tool} API error: {message}")]
    PmApi { tool: String, message: String },

    #[error("issue not found in {tool}: {id}")]
    IssueNotFound { tool: String, id: String },

    #[error("reading {path}: {source}")]
    ReadState {
        path: String,
        source: std::io::Error,
    },

    #[error("writing {path}: {source}")]
    WriteState {
        path: String,
        source: std::io::Error,
    },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Http(#[from] reqwest::Error),
}

pub type Result<T> = std::result::Result<T, HodgeError>;
