use serde::Deserialize;
use thiserror::Error;

/// 後端回傳的欄位錯誤 (`{loc, msg}`)
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FieldIssue {
    #[serde(default)]
    pub loc: Vec<serde_json::Value>,
    pub msg: String,
}

impl FieldIssue {
    /// The backend sends `loc` as `[<source>, <field>, ...]`.
    fn field_label(&self) -> Option<String> {
        let segment = self.loc.get(1).or_else(|| self.loc.last())?;
        Some(match segment {
            serde_json::Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ErrorDetail {
    ValidationList(Vec<FieldIssue>),
    Message(String),
}

impl ErrorDetail {
    /// 將 `detail` 欄位正規化，無法辨識的格式回傳 None
    pub fn from_json(value: &serde_json::Value) -> Option<Self> {
        match value {
            serde_json::Value::String(text) => Some(ErrorDetail::Message(text.clone())),
            serde_json::Value::Array(_) => serde_json::from_value::<Vec<FieldIssue>>(value.clone())
                .ok()
                .map(ErrorDetail::ValidationList),
            _ => None,
        }
    }

    pub fn render(&self) -> String {
        match self {
            ErrorDetail::Message(text) => text.clone(),
            ErrorDetail::ValidationList(items) => items
                .iter()
                .map(|issue| match issue.field_label() {
                    Some(field) => format!("{}: {}", field, issue.msg),
                    None => issue.msg.clone(),
                })
                .collect::<Vec<_>>()
                .join("; "),
        }
    }
}

pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

/// Every failed API call resolves to one of these two shapes.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ApiError {
    #[error("{}", render_rejection(.detail))]
    Rejected {
        status: u16,
        detail: Option<ErrorDetail>,
        token_rejected: bool,
    },

    #[error("{detail}")]
    Network { detail: String },
}

fn render_rejection(detail: &Option<ErrorDetail>) -> String {
    detail
        .as_ref()
        .map(ErrorDetail::render)
        .unwrap_or_else(|| UNEXPECTED_ERROR_MESSAGE.to_string())
}

impl ApiError {
    pub fn network(detail: impl Into<String>) -> Self {
        ApiError::Network {
            detail: detail.into(),
        }
    }

    /// Message shown to the user as the general form error.
    pub fn message(&self) -> String {
        self.to_string()
    }

    pub fn is_token_error(&self) -> bool {
        matches!(
            self,
            ApiError::Rejected {
                token_rejected: true,
                ..
            }
        )
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Rejected { status, .. } => Some(*status),
            ApiError::Network { .. } => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

#[derive(Error, Debug)]
pub enum TaxError {
    #[error("API request failed: {0}")]
    ApiError(#[from] ApiError),

    #[error("HTTP client error: {0}")]
    HttpClientError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Storage error: {message}")]
    StorageError { message: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },

    #[error("Advice request failed: {message}")]
    AdviceError { message: String },
}

impl TaxError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            TaxError::ValidationError { .. } => ErrorSeverity::Low,
            TaxError::ApiError(ApiError::Network { .. }) | TaxError::HttpClientError(_) => {
                ErrorSeverity::Medium
            }
            TaxError::ApiError(_) | TaxError::AdviceError { .. } | TaxError::SerializationError(_) => {
                ErrorSeverity::High
            }
            TaxError::ConfigError { .. }
            | TaxError::InvalidConfigValueError { .. }
            | TaxError::StorageError { .. }
            | TaxError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 1,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            TaxError::ApiError(api) => api.message(),
            TaxError::AdviceError { message } => message.clone(),
            TaxError::HttpClientError(_) => "Could not reach the advice service.".to_string(),
            TaxError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            TaxError::ApiError(api) if api.is_token_error() => {
                "Run `tax-filer token --refresh` to obtain a new session token"
            }
            TaxError::ApiError(ApiError::Network { .. }) | TaxError::HttpClientError(_) => {
                "Check that the API is running and --base-url points at it"
            }
            TaxError::ApiError(_) | TaxError::AdviceError { .. } => {
                "Review the submitted figures and try again"
            }
            TaxError::ConfigError { .. }
            | TaxError::InvalidConfigValueError { .. } => {
                "Check the command-line flags, TAX_FILER_API_BASE_URL and the --config profile"
            }
            TaxError::StorageError { .. } | TaxError::IoError(_) | TaxError::SerializationError(_) => {
                "Check that the --state-dir directory is writable, or remove its state.json"
            }
            TaxError::ValidationError { .. } => "Correct the highlighted fields and resubmit",
        }
    }
}

pub type Result<T> = std::result::Result<T, TaxError>;
