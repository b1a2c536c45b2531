use thiserror::Error;

#[derive(Error, Debug)]
pub enum MatcherError {
    #[error("Access denied: {reason}")]
    AccessDenied { reason: String },

    #[error("Dataset provisioning failed: {reason}")]
    ProvisionError { reason: String },

    #[error("Dataset query failed: {message}")]
    QueryError { message: String },

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Access,
    Provisioning,
    Query,
    Io,
    Configuration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ErrorSeverity {
    /// 依嚴重程度決定程序結束碼
    pub fn exit_code(self) -> i32 {
        match self {
            Self::Low => 0,
            Self::Medium => 2,
            Self::High => 1,
            Self::Critical => 3,
        }
    }
}

impl MatcherError {
    pub fn provision(reason: impl Into<String>) -> Self {
        Self::ProvisionError {
            reason: reason.into(),
        }
    }

    pub fn query(message: impl Into<String>) -> Self {
        Self::QueryError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::AccessDenied { .. } => ErrorCategory::Access,
            Self::ProvisionError { .. } | Self::ApiError(_) => ErrorCategory::Provisioning,
            Self::QueryError { .. } | Self::CsvError(_) => ErrorCategory::Query,
            Self::IoError(_) | Self::ZipError(_) | Self::SerializationError(_) => {
                ErrorCategory::Io
            }
            Self::ConfigError { .. }
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Access => ErrorSeverity::High,
            ErrorCategory::Provisioning => ErrorSeverity::Critical,
            ErrorCategory::Query => ErrorSeverity::Medium,
            ErrorCategory::Io => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::High,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::AccessDenied { reason } => format!("存取被拒: {}", reason),
            Self::ProvisionError { reason } => {
                format!("無法取得參考資料集 (reference dataset unavailable): {}", reason)
            }
            Self::QueryError { message } => format!("比對查詢失敗: {}", message),
            Self::ApiError(e) => format!("下載資料集時網路錯誤: {}", e),
            Self::CsvError(e) => format!("CSV 格式錯誤: {}", e),
            Self::IoError(e) => format!("檔案讀寫錯誤: {}", e),
            Self::ZipError(e) => format!("ZIP 打包失敗: {}", e),
            Self::SerializationError(e) => format!("JSON 序列化失敗: {}", e),
            other => format!("配置錯誤: {}", other),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Access => "Use a work email address from the allowed domain",
            ErrorCategory::Provisioning => {
                "Check network access to the dataset source and free disk space, then re-run"
            }
            ErrorCategory::Query => "The local dataset may be corrupt; delete it and re-run",
            ErrorCategory::Io => "Check that the input file exists and the output path is writable",
            ErrorCategory::Configuration => "Review the command-line flags or TOML configuration",
        }
    }
}

pub type Result<T> = std::result::Result<T, MatcherError>;
