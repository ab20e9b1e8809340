use thiserror::Error;

#[derive(Error, Debug)]
pub enum ForecastError {
    #[error("No data available for {0}. Please choose another stock or check your custom ticker.")]
    EmptyData(String),

    #[error("No valid data available for {0}. Please choose another stock or check your custom ticker.")]
    EmptyFeatures(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP request error: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Arrow error: {0}")]
    ArrowError(String),

    #[error("Date parsing error: {0}")]
    DateError(#[from] chrono::ParseError),

    #[error("Provider error: {0}")]
    ProviderError(String),

    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    #[error("Model error: {0}")]
    ModelError(String),

    #[error("Data error: {0}")]
    DataError(String),

    #[error("Unknown error: {0}")]
    Unknown(String),
}

impl ForecastError {
    /// 只有空数据类错误会在页面上提示，其余错误按渲染失败处理
    pub fn is_recoverable(&self) -> bool {
        matches!(self, ForecastError::EmptyData(_) | ForecastError::EmptyFeatures(_))
    }
}

pub type Result<T> = std::result::Result<T, ForecastError>;

impl From<arrow::error::ArrowError> for ForecastError {
    fn from(e: arrow::error::ArrowError) -> Self {
        ForecastError::ArrowError(e.to_string())
    }
}

// 用于从字符串创建错误
impl From<String> for ForecastError {
    fn from(s: String) -> Self {
        ForecastError::Unknown(s)
    }
}

impl From<&str> for ForecastError {
    fn from(s: &str) -> Self {
        ForecastError::Unknown(s.to_string())
    }
}
