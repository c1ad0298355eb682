use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("网络请求失败: {0}")]
    Reqwest(#[from] reqwest::Error),

    #[error("HTTP 状态异常 {status}: {body}")]
    Status { status: u16, body: String },

    #[error("响应解析失败: {0}")]
    InvalidResponse(String),

    #[error("无效的请求头: {0}")]
    InvalidHeader(String),
}

impl ApiError {
    /// 401/403 一般是 cookie 失效
    pub fn is_auth_failure(&self) -> bool {
        matches!(self, ApiError::Status { status: 401 | 403, .. })
    }
}

impl From<reqwest::header::InvalidHeaderValue> for ApiError {
    fn from(e: reqwest::header::InvalidHeaderValue) -> Self {
        Self::InvalidHeader(e.to_string())
    }
}
