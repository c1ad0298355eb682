use thiserror::Error;

#[derive(Debug, Error)]
pub enum DownloadError {
    #[error("HTTP错误: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO错误: {0}")]
    IoError(#[from] std::io::Error),

    #[error("HTTP 状态异常 {status}: {url}")]
    BadStatus { status: u16, url: String },

    #[error("下载流中断: {0}")]
    StreamError(String),
}
