use std::path::PathBuf;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("未找到 yt-dlp: {0:?}")]
    NotFound(PathBuf),

    #[error("启动 yt-dlp 失败: {0}")]
    Io(#[from] std::io::Error),

    #[error("yt-dlp 执行失败 (退出码 {code:?}): {message}")]
    Failed { code: Option<i32>, message: String },

    #[error("无法解析 yt-dlp 输出: {0}")]
    InvalidOutput(#[from] serde_json::Error),
}

impl ExtractError {
    /// 从 stderr 里挑出最有用的一行
    pub fn from_stderr(code: Option<i32>, stderr: &str) -> Self {
        let lines: Vec<&str> = stderr
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();
        let message = lines
            .iter()
            .rev()
            .find(|line| line.starts_with("ERROR:"))
            .or_else(|| lines.last())
            .map(|line| line.to_string())
            .unwrap_or_else(|| "no error output".to_string());
        ExtractError::Failed { code, message }
    }
}
