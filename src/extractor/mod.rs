use async_trait::async_trait;

pub mod error;
pub mod models;
pub mod options;
pub mod ytdlp;

use error::ExtractError;
use models::ProbeInfo;
use options::{ExtractorOptions, ProbeOptions};

pub use ytdlp::YtDlp;

/// 外部媒体解析/下载工具的抽象
#[async_trait]
pub trait MediaExtractor: Send + Sync {
    /// 只获取元数据
    async fn probe(&self, url: &str, options: &ProbeOptions) -> Result<ProbeInfo, ExtractError>;

    /// 按给定参数下载到本地
    async fn download(&self, url: &str, options: &ExtractorOptions) -> Result<(), ExtractError>;
}
