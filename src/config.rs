use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::cli::Cli;

const DEFAULT_YTDLP: &str = "yt-dlp";

/// 运行期配置：命令行优先，其次环境变量 (clap 已处理)，最后默认值
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub ytdlp_path: PathBuf,
    pub ffmpeg_path: Option<PathBuf>,
    pub item_delay: Duration,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            ytdlp_path: PathBuf::from(DEFAULT_YTDLP),
            ffmpeg_path: None,
            item_delay: Duration::from_secs(1),
        }
    }
}

impl AppConfig {
    pub fn from_cli(args: &Cli) -> Self {
        let config = Self {
            ytdlp_path: args
                .ytdlp_path
                .clone()
                .unwrap_or_else(|| PathBuf::from(DEFAULT_YTDLP)),
            ffmpeg_path: args.ffmpeg_path.clone(),
            item_delay: Duration::from_millis(args.delay_ms),
        };
        debug!("运行配置: {:?}", config);
        config
    }
}
