use std::fmt;
use std::path::{Path, PathBuf};

use clap::ValueEnum;

// -----------------------------------------------------------------------------------------------

/// 用户请求的输出格式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum MediaFormat {
    #[default]
    Mp4,
    Mp3,
}

impl MediaFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            MediaFormat::Mp4 => "mp4",
            MediaFormat::Mp3 => "mp3",
        }
    }

    pub fn is_audio(&self) -> bool {
        matches!(self, MediaFormat::Mp3)
    }
}

impl fmt::Display for MediaFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

// 探测结果里单个条目的媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Video,
    Photo,
}

// -----------------------------------------------------------------------------------------------

/// 一次下载尝试所需的全部信息，只用一次
#[derive(Debug, Clone)]
pub struct DownloadTask {
    pub source: String,          // 源 URL 或 ID
    pub format: MediaFormat,     // 目标格式
    pub output_dir: PathBuf,     // 输出目录
    pub output_template: String, // 文件名模板 (相对 output_dir)
}

impl DownloadTask {
    pub fn new(
        source: impl Into<String>,
        format: MediaFormat,
        output_dir: impl AsRef<Path>,
        output_template: impl Into<String>,
    ) -> Self {
        Self {
            source: source.into(),
            format,
            output_dir: output_dir.as_ref().to_path_buf(),
            output_template: output_template.into(),
        }
    }

    /// 完整的输出路径模板
    pub fn output_path_template(&self) -> String {
        self.output_dir
            .join(&self.output_template)
            .to_string_lossy()
            .into_owned()
    }
}

// -----------------------------------------------------------------------------------------------

/// 一次批量运行的统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchResult {
    pub total_urls: usize,
    pub succeeded_urls: usize,
    pub total_items_downloaded: usize,
    pub failures: Vec<String>,
}

impl BatchResult {
    pub fn record_failure(&mut self, message: impl Into<String>) {
        self.failures.push(message.into());
    }

    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

impl fmt::Display for BatchResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Completed: {}/{} Downloaded, Count: {}",
            self.succeeded_urls, self.total_urls, self.total_items_downloaded
        )
    }
}
