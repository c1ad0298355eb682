use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, info, warn};

use super::single::run_task;
use crate::common::error_log::ErrorLog;
use crate::common::models::{BatchResult, DownloadTask, MediaFormat, MediaKind};
use crate::common::utils::{FormatTool, is_valid_url};
use crate::extractor::MediaExtractor;
use crate::extractor::models::ProbeInfo;
use crate::extractor::options::{ExtractorOptions, ProbeOptions};
use crate::{log_error, log_info, log_warning};

/// 从文本文件读取链接，逐条下载
///
/// 单条链接失败只会写入错误日志，不会中断整个批次。
pub struct BatchDownloader<'a> {
    extractor: &'a dyn MediaExtractor,
    out_dir: PathBuf,
    format: MediaFormat,
    cookie_file: Option<PathBuf>,
    delay: Duration,
}

/// 文件中的一行
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UrlLine<'s> {
    Ignored,
    Invalid(&'s str),
    Url(&'s str),
}

/// 空行和 # 注释忽略；不以 http(s):// 开头的视为无效
pub fn classify_line(raw: &str) -> UrlLine<'_> {
    let line = raw.trim();
    if line.is_empty() || line.starts_with('#') {
        UrlLine::Ignored
    } else if is_valid_url(line) {
        UrlLine::Url(line)
    } else {
        UrlLine::Invalid(line)
    }
}

impl<'a> BatchDownloader<'a> {
    pub fn new(extractor: &'a dyn MediaExtractor, out_dir: impl AsRef<Path>, format: MediaFormat) -> Self {
        Self {
            extractor,
            out_dir: out_dir.as_ref().to_path_buf(),
            format,
            cookie_file: None,
            delay: Duration::from_secs(1),
        }
    }

    pub fn with_cookie_file(mut self, cookie_file: Option<PathBuf>) -> Self {
        self.cookie_file = cookie_file;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// 读取文件并处理；文件不存在时只提示，不报错
    pub async fn run_file(&self, path: &Path, error_log: &mut ErrorLog) -> BatchResult {
        let content = match tokio::fs::read_to_string(path).await {
            Ok(content) => content,
            Err(e) => {
                if e.kind() == std::io::ErrorKind::NotFound {
                    log_error!("文件未找到: {}", path.display());
                } else {
                    log_error!("无法读取文件: {} ({})", path.display(), e);
                }
                return BatchResult::default();
            }
        };
        self.run_lines(&content, error_log).await
    }

    pub async fn run_lines(&self, content: &str, error_log: &mut ErrorLog) -> BatchResult {
        let mut result = BatchResult::default();

        if let Err(e) = tokio::fs::create_dir_all(&self.out_dir).await {
            let msg = format!("无法创建输出目录 {}: {}", self.out_dir.display(), e);
            log_error!("{}", msg);
            error_log.append(&msg);
            result.record_failure(msg);
            return result;
        }

        for (index, raw) in content.lines().enumerate() {
            let index = index + 1;
            let tag = FormatTool::line_tag(index);

            let url = match classify_line(raw) {
                UrlLine::Ignored => continue,
                UrlLine::Invalid(line) => {
                    log_warning!("{} Skipped (invalid URL): {}", tag, line);
                    continue;
                }
                UrlLine::Url(url) => url,
            };

            result.total_urls += 1;
            log_info!("{} Process: {}", tag, url);

            let downloaded = self.process_url(index, url, &mut result, error_log).await;
            if downloaded > 0 {
                result.succeeded_urls += 1;
            }
            result.total_items_downloaded += downloaded;
            log_info!("{} Download Count: {}", tag, downloaded);

            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        info!("{}", result);
        result
    }

    /// 处理一条链接，返回成功下载的条目数
    async fn process_url(
        &self,
        index: usize,
        url: &str,
        result: &mut BatchResult,
        error_log: &mut ErrorLog,
    ) -> usize {
        let probe_options = ProbeOptions::default().with_cookie_file(self.cookie_file.as_deref());
        // 解析失败不算错误，按单条处理
        let info = match self.extractor.probe(url, &probe_options).await {
            Ok(info) => Some(info),
            Err(e) => {
                debug!("{} 元数据解析失败: {}", FormatTool::line_tag(index), e);
                None
            }
        };

        match info {
            Some(info) if info.is_carousel() => {
                self.download_carousel(index, &info, result, error_log).await
            }
            _ => self.download_single_item(index, url, result, error_log).await,
        }
    }

    fn options_for(&self, kind: MediaKind, template: String) -> ExtractorOptions {
        let options = match self.format {
            MediaFormat::Mp3 => ExtractorOptions::audio(template),
            MediaFormat::Mp4 => ExtractorOptions::for_kind(kind, template),
        };
        options
            .single_item()
            .with_cookie_file(self.cookie_file.as_deref())
    }

    fn fail(&self, message: String, result: &mut BatchResult, error_log: &mut ErrorLog) {
        log_error!("{}", message);
        error_log.append(&message);
        result.record_failure(message);
    }

    async fn download_carousel(
        &self,
        index: usize,
        info: &ProbeInfo,
        result: &mut BatchResult,
        error_log: &mut ErrorLog,
    ) -> usize {
        let tag = FormatTool::line_tag(index);
        let entries = info.entries();
        let total = entries.len();
        let mut downloaded = 0;

        for (sub_index, entry) in entries.iter().enumerate() {
            let sub_index = sub_index + 1;
            let Some(entry) = entry else {
                continue;
            };
            let Some(entry_url) = entry.download_url() else {
                continue;
            };

            let kind = entry.kind();
            let template = format!("{:02}-{}-%(id)s-%(title)s.%(ext)s", index, sub_index);
            let task = DownloadTask::new(entry_url, self.format, &self.out_dir, template);
            let options = self.options_for(kind, task.output_path_template());

            log_info!(
                "  -> Downloading Carousel ({}/{}) [{:?}]: {}",
                sub_index,
                total,
                kind,
                entry_url
            );
            match run_task(self.extractor, &task, &options).await {
                Ok(()) => downloaded += 1,
                Err(e) => self.fail(
                    format!("{} Carousel Download Fail ({}): {}", tag, entry_url, e),
                    result,
                    error_log,
                ),
            }
        }

        downloaded
    }

    async fn download_single_item(
        &self,
        index: usize,
        url: &str,
        result: &mut BatchResult,
        error_log: &mut ErrorLog,
    ) -> usize {
        let tag = FormatTool::line_tag(index);
        let template = format!("{:02}-%(id)s-%(title)s.%(ext)s", index);
        let task = DownloadTask::new(url, self.format, &self.out_dir, template);

        if self.format.is_audio() {
            let options = self.options_for(MediaKind::Video, task.output_path_template());
            return match run_task(self.extractor, &task, &options).await {
                Ok(()) => 1,
                Err(e) => {
                    self.fail(format!("{} MP3 Download Fail ({}): {}", tag, url, e), result, error_log);
                    0
                }
            };
        }

        let video_options = self.options_for(MediaKind::Video, task.output_path_template());
        let video_err = match run_task(self.extractor, &task, &video_options).await {
            Ok(()) => return 1,
            Err(e) => e,
        };
        warn!("{} Video Download Fail: {}", tag, video_err);
        log_warning!("{} Video Download Fail: {}", tag, video_err);

        // 视频失败后只再试一次图片
        let photo_options = self.options_for(MediaKind::Photo, task.output_path_template());
        match run_task(self.extractor, &task, &photo_options).await {
            Ok(()) => 1,
            Err(photo_err) => {
                self.fail(
                    format!(
                        "{} VIDEO/IMG FAIL ({}): video_err={} | photo_err={}",
                        tag, url, video_err, photo_err
                    ),
                    result,
                    error_log,
                );
                0
            }
        }
    }
}
