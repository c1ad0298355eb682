use std::path::{Path, PathBuf};

use tracing::{info, warn};

use super::single::{TITLE_TEMPLATE, run_task};
use crate::common::error_log::{DebugLog, error_chain};
use crate::common::logger::PrettyLogger;
use crate::common::models::{BatchResult, DownloadTask, MediaFormat};
use crate::common::utils::{build_video_url, normalize_playlist_url, sanitize_filename};
use crate::extractor::MediaExtractor;
use crate::extractor::options::{ExtractorOptions, ProbeOptions};
use crate::{log_error, log_info, log_success};

const PLAYLIST_FALLBACK_DIR: &str = "playlist";

/// 播放列表批量下载：先扁平解析，再逐个视频下载
pub struct PlaylistDownloader<'a> {
    extractor: &'a dyn MediaExtractor,
    folder: PathBuf,
    format: MediaFormat,
}

impl<'a> PlaylistDownloader<'a> {
    pub fn new(extractor: &'a dyn MediaExtractor, folder: impl AsRef<Path>, format: MediaFormat) -> Self {
        Self {
            extractor,
            folder: folder.as_ref().to_path_buf(),
            format,
        }
    }

    /// 每个视频所在的子目录模板，`%` 需要转义
    fn item_template(playlist_title: &str) -> String {
        let dir = sanitize_filename(playlist_title);
        // "." 和 ".." 会跳出输出目录
        let dir = match dir.trim() {
            "" | "." | ".." => PLAYLIST_FALLBACK_DIR.to_string(),
            _ => dir,
        };
        let dir = dir.replace('%', "%%");
        Path::new(&dir).join(TITLE_TEMPLATE).to_string_lossy().into_owned()
    }

    pub async fn run(&self, playlist_url: &str, debug_log: &mut DebugLog) -> BatchResult {
        let mut result = BatchResult::default();

        let playlist_url = normalize_playlist_url(playlist_url);
        info!("播放列表链接: {}", playlist_url);

        let playlist = match self
            .extractor
            .probe(&playlist_url, &ProbeOptions::flat_playlist())
            .await
        {
            Ok(info) => info,
            Err(e) => {
                debug_log.block("PLAYLIST-EXTRACTION-ERROR", &playlist_url, &error_chain(&e));
                log_error!(
                    "Playlist extraction failed: {}. Logged to {}",
                    e,
                    debug_log.path().display()
                );
                result.record_failure(format!("{}: {}", playlist_url, e));
                return result;
            }
        };

        let playlist_title = playlist
            .title
            .clone()
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| PLAYLIST_FALLBACK_DIR.to_string());
        let entries = playlist.entries();
        let total = entries.len();
        result.total_urls = total;
        log_info!(
            "Playlist '{}' 中找到 {} 个条目，开始下载...",
            playlist_title,
            total
        );

        let template = Self::item_template(&playlist_title);

        for (idx, entry) in entries.iter().enumerate() {
            let idx = idx + 1;

            let Some(entry) = entry else {
                debug_log.block("ENTRY NONE", &format!("index={}", idx), &[]);
                PrettyLogger::progress(idx, total, "Entry None, 跳过");
                result.record_failure(format!("[{}/{}] entry none", idx, total));
                continue;
            };

            let Some(video_id) = entry.flat_id() else {
                debug_log.block("NO-ID", &format!("index={} entry={:?}", idx, entry), &[]);
                PrettyLogger::progress(idx, total, "没有 ID, 跳过");
                result.record_failure(format!("[{}/{}] no id", idx, total));
                continue;
            };

            let video_url = build_video_url(video_id);
            PrettyLogger::progress(idx, total, format!("下载中: {}", video_url));

            // 每个视频使用新的下载参数
            let task = DownloadTask::new(&video_url, self.format, &self.folder, template.as_str());
            let options = ExtractorOptions::youtube(self.format, task.output_path_template()).single_item();

            match run_task(self.extractor, &task, &options).await {
                Ok(()) => {
                    result.succeeded_urls += 1;
                    result.total_items_downloaded += 1;
                }
                Err(e) => {
                    let mut details = vec![format!(
                        "Flat-title (if present): {}",
                        entry.title.as_deref().unwrap_or("None")
                    )];
                    details.extend(error_chain(&e));
                    debug_log.block("VIDEO-ERROR", &video_url, &details);

                    warn!("[{}/{}] 下载失败: {}", idx, total, e);
                    PrettyLogger::progress(
                        idx,
                        total,
                        format!(
                            "Error: {}. 详情已写入 {}, 继续下一个",
                            e,
                            debug_log.path().display()
                        ),
                    );
                    result.record_failure(format!("{}: {}", video_url, e));
                }
            }
        }

        log_success!("播放列表下载完成: {}/{}", result.succeeded_urls, total);
        result
    }
}
