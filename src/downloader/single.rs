use std::path::Path;

use tracing::{debug, error};

use crate::common::models::{DownloadTask, MediaFormat};
use crate::extractor::MediaExtractor;
use crate::extractor::error::ExtractError;
use crate::extractor::options::ExtractorOptions;
use crate::log_error;

pub const YOUTUBE_FOLDER: &str = "youtube_videos";
pub const TITLE_TEMPLATE: &str = "%(title)s.%(ext)s";

/// 执行一次下载任务，出错直接返回
pub async fn run_task(
    extractor: &dyn MediaExtractor,
    task: &DownloadTask,
    options: &ExtractorOptions,
) -> Result<(), ExtractError> {
    tokio::fs::create_dir_all(&task.output_dir).await?;
    debug!("下载任务: {:?}", task);
    extractor.download(&task.source, options).await
}

/// 下载单个链接，失败时打印原因并返回 false，不重试
pub async fn download_single(
    extractor: &dyn MediaExtractor,
    task: &DownloadTask,
    options: &ExtractorOptions,
) -> bool {
    match run_task(extractor, task, options).await {
        Ok(()) => true,
        Err(e) => {
            error!("下载失败 {}: {}", task.source, e);
            log_error!("YT-DLP error ({}): {}", task.source, e);
            false
        }
    }
}

/// youtube-video: 单个视频，最高 1080p 或 mp3
pub async fn download_youtube_video(
    extractor: &dyn MediaExtractor,
    url: &str,
    format: MediaFormat,
    folder: &Path,
) -> bool {
    let task = DownloadTask::new(url, format, folder, TITLE_TEMPLATE);
    let options = ExtractorOptions::youtube(format, task.output_path_template()).single_item();
    download_single(extractor, &task, &options).await
}

/// instagram-download --url: 公开的帖子 / reel
pub async fn download_instagram_url(
    extractor: &dyn MediaExtractor,
    url: &str,
    format: MediaFormat,
    folder: &Path,
    cookie_file: Option<&Path>,
) -> bool {
    let task = DownloadTask::new(url, format, folder, TITLE_TEMPLATE);
    let options =
        ExtractorOptions::instagram(format, task.output_path_template()).with_cookie_file(cookie_file);
    download_single(extractor, &task, &options).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extractor::models::ProbeInfo;
    use crate::extractor::options::{ProbeOptions, YOUTUBE_MP4_FORMAT};
    use async_trait::async_trait;
    use std::sync::Mutex;
    use tempfile::tempdir;

    struct RecordingExtractor {
        fail: bool,
        calls: Mutex<Vec<(String, ExtractorOptions)>>,
    }

    #[async_trait]
    impl MediaExtractor for RecordingExtractor {
        async fn probe(&self, _url: &str, _options: &ProbeOptions) -> Result<ProbeInfo, ExtractError> {
            Ok(ProbeInfo::default())
        }

        async fn download(&self, url: &str, options: &ExtractorOptions) -> Result<(), ExtractError> {
            self.calls
                .lock()
                .unwrap()
                .push((url.to_string(), options.clone()));
            if self.fail {
                return Err(ExtractError::Failed {
                    code: Some(1),
                    message: "ERROR: Video unavailable".to_string(),
                });
            }
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_youtube_video_uses_preset_and_creates_folder() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("youtube_videos");
        let extractor = RecordingExtractor {
            fail: false,
            calls: Mutex::new(Vec::new()),
        };

        let ok = download_youtube_video(&extractor, "https://youtu.be/x", MediaFormat::Mp4, &folder).await;

        assert!(ok);
        assert!(folder.is_dir());
        let calls = extractor.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://youtu.be/x");
        assert_eq!(calls[0].1.format, YOUTUBE_MP4_FORMAT);
        assert!(calls[0].1.no_playlist);
        assert!(calls[0].1.no_overwrites);
        assert!(calls[0].1.output_template.ends_with(TITLE_TEMPLATE));
    }

    #[tokio::test]
    async fn test_failure_returns_false_without_retry() {
        let dir = tempdir().unwrap();
        let extractor = RecordingExtractor {
            fail: true,
            calls: Mutex::new(Vec::new()),
        };

        let ok = download_instagram_url(
            &extractor,
            "https://www.instagram.com/p/abc/",
            MediaFormat::Mp3,
            dir.path(),
            None,
        )
        .await;

        assert!(!ok);
        assert_eq!(extractor.calls.lock().unwrap().len(), 1);
    }
}
