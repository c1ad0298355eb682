use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::{debug, info, warn};

use super::http::{FetchOutcome, MediaFetcher, download_to_folder};
use crate::common::api::client::CoubClient;
use crate::common::api::error::ApiError;
use crate::common::api::models::likes::{LikedItem, LikesPage};
use crate::common::error_log::ErrorLog;
use crate::common::logger::PrettyLogger;
use crate::common::utils::FormatTool;
use crate::{log_error, log_success, log_warning};

const COUB_EXTENSION: &str = "mp4";

/// 分页的点赞列表来源
#[async_trait]
pub trait LikesSource: Send + Sync {
    async fn fetch_page(&self, page: u32) -> LikesPage;
}

#[async_trait]
impl LikesSource for CoubClient {
    async fn fetch_page(&self, page: u32) -> LikesPage {
        self.fetch_likes_page(page).await
    }
}

/// 分页循环结束的原因
#[derive(Debug)]
pub enum StopReason {
    /// 拿到空页，正常结束
    Exhausted,
    /// 请求失败 (鉴权失败、网络错误等)，与"没有更多"区分开
    TransportError { page: u32, error: ApiError },
}

#[derive(Debug)]
pub struct LikesSummary {
    pub pages_requested: u32,
    pub items_seen: usize,
    pub downloaded: usize,
    pub skipped: usize,
    pub failed: usize,
    pub stop_reason: StopReason,
}

impl LikesSummary {
    fn new() -> Self {
        Self {
            pages_requested: 0,
            items_seen: 0,
            downloaded: 0,
            skipped: 0,
            failed: 0,
            stop_reason: StopReason::Exhausted,
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self.stop_reason, StopReason::Exhausted)
    }
}

/// 逐页拉取点赞并下载到 folder
pub struct LikesDownloader<'a> {
    source: &'a dyn LikesSource,
    fetcher: &'a dyn MediaFetcher,
    folder: PathBuf,
}

impl<'a> LikesDownloader<'a> {
    pub fn new(source: &'a dyn LikesSource, fetcher: &'a dyn MediaFetcher, folder: impl AsRef<Path>) -> Self {
        Self {
            source,
            fetcher,
            folder: folder.as_ref().to_path_buf(),
        }
    }

    /// 从第 1 页开始，直到空页或请求失败
    pub async fn run(&self, error_log: &mut ErrorLog) -> LikesSummary {
        let mut summary = LikesSummary::new();
        let mut page = 1u32;

        loop {
            summary.pages_requested += 1;
            let items = match self.source.fetch_page(page).await {
                LikesPage::Items(items) => items,
                LikesPage::Empty => {
                    debug!("第 {} 页为空，结束", page);
                    summary.stop_reason = StopReason::Exhausted;
                    break;
                }
                LikesPage::TransportError(error) => {
                    let msg = format!("Coub likes page {} failed: {}", page, error);
                    if error.is_auth_failure() {
                        log_error!("{} (cookie 可能已失效)", msg);
                    } else {
                        log_error!("{}", msg);
                    }
                    error_log.append(&msg);
                    summary.stop_reason = StopReason::TransportError { page, error };
                    break;
                }
            };

            info!("第 {} 页: {} 条", page, items.len());
            for item in &items {
                summary.items_seen += 1;
                self.download_item(item, &mut summary, error_log).await;
            }
            page += 1;
        }

        summary
    }

    async fn download_item(&self, item: &LikedItem, summary: &mut LikesSummary, error_log: &mut ErrorLog) {
        let title = item.display_title();
        let Some(url) = item.media_url.as_deref() else {
            log_warning!("没有可下载的地址, 跳过: {}", title);
            return;
        };

        match download_to_folder(self.fetcher, url, &self.folder, &title, COUB_EXTENSION).await {
            Ok(FetchOutcome::Downloaded { path, bytes }) => {
                summary.downloaded += 1;
                log_success!(
                    "Downloaded: {} ({})",
                    path.display(),
                    FormatTool::format_size(bytes)
                );
            }
            Ok(FetchOutcome::Skipped(path)) => {
                summary.skipped += 1;
                PrettyLogger::skipped(path.display().to_string());
            }
            Err(e) => {
                summary.failed += 1;
                let msg = format!("Fail ({}): {}", url, e);
                warn!("{}", msg);
                log_error!("{}", msg);
                error_log.append(&msg);
            }
        }
    }
}
