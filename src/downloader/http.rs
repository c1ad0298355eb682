use std::path::{Path, PathBuf};

use async_trait::async_trait;
use futures::StreamExt;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use tokio::io::{AsyncWriteExt, BufWriter};
use tracing::{debug, warn};

use super::error::DownloadError;
use crate::common::utils::sanitize_filename;

const CHUNK_SIZE: usize = 64 * 1024;

/// 把远程文件写到本地路径，返回写入字节数
#[async_trait]
pub trait MediaFetcher: Send + Sync {
    async fn fetch_to_file(&self, url: &str, output_path: &Path) -> Result<u64, DownloadError>;
}

/// 普通 GET 流式下载
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    // 没有 Content-Length 时不显示进度条
    fn progress_bar(&self, total_size: u64) -> Option<ProgressBar> {
        if total_size == 0 {
            return None;
        }
        let pb = ProgressBar::new(total_size);
        match ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {bytes}/{total_bytes} ({eta})",
        ) {
            Ok(style) => pb.set_style(style.progress_chars("#>-")),
            Err(e) => warn!("进度条模板无效: {}", e),
        }
        Some(pb)
    }
}

#[async_trait]
impl MediaFetcher for HttpFetcher {
    async fn fetch_to_file(&self, url: &str, output_path: &Path) -> Result<u64, DownloadError> {
        let response = self.client.get(url).send().await?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::BadStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let total_size = response.content_length().unwrap_or(0);
        let pb = self.progress_bar(total_size);

        debug!("开始下载二进制文件: {}", url);

        let file = tokio::fs::File::create(output_path).await?;
        let mut writer = BufWriter::with_capacity(CHUNK_SIZE, file);
        let mut stream = response.bytes_stream();

        let mut downloaded = 0u64;
        while let Some(chunk_result) = stream.next().await {
            let chunk = match chunk_result {
                Ok(chunk) => chunk,
                Err(error) => {
                    if let Some(pb) = &pb {
                        pb.abandon_with_message("下载失败");
                    }
                    return Err(DownloadError::StreamError(error.to_string()));
                }
            };

            writer.write_all(&chunk).await?;
            downloaded += chunk.len() as u64;

            if let Some(pb) = &pb {
                pb.set_position(downloaded);
            }
        }
        writer.flush().await?;

        if let Some(pb) = pb {
            pb.finish_and_clear();
        }

        Ok(downloaded)
    }
}

/// 单个文件的下载结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FetchOutcome {
    Downloaded { path: PathBuf, bytes: u64 },
    Skipped(PathBuf),
}

/// `<folder>/<title>.<ext>`，标题中的路径分隔符会被替换
pub fn target_path(folder: &Path, title: &str, extension: &str) -> PathBuf {
    folder.join(format!("{}.{}", sanitize_filename(title), extension))
}

/// 目标文件已存在就跳过；否则先写 .part 再改名，失败时删除残留
pub async fn download_to_folder(
    fetcher: &dyn MediaFetcher,
    url: &str,
    folder: &Path,
    title: &str,
    extension: &str,
) -> Result<FetchOutcome, DownloadError> {
    tokio::fs::create_dir_all(folder).await?;

    let path = target_path(folder, title, extension);
    if tokio::fs::try_exists(&path).await? {
        return Ok(FetchOutcome::Skipped(path));
    }

    let mut part_name = path.as_os_str().to_owned();
    part_name.push(".part");
    let part_path = PathBuf::from(part_name);

    match fetcher.fetch_to_file(url, &part_path).await {
        Ok(bytes) => {
            tokio::fs::rename(&part_path, &path).await?;
            Ok(FetchOutcome::Downloaded { path, bytes })
        }
        Err(e) => {
            if let Err(remove_err) = tokio::fs::remove_file(&part_path).await {
                if remove_err.kind() != std::io::ErrorKind::NotFound {
                    warn!("清理临时文件失败 {:?}: {}", part_path, remove_err);
                }
            }
            Err(e)
        }
    }
}
