use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, error, info};

use super::error::ExtractError;
use super::models::ProbeInfo;
use super::options::{ExtractorOptions, ProbeOptions};
use super::MediaExtractor;
use crate::config::AppConfig;

/// 调用系统 yt-dlp 可执行文件
#[derive(Debug, Clone)]
pub struct YtDlp {
    binary: PathBuf,
    ffmpeg_location: Option<PathBuf>,
}

impl YtDlp {
    pub fn new(binary: impl AsRef<Path>) -> Self {
        Self {
            binary: binary.as_ref().to_path_buf(),
            ffmpeg_location: None,
        }
    }

    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            binary: config.ytdlp_path.clone(),
            ffmpeg_location: config.ffmpeg_path.clone(),
        }
    }

    /// 检查 yt-dlp 是否可用，返回版本号
    pub async fn check_available(&self) -> Result<String, ExtractError> {
        debug!("检查 yt-dlp 是否可用: {:?}", self.binary);
        let output = self
            .command()
            .arg("--version")
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::null())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            error!("❌ 未检测到 yt-dlp，请确保系统中已安装并配置了可执行路径。");
            error!("或者设置环境变量 YTDLP_PATH 指向 yt-dlp 可执行文件路径");
            return Err(ExtractError::NotFound(self.binary.clone()));
        }

        let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
        info!("yt-dlp 版本: {}", version);
        Ok(version)
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.binary);
        if let Some(ffmpeg) = &self.ffmpeg_location {
            cmd.arg("--ffmpeg-location").arg(ffmpeg);
        }
        cmd
    }

    fn spawn_error(&self, e: std::io::Error) -> ExtractError {
        if e.kind() == std::io::ErrorKind::NotFound {
            ExtractError::NotFound(self.binary.clone())
        } else {
            ExtractError::Io(e)
        }
    }
}

#[async_trait]
impl MediaExtractor for YtDlp {
    async fn probe(&self, url: &str, options: &ProbeOptions) -> Result<ProbeInfo, ExtractError> {
        let args = options.to_args();
        debug!("yt-dlp 解析: {} {:?}", url, args);

        let output = self
            .command()
            .args(&args)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        // --ignore-errors 时退出码可能非 0 但 stdout 仍有结果
        if output.stdout.iter().all(u8::is_ascii_whitespace) {
            return Err(ExtractError::from_stderr(
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ));
        }
        if !output.status.success() && !options.ignore_errors {
            return Err(ExtractError::from_stderr(
                output.status.code(),
                &String::from_utf8_lossy(&output.stderr),
            ));
        }

        let info = ProbeInfo::from_json(&String::from_utf8_lossy(&output.stdout))?;
        Ok(info)
    }

    async fn download(&self, url: &str, options: &ExtractorOptions) -> Result<(), ExtractError> {
        let args = options.to_args();
        debug!("yt-dlp 下载: {} {:?}", url, args);

        // 进度直接输出到终端，只收集 stderr 用于报错
        let output = self
            .command()
            .args(&args)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::inherit())
            .stderr(Stdio::piped())
            .output()
            .await
            .map_err(|e| self.spawn_error(e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            debug!("yt-dlp stderr:\n{}", stderr);
            return Err(ExtractError::from_stderr(output.status.code(), &stderr));
        }

        Ok(())
    }
}
