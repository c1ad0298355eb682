use std::path::Path;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use tracing::{debug, warn};

use media_downloader::cli::{Cli, Command, CoubArgs, InstagramArgs, YoutubeArgs};
use media_downloader::common::api::client::CoubClient;
use media_downloader::common::error_log::{DebugLog, ErrorLog};
use media_downloader::common::logger::PrettyLogger;
use media_downloader::config::AppConfig;
use media_downloader::downloader::http::HttpFetcher;
use media_downloader::downloader::single::{
    YOUTUBE_FOLDER, download_instagram_url, download_youtube_video,
};
use media_downloader::downloader::{BatchDownloader, LikesDownloader, PlaylistDownloader, StopReason};
use media_downloader::extractor::YtDlp;
use media_downloader::{log_complete, log_error, log_step};

/// 确认 yt-dlp 可用
async fn prepare_extractor(config: &AppConfig) -> Result<YtDlp> {
    let extractor = YtDlp::from_config(config);
    extractor
        .check_available()
        .await
        .context("yt-dlp 不可用，请安装 yt-dlp 或通过 --ytdlp-path / YTDLP_PATH 指定路径")?;
    Ok(extractor)
}

async fn handle_youtube_video(config: &AppConfig, args: &YoutubeArgs) -> Result<bool> {
    let extractor = prepare_extractor(config).await?;
    log_step!("下载 YouTube 视频 ({})", args.format);

    let ok = download_youtube_video(&extractor, &args.url, args.format, Path::new(YOUTUBE_FOLDER)).await;
    if ok {
        PrettyLogger::file_info("保存目录", YOUTUBE_FOLDER);
    } else {
        log_error!("Failed: {}", args.url);
    }
    Ok(ok)
}

async fn handle_youtube_playlist(config: &AppConfig, args: &YoutubeArgs) -> Result<bool> {
    let extractor = prepare_extractor(config).await?;
    log_step!("下载 YouTube 播放列表 ({})", args.format);

    let folder = Path::new(YOUTUBE_FOLDER);
    let mut debug_log = DebugLog::in_dir(folder)
        .with_context(|| format!("无法打开调试日志: {}", folder.display()))?;

    let result = PlaylistDownloader::new(&extractor, folder, args.format)
        .run(&args.url, &mut debug_log)
        .await;

    PrettyLogger::completion_summary(vec![
        result.to_string(),
        format!("失败: {}", result.failures.len()),
        format!("调试日志: {}", debug_log.path().display()),
    ]);
    Ok(true)
}

async fn handle_instagram(config: &AppConfig, args: &InstagramArgs) -> Result<bool> {
    let extractor = prepare_extractor(config).await?;

    if let Some(url) = &args.url {
        log_step!("下载 Instagram 链接 ({})", args.format);
        let ok = download_instagram_url(&extractor, url, args.format, &args.out, args.cookies.as_deref()).await;
        if !ok {
            log_error!("Failed: {}", url);
        }
        return Ok(ok);
    }

    let Some(file) = &args.file else {
        // clap 的参数组保证 --url 和 --file 二选一
        anyhow::bail!("需要 --url 或 --file");
    };

    log_step!("批量下载 Instagram 链接: {}", file.display());
    tokio::fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("无法创建输出目录: {}", args.out.display()))?;
    let mut error_log = ErrorLog::in_dir(&args.out)
        .with_context(|| format!("无法打开错误日志: {}", args.out.display()))?;

    let result = BatchDownloader::new(&extractor, &args.out, args.format)
        .with_cookie_file(args.cookies.clone())
        .with_delay(config.item_delay)
        .run_file(file, &mut error_log)
        .await;

    PrettyLogger::separator();
    println!("{}", result.to_string().green().bold());
    if !result.is_clean() {
        PrettyLogger::file_info("错误日志", error_log.path().display().to_string());
    }
    Ok(true)
}

async fn handle_coub_likes(args: &CoubArgs) -> Result<bool> {
    log_step!("下载 Coub 点赞");

    let client = CoubClient::new(&args.session, &args.token).context("无法创建 Coub 客户端")?;
    let fetcher = HttpFetcher::new(reqwest::Client::new());
    tokio::fs::create_dir_all(&args.out)
        .await
        .with_context(|| format!("无法创建输出目录: {}", args.out.display()))?;
    let mut error_log = ErrorLog::in_dir(&args.out)
        .with_context(|| format!("无法打开错误日志: {}", args.out.display()))?;

    let summary = LikesDownloader::new(&client, &fetcher, &args.out)
        .run(&mut error_log)
        .await;

    PrettyLogger::completion_summary(vec![
        format!("页数: {}", summary.pages_requested),
        format!("点赞: {}", summary.items_seen),
        format!("下载: {}", summary.downloaded),
        format!("已存在: {}", summary.skipped),
        format!("失败: {}", summary.failed),
    ]);

    match &summary.stop_reason {
        StopReason::Exhausted => Ok(true),
        StopReason::TransportError { page, error } => {
            warn!("分页在第 {} 页因请求失败而中止: {}", page, error);
            Ok(false)
        }
    }
}

async fn run(args: &Cli, config: &AppConfig) -> Result<bool> {
    match &args.command {
        Command::YoutubeVideo(cmd) => handle_youtube_video(config, cmd).await,
        Command::YoutubePlaylist(cmd) => handle_youtube_playlist(config, cmd).await,
        Command::InstagramDownload(cmd) => handle_instagram(config, cmd).await,
        Command::CoubLikes(cmd) => handle_coub_likes(cmd).await,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    // 解析命令行参数
    let args = Cli::parse();

    // 初始化日志
    let level = if args.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt().with_max_level(level).init();

    let config = AppConfig::from_cli(&args);
    debug!("命令: {:?}", args.command);

    match run(&args, &config).await {
        Ok(true) => {
            log_complete!("完成");
            ExitCode::SUCCESS
        }
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            log_error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}
