use clap::{ArgGroup, Args, Parser, Subcommand};
use std::path::PathBuf;

use crate::common::models::MediaFormat;

/// YouTube / Instagram / Coub 下载器
#[derive(Parser, Debug)]
#[command(name = "mediadl")]
#[command(version = "1.0")]
#[command(author = "rpeng252@gmail.com")]
#[command(about = "YouTube, Instagram, Coub Downloader CLI", long_about = None)]
#[command(after_help = USAGE_EXAMPLES)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// yt-dlp 可执行文件路径
    #[arg(long, global = true, value_name = "PATH", env = "YTDLP_PATH")]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub ytdlp_path: Option<PathBuf>,

    /// ffmpeg 可执行文件路径 (传给 yt-dlp)
    #[arg(long, global = true, value_name = "PATH", env = "FFMPEG_PATH")]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub ffmpeg_path: Option<PathBuf>,

    /// 批量下载时每条链接之间的间隔 (毫秒)
    #[arg(long, global = true, value_name = "MS", default_value_t = 1000)]
    pub delay_ms: u64,

    /// 输出调试日志
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Download YouTube video (max 1080p)
    #[command(name = "youtube-video")]
    YoutubeVideo(YoutubeArgs),

    /// Download YouTube playlist (max 1080p)
    #[command(name = "youtube-playlist")]
    YoutubePlaylist(YoutubeArgs),

    /// Download Instagram video (URL or file)
    #[command(name = "instagram-download")]
    InstagramDownload(InstagramArgs),

    /// Download Coub liked videos
    #[command(name = "coub-likes")]
    CoubLikes(CoubArgs),
}

#[derive(Args, Debug)]
pub struct YoutubeArgs {
    /// YouTube 视频或播放列表链接
    #[arg(long, value_name = "URL")]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub url: String,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = MediaFormat::Mp4)]
    pub format: MediaFormat,
}

#[derive(Args, Debug)]
#[command(group(ArgGroup::new("source").required(true).args(["url", "file"])))]
pub struct InstagramArgs {
    /// Instagram video/post/reel URL
    #[arg(long, value_name = "URL")]
    #[arg(value_hint = clap::ValueHint::Url)]
    pub url: Option<String>,

    /// Text file with Instagram URLs (one per line)
    #[arg(long, value_name = "FILE")]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub file: Option<PathBuf>,

    /// 输出格式
    #[arg(long, value_enum, default_value_t = MediaFormat::Mp4)]
    pub format: MediaFormat,

    /// Output folder for Instagram videos
    #[arg(long, value_name = "DIR", default_value = "instagram_videos")]
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub out: PathBuf,

    /// Netscape 格式的 cookies 文件 (私密内容需要)
    #[arg(long, value_name = "FILE")]
    #[arg(value_hint = clap::ValueHint::FilePath)]
    pub cookies: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct CoubArgs {
    /// _coub_session cookie
    #[arg(long, value_name = "SESSION")]
    pub session: String,

    /// remember_token cookie
    #[arg(long, value_name = "TOKEN")]
    pub token: String,

    /// 保存目录
    #[arg(long, value_name = "DIR", default_value = "coub_likes")]
    #[arg(value_hint = clap::ValueHint::DirPath)]
    pub out: PathBuf,
}

const USAGE_EXAMPLES: &str = "\
USAGE:
    Download YouTube video (mp4):
        mediadl youtube-video --url \"https://youtube.com/watch?v=...\" --format mp4

    Download YouTube video as audio (mp3):
        mediadl youtube-video --url \"https://youtube.com/watch?v=...\" --format mp3

    Download YouTube playlist (mp4):
        mediadl youtube-playlist --url \"https://youtube.com/playlist?list=...\" --format mp4

    Download Instagram video:
        mediadl instagram-download --url \"https://www.instagram.com/p/XXXX/\"

    Download Instagram videos from a URL list (txt file):
        mediadl instagram-download --file urls.txt

    Download Coub liked videos:
        mediadl coub-likes --session <COUB_SESSION> --token <REMEMBER_TOKEN>";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_youtube_video_defaults() {
        let cli = Cli::try_parse_from(["mediadl", "youtube-video", "--url", "https://youtu.be/x"])
            .unwrap();
        match cli.command {
            Command::YoutubeVideo(args) => {
                assert_eq!(args.url, "https://youtu.be/x");
                assert_eq!(args.format, MediaFormat::Mp4);
            }
            other => panic!("期望 youtube-video, 实际 {:?}", other),
        }
        assert_eq!(cli.delay_ms, 1000);
    }

    #[test]
    fn test_parse_playlist_mp3() {
        let cli = Cli::try_parse_from([
            "mediadl",
            "youtube-playlist",
            "--url",
            "https://www.youtube.com/playlist?list=PL1",
            "--format",
            "mp3",
        ])
        .unwrap();
        assert!(matches!(
            cli.command,
            Command::YoutubePlaylist(YoutubeArgs { format: MediaFormat::Mp3, .. })
        ));
    }

    #[test]
    fn test_instagram_requires_exactly_one_source() {
        assert!(Cli::try_parse_from(["mediadl", "instagram-download"]).is_err());
        assert!(
            Cli::try_parse_from([
                "mediadl",
                "instagram-download",
                "--url",
                "https://instagram.com/p/1",
                "--file",
                "urls.txt",
            ])
            .is_err()
        );

        let cli = Cli::try_parse_from(["mediadl", "instagram-download", "--file", "urls.txt"])
            .unwrap();
        match cli.command {
            Command::InstagramDownload(args) => {
                assert_eq!(args.file, Some(PathBuf::from("urls.txt")));
                assert_eq!(args.out, PathBuf::from("instagram_videos"));
            }
            other => panic!("期望 instagram-download, 实际 {:?}", other),
        }
    }

    #[test]
    fn test_rejects_unknown_format() {
        assert!(
            Cli::try_parse_from([
                "mediadl",
                "youtube-video",
                "--url",
                "https://youtu.be/x",
                "--format",
                "webm",
            ])
            .is_err()
        );
    }

    #[test]
    fn test_coub_requires_credentials() {
        assert!(Cli::try_parse_from(["mediadl", "coub-likes", "--session", "s"]).is_err());
        let cli = Cli::try_parse_from(["mediadl", "coub-likes", "--session", "s", "--token", "t"])
            .unwrap();
        assert!(matches!(cli.command, Command::CoubLikes(_)));
    }
}
