use std::path::{Path, PathBuf};

use crate::common::models::{MediaFormat, MediaKind};

/// YouTube: 1080p 以内的 H.264 + m4a，不行再退到单文件 mp4
pub const YOUTUBE_MP4_FORMAT: &str = "bestvideo[ext=mp4][vcodec^=avc1][height<=1080]+bestaudio[ext=m4a]/best[ext=mp4][vcodec^=avc1][height<=1080]/best[ext=mp4][vcodec^=avc1]";
pub const AUDIO_FORMAT: &str = "bestaudio/best";
pub const INSTAGRAM_MP4_FORMAT: &str = "best[ext=mp4]/best";
pub const VIDEO_FORMAT: &str = "bestaudio*+bestvideo* / best";
pub const PHOTO_FORMAT: &str = "bestphoto";

const AUDIO_CODEC: &str = "mp3";
const AUDIO_QUALITY: &str = "192K";
const MERGE_FORMAT: &str = "mp4";

/// 下载完成后的处理步骤
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PostProcessor {
    ExtractAudio { codec: String, quality: String },
    ConvertVideo { format: String },
}

/// yt-dlp 的下载参数
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractorOptions {
    pub format: String,
    pub output_template: String,
    pub merge_output_format: Option<String>,
    pub post_processor: Option<PostProcessor>,
    pub no_overwrites: bool,
    pub no_playlist: bool,
    pub cookie_file: Option<PathBuf>,
}

impl ExtractorOptions {
    pub fn new(format: impl Into<String>, output_template: impl Into<String>) -> Self {
        Self {
            format: format.into(),
            output_template: output_template.into(),
            merge_output_format: None,
            post_processor: None,
            no_overwrites: true,
            no_playlist: false,
            cookie_file: None,
        }
    }

    /// 只要音频，转成 192k mp3
    pub fn audio(output_template: impl Into<String>) -> Self {
        Self::new(AUDIO_FORMAT, output_template).with_post_processor(PostProcessor::ExtractAudio {
            codec: AUDIO_CODEC.to_string(),
            quality: AUDIO_QUALITY.to_string(),
        })
    }

    pub fn youtube_mp4(output_template: impl Into<String>) -> Self {
        Self::new(YOUTUBE_MP4_FORMAT, output_template)
            .with_merge_format(MERGE_FORMAT)
            .with_post_processor(PostProcessor::ConvertVideo {
                format: MERGE_FORMAT.to_string(),
            })
    }

    pub fn youtube(format: MediaFormat, output_template: impl Into<String>) -> Self {
        match format {
            MediaFormat::Mp3 => Self::audio(output_template),
            MediaFormat::Mp4 => Self::youtube_mp4(output_template),
        }
    }

    pub fn instagram(format: MediaFormat, output_template: impl Into<String>) -> Self {
        match format {
            MediaFormat::Mp3 => Self::audio(output_template),
            MediaFormat::Mp4 => {
                Self::new(INSTAGRAM_MP4_FORMAT, output_template).with_merge_format(MERGE_FORMAT)
            }
        }
    }

    /// 批量下载里按条目类型选择格式；照片没有音频回退
    pub fn for_kind(kind: MediaKind, output_template: impl Into<String>) -> Self {
        match kind {
            MediaKind::Video => {
                Self::new(VIDEO_FORMAT, output_template).with_merge_format(MERGE_FORMAT)
            }
            MediaKind::Photo => Self::new(PHOTO_FORMAT, output_template),
        }
    }

    pub fn with_merge_format(mut self, format: impl Into<String>) -> Self {
        self.merge_output_format = Some(format.into());
        self
    }

    pub fn with_post_processor(mut self, post_processor: PostProcessor) -> Self {
        self.post_processor = Some(post_processor);
        self
    }

    pub fn with_cookie_file(mut self, cookie_file: Option<&Path>) -> Self {
        self.cookie_file = cookie_file.map(Path::to_path_buf);
        self
    }

    pub fn single_item(mut self) -> Self {
        self.no_playlist = true;
        self
    }

    /// 转换成 yt-dlp 命令行参数 (不含 URL)
    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "-f".to_string(),
            self.format.clone(),
            "-o".to_string(),
            self.output_template.clone(),
        ];

        if let Some(merge) = &self.merge_output_format {
            args.push("--merge-output-format".to_string());
            args.push(merge.clone());
        }

        match &self.post_processor {
            Some(PostProcessor::ExtractAudio { codec, quality }) => {
                args.push("--extract-audio".to_string());
                args.push("--audio-format".to_string());
                args.push(codec.clone());
                args.push("--audio-quality".to_string());
                args.push(quality.clone());
            }
            Some(PostProcessor::ConvertVideo { format }) => {
                args.push("--recode-video".to_string());
                args.push(format.clone());
            }
            None => {}
        }

        if self.no_overwrites {
            args.push("--no-overwrites".to_string());
        }
        if self.no_playlist {
            args.push("--no-playlist".to_string());
        }
        if let Some(cookies) = &self.cookie_file {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }

        args
    }
}

/// 只取元数据，不下载
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProbeOptions {
    pub flat: bool,
    pub ignore_errors: bool,
    pub cookie_file: Option<PathBuf>,
}

impl ProbeOptions {
    /// 播放列表只解析 ID 和标题
    pub fn flat_playlist() -> Self {
        Self {
            flat: true,
            ignore_errors: true,
            cookie_file: None,
        }
    }

    pub fn with_cookie_file(mut self, cookie_file: Option<&Path>) -> Self {
        self.cookie_file = cookie_file.map(Path::to_path_buf);
        self
    }

    pub fn to_args(&self) -> Vec<String> {
        let mut args = vec![
            "--dump-single-json".to_string(),
            "--skip-download".to_string(),
            "--no-warnings".to_string(),
        ];
        if self.flat {
            args.push("--flat-playlist".to_string());
        }
        if self.ignore_errors {
            args.push("--ignore-errors".to_string());
        }
        if let Some(cookies) = &self.cookie_file {
            args.push("--cookies".to_string());
            args.push(cookies.to_string_lossy().into_owned());
        }
        args
    }
}
