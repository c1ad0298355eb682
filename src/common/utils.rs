use lazy_static::lazy_static;
use regex::Regex;
use url::Url;

const YOUTUBE_PLAYLIST_URL: &str = "https://www.youtube.com/playlist";
const YOUTUBE_WATCH_URL: &str = "https://www.youtube.com/watch";

lazy_static! {
    static ref URL_PATTERN: Regex = Regex::new(r"^https?://").unwrap();
}

/// 只做最基本的检查：以 http:// 或 https:// 开头
pub fn is_valid_url(line: &str) -> bool {
    URL_PATTERN.is_match(line)
}

/// 替换路径分隔符，避免标题被当成子目录
pub fn sanitize_filename(name: &str) -> String {
    name.replace(['/', '\\'], "_")
}

/// watch?v=..&list=.. 之类的链接统一为播放列表链接
pub fn normalize_playlist_url(input: &str) -> String {
    let Ok(parsed) = Url::parse(input) else {
        return input.to_string();
    };

    let list_id = parsed
        .query_pairs()
        .find(|(key, _)| key == "list")
        .map(|(_, value)| value.into_owned());

    match list_id {
        Some(id) if !id.is_empty() => match Url::parse_with_params(YOUTUBE_PLAYLIST_URL, &[("list", id)]) {
            Ok(url) => url.into(),
            Err(_) => input.to_string(),
        },
        _ => input.to_string(),
    }
}

/// 扁平解析得到的条目可能是完整链接，也可能只有视频 ID
pub fn build_video_url(id_or_url: &str) -> String {
    if id_or_url.starts_with("http") {
        return id_or_url.to_string();
    }
    match Url::parse_with_params(YOUTUBE_WATCH_URL, &[("v", id_or_url)]) {
        Ok(url) => url.into(),
        Err(_) => format!("{}?v={}", YOUTUBE_WATCH_URL, id_or_url),
    }
}

pub struct FormatTool;

impl FormatTool {
    // 格式化文件大小
    pub fn format_size(size: u64) -> String {
        if size == 0 {
            "0 MB".to_string()
        } else if size > 1024 * 1024 * 1024 {
            format!("{:.2} GB", size as f64 / 1024.0 / 1024.0 / 1024.0)
        } else if size > 1024 * 1024 {
            format!("{:.1} MB", size as f64 / 1024.0 / 1024.0)
        } else {
            format!("{:.1} KB", size as f64 / 1024.0)
        }
    }

    // 批量下载时的行号: [01] [02] ...
    pub fn line_tag(index: usize) -> String {
        format!("[{:02}]", index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_url_pattern() {
        assert!(is_valid_url("https://www.instagram.com/p/abc/"));
        assert!(is_valid_url("http://example.com"));
        assert!(!is_valid_url("www.instagram.com/p/abc/"));
        assert!(!is_valid_url("ftp://example.com/file"));
        assert!(!is_valid_url(" https://leading.space"));
    }

    #[test]
    fn test_sanitize_filename() {
        assert_eq!(sanitize_filename("a/b\\c"), "a_b_c");
        assert_eq!(sanitize_filename("plain title"), "plain title");
    }

    #[test]
    fn test_normalize_watch_url_with_list() {
        let url = "https://www.youtube.com/watch?v=abc123&list=PL12345&index=2";
        assert_eq!(
            normalize_playlist_url(url),
            "https://www.youtube.com/playlist?list=PL12345"
        );
    }

    #[test]
    fn test_normalize_keeps_url_without_list() {
        let url = "https://www.youtube.com/watch?v=abc123";
        assert_eq!(normalize_playlist_url(url), url);
        assert_eq!(normalize_playlist_url("not a url"), "not a url");
    }

    #[test]
    fn test_build_video_url() {
        assert_eq!(
            build_video_url("dQw4w9WgXcQ"),
            "https://www.youtube.com/watch?v=dQw4w9WgXcQ"
        );
        assert_eq!(
            build_video_url("https://youtu.be/dQw4w9WgXcQ"),
            "https://youtu.be/dQw4w9WgXcQ"
        );
    }

    #[test]
    fn test_line_tag_is_zero_padded() {
        assert_eq!(FormatTool::line_tag(3), "[03]");
        assert_eq!(FormatTool::line_tag(120), "[120]");
    }
}
