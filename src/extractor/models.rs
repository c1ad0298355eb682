use serde::Deserialize;
use serde_json::Value;

use crate::common::models::MediaKind;

/// `--dump-single-json` 的输出里用得到的字段
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProbeInfo {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub webpage_url: Option<String>,
    #[serde(default)]
    pub original_url: Option<String>,
    #[serde(default)]
    pub is_video: Option<bool>,
    #[serde(default)]
    pub formats: Option<Vec<Value>>,
    // 条目可能是 null 或者不是对象，先原样保留
    #[serde(default)]
    pub entries: Option<Vec<Value>>,
}

impl ProbeInfo {
    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// 有子条目就是轮播 (或播放列表)
    pub fn is_carousel(&self) -> bool {
        self.entries.as_ref().is_some_and(|entries| !entries.is_empty())
    }

    /// 子条目，无法解析的条目为 None
    pub fn entries(&self) -> Vec<Option<ProbeInfo>> {
        self.entries
            .as_deref()
            .unwrap_or_default()
            .iter()
            .map(|entry| match entry {
                Value::Object(_) => serde_json::from_value(entry.clone()).ok(),
                _ => None,
            })
            .collect()
    }

    /// 显式标记为视频，或者有可选的流格式
    pub fn kind(&self) -> MediaKind {
        let has_formats = self.formats.as_ref().is_some_and(|f| !f.is_empty());
        if self.is_video == Some(true) || has_formats {
            MediaKind::Video
        } else {
            MediaKind::Photo
        }
    }

    /// 用于下载的链接
    pub fn download_url(&self) -> Option<&str> {
        [&self.webpage_url, &self.original_url, &self.url]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|url| !url.is_empty())
    }

    /// 扁平解析时条目只有 id 或 url
    pub fn flat_id(&self) -> Option<&str> {
        [&self.id, &self.url]
            .into_iter()
            .flatten()
            .map(String::as_str)
            .find(|id| !id.is_empty())
    }
}
