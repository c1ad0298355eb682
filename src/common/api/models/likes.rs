use serde::Deserialize;

use crate::common::api::error::ApiError;

/// timeline/likes 接口的一页
#[derive(Debug, Deserialize)]
pub struct LikesResponse {
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub coubs: Vec<Coub>,
}

#[derive(Debug, Deserialize)]
pub struct Coub {
    pub id: u64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub file_versions: Option<FileVersions>,
}

#[derive(Debug, Deserialize)]
pub struct FileVersions {
    #[serde(default)]
    pub share: Option<ShareVersion>,
}

#[derive(Debug, Deserialize)]
pub struct ShareVersion {
    #[serde(default)]
    pub default: Option<String>,
}

/// 点赞列表中的一项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LikedItem {
    pub id: u64,
    pub title: Option<String>,
    pub media_url: Option<String>,
}

impl LikedItem {
    /// 标题为空时用 coub_<id>
    pub fn display_title(&self) -> String {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title.to_string(),
            _ => format!("coub_{}", self.id),
        }
    }
}

impl From<Coub> for LikedItem {
    fn from(coub: Coub) -> Self {
        let media_url = coub
            .file_versions
            .and_then(|versions| versions.share)
            .and_then(|share| share.default)
            .filter(|url| !url.is_empty());
        Self {
            id: coub.id,
            title: coub.title,
            media_url,
        }
    }
}

/// 拉取一页的结果。空页和请求失败分开表示，由调用方决定是否结束循环
#[derive(Debug)]
pub enum LikesPage {
    Items(Vec<LikedItem>),
    Empty,
    TransportError(ApiError),
}

impl LikesPage {
    pub fn from_response(resp: LikesResponse) -> Self {
        if resp.coubs.is_empty() {
            LikesPage::Empty
        } else {
            LikesPage::Items(resp.coubs.into_iter().map(LikedItem::from).collect())
        }
    }
}
