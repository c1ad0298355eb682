use std::time::Duration;

use cookie::Cookie;
use reqwest::header::{ACCEPT, COOKIE, HeaderMap, HeaderValue, USER_AGENT};
use reqwest::{Client, ClientBuilder, Response};
use tracing::{debug, error};

use super::error::ApiError;
use super::models::likes::{LikesPage, LikesResponse};

pub const COUB_API_BASE: &str = "https://coub.com/api/v2";
const LIKES_PER_PAGE: u32 = 50;
const SESSION_COOKIE: &str = "_coub_session";
const SESSION_PREFIX: &str = "_coub_session=";
const REMEMBER_COOKIE: &str = "remember_token";

// 携带登录 cookie 的 Coub 客户端
#[derive(Debug, Clone)]
pub struct CoubClient {
    pub inner: Client,
    base_url: String,
}

impl CoubClient {
    pub fn new(session: &str, token: &str) -> Result<Self, ApiError> {
        Self::with_base_url(session, token, COUB_API_BASE)
    }

    pub fn with_base_url(session: &str, token: &str, base_url: &str) -> Result<Self, ApiError> {
        let headers = Self::get_default_headers(session, token)?;
        // 只限制建连时间，整体请求不设超时
        let inner = ClientBuilder::new()
            .connect_timeout(Duration::from_secs(30))
            .default_headers(headers)
            .build()?;

        Ok(Self {
            inner,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Cookie: `<session>; remember_token=<token>`
    pub fn cookie_header(session: &str, token: &str) -> String {
        let session = session.trim();
        // 允许直接传 "_coub_session=xxx"，也允许只传值 (值本身可能含 '=')
        let session_part = if session.starts_with(SESSION_PREFIX) {
            session.to_string()
        } else {
            Cookie::new(SESSION_COOKIE, session).to_string()
        };
        let token_part = Cookie::new(REMEMBER_COOKIE, token.trim()).to_string();
        format!("{}; {}", session_part, token_part)
    }

    pub fn get_default_headers(session: &str, token: &str) -> Result<HeaderMap, ApiError> {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_static("Mozilla/5.0"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(
            COOKIE,
            HeaderValue::from_str(&Self::cookie_header(session, token))?,
        );
        Ok(headers)
    }

    pub fn likes_url(&self, page: u32) -> String {
        format!(
            "{}/timeline/likes?per_page={}&page={}",
            self.base_url, LIKES_PER_PAGE, page
        )
    }

    /// 拉取第 page 页点赞
    pub async fn fetch_likes_page(&self, page: u32) -> LikesPage {
        let url = self.likes_url(page);
        debug!("请求点赞列表: {}", url);

        let resp = match self.inner.get(&url).send().await {
            Ok(resp) => resp,
            Err(e) => {
                error!("请求失败: {}", e);
                return LikesPage::TransportError(e.into());
            }
        };

        match Self::handle_response(resp).await {
            Ok(body) => {
                debug!(
                    "第 {:?}/{:?} 页, {} 条",
                    body.page,
                    body.total_pages,
                    body.coubs.len()
                );
                LikesPage::from_response(body)
            }
            Err(e) => LikesPage::TransportError(e),
        }
    }

    async fn handle_response(resp: Response) -> Result<LikesResponse, ApiError> {
        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            let body: String = body.chars().take(200).collect();
            return Err(ApiError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let text = resp.text().await?;
        serde_json::from_str::<LikesResponse>(&text).map_err(|e| {
            let preview: String = text.chars().take(200).collect();
            ApiError::InvalidResponse(format!("解析响应失败: {}. 原始响应: {}", e, preview))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cookie_header_with_bare_session() {
        assert_eq!(
            CoubClient::cookie_header("abc", "tok"),
            "_coub_session=abc; remember_token=tok"
        );
    }

    #[test]
    fn test_cookie_header_keeps_named_session() {
        assert_eq!(
            CoubClient::cookie_header("_coub_session=abc", "tok"),
            "_coub_session=abc; remember_token=tok"
        );
    }

    #[test]
    fn test_cookie_header_with_padded_session_value() {
        assert_eq!(
            CoubClient::cookie_header("YWJj==", "tok"),
            "_coub_session=YWJj==; remember_token=tok"
        );
    }

    #[test]
    fn test_likes_url() {
        let client = CoubClient::with_base_url("s", "t", "http://localhost:9/api/v2/").unwrap();
        assert_eq!(
            client.likes_url(3),
            "http://localhost:9/api/v2/timeline/likes?per_page=50&page=3"
        );
    }

    #[test]
    fn test_invalid_cookie_is_rejected() {
        let result = CoubClient::new("bad\nvalue", "t");
        assert!(matches!(result, Err(ApiError::InvalidHeader(_))));
    }
}
