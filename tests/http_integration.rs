use std::net::SocketAddr;
use std::sync::{Arc, Mutex};

use media_downloader::common::api::client::CoubClient;
use media_downloader::common::api::models::likes::LikesPage;
use media_downloader::common::error_log::ErrorLog;
use media_downloader::downloader::error::DownloadError;
use media_downloader::downloader::http::{HttpFetcher, MediaFetcher};
use media_downloader::downloader::{LikesDownloader, StopReason};
use tempfile::tempdir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// 收到的请求: 请求路径 + Cookie 头
#[derive(Debug, Clone)]
struct SeenRequest {
    path: String,
    cookie: Option<String>,
}

struct Reply {
    status: u16,
    body: Vec<u8>,
}

impl Reply {
    fn json(status: u16, body: &str) -> Self {
        Self {
            status,
            body: body.as_bytes().to_vec(),
        }
    }
}

fn reason(status: u16) -> &'static str {
    match status {
        200 => "OK",
        401 => "Unauthorized",
        404 => "Not Found",
        _ => "Error",
    }
}

/// 本地 HTTP 桩：每个连接只处理一个请求，回复后关闭
async fn start_stub<F>(route: F) -> (SocketAddr, Arc<Mutex<Vec<SeenRequest>>>)
where
    F: Fn(&str, SocketAddr) -> Reply + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let seen = Arc::new(Mutex::new(Vec::new()));
    let log = seen.clone();

    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else {
                break;
            };

            let mut head = Vec::new();
            let mut buf = [0u8; 1024];
            while !head.windows(4).any(|w| w == b"\r\n\r\n") {
                match socket.read(&mut buf).await {
                    Ok(0) | Err(_) => break,
                    Ok(n) => head.extend_from_slice(&buf[..n]),
                }
            }
            let head = String::from_utf8_lossy(&head).into_owned();
            let mut lines = head.lines();
            let path = lines
                .next()
                .and_then(|line| line.split_whitespace().nth(1))
                .unwrap_or("/")
                .to_string();
            let cookie = lines
                .find(|line| line.to_ascii_lowercase().starts_with("cookie:"))
                .map(|line| line["cookie:".len()..].trim().to_string());
            log.lock().unwrap().push(SeenRequest {
                path: path.clone(),
                cookie,
            });

            let reply = route(&path, addr);
            let header = format!(
                "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
                reply.status,
                reason(reply.status),
                reply.body.len()
            );
            let _ = socket.write_all(header.as_bytes()).await;
            let _ = socket.write_all(&reply.body).await;
            let _ = socket.shutdown().await;
        }
    });

    (addr, seen)
}

fn likes_page_json(addr: SocketAddr, ids: &[u64]) -> String {
    let coubs: Vec<String> = ids
        .iter()
        .map(|id| {
            format!(
                r#"{{"id": {id}, "title": "clip {id}", "file_versions": {{"share": {{"default": "http://{addr}/media/{id}.mp4"}}}}}}"#
            )
        })
        .collect();
    format!(r#"{{"page": 1, "total_pages": 2, "coubs": [{}]}}"#, coubs.join(","))
}

#[tokio::test]
async fn test_likes_walk_pages_until_empty_with_cookie() {
    let (addr, seen) = start_stub(|path, addr| {
        if path.starts_with("/api/v2/timeline/likes") {
            if path.ends_with("&page=1") {
                Reply::json(200, &likes_page_json(addr, &[1, 2]))
            } else if path.ends_with("&page=2") {
                Reply::json(200, &likes_page_json(addr, &[3]))
            } else {
                Reply::json(200, r#"{"page": 3, "coubs": []}"#)
            }
        } else if let Some(name) = path.strip_prefix("/media/") {
            Reply::json(200, &format!("bytes of {}", name))
        } else {
            Reply::json(404, "")
        }
    })
    .await;

    let dir = tempdir().unwrap();
    let client = CoubClient::with_base_url("abc", "tok", &format!("http://{}/api/v2", addr)).unwrap();
    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let mut error_log = ErrorLog::in_dir(dir.path()).unwrap();

    let summary = LikesDownloader::new(&client, &fetcher, dir.path())
        .run(&mut error_log)
        .await;

    assert!(summary.is_complete());
    assert_eq!(summary.pages_requested, 3);
    assert_eq!(summary.downloaded, 3);

    let requests = seen.lock().unwrap().clone();
    let page_requests: Vec<&SeenRequest> = requests
        .iter()
        .filter(|r| r.path.starts_with("/api/v2/timeline/likes"))
        .collect();
    assert_eq!(page_requests.len(), 3);
    for request in &page_requests {
        assert_eq!(
            request.cookie.as_deref(),
            Some("_coub_session=abc; remember_token=tok")
        );
    }

    for id in 1..=3 {
        let saved = std::fs::read_to_string(dir.path().join(format!("clip {}.mp4", id))).unwrap();
        assert_eq!(saved, format!("bytes of {}.mp4", id));
    }
}

#[tokio::test]
async fn test_unauthorized_page_is_transport_error() {
    let (addr, _) = start_stub(|_, _| Reply::json(401, r#"{"error": "unauthorized"}"#)).await;
    let client = CoubClient::with_base_url("expired", "tok", &format!("http://{}/api/v2", addr)).unwrap();

    match client.fetch_likes_page(1).await {
        LikesPage::TransportError(error) => assert!(error.is_auth_failure()),
        other => panic!("期望 TransportError, 实际 {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_body_is_transport_error_not_empty() {
    let (addr, _) = start_stub(|_, _| Reply::json(200, "<html>login</html>")).await;
    let client = CoubClient::with_base_url("abc", "tok", &format!("http://{}/api/v2", addr)).unwrap();

    match client.fetch_likes_page(1).await {
        LikesPage::TransportError(error) => assert!(!error.is_auth_failure()),
        other => panic!("期望 TransportError, 实际 {:?}", other),
    }
}

#[tokio::test]
async fn test_unauthorized_stops_likes_run() {
    let (addr, seen) = start_stub(|_, _| Reply::json(403, "")).await;
    let dir = tempdir().unwrap();
    let client = CoubClient::with_base_url("abc", "tok", &format!("http://{}/api/v2", addr)).unwrap();
    let fetcher = HttpFetcher::new(reqwest::Client::new());
    let mut error_log = ErrorLog::in_dir(dir.path()).unwrap();

    let summary = LikesDownloader::new(&client, &fetcher, dir.path())
        .run(&mut error_log)
        .await;

    assert!(matches!(
        summary.stop_reason,
        StopReason::TransportError { page: 1, .. }
    ));
    assert_eq!(seen.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn test_http_fetcher_streams_body_to_disk() {
    let (addr, _) = start_stub(|path, _| match path {
        "/file.mp4" => Reply {
            status: 200,
            body: vec![7u8; 200_000],
        },
        _ => Reply::json(404, "missing"),
    })
    .await;
    let dir = tempdir().unwrap();
    let fetcher = HttpFetcher::new(reqwest::Client::new());

    let output = dir.path().join("file.mp4");
    let written = fetcher
        .fetch_to_file(&format!("http://{}/file.mp4", addr), &output)
        .await
        .unwrap();
    assert_eq!(written, 200_000);
    assert_eq!(std::fs::read(&output).unwrap(), vec![7u8; 200_000]);

    let missing = dir.path().join("missing.mp4");
    let result = fetcher
        .fetch_to_file(&format!("http://{}/missing.mp4", addr), &missing)
        .await;
    assert!(matches!(result, Err(DownloadError::BadStatus { status: 404, .. })));
    assert!(!missing.exists());
}
