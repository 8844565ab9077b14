// GitHub API HTTP client.
// Handles authentication, rate limiting, and request/response processing.

use parking_lot::Mutex;
use reqwest::{
    Client, Response, StatusCode,
    header::{ACCEPT, AUTHORIZATION, HeaderMap, HeaderValue, USER_AGENT},
};
use serde::Serialize;

use crate::error::{Result, SyncError};

use super::types::RateLimit;

const GITHUB_API_VERSION: &str = "2022-11-28";

/// GitHub API client with authentication and rate limit tracking.
pub struct GitHubClient {
    client: Client,
    api_base: String,
    rate_limit: Mutex<RateLimit>,
}

impl GitHubClient {
    /// Create a client against a specific API root (GitHub Enterprise, tests).
    pub fn with_base(token: &str, api_base: &str) -> Result<Self> {
        let mut headers = HeaderMap::new();

        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", token))
                .map_err(|e| SyncError::Other(e.to_string()))?,
        );
        headers.insert(
            ACCEPT,
            HeaderValue::from_static("application/vnd.github+json"),
        );
        headers.insert(
            "X-GitHub-Api-Version",
            HeaderValue::from_static(GITHUB_API_VERSION),
        );
        headers.insert(USER_AGENT, HeaderValue::from_static("neetsync"));

        let client = Client::builder()
            .default_headers(headers)
            .build()
            .map_err(SyncError::Api)?;

        Ok(Self {
            client,
            api_base: api_base.trim_end_matches('/').to_string(),
            rate_limit: Mutex::new(RateLimit::default()),
        })
    }

    /// Get the current rate limit information.
    pub fn rate_limit(&self) -> RateLimit {
        self.rate_limit.lock().clone()
    }

    fn url(&self, endpoint: &str) -> String {
        format!("{}{}", self.api_base, endpoint)
    }

    /// Make a GET request to the GitHub API.
    pub async fn get(&self, endpoint: &str) -> Result<Response> {
        let response = self
            .client
            .get(self.url(endpoint))
            .send()
            .await
            .map_err(SyncError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Make a GET request with query parameters.
    pub async fn get_with_params<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Response> {
        let response = self
            .client
            .get(self.url(endpoint))
            .query(params)
            .send()
            .await
            .map_err(SyncError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// GET where a 404 is an expected answer rather than an error.
    pub async fn get_optional<T: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        params: &T,
    ) -> Result<Option<Response>> {
        match self.get_with_params(endpoint, params).await {
            Ok(response) => Ok(Some(response)),
            Err(SyncError::Http { status: 404, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Make a PUT request with a JSON body.
    pub async fn put_json<B: Serialize + ?Sized>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<Response> {
        let response = self
            .client
            .put(self.url(endpoint))
            .json(body)
            .send()
            .await
            .map_err(SyncError::Api)?;

        self.update_rate_limit(&response);
        self.check_response(response).await
    }

    /// Update rate limit from response headers.
    fn update_rate_limit(&self, response: &Response) {
        let header = |name: &str| {
            response
                .headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
        };

        let mut rate_limit = self.rate_limit.lock();
        if let Some(limit) = header("x-ratelimit-limit") {
            rate_limit.limit = limit;
        }
        if let Some(remaining) = header("x-ratelimit-remaining") {
            rate_limit.remaining = remaining;
        }
        if let Some(reset) = header("x-ratelimit-reset") {
            rate_limit.reset = reset;
        }
    }

    /// Check response status and convert errors.
    async fn check_response(&self, response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let rate_limit = self.rate_limit();
        match status {
            StatusCode::UNAUTHORIZED => Err(SyncError::Unauthorized {
                body: response.text().await.unwrap_or_default(),
            }),
            StatusCode::FORBIDDEN if rate_limit.remaining == 0 => {
                let reset_at = chrono::DateTime::from_timestamp(rate_limit.reset as i64, 0)
                    .map(|dt| dt.format("%H:%M:%S").to_string())
                    .unwrap_or_else(|| "unknown".to_string());
                Err(SyncError::RateLimited { reset_at })
            }
            status => Err(SyncError::Http {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}

/// Percent-encode each segment of a repository path, keeping the separators.
pub fn encode_path(path: &str) -> String {
    path.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::{TcpListener, TcpStream};

    #[test]
    fn test_encode_path() {
        assert_eq!(encode_path("Easy/Two_Sum/Two_Sum.py"), "Easy/Two_Sum/Two_Sum.py");
        assert_eq!(encode_path("Hard/C++ Tricks/notes.md"), "Hard/C%2B%2B%20Tricks/notes.md");
    }

    /// Serve one canned response per connection, in order.
    async fn serve(responses: Vec<(u16, &'static str)>) -> String {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let base = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(async move {
            for (status, body) in responses {
                let (mut socket, _) = listener.accept().await.unwrap();
                read_request(&mut socket).await;
                let reply = format!(
                    "HTTP/1.1 {} Status\r\nContent-Type: application/json\r\n\
                     Content-Length: {}\r\nConnection: close\r\n\r\n{}",
                    status,
                    body.len(),
                    body
                );
                socket.write_all(reply.as_bytes()).await.unwrap();
                socket.shutdown().await.unwrap();
            }
        });
        base
    }

    async fn read_request(socket: &mut TcpStream) {
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                return;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(end) = text.find("\r\n\r\n") {
                let length = text[..end]
                    .lines()
                    .find_map(|line| {
                        let (name, value) = line.split_once(':')?;
                        name.eq_ignore_ascii_case("content-length")
                            .then(|| value.trim().parse::<usize>().ok())?
                    })
                    .unwrap_or(0);
                if buf.len() >= end + 4 + length {
                    return;
                }
            }
        }
    }

    #[tokio::test]
    async fn test_rejected_put_keeps_status_and_body() {
        let base = serve(vec![(
            404,
            r#"{"message":"Branch main not found for this token"}"#,
        )])
        .await;
        let client = GitHubClient::with_base("token", &base).unwrap();

        let err = client
            .put_json("/repos/o/r/contents/a.py", &serde_json::json!({"content": ""}))
            .await
            .unwrap_err();

        match &err {
            SyncError::Http { status, body } => {
                assert_eq!(*status, 404);
                assert!(body.contains("Branch main not found for this token"));
            }
            other => panic!("unexpected error: {other}"),
        }
        assert!(err.to_string().starts_with("HTTP 404:"));
    }

    #[tokio::test]
    async fn test_get_optional_treats_404_as_absent() {
        let base = serve(vec![
            (404, r#"{"message":"Not Found"}"#),
            (401, r#"{"message":"Bad credentials"}"#),
        ])
        .await;
        let client = GitHubClient::with_base("token", &base).unwrap();

        assert!(client.get_optional("/a", &[("ref", "main")]).await.unwrap().is_none());
        let err = client.get_optional("/b", &[("ref", "main")]).await.unwrap_err();
        assert!(matches!(&err, SyncError::Unauthorized { body } if body.contains("Bad credentials")));
        assert!(err.to_string().contains("HTTP 401"));
    }

    #[test]
    fn test_with_base_trims_slash() {
        let client = GitHubClient::with_base("token", "https://ghe.example/api/v3/").unwrap();
        assert_eq!(client.url("/user"), "https://ghe.example/api/v3/user");
        assert_eq!(client.rate_limit().remaining, 0);
    }
}
