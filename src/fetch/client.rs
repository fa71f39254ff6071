//! Shared HTTP plumbing: desktop UA/Referer hygiene, GBK decoding, and the
//! per-source retry-with-linear-backoff loop.

use std::time::Duration;

use encoding_rs::GBK;

use super::error::FetchError;

const USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) \
     Chrome/124.0.0.0 Safari/537.36";

const MAX_RETRIES: u32 = 2;
const BACKOFF_UNIT: Duration = Duration::from_millis(500);

/// Thin wrapper over `reqwest::Client` fixing the per-request timeout band
/// (8-10s) and the desktop UA/Referer pair every source needs. Cloning is
/// cheap: `reqwest::Client` is internally `Arc`-backed.
#[derive(Clone)]
pub struct HttpClient {
    inner: reqwest::Client,
}

impl HttpClient {
    /// # Panics
    /// Panics if the underlying `reqwest::Client` cannot be built, which
    /// only happens on a broken TLS backend — a process-fatal condition.
    #[must_use]
    pub fn new() -> Self {
        let inner = reqwest::Client::builder()
            .timeout(Duration::from_secs(9))
            .build()
            .expect("failed to build HTTP client");
        Self { inner }
    }

    /// Fetches `url` as UTF-8 text, decoding the response as GBK when
    /// `gbk` is set (Chinese sources commonly serve GBK-encoded bodies).
    pub async fn get_text(
        &self,
        source: &'static str,
        url: &str,
        referer: &str,
        gbk: bool,
    ) -> Result<String, FetchError> {
        let response = self
            .inner
            .get(url)
            .header(reqwest::header::USER_AGENT, USER_AGENT)
            .header(reqwest::header::REFERER, referer)
            .send()
            .await
            .map_err(|err| FetchError::Transport {
                source,
                detail: err.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Upstream {
                source,
                code: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(|err| FetchError::Transport {
            source,
            detail: err.to_string(),
        })?;

        if gbk {
            let (text, _encoding, had_errors) = GBK.decode(&bytes);
            if had_errors {
                return Err(FetchError::Decode {
                    source,
                    detail: "invalid GBK byte sequence".to_string(),
                });
            }
            Ok(text.into_owned())
        } else {
            String::from_utf8(bytes.to_vec()).map_err(|err| FetchError::Decode {
                source,
                detail: err.to_string(),
            })
        }
    }
}

impl Default for HttpClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Runs `attempt` up to `1 + MAX_RETRIES` times with linear backoff
/// `(i+1)*500ms` between tries, returning the first success or the last
/// error.
pub async fn with_retry<T, F, Fut>(mut attempt: F) -> Result<T, FetchError>
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = Result<T, FetchError>>,
{
    let mut last_error = None;
    for i in 0..=MAX_RETRIES {
        match attempt().await {
            Ok(value) => return Ok(value),
            Err(err) => {
                last_error = Some(err);
                if i < MAX_RETRIES {
                    tokio::time::sleep(BACKOFF_UNIT * (i + 1)).await;
                }
            }
        }
    }
    Err(last_error.expect("loop runs at least once"))
}

#[cfg(test)]
mod tests {
    use super::{with_retry, HttpClient};
    use crate::fetch::error::FetchError;
    use std::sync::atomic::{AtomicU32, Ordering};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    #[tokio::test]
    async fn get_text_returns_utf8_body_on_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/ok"))
            .respond_with(ResponseTemplate::new(200).set_body_string("hello"))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/ok", server.uri());
        let body = client
            .get_text("test", &url, "http://example.com/", false)
            .await
            .unwrap();

        assert_eq!(body, "hello");
    }

    #[tokio::test]
    async fn get_text_decodes_gbk_body() {
        let server = MockServer::start().await;
        let (encoded, _, _) = encoding_rs::GBK.encode("你好");
        Mock::given(method("GET"))
            .and(path("/gbk"))
            .respond_with(ResponseTemplate::new(200).set_body_bytes(encoded.into_owned()))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/gbk", server.uri());
        let body = client
            .get_text("test", &url, "http://example.com/", true)
            .await
            .unwrap();

        assert_eq!(body, "你好");
    }

    #[tokio::test]
    async fn get_text_maps_non_success_status_to_upstream_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/missing"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let client = HttpClient::new();
        let url = format!("{}/missing", server.uri());
        let err = client
            .get_text("test", &url, "http://example.com/", false)
            .await
            .unwrap_err();

        assert!(matches!(err, FetchError::Upstream { code: 404, .. }));
    }

    #[tokio::test]
    async fn retries_until_success() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, FetchError> = with_retry(|| {
            let n = attempts.fetch_add(1, Ordering::SeqCst);
            async move {
                if n < 2 {
                    Err(FetchError::Empty { source: "test" })
                } else {
                    Ok(42)
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn gives_up_after_max_retries() {
        let attempts = AtomicU32::new(0);
        let result: Result<u32, FetchError> = with_retry(|| {
            attempts.fetch_add(1, Ordering::SeqCst);
            async move { Err(FetchError::Empty { source: "test" }) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(attempts.load(Ordering::SeqCst), 3);
    }
}
