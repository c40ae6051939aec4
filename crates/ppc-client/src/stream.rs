use crate::auth::{AuthMode, AuthProfile};
use futures_util::StreamExt;
use ppc_core::model::LogLevel;
use ppc_core::sse::SseFrameDecoder;
use reqwest::header::ACCEPT;
use reqwest::Url;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::warn;

pub const LOGS_PATH: &str = "/api/events/logs";
pub const LOG_EVENT_NAME: &str = "log";

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(10);

/// What the subscription task reports back to its owner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    Opened,
    /// Raw payload of one named `log` event; parsing and pause handling
    /// belong to the feed, not the transport.
    Record(String),
    Disconnected { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StreamError {
    #[error("live logs require token mode with a non-empty token")]
    TokenRequired,
    #[error("invalid base url: {0}")]
    InvalidBaseUrl(String),
}

/// Owns the single live log subscription. The subscription runs as a spawned
/// task that reconnects on its own with capped exponential backoff; `stop`
/// aborts it immediately with no drain of in-flight records.
#[derive(Debug)]
pub struct LogStreamController {
    base_url: String,
    http: reqwest::Client,
    task: Option<JoinHandle<()>>,
}

impl LogStreamController {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: reqwest::Client::new(),
            task: None,
        }
    }

    pub fn is_streaming(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Open the subscription. The transport cannot carry an Authorization
    /// header, so only a token-mode profile with a non-empty token can
    /// stream; the token rides in the request target instead.
    ///
    /// `cursor` is read on every (re)connect to resume after the highest
    /// record id the owner has processed.
    pub fn start(
        &mut self,
        profile: &AuthProfile,
        cursor: Arc<AtomicU64>,
        level: LogLevel,
        tx: mpsc::Sender<StreamEvent>,
    ) -> Result<(), StreamError> {
        self.stop();
        if profile.mode != AuthMode::Token || profile.token.is_empty() {
            return Err(StreamError::TokenRequired);
        }
        let endpoint = Url::parse(&format!("{}{}", self.base_url, LOGS_PATH))
            .map_err(|err| StreamError::InvalidBaseUrl(err.to_string()))?;
        let http = self.http.clone();
        let token = profile.token.clone();
        self.task = Some(tokio::spawn(async move {
            subscription_loop(http, endpoint, token, cursor, level, tx).await;
        }));
        Ok(())
    }

    /// Idempotent; aborting cancels the subscription without draining.
    pub fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }

    pub fn restart(
        &mut self,
        profile: &AuthProfile,
        cursor: Arc<AtomicU64>,
        level: LogLevel,
        tx: mpsc::Sender<StreamEvent>,
    ) -> Result<(), StreamError> {
        self.start(profile, cursor, level, tx)
    }
}

impl Drop for LogStreamController {
    fn drop(&mut self) {
        self.stop();
    }
}

fn subscribe_url(endpoint: &Url, token: &str, since: u64, level: LogLevel) -> Url {
    let mut url = endpoint.clone();
    url.query_pairs_mut()
        .clear()
        .append_pair("token", token)
        .append_pair("since", &since.to_string())
        .append_pair("level", level.as_str());
    url
}

async fn subscription_loop(
    http: reqwest::Client,
    endpoint: Url,
    token: String,
    cursor: Arc<AtomicU64>,
    level: LogLevel,
    tx: mpsc::Sender<StreamEvent>,
) {
    let mut backoff = INITIAL_BACKOFF;
    let jitter = Duration::from_millis(u64::from(std::process::id() % 5) * 120);

    loop {
        let since = cursor.load(Ordering::Relaxed);
        let url = subscribe_url(&endpoint, &token, since, level);
        let response = http
            .get(url)
            .header(ACCEPT, "text/event-stream")
            .send()
            .await;

        let response = match response {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                let reason = format!("http_{}", response.status().as_u16());
                warn!("log_stream_rejected: {reason}");
                if tx
                    .send(StreamEvent::Disconnected { reason })
                    .await
                    .is_err()
                {
                    return;
                }
                tokio::time::sleep(backoff + jitter).await;
                backoff = next_backoff(backoff);
                continue;
            }
            Err(err) => {
                warn!("log_stream_connect_error: {err}");
                if tx
                    .send(StreamEvent::Disconnected {
                        reason: "connect failed".to_string(),
                    })
                    .await
                    .is_err()
                {
                    return;
                }
                tokio::time::sleep(backoff + jitter).await;
                backoff = next_backoff(backoff);
                continue;
            }
        };

        if tx.send(StreamEvent::Opened).await.is_err() {
            return;
        }
        backoff = INITIAL_BACKOFF;

        let mut decoder = SseFrameDecoder::default();
        let mut body = response.bytes_stream();
        let mut reason = "stream closed".to_string();
        while let Some(chunk) = body.next().await {
            let chunk = match chunk {
                Ok(chunk) => chunk,
                Err(err) => {
                    reason = "read failed".to_string();
                    warn!("log_stream_read_error: {err}");
                    break;
                }
            };
            let report = decoder.push_chunk(&chunk);
            for err in report.errors {
                warn!("log_stream_decode_error: {err}");
            }
            for event in report.events {
                if event.event != LOG_EVENT_NAME {
                    continue;
                }
                if tx.send(StreamEvent::Record(event.data)).await.is_err() {
                    return;
                }
            }
        }

        if tx
            .send(StreamEvent::Disconnected { reason })
            .await
            .is_err()
        {
            return;
        }
        tokio::time::sleep(backoff + jitter).await;
        backoff = next_backoff(backoff);
    }
}

fn next_backoff(current: Duration) -> Duration {
    let next = current + current;
    if next > MAX_BACKOFF {
        MAX_BACKOFF
    } else {
        next
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;
    use tokio::net::TcpListener;

    fn token_profile(token: &str) -> AuthProfile {
        AuthProfile {
            token: token.to_string(),
            ..AuthProfile::default()
        }
    }

    #[test]
    fn subscribe_url_carries_encoded_query() {
        let endpoint = Url::parse("http://127.0.0.1:17287/api/events/logs").expect("url");
        let url = subscribe_url(&endpoint, "a&b c", 42, LogLevel::Warn);
        let query = url.query().expect("query");
        assert!(query.contains("token=a%26b+c"));
        assert!(query.contains("since=42"));
        assert!(query.contains("level=warn"));
    }

    #[test]
    fn backoff_doubles_and_caps() {
        let mut backoff = INITIAL_BACKOFF;
        backoff = next_backoff(backoff);
        assert_eq!(backoff, Duration::from_secs(2));
        for _ in 0..6 {
            backoff = next_backoff(backoff);
        }
        assert_eq!(backoff, MAX_BACKOFF);
    }

    #[test]
    fn start_refuses_basic_mode() {
        let mut controller = LogStreamController::new("http://127.0.0.1:17287");
        let (tx, _rx) = mpsc::channel(4);
        let profile = AuthProfile {
            mode: AuthMode::Basic,
            user: "admin".to_string(),
            ..AuthProfile::default()
        };
        let err = controller
            .start(&profile, Arc::new(AtomicU64::new(0)), LogLevel::Info, tx)
            .expect_err("basic mode must not stream");
        assert_eq!(err, StreamError::TokenRequired);
        assert!(!controller.is_streaming());
    }

    #[test]
    fn start_refuses_empty_token() {
        let mut controller = LogStreamController::new("http://127.0.0.1:17287");
        let (tx, _rx) = mpsc::channel(4);
        let err = controller
            .start(
                &token_profile(""),
                Arc::new(AtomicU64::new(0)),
                LogLevel::Info,
                tx,
            )
            .expect_err("empty token must not stream");
        assert_eq!(err, StreamError::TokenRequired);
    }

    #[tokio::test]
    async fn stop_is_idempotent() {
        let mut controller = LogStreamController::new("http://127.0.0.1:1");
        let (tx, _rx) = mpsc::channel(4);
        controller
            .start(
                &token_profile("abc"),
                Arc::new(AtomicU64::new(0)),
                LogLevel::Info,
                tx,
            )
            .expect("start");
        assert!(controller.is_streaming());
        controller.stop();
        assert!(!controller.is_streaming());
        controller.stop();
    }

    #[tokio::test]
    async fn delivers_log_events_then_reports_disconnect() {
        let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
        let addr = listener.local_addr().expect("addr");
        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.expect("accept");
            let body = concat!(
                "HTTP/1.1 200 OK\r\n",
                "Content-Type: text/event-stream\r\n",
                "Connection: close\r\n",
                "\r\n",
                "id: 1\nevent: log\ndata: {\"id\":1,\"time_utc\":\"t\",\"level\":\"info\",\"msg\":\"a\"}\n\n",
                ": keep-alive\n\n",
                "event: log\ndata: not json\n\n",
            );
            socket.write_all(body.as_bytes()).await.expect("write");
            socket.shutdown().await.ok();
        });

        let mut controller = LogStreamController::new(format!("http://{addr}"));
        let (tx, mut rx) = mpsc::channel(32);
        controller
            .start(
                &token_profile("abc"),
                Arc::new(AtomicU64::new(0)),
                LogLevel::Info,
                tx,
            )
            .expect("start");

        assert_eq!(rx.recv().await, Some(StreamEvent::Opened));
        assert_eq!(
            rx.recv().await,
            Some(StreamEvent::Record(
                "{\"id\":1,\"time_utc\":\"t\",\"level\":\"info\",\"msg\":\"a\"}".to_string()
            ))
        );
        assert_eq!(
            rx.recv().await,
            Some(StreamEvent::Record("not json".to_string()))
        );
        match rx.recv().await {
            Some(StreamEvent::Disconnected { .. }) => {}
            other => panic!("expected disconnect, got {other:?}"),
        }
        controller.stop();
    }
}
