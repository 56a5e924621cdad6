// Status client: one health request per mounted page, one state transition.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::error::StatusError;

/// The only failure text an end user ever sees.
pub const CONNECT_FAILURE_MESSAGE: &str =
    "Failed to connect to the API. Please ensure the backend server is running.";

pub const HEALTH_PATH: &str = "/api/health";

const LOADING_MESSAGE: &str = "Checking API status...";

/// Placeholder for a field the payload didn't carry.
const MISSING_FIELD: &str = "undefined";

const URL_NOT_SET: &str = "Not set";

/// Health payload as the client expects it. Parsed leniently: the fields it
/// renders are optional and everything else is kept in `extra` untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ApiStatus {
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub service: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ApiStatus {
    pub fn status_label(&self) -> &str {
        self.status.as_deref().unwrap_or(MISSING_FIELD)
    }

    pub fn service_label(&self) -> &str {
        self.service.as_deref().unwrap_or(MISSING_FIELD)
    }
}

/// What the status widget shows.
#[derive(Debug, Clone, PartialEq)]
pub enum ViewState {
    Loading,
    /// `message` is user-facing and fixed; `cause` is for operators only.
    Error { message: String, cause: String },
    Ready(ApiStatus),
}

impl ViewState {
    pub fn is_loading(&self) -> bool {
        matches!(self, ViewState::Loading)
    }

    /// Apply the outcome of the health request. Only `Loading` transitions;
    /// on a settled state this is a no-op that returns `false`.
    pub fn settle(&mut self, outcome: Result<ApiStatus, StatusError>) -> bool {
        if !self.is_loading() {
            return false;
        }

        *self = match outcome {
            Ok(status) => ViewState::Ready(status),
            Err(err) => {
                tracing::error!("API Error: {err}");
                ViewState::Error {
                    message: CONNECT_FAILURE_MESSAGE.to_string(),
                    cause: err.to_string(),
                }
            }
        };
        true
    }
}

/// Render the widget as text. Two lines for settled states.
pub fn render(state: &ViewState, api_url: Option<&str>) -> String {
    match state {
        ViewState::Loading => LOADING_MESSAGE.to_string(),
        ViewState::Error { message, .. } => format!(
            "⚠️ {message}\nAPI URL: {}",
            api_url.unwrap_or(URL_NOT_SET)
        ),
        ViewState::Ready(status) => format!(
            "✓ {} is {}\nAPI URL: {}",
            status.service_label(),
            status.status_label(),
            api_url.unwrap_or_default()
        ),
    }
}

/// Where the page gets its health payload from.
#[async_trait]
pub trait HealthSource: Send + Sync + 'static {
    async fn fetch(&self) -> Result<ApiStatus, StatusError>;
}

/// Fetches `{base}/api/health` over HTTP. No timeout override, no retry.
#[derive(Debug, Clone)]
pub struct HttpHealthSource {
    client: reqwest::Client,
    base_url: Option<String>,
}

impl HttpHealthSource {
    pub fn new(base_url: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }

    pub fn health_url(&self) -> Option<String> {
        self.base_url
            .as_deref()
            .map(|base| format!("{}{HEALTH_PATH}", base.trim_end_matches('/')))
    }
}

#[async_trait]
impl HealthSource for HttpHealthSource {
    async fn fetch(&self) -> Result<ApiStatus, StatusError> {
        let url = self.health_url().ok_or(StatusError::NotConfigured)?;

        let response = self.client.get(&url).send().await?;
        if !response.status().is_success() {
            return Err(StatusError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        Ok(serde_json::from_slice(&body)?)
    }
}

/// A mounted status widget. Issues its single request on mount.
#[derive(Debug)]
pub struct StatusPage {
    state: watch::Receiver<ViewState>,
    api_url: Option<String>,
    task: JoinHandle<()>,
}

impl StatusPage {
    /// Mount the page and start the health request. Must be called inside a
    /// tokio runtime.
    pub fn mount<S: HealthSource>(source: S, api_url: Option<String>) -> Self {
        let (tx, rx) = watch::channel(ViewState::Loading);

        let task = tokio::spawn(async move {
            let outcome = source.fetch().await;
            if tx.is_closed() {
                tracing::debug!("Status page unmounted before health check settled, discarding");
                return;
            }
            tx.send_if_modified(|state| state.settle(outcome));
        });

        Self {
            state: rx,
            api_url,
            task,
        }
    }

    pub fn state(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Wait for the single transition out of `Loading`. Never returns if the
    /// request never settles.
    pub async fn settled(&mut self) -> ViewState {
        if let Ok(state) = self.state.wait_for(|s| !s.is_loading()).await {
            return state.clone();
        }
        // Request task ended without settling (panicked); show what we have.
        self.state()
    }

    pub fn render(&self) -> String {
        render(&self.state.borrow(), self.api_url.as_deref())
    }

    /// Tear the page down. The request keeps running; its result is dropped.
    /// The returned handle completes once the request does.
    pub fn unmount(self) -> JoinHandle<()> {
        let StatusPage { state, task, .. } = self;
        drop(state);
        task
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    struct CannedSource {
        outcome: fn() -> Result<ApiStatus, StatusError>,
        calls: Arc<AtomicUsize>,
        delay: Duration,
    }

    impl CannedSource {
        fn new(outcome: fn() -> Result<ApiStatus, StatusError>) -> Self {
            Self {
                outcome,
                calls: Arc::new(AtomicUsize::new(0)),
                delay: Duration::ZERO,
            }
        }
    }

    #[async_trait]
    impl HealthSource for CannedSource {
        async fn fetch(&self) -> Result<ApiStatus, StatusError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            (self.outcome)()
        }
    }

    fn running() -> Result<ApiStatus, StatusError> {
        Ok(ApiStatus {
            status: Some("running".into()),
            service: Some("FantasyRA-API".into()),
            extra: Map::new(),
        })
    }

    fn server_error() -> Result<ApiStatus, StatusError> {
        Err(StatusError::Status(500))
    }

    #[test]
    fn test_settle_only_once() {
        let mut state = ViewState::Loading;
        assert!(state.settle(running()));
        assert!(matches!(state, ViewState::Ready(_)));

        assert!(!state.settle(server_error()));
        assert!(matches!(state, ViewState::Ready(_)));
    }

    #[test]
    fn test_settle_error_keeps_cause_out_of_message() {
        let mut state = ViewState::Loading;
        state.settle(server_error());
        match state {
            ViewState::Error { message, cause } => {
                assert_eq!(message, CONNECT_FAILURE_MESSAGE);
                assert!(cause.contains("500"));
            }
            other => panic!("expected error state, got {other:?}"),
        }
    }

    #[test]
    fn test_render_loading() {
        assert_eq!(render(&ViewState::Loading, None), "Checking API status...");
    }

    #[test]
    fn test_render_ready() {
        let mut state = ViewState::Loading;
        state.settle(running());
        assert_eq!(
            render(&state, Some("http://localhost:5000")),
            "✓ FantasyRA-API is running\nAPI URL: http://localhost:5000"
        );
    }

    #[test]
    fn test_render_error_without_url() {
        let mut state = ViewState::Loading;
        state.settle(Err(StatusError::NotConfigured));
        let text = render(&state, None);
        assert!(text.starts_with("⚠️ Failed to connect to the API."));
        assert!(text.ends_with("API URL: Not set"));
    }

    #[test]
    fn test_server_payload_renders_undefined() {
        let status: ApiStatus =
            serde_json::from_str(r#"{"ok":true,"now":1700000000000}"#).unwrap();
        assert_eq!(status.status, None);
        assert_eq!(status.service, None);
        assert_eq!(status.extra.get("ok"), Some(&Value::Bool(true)));

        let state = ViewState::Ready(status);
        assert_eq!(
            render(&state, Some("http://api")),
            "✓ undefined is undefined\nAPI URL: http://api"
        );
    }

    #[test]
    fn test_health_url_joins_base() {
        let source = HttpHealthSource::new(Some("http://localhost:5000/".into()));
        assert_eq!(
            source.health_url().as_deref(),
            Some("http://localhost:5000/api/health")
        );
        assert_eq!(HttpHealthSource::new(None).health_url(), None);
    }

    #[tokio::test]
    async fn test_unconfigured_source_fails_fast() {
        let err = HttpHealthSource::new(None).fetch().await.unwrap_err();
        assert!(matches!(err, StatusError::NotConfigured));
    }

    #[tokio::test]
    async fn test_mount_fetches_exactly_once() {
        let source = CannedSource::new(running);
        let calls = source.calls.clone();
        let mut page = StatusPage::mount(source, Some("http://api".into()));

        let state = page.settled().await;
        assert!(matches!(state, ViewState::Ready(_)));
        // Asking again returns the same terminal state without another fetch
        assert_eq!(page.settled().await, state);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_page_starts_loading() {
        let mut source = CannedSource::new(running);
        source.delay = Duration::from_millis(50);
        let page = StatusPage::mount(source, None);
        assert!(page.state().is_loading());
        assert_eq!(page.render(), "Checking API status...");
        page.unmount().await.unwrap();
    }

    #[tokio::test]
    async fn test_response_after_unmount_is_discarded() {
        let mut source = CannedSource::new(server_error);
        source.delay = Duration::from_millis(20);
        let calls = source.calls.clone();
        let page = StatusPage::mount(source, None);

        let task = page.unmount();
        task.await.expect("late response must not panic");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }
}
