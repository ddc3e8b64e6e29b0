//! Gateway tests: retry ceiling, diagnostics, and attempt records.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{Value, json};

use snaptask::gateway::{MISSING_RELAY_MESSAGE, MISSING_TOKEN_MESSAGE};
use snaptask::{
    AttemptResult, Diagnostics, ExecutionContext, InferenceGateway, InferenceMode,
    InferenceTransport, Result, RetryConfig, Route, SuggestError,
};

/// Transport that replays a fixed script of results.
struct ScriptedTransport {
    route: Route,
    ready: fn() -> Result<()>,
    script: Mutex<VecDeque<Result<Value>>>,
    calls: AtomicU32,
}

impl ScriptedTransport {
    fn new(route: Route, script: Vec<Result<Value>>) -> Self {
        Self {
            route,
            ready: || Ok(()),
            script: Mutex::new(script.into()),
            calls: AtomicU32::new(0),
        }
    }

    fn not_ready(route: Route, ready: fn() -> Result<()>) -> Self {
        Self {
            ready,
            ..Self::new(route, Vec::new())
        }
    }

    fn call_count(&self) -> u32 {
        self.calls.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl InferenceTransport for ScriptedTransport {
    fn name(&self) -> &str {
        "scripted"
    }

    fn route(&self) -> Route {
        self.route
    }

    fn model_for(&self, _mode: InferenceMode) -> &str {
        "test/model"
    }

    fn check_ready(&self) -> Result<()> {
        (self.ready)()
    }

    async fn send(&self, _mode: InferenceMode, _image_base64: &str) -> Result<Value> {
        self.calls.fetch_add(1, Ordering::Relaxed);
        self.script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(SuggestError::Http("script exhausted".into())))
    }
}

fn loading(body: &str) -> Result<Value> {
    Err(SuggestError::ModelLoading {
        estimated_time: None,
        body: body.to_string(),
    })
}

fn fast_retry() -> RetryConfig {
    RetryConfig::new()
        .min_delay(Duration::from_millis(1))
        .max_delay(Duration::from_millis(5))
        .default_estimate(Duration::from_millis(1))
}

fn gateway(transport: Arc<ScriptedTransport>, context: ExecutionContext) -> InferenceGateway {
    InferenceGateway::new(transport, fast_retry(), context)
}

#[tokio::test]
async fn four_503s_make_exactly_three_attempts() {
    let transport = Arc::new(ScriptedTransport::new(
        Route::Direct,
        vec![
            loading("first"),
            loading("second"),
            loading("third"),
            loading("fourth"),
        ],
    ));
    let gw = gateway(transport.clone(), ExecutionContext::Native);
    let mut diag = Diagnostics::new();

    let result = gw.call_ocr("QUJD", &mut diag).await.unwrap();

    assert!(result.is_none());
    assert_eq!(transport.call_count(), 3, "the fourth attempt must never be issued");
    assert_eq!(diag.read(), Some("OCR (vision chat) HTTP 503: third"));

    let attempts = diag.attempts();
    assert_eq!(attempts.len(), 3);
    assert_eq!(
        attempts.iter().map(|a| a.attempt).collect::<Vec<_>>(),
        [1, 2, 3]
    );
    assert!(matches!(
        &attempts[2].result,
        AttemptResult::Failure { status: 503, body } if body == "third"
    ));
    assert_eq!(attempts[0].model, "test/model");
    assert_eq!(attempts[0].route, Route::Direct);
}

#[tokio::test]
async fn success_after_loading_returns_body() {
    let transport = Arc::new(ScriptedTransport::new(
        Route::Direct,
        vec![loading("warming up"), Ok(json!({"generated_text": "hi"}))],
    ));
    let gw = gateway(transport.clone(), ExecutionContext::Native);
    let mut diag = Diagnostics::new();

    let body = gw.call_caption("QUJD", &mut diag).await.unwrap();

    assert_eq!(body, Some(json!({"generated_text": "hi"})));
    assert_eq!(transport.call_count(), 2);
    let message = diag.read().unwrap();
    assert!(
        message.starts_with("Caption (vision chat) is loading (503). Retrying in"),
        "unexpected diagnostic: {message}"
    );
    assert!(diag.attempts()[1].result.is_success());
}

#[tokio::test]
async fn other_statuses_are_terminal() {
    let transport = Arc::new(ScriptedTransport::new(
        Route::Relay,
        vec![
            Err(SuggestError::Api {
                status: 500,
                body: "  boom  ".into(),
            }),
            Ok(json!({})),
        ],
    ));
    let gw = gateway(transport.clone(), ExecutionContext::Browser);
    let mut diag = Diagnostics::new();

    let result = gw.call_ocr("QUJD", &mut diag).await.unwrap();

    assert!(result.is_none());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(diag.read(), Some("OCR proxy HTTP 500: boom"));
}

#[tokio::test]
async fn long_bodies_are_truncated() {
    let body = "x".repeat(1000);
    let transport = Arc::new(ScriptedTransport::new(
        Route::Direct,
        vec![Err(SuggestError::Api {
            status: 400,
            body: body.clone(),
        })],
    ));
    let gw = gateway(transport, ExecutionContext::Native);
    let mut diag = Diagnostics::new();

    gw.call_ocr("QUJD", &mut diag).await.unwrap();

    let message = diag.read().unwrap();
    let prefix = "OCR (vision chat) HTTP 400: ";
    assert!(message.starts_with(prefix));
    assert_eq!(message[prefix.len()..].chars().count(), 701);
    assert!(message.ends_with('…'));
}

#[tokio::test]
async fn network_errors_propagate_with_diagnostic() {
    let transport = Arc::new(ScriptedTransport::new(
        Route::Direct,
        vec![Err(SuggestError::Http("connection refused".into()))],
    ));
    let gw = gateway(transport, ExecutionContext::Native);
    let mut diag = Diagnostics::new();

    let err = gw.call_ocr("QUJD", &mut diag).await.unwrap_err();

    assert!(matches!(err, SuggestError::Http(_)));
    assert_eq!(
        diag.read(),
        Some("OCR (vision chat) network error: connection refused")
    );
}

#[tokio::test]
async fn browser_network_errors_mention_cors() {
    let transport = Arc::new(ScriptedTransport::new(
        Route::Relay,
        vec![Err(SuggestError::Http("failed to fetch".into()))],
    ));
    let gw = gateway(transport, ExecutionContext::Browser);
    let mut diag = Diagnostics::new();

    let _ = gw.call_caption("QUJD", &mut diag).await;

    let message = diag.read().unwrap();
    assert!(message.starts_with("Caption proxy network error: failed to fetch"));
    assert!(message.contains("CORS"));
}

#[test]
fn preflight_reports_missing_credential() {
    let transport = Arc::new(ScriptedTransport::not_ready(Route::Direct, || {
        Err(SuggestError::MissingCredential)
    }));
    let gw = gateway(transport, ExecutionContext::Native);
    let mut diag = Diagnostics::new();

    assert!(!gw.preflight(&mut diag));
    assert_eq!(diag.read(), Some(MISSING_TOKEN_MESSAGE));
}

#[test]
fn preflight_reports_missing_relay() {
    let transport = Arc::new(ScriptedTransport::not_ready(Route::Relay, || {
        Err(SuggestError::MissingRelayUrl)
    }));
    let gw = gateway(transport, ExecutionContext::Browser);
    let mut diag = Diagnostics::new();

    assert!(!gw.preflight(&mut diag));
    assert_eq!(diag.read(), Some(MISSING_RELAY_MESSAGE));
}

#[tokio::test]
async fn non_json_success_is_reported_as_malformed() {
    let transport = Arc::new(ScriptedTransport::new(
        Route::Relay,
        vec![Err(SuggestError::MalformedResponse {
            status: 200,
            body: "<html>".into(),
        })],
    ));
    let gw = gateway(transport.clone(), ExecutionContext::Browser);
    let mut diag = Diagnostics::new();

    let result = gw.call_caption("QUJD", &mut diag).await.unwrap();

    assert!(result.is_none());
    assert_eq!(transport.call_count(), 1);
    assert_eq!(
        diag.read(),
        Some("Caption proxy returned a malformed response (HTTP 200): <html>")
    );
}
