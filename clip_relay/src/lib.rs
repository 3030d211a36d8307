//! # clip_relay
//!
//! Reads the OS clipboard and relays its text to a local HTTP endpoint as
//! a single fire-and-forget POST — `{"text": <string>}`, short timeout, no
//! retries, success iff the server answers 200.
//!
//! Both sides of the relay sit behind traits ([`Transport`],
//! [`ClipboardSource`]) so the trigger pipeline can be exercised in tests
//! with stub backends and zero network/OS access.

use std::time::Duration;

use serde_json::{json, Value};
use thiserror::Error;

// ════════════════════════════════════════════════════════════════════════════
// RelayConfig
// ════════════════════════════════════════════════════════════════════════════

/// Where and how to deliver the clipboard text.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(default)]
pub struct RelayConfig {
    /// Fixed local endpoint receiving the POST.
    pub endpoint:   String,
    /// Client-side timeout for the whole request.
    pub timeout_ms: u64,
}

impl Default for RelayConfig {
    fn default() -> Self {
        RelayConfig {
            endpoint:   "http://127.0.0.1:5000/save".to_string(),
            timeout_ms: 2000,
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Outcomes
// ════════════════════════════════════════════════════════════════════════════

/// Why a dispatch did not succeed.  Both collapse to "failed" for the
/// trigger gate, but logs and the status line can tell them apart.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum DispatchError {
    #[error("network error: {0}")]
    Network(String),
    #[error("server responded with status {0}")]
    Status(u16),
}

/// Result of one relay attempt.
#[derive(Debug, PartialEq, Eq)]
pub enum RelayOutcome {
    /// Server answered 200; the text is on its way.
    Sent,
    /// Clipboard was empty or whitespace-only; nothing was sent.
    SkippedEmpty,
    /// The POST happened (or was attempted) and did not succeed.
    Failed(DispatchError),
}

impl RelayOutcome {
    pub fn is_sent(&self) -> bool {
        matches!(self, RelayOutcome::Sent)
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Transport — HTTP behind a trait, stub-friendly
// ════════════════════════════════════════════════════════════════════════════

/// Anything that can POST a JSON body and report the response status.
pub trait Transport {
    /// Returns the HTTP status code, or a transport-level error (timeout,
    /// refused connection, DNS).  Non-2xx statuses are NOT errors here —
    /// the relay applies its own success rule.
    fn post_json(&self, url: &str, body: &Value) -> Result<u16, DispatchError>;
}

/// Production transport over a blocking `ureq` agent.
pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Self {
        HttpTransport {
            agent: ureq::AgentBuilder::new().timeout(timeout).build(),
        }
    }
}

impl Transport for HttpTransport {
    fn post_json(&self, url: &str, body: &Value) -> Result<u16, DispatchError> {
        match self.agent.post(url).send_json(body) {
            Ok(resp) => Ok(resp.status()),
            // ureq reports 4xx/5xx as Error::Status; surface the code and
            // let the caller judge it.
            Err(ureq::Error::Status(code, _)) => Ok(code),
            Err(ureq::Error::Transport(t)) => Err(DispatchError::Network(t.to_string())),
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// ClipboardSource — OS clipboard behind a trait
// ════════════════════════════════════════════════════════════════════════════

/// Read-only view of the clipboard's current text.
pub trait ClipboardSource {
    /// `None` when the clipboard is unreadable or holds no text.
    fn text(&mut self) -> Option<String>;
}

/// Cross-platform clipboard via `arboard`.  A fresh handle per read keeps
/// the OS clipboard unlocked between triggers.
pub struct SystemClipboard;

impl ClipboardSource for SystemClipboard {
    fn text(&mut self) -> Option<String> {
        arboard::Clipboard::new()
            .ok()
            .and_then(|mut cb| cb.get_text().ok())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Relay
// ════════════════════════════════════════════════════════════════════════════

/// Clipboard → HTTP relay.  Owns its backends; never panics, never
/// propagates an error past [`RelayOutcome`].
pub struct Relay {
    endpoint:  String,
    transport: Box<dyn Transport>,
    clipboard: Box<dyn ClipboardSource>,
}

impl Relay {
    /// Production relay: `ureq` transport + `arboard` clipboard.
    pub fn new(config: &RelayConfig) -> Self {
        Relay {
            endpoint:  config.endpoint.clone(),
            transport: Box::new(HttpTransport::new(Duration::from_millis(config.timeout_ms))),
            clipboard: Box::new(SystemClipboard),
        }
    }

    /// Relay with explicit backends, for tests and headless use.
    pub fn with_backends(
        endpoint: impl Into<String>,
        transport: Box<dyn Transport>,
        clipboard: Box<dyn ClipboardSource>,
    ) -> Self {
        Relay { endpoint: endpoint.into(), transport, clipboard }
    }

    /// Snapshot the clipboard and dispatch it.
    pub fn send_clipboard(&mut self) -> RelayOutcome {
        match self.clipboard.text() {
            Some(text) => self.dispatch(&text),
            None => RelayOutcome::SkippedEmpty,
        }
    }

    /// Dispatch one text payload.  Empty or whitespace-only text is a
    /// silent no-op — the transport is never invoked.
    pub fn dispatch(&self, text: &str) -> RelayOutcome {
        if text.trim().is_empty() {
            log::debug!("clipboard empty; skipping dispatch");
            return RelayOutcome::SkippedEmpty;
        }

        let body = json!({ "text": text });
        match self.transport.post_json(&self.endpoint, &body) {
            Ok(200) => {
                log::info!("sent {} clipboard chars to {}", text.len(), self.endpoint);
                RelayOutcome::Sent
            }
            Ok(code) => {
                log::warn!("dispatch rejected: status {}", code);
                RelayOutcome::Failed(DispatchError::Status(code))
            }
            Err(err) => {
                log::warn!("dispatch failed: {}", err);
                RelayOutcome::Failed(err)
            }
        }
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Tests
// ════════════════════════════════════════════════════════════════════════════
