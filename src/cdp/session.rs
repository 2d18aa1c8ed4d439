//! CDP page session for interacting with a single page.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use futures::SinkExt;
use parking_lot::Mutex;
use serde_json::{Value, json};
use tokio::sync::mpsc;
use tokio::time::Instant;
use tokio_tungstenite::tungstenite::Message;
use tracing::{debug, trace};

use super::client::{DEFAULT_CALL_TIMEOUT, PendingRequest, WsSink};
use super::error::CdpError;
use super::protocol::{
    BoxModel, CdpRequest, CdpResponse, MouseButton, MouseEventType, PrintToPdfParams,
};

/// Network-quiescence policy: the page is considered settled once no more
/// than `max_inflight` requests are outstanding for a full `window`.
#[derive(Debug, Clone, Copy)]
pub struct NetworkIdle {
    pub max_inflight: usize,
    pub window: Duration,
}

impl Default for NetworkIdle {
    fn default() -> Self {
        Self {
            max_inflight: 2,
            window: Duration::from_millis(500),
        }
    }
}

/// A session attached to a single page/target.
pub struct PageSession {
    /// Target ID.
    target_id: String,
    /// Session ID for this target.
    session_id: String,
    /// WebSocket sender (shared with client).
    ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
    /// Pending requests (shared with client).
    pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
    /// Request ID counter (shared with client).
    request_id: Arc<AtomicU64>,
    /// Event receiver, fed by the client's receive loop.
    events: tokio::sync::Mutex<mpsc::UnboundedReceiver<CdpResponse>>,
}

impl PageSession {
    pub(crate) fn new(
        target_id: String,
        session_id: String,
        ws_tx: Arc<tokio::sync::Mutex<WsSink>>,
        pending: Arc<Mutex<HashMap<u64, PendingRequest>>>,
        request_id: Arc<AtomicU64>,
        event_rx: mpsc::UnboundedReceiver<CdpResponse>,
    ) -> Self {
        Self {
            target_id,
            session_id,
            ws_tx,
            pending,
            request_id,
            events: tokio::sync::Mutex::new(event_rx),
        }
    }

    /// Get target ID.
    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    /// Get session ID.
    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Send a CDP command to this page session.
    pub async fn call(&self, method: &str, params: Option<Value>) -> Result<Value, CdpError> {
        self.call_with_timeout(method, params, DEFAULT_CALL_TIMEOUT)
            .await
    }

    /// Send a CDP command with an explicit response deadline.
    pub async fn call_with_timeout(
        &self,
        method: &str,
        params: Option<Value>,
        timeout: Duration,
    ) -> Result<Value, CdpError> {
        let id = self.request_id.fetch_add(1, Ordering::SeqCst);

        let request = CdpRequest {
            id,
            method: method.to_string(),
            params,
            session_id: Some(self.session_id.clone()),
        };

        let json = serde_json::to_string(&request)?;
        trace!("CDP session send: {}", json);

        let (tx, rx) = tokio::sync::oneshot::channel();
        self.pending.lock().insert(id, PendingRequest { tx });

        {
            let mut ws = self.ws_tx.lock().await;
            ws.send(Message::Text(json.into())).await?;
        }

        match tokio::time::timeout(timeout, rx).await {
            Ok(Ok(result)) => result,
            Ok(Err(_)) => Err(CdpError::SessionClosed),
            Err(_) => {
                self.pending.lock().remove(&id);
                Err(CdpError::Timeout(format!("Request {} timed out", method)))
            }
        }
    }

    /// Enable the CDP domains a render needs.
    pub(crate) async fn enable_domains(&self) -> Result<(), CdpError> {
        self.call("Page.enable", None).await?;
        self.call("DOM.enable", None).await?;
        self.call("Runtime.enable", None).await?;
        // Network events drive the quiescence wait
        self.call("Network.enable", None).await?;

        debug!("Enabled CDP domains for session {}", self.session_id);
        Ok(())
    }

    // ========================================================================
    // Emulation
    // ========================================================================

    /// Override viewport dimensions and device emulation.
    pub async fn set_device_metrics(
        &self,
        width: u32,
        height: u32,
        device_scale_factor: f64,
        mobile: bool,
    ) -> Result<(), CdpError> {
        self.call(
            "Emulation.setDeviceMetricsOverride",
            Some(json!({
                "width": width,
                "height": height,
                "deviceScaleFactor": device_scale_factor,
                "mobile": mobile,
            })),
        )
        .await?;
        Ok(())
    }

    /// Override the user agent string.
    pub async fn set_user_agent(&self, user_agent: &str) -> Result<(), CdpError> {
        self.call(
            "Emulation.setUserAgentOverride",
            Some(json!({"userAgent": user_agent})),
        )
        .await?;
        Ok(())
    }

    /// Toggle the browser cache for this page.
    pub async fn set_cache_disabled(&self, disabled: bool) -> Result<(), CdpError> {
        self.call(
            "Network.setCacheDisabled",
            Some(json!({"cacheDisabled": disabled})),
        )
        .await?;
        Ok(())
    }

    /// Toggle script execution for this page.
    pub async fn set_javascript_enabled(&self, enabled: bool) -> Result<(), CdpError> {
        self.call(
            "Emulation.setScriptExecutionDisabled",
            Some(json!({"value": !enabled})),
        )
        .await?;
        Ok(())
    }

    // ========================================================================
    // Navigation
    // ========================================================================

    /// Navigate and wait for network quiescence, all within `timeout`.
    pub async fn navigate_and_settle(
        &self,
        url: &str,
        idle: NetworkIdle,
        timeout: Duration,
    ) -> Result<(), CdpError> {
        let deadline = Instant::now() + timeout;

        // Activity from a previous navigation must not count toward this one.
        self.drain_events().await;

        // The navigate command itself must answer within the step bound, not
        // the generic call timeout.
        let result = self
            .call_with_timeout(
                "Page.navigate",
                Some(json!({"url": url})),
                deadline.saturating_duration_since(Instant::now()),
            )
            .await?;

        if let Some(error) = result.get("errorText").and_then(Value::as_str) {
            if !error.is_empty() {
                return Err(CdpError::NavigationFailed(error.to_string()));
            }
        }

        debug!("Navigation to {} started", url);
        self.wait_for_network_idle(idle, deadline).await
    }

    /// Discard any buffered events.
    async fn drain_events(&self) {
        let mut events = self.events.lock().await;
        while events.try_recv().is_ok() {}
    }

    /// Wait until outstanding network requests stay at or below the idle
    /// threshold for a full quiet window, or until `deadline`.
    async fn wait_for_network_idle(
        &self,
        idle: NetworkIdle,
        deadline: Instant,
    ) -> Result<(), CdpError> {
        let mut events = self.events.lock().await;
        let mut inflight: HashSet<String> = HashSet::new();

        loop {
            let now = Instant::now();
            if now >= deadline {
                return Err(CdpError::Timeout(
                    "Waiting for network idle timed out".to_string(),
                ));
            }

            // Quiet window when already idle, otherwise wait out the deadline
            // for the next change in activity.
            let wait = if inflight.len() <= idle.max_inflight {
                idle.window.min(deadline - now)
            } else {
                deadline - now
            };

            match tokio::time::timeout(wait, events.recv()).await {
                Ok(Some(event)) => Self::track_network_event(&mut inflight, &event),
                Ok(None) => return Err(CdpError::SessionClosed),
                Err(_) => {
                    if inflight.len() <= idle.max_inflight {
                        trace!("Network idle for session {}", self.session_id);
                        return Ok(());
                    }
                }
            }
        }
    }

    /// Update the in-flight request set from a Network domain event.
    fn track_network_event(inflight: &mut HashSet<String>, event: &CdpResponse) {
        let Some(method) = event.method.as_deref() else {
            return;
        };
        let request_id = event
            .params
            .as_ref()
            .and_then(|p| p["requestId"].as_str())
            .unwrap_or_default();
        if request_id.is_empty() {
            return;
        }

        match method {
            "Network.requestWillBeSent" => {
                inflight.insert(request_id.to_string());
            }
            "Network.loadingFinished" | "Network.loadingFailed" => {
                inflight.remove(request_id);
            }
            _ => {}
        }
    }

    // ========================================================================
    // DOM interaction
    // ========================================================================

    /// Query selector against the document root.
    pub async fn query_selector(&self, selector: &str) -> Result<Option<i64>, CdpError> {
        let doc = self
            .call("DOM.getDocument", Some(json!({"depth": 0})))
            .await?;
        let root_id = doc["root"]["nodeId"]
            .as_i64()
            .ok_or_else(|| CdpError::InvalidResponse("Missing document root".to_string()))?;

        let result = self
            .call(
                "DOM.querySelector",
                Some(json!({
                    "nodeId": root_id,
                    "selector": selector,
                })),
            )
            .await?;

        let node_id = result["nodeId"].as_i64().unwrap_or(0);
        if node_id == 0 { Ok(None) } else { Ok(Some(node_id)) }
    }

    /// Get box model for node. `None` when the node has no layout.
    async fn get_box_model(&self, node_id: i64) -> Result<Option<BoxModel>, CdpError> {
        let result = self
            .call("DOM.getBoxModel", Some(json!({"nodeId": node_id})))
            .await;

        match result {
            Ok(r) => {
                let model: BoxModel = serde_json::from_value(r["model"].clone())?;
                Ok(Some(model))
            }
            // Node not visible or without layout
            Err(CdpError::Protocol { code: -32000, .. }) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Click at page coordinates.
    async fn click(&self, x: f64, y: f64) -> Result<(), CdpError> {
        for event_type in [MouseEventType::MousePressed, MouseEventType::MouseReleased] {
            self.call(
                "Input.dispatchMouseEvent",
                Some(json!({
                    "type": event_type,
                    "x": x,
                    "y": y,
                    "button": MouseButton::Left,
                    "clickCount": 1,
                })),
            )
            .await?;
        }

        debug!("Clicked at ({}, {})", x, y);
        Ok(())
    }

    /// Click on element by selector.
    pub async fn click_selector(&self, selector: &str) -> Result<(), CdpError> {
        let node_id = self
            .query_selector(selector)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(selector.to_string()))?;

        let box_model = self
            .get_box_model(node_id)
            .await?
            .ok_or_else(|| CdpError::ElementNotFound(format!("{} (not visible)", selector)))?;

        let (x, y) = Self::quad_center(&box_model.content);
        self.click(x, y).await
    }

    /// Calculate center point of a quad.
    fn quad_center(quad: &[f64]) -> (f64, f64) {
        if quad.len() >= 8 {
            let x = (quad[0] + quad[2] + quad[4] + quad[6]) / 4.0;
            let y = (quad[1] + quad[3] + quad[5] + quad[7]) / 4.0;
            (x, y)
        } else {
            (0.0, 0.0)
        }
    }

    // ========================================================================
    // PDF
    // ========================================================================

    /// Serialize the page to PDF bytes via Page.printToPDF.
    pub async fn print_to_pdf(
        &self,
        params: &PrintToPdfParams,
        timeout: Duration,
    ) -> Result<Vec<u8>, CdpError> {
        let result = self
            .call_with_timeout("Page.printToPDF", Some(serde_json::to_value(params)?), timeout)
            .await?;

        let data = result["data"]
            .as_str()
            .ok_or_else(|| CdpError::InvalidResponse("Missing PDF data".to_string()))?;

        BASE64
            .decode(data)
            .map_err(|e| CdpError::InvalidResponse(format!("Invalid PDF payload: {}", e)))
    }
}
