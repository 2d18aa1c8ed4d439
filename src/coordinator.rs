//! Per-request orchestration of the browser-session lifecycle.
//!
//! Every request walks the same sequence: acquire the render gate, start a
//! fresh browser session, activate the extension, render, then tear
//! everything down whatever happened. Nothing survives between requests.

use tokio::sync::Semaphore;
use tracing::{debug, warn};

use crate::activate::activate_extension;
use crate::browser::BrowserSession;
use crate::cdp::PageSession;
use crate::config::ServiceConfig;
use crate::error::RenderError;
use crate::render::render_page;

/// Coordinates one render request end to end.
///
/// The single-permit gate serializes the whole lifecycle: only one browser
/// session can exist at a time, so one request's teardown can never destroy
/// a session another request is still using. Excess requests queue on the
/// permit.
pub struct RequestCoordinator {
    config: ServiceConfig,
    gate: Semaphore,
}

impl RequestCoordinator {
    pub fn new(config: ServiceConfig) -> Self {
        Self {
            config,
            gate: Semaphore::new(1),
        }
    }

    /// Render `raw_url` to PDF within a request-scoped browser session.
    ///
    /// The session and any page context it spawned are gone by the time
    /// this returns, on success and on failure alike. Teardown errors are
    /// logged, never returned.
    pub async fn handle(&self, raw_url: &str) -> Result<Vec<u8>, RenderError> {
        let _permit = self
            .gate
            .acquire()
            .await
            .map_err(|_| RenderError::BrowserLaunch("render gate closed".to_string()))?;
        debug!("Render gate acquired");

        let session = BrowserSession::start(&self.config).await?;

        let mut page_slot: Option<PageSession> = None;
        let result = self.activate_and_render(&session, raw_url, &mut page_slot).await;

        if let Some(page) = page_slot.take() {
            if let Err(e) = session.client().close_page(&page).await {
                warn!("Failed to close page context: {}", e);
            }
        }
        session.stop().await;

        result
    }

    async fn activate_and_render(
        &self,
        session: &BrowserSession,
        raw_url: &str,
        page_slot: &mut Option<PageSession>,
    ) -> Result<Vec<u8>, RenderError> {
        activate_extension(session, &self.config.extension_id).await?;
        render_page(session, raw_url, page_slot).await
    }
}
