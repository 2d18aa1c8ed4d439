//! Request-level error taxonomy.

use thiserror::Error;

use crate::cdp::CdpError;

/// Failures surfaced by one request's render lifecycle.
///
/// Every variant maps to a 500 response; teardown failures are deliberately
/// absent — they are logged and never returned.
#[derive(Debug, Error)]
pub enum RenderError {
    /// Chrome failed to start or to become reachable within the bound.
    #[error("Browser initialization failed: {0}")]
    BrowserLaunch(String),

    /// The extension activation sequence failed.
    #[error("Extension activation failed: {0}")]
    ExtensionActivation(String),

    /// The url parameter could not be percent-decoded.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// Navigation failed for a reason other than the deadline.
    #[error("Navigation failed: {0}")]
    Navigation(String),

    /// The page did not reach network quiescence within the bound.
    #[error("Navigation timed out after {0} seconds")]
    NavigationTimeout(u64),

    /// PDF serialization failed or timed out.
    #[error("PDF generation failed: {0}")]
    PdfGeneration(String),
}

impl RenderError {
    /// Classify a CDP fault from the navigation step.
    pub fn from_navigation(e: CdpError, timeout_secs: u64) -> Self {
        if e.is_timeout() {
            RenderError::NavigationTimeout(timeout_secs)
        } else {
            RenderError::Navigation(e.to_string())
        }
    }
}
