//! Page rendering: navigate a target URL under the fixed device profile and
//! serialize the result to PDF.
//!
//! The profile (mobile viewport, fixed UA, cache off) is deliberately not
//! request-configurable: the service exists to produce one consistent
//! reader-view snapshot per URL, not arbitrary renders.

use tracing::info;

use crate::browser::BrowserSession;
use crate::cdp::{NetworkIdle, PageSession, PrintToPdfParams};
use crate::config::RENDER_TIMEOUT;
use crate::error::RenderError;

/// Viewport of the fixed mobile profile.
const VIEWPORT_WIDTH: u32 = 375;
const VIEWPORT_HEIGHT: u32 = 667;
const DEVICE_SCALE_FACTOR: f64 = 2.0;

/// User agent of the fixed mobile profile.
const USER_AGENT: &str = "Mozilla/5.0 (iPhone; CPU iPhone OS 11_0 like Mac OS X) \
     AppleWebKit/604.1.38 (KHTML, like Gecko) Version/11.0 Mobile/15A372 Safari/604.1";

/// PDF page margin, centimeters on every side.
const PDF_MARGIN_CM: f64 = 1.0;

/// Percent-decode the raw `url` query value.
pub fn decode_target_url(raw_url: &str) -> Result<String, RenderError> {
    urlencoding::decode(raw_url)
        .map(|decoded| decoded.into_owned())
        .map_err(|e| RenderError::InvalidUrl(format!("{}: {}", raw_url, e)))
}

/// Render `raw_url` to PDF bytes on a fresh page context.
///
/// The page handle is parked in `page_slot` as soon as it exists, so the
/// coordinator can close it during teardown no matter where this function
/// bails out; closing is deliberately not done here.
pub async fn render_page(
    session: &BrowserSession,
    raw_url: &str,
    page_slot: &mut Option<PageSession>,
) -> Result<Vec<u8>, RenderError> {
    let target_url = decode_target_url(raw_url)?;

    let page = page_slot.insert(
        session
            .client()
            .new_page()
            .await
            .map_err(|e| RenderError::PdfGeneration(e.to_string()))?,
    );

    apply_render_profile(page).await?;

    info!("Navigating to {}", target_url);
    page.navigate_and_settle(&target_url, NetworkIdle::default(), RENDER_TIMEOUT)
        .await
        .map_err(|e| RenderError::from_navigation(e, RENDER_TIMEOUT.as_secs()))?;
    info!("Navigation to {} successful", target_url);

    let pdf = page
        .print_to_pdf(
            &PrintToPdfParams::a4_with_margin_cm(PDF_MARGIN_CM),
            RENDER_TIMEOUT,
        )
        .await
        .map_err(|e| RenderError::PdfGeneration(e.to_string()))?;

    info!("PDF generated successfully ({} bytes)", pdf.len());
    Ok(pdf)
}

/// Apply the fixed device profile: JS on, mobile viewport and UA, cache off.
async fn apply_render_profile(page: &PageSession) -> Result<(), RenderError> {
    page.set_javascript_enabled(true)
        .await
        .map_err(|e| RenderError::PdfGeneration(e.to_string()))?;
    page.set_device_metrics(VIEWPORT_WIDTH, VIEWPORT_HEIGHT, DEVICE_SCALE_FACTOR, true)
        .await
        .map_err(|e| RenderError::PdfGeneration(e.to_string()))?;
    page.set_user_agent(USER_AGENT)
        .await
        .map_err(|e| RenderError::PdfGeneration(e.to_string()))?;
    page.set_cache_disabled(true)
        .await
        .map_err(|e| RenderError::PdfGeneration(e.to_string()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_passthrough() {
        assert_eq!(
            decode_target_url("https://example.com/article").unwrap(),
            "https://example.com/article"
        );
    }

    #[test]
    fn test_decode_percent_encoded() {
        assert_eq!(
            decode_target_url("https%3A%2F%2Fexample.com%2Fa%20b").unwrap(),
            "https://example.com/a b"
        );
    }

    #[test]
    fn test_decode_invalid_utf8_rejected() {
        let err = decode_target_url("https://example.com/%FF%FE").unwrap_err();
        assert!(matches!(err, RenderError::InvalidUrl(_)));
    }

    #[test]
    fn test_fixed_profile_constants() {
        assert_eq!(VIEWPORT_WIDTH, 375);
        assert_eq!(VIEWPORT_HEIGHT, 667);
        assert!(USER_AGENT.contains("iPhone"));
    }
}
