//! Extension activation: the one-time configuration handshake that enables
//! the bundled reader-view extension for the lifetime of a session.
//!
//! The extension exposes no configuration API, only two UI surfaces. Both
//! steps must succeed before the session is usable for rendering, and the
//! sequence has to run again for every session: each session is a fresh
//! process whose extension starts in its default, disabled state.

use tracing::{info, warn};

use crate::browser::BrowserSession;
use crate::cdp::{NetworkIdle, PageSession};
use crate::config::ACTIVATION_NAV_TIMEOUT;
use crate::error::RenderError;

/// Control that persists the extension's default settings.
const SAVE_SETTINGS_SELECTOR: &str = "#save_top";

/// Control that enables the extension's feature gate.
const OPT_IN_SELECTOR: &str = "#optin-enable";

/// Run the two-step activation sequence on an ephemeral page.
///
/// The page is closed whatever the outcome; any navigation timeout, missing
/// control, or interaction failure maps to
/// [`RenderError::ExtensionActivation`].
pub async fn activate_extension(
    session: &BrowserSession,
    extension_id: &str,
) -> Result<(), RenderError> {
    let page = session
        .client()
        .new_page()
        .await
        .map_err(|e| RenderError::ExtensionActivation(e.to_string()))?;

    let result = run_activation_sequence(&page, extension_id).await;

    if let Err(e) = session.client().close_page(&page).await {
        warn!("Failed to close activation page: {}", e);
    }

    result
}

/// The extension's options surface.
fn options_url(extension_id: &str) -> String {
    format!("chrome-extension://{}/options/options.html", extension_id)
}

/// The extension's opt-in surface.
fn opt_in_url(extension_id: &str) -> String {
    format!(
        "chrome-extension://{}/options/optin/opt-in.html",
        extension_id
    )
}

async fn run_activation_sequence(
    page: &PageSession,
    extension_id: &str,
) -> Result<(), RenderError> {
    for (url, selector) in [
        (options_url(extension_id), SAVE_SETTINGS_SELECTOR),
        (opt_in_url(extension_id), OPT_IN_SELECTOR),
    ] {
        page.navigate_and_settle(&url, NetworkIdle::default(), ACTIVATION_NAV_TIMEOUT)
            .await
            .map_err(|e| RenderError::ExtensionActivation(format!("{}: {}", url, e)))?;

        page.click_selector(selector)
            .await
            .map_err(|e| RenderError::ExtensionActivation(format!("{}: {}", selector, e)))?;
    }

    info!("Extension {} activated", extension_id);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_activation_surfaces_are_namespaced_by_extension_id() {
        let id = "lkbebcjgcmobigpeffafkodonchffocl";
        assert_eq!(
            options_url(id),
            "chrome-extension://lkbebcjgcmobigpeffafkodonchffocl/options/options.html"
        );
        assert_eq!(
            opt_in_url(id),
            "chrome-extension://lkbebcjgcmobigpeffafkodonchffocl/options/optin/opt-in.html"
        );
    }
}
