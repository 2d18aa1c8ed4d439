//! Service configuration.

use std::path::PathBuf;
use std::time::Duration;

/// Identifier of the bundled reader-view extension.
pub const DEFAULT_EXTENSION_ID: &str = "lkbebcjgcmobigpeffafkodonchffocl";

/// Chrome executable used when none is configured.
pub const DEFAULT_CHROME_PATH: &str = "/usr/bin/google-chrome-stable";

/// Bound on Chrome startup, from spawn to a responsive DevTools endpoint.
pub const LAUNCH_TIMEOUT: Duration = Duration::from_secs(120);

/// Bound on each navigation within the extension activation sequence.
pub const ACTIVATION_NAV_TIMEOUT: Duration = Duration::from_secs(30);

/// Bound on target-page navigation and on PDF serialization, each.
pub const RENDER_TIMEOUT: Duration = Duration::from_secs(60);

/// Service configuration.
///
/// Defaults reproduce the fixed values of the deployed service; everything
/// here is an operator concern, never a per-request one.
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Listen host.
    pub host: String,
    /// Listen port.
    pub port: u16,
    /// Path to the Chrome/Chromium executable.
    pub chrome_path: PathBuf,
    /// Directory holding the unpacked extension.
    pub extension_dir: PathBuf,
    /// Extension identifier, used to reach its activation surfaces.
    pub extension_id: String,
    /// Chrome remote debugging port.
    pub debug_port: u16,
    /// Whether to run Chrome headless.
    pub headless: bool,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            chrome_path: PathBuf::from(DEFAULT_CHROME_PATH),
            extension_dir: PathBuf::from("extension"),
            extension_id: DEFAULT_EXTENSION_ID.to_string(),
            debug_port: 9222,
            headless: true,
        }
    }
}

impl ServiceConfig {
    /// Socket address string for the HTTP listener.
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Chrome DevTools HTTP endpoint.
    pub fn devtools_endpoint(&self) -> String {
        format!("http://127.0.0.1:{}", self.debug_port)
    }
}
