//! Request-scoped browser session: one Chrome process plus its CDP client.

use std::path::Path;
use std::process::Stdio;
use std::time::Duration;

use tempfile::TempDir;
use tokio::process::{Child, Command};
use tokio::time::Instant;
use tracing::{debug, info, warn};

use crate::cdp::CdpClient;
use crate::config::{LAUNCH_TIMEOUT, ServiceConfig};
use crate::error::RenderError;

/// Poll interval while waiting for the DevTools endpoint to come up.
const READINESS_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// One running Chrome process, exclusively owned by a single request.
///
/// Created at the start of request handling and destroyed at the end of the
/// same request, whatever the outcome. The process starts from a throwaway
/// profile so the bundled extension always begins in its default state.
pub struct BrowserSession {
    process: Child,
    client: CdpClient,
    /// Profile directory; removed from disk when the session is dropped.
    _profile: TempDir,
}

impl BrowserSession {
    /// Launch Chrome with the fixed capability flag set and connect to it.
    ///
    /// Fails with [`RenderError::BrowserLaunch`] if the executable is
    /// missing or the DevTools endpoint does not become reachable within
    /// the launch bound.
    pub async fn start(config: &ServiceConfig) -> Result<Self, RenderError> {
        let profile = TempDir::new()
            .map_err(|e| RenderError::BrowserLaunch(format!("profile dir: {}", e)))?;

        let args = launch_args(config, profile.path());
        info!("Launching {} for render session", config.chrome_path.display());
        debug!("Chrome args: {:?}", args);

        let mut process = Command::new(&config.chrome_path)
            .args(&args)
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                RenderError::BrowserLaunch(format!(
                    "{}: {}",
                    config.chrome_path.display(),
                    e
                ))
            })?;

        let endpoint = config.devtools_endpoint();
        if let Err(e) = wait_for_devtools(&endpoint, LAUNCH_TIMEOUT).await {
            kill_process(&mut process).await;
            return Err(e);
        }

        let client = match CdpClient::connect(&endpoint).await {
            Ok(client) => client,
            Err(e) => {
                kill_process(&mut process).await;
                return Err(RenderError::BrowserLaunch(e.to_string()));
            }
        };

        info!("Browser session ready (pid {:?})", process.id());
        Ok(Self {
            process,
            client,
            _profile: profile,
        })
    }

    /// CDP client for this session's process.
    pub fn client(&self) -> &CdpClient {
        &self.client
    }

    /// Tear the session down: close the CDP connection and terminate Chrome.
    ///
    /// Always safe to call after a failed request; failures here are logged
    /// and never returned, so they cannot mask an earlier error.
    pub async fn stop(mut self) {
        drop(self.client);
        if let Err(e) = self.process.kill().await {
            warn!("Failed to stop browser process: {}", e);
        }
        info!("Browser session stopped");
    }
}

/// Fixed launch argument set for a render session.
fn launch_args(config: &ServiceConfig, profile_dir: &Path) -> Vec<String> {
    let extension = config.extension_dir.display();
    let mut args = vec![
        "--no-sandbox".to_string(),
        "--disable-setuid-sandbox".to_string(),
        "--single-process".to_string(),
        "--no-zygote".to_string(),
        format!("--disable-extensions-except={}", extension),
        format!("--load-extension={}", extension),
        format!("--remote-debugging-port={}", config.debug_port),
        format!("--user-data-dir={}", profile_dir.display()),
        "--no-first-run".to_string(),
        "--no-default-browser-check".to_string(),
    ];
    if config.headless {
        args.push("--headless=new".to_string());
    }
    args
}

/// Poll the DevTools endpoint until it answers, bounded by `timeout`.
async fn wait_for_devtools(endpoint: &str, timeout: Duration) -> Result<(), RenderError> {
    let deadline = Instant::now() + timeout;
    let version_url = format!("{}/json/version", endpoint);

    while Instant::now() < deadline {
        if reqwest::get(&version_url).await.is_ok() {
            return Ok(());
        }
        tokio::time::sleep(READINESS_POLL_INTERVAL).await;
    }

    Err(RenderError::BrowserLaunch(format!(
        "Chrome did not become ready within {:?}",
        timeout
    )))
}

async fn kill_process(process: &mut Child) {
    if let Err(e) = process.kill().await {
        warn!("Failed to kill browser process: {}", e);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_launch_args_fixed_flag_set() {
        let config = ServiceConfig {
            extension_dir: PathBuf::from("/opt/reader-ext"),
            debug_port: 9222,
            ..ServiceConfig::default()
        };
        let args = launch_args(&config, Path::new("/tmp/profile-x"));

        for flag in [
            "--no-sandbox",
            "--disable-setuid-sandbox",
            "--single-process",
            "--no-zygote",
            "--disable-extensions-except=/opt/reader-ext",
            "--load-extension=/opt/reader-ext",
            "--remote-debugging-port=9222",
            "--user-data-dir=/tmp/profile-x",
            "--headless=new",
        ] {
            assert!(args.iter().any(|a| a == flag), "missing {}", flag);
        }
    }

    #[test]
    fn test_launch_args_headful() {
        let config = ServiceConfig {
            headless: false,
            ..ServiceConfig::default()
        };
        let args = launch_args(&config, Path::new("/tmp/p"));
        assert!(!args.iter().any(|a| a.starts_with("--headless")));
    }

    #[tokio::test]
    async fn test_start_fails_for_missing_executable() {
        let config = ServiceConfig {
            chrome_path: PathBuf::from("/definitely/not/chrome"),
            ..ServiceConfig::default()
        };
        let result = BrowserSession::start(&config).await;
        assert!(matches!(result, Err(RenderError::BrowserLaunch(_))));
    }

    #[tokio::test]
    async fn test_wait_for_devtools_times_out() {
        // Nothing listens on port 1
        let result =
            wait_for_devtools("http://127.0.0.1:1", Duration::from_millis(300)).await;
        assert!(matches!(result, Err(RenderError::BrowserLaunch(_))));
    }
}
