//! Chrome DevTools Protocol (CDP) client implementation.
//!
//! Connects to Chrome/Chromium via WebSocket and speaks the CDP JSON-RPC
//! protocol: one [`CdpClient`] per browser process, one [`PageSession`] per
//! attached page target, with events routed back to the session that owns
//! them.

mod client;
mod error;
mod protocol;
mod session;

pub use client::CdpClient;
pub use error::CdpError;
pub use protocol::{BrowserVersion, PageInfo, PrintToPdfParams};
pub use session::{NetworkIdle, PageSession};
