//! webprint library.
//!
//! A single-endpoint HTTP service that renders a target URL inside a real
//! Chrome instance — with a bundled reader-view extension loaded and
//! activated — and returns the document as a PDF.
//!
//! ## Architecture
//!
//! ```text
//! GET /?url=…           ┌──────────────┐  per request   ┌─────────────┐
//! ───────────────────►  │ Coordinator  │ ─────────────► │   Chrome    │
//!                       │ (one at a    │   launch/CDP   │ + extension │
//! ◄───────────────────  │  time gate)  │ ◄───────────── │             │
//!  application/pdf      └──────────────┘   PDF bytes    └─────────────┘
//! ```
//!
//! Every request gets its own browser process: launch → extension
//! activation → render → unconditional teardown. Nothing is shared or
//! reused between requests; a single-permit gate serializes the lifecycle.
//!
//! - [`browser`] - Chrome process ownership and teardown
//! - [`cdp`] - Chrome DevTools Protocol client
//! - [`activate`] - extension activation handshake
//! - [`render`] - fixed-profile navigation and PDF serialization
//! - [`coordinator`] - per-request lifecycle orchestration
//! - [`server`] - axum HTTP surface

pub mod activate;
pub mod browser;
pub mod cdp;
pub mod config;
pub mod coordinator;
pub mod error;
pub mod render;
pub mod server;

pub use browser::BrowserSession;
pub use cdp::{CdpClient, CdpError, NetworkIdle, PageSession, PrintToPdfParams};
pub use config::ServiceConfig;
pub use coordinator::RequestCoordinator;
pub use error::RenderError;
