//! Frame duplication fan-out
//!
//! Lets any number of output-only sources mirror the live video and audio of
//! one existing source, without opening the underlying device twice.
//!
//! # Architecture
//!
//! ```text
//!                      ┌──────────────────────────┐
//!   device frames ───► │ Source "Camera"          │
//!                      │   filter chain:          │
//!                      │   ┌──────────────────┐   │
//!                      │   │ RelayFilter      │───┼──► output_video / output_audio
//!                      │   └──────────────────┘   │          │ signals
//!                      └──────────────────────────┘          │
//!                              ▲ inc/dec showing/active      │
//!                              │ procedures                  ▼
//!                      ┌──────────────────────────┐   ┌──────────────────┐
//!                      │ DuplicatorSource "Mirror"│◄──│ republish frames │
//!                      └──────────────────────────┘   └──────────────────┘
//! ```
//!
//! - [`relay::RelayFilter`] sits in a source's filter chain, broadcasts every
//!   frame unmodified and keeps its parent showing/active while needed
//! - [`duplicator::DuplicatorSource`] finds a relay filter by source name,
//!   subscribes to it and republishes its frames as its own output
//! - [`host`] provides the compositing-host primitives both rely on
//!
//! # Example
//!
//! ```no_run
//! use srcdup::duplicator::DuplicatorConfig;
//! use srcdup::host::Host;
//!
//! #[tokio::main]
//! async fn main() {
//!     let host = Host::new();
//!     srcdup::plugin::register(&host, DuplicatorConfig::default());
//!
//!     let frame_loop = host.spawn_frame_loop();
//!     // ... create sources, attach relay filters, create duplicators
//!     frame_loop.abort();
//! }
//! ```

pub mod constants;
pub mod counter;
pub mod duplicator;
pub mod host;
pub mod media;
pub mod plugin;
pub mod relay;

pub use duplicator::{DuplicatorConfig, DuplicatorSource};
pub use host::{Host, HostConfig, HostError};
pub use plugin::register;
pub use relay::{RelayFilter, RelayStats};
