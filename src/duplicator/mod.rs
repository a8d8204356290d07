//! Duplicator source
//!
//! The subscriber side of the fan-out. Any number of duplicators may bind to
//! one relay filter; each binds to at most one at a time.
//!
//! # Binding lifecycle
//!
//! ```text
//!   update(name) ──► resolve(name) ──► bind(filter | none)
//!                                        │
//!   video_tick ── timer < 0 ──► reconcile: resolve(name) == bound?
//!                                        │ no
//!                                        ▼
//!                           unbind(old) then bind(new)
//! ```
//!
//! An unresolvable name is not an error; the duplicator simply produces no
//! output until the name resolves.

mod binding;
pub mod config;
mod properties;
pub mod resolve;
pub mod source;

pub use config::{DuplicatorConfig, DEFAULT_RECONCILE_INTERVAL};
pub use resolve::{find_relay_filter, resolve_relay_filter};
pub use source::DuplicatorSource;
