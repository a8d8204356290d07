//! Relay filter
//!
//! The filter side of the fan-out. It intercepts the frames flowing through
//! its parent source, broadcasts each one on a named signal, and keeps the
//! parent showing/active for as long as any duplicator needs it.
//!
//! # Reentrancy
//!
//! If a duplicator's output is routed back into the same filter, a broadcast
//! would recurse forever. Each media kind has a `BroadcastGuard`; a frame
//! arriving while a broadcast of its kind is in flight is passed through
//! without being broadcast again.

pub mod filter;
pub mod guard;
pub mod stats;

pub use filter::RelayFilter;
pub use guard::{BroadcastGuard, InFlight};
pub use stats::RelayStats;
