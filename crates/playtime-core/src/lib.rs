//! Playtime accounting and enforcement core
//!
//! This crate owns the per-session bookkeeping, the daily limit policy, and
//! the cadence of the periodic passes (flush/autosave, presentation updates,
//! midnight rollover). It performs no I/O of its own beyond the injected
//! [`UsageStore`](playtime_store::UsageStore): every decision is returned as
//! a [`CoreAction`] for the host process to carry out, and every entry point
//! takes the current instant explicitly so the whole core can be driven by a
//! virtual clock in tests.

mod actions;
mod directory;
mod engine;
mod limiter;
mod presentation;
mod scheduler;
mod session;

pub use actions::*;
pub use directory::*;
pub use engine::*;
pub use limiter::*;
pub use presentation::*;
pub use scheduler::*;
pub use session::*;
