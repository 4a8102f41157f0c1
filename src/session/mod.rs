//! Session lifecycle for the CampusFind app.
//!
//! Provides:
//! - [`SessionManager`] — single source of truth for "who is logged in",
//!   with TTL-based invalidation persisted through [`crate::storage`]
//! - One-shot startup restore with lazy migration of pre-expiry records
//! - A structured [`SessionEvent`] log so failure paths are assertable
//!
//! ## Design Decisions
//! - Storage is best-effort: no session operation ever returns an error.
//!   Failures are logged and recorded as events; state degrades to "absent"
//!   or stays unchanged, so the app remains usable without durability.
//! - Every operation funnels through the one-shot initializer, so callers
//!   cannot observe or mutate state before the initial restore completes.
//! - The manager is an ordinary constructed value injected by the caller;
//!   there is no process-wide global.

mod events;
mod manager;

pub use events::{EventLog, SessionEvent};
pub use manager::{SessionConfig, SessionManager, UserProfile, DEFAULT_SESSION_TTL_HOURS};
