//! CampusFind core — session lifecycle and backend access for the campus
//! lost-and-found app.
//!
//! The UI layer (screens, navigation) lives in the mobile client; this crate
//! owns everything underneath it:
//! - [`session`] — who is logged in, persisted with a time-to-live
//! - [`storage`] — the key-value persistence boundary the session sits on
//! - [`backend`] — thin HTTP client for the CampusFind report service

pub mod backend;
pub mod session;
pub mod storage;

pub use session::{SessionConfig, SessionEvent, SessionManager, UserProfile};
pub use storage::{FileStorage, MemoryStorage, SessionStorage, StorageError};
