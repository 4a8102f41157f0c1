//! HTTP client for the CampusFind report service.
//!
//! Thin data-plane wrapper around the backend REST API:
//! - `POST /users/google-login` — exchange an identity-provider profile for
//!   the backend's user record
//! - `POST /reports` — submit a lost/found report (multipart, optional photo)
//! - `GET /reports/{id}` / `GET /reports/user/{user_id}` — report lookups
//!
//! Errors here are ordinary `anyhow::Result`s; the never-throws policy
//! belongs to the session layer, not this boundary.

mod client;

pub use client::{BackendClient, BackendConfig, ImageUpload, NewReport, Report};
