//! Session manager: owns the authenticated-user identity and its expiry.
//!
//! Persisted layout (single key, default `"@user"`):
//! `{"user": {...}, "expiresAt": <epoch-ms>}` — or, for records written
//! before expiry tracking existed, the bare user object. Legacy records are
//! adopted as-is and rewritten in the current shape on first load.

use crate::session::events::{EventLog, SessionEvent};
use crate::storage::SessionStorage;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Default session duration: 7 days (hours).
pub const DEFAULT_SESSION_TTL_HOURS: u32 = 7 * 24;

const HOUR_MS: i64 = 60 * 60 * 1000;

/// Identity-provider profile. All fields are optional and unrecognized
/// fields pass through untouched: the session layer imposes no shape on the
/// user beyond "it is a mapping".
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub picture: Option<String>,
    /// Fields the session layer does not interpret.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl UserProfile {
    /// Adopt an arbitrary JSON mapping as a profile. Mappings whose known
    /// fields have unexpected types are still accepted, carried wholesale in
    /// `extra` so a later write reproduces them byte-for-byte.
    pub fn from_map(map: Map<String, Value>) -> Self {
        match serde_json::from_value(Value::Object(map.clone())) {
            Ok(profile) => profile,
            Err(_) => Self {
                extra: map,
                ..Self::default()
            },
        }
    }
}

/// Session manager tunables.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Storage key holding the single session record.
    pub storage_key: String,
    /// TTL applied when the caller does not supply one.
    pub default_ttl_hours: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            storage_key: "@user".to_string(),
            default_ttl_hours: DEFAULT_SESSION_TTL_HOURS,
        }
    }
}

/// Single source of truth for "who is logged in".
///
/// Constructed once at application root and injected into the UI layer.
/// All operations are infallible from the caller's point of view: storage
/// failures are logged, recorded in the [`EventLog`], and degrade to
/// "absent / unchanged" rather than propagating.
pub struct SessionManager {
    storage: Arc<dyn SessionStorage>,
    config: SessionConfig,
    user: Mutex<Option<UserProfile>>,
    loading: AtomicBool,
    init: OnceCell<()>,
    events: EventLog,
}

impl SessionManager {
    pub fn new(storage: Arc<dyn SessionStorage>) -> Self {
        Self::with_config(storage, SessionConfig::default())
    }

    pub fn with_config(storage: Arc<dyn SessionStorage>, config: SessionConfig) -> Self {
        Self {
            storage,
            config,
            user: Mutex::new(None),
            loading: AtomicBool::new(true),
            init: OnceCell::new(),
            events: EventLog::new(),
        }
    }

    // ── Readable state ──────────────────────────────────────────────

    /// The signed-in user, if any. `None` both before the initial restore
    /// completes and when nobody is signed in; check [`is_loading`] to
    /// distinguish.
    ///
    /// [`is_loading`]: Self::is_loading
    pub fn current_user(&self) -> Option<UserProfile> {
        self.user.lock().clone()
    }

    /// True from construction until the initial restore completes, then
    /// permanently false.
    pub fn is_loading(&self) -> bool {
        self.loading.load(Ordering::Acquire)
    }

    /// Snapshot of recorded lifecycle events, oldest first.
    pub fn events(&self) -> Vec<SessionEvent> {
        self.events.recent()
    }

    // ── Lifecycle operations ────────────────────────────────────────

    /// Run the initial restore from storage. Idempotent: the load happens
    /// exactly once per manager and concurrent callers await the same load.
    ///
    /// Every mutating operation calls this first, so no caller can race
    /// ahead of the startup restore.
    pub async fn initialize(&self) {
        self.init
            .get_or_init(|| async {
                self.restore_from_storage().await;
                // Runs on every restore outcome; `loading` cannot stay true.
                self.loading.store(false, Ordering::Release);
            })
            .await;
    }

    /// Wait until the initial restore has completed.
    pub async fn ready(&self) {
        self.initialize().await;
    }

    /// Sign in. The in-memory user is set before the record is persisted,
    /// so the session is usable immediately; if the write fails the session
    /// simply will not survive a restart.
    pub async fn login(&self, user: UserProfile, ttl_hours: Option<u32>) {
        self.initialize().await;

        *self.user.lock() = Some(user.clone());

        let expires_at = now_ms() + ttl_ms(ttl_hours.unwrap_or(self.config.default_ttl_hours));
        self.persist_record(&json!({ "user": user, "expiresAt": expires_at }), "login")
            .await;

        tracing::info!(expires_at, "Session: logged in");
        self.events.record(SessionEvent::LoggedIn { expires_at });
    }

    /// Extend the persisted expiry, measured from now. No-op when no record
    /// exists, the record has no `user` field, or it has already expired.
    /// Never touches the in-memory user.
    pub async fn refresh_session(&self, ttl_hours: Option<u32>) {
        self.initialize().await;

        let key = self.config.storage_key.as_str();
        let raw = match self.storage.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("Session refresh: no stored record");
                return;
            }
            Err(e) => {
                self.storage_failure("refresh-read", &e);
                return;
            }
        };

        let record = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            _ => {
                tracing::warn!("Session refresh: stored record is not a mapping");
                self.events.record(SessionEvent::Malformed);
                return;
            }
        };

        let user = match record.get("user") {
            Some(user @ Value::Object(_)) => user.clone(),
            _ => {
                tracing::debug!("Session refresh: record has no user field");
                return;
            }
        };

        // A record without a numeric expiry counts as not-yet-expired.
        let now = now_ms();
        if record
            .get("expiresAt")
            .and_then(Value::as_i64)
            .is_some_and(|expires_at| now >= expires_at)
        {
            tracing::debug!("Session refresh: already expired, not renewing");
            return;
        }

        let expires_at = now + ttl_ms(ttl_hours.unwrap_or(self.config.default_ttl_hours));
        self.persist_record(&json!({ "user": user, "expiresAt": expires_at }), "refresh")
            .await;

        tracing::debug!(expires_at, "Session: expiry extended");
        self.events.record(SessionEvent::Refreshed { expires_at });
    }

    /// Sign out. The in-memory clear is unconditional; a failed storage
    /// delete is absorbed. Calling this twice is the same as calling it once.
    pub async fn logout(&self) {
        self.initialize().await;

        *self.user.lock() = None;

        if let Err(e) = self.storage.delete(&self.config.storage_key).await {
            self.storage_failure("logout", &e);
        }

        tracing::info!("Session: logged out");
        self.events.record(SessionEvent::LoggedOut);
    }

    // ── Startup restore ─────────────────────────────────────────────

    /// Load the persisted record once at startup. All failures are absorbed:
    /// the outcome is only ever "user set" or "user absent".
    async fn restore_from_storage(&self) {
        let key = self.config.storage_key.as_str();
        let raw = match self.storage.get(key).await {
            Ok(Some(raw)) => raw,
            Ok(None) => {
                tracing::debug!("Session restore: no stored record");
                return;
            }
            Err(e) => {
                self.storage_failure("load", &e);
                return;
            }
        };

        let record = match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!("Session restore: stored value is not a mapping");
                self.events.record(SessionEvent::Malformed);
                return;
            }
            Err(e) => {
                tracing::warn!(error = %e, "Session restore: stored value is not valid JSON");
                self.events.record(SessionEvent::Malformed);
                return;
            }
        };

        match record.get("expiresAt") {
            // Tagged record: a non-numeric expiry can never be in the
            // future, so it falls through to deletion with the expired ones.
            Some(tag) => match tag.as_i64() {
                Some(expires_at) if now_ms() < expires_at => {
                    self.restore_live(&record, expires_at)
                }
                _ => {
                    tracing::info!("Session restore: record expired, deleting");
                    if let Err(e) = self.storage.delete(key).await {
                        self.storage_failure("expire-delete", &e);
                    }
                    self.events.record(SessionEvent::Expired);
                }
            },
            None => self.migrate_legacy(record).await,
        }
    }

    /// Current-format record with a future expiry: restore the user verbatim
    /// without touching storage.
    fn restore_live(&self, record: &Map<String, Value>, expires_at: i64) {
        match record.get("user") {
            Some(Value::Object(user)) => {
                *self.user.lock() = Some(UserProfile::from_map(user.clone()));
                tracing::info!(expires_at, "Session restore: live session restored");
                self.events.record(SessionEvent::Restored { expires_at });
            }
            _ => {
                tracing::warn!("Session restore: live record has no user mapping");
                self.events.record(SessionEvent::Malformed);
            }
        }
    }

    /// Record without `expiresAt`: a pre-expiry legacy user. Adopt the whole
    /// mapping as the user and rewrite it in the current shape with the
    /// default TTL. One-time, one-directional upgrade.
    async fn migrate_legacy(&self, user: Map<String, Value>) {
        let profile = UserProfile::from_map(user.clone());
        *self.user.lock() = Some(profile);

        let expires_at = now_ms() + ttl_ms(self.config.default_ttl_hours);
        self.persist_record(&json!({ "user": Value::Object(user), "expiresAt": expires_at }), "migrate")
            .await;

        tracing::info!(expires_at, "Session restore: legacy record migrated");
        self.events.record(SessionEvent::Migrated { expires_at });
    }

    // ── Helpers ─────────────────────────────────────────────────────

    /// Overwrite the session record with a single whole-value put,
    /// absorbing failures.
    async fn persist_record(&self, record: &Value, operation: &'static str) {
        let serialized = record.to_string();
        if let Err(e) = self.storage.set(&self.config.storage_key, &serialized).await {
            self.storage_failure(operation, &e);
        }
    }

    fn storage_failure(&self, operation: &'static str, error: &crate::storage::StorageError) {
        tracing::warn!(operation, error = %error, backend = self.storage.name(), "Session: storage call failed");
        self.events.record(SessionEvent::StorageFailure {
            operation,
            message: error.to_string(),
        });
    }
}

fn ttl_ms(hours: u32) -> i64 {
    i64::from(hours) * HOUR_MS
}

/// Current Unix epoch in milliseconds.
fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

// ── Tests ───────────────────────────────────────────────────────────
