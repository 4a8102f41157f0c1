//! CampusFind backend client (reqwest).

use crate::session::UserProfile;
use anyhow::Context;
use serde::{Deserialize, Serialize};

// ── Configuration ────────────────────────────────────────────────

/// Backend connection configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Service base URL (e.g., https://api.campusfind.app).
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl BackendConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: 30,
        }
    }

    /// Load from environment variables.
    pub fn from_env() -> Option<Self> {
        let base_url = std::env::var("CAMPUSFIND_API_URL").ok()?;
        if base_url.is_empty() {
            return None;
        }
        Some(Self::new(base_url))
    }
}

// ── Data models ──────────────────────────────────────────────────

/// A lost/found report as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Report {
    pub id: i64,
    #[serde(default)]
    pub user_id: Option<i64>,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub contact: Option<String>,
    /// Report state as the backend renders it ("Perdido" / "Encontrado").
    pub status: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Fields for a new report submission.
#[derive(Debug, Clone)]
pub struct NewReport {
    pub user_id: i64,
    pub title: String,
    pub description: String,
    pub location: String,
    pub contact: String,
    pub status: String,
}

/// Photo attached to a report submission.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub file_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

/// `POST /users/google-login` response envelope.
#[derive(Debug, Deserialize)]
struct GoogleLoginResponse {
    user: UserProfile,
}

/// `GET /reports/user/{id}` response envelope.
#[derive(Debug, Deserialize)]
struct ReportsResponse {
    reports: Vec<Report>,
}

// ── Client ───────────────────────────────────────────────────────

/// HTTP client for the CampusFind backend.
pub struct BackendClient {
    config: BackendConfig,
    http: reqwest::Client,
}

impl BackendClient {
    pub fn new(config: BackendConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self { config, http })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Exchange an identity-provider profile for the backend user record.
    /// The returned profile is what gets handed to `SessionManager::login`.
    pub async fn google_login(&self, profile: &UserProfile) -> anyhow::Result<UserProfile> {
        let resp = self
            .http
            .post(self.url("/users/google-login"))
            .json(profile)
            .send()
            .await
            .context("google-login request failed")?
            .error_for_status()
            .context("google-login rejected")?;

        let body: GoogleLoginResponse = resp.json().await.context("google-login: invalid response body")?;
        Ok(body.user)
    }

    /// Submit a new report, optionally with a photo, as multipart form data.
    pub async fn submit_report(
        &self,
        report: &NewReport,
        image: Option<ImageUpload>,
    ) -> anyhow::Result<Report> {
        let mut form = reqwest::multipart::Form::new()
            .text("user_id", report.user_id.to_string())
            .text("title", report.title.clone())
            .text("description", report.description.clone())
            .text("location", report.location.clone())
            .text("contact", report.contact.clone())
            .text("status", report.status.clone());

        if let Some(image) = image {
            let part = reqwest::multipart::Part::bytes(image.bytes)
                .file_name(image.file_name)
                .mime_str(&image.mime_type)
                .context("invalid image mime type")?;
            form = form.part("image", part);
        }

        let resp = self
            .http
            .post(self.url("/reports"))
            .multipart(form)
            .send()
            .await
            .context("report submission failed")?
            .error_for_status()
            .context("report submission rejected")?;

        resp.json().await.context("report submission: invalid response body")
    }

    /// Fetch a single report by id.
    pub async fn report(&self, id: i64) -> anyhow::Result<Report> {
        let resp = self
            .http
            .get(self.url(&format!("/reports/{id}")))
            .send()
            .await
            .context("report fetch failed")?
            .error_for_status()
            .context("report fetch rejected")?;

        resp.json().await.context("report fetch: invalid response body")
    }

    /// Fetch every report a user has filed.
    pub async fn reports_for_user(&self, user_id: i64) -> anyhow::Result<Vec<Report>> {
        let resp = self
            .http
            .get(self.url(&format!("/reports/user/{user_id}")))
            .send()
            .await
            .context("user reports fetch failed")?
            .error_for_status()
            .context("user reports fetch rejected")?;

        let body: ReportsResponse = resp
            .json()
            .await
            .context("user reports fetch: invalid response body")?;
        Ok(body.reports)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> BackendClient {
        BackendClient::new(BackendConfig::new(server.uri())).unwrap()
    }

    #[tokio::test]
    async fn google_login_unwraps_user_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/google-login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "user": { "id": 12, "name": "Ana", "email": "ana@uni.edu" }
            })))
            .mount(&server)
            .await;

        let profile = UserProfile {
            email: Some("ana@uni.edu".to_string()),
            ..UserProfile::default()
        };
        let user = client(&server).google_login(&profile).await.unwrap();

        assert_eq!(user.id, Some(12));
        assert_eq!(user.name.as_deref(), Some("Ana"));
    }

    #[tokio::test]
    async fn google_login_rejection_is_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/users/google-login"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&server)
            .await;

        let result = client(&server).google_login(&UserProfile::default()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn submit_report_roundtrip() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/reports"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 31,
                "user_id": 12,
                "title": "Blue backpack",
                "status": "Perdido"
            })))
            .mount(&server)
            .await;

        let report = NewReport {
            user_id: 12,
            title: "Blue backpack".to_string(),
            description: "Left in the library".to_string(),
            location: "Biblioteca".to_string(),
            contact: "ana@uni.edu".to_string(),
            status: "Perdido".to_string(),
        };
        let image = ImageUpload {
            file_name: "photo.jpg".to_string(),
            mime_type: "image/jpeg".to_string(),
            bytes: vec![0xFF, 0xD8, 0xFF],
        };

        let created = client(&server).submit_report(&report, Some(image)).await.unwrap();
        assert_eq!(created.id, 31);
        assert_eq!(created.status, "Perdido");
    }

    #[tokio::test]
    async fn report_by_id() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports/31"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "id": 31,
                "title": "Blue backpack",
                "status": "Encontrado",
                "location": "Cafetería"
            })))
            .mount(&server)
            .await;

        let report = client(&server).report(31).await.unwrap();
        assert_eq!(report.id, 31);
        assert_eq!(report.location.as_deref(), Some("Cafetería"));
    }

    #[tokio::test]
    async fn reports_for_user_unwraps_envelope() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/reports/user/12"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "reports": [
                    { "id": 1, "title": "Keys", "status": "Encontrado" },
                    { "id": 2, "title": "Umbrella", "status": "Perdido" }
                ]
            })))
            .mount(&server)
            .await;

        let reports = client(&server).reports_for_user(12).await.unwrap();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].title, "Keys");
    }
}
