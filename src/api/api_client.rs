use reqwest::multipart::{Form, Part};
use reqwest::Client;

use crate::error::{AuthError, FetchError, SaveError};

use super::types::*;

#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Root of the website content endpoints.
    pub fn website_url(&self) -> String {
        format!("{}/api/website", self.base_url)
    }

    // ── Auth ────────────────────────────────────────────────────────────

    pub async fn login(&self, username: &str, password: &str) -> Result<AuthResponse, AuthError> {
        let resp = self
            .client
            .post(format!("{}/api/token/", self.base_url))
            .json(&LoginRequest {
                username: username.to_string(),
                password: password.to_string(),
            })
            .send()
            .await
            .map_err(|e| AuthError::Network(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::BAD_REQUEST
        {
            return Err(AuthError::InvalidCredentials);
        }
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(AuthError::Status(status.as_u16(), extract_error(&body)));
        }

        resp.json::<AuthResponse>()
            .await
            .map_err(|e| AuthError::Parse(e.to_string()))
    }

    // ── Carousel ────────────────────────────────────────────────────────

    pub async fn get_slides(&self) -> Result<Vec<Slide>, FetchError> {
        let resp = self
            .client
            .get(format!("{}/carousel/", self.website_url()))
            .header(reqwest::header::CACHE_CONTROL, "no-store")
            .send()
            .await
            .map_err(|e| FetchError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(FetchError::Status(status.as_u16(), extract_error(&body)));
        }

        resp.json::<Vec<Slide>>()
            .await
            .map_err(|e| FetchError::Parse(e.to_string()))
    }

    /// Partial update of one slot. Scalar fields travel as text parts, the
    /// optional replacement media as a file part named `media`.
    pub async fn update_slide(
        &self,
        token: &str,
        slot_id: u32,
        fields: Vec<(&'static str, String)>,
        media: Option<&MediaUpload>,
    ) -> Result<Slide, SaveError> {
        let mut form = Form::new();
        for (name, value) in fields {
            form = form.text(name, value);
        }
        if let Some(upload) = media {
            let part = Part::bytes(upload.bytes.clone())
                .file_name(upload.file_name.clone())
                .mime_str(&upload.mime)
                .map_err(|e| SaveError::Media(e.to_string()))?;
            form = form.part("media", part);
        }

        let resp = self
            .client
            .patch(format!("{}/carousel/{}/", self.website_url(), slot_id))
            .bearer_auth(token)
            .multipart(form)
            .send()
            .await
            .map_err(|e| SaveError::Network(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(SaveError::Status(status.as_u16(), extract_error(&body)));
        }

        resp.json::<Slide>()
            .await
            .map_err(|e| SaveError::Parse(e.to_string()))
    }
}

fn extract_error(body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| {
            v.get("detail")
                .or_else(|| v.get("error"))?
                .as_str()
                .map(|s| s.to_string())
        })
        .unwrap_or_else(|| body.to_string())
}
