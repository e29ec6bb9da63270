//! Typed operations against the presentation backend.

use crate::endpoints::{AUTH_URL, api_url};
use crate::{ApiClient, ApiRequest, Auth, FilePart, HttpTransport};
use pagedeck_core::AuditLog;
use pagedeck_error::{ApiError, ApiErrorKind};
use serde_json::{Value, json};
use std::collections::HashSet;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, instrument, warn};

/// Theme applied to every new presentation.
pub const DEFAULT_THEME_ID: &str = "a6bff6e5-3afc-4336-830b-fbc710081012";

/// Title given to new presentations.
const DEFAULT_TITLE: &str = "Untiled Presentation";

/// Account credentials for the presentation service.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    /// Project API key sent with the token request
    pub api_key: String,
    /// Account e-mail
    pub email: String,
    /// Account password
    pub password: String,
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

/// Typed wrapper over [`ApiClient`] for each backend operation.
///
/// Each method performs exactly one call and appends exactly one audit entry.
#[derive(Clone)]
pub struct AlaiApi {
    client: ApiClient,
}

impl AlaiApi {
    /// Create the API over a transport.
    pub fn new(transport: Arc<dyn HttpTransport>) -> Self {
        Self {
            client: ApiClient::new(transport),
        }
    }

    /// The underlying call layer.
    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    /// Exchange account credentials for a bearer token.
    #[instrument(skip_all)]
    pub async fn authenticate(
        &self,
        audit: &mut AuditLog,
        credentials: &Credentials,
    ) -> Result<String, ApiError> {
        info!("Authenticating to Alai API");
        let body = json!({
            "email": credentials.email,
            "password": credentials.password,
            "gotrue_meta_security": {},
        });
        let token = self
            .client
            .call(
                audit,
                "authentication",
                Auth::ApiKey(&credentials.api_key),
                ApiRequest::post_json(AUTH_URL, body),
                |r| {
                    r.body["access_token"]
                        .as_str()
                        .map(str::to_string)
                        .ok_or_else(|| "Authentication response has no access_token".to_string())
                },
            )
            .await?;
        info!("Authentication successful");
        Ok(token)
    }

    /// Ids of the account's existing presentations.
    #[instrument(skip_all)]
    pub async fn list_presentations(
        &self,
        audit: &mut AuditLog,
        token: &str,
    ) -> Result<HashSet<String>, ApiError> {
        info!("Getting existing presentations list");
        let ids = self
            .client
            .call(
                audit,
                "get_existing_presentations",
                Auth::Bearer(token),
                ApiRequest::get(api_url("/get-presentations-list")),
                |r| {
                    let list = r
                        .body
                        .as_array()
                        .ok_or_else(|| "Presentations list is not an array".to_string())?;
                    Ok(list
                        .iter()
                        .filter_map(|p| p["id"].as_str().map(str::to_string))
                        .collect::<HashSet<_>>())
                },
            )
            .await?;
        info!(count = ids.len(), "Retrieved existing presentations");
        Ok(ids)
    }

    /// Create an empty presentation with the default theme and a first slide.
    #[instrument(skip(self, audit, token))]
    pub async fn create_presentation(
        &self,
        audit: &mut AuditLog,
        token: &str,
        presentation_id: &str,
    ) -> Result<Value, ApiError> {
        info!("Creating new presentation");
        let body = json!({
            "presentation_id": presentation_id,
            "presentation_title": DEFAULT_TITLE,
            "create_first_slide": true,
            "theme_id": DEFAULT_THEME_ID,
            "default_color_set_id": 0,
        });
        self.client
            .call_json(
                audit,
                "create_new_presentation",
                Auth::Bearer(token),
                ApiRequest::post_json(api_url("/create-new-presentation"), body),
            )
            .await
    }

    /// Fetch the presentation and return the id of its first slide.
    ///
    /// A presentation without slides is rejected.
    #[instrument(skip(self, audit, token))]
    pub async fn first_slide_id(
        &self,
        audit: &mut AuditLog,
        token: &str,
        presentation_id: &str,
    ) -> Result<String, ApiError> {
        info!("Getting presentation details");
        self.client
            .call(
                audit,
                "get_presentation_details",
                Auth::Bearer(token),
                ApiRequest::get(api_url(&format!("/get-presentation/{}", presentation_id))),
                |r| {
                    r.body["slides"]
                        .as_array()
                        .and_then(|slides| slides.first())
                        .and_then(|slide| slide["id"].as_str())
                        .map(str::to_string)
                        .ok_or_else(|| "No slides found in the presentation".to_string())
                },
            )
            .await
    }

    /// Questions the service asks about the presentation's intent.
    #[instrument(skip(self, audit, token))]
    pub async fn presentation_questions(
        &self,
        audit: &mut AuditLog,
        token: &str,
        presentation_id: &str,
    ) -> Result<Vec<Value>, ApiError> {
        info!("Getting presentation questions");
        self.client
            .call(
                audit,
                "get_presentation_questions",
                Auth::Bearer(token),
                ApiRequest::get(api_url(&format!(
                    "/get-presentation-questions/{}",
                    presentation_id
                ))),
                |r| {
                    r.body
                        .as_array()
                        .cloned()
                        .ok_or_else(|| "Presentation questions are not an array".to_string())
                },
            )
            .await
    }

    /// Sample text used to calibrate tone and verbosity.
    #[instrument(skip(self, audit, token, raw_context))]
    pub async fn calibration_sample(
        &self,
        audit: &mut AuditLog,
        token: &str,
        presentation_id: &str,
        raw_context: &str,
    ) -> Result<Value, ApiError> {
        info!("Getting calibration sample text");
        let body = json!({
            "presentation_id": presentation_id,
            "raw_context": raw_context,
        });
        self.client
            .call_json(
                audit,
                "get_calibration_sample_text",
                Auth::Bearer(token),
                ApiRequest::post_json(api_url("/get-calibration-sample-text"), body),
            )
            .await
    }

    /// Upload JPEG files for slide generation.
    ///
    /// Files are read up front and released as soon as the request is built.
    /// An unreadable file fails the whole upload.
    #[instrument(skip(self, audit, token, paths), fields(files = paths.len()))]
    pub async fn upload_images(
        &self,
        audit: &mut AuditLog,
        token: &str,
        presentation_id: &str,
        paths: &[PathBuf],
    ) -> Result<Value, ApiError> {
        const STEP: &str = "upload_images_to_presentation";
        info!("Uploading images to presentation");

        let mut files = Vec::with_capacity(paths.len());
        for path in paths {
            let bytes = match tokio::fs::read(path).await {
                Ok(bytes) => bytes,
                Err(e) => {
                    let kind = ApiErrorKind::Upload(format!("{}: {}", path.display(), e));
                    warn!("{}", kind);
                    audit.record_failure(STEP, Value::Null, kind.to_string());
                    return Err(ApiError::new(STEP, kind));
                }
            };
            let file_name = path
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "image.jpg".to_string());
            files.push(FilePart {
                field: "files".to_string(),
                file_name,
                mime: "image/jpeg".to_string(),
                bytes,
            });
        }

        let upload_input = json!({ "presentation_id": presentation_id }).to_string();
        let request = ApiRequest::post_multipart(
            api_url("/upload-images-for-slide-generation"),
            files,
            vec![("upload_input".to_string(), upload_input)],
        );

        let uploaded = self
            .client
            .call_json(audit, STEP, Auth::Bearer(token), request)
            .await?;
        info!("Successfully uploaded images");
        Ok(uploaded)
    }

    /// Make `variant_id` the active rendering of `slide_id`.
    #[instrument(skip(self, audit, token))]
    pub async fn set_active_variant(
        &self,
        audit: &mut AuditLog,
        token: &str,
        slide_id: &str,
        variant_id: &str,
    ) -> Result<Value, ApiError> {
        let body = json!({ "slide_id": slide_id, "variant_id": variant_id });
        let result = self
            .client
            .call_json(
                audit,
                "set_active_variant",
                Auth::Bearer(token),
                ApiRequest::post_json(api_url("/set-active-variant"), body),
            )
            .await?;
        info!("Set active variant {} for slide {}", variant_id, slide_id);
        Ok(result)
    }

    /// Push an updated slide entity back to the service.
    #[instrument(skip(self, audit, token, entity))]
    pub async fn update_slide_entity(
        &self,
        audit: &mut AuditLog,
        token: &str,
        entity: Value,
    ) -> Result<Value, ApiError> {
        self.client
            .call_json(
                audit,
                "update_slide_entity",
                Auth::Bearer(token),
                ApiRequest::post_json(api_url("/update-slide-entity"), entity),
            )
            .await
    }

    /// Create (or fetch) the share code for a presentation.
    #[instrument(skip(self, audit, token))]
    pub async fn share_presentation(
        &self,
        audit: &mut AuditLog,
        token: &str,
        presentation_id: &str,
    ) -> Result<String, ApiError> {
        info!("Generating shareable link");
        let body = json!({ "presentation_id": presentation_id });
        self.client
            .call(
                audit,
                "generate_shareable_link",
                Auth::Bearer(token),
                ApiRequest::post_json(api_url("/upsert-presentation-share"), body).text_response(),
                |r| match r.body.as_str() {
                    Some(code) if !code.is_empty() => Ok(code.to_string()),
                    _ => Err("Share response carried no code".to_string()),
                },
            )
            .await
    }
}
