use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::config::CloudinarySettings;
use crate::models::{CourseImage, ImagePayload};
use crate::utils::AppError;

pub const ALLOWED_IMAGE_TYPES: [&str; 3] = ["image/png", "image/jpg", "image/jpeg"];

/// Decoded, type-checked image ready for upload.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageUpload {
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    pub fn from_payload(payload: &ImagePayload) -> Result<Self, AppError> {
        let mime_type = payload.mime_type.trim().to_lowercase();
        if !ALLOWED_IMAGE_TYPES.contains(&mime_type.as_str()) {
            return Err(AppError::InvalidRequest(
                "Invalid image format. Only png, jpg, jpeg are allowed".to_string(),
            ));
        }

        // Accept both bare base64 and `data:<mime>;base64,<data>`
        let encoded = match payload.data.split_once(";base64,") {
            Some((prefix, data)) if prefix.starts_with("data:") => data,
            _ => payload.data.as_str(),
        };

        let bytes = STANDARD
            .decode(encoded.trim())
            .map_err(|_| AppError::InvalidRequest("Image data is not valid base64".to_string()))?;
        if bytes.is_empty() {
            return Err(AppError::InvalidRequest("No image file uploaded".to_string()));
        }

        Ok(Self { mime_type, bytes })
    }

    fn data_uri(&self) -> String {
        format!("data:{};base64,{}", self.mime_type, STANDARD.encode(&self.bytes))
    }
}

/// External object store holding course images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn upload(&self, image: &ImageUpload) -> Result<CourseImage, AppError>;
    async fn destroy(&self, public_id: &str) -> Result<(), AppError>;
}

/// Used when no object store credentials are configured.
pub struct DisabledImageStore;

#[async_trait]
impl ImageStore for DisabledImageStore {
    async fn upload(&self, _image: &ImageUpload) -> Result<CourseImage, AppError> {
        Err(AppError::Upload("Image storage is not configured".to_string()))
    }

    async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
        log::debug!("Image storage disabled, keeping {}", public_id);
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    public_id: String,
    secure_url: String,
}

#[derive(Debug, Deserialize)]
struct DestroyResponse {
    result: String,
}

/// Signs request parameters the way the Cloudinary API expects: sorted
/// `key=value` pairs joined by `&`, followed by the API secret, SHA-256 hex.
pub fn sign_params(params: &[(&str, String)], api_secret: &str) -> String {
    let mut sorted: Vec<_> = params.iter().collect();
    sorted.sort_by(|a, b| a.0.cmp(b.0));

    let to_sign = sorted
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join("&");

    format!("{:x}", Sha256::digest(format!("{}{}", to_sign, api_secret).as_bytes()))
}

pub struct CloudinaryClient {
    http: reqwest::Client,
    settings: CloudinarySettings,
}

impl CloudinaryClient {
    pub fn new(settings: CloudinarySettings) -> Self {
        Self {
            http: reqwest::Client::new(),
            settings,
        }
    }

    fn endpoint(&self, action: &str) -> String {
        format!(
            "{}/v1_1/{}/image/{}",
            self.settings.api_base.trim_end_matches('/'),
            self.settings.cloud_name,
            action
        )
    }

    /// Adds api key and signature to the signed parameters.
    fn signed_form(&self, mut params: Vec<(&'static str, String)>) -> Vec<(&'static str, String)> {
        let signature = sign_params(&params, &self.settings.api_secret);
        params.push(("api_key", self.settings.api_key.clone()));
        params.push(("signature", signature));
        params.push(("signature_algorithm", "sha256".to_string()));
        params
    }
}

#[async_trait]
impl ImageStore for CloudinaryClient {
    async fn upload(&self, image: &ImageUpload) -> Result<CourseImage, AppError> {
        let mut params = vec![("timestamp", chrono::Utc::now().timestamp().to_string())];
        if let Some(folder) = &self.settings.folder {
            params.push(("folder", folder.clone()));
        }
        let mut form = self.signed_form(params);
        form.push(("file", image.data_uri()));

        let response = self
            .http
            .post(self.endpoint("upload"))
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("Error uploading image: {}", e)))?;

        if !response.status().is_success() {
            log::warn!("⚠️  Image upload rejected: {}", response.status());
            return Err(AppError::Upload("Error uploading image".to_string()));
        }

        let uploaded: UploadResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upload(format!("Error uploading image: {}", e)))?;

        log::info!("🖼️  Image uploaded: {}", uploaded.public_id);
        Ok(CourseImage {
            public_id: uploaded.public_id,
            url: uploaded.secure_url,
        })
    }

    async fn destroy(&self, public_id: &str) -> Result<(), AppError> {
        let form = self.signed_form(vec![
            ("public_id", public_id.to_string()),
            ("timestamp", chrono::Utc::now().timestamp().to_string()),
        ]);

        let response = self
            .http
            .post(self.endpoint("destroy"))
            .form(&form)
            .send()
            .await
            .map_err(|e| AppError::Upload(format!("Error deleting image: {}", e)))?;

        let body: DestroyResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upload(format!("Error deleting image: {}", e)))?;

        match body.result.as_str() {
            "ok" | "not found" => Ok(()),
            other => Err(AppError::Upload(format!("Error deleting image: {}", other))),
        }
    }
}
