//! Image hosting client for listing photos.
//!
//! Files are posted as unsigned multipart uploads (`file` + `upload_preset`)
//! and the host answers with a `secure_url`. Limits are checked locally
//! before anything is sent.

use async_trait::async_trait;
use mime::Mime;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::config::UploadConfig;
use crate::listings::submission::MAX_IMAGES;

pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageFile {
    pub file_name: String,
    pub content_type: Option<Mime>,
    pub bytes: Vec<u8>,
}

impl ImageFile {
    pub fn new(file_name: impl Into<String>, content_type: Option<Mime>, bytes: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            content_type,
            bytes,
        }
    }

    pub fn validate(&self) -> Result<(), UploadError> {
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge {
                file_name: self.file_name.clone(),
                size: self.bytes.len(),
            });
        }
        match &self.content_type {
            Some(content_type) if content_type.type_() == mime::IMAGE => Ok(()),
            other => Err(UploadError::NotAnImage {
                file_name: self.file_name.clone(),
                content_type: other.as_ref().map(ToString::to_string),
            }),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("{file_name} exceeds the 5MB limit ({size} bytes)")]
    TooLarge { file_name: String, size: usize },
    #[error("{file_name} is not an image ({})", .content_type.as_deref().unwrap_or("unknown type"))]
    NotAnImage {
        file_name: String,
        content_type: Option<String>,
    },
    #[error("upload rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("upload response was not understood: {0}")]
    MalformedResponse(String),
    #[error("upload transport failed: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Stores one image and returns its public URL.
#[async_trait]
pub trait ImageUploader: Send + Sync {
    async fn upload(&self, file: &ImageFile) -> Result<String, UploadError>;
}

pub struct HttpImageUploader {
    client: reqwest::Client,
    endpoint: String,
    preset: String,
}

#[derive(Debug, Deserialize)]
struct UploadResponse {
    secure_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

impl HttpImageUploader {
    pub fn new(config: &UploadConfig) -> Self {
        Self::with_client(reqwest::Client::new(), &config.endpoint, &config.preset)
    }

    pub fn with_client(client: reqwest::Client, endpoint: &str, preset: &str) -> Self {
        Self {
            client,
            endpoint: endpoint.to_string(),
            preset: preset.to_string(),
        }
    }
}

#[async_trait]
impl ImageUploader for HttpImageUploader {
    async fn upload(&self, file: &ImageFile) -> Result<String, UploadError> {
        file.validate()?;

        let mut part = Part::bytes(file.bytes.clone()).file_name(file.file_name.clone());
        if let Some(content_type) = &file.content_type {
            part = part.mime_str(content_type.as_ref())?;
        }
        let form = Form::new()
            .part("file", part)
            .text("upload_preset", self.preset.clone());

        let response = self
            .client
            .post(&self.endpoint)
            .multipart(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorEnvelope>(&body)
                .ok()
                .and_then(|envelope| envelope.error)
                .and_then(|error| error.message)
                .unwrap_or_else(|| "Image upload failed".to_string());
            return Err(UploadError::Rejected {
                status: status.as_u16(),
                message,
            });
        }

        let payload: UploadResponse = response.json().await?;
        let url = payload
            .secure_url
            .ok_or_else(|| UploadError::MalformedResponse("missing secure_url".to_string()))?;
        debug!(file = %file.file_name, %url, "image uploaded");
        Ok(url)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum FileOutcome {
    Uploaded { url: String },
    Failed { error: String },
    /// Beyond the per-listing image limit; never sent.
    Skipped,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FileReport {
    pub file_name: String,
    #[serde(flatten)]
    pub outcome: FileOutcome,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadBatch {
    pub files: Vec<FileReport>,
}

impl UploadBatch {
    pub fn urls(&self) -> Vec<String> {
        self.files
            .iter()
            .filter_map(|report| match &report.outcome {
                FileOutcome::Uploaded { url } => Some(url.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn failures(&self) -> usize {
        self.files
            .iter()
            .filter(|report| matches!(report.outcome, FileOutcome::Failed { .. }))
            .count()
    }
}

/// Uploads up to `MAX_IMAGES - existing` files, one at a time.
///
/// A failing file is reported and the batch carries on with the next one.
pub async fn upload_batch(
    uploader: &dyn ImageUploader,
    existing: usize,
    files: Vec<ImageFile>,
) -> UploadBatch {
    let remaining = MAX_IMAGES.saturating_sub(existing);
    let mut batch = UploadBatch::default();

    for (index, file) in files.into_iter().enumerate() {
        let outcome = if index >= remaining {
            FileOutcome::Skipped
        } else {
            match uploader.upload(&file).await {
                Ok(url) => FileOutcome::Uploaded { url },
                Err(err) => {
                    warn!(file = %file.file_name, error = %err, "image upload failed");
                    FileOutcome::Failed {
                        error: err.to_string(),
                    }
                }
            }
        };
        batch.files.push(FileReport {
            file_name: file.file_name,
            outcome,
        });
    }

    batch
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn png(name: &str, size: usize) -> ImageFile {
        ImageFile::new(name, Some(mime::IMAGE_PNG), vec![0u8; size])
    }

    fn uploader(server: &MockServer) -> HttpImageUploader {
        HttpImageUploader::with_client(
            reqwest::Client::new(),
            &format!("{}/v1_1/demo/image/upload", server.uri()),
            "house_rent",
        )
    }

    #[test]
    fn oversized_and_non_image_files_fail_validation() {
        assert!(matches!(
            png("big.png", MAX_IMAGE_BYTES + 1).validate(),
            Err(UploadError::TooLarge { .. })
        ));
        let text = ImageFile::new("notes.txt", Some(mime::TEXT_PLAIN), vec![1, 2, 3]);
        assert!(matches!(text.validate(), Err(UploadError::NotAnImage { .. })));
        assert!(png("ok.png", MAX_IMAGE_BYTES).validate().is_ok());
    }

    #[tokio::test]
    async fn successful_upload_returns_secure_url() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1_1/demo/image/upload"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://res.example/house.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let url = uploader(&server)
            .upload(&png("house.png", 128))
            .await
            .expect("upload succeeds");
        assert_eq!(url, "https://res.example/house.png");
    }

    #[tokio::test]
    async fn rejected_upload_surfaces_host_message() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "error": { "message": "Upload preset not found" }
            })))
            .mount(&server)
            .await;

        let err = uploader(&server)
            .upload(&png("house.png", 128))
            .await
            .unwrap_err();
        match err {
            UploadError::Rejected { status, message } => {
                assert_eq!(status, 400);
                assert_eq!(message, "Upload preset not found");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[tokio::test]
    async fn batch_reports_each_file_and_respects_remaining_slots() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "secure_url": "https://res.example/ok.png"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let files = vec![
            png("too-big.png", MAX_IMAGE_BYTES + 10),
            png("fine.png", 64),
            png("extra.png", 64),
        ];
        let batch = upload_batch(&uploader(&server), 3, files).await;

        assert_eq!(batch.files.len(), 3);
        assert!(matches!(batch.files[0].outcome, FileOutcome::Failed { .. }));
        assert_eq!(batch.urls(), vec!["https://res.example/ok.png".to_string()]);
        assert_eq!(batch.files[2].outcome, FileOutcome::Skipped);
        assert_eq!(batch.failures(), 1);
    }
}
