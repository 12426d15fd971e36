//! The upload client itself: validation, transmission, and response translation.

use bytes::Bytes;
use reqwest::multipart::{Form, Part};
use serde::Deserialize;
use thiserror::Error as ThisError;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::session::SessionStore;
use crate::upload::progress::{ProgressFn, progress_stream};

/// Hard cap on accepted file size: 5 MiB.
pub const MAX_FILE_SIZE: u64 = 5 * 1024 * 1024;

/// Image formats the content service will store.
pub const ALLOWED_IMAGE_TYPES: [&str; 5] = ["image/jpeg", "image/png", "image/gif", "image/webp", "image/avif"];

/// Multipart field name the backend reads the file from.
const FILE_FIELD: &str = "file";

/// Logical storage prefix for blog assets on the backend.
const UPLOAD_PREFIX: &str = "blog";

#[derive(ThisError, Debug)]
pub enum UploadError {
    /// The selected file carries no bytes
    #[error("no file provided")]
    MissingFile,

    /// The file is larger than the backend will accept
    #[error("file size exceeds maximum allowed ({}MB)", MAX_FILE_SIZE / (1024 * 1024))]
    FileTooLarge,

    /// The file's media type is outside the image allow-list
    #[error("unsupported file type {content_type:?}, allowed: jpg, png, gif, webp, avif")]
    UnsupportedType { content_type: String },

    /// No credential is present in the session store
    #[error("authentication required, please login first")]
    AuthenticationRequired,

    /// The caller aborted the transfer before it completed
    #[error("upload cancelled")]
    Cancelled,

    /// Transport-level failure, no response was received
    #[error("network error during upload")]
    Network(#[source] reqwest::Error),

    /// The backend answered 2xx but the body was not a valid receipt
    #[error("failed to parse upload response")]
    ResponseParse,

    /// The backend rejected the upload
    #[error("{message}")]
    Backend { status: u16, message: String },
}

/// A binary payload selected for upload.
#[derive(Debug, Clone)]
pub struct UploadFile {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Bytes,
}

/// Backend receipt for a stored object.
///
/// Callers only consume `url`; the remaining fields are carried for completeness and
/// tolerate absence.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub url: String,
    #[serde(default)]
    pub key: Option<String>,
    #[serde(default)]
    pub content_type: Option<String>,
    #[serde(default)]
    pub size: Option<u64>,
}

#[derive(Debug, Deserialize)]
struct BackendErrorBody {
    error: String,
}

/// Validates and transmits image files to the content service upload endpoint,
/// reporting progress and honoring cancellation.
///
/// One transfer per [`upload`](UploadClient::upload) call; concurrent calls are
/// independent and share only the HTTP connection pool.
pub struct UploadClient {
    http: reqwest::Client,
    endpoint: Url,
    session: SessionStore,
}

impl UploadClient {
    /// Build with a default HTTP client.
    ///
    /// Errors if `base_url` cannot serve as a base for the upload path, e.g. a
    /// `data:` or `mailto:` URL.
    pub fn new(base_url: Url, session: SessionStore) -> Result<Self, url::ParseError> {
        crate::ensure_crypto_provider();
        Self::with_client(reqwest::Client::new(), base_url, session)
    }

    /// Build with a caller-supplied client (custom timeouts, proxies, TLS settings).
    pub fn with_client(http: reqwest::Client, base_url: Url, session: SessionStore) -> Result<Self, url::ParseError> {
        let mut endpoint = base_url.join("/api/uploads")?;
        endpoint.query_pairs_mut().append_pair("prefix", UPLOAD_PREFIX);

        Ok(Self { http, endpoint, session })
    }

    /// Upload one file, resolving to the URL of the stored resource.
    ///
    /// All validation happens before any network traffic. `on_progress`, when provided,
    /// is invoked with non-decreasing percentages as payload bytes are handed to the
    /// transport. If `cancel` fires before the transfer completes the call returns
    /// [`UploadError::Cancelled`]; cancelling after completion has no effect.
    ///
    /// Exactly one terminal outcome is produced per call. No retries are performed;
    /// retry policy belongs to the caller.
    pub async fn upload(
        &self,
        file: UploadFile,
        on_progress: Option<ProgressFn>,
        cancel: Option<CancellationToken>,
    ) -> Result<String, UploadError> {
        validate(&file)?;

        // Credential check comes after file validation, still before any transmission
        let token = self.session.token().ok_or(UploadError::AuthenticationRequired)?;

        let total = file.bytes.len() as u64;
        let content_type = file.content_type;

        let body = reqwest::Body::wrap_stream(progress_stream(file.bytes, on_progress));
        let part = Part::stream_with_length(body, total)
            .file_name(file.file_name)
            .mime_str(&content_type)
            .map_err(|_| UploadError::UnsupportedType { content_type })?;
        let form = Form::new().part(FILE_FIELD, part);

        let request = self.http.post(self.endpoint.clone()).bearer_auth(&token).multipart(form);

        let transfer = async move {
            let response = request.send().await.map_err(UploadError::Network)?;

            let status = response.status();
            if !status.is_success() {
                let status_code = status.as_u16();
                // Prefer the backend's own message, fall back to the numeric status
                let message = response
                    .text()
                    .await
                    .ok()
                    .and_then(|text| serde_json::from_str::<BackendErrorBody>(&text).ok())
                    .map(|body| body.error)
                    .unwrap_or_else(|| format!("upload failed with status {status_code}"));

                return Err(UploadError::Backend {
                    status: status_code,
                    message,
                });
            }

            let text = response.text().await.map_err(UploadError::Network)?;
            let receipt: UploadReceipt = serde_json::from_str(&text).map_err(|_| UploadError::ResponseParse)?;

            Ok(receipt.url)
        };

        match cancel {
            Some(cancel) => {
                tokio::select! {
                    biased;
                    _ = cancel.cancelled() => {
                        tracing::debug!("Upload cancelled by caller");
                        Err(UploadError::Cancelled)
                    }
                    result = transfer => result,
                }
            }
            None => transfer.await,
        }
    }
}

/// Synchronous preconditions, checked in order: presence, size, media type.
fn validate(file: &UploadFile) -> Result<(), UploadError> {
    if file.bytes.is_empty() {
        return Err(UploadError::MissingFile);
    }

    if file.bytes.len() as u64 > MAX_FILE_SIZE {
        return Err(UploadError::FileTooLarge);
    }

    if !ALLOWED_IMAGE_TYPES.contains(&file.content_type.as_str()) {
        return Err(UploadError::UnsupportedType {
            content_type: file.content_type.clone(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png(size: usize) -> UploadFile {
        UploadFile {
            file_name: "photo.png".to_string(),
            content_type: "image/png".to_string(),
            bytes: Bytes::from(vec![0u8; size]),
        }
    }

    #[test]
    fn empty_file_is_missing() {
        let mut file = png(0);
        // Presence is checked before the media type
        file.content_type = "application/pdf".to_string();
        assert!(matches!(validate(&file), Err(UploadError::MissingFile)));
    }

    #[test]
    fn size_boundary_is_inclusive() {
        assert!(validate(&png(MAX_FILE_SIZE as usize)).is_ok());
        assert!(matches!(validate(&png(MAX_FILE_SIZE as usize + 1)), Err(UploadError::FileTooLarge)));
    }

    #[test]
    fn size_is_checked_before_media_type() {
        let mut file = png(MAX_FILE_SIZE as usize + 1);
        file.content_type = "application/pdf".to_string();
        assert!(matches!(validate(&file), Err(UploadError::FileTooLarge)));
    }

    #[test]
    fn unlisted_media_type_is_rejected() {
        let mut file = png(10);
        file.content_type = "application/pdf".to_string();
        let err = validate(&file).unwrap_err();
        assert!(matches!(err, UploadError::UnsupportedType { .. }));
        assert!(err.to_string().contains("application/pdf"));
    }

    #[test]
    fn every_allowed_type_passes() {
        for content_type in ALLOWED_IMAGE_TYPES {
            let mut file = png(10);
            file.content_type = content_type.to_string();
            assert!(validate(&file).is_ok(), "{content_type} should be accepted");
        }
    }

    #[test]
    fn size_error_names_the_limit() {
        let err = validate(&png(MAX_FILE_SIZE as usize + 1)).unwrap_err();
        assert!(err.to_string().contains("5MB"), "got: {err}");
    }

    #[tokio::test]
    async fn missing_credential_fails_before_any_request() {
        // Unroutable address: reaching the network at all would error differently
        let client = UploadClient::new(Url::parse("http://127.0.0.1:1").unwrap(), SessionStore::in_memory()).unwrap();

        let err = client.upload(png(10), None, None).await.unwrap_err();
        assert!(matches!(err, UploadError::AuthenticationRequired));
    }

    #[test]
    fn construction_needs_no_process_level_tls_setup() {
        // The binary installs a crypto provider at startup; the library must not
        // depend on that having happened
        let built = UploadClient::new(Url::parse("https://uploads.example.com").unwrap(), SessionStore::in_memory());
        assert!(built.is_ok());
    }

    #[test]
    fn cannot_be_a_base_url_is_rejected_at_construction() {
        let base = Url::parse("data:text/plain,hello").unwrap();
        assert!(UploadClient::new(base, SessionStore::in_memory()).is_err());
    }
}
