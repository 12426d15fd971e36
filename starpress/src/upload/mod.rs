//! Image upload client for the content service.
//!
//! This module implements the client half of the upload flow: local validation of the
//! selected file, a cancelable multipart transfer to the backend upload endpoint, and
//! byte-level progress reporting while the payload streams out. The backend stores the
//! object and answers with a receipt; callers only consume the resulting URL.
//!
//! The client performs no retries. Progress callbacks are advisory: they arrive zero or
//! more times, with non-decreasing percentages, before the single terminal outcome.

pub mod client;
pub mod progress;

pub use client::{ALLOWED_IMAGE_TYPES, MAX_FILE_SIZE, UploadClient, UploadError, UploadFile, UploadReceipt};
pub use progress::{ProgressEvent, ProgressFn};
