//! Ingestion pipeline: uploaded files become self-contained `data:` URLs so
//! records can carry them without any file system or object store.

use base64::{engine::general_purpose::STANDARD, Engine};
use std::path::{Path, PathBuf};
use thiserror::Error;

const FALLBACK_MIME: &str = "application/octet-stream";

#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read '{path}': {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("uploaded file '{0}' is empty")]
    Empty(String),
    #[error("not a base64 data URL")]
    InvalidDataUrl,
    #[error("file processing task failed: {0}")]
    Task(String),
}

/// A file received from a form, already buffered.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Upload {
    pub fn into_data_url(self) -> Result<String, IngestError> {
        if self.bytes.is_empty() {
            return Err(IngestError::Empty(self.file_name));
        }
        let mime = self
            .content_type
            .filter(|ct| !ct.is_empty() && ct != FALLBACK_MIME)
            .unwrap_or_else(|| detect_mime(&self.bytes, &self.file_name).to_string());
        Ok(encode_data_url(&self.bytes, &mime))
    }
}

pub fn encode_data_url(bytes: &[u8], mime: &str) -> String {
    format!("data:{};base64,{}", mime, STANDARD.encode(bytes))
}

/// Encode an upload off the async executor; large files make base64 slow.
pub async fn embed(upload: Upload) -> Result<String, IngestError> {
    tokio::task::spawn_blocking(move || upload.into_data_url())
        .await
        .map_err(|e| IngestError::Task(e.to_string()))?
}

/// Split a base64 data URL back into its MIME type and bytes.
pub fn decode_data_url(url: &str) -> Result<(String, Vec<u8>), IngestError> {
    let rest = url.strip_prefix("data:").ok_or(IngestError::InvalidDataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(IngestError::InvalidDataUrl)?;
    let mime = header
        .strip_suffix(";base64")
        .ok_or(IngestError::InvalidDataUrl)?;
    let bytes = STANDARD
        .decode(payload)
        .map_err(|_| IngestError::InvalidDataUrl)?;
    Ok((mime.to_string(), bytes))
}

/// Read a file from disk and embed it.
pub async fn file_to_data_url(path: impl AsRef<Path>) -> Result<String, IngestError> {
    let path = path.as_ref();
    let bytes = tokio::fs::read(path).await.map_err(|source| IngestError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    tracing::debug!(file = %file_name, size = bytes.len(), "embedding file");

    Upload {
        file_name,
        content_type: None,
        bytes,
    }
    .into_data_url()
}

fn sniff_magic_bytes(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [0x89, 0x50, 0x4E, 0x47, ..] => Some("image/png"),
        [0x47, 0x49, 0x46, 0x38, ..] => Some("image/gif"),
        [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => Some("image/webp"),
        [0x25, 0x50, 0x44, 0x46, ..] => Some("application/pdf"),
        _ => None,
    }
}

fn mime_from_extension(file_name: &str) -> Option<&'static str> {
    let (_, ext) = file_name.rsplit_once('.')?;
    match ext.to_lowercase().as_str() {
        "jpg" | "jpeg" => Some("image/jpeg"),
        "png" => Some("image/png"),
        "gif" => Some("image/gif"),
        "webp" => Some("image/webp"),
        "svg" => Some("image/svg+xml"),
        "pdf" => Some("application/pdf"),
        "txt" => Some("text/plain"),
        "md" => Some("text/markdown"),
        "html" | "htm" => Some("text/html"),
        "epub" => Some("application/epub+zip"),
        "doc" => Some("application/msword"),
        "docx" => {
            Some("application/vnd.openxmlformats-officedocument.wordprocessingml.document")
        }
        "mp4" => Some("video/mp4"),
        "mp3" => Some("audio/mpeg"),
        _ => None,
    }
}

/// Content sniffing first, then the file extension.
pub fn detect_mime(bytes: &[u8], file_name: &str) -> &'static str {
    sniff_magic_bytes(bytes)
        .or_else(|| mime_from_extension(file_name))
        .unwrap_or(FALLBACK_MIME)
}
