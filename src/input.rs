//! Input loading for `certverify check`: local path or URL → [`ImageRequest`].
//!
//! The CLI reuses the HTTP request shape so that a file checked from the
//! command line goes through exactly the same validation as an upload.
//! The mime type is inferred here (extension, `Content-Type`, then content
//! sniffing); if nothing looks like an image the request carries
//! `application/octet-stream` and the validator rejects it as usual.

use crate::error::CertVerifyError;
use crate::pipeline::validate::ImageRequest;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use image::ImageFormat;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const UNKNOWN_MIME: &str = "application/octet-stream";

/// Check if the input string looks like a URL.
pub fn is_url(input: &str) -> bool {
    input.starts_with("http://") || input.starts_with("https://")
}

/// Load a local file or download a URL and wrap it as an [`ImageRequest`].
pub async fn load_image(input: &str, timeout_secs: u64) -> Result<ImageRequest, CertVerifyError> {
    if is_url(input) {
        download_url(input, timeout_secs).await
    } else {
        load_local(Path::new(input)).await
    }
}

async fn load_local(path: &Path) -> Result<ImageRequest, CertVerifyError> {
    let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => CertVerifyError::FileNotFound {
            path: path.to_path_buf(),
        },
        _ => CertVerifyError::Internal(format!("Failed to read '{}': {}", path.display(), e)),
    })?;

    let mime = ImageFormat::from_path(path)
        .map(|f| f.to_mime_type())
        .unwrap_or_else(|_| sniff_mime(&bytes));
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_default();

    debug!("Loaded '{}': {} ({} bytes)", path.display(), mime, bytes.len());
    Ok(ImageRequest::new(STANDARD.encode(&bytes), filename, mime))
}

async fn download_url(url: &str, timeout_secs: u64) -> Result<ImageRequest, CertVerifyError> {
    info!("Downloading image from: {}", url);
    let failed = |reason: String| CertVerifyError::DownloadFailed {
        url: url.to_string(),
        reason,
    };

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| failed(e.to_string()))?;

    let response = client.get(url).send().await.map_err(|e| {
        if e.is_timeout() {
            failed(format!("timed out after {timeout_secs}s"))
        } else {
            failed(e.to_string())
        }
    })?;

    if !response.status().is_success() {
        return Err(failed(format!("HTTP {}", response.status())));
    }

    let header_mime = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
        .filter(|m| m.starts_with("image/"));
    let filename = filename_from_url(url);

    let bytes = response.bytes().await.map_err(|e| failed(e.to_string()))?;
    let mime = header_mime.unwrap_or_else(|| sniff_mime(&bytes).to_string());

    debug!("Downloaded '{}': {} ({} bytes)", filename, mime, bytes.len());
    Ok(ImageRequest::new(STANDARD.encode(&bytes), filename, mime))
}

fn sniff_mime(bytes: &[u8]) -> &'static str {
    image::guess_format(bytes)
        .map(|f| f.to_mime_type())
        .unwrap_or(UNKNOWN_MIME)
}

/// Last path segment of the URL, or `"downloaded"`.
fn filename_from_url(url: &str) -> String {
    reqwest::Url::parse(url)
        .ok()
        .and_then(|parsed| {
            parsed
                .path_segments()
                .and_then(|mut s| s.next_back().map(str::to_string))
        })
        .filter(|last| !last.is_empty())
        .unwrap_or_else(|| "downloaded".to_string())
}

/// Display form of an input for CLI output.
pub fn display_name(input: &str) -> String {
    if is_url(input) {
        input.to_string()
    } else {
        PathBuf::from(input).display().to_string()
    }
}
