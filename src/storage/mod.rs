//! Local PDF storage
//!
//! Uploaded files live in a flat directory under sanitized, UUID-prefixed
//! names. There is no manifest: existence is determined by listing the
//! directory, and the recent-files view is recomputed per request.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::{AppError, Result};

/// How many entries the recent-files view shows.
pub const RECENT_LIMIT: usize = 5;

/// An entry in the recent-files listing.
#[derive(Debug, Clone)]
pub struct RecentFile {
    /// Stored filename, as used in /view and /pdf routes.
    pub name: String,
    /// Original filename with the UUID prefix stripped.
    pub display_name: String,
    /// Last modification time.
    pub modified: DateTime<Utc>,
}

/// Flat-directory storage for uploaded PDFs.
#[derive(Clone)]
pub struct FileLibrary {
    upload_dir: PathBuf,
    max_upload_bytes: u64,
}

impl FileLibrary {
    /// Open (and create if missing) the upload directory.
    pub fn new(upload_dir: impl Into<PathBuf>, max_upload_bytes: u64) -> Result<Self> {
        let upload_dir = upload_dir.into();
        std::fs::create_dir_all(&upload_dir)?;
        Ok(Self {
            upload_dir,
            max_upload_bytes,
        })
    }

    pub fn upload_dir(&self) -> &Path {
        &self.upload_dir
    }

    pub fn max_upload_bytes(&self) -> u64 {
        self.max_upload_bytes
    }

    /// Validate and persist an upload. Returns the stored filename.
    ///
    /// Repeated uploads of the same original name coexist: each upload is
    /// stored under a fresh `<uuid>_<sanitized>` name.
    pub async fn store(&self, original_name: &str, bytes: &[u8]) -> Result<String> {
        let sanitized = sanitize_file_name(original_name);
        if sanitized.is_empty() {
            return Err(AppError::BadRequest("No file selected".to_string()));
        }
        if !has_pdf_extension(&sanitized) {
            return Err(AppError::BadRequest(
                "Invalid file type. Please upload a PDF file.".to_string(),
            ));
        }
        if bytes.len() as u64 > self.max_upload_bytes {
            return Err(AppError::BadRequest(format!(
                "File too large: {} bytes exceeds the {} byte limit",
                bytes.len(),
                self.max_upload_bytes
            )));
        }

        let stored_name = format!("{}_{}", Uuid::new_v4(), sanitized);
        let path = self.upload_dir.join(&stored_name);
        tokio::fs::write(&path, bytes).await?;

        tracing::info!(
            file = %stored_name,
            size = bytes.len(),
            "Stored uploaded PDF"
        );

        Ok(stored_name)
    }

    /// Resolve a requested filename to a path inside the upload directory.
    ///
    /// The name is sanitized with the same policy as uploads; a request
    /// whose name does not survive sanitization unchanged is treated as
    /// not found, so traversal sequences can never escape the directory.
    pub fn resolve(&self, requested: &str) -> Result<PathBuf> {
        let sanitized = sanitize_file_name(requested);
        if sanitized.is_empty() || sanitized != requested {
            return Err(AppError::NotFound(format!("PDF not found: {}", requested)));
        }
        let path = self.upload_dir.join(&sanitized);
        if !path.starts_with(&self.upload_dir) {
            return Err(AppError::NotFound(format!("PDF not found: {}", requested)));
        }
        Ok(path)
    }

    /// Read a stored PDF's bytes.
    pub async fn read(&self, requested: &str) -> Result<Vec<u8>> {
        let path = self.resolve(requested)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(AppError::NotFound(format!("PDF not found: {}", requested)))
            }
            Err(e) => Err(e.into()),
        }
    }

    /// List the most recently modified PDFs, newest first.
    ///
    /// Recomputed from the directory on every call, so externally deleted
    /// files never show up.
    pub async fn recent(&self, limit: usize) -> Vec<RecentFile> {
        let mut entries = match tokio::fs::read_dir(&self.upload_dir).await {
            Ok(entries) => entries,
            Err(e) => {
                tracing::warn!("Failed to list upload directory: {}", e);
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        while let Ok(Some(entry)) = entries.next_entry().await {
            let name = match entry.file_name().to_str() {
                Some(name) => name.to_string(),
                None => continue,
            };
            if !has_pdf_extension(&name) {
                continue;
            }
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(_) => continue,
            };
            files.push(RecentFile {
                display_name: display_name(&name),
                name,
                modified: DateTime::<Utc>::from(modified),
            });
        }

        files.sort_by(|a, b| b.modified.cmp(&a.modified));
        files.truncate(limit);
        files
    }
}

/// Strip path components and collapse unsafe characters.
///
/// Keeps only `[A-Za-z0-9._-]`; everything else becomes `_`. Leading dots
/// are stripped so the result never names a hidden file or `..`.
pub fn sanitize_file_name(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);

    let cleaned: String = base
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '.' || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    cleaned.trim_start_matches('.').to_string()
}

/// Case-insensitive `.pdf` extension check.
pub fn has_pdf_extension(name: &str) -> bool {
    let lower = name.to_ascii_lowercase();
    lower.ends_with(".pdf") && lower.len() > 4
}

/// Strip the `<uuid>_` prefix added at store time, if present.
pub fn display_name(stored_name: &str) -> String {
    if let Some((prefix, rest)) = stored_name.split_once('_') {
        if prefix.len() == 36 && Uuid::parse_str(prefix).is_ok() && !rest.is_empty() {
            return rest.to_string();
        }
    }
    stored_name.to_string()
}
