use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_multipart::Multipart;
use chrono::Utc;
use futures_util::TryStreamExt;
use tokio::fs;
use tokio::sync::mpsc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::constants::{is_default_asset, ALLOWED_IMAGE_MIME_TYPES, UPLOAD_TAG};
use crate::email::{cleanup_notice, Mailer};
use crate::errors::ApiError;

/// Where an uploaded asset belongs, and which multipart field carries it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AssetKind {
    CourseImage,
    CourseIcon,
    InstructorImage,
}

impl AssetKind {
    fn dir(self) -> &'static str {
        match self {
            AssetKind::CourseImage => "images/courses/images",
            AssetKind::CourseIcon => "images/courses/icons",
            AssetKind::InstructorImage => "images/instructors",
        }
    }

    pub fn field_name(self) -> &'static str {
        match self {
            AssetKind::CourseImage => "courseImage",
            AssetKind::CourseIcon => "courseIcon",
            AssetKind::InstructorImage => "instructorImage",
        }
    }
}

/// Rejects anything outside the image allow-list before a byte hits disk.
pub fn validate_mime(mime: &str) -> Result<(), ApiError> {
    if ALLOWED_IMAGE_MIME_TYPES.contains(&mime) {
        return Ok(());
    }
    Err(ApiError::Validation(format!(
        "Invalid image type. Need to be one of these:{}",
        ALLOWED_IMAGE_MIME_TYPES
            .iter()
            .map(|allowed| format!(" {allowed}"))
            .collect::<String>()
    )))
}

pub struct ReceivedImage {
    pub original_name: String,
    pub bytes: Vec<u8>,
}

/// Pulls the expected single file field out of a multipart body. The
/// content type is checked from the part headers, so a disallowed upload is
/// rejected before its body is read.
pub async fn read_image_field(
    multipart: &mut Multipart,
    expected: &str,
) -> Result<ReceivedImage, ApiError> {
    while let Some(mut field) = multipart.try_next().await.map_err(broken_payload)? {
        if field.name() != expected {
            // drain the unexpected part so the stream can move on
            while field.try_next().await.map_err(broken_payload)?.is_some() {}
            continue;
        }

        let mime = field
            .content_type()
            .map(|m| m.essence_str().to_string())
            .unwrap_or_default();
        validate_mime(&mime)?;

        let original_name = field
            .content_disposition()
            .get_filename()
            .unwrap_or("upload")
            .to_string();

        let mut bytes = Vec::new();
        while let Some(chunk) = field.try_next().await.map_err(broken_payload)? {
            bytes.extend_from_slice(&chunk);
        }
        return Ok(ReceivedImage { original_name, bytes });
    }

    Err(ApiError::Validation(format!("Expected a file field named {expected}.")))
}

fn broken_payload(err: actix_multipart::MultipartError) -> ApiError {
    ApiError::Validation(format!("Broken multipart payload: {err}"))
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredImage {
    pub path: PathBuf,
    pub public_url: String,
}

/// Filesystem half of the upload pipeline. Uploads land in a temp file
/// under the store root and are renamed into their per-entity directory, so
/// the rename never crosses filesystems.
#[derive(Debug, Clone)]
pub struct ImageStore {
    root: PathBuf,
}

impl ImageStore {
    pub async fn new(root: PathBuf) -> std::io::Result<ImageStore> {
        fs::create_dir_all(root.join("tmp")).await?;
        for kind in [AssetKind::CourseImage, AssetKind::CourseIcon, AssetKind::InstructorImage] {
            fs::create_dir_all(root.join(kind.dir())).await?;
        }
        Ok(ImageStore { root })
    }

    pub async fn save_temp(&self, bytes: &[u8]) -> Result<PathBuf, ApiError> {
        let path = self.root.join("tmp").join(Uuid::new_v4().to_string());
        fs::write(&path, bytes).await.map_err(|e| {
            error!(error = %e, "temp write failed");
            ApiError::Internal("Could not store the uploaded image. Please try again later.".to_string())
        })?;
        Ok(path)
    }

    /// Renames a temp file into its permanent location. On failure the temp
    /// file is left behind for manual cleanup.
    pub async fn promote(
        &self,
        temp: &Path,
        kind: AssetKind,
        original_name: &str,
    ) -> Result<StoredImage, ApiError> {
        let name = format!(
            "{}_{}_{}",
            Utc::now().timestamp(),
            UPLOAD_TAG,
            sanitize_filename(original_name)
        );
        let path = self.root.join(kind.dir()).join(&name);
        fs::rename(temp, &path).await.map_err(|e| {
            error!(error = %e, temp = %temp.display(), "rename to permanent location failed");
            ApiError::Internal("Could not store the uploaded image. Please try again later.".to_string())
        })?;

        Ok(StoredImage { path, public_url: format!("static/{}/{}", kind.dir(), name) })
    }

    /// Removes a just-promoted file after a failed document update, so no
    /// orphaned asset stays behind. Failures are logged only.
    pub async fn discard(&self, path: &Path) {
        if let Err(e) = remove_if_exists(path).await {
            warn!(error = %e, path = %path.display(), "could not discard uploaded image");
        }
    }

    /// Maps a stored public url back to a filesystem path. Platform default
    /// assets and foreign urls resolve to nothing, they are never unlinked.
    pub fn resolve_custom(&self, public_url: &str) -> Option<PathBuf> {
        if is_default_asset(public_url) {
            return None;
        }
        let rest = public_url.strip_prefix("static/")?;
        if rest.contains("..") {
            return None;
        }
        Some(self.root.join(rest))
    }
}

fn sanitize_filename(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or("upload");
    let base = base.replace("..", "_");
    if base.is_empty() {
        "upload".to_string()
    } else {
        base
    }
}

/// Idempotent unlink: deleting a file that is already gone is a success.
pub async fn remove_if_exists(path: &Path) -> std::io::Result<bool> {
    match fs::remove_file(path).await {
        Ok(()) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(e),
    }
}

/// Background queue for old-asset removal. Replacement and delete paths
/// enqueue here and answer the client immediately; the worker unlinks and
/// escalates failures to the operator by email.
#[derive(Clone)]
pub struct CleanupQueue {
    tx: mpsc::UnboundedSender<PathBuf>,
}

impl CleanupQueue {
    pub fn start(mailer: Arc<dyn Mailer>, operator_email: String) -> CleanupQueue {
        let (tx, mut rx) = mpsc::unbounded_channel::<PathBuf>();

        tokio::spawn(async move {
            while let Some(path) = rx.recv().await {
                match remove_if_exists(&path).await {
                    Ok(true) => debug!(path = %path.display(), "removed stale image"),
                    Ok(false) => debug!(path = %path.display(), "stale image already absent"),
                    Err(e) => {
                        error!(error = %e, path = %path.display(), "could not remove stale image");
                        let notice = cleanup_notice(&operator_email, &path);
                        if let Err(mail_err) = mailer.send(notice).await {
                            error!(error = %mail_err, "could not send cleanup escalation email");
                        }
                    }
                }
            }
        });

        CleanupQueue { tx }
    }

    pub fn enqueue(&self, path: PathBuf) {
        if self.tx.send(path).is_err() {
            warn!("cleanup worker is gone, dropping unlink request");
        }
    }
}
