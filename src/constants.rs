//! Platform-wide defaults shared between validation, persistence and cleanup.

pub const DEFAULT_COURSE_IMAGE_URL: &str = "static/images/defaults/course_image.png";
pub const DEFAULT_COURSE_ICON_URL: &str = "static/images/defaults/course_icon.png";
pub const DEFAULT_INSTRUCTOR_IMAGE_URL: &str = "default_img.png";

/// Uploads with any other content type are rejected before touching the disk.
pub const ALLOWED_IMAGE_MIME_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/svg+xml"];

/// Fixed tag baked into every stored image name.
pub const UPLOAD_TAG: &str = "BasicItCenter";

/// Returns true when the url is one of the platform default assets.
/// Default assets are shared between documents and must never be unlinked.
pub fn is_default_asset(url: &str) -> bool {
    url.is_empty()
        || url == DEFAULT_COURSE_IMAGE_URL
        || url == DEFAULT_COURSE_ICON_URL
        || url == DEFAULT_INSTRUCTOR_IMAGE_URL
}
