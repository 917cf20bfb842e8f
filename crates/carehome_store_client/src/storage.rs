//! Resident-photo validation and blob-store object naming.
//!
//! Uploads are gated before any bytes leave the process: extension allow-list,
//! a 5 MiB size cap, and a magic-byte check that the payload really is an
//! image of the claimed family.

use crate::StoreError;
use rand::RngExt;

pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "gif"];
pub const MAX_PHOTO_BYTES: usize = 5 * 1024 * 1024;

/// Validate a photo upload and return the canonical (lowercased) extension.
pub fn validate_photo(filename: &str, bytes: &[u8]) -> Result<String, StoreError> {
    let ext = filename
        .rsplit_once('.')
        .map(|(_, e)| e.to_ascii_lowercase())
        .filter(|e| ALLOWED_EXTENSIONS.contains(&e.as_str()))
        .ok_or_else(|| {
            StoreError::InvalidInput(format!(
                "unsupported photo extension in {filename:?}; use .jpg, .jpeg, .png or .gif"
            ))
        })?;

    if bytes.len() > MAX_PHOTO_BYTES {
        return Err(StoreError::InvalidInput(format!(
            "photo exceeds {} byte limit",
            MAX_PHOTO_BYTES
        )));
    }

    if !looks_like_image(bytes) {
        return Err(StoreError::InvalidInput(
            "payload is not a recognizable image".into(),
        ));
    }

    Ok(ext)
}

/// Signature check for the supported formats: JPEG, PNG, GIF.
fn looks_like_image(bytes: &[u8]) -> bool {
    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n";
    const GIF87: &[u8] = b"GIF87a";
    const GIF89: &[u8] = b"GIF89a";

    bytes.starts_with(&[0xFF, 0xD8, 0xFF])
        || bytes.starts_with(PNG)
        || bytes.starts_with(GIF87)
        || bytes.starts_with(GIF89)
}

/// Build a collision-resistant object name, e.g.
/// `resident_photo_20240305_101500_9f2ac81b.jpg`.
pub fn unique_photo_name(ext: impl AsRef<str>) -> String {
    let stamp = chrono::Local::now().format("%Y%m%d_%H%M%S");
    let suffix: u32 = rand::rng().random();
    format!("resident_photo_{}_{:08x}.{}", stamp, suffix, ext.as_ref())
}

#[cfg(test)]
mod tests {
    use super::*;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n rest-of-file";

    #[test]
    fn validate_photo_accepts_png() {
        let ext = validate_photo("face.PNG", PNG_HEADER).expect("valid");
        assert_eq!(ext, "png");
    }

    #[test]
    fn validate_photo_rejects_unknown_extension() {
        let err = validate_photo("face.bmp", PNG_HEADER).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn validate_photo_rejects_missing_extension() {
        assert!(validate_photo("face", PNG_HEADER).is_err());
    }

    #[test]
    fn validate_photo_rejects_oversized() {
        let big = vec![0xFF; MAX_PHOTO_BYTES + 1];
        let err = validate_photo("face.jpg", &big).unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn validate_photo_rejects_non_image_bytes() {
        let err = validate_photo("face.jpg", b"<html>not an image</html>").unwrap_err();
        assert!(matches!(err, StoreError::InvalidInput(_)));
    }

    #[test]
    fn looks_like_image_matches_signatures() {
        assert!(looks_like_image(&[0xFF, 0xD8, 0xFF, 0xE0]));
        assert!(looks_like_image(b"GIF89a...."));
        assert!(!looks_like_image(b"plain text"));
    }

    #[test]
    fn unique_photo_name_keeps_extension() {
        let name = unique_photo_name("jpg");
        assert!(name.starts_with("resident_photo_"));
        assert!(name.ends_with(".jpg"));
    }
}
