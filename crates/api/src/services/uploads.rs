//! Product image storage under the media root.

use std::path::Path;

use uuid::Uuid;

/// Extensions we accept for uploaded images.
const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "webp", "gif"];

/// Store an uploaded image under `<media_root>/products/` with a fresh
/// UUID filename, and return the relative path stored on the product.
///
/// The extension is taken from the uploaded filename; anything unknown
/// falls back to `jpg`.
///
/// # Errors
///
/// Returns `std::io::Error` if the directory or file cannot be written.
pub async fn save_product_image(
    media_root: &Path,
    original_name: Option<&str>,
    bytes: &[u8],
) -> std::io::Result<String> {
    let ext = image_extension(original_name);
    let filename = format!("{}.{ext}", Uuid::new_v4().simple());

    let dir = media_root.join("products");
    tokio::fs::create_dir_all(&dir).await?;
    tokio::fs::write(dir.join(&filename), bytes).await?;

    Ok(format!("products/{filename}"))
}

/// Build the public URL for a stored image path.
///
/// Full URLs (externally hosted images) pass through untouched; relative
/// media paths are served from `/media` on our own base URL.
#[must_use]
pub fn public_image_url(base_url: &str, image: Option<&str>) -> Option<String> {
    let image = image?;
    if image.starts_with("http://") || image.starts_with("https://") {
        return Some(image.to_owned());
    }
    Some(format!(
        "{}/media/{}",
        base_url.trim_end_matches('/'),
        image
    ))
}

/// Pick a safe extension for an uploaded file.
fn image_extension(original_name: Option<&str>) -> &'static str {
    let ext = original_name
        .and_then(|name| Path::new(name).extension())
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);

    match ext.as_deref() {
        Some(ext) => ALLOWED_EXTENSIONS
            .iter()
            .find(|allowed| **allowed == ext)
            .copied()
            .unwrap_or("jpg"),
        None => "jpg",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extension_from_filename() {
        assert_eq!(image_extension(Some("photo.PNG")), "png");
        assert_eq!(image_extension(Some("lure.jpeg")), "jpeg");
    }

    #[test]
    fn test_extension_fallback() {
        assert_eq!(image_extension(Some("no-extension")), "jpg");
        assert_eq!(image_extension(Some("weird.exe")), "jpg");
        assert_eq!(image_extension(None), "jpg");
    }

    #[test]
    fn test_public_url_relative_path() {
        assert_eq!(
            public_image_url("http://localhost:8000/", Some("products/abc.jpg")).as_deref(),
            Some("http://localhost:8000/media/products/abc.jpg")
        );
    }

    #[test]
    fn test_public_url_passthrough_and_none() {
        assert_eq!(
            public_image_url("http://localhost:8000", Some("https://cdn.example.com/x.jpg"))
                .as_deref(),
            Some("https://cdn.example.com/x.jpg")
        );
        assert_eq!(public_image_url("http://localhost:8000", None), None);
    }
}
