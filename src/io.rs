use image::codecs::png::PngEncoder;
use image::{ImageEncoder, RgbaImage};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::error::{DollError, Result};

/// True when `location` should be fetched over the network.
pub fn is_remote(location: &str) -> bool {
    let lower = location.to_ascii_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Read a manifest or part image from a filesystem path or an `http(s)://` URL.
/// Blocking; call it from a background job.
pub fn fetch_bytes(location: &str) -> Result<Vec<u8>> {
    if is_remote(location) {
        let response = reqwest::blocking::get(location)?.error_for_status()?;
        Ok(response.bytes()?.to_vec())
    } else {
        std::fs::read(location).map_err(|e| DollError::Io(format!("{}: {}", location, e)))
    }
}

pub fn fetch_text(location: &str) -> Result<String> {
    let bytes = fetch_bytes(location)?;
    String::from_utf8(bytes).map_err(|e| DollError::Manifest(format!("{}: {}", location, e)))
}

/// Decode any format the `image` crate understands into straight RGBA.
pub fn decode_image(bytes: &[u8]) -> Result<RgbaImage> {
    image::load_from_memory(bytes)
        .map(|img| img.to_rgba8())
        .map_err(|e| DollError::Decode(e.to_string()))
}

pub fn load_image_sync(location: &str) -> Result<RgbaImage> {
    let bytes = fetch_bytes(location)?;
    decode_image(&bytes).map_err(|e| match e {
        DollError::Decode(msg) => DollError::Decode(format!("{}: {}", location, msg)),
        other => other,
    })
}

/// PNG-encode a frame in memory.
pub fn encode_png(image: &RgbaImage) -> Result<Vec<u8>> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            image.as_raw(),
            image.width(),
            image.height(),
            image::ColorType::Rgba8,
        )
        .map_err(|e| DollError::Encode(e.to_string()))?;
    Ok(out)
}

pub fn write_bytes(bytes: &[u8], path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writer.write_all(bytes)?;
    writer.flush()?;
    Ok(())
}

/// Ask the user where to save, starting from `default_name`. `None` if cancelled.
pub fn pick_save_path(default_name: &str) -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_file_name(default_name)
        .add_filter("PNG", &["png"])
        .save_file()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn remote_detection() {
        assert!(is_remote("https://example.com/m.json"));
        assert!(is_remote("HTTP://example.com/m.json"));
        assert!(!is_remote("assets/m.json"));
        assert!(!is_remote("/abs/http/m.json"));
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nope.json");
        let err = fetch_bytes(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, DollError::Io(_)));
    }

    #[test]
    fn png_written_to_disk_decodes_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("part.png");
        let img = RgbaImage::from_pixel(3, 2, Rgba([9, 8, 7, 200]));
        write_bytes(&encode_png(&img).unwrap(), &path).unwrap();

        let loaded = load_image_sync(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded, img);
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bad.png");
        std::fs::write(&path, b"not an image").unwrap();
        let err = load_image_sync(path.to_str().unwrap()).unwrap_err();
        assert!(matches!(err, DollError::Decode(ref m) if m.contains("bad.png")));
    }
}
