//! Asynchronous image acquisition. A source string can be a `data:` URI, a
//! `file:` URL, a bare filesystem path or (with the `http` feature) an
//! `http(s)` URL; whatever it names is decoded into RGBA [`ImageData`].

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use log::debug;
use url::Url;

use crate::api::ImageData;
use crate::error::{PlacardError, Result};

/// Loads and decodes the image named by `src`.
///
/// There is no retry, no timeout and no cancellation; the load either yields
/// decoded pixels or fails once with a typed error.
pub async fn load_image(src: &str) -> Result<ImageData> {
    let bytes = fetch(src).await?;
    let image = decode_image(&bytes)?;
    debug!(
        "loaded image from {}: {}x{}",
        source_label(src),
        image.width,
        image.height
    );
    Ok(image)
}

/// Decodes raw encoded bytes (PNG, JPEG, ...) into straight-alpha RGBA.
pub fn decode_image(bytes: &[u8]) -> Result<ImageData> {
    let decoded = image::load_from_memory(bytes)?.to_rgba8();
    let (width, height) = decoded.dimensions();
    Ok(ImageData {
        width,
        height,
        data: decoded.into_raw(),
    })
}

async fn fetch(src: &str) -> Result<Vec<u8>> {
    match Url::parse(src) {
        Ok(url) => match url.scheme() {
            "data" => decode_data_uri(src),
            "file" => {
                let path = url
                    .to_file_path()
                    .map_err(|_| PlacardError::Source(src.to_string()))?;
                read_file(&path).await
            }
            "http" | "https" => fetch_http(src).await,
            other => Err(PlacardError::Source(format!(
                "unsupported scheme {}: {}",
                other, src
            ))),
        },
        // Not an absolute URL; treat it as a filesystem path.
        Err(_) => read_file(std::path::Path::new(src)).await,
    }
}

async fn read_file(path: &std::path::Path) -> Result<Vec<u8>> {
    debug!("reading image file {}", path.display());
    tokio::fs::read(path).await.map_err(PlacardError::load)
}

#[cfg(feature = "http")]
async fn fetch_http(src: &str) -> Result<Vec<u8>> {
    debug!("fetching image over http: {}", src);
    let response = reqwest::get(src).await.map_err(PlacardError::load)?;
    let response = response.error_for_status().map_err(PlacardError::load)?;
    let bytes = response.bytes().await.map_err(PlacardError::load)?;
    Ok(bytes.to_vec())
}

#[cfg(not(feature = "http"))]
async fn fetch_http(src: &str) -> Result<Vec<u8>> {
    Err(PlacardError::Source(format!(
        "http sources need the `http` feature: {}",
        src
    )))
}

/// Decodes a `data:[mediatype][;base64],payload` URI into its payload bytes.
fn decode_data_uri(src: &str) -> Result<Vec<u8>> {
    let rest = src
        .strip_prefix("data:")
        .ok_or_else(|| PlacardError::Source(src.to_string()))?;
    let (header, payload) = rest
        .split_once(',')
        .ok_or_else(|| PlacardError::Source("data URI has no payload".to_string()))?;

    if header.ends_with(";base64") {
        BASE64_STANDARD
            .decode(payload)
            .map_err(|err| PlacardError::Source(format!("bad base64 payload: {}", err)))
    } else {
        // Percent-encoded text payload; rare for images but part of the scheme.
        Ok(percent_decode(payload))
    }
}

fn percent_decode(payload: &str) -> Vec<u8> {
    let bytes = payload.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3]).ok();
            if let Some(v) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(v);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    out
}

fn source_label(src: &str) -> &str {
    // Data URIs can be huge; keep log lines readable.
    if src.starts_with("data:") {
        "data URI"
    } else {
        src
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageFormat, Rgba, RgbaImage};
    use std::io::Cursor;

    fn png_bytes(width: u32, height: u32, pixel: Rgba<u8>) -> Vec<u8> {
        let img = RgbaImage::from_pixel(width, height, pixel);
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    fn png_data_uri(width: u32, height: u32, pixel: Rgba<u8>) -> String {
        format!(
            "data:image/png;base64,{}",
            BASE64_STANDARD.encode(png_bytes(width, height, pixel))
        )
    }

    #[test]
    fn decodes_png_bytes() {
        let img = decode_image(&png_bytes(4, 3, Rgba([10, 20, 30, 255]))).unwrap();
        assert_eq!((img.width, img.height), (4, 3));
        assert_eq!(&img.data[0..4], &[10, 20, 30, 255]);
    }

    #[tokio::test]
    async fn loads_base64_data_uri() {
        let src = png_data_uri(5, 2, Rgba([1, 2, 3, 255]));
        let img = load_image(&src).await.unwrap();
        assert_eq!((img.width, img.height), (5, 2));
    }

    #[tokio::test]
    async fn rejects_data_uri_without_payload() {
        let err = load_image("data:image/png;base64").await.unwrap_err();
        assert!(matches!(err, PlacardError::Source(_)));
    }

    #[tokio::test]
    async fn rejects_unknown_scheme() {
        let err = load_image("gopher://example/cat.png").await.unwrap_err();
        assert!(matches!(err, PlacardError::Source(_)));
    }

    #[tokio::test]
    async fn missing_file_is_a_load_error() {
        let err = load_image("/no/such/file.png").await.unwrap_err();
        assert!(matches!(err, PlacardError::Load(_)));
    }

    #[tokio::test]
    async fn undecodable_bytes_are_a_load_error() {
        let src = format!("data:text/plain;base64,{}", BASE64_STANDARD.encode(b"nope"));
        let err = load_image(&src).await.unwrap_err();
        assert!(matches!(err, PlacardError::Load(_)));
    }

    #[test]
    fn percent_decoding() {
        assert_eq!(percent_decode("a%20b%3d"), b"a b=".to_vec());
        assert_eq!(percent_decode("plain"), b"plain".to_vec());
    }
}
