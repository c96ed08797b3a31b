//! QR rendering of the daily attendance URL.

use std::io::Cursor;
use std::net::{IpAddr, UdpSocket};

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use image::{GrayImage, ImageFormat, Luma};
use qrcode::{Color, QrCode};
use thiserror::Error;

/// Pixels per QR module.
const MODULE_PX: u32 = 10;
/// Light modules around the symbol.
const QUIET_ZONE: u32 = 4;

#[derive(Debug, Error)]
pub enum QrError {
    #[error("failed to encode QR code: {0}")]
    Encode(#[from] qrcode::types::QrError),
    #[error("failed to write PNG: {0}")]
    Image(#[from] image::ImageError),
}

/// Renders `data` as a black-on-white PNG.
pub fn render_png(data: &str) -> Result<Vec<u8>, QrError> {
    let code = QrCode::new(data.as_bytes())?;
    let width = code.width() as u32;
    let side = (width + 2 * QUIET_ZONE) * MODULE_PX;
    let colors = code.to_colors();

    let img = GrayImage::from_fn(side, side, |x, y| {
        let (mx, my) = (x / MODULE_PX, y / MODULE_PX);
        let inside = (QUIET_ZONE..QUIET_ZONE + width).contains(&mx)
            && (QUIET_ZONE..QUIET_ZONE + width).contains(&my);
        let dark = inside
            && colors[((my - QUIET_ZONE) * width + (mx - QUIET_ZONE)) as usize] == Color::Dark;
        if dark { Luma([0]) } else { Luma([255]) }
    });

    let mut png = Vec::new();
    img.write_to(&mut Cursor::new(&mut png), ImageFormat::Png)?;
    Ok(png)
}

/// Base64 of [`render_png`], ready to embed in JSON.
pub fn render_png_base64(data: &str) -> Result<String, QrError> {
    Ok(STANDARD.encode(render_png(data)?))
}

/// Address of the interface that routes outward.
///
/// Connecting a UDP socket sends nothing; it only selects the interface.
pub fn local_ip() -> Option<IpAddr> {
    let socket = UdpSocket::bind("0.0.0.0:0").ok()?;
    socket.connect("8.8.8.8:80").ok()?;
    socket.local_addr().ok().map(|addr| addr.ip())
}

/// Canonical attendance URL for `token` under `base`.
pub fn attendance_url(base: &str, token: &str) -> String {
    format!("{}/asistencia?token={token}", base.trim_end_matches('/'))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_a_png() {
        let png = render_png("http://10.0.0.2:5000/asistencia?token=2025-01-15_a1b2c3d4").unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
    }

    #[test]
    fn base64_output_decodes_to_png() {
        let encoded = render_png_base64("hello").unwrap();
        let decoded = STANDARD.decode(encoded).unwrap();

        assert_eq!(&decoded[1..4], b"PNG");
    }

    #[test]
    fn builds_attendance_url() {
        assert_eq!(
            attendance_url("http://peer:5000/", "2025-01-15_a1b2c3d4"),
            "http://peer:5000/asistencia?token=2025-01-15_a1b2c3d4"
        );
    }
}
