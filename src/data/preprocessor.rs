// ============================================================
// Layer 4 — Image Preprocessor
// ============================================================
// The "to tensor" conversion applied to every image, and nothing
// else (no augmentation, no mean/std normalisation):
//
//   1. Decode and convert to 8-bit RGB
//   2. Reorder interleaved HWC pixels into planar CHW
//   3. Scale every channel value from [0, 255] to [0.0, 1.0]
//
// Example for a 1x2 image:
//   HWC: [r0 g0 b0 r1 g1 b1]
//   CHW: [r0 r1 | g0 g1 | b0 b1] / 255

use anyhow::{Context, Result};
use std::path::Path;

/// RGB only
pub const CHANNELS: usize = 3;

/// Decoded pixels of one image, still interleaved HWC u8.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RgbPixels {
    pub height: usize,
    pub width:  usize,
    pub data:   Vec<u8>,
}

pub struct Preprocessor;

impl Preprocessor {
    pub fn new() -> Self {
        Self
    }

    /// Decode an image file, converting any colour type to RGB.
    /// Grayscale and RGBA images become 3-channel like everything else.
    pub fn decode(&self, path: &Path) -> Result<RgbPixels> {
        let rgb = image::open(path)
            .with_context(|| format!("Cannot decode image '{}'", path.display()))?
            .to_rgb8();
        let (width, height) = rgb.dimensions();
        Ok(RgbPixels {
            height: height as usize,
            width:  width as usize,
            data:   rgb.into_raw(),
        })
    }

    /// Planar CHW floats in [0, 1], appended to `out`.
    pub fn to_tensor_layout(&self, pixels: &RgbPixels, out: &mut Vec<f32>) {
        let plane = pixels.height * pixels.width;
        out.reserve(plane * CHANNELS);
        for channel in 0..CHANNELS {
            out.extend(
                pixels.data[channel..]
                    .iter()
                    .step_by(CHANNELS)
                    .take(plane)
                    .map(|&v| v as f32 / 255.0),
            );
        }
    }
}

impl Default for Preprocessor {
    fn default() -> Self {
        Self::new()
    }
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hwc_to_chw() {
        let pixels = RgbPixels {
            height: 1,
            width:  2,
            data:   vec![255, 0, 51, 0, 255, 102],
        };
        let mut out = Vec::new();
        Preprocessor::new().to_tensor_layout(&pixels, &mut out);
        assert_eq!(out, vec![1.0, 0.0, 0.0, 1.0, 0.2, 0.4]);
    }

    #[test]
    fn test_appends_after_existing_values() {
        let pixels = RgbPixels { height: 1, width: 1, data: vec![0, 0, 255] };
        let mut out = vec![9.0];
        Preprocessor::new().to_tensor_layout(&pixels, &mut out);
        assert_eq!(out, vec![9.0, 0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_decode_converts_grayscale_to_rgb() {
        let dir  = tempfile::tempdir().unwrap();
        let path = dir.path().join("g.png");
        image::GrayImage::from_pixel(3, 2, image::Luma([7])).save(&path).unwrap();

        let pixels = Preprocessor::new().decode(&path).unwrap();
        assert_eq!((pixels.height, pixels.width), (2, 3));
        assert_eq!(pixels.data.len(), 2 * 3 * CHANNELS);
        assert!(pixels.data.iter().all(|&v| v == 7));
    }

    #[test]
    fn test_decode_missing_file_is_an_error() {
        assert!(Preprocessor::new().decode(Path::new("/no/such/image.png")).is_err());
    }
}
