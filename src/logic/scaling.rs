use anyhow::{Context, Result};
use image::ImageFormat;
use std::io::Cursor;

/// Pixels per document inch assumed for an image's native size
pub const PIXELS_PER_INCH: f64 = 100.0;
/// English Metric Units per inch, the length unit of OOXML drawings
pub const EMU_PER_INCH: f64 = 914_400.0;

pub const STUDENT_PHOTO_BOX: (f64, f64) = (1.5, 1.5);
pub const PROJECT_IMAGE_BOX: (f64, f64) = (4.0, 3.0);

/// Rendered size of an image, in inches
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderSize {
    pub width: f64,
    pub height: f64,
}

impl RenderSize {
    pub fn to_emu(self) -> (u32, u32) {
        (inches_to_emu(self.width), inches_to_emu(self.height))
    }
}

fn inches_to_emu(inches: f64) -> u32 {
    (inches * EMU_PER_INCH).round().clamp(0.0, u32::MAX as f64) as u32
}

/// Scale `width` × `height` pixels into a `max_width` × `max_height` inch box.
///
/// The longer side is bounded first and the aspect ratio is preserved. The
/// native size (at [`PIXELS_PER_INCH`]) is never exceeded, so small images
/// are not blown up. Degenerate input takes the whole box.
pub fn fit_within(width: u32, height: u32, max_width: f64, max_height: f64) -> RenderSize {
    if width == 0 || height == 0 {
        return RenderSize {
            width: max_width,
            height: max_height,
        };
    }

    let (w, h) = (f64::from(width), f64::from(height));
    let aspect = w / h;

    let (mut new_width, mut new_height) = if width > height {
        let nw = max_width.min(w / PIXELS_PER_INCH);
        (nw, nw / aspect)
    } else {
        let nh = max_height.min(h / PIXELS_PER_INCH);
        (nh * aspect, nh)
    };

    if new_width > max_width {
        new_width = max_width;
        new_height = max_width / aspect;
    }
    if new_height > max_height {
        new_height = max_height;
        new_width = max_height * aspect;
    }

    RenderSize {
        width: new_width,
        height: new_height,
    }
}

/// An image decoded, re-encoded as PNG and sized for a bounding box
#[derive(Debug, Clone, PartialEq)]
pub struct ScaledImage {
    pub png: Vec<u8>,
    pub width_px: u32,
    pub height_px: u32,
    pub render: RenderSize,
}

impl ScaledImage {
    /// Fails when the bytes are not a decodable JPEG or PNG
    pub fn prepare(bytes: &[u8], max_width: f64, max_height: f64) -> Result<Self> {
        let image = image::load_from_memory(bytes).context("Failed to decode image")?;
        let (width_px, height_px) = (image.width(), image.height());

        let mut png = Vec::new();
        image
            .write_to(&mut Cursor::new(&mut png), ImageFormat::Png)
            .context("Failed to re-encode image as PNG")?;

        Ok(Self {
            png,
            width_px,
            height_px,
            render: fit_within(width_px, height_px, max_width, max_height),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::png_bytes;

    fn assert_size(size: RenderSize, width: f64, height: f64) {
        assert!((size.width - width).abs() < 1e-9, "width {} != {}", size.width, width);
        assert!((size.height - height).abs() < 1e-9, "height {} != {}", size.height, height);
    }

    #[test]
    fn test_landscape_is_width_bound() {
        assert_size(fit_within(2000, 1000, 4.0, 3.0), 4.0, 2.0);
    }

    #[test]
    fn test_portrait_is_height_bound() {
        assert_size(fit_within(1000, 2000, 4.0, 3.0), 1.5, 3.0);
    }

    #[test]
    fn test_wide_image_rechecks_height() {
        // Width-bound first, then the box height still limits nothing
        assert_size(fit_within(3000, 2900, 1.5, 1.5), 1.5, 1.5 * 2900.0 / 3000.0);
        // Square box, square image
        assert_size(fit_within(800, 800, 1.5, 1.5), 1.5, 1.5);
    }

    #[test]
    fn test_landscape_overflowing_height_is_rescaled() {
        // 4 wide would need 3.2 high; the height clamp wins
        assert_size(fit_within(1000, 800, 4.0, 3.0), 3.75, 3.0);
    }

    #[test]
    fn test_small_images_keep_native_size() {
        assert_size(fit_within(120, 60, 4.0, 3.0), 1.2, 0.6);
        assert_size(fit_within(50, 100, 1.5, 1.5), 0.5, 1.0);
    }

    #[test]
    fn test_degenerate_dimensions_take_whole_box() {
        assert_size(fit_within(0, 100, 1.5, 1.5), 1.5, 1.5);
        assert_size(fit_within(100, 0, 4.0, 3.0), 4.0, 3.0);
    }

    #[test]
    fn test_emu_conversion() {
        let size = RenderSize {
            width: 1.5,
            height: 2.0,
        };
        assert_eq!(size.to_emu(), (1_371_600, 1_828_800));
    }

    #[test]
    fn test_prepare_keeps_native_dimensions() {
        let bytes = png_bytes(300, 150);

        let scaled = ScaledImage::prepare(&bytes, 1.5, 1.5).unwrap();
        assert_eq!((scaled.width_px, scaled.height_px), (300, 150));
        assert_size(scaled.render, 1.5, 0.75);
        assert!(scaled.png.starts_with(b"\x89PNG"));
    }

    #[test]
    fn test_prepare_rejects_garbage() {
        assert!(ScaledImage::prepare(b"not an image", 1.5, 1.5).is_err());
    }
}
