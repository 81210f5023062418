//! Raster re-encode: flatten transparency, downscale, save at the
//! configured quality.
//!
//! Only JPEG and PNG sources qualify; everything else (SVG, GIF, …) is
//! byte-copied by the caller. Any failure in here is recoverable: the
//! asset stage logs it and falls back to a plain copy.

use image::codecs::jpeg::JpegEncoder;
use image::imageops::FilterType;
use image::{DynamicImage, ImageError, Rgb, RgbImage};
use std::fs::File;
use std::io::BufWriter;
use std::path::Path;
use tracing::debug;

/// Raster formats eligible for re-encoding.
pub fn is_raster(path: &Path) -> bool {
    matches!(
        path.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg" | "png")
    )
}

/// Decode `source`, flatten any alpha onto white, downscale proportionally
/// when wider than `max_width`, and write to `dest` (JPEG at `quality`,
/// PNG losslessly, chosen by the destination extension).
pub fn reencode(
    source: &Path,
    dest: &Path,
    max_width: u32,
    quality: u8,
) -> Result<(), ImageError> {
    let img = image::open(source)?;
    let mut flat = flatten_onto_white(&img);

    if flat.width() > max_width {
        let ratio = max_width as f32 / flat.width() as f32;
        let new_height = ((flat.height() as f32 * ratio) as u32).max(1);
        debug!(
            "downscaling {} from {}x{} to {}x{}",
            source.display(),
            flat.width(),
            flat.height(),
            max_width,
            new_height
        );
        flat = image::imageops::resize(&flat, max_width, new_height, FilterType::Lanczos3);
    }

    let is_jpeg = matches!(
        dest.extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .as_deref(),
        Some("jpg" | "jpeg")
    );

    if is_jpeg {
        let writer = BufWriter::new(File::create(dest)?);
        let encoder = JpegEncoder::new_with_quality(writer, quality);
        DynamicImage::ImageRgb8(flat).write_with_encoder(encoder)?;
    } else {
        DynamicImage::ImageRgb8(flat).save(dest)?;
    }
    Ok(())
}

/// Alpha-blend every pixel onto an opaque white background.
fn flatten_onto_white(img: &DynamicImage) -> RgbImage {
    let rgba = img.to_rgba8();
    let mut out = RgbImage::new(rgba.width(), rgba.height());
    for (x, y, pixel) in rgba.enumerate_pixels() {
        let alpha = pixel[3] as u32;
        let blend = |c: u8| ((c as u32 * alpha + 255 * (255 - alpha)) / 255) as u8;
        out.put_pixel(x, y, Rgb([blend(pixel[0]), blend(pixel[1]), blend(pixel[2])]));
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgba, RgbaImage};

    #[test]
    fn raster_detection_by_extension() {
        assert!(is_raster(Path::new("a.png")));
        assert!(is_raster(Path::new("a.JPG")));
        assert!(is_raster(Path::new("a.jpeg")));
        assert!(!is_raster(Path::new("a.svg")));
        assert!(!is_raster(Path::new("a.gif")));
        assert!(!is_raster(Path::new("noext")));
    }

    #[test]
    fn transparency_flattens_to_white() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            2,
            2,
            Rgba([0, 0, 0, 0]), // fully transparent black
        ));
        let flat = flatten_onto_white(&img);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([255, 255, 255]));
    }

    #[test]
    fn opaque_pixels_survive_flattening() {
        let img = DynamicImage::ImageRgba8(RgbaImage::from_pixel(
            1,
            1,
            Rgba([10, 20, 30, 255]),
        ));
        let flat = flatten_onto_white(&img);
        assert_eq!(flat.get_pixel(0, 0), &Rgb([10, 20, 30]));
    }

    #[test]
    fn wide_png_is_downscaled_proportionally() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("wide.png");
        let dest = dir.path().join("out.png");
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(100, 50, Rgba([5, 5, 5, 255])))
            .save(&src)
            .unwrap();

        reencode(&src, &dest, 40, 85).unwrap();
        let out = image::open(&dest).unwrap();
        assert_eq!(out.width(), 40);
        assert_eq!(out.height(), 20);
    }

    #[test]
    fn narrow_image_is_not_upscaled() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("small.png");
        let dest = dir.path().join("out.png");
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(10, 10, Rgba([5, 5, 5, 255])))
            .save(&src)
            .unwrap();

        reencode(&src, &dest, 1200, 85).unwrap();
        let out = image::open(&dest).unwrap();
        assert_eq!((out.width(), out.height()), (10, 10));
    }

    #[test]
    fn jpeg_destination_reencodes_at_quality() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("photo.jpg");
        let dest = dir.path().join("out.jpg");
        DynamicImage::ImageRgb8(RgbImage::from_pixel(20, 20, Rgb([120, 10, 200])))
            .save(&src)
            .unwrap();

        reencode(&src, &dest, 1200, 60).unwrap();
        let out = image::open(&dest).unwrap();
        assert_eq!((out.width(), out.height()), (20, 20));
    }

    #[test]
    fn unreadable_source_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let src = dir.path().join("not-an-image.png");
        std::fs::write(&src, "plain text").unwrap();
        let dest = dir.path().join("out.png");
        assert!(reencode(&src, &dest, 1200, 85).is_err());
    }
}
