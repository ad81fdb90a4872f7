use anyhow::{anyhow, bail, Result};
use fast_image_resize as fr;
use fr::images::Image;
use opencv::{imgcodecs, prelude::*};
use std::path::Path;

use super::batch::CHANNELS;
use crate::utils::file_utils::path_str;

/// Read `path`, resize to `size × size` and normalize to [-1, 1] (CHW).
pub fn decode_image(path: &Path, size: usize) -> Result<Vec<f32>> {
    let image = imgcodecs::imread(path_str(path)?, imgcodecs::IMREAD_COLOR)?;
    if image.empty() {
        bail!("Failed to decode image: {}", path.display());
    }
    if !image.is_continuous() {
        return Err(anyhow!("Decoded image is not continuous: {}", path.display()));
    }

    let width = image.cols() as u32;
    let height = image.rows() as u32;
    let rgb = bgr_to_rgb(image.data_bytes()?);
    let resized = resize_rgb(rgb, width, height, size as u32)?;
    Ok(normalize_hwc(&resized, size))
}

fn bgr_to_rgb(bgr: &[u8]) -> Vec<u8> {
    let mut rgb = bgr.to_vec();
    for pixel in rgb.chunks_exact_mut(CHANNELS) {
        pixel.swap(0, 2);
    }
    rgb
}

/// Bilinear resize of a packed RGB24 buffer to a square.
fn resize_rgb(rgb: Vec<u8>, width: u32, height: u32, size: u32) -> Result<Vec<u8>> {
    if width == size && height == size {
        return Ok(rgb);
    }
    let src_image = Image::from_vec_u8(width, height, rgb, fr::PixelType::U8x3)?;
    let mut dst_image = Image::new(size, size, fr::PixelType::U8x3);

    let options =
        fr::ResizeOptions::new().resize_alg(fr::ResizeAlg::Convolution(fr::FilterType::Bilinear));
    let mut resizer = fr::Resizer::new();
    resizer.resize(&src_image, &mut dst_image, &options)?;
    Ok(dst_image.into_vec())
}

/// Packed HWC bytes to planar CHW floats, `x / 127.5 - 1`.
pub fn normalize_hwc(pixels: &[u8], size: usize) -> Vec<f32> {
    let plane = size * size;
    let mut out = vec![0.0f32; CHANNELS * plane];
    for (i, pixel) in pixels.chunks_exact(CHANNELS).take(plane).enumerate() {
        for (c, value) in pixel.iter().enumerate() {
            out[c * plane + i] = *value as f32 / 127.5 - 1.0;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_range_and_layout() {
        // 2x2: red, green, blue, white
        let pixels = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 255, 255];
        let out = normalize_hwc(&pixels, 2);
        assert_eq!(out.len(), 12);
        // red plane
        assert_eq!(&out[0..4], &[1.0, -1.0, -1.0, 1.0]);
        // green plane
        assert_eq!(&out[4..8], &[-1.0, 1.0, -1.0, 1.0]);
        // blue plane
        assert_eq!(&out[8..12], &[-1.0, -1.0, 1.0, 1.0]);
    }

    #[test]
    fn test_bgr_to_rgb() {
        assert_eq!(bgr_to_rgb(&[1, 2, 3, 4, 5, 6]), vec![3, 2, 1, 6, 5, 4]);
    }

    #[test]
    fn test_decode_resizes_and_converts_colors() {
        let tmp_dir = std::env::temp_dir().join("toonkit_decode_test");
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let path = tmp_dir.join("red.png");
        image::RgbImage::from_pixel(20, 10, image::Rgb([255, 0, 0]))
            .save(&path)
            .unwrap();

        let sample = decode_image(&path, 8).unwrap();
        assert_eq!(sample.len(), 3 * 8 * 8);
        let plane = 64;
        assert!(sample[..plane].iter().all(|v| (*v - 1.0).abs() < 1e-6));
        assert!(sample[plane..].iter().all(|v| (*v + 1.0).abs() < 1e-6));
    }

    #[test]
    fn test_decode_rejects_non_images() {
        let tmp_dir = std::env::temp_dir().join("toonkit_decode_test");
        std::fs::create_dir_all(&tmp_dir).unwrap();
        let path = tmp_dir.join("notes.txt");
        std::fs::write(&path, b"not an image").unwrap();
        assert!(decode_image(&path, 8).is_err());
    }
}
