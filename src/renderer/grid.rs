use anyhow::{Context, Result};
use image::{Rgb, RgbImage};
use std::path::PathBuf;

use crate::dataset::batch::CHANNELS;
use crate::dataset::ImageBatch;
use crate::shared::constants;
use crate::utils::file_utils::ensure_dir;

/// Rows and columns used for `count` images: 8 columns, `count / 8` rows
/// but never fewer than one.
pub fn grid_shape(count: usize) -> (usize, usize) {
    let rows = (count / constants::GRID_COLUMNS).max(1);
    (rows, constants::GRID_COLUMNS)
}

/// Tiles batches of images into PNG contact sheets inside one directory.
pub struct GridRenderer {
    dir: PathBuf,
}

impl GridRenderer {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Lay out `batch` (values in [0, 1], not clamped here) and write it to
    /// `<dir>/<file_name>`. Images past `rows × 8` are left out.
    pub fn render(&self, batch: &ImageBatch, file_name: &str) -> Result<PathBuf> {
        let sheet = compose(batch);
        ensure_dir(&self.dir)?;
        let path = self.dir.join(file_name);
        sheet
            .save(&path)
            .with_context(|| format!("Failed to write image grid: {:?}", path))?;
        Ok(path)
    }
}

fn compose(batch: &ImageBatch) -> RgbImage {
    let (rows, cols) = grid_shape(batch.len());
    let size = batch.size() as u32;
    let gutter = constants::GRID_GUTTER;
    let cell = size + gutter;
    let width = cols as u32 * cell + gutter;
    let height = rows as u32 * cell + gutter;

    let mut sheet = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
    let plane = (size * size) as usize;
    for index in 0..batch.len().min(rows * cols) {
        let pixels = batch.image(index);
        let x0 = gutter + (index % cols) as u32 * cell;
        let y0 = gutter + (index / cols) as u32 * cell;
        for y in 0..size {
            for x in 0..size {
                let offset = (y * size + x) as usize;
                let mut rgb = [0u8; CHANNELS];
                for (c, value) in rgb.iter_mut().enumerate() {
                    // float-to-int casts saturate
                    *value = (pixels[c * plane + offset] * 255.0).round() as u8;
                }
                sheet.put_pixel(x0 + x, y0 + y, Rgb(rgb));
            }
        }
    }
    sheet
}
