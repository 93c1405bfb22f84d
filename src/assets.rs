//! Image files and sprite-sheet naming.
//!
//! Sheet files carry their grid in the name: `tiles_10x10.png` is a 10x10
//! grid, `walk_8.png` a single row of 8 frames, anything else one frame.
//! PNG rows are top-down; buffers here are flipped on the way in and out.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::pixel_buffer::PixelBuffer;

/// Decode an image file into a buffer
pub fn load_png(path: impl AsRef<Path>) -> anyhow::Result<PixelBuffer> {
    let path = path.as_ref();
    let img = image::open(path)
        .with_context(|| format!("Failed to load image: {}", path.display()))?
        .to_rgba8();
    let (width, height) = img.dimensions();
    log::debug!("decoded {} ({}x{})", path.display(), width, height);
    Ok(PixelBuffer::from_rgba_bytes_top_down(
        width,
        height,
        &img.into_raw(),
    ))
}

/// Encode a buffer as PNG
pub fn save_png(path: impl AsRef<Path>, buffer: &PixelBuffer) -> anyhow::Result<()> {
    let path = path.as_ref();
    let img = image::RgbaImage::from_raw(
        buffer.width(),
        buffer.height(),
        buffer.to_rgba_bytes_top_down(),
    )
    .context("pixel data does not match the buffer size")?;
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Failed to save image: {}", path.display()))
}

/// `*.png` files directly inside `dir`, sorted by name
pub fn scan_png_files(dir: impl AsRef<Path>) -> anyhow::Result<Vec<PathBuf>> {
    let dir = dir.as_ref();
    let entries =
        fs::read_dir(dir).with_context(|| format!("Failed to read directory: {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        let is_png = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("png"));
        if is_png && path.is_file() {
            files.push(path);
        } else {
            log::debug!("skipping {}", path.display());
        }
    }
    files.sort();
    Ok(files)
}

/// Sprite name for a sheet file: the file name without its extension
pub fn sheet_name(path: impl AsRef<Path>) -> String {
    path.as_ref()
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default()
}

/// Frame grid `(h_count, v_count)` encoded in a sheet file name
pub fn parse_sheet_grid(filename: &str) -> (u32, u32) {
    let stem = sheet_name(filename);
    let Some((_, suffix)) = stem.rsplit_once('_') else {
        return (1, 1);
    };
    let positive = |s: &str| s.parse::<u32>().ok().filter(|&n| n > 0);

    match suffix.split_once(['x', 'X']) {
        Some((h, v)) => match (positive(h), positive(v)) {
            (Some(h), Some(v)) => (h, v),
            _ => (1, 1),
        },
        None => positive(suffix).map_or((1, 1), |n| (n, 1)),
    }
}
