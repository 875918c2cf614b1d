//! Writing rendered maps to image files.

use std::path::{Path, PathBuf};

use image::{DynamicImage, ImageFormat};

use crate::appearance::OutputFormat;
use crate::error::Result;
use crate::render::RenderedBitmap;

/// `path` if nothing exists there, otherwise the first free
/// `stem(1).ext`, `stem(2).ext`, ... in the same directory.
pub fn unique_path(path: &Path) -> PathBuf {
    if !path.exists() {
        return path.to_path_buf();
    }
    let dir = path.parent().unwrap_or_else(|| Path::new(""));
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let extension = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .unwrap_or_default();

    let mut counter = 1u32;
    loop {
        let candidate = dir.join(format!("{}({}){}", stem, counter, extension));
        if !candidate.exists() {
            return candidate;
        }
        counter += 1;
    }
}

/// Save a bitmap in the given format. JPEG output drops the alpha channel.
pub fn save_bitmap(bitmap: &RenderedBitmap, path: &Path, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Png => bitmap.image().save_with_format(path, ImageFormat::Png)?,
        OutputFormat::Jpeg => {
            let rgb = DynamicImage::ImageRgba8(bitmap.image().clone()).to_rgb8();
            rgb.save_with_format(path, ImageFormat::Jpeg)?;
        }
    }
    Ok(())
}

/// Export a bitmap as `<output_dir>/<name>.<ext>`, numbering the name when
/// the file already exists. Returns the path written.
pub fn export_map(
    bitmap: &RenderedBitmap,
    output_dir: &Path,
    name: &str,
    format: OutputFormat,
) -> Result<PathBuf> {
    let target = unique_path(&output_dir.join(format!("{}.{}", name, format.extension())));
    save_bitmap(bitmap, &target, format)?;
    tracing::info!(
        path = %target.display(),
        width = bitmap.width(),
        height = bitmap.height(),
        "map saved"
    );
    Ok(target)
}
