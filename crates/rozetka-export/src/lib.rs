//! CSV export of harvested products and image mappings.

pub mod images;
pub mod products;

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use chrono::NaiveDateTime;
use thiserror::Error;

pub use images::write_images;
pub use products::write_products;

use rozetka_core::{ImageMapping, ProductRecord};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to create {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV write error: {0}")]
    Csv(#[from] csv::Error),
}

/// `ready_YYYY-MM-DD_HH-MM-SS.csv` for a run started at `started_at`.
#[must_use]
pub fn products_file_name(started_at: NaiveDateTime) -> String {
    format!("ready_{}.csv", started_at.format("%Y-%m-%d_%H-%M-%S"))
}

/// Writes `records` to `output_dir/ready_{timestamp}.csv` and returns the path.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_products_file(
    output_dir: &Path,
    started_at: NaiveDateTime,
    records: &[ProductRecord],
) -> Result<PathBuf, ExportError> {
    let path = output_dir.join(products_file_name(started_at));
    tracing::info!(count = records.len(), path = %path.display(), "writing products");
    write_products(create(&path)?, records)?;
    tracing::info!(path = %path.display(), "products saved");
    Ok(path)
}

/// Rewrites the image-mapping file at `path`.
///
/// # Errors
///
/// Returns [`ExportError`] if the file cannot be created or written.
pub fn write_images_file(path: &Path, mappings: &[ImageMapping]) -> Result<(), ExportError> {
    tracing::info!(products = mappings.len(), path = %path.display(), "writing image mappings");
    write_images(create(path)?, mappings)?;
    tracing::info!(path = %path.display(), "image mappings saved");
    Ok(())
}

fn create(path: &Path) -> Result<BufWriter<File>, ExportError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| ExportError::Io {
            path: path.display().to_string(),
            source: e,
        })
}
