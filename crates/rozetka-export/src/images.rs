use std::io::Write;

use rozetka_core::ImageMapping;

use crate::ExportError;

const HEADER: [&str; 3] = ["Назва товару", "Посилання на товар", "Зображення"];

/// Writes one row per image URL, always preceded by the header.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] on any write failure.
pub fn write_images<W: Write>(writer: W, mappings: &[ImageMapping]) -> Result<(), ExportError> {
    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(HEADER)?;
    for mapping in mappings {
        for image in &mapping.images {
            csv.write_record([
                mapping.product_title.as_str(),
                mapping.product_url.as_str(),
                image.as_str(),
            ])?;
        }
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}
