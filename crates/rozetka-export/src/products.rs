//! Wide product table: fixed columns, then characteristic pairs and comment
//! groups sized to the longest record in the batch.

use std::io::Write;

use rozetka_core::ProductRecord;

use crate::ExportError;

const FIXED_COLUMNS: [&str; 16] = [
    "ID",
    "Посилання",
    "Бренд",
    "Ціна",
    "Стара ціна",
    "Знижка",
    "Статус продажу",
    "Категорія",
    "Опис",
    "Кількість відгуків",
    "Середня оцінка",
    "Оцінка 1★",
    "Оцінка 2★",
    "Оцінка 3★",
    "Оцінка 4★",
    "Оцінка 5★",
];

const CHARACTERISTIC_FIELDS: [&str; 2] = ["Назва", "Значення"];
const COMMENT_FIELDS: [&str; 4] = ["Користувач", "Оцінка", "Текст", "Дата"];

/// Writes the product table. An empty batch writes nothing at all.
///
/// # Errors
///
/// Returns [`ExportError::Csv`] on any write failure.
pub fn write_products<W: Write>(writer: W, records: &[ProductRecord]) -> Result<(), ExportError> {
    if records.is_empty() {
        return Ok(());
    }

    let max_characteristics = records
        .iter()
        .map(|r| r.characteristics.len())
        .max()
        .unwrap_or(0);
    let max_comments = records.iter().map(|r| r.comments.len()).max().unwrap_or(0);

    let mut csv = csv::Writer::from_writer(writer);
    csv.write_record(header(max_characteristics, max_comments))?;
    for record in records {
        csv.write_record(row(record, max_characteristics, max_comments))?;
    }
    csv.flush().map_err(csv::Error::from)?;
    Ok(())
}

fn header(max_characteristics: usize, max_comments: usize) -> Vec<String> {
    let mut columns: Vec<String> = FIXED_COLUMNS.iter().map(|c| (*c).to_owned()).collect();
    for i in 1..=max_characteristics {
        columns.extend(
            CHARACTERISTIC_FIELDS
                .iter()
                .map(|field| format!("Характеристика_{i}_{field}")),
        );
    }
    for i in 1..=max_comments {
        columns.extend(
            COMMENT_FIELDS
                .iter()
                .map(|field| format!("Відгук_{i}_{field}")),
        );
    }
    columns
}

fn row(record: &ProductRecord, max_characteristics: usize, max_comments: usize) -> Vec<String> {
    let mut cells = vec![
        record.id.clone(),
        record.href.clone(),
        record.brand.clone(),
        record.price_display(),
        record.old_price_display(),
        record.discount_label().to_owned(),
        record.sell_status.clone(),
        record.category_title.clone(),
        record.description.clone(),
        record.rating.comment_count.clone(),
        record.rating.average_mark.clone(),
    ];
    cells.extend(record.rating.marks.iter().cloned());

    for i in 0..max_characteristics {
        match record.characteristics.get(i) {
            Some(c) => cells.extend([c.name.clone(), c.value.clone()]),
            None => cells.extend(blank(CHARACTERISTIC_FIELDS.len())),
        }
    }
    for i in 0..max_comments {
        match record.comments.get(i) {
            Some(c) => cells.extend([
                c.user.clone(),
                c.mark.clone(),
                c.text.clone(),
                c.date.clone(),
            ]),
            None => cells.extend(blank(COMMENT_FIELDS.len())),
        }
    }
    cells
}

fn blank(n: usize) -> impl Iterator<Item = String> {
    std::iter::repeat_n(String::new(), n)
}
