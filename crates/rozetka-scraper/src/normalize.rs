//! Normalization from raw Rozetka payloads to [`rozetka_core::ProductRecord`].
//!
//! Each field prefers the main record, then the batched detail record, then a
//! fixed placeholder. Markup stripping is delegated to [`crate::html`].

use std::collections::HashSet;

use rozetka_core::products::{ANONYMOUS, NO_DESCRIPTION, UNAVAILABLE};
use rozetka_core::{Characteristic, Comment, ProductRecord, RatingSummary};
use rust_decimal::Decimal;

use crate::html::strip_markup;
use crate::types::{
    CommentCreated, CommentThread, DetailRecord, MainRecord, ProductId, RawComment, Scalar,
    TotalComments,
};

/// Builds the flat record for one product.
///
/// `detail` is `None` when the details endpoint did not return the product.
#[must_use]
pub fn normalize_product(
    id: &ProductId,
    detail: Option<&DetailRecord>,
    main: &MainRecord,
    thread: &CommentThread,
) -> ProductRecord {
    let href = detail
        .and_then(|d| d.href.clone())
        .unwrap_or_else(|| format!("https://rozetka.com.ua/ua/p{id}/"));

    let title = first_present(main.title.as_ref(), detail.and_then(|d| d.title.as_ref()));
    let brand = first_present(
        main.brand_name.as_ref(),
        detail.and_then(|d| d.brand.as_ref()),
    );

    let price = parse_price(
        main.price
            .as_ref()
            .or_else(|| detail.and_then(|d| d.price.as_ref())),
    );
    let old_price = parse_price(
        main.old_price
            .as_ref()
            .or_else(|| detail.and_then(|d| d.old_price.as_ref())),
    );
    let discount = matches!((price, old_price), (Some(p), Some(old)) if old > p);

    ProductRecord {
        id: id.to_string(),
        href,
        title,
        brand,
        price,
        old_price,
        discount,
        sell_status: or_unavailable(main.product.sell_status.as_ref()),
        category_title: or_unavailable(main.last_category.title.as_ref()),
        description: clean_description(main.description.text.as_deref()),
        rating: rating_summary(&thread.total),
        characteristics: extract_characteristics(main),
        comments: thread.comments.iter().map(normalize_comment).collect(),
        images: extract_images(main),
    }
}

/// Parses a price, keeping only ASCII digits and `.`.
///
/// Returns `None` when the value is absent, unparseable, or not positive.
#[must_use]
pub fn parse_price(raw: Option<&Scalar>) -> Option<Decimal> {
    let text = raw?.to_string();
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();
    cleaned
        .parse::<Decimal>()
        .ok()
        .filter(|price| *price > Decimal::ZERO)
}

/// Plain-text description, or the "no description" placeholder.
#[must_use]
pub fn clean_description(html: Option<&str>) -> String {
    let text = html.map(strip_markup).unwrap_or_default();
    if text.is_empty() {
        NO_DESCRIPTION.to_owned()
    } else {
        text
    }
}

/// Flattens group → option → value into `(option title, value title)` pairs.
#[must_use]
pub fn extract_characteristics(main: &MainRecord) -> Vec<Characteristic> {
    main.characteristics
        .iter()
        .flat_map(|group| &group.options)
        .flat_map(|option| {
            let name = option.title.clone().unwrap_or_default();
            option.values.iter().map(move |value| Characteristic {
                name: name.clone(),
                value: value.title.clone().unwrap_or_default(),
            })
        })
        .collect()
}

/// Gallery images, then variant swatches, deduplicated in first-seen order.
#[must_use]
pub fn extract_images(main: &MainRecord) -> Vec<String> {
    let gallery = main
        .product
        .images
        .iter()
        .filter_map(|image| image.original.url.as_deref());
    let variants = main
        .var_params
        .options
        .iter()
        .flat_map(|option| &option.values)
        .flat_map(|value| [value.bg_image_url.as_deref(), value.product.image.as_deref()])
        .flatten();

    let mut seen = HashSet::new();
    gallery
        .chain(variants)
        .filter(|url| !url.is_empty() && seen.insert(*url))
        .map(str::to_owned)
        .collect()
}

/// `day.month.year`, or empty unless all three parts are present and non-zero.
#[must_use]
pub fn format_comment_date(created: &CommentCreated) -> String {
    match (&created.day, &created.month, &created.year) {
        (Some(day), Some(month), Some(year))
            if day.is_truthy() && month.is_truthy() && year.is_truthy() =>
        {
            format!("{day}.{month}.{year}")
        }
        _ => String::new(),
    }
}

fn normalize_comment(comment: &RawComment) -> Comment {
    Comment {
        user: comment
            .usertitle
            .clone()
            .unwrap_or_else(|| ANONYMOUS.to_owned()),
        mark: or_unavailable(comment.mark.as_ref()),
        text: comment.text.clone().unwrap_or_default(),
        date: format_comment_date(&comment.created),
    }
}

fn rating_summary(total: &TotalComments) -> RatingSummary {
    let count = |value: Option<&Scalar>| value.map_or_else(|| "0".to_owned(), ToString::to_string);
    RatingSummary {
        comment_count: count(total.comment_count_comments.as_ref()),
        average_mark: count(total.comment_avg_marks.as_ref()),
        marks: total.marks().map(count),
    }
}

fn first_present(main: Option<&String>, detail: Option<&String>) -> String {
    main.or(detail)
        .cloned()
        .unwrap_or_else(|| UNAVAILABLE.to_owned())
}

fn or_unavailable(value: Option<&impl ToString>) -> String {
    value.map_or_else(|| UNAVAILABLE.to_owned(), ToString::to_string)
}

#[cfg(test)]
#[path = "normalize_test.rs"]
mod tests;
