use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Placeholder written for any field the site did not provide.
pub const UNAVAILABLE: &str = "Н/Д";
/// Description used when the product has no (or only markup-only) text.
pub const NO_DESCRIPTION: &str = "Опис відсутній";
/// Author name used for comments without a `usertitle`.
pub const ANONYMOUS: &str = "Анонім";
pub const DISCOUNT_YES: &str = "Так";
pub const DISCOUNT_NO: &str = "Ні";
pub const CURRENCY_SIGN: &str = "₴";

/// One flattened product, ready for tabular export.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductRecord {
    /// Site product ID (numeric string).
    pub id: String,
    /// Canonical product page URL.
    pub href: String,
    pub title: String,
    pub brand: String,
    /// Current price; `None` when missing or not positive.
    pub price: Option<Decimal>,
    /// Pre-discount price; `None` when missing or not positive.
    pub old_price: Option<Decimal>,
    pub discount: bool,
    pub sell_status: String,
    pub category_title: String,
    /// Plain-text description with markup removed.
    pub description: String,
    pub rating: RatingSummary,
    /// `(name, value)` pairs in source order.
    pub characteristics: Vec<Characteristic>,
    /// Every comment across all fetched comment pages, in page order.
    pub comments: Vec<Comment>,
    /// Deduplicated image URLs in first-seen order.
    pub images: Vec<String>,
}

impl ProductRecord {
    /// Price rendered as `"1299 ₴"`, or the placeholder when absent.
    #[must_use]
    pub fn price_display(&self) -> String {
        render_price(self.price)
    }

    #[must_use]
    pub fn old_price_display(&self) -> String {
        render_price(self.old_price)
    }

    #[must_use]
    pub fn discount_label(&self) -> &'static str {
        if self.discount {
            DISCOUNT_YES
        } else {
            DISCOUNT_NO
        }
    }

    /// The image-mapping row for this product, if it has any images.
    #[must_use]
    pub fn image_mapping(&self) -> Option<ImageMapping> {
        if self.images.is_empty() {
            return None;
        }
        Some(ImageMapping {
            product_title: self.title.clone(),
            product_url: self.href.clone(),
            images: self.images.clone(),
        })
    }
}

fn render_price(price: Option<Decimal>) -> String {
    match price {
        Some(p) if p > Decimal::ZERO => format!("{} {CURRENCY_SIGN}", p.normalize()),
        _ => UNAVAILABLE.to_string(),
    }
}

/// Comment aggregates as declared by the first comment page.
///
/// Values are passed through as the site renders them; they are not
/// recomputed from the fetched comment list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub comment_count: String,
    pub average_mark: String,
    /// Counts of 1★ through 5★ marks.
    pub marks: [String; 5],
}

impl Default for RatingSummary {
    fn default() -> Self {
        Self {
            comment_count: "0".to_string(),
            average_mark: "0".to_string(),
            marks: std::array::from_fn(|_| "0".to_string()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Characteristic {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub user: String,
    pub mark: String,
    pub text: String,
    /// `day.month.year`, or empty when any part is missing.
    pub date: String,
}

/// A product title and URL paired with every image found for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageMapping {
    pub product_title: String,
    pub product_url: String,
    pub images: Vec<String>,
}
