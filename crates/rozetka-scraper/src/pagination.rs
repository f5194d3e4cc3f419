//! Category listing pagination.
//!
//! Listing pages are plain HTML. The total product count is read from the
//! "Знайдено N товарів" banner on page 1 and product ids from every
//! `/p{digits}/` link on each page.
//!
//! ## URL scheme
//!
//! ```text
//! https://rozetka.com.ua/ua/notebooks/c80004/          page 1
//! https://rozetka.com.ua/ua/notebooks/c80004/page=2/   page 2
//! ```

use std::sync::LazyLock;

use regex::Regex;

use crate::types::ProductId;

/// Products shown per listing page.
pub const ITEMS_PER_PAGE: u64 = 40;

static TOTAL_FOUND: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Знайдено\s*(\d+)").expect("valid total-count regex"));

static PRODUCT_LINK: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"/p(\d+)/").expect("valid product-link regex"));

/// Trims whitespace and trailing slashes, then appends exactly one `/`.
#[must_use]
pub fn normalize_category_url(url: &str) -> String {
    format!("{}/", url.trim().trim_end_matches('/'))
}

/// Total product count announced on a listing page, if present.
#[must_use]
pub fn total_from_listing(html: &str) -> Option<u64> {
    TOTAL_FOUND
        .captures(html)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

/// Number of listing pages needed for `total` products; `0` for an empty category.
#[must_use]
pub fn pages_for_total(total: u64) -> u32 {
    u32::try_from(total.div_ceil(ITEMS_PER_PAGE)).unwrap_or(u32::MAX)
}

/// URLs of pages `1..=pages`; page 1 is the bare category URL.
///
/// `base_url` must already end in `/` (see [`normalize_category_url`]).
#[must_use]
pub fn listing_page_urls(base_url: &str, pages: u32) -> Vec<String> {
    (1..=pages)
        .map(|page| {
            if page == 1 {
                base_url.to_owned()
            } else {
                format!("{base_url}page={page}/")
            }
        })
        .collect()
}

/// Every product id linked from `html`, in document order, duplicates included.
pub fn extract_product_ids(html: &str) -> impl Iterator<Item = ProductId> + '_ {
    PRODUCT_LINK
        .captures_iter(html)
        .filter_map(|caps| caps.get(1))
        .map(|m| ProductId::new(m.as_str()))
}
