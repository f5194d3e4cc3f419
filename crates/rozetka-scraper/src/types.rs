//! Rozetka API payload types.
//!
//! ## Observed shapes
//!
//! ### Scalars
//! Prices, marks, counts and ids arrive as JSON numbers on most products but
//! as strings (`"1 299"`, `"4.5"`) on some. They are modeled as [`Scalar`]
//! and interpreted during normalization.
//!
//! ### Nested objects
//! `product`, `last_category`, `description`, `varParams` and
//! `total_comments` may be absent, `null`, or of an unexpected type (for
//! example `total_comments: []` on products without reviews). Every nested
//! field deserializes leniently: a wrong shape becomes the type's default
//! instead of failing the whole payload.
//!
//! ### Arrays
//! Malformed array elements are dropped; well-formed neighbours are kept.
//! Comment arrays are the exception: every element becomes one comment, with
//! a malformed element rendered from defaults, so the comment count always
//! matches what the page returned.
//!
//! ### Page counts
//! `pages.count` on comment pages decides how many further requests are
//! made, so it is not lenient. Integers, integral floats and numeric strings
//! are accepted; any other present value is an error.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};

/// Deserializes `T`, falling back to `T::default()` on a type mismatch.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).unwrap_or_default())
}

/// Deserializes a sequence, skipping elements that do not fit `T`.
fn lenient_seq<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .filter_map(|item| serde_json::from_value(item).ok())
            .collect(),
        _ => Vec::new(),
    })
}

/// Deserializes a sequence, replacing elements that do not fit `T` with
/// `T::default()`.
fn lenient_each<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    Ok(match value {
        serde_json::Value::Array(items) => items
            .into_iter()
            .map(|item| serde_json::from_value(item).unwrap_or_default())
            .collect(),
        _ => Vec::new(),
    })
}

/// A JSON scalar whose type varies between products.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Integer(i64),
    Float(f64),
    Text(String),
    Bool(bool),
}

impl Scalar {
    /// `false` for zero, the empty string and `false`.
    #[must_use]
    pub fn is_truthy(&self) -> bool {
        match self {
            Self::Integer(n) => *n != 0,
            Self::Float(n) => *n != 0.0,
            Self::Text(s) => !s.is_empty(),
            Self::Bool(b) => *b,
        }
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Integer(n) => write!(f, "{n}"),
            Self::Float(n) if n.is_finite() && n.fract() == 0.0 => write!(f, "{n:.1}"),
            Self::Float(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Opaque numeric-string product identifier, as found in listing URLs.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ProductId(String);

impl ProductId {
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// ---------------------------------------------------------------------------
// product/details
// ---------------------------------------------------------------------------

/// Response of `GET {API}/product/details?ids=...`.
#[derive(Debug, Default, Deserialize)]
pub struct DetailsResponse {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub data: Vec<DetailRecord>,
}

/// Summary record for one product from the batched details endpoint.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct DetailRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub id: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub href: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub old_price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub brand: Option<String>,
}

impl DetailRecord {
    /// Stringified `id`, the key used to match details to listing ids.
    #[must_use]
    pub fn key(&self) -> Option<String> {
        self.id.as_ref().map(ToString::to_string)
    }
}

// ---------------------------------------------------------------------------
// pages/product/main
// ---------------------------------------------------------------------------

/// Response of `GET {API}/pages/product/main?id=...`.
#[derive(Debug, Default, Deserialize)]
pub struct MainResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub data: MainData,
}

#[derive(Debug, Default, Deserialize)]
pub struct MainData {
    #[serde(rename = "productData", default, deserialize_with = "lenient")]
    pub product_data: MainRecord,
}

/// Full product page record. An absent `productData` is an empty record.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct MainRecord {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub old_price: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub brand_name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub product: ProductSection,
    #[serde(default, deserialize_with = "lenient")]
    pub last_category: CategorySection,
    #[serde(default, deserialize_with = "lenient")]
    pub description: DescriptionSection,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub characteristics: Vec<CharacteristicGroup>,
    #[serde(rename = "varParams", default, deserialize_with = "lenient")]
    pub var_params: VarParams,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductSection {
    #[serde(default, deserialize_with = "lenient")]
    pub sell_status: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub images: Vec<ProductImage>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProductImage {
    #[serde(default, deserialize_with = "lenient")]
    pub original: ImageSource,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ImageSource {
    #[serde(default, deserialize_with = "lenient")]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CategorySection {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct DescriptionSection {
    /// HTML fragment.
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
}

/// A characteristic group; only its options are used.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacteristicGroup {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub options: Vec<CharacteristicOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacteristicOption {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
    #[serde(default, deserialize_with = "lenient_seq")]
    pub values: Vec<CharacteristicValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacteristicValue {
    #[serde(default, deserialize_with = "lenient")]
    pub title: Option<String>,
}

/// Variant selector (colour swatches and the like).
#[derive(Debug, Clone, Default, Deserialize)]
pub struct VarParams {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub options: Vec<VarOption>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VarOption {
    #[serde(default, deserialize_with = "lenient_seq")]
    pub values: Vec<VarValue>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VarValue {
    #[serde(rename = "bgImageUrl", default, deserialize_with = "lenient")]
    pub bg_image_url: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub product: VarProduct,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct VarProduct {
    #[serde(default, deserialize_with = "lenient")]
    pub image: Option<String>,
}

// ---------------------------------------------------------------------------
// comments/get
// ---------------------------------------------------------------------------

/// Response of `GET {PRODUCT_API}/comments/get?goods=...&page=...`.
#[derive(Debug, Default, Deserialize)]
pub struct CommentsResponse {
    #[serde(default, deserialize_with = "lenient")]
    pub data: Option<CommentsData>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentsData {
    #[serde(default, deserialize_with = "lenient_each")]
    pub comments: Vec<RawComment>,
    #[serde(default, deserialize_with = "lenient")]
    pub total_comments: TotalComments,
    #[serde(default, deserialize_with = "lenient")]
    pub pages: CommentPages,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommentPages {
    /// Raw declared page count; see [`CommentPages::page_count`].
    #[serde(default)]
    pub count: Option<serde_json::Value>,
}

impl CommentPages {
    /// Declared number of comment pages; `Ok(None)` when absent or `null`.
    ///
    /// # Errors
    ///
    /// Returns the raw JSON text when the value is present but is not a
    /// non-negative whole number that fits in `u32`.
    pub fn page_count(&self) -> Result<Option<u32>, String> {
        let Some(raw) = &self.count else {
            return Ok(None);
        };
        let parsed = match raw {
            serde_json::Value::Null => return Ok(None),
            serde_json::Value::Number(n) => n.as_u64().or_else(|| {
                n.as_f64()
                    .filter(|f| *f >= 0.0 && f.fract() == 0.0 && *f <= f64::from(u32::MAX))
                    .map(|f| format!("{f:.0}"))
                    .and_then(|s| s.parse().ok())
            }),
            serde_json::Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed
            .and_then(|n| u32::try_from(n).ok())
            .map(Some)
            .ok_or_else(|| raw.to_string())
    }
}

/// Rating aggregates reported on comment page 1.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct TotalComments {
    #[serde(default, deserialize_with = "lenient")]
    pub comment_count_comments: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment_avg_marks: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment_count_marks_1: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment_count_marks_2: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment_count_marks_3: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment_count_marks_4: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub comment_count_marks_5: Option<Scalar>,
}

impl TotalComments {
    /// Per-star counts, 1★ first.
    #[must_use]
    pub fn marks(&self) -> [Option<&Scalar>; 5] {
        [
            self.comment_count_marks_1.as_ref(),
            self.comment_count_marks_2.as_ref(),
            self.comment_count_marks_3.as_ref(),
            self.comment_count_marks_4.as_ref(),
            self.comment_count_marks_5.as_ref(),
        ]
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct RawComment {
    #[serde(default, deserialize_with = "lenient")]
    pub usertitle: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub mark: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub text: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub created: CommentCreated,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct CommentCreated {
    #[serde(default, deserialize_with = "lenient")]
    pub day: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub month: Option<Scalar>,
    #[serde(default, deserialize_with = "lenient")]
    pub year: Option<Scalar>,
}

/// Every comment page of one product, concatenated in page order.
///
/// `total` and `declared_pages` come from page 1 verbatim; they are not
/// reconciled with `comments.len()`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CommentThread {
    pub total: TotalComments,
    pub declared_pages: u32,
    pub comments: Vec<RawComment>,
}
