//! Category harvest orchestration.
//!
//! Turns one category URL into the sequence of listing, detail-batch, main
//! and comment-page requests, issued one at a time through a [`Session`].
//! Any fatal request aborts the harvest; there is no per-product quarantine.

mod comments;
mod details;

use std::collections::{BTreeSet, HashMap};

use rozetka_core::{Category, ImageMapping, ProductRecord};
use serde::de::DeserializeOwned;

use crate::client::{Session, Transport};
use crate::error::ScraperError;
use crate::normalize::normalize_product;
use crate::outcome::{ParseAs, Payload, RequestOutcome};
use crate::pagination::{
    extract_product_ids, listing_page_urls, normalize_category_url, pages_for_total,
    total_from_listing,
};
use crate::types::{DetailRecord, MainRecord, ProductId};

pub use comments::{COMMENTS_PER_PAGE, TOP_SELLER_ID};
pub use details::DETAILS_BATCH_SIZE;

pub const API_BASE: &str = "https://common-api.rozetka.com.ua/v1/api";
pub const PRODUCT_API_BASE: &str = "https://product-api.rozetka.com.ua/v4";

/// Base URLs of the two JSON APIs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    pub api_base: String,
    pub product_api_base: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            api_base: API_BASE.to_owned(),
            product_api_base: PRODUCT_API_BASE.to_owned(),
        }
    }
}

impl Endpoints {
    #[must_use]
    pub fn details_url(&self, ids: &[ProductId]) -> String {
        let joined = ids
            .iter()
            .map(ProductId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        format!(
            "{}/product/details?country=UA&lang=ua&ids={joined}",
            self.api_base
        )
    }

    #[must_use]
    pub fn main_url(&self, id: &ProductId) -> String {
        format!(
            "{}/pages/product/main?country=UA&lang=ua&id={id}&isGroup=false",
            self.api_base
        )
    }

    #[must_use]
    pub fn comments_url(&self, id: &ProductId, page: u32) -> String {
        format!(
            "{}/comments/get?country=UA&lang=ua&goods={id}&limit={COMMENTS_PER_PAGE}&page={page}&sort=from_buyer&topSellerId={TOP_SELLER_ID}&type=comment",
            self.product_api_base
        )
    }
}

/// Products and image mappings gathered from one or more categories.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryHarvest {
    pub products: Vec<ProductRecord>,
    pub images: Vec<ImageMapping>,
}

impl CategoryHarvest {
    pub fn append(&mut self, other: Self) {
        self.products.extend(other.products);
        self.images.extend(other.images);
    }
}

/// Catalog orchestrator bound to a borrowed session.
pub struct Catalog<'s, T: Transport> {
    session: &'s Session<T>,
    endpoints: Endpoints,
}

impl<'s, T: Transport> Catalog<'s, T> {
    #[must_use]
    pub fn new(session: &'s Session<T>) -> Self {
        Self {
            session,
            endpoints: Endpoints::default(),
        }
    }

    #[must_use]
    pub fn with_endpoints(mut self, endpoints: Endpoints) -> Self {
        self.endpoints = endpoints;
        self
    }

    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    async fn fetch(&self, url: &str, parse_as: ParseAs) -> Result<Payload, ScraperError> {
        let max_attempts = self.session.policy().max_attempts;
        match self.session.fetch(url, parse_as, max_attempts).await {
            RequestOutcome::Success { payload } => Ok(payload),
            RequestOutcome::RetryableFailure { reason, .. }
            | RequestOutcome::FatalFailure { reason } => Err(reason),
        }
    }

    pub(crate) async fn get_text(&self, url: &str) -> Result<String, ScraperError> {
        match self.fetch(url, ParseAs::RawText).await? {
            Payload::Text(body) => Ok(body),
            Payload::Json(value) => Ok(value.to_string()),
        }
    }

    pub(crate) async fn get_json<D: DeserializeOwned>(
        &self,
        url: &str,
        context: &str,
    ) -> Result<D, ScraperError> {
        let parsed = match self.fetch(url, ParseAs::Json).await? {
            Payload::Json(value) => serde_json::from_value(value),
            Payload::Text(body) => serde_json::from_str(&body),
        };
        parsed.map_err(|e| ScraperError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }

    /// Number of listing pages for a category, from the total on page 1.
    ///
    /// Falls back to one page (with a warning) when the total is not shown.
    ///
    /// # Errors
    ///
    /// Returns the fatal retrieval error if page 1 cannot be fetched.
    pub async fn discover_page_count(&self, category_url: &str) -> Result<u32, ScraperError> {
        let html = self.get_text(category_url).await?;
        match total_from_listing(&html) {
            Some(total) => {
                let pages = pages_for_total(total);
                tracing::info!(total, pages, "found products in category");
                Ok(pages)
            }
            None => {
                tracing::warn!(url = category_url, "could not determine page count; assuming one page");
                Ok(1)
            }
        }
    }

    /// Sorted, duplicate-free product ids across listing pages `1..=page_count`.
    ///
    /// # Errors
    ///
    /// Returns the fatal retrieval error of the first page that cannot be fetched.
    pub async fn collect_product_ids(
        &self,
        category_url: &str,
        page_count: u32,
    ) -> Result<Vec<ProductId>, ScraperError> {
        tracing::info!(pages = page_count, "fetching product ids");
        let mut ids = BTreeSet::new();
        for url in listing_page_urls(category_url, page_count) {
            let html = self.get_text(&url).await?;
            ids.extend(extract_product_ids(&html));
        }
        tracing::info!(count = ids.len(), "extracted unique product ids");
        Ok(ids.into_iter().collect())
    }

    /// Harvests one category: listing pages, details, main records and
    /// comments, normalized in sorted-id order.
    ///
    /// # Errors
    ///
    /// Returns the first fatal retrieval error; nothing gathered so far is kept.
    pub async fn process_category(
        &self,
        category: &Category,
    ) -> Result<CategoryHarvest, ScraperError> {
        let base_url = normalize_category_url(&category.url);
        tracing::info!(category = %category.name, url = %base_url, "processing category");

        let pages = self.discover_page_count(&base_url).await?;
        let ids = self.collect_product_ids(&base_url, pages).await?;
        if ids.is_empty() {
            tracing::warn!(category = %category.name, "no products found");
            return Ok(CategoryHarvest::default());
        }

        let details: HashMap<String, DetailRecord> = self.fetch_details_batched(&ids).await?;
        let mains: Vec<MainRecord> = self.fetch_all_mains(&ids).await?;

        let mut harvest = CategoryHarvest::default();
        for (id, main) in ids.iter().zip(mains) {
            tracing::info!(product_id = %id, "processing product");
            let thread = self.fetch_all_comments(id).await?;
            let record = normalize_product(id, details.get(id.as_str()), &main, &thread);
            if let Some(mapping) = record.image_mapping() {
                harvest.images.push(mapping);
            }
            harvest.products.push(record);
        }

        tracing::info!(
            category = %category.name,
            products = harvest.products.len(),
            "category processed"
        );
        Ok(harvest)
    }

    /// Runs [`Self::process_category`] for every category in order.
    ///
    /// # Errors
    ///
    /// Aborts on the first category that fails.
    pub async fn harvest(&self, categories: &[Category]) -> Result<CategoryHarvest, ScraperError> {
        tracing::info!(categories = categories.len(), "starting harvest");
        let mut all = CategoryHarvest::default();
        for category in categories {
            all.append(self.process_category(category).await?);
        }
        tracing::info!(
            products = all.products.len(),
            categories = categories.len(),
            requests = self.session.request_count(),
            "harvest complete"
        );
        Ok(all)
    }
}
