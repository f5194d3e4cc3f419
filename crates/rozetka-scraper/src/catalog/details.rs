use std::collections::HashMap;

use super::Catalog;
use crate::client::Transport;
use crate::error::ScraperError;
use crate::types::{DetailRecord, DetailsResponse, MainRecord, MainResponse, ProductId};

/// Product ids per `product/details` request.
pub const DETAILS_BATCH_SIZE: usize = 60;

impl<T: Transport> Catalog<'_, T> {
    /// Detail records for `ids`, keyed by stringified product id.
    ///
    /// One request per batch of [`DETAILS_BATCH_SIZE`] ids. Ids the API does
    /// not return have no entry.
    ///
    /// # Errors
    ///
    /// Returns the fatal retrieval error of the first failing batch.
    pub async fn fetch_details_batched(
        &self,
        ids: &[ProductId],
    ) -> Result<HashMap<String, DetailRecord>, ScraperError> {
        let batches = ids.len().div_ceil(DETAILS_BATCH_SIZE);
        tracing::info!(batches, "fetching product details");

        let mut details = HashMap::with_capacity(ids.len());
        for batch in ids.chunks(DETAILS_BATCH_SIZE) {
            let url = self.endpoints().details_url(batch);
            let response: DetailsResponse = self.get_json(&url, "product details batch").await?;
            for record in response.data {
                if let Some(key) = record.key() {
                    details.insert(key, record);
                }
            }
        }

        tracing::info!(count = details.len(), "fetched product details");
        Ok(details)
    }

    /// The `productData` record for one product; empty when the API omits it.
    ///
    /// # Errors
    ///
    /// Returns the fatal retrieval error if the request fails.
    pub async fn fetch_main(&self, id: &ProductId) -> Result<MainRecord, ScraperError> {
        let url = self.endpoints().main_url(id);
        let context = format!("main record of product {id}");
        let response: MainResponse = self.get_json(&url, &context).await?;
        Ok(response.data.product_data)
    }

    pub(super) async fn fetch_all_mains(
        &self,
        ids: &[ProductId],
    ) -> Result<Vec<MainRecord>, ScraperError> {
        tracing::info!(count = ids.len(), "fetching main product data");
        let mut mains = Vec::with_capacity(ids.len());
        for id in ids {
            mains.push(self.fetch_main(id).await?);
        }
        Ok(mains)
    }
}
