use super::Catalog;
use crate::client::Transport;
use crate::error::ScraperError;
use crate::types::{CommentThread, CommentsResponse, ProductId};

/// Comments requested per page.
pub const COMMENTS_PER_PAGE: u32 = 36;
/// Seller whose reviews are ranked first.
pub const TOP_SELLER_ID: u32 = 5;

impl<T: Transport> Catalog<'_, T> {
    /// Every comment of a product, pages concatenated in order.
    ///
    /// Page 1 determines the page count and the rating totals. A page 1
    /// without `data` is an empty thread.
    ///
    /// # Errors
    ///
    /// Returns the retrieval error of any failing page, or
    /// [`ScraperError::MissingCommentPage`] when a page after the first
    /// carries no `data`, or [`ScraperError::InvalidCommentPageCount`] when
    /// page 1 declares an unusable page count. Pages are never skipped.
    pub async fn fetch_all_comments(&self, id: &ProductId) -> Result<CommentThread, ScraperError> {
        let Some(first) = self.fetch_comments_page(id, 1).await?.data else {
            tracing::debug!(product_id = %id, "comment page 1 has no data");
            return Ok(CommentThread::default());
        };

        let declared_pages = first
            .pages
            .page_count()
            .map_err(|raw| ScraperError::InvalidCommentPageCount {
                product_id: id.to_string(),
                raw,
            })?
            .unwrap_or(1);
        let mut thread = CommentThread {
            total: first.total_comments,
            declared_pages,
            comments: first.comments,
        };
        if declared_pages <= 1 {
            return Ok(thread);
        }

        tracing::info!(product_id = %id, pages = declared_pages, "fetching comment pages");
        for page in 2..=declared_pages {
            let data = self
                .fetch_comments_page(id, page)
                .await?
                .data
                .ok_or_else(|| ScraperError::MissingCommentPage {
                    product_id: id.to_string(),
                    page,
                })?;
            thread.comments.extend(data.comments);
        }
        Ok(thread)
    }

    async fn fetch_comments_page(
        &self,
        id: &ProductId,
        page: u32,
    ) -> Result<CommentsResponse, ScraperError> {
        let url = self.endpoints().comments_url(id, page);
        let context = format!("comment page {page} of product {id}");
        self.get_json(&url, &context).await
    }
}
