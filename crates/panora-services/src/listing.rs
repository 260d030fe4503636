//! Paged listing with per-row URL derivation

use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use panora_core::{AppError, ImageAsset, ImageListQuery, ImagePage, ListedImage};
use panora_db::ImageRepositoryTrait;

use crate::retrieval::RetrievalService;

pub struct ListingService {
    repository: Arc<dyn ImageRepositoryTrait>,
    retrieval: RetrievalService,
    enrichment_timeout: Duration,
}

impl ListingService {
    pub fn new(
        repository: Arc<dyn ImageRepositoryTrait>,
        retrieval: RetrievalService,
        enrichment_timeout: Duration,
    ) -> Self {
        Self {
            repository,
            retrieval,
            enrichment_timeout,
        }
    }

    /// One page of live assets with preview URLs, in repository order.
    ///
    /// Rows are enriched concurrently. A row whose URL cannot be derived in
    /// time keeps an empty preview URL; the page itself never fails for it.
    #[tracing::instrument(skip(self, query), fields(page = ?query.page, page_size = ?query.page_size))]
    pub async fn list(&self, query: &ImageListQuery) -> Result<ImagePage<ListedImage>, AppError> {
        let page = self.repository.query_page(query).await?;

        let previews = join_all(page.images.iter().map(|image| self.preview_url(image))).await;
        let mut previews = previews.into_iter();

        Ok(page.map(|image| ListedImage {
            preview_url: previews.next().unwrap_or_default(),
            thumbnail_url: None,
            image: image.into(),
        }))
    }

    async fn preview_url(&self, image: &ImageAsset) -> String {
        match tokio::time::timeout(self.enrichment_timeout, self.retrieval.link_for(image)).await {
            Ok(Ok(url)) => url,
            Ok(Err(e)) => {
                tracing::warn!(error = %e, image_id = %image.id, "Failed to derive preview URL");
                String::new()
            }
            Err(_) => {
                tracing::warn!(
                    image_id = %image.id,
                    timeout_ms = self.enrichment_timeout.as_millis() as u64,
                    "Preview URL derivation timed out"
                );
                String::new()
            }
        }
    }
}
