//! In-memory image repository for testing
//!
//! Same contract as the PostgreSQL repository, without a database.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use panora_core::models::{
    BookmarkCounts, ImageAsset, ImageListQuery, ImagePage, NewImageAsset,
};
use panora_core::AppError;
use uuid::Uuid;

use super::image::ImageRepositoryTrait;

#[derive(Default)]
struct State {
    images: HashMap<Uuid, ImageAsset>,
    last_created_at: Option<DateTime<Utc>>,
}

#[derive(Clone, Default)]
pub struct InMemoryImageRepository {
    state: Arc<Mutex<State>>,
}

impl InMemoryImageRepository {
    pub fn new() -> Self {
        Self::default()
    }

    fn state(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Insert a fully-formed record, bypassing id and timestamp assignment.
    pub fn insert(&self, image: ImageAsset) {
        self.state().images.insert(image.id, image);
    }

    /// Number of records, soft-deleted ones included.
    pub fn len(&self) -> usize {
        self.state().images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Strictly increasing creation timestamps so insertion order is observable.
    fn next_created_at(state: &mut State) -> DateTime<Utc> {
        let now = Utc::now();
        let created_at = match state.last_created_at {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        state.last_created_at = Some(created_at);
        created_at
    }
}

#[async_trait]
impl ImageRepositoryTrait for InMemoryImageRepository {
    async fn create(&self, new_image: NewImageAsset) -> Result<ImageAsset, AppError> {
        let mut state = self.state();

        let key_taken = state
            .images
            .values()
            .any(|i| i.is_live() && i.storage_key == new_image.storage_key);
        if key_taken {
            return Err(AppError::InvalidInput(format!(
                "Storage key already in use: {}",
                new_image.storage_key
            )));
        }

        let created_at = Self::next_created_at(&mut state);
        let image = ImageAsset {
            id: Uuid::new_v4(),
            name: new_image.name,
            size: new_image.size,
            width: new_image.width,
            height: new_image.height,
            file_type: new_image.file_type,
            storage_key: new_image.storage_key,
            storage_backend: new_image.storage_backend,
            bookmarked: false,
            created_at,
            updated_at: created_at,
            deleted_at: None,
        };

        state.images.insert(image.id, image.clone());
        Ok(image)
    }

    async fn find_live(&self, id: Uuid) -> Result<ImageAsset, AppError> {
        self.state()
            .images
            .get(&id)
            .filter(|i| i.is_live())
            .cloned()
            .ok_or_else(AppError::image_not_found)
    }

    async fn find_any(&self, id: Uuid) -> Result<Option<ImageAsset>, AppError> {
        Ok(self.state().images.get(&id).cloned())
    }

    async fn update_bookmark(&self, id: Uuid, bookmarked: bool) -> Result<ImageAsset, AppError> {
        let mut state = self.state();
        let image = state
            .images
            .get_mut(&id)
            .filter(|i| i.is_live())
            .ok_or_else(AppError::image_not_found)?;

        image.bookmarked = bookmarked;
        image.updated_at = Utc::now();
        Ok(image.clone())
    }

    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let mut state = self.state();
        let image = state
            .images
            .get_mut(&id)
            .filter(|i| i.is_live())
            .ok_or_else(AppError::image_not_found)?;

        let now = Utc::now();
        image.deleted_at = Some(now);
        image.updated_at = now;
        Ok(())
    }

    async fn query_page(&self, query: &ImageListQuery) -> Result<ImagePage<ImageAsset>, AppError> {
        let window = query.window();
        let needle = query.search_term().map(str::to_lowercase);

        let mut matching: Vec<ImageAsset> = self
            .state()
            .images
            .values()
            .filter(|i| i.is_live())
            .filter(|i| query.bookmark_filter.matches(i.bookmarked))
            .filter(|i| match needle {
                Some(ref needle) => i.name.to_lowercase().contains(needle),
                None => true,
            })
            .cloned()
            .collect();

        matching.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));

        let total = matching.len() as i64;
        let images = matching
            .into_iter()
            .skip(window.offset() as usize)
            .take(window.page_size as usize)
            .collect();

        Ok(ImagePage::new(images, total, window))
    }

    async fn counts_by_bookmark(&self) -> Result<BookmarkCounts, AppError> {
        let state = self.state();
        let mut counts = BookmarkCounts::default();

        for image in state.images.values().filter(|i| i.is_live()) {
            counts.total_images += 1;
            if image.bookmarked {
                counts.bookmarked_count += 1;
                counts.total_size_bookmarked += image.size;
            } else {
                counts.unbookmarked_count += 1;
                counts.total_size_unbookmarked += image.size;
            }
        }

        Ok(counts)
    }
}
