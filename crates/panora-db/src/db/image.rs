//! Image metadata repository: the `images` table.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use panora_core::models::{
    BookmarkCounts, ImageAsset, ImageListQuery, ImagePage, NewImageAsset,
};
use panora_core::{AppError, StorageBackend};
use sqlx::{PgPool, Postgres};
use uuid::Uuid;

const IMAGE_COLUMNS: &str = "id, name, size, width, height, file_type, storage_key, \
     storage_backend, bookmarked, created_at, updated_at, deleted_at";

/// Trait for image metadata operations
///
/// Every read is scoped to live rows except [`ImageRepositoryTrait::find_any`],
/// which deletion bookkeeping and administrative tooling use.
#[async_trait::async_trait]
pub trait ImageRepositoryTrait: Send + Sync {
    /// Insert a record; id, timestamps and `bookmarked = false` are assigned here.
    async fn create(&self, new_image: NewImageAsset) -> Result<ImageAsset, AppError>;

    async fn find_live(&self, id: Uuid) -> Result<ImageAsset, AppError>;

    /// Lookup that also returns soft-deleted rows.
    async fn find_any(&self, id: Uuid) -> Result<Option<ImageAsset>, AppError>;

    async fn update_bookmark(&self, id: Uuid, bookmarked: bool) -> Result<ImageAsset, AppError>;

    /// Mark a live row deleted. A second call for the same id is `NotFound`.
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError>;

    /// One page of live rows, newest first, ties broken by ascending id.
    async fn query_page(&self, query: &ImageListQuery) -> Result<ImagePage<ImageAsset>, AppError>;

    async fn counts_by_bookmark(&self) -> Result<BookmarkCounts, AppError>;
}

/// Row type for the images table (for FromRow).
#[derive(Debug, sqlx::FromRow)]
pub struct ImageRow {
    pub id: Uuid,
    pub name: String,
    pub size: i64,
    pub width: i32,
    pub height: i32,
    pub file_type: String,
    pub storage_key: String,
    pub storage_backend: Option<StorageBackend>,
    pub bookmarked: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl ImageRow {
    pub fn to_image_asset(self) -> ImageAsset {
        let storage_backend = self
            .storage_backend
            .unwrap_or_else(|| StorageBackend::infer_from_key(&self.storage_key));

        ImageAsset {
            id: self.id,
            name: self.name,
            size: self.size,
            width: self.width,
            height: self.height,
            file_type: self.file_type,
            storage_key: self.storage_key,
            storage_backend,
            bookmarked: self.bookmarked,
            created_at: self.created_at,
            updated_at: self.updated_at,
            deleted_at: self.deleted_at,
        }
    }
}

/// Escape LIKE wildcards so the search text matches literally, and wrap it
/// for a substring match.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len() + 2);
    escaped.push('%');
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped.push('%');
    escaped
}

/// PostgreSQL implementation of the image repository.
#[derive(Clone)]
pub struct PostgresImageRepository {
    pool: PgPool,
}

impl PostgresImageRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// `AND ...` conditions for the listing filters plus the next free parameter number.
    fn filter_conditions(search: Option<&str>, bookmarked: Option<bool>) -> (String, usize) {
        let mut conditions = Vec::new();
        let mut param_count = 1;

        if search.is_some() {
            conditions.push(format!(r"AND name ILIKE ${} ESCAPE '\'", param_count));
            param_count += 1;
        }

        if bookmarked.is_some() {
            conditions.push(format!("AND bookmarked = ${}", param_count));
            param_count += 1;
        }

        (conditions.join(" "), param_count)
    }
}

#[async_trait::async_trait]
impl ImageRepositoryTrait for PostgresImageRepository {
    #[tracing::instrument(skip(self, new_image), fields(db.table = "images", db.operation = "insert"))]
    async fn create(&self, new_image: NewImageAsset) -> Result<ImageAsset, AppError> {
        let sql = format!(
            r#"
            INSERT INTO images (id, name, size, width, height, file_type, storage_key, storage_backend)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            RETURNING {}
            "#,
            IMAGE_COLUMNS
        );

        let row: ImageRow = sqlx::query_as::<Postgres, ImageRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&new_image.name)
            .bind(new_image.size)
            .bind(new_image.width)
            .bind(new_image.height)
            .bind(&new_image.file_type)
            .bind(&new_image.storage_key)
            .bind(new_image.storage_backend)
            .fetch_one(&self.pool)
            .await?;

        Ok(row.to_image_asset())
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select", db.record_id = %id))]
    async fn find_live(&self, id: Uuid) -> Result<ImageAsset, AppError> {
        let sql = format!(
            "SELECT {} FROM images WHERE id = $1 AND deleted_at IS NULL",
            IMAGE_COLUMNS
        );

        let row: Option<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ImageRow::to_image_asset)
            .ok_or_else(AppError::image_not_found)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "select", db.record_id = %id))]
    async fn find_any(&self, id: Uuid) -> Result<Option<ImageAsset>, AppError> {
        let sql = format!("SELECT {} FROM images WHERE id = $1", IMAGE_COLUMNS);

        let row: Option<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(ImageRow::to_image_asset))
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "update", db.record_id = %id))]
    async fn update_bookmark(&self, id: Uuid, bookmarked: bool) -> Result<ImageAsset, AppError> {
        let sql = format!(
            r#"
            UPDATE images
            SET bookmarked = $2, updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING {}
            "#,
            IMAGE_COLUMNS
        );

        let row: Option<ImageRow> = sqlx::query_as::<Postgres, ImageRow>(&sql)
            .bind(id)
            .bind(bookmarked)
            .fetch_optional(&self.pool)
            .await?;

        row.map(ImageRow::to_image_asset)
            .ok_or_else(AppError::image_not_found)
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "update", db.record_id = %id))]
    async fn soft_delete(&self, id: Uuid) -> Result<(), AppError> {
        let result = sqlx::query(
            r#"
            UPDATE images
            SET deleted_at = NOW(), updated_at = NOW()
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::image_not_found());
        }

        Ok(())
    }

    #[tracing::instrument(skip(self, query), fields(db.table = "images", db.operation = "select"))]
    async fn query_page(&self, query: &ImageListQuery) -> Result<ImagePage<ImageAsset>, AppError> {
        let window = query.window();
        let search = query.search_term().map(escape_like);
        let bookmarked = query.bookmark_filter.as_bookmarked();

        let (conditions, param_count) =
            Self::filter_conditions(search.as_deref(), bookmarked);

        let count_sql = format!(
            "SELECT COUNT(*) FROM images WHERE deleted_at IS NULL {}",
            conditions
        );
        let page_sql = format!(
            "SELECT {} FROM images WHERE deleted_at IS NULL {} \
             ORDER BY created_at DESC, id ASC LIMIT ${} OFFSET ${}",
            IMAGE_COLUMNS,
            conditions,
            param_count,
            param_count + 1
        );

        // Bind parameters in the same order they were added
        let mut count_query = sqlx::query_scalar::<Postgres, i64>(&count_sql);
        let mut page_query = sqlx::query_as::<Postgres, ImageRow>(&page_sql);

        if let Some(ref pattern) = search {
            count_query = count_query.bind(pattern);
            page_query = page_query.bind(pattern);
        }

        if let Some(value) = bookmarked {
            count_query = count_query.bind(value);
            page_query = page_query.bind(value);
        }

        let total = count_query.fetch_one(&self.pool).await?;
        let rows = page_query
            .bind(window.page_size)
            .bind(window.offset())
            .fetch_all(&self.pool)
            .await?;

        let images = rows.into_iter().map(ImageRow::to_image_asset).collect();
        Ok(ImagePage::new(images, total, window))
    }

    #[tracing::instrument(skip(self), fields(db.table = "images", db.operation = "aggregate"))]
    async fn counts_by_bookmark(&self) -> Result<BookmarkCounts, AppError> {
        let counts = sqlx::query_as::<Postgres, BookmarkCounts>(
            r#"
            SELECT
                COUNT(*) AS total_images,
                COUNT(*) FILTER (WHERE bookmarked) AS bookmarked_count,
                COUNT(*) FILTER (WHERE NOT bookmarked) AS unbookmarked_count,
                COALESCE(SUM(size) FILTER (WHERE bookmarked), 0)::BIGINT AS total_size_bookmarked,
                COALESCE(SUM(size) FILTER (WHERE NOT bookmarked), 0)::BIGINT AS total_size_unbookmarked
            FROM images
            WHERE deleted_at IS NULL
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(counts)
    }
}

/// Create the image repository backed by the given pool.
pub fn create_image_repository(pool: PgPool) -> Arc<dyn ImageRepositoryTrait> {
    tracing::info!("Initializing PostgreSQL image repository");
    Arc::new(PostgresImageRepository::new(pool))
}
