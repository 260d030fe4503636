use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::image::ImageAssetResponse;
use crate::constants::{DEFAULT_PAGE_SIZE, MAX_PAGE_SIZE};

/// Bookmark partition applied to a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookmarkFilter {
    #[default]
    All,
    Bookmarked,
    Unbookmarked,
}

impl BookmarkFilter {
    /// The `bookmarked` value rows must have, or `None` for no restriction.
    pub fn as_bookmarked(&self) -> Option<bool> {
        match self {
            BookmarkFilter::All => None,
            BookmarkFilter::Bookmarked => Some(true),
            BookmarkFilter::Unbookmarked => Some(false),
        }
    }

    pub fn matches(&self, bookmarked: bool) -> bool {
        match self.as_bookmarked() {
            Some(wanted) => wanted == bookmarked,
            None => true,
        }
    }
}

impl FromStr for BookmarkFilter {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" => Ok(BookmarkFilter::All),
            "bookmarked" => Ok(BookmarkFilter::Bookmarked),
            "unbookmarked" => Ok(BookmarkFilter::Unbookmarked),
            _ => Err(anyhow::anyhow!("Invalid bookmark filter: {}", s)),
        }
    }
}

/// Listing request as received from a caller. Page values are raw and
/// clamped by [`ImageListQuery::window`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ImageListQuery {
    pub search: Option<String>,
    pub bookmark_filter: BookmarkFilter,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

impl ImageListQuery {
    /// Search text with surrounding whitespace removed; blank means no filter.
    pub fn search_term(&self) -> Option<&str> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|term| !term.is_empty())
    }

    pub fn window(&self) -> PageWindow {
        PageWindow::clamped(self.page, self.page_size)
    }
}

/// A clamped page request: `page >= 1`, `1 <= page_size <= MAX_PAGE_SIZE`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub page: i64,
    pub page_size: i64,
}

impl PageWindow {
    pub fn clamped(page: Option<i64>, page_size: Option<i64>) -> Self {
        Self {
            page: page.unwrap_or(1).max(1),
            page_size: page_size
                .unwrap_or(DEFAULT_PAGE_SIZE)
                .clamp(1, MAX_PAGE_SIZE),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.page_size)
    }

    /// `max(1, ceil(total / page_size))`
    pub fn total_pages(&self, total: i64) -> i64 {
        let pages = (total.max(0) + self.page_size - 1) / self.page_size;
        pages.max(1)
    }
}

/// One page of listing output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImagePage<T> {
    pub images: Vec<T>,
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub total_pages: i64,
}

impl<T> ImagePage<T> {
    pub fn new(images: Vec<T>, total: i64, window: PageWindow) -> Self {
        Self {
            images,
            total,
            page: window.page,
            limit: window.page_size,
            total_pages: window.total_pages(total),
        }
    }

    pub fn map<U, F>(self, f: F) -> ImagePage<U>
    where
        F: FnMut(T) -> U,
    {
        ImagePage {
            images: self.images.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            limit: self.limit,
            total_pages: self.total_pages,
        }
    }
}

/// Listing row: the asset plus the URLs derived for presentation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListedImage {
    #[serde(flatten)]
    pub image: ImageAssetResponse,
    /// Empty when derivation failed or timed out.
    pub preview_url: String,
    pub thumbnail_url: Option<String>,
}

/// Aggregate counters over live assets.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct BookmarkCounts {
    pub total_images: i64,
    pub bookmarked_count: i64,
    pub unbookmarked_count: i64,
    pub total_size_bookmarked: i64,
    pub total_size_unbookmarked: i64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_clamps_out_of_range_values() {
        assert_eq!(
            PageWindow::clamped(Some(0), Some(999)),
            PageWindow {
                page: 1,
                page_size: 10
            }
        );
        assert_eq!(
            PageWindow::clamped(Some(-5), Some(0)),
            PageWindow {
                page: 1,
                page_size: 1
            }
        );
        assert_eq!(
            PageWindow::clamped(None, None),
            PageWindow {
                page: 1,
                page_size: 10
            }
        );
        assert_eq!(PageWindow::clamped(Some(3), Some(4)).offset(), 8);
    }

    #[test]
    fn test_total_pages_never_below_one() {
        let window = PageWindow::clamped(Some(1), Some(10));
        assert_eq!(window.total_pages(0), 1);
        assert_eq!(window.total_pages(10), 1);
        assert_eq!(window.total_pages(11), 2);
        assert_eq!(PageWindow::clamped(None, Some(3)).total_pages(7), 3);
    }

    #[test]
    fn test_bookmark_filter() {
        assert_eq!(
            "Bookmarked".parse::<BookmarkFilter>().unwrap(),
            BookmarkFilter::Bookmarked
        );
        assert_eq!("".parse::<BookmarkFilter>().unwrap(), BookmarkFilter::All);
        assert!("starred".parse::<BookmarkFilter>().is_err());

        assert!(BookmarkFilter::All.matches(true));
        assert!(BookmarkFilter::All.matches(false));
        assert!(BookmarkFilter::Unbookmarked.matches(false));
        assert!(!BookmarkFilter::Unbookmarked.matches(true));
    }

    #[test]
    fn test_blank_search_is_no_filter() {
        let query = ImageListQuery {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), None);

        let query = ImageListQuery {
            search: Some(" Sunset ".to_string()),
            ..Default::default()
        };
        assert_eq!(query.search_term(), Some("Sunset"));
    }

    #[test]
    fn test_page_serializes_external_shape() {
        let page = ImagePage::new(vec![1, 2], 12, PageWindow::clamped(Some(2), Some(2)));
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["totalPages"], 6);
        assert_eq!(json["limit"], 2);
        assert_eq!(json["page"], 2);
        assert_eq!(json["images"].as_array().unwrap().len(), 2);
    }
}
