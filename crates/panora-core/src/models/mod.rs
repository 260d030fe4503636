pub mod image;
pub mod listing;

pub use image::{DeleteResult, ImageAsset, ImageAssetResponse, NewImageAsset};
pub use listing::{
    BookmarkCounts, BookmarkFilter, ImageListQuery, ImagePage, ListedImage, PageWindow,
};
