//! Fixed limits of the image catalog.

/// Minimum accepted image width in pixels.
pub const MIN_IMAGE_WIDTH: u32 = 100;

/// Minimum accepted image height in pixels.
pub const MIN_IMAGE_HEIGHT: u32 = 50;

/// Minimum width:height ratio, expressed as the integer multiplier applied to height.
pub const MIN_ASPECT_RATIO: u32 = 2;

/// Upper bound for the page size of a listing.
pub const MAX_PAGE_SIZE: i64 = 10;

/// Page size used when the caller does not send one.
pub const DEFAULT_PAGE_SIZE: i64 = MAX_PAGE_SIZE;

/// Key prefix of blobs written by the local filesystem backend.
pub const LOCAL_KEY_PREFIX: &str = "uploads/images";

/// Key prefix of blobs written by the remote object store backend.
pub const REMOTE_KEY_PREFIX: &str = "images";

/// Path of the same-service endpoint that streams local assets.
pub const LOCAL_DOWNLOAD_PATH: &str = "/api/images/local-download";

pub const DEFAULT_PRESIGNED_URL_TTL_SECS: u64 = 3600;
pub const DEFAULT_ENRICHMENT_TIMEOUT_MS: u64 = 5000;
pub const DEFAULT_S3_REGION: &str = "ap-southeast-1";
