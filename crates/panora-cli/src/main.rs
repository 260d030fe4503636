//! Panora CLI: manage the image catalog from the command line.
//!
//! Reads the same environment as the service (DATABASE_URL, STORAGE_BACKEND,
//! S3_BUCKET, ...). `.env` is honored.

use std::path::PathBuf;

use anyhow::Context;
use clap::{Parser, Subcommand};
use panora_cli::{
    default_download_path, exit_code, init_tracing, parse_bookmark_filter, print_json, ErrorReport,
};
use panora_core::{AppError, BookmarkFilter, Config, ErrorMetadata, ImageListQuery, LogLevel};
use panora_db::{create_image_repository, setup_database};
use panora_services::{
    create_storage, ImageCatalog, Retrieval, Storage, StorageSettings, UploadedImage,
};
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "panora", about = "Panora image catalog CLI", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate and upload a JPEG or PNG image
    Upload {
        /// Path to the image file
        file: PathBuf,
        /// Name to record instead of the file name
        #[arg(long)]
        name: Option<String>,
        /// Content type claimed for the upload
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Show one image
    Get {
        id: Uuid,
        /// Include soft-deleted images
        #[arg(long)]
        any: bool,
    },
    /// Resolve how an image is delivered: streamed bytes or a link
    Retrieve { id: Uuid },
    /// Write an image's bytes to disk
    Download {
        id: Uuid,
        /// Output path (defaults to the recorded file name)
        #[arg(long, short)]
        output: Option<PathBuf>,
    },
    /// List images, newest first
    List {
        /// Case-insensitive substring of the name
        #[arg(long)]
        search: Option<String>,
        /// all, bookmarked or unbookmarked
        #[arg(long, default_value = "all", value_parser = parse_bookmark_filter)]
        bookmark_filter: BookmarkFilter,
        #[arg(long)]
        page: Option<i64>,
        /// Page size (1-10)
        #[arg(long)]
        limit: Option<i64>,
    },
    /// Bookmark an image, or clear the bookmark with --unset
    Bookmark {
        id: Uuid,
        #[arg(long)]
        unset: bool,
    },
    /// Delete an image and its stored bytes
    Delete { id: Uuid },
    /// Counts and total sizes by bookmark state
    Stats,
}

async fn build_catalog(config: &Config) -> anyhow::Result<ImageCatalog> {
    let pool = setup_database(config).await?;
    let storage = create_storage(&StorageSettings::from(config))
        .await
        .context("Failed to initialize storage backend")?;
    tracing::info!(backend = %storage.backend_type(), "Storage backend ready");

    Ok(ImageCatalog::new(config, create_image_repository(pool), storage))
}

async fn run(catalog: &ImageCatalog, command: Commands) -> Result<(), AppError> {
    match command {
        Commands::Upload {
            file,
            name,
            content_type,
        } => {
            let data = tokio::fs::read(&file).await?;
            let filename = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
            };
            let declared_size = Some(data.len() as u64);
            let image = catalog
                .upload(UploadedImage {
                    data,
                    filename,
                    content_type,
                    declared_size,
                })
                .await?;
            print_json(&image)?;
        }
        Commands::Get { id, any } => {
            if any {
                print_json(&catalog.get_any(id).await?)?;
            } else {
                print_json(&catalog.get(id).await?)?;
            }
        }
        Commands::Retrieve { id } => match catalog.retrieve(id).await? {
            Retrieval::Link { url, expires_at } => {
                print_json(&serde_json::json!({ "url": url, "expiresAt": expires_at }))?;
            }
            Retrieval::Stream(stream) => {
                print_json(&serde_json::json!({
                    "contentType": stream.content_type,
                    "contentDisposition": stream.content_disposition,
                    "contentLength": stream.content_length,
                }))?;
            }
        },
        Commands::Download { id, output } => {
            let image = catalog.get(id).await?;
            let stream = catalog.download(id).await?;
            let path = output.unwrap_or_else(|| default_download_path(&image.name));
            let data = stream.into_bytes().await?;
            tokio::fs::write(&path, &data).await?;
            print_json(&serde_json::json!({
                "id": id,
                "path": path.display().to_string(),
                "size": data.len(),
            }))?;
        }
        Commands::List {
            search,
            bookmark_filter,
            page,
            limit,
        } => {
            let query = ImageListQuery {
                search,
                bookmark_filter,
                page,
                page_size: limit,
            };
            print_json(&catalog.list(&query).await?)?;
        }
        Commands::Bookmark { id, unset } => {
            print_json(&catalog.bookmark(id, !unset).await?)?;
        }
        Commands::Delete { id } => {
            print_json(&catalog.delete(id).await?)?;
        }
        Commands::Stats => {
            print_json(&catalog.analytics().await?)?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(config.log_format());
    config.validate().context("Invalid configuration")?;
    tracing::debug!(environment = config.environment(), "Configuration loaded");

    let catalog = build_catalog(&config).await?;

    if let Err(err) = run(&catalog, cli.command).await {
        let error_type = err.error_type();
        match err.log_level() {
            LogLevel::Error => {
                tracing::error!(error_type, error = %err.detailed_message(), "Command failed")
            }
            LogLevel::Warn => {
                tracing::warn!(error_type, error = %err.detailed_message(), "Command failed")
            }
            LogLevel::Debug => {
                tracing::debug!(error_type, error = %err.detailed_message(), "Command failed")
            }
        }
        eprintln!("{}", serde_json::to_string_pretty(&ErrorReport::from(&err))?);
        std::process::exit(exit_code(&err));
    }

    Ok(())
}
