//! PeerStore command-line gateway
//!
//! Runs one orchestrator workflow per invocation against the cluster
//! described by the configuration file.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use peerstore_core::block::{BucketId, ObjectId};
use peerstore_gateway::{build_controller, GatewayConfig};
use peerstore_metadata::OwnerId;
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

#[derive(Parser)]
#[command(name = "peerstore")]
#[command(about = "Erasure-coded peer object store")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, global = true, env = "PEERSTORE_CONFIG", default_value = "peerstore.toml")]
    config: PathBuf,

    /// Debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a bucket
    Mb {
        name: String,
        #[arg(long, default_value = "0")]
        owner: OwnerId,
    },

    /// List the buckets of an owner
    Buckets {
        #[arg(long, default_value = "0")]
        owner: OwnerId,
    },

    /// Remove an empty bucket
    Rb { bucket: BucketId },

    /// Upload a file
    Put {
        bucket: BucketId,
        file: PathBuf,
        /// Object name (defaults to the file name)
        #[arg(long)]
        name: Option<String>,
        #[arg(long, default_value = "application/octet-stream")]
        content_type: String,
    },

    /// Download an object to a file, or stdout
    Get {
        bucket: BucketId,
        object: ObjectId,
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the objects of a bucket
    Ls { bucket: BucketId },

    /// Show an object's metadata as JSON
    Stat { bucket: BucketId, object: ObjectId },

    /// Delete an object
    Rm { bucket: BucketId, object: ObjectId },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    let config = GatewayConfig::load_or_default(&cli.config).with_env_overrides();
    let controller = build_controller(&config).context("Failed to start gateway")?;

    match cli.command {
        Commands::Mb { name, owner } => {
            let bucket = controller.create_bucket(&name, owner).await?;
            println!("{}", bucket.id);
        }
        Commands::Buckets { owner } => {
            for bucket in controller.list_buckets(owner).await? {
                println!("{}\t{}", bucket.id, bucket.name);
            }
        }
        Commands::Rb { bucket } => {
            controller.delete_bucket(bucket).await?;
        }
        Commands::Put {
            bucket,
            file,
            name,
            content_type,
        } => {
            let name = match name {
                Some(name) => name,
                None => file
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .context("File path has no file name")?,
            };
            let source = std::fs::File::open(&file)
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let size = source.metadata()?.len();

            let meta = controller
                .upload_object(bucket, &name, &content_type, size, vec![source])
                .await?;
            info!(
                object_id = meta.object_id(),
                data = meta.data_blocks.len(),
                parity = meta.parity_blocks.len(),
                "Upload complete"
            );
            println!("{}", meta.object_id());
        }
        Commands::Get {
            bucket,
            object,
            output,
        } => {
            let body = controller.download_object(bucket, object).await?;
            match output {
                Some(path) => tokio::fs::write(&path, &body)
                    .await
                    .with_context(|| format!("Failed to write {}", path.display()))?,
                None => std::io::stdout().lock().write_all(&body)?,
            }
        }
        Commands::Ls { bucket } => {
            for meta in controller.list_objects(bucket).await? {
                println!(
                    "{}\t{}\t{}\t{}+{}",
                    meta.object_id(),
                    meta.object.size,
                    meta.object.name,
                    meta.object.data_shards,
                    meta.object.parity_shards
                );
            }
        }
        Commands::Stat { bucket, object } => {
            let meta = controller.get_object_meta(bucket, object).await?;
            println!("{}", serde_json::to_string_pretty(&meta)?);
        }
        Commands::Rm { bucket, object } => {
            controller.delete_object(bucket, object).await?;
        }
    }

    Ok(())
}
