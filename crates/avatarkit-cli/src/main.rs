//! avatarkit CLI: validate, upload and delete media, and change the profile picture.
//!
//! Configuration comes from the environment (and `.env`): MEDIA_PROVIDER,
//! CLOUDINARY_* or LOCAL_MEDIA_*, API_BASE_URL, SESSION_FILE.

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use avatarkit_api_client::ApiClient;
use avatarkit_cli::{init_tracing, print_json, request_from_path};
use avatarkit_core::{validate_file, Config, FileValidation, ResourceKind, UploadOptions};
use avatarkit_gateway::UploadGateway;
use avatarkit_profile::{AvatarFile, AvatarUploadFlow};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "avatarkit", about = "Media upload gateway and profile picture CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a file against the allowed types and size limit without uploading
    Validate {
        file: PathBuf,
        /// Override the content type derived from the extension
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Upload a file through the gateway
    Upload {
        file: PathBuf,
        #[arg(long)]
        folder: Option<String>,
        /// auto, image, video or raw
        #[arg(long)]
        resource_type: Option<ResourceKind>,
        /// Chunk size in bytes for large files
        #[arg(long)]
        chunk_size: Option<u64>,
        #[arg(long)]
        content_type: Option<String>,
    },
    /// Delete an uploaded asset by public id
    Delete {
        public_id: String,
        #[arg(long, default_value = "image")]
        resource_type: ResourceKind,
    },
    /// Upload an image and set it as the profile picture
    Avatar { file: PathBuf },
    /// Store session tokens for later API calls
    Login {
        access_token: String,
        refresh_token: String,
    },
    /// Forget the stored session
    Logout,
}

async fn gateway(config: &Config) -> anyhow::Result<UploadGateway> {
    config.validate().context("Invalid media configuration")?;
    UploadGateway::from_config(config)
        .await
        .context("Failed to create media provider")
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let config = Config::from_env().context("Failed to load configuration")?;
    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { file, content_type } => {
            let request = request_from_path(&file, content_type.as_deref()).await?;
            let validation =
                FileValidation::from(validate_file(Some(&request), &config.validation_rules()));
            print_json(&validation)?;
        }
        Commands::Upload {
            file,
            folder,
            resource_type,
            chunk_size,
            content_type,
        } => {
            let options = UploadOptions {
                folder,
                resource_type,
                chunk_size,
                ..UploadOptions::default()
            };
            let request = request_from_path(&file, content_type.as_deref())
                .await?
                .with_options(options);

            let gateway = gateway(&config).await?;
            let result = gateway
                .upload_with_progress(request, &|p| {
                    tracing::debug!(loaded = p.loaded, total = p.total, "Upload progress");
                })
                .await;
            print_json(&result)?;
            if !result.is_success() {
                anyhow::bail!("Upload failed");
            }
        }
        Commands::Delete {
            public_id,
            resource_type,
        } => {
            let gateway = gateway(&config).await?;
            let result = gateway.delete(&public_id, resource_type).await;
            print_json(&result)?;
            if !result.success {
                anyhow::bail!("Delete failed");
            }
        }
        Commands::Avatar { file } => {
            let gateway = gateway(&config).await?;
            let client = ApiClient::from_config(&config).context(
                "Failed to create API client. Set API_BASE_URL and SESSION_FILE",
            )?;
            let avatar = AvatarFile::from_path(&file)
                .await
                .with_context(|| format!("Failed to read file: {}", file.display()))?;

            let flow = AvatarUploadFlow::new(Arc::new(gateway), Arc::new(client));
            let outcome = flow.select(avatar).await?;
            print_json(&serde_json::json!({ "success": true, "profilePic": outcome.url }))?;
        }
        Commands::Login {
            access_token,
            refresh_token,
        } => {
            let client = ApiClient::from_config(&config)?;
            client.login_with(&access_token, &refresh_token)?;
            if config.client.session_file.is_none() {
                tracing::warn!("SESSION_FILE is not set; the session will not be kept");
            }
            print_json(&serde_json::json!({ "success": true }))?;
        }
        Commands::Logout => {
            ApiClient::from_config(&config)?.logout()?;
            print_json(&serde_json::json!({ "success": true }))?;
        }
    }

    Ok(())
}
