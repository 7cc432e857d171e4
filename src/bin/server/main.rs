use anyhow::{Context, Result};
use bucket_storage::app::{AppBuilder, AppConfig, StorageBackend};
use clap::Parser;
use std::{net::SocketAddr, path::PathBuf};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "bucket-storage-server")]
#[command(about = "Bucket and object storage server over pluggable backends", long_about = None)]
struct Cli {
    /// Server port to listen on
    #[arg(short, long, env = "SERVER_PORT", default_value = "3000")]
    port: u16,

    /// Server host to bind to
    #[arg(long, env = "SERVER_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Storage backend: memory, local or s3
    #[arg(long, env = "STORAGE_BACKEND", default_value = "memory")]
    storage_backend: String,

    /// Root directory for the local backend
    #[arg(long, env = "LOCAL_STORAGE_ROOT", default_value = "./data")]
    local_root: PathBuf,

    /// S3 endpoint URL (S3-compatible services)
    #[arg(long, env = "S3_ENDPOINT")]
    s3_endpoint: Option<String>,

    /// S3 bucket name
    #[arg(long, env = "S3_BUCKET")]
    s3_bucket: Option<String>,

    /// S3 region
    #[arg(long, env = "S3_REGION", default_value = "us-east-1")]
    s3_region: String,

    /// S3 access key
    #[arg(long, env = "S3_ACCESS_KEY")]
    s3_access_key: Option<String>,

    /// S3 secret key
    #[arg(long, env = "S3_SECRET_KEY")]
    s3_secret_key: Option<String>,

    /// Allow plain HTTP to the S3 endpoint
    #[arg(long, env = "S3_ALLOW_HTTP", default_value = "false")]
    s3_allow_http: bool,

    /// Base URL used when building public and signed URLs
    #[arg(long, env = "PUBLIC_BASE_URL")]
    public_base_url: Option<String>,

    /// Log level, overridden by RUST_LOG
    #[arg(long, env = "LOG_LEVEL", default_value = "info")]
    log_level: String,
}

impl Cli {
    fn to_app_config(&self) -> Result<AppConfig> {
        let storage_backend = match self.storage_backend.as_str() {
            "memory" => StorageBackend::InMemory,
            "local" => StorageBackend::Local {
                root: self.local_root.clone(),
            },
            "s3" => {
                let bucket = self
                    .s3_bucket
                    .clone()
                    .context("S3_BUCKET is required for S3 backend")?;

                StorageBackend::S3 {
                    bucket,
                    region: self.s3_region.clone(),
                    endpoint: self.s3_endpoint.clone(),
                    access_key: self.s3_access_key.clone(),
                    secret_key: self.s3_secret_key.clone(),
                    allow_http: self.s3_allow_http,
                }
            }
            _ => anyhow::bail!("Unknown storage backend: {}", self.storage_backend),
        };

        Ok(AppConfig {
            storage_backend,
            public_base_url: self.public_base_url.clone(),
        })
    }

    fn init_logging(&self) -> Result<()> {
        let level = match self.log_level.to_lowercase().as_str() {
            "trace" => "trace",
            "debug" => "debug",
            "warn" => "warn",
            "error" => "error",
            _ => "info",
        };

        let env_filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(format!("bucket_storage={level},tower_http={level}")));

        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
            .context("Failed to initialize logging")?;

        Ok(())
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    cli.init_logging()?;

    info!("Starting bucket storage server");
    info!("Storage backend: {}", cli.storage_backend);

    let config = cli.to_app_config()?;

    let app_services = AppBuilder::new()
        .with_config(config)
        .build()
        .await
        .context("Failed to build application")?;

    let router = app_services.router();

    let addr: SocketAddr = format!("{}:{}", cli.host, cli.port).parse()?;
    let listener = TcpListener::bind(addr).await?;

    info!("Server listening on http://{}", addr);

    axum::serve(listener, router)
        .await
        .context("Failed to start server")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "bucket-storage-server",
            "--port",
            "8080",
            "--storage-backend",
            "s3",
            "--s3-bucket",
            "test-bucket",
            "--s3-endpoint",
            "http://localhost:9000",
            "--s3-allow-http",
        ]);

        assert_eq!(cli.port, 8080);
        assert_eq!(cli.storage_backend, "s3");

        match cli.to_app_config().unwrap().storage_backend {
            StorageBackend::S3 {
                bucket,
                endpoint,
                allow_http,
                ..
            } => {
                assert_eq!(bucket, "test-bucket");
                assert_eq!(endpoint.as_deref(), Some("http://localhost:9000"));
                assert!(allow_http);
            }
            other => panic!("Expected S3 backend, got {:?}", other),
        }
    }

    #[test]
    fn test_memory_config() {
        let cli = Cli::parse_from(["bucket-storage-server"]);

        let config = cli.to_app_config().unwrap();
        assert!(matches!(config.storage_backend, StorageBackend::InMemory));
        assert!(config.public_base_url.is_none());
    }

    #[test]
    fn test_s3_requires_bucket() {
        let cli = Cli::parse_from(["bucket-storage-server", "--storage-backend", "s3"]);
        assert!(cli.to_app_config().is_err());
    }
}
