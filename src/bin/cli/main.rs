use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use reqwest::{Client, RequestBuilder, Response};
use serde_json::{json, Value};

#[derive(Parser, Debug)]
#[command(name = "bucket-storage-cli")]
#[command(about = "CLI for interacting with the bucket storage server", long_about = None)]
struct Cli {
    /// Server URL
    #[arg(short, long, env = "BUCKET_STORAGE_URL", default_value = "http://localhost:3000")]
    url: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Show the backend's capabilities
    Caps,

    /// List buckets
    Buckets,

    /// Create a bucket
    CreateBucket {
        name: String,
        /// Make objects readable without a signed URL
        #[arg(long)]
        public: bool,
        /// Per-bucket upload size limit in bytes
        #[arg(long)]
        file_size_limit: Option<u64>,
        /// Allowed media types, e.g. image/*
        #[arg(long = "allow-mime")]
        allowed_mime_types: Vec<String>,
    },

    /// Delete an empty bucket
    DeleteBucket { name: String },

    /// Upload a file
    Put {
        bucket: String,
        /// Object path inside the bucket
        path: String,
        /// Local file to upload
        file: String,
        #[arg(long)]
        content_type: Option<String>,
        #[arg(long)]
        cache_control: Option<String>,
        /// Replace an existing object
        #[arg(long)]
        upsert: bool,
    },

    /// Download an object
    Get {
        bucket: String,
        path: String,
        /// Output file path; stdout when omitted
        #[arg(short, long)]
        output: Option<String>,
    },

    /// List objects
    Ls {
        bucket: String,
        #[arg(short, long)]
        prefix: Option<String>,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        offset: Option<usize>,
        /// Sort column: name, created_at or updated_at
        #[arg(long)]
        sort: Option<String>,
        #[arg(long)]
        desc: bool,
    },

    /// Delete one or more objects (all or none)
    Rm {
        bucket: String,
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Move an object within a bucket
    Mv {
        bucket: String,
        from: String,
        to: String,
    },

    /// Copy an object within a bucket
    Cp {
        bucket: String,
        from: String,
        to: String,
    },

    /// Create a signed URL
    Sign {
        bucket: String,
        path: String,
        /// Lifetime in seconds
        #[arg(long, default_value = "3600")]
        expires_in: u64,
        /// Ask the browser to download
        #[arg(long)]
        download: bool,
    },
}

struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    fn new(base_url: &str) -> Self {
        Self {
            http: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send and turn non-2xx answers into errors carrying the server's code
    async fn send(&self, request: RequestBuilder) -> Result<Response> {
        let response = request.send().await.context("Request failed")?;
        if response.status().is_success() {
            return Ok(response);
        }

        let status = response.status();
        match response.json::<Value>().await {
            Ok(body) => anyhow::bail!(
                "{} ({}): {}",
                body["code"].as_str().unwrap_or("UNKNOWN"),
                status,
                body["message"].as_str().unwrap_or_default()
            ),
            Err(_) => anyhow::bail!("Server returned {}", status),
        }
    }

    async fn json(&self, request: RequestBuilder) -> Result<Value> {
        let response = self.send(request).await?;
        response.json().await.context("Invalid JSON response")
    }
}

/// `/{route}/{bucket}/{path}` with the bucket and each path segment percent-encoded
fn object_route(route: &str, bucket: &str, path: &str) -> String {
    let path = path
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");
    format!("/{}/{}/{}", route, urlencoding::encode(bucket), path)
}

fn bucket_route(route: &str, bucket: &str) -> String {
    format!("/{}/{}", route, urlencoding::encode(bucket))
}

fn print_json(value: &Value) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

async fn run(cli: Cli) -> Result<()> {
    let api = ApiClient::new(&cli.url);
    let http = &api.http;

    match cli.command {
        Commands::Caps => {
            let caps = api.json(http.get(api.url("/capabilities"))).await?;
            print_json(&caps)?;
        }
        Commands::Buckets => {
            let buckets = api.json(http.get(api.url("/bucket"))).await?;
            print_json(&buckets)?;
        }
        Commands::CreateBucket {
            name,
            public,
            file_size_limit,
            allowed_mime_types,
        } => {
            let mut body = json!({ "name": name, "public": public });
            if let Some(limit) = file_size_limit {
                body["fileSizeLimit"] = json!(limit);
            }
            if !allowed_mime_types.is_empty() {
                body["allowedMimeTypes"] = json!(allowed_mime_types);
            }

            let bucket = api.json(http.post(api.url("/bucket")).json(&body)).await?;
            print_json(&bucket)?;
        }
        Commands::DeleteBucket { name } => {
            let reply = api
                .json(http.delete(api.url(&bucket_route("bucket", &name))))
                .await?;
            print_json(&reply)?;
        }
        Commands::Put {
            bucket,
            path,
            file,
            content_type,
            cache_control,
            upsert,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file))?;

            let mut request = http
                .post(api.url(&object_route("object", &bucket, &path)))
                .body(data);
            if let Some(content_type) = content_type {
                request = request.header("content-type", content_type);
            }
            if let Some(cache_control) = cache_control {
                request = request.header("cache-control", cache_control);
            }
            if upsert {
                request = request.header("x-upsert", "true");
            }

            let record = api.json(request).await?;
            print_json(&record)?;
        }
        Commands::Get {
            bucket,
            path,
            output,
        } => {
            let response = api
                .send(http.get(api.url(&object_route("object", &bucket, &path))))
                .await?;
            let data = response.bytes().await?;

            match output {
                Some(output) => {
                    tokio::fs::write(&output, &data)
                        .await
                        .with_context(|| format!("Failed to write {}", output))?;
                    eprintln!("Wrote {} bytes to {}", data.len(), output);
                }
                None => {
                    use std::io::Write;
                    std::io::stdout().write_all(&data)?;
                }
            }
        }
        Commands::Ls {
            bucket,
            prefix,
            limit,
            offset,
            sort,
            desc,
        } => {
            let mut body = json!({ "prefix": prefix, "limit": limit, "offset": offset });
            if let Some(column) = sort {
                body["sortBy"] = json!({
                    "column": column,
                    "order": if desc { "desc" } else { "asc" },
                });
            }

            let listing = api
                .json(http.post(api.url(&bucket_route("list", &bucket))).json(&body))
                .await?;
            print_json(&listing)?;
        }
        Commands::Rm { bucket, paths } => {
            let reply = api
                .json(
                    http.post(api.url(&bucket_route("remove", &bucket)))
                        .json(&json!({ "prefixes": paths })),
                )
                .await?;
            print_json(&reply)?;
        }
        Commands::Mv { bucket, from, to } => {
            let body = json!({ "bucketId": bucket, "sourceKey": from, "destinationKey": to });
            let record = api.json(http.post(api.url("/move")).json(&body)).await?;
            print_json(&record)?;
        }
        Commands::Cp { bucket, from, to } => {
            let body = json!({ "bucketId": bucket, "sourceKey": from, "destinationKey": to });
            let record = api.json(http.post(api.url("/copy")).json(&body)).await?;
            print_json(&record)?;
        }
        Commands::Sign {
            bucket,
            path,
            expires_in,
            download,
        } => {
            let body = json!({ "expiresIn": expires_in, "download": download });
            let reply = api
                .json(
                    http.post(api.url(&object_route("signed-url", &bucket, &path)))
                        .json(&body),
                )
                .await?;
            println!("{}", reply["url"].as_str().unwrap_or_default());
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    run(cli).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_put() {
        let cli = Cli::parse_from([
            "bucket-storage-cli",
            "put",
            "media",
            "a/b.png",
            "./b.png",
            "--content-type",
            "image/png",
            "--upsert",
        ]);

        match cli.command {
            Commands::Put {
                bucket,
                path,
                upsert,
                content_type,
                ..
            } => {
                assert_eq!(bucket, "media");
                assert_eq!(path, "a/b.png");
                assert!(upsert);
                assert_eq!(content_type.as_deref(), Some("image/png"));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rm_requires_paths() {
        assert!(Cli::try_parse_from(["bucket-storage-cli", "rm", "media"]).is_err());
    }

    #[test]
    fn test_object_routes_are_encoded() {
        assert_eq!(
            object_route("object", "media", "reports/q1?.pdf"),
            "/object/media/reports/q1%3F.pdf"
        );
        assert_eq!(
            object_route("signed-url", "media", "a b/#1.txt"),
            "/signed-url/media/a%20b/%231.txt"
        );
        assert_eq!(bucket_route("list", "media"), "/list/media");
    }

    #[test]
    fn test_base_url_is_trimmed() {
        let api = ApiClient::new("http://localhost:3000/");
        assert_eq!(api.url("/bucket"), "http://localhost:3000/bucket");
    }
}
