//! Output destinations: local directory or cloud bucket (S3, R2, GCS, Azure)

use crate::error::{Error, Result};
use bytes::Bytes;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::ObjectStore;
use std::sync::Arc;

/// Where kline files are written, parsed from a path or URL
#[derive(Debug, Clone)]
pub struct Destination {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Base path prefix within the bucket/container
    prefix: String,
    /// URL scheme, `file` for local directories
    scheme: String,
    /// Destination as given, used to report written locations
    base: String,
}

impl Destination {
    /// Parse a destination path or URL
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible, `R2_ENDPOINT_URL`)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/`, `./path/` or `file:///path` - Local filesystem
    ///
    /// Cloud credentials come from the environment.
    pub fn parse(url: &str) -> Result<Self> {
        let mut destination = match url.split_once("://") {
            Some(("s3", rest)) => Self::s3(rest, "s3"),
            Some(("r2", rest)) => Self::s3(rest, "r2"),
            Some(("gs", rest)) => Self::gcs(rest),
            Some(("az", rest)) => Self::azure(rest),
            Some(("file", rest)) => Self::local(rest),
            Some((scheme, _)) => Err(Error::invalid_value(
                "output.destination",
                format!("unsupported scheme '{scheme}'"),
            )),
            None => Self::local(url),
        }?;
        destination.base = url.trim_end_matches('/').to_string();
        Ok(destination)
    }

    fn s3(rest: &str, scheme: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(rest, scheme)?;
        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);

        // AWS_ENDPOINT is read by from_env(); R2 also honors its own variable
        if scheme == "r2" {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;
        Ok(Self::new(Arc::new(store), prefix, scheme))
    }

    fn gcs(rest: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(rest, "gs")?;
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;
        Ok(Self::new(Arc::new(store), prefix, "gs"))
    }

    fn azure(rest: &str) -> Result<Self> {
        let (container, prefix) = split_bucket(rest, "az")?;
        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;
        Ok(Self::new(Arc::new(store), prefix, "az"))
    }

    fn local(path: &str) -> Result<Self> {
        let path = if path.is_empty() { "." } else { path };
        std::fs::create_dir_all(path)
            .map_err(|e| Error::config(format!("Failed to create directory {path}: {e}")))?;

        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to create local store: {e}")))?;
        Ok(Self::new(Arc::new(store), String::new(), "file"))
    }

    fn new(store: Arc<dyn ObjectStore>, prefix: String, scheme: &str) -> Self {
        Self {
            store,
            prefix: prefix.trim_matches('/').to_string(),
            scheme: scheme.to_string(),
            base: String::new(),
        }
    }

    /// Check if this is a cloud destination (not local)
    pub fn is_cloud(&self) -> bool {
        self.scheme != "file"
    }

    /// Get the scheme (s3, r2, gs, az, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Object path a file name resolves to
    pub fn object_path(&self, file_name: &str) -> ObjectPath {
        if self.prefix.is_empty() {
            ObjectPath::from(file_name)
        } else {
            ObjectPath::from(format!("{}/{file_name}", self.prefix))
        }
    }

    /// Write bytes to a file, returning its full location
    pub async fn write(&self, file_name: &str, data: Bytes) -> Result<String> {
        let path = self.object_path(file_name);
        self.store
            .put(&path, data.into())
            .await
            .map_err(|e| Error::output(format!("Failed to write {path}: {e}")))?;
        Ok(format!("{}/{file_name}", self.base))
    }

    /// Read a file back
    pub async fn read(&self, file_name: &str) -> Result<Bytes> {
        let path = self.object_path(file_name);
        let result = self
            .store
            .get(&path)
            .await
            .map_err(|e| Error::output(format!("Failed to read {path}: {e}")))?;
        result
            .bytes()
            .await
            .map_err(|e| Error::output(format!("Failed to read {path}: {e}")))
    }
}

/// Split `bucket/some/prefix` into bucket and prefix
fn split_bucket<'a>(rest: &'a str, scheme: &str) -> Result<(&'a str, String)> {
    let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
    if bucket.is_empty() {
        return Err(Error::invalid_value(
            "output.destination",
            format!("{scheme}:// URL is missing a bucket name"),
        ));
    }
    Ok((bucket, prefix.to_string()))
}
