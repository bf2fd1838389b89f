use async_trait::async_trait;
use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::primitives::ByteStream;
use aws_sdk_s3::Client;
use tracing::{debug, error, info};

use super::BlobStore;
use crate::error::{NotebridgeError, Result};

/// Blob store backed by an S3-compatible bucket
pub struct S3BlobStore {
    client: Client,
    bucket_name: String,
}

impl S3BlobStore {
    /// Create a client for `bucket_name`.
    ///
    /// Credentials come from the default AWS provider chain. `endpoint_url`
    /// points the client at a non-AWS implementation (GCS interop, MinIO),
    /// in which case path-style addressing is used.
    pub async fn new(bucket_name: String, region: Option<String>, endpoint_url: Option<String>) -> Self {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(Region::new(region));
        }
        let sdk_config = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&sdk_config);
        if let Some(endpoint) = &endpoint_url {
            builder = builder.endpoint_url(endpoint).force_path_style(true);
        }
        let client = Client::from_conf(builder.build());

        info!(bucket = %bucket_name, endpoint = ?endpoint_url, "S3 blob store initialized");
        Self { client, bucket_name }
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn put(&self, key: &str, data: Vec<u8>, content_type: Option<String>) -> Result<()> {
        debug!("Writing to S3 bucket {} with key: {}", self.bucket_name, key);
        let size = data.len();

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(key)
            .set_content_type(content_type)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| {
                error!("S3 PUT failed - Bucket: {}, Key: {}, Error: {:?}", self.bucket_name, key, e);
                NotebridgeError::Storage(format!("Failed to write to S3: {e}"))
            })?;

        info!(bucket = %self.bucket_name, key, size, "Wrote object");
        Ok(())
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        debug!("Reading from S3 bucket {} with key: {}", self.bucket_name, key);

        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) => {
                if e.as_service_error().is_some_and(|se| se.is_no_such_key()) {
                    return Ok(None);
                }
                error!("S3 GET failed - Bucket: {}, Key: {}, Error: {:?}", self.bucket_name, key, e);
                return Err(NotebridgeError::Storage(format!("Failed to read from S3: {e}")));
            }
        };

        let body = output
            .body
            .collect()
            .await
            .map_err(|e| NotebridgeError::Storage(format!("Failed to collect body: {e}")))?;

        Ok(Some(body.into_bytes().to_vec()))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        debug!("Deleting from S3 bucket {} with key: {}", self.bucket_name, key);

        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| NotebridgeError::Storage(format!("Failed to delete from S3: {e}")))?;

        info!(bucket = %self.bucket_name, key, "Deleted object");
        Ok(())
    }
}
