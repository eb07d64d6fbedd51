//! S3-compatible object storage provider (requires the `s3` feature).

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::presigning::PresigningConfig;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use chrono::{DateTime, Utc};
use tracing::{debug, info};

use drivehub_core::config::storage::S3StorageConfig;
use drivehub_core::error::{AppError, ErrorKind};
use drivehub_core::result::AppResult;
use drivehub_core::traits::storage::{BlobMeta, BlobStorage, Disposition};

use super::{file_name_of, validate_key};

/// S3-compatible blob storage.
#[derive(Debug, Clone)]
pub struct S3BlobStorage {
    client: Client,
    bucket: String,
}

impl S3BlobStorage {
    /// Create a new S3 provider from configuration.
    pub async fn new(config: &S3StorageConfig) -> AppResult<Self> {
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 blob storage"
        );

        if config.bucket.is_empty() {
            return Err(AppError::configuration("S3 bucket must be set"));
        }

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(aws_config::Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(aws_sdk_s3::config::Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "drivehub-config",
            ));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_s3::config::Builder::from(&shared);
        if !config.endpoint.is_empty() {
            builder = builder
                .endpoint_url(config.endpoint.clone())
                .force_path_style(true);
        }

        Ok(Self {
            client: Client::from_conf(builder.build()),
            bucket: config.bucket.clone(),
        })
    }

    fn upstream<E>(message: impl Into<String>, err: E) -> AppError
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        AppError::with_source(ErrorKind::UpstreamUnavailable, message, err)
    }

    fn presigning(expires_in: Duration) -> AppResult<PresigningConfig> {
        PresigningConfig::expires_in(expires_in).map_err(|e| {
            AppError::with_source(ErrorKind::Configuration, "Invalid presign expiry", e)
        })
    }

    fn to_chrono(ts: Option<&aws_sdk_s3::primitives::DateTime>) -> DateTime<Utc> {
        ts.and_then(|t| DateTime::from_timestamp(t.secs(), t.subsec_nanos()))
            .unwrap_or_else(Utc::now)
    }
}

#[async_trait]
impl BlobStorage for S3BlobStorage {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        self.client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .map(|_| true)
            .map_err(|e| Self::upstream("S3 health check failed", e))
    }

    async fn presign_upload(
        &self,
        key: &str,
        content_type: &str,
        expires_in: Duration,
    ) -> AppResult<String> {
        validate_key(key)?;
        let request = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .presigned(Self::presigning(expires_in)?)
            .await
            .map_err(|e| Self::upstream(format!("Failed to presign upload for {key}"), e))?;
        Ok(request.uri().to_string())
    }

    async fn presign_download(
        &self,
        key: &str,
        disposition: Disposition,
        expires_in: Duration,
    ) -> AppResult<String> {
        validate_key(key)?;
        let request = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .response_content_disposition(format!(
                "{}; filename=\"{}\"",
                disposition.as_str(),
                file_name_of(key)
            ))
            .presigned(Self::presigning(expires_in)?)
            .await
            .map_err(|e| Self::upstream(format!("Failed to presign download for {key}"), e))?;
        Ok(request.uri().to_string())
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        validate_key(key)?;
        let len = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| Self::upstream(format!("Failed to upload {key}"), e))?;
        debug!(key, bytes = len, "Uploaded object");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        let output = self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| {
                if e.as_service_error().is_some_and(|s| s.is_no_such_key()) {
                    AppError::not_found(format!("Blob not found: {key}"))
                } else {
                    Self::upstream(format!("Failed to download {key}"), e)
                }
            })?;
        let body = output
            .body
            .collect()
            .await
            .map_err(|e| Self::upstream(format!("Failed to read body of {key}"), e))?;
        Ok(body.into_bytes())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| Self::upstream(format!("Failed to delete {key}"), e))?;
        Ok(())
    }

    async fn head(&self, key: &str) -> AppResult<Option<BlobMeta>> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => Ok(Some(BlobMeta {
                key: key.to_string(),
                size_bytes: output.content_length().unwrap_or(0).max(0) as u64,
                last_modified: Self::to_chrono(output.last_modified()),
            })),
            Err(e) if e.as_service_error().is_some_and(|s| s.is_not_found()) => Ok(None),
            Err(e) => Err(Self::upstream(format!("Failed to stat {key}"), e)),
        }
    }

    async fn list_all(&self) -> AppResult<Vec<BlobMeta>> {
        let mut out = Vec::new();
        let mut pages = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            let page = page.map_err(|e| Self::upstream("Failed to list objects", e))?;
            for object in page.contents() {
                let Some(key) = object.key() else { continue };
                out.push(BlobMeta {
                    key: key.to_string(),
                    size_bytes: object.size().unwrap_or(0).max(0) as u64,
                    last_modified: Self::to_chrono(object.last_modified()),
                });
            }
        }

        debug!(count = out.len(), "Listed bucket objects");
        Ok(out)
    }
}
