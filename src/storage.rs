use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use crate::config::S3Settings;
use crate::error::StorageError;

/// StorageService
///
/// Object storage behind every image upload. The backend hands over the raw
/// bytes and stores the returned URL on the record (`imageUrl`).
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Creates the bucket if needed. No-op for stores without buckets.
    async fn ensure_bucket_exists(&self);

    /// Stores `bytes` under `key` and returns the public URL of the object.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError>;
}

/// S3StorageClient
///
/// Works against AWS S3 or any compatible endpoint (MinIO in local setups).
/// Path-style addressing is forced so the URL is always `{endpoint}/{bucket}/{key}`.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    endpoint: String,
    bucket_name: String,
}

impl S3StorageClient {
    pub fn new(settings: &S3Settings) -> Self {
        let credentials = s3::config::Credentials::new(
            &settings.access_key,
            &settings.secret_key,
            None,
            None,
            "static",
        );

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(&settings.endpoint)
            .region(s3::config::Region::new(settings.region.clone()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            endpoint: settings.endpoint.trim_end_matches('/').to_string(),
            bucket_name: settings.bucket.clone(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket fails harmlessly when the bucket is already there.
        if let Err(e) = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await
        {
            tracing::debug!("create_bucket: {}", e);
        }
    }

    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, StorageError> {
        let key = sanitize_key(key);
        if key.is_empty() {
            return Err(StorageError::Rejected("empty object key".to_string()));
        }

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| StorageError::Backend(e.to_string()))?;

        Ok(format!("{}/{}/{}", self.endpoint, self.bucket_name, key))
    }
}

/// sanitize_key
///
/// Drops empty, `.` and `..` segments so a client-chosen file name cannot
/// escape its prefix.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// MockStorageService
///
/// Keeps uploads in memory and hands out deterministic URLs. Used by the local
/// backend when no S3 endpoint is configured, and by the tests.
#[derive(Clone, Default)]
pub struct MockStorageService {
    /// When true, every upload fails.
    pub should_fail: bool,
    objects: Arc<Mutex<HashMap<String, Vec<u8>>>>,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_failing() -> Self {
        Self {
            should_fail: true,
            ..Self::default()
        }
    }

    /// Bytes stored under an already sanitized key.
    pub fn object(&self, key: &str) -> Option<Vec<u8>> {
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(key)
            .cloned()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<String, StorageError> {
        if self.should_fail {
            return Err(StorageError::Backend(
                "Mock Storage Error: Simulation requested".to_string(),
            ));
        }

        let sanitized_key = sanitize_key(key);
        if sanitized_key.is_empty() {
            return Err(StorageError::Rejected("empty object key".to_string()));
        }
        self.objects
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(sanitized_key.clone(), bytes);

        Ok(format!("http://localhost:9000/mock-bucket/{}", sanitized_key))
    }
}

/// StorageState
///
/// Shared handle placed in the backend state.
pub type StorageState = Arc<dyn StorageService>;
