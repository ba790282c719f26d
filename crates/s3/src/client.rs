//! S3 client implementation
//!
//! Wraps aws-sdk-s3 and implements the StorageAccount trait from binv-core.

use std::time::Duration;

use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata};
use aws_sdk_s3::operation::list_objects_v2::ListObjectsV2Output;
use aws_sdk_s3::types::Object;

use binv_core::{
    BucketIdentity, ConnectionConfig, Error, ListOptions, ObjectSummary, PageResult, Result,
    StorageAccount,
};

/// Attribute key for the bucket region reported by ListBuckets
pub const BUCKET_REGION_ATTRIBUTE: &str = "BucketRegion";

/// S3 client wrapper
#[derive(Debug, Clone)]
pub struct S3Client {
    inner: aws_sdk_s3::Client,
}

impl S3Client {
    /// Create a new S3 client from connection settings
    ///
    /// Credentials and region come from the named profile or the SDK's
    /// default chain unless the settings carry them explicitly. The
    /// settings are expected to be validated already.
    pub async fn new(connection: &ConnectionConfig) -> Result<Self> {
        let retry = connection.retry_config();
        let timeout = connection.timeout_config();

        let mut loader = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .retry_config(
                aws_config::retry::RetryConfig::standard().with_max_attempts(retry.max_attempts),
            )
            .timeout_config(
                aws_config::timeout::TimeoutConfig::builder()
                    .connect_timeout(Duration::from_millis(timeout.connect_ms))
                    .read_timeout(Duration::from_millis(timeout.read_ms))
                    .build(),
            );

        if let Some(profile) = &connection.profile {
            loader = loader.profile_name(profile);
        }

        if let Some(region) = &connection.region {
            loader = loader.region(aws_config::Region::new(region.clone()));
        }

        if let Some(endpoint) = &connection.endpoint_url {
            loader = loader.endpoint_url(endpoint);
        }

        if let Some((access_key, secret_key)) = connection.static_credentials() {
            let credentials = aws_credential_types::Credentials::new(
                access_key,
                secret_key,
                None, // session token
                None, // expiry
                "binv-static-credentials",
            );
            loader = loader.credentials_provider(credentials);
        }

        let config = loader.load().await;

        // Path-style addressing is the safe choice for custom endpoints
        let s3_config = aws_sdk_s3::config::Builder::from(&config)
            .force_path_style(connection.force_path_style || connection.endpoint_url.is_some())
            .build();

        tracing::debug!(
            profile = connection.profile.as_deref().unwrap_or("default"),
            region = ?config.region(),
            endpoint = connection.endpoint_url.as_deref().unwrap_or("aws"),
            "created S3 client"
        );

        Ok(Self {
            inner: aws_sdk_s3::Client::from_conf(s3_config),
        })
    }
}

#[async_trait]
impl StorageAccount for S3Client {
    async fn list_buckets(&self) -> Result<Vec<BucketIdentity>> {
        let response = self
            .inner
            .list_buckets()
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, "list buckets"))?;

        let buckets = response
            .buckets()
            .iter()
            .map(|b| {
                let mut bucket = BucketIdentity::new(b.name().unwrap_or_default());
                bucket.creation_date = b.creation_date().and_then(to_timestamp);
                if let Some(region) = b.bucket_region() {
                    bucket = bucket.with_attribute(BUCKET_REGION_ATTRIBUTE, region);
                }
                bucket
            })
            .collect();

        Ok(buckets)
    }

    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<PageResult> {
        let mut request = self.inner.list_objects_v2().bucket(bucket);

        if let Some(max) = options.max_keys {
            request = request.max_keys(max);
        }

        if let Some(token) = &options.continuation_token {
            request = request.continuation_token(token);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_sdk_error(&e, &format!("list objects in {bucket}")))?;

        Ok(to_page_result(response))
    }
}

/// Convert one ListObjectsV2 response into a listing page
///
/// A response without `Contents` yields `entries: None`. Some backends
/// omit `KeyCount`, in which case the number of entries received is used.
fn to_page_result(response: ListObjectsV2Output) -> PageResult {
    let entries = response
        .contents
        .map(|objects| objects.iter().map(to_object_summary).collect::<Vec<_>>());

    let key_count = match response.key_count {
        Some(count) => u64::try_from(count).unwrap_or(0),
        None => entries.as_ref().map_or(0, |e| e.len() as u64),
    };

    PageResult {
        key_count,
        entries,
        next_continuation_token: response.next_continuation_token,
    }
}

fn to_object_summary(object: &Object) -> ObjectSummary {
    ObjectSummary::new(
        object.key().unwrap_or_default(),
        object.size().map_or(0, |s| u64::try_from(s).unwrap_or(0)),
        object.last_modified().and_then(to_timestamp),
    )
}

/// Convert an SDK timestamp into a UTC instant
pub fn to_timestamp(value: &aws_smithy_types::DateTime) -> Option<jiff::Timestamp> {
    jiff::Timestamp::new(value.secs(), value.subsec_nanos() as i32).ok()
}

fn classify_sdk_error<E>(err: &E, context: &str) -> Error
where
    E: ProvideErrorMetadata + std::error::Error + 'static,
{
    let message = format!("Failed to {context}: {}", DisplayErrorContext(err));
    classify_error_code(err.code(), message)
}

/// Map an S3 error code onto the core error taxonomy
///
/// Requests that never got a service response carry no code and are
/// treated as network failures.
pub fn classify_error_code(code: Option<&str>, message: String) -> Error {
    match code {
        Some(
            "AccessDenied"
            | "AllAccessDisabled"
            | "InvalidAccessKeyId"
            | "SignatureDoesNotMatch"
            | "ExpiredToken"
            | "InvalidToken"
            | "AccountProblem",
        ) => Error::Auth(message),
        Some("NoSuchBucket" | "NotFound") => Error::NotFound(message),
        _ => Error::Network(message),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_auth_codes() {
        for code in ["AccessDenied", "InvalidAccessKeyId", "ExpiredToken"] {
            let err = classify_error_code(Some(code), code.to_string());
            assert!(matches!(err, Error::Auth(_)), "{code}");
            assert_eq!(err.exit_code(), 4);
        }
    }

    #[test]
    fn test_classify_missing_bucket() {
        let err = classify_error_code(Some("NoSuchBucket"), "gone".to_string());
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_classify_throttling_and_transport() {
        assert!(matches!(
            classify_error_code(Some("SlowDown"), String::new()),
            Error::Network(_)
        ));
        assert!(matches!(
            classify_error_code(None, "dispatch failure".to_string()),
            Error::Network(_)
        ));
    }

    #[test]
    fn test_to_timestamp_keeps_subseconds() {
        let value = aws_smithy_types::DateTime::from_secs_and_nanos(1_700_000_000, 250_000_000);
        let ts = to_timestamp(&value).unwrap();
        assert_eq!(ts.as_second(), 1_700_000_000);
        assert_eq!(ts.subsec_nanosecond(), 250_000_000);
    }

    #[test]
    fn test_object_summary_conversion() {
        let object = Object::builder()
            .key("reports/2024.csv")
            .size(2048)
            .last_modified(aws_smithy_types::DateTime::from_secs(1_700_000_000))
            .build();

        let summary = to_object_summary(&object);
        assert_eq!(summary.key, "reports/2024.csv");
        assert_eq!(summary.size, 2048);
        assert_eq!(
            summary.last_modified.map(|t| t.as_second()),
            Some(1_700_000_000)
        );
    }

    #[test]
    fn test_object_summary_negative_size_clamps() {
        let object = Object::builder().key("odd").size(-1).build();
        assert_eq!(to_object_summary(&object).size, 0);
        assert!(to_object_summary(&object).last_modified.is_none());
    }

    fn object(key: &str, size: i64) -> Object {
        Object::builder().key(key).size(size).build()
    }

    #[test]
    fn test_page_without_contents_has_no_entries() {
        let response = ListObjectsV2Output::builder().key_count(0).build();

        let page = to_page_result(response);
        assert_eq!(page.key_count, 0);
        assert!(page.entries.is_none());
        assert!(page.next_continuation_token.is_none());
    }

    #[test]
    fn test_page_with_contents_and_token() {
        let response = ListObjectsV2Output::builder()
            .contents(object("a", 10))
            .contents(object("b", 20))
            .key_count(2)
            .next_continuation_token("page-2")
            .build();

        let page = to_page_result(response);
        assert_eq!(page.key_count, 2);
        let sizes: Vec<u64> = page.entries.unwrap().iter().map(|e| e.size).collect();
        assert_eq!(sizes, vec![10, 20]);
        assert_eq!(page.next_continuation_token.as_deref(), Some("page-2"));
    }

    #[test]
    fn test_page_without_key_count_uses_entry_count() {
        let response = ListObjectsV2Output::builder()
            .contents(object("a", 1))
            .contents(object("b", 2))
            .contents(object("c", 3))
            .build();

        let page = to_page_result(response);
        assert_eq!(page.key_count, 3);
        assert!(page.next_continuation_token.is_none());
    }

    #[test]
    fn test_page_negative_key_count_clamps() {
        let response = ListObjectsV2Output::builder()
            .contents(object("a", 1))
            .key_count(-1)
            .build();

        assert_eq!(to_page_result(response).key_count, 0);
    }
}
