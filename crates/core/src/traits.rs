//! StorageAccount trait definition
//!
//! This trait defines the two listing calls the inventory needs from an
//! object-storage backend. It allows the core to be decoupled from the
//! specific S3 SDK implementation.

use std::collections::BTreeMap;

use async_trait::async_trait;
use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// A bucket as returned by the bucket listing call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BucketIdentity {
    /// Bucket name, unique within the account
    pub name: String,

    /// Creation timestamp reported by the backend
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<Timestamp>,

    /// Any other attributes the backend attached to the bucket entry
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl BucketIdentity {
    /// Create a bucket identity with only a name
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            creation_date: None,
            attributes: BTreeMap::new(),
        }
    }

    /// Set the creation date
    pub fn with_creation_date(mut self, created: Timestamp) -> Self {
        self.creation_date = Some(created);
        self
    }

    /// Attach a backend attribute
    pub fn with_attribute(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }
}

/// One entry of an object listing page
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObjectSummary {
    /// Object key
    pub key: String,

    /// Size in bytes
    pub size: u64,

    /// Last modified timestamp (UTC)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_modified: Option<Timestamp>,
}

impl ObjectSummary {
    /// Create a new ObjectSummary
    pub fn new(key: impl Into<String>, size: u64, last_modified: Option<Timestamp>) -> Self {
        Self {
            key: key.into(),
            size,
            last_modified,
        }
    }
}

/// One response of the paginated object listing call
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PageResult {
    /// Number of keys the backend reports for this page
    pub key_count: u64,

    /// Listed objects; absent when the backend returned no entry list
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<ObjectSummary>>,

    /// Cursor for the next page; absent on the final page
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_continuation_token: Option<String>,
}

impl PageResult {
    /// A page that lists nothing and has no successor
    pub fn empty() -> Self {
        Self::default()
    }

    /// A page whose key count matches its entry list
    pub fn with_entries(entries: Vec<ObjectSummary>) -> Self {
        Self {
            key_count: entries.len() as u64,
            entries: Some(entries),
            next_continuation_token: None,
        }
    }

    /// Set the continuation token for the next page
    pub fn with_next(mut self, token: impl Into<String>) -> Self {
        self.next_continuation_token = Some(token.into());
        self
    }
}

/// Options for list operations
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListOptions {
    /// Maximum number of keys to return per request
    pub max_keys: Option<i32>,

    /// Continuation token for pagination
    pub continuation_token: Option<String>,
}

/// Trait for the object-storage account the inventory is taken from
///
/// This trait is implemented by the S3 adapter and can be mocked for testing.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StorageAccount: Send + Sync {
    /// List all buckets visible to the current credentials
    async fn list_buckets(&self) -> Result<Vec<BucketIdentity>>;

    /// Fetch one page of the object listing of a bucket
    async fn list_objects(&self, bucket: &str, options: ListOptions) -> Result<PageResult>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bucket_identity_builder() {
        let created: Timestamp = "2024-03-01T10:00:00Z".parse().unwrap();
        let bucket = BucketIdentity::new("logs")
            .with_creation_date(created)
            .with_attribute("BucketRegion", "eu-west-1");

        assert_eq!(bucket.name, "logs");
        assert_eq!(bucket.creation_date, Some(created));
        assert_eq!(
            bucket.attributes.get("BucketRegion"),
            Some(&serde_json::Value::from("eu-west-1"))
        );
    }

    #[test]
    fn test_page_with_entries_counts_keys() {
        let page = PageResult::with_entries(vec![
            ObjectSummary::new("a", 1, None),
            ObjectSummary::new("b", 2, None),
        ])
        .with_next("token");

        assert_eq!(page.key_count, 2);
        assert_eq!(page.next_continuation_token.as_deref(), Some("token"));
    }

    #[test]
    fn test_empty_page() {
        let page = PageResult::empty();
        assert_eq!(page.key_count, 0);
        assert!(page.entries.is_none());
        assert!(page.next_continuation_token.is_none());
    }
}
