//! Bucket inventory
//!
//! Enumerates the buckets of an account, walks each bucket's paginated
//! object listing, and folds every page into per-bucket totals.
//!
//! Buckets and pages are processed strictly in order. Each bucket owns its
//! accumulator, so nothing is shared between buckets except the read-only
//! store handle.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::report::{BucketFailure, BucketInventory, BucketTotals, InventoryEntry, InventoryReport};
use crate::traits::{BucketIdentity, ListOptions, PageResult, StorageAccount};

/// What to do when one bucket's object listing fails
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// Record the failure and carry on with the remaining buckets
    #[default]
    Continue,

    /// Abort the whole run on the first failure
    FailFast,
}

/// Options for an inventory run
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryOptions {
    /// Keys requested per listing page; the backend default when unset
    pub page_size: Option<i32>,

    /// Behaviour on per-bucket failure
    pub failure_policy: FailurePolicy,
}

/// Receives progress notifications during an inventory run
///
/// Every method defaults to doing nothing; `()` is the silent observer.
pub trait InventoryObserver: Send + Sync {
    /// The bucket listing returned
    fn buckets_listed(&self, _buckets: &[BucketIdentity]) {}

    /// Aggregation of a bucket is starting (`index` is zero-based)
    fn bucket_started(&self, _bucket: &BucketIdentity, _index: usize, _total: usize) {}

    /// A listing page was folded into the bucket's totals
    fn page_listed(&self, _bucket: &str, _totals: &BucketTotals) {}

    /// A bucket's totals are final
    fn bucket_finished(&self, _inventory: &BucketInventory) {}

    /// A bucket's listing failed and the run continues
    fn bucket_failed(&self, _bucket: &BucketIdentity, _error: &Error) {}
}

impl InventoryObserver for () {}

/// List the buckets visible to the store's credentials
///
/// An empty account yields an empty list. Backend failures are returned
/// as-is; there is no retry at this level.
pub async fn enumerate_buckets<S>(store: &S) -> Result<Vec<BucketIdentity>>
where
    S: StorageAccount + ?Sized,
{
    let buckets = store.list_buckets().await?;
    tracing::debug!(count = buckets.len(), "listed buckets");
    Ok(buckets)
}

/// Compute the object totals of one bucket
///
/// Requests listing pages until a page arrives without an entry list or
/// without a continuation token. The file count is the sum of the pages'
/// key counts, not the number of entries seen.
pub async fn aggregate_bucket<S>(
    store: &S,
    bucket: &str,
    options: &InventoryOptions,
    observer: &dyn InventoryObserver,
) -> Result<BucketTotals>
where
    S: StorageAccount + ?Sized,
{
    let mut totals = BucketTotals::default();
    let mut continuation_token: Option<String> = None;

    loop {
        let request = ListOptions {
            max_keys: options.page_size,
            continuation_token: continuation_token.take(),
        };

        let page = store.list_objects(bucket, request).await?;
        totals.fold_page(&page);

        tracing::debug!(
            bucket = %bucket,
            page = totals.pages,
            key_count = page.key_count,
            more = page.next_continuation_token.is_some(),
            "listed objects page"
        );
        observer.page_listed(bucket, &totals);

        let PageResult {
            entries,
            next_continuation_token,
            ..
        } = page;

        match (entries, next_continuation_token) {
            (Some(_), Some(token)) => continuation_token = Some(token),
            _ => break,
        }
    }

    Ok(totals)
}

/// Inventory every bucket of the account
///
/// Buckets are aggregated in the order the backend listed them. A failure
/// to list buckets is always fatal; a failure within one bucket follows
/// `options.failure_policy`.
pub async fn run_inventory<S>(
    store: &S,
    options: &InventoryOptions,
    observer: &dyn InventoryObserver,
) -> Result<InventoryReport>
where
    S: StorageAccount + ?Sized,
{
    let buckets = enumerate_buckets(store).await?;
    observer.buckets_listed(&buckets);

    let total = buckets.len();
    let mut report = InventoryReport::new();

    for (index, bucket) in buckets.into_iter().enumerate() {
        observer.bucket_started(&bucket, index, total);

        match aggregate_bucket(store, &bucket.name, options, observer).await {
            Ok(totals) => {
                let inventory = BucketInventory { bucket, totals };
                observer.bucket_finished(&inventory);
                report.push(InventoryEntry::Complete(inventory));
            }
            Err(e) if options.failure_policy == FailurePolicy::Continue => {
                tracing::warn!(bucket = %bucket.name, error = %e, "bucket inventory failed");
                observer.bucket_failed(&bucket, &e);
                report.push(InventoryEntry::Failed(BucketFailure::new(bucket, &e)));
            }
            Err(e) => return Err(e),
        }
    }

    Ok(report)
}
