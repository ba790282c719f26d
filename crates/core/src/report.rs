//! Inventory results
//!
//! Per-bucket accumulators, finalized bucket inventories and the report that
//! collects them in bucket listing order.

use jiff::Timestamp;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::Error;
use crate::traits::{BucketIdentity, ObjectSummary, PageResult};

/// Record key for the bucket name
pub const NAME_KEY: &str = "Name";

/// Record key for the bucket creation date
pub const CREATION_DATE_KEY: &str = "CreationDate";

/// Record key for the total number of objects
pub const TOTAL_FILES_KEY: &str = "Total Files";

/// Record key for the total object size in bytes
pub const TOTAL_FILE_SIZE_KEY: &str = "Total File Size";

/// Record key for the most recent object modification
pub const LAST_MODIFIED_KEY: &str = "Last Modified Date";

/// Record key for a bucket that could not be inventoried
pub const ERROR_KEY: &str = "Error";

/// Running totals for the objects of one bucket
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BucketTotals {
    /// Sum of the key counts of every listing page
    pub files: u64,

    /// Sum of the sizes of every listed object
    pub size_bytes: u64,

    /// Most recent modification among listed objects, `None` when nothing was listed
    pub last_modified: Option<Timestamp>,

    /// Number of listing pages observed
    pub pages: u64,
}

impl BucketTotals {
    /// Fold one listing page into the totals
    ///
    /// The file count grows by the page's reported key count even when the
    /// page carries no entry list.
    pub fn fold_page(&mut self, page: &PageResult) {
        self.pages += 1;
        self.files = self.files.saturating_add(page.key_count);

        if let Some(entries) = &page.entries {
            for object in entries {
                self.record_object(object);
            }
        }
    }

    /// Fold a single object's size and timestamp into the totals
    pub fn record_object(&mut self, object: &ObjectSummary) {
        self.size_bytes = self.size_bytes.saturating_add(object.size);

        if let Some(modified) = object.last_modified
            && self.last_modified.is_none_or(|latest| modified > latest)
        {
            self.last_modified = Some(modified);
        }
    }
}

/// Finalized inventory of one bucket
#[derive(Debug, Clone, PartialEq)]
pub struct BucketInventory {
    /// The bucket as returned by the bucket listing
    pub bucket: BucketIdentity,

    /// Aggregated object totals
    pub totals: BucketTotals,
}

impl BucketInventory {
    /// Merge the totals into a copy of the bucket's attributes
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = base_record(&self.bucket);
        record.insert(TOTAL_FILES_KEY.to_string(), self.totals.files.into());
        record.insert(TOTAL_FILE_SIZE_KEY.to_string(), self.totals.size_bytes.into());
        record.insert(
            LAST_MODIFIED_KEY.to_string(),
            self.totals
                .last_modified
                .map_or(Value::Null, |t| Value::String(t.to_string())),
        );
        record
    }
}

/// A bucket whose object listing failed
#[derive(Debug, Clone, PartialEq)]
pub struct BucketFailure {
    /// The bucket as returned by the bucket listing
    pub bucket: BucketIdentity,

    /// Error message
    pub message: String,

    /// Exit code of the underlying error
    pub exit_code: i32,
}

impl BucketFailure {
    /// Record the failure of a bucket
    pub fn new(bucket: BucketIdentity, error: &Error) -> Self {
        Self {
            bucket,
            message: error.to_string(),
            exit_code: error.exit_code(),
        }
    }

    /// The bucket's attributes with the error message attached
    pub fn to_record(&self) -> Map<String, Value> {
        let mut record = base_record(&self.bucket);
        record.insert(ERROR_KEY.to_string(), Value::String(self.message.clone()));
        record
    }
}

fn base_record(bucket: &BucketIdentity) -> Map<String, Value> {
    let mut record: Map<String, Value> = bucket
        .attributes
        .iter()
        .map(|(k, v)| (k.clone(), v.clone()))
        .collect();
    record.insert(NAME_KEY.to_string(), Value::String(bucket.name.clone()));
    if let Some(created) = bucket.creation_date {
        record.insert(
            CREATION_DATE_KEY.to_string(),
            Value::String(created.to_string()),
        );
    }
    record
}

/// Outcome of inventorying one bucket
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEntry {
    /// Every listing page was aggregated
    Complete(BucketInventory),

    /// The listing failed part way
    Failed(BucketFailure),
}

impl InventoryEntry {
    /// The bucket this entry describes
    pub fn bucket(&self) -> &BucketIdentity {
        match self {
            InventoryEntry::Complete(inventory) => &inventory.bucket,
            InventoryEntry::Failed(failure) => &failure.bucket,
        }
    }

    /// The entry as a flat record
    pub fn to_record(&self) -> Map<String, Value> {
        match self {
            InventoryEntry::Complete(inventory) => inventory.to_record(),
            InventoryEntry::Failed(failure) => failure.to_record(),
        }
    }
}

/// Account-wide totals over the completed buckets of a report
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReportSummary {
    /// Number of buckets in the report
    pub buckets: usize,

    /// Number of buckets that could not be inventoried
    pub failed: usize,

    /// Objects across all completed buckets
    pub files: u64,

    /// Bytes across all completed buckets
    pub size_bytes: u64,

    /// Most recent modification across all completed buckets
    pub last_modified: Option<Timestamp>,
}

/// Inventory of every bucket in an account, in bucket listing order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InventoryReport {
    entries: Vec<InventoryEntry>,
}

impl InventoryReport {
    /// Create an empty report
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn push(&mut self, entry: InventoryEntry) {
        self.entries.push(entry);
    }

    /// Number of buckets in the report
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the account had no buckets
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in bucket listing order
    pub fn entries(&self) -> &[InventoryEntry] {
        &self.entries
    }

    /// Look up a bucket's entry by name
    pub fn get(&self, bucket: &str) -> Option<&InventoryEntry> {
        self.entries.iter().find(|e| e.bucket().name == bucket)
    }

    /// Look up a completed bucket inventory by name
    pub fn inventory(&self, bucket: &str) -> Option<&BucketInventory> {
        match self.get(bucket)? {
            InventoryEntry::Complete(inventory) => Some(inventory),
            InventoryEntry::Failed(_) => None,
        }
    }

    /// Completed bucket inventories
    pub fn inventories(&self) -> impl Iterator<Item = &BucketInventory> {
        self.entries.iter().filter_map(|e| match e {
            InventoryEntry::Complete(inventory) => Some(inventory),
            InventoryEntry::Failed(_) => None,
        })
    }

    /// Buckets that could not be inventoried
    pub fn failures(&self) -> impl Iterator<Item = &BucketFailure> {
        self.entries.iter().filter_map(|e| match e {
            InventoryEntry::Failed(failure) => Some(failure),
            InventoryEntry::Complete(_) => None,
        })
    }

    /// Whether any bucket failed
    pub fn has_failures(&self) -> bool {
        self.failures().next().is_some()
    }

    /// Mapping from bucket name to its flat record
    pub fn to_records(&self) -> Map<String, Value> {
        self.entries
            .iter()
            .map(|e| (e.bucket().name.clone(), Value::Object(e.to_record())))
            .collect()
    }

    /// Totals across the completed buckets
    pub fn summary(&self) -> ReportSummary {
        let mut summary = ReportSummary {
            buckets: self.entries.len(),
            ..Default::default()
        };

        for inventory in self.inventories() {
            summary.files = summary.files.saturating_add(inventory.totals.files);
            summary.size_bytes = summary
                .size_bytes
                .saturating_add(inventory.totals.size_bytes);
            if let Some(modified) = inventory.totals.last_modified
                && summary.last_modified.is_none_or(|latest| modified > latest)
            {
                summary.last_modified = Some(modified);
            }
        }
        summary.failed = self.failures().count();

        summary
    }
}

impl Extend<InventoryEntry> for InventoryReport {
    fn extend<I: IntoIterator<Item = InventoryEntry>>(&mut self, iter: I) {
        self.entries.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        s.parse().unwrap()
    }

    #[test]
    fn test_fold_page_tracks_latest_timestamp() {
        let mut totals = BucketTotals::default();
        totals.fold_page(&PageResult::with_entries(vec![
            ObjectSummary::new("a", 10, Some(ts("2024-01-02T00:00:00Z"))),
            ObjectSummary::new("b", 20, Some(ts("2024-01-03T00:00:00Z"))),
            ObjectSummary::new("c", 30, Some(ts("2024-01-01T00:00:00Z"))),
        ]));

        assert_eq!(totals.files, 3);
        assert_eq!(totals.size_bytes, 60);
        assert_eq!(totals.last_modified, Some(ts("2024-01-03T00:00:00Z")));
        assert_eq!(totals.pages, 1);
    }

    #[test]
    fn test_fold_page_without_entries_still_counts_keys() {
        let mut totals = BucketTotals::default();
        totals.fold_page(&PageResult {
            key_count: 4,
            entries: None,
            next_continuation_token: None,
        });

        assert_eq!(totals.files, 4);
        assert_eq!(totals.size_bytes, 0);
        assert!(totals.last_modified.is_none());
    }

    #[test]
    fn test_timestamps_compare_as_instants() {
        // Same wall-clock hour in different offsets: the +02:00 one is earlier.
        let mut totals = BucketTotals::default();
        totals.record_object(&ObjectSummary::new(
            "utc",
            1,
            Some(ts("2024-05-01T12:00:00Z")),
        ));
        totals.record_object(&ObjectSummary::new(
            "cest",
            1,
            Some(ts("2024-05-01T13:00:00+02:00")),
        ));

        assert_eq!(totals.last_modified, Some(ts("2024-05-01T12:00:00Z")));
    }

    #[test]
    fn test_object_without_timestamp_keeps_latest() {
        let mut totals = BucketTotals::default();
        totals.record_object(&ObjectSummary::new("a", 5, Some(ts("2024-01-01T00:00:00Z"))));
        totals.record_object(&ObjectSummary::new("b", 5, None));

        assert_eq!(totals.size_bytes, 10);
        assert_eq!(totals.last_modified, Some(ts("2024-01-01T00:00:00Z")));
    }

    #[test]
    fn test_inventory_record_keys() {
        let inventory = BucketInventory {
            bucket: BucketIdentity::new("media")
                .with_creation_date(ts("2023-06-01T08:30:00Z"))
                .with_attribute("BucketRegion", "us-west-2"),
            totals: BucketTotals {
                files: 2,
                size_bytes: 12,
                last_modified: Some(ts("2024-02-01T00:00:00Z")),
                pages: 1,
            },
        };

        let record = inventory.to_record();
        assert_eq!(record[NAME_KEY], "media");
        assert_eq!(record[CREATION_DATE_KEY], "2023-06-01T08:30:00Z");
        assert_eq!(record["BucketRegion"], "us-west-2");
        assert_eq!(record[TOTAL_FILES_KEY], 2);
        assert_eq!(record[TOTAL_FILE_SIZE_KEY], 12);
        assert_eq!(record[LAST_MODIFIED_KEY], "2024-02-01T00:00:00Z");
    }

    #[test]
    fn test_empty_bucket_record_has_null_last_modified() {
        let inventory = BucketInventory {
            bucket: BucketIdentity::new("empty"),
            totals: BucketTotals::default(),
        };

        let record = inventory.to_record();
        assert_eq!(record[TOTAL_FILES_KEY], 0);
        assert_eq!(record[TOTAL_FILE_SIZE_KEY], 0);
        assert!(record[LAST_MODIFIED_KEY].is_null());
        assert!(!record.contains_key(CREATION_DATE_KEY));
    }

    #[test]
    fn test_summary_saturates_on_overflow() {
        let huge = |name: &str| {
            InventoryEntry::Complete(BucketInventory {
                bucket: BucketIdentity::new(name),
                totals: BucketTotals {
                    files: u64::MAX,
                    size_bytes: u64::MAX - 1,
                    last_modified: None,
                    pages: 1,
                },
            })
        };
        let mut report = InventoryReport::new();
        report.push(huge("a"));
        report.push(huge("b"));

        let summary = report.summary();
        assert_eq!(summary.files, u64::MAX);
        assert_eq!(summary.size_bytes, u64::MAX);
        assert_eq!(summary.buckets, 2);
    }

    #[test]
    fn test_report_lookup_and_summary() {
        let mut report = InventoryReport::new();
        report.push(InventoryEntry::Complete(BucketInventory {
            bucket: BucketIdentity::new("a"),
            totals: BucketTotals {
                files: 3,
                size_bytes: 300,
                last_modified: Some(ts("2024-01-01T00:00:00Z")),
                pages: 1,
            },
        }));
        report.push(InventoryEntry::Failed(BucketFailure::new(
            BucketIdentity::new("b"),
            &Error::Auth("AccessDenied".into()),
        )));
        report.push(InventoryEntry::Complete(BucketInventory {
            bucket: BucketIdentity::new("c"),
            totals: BucketTotals {
                files: 1,
                size_bytes: 5,
                last_modified: Some(ts("2024-06-01T00:00:00Z")),
                pages: 1,
            },
        }));

        assert_eq!(report.len(), 3);
        assert!(report.has_failures());
        assert!(report.inventory("b").is_none());
        assert_eq!(report.inventory("c").map(|i| i.totals.files), Some(1));

        let summary = report.summary();
        assert_eq!(summary.buckets, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.files, 4);
        assert_eq!(summary.size_bytes, 305);
        assert_eq!(summary.last_modified, Some(ts("2024-06-01T00:00:00Z")));

        let records = report.to_records();
        assert_eq!(records.len(), 3);
        assert_eq!(
            records["b"][ERROR_KEY],
            "Authentication failed: AccessDenied"
        );
    }
}
