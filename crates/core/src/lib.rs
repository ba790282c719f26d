//! binv-core: Core library for the binv bucket inventory tool
//!
//! This crate provides the core functionality for binv, including:
//! - Configuration management
//! - StorageAccount trait for the listing calls
//! - Bucket enumeration and per-bucket aggregation
//! - Inventory report assembly
//!
//! This crate is designed to be independent of any specific S3 SDK,
//! allowing for easy testing and potential future support for other backends.

pub mod config;
pub mod error;
pub mod inventory;
pub mod report;
pub mod traits;

pub use config::{Config, ConfigManager, ConnectionConfig};
pub use error::{Error, Result};
pub use inventory::{
    FailurePolicy, InventoryObserver, InventoryOptions, aggregate_bucket, enumerate_buckets,
    run_inventory,
};
pub use report::{
    BucketFailure, BucketInventory, BucketTotals, InventoryEntry, InventoryReport, ReportSummary,
};
pub use traits::{BucketIdentity, ListOptions, ObjectSummary, PageResult, StorageAccount};
