//! Progress display for inventory runs
//!
//! Verbose mode prints one line per step on stderr. Otherwise a progress bar
//! counts finished buckets, unless quiet, JSON or no-progress mode is on.

use std::time::Duration;

use binv_core::{BucketIdentity, BucketInventory, BucketTotals, Error, InventoryObserver};
use indicatif::{ProgressBar, ProgressStyle};

use super::{Formatter, OutputConfig};

/// Progress reporter handed to the inventory run
#[derive(Debug)]
pub struct InventoryProgress {
    formatter: Formatter,
    bar: Option<ProgressBar>,
}

impl InventoryProgress {
    /// Create a reporter; the bar starts as a spinner until buckets are listed
    pub fn new(config: OutputConfig, message: &str) -> Self {
        let bar = if config.quiet || config.json || config.no_progress || config.verbose {
            None
        } else {
            let bar = ProgressBar::new_spinner();
            bar.set_style(
                ProgressStyle::with_template("{spinner:.green} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_spinner()),
            );
            bar.set_message(message.to_string());
            bar.enable_steady_tick(Duration::from_millis(100));
            Some(bar)
        };

        Self {
            formatter: Formatter::new(config),
            bar,
        }
    }

    /// Check if the progress bar is visible
    pub fn is_visible(&self) -> bool {
        self.bar.is_some()
    }

    /// Remove the bar from the terminal
    pub fn finish(&self) {
        if let Some(bar) = &self.bar {
            bar.finish_and_clear();
        }
    }

    fn warn(&self, message: &str) {
        match &self.bar {
            Some(bar) => bar.suspend(|| self.formatter.warning(message)),
            None => self.formatter.warning(message),
        }
    }
}

fn listed_line(count: usize) -> Option<String> {
    (count > 0).then(|| format!("{count} buckets found"))
}

impl InventoryObserver for InventoryProgress {
    fn buckets_listed(&self, buckets: &[BucketIdentity]) {
        // The command itself reports an empty account
        if let Some(line) = listed_line(buckets.len()) {
            self.formatter.info(&line);
        }

        if let Some(bar) = &self.bar {
            bar.set_length(buckets.len() as u64);
            bar.set_position(0);
            bar.set_style(
                ProgressStyle::with_template(
                    "{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}",
                )
                .unwrap_or_else(|_| ProgressStyle::default_bar())
                .progress_chars("#>-"),
            );
        }
    }

    fn bucket_started(&self, bucket: &BucketIdentity, index: usize, total: usize) {
        self.formatter.info(&format!(
            "Working on bucket {} ({}/{})",
            bucket.name,
            index + 1,
            total
        ));

        if let Some(bar) = &self.bar {
            bar.set_message(bucket.name.clone());
        }
    }

    fn page_listed(&self, bucket: &str, totals: &BucketTotals) {
        if let Some(bar) = &self.bar {
            bar.set_message(format!("{bucket}: {} objects", totals.files));
        }
    }

    fn bucket_finished(&self, inventory: &BucketInventory) {
        self.formatter.info(&format!(
            "  {}: {} objects, {} in {} pages",
            inventory.bucket.name,
            inventory.totals.files,
            humansize::format_size(inventory.totals.size_bytes, humansize::BINARY),
            inventory.totals.pages
        ));

        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }

    fn bucket_failed(&self, bucket: &BucketIdentity, error: &Error) {
        self.warn(&format!("Skipping bucket {}: {error}", bucket.name));

        if let Some(bar) = &self.bar {
            bar.inc(1);
        }
    }
}
