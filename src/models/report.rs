//! Per-run result structures.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Outcome of a single course check.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AvailabilityResult {
    /// Course name as configured
    pub course: String,

    /// Whether open slots were detected
    pub available: bool,

    /// Text read from the result region (empty when the check failed)
    pub raw_text: String,
}

/// Summary of one checker pass.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunReport {
    /// When the pass started
    pub started_at: DateTime<Utc>,

    /// When the pass finished
    pub finished_at: DateTime<Utc>,

    /// Per-course outcomes, in check order
    pub results: Vec<AvailabilityResult>,

    /// Courses for which a notification was delivered
    pub notified: Vec<String>,

    /// Why the pass stopped before the course loop, if it did
    pub aborted: Option<String>,
}

impl RunReport {
    /// Start a new report stamped with the current time.
    pub fn begin() -> Self {
        let now = Utc::now();
        Self {
            started_at: now,
            finished_at: now,
            results: Vec::new(),
            notified: Vec::new(),
            aborted: None,
        }
    }

    /// Mark the pass finished.
    pub fn finish(&mut self) {
        self.finished_at = Utc::now();
    }

    /// Number of courses checked in this pass.
    pub fn checked_count(&self) -> usize {
        self.results.len()
    }

    /// Courses that evaluated as available.
    pub fn available_courses(&self) -> Vec<&str> {
        self.results
            .iter()
            .filter(|r| r.available)
            .map(|r| r.course.as_str())
            .collect()
    }

    /// Elapsed wall time of the pass.
    pub fn elapsed(&self) -> chrono::Duration {
        self.finished_at - self.started_at
    }
}
