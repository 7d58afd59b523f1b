// src/services/checker.rs

//! Slot availability checker.
//!
//! Runs one pass over the configured courses through a [`RegistrationPortal`]
//! and sends a notification for every course with open slots.

use std::sync::Arc;
use std::time::Duration;

use crate::error::Result;
use crate::models::{AvailabilityResult, Config, RunReport};
use crate::services::portal::{Filter, RegistrationPortal};
use crate::services::telegram::Notifier;

/// Service that runs the availability pass.
pub struct SlotChecker {
    config: Arc<Config>,
}

impl SlotChecker {
    /// Create a new checker with the given configuration.
    pub fn new(config: Arc<Config>) -> Self {
        Self { config }
    }

    /// Run one full pass: apply filters, then check every course in order.
    ///
    /// Failures are folded into the report rather than escalated. A failure
    /// before the course loop aborts the pass; a failure inside the loop only
    /// marks that course unavailable and moves on.
    pub async fn run(
        &self,
        portal: &mut dyn RegistrationPortal,
        notifier: &dyn Notifier,
    ) -> RunReport {
        let mut report = RunReport::begin();

        if let Err(e) = self.prepare(portal).await {
            log::error!("Aborting pass: {e}");
            report.aborted = Some(e.to_string());
            report.finish();
            return report;
        }

        for course in &self.config.site.courses {
            log::info!("Checking: {course}");
            let result = match self.check_course(portal, course).await {
                Ok(result) => result,
                Err(e) => {
                    log::warn!("Check failed for '{course}', treating as no slot: {e}");
                    AvailabilityResult {
                        course: course.clone(),
                        available: false,
                        raw_text: String::new(),
                    }
                }
            };

            let available = result.available;
            report.results.push(result);

            if !available {
                log::info!("No slots for '{course}'");
                continue;
            }

            log::info!("Slots open for '{course}'!");
            match notifier.notify(course).await {
                Ok(()) => {
                    report.notified.push(course.clone());
                    self.pace().await;
                }
                Err(e) => log::error!("Notification failed for '{course}': {e}"),
            }

            if self.config.checker.stop_after_first {
                log::info!("Stopping after first available course");
                break;
            }
        }

        report.finish();
        report
    }

    /// Open the page and apply the region and POU filters.
    async fn prepare(&self, portal: &mut dyn RegistrationPortal) -> Result<()> {
        portal.open().await?;
        portal
            .apply_filter(Filter::Region, &self.config.site.region)
            .await?;
        portal
            .apply_filter(Filter::Pou, &self.config.site.pou)
            .await?;
        Ok(())
    }

    /// Check one course: select, query, read, evaluate.
    async fn check_course(
        &self,
        portal: &mut dyn RegistrationPortal,
        course: &str,
    ) -> Result<AvailabilityResult> {
        portal.select_course(course).await?;
        portal.trigger_query().await?;
        let raw_text = portal.read_result_text().await?;
        let available = slot_available(&raw_text, &self.config.checker.no_batch_markers);
        Ok(AvailabilityResult {
            course: course.to_string(),
            available,
            raw_text,
        })
    }

    /// Short pause between consecutive notifications.
    async fn pace(&self) {
        let ms = self.config.checker.notify_delay_ms;
        if ms > 0 {
            tokio::time::sleep(Duration::from_millis(ms)).await;
        }
    }
}

/// Decide availability from the result region's text.
///
/// Both sides are whitespace-normalized and lowercased so markers match
/// across line breaks and casing. Blank text carries no evidence of a batch
/// and counts as unavailable.
pub fn slot_available(raw_text: &str, markers: &[String]) -> bool {
    let text = normalize(raw_text);
    if text.is_empty() {
        return false;
    }
    !markers.iter().any(|marker| text.contains(&normalize(marker)))
}

fn normalize(s: &str) -> String {
    s.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn markers() -> Vec<String> {
        Config::default().checker.no_batch_markers
    }

    #[test]
    fn marker_text_is_unavailable() {
        assert!(!slot_available("No Batch Available", &markers()));
        assert!(!slot_available("No Record Found for given criteria", &markers()));
        assert!(!slot_available("NO RECORDS FOUND", &markers()));
        assert!(!slot_available("Sorry, batch not available right now", &markers()));
    }

    #[test]
    fn marker_matches_across_line_breaks() {
        assert!(!slot_available("No Batch\n   Available", &markers()));
    }

    #[test]
    fn non_marker_text_is_available() {
        assert!(slot_available("1 match found", &markers()));
        assert!(slot_available("Batch starts 01-09-2026, Seats: 12", &markers()));
    }

    #[test]
    fn blank_text_is_unavailable() {
        assert!(!slot_available("", &markers()));
        assert!(!slot_available("   \n\t ", &markers()));
    }
}
