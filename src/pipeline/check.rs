// src/pipeline/check.rs

//! Single-pass check pipeline.

use std::sync::Arc;

use crate::error::Result;
use crate::models::{Config, RunReport, TelegramCredentials};
use crate::services::{RegistrationPortal, SlotChecker, TelegramNotifier, WebDriverPortal};

/// Run one scheduled availability pass.
///
/// Credential, configuration, and session-creation failures bubble up so the
/// scheduler sees a failed process. Everything that can go wrong after the
/// browser session exists is folded into the returned report, and the session
/// is closed on every path.
pub async fn run_check(config: Arc<Config>) -> Result<RunReport> {
    config.validate()?;
    let credentials = TelegramCredentials::from_env()?;
    let notifier = TelegramNotifier::new(
        config.notify.clone(),
        credentials,
        config.site.pou.clone(),
    )?;

    let mut portal = WebDriverPortal::connect(Arc::clone(&config)).await?;

    let checker = SlotChecker::new(Arc::clone(&config));
    let report = checker.run(&mut portal, &notifier).await;

    if let Err(e) = portal.close().await {
        log::warn!("Failed to close browser session: {e}");
    }

    log_summary(&report);
    Ok(report)
}

/// Log the end-of-run summary.
pub fn log_summary(report: &RunReport) {
    if let Some(reason) = &report.aborted {
        log::warn!("Pass aborted: {reason}");
    }

    let available = report.available_courses();
    log::info!(
        "Pass complete: {} checked, {} available, {} notified in {}s",
        report.checked_count(),
        available.len(),
        report.notified.len(),
        report.elapsed().num_seconds(),
    );
    if !available.is_empty() {
        log::info!("Available courses: {}", available.join(", "));
    }
}
