// src/services/portal.rs

//! Registration portal interface.
//!
//! The checker drives the page through this trait. Production uses the
//! WebDriver-backed implementation; tests substitute a scripted fake.

use async_trait::async_trait;

use crate::error::Result;

/// One of the two filter dropdowns applied before the course loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Filter {
    Region,
    Pou,
}

impl Filter {
    /// Control name for logs and error context.
    pub fn name(&self) -> &'static str {
        match self {
            Filter::Region => "region",
            Filter::Pou => "pou",
        }
    }
}

/// Minimal surface of the course-registration page.
///
/// Call order within a pass: [`open`](Self::open), then
/// [`apply_filter`](Self::apply_filter) for each filter, then per course
/// [`select_course`](Self::select_course) → [`trigger_query`](Self::trigger_query)
/// → [`read_result_text`](Self::read_result_text), and finally
/// [`close`](Self::close) regardless of earlier failures.
#[async_trait]
pub trait RegistrationPortal: Send {
    /// Navigate to the batch detail page and wait for it to load.
    async fn open(&mut self) -> Result<()>;

    /// Select a value in one of the filter dropdowns.
    async fn apply_filter(&mut self, filter: Filter, value: &str) -> Result<()>;

    /// Select a course in the course dropdown.
    async fn select_course(&mut self, course: &str) -> Result<()>;

    /// Click the query button and let the results render.
    async fn trigger_query(&mut self) -> Result<()>;

    /// Read the visible text of the result region.
    async fn read_result_text(&mut self) -> Result<String>;

    /// End the session. Safe to call more than once.
    async fn close(&mut self) -> Result<()>;
}
