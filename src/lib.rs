// src/lib.rs

//! Slot Alert Library
//!
//! Checks the ICAI course-registration portal for open batch slots and sends
//! Telegram notifications. One invocation runs one pass; scheduling is left
//! to cron, GitHub Actions, or an EventBridge rule driving the Lambda binary.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod utils;
