// src/models/mod.rs

//! Domain models for the slot checker.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod report;

// Re-export all public types
pub use config::{
    CheckerConfig, Config, NotifyConfig, SelectorConfig, SiteConfig, TelegramCredentials,
    WebDriverConfig,
};
pub use report::{AvailabilityResult, RunReport};
