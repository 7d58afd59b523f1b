//! Service layer for the slot checker.
//!
//! This module contains the business logic for:
//! - Portal interaction (`RegistrationPortal`, `WebDriverPortal`)
//! - Availability checking (`SlotChecker`)
//! - Notification delivery (`Notifier`, `TelegramNotifier`)

mod checker;
mod portal;
mod telegram;
mod webdriver;

pub use checker::{SlotChecker, slot_available};
pub use portal::{Filter, RegistrationPortal};
pub use telegram::{Notifier, TelegramNotifier};
pub use webdriver::WebDriverPortal;
