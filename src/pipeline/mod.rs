//! Pipeline entry points for checker operations.
//!
//! - `run_check`: One full availability pass (the scheduled entry point)

pub mod check;

pub use check::run_check;
