//! Logging utilities
//!
//! Consistent start/finish messages for the phases of a sampling run.

use std::time::Duration;

/// Log an operation start with consistent format
pub fn log_operation_start(operation: &str, items: usize) {
    log::info!("{operation} ({items} items)");
}

/// Log an operation completion with consistent format
pub fn log_operation_complete(operation: &str, items: usize, elapsed: Option<Duration>) {
    if let Some(duration) = elapsed {
        log::info!("Successfully {operation} {items} items in {duration:?}");
    } else {
        log::info!("Successfully {operation} {items} items");
    }
}

/// Log a warning with consistent format
pub fn log_warning(message: &str) {
    log::warn!("{message}");
}
