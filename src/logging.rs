//! Tracing helpers shared by the sweepers and the dispatcher

use std::time::Instant;

/// Times a sweep and logs how long it took, and how much it removed, on drop
pub struct Timer {
    start: Instant,
    operation: &'static str,
    removed: Option<usize>,
}

impl Timer {
    pub fn new(operation: &'static str) -> Self {
        Self {
            start: Instant::now(),
            operation,
            removed: None,
        }
    }

    /// Record how many entries the timed pass dropped
    pub fn record_removed(&mut self, removed: usize) {
        self.removed = Some(removed);
    }
}

impl Drop for Timer {
    fn drop(&mut self) {
        let duration_us = self.start.elapsed().as_micros() as u64;
        match self.removed {
            Some(removed) => tracing::debug!(
                operation = self.operation,
                duration_us = duration_us,
                removed = removed,
                "Sweep completed"
            ),
            None => tracing::debug!(
                operation = self.operation,
                duration_us = duration_us,
                "Operation completed"
            ),
        }
    }
}

/// Log a failure that is reported but not propagated
pub fn log_error(operation: &str, error: &impl std::error::Error) {
    tracing::error!(
        operation = %operation,
        error = %error,
        error_kind = std::any::type_name_of_val(error),
        "Operation failed"
    );
}
