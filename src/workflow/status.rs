use std::time::{Duration, Instant};

use crate::core::types::OperationStatus;

/// Banner state. Terminal states fall back to `Idle` once the display timeout
/// has elapsed; in-flight work is not affected by that reset.
#[derive(Debug, Clone)]
pub struct StatusBoard {
    status: OperationStatus,
    changed_at: Instant,
    display_timeout: Duration,
}

impl StatusBoard {
    pub fn new(display_timeout: Duration) -> Self {
        Self {
            status: OperationStatus::Idle,
            changed_at: Instant::now(),
            display_timeout,
        }
    }

    pub fn current(&self) -> OperationStatus {
        self.current_at(Instant::now())
    }

    pub fn current_at(&self, now: Instant) -> OperationStatus {
        match self.status {
            OperationStatus::Success | OperationStatus::Error
                if now.saturating_duration_since(self.changed_at) >= self.display_timeout =>
            {
                OperationStatus::Idle
            }
            status => status,
        }
    }

    pub fn set(&mut self, status: OperationStatus) {
        self.status = status;
        self.changed_at = Instant::now();
    }

    /// Moves to `InProgress` unless another operation already holds it.
    pub fn try_begin(&mut self) -> bool {
        if self.current() == OperationStatus::InProgress {
            return false;
        }
        self.set(OperationStatus::InProgress);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn terminal_status_resets_after_timeout() {
        let mut board = StatusBoard::new(Duration::from_millis(50));
        board.set(OperationStatus::Success);
        assert_eq!(board.current(), OperationStatus::Success);
        let later = Instant::now() + Duration::from_millis(100);
        assert_eq!(board.current_at(later), OperationStatus::Idle);
    }

    #[test]
    fn in_progress_never_times_out() {
        let mut board = StatusBoard::new(Duration::from_millis(0));
        assert!(board.try_begin());
        assert_eq!(board.current(), OperationStatus::InProgress);
        assert!(!board.try_begin());
    }
}
