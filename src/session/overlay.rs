//! "Game Exited" overlay gate.

use std::time::Duration;

use tokio::time::Instant;

/// Elapsed-time gate for the exit overlay. Once armed it is visible until
/// the window passes; [`DisclaimerTimer::poll`] reports expiry exactly once.
#[derive(Debug, Clone)]
pub struct DisclaimerTimer {
    window: Duration,
    armed_at: Option<Instant>,
}

impl DisclaimerTimer {
    /// Unarmed timer.
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            armed_at: None,
        }
    }

    /// Start the window at `now`. No-op if already armed.
    pub fn arm(&mut self, now: Instant) {
        if self.armed_at.is_none() {
            self.armed_at = Some(now);
        }
    }

    /// Hide without expiring.
    pub fn disarm(&mut self) {
        self.armed_at = None;
    }

    /// Whether the overlay is showing.
    pub fn is_visible(&self) -> bool {
        self.armed_at.is_some()
    }

    /// `true` on the first poll after the window has passed; the timer
    /// disarms itself.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.armed_at {
            Some(start) if now.duration_since(start) > self.window => {
                self.armed_at = None;
                true
            }
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test(start_paused = true)]
    async fn test_expires_after_window() {
        let mut timer = DisclaimerTimer::new(Duration::from_millis(2000));
        assert!(!timer.poll(Instant::now()));

        let start = Instant::now();
        timer.arm(start);
        assert!(timer.is_visible());
        assert!(!timer.poll(start + Duration::from_millis(2000)));
        assert!(timer.poll(start + Duration::from_millis(2001)));
        assert!(!timer.is_visible());
        assert!(!timer.poll(start + Duration::from_millis(5000)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rearm_does_not_extend() {
        let mut timer = DisclaimerTimer::new(Duration::from_millis(100));
        let start = Instant::now();
        timer.arm(start);
        timer.arm(start + Duration::from_millis(90));
        assert!(timer.poll(start + Duration::from_millis(101)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_disarm_hides() {
        let mut timer = DisclaimerTimer::new(Duration::from_millis(100));
        let start = Instant::now();
        timer.arm(start);
        timer.disarm();
        assert!(!timer.is_visible());
        assert!(!timer.poll(start + Duration::from_secs(1)));
    }
}
