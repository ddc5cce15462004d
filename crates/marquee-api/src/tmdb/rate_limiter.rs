//! Request pacing for the TMDB API.

use std::time::{Duration, Instant};

/// Default minimum interval between requests (~40 req/s).
const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(25);

/// Reserves evenly spaced request slots.
///
/// Each call to [`RateLimiter::acquire`] claims the next free slot and
/// sleeps until it begins, so callers sharing the limiter are spaced at
/// least `min_interval` apart.
#[derive(Debug)]
pub struct RateLimiter {
    /// Minimum spacing between request slots.
    min_interval: Duration,
    /// Earliest instant the next request may start.
    next_slot: Option<Instant>,
}

impl RateLimiter {
    /// Creates a limiter with the given minimum interval.
    pub(crate) const fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            next_slot: None,
        }
    }

    /// Creates a limiter with the default interval (25ms).
    pub(crate) const fn with_default_interval() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }

    /// Claims the next slot and waits for it.
    pub async fn acquire(&mut self) {
        let now = Instant::now();
        let start = self.next_slot.map_or(now, |slot| slot.max(now));
        self.next_slot = start.checked_add(self.min_interval);

        if start > now {
            tokio::time::sleep(start.saturating_duration_since(now)).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_first_acquire_does_not_wait() {
        // Arrange
        let mut limiter = RateLimiter::new(Duration::from_secs(1));

        // Act
        let start = Instant::now();
        limiter.acquire().await;

        // Assert
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_consecutive_acquires_are_spaced() {
        // Arrange
        let mut limiter = RateLimiter::new(Duration::from_millis(50));

        // Act
        let start = Instant::now();
        limiter.acquire().await;
        limiter.acquire().await;
        limiter.acquire().await;

        // Assert
        assert!(start.elapsed() >= Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_zero_interval_never_waits() {
        // Arrange
        let mut limiter = RateLimiter::new(Duration::ZERO);

        // Act
        let start = Instant::now();
        for _ in 0..10 {
            limiter.acquire().await;
        }

        // Assert
        assert!(start.elapsed() < Duration::from_millis(100));
        assert!(limiter.next_slot.is_some());
    }

    #[test]
    fn test_default_interval() {
        // Arrange & Act
        let limiter = RateLimiter::with_default_interval();

        // Assert
        assert_eq!(limiter.min_interval, Duration::from_millis(25));
    }
}
