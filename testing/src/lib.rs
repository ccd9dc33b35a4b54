//! # Box Office Testing
//!
//! Testing utilities and helpers for the Box Office booking architecture.
//!
//! This crate provides:
//! - Mock implementations of Environment traits
//! - A Given-When-Then harness for reducers
//! - Assertion helpers for effects
//!
//! ## Example
//!
//! ```ignore
//! use boxoffice_testing::test_clock;
//! use boxoffice_runtime::Store;
//!
//! #[tokio::test]
//! async fn test_seat_selection() {
//!     let store = Store::new(BookingState::default(), BookingReducer, test_environment());
//!
//!     store.send(BookingAction::AddSeat(seat("A", 1))).await.unwrap();
//!
//!     let seats = store.state(|s| s.selected_seats.len()).await;
//!     assert_eq!(seats, 1);
//! }
//! ```

use boxoffice_core::environment::Clock;
use chrono::{DateTime, Utc};

pub mod reducer_test;

pub use reducer_test::{ReducerTest, assertions};

/// Mock implementations of Environment traits
pub mod mocks {
    use super::{Clock, DateTime, Utc};

    /// Fixed clock for deterministic tests
    ///
    /// Always returns the same time, making tests reproducible.
    ///
    /// # Example
    ///
    /// ```
    /// use boxoffice_testing::mocks::FixedClock;
    /// use boxoffice_core::environment::Clock;
    /// use chrono::Utc;
    ///
    /// let clock = FixedClock::new(Utc::now());
    /// assert_eq!(clock.now(), clock.now());
    /// ```
    #[derive(Debug, Clone)]
    pub struct FixedClock {
        time: DateTime<Utc>,
    }

    impl FixedClock {
        /// Create a new fixed clock with the given time
        #[must_use]
        pub const fn new(time: DateTime<Utc>) -> Self {
            Self { time }
        }

        /// Create a fixed clock from milliseconds since the Unix epoch
        ///
        /// Out-of-range values fall back to the epoch.
        #[must_use]
        pub fn at_millis(millis: i64) -> Self {
            Self {
                time: DateTime::<Utc>::from_timestamp_millis(millis).unwrap_or_default(),
            }
        }
    }

    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            self.time
        }
    }

    /// Create a default fixed clock for tests (2025-01-01 00:00:00 UTC)
    #[must_use]
    pub fn test_clock() -> FixedClock {
        // 2025-01-01T00:00:00Z
        FixedClock::at_millis(1_735_689_600_000)
    }
}

/// Test helpers and utilities
pub mod helpers {
    use boxoffice_core::effect::Effect;

    /// Install a fmt subscriber that writes through the test harness
    ///
    /// Safe to call from every test; only the first call installs.
    pub fn init_test_tracing() {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .try_init();
    }

    /// Drive a single `Effect::Future` (optionally wrapped in
    /// `Effect::Cancellable`) to completion and return the action it produced
    ///
    /// Any other effect kind yields `None`.
    pub async fn resolve_future<A>(effect: Effect<A>) -> Option<A> {
        match effect {
            Effect::Future(fut) => fut.await,
            Effect::Cancellable { effect, .. } => Box::pin(resolve_future(*effect)).await,
            _ => None,
        }
    }
}

// Re-export commonly used items
pub use mocks::{FixedClock, test_clock};
