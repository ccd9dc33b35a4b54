//! Collaborators the booking reducer depends on.
//!
//! Every dependency is a trait object so tests can swap in the in-memory
//! implementations from [`crate::mocks`].

use crate::types::{
    Cinema, City, Credentials, Movie, MovieId, OrderRequest, Perk, Promotion, Registration,
    ShowtimeId, Showtime, Snack, TicketType, User, UserId,
};
use boxoffice_core::environment::Clock;
use chrono::NaiveDate;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use thiserror::Error;

/// Service call result
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Boxed future returned by every service call
pub type ServiceFuture<T> = Pin<Box<dyn Future<Output = ServiceResult<T>> + Send>>;

/// Failure of a backend call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The backend answered and refused
    #[error("rejected by backend: {}", message.as_deref().unwrap_or("no message"))]
    Rejected {
        /// The backend's explanation, if it sent one
        message: Option<String>,
    },

    /// The backend could not be reached or answered garbage
    #[error("backend unavailable: {0}")]
    Unavailable(String),
}

impl ServiceError {
    /// Rejection carrying the backend's message
    #[must_use]
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }

    /// Message to show the user: the backend's own words when it gave any
    #[must_use]
    pub fn user_message(&self, fallback: &str) -> String {
        match self {
            Self::Rejected {
                message: Some(message),
            } => message.clone(),
            _ => fallback.to_string(),
        }
    }
}

/// Read-only catalog queries
pub trait CatalogService: Send + Sync {
    /// All movies on the billboard
    fn movies(&self) -> ServiceFuture<Vec<Movie>>;

    /// Showtimes, optionally filtered by movie and date
    fn showtimes(&self, movie_id: Option<MovieId>, date: Option<NaiveDate>) -> ServiceFuture<Vec<Showtime>>;

    /// Labels of seats already sold for a showtime
    fn occupied_seats(&self, showtime_id: ShowtimeId) -> ServiceFuture<Vec<String>>;

    /// Ticket types, optionally for one room type
    fn ticket_types(&self, room_type: Option<String>) -> ServiceFuture<Vec<TicketType>>;

    /// Concession items
    fn snacks(&self) -> ServiceFuture<Vec<Snack>>;

    /// Current promotions
    fn promotions(&self) -> ServiceFuture<Vec<Promotion>>;

    /// Loyalty perks
    fn perks(&self) -> ServiceFuture<Vec<Perk>>;

    /// Cities with cinemas
    fn cities(&self) -> ServiceFuture<Vec<City>>;

    /// Cinemas, optionally in one city
    fn cinemas(&self, city: Option<String>) -> ServiceFuture<Vec<Cinema>>;
}

/// Account operations
pub trait IdentityService: Send + Sync {
    /// Exchange credentials for a user
    fn login(&self, credentials: Credentials) -> ServiceFuture<User>;

    /// Create a customer account
    fn register(&self, registration: Registration) -> ServiceFuture<()>;
}

/// Reservation submission
pub trait OrderService: Send + Sync {
    /// Submit a reservation
    fn submit(&self, order: OrderRequest) -> ServiceFuture<()>;
}

/// Local cache of the logged-in user
///
/// Failures are reported but never fatal to the session.
pub trait UserCache: Send + Sync {
    /// The cached user, if any
    ///
    /// # Errors
    ///
    /// Returns an error when the cache exists but cannot be read or parsed
    fn load(&self) -> Result<Option<User>, crate::cache::CacheError>;

    /// Replace the cached user
    ///
    /// # Errors
    ///
    /// Returns an error when the cache cannot be written
    fn store(&self, user: &User) -> Result<(), crate::cache::CacheError>;

    /// Forget the cached user
    ///
    /// # Errors
    ///
    /// Returns an error when the cache cannot be removed
    fn clear(&self) -> Result<(), crate::cache::CacheError>;
}

/// Everything the booking reducer needs from the outside world
#[derive(Clone)]
pub struct BookingEnvironment {
    /// Time source for "today" and order numbers
    pub clock: Arc<dyn Clock>,
    /// Catalog queries (occupancy goes through the reducer)
    pub catalog: Arc<dyn CatalogService>,
    /// Login and registration
    pub identity: Arc<dyn IdentityService>,
    /// Reservation submission
    pub orders: Arc<dyn OrderService>,
    /// Logged-in user cache
    pub user_cache: Arc<dyn UserCache>,
    /// User id sent with anonymous orders
    pub guest_user_id: UserId,
}

impl std::fmt::Debug for BookingEnvironment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingEnvironment")
            .field("guest_user_id", &self.guest_user_id)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_message_prefers_backend_text() {
        let error = ServiceError::rejected("Credenciales inválidas");
        assert_eq!(error.user_message("Login failed"), "Credenciales inválidas");
    }

    #[test]
    fn user_message_falls_back() {
        assert_eq!(
            ServiceError::Rejected { message: None }.user_message("Login failed"),
            "Login failed"
        );
        assert_eq!(
            ServiceError::Unavailable("connection refused".into()).user_message("Login failed"),
            "Login failed"
        );
    }
}
