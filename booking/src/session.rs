//! `BookingSession`: the booking store plus the request/response calls the
//! screens make.
//!
//! Selection methods only dispatch; they return once the reducer has run.
//! `login`, `register`, and `confirm_booking` dispatch a command tagged with
//! a fresh [`RequestId`] and wait for the outcome that answers it, reading
//! state that already reflects that outcome.

use crate::action::BookingAction;
use crate::cache::FileUserCache;
use crate::config::Config;
use crate::environment::{BookingEnvironment, ServiceError};
use crate::pricing::{DEFAULT_TAX_RATE_PERCENT, PriceBreakdown};
use crate::reducer::BookingReducer;
use crate::seat_map::{SeatMap, SeatStatus};
use crate::state::BookingState;
use crate::types::{
    CheckoutStatus, Cinema, City, Credentials, Money, Movie, Perk, Promotion, Registration, RequestId, SeatId,
    SeatSelection, Showtime, Snack, SnackId, Step, TicketLine, TicketType, User, UserId,
};
use boxoffice_api::ApiClient;
use boxoffice_core::environment::SystemClock;
use boxoffice_runtime::{Store, StoreError};
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// The store behind a booking session
pub type BookingStore = Store<BookingState, BookingAction, BookingEnvironment, BookingReducer>;

const UNEXPECTED_OUTCOME: &str = "Unexpected answer from the booking service";

/// Errors surfaced by the session's request/response calls
#[derive(Debug, Error)]
pub enum SessionError {
    /// The backend refused; the message is meant for the user
    #[error("{0}")]
    Rejected(String),

    /// No outcome arrived in time
    #[error("timed out waiting for the backend")]
    Timeout,

    /// A catalog query failed
    #[error("catalog request failed: {0}")]
    Service(#[from] ServiceError),

    /// The store refused the action (shutting down)
    #[error("store error: {0}")]
    Store(StoreError),
}

impl From<StoreError> for SessionError {
    fn from(error: StoreError) -> Self {
        match error {
            StoreError::Timeout => Self::Timeout,
            other => Self::Store(other),
        }
    }
}

/// Knobs the session needs besides its collaborators
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SessionSettings {
    /// City selected at startup
    pub city: String,
    /// Cinema selected at startup
    pub cinema: String,
    /// Tax included in totals, in percent
    pub tax_rate_percent: u8,
    /// How long login and checkout may take
    pub outcome_timeout: Duration,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            city: "quito".to_string(),
            cinema: "scala".to_string(),
            tax_rate_percent: DEFAULT_TAX_RATE_PERCENT,
            outcome_timeout: Duration::from_secs(30),
        }
    }
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            city: config.session.default_city.clone(),
            cinema: config.session.default_cinema.clone(),
            tax_rate_percent: config.session.tax_rate_percent,
            outcome_timeout: config.session.outcome_timeout(),
        }
    }
}

/// One visitor's booking session
#[derive(Clone)]
pub struct BookingSession {
    store: BookingStore,
    settings: SessionSettings,
}

impl BookingSession {
    /// Start a session, restoring the cached user if there is one
    #[must_use]
    pub fn new(environment: BookingEnvironment, settings: SessionSettings) -> Self {
        let user = environment.user_cache.load().unwrap_or_else(|error| {
            tracing::warn!(%error, "Ignoring unreadable user cache");
            None
        });
        let today = environment.clock.now().date_naive();

        tracing::info!(
            city = %settings.city,
            cinema = %settings.cinema,
            user_id = ?user.as_ref().map(|u| u.id),
            "Booking session started"
        );

        let state = BookingState::new(today, settings.city.clone(), settings.cinema.clone(), user);
        Self {
            store: Store::new(state, BookingReducer::new(), environment),
            settings,
        }
    }

    /// Session talking to the REST backend described by `config`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the HTTP client cannot be built
    pub fn from_config(config: &Config) -> Result<Self, SessionError> {
        let client = Arc::new(
            ApiClient::new(config.api.base_url.clone(), config.api.request_timeout())
                .map_err(ServiceError::from)?,
        );
        let environment = BookingEnvironment {
            clock: Arc::new(SystemClock),
            catalog: client.clone(),
            identity: client.clone(),
            orders: client,
            user_cache: Arc::new(FileUserCache::new(config.session.user_cache.clone())),
            guest_user_id: UserId::new(config.session.guest_user_id),
        };
        Ok(Self::new(environment, SessionSettings::from(config)))
    }

    /// The underlying store, for observers
    #[must_use]
    pub const fn store(&self) -> &BookingStore {
        &self.store
    }

    /// Settings the session was started with
    #[must_use]
    pub const fn settings(&self) -> &SessionSettings {
        &self.settings
    }

    /// Copy of the current state
    pub async fn snapshot(&self) -> BookingState {
        self.store.state(BookingState::clone).await
    }

    /// Read part of the current state
    pub async fn state<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&BookingState) -> T,
    {
        self.store.state(f).await
    }

    async fn dispatch(&self, action: BookingAction) -> Result<(), SessionError> {
        self.store.send(action).await?;
        Ok(())
    }

    // ========== Selection ==========

    /// Pick a movie, or go back to the catalog with `None`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn select_movie(&self, movie: Option<Movie>) -> Result<(), SessionError> {
        self.dispatch(BookingAction::SelectMovie(movie)).await
    }

    /// Set the showtime date filter
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn select_date(&self, date: NaiveDate) -> Result<(), SessionError> {
        self.dispatch(BookingAction::SelectDate(date)).await
    }

    /// Pick a showtime; returns once its occupancy is loaded
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn select_showtime(&self, showtime: Option<Showtime>) -> Result<(), SessionError> {
        let mut handle = self.store.send(BookingAction::SelectShowtime(showtime)).await?;
        handle.wait().await;
        Ok(())
    }

    /// Add a seat to the cart
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn add_seat(&self, seat: SeatSelection) -> Result<(), SessionError> {
        self.dispatch(BookingAction::AddSeat(seat)).await
    }

    /// Remove a seat from the cart
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn remove_seat(&self, seat_id: impl Into<SeatId>) -> Result<(), SessionError> {
        self.dispatch(BookingAction::RemoveSeat(seat_id.into())).await
    }

    /// Select or deselect the seat labelled `label` on the current map
    ///
    /// Occupied seats, aisles, and unknown labels are left alone. Returns
    /// whether the cart changed.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn toggle_seat(&self, label: &str) -> Result<bool, SessionError> {
        let target = self
            .store
            .state(|state| {
                let map = state.seat_map()?;
                let (seat, status) = map.seat(label)?;
                Some((seat.clone(), status))
            })
            .await;

        match target {
            Some((seat, SeatStatus::Available)) => {
                self.add_seat(seat).await?;
                Ok(true)
            },
            Some((seat, SeatStatus::Selected)) => {
                self.remove_seat(seat.id).await?;
                Ok(true)
            },
            _ => Ok(false),
        }
    }

    /// Replace all ticket lines
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn set_tickets(&self, tickets: Vec<TicketLine>) -> Result<(), SessionError> {
        self.dispatch(BookingAction::SetTickets(tickets)).await
    }

    /// Change the quantity of an existing ticket line
    ///
    /// A ticket type not yet in the cart is ignored; use
    /// [`upsert_ticket`](Self::upsert_ticket) to add one.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn update_ticket_quantity(&self, ticket_type_id: &str, quantity: i32) -> Result<(), SessionError> {
        self.dispatch(BookingAction::UpdateTicketQuantity {
            ticket_type_id: ticket_type_id.into(),
            quantity,
        })
        .await
    }

    /// Create, update, or remove the line for `ticket_type`
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn upsert_ticket(&self, ticket_type: TicketType, quantity: i32) -> Result<(), SessionError> {
        self.dispatch(BookingAction::UpsertTicket { ticket_type, quantity })
            .await
    }

    /// Leave the seat screen: one ticket per seat, then the snack offer
    ///
    /// Returns `false` without moving when no seat is selected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn continue_from_seats(&self) -> Result<bool, SessionError> {
        let ready = self
            .store
            .state(|state| state.selected_showtime.is_some() && !state.selected_seats.is_empty())
            .await;
        if !ready {
            return Ok(false);
        }
        self.dispatch(BookingAction::AutoAssignTickets).await?;
        self.dispatch(BookingAction::SetStep(Step::SnackUpsell)).await?;
        Ok(true)
    }

    /// Add one unit of a snack
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn add_snack(&self, snack: Snack) -> Result<(), SessionError> {
        self.dispatch(BookingAction::AddSnack(snack)).await
    }

    /// Remove a snack line
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn remove_snack(&self, snack_id: impl Into<SnackId>) -> Result<(), SessionError> {
        self.dispatch(BookingAction::RemoveSnack(snack_id.into())).await
    }

    /// Change the quantity of a snack line
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn update_snack_quantity(&self, snack_id: &str, quantity: i32) -> Result<(), SessionError> {
        self.dispatch(BookingAction::UpdateSnackQuantity {
            snack_id: snack_id.into(),
            quantity,
        })
        .await
    }

    /// Apply or clear a promotion
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn set_promotion(&self, promotion: Option<Promotion>) -> Result<(), SessionError> {
        self.dispatch(BookingAction::SetPromotion(promotion)).await
    }

    /// Set the city filter
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn set_city(&self, city: impl Into<String>) -> Result<(), SessionError> {
        self.dispatch(BookingAction::SetCity(city.into())).await
    }

    /// Set the cinema filter
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn set_cinema(&self, cinema: impl Into<String>) -> Result<(), SessionError> {
        self.dispatch(BookingAction::SetCinema(cinema.into())).await
    }

    // ========== Flow ==========

    /// Move to any screen
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn set_step(&self, step: Step) -> Result<(), SessionError> {
        self.dispatch(BookingAction::SetStep(step)).await
    }

    /// Clear the booking, keeping location and user
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn reset_booking(&self) -> Result<(), SessionError> {
        self.dispatch(BookingAction::ResetBooking).await
    }

    // ========== Totals ==========

    /// The amount charged
    pub async fn total(&self) -> Money {
        self.store.state(BookingState::total).await
    }

    /// Payment screen breakdown at the configured tax rate
    pub async fn price_breakdown(&self) -> PriceBreakdown {
        let rate = self.settings.tax_rate_percent;
        self.store.state(|state| state.price_breakdown(rate)).await
    }

    /// Seat grid for the selected showtime
    pub async fn seat_map(&self) -> Option<SeatMap> {
        self.store.state(BookingState::seat_map).await
    }

    // ========== Identity ==========

    /// Log in and return the user
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Rejected` with the backend's message when the
    /// credentials are refused, or `SessionError::Timeout`
    pub async fn login(&self, email: &str, password: &str) -> Result<User, SessionError> {
        let request_id = RequestId::new();
        let action = BookingAction::Login {
            request_id,
            credentials: Credentials {
                email: email.trim().to_string(),
                password: password.to_string(),
            },
        };

        match self.request(action, request_id).await? {
            BookingAction::LoginSucceeded { user, .. } => Ok(user),
            BookingAction::LoginFailed { message, .. } => Err(SessionError::Rejected(message)),
            other => Err(Self::unexpected(&other)),
        }
    }

    /// Log out and forget the cached user
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn logout(&self) -> Result<(), SessionError> {
        self.dispatch(BookingAction::Logout).await
    }

    /// Create an account; on success the session moves to the login screen
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Rejected` with the backend's message when the
    /// account is refused, or `SessionError::Timeout`
    pub async fn register(&self, registration: Registration) -> Result<(), SessionError> {
        let request_id = RequestId::new();
        let action = BookingAction::Register {
            request_id,
            registration,
        };

        match self.request(action, request_id).await? {
            BookingAction::Registered { .. } => Ok(()),
            BookingAction::RegistrationFailed { message, .. } => Err(SessionError::Rejected(message)),
            other => Err(Self::unexpected(&other)),
        }
    }

    // ========== Checkout ==========

    /// Submit the reservation
    ///
    /// Returns `true` when the backend accepted it; the receipt is then in
    /// state. On `false` the reason is in `last_error`. The step never
    /// changes here.
    pub async fn confirm_booking(&self) -> bool {
        let request_id = RequestId::new();
        let outcome = self
            .request(BookingAction::ConfirmBooking { request_id }, request_id)
            .await;

        let (confirmed, label) = match outcome {
            Ok(BookingAction::BookingConfirmed { .. }) => (true, "confirmed"),
            Ok(BookingAction::CheckoutFailed { .. }) => (false, "failed"),
            Ok(BookingAction::CheckoutCancelled { .. }) => (false, "cancelled"),
            Ok(other) => {
                tracing::warn!(action = other.name(), "Unexpected checkout outcome");
                (false, "failed")
            },
            Err(SessionError::Timeout) => {
                tracing::warn!(%request_id, "Checkout timed out, cancelling");
                if self.settle_timed_out_checkout().await {
                    (true, "confirmed")
                } else {
                    (false, "timeout")
                }
            },
            Err(error) => {
                tracing::warn!(%error, "Checkout could not be dispatched");
                (false, "failed")
            },
        };

        metrics::counter!("booking.checkout", "outcome" => label).increment(1);
        confirmed
    }

    /// Cancel a checkout whose outcome never arrived
    ///
    /// A confirmation reduced between the timeout and the cancel wins.
    async fn settle_timed_out_checkout(&self) -> bool {
        if let Err(error) = self.dispatch(BookingAction::CancelCheckout).await {
            tracing::warn!(%error, "Could not cancel timed-out checkout");
        }
        self.state(|s| s.checkout).await == CheckoutStatus::Confirmed
    }

    /// Abort an in-flight checkout
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` once the session is shutting down
    pub async fn cancel_checkout(&self) -> Result<(), SessionError> {
        self.dispatch(BookingAction::CancelCheckout).await
    }

    async fn request(&self, action: BookingAction, request_id: RequestId) -> Result<BookingAction, SessionError> {
        let outcome = self
            .store
            .send_and_wait_for(action, |a| a.answers(&request_id), self.settings.outcome_timeout)
            .await?;
        Ok(outcome)
    }

    fn unexpected(action: &BookingAction) -> SessionError {
        tracing::warn!(action = action.name(), "Unexpected outcome");
        SessionError::Rejected(UNEXPECTED_OUTCOME.to_string())
    }

    // ========== Catalog ==========

    /// Movies on the billboard
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the catalog is unreachable
    pub async fn movies(&self) -> Result<Vec<Movie>, SessionError> {
        Ok(self.store.environment().catalog.movies().await?)
    }

    /// Showtimes of the selected movie on the selected date
    ///
    /// Empty when no movie is selected.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the catalog is unreachable
    pub async fn showtimes(&self) -> Result<Vec<Showtime>, SessionError> {
        let (movie_id, date) = self
            .store
            .state(|state| (state.selected_movie.as_ref().map(|m| m.id), state.selected_date))
            .await;
        let Some(movie_id) = movie_id else {
            return Ok(Vec::new());
        };
        Ok(self
            .store
            .environment()
            .catalog
            .showtimes(Some(movie_id), Some(date))
            .await?)
    }

    /// Ticket types for the selected showtime's room, or all of them
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the catalog is unreachable
    pub async fn ticket_types(&self) -> Result<Vec<TicketType>, SessionError> {
        let room_type = self
            .store
            .state(|state| state.selected_showtime.as_ref().map(|s| s.room_type.clone()))
            .await;
        Ok(self.store.environment().catalog.ticket_types(room_type).await?)
    }

    /// Concession items
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the catalog is unreachable
    pub async fn snacks(&self) -> Result<Vec<Snack>, SessionError> {
        Ok(self.store.environment().catalog.snacks().await?)
    }

    /// Current promotions
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the catalog is unreachable
    pub async fn promotions(&self) -> Result<Vec<Promotion>, SessionError> {
        Ok(self.store.environment().catalog.promotions().await?)
    }

    /// Loyalty perks
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the catalog is unreachable
    pub async fn perks(&self) -> Result<Vec<Perk>, SessionError> {
        Ok(self.store.environment().catalog.perks().await?)
    }

    /// Cities with cinemas
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the catalog is unreachable
    pub async fn cities(&self) -> Result<Vec<City>, SessionError> {
        Ok(self.store.environment().catalog.cities().await?)
    }

    /// Cinemas in the selected city
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Service` if the catalog is unreachable
    pub async fn cinemas(&self) -> Result<Vec<Cinema>, SessionError> {
        let city = self.store.state(|state| state.city.clone()).await;
        Ok(self.store.environment().catalog.cinemas(Some(city)).await?)
    }

    // ========== Lifecycle ==========

    /// Stop accepting actions and wait for in-flight effects
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Store` if effects outlive the shutdown timeout
    pub async fn shutdown(&self) -> Result<(), SessionError> {
        tracing::info!("Booking session shutting down");
        self.store.shutdown_default().await.map_err(SessionError::Store)
    }
}

impl std::fmt::Debug for BookingSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BookingSession")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
