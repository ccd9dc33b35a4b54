//! Inputs to the booking reducer.
//!
//! Commands come from the views; outcomes are produced by effects and fed
//! back through the store.

use crate::types::{
    Credentials, Movie, Promotion, Receipt, Registration, RequestId, SeatId, SeatSelection,
    ShowtimeId, Showtime, Snack, SnackId, Step, TicketLine, TicketType, TicketTypeId, User,
};
use boxoffice_macros::Action;
use chrono::NaiveDate;

/// Every action the booking reducer handles
#[derive(Action, Clone, Debug, PartialEq, Eq)]
pub enum BookingAction {
    // ========== Selection ==========
    /// Pick a movie (or go back to the catalog with `None`)
    #[command]
    SelectMovie(Option<Movie>),

    /// Set the showtime date filter
    #[command]
    SelectDate(NaiveDate),

    /// Pick a showtime; a new one triggers an occupancy fetch
    #[command]
    SelectShowtime(Option<Showtime>),

    /// Add a seat unless one with the same id is already in the cart
    #[command]
    AddSeat(SeatSelection),

    /// Remove a seat by id
    #[command]
    RemoveSeat(SeatId),

    /// Replace all ticket lines
    #[command]
    SetTickets(Vec<TicketLine>),

    /// Change the quantity of an existing ticket line; absent lines are ignored
    #[command]
    UpdateTicketQuantity {
        /// Line to change
        ticket_type_id: TicketTypeId,
        /// New quantity; zero or less removes the line
        quantity: i32,
    },

    /// Create, update, or remove a ticket line
    #[command]
    UpsertTicket {
        /// Ticket type of the line
        ticket_type: TicketType,
        /// New quantity; zero or less removes the line
        quantity: i32,
    },

    /// One ticket per seat, typed after the showtime's room
    #[command]
    AutoAssignTickets,

    /// Add one unit of a snack
    #[command]
    AddSnack(Snack),

    /// Remove a snack line
    #[command]
    RemoveSnack(SnackId),

    /// Change the quantity of an existing snack line
    #[command]
    UpdateSnackQuantity {
        /// Line to change
        snack_id: SnackId,
        /// New quantity; zero or less removes the line
        quantity: i32,
    },

    /// Apply or clear a promotion
    #[command]
    SetPromotion(Option<Promotion>),

    /// Set the city filter
    #[command]
    SetCity(String),

    /// Set the cinema filter
    #[command]
    SetCinema(String),

    // ========== Flow ==========
    /// Move to any screen
    #[command]
    SetStep(Step),

    /// Clear the booking, keeping location and user
    #[command]
    ResetBooking,

    // ========== Identity ==========
    /// Log in
    #[command]
    Login {
        /// Correlates the outcome
        request_id: RequestId,
        /// Form input
        credentials: Credentials,
    },

    /// Log out and forget the cached user
    #[command]
    Logout,

    /// Create an account
    #[command]
    Register {
        /// Correlates the outcome
        request_id: RequestId,
        /// Form input
        registration: Registration,
    },

    /// Login accepted
    #[outcome]
    LoginSucceeded {
        /// The originating request
        request_id: RequestId,
        /// The user now logged in
        user: User,
    },

    /// Login refused or backend unreachable
    #[outcome]
    LoginFailed {
        /// The originating request
        request_id: RequestId,
        /// Message for the user
        message: String,
    },

    /// Account created
    #[outcome]
    Registered {
        /// The originating request
        request_id: RequestId,
    },

    /// Account creation refused
    #[outcome]
    RegistrationFailed {
        /// The originating request
        request_id: RequestId,
        /// Message for the user
        message: String,
    },

    // ========== Checkout ==========
    /// Submit the reservation
    #[command]
    ConfirmBooking {
        /// Correlates the outcome
        request_id: RequestId,
    },

    /// Abort an in-flight submission
    #[command]
    CancelCheckout,

    /// Backend accepted the reservation
    #[outcome]
    BookingConfirmed {
        /// The originating request
        request_id: RequestId,
        /// The recorded order
        receipt: Receipt,
    },

    /// Reservation refused, unreachable backend, or nothing to book
    #[outcome]
    CheckoutFailed {
        /// The originating request
        request_id: RequestId,
        /// Message for the user
        message: String,
    },

    /// Submission aborted before the backend answered
    #[outcome]
    CheckoutCancelled {
        /// The originating request
        request_id: RequestId,
    },

    // ========== Occupancy ==========
    /// Sold seats for a showtime arrived
    #[outcome]
    OccupancyLoaded {
        /// The showtime they belong to
        showtime_id: ShowtimeId,
        /// Seat labels
        seats: Vec<String>,
    },
}

impl BookingAction {
    /// The request this action starts or answers, if any
    #[must_use]
    pub const fn request_id(&self) -> Option<&RequestId> {
        match self {
            Self::Login { request_id, .. }
            | Self::Register { request_id, .. }
            | Self::LoginSucceeded { request_id, .. }
            | Self::LoginFailed { request_id, .. }
            | Self::Registered { request_id }
            | Self::RegistrationFailed { request_id, .. }
            | Self::ConfirmBooking { request_id }
            | Self::BookingConfirmed { request_id, .. }
            | Self::CheckoutFailed { request_id, .. }
            | Self::CheckoutCancelled { request_id } => Some(request_id),
            _ => None,
        }
    }

    /// Whether this is the outcome of `request_id`
    #[must_use]
    pub fn answers(&self, request_id: &RequestId) -> bool {
        self.is_outcome() && self.request_id() == Some(request_id)
    }
}
