//! Reducer logic for the booking session.
//!
//! Selection commands mutate state directly and never fail. Checkout,
//! identity, and occupancy go through effects whose outcomes come back as
//! actions; outcomes for a request that is no longer pending are ignored.

use crate::action::BookingAction;
use crate::environment::BookingEnvironment;
use crate::seat_map::seat_price;
use crate::state::BookingState;
use crate::types::{
    CheckoutStatus, Credentials, OrderRequest, Receipt, Registration, RequestId, ShowtimeId,
    Showtime, SnackLine, Step, TicketLine, TicketType, TicketTypeId,
};
use boxoffice_core::{
    SmallVec,
    effect::{Effect, EffectId},
    smallvec,
};

/// Key of the in-flight reservation submission
pub const CHECKOUT_EFFECT: EffectId = EffectId::new("checkout");

/// Key of the in-flight occupancy fetch
pub const OCCUPANCY_EFFECT: EffectId = EffectId::new("occupancy");

const LOGIN_FAILED: &str = "Login failed";
const MISSING_CREDENTIALS: &str = "Email and password are required";
const REGISTRATION_FAILED: &str = "The account could not be created";
const CHECKOUT_FAILED: &str = "The booking could not be completed";
const NO_SHOWTIME: &str = "Select a showtime before confirming";
const CHECKOUT_IN_PROGRESS: &str = "A booking is already being submitted";
const CHECKOUT_CANCELLED: &str = "The booking was cancelled";

type Effects = SmallVec<[Effect<BookingAction>; 4]>;

/// Reducer for the booking session
#[derive(Clone, Debug, Default)]
pub struct BookingReducer;

impl BookingReducer {
    /// Creates a new `BookingReducer`
    #[must_use]
    pub const fn new() -> Self {
        Self
    }

    /// Positive quantities only
    fn positive(quantity: i32) -> Option<u32> {
        u32::try_from(quantity).ok().filter(|q| *q > 0)
    }

    /// An effect that immediately yields `action`
    fn reply(action: BookingAction) -> Effect<BookingAction> {
        Effect::future(async move { Some(action) })
    }

    fn fetch_occupancy(env: &BookingEnvironment, showtime_id: ShowtimeId) -> Effect<BookingAction> {
        let catalog = env.catalog.clone();
        Effect::future(async move {
            let seats = match catalog.occupied_seats(showtime_id).await {
                Ok(seats) => seats,
                Err(error) => {
                    tracing::warn!(%showtime_id, %error, "Occupancy fetch failed, assuming none");
                    Vec::new()
                },
            };
            Some(BookingAction::OccupancyLoaded { showtime_id, seats })
        })
        .cancellable(OCCUPANCY_EFFECT)
    }

    fn login(env: &BookingEnvironment, request_id: RequestId, credentials: Credentials) -> Effect<BookingAction> {
        let identity = env.identity.clone();
        let cache = env.user_cache.clone();
        Effect::future(async move {
            match identity.login(credentials).await {
                Ok(user) => {
                    if let Err(error) = cache.store(&user) {
                        tracing::warn!(%error, "Could not cache logged-in user");
                    }
                    Some(BookingAction::LoginSucceeded { request_id, user })
                },
                Err(error) => Some(BookingAction::LoginFailed {
                    request_id,
                    message: error.user_message(LOGIN_FAILED),
                }),
            }
        })
    }

    fn register(
        env: &BookingEnvironment,
        request_id: RequestId,
        registration: Registration,
    ) -> Effect<BookingAction> {
        let identity = env.identity.clone();
        Effect::future(async move {
            match identity.register(registration).await {
                Ok(()) => Some(BookingAction::Registered { request_id }),
                Err(error) => Some(BookingAction::RegistrationFailed {
                    request_id,
                    message: error.user_message(REGISTRATION_FAILED),
                }),
            }
        })
    }

    fn submit_order(
        env: &BookingEnvironment,
        request_id: RequestId,
        order: OrderRequest,
        receipt: Receipt,
    ) -> Effect<BookingAction> {
        let orders = env.orders.clone();
        Effect::future(async move {
            match orders.submit(order).await {
                Ok(()) => Some(BookingAction::BookingConfirmed { request_id, receipt }),
                Err(error) => Some(BookingAction::CheckoutFailed {
                    request_id,
                    message: error.user_message(CHECKOUT_FAILED),
                }),
            }
        })
        .cancellable(CHECKOUT_EFFECT)
    }

    /// `ORD-` followed by the last eight digits of the epoch millis
    fn order_number(env: &BookingEnvironment) -> String {
        let millis = env.clock.now().timestamp_millis();
        format!("ORD-{:08}", millis.rem_euclid(100_000_000))
    }

    /// The single ticket line for the selected seats
    fn auto_ticket(showtime: &Showtime, seats: u32) -> TicketLine {
        let (id, name) = if showtime.is_vip() {
            ("vip", "VIP")
        } else {
            ("general", "General")
        };
        TicketLine {
            ticket_type: TicketType {
                id: TicketTypeId::new(id),
                name: format!("{name} {}", showtime.format).trim_end().to_string(),
                price: seat_price(showtime),
                description: None,
                room_type: Some(showtime.room_type.clone()),
            },
            quantity: seats,
        }
    }

    /// Abort the pending checkout, if any, answering its waiter
    fn cancel_checkout(state: &mut BookingState) -> Effects {
        let Some(request_id) = state.pending_checkout.take() else {
            return SmallVec::new();
        };
        tracing::info!(%request_id, "Cancelling in-flight checkout");
        state.checkout = CheckoutStatus::Idle;
        state.last_error = Some(CHECKOUT_CANCELLED.to_string());
        smallvec![
            Effect::Cancel(CHECKOUT_EFFECT),
            Self::reply(BookingAction::CheckoutCancelled { request_id }),
        ]
    }

    fn confirm_booking(state: &mut BookingState, request_id: RequestId, env: &BookingEnvironment) -> Effects {
        if state.checkout == CheckoutStatus::Submitting {
            tracing::warn!(%request_id, "Checkout already in flight");
            state.last_error = Some(CHECKOUT_IN_PROGRESS.to_string());
            return smallvec![Self::reply(BookingAction::CheckoutFailed {
                request_id,
                message: CHECKOUT_IN_PROGRESS.to_string(),
            })];
        }

        state.pending_checkout = Some(request_id);
        state.last_error = None;

        let Some(showtime) = state.selected_showtime.as_ref() else {
            return smallvec![Self::reply(BookingAction::CheckoutFailed {
                request_id,
                message: NO_SHOWTIME.to_string(),
            })];
        };

        let totals = state.totals();
        let seats = state.seat_labels();
        let order = OrderRequest {
            user_id: state.user.as_ref().map_or(env.guest_user_id, |user| user.id),
            showtime_id: showtime.id,
            seats: seats.clone(),
            total: totals.total(),
        };
        let receipt = Receipt {
            order_number: Self::order_number(env),
            showtime_id: showtime.id,
            seats,
            tickets: state.selected_tickets.clone(),
            snacks: state.selected_snacks.clone(),
            discount: totals.discount,
            total: totals.total(),
            issued_at: env.clock.now(),
        };

        tracing::info!(
            %request_id,
            showtime_id = %order.showtime_id,
            seats = order.seats.len(),
            total = %order.total,
            "Submitting booking"
        );
        state.checkout = CheckoutStatus::Submitting;

        smallvec![Self::submit_order(env, request_id, order, receipt)]
    }

    /// Whether an outcome belongs to the checkout still awaited
    fn is_pending_checkout(state: &BookingState, request_id: &RequestId) -> bool {
        state.pending_checkout.as_ref() == Some(request_id)
    }
}

impl boxoffice_core::reducer::Reducer for BookingReducer {
    type State = BookingState;
    type Action = BookingAction;
    type Environment = BookingEnvironment;

    #[allow(clippy::too_many_lines)] // One arm per action
    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        tracing::trace!(action = action.name(), "Reducing");

        match action {
            // ========== Selection ==========
            BookingAction::SelectMovie(movie) => {
                let changed = state.selected_movie.as_ref().map(|m| m.id) != movie.as_ref().map(|m| m.id);
                state.step = if movie.is_some() { Step::MovieDetail } else { Step::Catalog };
                state.selected_movie = movie;
                if changed {
                    state.selected_showtime = None;
                    state.clear_showtime_selection();
                    return smallvec![Effect::Cancel(OCCUPANCY_EFFECT)];
                }
                SmallVec::new()
            },

            BookingAction::SelectDate(date) => {
                state.selected_date = date;
                SmallVec::new()
            },

            BookingAction::SelectShowtime(showtime) => {
                if let (Some(movie), Some(showtime)) = (&state.selected_movie, &showtime) {
                    if movie.id != showtime.movie_id {
                        tracing::warn!(
                            movie_id = %movie.id,
                            showtime_movie_id = %showtime.movie_id,
                            "Ignoring showtime for another movie"
                        );
                        return SmallVec::new();
                    }
                }

                let previous = state.selected_showtime.as_ref().map(|s| s.id);
                let next = showtime.as_ref().map(|s| s.id);
                state.selected_showtime = showtime;

                if previous == next {
                    return SmallVec::new();
                }

                state.clear_showtime_selection();
                match next {
                    Some(showtime_id) => smallvec![Self::fetch_occupancy(env, showtime_id)],
                    None => smallvec![Effect::Cancel(OCCUPANCY_EFFECT)],
                }
            },

            BookingAction::AddSeat(seat) => {
                if !state.selected_seats.iter().any(|s| s.id == seat.id) {
                    state.selected_seats.push(seat);
                }
                SmallVec::new()
            },

            BookingAction::RemoveSeat(seat_id) => {
                state.selected_seats.retain(|s| s.id != seat_id);
                SmallVec::new()
            },

            BookingAction::SetTickets(tickets) => {
                state.selected_tickets = tickets.into_iter().filter(|line| line.quantity > 0).collect();
                SmallVec::new()
            },

            BookingAction::UpdateTicketQuantity { ticket_type_id, quantity } => {
                // Only existing lines change; use UpsertTicket to create one
                if let Some(index) = state
                    .selected_tickets
                    .iter()
                    .position(|line| line.ticket_type.id == ticket_type_id)
                {
                    match Self::positive(quantity) {
                        Some(quantity) => state.selected_tickets[index].quantity = quantity,
                        None => {
                            state.selected_tickets.remove(index);
                        },
                    }
                }
                SmallVec::new()
            },

            BookingAction::UpsertTicket { ticket_type, quantity } => {
                let existing = state
                    .selected_tickets
                    .iter()
                    .position(|line| line.ticket_type.id == ticket_type.id);
                match (existing, Self::positive(quantity)) {
                    (Some(index), Some(quantity)) => {
                        let line = &mut state.selected_tickets[index];
                        line.ticket_type = ticket_type;
                        line.quantity = quantity;
                    },
                    (Some(index), None) => {
                        state.selected_tickets.remove(index);
                    },
                    (None, Some(quantity)) => {
                        state.selected_tickets.push(TicketLine { ticket_type, quantity });
                    },
                    (None, None) => {},
                }
                SmallVec::new()
            },

            BookingAction::AutoAssignTickets => {
                let Some(showtime) = state.selected_showtime.as_ref() else {
                    tracing::warn!("Cannot assign tickets without a showtime");
                    return SmallVec::new();
                };
                let seats = u32::try_from(state.selected_seats.len()).unwrap_or(u32::MAX);
                state.selected_tickets = if seats == 0 {
                    Vec::new()
                } else {
                    vec![Self::auto_ticket(showtime, seats)]
                };
                SmallVec::new()
            },

            BookingAction::AddSnack(snack) => {
                match state.selected_snacks.iter_mut().find(|line| line.snack.id == snack.id) {
                    Some(line) => line.quantity = line.quantity.saturating_add(1),
                    None => state.selected_snacks.push(SnackLine { snack, quantity: 1 }),
                }
                SmallVec::new()
            },

            BookingAction::RemoveSnack(snack_id) => {
                state.selected_snacks.retain(|line| line.snack.id != snack_id);
                SmallVec::new()
            },

            BookingAction::UpdateSnackQuantity { snack_id, quantity } => {
                if let Some(index) = state.selected_snacks.iter().position(|line| line.snack.id == snack_id) {
                    match Self::positive(quantity) {
                        Some(quantity) => state.selected_snacks[index].quantity = quantity,
                        None => {
                            state.selected_snacks.remove(index);
                        },
                    }
                }
                SmallVec::new()
            },

            BookingAction::SetPromotion(promotion) => {
                state.selected_promotion = promotion;
                SmallVec::new()
            },

            BookingAction::SetCity(city) => {
                state.city = city;
                SmallVec::new()
            },

            BookingAction::SetCinema(cinema) => {
                state.cinema = cinema;
                SmallVec::new()
            },

            // ========== Flow ==========
            BookingAction::SetStep(step) => {
                state.step = step;
                if matches!(step, Step::Payment | Step::Receipt) {
                    SmallVec::new()
                } else {
                    Self::cancel_checkout(state)
                }
            },

            BookingAction::ResetBooking => {
                let mut effects = Self::cancel_checkout(state);
                effects.push(Effect::Cancel(OCCUPANCY_EFFECT));
                state.reset(env.clock.now().date_naive());
                effects
            },

            // ========== Identity ==========
            BookingAction::Login { request_id, credentials } => {
                state.last_error = None;
                if credentials.email.trim().is_empty() || credentials.password.is_empty() {
                    return smallvec![Self::reply(BookingAction::LoginFailed {
                        request_id,
                        message: MISSING_CREDENTIALS.to_string(),
                    })];
                }
                state.auth_pending = true;
                smallvec![Self::login(env, request_id, credentials)]
            },

            BookingAction::Logout => {
                tracing::info!("Logging out");
                state.user = None;
                state.step = Step::Catalog;
                let cache = env.user_cache.clone();
                smallvec![Effect::future(async move {
                    if let Err(error) = cache.clear() {
                        tracing::warn!(%error, "Could not clear cached user");
                    }
                    None
                })]
            },

            BookingAction::Register { request_id, registration } => {
                state.last_error = None;
                state.auth_pending = true;
                smallvec![Self::register(env, request_id, registration)]
            },

            BookingAction::LoginSucceeded { user, .. } => {
                tracing::info!(user_id = %user.id, "Logged in");
                state.user = Some(user);
                state.auth_pending = false;
                state.step = Step::Catalog;
                SmallVec::new()
            },

            BookingAction::LoginFailed { message, .. } | BookingAction::RegistrationFailed { message, .. } => {
                tracing::info!(%message, "Identity request refused");
                state.auth_pending = false;
                state.last_error = Some(message);
                SmallVec::new()
            },

            BookingAction::Registered { .. } => {
                state.auth_pending = false;
                state.step = Step::Login;
                SmallVec::new()
            },

            // ========== Checkout ==========
            BookingAction::ConfirmBooking { request_id } => Self::confirm_booking(state, request_id, env),

            BookingAction::CancelCheckout => Self::cancel_checkout(state),

            BookingAction::BookingConfirmed { request_id, receipt } => {
                if Self::is_pending_checkout(state, &request_id) {
                    tracing::info!(order_number = %receipt.order_number, "Booking confirmed");
                    state.pending_checkout = None;
                    state.checkout = CheckoutStatus::Confirmed;
                    state.receipt = Some(receipt);
                    state.last_error = None;
                }
                SmallVec::new()
            },

            BookingAction::CheckoutFailed { request_id, message } => {
                if Self::is_pending_checkout(state, &request_id) {
                    tracing::info!(%message, "Booking failed");
                    state.pending_checkout = None;
                    state.checkout = CheckoutStatus::Failed;
                    state.last_error = Some(message);
                }
                SmallVec::new()
            },

            // State was settled when the cancellation was requested
            BookingAction::CheckoutCancelled { .. } => SmallVec::new(),

            // ========== Occupancy ==========
            BookingAction::OccupancyLoaded { showtime_id, seats } => {
                if state.selected_showtime.as_ref().map(|s| s.id) == Some(showtime_id) {
                    state.occupied_seats = seats.into_iter().collect();
                } else {
                    tracing::debug!(%showtime_id, "Discarding occupancy for a stale showtime");
                }
                SmallVec::new()
            },
        }
    }
}
