//! Booking session state and its derived values.

use crate::pricing::{BookingTotals, PriceBreakdown};
use crate::seat_map::SeatMap;
use crate::types::{
    CheckoutStatus, Movie, Money, Promotion, Receipt, RequestId, SeatSelection, Showtime,
    SnackLine, Step, TicketLine, User,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Everything the booking flow knows, one per app load
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingState {
    /// Current screen
    pub step: Step,
    /// Movie being booked
    pub selected_movie: Option<Movie>,
    /// Date filter for showtimes
    pub selected_date: NaiveDate,
    /// Showtime being booked; belongs to `selected_movie`
    pub selected_showtime: Option<Showtime>,
    /// Seats in the cart, unique by id, in pick order
    pub selected_seats: Vec<SeatSelection>,
    /// Ticket lines, no zero quantities
    pub selected_tickets: Vec<TicketLine>,
    /// Snack lines, no zero quantities
    pub selected_snacks: Vec<SnackLine>,
    /// Promotion applied to the total
    pub selected_promotion: Option<Promotion>,
    /// Location filter
    pub city: String,
    /// Location filter
    pub cinema: String,
    /// Logged-in user
    pub user: Option<User>,
    /// Seat labels already sold for the selected showtime
    pub occupied_seats: BTreeSet<String>,
    /// Checkout progress
    pub checkout: CheckoutStatus,
    /// Checkout request whose outcome is awaited
    pub pending_checkout: Option<RequestId>,
    /// Last confirmed order
    pub receipt: Option<Receipt>,
    /// Last failure message for the user
    pub last_error: Option<String>,
    /// A login or registration is in flight
    pub auth_pending: bool,
}

impl BookingState {
    /// Fresh session for `today` at a location, optionally restoring a user
    #[must_use]
    pub fn new(today: NaiveDate, city: impl Into<String>, cinema: impl Into<String>, user: Option<User>) -> Self {
        Self {
            selected_date: today,
            city: city.into(),
            cinema: cinema.into(),
            user,
            ..Self::default()
        }
    }

    /// Back to defaults, keeping location and identity
    pub fn reset(&mut self, today: NaiveDate) {
        let city = std::mem::take(&mut self.city);
        let cinema = std::mem::take(&mut self.cinema);
        let user = self.user.take();
        *self = Self::new(today, city, cinema, user);
    }

    /// Drop everything that belongs to the current showtime
    pub(crate) fn clear_showtime_selection(&mut self) {
        self.selected_seats.clear();
        self.selected_tickets.clear();
        self.occupied_seats.clear();
    }

    /// Total number of tickets
    #[must_use]
    pub fn total_tickets(&self) -> u32 {
        self.selected_tickets
            .iter()
            .fold(0, |sum, line| sum.saturating_add(line.quantity))
    }

    /// Whether ticket count equals seat count, as checkout expects
    #[must_use]
    pub fn tickets_match_seats(&self) -> bool {
        usize::try_from(self.total_tickets()).is_ok_and(|tickets| tickets == self.selected_seats.len())
    }

    /// Subtotals and discount for the cart
    #[must_use]
    pub fn totals(&self) -> BookingTotals {
        BookingTotals::compute(
            &self.selected_tickets,
            &self.selected_snacks,
            self.selected_promotion
                .as_ref()
                .and_then(|promotion| promotion.discount.as_ref()),
        )
    }

    /// Sum of ticket lines
    #[must_use]
    pub fn ticket_subtotal(&self) -> Money {
        self.totals().tickets
    }

    /// Sum of snack lines
    #[must_use]
    pub fn snack_subtotal(&self) -> Money {
        self.totals().snacks
    }

    /// Tickets plus snacks
    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.totals().subtotal()
    }

    /// Discount granted by the selected promotion
    #[must_use]
    pub fn discount_amount(&self) -> Money {
        self.totals().discount
    }

    /// The amount charged
    #[must_use]
    pub fn total(&self) -> Money {
        self.totals().total()
    }

    /// Payment screen breakdown with tax backed out of the total
    #[must_use]
    pub fn price_breakdown(&self, tax_rate_percent: u8) -> PriceBreakdown {
        self.totals().breakdown(tax_rate_percent)
    }

    /// Seat labels in pick order
    #[must_use]
    pub fn seat_labels(&self) -> Vec<String> {
        self.selected_seats.iter().map(SeatSelection::label).collect()
    }

    /// Seat grid for the selected showtime
    #[must_use]
    pub fn seat_map(&self) -> Option<SeatMap> {
        self.selected_showtime
            .as_ref()
            .map(|showtime| SeatMap::build(showtime, &self.occupied_seats, &self.selected_seats))
    }
}
