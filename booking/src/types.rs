//! Domain types for the booking session.
//!
//! Prices are integer cents ([`Money`]); on the wire and in the user cache
//! they are decimal dollars.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// Identifiers
// ============================================================================

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            /// Wraps a backend id
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self(id)
            }

            /// The backend id
            #[must_use]
            pub const fn get(&self) -> i64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

macro_rules! string_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Wraps an id
            #[must_use]
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// The id as a string slice
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self::new(id)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

numeric_id!(
    /// Identifier of a movie
    MovieId
);
numeric_id!(
    /// Identifier of a showtime (a "función")
    ShowtimeId
);
numeric_id!(
    /// Identifier of a registered user
    UserId
);
numeric_id!(
    /// Identifier of a promotion
    PromotionId
);
string_id!(
    /// Identifier of a seat, equal to its label ("A1")
    SeatId
);
string_id!(
    /// Identifier of a ticket type ("general", "vip", or a backend id)
    TicketTypeId
);
string_id!(
    /// Identifier of a snack
    SnackId
);

/// Correlates an async request with its outcome action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RequestId(Uuid);

impl RequestId {
    /// Creates a new random `RequestId`
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Get the inner UUID
    #[must_use]
    pub const fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RequestId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Money
// ============================================================================

/// Money amount in cents (avoids floating point errors)
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(u64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0);

    /// Creates a `Money` value from cents
    #[must_use]
    pub const fn from_cents(cents: u64) -> Self {
        Self(cents)
    }

    /// Creates a `Money` value from decimal dollars, rounded to the nearest cent
    ///
    /// Negative and non-finite inputs become zero.
    #[must_use]
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn from_dollars(dollars: f64) -> Self {
        if !dollars.is_finite() || dollars <= 0.0 {
            return Self::ZERO;
        }
        // `as` saturates at u64::MAX
        Self((dollars * 100.0).round() as u64)
    }

    /// Returns the amount in cents
    #[must_use]
    pub const fn cents(&self) -> u64 {
        self.0
    }

    /// Returns the amount as decimal dollars
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_dollars(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Checks if the amount is zero
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Adds two amounts, saturating at the maximum
    #[must_use]
    pub const fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Subtracts, saturating at zero
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Multiplies by a quantity, saturating at the maximum
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(quantity as u64))
    }

    /// `percent`% of this amount, rounded half-up to the cent
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub const fn percent(self, percent: u8) -> Self {
        let scaled = (self.0 as u128) * (percent as u128) + 50;
        let cents = scaled / 100;
        if cents > u64::MAX as u128 {
            Self(u64::MAX)
        } else {
            Self(cents as u64)
        }
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Self::saturating_add)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.to_dollars())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        f64::deserialize(deserializer).map(Self::from_dollars)
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// A movie in the catalog
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Movie {
    /// Movie id
    pub id: MovieId,
    /// Display title
    pub title: String,
    /// Title in the original language
    pub original_title: Option<String>,
    /// Poster image URL
    pub poster: String,
    /// Backdrop image URL
    pub backdrop: String,
    /// Running time ("2h 15min")
    pub duration: String,
    /// Age rating
    pub rating: String,
    /// Genre names
    pub genres: Vec<String>,
    /// Synopsis
    pub synopsis: String,
    /// Director
    pub director: String,
    /// Cast list
    pub cast: Vec<String>,
    /// Release date, as the backend formats it
    pub release_date: String,
    /// Spoken language
    pub language: String,
    /// Projection formats
    pub formats: Vec<String>,
    /// Tickets on sale before release
    pub is_pre_sale: bool,
}

/// One screening of a movie in a room
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Showtime {
    /// Showtime id
    pub id: ShowtimeId,
    /// The movie being shown
    pub movie_id: MovieId,
    /// Start time (`HH:MM`)
    pub time: String,
    /// Date (`YYYY-MM-DD`)
    pub date: String,
    /// Projection format
    pub format: String,
    /// Room name
    pub room: String,
    /// Room type ("VIP", "2D", ...)
    pub room_type: String,
    /// Audio language
    pub language: String,
    /// Ticket price override
    pub price: Option<Money>,
    /// Whether tickets can still be sold
    pub available: bool,
    /// Remaining seat count
    pub available_seats: u32,
}

impl Showtime {
    /// Whether this showtime is in a VIP room
    #[must_use]
    pub fn is_vip(&self) -> bool {
        self.room_type.to_ascii_uppercase().contains("VIP")
    }
}

/// Kind of seat, which decides the default price
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SeatKind {
    /// Standard seat
    #[default]
    Normal,
    /// VIP recliner
    Vip,
}

/// A seat the user picked
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatSelection {
    /// Seat id (equal to its label)
    pub id: SeatId,
    /// Row letter
    pub row: String,
    /// Seat number within the row
    pub number: u32,
    /// Seat kind
    pub kind: SeatKind,
    /// Seat price
    pub price: Money,
}

impl SeatSelection {
    /// Build a selection whose id is its label
    #[must_use]
    pub fn new(row: impl Into<String>, number: u32, kind: SeatKind, price: Money) -> Self {
        let row = row.into();
        Self {
            id: SeatId::new(format!("{row}{number}")),
            row,
            number,
            kind,
            price,
        }
    }

    /// Printed label, row followed by number ("A1")
    #[must_use]
    pub fn label(&self) -> String {
        format!("{}{}", self.row, self.number)
    }
}

/// A kind of ticket with its unit price
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketType {
    /// Ticket type id
    pub id: TicketTypeId,
    /// Display name
    pub name: String,
    /// Unit price
    pub price: Money,
    /// Description
    pub description: Option<String>,
    /// Room type this ticket applies to
    pub room_type: Option<String>,
}

/// Tickets of one type in the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketLine {
    /// The ticket type
    pub ticket_type: TicketType,
    /// Number of tickets
    pub quantity: u32,
}

impl TicketLine {
    /// Unit price times quantity
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.ticket_type.price.times(self.quantity)
    }
}

/// A concession item
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snack {
    /// Snack id
    pub id: SnackId,
    /// Display name
    pub name: String,
    /// Description
    pub description: String,
    /// Unit price
    pub price: Money,
    /// Image URL
    pub image: String,
    /// Category ("combos", "popcorn", "bebidas", "snacks", "dulces")
    pub category: String,
}

/// Snacks of one kind in the cart
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnackLine {
    /// The snack
    pub snack: Snack,
    /// Number of units, at least one
    pub quantity: u32,
}

impl SnackLine {
    /// Unit price times quantity
    #[must_use]
    pub const fn line_total(&self) -> Money {
        self.snack.price.times(self.quantity)
    }
}

/// Structured discount, decided once from the backend label
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "lowercase")]
pub enum Discount {
    /// Percentage off the subtotal (0..=100)
    Percentage(u8),
    /// Fixed amount off the subtotal
    Fixed(Money),
}

/// A marketing promotion
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Promotion {
    /// Promotion id
    pub id: PromotionId,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Image URL
    pub image: String,
    /// Discount it grants, if it grants one
    pub discount: Option<Discount>,
    /// Promo code or validity text
    pub code: Option<String>,
}

/// A loyalty perk
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Perk {
    /// Perk id
    pub id: i64,
    /// Title
    pub title: String,
    /// Description
    pub description: String,
    /// Icon name
    pub icon: String,
    /// Accent color
    pub color: String,
}

/// A city with cinemas
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct City {
    /// City id
    pub id: String,
    /// City name
    pub name: String,
}

/// A cinema venue
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cinema {
    /// Cinema id
    pub id: String,
    /// Cinema name
    pub name: String,
    /// City name
    pub city: String,
    /// Street address
    pub address: String,
}

// ============================================================================
// Identity
// ============================================================================

/// Account role
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    /// Regular customer
    #[default]
    User,
    /// Administrator
    Admin,
}

impl Role {
    /// Parse the backend's role name; anything but `ADMIN` is a user
    #[must_use]
    pub fn parse(role: &str) -> Self {
        if role.eq_ignore_ascii_case("admin") {
            Self::Admin
        } else {
            Self::User
        }
    }
}

/// A logged-in user
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// User id
    pub id: UserId,
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Role
    pub role: Role,
}

/// Login form input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credentials {
    /// Account email
    pub email: String,
    /// Plain password
    pub password: String,
}

/// Sign-up form input
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Registration {
    /// Display name
    pub name: String,
    /// Account email
    pub email: String,
    /// Plain password
    pub password: String,
    /// Phone number
    pub phone: String,
}

// ============================================================================
// Flow
// ============================================================================

/// Screen the booking flow is on
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Step {
    /// Movie listing
    #[default]
    Catalog,
    /// One movie with its showtimes
    MovieDetail,
    /// Seat map
    SeatSelection,
    /// Ticket type picker
    TicketSelection,
    /// Snack offer before payment
    SnackUpsell,
    /// Payment form
    Payment,
    /// Order confirmation
    Receipt,
    /// Concessions page
    CandyCounter,
    /// Loyalty perks page
    Perks,
    /// Promotions page
    Promotions,
    /// Account page
    Profile,
    /// Login form
    Login,
    /// Sign-up form
    Register,
}

/// Progress of the checkout submission
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CheckoutStatus {
    /// Nothing submitted
    #[default]
    Idle,
    /// Reservation request in flight
    Submitting,
    /// Backend accepted the reservation
    Confirmed,
    /// Backend refused or was unreachable
    Failed,
}

/// Record of a confirmed order
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// `ORD-` followed by eight digits
    pub order_number: String,
    /// The booked showtime
    pub showtime_id: ShowtimeId,
    /// Seat labels
    pub seats: Vec<String>,
    /// Tickets bought
    pub tickets: Vec<TicketLine>,
    /// Snacks bought
    pub snacks: Vec<SnackLine>,
    /// Discount applied
    pub discount: Money,
    /// Amount charged
    pub total: Money,
    /// When the order was submitted
    pub issued_at: DateTime<Utc>,
}

/// Reservation submitted to the backend
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderRequest {
    /// Purchasing user, or the guest id
    pub user_id: UserId,
    /// The showtime being booked
    pub showtime_id: ShowtimeId,
    /// Seat labels
    pub seats: Vec<String>,
    /// Amount charged
    pub total: Money,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn money_from_dollars_rounds_to_cent() {
        assert_eq!(Money::from_dollars(6.5).cents(), 650);
        assert_eq!(Money::from_dollars(0.1 + 0.2).cents(), 30);
        assert_eq!(Money::from_dollars(-3.0), Money::ZERO);
        assert_eq!(Money::from_dollars(f64::NAN), Money::ZERO);
    }

    #[test]
    fn money_display() {
        assert_eq!(Money::from_cents(2300).to_string(), "$23.00");
        assert_eq!(Money::from_cents(5).to_string(), "$0.05");
    }

    #[test]
    fn money_percent_rounds_half_up() {
        assert_eq!(Money::from_cents(999).percent(50).cents(), 500);
        assert_eq!(Money::from_cents(2300).percent(15).cents(), 345);
        assert_eq!(Money::from_cents(1).percent(100).cents(), 1);
    }

    #[test]
    fn money_serializes_as_dollars() {
        let json = serde_json::to_string(&Money::from_cents(850)).unwrap();
        assert_eq!(json, "8.5");
        let back: Money = serde_json::from_str("12").unwrap();
        assert_eq!(back.cents(), 1200);
    }

    #[test]
    fn seat_label_matches_id() {
        let seat = SeatSelection::new("C", 7, SeatKind::Normal, Money::from_cents(650));
        assert_eq!(seat.label(), "C7");
        assert_eq!(seat.id.as_str(), "C7");
    }

    #[test]
    fn vip_room_detection_is_case_insensitive() {
        let mut showtime = Showtime {
            room_type: "Sala vip".into(),
            ..Showtime::default()
        };
        assert!(showtime.is_vip());
        showtime.room_type = "2D".into();
        assert!(!showtime.is_vip());
    }

    #[test]
    fn role_parse() {
        assert_eq!(Role::parse("ADMIN"), Role::Admin);
        assert_eq!(Role::parse("USER"), Role::User);
        assert_eq!(Role::parse("whatever"), Role::User);
    }
}
