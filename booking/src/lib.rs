//! Box Office booking session: the state machine and pricing engine behind
//! the storefront's booking flow.
//!
//! A visitor browses the billboard, picks a showtime and seats, chooses
//! tickets and snacks, pays, and gets a receipt. All of that lives in one
//! [`BookingState`] owned by a store; screens talk to it through
//! [`BookingSession`].
//!
//! # Architecture
//!
//! ```text
//!   screens ──► BookingSession ──► Store ──► BookingReducer ──► BookingState
//!                    ▲                            │
//!                    │                         effects
//!                 outcomes                        │
//!                    │                            ▼
//!                    └──────── Catalog / Identity / Orders / UserCache
//! ```
//!
//! Selection commands are synchronous state edits that never fail. Login,
//! registration, checkout, and seat occupancy run as effects; their outcome
//! actions carry the [`RequestId`] of the command that started them.
//!
//! # Pricing
//!
//! Prices are integer cents. The canonical total is tickets plus snacks minus
//! the promotion's discount, and it is the same number on the payment screen,
//! in the reservation payload, and on the receipt. Tax is included in it and
//! only backed out for display ([`PriceBreakdown`]).

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod action;
pub mod cache;
pub mod config;
pub mod environment;
pub mod mocks;
pub mod pricing;
pub mod reducer;
pub mod seat_map;
pub mod services;
pub mod session;
pub mod state;
pub mod types;

pub use action::BookingAction;
pub use cache::{CacheError, FileUserCache, InMemoryUserCache};
pub use config::Config;
pub use environment::{
    BookingEnvironment, CatalogService, IdentityService, OrderService, ServiceError, UserCache,
};
pub use pricing::{BookingTotals, PriceBreakdown};
pub use reducer::BookingReducer;
pub use seat_map::{SeatMap, SeatStatus};
pub use session::{BookingSession, BookingStore, SessionError, SessionSettings};
pub use state::BookingState;
pub use types::*;
