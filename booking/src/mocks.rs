//! In-memory collaborators for development and testing.
//!
//! [`MockBackend`] bundles a catalog with a small Quito billboard, an
//! identity service with one demo account, an order recorder, and an
//! in-memory user cache. Each mock can be told to fail or stall so the
//! degraded paths of the session can be exercised without a server.

use crate::cache::InMemoryUserCache;
use crate::environment::{
    BookingEnvironment, CatalogService, IdentityService, OrderService, ServiceError, ServiceFuture,
};
use crate::types::{
    Cinema, City, Credentials, Discount, Money, Movie, MovieId, OrderRequest, Perk, Promotion,
    PromotionId, Registration, Role, ShowtimeId, Showtime, Snack, SnackId, TicketType,
    TicketTypeId, User, UserId,
};
use boxoffice_core::environment::{Clock, SystemClock};
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Date every demo showtime is scheduled on
pub const DEMO_DATE: &str = "2025-01-01";

/// Email of the account [`ScriptedIdentity`] accepts out of the box
pub const DEMO_EMAIL: &str = "demo@cine.com";

/// Password of the demo account
pub const DEMO_PASSWORD: &str = "demo123";

/// Message returned for unknown credentials
pub const INVALID_CREDENTIALS: &str = "Credenciales inválidas";

fn lock<T>(mutex: &Mutex<T>) -> std::sync::MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

fn unavailable() -> ServiceError {
    ServiceError::Unavailable("mock backend is offline".to_string())
}

// ============================================================================
// Fixtures
// ============================================================================

/// A movie with only id and title filled in
#[must_use]
pub fn movie(id: i64, title: &str) -> Movie {
    Movie {
        id: MovieId::new(id),
        title: title.to_string(),
        duration: "2h 10min".to_string(),
        rating: "PG-13".to_string(),
        language: "Español".to_string(),
        formats: vec!["2D".to_string()],
        ..Movie::default()
    }
}

/// A showtime of `movie_id` in a room of `room_type` on [`DEMO_DATE`]
#[must_use]
pub fn showtime(id: i64, movie_id: i64, room_type: &str, price: Option<Money>) -> Showtime {
    Showtime {
        id: ShowtimeId::new(id),
        movie_id: MovieId::new(movie_id),
        time: "19:30".to_string(),
        date: DEMO_DATE.to_string(),
        format: room_type.to_string(),
        room: format!("Sala {id}"),
        room_type: room_type.to_string(),
        language: "Español".to_string(),
        price,
        available: true,
        available_seats: 96,
    }
}

/// A regular user
#[must_use]
pub fn user(id: i64, name: &str) -> User {
    User {
        id: UserId::new(id),
        name: name.to_string(),
        email: format!("{}@cine.com", name.to_ascii_lowercase()),
        role: Role::User,
    }
}

/// A ticket type for any room
#[must_use]
pub fn ticket_type(id: &str, name: &str, cents: u64) -> TicketType {
    TicketType {
        id: TicketTypeId::new(id),
        name: name.to_string(),
        price: Money::from_cents(cents),
        description: None,
        room_type: None,
    }
}

/// A snack in the `snacks` category
#[must_use]
pub fn snack(id: &str, name: &str, cents: u64) -> Snack {
    Snack {
        id: SnackId::new(id),
        name: name.to_string(),
        description: String::new(),
        price: Money::from_cents(cents),
        image: String::new(),
        category: "snacks".to_string(),
    }
}

// ============================================================================
// Catalog
// ============================================================================

/// Catalog serving a fixed billboard
#[derive(Debug)]
pub struct StaticCatalog {
    movies: Vec<Movie>,
    showtimes: Vec<Showtime>,
    ticket_types: Vec<TicketType>,
    snacks: Vec<Snack>,
    promotions: Vec<Promotion>,
    perks: Vec<Perk>,
    cities: Vec<City>,
    cinemas: Vec<Cinema>,
    occupied: Mutex<HashMap<ShowtimeId, Vec<String>>>,
    occupancy_delay: Mutex<Option<Duration>>,
    occupancy_calls: AtomicUsize,
    offline: AtomicBool,
}

impl StaticCatalog {
    /// Catalog with the demo billboard
    #[must_use]
    pub fn new() -> Self {
        let mut vip = ticket_type("vip", "VIP", 1200);
        vip.room_type = Some("VIP".to_string());

        Self {
            movies: vec![movie(1, "Dune: Parte Dos"), movie(2, "Intensamente 2")],
            showtimes: vec![
                showtime(10, 1, "2D", None),
                showtime(11, 1, "VIP", Some(Money::from_cents(1200))),
                showtime(20, 2, "3D", Some(Money::from_cents(750))),
            ],
            ticket_types: vec![
                ticket_type("general", "General", 850),
                ticket_type("nino", "Niño", 600),
                vip,
            ],
            snacks: vec![
                snack("popcorn", "Canguil grande", 600),
                snack("soda", "Gaseosa mediana", 300),
                snack("combo", "Combo pareja", 1250),
            ],
            promotions: vec![
                Promotion {
                    id: PromotionId::new(1),
                    title: "Martes de locura".to_string(),
                    description: "50% en todas las entradas".to_string(),
                    image: String::new(),
                    discount: Some(Discount::Percentage(50)),
                    code: Some("MARTES50".to_string()),
                },
                Promotion {
                    id: PromotionId::new(2),
                    title: "Combo estreno".to_string(),
                    description: "$2 menos en tu compra".to_string(),
                    image: String::new(),
                    discount: Some(Discount::Fixed(Money::from_cents(200))),
                    code: None,
                },
            ],
            perks: vec![Perk {
                id: 1,
                title: "Canguil gratis".to_string(),
                description: "En tu cumpleaños".to_string(),
                icon: "gift".to_string(),
                color: "#e50914".to_string(),
            }],
            cities: vec![
                City {
                    id: "quito".to_string(),
                    name: "Quito".to_string(),
                },
                City {
                    id: "guayaquil".to_string(),
                    name: "Guayaquil".to_string(),
                },
            ],
            cinemas: vec![
                Cinema {
                    id: "scala".to_string(),
                    name: "Scala Shopping".to_string(),
                    city: "Quito".to_string(),
                    address: "Av. Interoceánica".to_string(),
                },
                Cinema {
                    id: "mall-del-sol".to_string(),
                    name: "Mall del Sol".to_string(),
                    city: "Guayaquil".to_string(),
                    address: "Av. Joaquín Orrantia".to_string(),
                },
            ],
            occupied: Mutex::new(HashMap::from([
                (ShowtimeId::new(10), vec!["B3".to_string(), "B4".to_string()]),
                (ShowtimeId::new(11), vec!["A1".to_string()]),
            ])),
            occupancy_delay: Mutex::new(None),
            occupancy_calls: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Replace the sold seats of a showtime
    pub fn set_occupied(&self, showtime_id: ShowtimeId, seats: &[&str]) {
        lock(&self.occupied).insert(showtime_id, seats.iter().map(ToString::to_string).collect());
    }

    /// Stall every occupancy response by `delay`
    pub fn set_occupancy_delay(&self, delay: Option<Duration>) {
        *lock(&self.occupancy_delay) = delay;
    }

    /// Make every call fail as unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of occupancy fetches served so far
    #[must_use]
    pub fn occupancy_calls(&self) -> usize {
        self.occupancy_calls.load(Ordering::SeqCst)
    }

    fn serve<T: Send + 'static>(&self, value: T) -> ServiceFuture<T> {
        let offline = self.offline.load(Ordering::SeqCst);
        Box::pin(async move { if offline { Err(unavailable()) } else { Ok(value) } })
    }
}

impl Default for StaticCatalog {
    fn default() -> Self {
        Self::new()
    }
}

impl CatalogService for StaticCatalog {
    fn movies(&self) -> ServiceFuture<Vec<Movie>> {
        self.serve(self.movies.clone())
    }

    fn showtimes(&self, movie_id: Option<MovieId>, date: Option<NaiveDate>) -> ServiceFuture<Vec<Showtime>> {
        let date = date.map(|d| d.format("%Y-%m-%d").to_string());
        let showtimes = self
            .showtimes
            .iter()
            .filter(|s| movie_id.is_none_or(|id| s.movie_id == id))
            .filter(|s| date.as_ref().is_none_or(|d| &s.date == d))
            .cloned()
            .collect();
        self.serve(showtimes)
    }

    fn occupied_seats(&self, showtime_id: ShowtimeId) -> ServiceFuture<Vec<String>> {
        self.occupancy_calls.fetch_add(1, Ordering::SeqCst);
        let offline = self.offline.load(Ordering::SeqCst);
        let delay = *lock(&self.occupancy_delay);
        let seats = lock(&self.occupied).get(&showtime_id).cloned().unwrap_or_default();
        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if offline { Err(unavailable()) } else { Ok(seats) }
        })
    }

    fn ticket_types(&self, room_type: Option<String>) -> ServiceFuture<Vec<TicketType>> {
        let types = self
            .ticket_types
            .iter()
            .filter(|t| match (&room_type, &t.room_type) {
                (Some(wanted), Some(room)) => wanted.eq_ignore_ascii_case(room),
                _ => true,
            })
            .cloned()
            .collect();
        self.serve(types)
    }

    fn snacks(&self) -> ServiceFuture<Vec<Snack>> {
        self.serve(self.snacks.clone())
    }

    fn promotions(&self) -> ServiceFuture<Vec<Promotion>> {
        self.serve(self.promotions.clone())
    }

    fn perks(&self) -> ServiceFuture<Vec<Perk>> {
        self.serve(self.perks.clone())
    }

    fn cities(&self) -> ServiceFuture<Vec<City>> {
        self.serve(self.cities.clone())
    }

    fn cinemas(&self, city: Option<String>) -> ServiceFuture<Vec<Cinema>> {
        let cinemas = self
            .cinemas
            .iter()
            .filter(|c| city.as_ref().is_none_or(|wanted| c.city.eq_ignore_ascii_case(wanted)))
            .cloned()
            .collect();
        self.serve(cinemas)
    }
}

// ============================================================================
// Identity
// ============================================================================

/// Identity service with a fixed set of accounts
///
/// Unknown credentials are refused with [`INVALID_CREDENTIALS`], the way the
/// real backend answers.
#[derive(Debug)]
pub struct ScriptedIdentity {
    accounts: Mutex<Vec<(Credentials, User)>>,
    next_id: AtomicI64,
    login_calls: AtomicUsize,
    offline: AtomicBool,
}

impl ScriptedIdentity {
    /// Identity service knowing only the demo account
    #[must_use]
    pub fn new() -> Self {
        let demo = User {
            id: UserId::new(2),
            name: "Usuario Demo".to_string(),
            email: DEMO_EMAIL.to_string(),
            role: Role::User,
        };
        Self {
            accounts: Mutex::new(vec![(
                Credentials {
                    email: DEMO_EMAIL.to_string(),
                    password: DEMO_PASSWORD.to_string(),
                },
                demo,
            )]),
            next_id: AtomicI64::new(100),
            login_calls: AtomicUsize::new(0),
            offline: AtomicBool::new(false),
        }
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Make every call fail as unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of login attempts that reached the service
    #[must_use]
    pub fn login_calls(&self) -> usize {
        self.login_calls.load(Ordering::SeqCst)
    }
}

impl Default for ScriptedIdentity {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityService for ScriptedIdentity {
    fn login(&self, credentials: Credentials) -> ServiceFuture<User> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        let result = if self.offline.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            lock(&self.accounts)
                .iter()
                .find(|(known, _)| known == &credentials)
                .map(|(_, user)| user.clone())
                .ok_or_else(|| ServiceError::rejected(INVALID_CREDENTIALS))
        };
        Box::pin(async move { result })
    }

    fn register(&self, registration: Registration) -> ServiceFuture<()> {
        let result = if self.offline.load(Ordering::SeqCst) {
            Err(unavailable())
        } else {
            let mut accounts = lock(&self.accounts);
            if accounts.iter().any(|(known, _)| known.email == registration.email) {
                Err(ServiceError::rejected("El email ya está registrado"))
            } else {
                let user = User {
                    id: UserId::new(self.next_id.fetch_add(1, Ordering::SeqCst)),
                    name: registration.name,
                    email: registration.email.clone(),
                    role: Role::User,
                };
                accounts.push((
                    Credentials {
                        email: registration.email,
                        password: registration.password,
                    },
                    user,
                ));
                Ok(())
            }
        };
        Box::pin(async move { result })
    }
}

// ============================================================================
// Orders
// ============================================================================

/// Order service that records every submission
#[derive(Debug, Default)]
pub struct RecordingOrders {
    submitted: Arc<Mutex<Vec<OrderRequest>>>,
    calls: AtomicUsize,
    rejection: Mutex<Option<String>>,
    delay: Mutex<Option<Duration>>,
    offline: AtomicBool,
}

impl RecordingOrders {
    /// Order service accepting everything
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an Arc-wrapped instance for sharing
    #[must_use]
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Refuse every submission with `message`
    pub fn reject_with(&self, message: impl Into<String>) {
        *lock(&self.rejection) = Some(message.into());
    }

    /// Stall every submission by `delay` before answering
    pub fn set_delay(&self, delay: Option<Duration>) {
        *lock(&self.delay) = delay;
    }

    /// Make every call fail as unreachable
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Number of submissions that reached the service
    #[must_use]
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Orders accepted so far
    #[must_use]
    pub fn submitted(&self) -> Vec<OrderRequest> {
        lock(&self.submitted).clone()
    }
}

impl OrderService for RecordingOrders {
    fn submit(&self, order: OrderRequest) -> ServiceFuture<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let offline = self.offline.load(Ordering::SeqCst);
        let rejection = lock(&self.rejection).clone();
        let delay = *lock(&self.delay);
        let submitted = Arc::clone(&self.submitted);

        Box::pin(async move {
            if let Some(delay) = delay {
                tokio::time::sleep(delay).await;
            }
            if offline {
                return Err(unavailable());
            }
            if let Some(message) = rejection {
                return Err(ServiceError::rejected(message));
            }
            tracing::info!(
                showtime_id = %order.showtime_id,
                seats = ?order.seats,
                total = %order.total,
                "Mock reservation recorded"
            );
            lock(&submitted).push(order);
            Ok(())
        })
    }
}

// ============================================================================
// Backend bundle
// ============================================================================

/// All mock collaborators, kept reachable for inspection after being
/// handed to a session
#[derive(Clone)]
pub struct MockBackend {
    /// Catalog
    pub catalog: Arc<StaticCatalog>,
    /// Identity
    pub identity: Arc<ScriptedIdentity>,
    /// Orders
    pub orders: Arc<RecordingOrders>,
    /// User cache
    pub user_cache: Arc<InMemoryUserCache>,
    clock: Arc<dyn Clock>,
}

impl MockBackend {
    /// Fresh mocks on the system clock
    #[must_use]
    pub fn new() -> Self {
        Self {
            catalog: StaticCatalog::shared(),
            identity: ScriptedIdentity::shared(),
            orders: RecordingOrders::shared(),
            user_cache: Arc::new(InMemoryUserCache::new()),
            clock: Arc::new(SystemClock),
        }
    }

    /// Use `clock` for the environments built from here on
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Start with `user` in the cache
    #[must_use]
    pub fn with_cached_user(mut self, user: User) -> Self {
        self.user_cache = Arc::new(InMemoryUserCache::with_user(user));
        self
    }

    /// Environment wired to these mocks, with guest user id 0
    #[must_use]
    pub fn environment(&self) -> BookingEnvironment {
        BookingEnvironment {
            clock: Arc::clone(&self.clock),
            catalog: self.catalog.clone(),
            identity: self.identity.clone(),
            orders: self.orders.clone(),
            user_cache: self.user_cache.clone(),
            guest_user_id: UserId::new(0),
        }
    }

    /// Orders the order service accepted
    #[must_use]
    pub fn submitted_orders(&self) -> Vec<OrderRequest> {
        self.orders.submitted()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MockBackend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockBackend")
            .field("orders", &self.orders.calls())
            .finish_non_exhaustive()
    }
}
