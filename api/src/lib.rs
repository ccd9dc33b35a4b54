//! # Box Office API Client
//!
//! Rust client for the Box Office REST backend: catalog reads, login,
//! registration, and reservation submission.
//!
//! ## Example
//!
//! ```no_run
//! use boxoffice_api::{ApiClient, DEFAULT_BASE_URL};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = ApiClient::new(DEFAULT_BASE_URL, Duration::from_secs(10))?;
//!
//!     for movie in client.movies().await? {
//!         println!("{} ({})", movie.title, movie.duration);
//!     }
//!     Ok(())
//! }
//! ```

pub mod client;
pub mod error;
pub mod types;

// Re-export main types for convenience
pub use client::{ApiClient, DEFAULT_BASE_URL};
pub use error::ApiError;
pub use types::{
    BeneficioDto, CinemaDto, CiudadDto, CityDto, FuncionDto, LoginRequest, LoginResponse,
    PeliculaDto, PromocionDto, RegisterRequest, ReservaDto, ReservationRequest, SnackDto,
    TipoEntradaDto, server_message,
};
