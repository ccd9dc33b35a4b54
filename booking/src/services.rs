//! Booking collaborators backed by the REST client.
//!
//! Wire DTOs are converted to domain types here and nowhere else.

use crate::environment::{CatalogService, IdentityService, OrderService, ServiceError, ServiceFuture};
use crate::types::{
    Cinema, City, Credentials, Discount, Money, Movie, MovieId, OrderRequest, Perk, Promotion,
    PromotionId, Registration, Role, ShowtimeId, Showtime, Snack, SnackId, TicketType,
    TicketTypeId, User, UserId,
};
use boxoffice_api::{
    ApiClient, ApiError, BeneficioDto, CinemaDto, CityDto, FuncionDto, LoginRequest, LoginResponse,
    PeliculaDto, PromocionDto, RegisterRequest, ReservationRequest, SnackDto, TipoEntradaDto,
};
use chrono::NaiveDate;

/// Role sent with every storefront registration
const CUSTOMER_ROLE: &str = "USER";

impl From<ApiError> for ServiceError {
    fn from(error: ApiError) -> Self {
        match error {
            ApiError::Rejected { message, .. } => Self::Rejected { message },
            other => Self::Unavailable(other.to_string()),
        }
    }
}

impl From<PeliculaDto> for Movie {
    fn from(dto: PeliculaDto) -> Self {
        Self {
            id: MovieId::new(dto.id),
            title: dto.title,
            original_title: dto.original_title,
            poster: dto.poster,
            backdrop: dto.backdrop,
            duration: dto.duration,
            rating: dto.rating,
            genres: dto.genres,
            synopsis: dto.synopsis,
            director: dto.director,
            cast: dto.cast,
            release_date: dto.release_date,
            language: dto.language,
            formats: dto.formats,
            is_pre_sale: dto.is_pre_sale,
        }
    }
}

impl From<FuncionDto> for Showtime {
    fn from(dto: FuncionDto) -> Self {
        Self {
            id: ShowtimeId::new(dto.id),
            movie_id: MovieId::new(dto.movie.id),
            time: dto.hora,
            date: dto.fecha,
            format: dto.formato,
            room: dto.sala.nombre,
            room_type: dto.sala.tipo,
            language: dto.idioma,
            price: dto.precio.map(Money::from_dollars),
            available: dto.disponible,
            available_seats: dto.asientos_disponibles,
        }
    }
}

impl From<TipoEntradaDto> for TicketType {
    fn from(dto: TipoEntradaDto) -> Self {
        Self {
            id: TicketTypeId::new(dto.id.to_string()),
            name: dto.nombre,
            price: Money::from_dollars(dto.precio),
            description: dto.descripcion,
            room_type: dto.tipo_sala,
        }
    }
}

impl From<SnackDto> for Snack {
    fn from(dto: SnackDto) -> Self {
        Self {
            id: SnackId::new(dto.id.to_string()),
            name: dto.name,
            description: dto.description,
            price: Money::from_dollars(dto.price),
            image: dto.image,
            category: dto.category,
        }
    }
}

impl From<PromocionDto> for Promotion {
    fn from(dto: PromocionDto) -> Self {
        Self {
            id: PromotionId::new(dto.id),
            title: dto.title,
            description: dto.description,
            image: dto.image,
            discount: dto.discount.as_deref().and_then(Discount::parse),
            code: dto.validity,
        }
    }
}

impl From<BeneficioDto> for Perk {
    fn from(dto: BeneficioDto) -> Self {
        Self {
            id: dto.id,
            title: dto.title,
            description: dto.description,
            icon: dto.icon,
            color: dto.color,
        }
    }
}

impl From<CityDto> for City {
    fn from(dto: CityDto) -> Self {
        Self {
            id: dto.id.to_string(),
            name: dto.nombre,
        }
    }
}

impl From<CinemaDto> for Cinema {
    fn from(dto: CinemaDto) -> Self {
        Self {
            id: dto.id.to_string(),
            name: dto.nombre,
            city: dto.ciudad.name().to_string(),
            address: dto.direccion,
        }
    }
}

/// Build the user from a successful login answer
///
/// The backend does not always echo the email back.
fn user_from_login(response: LoginResponse, email: String) -> Result<User, ServiceError> {
    let id = response
        .id
        .ok_or_else(|| ServiceError::Unavailable("login response carried no user id".to_string()))?;
    let email = response.email.unwrap_or(email);
    Ok(User {
        id: UserId::new(id),
        name: response.nombre.unwrap_or_else(|| email.clone()),
        email,
        role: response.rol.as_deref().map_or(Role::User, Role::parse),
    })
}

fn convert<D, T: From<D>>(items: Vec<D>) -> Vec<T> {
    items.into_iter().map(T::from).collect()
}

impl CatalogService for ApiClient {
    fn movies(&self) -> ServiceFuture<Vec<Movie>> {
        let client = self.clone();
        Box::pin(async move { Ok(convert(client.movies().await?)) })
    }

    fn showtimes(&self, movie_id: Option<MovieId>, date: Option<NaiveDate>) -> ServiceFuture<Vec<Showtime>> {
        let client = self.clone();
        Box::pin(async move {
            let date = date.map(|d| d.format("%Y-%m-%d").to_string());
            let showtimes = client
                .showtimes(movie_id.map(|id| id.get()), date.as_deref())
                .await?;
            Ok(convert(showtimes))
        })
    }

    fn occupied_seats(&self, showtime_id: ShowtimeId) -> ServiceFuture<Vec<String>> {
        let client = self.clone();
        Box::pin(async move {
            let reservations = client.reservations(showtime_id.get()).await?;
            Ok(reservations.into_iter().flat_map(|r| r.seats).collect())
        })
    }

    fn ticket_types(&self, room_type: Option<String>) -> ServiceFuture<Vec<TicketType>> {
        let client = self.clone();
        Box::pin(async move { Ok(convert(client.ticket_types(room_type.as_deref()).await?)) })
    }

    fn snacks(&self) -> ServiceFuture<Vec<Snack>> {
        let client = self.clone();
        Box::pin(async move { Ok(convert(client.snacks().await?)) })
    }

    fn promotions(&self) -> ServiceFuture<Vec<Promotion>> {
        let client = self.clone();
        Box::pin(async move { Ok(convert(client.promotions().await?)) })
    }

    fn perks(&self) -> ServiceFuture<Vec<Perk>> {
        let client = self.clone();
        Box::pin(async move { Ok(convert(client.perks().await?)) })
    }

    fn cities(&self) -> ServiceFuture<Vec<City>> {
        let client = self.clone();
        Box::pin(async move { Ok(convert(client.cities().await?)) })
    }

    fn cinemas(&self, city: Option<String>) -> ServiceFuture<Vec<Cinema>> {
        let client = self.clone();
        Box::pin(async move { Ok(convert(client.cinemas(city.as_deref()).await?)) })
    }
}

impl IdentityService for ApiClient {
    fn login(&self, credentials: Credentials) -> ServiceFuture<User> {
        let client = self.clone();
        Box::pin(async move {
            let request = LoginRequest {
                email: credentials.email,
                password: credentials.password,
            };
            let response = client.login(&request).await?;
            user_from_login(response, request.email)
        })
    }

    fn register(&self, registration: Registration) -> ServiceFuture<()> {
        let client = self.clone();
        Box::pin(async move {
            let request = RegisterRequest {
                nombre: registration.name,
                email: registration.email,
                password: registration.password,
                rol: CUSTOMER_ROLE.to_string(),
                telefono: registration.phone,
            };
            Ok(client.register(&request).await?)
        })
    }
}

impl OrderService for ApiClient {
    fn submit(&self, order: OrderRequest) -> ServiceFuture<()> {
        let client = self.clone();
        Box::pin(async move {
            let request = ReservationRequest {
                user_id: order.user_id.get(),
                showtime_id: order.showtime_id.get(),
                seats: order.seats,
                total: order.total.to_dollars(),
            };
            Ok(client.create_reservation(&request).await?)
        })
    }
}
