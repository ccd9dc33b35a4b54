//! Wire types for the Box Office REST backend
//!
//! Field names follow the backend's JSON exactly (a mix of Spanish and
//! camelCase English). Prices are decimal dollars.

use serde::{Deserialize, Serialize};

/// A movie as returned by `GET /peliculas`
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PeliculaDto {
    /// Movie id
    pub id: i64,
    /// Display title
    pub title: String,
    /// Title in the original language
    #[serde(default)]
    pub original_title: Option<String>,
    /// Poster image URL
    #[serde(default)]
    pub poster: String,
    /// Backdrop image URL
    #[serde(default)]
    pub backdrop: String,
    /// Running time, free text ("2h 15min")
    #[serde(default)]
    pub duration: String,
    /// Age rating
    #[serde(default)]
    pub rating: String,
    /// Genre names
    #[serde(default)]
    pub genres: Vec<String>,
    /// Synopsis
    #[serde(default)]
    pub synopsis: String,
    /// Director
    #[serde(default)]
    pub director: String,
    /// Cast list
    #[serde(default)]
    pub cast: Vec<String>,
    /// Release date, free text
    #[serde(default)]
    pub release_date: String,
    /// Spoken language
    #[serde(default)]
    pub language: String,
    /// Projection formats ("2D", "3D")
    #[serde(default)]
    pub formats: Vec<String>,
    /// Tickets on sale before release
    #[serde(default)]
    pub is_pre_sale: bool,
}

/// Movie reference nested in a showtime
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct MovieRefDto {
    /// Movie id
    pub id: i64,
    /// Movie title
    #[serde(default)]
    pub title: String,
}

/// Room reference nested in a showtime
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct SalaDto {
    /// Room id
    pub id: i64,
    /// Room name
    #[serde(default)]
    pub nombre: String,
    /// Room type ("VIP", "2D", ...)
    #[serde(default)]
    pub tipo: String,
}

/// A showtime as returned by `GET /funciones`
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FuncionDto {
    /// Showtime id
    pub id: i64,
    /// Date (`YYYY-MM-DD`)
    pub fecha: String,
    /// Start time (`HH:MM`)
    pub hora: String,
    /// Projection format
    #[serde(default)]
    pub formato: String,
    /// Audio language
    #[serde(default)]
    pub idioma: String,
    /// Whether tickets can still be sold
    #[serde(default)]
    pub disponible: bool,
    /// Remaining seat count
    #[serde(default)]
    pub asientos_disponibles: u32,
    /// Ticket price override for this showtime
    #[serde(default)]
    pub precio: Option<f64>,
    /// The movie being shown
    pub movie: MovieRefDto,
    /// The room it is shown in
    pub sala: SalaDto,
}

/// A reservation as returned by `GET /reservas?funcionId=`
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct ReservaDto {
    /// Seat labels held by this reservation ("A1", "B4")
    #[serde(default)]
    pub seats: Vec<String>,
}

/// A ticket type as returned by `GET /tipos-entradas`
#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TipoEntradaDto {
    /// Ticket type id
    pub id: i64,
    /// Display name
    pub nombre: String,
    /// Unit price in dollars
    pub precio: f64,
    /// Description
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Room type this ticket applies to
    #[serde(default)]
    pub tipo_sala: Option<String>,
}

/// A snack as returned by `GET /snacks`
#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct SnackDto {
    /// Snack id
    pub id: i64,
    /// Display name
    pub name: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Unit price in dollars
    pub price: f64,
    /// Image URL
    #[serde(default)]
    pub image: String,
    /// Category ("combos", "popcorn", "bebidas", ...)
    #[serde(default)]
    pub category: String,
}

/// A promotion as returned by `GET /promociones`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct PromocionDto {
    /// Promotion id
    pub id: i64,
    /// Title
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Loose discount label ("50% OFF", "$2 OFF", "ESPECIAL")
    #[serde(default)]
    pub discount: Option<String>,
    /// Validity text, shown as the promo code
    #[serde(default)]
    pub validity: Option<String>,
    /// Image URL
    #[serde(default)]
    pub image: String,
}

/// A loyalty perk as returned by `GET /beneficios`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct BeneficioDto {
    /// Perk id
    pub id: i64,
    /// Title
    pub title: String,
    /// Description
    #[serde(default)]
    pub description: String,
    /// Icon name
    #[serde(default)]
    pub icon: String,
    /// Accent color
    #[serde(default)]
    pub color: String,
}

/// A city as returned by `GET /cities`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CityDto {
    /// City id
    pub id: i64,
    /// City name
    pub nombre: String,
}

/// The city of a cinema: either a bare name or a nested object
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum CiudadDto {
    /// Bare city name
    Name(String),
    /// Nested city record
    Nested(CityDto),
}

impl CiudadDto {
    /// The city name in either form
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Name(name) => name,
            Self::Nested(city) => &city.nombre,
        }
    }
}

/// A cinema as returned by `GET /cinemas`
#[derive(Clone, Debug, Deserialize, PartialEq, Eq)]
pub struct CinemaDto {
    /// Cinema id
    pub id: i64,
    /// Cinema name
    pub nombre: String,
    /// City it belongs to
    pub ciudad: CiudadDto,
    /// Street address
    #[serde(default)]
    pub direccion: String,
}

/// Body of `POST /auth/login`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct LoginRequest {
    /// Account email
    pub email: String,
    /// Plain password
    pub password: String,
}

/// Response of `POST /auth/login`
///
/// The backend reports failures either with a non-2xx status or with
/// `status` other than `"success"`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    /// `"success"` or `"error"`
    #[serde(default)]
    pub status: Option<String>,
    /// User id
    #[serde(default)]
    pub id: Option<i64>,
    /// Display name
    #[serde(default, alias = "name")]
    pub nombre: Option<String>,
    /// Role (`ADMIN` or `USER`)
    #[serde(default, alias = "role")]
    pub rol: Option<String>,
    /// Email, when echoed back
    #[serde(default)]
    pub email: Option<String>,
    /// Session token
    #[serde(default)]
    pub token: Option<String>,
}

impl LoginResponse {
    /// Whether the body reports a successful login
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }
}

/// Body of `POST /usuarios`
#[derive(Clone, Debug, Serialize, PartialEq, Eq)]
pub struct RegisterRequest {
    /// Display name
    pub nombre: String,
    /// Account email
    pub email: String,
    /// Plain password
    pub password: String,
    /// Role, always `USER` from the storefront
    pub rol: String,
    /// Phone number
    pub telefono: String,
}

/// Body of `POST /reservas`
#[derive(Clone, Debug, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ReservationRequest {
    /// Purchasing user (guest id when anonymous)
    pub user_id: i64,
    /// Showtime being booked
    pub showtime_id: i64,
    /// Seat labels ("A1", "A2")
    pub seats: Vec<String>,
    /// Amount charged, in dollars
    pub total: f64,
}

/// Pull a human-readable message out of an error body
///
/// Looks at `mensaje`, then `message`, then `error`.
#[must_use]
pub fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    ["mensaje", "message", "error"]
        .iter()
        .find_map(|key| value.get(key).and_then(serde_json::Value::as_str))
        .filter(|message| !message.trim().is_empty())
        .map(str::to_string)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn server_message_prefers_mensaje() {
        let body = r#"{"status":"error","mensaje":"Credenciales inválidas","message":"x"}"#;
        assert_eq!(server_message(body).as_deref(), Some("Credenciales inválidas"));
    }

    #[test]
    fn server_message_falls_back() {
        assert_eq!(
            server_message(r#"{"error":"Sala llena"}"#).as_deref(),
            Some("Sala llena")
        );
        assert_eq!(server_message(r#"{"status":"error"}"#), None);
        assert_eq!(server_message("<html>oops</html>"), None);
    }

    #[test]
    fn login_response_accepts_english_aliases() {
        let response: LoginResponse =
            serde_json::from_str(r#"{"status":"success","id":2,"name":"Ana","role":"USER"}"#)
                .unwrap();
        assert!(response.is_success());
        assert_eq!(response.nombre.as_deref(), Some("Ana"));
        assert_eq!(response.rol.as_deref(), Some("USER"));
    }

    #[test]
    fn cinema_city_in_both_shapes() {
        let flat: CinemaDto =
            serde_json::from_str(r#"{"id":1,"nombre":"Scala","ciudad":"Quito"}"#).unwrap();
        let nested: CinemaDto = serde_json::from_str(
            r#"{"id":2,"nombre":"Mall","ciudad":{"id":3,"nombre":"Guayaquil"},"direccion":"Av. 9"}"#,
        )
        .unwrap();
        assert_eq!(flat.ciudad.name(), "Quito");
        assert_eq!(nested.ciudad.name(), "Guayaquil");
    }

    #[test]
    fn reservation_request_uses_camel_case() {
        let request = ReservationRequest {
            user_id: 0,
            showtime_id: 7,
            seats: vec!["A1".into()],
            total: 23.0,
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["userId"], 0);
        assert_eq!(json["showtimeId"], 7);
        assert_eq!(json["seats"][0], "A1");
    }
}
