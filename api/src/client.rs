//! Box Office REST client implementation

use crate::{
    error::ApiError,
    types::{
        BeneficioDto, CinemaDto, CityDto, FuncionDto, LoginRequest, LoginResponse, PeliculaDto,
        PromocionDto, RegisterRequest, ReservaDto, ReservationRequest, SnackDto, TipoEntradaDto,
        server_message,
    },
};
use reqwest::{Client, Response, Url};
use serde::{Serialize, de::DeserializeOwned};
use std::time::Duration;

/// Default backend base URL
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080/api";

/// Box Office REST client
#[derive(Clone, Debug)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    /// Create a client for `base_url` with a per-request timeout
    ///
    /// # Errors
    ///
    /// Returns `ApiError::RequestFailed` if the HTTP client cannot be built
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    /// The base URL every path is joined to
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `GET /peliculas`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn movies(&self) -> Result<Vec<PeliculaDto>, ApiError> {
        self.get_json("peliculas", &[]).await
    }

    /// `GET /funciones`, optionally filtered by movie and date
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn showtimes(
        &self,
        movie_id: Option<i64>,
        date: Option<&str>,
    ) -> Result<Vec<FuncionDto>, ApiError> {
        let mut query = Vec::new();
        if let Some(id) = movie_id {
            query.push(("peliculaId", id.to_string()));
        }
        if let Some(date) = date {
            query.push(("fecha", date.to_string()));
        }
        self.get_json("funciones", &query).await
    }

    /// `GET /reservas?funcionId=`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn reservations(&self, showtime_id: i64) -> Result<Vec<ReservaDto>, ApiError> {
        self.get_json("reservas", &[("funcionId", showtime_id.to_string())])
            .await
    }

    /// `GET /tipos-entradas`, optionally filtered by room type
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn ticket_types(&self, room_type: Option<&str>) -> Result<Vec<TipoEntradaDto>, ApiError> {
        let query: Vec<_> = room_type
            .map(|tipo| ("tipoSala", tipo.to_string()))
            .into_iter()
            .collect();
        self.get_json("tipos-entradas", &query).await
    }

    /// `GET /snacks`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn snacks(&self) -> Result<Vec<SnackDto>, ApiError> {
        self.get_json("snacks", &[]).await
    }

    /// `GET /promociones`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn promotions(&self) -> Result<Vec<PromocionDto>, ApiError> {
        self.get_json("promociones", &[]).await
    }

    /// `GET /beneficios`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn perks(&self) -> Result<Vec<BeneficioDto>, ApiError> {
        self.get_json("beneficios", &[]).await
    }

    /// `GET /cities`
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn cities(&self) -> Result<Vec<CityDto>, ApiError> {
        self.get_json("cities", &[]).await
    }

    /// `GET /cinemas`, optionally filtered by city
    ///
    /// # Errors
    ///
    /// Returns errors for network failures, rejections, or parsing failures
    pub async fn cinemas(&self, city: Option<&str>) -> Result<Vec<CinemaDto>, ApiError> {
        let query: Vec<_> = city
            .map(|city| ("city", city.to_string()))
            .into_iter()
            .collect();
        self.get_json("cinemas", &query).await
    }

    /// `POST /auth/login`
    ///
    /// A 2xx answer whose `status` is not `"success"` is a rejection.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` with the server's message on bad credentials
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn login(&self, request: &LoginRequest) -> Result<LoginResponse, ApiError> {
        let response = self.post_json("auth/login", request).await?;
        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))?;

        if !status.is_success() {
            return Err(ApiError::Rejected {
                status: status.as_u16(),
                message: server_message(&body),
            });
        }

        let login: LoginResponse = serde_json::from_str(&body)
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))?;

        if login.is_success() {
            Ok(login)
        } else {
            Err(ApiError::Rejected {
                status: status.as_u16(),
                message: server_message(&body),
            })
        }
    }

    /// `POST /usuarios` with role `USER`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the backend refuses the account
    #[tracing::instrument(skip(self, request), fields(email = %request.email))]
    pub async fn register(&self, request: &RegisterRequest) -> Result<(), ApiError> {
        let response = self.post_json("usuarios", request).await?;
        Self::check(response).await.map(|_| ())
    }

    /// `POST /reservas`
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Rejected` if the backend refuses the reservation
    #[tracing::instrument(skip(self, request), fields(showtime_id = request.showtime_id))]
    pub async fn create_reservation(&self, request: &ReservationRequest) -> Result<(), ApiError> {
        let response = self.post_json("reservas", request).await?;
        Self::check(response).await.map(|_| ())
    }

    fn url(&self, path: &str, query: &[(&str, String)]) -> Result<Url, ApiError> {
        let raw = format!("{}/{path}", self.base_url);
        let url = if query.is_empty() {
            Url::parse(&raw)
        } else {
            Url::parse_with_params(&raw, query)
        };
        url.map_err(|e| ApiError::RequestFailed(format!("invalid URL {raw}: {e}")))
    }

    #[tracing::instrument(skip(self, query), level = "debug")]
    async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<T, ApiError> {
        let url = self.url(path, query)?;
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))?;

        Self::check(response)
            .await?
            .json::<T>()
            .await
            .map_err(|e| ApiError::ResponseParseFailed(e.to_string()))
    }

    async fn post_json<B: Serialize + Sync>(&self, path: &str, body: &B) -> Result<Response, ApiError> {
        let url = self.url(path, &[])?;
        self.client
            .post(url)
            .header("content-type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| ApiError::RequestFailed(e.to_string()))
    }

    /// Turn a non-2xx response into `ApiError::Rejected`
    async fn check(response: Response) -> Result<Response, ApiError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        tracing::debug!(status = status.as_u16(), "Backend rejected request");
        Err(ApiError::Rejected {
            status: status.as_u16(),
            message: server_message(&body),
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new("http://localhost:8080/api/", Duration::from_secs(5)).unwrap();
        assert_eq!(client.base_url(), DEFAULT_BASE_URL);
    }

    #[test]
    fn test_url_with_query() {
        let client = ApiClient::new(DEFAULT_BASE_URL, Duration::from_secs(5)).unwrap();
        let url = client
            .url("funciones", &[("peliculaId", "3".into()), ("fecha", "2025-01-01".into())])
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8080/api/funciones?peliculaId=3&fecha=2025-01-01"
        );
    }
}
