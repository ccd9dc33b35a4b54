//! HTTP-level tests for `ApiClient` against a mock backend

#![allow(clippy::unwrap_used)]

use boxoffice_api::{ApiClient, ApiError, LoginRequest, RegisterRequest, ReservationRequest};
use serde_json::json;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client(server: &MockServer) -> ApiClient {
    ApiClient::new(server.uri(), Duration::from_secs(2)).unwrap()
}

fn credentials() -> LoginRequest {
    LoginRequest {
        email: "bad@x.com".into(),
        password: "wrong".into(),
    }
}

#[tokio::test]
async fn movies_are_decoded() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/peliculas"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 1,
            "title": "Dune",
            "poster": "/dune.jpg",
            "duration": "2h 46min",
            "genres": ["Sci-Fi"],
            "formats": ["2D", "IMAX"],
            "isPreSale": true
        }])))
        .mount(&server)
        .await;

    let movies = client(&server).await.movies().await.unwrap();
    assert_eq!(movies.len(), 1);
    assert_eq!(movies[0].title, "Dune");
    assert_eq!(movies[0].formats, vec!["2D", "IMAX"]);
    assert!(movies[0].is_pre_sale);
}

#[tokio::test]
async fn showtimes_send_filters() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/funciones"))
        .and(query_param("peliculaId", "4"))
        .and(query_param("fecha", "2025-01-01"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{
            "id": 9,
            "fecha": "2025-01-01",
            "hora": "19:30",
            "formato": "2D",
            "idioma": "ES",
            "disponible": true,
            "asientosDisponibles": 80,
            "movie": {"id": 4, "title": "Dune"},
            "sala": {"id": 2, "nombre": "Sala 2", "tipo": "VIP"}
        }])))
        .expect(1)
        .mount(&server)
        .await;

    let showtimes = client(&server)
        .await
        .showtimes(Some(4), Some("2025-01-01"))
        .await
        .unwrap();
    assert_eq!(showtimes[0].sala.tipo, "VIP");
    assert_eq!(showtimes[0].movie.id, 4);
    assert_eq!(showtimes[0].precio, None);
}

#[tokio::test]
async fn reservations_for_showtime() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/reservas"))
        .and(query_param("funcionId", "9"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"seats": ["A1", "A2"]}, {"seats": ["C5"]}, {}])),
        )
        .mount(&server)
        .await;

    let reservations = client(&server).await.reservations(9).await.unwrap();
    let labels: Vec<_> = reservations.into_iter().flat_map(|r| r.seats).collect();
    assert_eq!(labels, vec!["A1", "A2", "C5"]);
}

#[tokio::test]
async fn login_error_status_in_body_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"status": "error", "mensaje": "Credenciales inválidas"})),
        )
        .mount(&server)
        .await;

    let error = client(&server).await.login(&credentials()).await.unwrap_err();
    assert!(matches!(error, ApiError::Rejected { status: 200, .. }));
    assert_eq!(error.server_message(), Some("Credenciales inválidas"));
}

#[tokio::test]
async fn login_unauthorized_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(
            ResponseTemplate::new(401).set_body_json(json!({"message": "Invalid credentials"})),
        )
        .mount(&server)
        .await;

    let error = client(&server).await.login(&credentials()).await.unwrap_err();
    assert!(matches!(error, ApiError::Rejected { status: 401, .. }));
    assert_eq!(error.server_message(), Some("Invalid credentials"));
}

#[tokio::test]
async fn login_success() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(json!({"email": "ana@x.com", "password": "secret"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "status": "success",
            "id": 2,
            "nombre": "Ana",
            "rol": "USER",
            "token": "t"
        })))
        .mount(&server)
        .await;

    let login = client(&server)
        .await
        .login(&LoginRequest {
            email: "ana@x.com".into(),
            password: "secret".into(),
        })
        .await
        .unwrap();
    assert_eq!(login.id, Some(2));
    assert_eq!(login.nombre.as_deref(), Some("Ana"));
}

#[tokio::test]
async fn register_posts_user_role() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/usuarios"))
        .and(body_json(json!({
            "nombre": "Ana",
            "email": "ana@x.com",
            "password": "secret",
            "rol": "USER",
            "telefono": "0999"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(json!({"id": 5})))
        .expect(1)
        .mount(&server)
        .await;

    client(&server)
        .await
        .register(&RegisterRequest {
            nombre: "Ana".into(),
            email: "ana@x.com".into(),
            password: "secret".into(),
            rol: "USER".into(),
            telefono: "0999".into(),
        })
        .await
        .unwrap();
}

#[tokio::test]
async fn reservation_rejection_carries_message() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/reservas"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"error": "Asiento ocupado"})))
        .mount(&server)
        .await;

    let error = client(&server)
        .await
        .create_reservation(&ReservationRequest {
            user_id: 0,
            showtime_id: 9,
            seats: vec!["A1".into()],
            total: 6.5,
        })
        .await
        .unwrap_err();
    assert_eq!(error.server_message(), Some("Asiento ocupado"));
}

#[tokio::test]
async fn unreachable_backend_is_request_failure() {
    let client = ApiClient::new("http://127.0.0.1:9", Duration::from_millis(500)).unwrap();
    let error = client.snacks().await.unwrap_err();
    assert!(matches!(error, ApiError::RequestFailed(_)));
}

#[tokio::test]
async fn malformed_body_is_parse_failure() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/snacks"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let error = client(&server).await.snacks().await.unwrap_err();
    assert!(matches!(error, ApiError::ResponseParseFailed(_)));
}
