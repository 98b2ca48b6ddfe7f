use actix_web::{test, web, App};
use authgate::auth::handlers::{login, logout, me, refresh, register};
use authgate::config::{AuthConfig, CorsConfig, DatabaseConfig, ServerConfig};
use authgate::db::memory::{InMemoryRefreshTokenRepository, InMemoryUserRepository};
use authgate::{AppState, Settings};
use serde_json::json;
use std::sync::Arc;

fn test_settings() -> Settings {
    Settings {
        environment: "test".into(),
        server: ServerConfig {
            host: "127.0.0.1".into(),
            port: 8080,
            workers: 1,
        },
        database: DatabaseConfig {
            url: "postgres://unused".into(),
            max_connections: 1,
        },
        auth: AuthConfig {
            jwt_secret: "test_secret".into(),
            access_token_ttl_secs: 900,
            refresh_token_ttl_secs: 604800,
            // Minimum bcrypt cost keeps the suite fast.
            bcrypt_cost: 4,
            sweep_interval_secs: 3600,
        },
        cors: CorsConfig {
            enabled: false,
            allow_any_origin: false,
            max_age: 3600,
        },
    }
}

fn test_state() -> web::Data<AppState> {
    web::Data::new(AppState::with_repositories(
        test_settings(),
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryRefreshTokenRepository::new()),
    ))
}

macro_rules! test_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data($state.clone())
                .route("/auth/register", web::post().to(register))
                .route("/auth/login", web::post().to(login))
                .route("/auth/refresh", web::post().to(refresh))
                .route("/auth/logout", web::post().to(logout))
                .route("/auth/me", web::get().to(me)),
        )
        .await
    };
}

fn register_payload() -> serde_json::Value {
    json!({
        "email": "a@x.com",
        "username": "a",
        "password": "P@ssw0rd!",
        "first_name": "Ada",
        "last_name": "Lovelace"
    })
}

#[test_log::test(actix_web::test)]
async fn test_register_login_refresh_logout_flow() {
    let state = test_state();
    let app = test_app!(state);

    // Register: 201 with a full token pair and the public user projection.
    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(register_payload())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert!(!body["access_token"].as_str().unwrap().is_empty());
    assert!(!body["refresh_token"].as_str().unwrap().is_empty());
    assert_eq!(body["token_type"], "Bearer");
    assert_eq!(body["expires_in"], 900);
    assert_eq!(body["user"]["email"], "a@x.com");
    assert!(body["user"].get("password_hash").is_none());
    let registration_refresh = body["refresh_token"].as_str().unwrap().to_string();

    // Re-register with the same email: 409 user_exists.
    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(register_payload())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 409);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "user_exists");

    // Login with the correct password yields a fresh pair.
    let resp = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "email_or_username": "a@x.com",
            "password": "P@ssw0rd!"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    // Wrong password: 401 invalid_credentials.
    let resp = test::TestRequest::post()
        .uri("/auth/login")
        .set_json(json!({
            "email_or_username": "a@x.com",
            "password": "wrong"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_credentials");

    // Refresh with the registration token rotates it.
    let resp = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({ "refresh_token": registration_refresh }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let rotated_refresh = body["refresh_token"].as_str().unwrap().to_string();
    let rotated_access = body["access_token"].as_str().unwrap().to_string();
    assert_ne!(rotated_refresh, registration_refresh);

    // Reusing the spent token: 401 invalid_token.
    let resp = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({ "refresh_token": registration_refresh }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_token");

    // Logout with the latest access token.
    let resp = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(("Authorization", format!("Bearer {}", rotated_access)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    // Every refresh token is now revoked.
    let resp = test::TestRequest::post()
        .uri("/auth/refresh")
        .set_json(json!({ "refresh_token": rotated_refresh }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}

#[test_log::test(actix_web::test)]
async fn test_register_validation_error() {
    let state = test_state();
    let app = test_app!(state);

    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(json!({
            "email": "a@x.com",
            "username": "a",
            "password": "short"
        }))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 400);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "validation_error");
}

#[test_log::test(actix_web::test)]
async fn test_me_requires_valid_bearer() {
    let state = test_state();
    let app = test_app!(state);

    // No header at all.
    let resp = test::TestRequest::get().uri("/auth/me").send_request(&app).await;
    assert_eq!(resp.status(), 401);

    // Garbage token.
    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_token");

    // A real token exposes the injected claims.
    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(register_payload())
        .send_request(&app)
        .await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let access = body["access_token"].as_str().unwrap().to_string();
    let user_id = body["user"]["id"].as_str().unwrap().to_string();

    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
    let body: serde_json::Value = test::read_body_json(resp).await;
    assert_eq!(body["id"], user_id.as_str());
    assert_eq!(body["email"], "a@x.com");
    assert_eq!(body["username"], "a");
}

#[test_log::test(actix_web::test)]
async fn test_access_token_outlives_logout() {
    let state = test_state();
    let app = test_app!(state);

    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(register_payload())
        .send_request(&app)
        .await;
    let body: serde_json::Value = test::read_body_json(resp).await;
    let access = body["access_token"].as_str().unwrap().to_string();

    let resp = test::TestRequest::post()
        .uri("/auth/logout")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);

    // Stateless signing: the access token stays valid until expiry even
    // though all refresh tokens are gone.
    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 200);
}

#[test_log::test(actix_web::test)]
async fn test_expired_access_token_is_rejected_at_boundary() {
    let mut settings = test_settings();
    settings.auth.access_token_ttl_secs = 0;
    let state = web::Data::new(AppState::with_repositories(
        settings,
        Arc::new(InMemoryUserRepository::new()),
        Arc::new(InMemoryRefreshTokenRepository::new()),
    ));
    let app = test_app!(state);

    let resp = test::TestRequest::post()
        .uri("/auth/register")
        .set_json(register_payload())
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 201);
    let body: serde_json::Value = test::read_body_json(resp).await;
    let access = body["access_token"].as_str().unwrap().to_string();

    // exp == iat with zero leeway.
    tokio::time::sleep(std::time::Duration::from_millis(1100)).await;
    let resp = test::TestRequest::get()
        .uri("/auth/me")
        .insert_header(("Authorization", format!("Bearer {}", access)))
        .send_request(&app)
        .await;
    assert_eq!(resp.status(), 401);
}
