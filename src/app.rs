use std::net::SocketAddr;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::state::AppState;
use crate::{auth, matching, profiles};

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest(
            "/api",
            Router::new()
                .merge(auth::router())
                .merge(profiles::router())
                .merge(matching::router())
                .route("/health", get(|| async { "ok" })),
        )
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!("http_request", %method, uri = %uri)
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     _latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        if status.is_server_error() {
                            tracing::error!(%status, "response");
                        } else {
                            tracing::info!(%status, "response");
                        }
                    },
                ),
        )
}

pub async fn serve(app: Router, host: &str, port: u16) -> anyhow::Result<()> {
    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    tracing::info!("listening on {}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::body::Body;
    use axum::http::{header, Request, StatusCode};
    use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
    use http_body_util::BodyExt;
    use image::ImageFormat;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use super::*;
    use crate::config::{AppConfig, JwtConfig};
    use crate::images::validate::tests::encode;
    use crate::store::{MemoryStore, TransitionPolicy};

    fn test_app() -> Router {
        build_app(AppState::fake())
    }

    fn strict_app() -> Router {
        let config = Arc::new(AppConfig {
            host: "127.0.0.1".into(),
            port: 0,
            jwt: JwtConfig {
                secret: "test-secret".into(),
                issuer: "test-issuer".into(),
                audience: "test-aud".into(),
                ttl_minutes: 5,
            },
            transitions: TransitionPolicy::Strict,
        });
        build_app(AppState::from_parts(Arc::new(MemoryStore::new()), config))
    }

    async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let res = app.clone().oneshot(req).await.expect("request");
        let status = res.status();
        let bytes = res.into_body().collect().await.expect("body").to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("json body")
        };
        (status, value)
    }

    fn json_request(method: &str, uri: &str, token: Option<&str>, body: Value) -> Request<Body> {
        let mut builder = Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::from(body.to_string())).expect("request")
    }

    fn bare_request(method: &str, uri: &str, token: Option<&str>) -> Request<Body> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        builder.body(Body::empty()).expect("request")
    }

    async fn signup(app: &Router, email: &str, name: &str, role: &str) {
        let (status, _) = send(
            app,
            json_request(
                "POST",
                "/api/signup",
                None,
                json!({"email": email, "password": "password123", "name": name, "role": role}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    async fn login(app: &Router, email: &str) -> String {
        let req = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from(format!("username={email}&password=password123")))
            .expect("request");
        let (status, body) = send(app, req).await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().expect("token").to_string()
    }

    #[tokio::test]
    async fn health_is_open() {
        let app = test_app();
        let res = app
            .oneshot(bare_request("GET", "/api/health", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn signup_login_me_roundtrip() {
        let app = test_app();
        signup(&app, "alice@example.com", "Alice", "mentor").await;
        let token = login(&app, "alice@example.com").await;

        let (status, me) = send(&app, bare_request("GET", "/api/me", Some(&token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], 1);
        assert_eq!(me["email"], "alice@example.com");
        assert_eq!(me["role"], "mentor");
        assert_eq!(me["profile"]["name"], "Alice");
        assert_eq!(me["profile"]["imageUrl"], "/images/mentor/1");
        assert_eq!(me["profile"]["skills"], json!([]));
    }

    #[tokio::test]
    async fn mentee_view_has_no_skills_field() {
        let app = test_app();
        signup(&app, "eve@example.com", "Eve", "mentee").await;
        let token = login(&app, "eve@example.com").await;

        let (_, me) = send(&app, bare_request("GET", "/api/me", Some(&token))).await;
        assert!(me["profile"].get("skills").is_none());
    }

    #[tokio::test]
    async fn duplicate_signup_is_a_conflict() {
        let app = test_app();
        signup(&app, "dup@example.com", "First", "mentor").await;
        let (status, body) = send(
            &app,
            json_request(
                "POST",
                "/api/signup",
                None,
                json!({"email": "dup@example.com", "password": "password123", "name": "Second", "role": "mentee"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let app = test_app();
        signup(&app, "bob@example.com", "Bob", "mentee").await;
        let req = Request::builder()
            .method("POST")
            .uri("/api/login")
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .body(Body::from("username=bob@example.com&password=wrong-password"))
            .unwrap();
        let (status, _) = send(&app, req).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn protected_routes_reject_missing_and_bad_tokens() {
        let app = test_app();
        let (status, _) = send(&app, bare_request("GET", "/api/me", None)).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = send(&app, bare_request("GET", "/api/me", Some("garbage"))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn mentor_listing_is_mentee_only() {
        let app = test_app();
        signup(&app, "mentor@example.com", "Mentor", "mentor").await;
        signup(&app, "mentee@example.com", "Mentee", "mentee").await;

        let mentor_token = login(&app, "mentor@example.com").await;
        let (status, _) = send(&app, bare_request("GET", "/api/mentors", Some(&mentor_token))).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let mentee_token = login(&app, "mentee@example.com").await;
        let (status, list) = send(&app, bare_request("GET", "/api/mentors", Some(&mentee_token))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(list.as_array().map(Vec::len), Some(1));
        assert_eq!(list[0]["role"], "mentor");
    }

    #[tokio::test]
    async fn profile_image_upload_and_fetch() {
        let app = test_app();
        signup(&app, "mentor@example.com", "Mentor", "mentor").await;
        let token = login(&app, "mentor@example.com").await;

        let png = encode(512, 512, ImageFormat::Png);
        let (status, view) = send(
            &app,
            json_request(
                "PUT",
                "/api/profile",
                Some(&token),
                json!({
                    "role": "mentor",
                    "name": "Mentor",
                    "bio": "I mentor",
                    "image": BASE64.encode(&png),
                    "skills": ["Rust", "Tokio"],
                }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(view["profile"]["bio"], "I mentor");
        assert_eq!(view["profile"]["skills"], json!(["Rust", "Tokio"]));

        let res = app
            .clone()
            .oneshot(bare_request("GET", "/api/images/mentor/1", Some(&token)))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(
            res.headers().get(header::CONTENT_TYPE).unwrap(),
            "image/png"
        );
        let served = res.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(served, png);
    }

    #[tokio::test]
    async fn image_rejections_are_bad_requests() {
        let app = test_app();
        signup(&app, "mentee@example.com", "Mentee", "mentee").await;
        let token = login(&app, "mentee@example.com").await;

        let cases = [
            (BASE64.encode(encode(500, 600, ImageFormat::Jpeg)), "image must be square"),
            (
                BASE64.encode(encode(400, 400, ImageFormat::Jpeg)),
                "image side must be between 500 and 1000 pixels",
            ),
            (BASE64.encode(b"not an image"), "payload is not a decodable image"),
        ];
        for (image, details) in cases {
            let (status, body) = send(
                &app,
                json_request(
                    "PUT",
                    "/api/profile",
                    Some(&token),
                    json!({"role": "mentee", "name": "Mentee", "bio": "", "image": image}),
                ),
            )
            .await;
            assert_eq!(status, StatusCode::BAD_REQUEST);
            assert_eq!(body["details"], details);
        }
    }

    #[tokio::test]
    async fn missing_image_is_not_found() {
        let app = test_app();
        signup(&app, "mentor@example.com", "Mentor", "mentor").await;
        let token = login(&app, "mentor@example.com").await;

        let (status, _) = send(&app, bare_request("GET", "/api/images/mentor/1", Some(&token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        let (status, _) = send(&app, bare_request("GET", "/api/images/mentee/9", Some(&token))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn match_request_lifecycle_over_http() {
        let app = test_app();
        signup(&app, "mentor@example.com", "Mentor", "mentor").await;
        signup(&app, "mentee@example.com", "Mentee", "mentee").await;
        let mentor_token = login(&app, "mentor@example.com").await;
        let mentee_token = login(&app, "mentee@example.com").await;

        let (status, created) = send(
            &app,
            json_request(
                "POST",
                "/api/match-requests",
                Some(&mentee_token),
                json!({"mentorId": 1, "menteeId": 2, "message": "teach me"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["status"], "pending");
        assert_eq!(created["id"], 1);

        let (status, incoming) = send(
            &app,
            bare_request("GET", "/api/match-requests/incoming", Some(&mentor_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(incoming[0]["message"], "teach me");

        let (status, accepted) = send(
            &app,
            bare_request("PUT", "/api/match-requests/1/accept", Some(&mentor_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(accepted["status"], "accepted");

        // Default policy allows overwriting a terminal status.
        let (status, rejected) = send(
            &app,
            bare_request("PUT", "/api/match-requests/1/reject", Some(&mentor_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(rejected["status"], "rejected");

        let (status, outgoing) = send(
            &app,
            bare_request("GET", "/api/match-requests/outgoing", Some(&mentee_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(outgoing[0]["status"], "rejected");
        assert!(outgoing[0].get("message").is_none());

        let (status, cancelled) = send(
            &app,
            bare_request("DELETE", "/api/match-requests/1", Some(&mentee_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(cancelled["status"], "cancelled");
    }

    #[tokio::test]
    async fn match_request_role_and_reference_errors() {
        let app = test_app();
        signup(&app, "mentor@example.com", "Mentor", "mentor").await;
        signup(&app, "mentee@example.com", "Mentee", "mentee").await;
        let mentor_token = login(&app, "mentor@example.com").await;
        let mentee_token = login(&app, "mentee@example.com").await;

        // Mentors cannot create requests at all.
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/match-requests",
                Some(&mentor_token),
                json!({"mentorId": 1, "menteeId": 2, "message": "hi"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        // Unknown mentor target.
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/match-requests",
                Some(&mentee_token),
                json!({"mentorId": 99, "menteeId": 2, "message": "hi"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        // Claiming someone else's menteeId.
        let (status, _) = send(
            &app,
            json_request(
                "POST",
                "/api/match-requests",
                Some(&mentee_token),
                json!({"mentorId": 1, "menteeId": 7, "message": "hi"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn strict_policy_blocks_second_transition_over_http() {
        let app = strict_app();
        signup(&app, "mentor@example.com", "Mentor", "mentor").await;
        signup(&app, "mentee@example.com", "Mentee", "mentee").await;
        let mentor_token = login(&app, "mentor@example.com").await;
        let mentee_token = login(&app, "mentee@example.com").await;

        send(
            &app,
            json_request(
                "POST",
                "/api/match-requests",
                Some(&mentee_token),
                json!({"mentorId": 1, "menteeId": 2, "message": "teach me"}),
            ),
        )
        .await;
        let (status, _) = send(
            &app,
            bare_request("PUT", "/api/match-requests/1/accept", Some(&mentor_token)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = send(
            &app,
            bare_request("PUT", "/api/match-requests/1/reject", Some(&mentor_token)),
        )
        .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }
}
