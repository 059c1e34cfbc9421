use std::{sync::Arc, time::SystemTime};

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{
        Method, Request, StatusCode,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
};
use serde_json::{Value, json};
use time::{Duration, OffsetDateTime, format_description::well_known::Rfc3339};
use tower::ServiceExt;
use uuid::Uuid;

use hockey_tracker_back::{
    auth::JwtAuthProvider,
    dao::{
        models::{Position, UserEntity},
        store::memory::InMemoryStore,
    },
    routes,
    state::AppState,
};

struct TestApp {
    router: Router,
    tokens: JwtAuthProvider,
}

impl TestApp {
    fn new() -> Self {
        let tokens = JwtAuthProvider::new("integration-secret", 1);
        let state = AppState::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(tokens.clone()),
            tokens.clone(),
        );
        Self {
            router: routes::router(state),
            tokens,
        }
    }

    /// Token for a player that never signed up; only the id matters for ownership.
    fn token_for_stranger(&self) -> String {
        let user = UserEntity {
            id: Uuid::new_v4(),
            email: "stranger@example.com".into(),
            password_hash: String::new(),
            name: "Stranger".into(),
            team: "Nowhere".into(),
            position: Position::Goalie,
            created_at: SystemTime::now(),
        };
        self.tokens.issue(&user).unwrap()
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string())),
            None => builder.body(Body::empty()),
        }
        .unwrap();

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn signup_and_login(&self, email: &str) -> String {
        let (status, _) = self
            .send(
                Method::POST,
                "/auth/signup",
                None,
                Some(json!({
                    "email": email,
                    "password": "slapshot42",
                    "name": "Mario",
                    "team": "Penguins",
                    "position": "Center",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = self
            .send(
                Method::POST,
                "/auth/login",
                None,
                Some(json!({"email": email, "password": "slapshot42"})),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["token"].as_str().unwrap().to_owned()
    }

    async fn create_game(&self, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, "/games", Some(token), Some(body))
            .await
    }
}

fn rangers() -> Value {
    json!({
        "date": "2024-01-01",
        "opponent": "Rangers",
        "homeAway": "home",
        "result": "win",
    })
}

fn check_in() -> Value {
    json!({
        "confidence": 8,
        "sleepHours": 8.5,
        "sleepQuality": 7,
        "stressLevel": 3,
        "physicalEnergy": 9,
    })
}

#[tokio::test]
async fn test_healthcheck_is_public() {
    let app = TestApp::new();
    let (status, body) = app.send(Method::GET, "/healthcheck", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

#[tokio::test]
async fn test_protected_routes_fail_closed() {
    let app = TestApp::new();

    for uri in ["/games", "/insights"] {
        let (status, body) = app.send(Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body, json!({"error": "Unauthorized"}));
    }

    let (status, _) = app
        .send(Method::GET, "/games", Some("not.a.token"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_signup_login_flow() {
    let app = TestApp::new();
    let token = app.signup_and_login("mario@example.com").await;
    assert!(!token.is_empty());

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({
                "email": "MARIO@example.com",
                "password": "slapshot42",
                "name": "Other Mario",
                "team": "Penguins",
                "position": "Left Wing",
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "User with this email already exists");

    let (status, body) = app
        .send(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({"email": "mario@example.com", "password": "wrong-pass"})),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
}

#[tokio::test]
async fn test_signup_rejects_missing_fields() {
    let app = TestApp::new();
    let (status, body) = app
        .send(
            Method::POST,
            "/auth/signup",
            None,
            Some(json!({"email": "a@example.com", "password": "longenough"})),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "All fields are required");
}

#[tokio::test]
async fn test_create_game_with_defaults() {
    let app = TestApp::new();
    let token = app.token_for_stranger();

    let (status, body) = app.create_game(&token, rangers()).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Game created successfully");
    let game = &body["game"];
    assert_eq!(game["opponent"], "Rangers");
    assert_eq!(game["homeAway"], "home");
    for field in ["goals", "assists", "shots", "plusMinus", "points"] {
        assert_eq!(game[field], 0, "{field}");
    }
    assert_eq!(game["iceTime"], 0.0);
    assert_eq!(game["mentalState"], Value::Null);
}

#[tokio::test]
async fn test_future_game_date_is_rejected() {
    let app = TestApp::new();
    let token = app.token_for_stranger();
    let tomorrow = (OffsetDateTime::now_utc() + Duration::days(1))
        .format(&Rfc3339)
        .unwrap();

    let mut body = rangers();
    body["date"] = json!(tomorrow);
    let (status, body) = app.create_game(&token, body).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body, json!({"error": "Game date cannot be in the future"}));
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let app = TestApp::new();
    let token = app.token_for_stranger();

    let request = Request::builder()
        .method(Method::POST)
        .uri("/games")
        .header(AUTHORIZATION, format!("Bearer {token}"))
        .header(CONTENT_TYPE, "application/json")
        .body(Body::from("{\"date\": "))
        .unwrap();
    let response = app.router.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let (status, body) = app.create_game(&token, json!([1, 2, 3])).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Invalid JSON body");
}

#[tokio::test]
async fn test_ownership_and_missing_games() {
    let app = TestApp::new();
    let owner = app.token_for_stranger();
    let intruder = app.token_for_stranger();
    let (_, body) = app.create_game(&owner, rangers()).await;
    let uri = format!("/games/{}", body["game"]["id"].as_str().unwrap());

    let (status, _) = app.send(Method::GET, &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .send(Method::PUT, &uri, Some(&intruder), Some(json!({"goals": 1})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app.send(Method::DELETE, &uri, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let missing = format!("/games/{}", Uuid::new_v4());
    let (status, body) = app.send(Method::GET, &missing, Some(&intruder), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Game not found");

    let (status, body) = app.send(Method::GET, "/games", Some(&intruder), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["games"], json!([]));
}

#[tokio::test]
async fn test_update_and_delete_game() {
    let app = TestApp::new();
    let token = app.token_for_stranger();
    let (_, body) = app.create_game(&token, rangers()).await;
    let uri = format!("/games/{}", body["game"]["id"].as_str().unwrap());

    let patch = json!({"goals": 2, "assists": 1, "plusMinus": -1});
    let (status, first) = app
        .send(Method::PUT, &uri, Some(&token), Some(patch.clone()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["message"], "Game updated successfully");
    assert_eq!(first["game"]["points"], 3);
    assert_eq!(first["game"]["plusMinus"], -1);
    assert_eq!(first["game"]["opponent"], "Rangers");

    let (_, second) = app.send(Method::PUT, &uri, Some(&token), Some(patch)).await;
    assert_eq!(second["game"]["goals"], first["game"]["goals"]);
    assert_eq!(second["game"]["createdAt"], first["game"]["createdAt"]);

    let (status, body) = app
        .send(Method::PUT, &uri, Some(&token), Some(json!({"shots": -4})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Shots must be a non-negative number");

    let (status, body) = app.send(Method::DELETE, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"message": "Game deleted successfully"}));

    let (status, _) = app.send(Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_mental_state_lifecycle() {
    let app = TestApp::new();
    let token = app.token_for_stranger();
    let (_, body) = app.create_game(&token, rangers()).await;
    let game_uri = format!("/games/{}", body["game"]["id"].as_str().unwrap());
    let mental_uri = format!("{game_uri}/mental");

    let (status, body) = app
        .send(Method::PUT, &mental_uri, Some(&token), Some(json!({"confidence": 5})))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Mental state not found for this game");

    let (status, created) = app
        .send(Method::POST, &mental_uri, Some(&token), Some(check_in()))
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["message"], "Mental state created successfully");
    assert_eq!(created["mentalState"]["confidence"], 8);
    assert_eq!(created["mentalState"]["notes"], Value::Null);

    let (status, replaced) = app
        .send(Method::POST, &mental_uri, Some(&token), Some(check_in()))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replaced["message"], "Mental state updated successfully");
    assert_eq!(replaced["mentalState"]["id"], created["mentalState"]["id"]);

    let mut too_long = check_in();
    too_long["sleepHours"] = json!(25);
    let (status, body) = app
        .send(Method::POST, &mental_uri, Some(&token), Some(too_long))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Sleep hours must be between 0 and 24");

    let (status, updated) = app
        .send(
            Method::PUT,
            &mental_uri,
            Some(&token),
            Some(json!({"notes": "legs felt heavy"})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["mentalState"]["notes"], "legs felt heavy");
    assert_eq!(updated["mentalState"]["confidence"], 8);

    let (status, body) = app
        .send(Method::PUT, &mental_uri, Some(&token), Some(json!({"stressLevel": 0})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Stress level must be between 1 and 10");

    let intruder = app.token_for_stranger();
    let (status, _) = app
        .send(Method::PUT, &mental_uri, Some(&intruder), Some(json!({"confidence": 1})))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (_, game) = app.send(Method::GET, &game_uri, Some(&token), None).await;
    assert_eq!(game["game"]["mentalState"]["confidence"], 8);
    assert_eq!(game["game"]["mentalState"]["notes"], "legs felt heavy");

    app.send(Method::DELETE, &game_uri, Some(&token), None).await;
    let (status, _) = app
        .send(Method::POST, &mental_uri, Some(&token), Some(check_in()))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_insights_summarize_callers_games() {
    let app = TestApp::new();
    let token = app.token_for_stranger();

    let (_, body) = app
        .create_game(
            &token,
            json!({
                "date": "2024-03-01",
                "opponent": "Flyers",
                "homeAway": "away",
                "result": "win",
                "goals": 2,
                "assists": 2,
            }),
        )
        .await;
    let mental_uri = format!("/games/{}/mental", body["game"]["id"].as_str().unwrap());
    app.send(Method::POST, &mental_uri, Some(&token), Some(check_in()))
        .await;
    app.create_game(&token, rangers()).await;

    let (status, body) = app.send(Method::GET, "/insights", Some(&token), None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["totalGames"], 2);
    assert_eq!(body["avgPoints"], 2.0);
    assert_eq!(body["avgConfidence"], 8.0);
    assert_eq!(body["avgSleep"], 8.5);
    assert_eq!(body["insights"], json!([]));
    assert_eq!(body["recentGames"][0]["opponent"], "Flyers");
    assert_eq!(body["recentGames"][0]["date"], "2024-03-01");
    assert_eq!(body["recentGames"][1]["points"], 0);
}

#[tokio::test]
async fn test_openapi_document_is_served() {
    let app = TestApp::new();
    let (status, body) = app
        .send(Method::GET, "/api-doc/openapi.json", None, None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert!(body["paths"]["/games/{id}/mental"].is_object());
}
