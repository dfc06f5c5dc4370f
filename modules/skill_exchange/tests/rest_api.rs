//! End-to-end tests of the REST surface through the axum router.

use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use modkit::api::OpenApiRegistry;
use parking_lot::Mutex;
use sea_orm::Database;
use sea_orm_migration::MigratorTrait;
use serde_json::{json, Value};
use tower::ServiceExt;
use utoipa::openapi::{OpenApi, OpenApiBuilder};
use uuid::Uuid;

use skill_exchange::api::rest::routes::register_routes;
use skill_exchange::config::SkillExchangeConfig;
use skill_exchange::domain::ports::SessionGuard;
use skill_exchange::infra::auth::HmacSessionGuard;
use skill_exchange::infra::storage::migrations::Migrator;
use skill_exchange::module::build_service;

struct TestRegistry(Mutex<OpenApi>);

impl OpenApiRegistry for TestRegistry {
    fn merge_document(&self, doc: OpenApi) {
        self.0.lock().merge(doc);
    }

    fn document(&self) -> OpenApi {
        self.0.lock().clone()
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }
}

struct App {
    router: Router,
    guard: Arc<HmacSessionGuard>,
    registry: TestRegistry,
}

impl App {
    async fn new() -> Self {
        let db = Database::connect("sqlite::memory:").await.unwrap();
        Migrator::up(&db, None).await.unwrap();
        let service = Arc::new(build_service(db, &SkillExchangeConfig::default()));
        let guard = Arc::new(HmacSessionGuard::new("rest-test", Duration::from_secs(600)));
        let registry = TestRegistry(Mutex::new(OpenApiBuilder::new().build()));
        let session: Arc<dyn SessionGuard> = guard.clone();
        let router = register_routes(Router::new(), &registry, service, session).unwrap();
        Self {
            router,
            guard,
            registry,
        }
    }

    async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(t) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {t}"));
        }
        let body = match body {
            Some(v) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(v.to_string())
            }
            None => Body::empty(),
        };
        self.dispatch(builder.body(body).unwrap()).await
    }

    async fn dispatch(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    /// Signs up a user and returns (id, bearer token).
    async fn signup(&self, name: &str) -> (String, String) {
        let (status, body) = self
            .call(
                Method::POST,
                "/api/auth/signup",
                None,
                Some(json!({
                    "name": name,
                    "email": format!("{}@example.com", name.to_lowercase()),
                    "canTeach": "Guitar",
                    "wantToLearn": "Rust"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{body}");
        let id = body["user"]["_id"].as_str().unwrap().to_owned();
        let token = self.guard.issue(Uuid::parse_str(&id).unwrap()).unwrap();
        (id, token)
    }
}

#[tokio::test]
async fn signup_returns_summary_and_rejects_duplicates() {
    let app = App::new().await;
    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "name": "Ada", "email": "ada@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "User registered successfully");
    assert_eq!(body["user"]["email"], "ada@example.com");
    assert!(body["user"].get("password").is_none());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/auth/signup",
            None,
            Some(json!({ "name": "Ada 2", "email": "ADA@example.com" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["code"], "DuplicateKey");
}

#[tokio::test]
async fn protected_routes_require_a_valid_token() {
    let app = App::new().await;

    let (status, body) = app
        .call(Method::GET, "/api/user/myrequests", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["code"], "Unauthorized");
    assert_eq!(body["instance"], "/api/user/myrequests");

    let (status, _) = app
        .call(Method::GET, "/api/user/all", Some("forged.token.value"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn request_lifecycle_over_http() {
    let app = App::new().await;
    let (alice, alice_token) = app.signup("Alice").await;
    let (bob, bob_token) = app.signup("Bob").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/request",
            Some(&alice_token),
            Some(json!({ "toUserId": bob, "skill": "Guitar", "type": "learn" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["message"], "Request sent successfully");
    let request_id = body["request"]["_id"].as_str().unwrap().to_owned();

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/request",
            Some(&alice_token),
            Some(json!({ "toUserId": bob, "skill": "guitar", "type": "learn" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "DuplicatePending");

    let (status, body) = app
        .call(Method::GET, "/api/user/myrequests", Some(&bob_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["requests"][0]["_id"], request_id.as_str());
    assert_eq!(body["requests"][0]["from"]["_id"], alice.as_str());
    assert_eq!(body["requests"][0]["from"]["name"], "Alice");
    assert_eq!(body["requests"][0]["type"], "learn");
    assert_eq!(body["acceptedRequests"], json!([]));

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/accept",
            Some(&bob_token),
            Some(json!({ "requestId": request_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Request accepted successfully");

    let (_, body) = app
        .call(Method::GET, "/api/user/myrequests", Some(&alice_token), None)
        .await;
    assert_eq!(body["acceptedRequests"][0]["type"], "teach");
    assert_eq!(body["acceptedRequests"][0]["from"]["_id"], bob.as_str());

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/decline",
            Some(&bob_token),
            Some(json!({ "requestId": request_id })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NotFound");

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/delete-accepted",
            Some(&bob_token),
            Some(json!({ "requestId": request_id })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Accepted request deleted successfully");
}

#[tokio::test]
async fn malformed_bodies_are_invalid_input() {
    let app = App::new().await;
    let (bob, token) = app.signup("Bob").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/request",
            Some(&token),
            Some(json!({ "toUserId": bob, "skill": "Guitar", "type": "coach" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidInput");
    assert_eq!(body["message"], body["detail"]);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/accept",
            Some(&token),
            Some(json!({})),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("requestId"));

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/rate-user",
            Some(&token),
            Some(json!({ "mentorId": bob, "rating": 4.5 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidInput");

    let (status, _) = app
        .call(Method::GET, "/api/user/get-user/not-a-uuid", None, None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn problems_carry_request_id_and_field_errors() {
    let app = App::new().await;
    let (_, token) = app.signup("Alice").await;

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/user/request")
        .header(header::AUTHORIZATION, format!("Bearer {token}"))
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-123")
        .body(Body::from(
            json!({ "toUserId": "42", "skill": "Guitar", "type": "learn" }).to_string(),
        ))
        .unwrap();
    let (status, body) = app.dispatch(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidInput");
    assert_eq!(body["request_id"], "req-123");
    assert_eq!(body["errors"][0]["pointer"], "/toUserId");
    assert_eq!(body["errors"][0]["detail"], "is not a valid id");

    // Extractor rejections are scoped the same way.
    let req = Request::builder()
        .method(Method::GET)
        .uri("/api/user/myrequests")
        .header("x-request-id", "req-456")
        .body(Body::empty())
        .unwrap();
    let (status, body) = app.dispatch(req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["request_id"], "req-456");
    assert!(body.get("errors").is_none());

    let req = Request::builder()
        .method(Method::POST)
        .uri("/api/auth/signup")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "req-789")
        .body(Body::from("{not json"))
        .unwrap();
    let (status, body) = app.dispatch(req).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["request_id"], "req-789");

    // Without the header the member is left out.
    let (status, body) = app
        .call(Method::GET, "/api/user/myrequests", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body.get("request_id").is_none());
}

#[tokio::test]
async fn rating_and_public_profile() {
    let app = App::new().await;
    let (mentor, _) = app.signup("Mentor").await;
    let (_, a_token) = app.signup("A").await;
    let (_, b_token) = app.signup("B").await;

    for (token, stars) in [(&a_token, 5), (&b_token, 4)] {
        let (status, _) = app
            .call(
                Method::POST,
                "/api/user/rate-user",
                Some(token),
                Some(json!({ "mentorId": mentor, "rating": stars })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/rate-user",
            Some(&a_token),
            Some(json!({ "mentorId": mentor, "rating": 3 })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Rating submitted successfully");
    assert_eq!(body["summary"]["averageRating"], 3.5);
    assert_eq!(body["summary"]["totalReviews"], 2);

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/user/get-user/{mentor}"),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Mentor");
    assert_eq!(body["user"]["canTeach"], "Guitar");
    assert_eq!(body["user"]["averageRating"], 3.5);
    assert_eq!(body["user"]["totalReviews"], 2);

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/user/get-user/{}", Uuid::new_v4()),
            None,
            None,
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["status"], 404);
}

#[tokio::test]
async fn messaging_over_http() {
    let app = App::new().await;
    let (alice, alice_token) = app.signup("Alice").await;
    let (bob, bob_token) = app.signup("Bob").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/send-message",
            Some(&alice_token),
            Some(json!({ "toUserId": bob, "text": "hello" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["content"], "hello");
    assert_eq!(body["data"]["sender"], alice.as_str());

    app.call(
        Method::POST,
        "/api/user/send-message",
        Some(&bob_token),
        Some(json!({ "toUserId": alice, "text": "hey" })),
    )
    .await;

    let (status, body) = app
        .call(
            Method::GET,
            &format!("/api/user/get-messages/{alice}"),
            Some(&bob_token),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let contents: Vec<_> = body["messages"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["content"].as_str().unwrap().to_owned())
        .collect();
    assert_eq!(contents, vec!["hello", "hey"]);

    let (status, body) = app
        .call(
            Method::POST,
            "/api/user/send-message",
            Some(&alice_token),
            Some(json!({ "toUserId": bob, "text": "   " })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "InvalidInput");
}

#[tokio::test]
async fn directory_and_profile_update() {
    let app = App::new().await;
    let (alice, alice_token) = app.signup("Alice").await;
    let (bob, _) = app.signup("Bob").await;

    app.call(
        Method::POST,
        "/api/user/request",
        Some(&alice_token),
        Some(json!({ "toUserId": bob, "skill": "Chess", "type": "teach" })),
    )
    .await;

    let (status, body) = app
        .call(Method::GET, "/api/user/all", Some(&alice_token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    let users = body.as_array().unwrap();
    assert_eq!(users.len(), 2);
    let bob_entry = users.iter().find(|u| u["_id"] == bob.as_str()).unwrap();
    assert_eq!(bob_entry["requests"][0]["from"], alice.as_str());
    assert_eq!(bob_entry["requests"][0]["type"], "teach");

    let (status, body) = app
        .call(
            Method::PUT,
            "/api/auth/update",
            Some(&alice_token),
            Some(json!({ "name": "Alice Liddell", "wantToLearn": "Croquet" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["user"]["name"], "Alice Liddell");
    assert_eq!(body["user"]["wantToLearn"], "Croquet");
    assert_eq!(body["user"]["canTeach"], "Guitar");
}

#[tokio::test]
async fn openapi_document_is_published() {
    let app = App::new().await;
    let doc = app.registry.document();
    assert!(doc.paths.paths.contains_key("/api/user/accept"));
    assert!(doc.paths.paths.contains_key("/api/auth/signup"));
}
