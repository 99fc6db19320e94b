//! Platform API Integration Tests
//!
//! Drives the assembled router over an in-memory database:
//! - Identity (register, login, refresh, me)
//! - Show, division, class, entry and result management
//! - Model horses
//! - Role and user administration

use axum::{
    body::Body,
    http::{header, HeaderMap, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use sr_platform::repository;
use sr_platform::service::AuthConfig;
use sr_platform::Platform;

const ADMIN_EMAIL: &str = "admin@showring.test";
const ADMIN_PASSWORD: &str = "paddock99";
const PASSWORD: &str = "gallop123";

struct TestApp {
    router: Router,
}

impl TestApp {
    async fn new() -> Self {
        let pool = repository::open("sqlite::memory:", 1).await.unwrap();
        let platform = Platform::new(
            pool,
            AuthConfig {
                secret: "integration-secret-integration-secret".to_string(),
                issuer: "showring".to_string(),
                access_token_expiry_secs: 3600,
                refresh_token_expiry_secs: 86400,
            },
            false,
        );
        platform.sync_roles().await.unwrap();
        platform.seed_admin(ADMIN_EMAIL, ADMIN_PASSWORD).await.unwrap();

        Self { router: platform.router() }
    }

    async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, HeaderMap, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let headers = response.headers().clone();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, headers, value)
    }

    async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        let (status, _, body) = self.send(Method::GET, uri, Some(token), None).await;
        (status, body)
    }

    async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.send(Method::POST, uri, Some(token), Some(body)).await;
        (status, body)
    }

    async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        let (status, _, body) = self.send(Method::PUT, uri, Some(token), Some(body)).await;
        (status, body)
    }

    async fn delete(&self, uri: &str, token: &str) -> StatusCode {
        self.send(Method::DELETE, uri, Some(token), None).await.0
    }

    async fn login(&self, email: &str, password: &str) -> Value {
        let (status, _, body) = self
            .send(
                Method::POST,
                "/identity/login",
                None,
                Some(json!({ "email": email, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {}", body);
        body
    }

    async fn admin_token(&self) -> String {
        self.login(ADMIN_EMAIL, ADMIN_PASSWORD).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string()
    }

    /// Register an account and return its id and an access token.
    async fn register(&self, email: &str) -> (String, String) {
        let (status, _, body) = self
            .send(
                Method::POST,
                "/identity/register",
                None,
                Some(json!({ "email": email, "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "register failed: {}", body);
        let id = body["id"].as_str().unwrap().to_string();
        let token = self.login(email, PASSWORD).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string();
        (id, token)
    }

    async fn grant(&self, admin: &str, user_id: &str, role: &str) {
        let (status, _) = self
            .post(&format!("/api/users/{}/roles?role={}", user_id, role), admin, json!({}))
            .await;
        assert_eq!(status, StatusCode::OK);
    }

    async fn create_horse(&self, token: &str, name: &str) -> i64 {
        let (status, body) = self
            .post("/api/userModelObjects", token, json!({ "name": name, "breed": "Arabian" }))
            .await;
        assert_eq!(status, StatusCode::CREATED, "horse create failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    async fn create_show(&self, token: &str, holder_id: i64, extra: Value) -> i64 {
        let mut body = json!({
            "name": "Spring Fling",
            "showDate": "2030-04-12T09:00:00Z",
            "showHolderId": holder_id,
        });
        if let (Some(target), Some(extra)) = (body.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                target.insert(k.clone(), v.clone());
            }
        }
        let (status, body) = self.post("/api/shows", token, body).await;
        assert_eq!(status, StatusCode::CREATED, "show create failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    async fn create_division(&self, token: &str, show_id: i64, name: &str, sort_order: i32) -> i64 {
        let (status, body) = self
            .post(
                "/api/divisions",
                token,
                json!({ "name": name, "showId": show_id, "sortOrder": sort_order, "divisionType": "Halter" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "division create failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    async fn create_class(&self, token: &str, show_id: i64, division_id: i64, max_entries: Value) -> i64 {
        let (status, body) = self
            .post(
                "/api/showclasses",
                token,
                json!({
                    "name": "Arabian Stallion",
                    "classNumber": 101,
                    "maxEntries": max_entries,
                    "divisionId": division_id,
                    "showId": show_id,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "class create failed: {}", body);
        body["id"].as_i64().unwrap()
    }

    /// Show, division and class owned by an admin-created show holder.
    async fn open_class(&self, admin: &str, max_entries: Value) -> (i64, i64) {
        let holder = self.create_horse(admin, "Holder Stable").await;
        let show_id = self.create_show(admin, holder, json!({})).await;
        let division_id = self.create_division(admin, show_id, "Halter", 1).await;
        let class_id = self.create_class(admin, show_id, division_id, max_entries).await;
        (show_id, class_id)
    }
}

mod identity_tests {
    use super::*;

    #[tokio::test]
    async fn test_register_login_and_me() {
        let app = TestApp::new().await;
        let (id, token) = app.register("rider@showring.test").await;

        let (status, me) = app.get("/identity/me", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(me["id"], id.as_str());
        assert_eq!(me["email"], "rider@showring.test");
        assert_eq!(me["roles"], json!(["User"]));
    }

    #[tokio::test]
    async fn test_login_response_shape() {
        let app = TestApp::new().await;
        let body = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;

        assert_eq!(body["tokenType"], "Bearer");
        assert_eq!(body["expiresIn"], 3600);
        assert!(body["refreshToken"].as_str().is_some_and(|t| !t.is_empty()));
        assert!(body["roles"].as_array().unwrap().iter().any(|r| r == "Admin"));
    }

    #[tokio::test]
    async fn test_duplicate_registration_conflicts() {
        let app = TestApp::new().await;
        app.register("twice@showring.test").await;

        let (status, _, _) = app
            .send(
                Method::POST,
                "/identity/register",
                None,
                Some(json!({ "email": "twice@showring.test", "password": PASSWORD })),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_wrong_password_is_unauthorized() {
        let app = TestApp::new().await;
        let (status, _, body) = app
            .send(
                Method::POST,
                "/identity/login",
                None,
                Some(json!({ "email": ADMIN_EMAIL, "password": "not-it-42" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn test_missing_or_bad_token_is_rejected() {
        let app = TestApp::new().await;

        let (status, _, _) = app.send(Method::GET, "/api/shows", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.get("/api/shows", "not.a.jwt").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_refresh_rotates_tokens() {
        let app = TestApp::new().await;
        let first = app.login(ADMIN_EMAIL, ADMIN_PASSWORD).await;
        let refresh_token = first["refreshToken"].as_str().unwrap();

        let (status, _, rotated) = app
            .send(
                Method::POST,
                "/identity/refresh",
                None,
                Some(json!({ "refreshToken": refresh_token })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_ne!(rotated["refreshToken"], first["refreshToken"]);

        let (status, _, _) = app
            .send(
                Method::POST,
                "/identity/refresh",
                None,
                Some(json!({ "refreshToken": refresh_token })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_always_succeeds() {
        let app = TestApp::new().await;
        let (status, _, _) = app.send(Method::POST, "/identity/logout", None, None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let token = app.admin_token().await;
        let (status, _, _) = app.send(Method::POST, "/identity/logout", Some(&token), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }
}

mod show_tests {
    use super::*;

    #[tokio::test]
    async fn test_show_crud() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;

        let (status, headers, created) = app
            .send(
                Method::POST,
                "/api/shows",
                Some(&admin),
                Some(json!({
                    "name": "Autumn Classic",
                    "showDate": "2030-10-01T09:00:00Z",
                    "showHolderId": holder,
                    "showType": "PhotoShow",
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_i64().unwrap();
        assert_eq!(headers[header::LOCATION].to_str().unwrap(), format!("/api/shows/{}", id));
        assert_eq!(created["status"], "Upcoming");
        assert_eq!(created["showType"], "PhotoShow");
        assert_eq!(created["showHolderName"], "Holder Stable");

        let (status, updated) = app
            .put(
                &format!("/api/shows/{}", id),
                &admin,
                json!({
                    "id": id,
                    "name": "Autumn Classic II",
                    "showDate": "2030-10-02T09:00:00Z",
                    "showHolderId": holder,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(updated["name"], "Autumn Classic II");

        assert_eq!(app.delete(&format!("/api/shows/{}", id), &admin).await, StatusCode::NO_CONTENT);
        let (status, _) = app.get(&format!("/api/shows/{}", id), &admin).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(app.delete(&format!("/api/shows/{}", id), &admin).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_update_rejects_id_mismatch() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        let id = app.create_show(&admin, holder, json!({})).await;

        let (status, body) = app
            .put(
                &format!("/api/shows/{}", id),
                &admin,
                json!({
                    "id": id + 1,
                    "name": "Renamed",
                    "showDate": "2030-04-12T09:00:00Z",
                    "showHolderId": holder,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("ID mismatch"));
    }

    #[tokio::test]
    async fn test_unknown_show_holder_is_rejected() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;

        let (status, _) = app
            .post(
                "/api/shows",
                &admin,
                json!({ "name": "Ghost Show", "showDate": "2030-04-12T09:00:00Z", "showHolderId": 999 }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_plain_user_cannot_manage_shows() {
        let app = TestApp::new().await;
        let (_, token) = app.register("rider@showring.test").await;
        let holder = app.create_horse(&token, "My Stable").await;

        let (status, _) = app
            .post(
                "/api/shows",
                &token,
                json!({ "name": "Sneaky", "showDate": "2030-04-12T09:00:00Z", "showHolderId": holder }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, shows) = app.get("/api/shows", &token).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shows, json!([]));
    }

    #[tokio::test]
    async fn test_non_numeric_id_is_not_found() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (status, _) = app.get("/api/shows/abc", &admin).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_shows_by_judge() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (judge_id, _) = app.register("judge@showring.test").await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        app.create_show(&admin, holder, json!({ "judgeId": judge_id })).await;
        app.create_show(&admin, holder, json!({ "name": "Unjudged" })).await;

        let (status, shows) = app.get(&format!("/api/shows/judge/{}", judge_id), &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(shows.as_array().unwrap().len(), 1);
        assert_eq!(shows[0]["judgeName"], "judge@showring.test");
    }
}

mod show_holder_tests {
    use super::*;

    #[tokio::test]
    async fn test_holder_manages_only_own_shows() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (holder_user, _) = app.register("holder@showring.test").await;
        app.grant(&admin, &holder_user, "ShowHolder").await;
        let token = app.login("holder@showring.test", PASSWORD).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string();

        let own = app.create_horse(&token, "Own Stable").await;
        let foreign = app.create_horse(&admin, "Admin Stable").await;
        app.create_show(&admin, foreign, json!({ "name": "Admin Show" })).await;

        let (status, created) = app
            .post(
                "/api/showholder/shows",
                &token,
                json!({ "name": "Holder Show", "showDate": "2030-05-01T09:00:00Z", "showHolderId": own }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, mine) = app.get("/api/showholder/shows", &token).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = mine.as_array().unwrap().iter().map(|s| s["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["Holder Show"]);

        let (status, _) = app
            .post(
                "/api/showholder/shows",
                &token,
                json!({ "name": "Hijack", "showDate": "2030-05-01T09:00:00Z", "showHolderId": foreign }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let id = created["id"].as_i64().unwrap();
        assert_eq!(
            app.delete(&format!("/api/showholder/shows/{}", id), &token).await,
            StatusCode::NO_CONTENT
        );
    }
}

mod division_tests {
    use super::*;

    #[tokio::test]
    async fn test_divisions_listed_in_sort_order() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        let show_id = app.create_show(&admin, holder, json!({})).await;
        app.create_division(&admin, show_id, "Performance", 2).await;
        app.create_division(&admin, show_id, "Halter", 1).await;

        let (status, divisions) = app.get(&format!("/api/divisions?showId={}", show_id), &admin).await;
        assert_eq!(status, StatusCode::OK);
        let names: Vec<&str> = divisions
            .as_array()
            .unwrap()
            .iter()
            .map(|d| d["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Halter", "Performance"]);

        let (_, show) = app.get(&format!("/api/shows/{}", show_id), &admin).await;
        assert_eq!(show["divisions"].as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_show_id_is_required() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (status, _) = app.get("/api/divisions", &admin).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_division_for_missing_show_is_rejected() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (status, _) = app
            .post("/api/divisions", &admin, json!({ "name": "Orphan", "showId": 4242 }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod show_class_tests {
    use super::*;

    #[tokio::test]
    async fn test_class_defaults_and_listing() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        let show_id = app.create_show(&admin, holder, json!({})).await;
        let division_id = app.create_division(&admin, show_id, "Halter", 1).await;

        let (status, class) = app
            .post(
                "/api/showclasses",
                &admin,
                json!({ "name": "Foals", "classNumber": 7, "divisionId": division_id, "showId": show_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(class["maxEntries"], 3);
        assert_eq!(class["divisionName"], "Halter");

        let (status, by_division) = app
            .get(&format!("/api/showclasses?divisionId={}", division_id), &admin)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(by_division.as_array().unwrap().len(), 1);

        let (status, _) = app.get("/api/showclasses", &admin).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_division_must_belong_to_show() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        let first = app.create_show(&admin, holder, json!({})).await;
        let second = app.create_show(&admin, holder, json!({ "name": "Second" })).await;
        let division_id = app.create_division(&admin, first, "Halter", 1).await;

        let (status, _) = app
            .post(
                "/api/showclasses",
                &admin,
                json!({ "name": "Misfiled", "classNumber": 1, "divisionId": division_id, "showId": second }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod entry_tests {
    use super::*;

    #[tokio::test]
    async fn test_full_class_rejects_entries() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (_, class_id) = app.open_class(&admin, json!(1)).await;

        let (_, alice) = app.register("alice@showring.test").await;
        let (_, bob) = app.register("bob@showring.test").await;
        let alice_horse = app.create_horse(&alice, "Desert Wind").await;
        let bob_horse = app.create_horse(&bob, "Storm Cloud").await;

        let (status, entry) = app
            .post(
                "/api/entries",
                &alice,
                json!({ "entryNumber": 1, "userModelObjectId": alice_horse, "showClassId": class_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(entry["horseName"], "Desert Wind");
        assert_eq!(entry["status"], "Submitted");

        let (status, body) = app
            .post(
                "/api/entries",
                &bob,
                json!({ "entryNumber": 2, "userModelObjectId": bob_horse, "showClassId": class_id }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("full"));
    }

    #[tokio::test]
    async fn test_cannot_enter_another_users_horse() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (_, class_id) = app.open_class(&admin, json!(null)).await;

        let (_, alice) = app.register("alice@showring.test").await;
        let (_, bob) = app.register("bob@showring.test").await;
        let alice_horse = app.create_horse(&alice, "Desert Wind").await;

        let (status, _) = app
            .post(
                "/api/entries",
                &bob,
                json!({ "entryNumber": 1, "userModelObjectId": alice_horse, "showClassId": class_id }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_closed_show_rejects_non_admin_entries() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        let show_id = app.create_show(&admin, holder, json!({ "status": "Completed" })).await;
        let division_id = app.create_division(&admin, show_id, "Halter", 1).await;
        let class_id = app.create_class(&admin, show_id, division_id, json!(null)).await;

        let (_, alice) = app.register("alice@showring.test").await;
        let horse = app.create_horse(&alice, "Desert Wind").await;
        let (status, _) = app
            .post(
                "/api/entries",
                &alice,
                json!({ "entryNumber": 1, "userModelObjectId": horse, "showClassId": class_id }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let admin_horse = app.create_horse(&admin, "Late Entry").await;
        let (status, _) = app
            .post(
                "/api/entries",
                &admin,
                json!({ "entryNumber": 1, "userModelObjectId": admin_horse, "showClassId": class_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_per_user_limit_spans_the_show() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        let show_id = app.create_show(&admin, holder, json!({ "maxEntriesPerUser": 1 })).await;
        let division_id = app.create_division(&admin, show_id, "Halter", 1).await;
        let first = app.create_class(&admin, show_id, division_id, json!(null)).await;
        let second = app.create_class(&admin, show_id, division_id, json!(null)).await;

        let (_, alice) = app.register("alice@showring.test").await;
        let (_, bob) = app.register("bob@showring.test").await;
        let wind = app.create_horse(&alice, "Desert Wind").await;
        let dune = app.create_horse(&alice, "Dune Runner").await;
        let cloud = app.create_horse(&bob, "Storm Cloud").await;

        let (status, _) = app
            .post("/api/entries", &alice, json!({ "entryNumber": 1, "userModelObjectId": wind, "showClassId": first }))
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app
            .post("/api/entries", &alice, json!({ "entryNumber": 2, "userModelObjectId": dune, "showClassId": second }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(body["message"].as_str().unwrap().contains("At most 1"));

        let (status, _) = app
            .post("/api/entries", &bob, json!({ "entryNumber": 3, "userModelObjectId": cloud, "showClassId": second }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    #[tokio::test]
    async fn test_swapping_horse_in_full_class() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (_, class_id) = app.open_class(&admin, json!(1)).await;

        let (_, alice) = app.register("alice@showring.test").await;
        let wind = app.create_horse(&alice, "Desert Wind").await;
        let dune = app.create_horse(&alice, "Dune Runner").await;

        let (_, entry) = app
            .post("/api/entries", &alice, json!({ "entryNumber": 1, "userModelObjectId": wind, "showClassId": class_id }))
            .await;
        let entry_id = entry["id"].as_i64().unwrap();

        let (status, updated) = app
            .put(
                &format!("/api/entries/{}", entry_id),
                &alice,
                json!({ "id": entry_id, "entryNumber": 1, "userModelObjectId": dune, "showClassId": class_id }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", updated);
        assert_eq!(updated["horseName"], "Dune Runner");
    }

    #[tokio::test]
    async fn test_moving_entry_at_per_user_limit() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        let show_id = app.create_show(&admin, holder, json!({ "maxEntriesPerUser": 1 })).await;
        let division_id = app.create_division(&admin, show_id, "Halter", 1).await;
        let first = app.create_class(&admin, show_id, division_id, json!(1)).await;
        let second = app.create_class(&admin, show_id, division_id, json!(1)).await;

        let (_, alice) = app.register("alice@showring.test").await;
        let wind = app.create_horse(&alice, "Desert Wind").await;
        let (_, entry) = app
            .post("/api/entries", &alice, json!({ "entryNumber": 1, "userModelObjectId": wind, "showClassId": first }))
            .await;
        let entry_id = entry["id"].as_i64().unwrap();

        let (status, moved) = app
            .put(
                &format!("/api/entries/{}", entry_id),
                &alice,
                json!({ "entryNumber": 1, "userModelObjectId": wind, "showClassId": second }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "{}", moved);
        assert_eq!(moved["showClassId"], second);

        let (_, remaining) = app.get(&format!("/api/entries?showClassId={}", first), &alice).await;
        assert_eq!(remaining, json!([]));
    }

    #[tokio::test]
    async fn test_entry_deadline_closes_entries() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let holder = app.create_horse(&admin, "Holder Stable").await;
        let (_, alice) = app.register("alice@showring.test").await;
        let horse = app.create_horse(&alice, "Desert Wind").await;

        for (deadline, expected) in [
            ("2001-01-01T00:00:00Z", StatusCode::BAD_REQUEST),
            ("2029-12-31T23:59:59Z", StatusCode::CREATED),
        ] {
            let show_id = app.create_show(&admin, holder, json!({ "entryDeadline": deadline })).await;
            let division_id = app.create_division(&admin, show_id, "Halter", 1).await;
            let class_id = app.create_class(&admin, show_id, division_id, json!(null)).await;
            let (status, body) = app
                .post("/api/entries", &alice, json!({ "entryNumber": 1, "userModelObjectId": horse, "showClassId": class_id }))
                .await;
            assert_eq!(status, expected, "deadline {}: {}", deadline, body);
        }
    }

    #[tokio::test]
    async fn test_concurrent_entries_respect_capacity() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (_, class_id) = app.open_class(&admin, json!(2)).await;

        let mut riders = Vec::new();
        for i in 0..4 {
            let (_, token) = app.register(&format!("rider{}@showring.test", i)).await;
            let horse = app.create_horse(&token, &format!("Horse {}", i)).await;
            riders.push((token, horse));
        }

        let attempts = riders.iter().enumerate().map(|(i, (token, horse))| {
            app.post(
                "/api/entries",
                token,
                json!({ "entryNumber": i, "userModelObjectId": horse, "showClassId": class_id }),
            )
        });
        let statuses: Vec<StatusCode> = futures::future::join_all(attempts)
            .await
            .into_iter()
            .map(|(status, _)| status)
            .collect();

        assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 2);
        assert_eq!(statuses.iter().filter(|s| **s == StatusCode::BAD_REQUEST).count(), 2);

        let (_, entries) = app.get(&format!("/api/entries?showClassId={}", class_id), &admin).await;
        assert_eq!(entries.as_array().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_list_requires_a_filter() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (status, _) = app.get("/api/entries", &admin).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, entries) = app.get("/api/entries?showClassId=nope", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(entries, json!([]));
    }
}

mod result_tests {
    use super::*;

    #[tokio::test]
    async fn test_judge_records_one_result_per_entry() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (_, class_id) = app.open_class(&admin, json!(null)).await;

        let (_, rider) = app.register("rider@showring.test").await;
        let horse = app.create_horse(&rider, "Desert Wind").await;
        let (_, entry) = app
            .post(
                "/api/entries",
                &rider,
                json!({ "entryNumber": 1, "userModelObjectId": horse, "showClassId": class_id }),
            )
            .await;
        let entry_id = entry["id"].as_i64().unwrap();

        let result = json!({ "placement": 1, "comments": "Lovely conformation", "entryId": entry_id });
        let (status, _) = app.post("/api/results", &rider, result.clone()).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (judge_id, _) = app.register("judge@showring.test").await;
        app.grant(&admin, &judge_id, "Judge").await;
        let judge = app.login("judge@showring.test", PASSWORD).await["accessToken"]
            .as_str()
            .unwrap()
            .to_string();

        let (status, created) = app.post("/api/results", &judge, result.clone()).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(created["placement"], 1);

        let (status, _) = app.post("/api/results", &judge, result).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, found) = app.get(&format!("/api/results/entry/{}", entry_id), &rider).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found["id"], created["id"]);

        let (_, entry) = app.get(&format!("/api/entries/{}", entry_id), &rider).await;
        assert_eq!(entry["result"]["placement"], 1);
    }

    async fn judged_entry(app: &TestApp) -> (String, i64, i64) {
        let admin = app.admin_token().await;
        let (_, class_id) = app.open_class(&admin, json!(null)).await;
        let (_, rider) = app.register("rider@showring.test").await;
        let horse = app.create_horse(&rider, "Desert Wind").await;
        let (_, entry) = app
            .post("/api/entries", &rider, json!({ "entryNumber": 1, "userModelObjectId": horse, "showClassId": class_id }))
            .await;
        (admin, class_id, entry["id"].as_i64().unwrap())
    }

    #[tokio::test]
    async fn test_concurrent_results_keep_one_per_entry() {
        let app = TestApp::new().await;
        let (admin, class_id, entry_id) = judged_entry(&app).await;

        let attempts = (1..=4).map(|placement| {
            app.post("/api/results", &admin, json!({ "placement": placement, "entryId": entry_id }))
        });
        let statuses: Vec<StatusCode> = futures::future::join_all(attempts)
            .await
            .into_iter()
            .map(|(status, _)| status)
            .collect();

        assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CREATED).count(), 1);
        assert_eq!(statuses.iter().filter(|s| **s == StatusCode::CONFLICT).count(), 3);

        let (_, entries) = app.get(&format!("/api/entries?showClassId={}", class_id), &admin).await;
        let entries = entries.as_array().unwrap();
        assert_eq!(entries.len(), 1);
        assert!(entries[0]["result"]["placement"].is_i64());
    }

    #[tokio::test]
    async fn test_result_can_be_recorded_after_delete() {
        let app = TestApp::new().await;
        let (admin, class_id, entry_id) = judged_entry(&app).await;

        let (status, first) = app
            .post("/api/results", &admin, json!({ "placement": 3, "entryId": entry_id }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        let status = app.delete(&format!("/api/results/{}", first["id"]), &admin).await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, second) = app
            .post("/api/results", &admin, json!({ "placement": 1, "entryId": entry_id }))
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_ne!(second["id"], first["id"]);

        let (status, _) = app
            .post("/api/results", &admin, json!({ "placement": 2, "entryId": entry_id }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (_, found) = app.get(&format!("/api/results/entry/{}", entry_id), &admin).await;
        assert_eq!(found["placement"], 1);

        let (_, entries) = app.get(&format!("/api/entries?showClassId={}", class_id), &admin).await;
        assert_eq!(entries.as_array().unwrap().len(), 1);
        assert_eq!(entries[0]["result"]["placement"], 1);
    }

    #[tokio::test]
    async fn test_result_for_missing_entry_is_rejected() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (status, _) = app
            .post("/api/results", &admin, json!({ "placement": 2, "entryId": 77 }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }
}

mod user_model_object_tests {
    use super::*;

    #[tokio::test]
    async fn test_owner_listing_and_protection() {
        let app = TestApp::new().await;
        let (alice_id, alice) = app.register("alice@showring.test").await;
        let (_, bob) = app.register("bob@showring.test").await;
        let horse = app.create_horse(&alice, "Desert Wind").await;

        let (status, _) = app.get("/api/userModelObjects", &alice).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, horses) = app
            .get(&format!("/api/userModelObjects?applicationUserId={}", alice_id), &alice)
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(horses[0]["applicationUserId"], alice_id.as_str());

        let (status, _) = app
            .put(
                &format!("/api/userModelObjects/{}", horse),
                &bob,
                json!({ "name": "Stolen" }),
            )
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        assert_eq!(
            app.delete(&format!("/api/userModelObjects/{}", horse), &bob).await,
            StatusCode::FORBIDDEN
        );
        assert_eq!(
            app.delete(&format!("/api/userModelObjects/{}", horse), &alice).await,
            StatusCode::NO_CONTENT
        );
    }

    #[tokio::test]
    async fn test_hero_shot_must_be_base64() {
        let app = TestApp::new().await;
        let (_, token) = app.register("alice@showring.test").await;

        let (status, _) = app
            .post(
                "/api/userModelObjects",
                &token,
                json!({ "name": "Blurry", "heroShotImage": "%%%not base64%%%" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, horse) = app
            .post(
                "/api/userModelObjects",
                &token,
                json!({ "name": "Sharp", "heroShotImage": "aGVsbG8=" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(horse["heroShotImage"], "aGVsbG8=");
    }
}

mod admin_tests {
    use super::*;

    #[tokio::test]
    async fn test_role_administration() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (_, rider) = app.register("rider@showring.test").await;

        let (status, _) = app.get("/api/roles", &rider).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, roles) = app.get("/api/roles", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(roles.as_array().unwrap().len(), 6);

        let (status, _) = app.post("/api/roles?name=Steward", &admin, json!({})).await;
        assert_eq!(status, StatusCode::CREATED);
        let (status, _) = app.post("/api/roles?name=Steward", &admin, json!({})).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, count) = app.get("/api/roles/User/count", &admin).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(count["count"], 2);

        assert_eq!(app.delete("/api/roles/Steward", &admin).await, StatusCode::NO_CONTENT);
        assert_eq!(app.delete("/api/roles/Steward", &admin).await, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_user_role_membership() {
        let app = TestApp::new().await;
        let admin = app.admin_token().await;
        let (rider_id, rider) = app.register("rider@showring.test").await;
        let (other_id, _) = app.register("other@showring.test").await;

        let (status, roles) = app.get(&format!("/api/users/{}/roles", rider_id), &rider).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(roles, json!(["User"]));

        let (status, _) = app.get(&format!("/api/users/{}/roles", other_id), &rider).await;
        assert_eq!(status, StatusCode::FORBIDDEN);

        let (status, _) = app
            .post(&format!("/api/users/{}/roles?role=Wizard", rider_id), &admin, json!({}))
            .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        app.grant(&admin, &rider_id, "Judge").await;
        // roles are resolved per request, so the old token already carries Judge
        let (_, me) = app.get("/identity/me", &rider).await;
        assert!(me["roles"].as_array().unwrap().iter().any(|r| r == "Judge"));

        assert_eq!(
            app.delete(&format!("/api/users/{}/roles/Judge", rider_id), &admin).await,
            StatusCode::NO_CONTENT
        );
        assert_eq!(
            app.delete(&format!("/api/users/{}/roles/Judge", rider_id), &admin).await,
            StatusCode::NOT_FOUND
        );

        let (status, user) = app.get("/api/users/by-email/rider@showring.test", &rider).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(user["id"], rider_id.as_str());
    }
}
