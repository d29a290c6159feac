use chrono::{Duration as ChronoDuration, Utc};
use jsonwebtoken::{Algorithm, EncodingKey, Header};
use npi_api::app::{AppServices, build_app};
use npi_auth::{JwtClaims, PrincipalId};
use npi_client::HttpReviewClient;
use npi_inventory::{QueueProgress, ReviewSession};
use reqwest::StatusCode;
use serde_json::{Value, json};

const SECRET: &str = "test-secret";

struct TestServer {
    base_url: String,
    handle: tokio::task::JoinHandle<()>,
}

impl TestServer {
    async fn spawn(jwt_secret: &str) -> Self {
        // Same router as prod over the seeded in-memory store, on an ephemeral port.
        let app = build_app(jwt_secret.to_string(), AppServices::in_memory());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind ephemeral port");
        let addr = listener.local_addr().unwrap();
        let base_url = format!("http://{}", addr);

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self { base_url, handle }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

fn mint_jwt(jwt_secret: &str, sub: PrincipalId) -> String {
    let now = Utc::now();
    let claims = JwtClaims {
        sub,
        email: Some("counter@example.com".to_string()),
        issued_at: now,
        expires_at: now + ChronoDuration::minutes(10),
    };

    jsonwebtoken::encode(
        &Header::new(Algorithm::HS256),
        &claims,
        &EncodingKey::from_secret(jwt_secret.as_bytes()),
    )
    .expect("failed to encode jwt")
}

async fn get_json(client: &reqwest::Client, url: String, token: &str) -> Value {
    let res = client.get(url).bearer_auth(token).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    res.json().await.unwrap()
}

/// Id of the named row in a `/categories` or `/locations` listing.
fn id_named(rows: &Value, name: &str) -> String {
    rows.as_array()
        .unwrap()
        .iter()
        .find(|r| r["name"] == name)
        .and_then(|r| r["id"].as_str())
        .unwrap_or_else(|| panic!("no row named {name}"))
        .to_string()
}

async fn create_item(
    client: &reqwest::Client,
    srv: &TestServer,
    token: &str,
    body: Value,
) -> Value {
    let res = client
        .post(srv.url("/inventory/items"))
        .bearer_auth(token)
        .json(&body)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::CREATED);
    res.json().await.unwrap()
}

#[tokio::test]
async fn auth_required_for_protected_endpoints() {
    let srv = TestServer::spawn(SECRET).await;
    let client = reqwest::Client::new();

    let res = client.get(srv.url("/health")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let res = client.get(srv.url("/whoami")).send().await.unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);

    let forged = mint_jwt("some-other-secret", PrincipalId::new());
    let res = client
        .get(srv.url("/review"))
        .bearer_auth(forged)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn principal_is_derived_from_token() {
    let srv = TestServer::spawn(SECRET).await;
    let sub = PrincipalId::new();
    let token = mint_jwt(SECRET, sub);

    let body = get_json(&reqwest::Client::new(), srv.url("/whoami"), &token).await;
    assert_eq!(body["principal_id"].as_str().unwrap(), sub.to_string());
    assert_eq!(body["email"], "counter@example.com");
}

#[tokio::test]
async fn inventory_lifecycle_create_restock_adjust_delete() {
    let srv = TestServer::spawn(SECRET).await;
    let token = mint_jwt(SECRET, PrincipalId::new());
    let client = reqwest::Client::new();

    let categories = get_json(&client, srv.url("/categories"), &token).await;
    let locations = get_json(&client, srv.url("/locations"), &token).await;
    let packaging = id_named(&categories, "Packaging");
    let office = id_named(&locations, "Office");

    let created = create_item(
        &client,
        &srv,
        &token,
        json!({
            "name": "Jar Lids",
            "category_id": packaging,
            "location_id": office,
            "uom": "ea",
            "unit_cost": 0.5,
            "desired_count": 100.0,
            "count": 10.0,
        }),
    )
    .await;
    assert_eq!(created["status"], "critical");
    assert_eq!(created["category"], "Packaging");
    let id = created["id"].as_str().unwrap().to_string();

    let res = client
        .post(srv.url(&format!("/inventory/items/{id}/restock")))
        .bearer_auth(&token)
        .json(&json!({ "quantity": 30.0, "notes": "pallet" }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);
    let restocked: Value = res.json().await.unwrap();
    assert_eq!(restocked["count"], 40.0);
    assert_eq!(restocked["status"], "warning");

    let res = client
        .post(srv.url(&format!("/inventory/items/{id}/adjust")))
        .bearer_auth(&token)
        .json(&json!({ "new_count": 75.0 }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::OK);

    let movements = get_json(&client, srv.url(&format!("/inventory/items/{id}/movements")), &token).await;
    let kinds: Vec<&str> = movements
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["movement_type"].as_str().unwrap())
        .collect();
    assert_eq!(kinds, vec!["adjustment", "restock", "initial"]);
    assert_eq!(movements[0]["quantity_delta"], 35.0);

    let healthy = get_json(&client, srv.url("/inventory/items?status=healthy&search=jar"), &token).await;
    assert_eq!(healthy.as_array().unwrap().len(), 1);

    let stats = get_json(&client, srv.url("/inventory/stats"), &token).await;
    assert_eq!(stats["total"], 1);
    assert_eq!(stats["healthy"], 1);

    let res = client
        .delete(srv.url(&format!("/inventory/items/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NO_CONTENT);

    let listed = get_json(&client, srv.url("/inventory/items"), &token).await;
    assert!(listed.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn invalid_requests_are_rejected() {
    let srv = TestServer::spawn(SECRET).await;
    let token = mint_jwt(SECRET, PrincipalId::new());
    let client = reqwest::Client::new();

    let res = client
        .get(srv.url("/inventory/items/not-a-uuid"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);

    let res = client
        .get(srv.url(&format!("/inventory/items/{}", uuid::Uuid::now_v7())))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);

    let categories = get_json(&client, srv.url("/categories"), &token).await;
    let locations = get_json(&client, srv.url("/locations"), &token).await;
    let res = client
        .post(srv.url("/inventory/items"))
        .bearer_auth(&token)
        .json(&json!({
            "name": "Broken",
            "category_id": id_named(&categories, "Labels"),
            "location_id": id_named(&locations, "Office"),
            "uom": "ea",
            "unit_cost": 1.0,
            "count": -1.0,
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "validation_error");
}

#[tokio::test]
async fn malformed_review_bodies_are_bad_requests() {
    let srv = TestServer::spawn(SECRET).await;
    let token = mint_jwt(SECRET, PrincipalId::new());
    let client = reqwest::Client::new();

    let cases = [
        (json!({ "action": "complete" }), "Missing itemId or action"),
        (json!({ "itemId": uuid::Uuid::now_v7().to_string() }), "Missing itemId or action"),
        (
            json!({ "itemId": uuid::Uuid::now_v7().to_string(), "action": "approve" }),
            "Invalid action",
        ),
    ];
    for (body, message) in cases {
        let res = client
            .patch(srv.url("/review"))
            .bearer_auth(&token)
            .json(&body)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        let err: Value = res.json().await.unwrap();
        assert_eq!(err["message"], message);
    }

    let res = client
        .patch(srv.url("/review"))
        .bearer_auth(&token)
        .header("content-type", "application/json")
        .body("{not json")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn review_session_walks_the_queue_over_http() {
    let srv = TestServer::spawn(SECRET).await;
    let token = mint_jwt(SECRET, PrincipalId::new());
    let client = reqwest::Client::new();

    let categories = get_json(&client, srv.url("/categories"), &token).await;
    let locations = get_json(&client, srv.url("/locations"), &token).await;
    let labels = id_named(&categories, "Labels");
    let office = id_named(&locations, "Office");

    let mut ids = Vec::new();
    for name in ["Beta Label", "Alpha Label"] {
        let created = create_item(
            &client,
            &srv,
            &token,
            json!({
                "name": name,
                "category_id": labels,
                "location_id": office,
                "uom": "roll",
                "unit_cost": 2.0,
                "count": 4.0,
                "needs_review": true,
                "review_source": "audit",
            }),
        )
        .await;
        ids.push(created["id"].as_str().unwrap().to_string());
    }
    let alpha_id = ids[1].clone();

    let review = HttpReviewClient::new(srv.base_url.clone(), token.clone());
    let mut session = ReviewSession::start(review).await.unwrap();
    assert_eq!(session.queue().len(), 2);
    assert_eq!(session.current().unwrap().name, "Alpha Label");

    session.draft_mut().unwrap().count = 9.0;
    let progress = session.complete().await.unwrap();
    assert_eq!(progress, QueueProgress::Continue { position: 0, remaining: 1 });
    assert_eq!(session.current().unwrap().name, "Beta Label");

    assert_eq!(session.archive().await.unwrap(), QueueProgress::Finished);

    let queue = get_json(&client, srv.url("/review"), &token).await;
    assert!(queue.as_array().unwrap().is_empty());

    let alpha = get_json(&client, srv.url(&format!("/inventory/items/{alpha_id}")), &token).await;
    assert_eq!(alpha["count"], 9.0);
    assert_eq!(alpha["needs_review"], false);
    assert!(alpha["reviewed_by"].is_string());

    let listed = get_json(&client, srv.url("/inventory/items"), &token).await;
    let names: Vec<&str> = listed
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Alpha Label"]);
}
