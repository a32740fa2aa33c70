use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use dosetrack_api::{AppStateInner, router};
use dosetrack_db::Database;
use dosetrack_notify::{Transport, TransportError};

/// Records every message; addresses in `failing` are rejected.
#[derive(Default)]
struct Recorder {
    failing: HashSet<String>,
    sent: Mutex<Vec<(String, String)>>,
}

#[async_trait]
impl Transport for Recorder {
    async fn send(&self, recipient: &str, message: &str) -> Result<(), TransportError> {
        self.sent
            .lock()
            .unwrap()
            .push((recipient.to_string(), message.to_string()));
        if self.failing.contains(recipient) {
            return Err(TransportError::new("carrier rejected"));
        }
        Ok(())
    }
}

struct TestApp {
    router: Router,
    recorder: Arc<Recorder>,
}

impl TestApp {
    fn new() -> Self {
        Self::with_recorder(Recorder::default())
    }

    fn with_recorder(recorder: Recorder) -> Self {
        let recorder = Arc::new(recorder);
        let transport: Arc<dyn Transport> = recorder.clone();
        let state = Arc::new(AppStateInner {
            db: Database::open_in_memory().unwrap(),
            jwt_secret: "test-secret".into(),
            token_days: 1,
            transport,
        });
        Self {
            router: router(state),
            recorder,
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
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let req = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let resp = self.router.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, json)
    }

    async fn register(&self, username: &str) -> String {
        let (status, body) = self
            .call(
                Method::POST,
                "/auth/register",
                None,
                Some(json!({ "username": username, "password": "password123" })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body["token"].as_str().unwrap().to_string()
    }

    async fn create(&self, token: &str, uri: &str, body: Value) -> i64 {
        let (status, resp) = self.call(Method::POST, uri, Some(token), Some(body)).await;
        assert_eq!(status, StatusCode::CREATED, "POST {} -> {}", uri, resp);
        resp["id"].as_i64().unwrap()
    }
}

struct Ids {
    drug: i64,
    method: i64,
    experience: i64,
    consumption: i64,
}

async fn seed(app: &TestApp, token: &str) -> Ids {
    let drug = app
        .create(
            token,
            "/drugs",
            json!({
                "name": "Phenylpiracetam",
                "unit": "mg",
                "notes": "Phenylpiracetam is a phenylated analog of the drug piracetam.",
                "classification": "AMPA modulator",
                "family": "*racetam",
                "rarity": "Common"
            }),
        )
        .await;
    let method = app
        .create(token, "/methods", json!({ "name": "Oral", "icon": "iVBORw0KGgo=" }))
        .await;
    let experience = app
        .create(token, "/experiences", json!({ "title": "My Title", "date": 1445543583 }))
        .await;
    let consumption = app
        .create(
            token,
            "/consumptions",
            json!({
                "count": 2,
                "date": 1445648036,
                "location": "San Juan",
                "drug_id": drug,
                "method_id": method,
                "experience_id": experience
            }),
        )
        .await;
    Ids {
        drug,
        method,
        experience,
        consumption,
    }
}

#[tokio::test]
async fn experience_scenario_and_method_delete_protection() {
    let app = TestApp::new();
    let token = app.register("alice").await;
    let ids = seed(&app, &token).await;

    let (status, exp) = app
        .call(Method::GET, &format!("/experiences/{}", ids.experience), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(exp["title"], "My Title");
    assert_eq!(exp["date"], 1445543583);

    let consumptions = exp["consumptions"].as_array().unwrap();
    assert_eq!(consumptions.len(), 1);
    let c = &consumptions[0];
    assert_eq!(c["id"], ids.consumption);
    assert_eq!(c["count"], 2);
    assert_eq!(c["location"], "San Juan");
    assert_eq!(
        c["drug"],
        json!({ "id": ids.drug, "name": "Phenylpiracetam", "unit": "mg" })
    );
    assert_eq!(c["method"], json!({ "id": ids.method, "name": "Oral" }));
    assert_eq!(c["friends"], json!([]));

    let (status, body) = app
        .call(Method::DELETE, &format!("/methods/{}", ids.method), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let blocking = body["blocking"].as_array().unwrap();
    assert_eq!(blocking.len(), 1);
    assert_eq!(blocking[0]["id"], ids.consumption);
    assert_eq!(blocking[0]["method_id"], ids.method);

    let (status, _) = app
        .call(Method::DELETE, &format!("/consumptions/{}", ids.consumption), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = app
        .call(Method::DELETE, &format!("/methods/{}", ids.method), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

#[tokio::test]
async fn other_owners_only_ever_see_not_found() {
    let app = TestApp::new();
    let alice = app.register("alice").await;
    let bob = app.register("bob").await;
    let ids = seed(&app, &alice).await;

    for uri in [
        format!("/drugs/{}", ids.drug),
        format!("/methods/{}", ids.method),
        format!("/experiences/{}", ids.experience),
        format!("/consumptions/{}", ids.consumption),
        format!("/consumptions/{}/friends", ids.consumption),
    ] {
        let (status, body) = app.call(Method::GET, &uri, Some(&bob), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "GET {}", uri);
        assert_eq!(body, json!({ "error": "not found" }));
    }

    let (status, _) = app
        .call(
            Method::PUT,
            &format!("/drugs/{}", ids.drug),
            Some(&bob),
            Some(json!({ "name": "Stolen" })),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app
        .call(Method::DELETE, &format!("/drugs/{}", ids.drug), Some(&bob), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, drugs) = app.call(Method::GET, "/drugs", Some(&bob), None).await;
    assert_eq!(drugs, json!([]));

    let (_, drug) = app
        .call(Method::GET, &format!("/drugs/{}", ids.drug), Some(&alice), None)
        .await;
    assert_eq!(drug["name"], "Phenylpiracetam");
}

#[tokio::test]
async fn update_with_forbidden_field_changes_nothing() {
    let app = TestApp::new();
    let token = app.register("alice").await;
    let ids = seed(&app, &token).await;

    let (status, body) = app
        .call(
            Method::PUT,
            &format!("/drugs/{}", ids.drug),
            Some(&token),
            Some(json!({ "name": "Renamed", "owner_id": 2 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation");
    assert_eq!(body["fields"][0]["field"], "owner_id");

    let (_, drug) = app
        .call(Method::GET, &format!("/drugs/{}", ids.drug), Some(&token), None)
        .await;
    assert_eq!(drug["name"], "Phenylpiracetam");
}

#[tokio::test]
async fn drug_list_counts_uses() {
    let app = TestApp::new();
    let token = app.register("alice").await;
    let ids = seed(&app, &token).await;
    let second = app
        .create(
            &token,
            "/consumptions",
            json!({
                "count": 1,
                "date": "1445700000",
                "location": "Ponce",
                "drug_id": ids.drug,
                "method_id": ids.method,
                "experience_id": ids.experience
            }),
        )
        .await;

    let (_, drugs) = app.call(Method::GET, "/drugs", Some(&token), None).await;
    assert_eq!(drugs[0]["use_count"], 2);
    assert_eq!(drugs[0]["name"], "Phenylpiracetam");

    app.call(Method::DELETE, &format!("/consumptions/{}", second), Some(&token), None)
        .await;
    let (_, drugs) = app.call(Method::GET, "/drugs", Some(&token), None).await;
    assert_eq!(drugs[0]["use_count"], 1);

    let (_, locations) = app
        .call(Method::GET, "/consumptions/locations", Some(&token), None)
        .await;
    assert_eq!(locations, json!([{ "location": "San Juan", "count": 1 }]));
}

#[tokio::test]
async fn non_numeric_timestamp_is_rejected() {
    let app = TestApp::new();
    let token = app.register("alice").await;

    let (status, body) = app
        .call(
            Method::POST,
            "/experiences",
            Some(&token),
            Some(json!({ "title": "t", "date": "soon" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "date");

    let (status, _) = app
        .call(Method::POST, "/experiences", Some(&token), Some(json!([1, 2])))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn non_numeric_path_id_is_a_json_validation_error() {
    let app = TestApp::new();
    let token = app.register("alice").await;

    for uri in ["/drugs/abc", "/consumptions/1.5/friends", "/methods/%20"] {
        let (status, body) = app.call(Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "GET {}", uri);
        assert_eq!(body["error"], "validation");
        assert_eq!(body["fields"][0]["field"], "id");
    }

    let (status, body) = app
        .call(Method::DELETE, "/experiences/x", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["fields"][0]["field"], "id");
}

#[tokio::test]
async fn emergency_without_contacts_sends_nothing() {
    let app = TestApp::new();
    let token = app.register("alice").await;

    let (status, body) = app.call(Method::POST, "/emergency", Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "no contacts");
    assert!(app.recorder.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn emergency_reports_one_failure_after_all_sends() {
    let app = TestApp::with_recorder(Recorder {
        failing: ["+15550002".to_string()].into_iter().collect(),
        ..Default::default()
    });
    let token = app.register("alice").await;
    let (status, _) = app
        .call(
            Method::PUT,
            "/me",
            Some(&token),
            Some(json!({ "emergency_contacts": "+15550001,+15550002,+15550003" })),
        )
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .call(Method::POST, "/emergency", Some(&token), Some(json!({ "message": "help" })))
        .await;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["recipient"], "+15550002");

    let mut sent: Vec<String> = app
        .recorder
        .sent
        .lock()
        .unwrap()
        .iter()
        .map(|(to, _)| to.clone())
        .collect();
    sent.sort();
    assert_eq!(sent, vec!["+15550001", "+15550002", "+15550003"]);
}

#[tokio::test]
async fn emergency_default_message_names_the_user() {
    let app = TestApp::new();
    let token = app.register("alice").await;
    app.call(
        Method::PUT,
        "/me",
        Some(&token),
        Some(json!({ "emergency_contacts": " +15550001 ", "phone": "+15559999" })),
    )
    .await;

    let (status, body) = app.call(Method::POST, "/emergency", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notified"], 1);

    let sent = app.recorder.sent.lock().unwrap();
    assert_eq!(sent[0].0, "+15550001");
    assert!(sent[0].1.contains("alice"));
    assert!(sent[0].1.contains("+15559999"));
}

#[tokio::test]
async fn login_and_token_checks() {
    let app = TestApp::new();
    app.register("alice").await;

    let (status, _) = app.call(Method::GET, "/drugs", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app.call(Method::GET, "/drugs", Some("not-a-token"), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, wrong_body) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (unknown_status, unknown_body) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "nobody", "password": "wrong-password" })),
        )
        .await;
    assert_eq!(unknown_status, status);
    assert_eq!(unknown_body, wrong_body);

    let (status, body) = app
        .call(
            Method::POST,
            "/auth/login",
            None,
            Some(json!({ "username": "alice", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let token = body["token"].as_str().unwrap();

    let (status, me) = app.call(Method::GET, "/me", Some(token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(me["username"], "alice");
    assert!(me.get("password").is_none());

    let (status, _) = app
        .call(
            Method::POST,
            "/auth/register",
            None,
            Some(json!({ "username": "alice", "password": "password123" })),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn friends_show_up_in_consumption_view() {
    let app = TestApp::new();
    let token = app.register("alice").await;
    let ids = seed(&app, &token).await;

    let friend = app
        .create(
            &token,
            &format!("/consumptions/{}/friends", ids.consumption),
            json!({ "name": "Sam" }),
        )
        .await;

    let (_, view) = app
        .call(Method::GET, &format!("/consumptions/{}", ids.consumption), Some(&token), None)
        .await;
    assert_eq!(view["friends"][0]["id"], friend);
    assert_eq!(view["friends"][0]["name"], "Sam");

    let (status, _) = app
        .call(Method::DELETE, &format!("/friends/{}", friend), Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (_, view) = app
        .call(Method::GET, &format!("/consumptions/{}", ids.consumption), Some(&token), None)
        .await;
    assert_eq!(view["friends"], json!([]));
}
