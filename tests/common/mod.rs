#![allow(dead_code)]

use std::sync::Arc;

use anyhow::{Context, Result};
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Map, Value};
use tower::ServiceExt;
use uuid::Uuid;

use umc_records_api::auth::{generate_jwt, Claims};
use umc_records_api::config::AppConfig;
use umc_records_api::database::{MemoryStore, Store};
use umc_records_api::models::council::ROSTER;
use umc_records_api::types::{Collection, Role};
use umc_records_api::{app, AppState};

/// The router over a fresh in-memory store, with an admin token ready to use
pub struct TestApp {
    pub state: AppState,
    pub admin: String,
    router: Router,
}

pub struct Response {
    pub status: StatusCode,
    pub body: Value,
}

impl Response {
    pub fn data(&self) -> &Value {
        &self.body["data"]
    }

    pub fn id(&self) -> String {
        self.body["data"]["_id"].as_str().unwrap_or_default().to_string()
    }

    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or_default()
    }
}

/// One annual conference with a district and a church under it
pub struct Hierarchy {
    pub annual: String,
    pub district: String,
    pub church: String,
}

impl TestApp {
    pub async fn new() -> Result<Self> {
        let config = Arc::new(AppConfig::development());
        let store: Arc<dyn Store> = Arc::new(MemoryStore::new());
        let state = AppState::new(config, store);
        let router = app(state.clone());

        let mut test = Self { state, admin: String::new(), router };
        test.admin = test.token_for(Role::Admin, None).await?;
        Ok(test)
    }

    /// Store a user directly and mint a token for it
    pub async fn token_for(&self, role: Role, scope: Option<&str>) -> Result<String> {
        let id = Uuid::new_v4();
        let mut doc = Map::new();
        doc.insert("_id".into(), json!(id));
        doc.insert("username".into(), json!(format!("{}-{}", role, &id.to_string()[..8])));
        doc.insert("email".into(), json!(format!("{}@test.umc.ph", id)));
        doc.insert("role".into(), json!(role));
        let scope_id = match (role.scope_field(), scope) {
            (Some(field), Some(scope)) => {
                doc.insert(field.into(), json!(scope));
                Some(Uuid::parse_str(scope)?)
            }
            _ => None,
        };
        self.state.store.insert(Collection::Users, id, doc).await?;

        let claims = Claims::new(id, role, scope_id, 1);
        Ok(generate_jwt(&self.state.config.security, &claims)?)
    }

    pub async fn request(&self, method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Result<Response> {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(serde_json::to_vec(&body)?))?,
            None => builder.body(Body::empty())?,
        };

        let response = self.router.clone().oneshot(request).await.context("router failed")?;
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await?;
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).into()))
        };
        Ok(Response { status, body })
    }

    pub async fn get(&self, token: &str, uri: &str) -> Result<Response> {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, token: &str, uri: &str, body: Value) -> Result<Response> {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, token: &str, uri: &str, body: Value) -> Result<Response> {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, token: &str, uri: &str) -> Result<Response> {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// POST that must succeed; returns the new record's `_id`
    pub async fn create(&self, token: &str, uri: &str, body: Value) -> Result<String> {
        let res = self.post(token, uri, body).await?;
        anyhow::ensure!(
            res.status == StatusCode::CREATED,
            "POST {} returned {}: {}",
            uri,
            res.status,
            res.body
        );
        Ok(res.id())
    }

    pub async fn hierarchy(&self, name: &str) -> Result<Hierarchy> {
        let annual = self
            .create(&self.admin, "/annual", json!({"name": format!("{name} Annual"), "episcopalArea": "bea"}))
            .await?;
        let district = self
            .create(&self.admin, "/district", json!({"name": format!("{name} District"), "annualConference": annual}))
            .await?;
        let church = self
            .create(
                &self.admin,
                "/localChurch",
                json!({"name": format!("{name} Church"), "address": "Quezon City", "district": district}),
            )
            .await?;
        Ok(Hierarchy { annual, district, church })
    }

    pub async fn member(&self, token: &str, church: &str, first: &str, gender: &str) -> Result<String> {
        self.create(token, "/membership", member_body(church, first, gender, "1990-05-20")).await
    }

    pub async fn count(&self, collection: Collection) -> Result<u64> {
        Ok(self.state.store.count(collection, &Default::default()).await?)
    }
}

pub fn member_body(church: &str, first: &str, gender: &str, birthday: &str) -> Value {
    json!({
        "name": {"firstName": first, "lastName": "Santos"},
        "gender": gender,
        "civilStatus": "single",
        "birthday": birthday,
        "localChurch": church,
    })
}

/// Every roster slot filled from `members` in turn
pub fn council_body(church: &str, members: &[String], start: &str, end: &str) -> Value {
    let mut next = members.iter().cycle();
    let mut body = Map::new();
    body.insert("startYear".into(), json!(start));
    body.insert("endYear".into(), json!(end));
    body.insert("localChurch".into(), json!(church));
    for committee in ROSTER {
        let mut roles = Map::new();
        for slot in committee.slots {
            roles.insert(slot.to_string(), json!(next.next()));
        }
        for list in committee.lists {
            roles.insert(list.to_string(), json!([next.next()]));
        }
        body.insert(committee.name.to_string(), Value::Object(roles));
    }
    Value::Object(body)
}
