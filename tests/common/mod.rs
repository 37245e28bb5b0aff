#![allow(dead_code)]

use axum::body::Body;
use http_body_util::BodyExt;
use serde_json::Value;
use sqlx::SqlitePool;
use taskscope::app::db::{
    self, access_scopes::NewAccessScope, companies::NewCompany, organizations::NewOrganization,
    NewUser,
};
use taskscope::app::domain::{CompanyId, Email, OrgRole, OrganizationId, UserId};
use taskscope::create_router;
use tower::ServiceExt;

pub async fn test_pool() -> SqlitePool {
    let pool = SqlitePool::connect("sqlite::memory:").await.unwrap();
    sqlx::migrate!("./migrations").run(&pool).await.unwrap();
    pool
}

pub fn test_router(pool: SqlitePool) -> axum::Router {
    create_router(pool)
}

/// Insert a company directly (bypasses the API).
pub async fn create_company(pool: &SqlitePool, name: &str) -> CompanyId {
    let id = CompanyId::new();
    db::companies::insert(pool, &NewCompany { id, name: name.to_string() })
        .await
        .unwrap();
    id
}

/// Insert an organization directly, computing its level from the parent.
pub async fn create_org(
    pool: &SqlitePool,
    company_id: CompanyId,
    parent: Option<OrganizationId>,
    code: &str,
) -> OrganizationId {
    let level = match parent {
        Some(parent) => {
            db::organizations::find_by_id(pool, &parent)
                .await
                .unwrap()
                .expect("parent exists")
                .level
                + 1
        }
        None => 1,
    };
    let id = OrganizationId::new();
    db::organizations::insert(
        pool,
        &NewOrganization {
            id,
            name: format!("Org {code}"),
            code: code.to_string(),
            company_id,
            parent_id: parent,
            level,
        },
    )
    .await
    .unwrap();
    id
}

/// Insert a user directly. The email is derived from the name.
pub async fn create_user(
    pool: &SqlitePool,
    name: &str,
    home: Option<OrganizationId>,
    is_superuser: bool,
) -> UserId {
    let id = UserId::new();
    db::users::insert(
        pool,
        &NewUser {
            id,
            name: name.to_string(),
            email: Email::new(format!("{}@example.com", name.to_lowercase())).unwrap(),
            organization_id: home,
            is_superuser,
        },
    )
    .await
    .unwrap();
    id
}

pub async fn grant_scope(pool: &SqlitePool, user_id: UserId, organization_id: OrganizationId, role: OrgRole) {
    db::access_scopes::insert(
        pool,
        &NewAccessScope {
            id: ulid::Ulid::new().to_string(),
            user_id,
            organization_id: Some(organization_id),
            role,
        },
    )
    .await
    .unwrap();
}

/// Send a JSON request as `user` and return the status and parsed body
/// (`Value::Null` for empty bodies).
pub async fn send(
    app: &axum::Router,
    method: &str,
    uri: &str,
    user: Option<UserId>,
    body: Option<Value>,
) -> (http::StatusCode, Value) {
    let mut builder = http::Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header("x-user-id", user.as_str());
    }
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

pub async fn get(app: &axum::Router, uri: &str, user: UserId) -> (http::StatusCode, Value) {
    send(app, "GET", uri, Some(user), None).await
}

pub async fn post(app: &axum::Router, uri: &str, user: UserId, body: Value) -> (http::StatusCode, Value) {
    send(app, "POST", uri, Some(user), Some(body)).await
}

pub async fn put(app: &axum::Router, uri: &str, user: UserId, body: Value) -> (http::StatusCode, Value) {
    send(app, "PUT", uri, Some(user), Some(body)).await
}

pub async fn patch(app: &axum::Router, uri: &str, user: UserId, body: Value) -> (http::StatusCode, Value) {
    send(app, "PATCH", uri, Some(user), Some(body)).await
}

pub async fn delete(app: &axum::Router, uri: &str, user: UserId) -> (http::StatusCode, Value) {
    send(app, "DELETE", uri, Some(user), None).await
}

/// Ask the authorize endpoint about an organization.
pub async fn may_org(app: &axum::Router, user: UserId, org: OrganizationId, required: &str) -> bool {
    let (status, body) = post(
        app,
        "/api/authorize",
        user,
        serde_json::json!({ "kind": "organization", "id": org.as_str(), "required": required }),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK, "{body}");
    body["allowed"].as_bool().unwrap()
}

/// Ask the authorize endpoint about a task.
pub async fn may_task(app: &axum::Router, user: UserId, task_id: &str, required: &str) -> bool {
    let (status, body) = post(
        app,
        "/api/authorize",
        user,
        serde_json::json!({ "kind": "task", "id": task_id, "required": required }),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK, "{body}");
    body["allowed"].as_bool().unwrap()
}

/// Create a task through the API as `user` and return its id.
pub async fn create_task(app: &axum::Router, user: UserId, title: &str) -> String {
    let (status, body) = post(app, "/api/tasks", user, serde_json::json!({ "title": title })).await;
    assert_eq!(status, http::StatusCode::CREATED, "{body}");
    body["id"].as_str().unwrap().to_string()
}
