use serde_json::json;

mod common;

use crate::common::*;

#[tokio::test]
async fn only_superusers_manage_companies() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let company = create_company(&pool, "Acme").await;
    let hq = create_org(&pool, company, None, "HQ").await;
    let member = create_user(&pool, "Member", Some(hq), false).await;

    let (status, _) = post(&app, "/api/companies", member, json!({ "name": "Mine" })).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);
    let (status, _) = get(&app, "/api/companies", member).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn company_names_are_unique_among_live_companies() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let root = create_user(&pool, "Root", None, true).await;

    let (status, acme) = post(&app, "/api/companies", root, json!({ "name": "Acme" })).await;
    assert_eq!(status, http::StatusCode::CREATED, "{acme}");
    let (status, _) = post(&app, "/api/companies", root, json!({ "name": "Acme" })).await;
    assert_eq!(status, http::StatusCode::CONFLICT);
    let (status, _) = post(&app, "/api/companies", root, json!({ "name": "  " })).await;
    assert_eq!(status, http::StatusCode::BAD_REQUEST);

    let (status, _) = delete(&app, &format!("/api/companies/{}", acme["id"].as_str().unwrap()), root).await;
    assert_eq!(status, http::StatusCode::NO_CONTENT);
    let (status, _) = post(&app, "/api/companies", root, json!({ "name": "Acme" })).await;
    assert_eq!(status, http::StatusCode::CREATED);
}

#[tokio::test]
async fn deleting_a_company_hides_its_organizations_until_restored() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let company = create_company(&pool, "Acme").await;
    let hq = create_org(&pool, company, None, "HQ").await;
    let ops = create_org(&pool, company, Some(hq), "OPS").await;
    let root = create_user(&pool, "Root", None, true).await;
    let uri = format!("/api/companies/{company}");

    let (status, _) = delete(&app, &uri, root).await;
    assert_eq!(status, http::StatusCode::NO_CONTENT);

    let (status, _) = get(&app, &uri, root).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
    let (status, deleted) = get(&app, &format!("{uri}?include_deleted=true"), root).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(deleted["deleted"], true);
    let (status, _) = get(&app, &format!("/api/organizations/{ops}"), root).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);

    let (status, restored) = post(&app, &format!("{uri}/restore"), root, json!({})).await;
    assert_eq!(status, http::StatusCode::OK, "{restored}");
    assert_eq!(restored["deleted"], false);
    let (status, _) = get(&app, &format!("/api/organizations/{ops}"), root).await;
    assert_eq!(status, http::StatusCode::OK);
}

#[tokio::test]
async fn restore_leaves_separately_deleted_organizations_deleted() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let company = create_company(&pool, "Acme").await;
    let old = create_org(&pool, company, None, "OLD").await;
    let root = create_user(&pool, "Root", None, true).await;
    let uri = format!("/api/companies/{company}");

    let (status, _) = delete(&app, &format!("/api/organizations/{old}"), root).await;
    assert_eq!(status, http::StatusCode::NO_CONTENT);
    let (status, new) = post(
        &app,
        "/api/organizations",
        root,
        json!({ "name": "New", "code": "NEW", "company_id": company.as_str() }),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED, "{new}");

    let (status, _) = delete(&app, &uri, root).await;
    assert_eq!(status, http::StatusCode::NO_CONTENT);
    let (status, _) = post(&app, &format!("{uri}/restore"), root, json!({})).await;
    assert_eq!(status, http::StatusCode::OK);

    let (_, organizations) = get(&app, "/api/organizations", root).await;
    let roots: Vec<&str> = organizations
        .as_array()
        .unwrap()
        .iter()
        .filter(|org| org["parent_id"].is_null())
        .map(|org| org["code"].as_str().unwrap())
        .collect();
    assert_eq!(roots, vec!["NEW"]);
    let (status, _) = get(&app, &format!("/api/organizations/{old}"), root).await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn rename_keeps_names_unique() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    create_company(&pool, "Acme").await;
    let globex = create_company(&pool, "Globex").await;
    let root = create_user(&pool, "Root", None, true).await;
    let uri = format!("/api/companies/{globex}");

    let (status, _) = patch(&app, &uri, root, json!({ "name": "Acme" })).await;
    assert_eq!(status, http::StatusCode::CONFLICT);
    let (status, body) = patch(&app, &uri, root, json!({ "name": "Initech" })).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(body["name"], "Initech");
}
