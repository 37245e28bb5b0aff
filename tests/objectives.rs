use serde_json::json;

mod common;

use crate::common::*;

#[tokio::test]
async fn objectives_follow_task_levels() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let company = create_company(&pool, "Acme").await;
    let a = create_org(&pool, company, None, "A").await;
    let owner = create_user(&pool, "Owner", Some(a), false).await;
    let viewer = create_user(&pool, "Viewer", Some(a), false).await;
    let task = create_task(&app, owner, "Roadmap").await;
    put(
        &app,
        &format!("/api/tasks/{task}/grants"),
        owner,
        json!({ "users": [{ "user_id": viewer.as_str(), "level": "view" }] }),
    )
    .await;

    let uri = format!("/api/tasks/{task}/objectives");
    let (status, _) = post(&app, &uri, viewer, json!({ "title": "Sneaky" })).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);

    let (status, first) = post(&app, &uri, owner, json!({ "title": "Design" })).await;
    assert_eq!(status, http::StatusCode::CREATED, "{first}");
    assert_eq!(first["display_order"], 0);
    let (_, second) = post(&app, &uri, owner, json!({ "title": "Build", "due_date": "2026-06-30" })).await;
    assert_eq!(second["display_order"], 1);

    let (status, list) = get(&app, &uri, viewer).await;
    assert_eq!(status, http::StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn deleting_an_objective_renumbers_the_rest() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let company = create_company(&pool, "Acme").await;
    let a = create_org(&pool, company, None, "A").await;
    let owner = create_user(&pool, "Owner", Some(a), false).await;
    let task = create_task(&app, owner, "Roadmap").await;
    let uri = format!("/api/tasks/{task}/objectives");

    let mut ids = Vec::new();
    for title in ["One", "Two", "Three"] {
        let (_, body) = post(&app, &uri, owner, json!({ "title": title })).await;
        ids.push(body["id"].as_str().unwrap().to_string());
    }

    let (status, _) = delete(&app, &format!("/api/objectives/{}", ids[0]), owner).await;
    assert_eq!(status, http::StatusCode::NO_CONTENT);

    let (_, list) = get(&app, &uri, owner).await;
    let orders: Vec<(String, i64)> = list
        .as_array()
        .unwrap()
        .iter()
        .map(|o| (o["id"].as_str().unwrap().to_string(), o["display_order"].as_i64().unwrap()))
        .collect();
    assert_eq!(orders, vec![(ids[1].clone(), 0), (ids[2].clone(), 1)]);
}

#[tokio::test]
async fn reorder_rejects_unknown_objectives() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let company = create_company(&pool, "Acme").await;
    let a = create_org(&pool, company, None, "A").await;
    let owner = create_user(&pool, "Owner", Some(a), false).await;
    let task = create_task(&app, owner, "Roadmap").await;
    let uri = format!("/api/tasks/{task}/objectives");

    let (_, one) = post(&app, &uri, owner, json!({ "title": "One" })).await;
    let (_, two) = post(&app, &uri, owner, json!({ "title": "Two" })).await;

    let (status, list) = put(
        &app,
        &format!("{uri}/order"),
        owner,
        json!({ "objective_ids": [two["id"], one["id"]] }),
    )
    .await;
    assert_eq!(status, http::StatusCode::OK, "{list}");
    assert_eq!(list[0]["id"], two["id"]);
    assert_eq!(list[1]["id"], one["id"]);

    let (status, _) = put(
        &app,
        &format!("{uri}/order"),
        owner,
        json!({ "objective_ids": ["01HZZZZZZZZZZZZZZZZZZZZZZZ"] }),
    )
    .await;
    assert_eq!(status, http::StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn assignee_may_report_progress_without_edit() {
    let pool = test_pool().await;
    let app = test_router(pool.clone());
    let company = create_company(&pool, "Acme").await;
    let a = create_org(&pool, company, None, "A").await;
    let owner = create_user(&pool, "Owner", Some(a), false).await;
    let assignee = create_user(&pool, "Assignee", Some(a), false).await;
    let outsider = create_user(&pool, "Outsider", Some(a), false).await;
    let task = create_task(&app, owner, "Roadmap").await;
    put(
        &app,
        &format!("/api/tasks/{task}/grants"),
        owner,
        json!({ "users": [
            { "user_id": assignee.as_str(), "level": "view" },
            { "user_id": outsider.as_str(), "level": "view" }
        ] }),
    )
    .await;

    let (_, objective) = post(
        &app,
        &format!("/api/tasks/{task}/objectives"),
        owner,
        json!({ "title": "Ship", "assigned_user_id": assignee.as_str() }),
    )
    .await;
    let progress_uri = format!("/api/objectives/{}/progress", objective["id"].as_str().unwrap());

    let (status, _) = post(
        &app,
        &progress_uri,
        outsider,
        json!({ "status": "in_progress", "detail": "Not mine" }),
    )
    .await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);

    let (status, note) = post(
        &app,
        &progress_uri,
        assignee,
        json!({ "status": "in_progress", "detail": "Halfway", "report_date": "2026-03-01" }),
    )
    .await;
    assert_eq!(status, http::StatusCode::CREATED, "{note}");
    post(
        &app,
        &progress_uri,
        assignee,
        json!({ "status": "completed", "detail": "Done", "report_date": "2026-03-05" }),
    )
    .await;

    let (_, latest) = get(&app, &format!("{progress_uri}/latest"), outsider).await;
    assert_eq!(latest["detail"], "Done");

    let (status, _) = delete(&app, &format!("/api/progress/{}", note["id"].as_str().unwrap()), assignee).await;
    assert_eq!(status, http::StatusCode::FORBIDDEN);
    let (status, _) = delete(&app, &format!("/api/progress/{}", note["id"].as_str().unwrap()), owner).await;
    assert_eq!(status, http::StatusCode::NO_CONTENT);

    let (_, list) = get(&app, &progress_uri, owner).await;
    assert_eq!(list.as_array().unwrap().len(), 1);
}
