mod common;

use axum::http::StatusCode;
use serde_json::json;

use common::*;

async fn create_billboard(app: &TestApp, cookie: &str, store_id: &str, label: &str) -> String {
    let response = app
        .send(multipart_request(
            "POST",
            &format!("/v1/stores/{store_id}/billboards"),
            cookie,
            &[
                Part::Text("label", label),
                Part::File("image", "banner.png", PNG_BYTES),
            ],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn store_lifecycle() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;

    let first = app.create_store(&cookie, "First").await;
    let second = app.create_store(&cookie, "Second").await;

    let response = app.get("/v1/me/stores/first", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["id"], first.as_str());

    let response = app.get("/v1/me/stores", Some(&cookie)).await;
    let stores = body_json(response).await;
    assert_eq!(stores.as_array().unwrap().len(), 2);
    assert_eq!(stores[1]["id"], second.as_str());

    let response = app
        .send(json_request(
            "PUT",
            &format!("/v1/stores/{second}"),
            Some(&cookie),
            json!({ "name": "Renamed" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["name"], "Renamed");

    let response = app.delete(&format!("/v1/stores/{second}"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = app.get(&format!("/v1/stores/{second}"), Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn first_store_is_not_found_without_stores() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;

    let response = app.get("/v1/me/stores/first", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn invalid_path_ids_are_bad_requests() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;

    let response = app.get("/v1/stores/not-a-uuid", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn billboard_in_foreign_store_is_forbidden() {
    let app = TestApp::new();
    let owner = app.verified_user("owner@example.com").await;
    let intruder = app.verified_user("intruder@example.com").await;
    let store_id = app.create_store(&owner, "Owner's").await;

    let response = app
        .send(multipart_request(
            "POST",
            &format!("/v1/stores/{store_id}/billboards"),
            &intruder,
            &[
                Part::Text("label", "Hijack"),
                Part::File("image", "banner.png", PNG_BYTES),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    assert_eq!(app.db.count("billboards").await, 0);
    assert_eq!(app.uploader.calls(), 0);
}

#[tokio::test]
async fn billboard_rejects_non_images() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;
    let store_id = app.create_store(&cookie, "Shop").await;

    let response = app
        .send(multipart_request(
            "POST",
            &format!("/v1/stores/{store_id}/billboards"),
            &cookie,
            &[
                Part::Text("label", "Summer"),
                Part::File("image", "notes.txt", b"just some text"),
            ],
        ))
        .await;

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(app.db.count("billboards").await, 0);
}

#[tokio::test]
async fn billboard_crud_and_cross_store_access() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;
    let store_a = app.create_store(&cookie, "A").await;
    let store_b = app.create_store(&cookie, "B").await;
    let billboard = create_billboard(&app, &cookie, &store_a, "Summer sale").await;

    let response = app
        .get(&format!("/v1/stores/{store_a}/billboards/{billboard}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["label"], "Summer sale");
    assert!(body["imageUrl"].as_str().unwrap().starts_with("https://images.test/"));

    // reading through another store is a miss, writing is forbidden
    let response = app
        .get(&format!("/v1/stores/{store_b}/billboards/{billboard}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .delete(&format!("/v1/stores/{store_b}/billboards/{billboard}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .send(multipart_request(
            "PUT",
            &format!("/v1/stores/{store_a}/billboards/{billboard}"),
            &cookie,
            &[Part::Text("label", "Winter sale")],
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["label"], "Winter sale");
    assert_eq!(app.uploader.calls(), 1);

    let response = app
        .delete(&format!("/v1/stores/{store_a}/billboards/{billboard}"), Some(&cookie))
        .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
    assert_eq!(app.db.count("billboards").await, 0);
}

#[tokio::test]
async fn billboard_list_paginates_and_filters() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;
    let store_id = app.create_store(&cookie, "Shop").await;
    for label in ["Summer", "Winter", "Summer nights"] {
        create_billboard(&app, &cookie, &store_id, label).await;
    }

    let response = app
        .get(
            &format!("/v1/stores/{store_id}/billboards?page=0&limit=100000"),
            Some(&cookie),
        )
        .await;
    let page = body_json(response).await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["limit"], 1000);
    assert_eq!(page["total"], 3);
    assert_eq!(page["totalPages"], 1);
    assert_eq!(page["data"][0]["label"], "Summer nights");

    let response = app
        .get(
            &format!("/v1/stores/{store_id}/billboards?page=abc&limit=2"),
            Some(&cookie),
        )
        .await;
    let page = body_json(response).await;
    assert_eq!(page["page"], 1);
    assert_eq!(page["data"].as_array().unwrap().len(), 2);
    assert_eq!(page["totalPages"], 2);

    let response = app
        .get(
            &format!("/v1/stores/{store_id}/billboards?label=Summer&limit=zero"),
            Some(&cookie),
        )
        .await;
    let page = body_json(response).await;
    assert_eq!(page["limit"], 10);
    assert_eq!(page["total"], 2);
}

#[tokio::test]
async fn category_requires_billboard_of_the_same_store() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;
    let store_a = app.create_store(&cookie, "A").await;
    let store_b = app.create_store(&cookie, "B").await;
    let billboard = create_billboard(&app, &cookie, &store_a, "Hero").await;

    let response = app
        .post_json(
            &format!("/v1/stores/{store_b}/categories"),
            Some(&cookie),
            json!({ "name": "Shoes", "billboardId": billboard }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = app
        .post_json(
            &format!("/v1/stores/{store_a}/categories"),
            Some(&cookie),
            json!({ "name": "Shoes", "billboardId": uuid::Uuid::new_v4() }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .post_json(
            &format!("/v1/stores/{store_a}/categories"),
            Some(&cookie),
            json!({ "name": "Shoes", "billboardId": billboard }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let category = body_json(response).await;
    assert_eq!(category["billboard"]["label"], "Hero");

    let response = app
        .get(
            &format!("/v1/stores/{store_a}/categories?billboardId={billboard}"),
            Some(&cookie),
        )
        .await;
    let page = body_json(response).await;
    assert_eq!(page["total"], 1);
    assert_eq!(page["data"][0]["billboard"]["id"], billboard.as_str());
}

#[tokio::test]
async fn sizes_are_scoped_to_their_store() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;
    let store_a = app.create_store(&cookie, "A").await;
    let store_b = app.create_store(&cookie, "B").await;

    let response = app
        .post_json(
            &format!("/v1/stores/{store_a}/sizes"),
            Some(&cookie),
            json!({ "name": "Large", "value": "L" }),
        )
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let size_id = body_json(response).await["id"].as_str().unwrap().to_string();

    let response = app
        .send(json_request(
            "PUT",
            &format!("/v1/stores/{store_b}/sizes/{size_id}"),
            Some(&cookie),
            json!({ "name": "Extra large", "value": "XL" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = app
        .send(json_request(
            "PUT",
            &format!("/v1/stores/{store_a}/sizes/{size_id}"),
            Some(&cookie),
            json!({ "name": "Extra large", "value": "XL" }),
        ))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["value"], "XL");
}

#[tokio::test]
async fn duplicate_color_hex_conflicts() {
    let app = TestApp::new();
    let cookie = app.verified_user("ana@example.com").await;
    let store_id = app.create_store(&cookie, "Shop").await;
    let uri = format!("/v1/stores/{store_id}/colors");

    let response = app
        .post_json(&uri, Some(&cookie), json!({ "name": "Red", "hex": "#FF0000" }))
        .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .post_json(&uri, Some(&cookie), json!({ "name": "Crimson", "hex": "#FF0000" }))
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);

    let response = app
        .post_json(&uri, Some(&cookie), json!({ "name": "Bad", "hex": "red" }))
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    assert_eq!(app.db.count("colors").await, 1);
}
