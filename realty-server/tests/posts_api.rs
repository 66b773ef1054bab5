//! Router tests for the post endpoints

mod common;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use common::{id_of, post_body, TestApp};
use serde_json::json;

#[tokio::test]
async fn list_applies_city_and_price_range() {
    let app = TestApp::new();
    let owner = app.user("alice").id;

    let cheap = app.create_post(owner, "Miami", 150_000).await;
    app.create_post(owner, "Miami", 900_000).await;
    app.create_post(owner, "Austin", 200_000).await;

    let (status, body) = app
        .get("/api/posts?city=Miami&minPrice=100000&maxPrice=500000", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    let posts = body.as_array().expect("array");
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0]["id"], cheap["id"]);
    assert_eq!(posts[0]["city"], "Miami");
}

#[tokio::test]
async fn unparseable_filters_are_ignored() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    app.create_post(owner, "Miami", 150_000).await;
    app.create_post(owner, "Austin", 200_000).await;

    let (status, body) = app
        .get("/api/posts?bedroom=three&minPrice=lots&type=lease&property=castle", None)
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn list_filters_on_type_and_bedrooms() {
    let app = TestApp::new();
    let owner = app.user("alice").id;

    let mut rental = post_body("Denver", 2_000);
    rental["postData"]["type"] = json!("rent");
    rental["postData"]["bedroom"] = json!(1);
    let (status, _) = app.send("POST", "/api/posts", Some(owner), Some(rental)).await;
    assert_eq!(status, StatusCode::OK);
    app.create_post(owner, "Denver", 450_000).await;

    let (_, rent) = app.get("/api/posts?type=rent", None).await;
    assert_eq!(rent.as_array().map(Vec::len), Some(1));
    assert_eq!(rent[0]["type"], "rent");

    let (_, three_bed) = app.get("/api/posts?bedroom=3", None).await;
    assert_eq!(three_bed.as_array().map(Vec::len), Some(1));
    assert_eq!(three_bed[0]["bedroom"], 3);
}

#[tokio::test]
async fn create_assigns_caller_as_owner() {
    let app = TestApp::new();
    let caller = app.user("alice").id;
    let someone_else = app.user("bob").id;

    let mut body = post_body("Miami", 300_000);
    body["postData"]["userId"] = json!(someone_else);

    let (status, post) = app.send("POST", "/api/posts", Some(caller), Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["userId"], json!(caller));
    assert_eq!(app.store.detail_count(id_of(&post)), 1);
}

#[tokio::test]
async fn create_without_cookie_is_unauthorized() {
    let app = TestApp::new();

    let (status, body) = app
        .send("POST", "/api/posts", None, Some(post_body("Miami", 1)))
        .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "unauthorized");
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let app = TestApp::new();
    let caller = app.user("alice").id;

    let mut body = post_body("Miami", 1);
    body["postData"]["price"] = json!(-5);
    let (status, value) = app.send("POST", "/api/posts", Some(caller), Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "validation_error");

    let request = Request::builder()
        .method("POST")
        .uri("/api/posts")
        .header(header::COOKIE, app.cookie(caller))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"postData\":"))
        .expect("request");
    let (status, value) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(value["error"], "bad_request");
}

#[tokio::test]
async fn get_post_includes_detail_and_owner() {
    let app = TestApp::new();
    let owner = app.user("alice");
    let post = app.create_post(owner.id, "Miami", 250_000).await;
    let uri = format!("/api/posts/{}", id_of(&post));

    let (status, view) = app.get(&uri, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["title"], "Home in Miami");
    assert_eq!(view["postDetail"]["desc"], "Sunny family home");
    assert_eq!(view["user"]["username"], "alice");
    assert_eq!(view["isSaved"], false);
}

#[tokio::test]
async fn get_post_reports_saved_state_for_caller() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let reader = app.user("bob").id;
    let post = app.create_post(owner, "Miami", 250_000).await;
    let post_id = id_of(&post);
    let uri = format!("/api/posts/{post_id}");

    let (status, _) = app
        .send("POST", "/api/users/save", Some(reader), Some(json!({ "postId": post_id })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, as_reader) = app.get(&uri, Some(reader)).await;
    assert_eq!(as_reader["isSaved"], true);

    let (_, as_owner) = app.get(&uri, Some(owner)).await;
    assert_eq!(as_owner["isSaved"], false);
}

#[tokio::test]
async fn get_post_treats_bad_token_as_anonymous() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let post = app.create_post(owner, "Miami", 250_000).await;

    let request = Request::builder()
        .uri(format!("/api/posts/{}", id_of(&post)))
        .header(header::COOKIE, "token=not-a-jwt")
        .body(Body::empty())
        .expect("request");
    let (status, view) = app.send_raw(request).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(view["isSaved"], false);
}

#[tokio::test]
async fn get_unknown_or_malformed_post() {
    let app = TestApp::new();

    let (status, body) = app
        .get(&format!("/api/posts/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "not_found");

    let (status, _) = app.get("/api/posts/not-a-uuid", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn update_requires_ownership() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let intruder = app.user("mallory").id;
    let post = app.create_post(owner, "Miami", 250_000).await;
    let uri = format!("/api/posts/{}", id_of(&post));

    let (status, body) = app
        .send("PUT", &uri, Some(intruder), Some(post_body("Nowhere", 1)))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let (_, unchanged) = app.get(&uri, None).await;
    assert_eq!(unchanged["city"], "Miami");
}

#[tokio::test]
async fn owner_update_with_full_body() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let post = app.create_post(owner, "Miami", 250_000).await;
    let post_id = id_of(&post);
    let uri = format!("/api/posts/{post_id}");

    let mut body = post_body("Tampa", 275_000);
    body["postDetail"]["desc"] = json!("Renovated kitchen");
    let (status, updated) = app.send("PUT", &uri, Some(owner), Some(body)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["city"], "Tampa");
    assert_eq!(updated["price"], 275_000);
    assert_eq!(updated["userId"], json!(owner));

    let (_, view) = app.get(&uri, None).await;
    assert_eq!(view["postDetail"]["desc"], "Renovated kitchen");
    assert_eq!(app.store.detail_count(post_id), 1);
}

#[tokio::test]
async fn update_unknown_post_is_not_found() {
    let app = TestApp::new();
    let owner = app.user("alice").id;

    let (status, _) = app
        .send(
            "PUT",
            &format!("/api/posts/{}", uuid::Uuid::new_v4()),
            Some(owner),
            Some(post_body("Miami", 1)),
        )
        .await;

    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn delete_by_owner_only() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let intruder = app.user("mallory").id;
    let post = app.create_post(owner, "Miami", 250_000).await;
    let uri = format!("/api/posts/{}", id_of(&post));

    let (status, _) = app.send("DELETE", &uri, Some(intruder), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) = app.send("DELETE", &uri, None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = app.send("DELETE", &uri, Some(owner), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Post deleted");

    let (status, _) = app.get(&uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn update_without_detail_keeps_stored_detail() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let post_id = id_of(&app.create_post(owner, "Miami", 250_000).await);
    let uri = format!("/api/posts/{post_id}");

    let body = json!({ "postData": { "title": "Price drop" } });
    let (status, updated) = app.send("PUT", &uri, Some(owner), Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["title"], "Price drop");

    let (_, view) = app.get(&uri, None).await;
    assert_eq!(view["postDetail"]["desc"], "Sunny family home");
    assert_eq!(view["postDetail"]["utilities"], "owner");
    assert_eq!(view["postDetail"]["size"], 140);
}

#[tokio::test]
async fn partial_update_keeps_unsent_fields() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let post_id = id_of(&app.create_post(owner, "Miami", 250_000).await);
    let uri = format!("/api/posts/{post_id}");

    let (status, updated) = app
        .send("PUT", &uri, Some(owner), Some(json!({ "postData": { "price": 1 } })))
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["price"], 1);
    assert_eq!(updated["title"], "Home in Miami");
    assert_eq!(updated["city"], "Miami");
    assert_eq!(updated["bedroom"], 3);
    assert_eq!(updated["type"], "buy");
}

#[tokio::test]
async fn partial_detail_update_merges() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let post_id = id_of(&app.create_post(owner, "Miami", 250_000).await);
    let uri = format!("/api/posts/{post_id}");

    let (status, _) = app
        .send("PUT", &uri, Some(owner), Some(json!({ "postDetail": { "school": 50 } })))
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, view) = app.get(&uri, None).await;
    assert_eq!(view["postDetail"]["school"], 50);
    assert_eq!(view["postDetail"]["desc"], "Sunny family home");
    assert_eq!(view["price"], 250_000);
    assert_eq!(app.store.detail_count(post_id), 1);
}

#[tokio::test]
async fn partial_update_validates_sent_fields() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let post_id = id_of(&app.create_post(owner, "Miami", 250_000).await);
    let uri = format!("/api/posts/{post_id}");

    let (status, body) = app
        .send("PUT", &uri, Some(owner), Some(json!({ "postData": { "price": -1 } })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "validation_error");

    let (_, view) = app.get(&uri, None).await;
    assert_eq!(view["price"], 250_000);
}

#[tokio::test]
async fn non_owner_update_is_forbidden_even_with_bad_body() {
    let app = TestApp::new();
    let owner = app.user("alice").id;
    let intruder = app.user("mallory").id;
    let post_id = id_of(&app.create_post(owner, "Miami", 250_000).await);
    let uri = format!("/api/posts/{post_id}");

    let request = Request::builder()
        .method("PUT")
        .uri(&uri)
        .header(header::COOKIE, app.cookie(intruder))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"postData\":"))
        .expect("request");
    let (status, body) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"], "forbidden");

    let request = Request::builder()
        .method("PUT")
        .uri(&uri)
        .header(header::COOKIE, app.cookie(owner))
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"postData\":"))
        .expect("request");
    let (status, _) = app.send_raw(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
