use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

use plaza_api::{AppStateInner, routes};
use plaza_db::Database;

const ALICE: &str = "0xa11ce00000000000000000000000000000000001";
const BOB: &str = "0xb0b0000000000000000000000000000000000002";

fn app() -> Router {
    let db = Database::open_in_memory().unwrap();
    routes::router(Arc::new(AppStateInner { db }))
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    match body {
        Some(v) => send_raw(app, method, uri, Some("application/json"), v.to_string()).await,
        None => send_raw(app, method, uri, None, String::new()).await,
    }
}

async fn send_raw(
    app: &Router,
    method: Method,
    uri: &str,
    content_type: Option<&str>,
    body: String,
) -> (StatusCode, Value) {
    let mut req = Request::builder().method(method).uri(uri);
    if let Some(ct) = content_type {
        req = req.header("content-type", ct);
    }

    let resp = app.clone().oneshot(req.body(Body::from(body)).unwrap()).await.unwrap();
    let status = resp.status();
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn post_body(tx: &str) -> Value {
    json!({
        "author": ALICE,
        "content": "gm",
        "ipfsHash": "QmPost",
        "blockNumber": 19000000,
        "transactionHash": tx,
    })
}

async fn create_post(app: &Router) -> String {
    let (status, body) = send(app, Method::POST, "/api/posts", Some(post_body("0xpost"))).await;
    assert_eq!(status, StatusCode::CREATED);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn health() {
    let (status, body) = send(&app(), Method::GET, "/api/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn post_is_created_with_defaults_then_deduplicated() {
    let app = app();
    let (status, post) = send(&app, Method::POST, "/api/posts", Some(post_body("0xpost"))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(post["likesCount"], 0);
    assert_eq!(post["commentsCount"], 0);
    assert_eq!(post["tipsReceived"], "0");
    assert_eq!(post["imageHash"], Value::Null);
    assert!(post["createdAt"].is_string());

    let (status, again) = send(&app, Method::POST, "/api/posts", Some(post_body("0xpost"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(again["id"], post["id"]);

    let (status, list) = send(&app, Method::GET, "/api/posts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn invalid_post_lists_every_failing_field() {
    let (status, body) = send(
        &app(),
        Method::POST,
        "/api/posts",
        Some(json!({ "content": "gm", "blockNumber": "12", "id": "ignored" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["error"], "validation failed");
    let fields: Vec<&str> = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .map(|f| f["field"].as_str().unwrap())
        .collect();
    assert_eq!(fields, ["author", "ipfsHash", "blockNumber", "transactionHash"]);
    assert_eq!(body["fields"][0]["code"], "required");
    assert_eq!(body["fields"][2]["code"], "invalid_type");
}

#[tokio::test]
async fn comment_bumps_counter_once() {
    let app = app();
    let post_id = create_post(&app).await;
    let comment = json!({
        "postId": post_id,
        "author": BOB,
        "content": "nice",
        "ipfsHash": "QmComment",
        "transactionHash": "0xc1",
    });

    let (status, body) = send(&app, Method::POST, "/api/comments", Some(comment.clone())).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created"], true);
    assert_eq!(body["post"]["commentsCount"], 1);

    let (status, replay) = send(&app, Method::POST, "/api/comments", Some(comment)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(replay["created"], false);
    assert_eq!(replay["id"], body["id"]);
    assert_eq!(replay["post"]["commentsCount"], 1);

    let uri = format!("/api/posts/{}/comments", post_id);
    let (status, list) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list[0]["content"], "nice");
}

#[tokio::test]
async fn children_of_unknown_posts_are_not_found() {
    let app = app();
    let like = json!({ "postId": "missing", "author": BOB, "transactionHash": "0xl1" });
    let (status, _) = send(&app, Method::POST, "/api/likes", Some(like)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::GET, "/api/posts/missing/tips", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/likes",
        Some(json!({ "postId": null, "author": BOB, "transactionHash": "0xl2" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "postId");
    assert_eq!(body["fields"][0]["code"], "null");
}

#[tokio::test]
async fn tip_amounts_survive_exactly() {
    let app = app();
    let post_id = create_post(&app).await;
    let tip = json!({
        "postId": post_id,
        "fromAddress": BOB,
        "toAddress": ALICE,
        "amount": "1000000000000000000000001",
        "transactionHash": "0xt1",
    });

    let (status, body) = send(&app, Method::POST, "/api/tips", Some(tip)).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["post"]["tipsReceived"], "1000000000000000000000001");

    let uri = format!("/api/posts/{}/tips", post_id);
    let (_, list) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(list[0]["amount"], "1000000000000000000000001");

    let numeric = json!({
        "postId": post_id,
        "fromAddress": BOB,
        "toAddress": ALICE,
        "amount": 5,
        "transactionHash": "0xt2",
    });
    let (status, body) = send(&app, Method::POST, "/api/tips", Some(numeric)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"][0]["field"], "amount");
}

#[tokio::test]
async fn delete_is_refused_while_the_post_has_likes() {
    let app = app();
    let post_id = create_post(&app).await;
    let like = json!({ "postId": post_id, "author": BOB, "transactionHash": "0xl1" });
    send(&app, Method::POST, "/api/likes", Some(like)).await;

    let uri = format!("/api/posts/{}", post_id);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, post) = send(&app, Method::GET, &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(post["likesCount"], 1);

    let (status, _) = send(&app, Method::DELETE, "/api/posts/missing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn user_profile_lifecycle() {
    let app = app();
    let (status, user) = send(&app, Method::POST, "/api/users", Some(json!({ "address": ALICE }))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(user["reputation"], 0);
    assert_eq!(user["totalTips"], "0");

    let (status, _) = send(&app, Method::POST, "/api/users", Some(json!({ "address": ALICE }))).await;
    assert_eq!(status, StatusCode::OK);

    let profile = format!("/api/users/{}/profile", ALICE);
    let (status, user) = send(&app, Method::PATCH, &profile, Some(json!({ "name": "Alice" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Alice");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &profile,
        Some(json!({ "name": "", "avatarUrl": "not-a-url" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["fields"].as_array().unwrap().len(), 2);

    let (status, user) = send(&app, Method::GET, &format!("/api/users/{}", ALICE), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(user["name"], "Alice");

    let missing = format!("/api/users/{}/profile", BOB);
    let (status, _) = send(&app, Method::PATCH, &missing, Some(json!({ "name": "Bob" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn undecodable_requests_get_json_errors() {
    let app = app();

    let (status, body) = send_raw(
        &app,
        Method::POST,
        "/api/posts",
        Some("application/json"),
        "[1, 2]".to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].is_string());
    assert!(body.get("fields").is_none());

    let (status, body) = send_raw(&app, Method::POST, "/api/likes", Some("application/json"), "{".to_string()).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());

    let (status, body) = send_raw(&app, Method::POST, "/api/users", None, json!({ "address": ALICE }).to_string()).await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert!(body["error"].is_string());

    let (status, body) = send(&app, Method::GET, "/api/posts?limit=many", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn post_pages_cover_every_post() {
    let app = app();
    for i in 0..5 {
        let tx = format!("0xpage{}", i);
        let (status, _) = send(&app, Method::POST, "/api/posts", Some(post_body(&tx))).await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let mut seen = Vec::new();
    let mut uri = "/api/posts?limit=2".to_string();
    loop {
        let (status, page) = send(&app, Method::GET, &uri, None).await;
        assert_eq!(status, StatusCode::OK);
        let page = page.as_array().unwrap().clone();
        let Some(last) = page.last() else { break };

        seen.extend(page.iter().map(|p| p["transactionHash"].as_str().unwrap().to_string()));
        uri = format!(
            "/api/posts?limit=2&before={}&beforeId={}",
            last["createdAt"].as_str().unwrap(),
            last["id"].as_str().unwrap()
        );
    }

    assert_eq!(seen, ["0xpage4", "0xpage3", "0xpage2", "0xpage1", "0xpage0"]);
}
