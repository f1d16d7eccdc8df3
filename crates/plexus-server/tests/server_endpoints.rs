use assert_json_diff::assert_json_eq;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode, header};
use plexus_server::{AppConfig, build_app};
use serde_json::{Value, json};
use tower::ServiceExt;

fn app() -> Router {
    build_app(&AppConfig::default(), plexus_db_memory::create_store()).expect("build app")
}

async fn post_graphql(app: Router, body: Value) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .header("x-request-id", "test-req")
        .body(Body::from(body.to_string()))
        .unwrap();

    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

#[tokio::test]
async fn health_returns_ok() {
    let response = app()
        .oneshot(Request::get("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_json_eq!(body, json!({ "status": "ok" }));
}

#[tokio::test]
async fn graphql_query_and_mutation_round_trip() {
    let app = app();

    let (status, created) = post_graphql(
        app.clone(),
        json!({
            "query": "mutation($dto: CreateUserInput!) { createUser(dto: $dto) { id name } }",
            "variables": { "dto": { "name": "Alice", "balance": 100 } }
        }),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let id = created["data"]["createUser"]["id"].as_str().unwrap().to_string();

    let (status, body) = post_graphql(
        app,
        json!({
            "query": "query Get($id: UUID!) { user(id: $id) { name balance posts { title } } }",
            "operationName": "Get",
            "variables": { "id": id }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_json_eq!(
        body,
        json!({ "data": { "user": { "name": "Alice", "balance": 100.0, "posts": [] } } })
    );
}

#[tokio::test]
async fn graphql_rejects_deep_query() {
    let (status, body) = post_graphql(
        app(),
        json!({
            "query": "{ users { posts { author { posts { author { posts { title } } } } } } }"
        }),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("data").is_none());
    assert_eq!(body["errors"][0]["extensions"]["code"], "DEPTH_EXCEEDED");
}

#[tokio::test]
async fn graphql_rejects_malformed_body() {
    let request = Request::builder()
        .method("POST")
        .uri("/graphql")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{ not json"))
        .unwrap();

    let response = app().oneshot(request).await.unwrap();
    assert!(response.status().is_client_error());
}

#[tokio::test]
async fn member_type_enum_accepts_variables() {
    let (status, body) = post_graphql(
        app(),
        json!({
            "query": "query($id: MemberTypeId!) { memberType(id: $id) { id discount postsLimitPerMonth } }",
            "variables": { "id": "business" }
        }),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["memberType"]["id"], "business");
}
