use std::str::FromStr;
use std::sync::Arc;

use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum_test::TestServer;
use bigdecimal::BigDecimal;
use plants_api::storage::{InMemoryPlantGateway, NewPlant, Plant, PlantGateway};
use pretty_assertions::assert_eq;
use serde_json::{Value, json};

struct TestApp {
    server: TestServer,
    gateway: Arc<InMemoryPlantGateway>,
}

fn build_test_app() -> TestApp {
    let gateway = Arc::new(InMemoryPlantGateway::new());
    let state = plants_api::AppState::new(gateway.clone()).unwrap();
    let server = TestServer::new(plants_api::app(state)).unwrap();
    TestApp { server, gateway }
}

async fn seed(app: &TestApp, name: &str, image: &str, price: &str) -> Plant {
    app.gateway
        .create(NewPlant {
            name: name.to_string(),
            image: image.to_string(),
            price: BigDecimal::from_str(price).unwrap(),
            is_in_stock: true,
        })
        .await
        .unwrap()
}

fn not_found_body() -> Value {
    json!({ "error": "Plant not found" })
}

#[tokio::test]
async fn test_list_plants_empty() {
    let app = build_test_app();
    let response = app.server.get("/plants").await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), json!([]));
}

#[tokio::test]
async fn test_list_plants_returns_every_record_with_five_fields() {
    let app = build_test_app();
    seed(&app, "Fern", "f.png", "9.99").await;
    seed(&app, "Aloe", "a.png", "4.50").await;
    seed(&app, "ZZ Plant", "zz.png", "25.98").await;

    let response = app.server.get("/plants?page=2&sort=name").await;
    response.assert_status_ok();

    let body: Value = response.json();
    let plants = body.as_array().unwrap();
    assert_eq!(plants.len(), 3);
    for plant in plants {
        let mut keys: Vec<&str> =
            plant.as_object().unwrap().keys().map(String::as_str).collect();
        keys.sort();
        assert_eq!(keys, vec!["id", "image", "is_in_stock", "name", "price"]);
    }
    assert_eq!(plants[0]["name"], "Fern");
    assert_eq!(plants[2]["price"], json!(25.98));
}

#[tokio::test]
async fn test_get_plant_round_trips_stored_values() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "1234567.89").await;

    let response = app.server.get(&format!("/plants/{}", plant.id)).await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "id": plant.id,
            "name": "Fern",
            "image": "f.png",
            "price": 1234567.89,
            "is_in_stock": true,
        })
    );
}

#[tokio::test]
async fn test_get_plant_not_found() {
    let app = build_test_app();
    let response = app.server.get("/plants/42").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), not_found_body());
}

#[tokio::test]
async fn test_non_integer_id_is_rejected_before_lookup() {
    let app = build_test_app();

    for path in ["/plants/abc", "/plants/1.5", "/plants/99999999999"] {
        let response = app.server.get(path).await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert_eq!(response.json::<Value>(), json!({ "error": "Invalid plant id" }));
    }

    let response = app.server.delete("/plants/abc").await;
    response.assert_status(StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_only_overwrites_present_keys() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;

    let response = app
        .server
        .patch(&format!("/plants/{}", plant.id))
        .json(&json!({ "price": 12.50 }))
        .await;
    response.assert_status_ok();
    assert_eq!(
        response.json::<Value>(),
        json!({
            "id": plant.id,
            "name": "Fern",
            "image": "f.png",
            "price": 12.5,
            "is_in_stock": true,
        })
    );

    let stored = app.gateway.find_by_id(plant.id).await.unwrap().unwrap();
    assert_eq!(stored.price, BigDecimal::from_str("12.50").unwrap());
    assert_eq!(stored.name, "Fern");
}

#[tokio::test]
async fn test_update_every_field() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;

    let response = app
        .server
        .patch(&format!("/plants/{}", plant.id))
        .json(&json!({
            "name": "Boston Fern",
            "image": "boston.png",
            "price": 14,
            "is_in_stock": false,
        }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["name"], "Boston Fern");
    assert_eq!(body["image"], "boston.png");
    assert_eq!(body["price"], json!(14));
    assert_eq!(body["is_in_stock"], false);
}

#[tokio::test]
async fn test_update_with_empty_body_is_a_no_op() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;
    let path = format!("/plants/{}", plant.id);
    let before: Value = app.server.get(&path).await.json();

    let response = app.server.patch(&path).json(&json!({})).await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>(), before);
}

#[tokio::test]
async fn test_update_is_idempotent() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;
    let path = format!("/plants/{}", plant.id);
    let body = json!({ "name": "Aloe", "is_in_stock": false });

    let first: Value = app.server.patch(&path).json(&body).await.json();
    let second: Value = app.server.patch(&path).json(&body).await.json();

    assert_eq!(first, second);
    assert_eq!(app.server.get(&path).await.json::<Value>(), first);
}

#[tokio::test]
async fn test_update_ignores_unknown_keys() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;

    let response = app
        .server
        .patch(&format!("/plants/{}", plant.id))
        .json(&json!({ "id": 99, "colour": "green", "name": "Fernando" }))
        .await;
    response.assert_status_ok();

    let body: Value = response.json();
    assert_eq!(body["id"], plant.id);
    assert_eq!(body["name"], "Fernando");
    assert!(body.get("colour").is_none());
}

#[tokio::test]
async fn test_update_not_found() {
    let app = build_test_app();
    let response = app
        .server
        .patch("/plants/7")
        .json(&json!({ "name": "Ghost" }))
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), not_found_body());
}

#[tokio::test]
async fn test_update_not_found_wins_over_missing_body() {
    let app = build_test_app();
    let response = app.server.patch("/plants/7").await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), not_found_body());
}

#[tokio::test]
async fn test_update_with_malformed_json_is_a_client_error() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;
    let path = format!("/plants/{}", plant.id);

    let response = app
        .server
        .patch(&path)
        .bytes("{\"name\": ".into())
        .content_type("application/json")
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);
    assert!(response.json::<Value>()["error"].is_string());

    let response = app.server.patch(&path).text("name=Aloe").await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let stored = app.gateway.find_by_id(plant.id).await.unwrap().unwrap();
    assert_eq!(stored, plant);
}

#[tokio::test]
async fn test_update_with_non_object_body_is_rejected() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;
    let path = format!("/plants/{}", plant.id);

    for body in [r#"["Hacked", "x.png", 1, false]"#, r#"["x"]"#, "[]", "null"] {
        let response = app
            .server
            .patch(&path)
            .bytes(body.as_bytes().to_vec().into())
            .content_type("application/json")
            .await;
        response.assert_status(StatusCode::BAD_REQUEST);
        assert!(response.json::<Value>()["error"].is_string());
    }

    let stored = app.gateway.find_by_id(plant.id).await.unwrap().unwrap();
    assert_eq!(stored, plant);
}

#[tokio::test]
async fn test_wide_prices_keep_every_digit() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "99999999999999.99").await;
    let path = format!("/plants/{}", plant.id);

    let response = app.server.get(&path).await;
    response.assert_status_ok();
    assert!(
        response.text().contains(r#""price":99999999999999.99"#),
        "unexpected body: {}",
        response.text()
    );

    let response = app
        .server
        .patch(&path)
        .bytes(r#"{"price": 12345678901234567.89}"#.into())
        .content_type("application/json")
        .await;
    response.assert_status_ok();
    assert!(response.text().contains(r#""price":12345678901234567.89"#));

    let stored = app.gateway.find_by_id(plant.id).await.unwrap().unwrap();
    assert_eq!(
        stored.price,
        BigDecimal::from_str("12345678901234567.89").unwrap()
    );

    let response = app.server.get(&path).await;
    assert_eq!(
        response.json::<Value>()["price"],
        serde_json::from_str::<Value>("12345678901234567.89").unwrap()
    );
}

#[tokio::test]
async fn test_update_with_wrong_typed_value_is_rejected() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;
    let path = format!("/plants/{}", plant.id);

    let response = app
        .server
        .patch(&path)
        .json(&json!({ "price": "expensive", "name": "Aloe" }))
        .await;
    response.assert_status(StatusCode::BAD_REQUEST);

    let error = response.json::<Value>()["error"].as_str().unwrap().to_string();
    assert!(error.contains("price"), "unexpected message: {error}");

    let stored = app.gateway.find_by_id(plant.id).await.unwrap().unwrap();
    assert_eq!(stored, plant);
}

#[tokio::test]
async fn test_update_accepts_numeric_string_price() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;

    let response = app
        .server
        .patch(&format!("/plants/{}", plant.id))
        .json(&json!({ "price": "19.95" }))
        .await;
    response.assert_status_ok();
    assert_eq!(response.json::<Value>()["price"], json!(19.95));
}

#[tokio::test]
async fn test_delete_plant() {
    let app = build_test_app();
    let plant = seed(&app, "Fern", "f.png", "9.99").await;
    let path = format!("/plants/{}", plant.id);

    let response = app.server.delete(&path).await;
    response.assert_status(StatusCode::NO_CONTENT);
    assert!(response.as_bytes().is_empty());

    let response = app.server.get(&path).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), not_found_body());

    let response = app.server.delete(&path).await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.json::<Value>(), not_found_body());
}

#[tokio::test]
async fn test_delete_leaves_other_plants_alone() {
    let app = build_test_app();
    let fern = seed(&app, "Fern", "f.png", "9.99").await;
    let aloe = seed(&app, "Aloe", "a.png", "4.50").await;

    app.server
        .delete(&format!("/plants/{}", fern.id))
        .await
        .assert_status(StatusCode::NO_CONTENT);

    let body: Value = app.server.get("/plants").await.json();
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|plant| plant["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![i64::from(aloe.id)]);
}

#[tokio::test]
async fn test_error_responses_echo_request_id() {
    let app = build_test_app();
    let request_id = "7a3c2a52-0d6f-4b8e-9a55-2f0b8f1c9e11";

    let response = app
        .server
        .get("/plants/404")
        .add_header(
            HeaderName::from_static("x-request-id"),
            HeaderValue::from_static(request_id),
        )
        .await;
    response.assert_status(StatusCode::NOT_FOUND);
    assert_eq!(response.header("x-request-id"), request_id);
}
