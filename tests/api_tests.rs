use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use oficina_backend::config::EnvironmentConfig;
use oficina_backend::realtime::{EventName, HubMessage};
use oficina_backend::{create_router, AppState, Stores};

struct TestApp {
    router: Router,
    state: AppState,
}

fn create_test_app() -> TestApp {
    let state = AppState::new(EnvironmentConfig::default(), Stores::memory());
    TestApp {
        router: create_router(state.clone()),
        state,
    }
}

impl TestApp {
    async fn request(&self, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(body) => builder
                .header("content-type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    async fn create_oil_change(&self) -> Value {
        let (status, body) = self
            .request(
                Method::POST,
                "/services",
                Some(json!({
                    "tempPlate": "ABC1D23",
                    "description": "Troca de óleo",
                    "mechanicId": "m1"
                })),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        body
    }
}

#[tokio::test]
async fn test_health_check() {
    let app = create_test_app();
    let (status, body) = app.request(Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert_eq!(body["subscribers"], 0);
}

#[tokio::test]
async fn test_create_then_approve_oil_change() {
    let app = create_test_app();
    let created = app.create_oil_change().await;

    assert_eq!(created["status"], "pending_approval");
    assert_eq!(created["totalCost"], 0.0);
    assert_eq!(created["tempPlate"], "ABC1D23");
    assert!(created["endDate"].is_null());

    let id = created["id"].as_str().unwrap();
    let (status, approved) = app
        .request(
            Method::PATCH,
            &format!("/services/{}/approve", id),
            Some(json!({ "totalCost": 350 })),
        )
        .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(approved["id"], id);
    assert_eq!(approved["status"], "completed");
    assert_eq!(approved["totalCost"], 350.0);
    assert!(approved["endDate"].is_string());
}

#[tokio::test]
async fn test_created_order_is_listed_first() {
    let app = create_test_app();
    app.create_oil_change().await;
    let newest = app.create_oil_change().await;

    let (status, list) = app.request(Method::GET, "/services", None).await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 2);
    assert_eq!(list[0]["id"], newest["id"]);

    let (status, fetched) = app
        .request(Method::GET, &format!("/services/{}", newest["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(fetched, newest);
}

#[tokio::test]
async fn test_create_without_vehicle_identity_is_rejected() {
    let app = create_test_app();
    let (status, body) = app
        .request(
            Method::POST,
            "/services",
            Some(json!({ "description": "Troca de óleo", "mechanicId": "m1" })),
        )
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_ORDER");
    assert!(body["error"].is_string());

    let (_, list) = app.request(Method::GET, "/services", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_approve_rejects_negative_amount() {
    let app = create_test_app();
    let created = app.create_oil_change().await;
    let id = created["id"].as_str().unwrap();

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/services/{}/approve", id),
            Some(json!({ "totalCost": -10 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let (_, fetched) = app.request(Method::GET, &format!("/services/{}", id), None).await;
    assert_eq!(fetched["status"], "pending_approval");
}

#[tokio::test]
async fn test_approve_after_delete_is_bad_request() {
    let app = create_test_app();
    let created = app.create_oil_change().await;
    let id = created["id"].as_str().unwrap();

    let (status, _) = app.request(Method::DELETE, &format!("/services/{}", id), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/services/{}/approve", id),
            Some(json!({ "totalCost": 350 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "NOT_FOUND");

    let (status, _) = app.request(Method::DELETE, &format!("/services/{}", id), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_invalid_id_is_bad_request() {
    let app = create_test_app();
    let (status, body) = app
        .request(
            Method::PATCH,
            "/services/not-a-uuid/approve",
            Some(json!({ "totalCost": 350 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
}

#[tokio::test]
async fn test_malformed_body_uses_error_shape() {
    let app = create_test_app();
    let (status, body) = app
        .request(
            Method::POST,
            "/services",
            Some(json!({ "tempPlate": 123, "description": "Troca de óleo", "mechanicId": "m1" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["error"].is_string());

    let (_, list) = app.request(Method::GET, "/services", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_approve_without_body_is_bad_request() {
    let app = create_test_app();
    let created = app.create_oil_change().await;
    let id = created["id"].as_str().unwrap();

    // Sin cuerpo ni content-type
    let (status, body) = app
        .request(Method::PATCH, &format!("/services/{}/approve", id), None)
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, body) = app
        .request(Method::PATCH, &format!("/services/{}/approve", id), Some(json!({})))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let (status, body) = app
        .request(
            Method::PATCH,
            &format!("/services/{}/approve", id),
            Some(json!({ "totalCost": 100000000000u64 })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_AMOUNT");

    let (_, fetched) = app.request(Method::GET, &format!("/services/{}", id), None).await;
    assert_eq!(fetched["status"], "pending_approval");
}

#[tokio::test]
async fn test_writes_are_broadcast_after_persisting() {
    let app = create_test_app();
    let mut subscription = app.state.hub.subscribe(&[]);

    let created = app.create_oil_change().await;
    let id = created["id"].as_str().unwrap();
    app.request(
        Method::PATCH,
        &format!("/services/{}/approve", id),
        Some(json!({ "totalCost": "350.00" })),
    )
    .await;

    match subscription.recv().await {
        Some(HubMessage::Event(event)) => {
            assert_eq!(event.name(), EventName::OrderCreated);
            assert_eq!(event.order().id.to_string(), id);
        }
        other => panic!("unexpected message: {:?}", other),
    }
    match subscription.recv().await {
        Some(HubMessage::Event(event)) => {
            assert_eq!(event.name(), EventName::OrderUpdated);
            assert!(event.order().status.is_terminal());
        }
        other => panic!("unexpected message: {:?}", other),
    }
}

#[tokio::test]
async fn test_direct_creation_and_admin_edit() {
    let app = create_test_app();
    let (status, created) = app
        .request(
            Method::POST,
            "/services/direct",
            Some(json!({
                "tempPlate": "xyz9a87",
                "description": "Alinhamento",
                "mechanicId": "admin",
                "totalCost": 120
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["status"], "pending");
    assert_eq!(created["tempPlate"], "XYZ9A87");
    let id = created["id"].as_str().unwrap();

    let (status, updated) = app
        .request(
            Method::PUT,
            &format!("/services/{}", id),
            Some(json!({ "status": "in-progress", "notes": "Cliente aguarda" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["status"], "in-progress");
    assert_eq!(updated["notes"], "Cliente aguarda");

    let (status, body) = app
        .request(
            Method::PUT,
            &format!("/services/{}", id),
            Some(json!({ "status": "pending_approval" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_vehicle_crud_and_order_embedding() {
    let app = create_test_app();
    let (status, vehicle) = app
        .request(
            Method::POST,
            "/vehicles",
            Some(json!({ "plate": "abc1d23", "model": "Onix", "brand": "Chevrolet", "year": 2020 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(vehicle["plate"], "ABC1D23");
    let vehicle_id = vehicle["id"].as_str().unwrap();

    let (status, order) = app
        .request(
            Method::POST,
            "/services",
            Some(json!({
                "vehicleId": vehicle_id,
                "description": "Revisão",
                "mechanicId": "m1"
            })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(order["vehicle"]["plate"], "ABC1D23");

    // Un vehículo con órdenes no se puede borrar
    let (status, _) = app
        .request(Method::DELETE, &format!("/vehicles/{}", vehicle_id), None)
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    let (status, body) = app
        .request(Method::POST, "/vehicles", Some(json!({ "plate": "", "model": "x", "brand": "y" })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "VALIDATION_ERROR");

    let (status, _) = app
        .request(Method::GET, &format!("/vehicles/{}", uuid::Uuid::new_v4()), None)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_dashboard_stats() {
    let app = create_test_app();
    let created = app.create_oil_change().await;
    app.create_oil_change().await;
    app.request(
        Method::PATCH,
        &format!("/services/{}/approve", created["id"].as_str().unwrap()),
        Some(json!({ "totalCost": 350 })),
    )
    .await;

    let (status, stats) = app.request(Method::GET, "/dashboard-stats", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["revenue"], 350.0);
    assert_eq!(stats["pendingApproval"], 1);
    assert_eq!(stats["activeOS"], 0);
    assert_eq!(stats["vehicles"], 0);
}

#[tokio::test]
async fn test_parts_and_documents() {
    let app = create_test_app();
    let (status, part) = app
        .request(
            Method::POST,
            "/parts",
            Some(json!({ "name": "Filtro de óleo", "code": "FO-01", "quantity": 2, "minQuantity": 5, "price": 39.9 })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let part_id = part["id"].as_str().unwrap();

    let (status, updated) = app
        .request(Method::PUT, &format!("/parts/{}", part_id), Some(json!({ "quantity": 10 })))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 10);

    let (status, _) = app
        .request(Method::POST, "/parts", Some(json!({ "name": "x", "code": "y", "price": -1 })))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, document) = app
        .request(
            Method::POST,
            "/documents",
            Some(json!({ "name": "NF 123", "type": "invoice", "url": "https://files.local/nf123.pdf" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(document["type"], "invoice");

    let (_, documents) = app.request(Method::GET, "/documents", None).await;
    assert_eq!(documents.as_array().unwrap().len(), 1);

    let (status, _) = app
        .request(Method::DELETE, &format!("/documents/{}", document["id"].as_str().unwrap()), None)
        .await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}
