use serde_json::{json, Value};

use crate::helpers::{json_body, TestApp};

async fn ready_order(app: &TestApp, email: &str) -> i64 {
    let restaurant = app.approved_restaurant(email).await;
    let placed = json_body(app.place_order(restaurant.id, json!([
        { "menuItemId": restaurant.burger_id, "quantity": 3 }
    ])).await).await;
    let order_id = placed["orderId"].as_i64().unwrap();

    app.put_json(&format!("/api/orders/{}/status", order_id), &json!({ "status": "ready" })).await;
    order_id
}

async fn order(app: &TestApp, order_id: i64) -> Value {
    json_body(app.get(&format!("/api/orders/{}", order_id)).await).await["order"].clone()
}

#[actix_web::test]
async fn assigning_a_driver_sends_the_order_out(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let order_id = ready_order(&app, "assign@example.com").await;
    let driver_id = app.hire_driver("Dan Driver").await;

    let response = app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": driver_id })).await;
    assert_eq!(response.status().as_u16(), 201);
    let delivery = json_body(response).await["delivery"].clone();
    assert_eq!(delivery["status"], "assigned");

    let order = order(&app, order_id).await;
    assert_eq!(order["status"], "out_for_delivery");
    assert_eq!(order["deliveries"].as_array().unwrap().len(), 1);

    let response = app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": driver_id })).await;
    assert_eq!(response.status().as_u16(), 409);
}

#[actix_web::test]
async fn delivered_status_closes_the_order(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let order_id = ready_order(&app, "deliver@example.com").await;
    let driver_id = app.hire_driver("Fast Freddie").await;

    let delivery = json_body(
        app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": driver_id })).await
    ).await["delivery"].clone();
    let status_route = format!("/api/deliveries/{}/status", delivery["id"]);

    let response = app.put_json(&status_route, &json!({ "status": "picked_up" })).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app.put_json(&status_route, &json!({ "status": "delivered" })).await;
    assert_eq!(response.status().as_u16(), 200);
    assert!(json_body(response).await["delivery"]["deliveredAt"].is_string());

    let order = order(&app, order_id).await;
    assert_eq!(order["status"], "delivered");

    let response = app.put_json(&status_route, &json!({ "status": "failed" })).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
async fn failed_delivery_returns_the_order_for_reassignment(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let order_id = ready_order(&app, "retry@example.com").await;
    let first_driver = app.hire_driver("Unlucky").await;
    let second_driver = app.hire_driver("Lucky").await;

    let delivery = json_body(
        app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": first_driver })).await
    ).await["delivery"].clone();

    let response = app.put_json(
        &format!("/api/deliveries/{}/status", delivery["id"]),
        &json!({ "status": "failed" })
    ).await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(order(&app, order_id).await["status"], "ready");

    let response = app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": second_driver })).await;
    assert_eq!(response.status().as_u16(), 201);

    let for_second = json_body(app.get(&format!("/api/deliveries?driverId={}", second_driver)).await).await;
    assert_eq!(for_second["deliveries"].as_array().unwrap().len(), 1);
    let all = json_body(app.get("/api/deliveries").await).await;
    assert_eq!(all["deliveries"].as_array().unwrap().len(), 2);
}

#[actix_web::test]
async fn inactive_drivers_cannot_be_assigned(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let order_id = ready_order(&app, "inactive@example.com").await;
    let driver_id = app.hire_driver("On Break").await;

    let response = app.put_json(&format!("/api/drivers/{}/status", driver_id), &json!({ "isActive": false })).await;
    assert_eq!(response.status().as_u16(), 200);

    let active = json_body(app.get("/api/drivers?activeOnly=true").await).await;
    assert!(active["drivers"].as_array().unwrap().is_empty());

    let response = app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": driver_id })).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(json_body(response).await["error"], "Driver is not active");

    let response = app.post_json("/api/deliveries", &json!({ "orderId": 9999, "driverId": driver_id })).await;
    assert!(response.status().is_client_error());
}

#[actix_web::test]
async fn drivers_with_history_cannot_be_deleted(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let order_id = ready_order(&app, "history@example.com").await;
    let busy = app.hire_driver("Busy").await;
    let idle = app.hire_driver("Idle").await;

    app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": busy })).await;

    let response = app.delete(&format!("/api/drivers/{}", busy)).await;
    assert_eq!(response.status().as_u16(), 409);

    let response = app.delete(&format!("/api/drivers/{}", idle)).await;
    assert_eq!(response.status().as_u16(), 200);

    let response = app.delete(&format!("/api/drivers/{}", idle)).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn cancelling_an_order_fails_its_open_delivery(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let order_id = ready_order(&app, "cancel@example.com").await;
    let driver_id = app.hire_driver("Stood Up").await;

    let delivery = json_body(
        app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": driver_id })).await
    ).await["delivery"].clone();

    let response = app.put_json(&format!("/api/orders/{}/status", order_id), &json!({ "status": "cancelled" })).await;
    assert_eq!(response.status().as_u16(), 200);

    let cancelled = order(&app, order_id).await;
    assert_eq!(cancelled["status"], "cancelled");
    assert_eq!(cancelled["deliveries"][0]["status"], "failed");

    let response = app.put_json(
        &format!("/api/deliveries/{}/status", delivery["id"]),
        &json!({ "status": "delivered" })
    ).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(order(&app, order_id).await["status"], "cancelled");
}

#[actix_web::test]
async fn delivering_an_order_settles_its_open_delivery(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let order_id = ready_order(&app, "handed@example.com").await;
    let driver_id = app.hire_driver("Handover").await;

    app.post_json("/api/deliveries", &json!({ "orderId": order_id, "driverId": driver_id })).await;

    let response = app.put_json(&format!("/api/orders/{}/status", order_id), &json!({ "status": "delivered" })).await;
    assert_eq!(response.status().as_u16(), 200);

    let order = order(&app, order_id).await;
    assert_eq!(order["deliveries"][0]["status"], "delivered");
    assert!(order["deliveries"][0]["deliveredAt"].is_string());
}

#[actix_web::test]
async fn out_for_delivery_requires_an_assigned_driver(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let order_id = ready_order(&app, "nodriver@example.com").await;

    let response = app.put_json(
        &format!("/api/orders/{}/status", order_id),
        &json!({ "status": "out_for_delivery" })
    ).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(json_body(response).await["error"], "Order has no driver assigned");
    assert_eq!(order(&app, order_id).await["status"], "ready");
}
