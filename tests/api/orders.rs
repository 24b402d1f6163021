use diesel::{ExpressionMethods, QueryDsl, RunQueryDsl, SelectableHelper};
use frontdash::{domain::QueueStatus, models::OrderQueueEntry, schema::order_queue};
use serde_json::json;

use crate::helpers::{json_body, TestApp};

fn queue_status(app: &TestApp, order_id: i64) -> QueueStatus {
    let mut conn = app.pool.get().unwrap();
    order_queue::table
        .filter(order_queue::order_id.eq(order_id as i32))
        .select(OrderQueueEntry::as_select())
        .first::<OrderQueueEntry>(&mut conn)
        .expect("Order was not queued")
        .status
}

#[actix_web::test]
async fn quote_prices_the_cart(){
    let app = TestApp::spawn_app().await;

    let body = json_body(app.post_json("/api/orders/quote", &json!({
        "items": [{ "price": 10.0, "quantity": 2 }]
    })).await).await;
    assert_eq!(body["quote"]["subtotal"], 20.0);
    assert_eq!(body["quote"]["tax"], 1.6);
    assert_eq!(body["quote"]["deliveryFee"], 2.99);
    assert_eq!(body["quote"]["total"], 24.59);

    let body = json_body(app.post_json("/api/orders/quote", &json!({
        "items": [{ "price": 15.0, "quantity": 2 }]
    })).await).await;
    assert_eq!(body["quote"]["deliveryFee"], 0.0);
    assert_eq!(body["quote"]["total"], 32.4);
}

#[actix_web::test]
async fn placing_an_order_uses_menu_prices_and_queues_it(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let restaurant = app.approved_restaurant("orders@example.com").await;

    let response = app.place_order(restaurant.id, json!([
        { "menuItemId": restaurant.burger_id, "quantity": 2, "price": 0.01 }
    ])).await;
    assert_eq!(response.status().as_u16(), 201);

    let body = json_body(response).await;
    let order = &body["order"];
    assert_eq!(order["status"], "pending");
    assert_eq!(order["subtotal"], 20.0);
    assert_eq!(order["tax"], 1.6);
    assert_eq!(order["deliveryFee"], 2.99);
    assert_eq!(order["total"], 24.59);
    assert_eq!(order["items"][0]["itemName"], "Burger");
    assert_eq!(order["items"][0]["quantity"], 2);

    let order_id = body["orderId"].as_i64().unwrap();
    assert_eq!(queue_status(&app, order_id), QueueStatus::Queued);

    let details = json_body(app.get(&format!("/api/orders/{}", order_id)).await).await;
    assert_eq!(details["order"]["customer"]["name"], "Ada Lovelace");
    assert_eq!(details["order"]["address"]["street"], "2 Side St");
    assert!(details["order"]["deliveries"].as_array().unwrap().is_empty());
}

#[actix_web::test]
async fn orders_are_refused_by_restaurants_that_are_not_approved(){
    let app = TestApp::spawn_app().await;
    let restaurant_id = app.register_restaurant("Not Yet", "notyet@example.com").await;
    let menu = json_body(app.get(&format!("/api/restaurants/{}/menu", restaurant_id)).await).await;
    let item_id = menu["menu"][0]["id"].as_i64().unwrap();

    let response = app.place_order(restaurant_id, json!([{ "menuItemId": item_id, "quantity": 1 }])).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(json_body(response).await["error"], "Restaurant is not accepting orders");
}

#[actix_web::test]
async fn invalid_order_lines_are_rejected(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let restaurant = app.approved_restaurant("lines@example.com").await;
    let other = app.approved_restaurant("other@example.com").await;

    let cases = vec![
        (json!([]), "no items"),
        (json!([{ "menuItemId": restaurant.burger_id, "quantity": 0 }]), "zero quantity"),
        (json!([{ "menuItemId": restaurant.pie_id, "quantity": 1 }]), "an unavailable item"),
        (json!([{ "menuItemId": other.fries_id, "quantity": 1 }]), "another restaurant's item"),
    ];

    for (items, description) in cases {
        let response = app.place_order(restaurant.id, items).await;
        assert_eq!(
            response.status().as_u16(),
            400,
            "The API did not fail with 400 for {}",
            description
        );
    }

    let response = app.place_order(424242, json!([{ "menuItemId": 1, "quantity": 1 }])).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn order_status_only_moves_forward(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let restaurant = app.approved_restaurant("status@example.com").await;

    let placed = json_body(app.place_order(restaurant.id, json!([
        { "menuItemId": restaurant.fries_id, "quantity": 1 }
    ])).await).await;
    let order_id = placed["orderId"].as_i64().unwrap();
    let status_route = format!("/api/orders/{}/status", order_id);

    let response = app.put_json(&status_route, &json!({ "status": "preparing" })).await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(queue_status(&app, order_id), QueueStatus::Processing);

    let response = app.put_json(&status_route, &json!({ "status": "confirmed" })).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(
        json_body(response).await["error"],
        "Cannot move order from preparing to confirmed"
    );

    let response = app.put_json(&status_route, &json!({ "status": "delivered" })).await;
    assert_eq!(response.status().as_u16(), 200);
    let order = json_body(response).await["order"].clone();
    assert!(order["deliveredAt"].is_string());
    assert_eq!(queue_status(&app, order_id), QueueStatus::Completed);

    let response = app.put_json(&status_route, &json!({ "status": "cancelled" })).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
async fn unknown_status_value_is_a_bad_request(){
    let app = TestApp::spawn_app().await;

    let response = app.put_json("/api/orders/1/status", &json!({ "status": "teleported" })).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(json_body(response).await["success"], false);

    let response = app.put_json("/api/orders/999/status", &json!({ "status": "confirmed" })).await;
    assert_eq!(response.status().as_u16(), 404);
}

#[actix_web::test]
async fn orders_can_be_filtered_by_status_and_restaurant(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let first = app.approved_restaurant("filter1@example.com").await;
    let second = app.approved_restaurant("filter2@example.com").await;

    let a = json_body(app.place_order(first.id, json!([{ "menuItemId": first.burger_id, "quantity": 1 }])).await).await;
    app.place_order(second.id, json!([{ "menuItemId": second.burger_id, "quantity": 1 }])).await;
    app.put_json(&format!("/api/orders/{}/status", a["orderId"]), &json!({ "status": "cancelled" })).await;

    let all = json_body(app.get("/api/orders").await).await;
    assert_eq!(all["orders"].as_array().unwrap().len(), 2);

    let cancelled = json_body(app.get("/api/orders?status=cancelled").await).await;
    let cancelled = cancelled["orders"].as_array().unwrap();
    assert_eq!(cancelled.len(), 1);
    assert_eq!(cancelled[0]["id"], a["orderId"]);

    let for_second = json_body(app.get(&format!("/api/orders?restaurantId={}", second.id)).await).await;
    assert_eq!(for_second["orders"][0]["restaurantId"], second.id);

    let restaurant_orders = json_body(app.get(&format!("/api/restaurants/{}/orders", first.id)).await).await;
    assert_eq!(restaurant_orders["orders"].as_array().unwrap().len(), 1);
}

#[actix_web::test]
async fn oversized_amounts_are_rejected(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;

    let response = app.post_json("/api/orders/quote", &json!({
        "items": [{ "price": 1e17, "quantity": 1000 }]
    })).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app.post_json("/api/orders/quote", &json!({
        "items": [{ "price": 10.0, "quantity": 1 }],
        "tip": 1e300
    })).await;
    assert_eq!(response.status().as_u16(), 400);

    let restaurant = app.approved_restaurant("bigspender@example.com").await;
    let response = app.post_json(&format!("/api/restaurants/{}/menu", restaurant.id), &json!({
        "name": "Gold Leaf Steak", "price": 1e17
    })).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app.put_json(
        &format!("/api/restaurants/{}/menu/{}", restaurant.id, restaurant.burger_id),
        &json!({ "price": 1e17 })
    ).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app.place_order(restaurant.id, json!([
        { "menuItemId": restaurant.burger_id, "quantity": 1000 }
    ])).await;
    assert_eq!(response.status().as_u16(), 201);
    assert_eq!(json_body(response).await["order"]["subtotal"], 10000.0);
}
