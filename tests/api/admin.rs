use diesel::{QueryDsl, RunQueryDsl, SelectableHelper};
use frontdash::{domain::UserType, models::{Login, RestaurantAccount}, schema::{logins, restaurant_accounts}};
use serde_json::{json, Value};
use wiremock::{matchers::{method, path}, Mock, ResponseTemplate};

use crate::helpers::{json_body, TestApp};

fn ids(body: &Value) -> Vec<i64> {
    body["restaurants"].as_array()
        .unwrap()
        .iter()
        .map(|r| r["id"].as_i64().unwrap())
        .collect()
}

#[actix_web::test]
async fn approval_provisions_login_account_and_emails_credentials(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let restaurant_id = app.register_restaurant("Taco Town", "tacos@example.com").await;

    let response = app.post_json(&format!("/api/admin/restaurants/{}/approve", restaurant_id), &json!({})).await;
    assert_eq!(response.status().as_u16(), 200);

    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["username"], "tacos@example.com");
    assert_eq!(body["emailSent"], true);
    assert_eq!(body["credentialsCreated"], true);
    assert!(body.get("temporaryPassword").is_none());

    let mut conn = app.pool.get().unwrap();
    let login = logins::table
        .find("tacos@example.com")
        .select(Login::as_select())
        .first::<Login>(&mut conn)
        .expect("Login was not created");
    assert_eq!(login.usertype, UserType::Restaurant);
    assert!(login.password_hash.starts_with("$argon2"));

    let account = restaurant_accounts::table
        .find("tacos@example.com")
        .select(RestaurantAccount::as_select())
        .first::<RestaurantAccount>(&mut conn)
        .expect("Account was not linked");
    assert_eq!(account.restaurant_id, restaurant_id);

    let emails = app.sent_emails().await;
    let credentials_email = emails.last().unwrap();
    let text = credentials_email["TextBody"].as_str().unwrap();
    assert!(text.contains("Temporary password"));

    let links: Vec<_> = linkify::LinkFinder::new()
        .links(text)
        .filter(|l| *l.kind() == linkify::LinkKind::Url)
        .collect();
    assert_eq!(links.len(), 1);
    assert_eq!(links[0].as_str(), "http://localhost:3000/login");
}

#[actix_web::test]
async fn approval_returns_the_password_when_the_email_fails(){
    let app = TestApp::spawn_app().await;
    app.email_api_rejects_all().await;
    let restaurant_id = app.register_restaurant("Noodle Bar", "noodles@example.com").await;

    let body = json_body(
        app.post_json(&format!("/api/admin/restaurants/{}/approve", restaurant_id), &json!({})).await
    ).await;

    assert_eq!(body["emailSent"], false);
    let password = body["temporaryPassword"].as_str().expect("Password missing");
    assert_eq!(password.len(), 12);

    let response = app.post_json("/api/auth/login", &json!({
        "username": "noodles@example.com",
        "password": password
    })).await;
    assert_eq!(response.status().as_u16(), 200);
    assert_eq!(json_body(response).await["user"]["restaurantId"], restaurant_id);
}

#[actix_web::test]
async fn approval_reuses_an_existing_login(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let restaurant_id = app.register_restaurant("Second Shop", "chain@example.com").await;

    let mut conn = app.pool.get().unwrap();
    diesel::sql_query(
        "INSERT INTO logins (username, password_hash, usertype) VALUES ('chain@example.com', 'legacy-pass', 'restaurant')"
    )
    .execute(&mut conn)
    .unwrap();

    let body = json_body(
        app.post_json(&format!("/api/admin/restaurants/{}/approve", restaurant_id), &json!({})).await
    ).await;

    assert_eq!(body["success"], true);
    assert_eq!(body["credentialsCreated"], false);
    assert!(body.get("temporaryPassword").is_none());

    let emails = app.sent_emails().await;
    assert!(emails.last().unwrap()["TextBody"].as_str().unwrap().contains("existing credentials"));

    let response = app.post_json("/api/auth/login", &json!({
        "username": "chain@example.com",
        "password": "legacy-pass"
    })).await;
    assert_eq!(response.status().as_u16(), 200);
}

#[actix_web::test]
async fn approving_twice_fails_with_current_state(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let restaurant = app.approved_restaurant("twice@example.com").await;

    let response = app.post_json(&format!("/api/admin/restaurants/{}/approve", restaurant.id), &json!({})).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(json_body(response).await["error"], "Restaurant is already approved");

    let response = app.post_json(&format!("/api/admin/restaurants/{}/reject", restaurant.id), &json!({})).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
async fn unknown_restaurant_cannot_be_approved(){
    let app = TestApp::spawn_app().await;

    let response = app.post_json("/api/admin/restaurants/999/approve", &json!({})).await;
    assert_eq!(response.status().as_u16(), 404);
    assert_eq!(json_body(response).await["error"], "Restaurant not found");
}

#[actix_web::test]
async fn rejection_stores_the_reason_and_notifies_the_owner(){
    let app = TestApp::spawn_app().await;
    let restaurant_id = app.register_restaurant("Rejected Eats", "rejected@example.com").await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_api)
        .await;

    let response = app.post_json(
        &format!("/api/admin/restaurants/{}/reject", restaurant_id),
        &json!({ "reason": "Missing health permit" })
    ).await;
    assert_eq!(response.status().as_u16(), 200);

    let body = json_body(response).await;
    assert_eq!(body["restaurant"]["requestStatus"], "REJECTED");
    assert_eq!(body["restaurant"]["rejectionReason"], "Missing health permit");
    assert_eq!(body["emailSent"], true);

    let pending = json_body(app.get("/api/admin/restaurants/pending").await).await;
    assert!(!ids(&pending).contains(&(restaurant_id as i64)));
}

#[actix_web::test]
async fn withdrawal_request_can_be_approved(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let restaurant = app.approved_restaurant("leaving@example.com").await;
    let id = restaurant.id as i64;

    let response = app.post_json(&format!("/api/restaurants/{}/withdraw", restaurant.id), &json!({})).await;
    assert_eq!(response.status().as_u16(), 200);

    let withdrawals = json_body(app.get("/api/admin/restaurants/withdrawals").await).await;
    assert_eq!(ids(&withdrawals), vec![id]);

    let response = app.post_json(&format!("/api/restaurants/{}/withdraw", restaurant.id), &json!({})).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app.post_json(
        &format!("/api/admin/restaurants/{}/withdrawal/approve", restaurant.id),
        &json!({})
    ).await;
    assert_eq!(response.status().as_u16(), 200);
    let body = json_body(response).await;
    assert_eq!(body["restaurant"]["requestStatus"], "WITHDRAWAL");
    assert_eq!(body["restaurant"]["isActive"], false);

    let approved = json_body(app.get("/api/admin/restaurants/approved").await).await;
    assert!(ids(&approved).is_empty());
    let withdrawals = json_body(app.get("/api/admin/restaurants/withdrawals").await).await;
    assert!(ids(&withdrawals).is_empty());
}

#[actix_web::test]
async fn rejected_withdrawal_returns_restaurant_to_approved(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let restaurant = app.approved_restaurant("staying@example.com").await;

    let response = app.post_json(
        &format!("/api/admin/restaurants/{}/withdrawal/reject", restaurant.id),
        &json!({})
    ).await;
    assert_eq!(response.status().as_u16(), 400);
    assert_eq!(json_body(response).await["error"], "Restaurant has no pending withdrawal request");

    app.post_json(&format!("/api/restaurants/{}/withdraw", restaurant.id), &json!({})).await;
    let response = app.post_json(
        &format!("/api/admin/restaurants/{}/withdrawal/reject", restaurant.id),
        &json!({})
    ).await;
    assert_eq!(response.status().as_u16(), 200);

    let approved = json_body(app.get("/api/admin/restaurants/approved").await).await;
    assert_eq!(ids(&approved), vec![restaurant.id as i64]);
}

#[actix_web::test]
async fn pending_list_shows_new_registrations(){
    let app = TestApp::spawn_app().await;
    let first = app.register_restaurant("One", "one@example.com").await;
    let second = app.register_restaurant("Two", "two@example.com").await;

    let pending = json_body(app.get("/api/admin/restaurants/pending").await).await;
    assert_eq!(ids(&pending), vec![first as i64, second as i64]);
}

#[actix_web::test]
async fn an_email_can_back_only_one_live_registration(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let first = app.register_restaurant("Original", "same@example.com").await;

    let response = app.post_json("/api/restaurants/register", &json!({
        "name": "Copycat",
        "email": "same@example.com"
    })).await;
    assert_eq!(response.status().as_u16(), 409);
    assert_eq!(
        json_body(response).await["error"],
        "A restaurant with this email is already registered"
    );

    app.post_json(&format!("/api/admin/restaurants/{}/reject", first), &json!({})).await;

    let response = app.post_json("/api/restaurants/register", &json!({
        "name": "Second Try",
        "email": "same@example.com"
    })).await;
    assert_eq!(response.status().as_u16(), 201);
}

#[actix_web::test]
async fn approval_refuses_a_login_that_manages_another_restaurant(){
    let app = TestApp::spawn_app().await;
    app.email_api_accepts_all().await;
    let first = app.approved_restaurant("shared@example.com").await;

    let mut conn = app.pool.get().unwrap();
    let second: i32 = diesel::sql_query(
        "INSERT INTO restaurants (name, email, request_status, is_active) \
         VALUES ('Legacy Twin', 'shared@example.com', 'REGISTRATION', false) RETURNING id"
    )
    .get_result::<InsertedId>(&mut conn)
    .unwrap()
    .id;

    let response = app.post_json(&format!("/api/admin/restaurants/{}/approve", second), &json!({})).await;
    assert_eq!(response.status().as_u16(), 409);
    assert_eq!(
        json_body(response).await["error"],
        format!("Login shared@example.com already manages restaurant {}", first.id)
    );

    let pending = json_body(app.get("/api/admin/restaurants/pending").await).await;
    assert_eq!(ids(&pending), vec![i64::from(second)]);

    let account = restaurant_accounts::table
        .find("shared@example.com")
        .select(RestaurantAccount::as_select())
        .first::<RestaurantAccount>(&mut conn)
        .unwrap();
    assert_eq!(account.restaurant_id, first.id);
}

#[derive(diesel::QueryableByName)]
struct InsertedId {
    #[diesel(sql_type = diesel::sql_types::Integer)]
    id: i32,
}
