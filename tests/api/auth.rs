use diesel::RunQueryDsl;
use serde_json::json;

use crate::helpers::{json_body, TestApp};

async fn seed_login(app: &TestApp, username: &str, password: &str, usertype: &str){
    let mut conn = app.pool.get().unwrap();
    diesel::sql_query(format!(
        "INSERT INTO logins (username, password_hash, usertype) VALUES ('{}', '{}', '{}')",
        username, password, usertype
    ))
    .execute(&mut conn)
    .unwrap();
}

#[actix_web::test]
async fn legacy_plaintext_admin_can_log_in(){
    let app = TestApp::spawn_app().await;
    seed_login(&app, "admin", "admin123", "admin").await;

    let response = app.post_json("/api/auth/login", &json!({
        "username": "admin",
        "password": "admin123"
    })).await;

    assert_eq!(response.status().as_u16(), 200);
    let body = json_body(response).await;
    assert_eq!(body["user"]["usertype"], "admin");
    assert_eq!(body["user"]["mustChangePassword"], false);
}

#[actix_web::test]
async fn wrong_password_or_unknown_user_is_unauthorized(){
    let app = TestApp::spawn_app().await;
    seed_login(&app, "admin", "admin123", "admin").await;

    for (username, password) in [("admin", "wrong"), ("ghost", "admin123")] {
        let response = app.post_json("/api/auth/login", &json!({
            "username": username,
            "password": password
        })).await;

        assert_eq!(response.status().as_u16(), 401);
        let body = json_body(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "Invalid username or password");
    }
}

#[actix_web::test]
async fn restaurant_login_without_account_is_forbidden(){
    let app = TestApp::spawn_app().await;
    seed_login(&app, "orphan@example.com", "secret", "restaurant").await;

    let response = app.post_json("/api/auth/login", &json!({
        "username": "orphan@example.com",
        "password": "secret"
    })).await;

    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
async fn staff_login_without_staff_row_is_forbidden(){
    let app = TestApp::spawn_app().await;
    seed_login(&app, "nobody01", "secret", "staff").await;

    let response = app.post_json("/api/auth/login", &json!({
        "username": "nobody01",
        "password": "secret"
    })).await;

    assert_eq!(response.status().as_u16(), 403);
}

#[actix_web::test]
async fn changed_password_replaces_the_old_one(){
    let app = TestApp::spawn_app().await;
    seed_login(&app, "admin", "admin123", "admin").await;

    let response = app.post_json("/api/auth/change-password", &json!({
        "username": "admin",
        "currentPassword": "admin123",
        "newPassword": "a much better password"
    })).await;
    assert_eq!(response.status().as_u16(), 200);

    let old = app.post_json("/api/auth/login", &json!({ "username": "admin", "password": "admin123" })).await;
    assert_eq!(old.status().as_u16(), 401);

    let new = app.post_json("/api/auth/login", &json!({
        "username": "admin",
        "password": "a much better password"
    })).await;
    assert_eq!(new.status().as_u16(), 200);
}

#[actix_web::test]
async fn change_password_validates_input(){
    let app = TestApp::spawn_app().await;
    seed_login(&app, "admin", "admin123", "admin").await;

    let short = app.post_json("/api/auth/change-password", &json!({
        "username": "admin",
        "currentPassword": "admin123",
        "newPassword": "short"
    })).await;
    assert_eq!(short.status().as_u16(), 400);

    let wrong_current = app.post_json("/api/auth/change-password", &json!({
        "username": "admin",
        "currentPassword": "nope",
        "newPassword": "long enough password"
    })).await;
    assert_eq!(wrong_current.status().as_u16(), 401);
}
