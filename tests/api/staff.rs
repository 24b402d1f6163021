use serde_json::json;
use wiremock::{matchers::{method, path}, Mock, ResponseTemplate};

use crate::helpers::{json_body, TestApp};

#[actix_web::test]
async fn staff_usernames_use_the_first_free_suffix(){
    let app = TestApp::spawn_app().await;

    let mut usernames = Vec::new();
    for first_name in ["Anna", "Ben"] {
        let response = app.post_json("/api/staff", &json!({
            "firstName": first_name,
            "lastName": "Smith"
        })).await;
        assert_eq!(response.status().as_u16(), 201);

        let body = json_body(response).await;
        assert_eq!(body["temporaryPassword"].as_str().unwrap().len(), 12);
        assert_eq!(body["staff"]["firstLogin"], true);
        usernames.push(body["username"].as_str().unwrap().to_string());
    }

    assert_eq!(usernames, vec!["smith01", "smith02"]);
}

#[actix_web::test]
async fn new_staff_must_change_password_on_first_login(){
    let app = TestApp::spawn_app().await;

    let created = json_body(app.post_json("/api/staff", &json!({
        "firstName": "Carla",
        "lastName": "Jones"
    })).await).await;
    let username = created["username"].as_str().unwrap();
    let password = created["temporaryPassword"].as_str().unwrap();

    let login = json_body(app.post_json("/api/auth/login", &json!({
        "username": username,
        "password": password
    })).await).await;
    assert_eq!(login["user"]["usertype"], "staff");
    assert_eq!(login["user"]["mustChangePassword"], true);
    assert_eq!(login["user"]["staffId"], created["staff"]["id"]);

    let response = app.post_json("/api/auth/change-password", &json!({
        "username": username,
        "currentPassword": password,
        "newPassword": "carla-chose-this"
    })).await;
    assert_eq!(response.status().as_u16(), 200);

    let login = json_body(app.post_json("/api/auth/login", &json!({
        "username": username,
        "password": "carla-chose-this"
    })).await).await;
    assert_eq!(login["user"]["mustChangePassword"], false);
}

#[actix_web::test]
async fn staff_with_email_receive_their_credentials(){
    let app = TestApp::spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_api)
        .await;

    let created = json_body(app.post_json("/api/staff", &json!({
        "firstName": "Dana",
        "lastName": "White",
        "email": "dana@example.com"
    })).await).await;
    assert_eq!(created["emailSent"], true);

    let emails = app.sent_emails().await;
    let text = emails[0]["TextBody"].as_str().unwrap();
    assert!(text.contains("white01"));
    assert!(text.contains(created["temporaryPassword"].as_str().unwrap()));
}

#[actix_web::test]
async fn staff_creation_requires_names(){
    let app = TestApp::spawn_app().await;

    let response = app.post_json("/api/staff", &json!({ "firstName": "Eve", "lastName": "  " })).await;
    assert_eq!(response.status().as_u16(), 400);

    let response = app.post_json("/api/staff", &json!({
        "firstName": "Eve",
        "lastName": "Black",
        "email": "not-an-email"
    })).await;
    assert_eq!(response.status().as_u16(), 400);
}

#[actix_web::test]
async fn deleting_staff_removes_their_login(){
    let app = TestApp::spawn_app().await;

    let created = json_body(app.post_json("/api/staff", &json!({
        "firstName": "Finn",
        "lastName": "Gray"
    })).await).await;
    let staff_id = created["staff"]["id"].as_i64().unwrap();

    let response = app.delete(&format!("/api/staff/{}", staff_id)).await;
    assert_eq!(response.status().as_u16(), 200);

    let listed = json_body(app.get("/api/staff").await).await;
    assert!(listed["staff"].as_array().unwrap().is_empty());

    let login = app.post_json("/api/auth/login", &json!({
        "username": created["username"],
        "password": created["temporaryPassword"]
    })).await;
    assert_eq!(login.status().as_u16(), 401);

    let response = app.delete(&format!("/api/staff/{}", staff_id)).await;
    assert_eq!(response.status().as_u16(), 404);
}
