use serde_json::json;
use wiremock::{matchers::{header_exists, method, path}, Mock, ResponseTemplate};

use crate::helpers::{json_body, TestApp};

#[actix_web::test]
async fn requested_email_is_forwarded_to_the_email_api(){
    let app = TestApp::spawn_app().await;

    Mock::given(path("/email"))
        .and(method("POST"))
        .and(header_exists("X-Postmark-Server-Token"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_api)
        .await;

    let response = app.post_json("/api/notifications/email", &json!({
        "to": "customer@example.com",
        "subject": "Your order",
        "text": "It is on the way"
    })).await;
    assert_eq!(response.status().as_u16(), 200);

    let emails = app.sent_emails().await;
    assert_eq!(emails[0]["To"], "customer@example.com");
    assert_eq!(emails[0]["HtmlBody"], "<p>It is on the way</p>");
}

#[actix_web::test]
async fn requested_email_reports_failures(){
    let app = TestApp::spawn_app().await;
    app.email_api_rejects_all().await;

    let response = app.post_json("/api/notifications/email", &json!({
        "to": "customer@example.com",
        "subject": "Your order",
        "text": "It is on the way"
    })).await;
    assert_eq!(response.status().as_u16(), 500);
    assert_eq!(json_body(response).await["success"], false);

    let response = app.post_json("/api/notifications/email", &json!({
        "to": "nobody",
        "subject": "Your order",
        "text": "It is on the way"
    })).await;
    assert_eq!(response.status().as_u16(), 400);
}
