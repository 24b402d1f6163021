use actix_web::{http::StatusCode, HttpResponse};
use serde::Serialize;

// Every body carries `success`; payload fields sit next to it
#[derive(Serialize)]
struct Envelope<T: Serialize> {
    success: bool,
    #[serde(flatten)]
    payload: T,
}

#[derive(Serialize)]
struct Failure {
    error: String,
}

pub fn success<T: Serialize>(status: StatusCode, payload: T) -> HttpResponse {
    HttpResponse::build(status).json(Envelope {
        success: true,
        payload,
    })
}

pub fn ok<T: Serialize>(payload: T) -> HttpResponse {
    success(StatusCode::OK, payload)
}

pub fn created<T: Serialize>(payload: T) -> HttpResponse {
    success(StatusCode::CREATED, payload)
}

pub fn failure(status: StatusCode, error: impl ToString) -> HttpResponse {
    HttpResponse::build(status).json(Envelope {
        success: false,
        payload: Failure {
            error: error.to_string(),
        },
    })
}
