use axum::{http::StatusCode, Json};

use crate::app::dto::MessageResponse;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn root() -> Json<MessageResponse> {
    Json(MessageResponse {
        message: "Welcome to the Student Marketplace Products API.",
    })
}
