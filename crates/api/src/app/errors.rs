use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use marketplace_core::{DomainError, ProductId, SellerId};

pub fn domain_error_to_response(err: DomainError) -> axum::response::Response {
    let status = match &err {
        DomainError::NotFound => StatusCode::NOT_FOUND,
        DomainError::Conflict(_) => StatusCode::CONFLICT,
        DomainError::Validation(_) | DomainError::InvalidArgument(_) | DomainError::InvalidId(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
    };
    let message = match &err {
        DomainError::NotFound => "product not found".to_string(),
        other => other.to_string(),
    };
    json_error(status, err.code(), message)
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}

/// A body that was sent but could not be decoded keeps axum's status.
pub fn json_rejection_to_response(rejection: JsonRejection) -> axum::response::Response {
    json_error(rejection.status(), "invalid_body", rejection.body_text())
}

pub fn parse_product_id(s: &str) -> Result<ProductId, axum::response::Response> {
    s.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid product id"))
}

pub fn parse_seller_id(s: &str) -> Result<SellerId, axum::response::Response> {
    s.parse()
        .map_err(|_| json_error(StatusCode::BAD_REQUEST, "invalid_id", "invalid seller id"))
}
