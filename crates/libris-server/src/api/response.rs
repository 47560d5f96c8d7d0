//! Response envelopes
//!
//! Every endpoint except the audit export answers with
//! `{"success": true, "data": ..., "meta"?: ...}` or
//! `{"success": false, "error": {"code": ..., "message": ...}}`.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use serde_json::{json, Value};

use crate::features::shared::PaginationMetadata;

#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub meta: Option<Value>,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
            meta: None,
        }
    }

    pub fn success_with_meta(data: T, meta: Value) -> Self {
        Self {
            success: true,
            data,
            meta: Some(meta),
        }
    }

    /// One page of a list, with its position under `meta.pagination`
    pub fn paginated(data: T, pagination: PaginationMetadata) -> Self {
        Self::success_with_meta(data, json!({ "pagination": pagination }))
    }

    /// `201 Created` with the new resource as `data`
    pub fn created(data: T) -> Response {
        (StatusCode::CREATED, Json(Self::success(data))).into_response()
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: ErrorDetail,
}

#[derive(Debug, Serialize)]
pub struct ErrorDetail {
    /// Stable machine-readable code such as `NOT_FOUND`
    pub code: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: ErrorDetail {
                code: code.into(),
                message: message.into(),
            },
        }
    }

    pub fn with_status(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

pub type ApiResult<T> = Result<T, crate::error::AppError>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::PaginationParams;
    use http_body_util::BodyExt;

    #[test]
    fn test_success_envelope_omits_empty_meta() {
        let value = serde_json::to_value(ApiResponse::success(json!({"id": 1}))).unwrap();
        assert_eq!(value, json!({"success": true, "data": {"id": 1}}));
    }

    #[test]
    fn test_paginated_envelope() {
        let params = PaginationParams::new(Some(2), Some(10));
        let page = ApiResponse::paginated(vec!["Rayuela"], PaginationMetadata::from_params(&params, 11));
        let value = serde_json::to_value(page).unwrap();

        assert_eq!(value["data"], json!(["Rayuela"]));
        assert_eq!(value["meta"]["pagination"]["page"], 2);
        assert_eq!(value["meta"]["pagination"]["total"], 11);
    }

    #[tokio::test]
    async fn test_error_envelope_and_status() {
        let response = ErrorResponse::new("NOT_FOUND", "Book not found").with_status(StatusCode::NOT_FOUND);
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value: Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(
            value,
            json!({"success": false, "error": {"code": "NOT_FOUND", "message": "Book not found"}})
        );
    }

    #[test]
    fn test_created_status() {
        assert_eq!(ApiResponse::created(json!({"id": 1})).status(), StatusCode::CREATED);
    }
}
