//! Shared response envelope types for API handlers.
//!
//! Every successful response is `{ "status": "success", "message": ..., "data": ... }`.
//! Paginated listings put a [`Page`] in `data`.

use axum::Json;
use serde::Serialize;

/// Standard success envelope.
///
/// # Example
///
/// ```ignore
/// Ok(success("State created", state))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub status: &'static str,
    pub message: String,
    pub data: T,
}

/// One page of a listing plus the total number of matching rows.
#[derive(Debug, Serialize)]
pub struct Page<T: Serialize> {
    pub items: Vec<T>,
    pub total: i64,
    pub limit: i64,
    pub offset: i64,
}

/// Handler return type for enveloped JSON.
pub type ApiJson<T> = Json<ApiResponse<T>>;

/// Wrap `data` in a success envelope.
pub fn success<T: Serialize>(message: impl Into<String>, data: T) -> ApiJson<T> {
    Json(ApiResponse {
        status: "success",
        message: message.into(),
        data,
    })
}

/// Wrap one page of results in a success envelope.
pub fn paginated<T: Serialize>(
    message: impl Into<String>,
    items: Vec<T>,
    total: i64,
    limit: i64,
    offset: i64,
) -> ApiJson<Page<T>> {
    success(
        message,
        Page {
            items,
            total,
            limit,
            offset,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let Json(body) = success("ok", vec![1, 2]);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["status"], "success");
        assert_eq!(value["message"], "ok");
        assert_eq!(value["data"], serde_json::json!([1, 2]));
    }

    #[test]
    fn paginated_envelope_carries_bounds() {
        let Json(body) = paginated("Listed", vec!["a"], 7, 1, 3);
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["data"]["items"], serde_json::json!(["a"]));
        assert_eq!(value["data"]["total"], 7);
        assert_eq!(value["data"]["limit"], 1);
        assert_eq!(value["data"]["offset"], 3);
    }

    #[test]
    fn unit_data_serializes_as_null() {
        let Json(body) = success("Deleted", ());
        let value = serde_json::to_value(&body).unwrap();
        assert!(value["data"].is_null());
    }
}
