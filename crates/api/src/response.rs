//! Shared response envelope types for API handlers.
//!
//! All API responses use a `{ "success": true, "data": ... }` envelope.
//! Use [`ApiResponse`] instead of ad-hoc `serde_json::json!` blocks to get
//! compile-time type safety and consistent serialization. The matching
//! failure envelope (`{ "success": false, "error": ..., "code": ... }`) is
//! produced by the [`AppError`](crate::error::AppError) responder.

use serde::Serialize;

/// Standard `{ "success": true, "data": T }` response envelope.
///
/// # Example
///
/// ```ignore
/// Ok(Json(ApiResponse::new(items)))
/// ```
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

impl<T: Serialize> ApiResponse<T> {
    /// Wrap a payload in the success envelope.
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
