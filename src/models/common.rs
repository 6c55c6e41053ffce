use serde::Serialize;
use utoipa::ToSchema;

/// Envelope for read endpoints; payment endpoints return their own flat shapes.
#[derive(Debug, Serialize, ToSchema)]
pub struct ApiResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}
