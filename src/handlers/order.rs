use crate::middlewares::require_same_user;
use crate::models::*;
use crate::services::OrderService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/orders",
    tag = "order",
    params(
        ("userId" = Option<String>, Query, description = "Authenticated user's id"),
        ("page" = Option<u32>, Query, description = "Page number, from 1"),
        ("per_page" = Option<u32>, Query, description = "Page size, at most 100")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Settled orders with their bookings, newest first"),
        (status = 400, description = "Missing userId"),
        (status = 401, description = "Unauthorized or userId mismatch")
    )
)]
pub async fn get_orders(
    order_service: web::Data<OrderService>,
    req: HttpRequest,
    query: web::Query<OrderQuery>,
) -> Result<HttpResponse> {
    let user = require_same_user(&req, query.user_id)?;

    match order_service.get_user_orders(user.id, &query).await {
        Ok(page) => Ok(HttpResponse::Ok().json(ApiResponse::success(page))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn order_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/orders", web::get().to(get_orders));
}
