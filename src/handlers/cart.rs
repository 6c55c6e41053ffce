use crate::middlewares::require_same_user;
use crate::models::*;
use crate::services::CartService;
use actix_web::{HttpRequest, HttpResponse, ResponseError, Result, web};

#[utoipa::path(
    get,
    path = "/cart",
    tag = "cart",
    params(
        ("userId" = Option<String>, Query, description = "Authenticated user's id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 200, description = "Cart items in payment payload shape, with totals", body = CartResponse),
        (status = 400, description = "Missing userId"),
        (status = 401, description = "Unauthorized or userId mismatch")
    )
)]
pub async fn get_cart(
    cart_service: web::Data<CartService>,
    req: HttpRequest,
    query: web::Query<CartQuery>,
) -> Result<HttpResponse> {
    let user = require_same_user(&req, query.user_id)?;

    match cart_service.get_cart(user.id).await {
        Ok(cart) => Ok(HttpResponse::Ok().json(ApiResponse::success(cart))),
        Err(e) => Ok(e.error_response()),
    }
}

pub fn cart_config(cfg: &mut web::ServiceConfig) {
    cfg.route("/cart", web::get().to(get_cart));
}
